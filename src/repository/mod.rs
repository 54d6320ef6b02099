use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod announcement_repository;
pub mod course_repository;
pub mod partner_repository;
pub mod portal_link_repository;

pub use user_repository::SqliteUserRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use course_repository::SqliteCourseRepository;
pub use partner_repository::SqlitePartnerRepository;
pub use portal_link_repository::SqlitePortalLinkRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Hashes `request.password` and stores the email lower-cased.
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    /// Case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    async fn set_password(&self, id: Uuid, password: &str) -> Result<User>;
    async fn touch_last_login(&self, id: Uuid) -> Result<()>;
    /// Nullifies authored announcement/course references and deletes the
    /// user in a single transaction.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, request: CreateAnnouncementRequest, created_by: Option<Uuid>) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    /// Newest publication first.
    async fn list(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>>;
    async fn update(&self, id: Uuid, update: UpdateAnnouncementRequest) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, request: CreateCourseRequest, created_by: Option<Uuid>) -> Result<Course>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>>;
    /// Newest first; `active` filters on `is_active` when given.
    async fn list(&self, active: Option<bool>) -> Result<Vec<Course>>;
    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PartnerRepository: Send + Sync {
    async fn create(&self, request: CreatePartnerRequest) -> Result<Partner>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>>;
    /// Alphabetical by name; `active` filters on `is_active` when given.
    async fn list(&self, active: Option<bool>) -> Result<Vec<Partner>>;
    async fn update(&self, id: Uuid, update: UpdatePartnerRequest) -> Result<Partner>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PortalLinkRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<PortalLink>>;
    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<PortalLink>>;
    /// Includes inactive links; used by seeding.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PortalLink>>;
    async fn create(&self, definition: &PortalLinkDefinition) -> Result<PortalLink>;
    async fn update_content(&self, id: Uuid, definition: &PortalLinkDefinition) -> Result<PortalLink>;
}
