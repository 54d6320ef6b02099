pub mod user_service;
pub mod bulk;
pub mod seed_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::error::Result;
use user_service::UserService;
use bulk::BulkUserService;
use seed_service::SeedService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub partner_repo: Arc<dyn PartnerRepository>,
    pub portal_link_repo: Arc<dyn PortalLinkRepository>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub bulk_service: Arc<BulkUserService>,
    pub seed_service: Arc<SeedService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, settings: &Settings) -> Result<Self> {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let announcement_repo = Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let course_repo = Arc::new(SqliteCourseRepository::new(db_pool.clone()));
        let partner_repo = Arc::new(SqlitePartnerRepository::new(db_pool.clone()));
        let portal_link_repo: Arc<dyn PortalLinkRepository> =
            Arc::new(SqlitePortalLinkRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(&settings.auth, user_repo.clone())?);
        let user_service = Arc::new(UserService::new(user_repo.clone()));
        let bulk_service = Arc::new(BulkUserService::new(user_repo.clone()));
        let seed_service = Arc::new(SeedService::new(
            user_repo.clone(),
            portal_link_repo.clone(),
            settings.admin.clone(),
        ));

        Ok(Self {
            user_repo,
            announcement_repo,
            course_repo,
            partner_repo,
            portal_link_repo,
            auth_service,
            user_service,
            bulk_service,
            seed_service,
            db_pool,
        })
    }
}
