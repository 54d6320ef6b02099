pub mod root;
pub mod auth;
pub mod users;
pub mod bulk;
pub mod announcements;
pub mod courses;
pub mod partners;
pub mod portal_links;
