use std::sync::Arc;

use crate::{
    config::AdminConfig,
    domain::{default_portal_links, CreateUserRequest, Role},
    error::Result,
    repository::{PortalLinkRepository, UserRepository},
};

/// What a seeding pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub links_created: usize,
    pub links_updated: usize,
}

/// Idempotent startup data: the configured admin account and the default
/// portal links.
pub struct SeedService {
    user_repo: Arc<dyn UserRepository>,
    portal_link_repo: Arc<dyn PortalLinkRepository>,
    admin: AdminConfig,
}

impl SeedService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        portal_link_repo: Arc<dyn PortalLinkRepository>,
        admin: AdminConfig,
    ) -> Self {
        Self { user_repo, portal_link_repo, admin }
    }

    pub async fn seed_all(&self) -> Result<SeedReport> {
        let admin_created = self.seed_admin().await?;
        let (links_created, links_updated) = self.seed_links().await?;

        Ok(SeedReport { admin_created, links_created, links_updated })
    }

    /// Creates the admin account if its email is unknown. An existing account
    /// is left untouched, including its password.
    pub async fn seed_admin(&self) -> Result<bool> {
        if self.user_repo.find_by_email(&self.admin.email).await?.is_some() {
            return Ok(false);
        }

        let admin = self.user_repo.create(CreateUserRequest {
            name: self.admin.name.clone(),
            email: self.admin.email.clone(),
            password: self.admin.password.clone(),
            role: Role::Admin,
        }).await?;

        tracing::info!("Seeded admin account {}", admin.email);
        Ok(true)
    }

    /// Inserts missing default links and rewrites drifted ones. Links that are
    /// not part of the defaults are never removed.
    pub async fn seed_links(&self) -> Result<(usize, usize)> {
        let mut created = 0;
        let mut updated = 0;

        for definition in default_portal_links() {
            match self.portal_link_repo.find_by_slug(definition.slug).await? {
                Some(existing) if definition.matches(&existing) => {}
                Some(existing) => {
                    self.portal_link_repo.update_content(existing.id, &definition).await?;
                    tracing::info!("Updated portal link {}", definition.slug);
                    updated += 1;
                }
                None => {
                    self.portal_link_repo.create(&definition).await?;
                    tracing::info!("Seeded portal link {}", definition.slug);
                    created += 1;
                }
            }
        }

        Ok((created, updated))
    }
}
