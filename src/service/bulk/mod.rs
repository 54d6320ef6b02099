//! Spreadsheet-driven creation and deletion of user accounts.
//!
//! The header row must satisfy a [`HeaderContract`] or the whole upload is
//! rejected. After that every data row is an independent unit of work: a row
//! that fails is recorded in the result and processing moves on.

pub mod contract;
pub mod spreadsheet;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{CreateUserRequest, Role, User},
    error::{AppError, Result},
    repository::UserRepository,
};

pub use contract::{ColumnMap, HeaderContract, UserField, CREATE_CONTRACT, DELETE_CONTRACT};
pub use spreadsheet::{ensure_xlsx_filename, template_xlsx, Sheet, XLSX_CONTENT_TYPE};

pub const MISSING_FIELDS: &str = "missing or invalid fields";
pub const DUPLICATE_IN_FILE: &str = "duplicate email in file";
pub const ALREADY_REGISTERED: &str = "email already registered";
pub const CREATE_FAILED: &str = "error creating user";
pub const USER_NOT_FOUND: &str = "user not found";
pub const CANNOT_DELETE_SELF: &str = "cannot delete self";
pub const DELETE_FAILED: &str = "error deleting user";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BulkUserResult {
    pub processed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u32>,
    pub skipped: u32,
    pub errors: Vec<RowError>,
}

impl BulkUserResult {
    fn for_create() -> Self {
        Self { created: Some(0), ..Default::default() }
    }

    fn for_delete() -> Self {
        Self { deleted: Some(0), ..Default::default() }
    }

    fn skip(&mut self, row: usize, message: &str) {
        self.skipped += 1;
        self.errors.push(RowError { row, message: message.to_string() });
    }
}

/// Which template to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Create,
    Delete,
}

impl BulkOperation {
    pub fn contract(&self) -> &'static HeaderContract {
        match self {
            BulkOperation::Create => &CREATE_CONTRACT,
            BulkOperation::Delete => &DELETE_CONTRACT,
        }
    }

    pub fn template_filename(&self) -> &'static str {
        match self {
            BulkOperation::Create => "modelo-usuarios-criacao.xlsx",
            BulkOperation::Delete => "modelo-usuarios-exclusao.xlsx",
        }
    }

    pub fn template(&self) -> Result<Vec<u8>> {
        template_xlsx(self.contract().template_headers)
    }
}

pub struct BulkUserService {
    user_repo: Arc<dyn UserRepository>,
}

impl BulkUserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn bulk_create(&self, sheet: &Sheet) -> Result<BulkUserResult> {
        let columns = resolve_columns(&CREATE_CONTRACT, sheet)?;
        let mut result = BulkUserResult::for_create();
        let mut seen_emails = HashSet::new();

        for (row, cells) in sheet.data_rows() {
            let name = columns.value(cells, UserField::Name);
            let email = columns.value(cells, UserField::Email);
            let password = columns.value(cells, UserField::Password);
            let role_text = columns.value(cells, UserField::Role);

            if [&name, &email, &password, &role_text].iter().all(|v| v.is_empty()) {
                continue;
            }

            result.processed += 1;

            let email = email.to_lowercase();
            let role = Role::from_alias(&role_text);

            let role = match role {
                Some(role) if !name.is_empty() && !email.is_empty() && !password.is_empty() => role,
                _ => {
                    result.skip(row, MISSING_FIELDS);
                    continue;
                }
            };

            if !seen_emails.insert(email.clone()) {
                result.skip(row, DUPLICATE_IN_FILE);
                continue;
            }

            match self.user_repo.find_by_email(&email).await {
                Ok(Some(_)) => {
                    result.skip(row, ALREADY_REGISTERED);
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Row {}: looking up {} failed: {}", row, email, e);
                    result.skip(row, CREATE_FAILED);
                    continue;
                }
            }

            let request = CreateUserRequest { name, email, password, role };
            match self.user_repo.create(request).await {
                Ok(user) => {
                    tracing::debug!("Row {}: created user {}", row, user.id);
                    if let Some(created) = result.created.as_mut() {
                        *created += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Row {}: creating user failed: {}", row, e);
                    result.skip(row, CREATE_FAILED);
                }
            }
        }

        tracing::info!(
            "Bulk create finished: processed={} created={} skipped={}",
            result.processed,
            result.created.unwrap_or(0),
            result.skipped
        );

        Ok(result)
    }

    pub async fn bulk_delete(&self, sheet: &Sheet, acting: &User) -> Result<BulkUserResult> {
        let columns = resolve_columns(&DELETE_CONTRACT, sheet)?;
        let mut result = BulkUserResult::for_delete();

        for (row, cells) in sheet.data_rows() {
            let email = columns.value(cells, UserField::Email).to_lowercase();
            if email.is_empty() {
                continue;
            }

            result.processed += 1;

            let user = match self.user_repo.find_by_email(&email).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    result.skip(row, USER_NOT_FOUND);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Row {}: looking up {} failed: {}", row, email, e);
                    result.skip(row, DELETE_FAILED);
                    continue;
                }
            };

            if user.id == acting.id {
                result.skip(row, CANNOT_DELETE_SELF);
                continue;
            }

            match self.user_repo.delete(user.id).await {
                Ok(()) => {
                    tracing::debug!("Row {}: deleted user {}", row, user.id);
                    if let Some(deleted) = result.deleted.as_mut() {
                        *deleted += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Row {}: deleting user {} failed: {}", row, user.id, e);
                    result.skip(row, DELETE_FAILED);
                }
            }
        }

        tracing::info!(
            "Bulk delete by {} finished: processed={} deleted={} skipped={}",
            acting.email,
            result.processed,
            result.deleted.unwrap_or(0),
            result.skipped
        );

        Ok(result)
    }
}

fn resolve_columns(contract: &HeaderContract, sheet: &Sheet) -> Result<ColumnMap> {
    let header = sheet
        .header()
        .ok_or_else(|| AppError::InvalidFile("header row not found".to_string()))?;

    ColumnMap::resolve(contract, header)
}
