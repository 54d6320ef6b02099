use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deserialize_some;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub link_url: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub description: String,
    pub link_url: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePartnerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub logo_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}
