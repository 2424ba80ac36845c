use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PermissionId;

/// Field name -> error message. An empty map means the form is valid. Every
/// validation pass replaces the previous map wholesale.
pub type ValidationErrors = BTreeMap<String, String>;

/// A permission record as the server owns it. The client keeps a read-only
/// cached copy for the list view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub resource: String,
    pub description: String,
    pub method: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for create (POST) and update (PUT) of a permission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionBody {
    pub resource: String,
    pub description: String,
    pub method: String,
    pub path: String,
}

/// One page of the permission list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionPage {
    pub items: Vec<PermissionRecord>,
    pub total: u64,
    pub page: i64,
    pub limit: i64,
}

/// Response body of create/update. Only the `error` key is load-bearing on
/// the client: when present it carries server-side validation errors, and
/// the record payload (if any) is ignored in favor of the list refresh.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveOutcome {
    #[serde(default)]
    pub error: Option<ValidationErrors>,
}
