use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// Last time the systems of a product were synchronized for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSynchronizationTimestamp {
    pub id: Id,
    pub tenant_id: String,
    pub product_id: String,
    pub last_sync_timestamp: DateTime<Utc>,
}
