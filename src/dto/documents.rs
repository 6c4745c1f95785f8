use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkUpdated {
    pub success: bool,
    pub updated_count: u64,
}
