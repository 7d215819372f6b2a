use crate::{Id, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "logs";

pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_SOURCE: &str = "app";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub message: String,
    pub level: String,
    pub source: String,
    pub timestamp: Timestamp,
}
