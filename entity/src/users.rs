use crate::{Id, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "users";

/// A dashboard account. `password` holds a bcrypt hash and must never leave
/// the domain layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
