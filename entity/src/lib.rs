//! Document shapes stored in MongoDB.
//!
//! Each module mirrors one collection: a `Model` struct that round-trips through
//! BSON and a `COLLECTION` constant naming where it lives.
pub mod chats;
pub mod logs;
pub mod messages;
pub mod settings;
pub mod users;

/// A type alias that represents any document's `_id` field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = bson::oid::ObjectId;

/// Timestamp type as persisted by the driver.
pub type Timestamp = bson::DateTime;
