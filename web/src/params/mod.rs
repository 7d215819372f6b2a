//! Typed query-string parameters for endpoints that take them.
//!
//! Every field is optional so that a missing parameter reaches the domain
//! layer and is reported with its specific message, instead of being rejected
//! by the extractor with a generic one.

pub(crate) mod chat;
pub(crate) mod user;
