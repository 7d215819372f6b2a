pub(crate) mod chat_controller;
pub(crate) mod health_check_controller;
pub(crate) mod log_controller;
pub(crate) mod message_controller;
pub(crate) mod setting_controller;
pub(crate) mod user_controller;
pub(crate) mod user_session_controller;
