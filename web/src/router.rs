use crate::{
    controller::{
        chat_controller, health_check_controller, log_controller, message_controller,
        setting_controller, user_controller, user_session_controller,
    },
    sse, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(chat_routes(app_state.clone()))
        .merge(health_routes())
        .merge(log_routes(app_state.clone()))
        .merge(message_routes(app_state.clone()))
        .merge(setting_routes(app_state.clone()))
        .merge(sse_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(user_session_routes(app_state))
}

fn chat_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chats",
            get(chat_controller::index).post(chat_controller::create),
        )
        .route(
            "/api/chats/:id",
            get(chat_controller::read)
                .patch(chat_controller::update)
                .delete(chat_controller::delete),
        )
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn log_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/logs", get(log_controller::index))
        .route("/api/logs/submit", post(log_controller::submit))
        .with_state(app_state)
}

fn message_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/chats/new_message", post(message_controller::create))
        .route(
            "/api/chats/messages/:chat_id",
            get(message_controller::index),
        )
        .with_state(app_state)
}

fn setting_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/settings/whatsapp_qr",
            get(setting_controller::read_whatsapp_qr)
                .post(setting_controller::save_whatsapp_qr),
        )
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chats/stream_messages",
            get(sse::handler::messages_stream),
        )
        .route("/api/logs/stream", get(sse::handler::logs_stream))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(user_controller::index)
                .post(user_controller::create)
                .delete(user_controller::delete),
        )
        .route(
            "/api/users/:id",
            get(user_controller::read).patch(user_controller::update),
        )
        .with_state(app_state)
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/users/auth", post(user_session_controller::login))
        .with_state(app_state)
}
