use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::{AppState, Error};
use domain::setting::{self as SettingApi, NewWhatsappQr};
use log::*;

/// POST the current WhatsApp login QR code (sent by the WhatsApp bridge)
pub async fn save_whatsapp_qr(
    State(app_state): State<AppState>,
    Json(params): Json<NewWhatsappQr>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST WhatsApp QR code");

    SettingApi::save_whatsapp_qr(&app_state.users_db(), params).await?;

    Ok(Json(json!({
        "success": true,
        "message": "WhatsApp QR code saved successfully",
    })))
}

/// GET the last WhatsApp login QR code for the settings panel
pub async fn read_whatsapp_qr(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET WhatsApp QR code");

    let qr = SettingApi::find_whatsapp_qr(&app_state.users_db()).await?;

    Ok(Json(json!({ "success": true, "data": qr })))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support::app_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_save_whatsapp_qr_requires_qr_code() {
        let app = define_routes(app_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/settings/whatsapp_qr")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "qr_code": "" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "QR code is required" }));
    }
}
