//! The WhatsApp login QR code, relayed from the bridge to the settings panel.
use crate::error::Error;
use entity::settings::WHATSAPP_QR;
use entity::Timestamp;
use entity_api::setting as setting_api;
use log::*;
use mongodb::Database;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewWhatsappQr {
    pub qr_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WhatsappQr {
    pub qr_code: String,
}

impl NewWhatsappQr {
    fn into_qr_code(self) -> Result<String, Error> {
        self.qr_code
            .filter(|qr_code| !qr_code.is_empty())
            .ok_or_else(|| Error::invalid("QR code is required"))
    }
}

/// Replaces the stored QR code; the bridge posts a new one whenever it rotates.
pub async fn save_whatsapp_qr(db: &Database, params: NewWhatsappQr) -> Result<(), Error> {
    let qr_code = params.into_qr_code()?;

    setting_api::upsert_value(db, WHATSAPP_QR, &qr_code, Timestamp::now()).await?;
    info!("Saved WhatsApp QR code");

    Ok(())
}

pub async fn find_whatsapp_qr(db: &Database) -> Result<WhatsappQr, Error> {
    setting_api::find_by_type(db, WHATSAPP_QR)
        .await?
        .and_then(|setting| setting.value)
        .map(|qr_code| WhatsappQr { qr_code })
        .ok_or_else(|| Error::not_found("WhatsApp QR code not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};

    #[test]
    fn test_qr_code_is_required() {
        for params in [
            NewWhatsappQr::default(),
            NewWhatsappQr {
                qr_code: Some(String::new()),
            },
        ] {
            assert_eq!(
                params.into_qr_code().unwrap_err().error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid(
                    "QR code is required".to_string()
                )))
            );
        }
    }

    #[test]
    fn test_qr_code_is_passed_through_untouched() {
        let params = NewWhatsappQr {
            qr_code: Some("2@AbC+dEf/123==,xyz".to_string()),
        };
        assert_eq!(params.into_qr_code().unwrap(), "2@AbC+dEf/123==,xyz");
    }
}
