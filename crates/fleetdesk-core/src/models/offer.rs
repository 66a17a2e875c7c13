use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, FilePart};

/// Largest accepted offer image.
pub const MAX_OFFER_IMAGE_BYTES: usize = 1024 * 1024;

/// A text shown in both app languages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Translated {
    pub en: String,
    pub ar: String,
}

/// Fields of a promotional offer. The image travels separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRequest {
    pub title: Translated,
    pub description: Translated,
    pub discount_text: Translated,
    pub button_text: Translated,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_limited_time: bool,
    #[serde(default)]
    pub display_order: Option<u32>,
    #[serde(default)]
    pub button_link: Option<String>,
}

fn default_active() -> bool {
    true
}

impl OfferRequest {
    /// Form fields in the shape the backend expects: flags as `1`/`0`,
    /// dates at midnight, translations as `field[lang]`.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("is_active".to_string(), flag(self.is_active)),
            ("start_date".to_string(), midnight(self.start_date)),
            ("end_date".to_string(), midnight(self.end_date)),
            ("is_limited_time".to_string(), flag(self.is_limited_time)),
        ];
        if let Some(order) = self.display_order {
            fields.push(("display_order".to_string(), order.to_string()));
        }
        if let Some(ref link) = self.button_link {
            if !link.trim().is_empty() {
                fields.push(("button_link".to_string(), link.trim().to_string()));
            }
        }
        for (name, text) in [
            ("title", &self.title),
            ("description", &self.description),
            ("discount_text", &self.discount_text),
            ("button_text", &self.button_text),
        ] {
            fields.push((format!("{}[en]", name), text.en.clone()));
            fields.push((format!("{}[ar]", name), text.ar.clone()));
        }
        fields
    }
}

fn flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_string()
}

fn midnight(date: NaiveDate) -> String {
    format!("{} 00:00:00", date.format("%Y-%m-%d"))
}

/// A JPEG or PNG banner for an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferImage {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl OfferImage {
    /// Accepts `.jpg`, `.jpeg` and `.png` files up to [`MAX_OFFER_IMAGE_BYTES`].
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => {
                return Err(ApiError::Validation(
                    "Only JPG and PNG images are allowed.".into(),
                ))
            }
        };
        if bytes.len() > MAX_OFFER_IMAGE_BYTES {
            return Err(ApiError::Validation(format!(
                "Image is {} bytes; the limit is {}.",
                bytes.len(),
                MAX_OFFER_IMAGE_BYTES
            )));
        }
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn mime(&self) -> &str {
        self.mime
    }

    pub(crate) fn into_part(self) -> FilePart {
        FilePart {
            field: "image".to_string(),
            file_name: self.file_name,
            mime: self.mime.to_string(),
            bytes: self.bytes,
        }
    }
}
