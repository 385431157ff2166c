//! Extracting image bytes from upload requests
//!
//! Uploads arrive either as `multipart/form-data` (a file part, or a text
//! part holding a data URI) or as an urlencoded form whose `image` value is
//! a data URI / bare base64 string.

use crate::error::AppError;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

/// Form fields that may carry the image
pub const IMAGE_FIELDS: [&str; 2] = ["image", "file"];

#[derive(Debug, Deserialize)]
struct UploadForm {
    image: Option<String>,
    file: Option<String>,
}

/// Image type guessed from magic bytes. Used for headers and file names
/// only; unknown content is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
    pub mime: &'static str,
    pub extension: &'static str,
}

impl ImageFormat {
    const UNKNOWN: Self = Self {
        mime: "application/octet-stream",
        extension: "bin",
    };
}

pub fn sniff_format(bytes: &[u8]) -> ImageFormat {
    let (mime, extension) = if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        ("image/png", "png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ("image/jpeg", "jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        ("image/gif", "gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        ("image/webp", "webp")
    } else if bytes.starts_with(b"BM") {
        ("image/bmp", "bmp")
    } else {
        return ImageFormat::UNKNOWN;
    };
    ImageFormat { mime, extension }
}

/// Decode `data:image/png;base64,....` or a bare base64 string
pub fn decode_data_uri(value: &str) -> Result<Vec<u8>, AppError> {
    let payload = match value.split_once("base64,") {
        Some((_, rest)) => rest,
        None => value,
    };

    // urlencoded bodies turn unescaped '+' into ' '
    let payload: String = payload
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();

    if payload.is_empty() {
        return Err(AppError::BadRequest("No image data".into()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid image data: {e}")))
}

/// Read the image out of an upload request, whatever its form encoding
pub async fn read_upload(request: Request) -> Result<Bytes, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<UploadForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let value = form
            .image
            .or(form.file)
            .ok_or_else(|| AppError::BadRequest("No image data".into()))?;
        decode_data_uri(&value).map(Bytes::from)
    } else {
        Err(AppError::BadRequest(
            "Expected multipart/form-data or application/x-www-form-urlencoded".into(),
        ))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to parse form: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !IMAGE_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e.body_text())))?;

        debug!(field = %name, is_file, size = data.len(), "Read upload field");

        if is_file {
            return Ok(data);
        }
        return match std::str::from_utf8(&data) {
            Ok(text) => decode_data_uri(text).map(Bytes::from),
            // a text part with binary content is taken as-is
            Err(_) => Ok(data),
        };
    }

    Err(AppError::BadRequest("No image file".into()))
}
