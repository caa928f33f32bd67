//! Displayable image references and saving them to disk.

use crate::error::{Result, StudioError};
use crate::image::types::ImageFormat;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A reference to an image: either a `data:` URI or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageResource(String);

impl ImageResource {
    /// Wraps an existing URI without inspecting it.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Builds a data URI from an inline base64 payload.
    ///
    /// Returns `None` for an empty payload. A blank MIME type becomes `image/png`.
    pub fn from_inline(mime_type: &str, base64_data: &str) -> Option<Self> {
        let data = base64_data.trim();
        if data.is_empty() {
            return None;
        }
        let mime = match mime_type.trim() {
            "" => ImageFormat::Png.mime_type(),
            m => m,
        };
        Some(Self(format!("data:{mime};base64,{data}")))
    }

    /// The URI as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is an inline `data:` URI.
    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Format declared by a data URI's MIME type, if any.
    pub fn declared_format(&self) -> Option<ImageFormat> {
        let rest = self.0.strip_prefix("data:")?;
        let mime = rest.split([';', ',']).next()?;
        ImageFormat::from_mime_type(mime)
    }

    /// Decodes an inline data URI into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if !self.is_data_uri() {
            return Err(StudioError::Decode(
                "not a data URI; fetch remote images with save_to".into(),
            ));
        }
        decode_base64_lenient(&self.0).map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Best-effort file extension for this image.
    pub fn extension(&self) -> &'static str {
        if let Some(format) = self.declared_format() {
            return format.extension();
        }
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.rsplit_once('.')
            .and_then(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
                "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
                "webp" => Some(ImageFormat::WebP),
                "png" => Some(ImageFormat::Png),
                _ => None,
            })
            .unwrap_or_default()
            .extension()
    }

    /// Writes the image to `path`, fetching it first when it is a remote URL.
    ///
    /// Returns the number of bytes written.
    pub async fn save_to(&self, client: &reqwest::Client, path: impl AsRef<Path>) -> Result<usize> {
        let data = if self.is_data_uri() {
            self.decode()?
        } else {
            tracing::debug!(url = %self.0, "downloading remote image");
            let response = client.get(&self.0).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(StudioError::Api {
                    status: status.as_u16(),
                    message: format!("image download failed: {}", self.0),
                });
            }
            response.bytes().await?.to_vec()
        };

        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &data).await?;
        Ok(data.len())
    }
}

impl std::fmt::Display for ImageResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decodes base64 that may carry a data URI prefix, whitespace or missing padding.
fn decode_base64_lenient(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let b64 = match input.find(";base64,") {
        Some(pos) => &input[pos + 8..],
        None => input,
    };

    let cleaned: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned)
}
