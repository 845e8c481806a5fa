//! Image references: remote URL or embedded data URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const DATA_PREFIX: &str = "data:";
const BASE64_SUFFIX: &str = ";base64";

/// Image held locally as a data URL payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub mime: String,
    pub payload: String,
    /// False for percent-encoded payloads (`data:image/svg+xml,%3Csvg...`)
    pub base64: bool,
}

impl EmbeddedImage {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_string(),
            payload: STANDARD.encode(bytes),
            base64: true,
        }
    }

    /// Parses any `data:` reference. Payload validity is checked on decode.
    pub fn parse(data_url: &str) -> Option<Self> {
        let rest = data_url.strip_prefix(DATA_PREFIX)?;
        let (meta, payload) = rest.split_once(',').unwrap_or((rest, ""));
        let (mime, base64) = match meta.strip_suffix(BASE64_SUFFIX) {
            Some(mime) => (mime, true),
            None => (meta, false),
        };
        Some(Self {
            mime: mime.to_string(),
            payload: payload.to_string(),
            base64,
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.base64 {
            STANDARD.decode(self.payload.as_bytes())
        } else {
            Ok(urlencoding::decode_binary(self.payload.as_bytes()).into_owned())
        }
    }

    /// Byte size implied by the payload length
    pub fn estimated_size(&self) -> u64 {
        if self.base64 {
            self.payload.len() as u64 * 3 / 4
        } else {
            urlencoding::decode_binary(self.payload.as_bytes()).len() as u64
        }
    }

    pub fn to_data_url(&self) -> String {
        let marker = if self.base64 { BASE64_SUFFIX } else { "" };
        format!("{}{}{},{}", DATA_PREFIX, self.mime, marker, self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    Embedded(EmbeddedImage),
}

impl ImageSource {
    /// Anything that is not a `data:` URL is treated as remote.
    pub fn parse(reference: &str) -> Self {
        match EmbeddedImage::parse(reference) {
            Some(embedded) => Self::Embedded(embedded),
            None => Self::Remote(reference.to_string()),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Embedded(embedded) => f.write_str(&embedded.to_data_url()),
        }
    }
}

impl Serialize for ImageSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let reference = String::deserialize(deserializer)?;
        Ok(Self::parse(&reference))
    }
}
