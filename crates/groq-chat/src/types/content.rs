use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Content that can be sent in messages
/// Either a plain string or a list of typed parts (text, images, ...)
///
/// Deserialization never rejects a shape: anything that is neither a string
/// nor an array reads as an empty part list, and array items that are not a
/// recognizable part read as [`ContentPart::Unsupported`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Simple text content
    Text(String),

    /// Multipart content (text mixed with images)
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },

    /// Bare image reference (`{"type": "image", "url": ...}`)
    Image {
        url: String,
    },

    /// OpenAI-style image part
    ImageUrl {
        image_url: ImageUrl,
    },

    /// Any part kind or shape this crate does not model
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    High,
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::Parts(items.into_iter().map(ContentPart::from_value).collect()),
            _ => Self::Parts(Vec::new()),
        })
    }
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl ContentPart {
    /// Read one part leniently; text without a string payload is `""`
    pub fn from_value(value: Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("text") => Self::Text {
                text: value
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            Some("image") => match value.get("url").and_then(Value::as_str) {
                Some(url) => Self::image(url),
                None => Self::Unsupported,
            },
            Some("image_url") => match value.get("image_url") {
                Some(Value::String(url)) => Self::image_url(url.as_str()),
                Some(obj @ Value::Object(_)) => serde_json::from_value::<ImageUrl>(obj.clone())
                    .map(|image_url| Self::ImageUrl { image_url })
                    .unwrap_or(Self::Unsupported),
                _ => Self::Unsupported,
            },
            _ => Self::Unsupported,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

impl Content {
    /// Create text content
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get as plain text (if possible)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Parts(parts) => match parts.as_slice() {
                [ContentPart::Text { text }] => Some(text),
                _ => None,
            },
        }
    }

    /// Concatenation of every text part, in order. Non-text parts are skipped.
    pub fn joined_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Parts(_))
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for Content {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}
