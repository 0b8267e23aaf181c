use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Content of a virtual file: either text or an opaque byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    /// Length in bytes
    pub fn len(&self) -> u64 {
        match self {
            FileContent::Text(text) => text.len() as u64,
            FileContent::Bytes(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Bytes(bytes) => bytes,
        }
    }

    /// Decode as UTF-8, replacing invalid sequences
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        match self {
            FileContent::Text(text) => Cow::Borrowed(text),
            FileContent::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        FileContent::Text(text)
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        FileContent::Text(text.to_string())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        FileContent::Bytes(bytes)
    }
}

impl From<&[u8]> for FileContent {
    fn from(bytes: &[u8]) -> Self {
        FileContent::Bytes(bytes.to_vec())
    }
}
