use chrono::Utc;
use derive_more::Display;
use serde::Serialize;
use uuid::Uuid;

/// Length of a store-native identifier in its hex form.
pub const OBJECT_ID_LEN: usize = 24;

/// Store-native document identifier.
///
/// Twelve bytes (4-byte big-endian UNIX seconds followed by 8 random bytes),
/// always held and surfaced as 24 lower-case hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let random = Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[8..]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// True when `raw` has the native shape: exactly 24 hex characters, any case.
    pub fn is_native_shape(raw: &str) -> bool {
        raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::is_native_shape(raw).then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}
