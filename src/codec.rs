//! Encoding of persisted state into a storage string.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::CodecError;

/// How state is encoded into its storage slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateCodec {
    /// Plain JSON, readable and compatible with the dashboard's own layout.
    #[default]
    Json,
    /// Compact bitcode bytes, base64-wrapped to fit a string slot.
    Bitcode,
}

impl StateCodec {
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        match self {
            StateCodec::Json => Ok(serde_json::to_string(value)?),
            StateCodec::Bitcode => {
                let bytes = bitcode::serialize(value)?;
                Ok(STANDARD.encode(bytes))
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError> {
        match self {
            StateCodec::Json => Ok(serde_json::from_str(raw)?),
            StateCodec::Bitcode => {
                let bytes = STANDARD.decode(raw.trim())?;
                Ok(bitcode::deserialize(&bytes)?)
            }
        }
    }
}
