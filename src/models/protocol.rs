//! Live update wire protocol. Server to client only, JSON text frames.

use serde::{Deserialize, Deserializer, Serialize};

use super::seat::SeatStatus;
use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once per connection, informational.
    Connected { message: String },
    /// The only message that changes state.
    #[serde(rename_all = "camelCase")]
    SeatUpdate {
        seat_id: String,
        status: SeatStatus,
        /// Milliseconds since the epoch.
        #[serde(deserialize_with = "millis")]
        timestamp: i64,
    },
}

/// Any JSON number is a valid timestamp; fractional milliseconds are dropped.
fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
    }
    Ok(match Millis::deserialize(deserializer)? {
        Millis::Int(ms) => ms,
        Millis::Float(ms) => ms as i64,
    })
}

impl ServerMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
