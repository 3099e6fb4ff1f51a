//! Data-channel message framing.
//!
//! Every message is a JSON object tagged by `"type"`. Control messages only
//! update notification state; payload messages carry a dataset for import.

use scout_core::{DataType, TransferFilters};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One data-channel message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessage {
    /// Ask the peer for a dataset, filtered on their side.
    #[serde(rename = "request", rename_all = "camelCase")]
    Request {
        data_type: DataType,
        #[serde(default)]
        filters: TransferFilters,
        request_id: String,
    },

    /// Offer a dataset the peer did not ask for.
    #[serde(rename = "push", rename_all = "camelCase")]
    Push { data_type: DataType, data: Value },

    /// A request was refused.
    #[serde(rename = "declined", rename_all = "camelCase")]
    Declined { request_id: String },

    /// A push was refused.
    #[serde(rename = "push-declined")]
    PushDeclined,

    /// A push was accepted and imported.
    #[serde(rename = "pushed", rename_all = "camelCase")]
    Pushed { data_type: DataType },

    #[serde(rename = "scouting")]
    Scouting { data: Value },

    #[serde(rename = "pit-scouting")]
    PitScouting { data: Value },

    #[serde(rename = "match")]
    Match { data: Value },

    #[serde(rename = "scout")]
    Scout { data: Value },

    #[serde(rename = "combined")]
    Combined { data: Value },
}

/// Control or payload, as far as routing is concerned.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageClass<'a> {
    Control,
    Request,
    Payload { data_type: DataType, data: &'a Value },
}

impl WireMessage {
    /// Payload message for `data_type`.
    #[must_use]
    pub fn payload(data_type: DataType, data: Value) -> Self {
        match data_type {
            DataType::Scouting => Self::Scouting { data },
            DataType::PitScouting => Self::PitScouting { data },
            DataType::Match => Self::Match { data },
            DataType::Scout => Self::Scout { data },
            DataType::Combined => Self::Combined { data },
        }
    }

    /// Routing class. Pushes are payloads: they carry data for import.
    #[must_use]
    pub const fn class(&self) -> MessageClass<'_> {
        match self {
            Self::Declined { .. } | Self::PushDeclined | Self::Pushed { .. } => {
                MessageClass::Control
            }
            Self::Request { .. } => MessageClass::Request,
            Self::Push { data_type, data } => MessageClass::Payload {
                data_type: *data_type,
                data,
            },
            Self::Scouting { data } => MessageClass::Payload {
                data_type: DataType::Scouting,
                data,
            },
            Self::PitScouting { data } => MessageClass::Payload {
                data_type: DataType::PitScouting,
                data,
            },
            Self::Match { data } => MessageClass::Payload {
                data_type: DataType::Match,
                data,
            },
            Self::Scout { data } => MessageClass::Payload {
                data_type: DataType::Scout,
                data,
            },
            Self::Combined { data } => MessageClass::Payload {
                data_type: DataType::Combined,
                data,
            },
        }
    }

    /// Serialize for the data channel.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a data-channel message.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
