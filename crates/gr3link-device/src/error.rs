//! Connection and listing failures

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::transport::TransportError;

/// Why `connect()` fell back to demo mode. The display text is the message
/// shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectFailure {
    #[error("Connection Timeout: Check if connected to GR_XXXX WiFi.")]
    Timeout,
    #[error("Network Blocked: the connection to the camera was refused. Check that plain HTTP requests to the camera are allowed.")]
    Blocked { reason: String },
    #[error("Camera responded with HTTP {status}.")]
    HttpError { status: u16 },
}

impl ConnectFailure {
    /// Stable classification name
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectFailure::Timeout => "ConnectTimeout",
            ConnectFailure::Blocked { .. } => "ConnectBlocked",
            ConnectFailure::HttpError { .. } => "ConnectHttpError",
        }
    }

    /// User-facing message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Serialize for ConnectFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("ConnectFailure", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

/// A photo listing request that did not produce a listing
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Listing request timed out")]
    TimedOut,
    #[error("Device returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Malformed listing: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let all = [
            ConnectFailure::Timeout,
            ConnectFailure::Blocked {
                reason: "connection refused".to_string(),
            },
            ConnectFailure::HttpError { status: 500 },
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
                assert_ne!(a.kind(), b.kind());
            }
        }
        assert_eq!(all[2].message(), "Camera responded with HTTP 500.");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ConnectFailure::Timeout).unwrap();
        assert_eq!(json["kind"], "ConnectTimeout");
        assert!(json["message"].as_str().unwrap().starts_with("Connection Timeout"));
    }
}
