//! GR3 Link Device - HTTP client for the camera
//!
//! This crate talks to the camera over its same-subnet HTTP API:
//! - Bounded-time connection probe with classified failures
//! - Transparent fallback to a simulated gallery when the camera is unreachable
//! - Two-step photo listing (directories, then files of the first directory)

pub mod client;
pub mod error;
pub mod mock;
pub mod transport;

pub use client::{
    ConnectOutcome, ConnectionState, DeviceClient, DeviceConfig, FailureNotifier,
    CONNECT_TIMEOUT_MS, DEFAULT_BASE_URL,
};
pub use error::{ConnectFailure, ListingError};
pub use mock::{MockGallery, MOCK_PHOTO_COUNT};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
