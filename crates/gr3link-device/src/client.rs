//! Camera client: connection lifecycle, photo listing, demo fallback

use gr3link_core::Photo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{ConnectFailure, ListingError};
use crate::mock::MockGallery;
use crate::transport::{Transport, TransportError};

/// Camera address when joined to its Wi-Fi network
pub const DEFAULT_BASE_URL: &str = "http://192.168.0.1/v1";

/// Budget for the connection probe
pub const CONNECT_TIMEOUT_MS: u64 = 3000;

/// Client configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Base URL including the API prefix, e.g. "http://192.168.0.1/v1"
    pub base_url: String,
    /// Path under the base URL probed by `connect()`
    pub status_path: String,
    pub connect_timeout: Duration,
    /// Budget for each photo listing request
    pub listing_timeout: Duration,
    /// Value of the `size` query parameter on thumbnail URLs
    pub thumbnail_size: String,
    /// Skip the probe and go straight to demo mode
    pub force_mock: bool,
    /// Simulated round trip for demo photo listings
    pub mock_latency: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            status_path: "photos".to_string(),
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS),
            listing_timeout: Duration::from_secs(10),
            thumbnail_size: "thumb".to_string(),
            force_mock: false,
            mock_latency: Duration::from_millis(200),
        }
    }
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Demo mode: photos come from [`MockGallery`]
    Mock,
}

/// Result of a `connect()` call, which always leaves a usable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectOutcome {
    pub state: ConnectionState,
    /// Set when the probe failed and the client fell back to demo mode
    pub failure: Option<ConnectFailure>,
}

/// Receives connection failures as they happen, once per attempt
pub trait FailureNotifier: Send + Sync {
    fn notify(&self, failure: &ConnectFailure);
}

// Device listing responses

#[derive(Deserialize)]
struct DirListing {
    #[serde(default)]
    dirs: Vec<DirEntry>,
}

#[derive(Deserialize)]
struct DirEntry {
    name: String,
}

#[derive(Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<String>,
}

/// Client for the camera's HTTP API
pub struct DeviceClient<T> {
    transport: T,
    config: DeviceConfig,
    mock: MockGallery,
    state: RwLock<ConnectionState>,
    last_failure: RwLock<Option<ConnectFailure>>,
    /// Serializes connection attempts
    connect_lock: Mutex<()>,
    notifier: Option<Arc<dyn FailureNotifier>>,
}

impl<T: Transport> DeviceClient<T> {
    pub fn new(transport: T, config: DeviceConfig) -> Self {
        let mock = MockGallery::new(config.mock_latency);
        Self {
            transport,
            config,
            mock,
            state: RwLock::new(ConnectionState::Disconnected),
            last_failure: RwLock::new(None),
            connect_lock: Mutex::new(()),
            notifier: None,
        }
    }

    /// Report connection failures to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Failure from the most recent attempt, if it fell back
    pub async fn last_failure(&self) -> Option<ConnectFailure> {
        self.last_failure.read().await.clone()
    }

    /// Absolute URL for a path under the API base
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Probe the camera and settle in `Connected` or, on any failure, `Mock`.
    ///
    /// A failure is classified, logged, passed to the notifier and recorded,
    /// then absorbed: the call itself always succeeds.
    pub async fn connect(&self) -> ConnectOutcome {
        let _attempt = self.connect_lock.lock().await;
        self.set_state(ConnectionState::Connecting).await;

        if self.config.force_mock {
            info!("Demo mode forced by configuration");
            *self.last_failure.write().await = None;
            self.set_state(ConnectionState::Mock).await;
            return ConnectOutcome {
                state: ConnectionState::Mock,
                failure: None,
            };
        }

        match self.probe().await {
            Ok(()) => {
                info!(base = %self.config.base_url, "Connected to camera");
                *self.last_failure.write().await = None;
                self.set_state(ConnectionState::Connected).await;
                ConnectOutcome {
                    state: ConnectionState::Connected,
                    failure: None,
                }
            }
            Err(failure) => self.fall_back(failure).await,
        }
    }

    /// One bounded request against the status endpoint. When the budget
    /// elapses first the request future is dropped, so a late response can
    /// never be observed.
    async fn probe(&self) -> Result<(), ConnectFailure> {
        let url = self.url(&self.config.status_path);
        debug!(url = %url, budget_ms = self.config.connect_timeout.as_millis() as u64, "Probing camera");

        match timeout(self.config.connect_timeout, self.transport.get(&url)).await {
            Err(_elapsed) => Err(ConnectFailure::Timeout),
            Ok(Err(TransportError::TimedOut)) => Err(ConnectFailure::Timeout),
            Ok(Err(TransportError::Refused(reason))) => Err(ConnectFailure::Blocked { reason }),
            Ok(Ok(response)) if response.is_success() => Ok(()),
            Ok(Ok(response)) => Err(ConnectFailure::HttpError {
                status: response.status,
            }),
        }
    }

    async fn fall_back(&self, failure: ConnectFailure) -> ConnectOutcome {
        match &failure {
            ConnectFailure::Blocked { reason } => warn!(
                kind = failure.kind(),
                reason = %reason,
                "Camera connection failed, switching to demo mode"
            ),
            _ => warn!(
                kind = failure.kind(),
                error = %failure,
                "Camera connection failed, switching to demo mode"
            ),
        }

        if let Some(notifier) = &self.notifier {
            notifier.notify(&failure);
        }
        *self.last_failure.write().await = Some(failure.clone());
        self.set_state(ConnectionState::Mock).await;

        ConnectOutcome {
            state: ConnectionState::Mock,
            failure: Some(failure),
        }
    }

    async fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write().await;
        if *state != next {
            debug!(from = ?*state, to = ?next, "Connection state changed");
        }
        *state = next;
    }

    /// Photos for the current state. Listing failures are logged and yield
    /// an empty list; they never reach the caller or the notifier.
    pub async fn get_photos(&self) -> Vec<Photo> {
        match self.state().await {
            ConnectionState::Mock => self.mock.photos().await,
            ConnectionState::Connected => match self.list_photos().await {
                Ok(photos) => {
                    debug!(count = photos.len(), "Listed camera photos");
                    photos
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch photos");
                    Vec::new()
                }
            },
            state => {
                debug!(state = ?state, "Not connected, no photos to list");
                Vec::new()
            }
        }
    }

    /// List directories, then the files of the first one
    async fn list_photos(&self) -> Result<Vec<Photo>, ListingError> {
        let listing: DirListing = self.fetch_json(&self.url("photos")).await?;
        let Some(dir) = listing.dirs.first() else {
            debug!("Camera has no photo directories");
            return Ok(Vec::new());
        };

        let files: FileListing = self
            .fetch_json(&self.url(&format!("photos/{}", dir.name)))
            .await?;

        Ok(files
            .files
            .into_iter()
            .map(|file| self.photo(&dir.name, file))
            .collect())
    }

    async fn fetch_json<D: DeserializeOwned>(&self, url: &str) -> Result<D, ListingError> {
        let response = timeout(self.config.listing_timeout, self.transport.get(url))
            .await
            .map_err(|_| ListingError::TimedOut)??;

        if !response.is_success() {
            return Err(ListingError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.json()?)
    }

    fn photo(&self, dir: &str, file: String) -> Photo {
        let url = self.url(&format!("photos/{}/{}", dir, file));
        let thumbnail = format!("{}?size={}", url, self.config.thumbnail_size);
        Photo {
            name: file,
            url,
            thumbnail,
            date: None,
            params: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "http://camera.test/v1";

    #[derive(Clone)]
    enum Reply {
        Status(u16, &'static str),
        Fail(TransportError),
    }

    /// Scripted transport; unknown URLs answer 404
    #[derive(Default)]
    struct FakeTransport {
        routes: HashMap<String, Reply>,
        delay: Duration,
        /// Refuse every request after this many
        drop_after: Option<usize>,
        requests: std::sync::Mutex<Vec<String>>,
        completed: AtomicUsize,
    }

    impl FakeTransport {
        fn route(mut self, path: &str, reply: Reply) -> Self {
            self.routes.insert(format!("{}/{}", BASE, path), reply);
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn dropping_after(mut self, requests: usize) -> Self {
            self.drop_after = Some(requests);
            self
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            let served = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(url.to_string());
                requests.len() - 1
            };
            if self.drop_after.is_some_and(|n| served >= n) {
                return Err(TransportError::Refused("reset by peer".to_string()));
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.completed.fetch_add(1, Ordering::SeqCst);
            match self.routes.get(url) {
                Some(Reply::Status(status, body)) => Ok(HttpResponse::new(*status, *body)),
                Some(Reply::Fail(e)) => Err(e.clone()),
                None => Ok(HttpResponse::new(404, "")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: std::sync::Mutex<Vec<ConnectFailure>>,
    }

    impl FailureNotifier for RecordingNotifier {
        fn notify(&self, failure: &ConnectFailure) {
            self.seen.lock().unwrap().push(failure.clone());
        }
    }

    fn config() -> DeviceConfig {
        DeviceConfig {
            base_url: BASE.to_string(),
            ..DeviceConfig::default()
        }
    }

    fn client(transport: FakeTransport) -> DeviceClient<FakeTransport> {
        DeviceClient::new(transport, config())
    }

    const DIRS: &str = r#"{"dirs":[{"name":"100RICOH"},{"name":"101RICOH"}]}"#;
    const FILES: &str = r#"{"files":["R0000001.JPG","R0000002.DNG"]}"#;

    fn camera() -> FakeTransport {
        FakeTransport::default()
            .route("photos", Reply::Status(200, DIRS))
            .route("photos/100RICOH", Reply::Status(200, FILES))
    }

    #[tokio::test]
    async fn test_initial_state() {
        let client = client(camera());
        assert_eq!(client.state().await, ConnectionState::Disconnected);
        assert!(client.get_photos().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_success() {
        let client = client(camera());
        let outcome = client.connect().await;
        assert_eq!(outcome.state, ConnectionState::Connected);
        assert_eq!(outcome.failure, None);
        assert_eq!(client.state().await, ConnectionState::Connected);
        assert_eq!(
            client.transport.requests.lock().unwrap().as_slice(),
            [format!("{}/photos", BASE)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_falls_back_to_mock() {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = DeviceClient::new(camera().delayed(Duration::from_secs(10)), config())
            .with_notifier(notifier.clone());

        let outcome = client.connect().await;
        assert_eq!(outcome.state, ConnectionState::Mock);
        assert_eq!(outcome.failure, Some(ConnectFailure::Timeout));
        assert_eq!(client.state().await, ConnectionState::Mock);
        assert_eq!(client.last_failure().await, Some(ConnectFailure::Timeout));
        assert_eq!(notifier.seen.lock().unwrap().as_slice(), [ConnectFailure::Timeout]);

        // The abandoned probe never completes, even long after the budget
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(client.transport.completed.load(Ordering::SeqCst), 0);
        assert_eq!(client.state().await, ConnectionState::Mock);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_within_budget_connects() {
        let client = client(camera().delayed(Duration::from_millis(2500)));
        assert_eq!(client.connect().await.state, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_blocked() {
        let refused = Reply::Fail(TransportError::Refused("connection refused".to_string()));
        let client = client(FakeTransport::default().route("photos", refused));
        let outcome = client.connect().await;
        assert_eq!(outcome.state, ConnectionState::Mock);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.kind(), "ConnectBlocked");
        assert!(failure.message().starts_with("Network Blocked"));
    }

    #[tokio::test]
    async fn test_transport_timeout_is_timeout() {
        let transport = FakeTransport::default().route("photos", Reply::Fail(TransportError::TimedOut));
        let client = client(transport);
        assert_eq!(client.connect().await.failure, Some(ConnectFailure::Timeout));
    }

    #[tokio::test]
    async fn test_connect_http_error() {
        let client = client(FakeTransport::default().route("photos", Reply::Status(503, "")));
        let outcome = client.connect().await;
        assert_eq!(outcome.state, ConnectionState::Mock);
        assert_eq!(outcome.failure, Some(ConnectFailure::HttpError { status: 503 }));
    }

    #[tokio::test]
    async fn test_one_notification_per_attempt() {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = DeviceClient::new(FakeTransport::default(), config()).with_notifier(notifier.clone());
        client.connect().await;
        client.connect().await;
        assert_eq!(notifier.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reconnect_clears_failure() {
        let client = client(camera());
        // As left by an earlier failed attempt
        *client.last_failure.write().await = Some(ConnectFailure::Timeout);
        *client.state.write().await = ConnectionState::Mock;

        let outcome = client.connect().await;
        assert_eq!(outcome.state, ConnectionState::Connected);
        assert_eq!(client.last_failure().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_mock_skips_probe() {
        let cfg = DeviceConfig {
            force_mock: true,
            ..config()
        };
        let client = DeviceClient::new(camera(), cfg);
        let outcome = client.connect().await;
        assert_eq!(outcome, ConnectOutcome { state: ConnectionState::Mock, failure: None });
        assert!(client.transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_photos() {
        let client = client(FakeTransport::default());
        client.connect().await;
        assert_eq!(client.state().await, ConnectionState::Mock);

        let photos = client.get_photos().await;
        assert!(!photos.is_empty());
        assert!(photos.iter().all(|p| !p.name.is_empty() && !p.thumbnail.is_empty()));
    }

    #[tokio::test]
    async fn test_connected_listing_uses_first_directory() {
        let client = client(camera());
        client.connect().await;

        let photos = client.get_photos().await;
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].name, "R0000001.JPG");
        assert_eq!(photos[0].url, format!("{}/photos/100RICOH/R0000001.JPG", BASE));
        assert_eq!(
            photos[1].thumbnail,
            format!("{}/photos/100RICOH/R0000002.DNG?size=thumb", BASE)
        );
        assert!(photos[0].date.is_none());
    }

    #[tokio::test]
    async fn test_connected_no_directories() {
        let transport = FakeTransport::default().route("photos", Reply::Status(200, r#"{"dirs":[]}"#));
        let client = client(transport);
        client.connect().await;
        assert_eq!(client.state().await, ConnectionState::Connected);
        assert!(client.get_photos().await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_yields_empty() {
        let notifier = Arc::new(RecordingNotifier::default());
        // Camera drops off right after the probe: the directory listing fails
        let client = DeviceClient::new(camera().dropping_after(1), config())
            .with_notifier(notifier.clone());
        client.connect().await;
        assert_eq!(client.state().await, ConnectionState::Connected);

        assert!(client.get_photos().await.is_empty());
        assert_eq!(client.transport.requests.lock().unwrap().len(), 2);
        assert_eq!(client.state().await, ConnectionState::Connected);
        assert!(notifier.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_errors_are_absorbed() {
        let cases = [
            FakeTransport::default().route("photos", Reply::Status(500, "")),
            FakeTransport::default().route("photos", Reply::Status(200, "not json")),
            FakeTransport::default()
                .route("photos", Reply::Status(200, DIRS))
                .route("photos/100RICOH", Reply::Fail(TransportError::TimedOut)),
        ];
        for transport in cases {
            let client = client(transport);
            *client.state.write().await = ConnectionState::Connected;
            assert!(client.get_photos().await.is_empty());
        }
    }

    #[test]
    fn test_url_join() {
        let client = DeviceClient::new(
            FakeTransport::default(),
            DeviceConfig {
                base_url: "http://192.168.0.1/v1/".to_string(),
                ..DeviceConfig::default()
            },
        );
        assert_eq!(client.url("/photos"), "http://192.168.0.1/v1/photos");
        assert_eq!(client.url("photos/100RICOH"), "http://192.168.0.1/v1/photos/100RICOH");
    }
}
