//! Application state management

use anyhow::Result;
use gr3link_core::{catalog, FileStore, RecipeStore};
use gr3link_device::{ConnectFailure, DeviceClient, FailureNotifier, ReqwestTransport};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Camera client (real or demo mode)
    pub device: DeviceClient<ReqwestTransport>,
    /// Persisted recipe collection
    pub recipes: RwLock<RecipeStore<FileStore>>,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Open the recipe store, seed the built-in catalog and build the device client
    pub fn new(config: Config, notifier: Option<Arc<dyn FailureNotifier>>) -> Result<Arc<Self>> {
        let storage = FileStore::new(&config.storage.data_dir)?;
        let mut recipes = RecipeStore::open(storage)?;

        let seeded = recipes.seed_defaults(&catalog::builtin())?;
        info!(
            data_dir = %config.storage.data_dir.display(),
            recipes = recipes.len(),
            seeded,
            "Recipe store ready"
        );

        let transport = ReqwestTransport::new()?;
        let mut device = DeviceClient::new(transport, config.to_device_config());
        if let Some(notifier) = notifier {
            device = device.with_notifier(notifier);
        }

        Ok(Arc::new(Self {
            device,
            recipes: RwLock::new(recipes),
            config,
        }))
    }
}

/// Prints the fallback alert to stderr for interactive use
pub struct AlertNotifier;

impl FailureNotifier for AlertNotifier {
    fn notify(&self, failure: &ConnectFailure) {
        eprintln!("{}", alert_text(failure));
    }
}

fn alert_text(failure: &ConnectFailure) -> String {
    format!("Connection Failed:\n{}\n\nSwitching to Demo Mode.", failure.message())
}
