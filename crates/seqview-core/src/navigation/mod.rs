//! Route parameters in, navigation intents out.

pub mod route;

use std::sync::Mutex;

use tracing::info;

pub use route::{NavigationTarget, RouteParams};

/// Publishes a new location without a full reload.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only logs and remembers each intent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        info!(event = "core.navigation.location_changed", path = path);
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
