use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_PORTAL_URL: &str = "https://fuwu.taobao.com/";

/// External service portal where subscriptions are managed.
///
/// Navigation is fire-and-forget: nothing comes back into the monitor.
pub trait ServicePortal: Send + Sync {
    fn url(&self) -> &str;

    fn open(&self);
}

/// Portal that records each navigation in the log and in memory.
#[derive(Debug)]
pub struct LoggingPortal {
    url: String,
    visits: Mutex<u32>,
}

impl Default for LoggingPortal {
    fn default() -> Self {
        Self::new(DEFAULT_PORTAL_URL)
    }
}

impl LoggingPortal {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            visits: Mutex::new(0),
        }
    }

    pub fn visits(&self) -> u32 {
        *self.visits.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ServicePortal for LoggingPortal {
    fn url(&self) -> &str {
        &self.url
    }

    fn open(&self) {
        let mut visits = self.visits.lock().unwrap_or_else(|p| p.into_inner());
        *visits += 1;
        info!(url = %self.url, visits = *visits, "Opening service portal");
    }
}
