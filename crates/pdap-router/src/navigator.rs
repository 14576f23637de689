//! Navigation history abstraction.

use parking_lot::Mutex;

/// Drives page navigation.
///
/// Implementations decide what "navigate" means: a browser history, a
/// terminal that prints the URL, or an in-memory log for tests.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Replace the current entry.
    fn replace(&self, path: &str);

    /// Push a new entry.
    fn push(&self, path: &str);

    /// Leave the app for an external URL (full-page redirect).
    fn redirect_external(&self, url: &str);

    /// Location of the current entry.
    fn current(&self) -> String;
}

#[derive(Debug, Default)]
struct HistoryInner {
    entries: Vec<String>,
    external: Option<String>,
}

/// In-memory history stack.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<HistoryInner>,
}

impl MemoryHistory {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(HistoryInner {
                entries: vec![start.into()],
                external: None,
            }),
        }
    }

    /// All entries, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.inner.lock().entries.clone()
    }

    /// Last external URL the app redirected to.
    pub fn last_external(&self) -> Option<String> {
        self.inner.lock().external.clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(crate::HOME_PATH)
    }
}

impl Navigator for MemoryHistory {
    fn replace(&self, path: &str) {
        let mut inner = self.inner.lock();
        match inner.entries.last_mut() {
            Some(last) => *last = path.to_string(),
            None => inner.entries.push(path.to_string()),
        }
    }

    fn push(&self, path: &str) {
        self.inner.lock().entries.push(path.to_string());
    }

    fn redirect_external(&self, url: &str) {
        self.inner.lock().external = Some(url.to_string());
    }

    fn current(&self) -> String {
        self.inner
            .lock()
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| crate::HOME_PATH.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_replace() {
        let history = MemoryHistory::new("/");
        history.push("/search/results");
        history.replace("/data-source/1");

        assert_eq!(history.current(), "/data-source/1");
        assert_eq!(history.history(), vec!["/", "/data-source/1"]);
    }

    #[test]
    fn test_external_redirect_keeps_history() {
        let history = MemoryHistory::default();
        history.redirect_external("https://api.example.org/auth/oauth");

        assert_eq!(history.current(), "/");
        assert_eq!(
            history.last_external().as_deref(),
            Some("https://api.example.org/auth/oauth")
        );
    }
}
