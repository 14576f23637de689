//! Navigator for a terminal: there is no page to change, so locations are
//! reported instead.

use console::Style;
use parking_lot::Mutex;
use pdap_router::{HOME_PATH, Navigator};
use tracing::debug;

#[derive(Debug)]
pub struct TerminalNavigator {
    location: Mutex<String>,
    open_browser: bool,
}

impl TerminalNavigator {
    pub fn new(open_browser: bool) -> Self {
        Self {
            location: Mutex::new(HOME_PATH.to_string()),
            open_browser,
        }
    }
}

impl Navigator for TerminalNavigator {
    fn replace(&self, path: &str) {
        debug!(path, "Navigate (replace)");
        *self.location.lock() = path.to_string();
    }

    fn push(&self, path: &str) {
        debug!(path, "Navigate (push)");
        *self.location.lock() = path.to_string();
    }

    fn redirect_external(&self, url: &str) {
        let dim = Style::new().dim();
        println!("Open this URL in your browser:");
        println!();
        println!("  {}", url);
        println!();

        if self.open_browser && open_url(url).is_err() {
            println!("{}", dim.apply_to("(Could not open browser automatically)"));
        }
    }

    fn current(&self) -> String {
        self.location.lock().clone()
    }
}

fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).status()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).status()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .status()?;
    }
    Ok(())
}
