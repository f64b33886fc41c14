use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::process::Command;
use tracing::info;

/// Opens an external deep-link in a new context (browser tab, messaging app)
#[async_trait]
pub trait ContactLauncher: Send + Sync {
    /// Open the given URL
    async fn open(&self, url: &str) -> Result<()>;

    /// Get the name of the launcher
    fn launcher_name(&self) -> &'static str;
}

/// Launcher that only logs the link, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLauncher;

#[async_trait]
impl ContactLauncher for LoggingLauncher {
    async fn open(&self, url: &str) -> Result<()> {
        info!("📨 Contact link: {}", url);
        Ok(())
    }

    fn launcher_name(&self) -> &'static str {
        "log"
    }
}

/// Launcher that remembers every opened link
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links opened so far, oldest first
    pub fn opened(&self) -> Vec<String> {
        match self.opened.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ContactLauncher for RecordingLauncher {
    async fn open(&self, url: &str) -> Result<()> {
        self.opened
            .lock()
            .map_err(|_| anyhow::anyhow!("recording launcher lock poisoned"))?
            .push(url.to_string());
        Ok(())
    }

    fn launcher_name(&self) -> &'static str {
        "recording"
    }
}

/// Launcher that hands the link to the desktop's default URL handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }

        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

#[async_trait]
impl ContactLauncher for SystemLauncher {
    async fn open(&self, url: &str) -> Result<()> {
        let status = Self::command(url)
            .status()
            .await
            .context("Failed to start URL handler")?;

        if !status.success() {
            anyhow::bail!("URL handler exited with {}", status);
        }
        Ok(())
    }

    fn launcher_name(&self) -> &'static str {
        "system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_launcher_keeps_order() {
        let launcher = RecordingLauncher::new();
        launcher.open("https://a").await.expect("open a");
        launcher.open("https://b").await.expect("open b");
        assert_eq!(launcher.opened(), vec!["https://a", "https://b"]);
        assert_eq!(launcher.launcher_name(), "recording");
    }

    #[tokio::test]
    async fn logging_launcher_always_succeeds() {
        LoggingLauncher.open("https://wa.me/1").await.expect("open");
    }

    #[test]
    fn system_launcher_hands_url_to_platform_opener() {
        let url = "https://wa.me/917904825836?text=Hi";
        let cmd = SystemLauncher::command(url);
        let cmd = cmd.as_std();
        let args: Vec<_> = cmd.get_args().collect();

        #[cfg(target_os = "macos")]
        assert_eq!(cmd.get_program(), "open");
        #[cfg(target_os = "windows")]
        assert_eq!(cmd.get_program(), "cmd");
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        assert_eq!(cmd.get_program(), "xdg-open");

        assert_eq!(args.last().copied(), Some(std::ffi::OsStr::new(url)));
        assert_eq!(SystemLauncher.launcher_name(), "system");
    }
}
