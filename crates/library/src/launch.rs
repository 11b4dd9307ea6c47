use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Starts a core or arcade definition on the device.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, path: &Path) -> Result<()>;
}

/// Launches by writing a single command to the menu process's control FIFO.
#[derive(Debug, Clone)]
pub struct FifoLauncher {
    fifo: PathBuf,
}
impl FifoLauncher {
    pub fn new(fifo: impl Into<PathBuf>) -> Self {
        Self { fifo: fifo.into() }
    }

    /// The command line understood by the menu process.
    ///
    /// Commands are newline-framed on the reading side, so paths containing
    /// a newline can't be expressed and are rejected.
    pub fn command(path: &Path) -> Result<String> {
        let path = path.to_str().ok_or_raise(|| ErrorKind::Launch)?;
        if path.is_empty() || path.contains('\n') {
            exn::bail!(ErrorKind::Launch);
        }
        Ok(format!("load_core {path}"))
    }
}

#[async_trait]
impl Launcher for FifoLauncher {
    #[tracing::instrument(skip(self), fields(fifo = %self.fifo.display(), path = %path.display()))]
    async fn launch(&self, path: &Path) -> Result<()> {
        let command = Self::command(path)?;
        // Never create: a missing FIFO means the menu process isn't running.
        let mut fifo = tokio::fs::OpenOptions::new().write(true).open(&self.fifo).await.or_raise(|| ErrorKind::Launch)?;
        fifo.write_all(command.as_bytes()).await.or_raise(|| ErrorKind::Launch)?;
        fifo.flush().await.or_raise(|| ErrorKind::Launch)?;
        tracing::info!("Launch command sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/media/fat/_Arcade/game.mra", "load_core /media/fat/_Arcade/game.mra")]
    #[case("/media/fat/_Console/NES_20200101.rbf", "load_core /media/fat/_Console/NES_20200101.rbf")]
    #[case("/media/fat/_Arcade/with space.mra", "load_core /media/fat/_Arcade/with space.mra")]
    fn test_command(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(FifoLauncher::command(Path::new(path)).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/media/fat/_Arcade/two\nlines.mra")]
    fn test_command_rejected(#[case] path: &str) {
        assert!(FifoLauncher::command(Path::new(path)).is_err());
    }

    #[tokio::test]
    async fn test_launch_writes_command() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fifo = temp_dir.path().join("cmd");
        std::fs::write(&fifo, b"").unwrap();
        let launcher: Box<dyn Launcher> = Box::new(FifoLauncher::new(&fifo));
        launcher.launch(Path::new("/media/fat/_Arcade/game.mra")).await.unwrap();
        assert_eq!(std::fs::read_to_string(&fifo).unwrap(), "load_core /media/fat/_Arcade/game.mra");
    }

    #[tokio::test]
    async fn test_launch_missing_channel() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fifo = temp_dir.path().join("missing");
        let err = FifoLauncher::new(&fifo).launch(Path::new("/media/fat/_Arcade/game.mra")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Launch));
        assert!(!fifo.exists());
    }
}
