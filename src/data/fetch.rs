use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ConfigError, Result};

/// Makes remote content available on local disk before it is decoded.
///
/// `ensure_local` may be called repeatedly for the same paths; an
/// implementation must treat already-present content as a no-op.
pub trait ContentFetcher: fmt::Debug + Send + Sync {
    fn ensure_local(&self, root: &Path, paths: &[PathBuf]) -> Result<()>;
}

/// Content is assumed to already be on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalContent;

impl ContentFetcher for LocalContent {
    fn ensure_local(&self, _root: &Path, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }
}

/// Fetches annexed files with `datalad get`.
#[derive(Debug, Clone)]
pub struct DataladFetcher {
    program: PathBuf,
}

impl Default for DataladFetcher {
    fn default() -> Self {
        Self::new("datalad")
    }
}

impl DataladFetcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        DataladFetcher {
            program: program.into(),
        }
    }

    fn command(&self, root: &Path, paths: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("get").arg("-d").arg(root).args(paths);
        cmd
    }
}

impl ContentFetcher for DataladFetcher {
    fn ensure_local(&self, root: &Path, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        log::debug!("datalad get {} path(s) under {}", paths.len(), root.display());
        let output = self
            .command(root, paths)
            .output()
            .map_err(|e| ConfigError::Fetch {
                root: root.to_path_buf(),
                message: format!("could not run {}: {e}", self.program.display()),
            })?;
        if !output.status.success() {
            return Err(ConfigError::Fetch {
                root: root.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_content_is_noop() {
        assert!(LocalContent
            .ensure_local(Path::new("/nowhere"), &[PathBuf::from("a.png")])
            .is_ok());
    }

    #[test]
    fn datalad_command_line() {
        let fetcher = DataladFetcher::default();
        let cmd = fetcher.command(
            Path::new("/data/ds"),
            &[PathBuf::from("/data/ds/sub-01/anat/a.png")],
        );
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "datalad");
        assert_eq!(args, ["get", "-d", "/data/ds", "/data/ds/sub-01/anat/a.png"]);
    }

    #[test]
    fn missing_program_is_a_fetch_error() {
        let fetcher = DataladFetcher::new("/definitely/not/a/datalad");
        let err = fetcher
            .ensure_local(Path::new("/tmp"), &[PathBuf::from("x")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Fetch { .. }));
    }
}
