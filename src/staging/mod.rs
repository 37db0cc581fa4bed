use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::VcsError;
use crate::models::StageOutcome;


/// The slice of a version-control working tree the stager needs.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// True when the tree has tracked modifications or untracked files.
    async fn is_dirty(&self) -> Result<bool, VcsError>;

    async fn add(&self, path: &Path) -> Result<(), VcsError>;
}

/// Drives the `git` binary found on `PATH`.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn git(&self, command: &'static str, args: &[&OsStr]) -> Result<String, VcsError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .arg(command)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(VcsError::Spawn)?;

        if !output.status.success() {
            return Err(VcsError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn ensure_work_tree(&self) -> Result<(), VcsError> {
        let inside = self
            .git("rev-parse", &[OsStr::new("--is-inside-work-tree")])
            .await
            .map_err(|e| match e {
                VcsError::Command { .. } => VcsError::NotAWorkTree { root: self.root.clone() },
                other => other,
            })?;
        if inside.trim() != "true" {
            return Err(VcsError::NotAWorkTree { root: self.root.clone() });
        }
        Ok(())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn is_dirty(&self) -> Result<bool, VcsError> {
        self.ensure_work_tree().await?;
        let status = self
            .git("status", &[OsStr::new("--porcelain"), OsStr::new("--untracked-files=all")])
            .await?;
        Ok(!status.trim().is_empty())
    }

    async fn add(&self, path: &Path) -> Result<(), VcsError> {
        self.git("add", &[OsStr::new("--"), path.as_os_str()]).await?;
        Ok(())
    }
}

/// Stages `path` when the tree has changes. Never fails: problems come back as `Unavailable`.
pub async fn stage_if_dirty(vcs: &dyn Vcs, path: &Path) -> StageOutcome {
    match vcs.is_dirty().await {
        Ok(false) => {
            debug!(path = %path.display(), "working tree clean");
            StageOutcome::Skipped
        }
        Ok(true) => match vcs.add(path).await {
            Ok(()) => StageOutcome::Staged,
            Err(e) => {
                warn!(error = %e, "git add failed");
                StageOutcome::Unavailable(e.to_string())
            }
        },
        Err(e) => {
            warn!(error = %e, "git status check skipped");
            StageOutcome::Unavailable(e.to_string())
        }
    }
}
