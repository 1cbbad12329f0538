// src/services/git.rs

//! Version-control finalize step.

use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{GitConfig, PublishOutcome};

/// Snapshots the output tree once a mirror run has completed.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stage everything, commit with `message`, and push.
    async fn publish(&self, message: &str) -> Result<PublishOutcome>;
}

/// `Publisher` that shells out to `git` inside the output directory.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    work_dir: PathBuf,
    remote: String,
    branch: String,
    push: bool,
}

impl GitPublisher {
    pub fn new(work_dir: impl Into<PathBuf>, config: &GitConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            push: config.push,
        }
    }

    /// Run a git command in the work dir and return its raw output.
    async fn output(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::git(args.join(" "), e))
    }

    /// Run a git command in the work dir, failing on a non-zero exit.
    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether `rev` resolves to a commit.
    async fn resolves(&self, rev: &str) -> Result<bool> {
        let output = self
            .output(&["rev-parse", "--verify", "--quiet", rev])
            .await?;
        Ok(output.status.success())
    }

    /// `git add .`
    pub async fn stage_all(&self) -> Result<()> {
        self.git(&["add", "."]).await.map(|_| ())
    }

    /// Whether the index differs from HEAD.
    ///
    /// Unstaged changes elsewhere in the repository are ignored.
    pub async fn has_staged_changes(&self) -> Result<bool> {
        let args = ["diff", "--cached", "--quiet"];
        let output = self.output(&args).await?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(command_failed(&args, &output)),
        }
    }

    /// Whether local commits have not reached the remote branch yet.
    ///
    /// A missing remote-tracking ref counts as unpushed once HEAD exists.
    pub async fn has_unpushed_commits(&self) -> Result<bool> {
        if !self.resolves("HEAD").await? {
            return Ok(false);
        }
        let upstream = format!("refs/remotes/{}/{}", self.remote, self.branch);
        if !self.resolves(&upstream).await? {
            return Ok(true);
        }
        let count = self
            .git(&["rev-list", "--count", &format!("{upstream}..HEAD")])
            .await?;
        Ok(count.trim() != "0")
    }

    pub async fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message]).await.map(|_| ())
    }

    /// Push to the configured remote and branch.
    pub async fn push(&self) -> Result<()> {
        self.git(&["push", &self.remote, &self.branch])
            .await
            .map(|_| ())
    }
}

fn command_failed(args: &[&str], output: &Output) -> AppError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    AppError::git(
        args.join(" "),
        format!("{} ({})", stderr.trim(), output.status),
    )
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, message: &str) -> Result<PublishOutcome> {
        log::info!("Staging changes in {}", self.work_dir.display());
        self.stage_all().await?;

        if !self.has_staged_changes().await? {
            log::info!("Nothing to commit, mirror is unchanged");
            // A previous run may have committed but failed to push.
            let pushed = self.push && self.has_unpushed_commits().await?;
            if pushed {
                log::info!("Pushing earlier commits to {} {}", self.remote, self.branch);
                self.push().await?;
            }
            return Ok(PublishOutcome::NothingToCommit { pushed });
        }

        log::info!("Committing: {}", message);
        self.commit(message).await?;

        if self.push {
            log::info!("Pushing to {} {}", self.remote, self.branch);
            self.push().await?;
        }

        Ok(PublishOutcome::Committed { pushed: self.push })
    }
}
