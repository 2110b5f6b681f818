use crate::config::ExistingFilePolicy;
use crate::http::HttpUrl;
use itertools::Itertools;
use std::fmt;
use std::path::{Path, PathBuf};

/// One file to download. Created by the post resolver, consumed once by a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    url: HttpUrl,
    destination: PathBuf,
}

impl DownloadTask {
    pub fn new(url: HttpUrl, destination: PathBuf) -> Self {
        Self { url, destination }
    }

    pub fn url(&self) -> &HttpUrl {
        &self.url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolOptions {
    pub concurrency: usize,
    pub existing_files: ExistingFilePolicy,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            existing_files: ExistingFilePolicy::Skip,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub url: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

impl RunSummary {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(Failure {
            url: url.into(),
            reason: reason.into(),
        });
    }

    /// Puts `failures` ahead of the ones already recorded.
    pub fn prepend_failures(&mut self, failures: Vec<Failure>) {
        self.failed += failures.len();
        self.failures.splice(0..0, failures);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Downloaded: {}, skipped (already present): {}, failed: {}",
            self.succeeded, self.skipped, self.failed
        )?;
        if !self.failures.is_empty() {
            let lines = self
                .failures
                .iter()
                .format_with("\n", |failure, f| f(&format_args!("  {failure}")));
            write!(f, "\nFailures:\n{lines}")?;
        }
        Ok(())
    }
}
