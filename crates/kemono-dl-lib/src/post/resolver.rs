use super::api::{CreatorProfile, PostResponse};
use super::filename::{FileName, disambiguate};
use super::PostUrl;
use crate::download::DownloadTask;
use crate::fetch::Fetcher;
use crate::http::HttpUrl;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to resolve post {url}: {reason}")]
pub struct PostResolutionError {
    pub url: String,
    pub reason: String,
}

/// Turns post URLs into download tasks, one per attached file.
pub struct PostResolver {
    fetcher: Arc<Fetcher>,
    creator_names: Mutex<HashMap<(String, String), String>>,
}

impl PostResolver {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            creator_names: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(
        &self,
        post_url: &PostUrl,
        output_root: &Path,
    ) -> Result<Vec<DownloadTask>, PostResolutionError> {
        let failed = |reason: String| PostResolutionError {
            url: post_url.to_string(),
            reason,
        };

        let api_url = post_url.api_post_url().map_err(|e| failed(e.to_string()))?;
        let response: PostResponse = self
            .fetch_json(&api_url)
            .await
            .map_err(|reason| failed(format!("post listing unavailable: {reason}")))?;

        let post_dir = self.post_directory(post_url, output_root).await;
        let title = response.post.title.as_deref().unwrap_or_default();

        let mut urls = Vec::new();
        let mut names = Vec::new();
        for entry in response.previews.iter().chain(response.attachments.iter()) {
            let download_url = match entry.download_url(post_url.origin()) {
                Ok(download_url) => download_url,
                Err(e) => {
                    tracing::warn!(post = %post_url, entry = ?entry, error = %e, "Skipping file entry with an unusable URL");
                    continue;
                }
            };
            let (Some(download_url), Some(name)) = (download_url, entry.file_name()) else {
                tracing::debug!(post = %post_url, entry = ?entry, "Skipping entry without a downloadable file");
                continue;
            };
            urls.push(download_url);
            names.push(FileName::sanitize(name));
        }

        let tasks: Vec<DownloadTask> = urls
            .into_iter()
            .zip(disambiguate(names))
            .map(|(url, name)| DownloadTask::new(url, post_dir.join(name.as_str())))
            .collect();

        tracing::info!(
            post = %post_url,
            title,
            files = tasks.len(),
            directory = %post_dir.display(),
            "Resolved post"
        );
        Ok(tasks)
    }

    /// `{output_root}/{service}/{creator}/{post_id}`
    async fn post_directory(&self, post_url: &PostUrl, output_root: &Path) -> PathBuf {
        let creator = self.creator_name(post_url).await;

        output_root
            .join(FileName::sanitize(post_url.service()).as_str())
            .join(FileName::sanitize(&creator).as_str())
            .join(FileName::sanitize(post_url.post_id()).as_str())
    }

    /// Profile names are cached per creator. A failed lookup falls back to the creator id.
    async fn creator_name(&self, post_url: &PostUrl) -> String {
        let key = (
            post_url.service().to_string(),
            post_url.creator_id().to_string(),
        );
        if let Some(name) = self.creator_names.lock().await.get(&key) {
            return name.clone();
        }

        let profile = match post_url.api_profile_url() {
            Ok(profile_url) => self.fetch_json::<CreatorProfile>(&profile_url).await,
            Err(e) => Err(e.to_string()),
        };
        let name = match profile {
            Ok(profile) if !profile.name.trim().is_empty() => profile.name,
            Ok(_) => post_url.creator_id().to_string(),
            Err(reason) => {
                tracing::warn!(
                    post = %post_url,
                    creator = post_url.creator_id(),
                    reason = %reason,
                    "Creator profile unavailable, using the creator id as directory name"
                );
                post_url.creator_id().to_string()
            }
        };

        self.creator_names.lock().await.insert(key, name.clone());
        name
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &HttpUrl) -> Result<T, String> {
        let body = self.fetcher.fetch(url).await.map_err(|e| e.to_string())?;
        serde_json::from_slice(&body).map_err(|e| format!("unexpected response from {url}: {e}"))
    }
}
