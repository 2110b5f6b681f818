use crate::cli::params::DownloadParams;
use crate::download::{DownloadTask, Failure, RunSummary, run_pool};
use crate::error::KemonoDlError;
use crate::fetch::Fetcher;
use crate::http::HttpTransport;
use crate::post::{PostResolutionError, PostResolver, PostUrl};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Resolves every post URL, then downloads all of their files with one shared worker pool.
///
/// A URL that cannot be resolved is recorded in the summary and the others carry on.
/// Only when no URL resolves at all is the run itself an error.
pub async fn run_download(
    params: DownloadParams,
    transport: Arc<dyn HttpTransport>,
) -> Result<RunSummary, KemonoDlError> {
    let DownloadParams {
        urls,
        output_dir,
        pool,
        retry,
        http: _,
        log_file: _,
    } = params;

    let fetcher = Arc::new(Fetcher::new(transport, retry));
    let resolver = PostResolver::new(fetcher.clone());

    tracing::info!("Resolving {} posts", urls.len());
    let mut tasks = Vec::new();
    let mut destinations = HashSet::new();
    let mut resolution_failures = Vec::new();

    for raw_url in &urls {
        match resolve_post(&resolver, raw_url, &output_dir).await {
            Ok(post_tasks) => {
                for task in post_tasks {
                    if destinations.insert(task.destination().to_path_buf()) {
                        tasks.push(task);
                    } else {
                        tracing::warn!(
                            url = %task.url(),
                            output = %task.destination().display(),
                            "Another file of this run already uses this destination, dropping it"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::error!(url = %err.url, reason = %err.reason, "Skipping post");
                resolution_failures.push(Failure {
                    url: err.url,
                    reason: err.reason,
                });
            }
        }
    }

    if !urls.is_empty() && resolution_failures.len() == urls.len() {
        return Err(KemonoDlError::NoPostsResolved {
            failures: resolution_failures,
        });
    }

    tracing::info!("Downloading {} files to {}", tasks.len(), output_dir.display());
    let mut summary = run_pool(tasks, pool, fetcher).await;
    summary.prepend_failures(resolution_failures);

    Ok(summary)
}

async fn resolve_post(
    resolver: &PostResolver,
    raw_url: &str,
    output_dir: &Path,
) -> Result<Vec<DownloadTask>, PostResolutionError> {
    let post_url = PostUrl::parse(raw_url).map_err(|e| PostResolutionError {
        url: raw_url.to_string(),
        reason: e.to_string(),
    })?;
    resolver.resolve(&post_url, output_dir).await
}
