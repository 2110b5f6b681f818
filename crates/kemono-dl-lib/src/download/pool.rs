use super::types::{DownloadTask, PoolOptions, RunSummary};
use super::writer::{WriteError, write_file};
use crate::config::ExistingFilePolicy;
use crate::fetch::{FetchError, Fetcher};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

type TaskQueue = Arc<Mutex<VecDeque<(usize, DownloadTask)>>>;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("worker stopped before finishing the task")]
    WorkerLost,
}

#[derive(Debug)]
pub enum TaskOutcome {
    Downloaded { bytes: usize },
    Skipped,
    Failed(TaskError),
}

/// Downloads every task with a fixed number of workers sharing one queue.
///
/// Each task is dequeued by exactly one worker. Per-task failures are collected in
/// the summary and never stop the other workers. Failures are listed in input order.
pub async fn run_pool(
    tasks: Vec<DownloadTask>,
    options: PoolOptions,
    fetcher: Arc<Fetcher>,
) -> RunSummary {
    let urls: Vec<String> = tasks.iter().map(|t| t.url().to_string()).collect();
    let worker_count = options.concurrency.max(1).min(tasks.len());
    let queue: TaskQueue = Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    info!(tasks = urls.len(), workers = worker_count, "Starting downloads");

    let mut workers = JoinSet::new();
    for worker_id in 0..worker_count {
        workers.spawn(worker(
            worker_id,
            queue.clone(),
            fetcher.clone(),
            options.existing_files,
            outcome_tx.clone(),
        ));
    }
    drop(outcome_tx);

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Download worker terminated abnormally");
        }
    }

    let mut outcomes: Vec<Option<TaskOutcome>> = urls.iter().map(|_| None).collect();
    while let Some((index, outcome)) = outcome_rx.recv().await {
        outcomes[index] = Some(outcome);
    }

    let mut summary = RunSummary::default();
    for (url, outcome) in urls.into_iter().zip(outcomes) {
        match outcome.unwrap_or(TaskOutcome::Failed(TaskError::WorkerLost)) {
            TaskOutcome::Downloaded { .. } => summary.record_success(),
            TaskOutcome::Skipped => summary.record_skip(),
            TaskOutcome::Failed(err) => summary.record_failure(url, err.to_string()),
        }
    }

    info!(
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Downloads finished"
    );
    summary
}

async fn worker(
    worker_id: usize,
    queue: TaskQueue,
    fetcher: Arc<Fetcher>,
    existing_files: ExistingFilePolicy,
    outcomes: mpsc::UnboundedSender<(usize, TaskOutcome)>,
) {
    loop {
        let next = queue.lock().await.pop_front();
        let Some((index, task)) = next else {
            break;
        };

        let outcome = match process_task(&task, &fetcher, existing_files).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(worker = worker_id, url = %task.url(), error = %err, "Download failed");
                TaskOutcome::Failed(err)
            }
        };

        if outcomes.send((index, outcome)).is_err() {
            break;
        }
    }

    debug!(worker = worker_id, "Queue drained, worker exiting");
}

async fn process_task(
    task: &DownloadTask,
    fetcher: &Fetcher,
    existing_files: ExistingFilePolicy,
) -> Result<TaskOutcome, TaskError> {
    let destination = task.destination();

    if existing_files == ExistingFilePolicy::Skip
        && tokio::fs::try_exists(destination).await.unwrap_or(false)
    {
        debug!(url = %task.url(), output = %destination.display(), "File exists, skipping download");
        return Ok(TaskOutcome::Skipped);
    }

    debug!(url = %task.url(), output = %destination.display(), "Downloading");
    let body = fetcher.fetch(task.url()).await?;
    write_file(destination, &body).await?;

    info!(url = %task.url(), output = %destination.display(), bytes = body.len(), "Downloaded");
    Ok(TaskOutcome::Downloaded { bytes: body.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RetryPolicy;
    use crate::http::HttpUrl;
    use crate::post::FileName;
    use crate::test_support::FakeTransport;
    use reqwest::StatusCode;
    use std::path::Path;
    use std::time::Duration;

    fn file_url(n: usize) -> String {
        format!("https://files.kemono.test/data/{n:02}.bin")
    }

    fn fetcher(transport: Arc<FakeTransport>) -> Arc<Fetcher> {
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            multiplier: 1.0,
            jitter: false,
        };
        Arc::new(Fetcher::new(transport, policy))
    }

    fn task(root: &Path, n: usize) -> DownloadTask {
        DownloadTask::new(
            HttpUrl::parse(&file_url(n)).unwrap(),
            root.join(format!("{n:02}.bin")),
        )
    }

    fn serving(count: usize) -> FakeTransport {
        (0..count).fold(FakeTransport::new(), |transport, n| {
            transport.ok(&file_url(n), format!("contents of {n}"))
        })
    }

    fn options(concurrency: usize) -> PoolOptions {
        PoolOptions {
            concurrency,
            existing_files: ExistingFilePolicy::Skip,
        }
    }

    #[tokio::test]
    async fn test_downloads_every_task_exactly_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(serving(20));
        let tasks: Vec<_> = (0..20).map(|n| task(temp_dir.path(), n)).collect();

        let summary = run_pool(tasks, options(8), fetcher(transport.clone())).await;

        assert_eq!(summary.succeeded, 20);
        assert!(!summary.has_failures());
        assert_eq!(transport.calls(), 20);
        for n in 0..20 {
            assert_eq!(transport.calls_to(&file_url(n)), 1);
            assert_eq!(
                std::fs::read_to_string(temp_dir.path().join(format!("{n:02}.bin"))).unwrap(),
                format!("contents of {n}")
            );
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_other_tasks_and_keep_input_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            serving(6)
                .status(&file_url(1), StatusCode::NOT_FOUND)
                .status(&file_url(4), StatusCode::FORBIDDEN),
        );
        let tasks: Vec<_> = (0..6).map(|n| task(temp_dir.path(), n)).collect();

        let summary = run_pool(tasks, options(1), fetcher(transport.clone())).await;

        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed, 2);
        let failed_urls: Vec<_> = summary.failures.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(failed_urls, vec![file_url(1), file_url(4)]);
        assert!(summary.failures[0].reason.contains("404"));
        assert!(!temp_dir.path().join("01.bin").exists());
        assert_eq!(
            transport.requests(),
            (0..6).map(file_url).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_failure_order_is_stable_with_many_workers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            (0..12).fold(FakeTransport::new(), |transport, n| {
                if n % 3 == 0 {
                    transport.status(&file_url(n), StatusCode::GONE)
                } else {
                    transport.ok(&file_url(n), "ok")
                }
            }),
        );
        let tasks: Vec<_> = (0..12).map(|n| task(temp_dir.path(), n)).collect();

        let summary = run_pool(tasks, options(5), fetcher(transport)).await;

        let failed_urls: Vec<_> = summary.failures.iter().map(|f| f.url.clone()).collect();
        assert_eq!(
            failed_urls,
            vec![file_url(0), file_url(3), file_url(6), file_url(9)]
        );
    }

    #[tokio::test]
    async fn test_second_run_fetches_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(serving(5));
        let tasks: Vec<_> = (0..5).map(|n| task(temp_dir.path(), n)).collect();
        let fetcher = fetcher(transport.clone());

        let first = run_pool(tasks.clone(), options(3), fetcher.clone()).await;
        assert_eq!(first.succeeded, 5);
        assert_eq!(transport.calls(), 5);

        let second = run_pool(tasks, options(3), fetcher).await;
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.skipped, 5);
        assert_eq!(transport.calls(), 5);
    }

    #[tokio::test]
    async fn test_overwrite_policy_fetches_again() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(serving(1));
        let existing = temp_dir.path().join("00.bin");
        std::fs::write(&existing, "stale").unwrap();

        let summary = run_pool(
            vec![task(temp_dir.path(), 0)],
            PoolOptions {
                concurrency: 2,
                existing_files: ExistingFilePolicy::Overwrite,
            },
            fetcher(transport.clone()),
        )
        .await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(transport.calls(), 1);
        assert_eq!(std::fs::read_to_string(existing).unwrap(), "contents of 0");
    }

    #[tokio::test]
    async fn test_write_failure_is_recorded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let transport = Arc::new(serving(2));
        let tasks = vec![
            DownloadTask::new(
                HttpUrl::parse(&file_url(0)).unwrap(),
                blocker.join("00.bin"),
            ),
            task(temp_dir.path(), 1),
        ];

        let summary = run_pool(tasks, options(2), fetcher(transport)).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].url, file_url(0));
        assert!(summary.failures[0].reason.starts_with("Failed to write"));
    }

    #[tokio::test]
    async fn test_file_named_like_a_sibling_temporary_file_survives() {
        let temp_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(serving(2));
        let tasks: Vec<_> = [".a.jpg.part", "a.jpg"]
            .into_iter()
            .enumerate()
            .map(|(n, raw)| {
                DownloadTask::new(
                    HttpUrl::parse(&file_url(n)).unwrap(),
                    temp_dir.path().join(FileName::sanitize(raw).as_str()),
                )
            })
            .collect();

        let summary = run_pool(tasks, options(1), fetcher(transport)).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("a.jpg.part")).unwrap(),
            "contents of 0"
        );
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("a.jpg")).unwrap(),
            "contents of 1"
        );
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let transport = Arc::new(FakeTransport::new());

        let summary = run_pool(Vec::new(), options(4), fetcher(transport.clone())).await;

        assert_eq!(summary, RunSummary::default());
        assert_eq!(transport.calls(), 0);
    }
}
