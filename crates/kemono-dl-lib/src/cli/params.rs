use crate::config::HttpConfig;
use crate::download::PoolOptions;
use crate::fetch::RetryPolicy;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub urls: Vec<String>,
    pub output_dir: PathBuf,
    pub pool: PoolOptions,
    pub retry: RetryPolicy,
    pub http: HttpConfig,
    pub log_file: Option<PathBuf>,
}
