use crate::cli::args::Command;
use crate::cli::params::DownloadParams;
use crate::config::{ExistingFilePolicy, load_config, validate_config};
use crate::download::PoolOptions;
use crate::error::KemonoDlError;
use crate::fetch::RetryPolicy;
use std::path::PathBuf;

/// Merges command line options over the loaded configuration.
pub fn resolve_command(command: Command) -> Result<DownloadParams, KemonoDlError> {
    let Command {
        urls,
        config_path,
        output_dir,
        threads,
        max_attempts,
        overwrite,
        log_file,
    } = command;

    if urls.is_empty() {
        return Err(KemonoDlError::CliArgumentValidation {
            details: "At least one post URL is required.".to_string(),
        });
    }

    for (name, value) in [
        ("threads", threads.map(|v| v as u64)),
        ("max-attempts", max_attempts.map(u64::from)),
    ] {
        if value == Some(0) {
            return Err(KemonoDlError::CliArgumentValidation {
                details: format!("{name} must be greater than 0."),
            });
        }
    }

    let mut app_config = load_config(config_path.as_deref())?;

    if let Some(output_dir) = output_dir {
        app_config.output_dir = PathBuf::from(output_dir);
    }
    if let Some(threads) = threads {
        app_config.threads = threads;
    }
    if let Some(max_attempts) = max_attempts {
        app_config.retry.max_attempts = max_attempts;
    }
    if overwrite {
        app_config.existing_files = ExistingFilePolicy::Overwrite;
    }
    if let Some(log_file) = log_file {
        app_config.log_file = Some(PathBuf::from(log_file));
    }
    validate_config(&app_config)?;

    Ok(DownloadParams {
        urls,
        output_dir: app_config.output_dir,
        pool: PoolOptions {
            concurrency: app_config.threads,
            existing_files: app_config.existing_files,
        },
        retry: RetryPolicy::from(&app_config.retry),
        http: app_config.http,
        log_file: app_config.log_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(urls: &[&str]) -> Command {
        Command {
            urls: urls.iter().map(|s| s.to_string()).collect(),
            config_path: None,
            output_dir: None,
            threads: None,
            max_attempts: None,
            overwrite: false,
            log_file: None,
        }
    }

    #[test]
    fn test_defaults_come_from_config() {
        let params = resolve_command(command(&["https://kemono.su/a/user/1/post/2"])).unwrap();

        assert_eq!(params.output_dir, PathBuf::from("downloads"));
        assert_eq!(params.pool.concurrency, 4);
        assert_eq!(params.pool.existing_files, ExistingFilePolicy::Skip);
        assert_eq!(params.retry.max_attempts, 5);
        assert_eq!(params.log_file, None);
    }

    #[test]
    fn test_cli_options_override_config() {
        let params = resolve_command(Command {
            output_dir: Some("/tmp/out".to_string()),
            threads: Some(12),
            max_attempts: Some(2),
            overwrite: true,
            log_file: Some("logs/main.log".to_string()),
            ..command(&["https://kemono.su/a/user/1/post/2"])
        })
        .unwrap();

        assert_eq!(params.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(params.pool.concurrency, 12);
        assert_eq!(params.pool.existing_files, ExistingFilePolicy::Overwrite);
        assert_eq!(params.retry.max_attempts, 2);
        assert_eq!(params.log_file, Some(PathBuf::from("logs/main.log")));
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let err = resolve_command(Command {
            threads: Some(0),
            ..command(&["https://kemono.su/a/user/1/post/2"])
        })
        .unwrap_err();

        assert!(matches!(err, KemonoDlError::CliArgumentValidation { .. }));
        assert!(err.to_string().contains("threads"));
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let err = resolve_command(Command {
            max_attempts: Some(0),
            ..command(&["https://kemono.su/a/user/1/post/2"])
        })
        .unwrap_err();

        assert!(matches!(err, KemonoDlError::CliArgumentValidation { .. }));
    }

    #[test]
    fn test_missing_urls_are_rejected() {
        assert!(matches!(
            resolve_command(command(&[])),
            Err(KemonoDlError::CliArgumentValidation { .. })
        ));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = resolve_command(Command {
            config_path: Some("/definitely/not/here.yaml".to_string()),
            ..command(&["https://kemono.su/a/user/1/post/2"])
        })
        .unwrap_err();

        assert!(matches!(err, KemonoDlError::Config(_)));
    }
}
