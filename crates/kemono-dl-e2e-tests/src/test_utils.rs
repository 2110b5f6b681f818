use kemono_dl_lib::config::{ExistingFilePolicy, HttpConfig};
use kemono_dl_lib::download::PoolOptions;
use kemono_dl_lib::fetch::RetryPolicy;
use kemono_dl_lib::cli::DownloadParams;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SERVICE: &str = "patreon";
pub const CREATOR_ID: &str = "4242";
pub const CREATOR_NAME: &str = "Test Artist";

pub fn post_url(server: &MockServer, post_id: &str) -> String {
    format!("{}/{SERVICE}/user/{CREATOR_ID}/post/{post_id}", server.uri())
}

/// A listing entry served by `server` under `/data/{post_id}/{index}.bin`.
pub fn file_entry(server: &MockServer, post_id: &str, index: usize, name: &str) -> Value {
    json!({
        "server": server.uri(),
        "name": name,
        "path": format!("/{post_id}/{index}.bin"),
    })
}

pub async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{SERVICE}/user/{CREATOR_ID}/profile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": CREATOR_ID,
            "name": CREATOR_NAME,
            "service": SERVICE,
        })))
        .mount(server)
        .await;
}

/// Serves a post listing and the bytes of every file in it (`contents of {name}`).
pub async fn mount_post(server: &MockServer, post_id: &str, names: &[&str]) {
    let entries: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(index, name)| file_entry(server, post_id, index, name))
        .collect();
    let (previews, attachments) = entries.split_at(entries.len() / 2);

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/{SERVICE}/user/{CREATOR_ID}/post/{post_id}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "post": {"id": post_id, "title": format!("Post {post_id}")},
            "previews": previews,
            "attachments": attachments,
        })))
        .mount(server)
        .await;

    for (index, name) in names.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/data/{post_id}/{index}.bin")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("contents of {name}")))
            .mount(server)
            .await;
    }
}

pub fn post_dir(output_dir: &Path, post_id: &str) -> std::path::PathBuf {
    output_dir.join(SERVICE).join(CREATOR_NAME).join(post_id)
}

pub fn download_params(urls: Vec<String>, output_dir: &Path, threads: usize) -> DownloadParams {
    DownloadParams {
        urls,
        output_dir: output_dir.to_path_buf(),
        pool: PoolOptions {
            concurrency: threads,
            existing_files: ExistingFilePolicy::Skip,
        },
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
            multiplier: 2.0,
            jitter: true,
        },
        http: HttpConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            ..HttpConfig::default()
        },
        log_file: None,
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("kemono_dl_lib=debug,kemono_dl_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
