use kemono_dl_lib::cli::{init_tracing, parse_args, resolve_command, run_download};
use kemono_dl_lib::http::ReqwestTransport;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;
    let _log_guard = init_tracing(args.log_level, params.log_file.as_deref())?;

    // One client for the whole run, dropped once the pool has finished.
    let transport = Arc::new(ReqwestTransport::new(&params.http)?);
    let summary = run_download(params, transport).await?;

    println!("{summary}");

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
