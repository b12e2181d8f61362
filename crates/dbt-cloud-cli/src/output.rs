//! Response printing and exit-status helpers

use anyhow::anyhow;
use console::style;
use dbt_cloud_core::poll::RunStatus;
use dbt_cloud_core::redact::sanitize_error_text;
use dbt_cloud_core::ApiResponse;

/// Print a response body: pretty JSON when it parses, raw text otherwise
/// (artifacts are arbitrary files).
pub fn print_body(response: &ApiResponse) {
    match response.json() {
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", response.body),
        },
        Err(_) => println!("{}", response.body),
    }
}

/// Print the body, then fail on a non-2xx status.
///
/// The platform often returns a useful error document; the operator sees
/// it either way, and the process exit code still reports the failure.
pub fn finish(response: &ApiResponse) -> anyhow::Result<()> {
    print_body(response);
    ensure_success(response)
}

/// Non-2xx becomes a process error after the body has been shown.
pub fn ensure_success(response: &ApiResponse) -> anyhow::Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(anyhow!(
            "dbt Cloud API responded with status {}: {}",
            response.status.as_u16(),
            sanitize_error_text(&response.body)
        ))
    }
}

/// One poll-progress line, in the shape operators grep for:
/// `Job 43167 run 99: RUNNING ...`
pub fn print_poll_status(job_id: u64, run_id: u64, status: RunStatus) {
    println!(
        "Job {} run {}: {} ...",
        job_id,
        run_id,
        style(status.as_str()).bold()
    );
}
