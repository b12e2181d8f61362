//! Run-status polling
//!
//! Turns the platform's trigger-then-check API into a synchronous wait:
//! keep fetching the run until it reaches a terminal state. The interval
//! is fixed (no backoff); the deadline is the caller's choice, with
//! `None` matching the platform client's historical unbounded behavior.

use crate::client::{ApiResponse, Client};
use crate::command::run::RunGetCommand;
use crate::error::{DbtCloudError, DbtCloudResult};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Lifecycle states of a run, as reported by the v2 API's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    Starting,
    Running,
    Success,
    Error,
    Cancelled,
}

impl RunStatus {
    /// Decode the platform's numeric status code.
    pub fn from_code(code: u64) -> DbtCloudResult<Self> {
        match code {
            1 => Ok(RunStatus::Queued),
            2 => Ok(RunStatus::Starting),
            3 => Ok(RunStatus::Running),
            10 => Ok(RunStatus::Success),
            20 => Ok(RunStatus::Error),
            30 => Ok(RunStatus::Cancelled),
            other => Err(DbtCloudError::invalid_choice(
                "status",
                other.to_string(),
                "1, 2, 3, 10, 20, 30",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "QUEUED",
            RunStatus::Starting => "STARTING",
            RunStatus::Running => "RUNNING",
            RunStatus::Success => "SUCCESS",
            RunStatus::Error => "ERROR",
            RunStatus::Cancelled => "CANCELLED",
        }
    }

    /// A run in a terminal state will never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Error | RunStatus::Cancelled
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pacing and deadline for [`wait_for_run`].
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between status checks.
    pub interval: Duration,
    /// Overall deadline; `None` polls until a terminal state.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Extract the numeric status from a run response.
pub fn run_status(response: &ApiResponse) -> DbtCloudResult<RunStatus> {
    let json = response.json()?;
    let code = json
        .get("data")
        .and_then(|data| data.get("status"))
        .and_then(|status| status.as_u64())
        .ok_or_else(|| {
            DbtCloudError::Json("run response has no numeric `data.status`".to_string())
        })?;
    RunStatus::from_code(code)
}

/// Poll a run until it reaches a terminal state.
///
/// Every observed status is handed to `on_status` before the poller
/// decides what to do with it. On SUCCESS the final response is
/// returned; ERROR and CANCELLED raise [`DbtCloudError::RunFailed`]
/// carrying the run's `data.href` diagnostics link.
pub async fn wait_for_run<F>(
    client: &Client,
    run_id: u64,
    options: &PollOptions,
    mut on_status: F,
) -> DbtCloudResult<ApiResponse>
where
    F: FnMut(RunStatus, &ApiResponse),
{
    let started = Instant::now();
    loop {
        let command = RunGetCommand::new(client.settings(), run_id, Vec::new())?;
        let response = client.execute(&command).await?;
        let status = run_status(&response)?;
        on_status(status, &response);

        match status {
            RunStatus::Success => {
                debug!(run_id, "run completed");
                return Ok(response);
            }
            RunStatus::Error | RunStatus::Cancelled => {
                let href = response
                    .json()
                    .ok()
                    .and_then(|json| {
                        json.get("data")
                            .and_then(|data| data.get("href"))
                            .and_then(|href| href.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_default();
                warn!(run_id, status = %status, "run reached terminal failure");
                return Err(DbtCloudError::RunFailed {
                    status: status.as_str().to_string(),
                    href,
                });
            }
            RunStatus::Queued | RunStatus::Starting | RunStatus::Running => {
                if let Some(timeout) = options.timeout {
                    if started.elapsed() >= timeout {
                        return Err(DbtCloudError::PollTimeout {
                            seconds: timeout.as_secs(),
                        });
                    }
                }
                tokio::time::sleep(options.interval).await;
            }
        }
    }
}

/// Resolve settings for polling a run that was just triggered.
///
/// Convenience used by `job run --wait`: reads the new run's id out of
/// the trigger response.
pub fn triggered_run_id(response: &ApiResponse) -> DbtCloudResult<u64> {
    response
        .data()?
        .get("id")
        .and_then(|id| id.as_u64())
        .ok_or_else(|| DbtCloudError::Json("trigger response has no `data.id`".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{ok_response, ScriptedTransport};
    use crate::config::Settings;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<ScriptedTransport>) -> Client {
        let settings = Settings::default()
            .with_api_token("foo")
            .with_account_id(123456);
        Client::with_transport(settings, transport)
    }

    fn status_response(code: u64) -> crate::client::ApiResponse {
        ok_response(json!({"data": {"id": 99, "status": code, "href": "https://cloud.getdbt.com/#/99/"}}))
    }

    fn fast() -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(1),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn polls_until_success() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status_response(1),
            status_response(3),
            status_response(10),
        ]));
        let client = client(transport.clone());

        let mut observed = Vec::new();
        let response = wait_for_run(&client, 99, &fast(), |status, _| observed.push(status))
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(
            observed,
            vec![RunStatus::Queued, RunStatus::Running, RunStatus::Success]
        );
        assert_eq!(run_status(&response).unwrap(), RunStatus::Success);
    }

    #[tokio::test]
    async fn terminal_failure_raises_with_href() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status_response(1),
            status_response(20),
        ]));
        let client = client(transport.clone());

        let err = wait_for_run(&client, 99, &fast(), |_, _| {}).await.unwrap_err();
        assert_eq!(transport.call_count(), 2);
        match err {
            DbtCloudError::RunFailed { status, href } => {
                assert_eq!(status, "ERROR");
                assert_eq!(href, "https://cloud.getdbt.com/#/99/");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_is_terminal_failure() {
        let transport = Arc::new(ScriptedTransport::new(vec![status_response(30)]));
        let client = client(transport.clone());
        let err = wait_for_run(&client, 99, &fast(), |_, _| {}).await.unwrap_err();
        assert!(matches!(err, DbtCloudError::RunFailed { .. }));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn deadline_cuts_off_nonterminal_polling() {
        // More queued responses than the deadline allows.
        let transport = Arc::new(ScriptedTransport::new(
            (0..50).map(|_| status_response(1)).collect(),
        ));
        let client = client(transport.clone());
        let options = PollOptions {
            interval: Duration::from_millis(5),
            timeout: Some(Duration::from_millis(1)),
        };

        let err = wait_for_run(&client, 99, &options, |_, _| {}).await.unwrap_err();
        assert!(matches!(err, DbtCloudError::PollTimeout { .. }));
        assert!(transport.call_count() < 50);
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        let err = RunStatus::from_code(42).unwrap_err();
        assert!(matches!(err, DbtCloudError::InvalidChoice { .. }));
    }

    #[test]
    fn terminal_states() {
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Error.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Starting.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn trigger_response_yields_run_id() {
        let response = ok_response(json!({"data": {"id": 781929}}));
        assert_eq!(triggered_run_id(&response).unwrap(), 781929);
    }
}
