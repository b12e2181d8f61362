//! End-to-end scenarios against a scripted transport: trigger a job run,
//! poll it to completion, and round-trip a job definition through a file.

use async_trait::async_trait;
use dbt_cloud_core::client::{ApiRequest, ApiResponse, Client, Transport};
use dbt_cloud_core::command::job::{JobCreateCommand, JobRunCommand};
use dbt_cloud_core::command::Command;
use dbt_cloud_core::poll::{triggered_run_id, wait_for_run, PollOptions};
use dbt_cloud_core::{DbtCloudError, DbtCloudResult, Settings};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(bodies: Vec<Value>) -> Self {
        let responses = bodies
            .into_iter()
            .map(|body| ApiResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: body.to_string(),
            })
            .collect();
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> DbtCloudResult<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DbtCloudError::Http("script exhausted".to_string()))
    }
}

fn settings() -> Settings {
    Settings::default()
        .with_api_token("foo")
        .with_account_id(123456)
        .with_job_id(43167)
}

#[tokio::test]
async fn trigger_then_poll_to_success() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        json!({"data": {"id": 99}}),
        json!({"data": {"id": 99, "status": 1, "href": "https://cloud.getdbt.com/#/99/"}}),
        json!({"data": {"id": 99, "status": 10, "href": "https://cloud.getdbt.com/#/99/"}}),
    ]));
    let client = Client::with_transport(settings(), transport.clone());

    let run = JobRunCommand::from_options(json!({"cause": "CI"}), client.settings()).unwrap();
    let trigger = client.execute(&run).await.unwrap();
    assert_eq!(trigger.json().unwrap(), json!({"data": {"id": 99}}));

    let run_id = triggered_run_id(&trigger).unwrap();
    assert_eq!(run_id, 99);

    let options = PollOptions {
        interval: Duration::from_millis(1),
        timeout: None,
    };
    let final_response = wait_for_run(&client, run_id, &options, |_, _| {})
        .await
        .unwrap();
    assert_eq!(final_response.json().unwrap()["data"]["status"], json!(10));

    // One trigger call plus two status checks.
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

    let requests = transport.requests.lock().unwrap();
    assert_eq!(
        requests[0].url,
        "https://cloud.getdbt.com/api/v2/accounts/123456/jobs/43167/run/"
    );
    assert_eq!(
        requests[1].url,
        "https://cloud.getdbt.com/api/v2/accounts/123456/runs/99"
    );
}

#[tokio::test]
async fn failed_run_surfaces_diagnostics_link() {
    let transport = Arc::new(ScriptedTransport::new(vec![json!({
        "data": {"id": 99, "status": 20, "href": "https://cloud.getdbt.com/#/99/debug"}
    })]));
    let client = Client::with_transport(settings(), transport);

    let options = PollOptions {
        interval: Duration::from_millis(1),
        timeout: None,
    };
    let err = wait_for_run(&client, 99, &options, |_, _| {})
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ERROR"));
    assert!(message.contains("https://cloud.getdbt.com/#/99/debug"));
}

#[test]
fn job_export_import_round_trip() {
    // Export: a `job get` response's data object, with the
    // platform-assigned id stripped, written to disk.
    let exported = json!({
        "account_id": 123456,
        "project_id": 123457,
        "environment_id": 49819,
        "name": "Do nothing!",
        "execute_steps": ["dbt run -s not_a_model"],
        "triggers": {"github_webhook": false, "schedule": false, "custom_branch_only": true},
        "settings": {"threads": 4, "target_name": "default"},
        "state": 1,
        "generate_docs": false,
        "schedule": {
            "cron": "0 * * * *",
            "date": {"type": "every_day"},
            "time": {"type": "every_hour", "interval": 1},
        },
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");
    std::fs::write(&path, serde_json::to_string_pretty(&exported).unwrap()).unwrap();

    // Import: the file contents feed straight into job-create options.
    let contents = std::fs::read_to_string(&path).unwrap();
    let options: Value = serde_json::from_str(&contents).unwrap();
    let command = JobCreateCommand::from_options(options, &Settings::default()).unwrap();

    assert_eq!(command.name, "Do nothing!");
    assert_eq!(command.settings.threads, 4);
    assert!(command.triggers.custom_branch_only);

    let body = command.body().unwrap();
    assert_eq!(body["id"], json!(null));
    assert_eq!(body["account_id"], json!(123456));
    assert_eq!(body["schedule"]["date"]["type"], json!("every_day"));
}
