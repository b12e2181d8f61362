//! Pagination walkers
//!
//! The platform exposes two unrelated pagination styles, and the two
//! walkers here deliberately keep their different accumulation
//! behaviors:
//!
//! - **offset mode** concatenates every page's `data` into one combined
//!   result and recomputes the pagination count;
//! - **token mode** returns each page as a separate response for the
//!   caller to emit one by one.

use crate::client::{ApiResponse, Client};
use crate::command::Command;
use crate::error::{DbtCloudError, DbtCloudResult};
use once_cell::sync::Lazy;
use reqwest::header::HeaderName;
use serde_json::{json, Value};
use tracing::debug;

/// Header carrying the opaque cursor on token-paged list endpoints.
pub static CONTINUATION_TOKEN_HEADER: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static("x-dbt-continuation-token"));

/// A list command whose window advances by a numeric offset.
pub trait OffsetPaged: Command {
    fn offset(&self) -> u64;
    fn with_offset(&self, offset: u64) -> Self;
}

/// A list command that accepts a continuation token header.
pub trait TokenPaged: Command {
    fn with_token(&self, token: &str) -> Self;
}

fn page_window(body: &Value) -> DbtCloudResult<(u64, u64)> {
    let pagination = body
        .get("extra")
        .and_then(|extra| extra.get("pagination"))
        .ok_or_else(|| {
            DbtCloudError::Json("list response has no `extra.pagination` block".to_string())
        })?;
    let count = pagination.get("count").and_then(Value::as_u64);
    let total_count = pagination.get("total_count").and_then(Value::as_u64);
    match (count, total_count) {
        (Some(count), Some(total_count)) => Ok((count, total_count)),
        _ => Err(DbtCloudError::Json(
            "pagination block lacks `count`/`total_count`".to_string(),
        )),
    }
}

/// Walk an offset-paged list to exhaustion, concatenating pages.
///
/// Returns one synthesized response body: the final page's envelope with
/// `data` replaced by the concatenation of every page and
/// `extra.pagination.count` set to the accumulated length.
pub async fn paginate_offset<C: OffsetPaged>(
    client: &Client,
    command: &C,
) -> DbtCloudResult<Value> {
    let mut offset = command.offset();
    let mut accumulated: Vec<Value> = Vec::new();
    loop {
        let page = client.execute(&command.with_offset(offset)).await?;
        let mut body = page.json()?;
        let (count, total_count) = page_window(&body)?;

        match body.get_mut("data").and_then(Value::as_array_mut) {
            Some(items) => accumulated.append(items),
            None => {
                return Err(DbtCloudError::Json(
                    "list response `data` is not an array".to_string(),
                ))
            }
        }

        offset += count;
        debug!(offset, total_count, "walked one page");
        if count == 0 || offset >= total_count {
            let accumulated_len = accumulated.len();
            body["data"] = Value::Array(accumulated);
            body["extra"]["pagination"]["count"] = json!(accumulated_len);
            return Ok(body);
        }
    }
}

/// Walk a token-paged list to exhaustion, one response per page.
///
/// The first request goes out exactly as given; while a response carries
/// the continuation header, the same request is re-issued with the token
/// attached. Pages are returned in order, not merged.
pub async fn paginate_token<C: TokenPaged>(
    client: &Client,
    command: &C,
) -> DbtCloudResult<Vec<ApiResponse>> {
    let mut pages = Vec::new();
    let mut response = client.execute(command).await?;
    loop {
        let token = response.header(&CONTINUATION_TOKEN_HEADER);
        pages.push(response);
        match token {
            Some(token) => {
                debug!(page = pages.len() + 1, "following continuation token");
                response = client.execute(&command.with_token(&token)).await?;
            }
            None => return Ok(pages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{ok_response, ok_response_with_header, ScriptedTransport};
    use crate::command::audit_log::AuditLogGetCommand;
    use crate::command::run::RunListCommand;
    use crate::config::Settings;
    use std::sync::Arc;

    fn client(transport: Arc<ScriptedTransport>) -> Client {
        let settings = Settings::default()
            .with_api_token("foo")
            .with_account_id(123456);
        Client::with_transport(settings, transport)
    }

    fn page(len: usize, total_count: u64) -> crate::client::ApiResponse {
        let items: Vec<Value> = (0..len).map(|i| json!({"id": i})).collect();
        ok_response(json!({
            "data": items,
            "extra": {"pagination": {"count": len, "total_count": total_count}},
        }))
    }

    #[tokio::test]
    async fn offset_walker_concatenates_pages() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            page(100, 237),
            page(100, 237),
            page(37, 237),
        ]));
        let client = client(transport.clone());
        let command = AuditLogGetCommand::new(client.settings(), None, None, 0, 100).unwrap();

        let combined = paginate_offset(&client, &command).await.unwrap();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(combined["data"].as_array().unwrap().len(), 237);
        assert_eq!(combined["extra"]["pagination"]["count"], json!(237));

        // Offsets advanced by each page's count: 0, 100, 200.
        let requests = transport.requests.lock().unwrap();
        let offsets: Vec<String> = requests
            .iter()
            .map(|request| {
                request
                    .query
                    .iter()
                    .find(|(key, _)| key == "offset")
                    .map(|(_, value)| value.clone())
                    .unwrap()
            })
            .collect();
        assert_eq!(offsets, vec!["0", "100", "200"]);
    }

    #[tokio::test]
    async fn offset_walker_handles_single_page() {
        let transport = Arc::new(ScriptedTransport::new(vec![page(5, 5)]));
        let client = client(transport.clone());
        let command = AuditLogGetCommand::new(client.settings(), None, None, 0, 100).unwrap();

        let combined = paginate_offset(&client, &command).await.unwrap();
        assert_eq!(transport.call_count(), 1);
        assert_eq!(combined["data"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn offset_walker_stops_on_empty_page() {
        // A zero-count page must not loop forever even if total_count lies.
        let transport = Arc::new(ScriptedTransport::new(vec![page(0, 10)]));
        let client = client(transport.clone());
        let command = AuditLogGetCommand::new(client.settings(), None, None, 0, 100).unwrap();

        let combined = paginate_offset(&client, &command).await.unwrap();
        assert_eq!(transport.call_count(), 1);
        assert_eq!(combined["extra"]["pagination"]["count"], json!(0));
    }

    #[tokio::test]
    async fn token_walker_emits_each_page() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok_response_with_header(
                json!({"data": [{"id": 1}]}),
                CONTINUATION_TOKEN_HEADER.clone(),
                "cursor-1",
            ),
            ok_response_with_header(
                json!({"data": [{"id": 2}]}),
                CONTINUATION_TOKEN_HEADER.clone(),
                "cursor-2",
            ),
            ok_response(json!({"data": [{"id": 3}]})),
        ]));
        let client = client(transport.clone());
        let command = RunListCommand::new(client.settings()).unwrap();

        let pages = paginate_token(&client, &command).await.unwrap();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].json().unwrap()["data"][0]["id"], json!(1));
        assert_eq!(pages[2].json().unwrap()["data"][0]["id"], json!(3));

        // Token from page N rides on request N+1; the first request has none.
        let requests = transport.requests.lock().unwrap();
        assert!(requests[0]
            .headers
            .iter()
            .all(|(name, _)| name != &*CONTINUATION_TOKEN_HEADER));
        assert!(requests[1]
            .headers
            .iter()
            .any(|(name, value)| name == &*CONTINUATION_TOKEN_HEADER && value == "cursor-1"));
        assert!(requests[2]
            .headers
            .iter()
            .any(|(name, value)| name == &*CONTINUATION_TOKEN_HEADER && value == "cursor-2"));
    }

    #[tokio::test]
    async fn token_walker_single_page_without_token() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_response(
            json!({"data": []}),
        )]));
        let client = client(transport.clone());
        let command = RunListCommand::new(client.settings()).unwrap();

        let pages = paginate_token(&client, &command).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(transport.call_count(), 1);
    }
}
