//! Declarative command model
//!
//! Every API operation is a command: a struct whose fields are the
//! request payload (or query parameters) plus the identifiers that ride
//! in the URL path. The [`Command`] trait describes how a populated
//! command maps onto exactly one HTTP request; the dispatcher in
//! [`crate::client`] does the rest.
//!
//! Auth and host values are not command fields. They live in
//! [`Settings`] and are attached by the dispatcher, which keeps them out
//! of serialized payloads by construction.

pub mod account;
pub mod audit_log;
pub mod connection;
pub mod environment;
pub mod job;
pub mod metadata;
pub mod project;
pub mod run;

use crate::config::Settings;
use crate::error::{DbtCloudError, DbtCloudResult};
use reqwest::header::HeaderName;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// API version path segment for a resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V2,
    V3,
    V4,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2 => "v2",
            ApiVersion::V3 => "v3",
            ApiVersion::V4 => "v4",
        }
    }
}

/// Authorization header scheme expected by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Token <api_token>` — the REST API.
    Token,
    /// `Authorization: Bearer <api_token>` — the metadata API.
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, api_token: &str) -> String {
        match self {
            AuthScheme::Token => format!("Token {api_token}"),
            AuthScheme::Bearer => format!("Bearer {api_token}"),
        }
    }
}

/// One API operation, fully determined by the command's fields.
pub trait Command: Send + Sync {
    /// HTTP verb.
    fn method(&self) -> Method;

    /// Versioned API segment the resource lives under.
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    /// Resource path under `/api/{version}`, path parameters substituted.
    fn path(&self) -> String;

    /// Query parameters; `None`-valued filters are omitted entirely.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON request body, if the operation carries one.
    fn body(&self) -> Option<Value> {
        None
    }

    /// Additional request headers (continuation tokens ride here).
    fn headers(&self) -> Vec<(HeaderName, String)> {
        Vec::new()
    }

    /// Authorization scheme for this endpoint.
    fn auth(&self) -> AuthScheme {
        AuthScheme::Token
    }

    /// Full request URL: scheme + host, version segment, resource path.
    fn url(&self, settings: &Settings) -> String {
        format!(
            "https://{}/api/{}{}",
            settings.host,
            self.api_version().as_str(),
            self.path()
        )
    }
}

/// Construct a command from a nested field-value mapping (the output of
/// [`crate::translate::unflatten`] or an imported JSON file).
///
/// Serde's missing-field and unknown-variant failures are mapped onto the
/// local validation taxonomy so they surface before any network call.
pub fn from_options<T: DeserializeOwned>(options: Value) -> DbtCloudResult<T> {
    serde_json::from_value(options).map_err(classify_deserialize_error)
}

/// Fill `field` from `fallback` when absent (or null) in `options`;
/// error with the environment hint when neither side supplies it.
///
/// Explicitly provided options always win over fallback values.
pub(crate) fn ensure_field(
    options: &mut Value,
    field: &str,
    fallback: Option<Value>,
    env_var: &str,
) -> DbtCloudResult<()> {
    let map = options
        .as_object_mut()
        .ok_or_else(|| DbtCloudError::config("command options must be a JSON object"))?;
    if map.get(field).map_or(true, Value::is_null) {
        match fallback {
            Some(value) => {
                map.insert(field.to_string(), value);
            }
            None => return Err(DbtCloudError::missing_field_with_env(field, env_var)),
        }
    }
    Ok(())
}

/// Serialize a payload struct into its wire body. Payload structs are
/// plain data; conversion cannot fail.
pub(crate) fn payload<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn classify_deserialize_error(err: serde_json::Error) -> DbtCloudError {
    let message = err.to_string();
    if let Some(field) = between_backticks(&message, "missing field ") {
        return DbtCloudError::missing_field(field);
    }
    if let Some(value) = between_backticks(&message, "unknown variant ") {
        let expected = message
            .split_once("expected ")
            .map(|(_, rest)| rest.trim_start_matches("one of "))
            .unwrap_or("")
            .split(" at ")
            .next()
            .unwrap_or("")
            .replace('`', "");
        // Every discriminated union in the command model keys off a
        // `type` field.
        return DbtCloudError::invalid_choice("type", value, expected);
    }
    DbtCloudError::Json(message)
}

fn between_backticks<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let rest = message.split_once(marker)?.1;
    let rest = rest.strip_prefix('`')?;
    rest.split_once('`').map(|(inner, _)| inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
        #[serde(default)]
        threads: u32,
    }

    #[test]
    fn from_options_applies_serde_defaults() {
        let probe: Probe = from_options(json!({"name": "nightly"})).unwrap();
        assert_eq!(probe.name, "nightly");
        assert_eq!(probe.threads, 0);
    }

    #[test]
    fn missing_field_maps_to_validation_error() {
        let err = from_options::<Probe>(json!({"threads": 2})).unwrap_err();
        assert!(matches!(
            err,
            DbtCloudError::MissingRequiredField { ref field, .. } if field == "name"
        ));
    }

    #[test]
    fn ensure_field_prefers_explicit_value() {
        let mut options = json!({"job_id": 1});
        ensure_field(&mut options, "job_id", Some(json!(99)), "DBT_CLOUD_JOB_ID").unwrap();
        assert_eq!(options["job_id"], json!(1));
    }

    #[test]
    fn ensure_field_fills_from_fallback() {
        let mut options = json!({});
        ensure_field(&mut options, "job_id", Some(json!(99)), "DBT_CLOUD_JOB_ID").unwrap();
        assert_eq!(options["job_id"], json!(99));
    }

    #[test]
    fn ensure_field_errors_without_fallback() {
        let mut options = json!({});
        let err = ensure_field(&mut options, "job_id", None, "DBT_CLOUD_JOB_ID").unwrap_err();
        assert!(err.to_string().contains("DBT_CLOUD_JOB_ID"));
    }
}
