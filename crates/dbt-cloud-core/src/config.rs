//! Process-level settings for the dbt Cloud API
//!
//! Environment variables are read exactly once, at the process boundary,
//! and injected into [`Settings`]. Command construction and dispatch never
//! touch the environment themselves.

use crate::error::{DbtCloudError, DbtCloudResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Default dbt Cloud hostname.
pub const DEFAULT_HOST: &str = "cloud.getdbt.com";

/// Environment variable supplying the API token.
pub const ENV_API_TOKEN: &str = "DBT_CLOUD_API_TOKEN";
/// Environment variable overriding the API hostname.
pub const ENV_HOST: &str = "DBT_CLOUD_HOST";
/// Environment variable supplying the default account id.
pub const ENV_ACCOUNT_ID: &str = "DBT_CLOUD_ACCOUNT_ID";
/// Environment variable supplying the default job id.
pub const ENV_JOB_ID: &str = "DBT_CLOUD_JOB_ID";

/// Ambient configuration for talking to the dbt Cloud API.
///
/// `api_token`, `account_id` and `job_id` stay optional here; commands
/// that need them fail construction with a `MissingRequiredField` error
/// that names the environment fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API hostname, without scheme.
    pub host: String,
    /// API authentication token. Never logged or serialized into payloads.
    pub api_token: Option<String>,
    /// Account scope for account-scoped resources.
    pub account_id: Option<u64>,
    /// Default job id for job commands.
    pub job_id: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_token: None,
            account_id: None,
            job_id: None,
        }
    }
}

impl Settings {
    /// Build settings from `DBT_CLOUD_*` environment variables.
    pub fn from_env() -> DbtCloudResult<Self> {
        Ok(Self {
            host: env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            api_token: env::var(ENV_API_TOKEN).ok(),
            account_id: parse_id_var(ENV_ACCOUNT_ID)?,
            job_id: parse_id_var(ENV_JOB_ID)?,
        })
    }

    /// Override the hostname.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the API token.
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Override the account id.
    pub fn with_account_id(mut self, account_id: u64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Override the default job id.
    pub fn with_job_id(mut self, job_id: u64) -> Self {
        self.job_id = Some(job_id);
        self
    }

    /// The API token, or a field error naming the environment fallback.
    pub fn require_api_token(&self) -> DbtCloudResult<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| DbtCloudError::missing_field_with_env("api_token", ENV_API_TOKEN))
    }

    /// The account id, or a field error naming the environment fallback.
    pub fn require_account_id(&self) -> DbtCloudResult<u64> {
        self.account_id
            .ok_or_else(|| DbtCloudError::missing_field_with_env("account_id", ENV_ACCOUNT_ID))
    }

    /// The job id, or a field error naming the environment fallback.
    pub fn require_job_id(&self) -> DbtCloudResult<u64> {
        self.job_id
            .ok_or_else(|| DbtCloudError::missing_field_with_env("job_id", ENV_JOB_ID))
    }
}

fn parse_id_var(var: &str) -> DbtCloudResult<Option<u64>> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DbtCloudError::config(format!("Invalid {var} value: {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbtCloudError;

    // Env-var tests mutate process state; serialize them on one lock.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn from_env_picks_up_token_and_ids() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(ENV_API_TOKEN, "token-from-env");
        env::set_var(ENV_ACCOUNT_ID, "123456");
        env::remove_var(ENV_JOB_ID);
        env::remove_var(ENV_HOST);

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_token.as_deref(), Some("token-from-env"));
        assert_eq!(settings.account_id, Some(123456));
        assert_eq!(settings.job_id, None);
        assert_eq!(settings.host, DEFAULT_HOST);

        env::remove_var(ENV_API_TOKEN);
        env::remove_var(ENV_ACCOUNT_ID);
    }

    #[test]
    fn missing_env_fallback_is_a_field_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_JOB_ID);
        let settings = Settings::from_env().unwrap();
        let err = settings.require_job_id().unwrap_err();
        assert!(matches!(
            err,
            DbtCloudError::MissingRequiredField { ref field, .. } if field == "job_id"
        ));
        assert!(err.to_string().contains(ENV_JOB_ID));
    }

    #[test]
    fn malformed_numeric_env_value_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(ENV_ACCOUNT_ID, "not-a-number");
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, DbtCloudError::Config(_)));
        env::remove_var(ENV_ACCOUNT_ID);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = Settings::default()
            .with_host("emea.getdbt.com")
            .with_api_token("abc")
            .with_account_id(1)
            .with_job_id(2);
        assert_eq!(settings.host, "emea.getdbt.com");
        assert_eq!(settings.require_api_token().unwrap(), "abc");
        assert_eq!(settings.require_account_id().unwrap(), 1);
        assert_eq!(settings.require_job_id().unwrap(), 2);
    }
}
