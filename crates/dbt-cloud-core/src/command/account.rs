//! Account commands

use crate::command::Command;
use crate::config::Settings;
use crate::error::DbtCloudResult;
use reqwest::Method;

/// Retrieves all accounts the token can see.
#[derive(Debug, Clone, Default)]
pub struct AccountListCommand;

impl AccountListCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for AccountListCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "/accounts/".to_string()
    }
}

/// Retrieves dbt Cloud account information.
#[derive(Debug, Clone)]
pub struct AccountGetCommand {
    pub account_id: u64,
}

impl AccountGetCommand {
    pub fn new(settings: &Settings) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
        })
    }
}

impl Command for AccountGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/accounts/{}", self.account_id)
    }
}
