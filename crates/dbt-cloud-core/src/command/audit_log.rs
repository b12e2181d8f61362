//! Audit log commands

use crate::command::{ApiVersion, Command};
use crate::config::Settings;
use crate::error::DbtCloudResult;
use crate::paginate::OffsetPaged;
use reqwest::Method;

/// Retrieves audit logs for the dbt Cloud account (v3).
///
/// Supports offset pagination; see [`crate::paginate::paginate_offset`].
#[derive(Debug, Clone)]
pub struct AuditLogGetCommand {
    pub account_id: u64,
    /// Start date (YYYY-MM-DD) for the returned logs.
    pub logged_at_start: Option<String>,
    /// End date (YYYY-MM-DD) for the returned logs.
    pub logged_at_end: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl AuditLogGetCommand {
    pub fn new(
        settings: &Settings,
        logged_at_start: Option<String>,
        logged_at_end: Option<String>,
        offset: u64,
        limit: u64,
    ) -> DbtCloudResult<Self> {
        Ok(Self {
            account_id: settings.require_account_id()?,
            logged_at_start,
            logged_at_end,
            offset,
            limit,
        })
    }
}

impl Command for AuditLogGetCommand {
    fn method(&self) -> Method {
        Method::GET
    }

    fn api_version(&self) -> ApiVersion {
        ApiVersion::V3
    }

    fn path(&self) -> String {
        format!("/accounts/{}/audit-logs/", self.account_id)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(start) = &self.logged_at_start {
            query.push(("logged_at_start", start.clone()));
        }
        if let Some(end) = &self.logged_at_end {
            query.push(("logged_at_end", end.clone()));
        }
        query.push(("offset", self.offset.to_string()));
        query.push(("limit", self.limit.to_string()));
        query
    }
}

impl OffsetPaged for AuditLogGetCommand {
    fn offset(&self) -> u64 {
        self.offset
    }

    fn with_offset(&self, offset: u64) -> Self {
        let mut next = self.clone();
        next.offset = offset;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_uses_v3_and_window_query() {
        let settings = Settings::default().with_account_id(123456);
        let cmd = AuditLogGetCommand::new(
            &settings,
            Some("2023-01-01".into()),
            None,
            0,
            100,
        )
        .unwrap();
        assert_eq!(
            cmd.url(&settings),
            "https://cloud.getdbt.com/api/v3/accounts/123456/audit-logs/"
        );
        assert_eq!(
            cmd.query(),
            vec![
                ("logged_at_start", "2023-01-01".to_string()),
                ("offset", "0".to_string()),
                ("limit", "100".to_string()),
            ]
        );
    }

    #[test]
    fn with_offset_advances_only_the_offset() {
        let settings = Settings::default().with_account_id(123456);
        let cmd = AuditLogGetCommand::new(&settings, None, None, 0, 100).unwrap();
        let next = cmd.with_offset(100);
        assert_eq!(next.offset(), 100);
        assert_eq!(next.limit, 100);
    }
}
