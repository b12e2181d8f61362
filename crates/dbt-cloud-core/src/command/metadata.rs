//! Metadata API commands

use crate::command::{AuthScheme, Command};
use crate::config::Settings;
use reqwest::Method;
use serde_json::{json, Value};

/// Queries the dbt Cloud Metadata API using GraphQL.
///
/// The metadata API lives on its own hostname and authenticates with a
/// `Bearer` header instead of `Token`.
#[derive(Debug, Clone)]
pub struct MetadataQueryCommand {
    pub query: String,
}

impl MetadataQueryCommand {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl Command for MetadataQueryCommand {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        "/graphql".to_string()
    }

    fn auth(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    fn body(&self) -> Option<Value> {
        Some(json!({"query": self.query}))
    }

    fn url(&self, settings: &Settings) -> String {
        format!("https://metadata.{}/graphql", settings.host)
    }
}
