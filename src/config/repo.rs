// ABOUTME: Package repository entries with optional credentials.
// ABOUTME: Credentials use the Value shape and are always redacted in logs.

use serde::Deserialize;

use super::Value;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

impl RepoConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: Value, password: Value) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }
}
