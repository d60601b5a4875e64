// ABOUTME: Settings discovery with precedence chain
// ABOUTME: CLI flag → environment variable (after .env is loaded)

use crate::api::DEFAULT_ENDPOINT;
use crate::{Error, Result};
use reqwest::Url;
use std::path::PathBuf;

pub const TOKEN_VAR: &str = "CANVAS_AUTH_TOKEN";
pub const USER_ID_VAR: &str = "CANVAS_USER_ID";
pub const ENDPOINT_VAR: &str = "CANVAS_ENDPOINT";

/// Loads `.env` from the working directory or its parents, if one exists.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Process environment lookup used outside tests.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub user_id: u64,
    pub endpoint: String,
}

impl Settings {
    pub fn resolve<F>(
        token: Option<String>,
        user_id: Option<u64>,
        endpoint: Option<String>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Settings {
            token: resolve_token(token, &lookup)?,
            user_id: resolve_user_id(user_id, &lookup)?,
            endpoint: resolve_endpoint(endpoint, &lookup)?,
        })
    }
}

pub fn resolve_token<F>(cli_token: Option<String>, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. CLI flag
    if let Some(token) = present(cli_token) {
        return Ok(token);
    }

    // 2. Environment variable
    if let Some(token) = present(lookup(TOKEN_VAR)) {
        return Ok(token);
    }

    Err(Error::Config(format!(
        "No Canvas token found. Provide via --token or the {} env var",
        TOKEN_VAR
    )))
}

pub fn resolve_user_id<F>(cli_user_id: Option<u64>, lookup: F) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = cli_user_id {
        return Ok(id);
    }

    match present(lookup(USER_ID_VAR)) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::Config(format!("{} must be a number, got `{}`", USER_ID_VAR, raw))
        }),
        None => Err(Error::Config(format!(
            "No Canvas user id found. Provide via --user-id or the {} env var",
            USER_ID_VAR
        ))),
    }
}

pub fn resolve_endpoint<F>(cli_endpoint: Option<String>, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = present(cli_endpoint)
        .or_else(|| present(lookup(ENDPOINT_VAR)))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let url = Url::parse(&endpoint)
        .map_err(|e| Error::Config(format!("Invalid endpoint `{}`: {}", endpoint, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Endpoint must be http or https, got `{}`",
            endpoint
        )));
    }

    Ok(endpoint)
}
