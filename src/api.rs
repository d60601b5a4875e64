// ABOUTME: Blocking GraphQL client for the Canvas API
// ABOUTME: Posts named queries with bearer auth and fails fast on HTTP or GraphQL errors

use crate::canvas::{decode_enrollments, Enrollment};
use crate::query::{Query, COURSES_QUERY, MODEL_QUERY};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://canvas.liberty.edu/api/graphql";

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

pub fn unwrap_response(mut body: Value) -> Result<Value> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::GraphQl(messages));
        }
    }

    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(Error::GraphQl("response has no data".into())),
    }
}

pub struct ApiClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl ApiClient {
    pub fn new(token: String, endpoint: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(ApiClient {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fire(&self, query: &Query, variables: Value) -> Result<Value> {
        debug!(query = query.name, endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .header("User-Agent", "canvas-things/0.1 (Rust)")
            .json(&json!({
                "query": query.document(),
                "variables": variables,
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            let preview = truncate_str(&message, 100);
            return Err(Error::Api {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                message: preview,
            });
        }

        let body = response.text()?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            debug!(
                query = query.name,
                body = %truncate_str(&body, 500),
                "failed to parse response"
            );
            Error::Parse(e)
        })?;

        unwrap_response(value)
    }

    pub fn enrollments(&self, user_id: u64) -> Result<Vec<Enrollment>> {
        let data = self.fire(&MODEL_QUERY, json!({ "id": user_id }))?;
        let enrollments = decode_enrollments(&data)?;
        info!(count = enrollments.len(), "fetched enrollments");
        Ok(enrollments)
    }

    pub fn course_list(&self, user_id: u64) -> Result<Vec<Enrollment>> {
        let data = self.fire(&COURSES_QUERY, json!({ "id": user_id }))?;
        Ok(decode_enrollments(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 100), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        let result = truncate_str("hello world", 7);
        assert!(result.starts_with("hello"));
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_str_utf8() {
        let text = "Grüße aus Köln, Grüße aus Köln";
        let result = truncate_str(text, 3);
        assert_eq!(result, "Gr...");
    }

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("test_token".into(), DEFAULT_ENDPOINT.into()).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(client.token, "test_token");
    }

    #[test]
    fn test_unwrap_response_returns_data() {
        let data = unwrap_response(json!({ "data": { "Model": null } })).unwrap();
        assert_eq!(data, json!({ "Model": null }));
    }

    #[test]
    fn test_unwrap_response_joins_error_messages() {
        let err = unwrap_response(json!({
            "data": null,
            "errors": [{ "message": "not found" }, { "message": "denied" }]
        }))
        .unwrap_err();
        match err {
            Error::GraphQl(message) => assert_eq!(message, "not found; denied"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_response_empty_errors_is_ignored() {
        let data = unwrap_response(json!({ "data": { "ok": true }, "errors": [] })).unwrap();
        assert_eq!(data["ok"], true);
    }

    #[test]
    fn test_unwrap_response_missing_data() {
        assert!(matches!(
            unwrap_response(json!({ "data": null })),
            Err(Error::GraphQl(_))
        ));
        assert!(matches!(unwrap_response(json!({})), Err(Error::GraphQl(_))));
    }
}
