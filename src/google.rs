// ABOUTME: Shared Google REST plumbing for the course-agent application
// ABOUTME: Sends authorized JSON requests and maps failures to backend errors

use crate::auth::GoogleAuth;
use crate::errors::{AgentError, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Authorized JSON client shared by the Slides, Docs, Drive and Gmail drivers
#[derive(Clone)]
pub struct GoogleApi {
    client: Client,
    auth: Arc<GoogleAuth>,
}

impl GoogleApi {
    pub fn new(auth: Arc<GoogleAuth>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(AgentError::FetchError)?;
        Ok(Self { client, auth })
    }

    pub fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        debug!("GET {}", url);
        let request = self.client.get(url).query(query);
        self.send(request)
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Value> {
        debug!("POST {}", url);
        let request = self.client.post(url).query(query).json(body);
        self.send(request)
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let token = self.auth.access_token()?;
        let response = request.bearer_auth(token).send().map_err(|e| AgentError::BackendError {
            message: format!("Request failed: {}", e),
            source: Some(Box::new(e)),
        })?;
        read_json(response)
    }
}

fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().unwrap_or_default();
        return Err(AgentError::backend(format!(
            "Google API returned {}: {}",
            status, text
        )));
    }
    let text = response.text()?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Read a string field from a response, or fail with a backend error
pub fn required_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::backend(format!("Response is missing `{}`", pointer)))
}
