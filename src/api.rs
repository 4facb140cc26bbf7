use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const SUGGESTION_PATH: &str = "/api/get-suggestion";
const UPDATE_SCHEDULE_PATH: &str = "/api/update-schedule";
const CLOCK_OUT_PATH: &str = "/api/clock-out";

#[derive(Serialize)]
struct UpdateScheduleRequest<'a> {
    plan: &'a str,
}

#[derive(Serialize)]
struct ClockOutRequest {}

#[derive(Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ActionResponse {
    #[serde(default)]
    message: String,
}

/// What the suggestion endpoint had to say for today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// `status` was `"success"`; carries the suggestion text.
    Ready(String),
    /// Any other `status`; carries whatever message the server sent.
    Unavailable(String),
}

/// Result of a clock-out or schedule update. `success` mirrors the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_suggestion(&self) -> Result<Suggestion> {
        let url = self.url(SUGGESTION_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let http_status = response.status();
        let body: SuggestionResponse = response
            .json()
            .await
            .with_context(|| format!("GET {url} returned an unreadable body ({http_status})"))?;

        debug!(%http_status, status = ?body.status, "suggestion response");

        if body.status.as_deref() == Some("success") {
            Ok(Suggestion::Ready(body.message))
        } else {
            Ok(Suggestion::Unavailable(body.message))
        }
    }

    pub async fn clock_out(&self) -> Result<ActionOutcome> {
        self.post_action(CLOCK_OUT_PATH, &ClockOutRequest {}).await
    }

    /// Sends `plan` as-is; callers trim and validate it first.
    pub async fn update_schedule(&self, plan: &str) -> Result<ActionOutcome> {
        self.post_action(UPDATE_SCHEDULE_PATH, &UpdateScheduleRequest { plan }).await
    }

    async fn post_action<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ActionOutcome> {
        let url = self.url(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;

        let http_status = response.status();
        let body: ActionResponse = response
            .json()
            .await
            .with_context(|| format!("POST {url} returned an unreadable body ({http_status})"))?;

        debug!(%http_status, path, "action response");

        Ok(ActionOutcome {
            success: http_status.is_success(),
            message: body.message,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
