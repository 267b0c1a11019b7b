use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::ticket::{CreatedTicket, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::AlertingService;

pub const DEFAULT_API_URL: &str = "https://dutycalls.me/api";

/// HTTP client for the DutyCalls REST API.
pub struct DutyCallsClient {
    http: Client,
    api_url: String,
    login: String,
    password: String,
}

impl DutyCallsClient {
    pub fn new(login: &str, password: &str) -> AppResult<Self> {
        Self::with_api_url(login, password, DEFAULT_API_URL)
    }

    pub fn with_api_url(login: &str, password: &str, api_url: &str) -> AppResult<Self> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(AppError::Configuration(
                "DutyCalls login and password are required".to_string(),
            ));
        }
        let parsed = Url::parse(api_url)
            .map_err(|err| AppError::Configuration(format!("invalid API URL {api_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Configuration(format!(
                "API URL must use http or https: {api_url}"
            )));
        }
        let http = Client::builder()
            .user_agent(concat!("dutycalls-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.login, self.password);
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn ticket_endpoint(&self) -> String {
        format!("{}/ticket", self.api_url)
    }

    /// The API accepted the ticket; an unexpected body only loses the ticket ids.
    async fn created_tickets(response: Response) -> Vec<CreatedTicket> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(%status, error = %err, "unable to read DutyCalls response body");
                return Vec::new();
            }
        };
        if body.trim().is_empty() {
            debug!(%status, "DutyCalls response has no body");
            return Vec::new();
        }
        match serde_json::from_str::<CreateTicketResponse>(&body) {
            Ok(payload) => payload.tickets,
            Err(err) => {
                debug!(%status, error = %err, "unexpected DutyCalls response body");
                Vec::new()
            }
        }
    }

    async fn error_message(response: Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(ErrorResponse { error }) => format!("{status}: {error}"),
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => format!("{status}: {}", body.trim()),
        }
    }
}

#[async_trait]
impl AlertingService for DutyCallsClient {
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        channels: &[String],
    ) -> AppResult<Vec<CreatedTicket>> {
        if channels.is_empty() {
            return Err(AppError::Request(
                "at least one channel is required".to_string(),
            ));
        }

        let query = channels
            .iter()
            .map(|channel| ("channel", channel.as_str()))
            .collect::<Vec<_>>();

        debug!(channels = ?channels, title = %ticket.title, "posting DutyCalls ticket");

        let response = self
            .http
            .post(self.ticket_endpoint())
            .query(&query)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(ticket)
            .send()
            .await
            .map_err(|err| AppError::Transport(err.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(Self::created_tickets(response).await),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Authentication(
                Self::error_message(response).await,
            )),
            _ => Err(AppError::Request(Self::error_message(response).await)),
        }
    }
}

#[derive(Deserialize)]
struct CreateTicketResponse {
    #[serde(default)]
    tickets: Vec<CreatedTicket>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}
