use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::domain::payload::parse_details;
use crate::domain::ticket::{Ticket, TicketDetails};
use crate::error::AppResult;
use crate::infra::dutycalls::DutyCallsClient;
use crate::services::AlertingService;

/// Title used when the caller does not provide one.
pub const DEFAULT_TITLE: &str = "Home Assistant";

/// Turns hub notifications into DutyCalls tickets.
#[derive(Clone)]
pub struct NotificationService {
    default_channel: String,
    client: Arc<dyn AlertingService>,
}

/// Builds the service from configuration, or `None` when the client cannot be set up.
pub fn get_service(config: &AppConfig) -> Option<NotificationService> {
    let client = match &config.api_url {
        Some(api_url) => DutyCallsClient::with_api_url(&config.username, &config.password, api_url),
        None => DutyCallsClient::new(&config.username, &config.password),
    };

    match client {
        Ok(client) => Some(NotificationService::new(
            config.default_channel.clone(),
            Arc::new(client),
        )),
        Err(err) => {
            error!(error = %err, "failed to set up the DutyCalls notification service");
            None
        }
    }
}

impl NotificationService {
    pub fn new(default_channel: String, client: Arc<dyn AlertingService>) -> Self {
        Self {
            default_channel,
            client,
        }
    }

    /// Posts `message` as a ticket.
    ///
    /// Invalid `data` is logged and ignored. Authentication and request
    /// failures reported by DutyCalls are logged and not returned.
    pub async fn send(
        &self,
        message: &str,
        title: Option<&str>,
        targets: Option<Vec<String>>,
        data: Option<&Value>,
    ) -> AppResult<()> {
        let details = match parse_details(data) {
            Ok(details) => details,
            Err(err) => {
                error!(error = %err, "invalid message data");
                TicketDetails::default()
            }
        };

        let channels = self.resolve_targets(targets);
        debug!(channels = ?channels, with_details = !details.is_empty(), "sending notification");
        let ticket = Ticket::new(title.unwrap_or(DEFAULT_TITLE), message, details);

        match self.client.create_ticket(&ticket, &channels).await {
            Ok(created) => {
                for entry in &created {
                    info!(sid = %entry.sid, channel = ?entry.channel, "DutyCalls ticket created");
                }
                debug!(count = created.len(), "notification delivered");
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                error!(error = ?err, "error while posting the ticket");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn resolve_targets(&self, targets: Option<Vec<String>>) -> Vec<String> {
        let targets = targets
            .unwrap_or_default()
            .into_iter()
            .map(|target| target.trim().to_string())
            .filter(|target| !target.is_empty())
            .collect::<Vec<_>>();

        if targets.is_empty() {
            vec![self.default_channel.clone()]
        } else {
            targets
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::ticket::CreatedTicket;
    use crate::error::AppError;

    type Responder = Box<dyn Fn() -> AppResult<Vec<CreatedTicket>> + Send + Sync>;

    struct RecordingClient {
        calls: Mutex<Vec<(Ticket, Vec<String>)>>,
        respond: Responder,
    }

    impl RecordingClient {
        fn ok() -> Arc<Self> {
            Self::responding(Box::new(|| {
                Ok(vec![CreatedTicket {
                    sid: "t-1".to_string(),
                    channel: Some("home".to_string()),
                }])
            }))
        }

        fn responding(respond: Responder) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                respond,
            })
        }

        fn single_call(&self) -> (Ticket, Vec<String>) {
            let calls = self.calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            calls[0].clone()
        }
    }

    #[async_trait]
    impl AlertingService for RecordingClient {
        async fn create_ticket(
            &self,
            ticket: &Ticket,
            channels: &[String],
        ) -> AppResult<Vec<CreatedTicket>> {
            self.calls
                .lock()
                .unwrap()
                .push((ticket.clone(), channels.to_vec()));
            (self.respond)()
        }
    }

    fn service(client: Arc<RecordingClient>) -> NotificationService {
        NotificationService::new("home".to_string(), client)
    }

    #[tokio::test]
    async fn maps_valid_data_onto_ticket() {
        let client = RecordingClient::ok();
        let data = json!({
            "date_time": 1_700_000_000,
            "severity": "critical",
            "sender": "alarm panel",
            "link": "https://hass.local/alarm",
            "identifier": "zone-3"
        });

        service(client.clone())
            .send("Motion in garage", Some("Alarm"), None, Some(&data))
            .await
            .unwrap();

        let (ticket, _) = client.single_call();
        assert_eq!(ticket.title, "Alarm");
        assert_eq!(ticket.body, "Motion in garage");
        assert_eq!(ticket.date_time, Some(1_700_000_000));
        assert_eq!(ticket.severity.as_deref(), Some("critical"));
        assert_eq!(ticket.sender.as_deref(), Some("alarm panel"));
        assert_eq!(ticket.link.as_deref(), Some("https://hass.local/alarm"));
        assert_eq!(ticket.identifier.as_deref(), Some("zone-3"));
    }

    #[tokio::test]
    async fn invalid_data_is_discarded() {
        let client = RecordingClient::ok();
        let data = json!({"severity": "high", "link": "not a url"});

        service(client.clone())
            .send("Water leak", Some("Basement"), None, Some(&data))
            .await
            .unwrap();

        let (ticket, _) = client.single_call();
        assert_eq!(ticket, Ticket::new("Basement", "Water leak", TicketDetails::default()));
    }

    #[tokio::test]
    async fn defaults_title_and_channel() {
        let client = RecordingClient::ok();

        service(client.clone())
            .send("Backup finished", None, None, None)
            .await
            .unwrap();

        let (ticket, channels) = client.single_call();
        assert_eq!(ticket.title, DEFAULT_TITLE);
        assert_eq!(channels, vec!["home".to_string()]);
    }

    #[tokio::test]
    async fn empty_targets_fall_back_to_default_channel() {
        let client = RecordingClient::ok();

        service(client.clone())
            .send("ping", None, Some(vec![" ".to_string()]), None)
            .await
            .unwrap();

        let (_, channels) = client.single_call();
        assert_eq!(channels, vec!["home".to_string()]);
    }

    #[tokio::test]
    async fn forwards_explicit_targets() {
        let client = RecordingClient::ok();
        let targets = vec!["ops".to_string(), "security".to_string()];

        service(client.clone())
            .send("Door open", None, Some(targets.clone()), None)
            .await
            .unwrap();

        let (_, channels) = client.single_call();
        assert_eq!(channels, targets);
    }

    #[tokio::test]
    async fn swallows_authentication_and_request_errors() {
        let auth = RecordingClient::responding(Box::new(|| {
            Err(AppError::Authentication("401 Unauthorized".to_string()))
        }));
        assert!(service(auth).send("m", None, None, None).await.is_ok());

        let request = RecordingClient::responding(Box::new(|| {
            Err(AppError::Request("400 Bad Request".to_string()))
        }));
        assert!(service(request).send("m", None, None, None).await.is_ok());
    }

    #[tokio::test]
    async fn propagates_transport_errors() {
        let client = RecordingClient::responding(Box::new(|| {
            Err(AppError::Transport("connection refused".to_string()))
        }));

        let err = service(client).send("m", None, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[test]
    fn setup_failure_yields_no_service() {
        let config = AppConfig {
            default_channel: "home".to_string(),
            username: "user".to_string(),
            password: "secret".to_string(),
            api_url: Some("::not a url::".to_string()),
        };
        assert!(get_service(&config).is_none());
    }

    #[test]
    fn setup_builds_service_with_default_channel() {
        let config = AppConfig {
            default_channel: "home".to_string(),
            username: "user".to_string(),
            password: "secret".to_string(),
            api_url: None,
        };
        let service = get_service(&config).unwrap();
        assert_eq!(service.default_channel, "home");
    }
}
