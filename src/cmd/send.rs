use clap::Args;
use serde_json::Value;
use tracing::error;

use crate::error::AppResult;
use crate::workflow::notify::NotificationService;

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Message body of the ticket.
    pub message: String,
    /// Ticket title.
    #[arg(short, long)]
    pub title: Option<String>,
    /// Channel to notify; repeat for several. Defaults to the configured channel.
    #[arg(long = "target", value_name = "CHANNEL")]
    pub targets: Vec<String>,
    /// JSON object (or list of objects) with date_time, severity, sender, link, identifier.
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<String>,
}

pub async fn run(service: &NotificationService, args: SendArgs) -> AppResult<()> {
    let data = args.data.as_deref().and_then(parse_data);
    let targets = (!args.targets.is_empty()).then_some(args.targets);

    service
        .send(&args.message, args.title.as_deref(), targets, data.as_ref())
        .await
}

fn parse_data(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            error!(error = %err, "invalid message data: not valid JSON");
            None
        }
    }
}
