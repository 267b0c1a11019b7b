use async_trait::async_trait;

use crate::domain::ticket::{CreatedTicket, Ticket};
use crate::error::AppResult;

#[async_trait]
pub trait AlertingService: Send + Sync {
    /// Opens `ticket` on every channel in `channels`.
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        channels: &[String],
    ) -> AppResult<Vec<CreatedTicket>>;
}
