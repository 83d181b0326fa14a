/**
 * USE CASE LAYER - Business Logic
 *
 * TicketService: Lists a buyer's tickets, re-verifying each signature
 * against the configured secret rather than trusting the stored flag
 *
 * Architecture Layer: Service (Layer 3)
 * Dependencies: TicketRepository
 */

use crate::error::Result;
use crate::signing;

use super::dto::MyTicket;
use super::repository::TicketRepository;

#[derive(Clone)]
pub struct TicketService {
    repo: TicketRepository,
    qr_signing_secret: String,
}

impl TicketService {
    pub fn new(repo: TicketRepository, qr_signing_secret: String) -> Self {
        Self { repo, qr_signing_secret }
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MyTicket>> {
        let mut tickets = self.repo.list_for_user(user_id).await?;
        for ticket in tickets.iter_mut() {
            ticket.verified = signing::verify(
                &self.qr_signing_secret,
                &ticket.code,
                ticket.order_id,
                ticket.event_id,
                &ticket.qr_sig,
            );
        }
        Ok(tickets)
    }
}
