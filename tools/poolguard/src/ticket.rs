use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::types::TicketStatus;

/// Every ticket starts life with this system-generated comment, so
/// `comments` is non-empty from creation onward.
pub const SEED_COMMENT: &str = "Drowning incident detected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub created_at: String,
    pub status: TicketStatus,
    pub comments: Vec<String>,
}

/// In-memory incident ticket store. Append-only: tickets are never removed,
/// comments never shrink or reorder, and a Closed ticket never reopens.
///
/// Ids come from a per-store monotonic counter. The wall clock is only used
/// for the display timestamp, so tickets created within the same instant
/// still get distinct ids.
#[derive(Debug, Default)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
    next_id: u64,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new Open ticket seeded with [`SEED_COMMENT`] and returns it.
    /// Unbounded growth is accepted; there is no error path.
    pub fn create_ticket(&mut self, created_at: String) -> &Ticket {
        self.next_id += 1;
        self.tickets.push(Ticket {
            id: self.next_id,
            created_at,
            status: TicketStatus::Open,
            comments: vec![SEED_COMMENT.to_string()],
        });
        self.tickets.last().expect("store grows on create")
    }

    /// Appends `text` verbatim to the ticket's comments. Empty or
    /// whitespace-only text and unknown ids are silent no-ops; returns
    /// whether a comment was recorded.
    pub fn add_comment(&mut self, ticket_id: u64, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == ticket_id) else {
            return false;
        };
        ticket.comments.push(text.to_string());
        true
    }

    /// Open -> Closed. Closing an already-Closed or unknown ticket is a
    /// silent no-op; returns whether the status changed.
    pub fn close_ticket(&mut self, ticket_id: u64) -> bool {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == ticket_id) else {
            return false;
        };
        if ticket.status != TicketStatus::Open {
            return false;
        }
        ticket.status = TicketStatus::Closed;
        true
    }

    pub fn get(&self, ticket_id: u64) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == ticket_id)
    }

    /// Creation-order view.
    pub fn history(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Newest-first view, computed on read from the same storage as
    /// [`Self::history`].
    pub fn recent_alerts(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

/// Display formatting for the immutable `created_at` field.
pub fn format_timestamp(instant: SystemTime) -> String {
    DateTime::<Local>::from(instant)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
