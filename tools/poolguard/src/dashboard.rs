use std::time::SystemTime;

use crate::signal::EdgeDetector;
use crate::ticket::{format_timestamp, TicketStore};
use crate::types::{FocusPane, TicketStatus};

/// Every user intent the dashboard understands. Key translation lives in
/// `app`; applying an action is synchronous and atomic with respect to the
/// next render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    ToggleMonitoring,
    /// Danger level went high (debug control pressed).
    SignalPressed,
    /// Danger level went low (debug control released).
    SignalReleased,
    AcknowledgeAlert,
    SwitchPane,
    SelectNext,
    SelectPrev,
    OpenSelected,
    DismissModal,
    InputChar(char),
    InputBackspace,
    SubmitComment,
    CloseActiveTicket,
    Quit,
}

/// Domain events produced by a transition, for the caller to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    TicketCreated { id: u64 },
    CommentAdded { id: u64 },
    TicketClosed { id: u64 },
    AlertAcknowledged,
    MonitoringToggled { active: bool },
}

/// Detail view over one ticket plus the pending comment buffer. Present
/// only while the modal is visible; dismissal drops both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailModal {
    pub ticket_id: u64,
    pub comment_buffer: String,
}

/// The single owner of all page state: monitoring flag, danger signal,
/// ticket store, and modal presentation.
#[derive(Debug)]
pub struct DashboardState {
    pub monitoring: bool,
    pub occupancy: u32,
    signal: EdgeDetector,
    pub store: TicketStore,
    pub alert_visible: bool,
    pub modal: Option<DetailModal>,
    pub pane: FocusPane,
    pub selected: usize,
    pub should_quit: bool,
}

impl DashboardState {
    pub fn new(monitoring_active: bool, occupancy: u32) -> Self {
        Self {
            monitoring: monitoring_active,
            occupancy,
            signal: EdgeDetector::new(),
            store: TicketStore::new(),
            alert_visible: false,
            modal: None,
            pane: FocusPane::History,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn signal_high(&self) -> bool {
        self.signal.is_high()
    }

    /// Id of the ticket the selection cursor points at, honoring the focused
    /// pane's ordering. Both panes are views over the same store.
    pub fn selected_ticket_id(&self) -> Option<u64> {
        let tickets = self.store.history();
        if tickets.is_empty() {
            return None;
        }
        let index = self.selected.min(tickets.len() - 1);
        let ticket = match self.pane {
            FocusPane::History => &tickets[index],
            FocusPane::RecentAlerts => &tickets[tickets.len() - 1 - index],
        };
        Some(ticket.id)
    }

    /// Applies one action. The emergency alert takes input ahead of the
    /// detail modal, which takes input ahead of the dashboard; the danger
    /// signal and quit are physical-level inputs that bypass the overlays.
    pub fn apply(&mut self, action: DashboardAction, now: SystemTime) -> Vec<DashboardEvent> {
        match action {
            DashboardAction::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            DashboardAction::SignalPressed => self.set_signal_level(true, now),
            DashboardAction::SignalReleased => self.set_signal_level(false, now),
            other if self.alert_visible => self.apply_on_alert(other),
            other if self.modal.is_some() => self.apply_on_modal(other),
            other => self.apply_on_dashboard(other),
        }
    }

    /// Feeds the level signal through the edge detector; only a rising edge
    /// mutates the store and raises the alert.
    fn set_signal_level(&mut self, level: bool, now: SystemTime) -> Vec<DashboardEvent> {
        if !self.signal.observe(level) {
            return Vec::new();
        }
        let id = self.store.create_ticket(format_timestamp(now)).id;
        self.alert_visible = true;
        vec![DashboardEvent::TicketCreated { id }]
    }

    fn apply_on_alert(&mut self, action: DashboardAction) -> Vec<DashboardEvent> {
        match action {
            DashboardAction::AcknowledgeAlert => {
                // Acknowledging only hides the alert; the ticket stays as-is.
                self.alert_visible = false;
                vec![DashboardEvent::AlertAcknowledged]
            }
            _ => Vec::new(),
        }
    }

    fn apply_on_modal(&mut self, action: DashboardAction) -> Vec<DashboardEvent> {
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };
        match action {
            DashboardAction::DismissModal => {
                self.modal = None;
                Vec::new()
            }
            DashboardAction::InputChar(c) => {
                modal.comment_buffer.push(c);
                Vec::new()
            }
            DashboardAction::InputBackspace => {
                modal.comment_buffer.pop();
                Vec::new()
            }
            DashboardAction::SubmitComment => {
                let id = modal.ticket_id;
                if self.store.add_comment(id, &modal.comment_buffer) {
                    // Buffer is cleared only when the comment was accepted.
                    modal.comment_buffer.clear();
                    vec![DashboardEvent::CommentAdded { id }]
                } else {
                    Vec::new()
                }
            }
            DashboardAction::CloseActiveTicket => {
                let id = modal.ticket_id;
                let is_open = self
                    .store
                    .get(id)
                    .is_some_and(|t| t.status == TicketStatus::Open);
                if !is_open {
                    return Vec::new();
                }
                self.store.close_ticket(id);
                self.modal = None;
                vec![DashboardEvent::TicketClosed { id }]
            }
            _ => Vec::new(),
        }
    }

    fn apply_on_dashboard(&mut self, action: DashboardAction) -> Vec<DashboardEvent> {
        match action {
            DashboardAction::ToggleMonitoring => {
                self.monitoring = !self.monitoring;
                vec![DashboardEvent::MonitoringToggled {
                    active: self.monitoring,
                }]
            }
            DashboardAction::SwitchPane => {
                self.pane = self.pane.toggled();
                self.selected = 0;
                Vec::new()
            }
            DashboardAction::SelectNext => {
                let len = self.store.len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
                Vec::new()
            }
            DashboardAction::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
                Vec::new()
            }
            DashboardAction::OpenSelected => {
                if let Some(ticket_id) = self.selected_ticket_id() {
                    self.modal = Some(DetailModal {
                        ticket_id,
                        comment_buffer: String::new(),
                    });
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardAction, DashboardEvent, DashboardState};
    use crate::ticket::SEED_COMMENT;
    use crate::types::{FocusPane, TicketStatus};
    use std::time::SystemTime;

    fn now() -> SystemTime {
        SystemTime::UNIX_EPOCH
    }

    fn state_with_one_ticket() -> DashboardState {
        let mut state = DashboardState::new(true, 2);
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());
        state.apply(DashboardAction::AcknowledgeAlert, now());
        state
    }

    #[test]
    fn pulse_creates_one_open_ticket_and_raises_alert() {
        let mut state = DashboardState::new(true, 2);
        let events = state.apply(DashboardAction::SignalPressed, now());
        assert_eq!(events, vec![DashboardEvent::TicketCreated { id: 1 }]);
        assert!(state.alert_visible);
        state.apply(DashboardAction::SignalReleased, now());

        assert_eq!(state.store.len(), 1);
        let ticket = state.store.get(1).expect("ticket 1");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.comments, vec![SEED_COMMENT.to_string()]);
    }

    #[test]
    fn sustained_press_does_not_repeat_tickets() {
        let mut state = DashboardState::new(true, 2);
        for _ in 0..10 {
            state.apply(DashboardAction::SignalPressed, now());
        }
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn alert_swallows_everything_but_acknowledge_signal_and_quit() {
        let mut state = DashboardState::new(true, 2);
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());

        state.apply(DashboardAction::ToggleMonitoring, now());
        assert!(state.monitoring, "toggle must not reach the dashboard");
        state.apply(DashboardAction::OpenSelected, now());
        assert!(state.modal.is_none(), "open must not reach the dashboard");

        let events = state.apply(DashboardAction::AcknowledgeAlert, now());
        assert_eq!(events, vec![DashboardEvent::AlertAcknowledged]);
        assert!(!state.alert_visible);
    }

    #[test]
    fn acknowledging_leaves_ticket_open_and_closing_leaves_alert_up() {
        let mut state = DashboardState::new(true, 2);
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());

        // Closing the ticket underneath does not dismiss the alert.
        state.store.close_ticket(1);
        assert!(state.alert_visible);

        state.apply(DashboardAction::AcknowledgeAlert, now());
        assert_eq!(
            state.store.get(1).expect("ticket 1").status,
            TicketStatus::Closed
        );
    }

    #[test]
    fn signal_edges_are_honored_while_alert_is_visible() {
        let mut state = DashboardState::new(true, 2);
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());
        // Alert still up; a fresh edge must still create a ticket.
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());
        assert_eq!(state.store.len(), 2);
    }

    #[test]
    fn open_selected_targets_the_focused_pane_ordering() {
        let mut state = state_with_one_ticket();
        state.apply(DashboardAction::SignalPressed, now());
        state.apply(DashboardAction::SignalReleased, now());
        state.apply(DashboardAction::AcknowledgeAlert, now());
        assert_eq!(state.store.len(), 2);

        // History pane: first row is the oldest ticket.
        state.apply(DashboardAction::OpenSelected, now());
        assert_eq!(state.modal.as_ref().map(|m| m.ticket_id), Some(1));
        state.apply(DashboardAction::DismissModal, now());

        // Recent-alerts pane: first row is the newest ticket.
        state.apply(DashboardAction::SwitchPane, now());
        assert_eq!(state.pane, FocusPane::RecentAlerts);
        state.apply(DashboardAction::OpenSelected, now());
        assert_eq!(state.modal.as_ref().map(|m| m.ticket_id), Some(2));
    }

    #[test]
    fn selection_clamps_to_list_bounds() {
        let mut state = state_with_one_ticket();
        state.apply(DashboardAction::SelectPrev, now());
        assert_eq!(state.selected, 0);
        for _ in 0..5 {
            state.apply(DashboardAction::SelectNext, now());
        }
        assert_eq!(state.selected, 0, "single row cannot scroll");

        let mut empty = DashboardState::new(true, 2);
        empty.apply(DashboardAction::SelectNext, now());
        assert_eq!(empty.selected, 0);
        empty.apply(DashboardAction::OpenSelected, now());
        assert!(empty.modal.is_none());
    }

    #[test]
    fn submit_clears_buffer_only_when_comment_is_accepted() {
        let mut state = state_with_one_ticket();
        state.apply(DashboardAction::OpenSelected, now());

        for c in "   ".chars() {
            state.apply(DashboardAction::InputChar(c), now());
        }
        let events = state.apply(DashboardAction::SubmitComment, now());
        assert!(events.is_empty());
        assert_eq!(
            state.modal.as_ref().map(|m| m.comment_buffer.as_str()),
            Some("   "),
            "rejected input stays in the buffer"
        );

        for c in "all clear".chars() {
            state.apply(DashboardAction::InputChar(c), now());
        }
        let events = state.apply(DashboardAction::SubmitComment, now());
        assert_eq!(events, vec![DashboardEvent::CommentAdded { id: 1 }]);
        assert_eq!(
            state.modal.as_ref().map(|m| m.comment_buffer.as_str()),
            Some("")
        );
        assert_eq!(
            state.store.get(1).expect("ticket 1").comments.last(),
            Some(&"   all clear".to_string())
        );
    }

    #[test]
    fn closing_from_the_modal_hides_it_and_is_open_only() {
        let mut state = state_with_one_ticket();
        state.apply(DashboardAction::OpenSelected, now());
        let events = state.apply(DashboardAction::CloseActiveTicket, now());
        assert_eq!(events, vec![DashboardEvent::TicketClosed { id: 1 }]);
        assert!(state.modal.is_none());
        assert_eq!(
            state.store.get(1).expect("ticket 1").status,
            TicketStatus::Closed
        );

        // Reopening the modal on a Closed ticket: close is a no-op and the
        // modal stays up.
        state.apply(DashboardAction::OpenSelected, now());
        let events = state.apply(DashboardAction::CloseActiveTicket, now());
        assert!(events.is_empty());
        assert!(state.modal.is_some());
    }

    #[test]
    fn monitoring_toggle_only_flips_the_flag() {
        let mut state = DashboardState::new(true, 2);
        let events = state.apply(DashboardAction::ToggleMonitoring, now());
        assert_eq!(events, vec![DashboardEvent::MonitoringToggled { active: false }]);
        assert!(!state.monitoring);
        assert!(state.store.is_empty());
        state.apply(DashboardAction::ToggleMonitoring, now());
        assert!(state.monitoring);
    }
}
