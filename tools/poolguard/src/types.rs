use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Which ticket list currently owns selection input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    History,
    RecentAlerts,
}

impl FocusPane {
    pub fn toggled(self) -> Self {
        match self {
            Self::History => Self::RecentAlerts,
            Self::RecentAlerts => Self::History,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FocusPane, TicketStatus};

    #[test]
    fn status_strings_round_trip() {
        for status in [TicketStatus::Open, TicketStatus::Closed] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("reopened"), None);
    }

    #[test]
    fn pane_toggle_is_an_involution() {
        assert_eq!(FocusPane::History.toggled(), FocusPane::RecentAlerts);
        assert_eq!(FocusPane::History.toggled().toggled(), FocusPane::History);
    }
}
