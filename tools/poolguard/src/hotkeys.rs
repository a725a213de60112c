use crate::types::TicketStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: &'static str,
    pub action: &'static str,
}

/// Dashboard-level intents reachable through a plain character key.
/// Enter/Tab/Esc routing lives in the key translation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Quit,
    ToggleMonitoring,
    HoldDanger,
    SelectNext,
    SelectPrev,
}

/// The key whose pressed state drives the danger signal.
pub const DANGER_KEY: char = 'd';

pub const DASHBOARD_BINDINGS: [HotkeyBinding; 7] = [
    HotkeyBinding {
        key: "j/k",
        action: "select",
    },
    HotkeyBinding {
        key: "tab",
        action: "switch pane",
    },
    HotkeyBinding {
        key: "enter",
        action: "open ticket",
    },
    HotkeyBinding {
        key: "m",
        action: "toggle monitoring",
    },
    HotkeyBinding {
        key: "d",
        action: "hold = danger signal",
    },
    HotkeyBinding {
        key: "q",
        action: "quit",
    },
    HotkeyBinding {
        key: "ctrl-c",
        action: "quit",
    },
];

pub const ALERT_BINDINGS: [HotkeyBinding; 1] = [HotkeyBinding {
    key: "enter",
    action: "acknowledge alert",
}];

pub const DETAIL_BINDINGS: [HotkeyBinding; 3] = [
    HotkeyBinding {
        key: "enter",
        action: "add comment",
    },
    HotkeyBinding {
        key: "ctrl-x",
        action: "close ticket",
    },
    HotkeyBinding {
        key: "esc",
        action: "back",
    },
];

pub fn dashboard_controls_legend() -> String {
    format_bindings("Keys: ", &DASHBOARD_BINDINGS)
}

pub fn alert_controls_legend() -> String {
    format_bindings("Keys: ", &ALERT_BINDINGS)
}

/// The close-ticket binding is offered only while the ticket is Open.
pub fn detail_controls_legend(status: TicketStatus) -> String {
    let bindings = DETAIL_BINDINGS
        .into_iter()
        .filter(|binding| status == TicketStatus::Open || binding.action != "close ticket")
        .collect::<Vec<_>>();
    format_bindings("Keys: ", &bindings)
}

pub fn action_for_char(key: char) -> Option<HotkeyAction> {
    match key {
        'q' => Some(HotkeyAction::Quit),
        'm' => Some(HotkeyAction::ToggleMonitoring),
        DANGER_KEY => Some(HotkeyAction::HoldDanger),
        'j' => Some(HotkeyAction::SelectNext),
        'k' => Some(HotkeyAction::SelectPrev),
        _ => None,
    }
}

fn format_bindings(prefix: &str, bindings: &[HotkeyBinding]) -> String {
    let parts = bindings
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("{prefix}{}", parts.join("  "))
}

#[cfg(test)]
mod tests {
    use super::{
        action_for_char, dashboard_controls_legend, detail_controls_legend, HotkeyAction,
    };
    use crate::types::TicketStatus;

    #[test]
    fn character_map_covers_dashboard_intents() {
        assert_eq!(action_for_char('q'), Some(HotkeyAction::Quit));
        assert_eq!(action_for_char('m'), Some(HotkeyAction::ToggleMonitoring));
        assert_eq!(action_for_char('d'), Some(HotkeyAction::HoldDanger));
        assert_eq!(action_for_char('j'), Some(HotkeyAction::SelectNext));
        assert_eq!(action_for_char('k'), Some(HotkeyAction::SelectPrev));
        assert_eq!(action_for_char('x'), None);
    }

    #[test]
    fn detail_legend_drops_close_for_closed_tickets() {
        let open = detail_controls_legend(TicketStatus::Open);
        assert!(open.contains("close ticket"));
        let closed = detail_controls_legend(TicketStatus::Closed);
        assert!(!closed.contains("close ticket"));
        assert!(closed.contains("back"));
    }

    #[test]
    fn dashboard_legend_mentions_the_danger_hold() {
        let legend = dashboard_controls_legend();
        assert!(legend.starts_with("Keys: "));
        assert!(legend.contains("danger signal"));
        assert!(legend.contains("q quit"));
    }
}
