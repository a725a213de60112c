use std::io::{self, Write};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::dashboard::{DashboardAction, DashboardState};
use crate::errors::PoolguardError;
use crate::hotkeys::{self, HotkeyAction};
use crate::logging::JsonlLogger;
use crate::runtime::Clock;
use crate::tui;

/// How the danger key maps onto the level signal.
///
/// With keyboard-enhancement reporting the terminal delivers key release
/// events, so holding the key keeps the level high (press -> true, release
/// -> false). Legacy terminals never report releases; there the key becomes
/// a press/release pulse so a single keypress still produces exactly one
/// rising edge instead of latching the signal high forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldMode {
    KeyRelease,
    Pulse,
}

/// Translates one key event into dashboard actions. Pure so input routing
/// is testable without a terminal: overlay priority is alert, then detail
/// modal, then the dashboard itself.
pub fn translate_key(key: KeyEvent, state: &DashboardState, hold: HoldMode) -> Vec<DashboardAction> {
    let text_entry = state.modal.is_some() && !state.alert_visible;

    if key.kind == KeyEventKind::Release {
        if hold == HoldMode::KeyRelease && !text_entry && key.code == KeyCode::Char(hotkeys::DANGER_KEY)
        {
            return vec![DashboardAction::SignalReleased];
        }
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => vec![DashboardAction::Quit],
            KeyCode::Char('x') if text_entry => vec![DashboardAction::CloseActiveTicket],
            _ => Vec::new(),
        };
    }

    if state.alert_visible {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => vec![DashboardAction::AcknowledgeAlert],
            KeyCode::Char(c) if c == hotkeys::DANGER_KEY => danger_press(hold),
            KeyCode::Char('q') => vec![DashboardAction::Quit],
            _ => Vec::new(),
        };
    }

    if text_entry {
        return match key.code {
            KeyCode::Esc => vec![DashboardAction::DismissModal],
            KeyCode::Enter => vec![DashboardAction::SubmitComment],
            KeyCode::Backspace => vec![DashboardAction::InputBackspace],
            KeyCode::Char(c) => vec![DashboardAction::InputChar(c)],
            _ => Vec::new(),
        };
    }

    match key.code {
        KeyCode::Tab => vec![DashboardAction::SwitchPane],
        KeyCode::Enter => vec![DashboardAction::OpenSelected],
        KeyCode::Down => vec![DashboardAction::SelectNext],
        KeyCode::Up => vec![DashboardAction::SelectPrev],
        KeyCode::Char(c) => match hotkeys::action_for_char(c) {
            Some(HotkeyAction::Quit) => vec![DashboardAction::Quit],
            Some(HotkeyAction::ToggleMonitoring) => vec![DashboardAction::ToggleMonitoring],
            Some(HotkeyAction::HoldDanger) => danger_press(hold),
            Some(HotkeyAction::SelectNext) => vec![DashboardAction::SelectNext],
            Some(HotkeyAction::SelectPrev) => vec![DashboardAction::SelectPrev],
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn danger_press(hold: HoldMode) -> Vec<DashboardAction> {
    match hold {
        HoldMode::KeyRelease => vec![DashboardAction::SignalPressed],
        HoldMode::Pulse => vec![
            DashboardAction::SignalPressed,
            DashboardAction::SignalReleased,
        ],
    }
}

/// Runs the interactive dashboard until the operator quits.
pub fn run_dashboard(
    state: &mut DashboardState,
    logger: Option<&JsonlLogger>,
    clock: &dyn Clock,
) -> Result<(), PoolguardError> {
    let hold = if supports_keyboard_enhancement().unwrap_or(false) {
        HoldMode::KeyRelease
    } else {
        HoldMode::Pulse
    };
    let _guard = TerminalGuard::enter(hold)?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| PoolguardError::Terminal(e.to_string()))?;

    loop {
        terminal
            .draw(|frame| tui::draw_ui(frame, state))
            .map_err(|e| PoolguardError::Terminal(e.to_string()))?;

        let event = event::read().map_err(|e| PoolguardError::Terminal(e.to_string()))?;
        if let Event::Key(key) = event {
            for action in translate_key(key, state, hold) {
                let events = state.apply(action, clock.now());
                if let Some(logger) = logger {
                    for domain_event in events {
                        // Log failures never interrupt the session.
                        let _ = logger.record(domain_event);
                    }
                }
            }
        }
        if state.should_quit {
            return Ok(());
        }
    }
}

/// Raw-mode/alternate-screen guard. Restores the terminal on drop so an
/// error or panic on the way out does not leave the shell unusable.
struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    fn enter(hold: HoldMode) -> Result<Self, PoolguardError> {
        enable_raw_mode().map_err(|e| PoolguardError::Terminal(e.to_string()))?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen)
            .map_err(|e| PoolguardError::Terminal(e.to_string()))?;
        let enhanced = hold == HoldMode::KeyRelease;
        if enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .map_err(|e| PoolguardError::Terminal(e.to_string()))?;
        }
        Ok(Self { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.enhanced {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        let _ = out.flush();
    }
}
