use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::dashboard::{DashboardState, DetailModal};
use crate::hotkeys;
use crate::types::{FocusPane, TicketStatus};

/// Draws the full dashboard into a frame. Shared by the live crossterm loop
/// and the string renderer below, so everything on screen is testable.
pub fn draw_ui(frame: &mut Frame<'_>, state: &DashboardState) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(frame, chunks[0], state);
    render_status_cards(frame, chunks[1], state);
    render_ticket_lists(frame, chunks[2], state);
    render_legend(frame, chunks[3], state);

    if let Some(modal) = &state.modal {
        render_detail_modal(frame, area, state, modal);
    }
    if state.alert_visible {
        render_alert_modal(frame, area);
    }
}

/// Renders one frame through a test backend and flattens it to a string.
/// Used by tests and by `--render-once`.
pub fn render_dashboard(state: &DashboardState, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| draw_ui(frame, state))
        .expect("draw");
    frame_to_string(terminal.backend().buffer(), width, height)
}

fn frame_to_string(buffer: &Buffer, width: u16, height: u16) -> String {
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buffer.cell((x, y)).map_or(" ", |cell| cell.symbol()));
        }
        out.push('\n');
    }
    out
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let mut spans = vec![
        Span::styled(
            "POOLGUARD PRO",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(if state.monitoring {
            "monitoring active"
        } else {
            "monitoring paused"
        }),
    ];
    if state.signal_high() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "DANGER SIGNAL HIGH",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_status_cards(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (system_value, system_color) = if state.monitoring {
        ("Active Monitoring".to_string(), Color::Green)
    } else {
        ("System Paused".to_string(), Color::Yellow)
    };
    render_card(frame, cards[0], "System Status", system_value, system_color);

    render_card(
        frame,
        cards[1],
        "Current Occupancy",
        format!("{} People Detected", state.occupancy),
        Color::Blue,
    );
}

fn render_card(frame: &mut Frame<'_>, area: Rect, title: &'static str, value: String, accent: Color) {
    let card = Paragraph::new(Line::from(Span::styled(
        value,
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(card, area);
}

fn render_ticket_lists(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_history_pane(frame, panes[0], state);
    render_recent_pane(frame, panes[1], state);
}

fn pane_block(title: &'static str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn pane_has_focus(state: &DashboardState, pane: FocusPane) -> bool {
    state.pane == pane && state.modal.is_none() && !state.alert_visible
}

fn render_history_pane(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let focused = pane_has_focus(state, FocusPane::History);
    let block = pane_block("Incident History", focused);
    if state.store.is_empty() {
        let empty = Paragraph::new("No incident history")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items = state
        .store
        .history()
        .iter()
        .map(|ticket| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("#{}", ticket.id),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!("  {}  ", ticket.created_at)),
                Span::styled(ticket.status.as_str(), status_style(ticket.status)),
            ]))
        })
        .collect::<Vec<_>>();
    render_pane_list(frame, area, state, items, block, focused);
}

fn render_recent_pane(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let focused = pane_has_focus(state, FocusPane::RecentAlerts);
    let block = pane_block("Recent Alerts", focused);
    if state.store.is_empty() {
        let empty = Paragraph::new("No recent alerts")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items = state
        .store
        .recent_alerts()
        .map(|ticket| {
            let first_comment = ticket.comments.first().map_or("", String::as_str);
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::styled(
                        format!("#{}", ticket.id),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(" "),
                    Span::styled(ticket.status.as_str(), status_style(ticket.status)),
                ]),
                Line::from(format!("  {first_comment}  {}", ticket.created_at)),
            ]))
        })
        .collect::<Vec<_>>();
    render_pane_list(frame, area, state, items, block, focused);
}

fn render_pane_list<'a>(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &DashboardState,
    items: Vec<ListItem<'a>>,
    block: Block<'a>,
    focused: bool,
) {
    let rows = items.len();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    if focused && rows > 0 {
        let mut list_state = ListState::default();
        list_state.select(Some(state.selected.min(rows - 1)));
        frame.render_stateful_widget(list, area, &mut list_state);
    } else {
        frame.render_widget(list, area);
    }
}

fn render_legend(frame: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let legend = if state.alert_visible {
        hotkeys::alert_controls_legend()
    } else if let Some(modal) = &state.modal {
        let status = state
            .store
            .get(modal.ticket_id)
            .map_or(TicketStatus::Closed, |t| t.status);
        hotkeys::detail_controls_legend(status)
    } else {
        hotkeys::dashboard_controls_legend()
    };
    let footer = Paragraph::new(legend)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(footer, area);
}

fn render_alert_modal(frame: &mut Frame<'_>, area: Rect) {
    let rect = centered_rect(60, 40, area);
    frame.render_widget(Clear, rect);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Potential drowning incident detected!",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Immediate attention required. Please check pool status immediately."),
        Line::from(""),
        Line::from(Span::styled(
            hotkeys::alert_controls_legend(),
            Style::default().fg(Color::Gray),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            "EMERGENCY ALERT",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, rect);
}

fn render_detail_modal(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &DashboardState,
    modal: &DetailModal,
) {
    let Some(ticket) = state.store.get(modal.ticket_id) else {
        return;
    };
    let rect = centered_rect(70, 70, area);
    frame.render_widget(Clear, rect);

    let mut lines = vec![
        Line::from(format!("Created: {}", ticket.created_at)),
        Line::from(vec![
            Span::raw("Status: "),
            Span::styled(ticket.status.as_str(), status_style(ticket.status)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Comments:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for comment in &ticket.comments {
        lines.push(Line::from(format!("  - {comment}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("> {}_", modal.comment_buffer)));
    lines.push(Line::from(Span::styled(
        hotkeys::detail_controls_legend(ticket.status),
        Style::default().fg(Color::Gray),
    )));

    let title = format!("Incident Ticket #{}", ticket.id);
    let block = Block::default().borders(Borders::ALL).title(title);
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(body, rect);
}

fn status_style(status: TicketStatus) -> Style {
    match status {
        TicketStatus::Open => Style::default().fg(Color::Red),
        TicketStatus::Closed => Style::default().fg(Color::Green),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
