//! Terminal layout for hudpad: status bar, key reference, intensity gauge.

use hud_sfx::engine::HumState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Snapshot of everything the UI draws.
pub struct View<'a> {
    pub initialized: bool,
    pub muted: bool,
    pub hum: HumState,
    pub intensity: f32,
    pub status: &'a str,
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(8),    // Key reference
            Constraint::Length(3), // Intensity gauge
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], view);
    render_keys(frame, chunks[1]);
    render_intensity(frame, chunks[2], view);

    let help = Paragraph::new(" [Q] Quit  [S] Startup  [M] Mute  [R] Repulsor  [Up/Down] Intensity")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_status(frame: &mut Frame, area: ratatui::layout::Rect, view: &View) {
    let engine = if view.initialized {
        Span::styled("engine: ready", Style::default().fg(Color::Green))
    } else {
        Span::styled("engine: off", Style::default().fg(Color::DarkGray))
    };
    let mute = if view.muted {
        Span::styled("  muted", Style::default().fg(Color::Red))
    } else {
        Span::raw("  live")
    };
    let hum = match view.hum {
        HumState::Idle => Span::raw("  repulsor: idle"),
        HumState::Running => Span::styled("  repulsor: running", Style::default().fg(Color::Cyan)),
        HumState::StoppingFadeOut => {
            Span::styled("  repulsor: fading", Style::default().fg(Color::Yellow))
        }
    };
    let status = Span::styled(
        format!("  | {}", view.status),
        Style::default().fg(Color::Gray),
    );

    let bar = Paragraph::new(Line::from(vec![engine, mute, hum, status]))
        .block(Block::default().title(" hudpad ").borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn render_keys(frame: &mut Frame, area: ratatui::layout::Rect) {
    let lines = vec![
        Line::from(" [s]  startup sweep (initializes audio)"),
        Line::from(" [i]  initialize without the sweep"),
        Line::from(" [h]  hover chirp"),
        Line::from(" [c]  click thud"),
        Line::from(" [u]  power up"),
        Line::from(" [d]  power down"),
        Line::from(" [r]  repulsor hum on/off"),
        Line::from(" [m]  mute toggle"),
    ];
    let keys = Paragraph::new(lines)
        .block(Block::default().title(" Pad ").borders(Borders::ALL));
    frame.render_widget(keys, area);
}

fn render_intensity(frame: &mut Frame, area: ratatui::layout::Rect, view: &View) {
    let gauge = Gauge::default()
        .block(Block::default().title(" Intensity ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(view.intensity.clamp(0.0, 1.0) as f64);
    frame.render_widget(gauge, area);
}
