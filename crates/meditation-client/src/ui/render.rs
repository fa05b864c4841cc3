use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Clear, Gauge, List, ListItem, Paragraph},
};

use super::app::App;
use super::widgets::{centered_rect, modal_block, truncate_label};

pub(crate) fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5), Constraint::Length(4)])
        .split(f.area());

    let filter = app.current_filter();
    let user = app
        .session
        .user()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "signed in".into());
    let header = Paragraph::new(vec![
        Line::from(format!("meditation  →  {}  ({user})", app.session.api_base())),
        Line::from(format!(
            "category: {}   duration: {}",
            filter.category.as_deref().unwrap_or("all"),
            filter
                .duration
                .map(|m| format!("{m} min"))
                .unwrap_or_else(|| "all".into()),
        )),
    ])
    .block(modal_block("Catalog"));
    f.render_widget(header, chunks[0]);

    let width = chunks[1].width.saturating_sub(4) as usize;
    let panel = app.catalog.view();
    let items: Vec<ListItem> = if panel.empty {
        vec![ListItem::new("No meditations match the current filters.")]
    } else {
        panel
            .labels()
            .into_iter()
            .map(|label| ListItem::new(truncate_label(&label, width)))
            .collect()
    };
    let list = List::new(items)
        .block(modal_block("Sessions"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, chunks[1], &mut app.list_state);

    let status = if app.status.loading {
        "loading...".to_string()
    } else {
        app.status.text.clone()
    };
    let status_style = if app.status.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let footer = Paragraph::new(vec![
        Line::styled(format!("status: {status}"), status_style),
        Line::from("keys: ↑/↓ select | Enter play | c category | d duration | r reload | q quit"),
    ])
    .block(modal_block("Status"));
    f.render_widget(footer, chunks[2]);

    app.track_area = None;
    if app.player.view().visible {
        draw_player(f, app);
    }
}

fn draw_player(f: &mut ratatui::Frame, app: &mut App) {
    let area = centered_rect(70, 40, f.area());
    f.render_widget(Clear, area);
    let panel = app.player.view();
    let block = modal_block(&panel.title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let source = app.player.audio().source().unwrap_or("-");
    f.render_widget(
        Paragraph::new(Line::from(format!("source: {source}")))
            .style(Style::default().fg(Color::DarkGray)),
        rows[0],
    );

    let gauge = Gauge::default()
        .ratio(panel.ratio())
        .label("")
        .style(Style::default().fg(Color::Black).bg(Color::White))
        .gauge_style(Style::default().fg(Color::White).bg(Color::Black));
    f.render_widget(gauge, rows[1]);
    f.render_widget(
        Paragraph::new(Line::from(panel.transport_line())).alignment(Alignment::Center),
        rows[2],
    );
    f.render_widget(
        Paragraph::new(Line::from(
            "Space play/pause | ←/→ seek | click bar to seek | +/- volume | m mute | Esc close",
        ))
        .alignment(Alignment::Center),
        rows[4],
    );
    app.track_area = Some(rows[1]);
}
