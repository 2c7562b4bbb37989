use crate::app::App;
use crate::grid::{ChannelRow, PrimaryView};
use crate::util::{sanitize_label, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;

const SPINNER: [char; SPINNER_FRAMES] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) const LOADING_TEXT: &str = "Refreshing channels...";
pub(super) const EMPTY_TEXT: &str = "No channels on this device";

/// Width of the usage bar in cells.
const BAR_WIDTH: usize = 10;

/// Render the channel grid panel: loading indicator, empty notice, or rows.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let view = app.grid.view();
    let title = match &view.primary {
        PrimaryView::Rows(rows) => format!(" Channels ({}) ", rows.len()),
        _ => " Channels ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    match view.primary {
        PrimaryView::Loading => {
            let spinner = SPINNER[app.spinner_frame % SPINNER_FRAMES];
            let paragraph = Paragraph::new(format!("{} {}", spinner, LOADING_TEXT))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(paragraph, area);
        }
        PrimaryView::Empty => {
            let paragraph = Paragraph::new(EMPTY_TEXT)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
        }
        PrimaryView::Rows(rows) => render_rows(f, app, area, block, &rows),
    }
}

fn render_rows(f: &mut Frame, app: &App, area: Rect, block: Block<'_>, rows: &[ChannelRow<'_>]) {
    // Borders, column gaps, the usage and availability columns
    let name_width = (area.width as usize).saturating_sub(2 + 2 + 36 + 9).max(8);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let name = sanitize_label(&row.channel.name);
            let name = truncate_to_width(&name, name_width).into_owned();
            let available = if row.channel.available { "yes" } else { "no" };
            Row::new(vec![
                Cell::from(name),
                Cell::from(format!(
                    "{} {}",
                    usage_bar(row.usage_ratio, BAR_WIDTH),
                    row.usage_label
                )),
                Cell::from(available),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(8),
        Constraint::Length(36),
        Constraint::Length(9),
    ];

    let table = Table::new(table_rows, widths)
        .block(block)
        .header(
            Row::new(vec!["Name", "Usage", "Available"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

/// Bar of `width` cells, filled in proportion to `ratio`.
pub(super) fn usage_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0.0, 4), "░░░░");
        assert_eq!(usage_bar(0.5, 4), "██░░");
        assert_eq!(usage_bar(1.0, 4), "████");
    }

    #[test]
    fn test_usage_bar_clamps_out_of_range() {
        assert_eq!(usage_bar(1.7, 3), "███");
        assert_eq!(usage_bar(-0.2, 3), "░░░");
    }
}
