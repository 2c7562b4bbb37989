//! Help overlay listing the bindings in effect, overrides included.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

/// Sections of the help table, in display order.
const SECTIONS: [(Context, &str); 4] = [
    (Context::Global, "General"),
    (Context::ChannelList, "Channel List"),
    (Context::Confirm, "Delete Confirmation"),
    (Context::Help, "Help"),
];

/// Border rows plus the table header.
const CHROME_ROWS: u16 = 3;

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let rows = binding_rows(app);
    let page = overlay.height.saturating_sub(CHROME_ROWS) as usize;
    let last_offset = rows.len().saturating_sub(page);
    let offset = app.help_scroll_offset.min(last_offset);

    let title = if last_offset == 0 {
        " Help (? to close) ".to_string()
    } else {
        format!(" Help ({}/{}) ", offset + 1, last_offset + 1)
    };

    let table = Table::new(
        rows.into_iter().skip(offset).take(page),
        [Constraint::Length(16), Constraint::Min(20)],
    )
    .header(
        Row::new(["Key", "Action"])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
            .bottom_margin(1),
    )
    .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(Clear, overlay);
    f.render_widget(table, overlay);

    if offset < last_offset {
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.bottom().saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(
            Paragraph::new(" j/k to scroll, ? or Esc to close ")
                .style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );
    }
}

/// One heading row per section followed by its bindings, sections
/// separated by a blank row.
fn binding_rows(app: &App) -> Vec<Row<'static>> {
    let bindings = app.keybindings.all_bindings();
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut rows = Vec::new();
    for (context, title) in SECTIONS {
        let section: Vec<_> = bindings
            .iter()
            .filter(|(ctx, ..)| *ctx == context)
            .map(|(_, key, _, description)| {
                Row::new([format!("  {}", key), description.to_string()])
            })
            .collect();
        if section.is_empty() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(Row::new([String::new(), String::new()]));
        }
        rows.push(Row::new([format!("-- {} --", title), String::new()]).style(heading));
        rows.extend(section);
    }
    rows
}

/// Rectangle covering `percent_x` by `percent_y` of `area`, centered.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let height = (area.height as u32 * percent_y as u32 / 100) as u16;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
