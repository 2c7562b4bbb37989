use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.grid.pending_deletion().is_some() {
        Cow::Owned(hints(
            app,
            Context::Confirm,
            &[(Action::ConfirmDelete, "delete"), (Action::CancelDelete, "cancel")],
        ))
    } else if app.grid.is_loading() {
        Cow::Borrowed("Refreshing...")
    } else {
        // Built from the registry so overrides show up here too
        let list = hints(app, Context::ChannelList, &[(Action::DeleteChannel, "delete")]);
        let global = hints(
            app,
            Context::Global,
            &[
                (Action::Refresh, "refresh"),
                (Action::ShowHelp, "help"),
                (Action::Quit, "quit"),
            ],
        );
        Cow::Owned(format!("{} {}", list, global))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

/// "[key] label" pairs for the first key bound to each action.
fn hints(app: &App, context: Context, actions: &[(Action, &str)]) -> String {
    actions
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .keys_for(context, *action)
                .into_iter()
                .next()
                .map(|key| format!("[{}] {}", key, label))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
