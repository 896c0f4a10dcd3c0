use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, FocusPane, InputMode};
use crate::controller::RequestState;
use crate::prompt::TEMPLATES;
use crate::theme::Palette;
use crate::transcript::ChatRole;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.get().palette();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        area,
    );

    let error_height = if app.session.last_error().is_some() { 3 } else { 0 };

    // Main layout: header, settings, transcript, prompt, error, footer
    let [header_area, settings_area, transcript_area, prompt_area, error_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(error_height),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area, &palette);
    render_settings(app, frame, settings_area, &palette);
    render_transcript(app, frame, transcript_area, &palette);
    render_prompt(app, frame, prompt_area, &palette);
    if error_height > 0 {
        render_error(app, frame, error_area, &palette);
    }
    render_footer(app, frame, footer_area, &palette);

    if app.show_template_picker {
        render_template_picker(app, frame, area, &palette);
    }
}

fn border_style(focused: bool, palette: &Palette) -> Style {
    if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let theme = app.theme.get();
    let [title_area, theme_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(12)]).areas(area);

    let title = Line::from(vec![
        Span::styled(" AI Platform UI ", Style::default().fg(palette.accent).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    let toggle = Paragraph::new(format!("[{}] ", theme.label()))
        .style(Style::default().fg(palette.muted))
        .right_aligned();
    frame.render_widget(toggle, theme_area);
}

fn render_settings(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Settings, palette))
        .title(" Generation ");

    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.foreground).add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(" Model ", label),
        Span::styled(app.config.model().as_str(), value),
        Span::styled("   Temperature ", label),
        Span::styled(app.config.temperature().to_string(), value),
        Span::styled("   Max Tokens ", label),
        Span::styled(app.config.max_tokens().to_string(), value),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == FocusPane::Transcript;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused, palette))
        .title(format!(" Chat ({}) ", app.session.transcript().len()));

    if app.session.transcript().is_empty() && !app.session.is_pending() {
        let placeholder = Paragraph::new("No messages yet. Type a prompt and press Enter.")
            .style(Style::default().fg(palette.muted))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let selected = app.transcript_state.selected();
    let mut items: Vec<ListItem> = app
        .session
        .transcript()
        .messages()
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let (label, color) = match msg.role {
                ChatRole::User => ("User:", palette.user),
                ChatRole::Assistant => ("Assistant:", palette.assistant),
            };
            let mut lines = vec![Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))];
            lines.extend(msg.content.lines().map(|l| Line::from(format!("  {}", l))));
            if msg.role == ChatRole::Assistant && focused && selected == Some(i) {
                lines.push(Line::from(Span::styled(
                    "  [c] Copy  [e] Download JSON",
                    Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                )));
            }
            lines.push(Line::default());
            ListItem::new(lines)
        })
        .collect();

    if app.session.is_pending() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        items.push(ListItem::new(vec![
            Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(palette.assistant).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  Thinking{}", dots),
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            )),
        ]));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(if focused {
            Style::default().bg(palette.selection_bg).fg(palette.selection_fg)
        } else {
            Style::default()
        })
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.transcript_state);
}

fn render_prompt(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let editing = app.input_mode == InputMode::Editing;

    let send_label = match app.session.state() {
        RequestState::Pending => Span::styled(" Loading... ", Style::default().fg(palette.muted)),
        _ if app.session.can_submit() => {
            Span::styled(" Send (Enter) ", Style::default().fg(palette.accent).bold())
        }
        _ => Span::styled(" Send ", Style::default().fg(palette.muted)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Prompt || editing, palette))
        .title(" Prompt ")
        .title_bottom(Line::from(send_label).right_aligned());

    let prompt = app.session.prompt();
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = visible_window(prompt.text(), prompt.cursor(), inner_width);

    let input = if prompt.is_empty() && !editing {
        Paragraph::new("Type your prompt here...").style(Style::default().fg(palette.muted))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(palette.user))
    };
    frame.render_widget(input.block(block), area);

    if editing && !app.show_template_picker {
        frame.set_cursor_position((area.x + cursor_x as u16 + 1, area.y + 1));
    }
}

/// Horizontal scroll for a single-line input, measured in terminal cells so
/// wide characters keep the cursor aligned. `cursor` is a char index.
/// Returns the visible slice and the cursor column within it.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let cells: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, c.width().unwrap_or(0)))
        .collect();
    let cursor = cursor.min(cells.len());

    // Drop leading chars until the cursor cell fits
    let mut start = 0;
    let mut before_cursor: usize = cells[..cursor].iter().map(|(_, w)| w).sum();
    while start < cursor && before_cursor + 1 > width {
        before_cursor -= cells[start].1;
        start += 1;
    }

    let mut used = 0;
    let visible = cells[start..]
        .iter()
        .take_while(|(_, w)| {
            used += w;
            used <= width
        })
        .map(|(c, _)| *c)
        .collect();

    (visible, before_cursor)
}

fn render_error(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let message = app.session.last_error().unwrap_or_default();
    let banner = Paragraph::new(message)
        .style(Style::default().fg(palette.error))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error))
                .title(" Request failed "),
        );
    frame.render_widget(banner, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(palette.accent).fg(palette.selection_fg),
        InputMode::Editing => Style::default().bg(palette.assistant).fg(palette.background),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " PROMPT ",
    };

    let key_style = Style::default().fg(palette.accent).bold();
    let label_style = Style::default().fg(palette.muted);

    let pairs: &[(&str, &str)] = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => &[
            ("Enter", "send"),
            ("Esc", "stop typing"),
            ("^N", "model"),
            ("^Up/Dn", "temp"),
            ("PgUp/Dn", "tokens"),
            ("^T", "theme"),
        ],
        (InputMode::Normal, FocusPane::Transcript) => &[
            ("j/k", "select"),
            ("c", "copy"),
            ("e", "export"),
            ("Tab", "focus"),
            ("q", "quit"),
        ],
        (InputMode::Normal, _) => &[
            ("i", "edit"),
            ("m/M", "model"),
            ("+/-", "temp"),
            ("[/]", "tokens"),
            ("p", "template"),
            ("t", "theme"),
            ("Tab", "focus"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!("{} ", label), label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {}", status), Style::default().fg(palette.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_template_picker(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    // Calculate popup size and position (centered)
    let popup_width = 40.min(area.width.saturating_sub(4));
    let popup_height = (TEMPLATES.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.background).fg(palette.foreground))
        .title(" Insert Template ");

    let items: Vec<ListItem> = TEMPLATES
        .iter()
        .map(|template| ListItem::new(format!(" {} ", template.name)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(palette.selection_bg)
                .fg(palette.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.template_picker_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_visible_window_scrolls_by_cell_width() {
        assert_eq!(visible_window("hello", 5, 10), ("hello".to_string(), 5));
        assert_eq!(visible_window("abcdef", 6, 4), ("def".to_string(), 3));
        assert_eq!(visible_window("abcdef", 0, 4), ("abcd".to_string(), 0));

        // Each CJK char takes two cells
        assert_eq!(visible_window("你好", 2, 10), ("你好".to_string(), 4));
        assert_eq!(visible_window("你好世界", 4, 5), ("世界".to_string(), 4));
        assert_eq!(visible_window("", 0, 0), (String::new(), 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_settings_and_loading_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = test_app(&dir);

        let idle = screen_text(&mut app);
        assert!(idle.contains("gpt-3.5"));
        assert!(idle.contains("256"));
        assert!(idle.contains("[Light]"));

        app.session.prompt_mut().replace("Hello");
        app.submit_prompt();
        let pending = screen_text(&mut app);
        assert!(pending.contains("Loading..."));
        assert!(pending.contains("Hello"));
    }
}
