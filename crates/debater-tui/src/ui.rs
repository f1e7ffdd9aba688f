use debater_core::{Role, StatusKind, TimelineEntry};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane};

const WELCOME_TEXT: &str = "Welcome! Enter a debate topic below. The system will retrieve \
relevant evidence from your uploaded documents and generate a structured debate with \
arguments for both sides.";

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [side_area, main_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Min(0)]).areas(body_area);

    let [notebooks_area, documents_area] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(side_area);

    let input_height = (app.input.draft().lines().count().max(1) as u16 + 2).min(8);
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(input_height)]).areas(main_area);

    render_header(app, frame, header_area);
    render_notebooks(app, frame, notebooks_area);
    render_documents(app, frame, documents_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.prompt.is_some() {
        render_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let notebook = app
        .shelf
        .selected()
        .map(|n| format!(" {} {} ", n.icon, n.name))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Debate Generator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(notebook, Style::default().fg(Color::White)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_notebooks(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Notebooks))
        .title(" Notebooks (n: new) ");

    let items: Vec<ListItem> = app
        .shelf
        .notebooks()
        .iter()
        .map(|n| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {}", n.icon, n.name)),
                Span::styled(format!(" ({})", n.count), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.shelf.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_documents(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Documents;
    let title = if app.is_uploading() {
        " Documents (uploading...) ".to_string()
    } else if app.is_refreshing() {
        " Documents (loading...) ".to_string()
    } else if app.is_building_database() {
        " Documents (indexing...) ".to_string()
    } else {
        format!(" Documents [{}] (r/u/b) ", app.library.documents().len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(title);

    if app.library.is_empty() {
        let empty = Paragraph::new("No documents uploaded yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let selected = app.library.selected_index();
    let items: Vec<ListItem> = app
        .library
        .documents()
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let marker = if Some(i) == selected { "* " } else { "  " };
            ListItem::new(vec![
                Line::from(format!("{marker}{}", d.name)),
                Line::from(Span::styled(
                    format!("    {} MB  {}", d.size_mb(), d.kind),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let cursor = focused.then_some(app.document_cursor);
    let mut state = ListState::default().with_selected(cursor);
    frame.render_stateful_widget(list, area, &mut state);
}

fn entry_lines(app: &App, entry: &TimelineEntry) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match entry {
        TimelineEntry::Conversation(message) => {
            let (label, color) = match message.role {
                Role::User => ("You:", Color::Cyan),
                Role::Assistant => ("Debate:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in message.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        TimelineEntry::Status(status) => {
            let line = match status.kind {
                StatusKind::Pending => {
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat(app.animation_frame as usize + 1);
                    Span::styled(
                        format!("⏳ {}{dots}", status.text),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )
                }
                StatusKind::Success => Span::styled(
                    format!("✅ {}", status.text),
                    Style::default().fg(Color::Green),
                ),
                StatusKind::Failure => Span::styled(
                    format!("❌ {}", status.text),
                    Style::default().fg(Color::Red),
                ),
            };
            lines.push(Line::from(line));
        }
    }
    lines.push(Line::default());
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Chat))
        .title(" Debate ");

    let text = if app.timeline().is_empty() {
        Text::from(Span::styled(WELCOME_TEXT, Style::default().fg(Color::DarkGray)))
    } else {
        let lines: Vec<Line> = app
            .timeline()
            .iter()
            .flat_map(|entry| entry_lines(app, entry))
            .collect();
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let generating = app.is_generating();
    let focused = app.focus == FocusPane::Chat;
    let border_color = if generating {
        Color::DarkGray
    } else if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if generating {
        " Generating... "
    } else {
        " Topic (Enter: generate, Shift+Enter: newline) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Locate the cursor as (row, column) within the draft
    let draft = app.input.draft();
    let before: String = draft.chars().take(app.input.cursor()).collect();
    let row = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|s| s.chars().count())
        .unwrap_or(0);

    let scroll_x = if inner_width > 0 && col >= inner_width {
        col - inner_width + 1
    } else {
        0
    };
    let scroll_y = if inner_height > 0 && row >= inner_height {
        row - inner_height + 1
    } else {
        0
    };

    let input = Paragraph::new(draft.to_string())
        .style(Style::default().fg(if generating { Color::DarkGray } else { Color::Cyan }))
        .scroll((scroll_y as u16, scroll_x as u16))
        .block(block);

    frame.render_widget(input, area);

    if focused && !generating && app.prompt.is_none() {
        frame.set_cursor_position((
            area.x + (col - scroll_x) as u16 + 1,
            area.y + (row - scroll_y) as u16 + 1,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(toast) = &app.toast {
        let style = match toast.kind {
            StatusKind::Success => Style::default().fg(Color::Green),
            StatusKind::Failure => Style::default().fg(Color::Red),
            StatusKind::Pending => Style::default().fg(Color::DarkGray),
        };
        frame.render_widget(Paragraph::new(format!(" {}", toast.message)).style(style), area);
        return;
    }

    let hints = match app.focus {
        FocusPane::Notebooks => " Tab: focus  j/k: move  n: new notebook  i: chat  q: quit ",
        FocusPane::Documents => {
            " Tab: focus  j/k: move  Enter: select  r: refresh  u: upload  b: build index  q: quit "
        }
        FocusPane::Chat => " Tab: focus  Enter: generate  PgUp/PgDn: scroll  Ctrl+C: quit ",
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let Some(prompt) = app.prompt else {
        return;
    };

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(prompt.title());

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let input_area = Rect::new(inner.x, inner.y, inner.width, 1);
    let width = input_area.width as usize;
    let cursor = app.prompt_input.cursor();
    let scroll_offset = if width > 0 && cursor >= width {
        cursor - width + 1
    } else {
        0
    };
    let visible: String = app
        .prompt_input
        .draft()
        .chars()
        .skip(scroll_offset)
        .take(width)
        .collect();
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );
    frame.set_cursor_position((input_area.x + (cursor - scroll_offset) as u16, input_area.y));

    let help = Paragraph::new("Enter to confirm, Esc to cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, Rect::new(inner.x, inner.y + 2, inner.width, 1));
}
