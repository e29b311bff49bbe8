use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::config::Theme;
use crate::status::MessageType;
use crate::ui_state::{FindField, Mode, PathPurpose};

const GUTTER_WIDTH: u16 = 6;

/// Colours resolved from the active theme.
struct Palette {
    foreground: Color,
    background: Color,
    accent: Color,
    status: Color,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            foreground: theme_color(&theme.editor_foreground, Color::White),
            background: theme_color(&theme.editor_background, Color::Reset),
            accent: theme_color(&theme.accent_color, Color::Yellow),
            status: theme_color(&theme.status_background, Color::Blue),
        }
    }
}

fn theme_color(value: &Option<String>, fallback: Color) -> Color {
    value
        .as_deref()
        .and_then(Theme::parse_hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();
    if size.width == 0 || size.height < 4 {
        return;
    }

    let palette = Palette::from_theme(&app.appearance.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Editor area
            Constraint::Length(2), // Status bar
        ])
        .split(size);

    draw_title_bar(f, app, &palette, chunks[0]);
    draw_editor(f, app, &palette, chunks[1]);
    draw_status_bar(f, app, &palette, chunks[2]);

    match app.mode() {
        Mode::Editing => {}
        Mode::Help => draw_help(f, &palette, chunks[1]),
        Mode::FindReplace => draw_find_replace(f, app, &palette, chunks[1]),
        Mode::ImportUrl => draw_input_prompt(
            f,
            app,
            &palette,
            chunks[1],
            " Import from Web ",
            "Enter an HTTPS URL to import:",
        ),
        Mode::PathPrompt(PathPurpose::Open) => {
            draw_input_prompt(f, app, &palette, chunks[1], " Open ", "File to open:")
        }
        Mode::PathPrompt(PathPurpose::SaveAs) => {
            draw_input_prompt(f, app, &palette, chunks[1], " Save As ", "Save as:")
        }
        Mode::UnsavedPrompt => draw_unsaved_prompt(f, app, &palette, chunks[1]),
    }
}

fn draw_title_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title_bar = Paragraph::new(format!("  {}", app.title()))
        .style(Style::default().bg(palette.status).fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(title_bar, area);
}

fn draw_editor(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let show_numbers = app.config.editor.line_numbers && area.width > GUTTER_WIDTH;
    let editor_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(if show_numbers { GUTTER_WIDTH } else { 0 }),
            Constraint::Min(0),
        ])
        .split(area);

    let buffer = app.document.buffer_mut();
    buffer.set_viewport_height(area.height as usize);

    let offset = buffer.viewport_offset();
    let lines = buffer.viewport_lines();
    let (caret_line, caret_col) = buffer.caret_line_col();
    let selection = buffer.selection();
    let base = Style::default().fg(palette.foreground).bg(palette.background);

    if show_numbers {
        let numbers: Vec<Line> = (0..lines.len())
            .map(|i| Line::from(format!("{:>4} ", offset + i + 1)))
            .collect();
        let gutter = Paragraph::new(numbers)
            .style(base.fg(Color::DarkGray))
            .block(Block::default().borders(Borders::RIGHT));
        f.render_widget(gutter, editor_area[0]);
    }

    let mut text_lines = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line_index = offset + i;
        let line_style = if app.config.editor.highlight_current_line && line_index == caret_line {
            base.bg(Color::DarkGray)
        } else {
            base
        };

        let local_selection = selection.and_then(|(start, end)| {
            let line_start = buffer.line_start(line_index);
            let len = line.chars().count();
            let from = start.saturating_sub(line_start).min(len);
            let to = end.saturating_sub(line_start).min(len);
            (end > line_start && from < to).then_some((from, to))
        });

        text_lines.push(match local_selection {
            Some((from, to)) => {
                let (a, b) = (byte_index(line, from), byte_index(line, to));
                Line::from(vec![
                    Span::styled(line[..a].to_string(), line_style),
                    Span::styled(
                        line[a..b].to_string(),
                        line_style.add_modifier(Modifier::REVERSED),
                    ),
                    Span::styled(line[b..].to_string(), line_style),
                ])
            }
            None => Line::from(Span::styled(line.clone(), line_style)),
        });
    }

    let content = Paragraph::new(text_lines).style(base);
    f.render_widget(content, editor_area[1]);

    if app.mode() == Mode::Editing && caret_line >= offset {
        let screen_line = caret_line - offset;
        let prefix: String = lines
            .get(screen_line)
            .map(|l| l.chars().take(caret_col).collect())
            .unwrap_or_default();
        let display_col = prefix.width();
        let text_area = editor_area[1];
        if screen_line < text_area.height as usize && display_col < text_area.width as usize {
            f.set_cursor(text_area.x + display_col as u16, text_area.y + screen_line as u16);
        }
    }
}

fn byte_index(line: &str, char_index: usize) -> usize {
    line.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn draw_status_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let status = Paragraph::new(format!(" {}", app.status_line()))
        .style(Style::default().bg(palette.status).fg(Color::White));
    f.render_widget(status, chunks[0]);

    let message = match app.ui_state.status.current() {
        Some(message) => {
            let color = match message.message_type {
                MessageType::Info => palette.foreground,
                MessageType::Success => Color::Green,
                MessageType::Warning => palette.accent,
                MessageType::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", message.content),
                Style::default().fg(color),
            ))
        }
        None => Line::from(vec![
            Span::styled(" ^S", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Save  "),
            Span::styled("^O", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Open  "),
            Span::styled("^F", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Find  "),
            Span::styled("^U", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Import  "),
            Span::styled("^Q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Exit  "),
            Span::styled("F1", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Help"),
        ]),
    };
    f.render_widget(Paragraph::new(message), chunks[1]);
}

/// A `width` x `height` rectangle centred in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn dialog_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.foreground).bg(palette.background))
}

fn draw_find_replace(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = &app.ui_state.find_replace;
    let rect = centered_rect(60, 7, area);
    let field = |label: &str, value: &str, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(palette.accent)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{}{:<9}", marker, label), style),
            Span::raw(value.to_string()),
        ])
    };

    let lines = vec![
        field("Find:", &state.find, state.focus == FindField::Find),
        field("Replace:", &state.replace, state.focus == FindField::Replace),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: Find Next  ^R: Replace  ^E: Replace All  Esc: Close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(dialog_block(" Find and Replace ", palette)),
        rect,
    );

    let (row, value) = match state.focus {
        FindField::Find => (0, &state.find),
        FindField::Replace => (1, &state.replace),
    };
    let x = rect.x + 1 + 11 + value.width() as u16;
    if x < rect.x + rect.width.saturating_sub(1) {
        f.set_cursor(x, rect.y + 1 + row);
    }
}

fn draw_input_prompt(
    f: &mut Frame,
    app: &App,
    palette: &Palette,
    area: Rect,
    title: &str,
    label: &str,
) {
    let rect = centered_rect(64, 6, area);
    let input = &app.ui_state.input;
    let mut lines = vec![Line::from(label.to_string()), Line::from(input.clone())];
    if let Some(error) = &app.ui_state.input_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(dialog_block(title, palette)), rect);

    let x = rect.x + 1 + input.width() as u16;
    if x < rect.x + rect.width.saturating_sub(1) {
        f.set_cursor(x, rect.y + 2);
    }
}

fn draw_unsaved_prompt(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rect = centered_rect(56, 6, area);
    let key = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(format!(
            "Do you want to save changes to {}?",
            app.document.display_name()
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[S]", key),
            Span::raw("ave   "),
            Span::styled("[D]", key),
            Span::raw("iscard   "),
            Span::styled("[C]", key),
            Span::raw("ancel"),
        ]),
    ];

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(dialog_block(" Unsaved Changes ", palette)),
        rect,
    );
}

fn draw_help(f: &mut Frame, palette: &Palette, area: Rect) {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled(" File", heading)),
        Line::from("  Ctrl+N          New document"),
        Line::from("  Ctrl+O          Open file"),
        Line::from("  Ctrl+S          Save"),
        Line::from("  Ctrl+Shift+S    Save as (also F12)"),
        Line::from("  Ctrl+U          Import from web"),
        Line::from("  Ctrl+Q          Exit"),
        Line::from(""),
        Line::from(Span::styled(" Edit", heading)),
        Line::from("  Ctrl+Z / Ctrl+Y Undo / Redo"),
        Line::from("  Ctrl+X/C/V      Cut / Copy / Paste"),
        Line::from("  Ctrl+A          Select all"),
        Line::from("  Ctrl+F          Find and replace"),
        Line::from("  Shift+Arrows    Extend selection"),
        Line::from(""),
        Line::from(Span::styled(
            " Press any key to close",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let rect = centered_rect(44, help_text.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(help_text).block(dialog_block(" Help ", palette)),
        rect,
    );
}
