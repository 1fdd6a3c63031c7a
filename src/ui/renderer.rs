use crate::core::app::{App, Focus};
use crate::utils::scroll::ScrollCalculator;
use crate::utils::time::format_chat_timestamp;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

pub const SIDEBAR_WIDTH: u16 = 30;

/// Rows the input area needs for its current contents, borders excluded.
pub fn input_height(app: &App) -> u16 {
    app.textarea.lines().len().clamp(1, 6) as u16
}

/// Width and height of the transcript text viewport for a given terminal
/// size. Key handlers use this to clamp scrolling with the same geometry the
/// renderer draws with.
pub fn transcript_viewport(term_width: u16, term_height: u16, input_height: u16) -> (u16, u16) {
    let width = term_width.saturating_sub(SIDEBAR_WIDTH);
    // Input block borders plus the transcript title line.
    let height = term_height
        .saturating_sub(input_height + 2)
        .saturating_sub(1);
    (width, height)
}

pub fn ui(f: &mut Frame, app: &App) {
    let background = Block::default().style(Style::default().bg(app.theme.background_color));
    f.render_widget(background, f.area());

    let input_rows = input_height(app);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(f.area());
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(input_rows + 2)])
        .split(columns[1]);

    render_sidebar(f, app, columns[0]);
    render_transcript(f, app, main[0]);
    render_input(f, app, main[1]);
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let inner_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = app
        .history
        .chats()
        .iter()
        .map(|chat| {
            let title = fit_to_width(&chat.display_title(), inner_width);
            let stamp = format_chat_timestamp(chat.last_activity());
            ListItem::new(vec![
                Line::from(Span::styled(title, app.theme.sidebar_item_style)),
                Line::from(Span::styled(
                    format!("  {stamp}"),
                    app.theme.sidebar_timestamp_style,
                )),
            ])
        })
        .collect();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.sidebar_border_style)
        .title(Span::styled(" Chats ", app.theme.sidebar_title_style));
    if focused {
        block = block.title_bottom(Line::from(Span::styled(
            " Enter select / d delete ",
            app.theme.sidebar_timestamp_style,
        )));
    } else {
        block = block.title_bottom(Line::from(Span::styled(
            " Ctrl+N new chat ",
            app.theme.sidebar_timestamp_style,
        )));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.sidebar_selected_style);

    let highlighted = if focused {
        app.sidebar_cursor
    } else {
        app.history.current_index()
    };
    let mut state = ListState::default();
    state.select(Some(highlighted));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_transcript(f: &mut Frame, app: &App, area: Rect) {
    let lines = app.build_display_lines();
    let viewport_height = area.height.saturating_sub(1);
    let wrapped = ScrollCalculator::prewrap_lines(&lines, area.width);
    let total = wrapped.len().min(u16::MAX as usize) as u16;
    let max_offset = total.saturating_sub(viewport_height);
    let offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let title = format!(" Geminal v{} - {} ", env!("CARGO_PKG_VERSION"), app.model);
    let paragraph = Paragraph::new(wrapped)
        .block(Block::default().title(Span::styled(title, app.theme.title_style)))
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input;
    let title = if app.is_sending() {
        " Waiting for reply... "
    } else if focused {
        " Message (Enter to send, Alt+Enter for newline) "
    } else {
        " Message (Tab to focus) "
    };

    let border_style = if focused {
        app.theme.input_border_style
    } else {
        app.theme.sidebar_timestamp_style
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, app.theme.input_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(&app.textarea, inner);
}

/// Truncates to `max` display columns, ellipsizing when it does not fit.
fn fit_to_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }

    let budget = max.saturating_sub(1);
    let mut width = 0usize;
    let mut truncated = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > budget {
            break;
        }
        truncated.push(ch);
        width += ch_width;
    }
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_accounts_for_sidebar_and_input() {
        let (width, height) = transcript_viewport(120, 40, 1);
        assert_eq!(width, 90);
        assert_eq!(height, 36);
    }

    #[test]
    fn viewport_never_underflows() {
        let (width, height) = transcript_viewport(20, 3, 6);
        assert_eq!(width, 0);
        assert_eq!(height, 0);
    }

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(fit_to_width("New Chat", 28), "New Chat");
    }

    #[test]
    fn wide_titles_are_ellipsized() {
        let fitted = fit_to_width("A title that is clearly too wide for the sidebar", 12);
        assert!(fitted.ends_with('…'));
        assert!(fitted.chars().count() <= 12);
    }
}
