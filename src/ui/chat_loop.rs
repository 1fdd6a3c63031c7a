//! Terminal lifecycle and the main chat event loop.
//!
//! Owns the raw-mode terminal, routes key events into [`App`], forwards
//! accepted submissions to the completion service, and drains completion
//! outcomes back into the app between frames.

use crate::auth::AuthManager;
use crate::core::app::{App, AppParams, Focus};
use crate::core::completion::CompletionService;
use crate::core::config::Config;
use crate::core::history::HistoryStore;
use crate::ui::renderer::{input_height, transcript_viewport, ui};
use crate::ui::theme::Theme;
use ratatui::crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tui_textarea::Input;

const PAGE_SCROLL_STEP: u16 = 10;

pub async fn run_chat(
    model_override: Option<String>,
    env_only: bool,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let auth = AuthManager::new_with_keyring(!env_only);
    let api_key = match auth.resolve_api_key()? {
        Some(key) => key,
        None => {
            eprintln!("❌ No API key configured and GEMINI_API_KEY is not set");
            eprintln!();
            eprintln!("Please either:");
            eprintln!("  1. Run 'geminal auth' to store a key, or");
            eprintln!("  2. Set the environment variable:");
            eprintln!("     export GEMINI_API_KEY=\"your-api-key-here\"");
            std::process::exit(2);
        }
    };

    let model = config.resolve_model(model_override.as_deref());
    let theme = config
        .theme
        .as_deref()
        .and_then(Theme::from_name)
        .unwrap_or_default();

    let app = Arc::new(Mutex::new(App::new(AppParams {
        model,
        api_key,
        base_url: crate::api::GEMINI_BASE_URL.to_string(),
        theme,
        store: HistoryStore::new(),
    })));
    let (service, mut rx) = CompletionService::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = 'main_loop: loop {
        {
            let app_guard = app.lock().await;
            terminal.draw(|f| ui(f, &app_guard))?;
        }
        let term_size = terminal.size().unwrap_or_default();

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('c'))
                        && key.modifiers.contains(event::KeyModifiers::CONTROL)
                    {
                        break 'main_loop Ok(());
                    }
                    if matches!(key.code, KeyCode::Char('n'))
                        && key.modifiers.contains(event::KeyModifiers::CONTROL)
                    {
                        let mut app_guard = app.lock().await;
                        app_guard.new_chat();
                        continue;
                    }
                    if matches!(key.code, KeyCode::Tab) {
                        let mut app_guard = app.lock().await;
                        app_guard.toggle_focus();
                        continue;
                    }
                    if key.modifiers.contains(event::KeyModifiers::ALT) {
                        if let KeyCode::Char(digit @ '1'..='4') = key.code {
                            let mut app_guard = app.lock().await;
                            app_guard.apply_starter_prompt(digit as usize - '1' as usize);
                            continue;
                        }
                    }

                    let mut app_guard = app.lock().await;
                    match app_guard.focus {
                        Focus::Sidebar => match key.code {
                            KeyCode::Up | KeyCode::Char('k') => app_guard.sidebar_cursor_up(),
                            KeyCode::Down | KeyCode::Char('j') => app_guard.sidebar_cursor_down(),
                            KeyCode::Enter => app_guard.select_highlighted_chat(),
                            KeyCode::Esc => app_guard.focus = Focus::Input,
                            KeyCode::Delete | KeyCode::Char('d') => {
                                app_guard.delete_highlighted_chat();
                            }
                            _ => {}
                        },
                        Focus::Input => match key.code {
                            KeyCode::Enter
                                if key.modifiers.contains(event::KeyModifiers::SHIFT)
                                    || key.modifiers.contains(event::KeyModifiers::ALT) =>
                            {
                                app_guard.textarea.insert_str("\n");
                            }
                            KeyCode::Enter => {
                                if let Some(params) = app_guard.submit_message() {
                                    service.spawn_request(params);
                                }
                            }
                            KeyCode::PageUp => app_guard.scroll_up(PAGE_SCROLL_STEP),
                            KeyCode::PageDown => {
                                let (width, height) = transcript_viewport(
                                    term_size.width,
                                    term_size.height,
                                    input_height(&app_guard),
                                );
                                let max_offset = app_guard.max_scroll_offset(width, height);
                                app_guard.scroll_down(PAGE_SCROLL_STEP, max_offset);
                            }
                            // With text in the input these keys belong to the
                            // textarea; on an empty input they scroll the
                            // transcript instead.
                            KeyCode::Up if app_guard.input_text().is_empty() => {
                                app_guard.scroll_up(1);
                            }
                            KeyCode::Down if app_guard.input_text().is_empty() => {
                                let (width, height) = transcript_viewport(
                                    term_size.width,
                                    term_size.height,
                                    input_height(&app_guard),
                                );
                                let max_offset = app_guard.max_scroll_offset(width, height);
                                app_guard.scroll_down(1, max_offset);
                            }
                            KeyCode::Home if app_guard.input_text().is_empty() => {
                                app_guard.scroll_up(u16::MAX);
                            }
                            KeyCode::End if app_guard.input_text().is_empty() => {
                                app_guard.scroll_to_bottom();
                            }
                            _ => {
                                app_guard.textarea.input(Input::from(key));
                            }
                        },
                    }
                }
                Event::Paste(text) => {
                    let mut app_guard = app.lock().await;
                    app_guard.textarea.insert_str(sanitize_paste(&text));
                }
                _ => {}
            }
        }

        // Land completion outcomes before the next frame so the reply and the
        // reopened input show up together.
        let mut received_any = false;
        while let Ok(outcome) = rx.try_recv() {
            let mut app_guard = app.lock().await;
            app_guard.apply_outcome(outcome);
            received_any = true;
        }
        if received_any {
            continue;
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

/// Normalizes pasted text: tabs become spaces, carriage returns become
/// newlines, and remaining control characters are dropped so they cannot
/// corrupt the terminal.
fn sanitize_paste(text: &str) -> String {
    text.replace('\t', "    ")
        .replace('\r', "\n")
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}
