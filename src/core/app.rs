use chrono::Utc;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use reqwest::Client;
use std::time::Instant;
use tracing::{error, warn};
use tui_textarea::TextArea;

use crate::api;
use crate::core::chat::{derive_title, ChatHistory};
use crate::core::completion::{CompletionOutcome, CompletionParams};
use crate::core::history::HistoryStore;
use crate::core::message::{Message, Role};
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollCalculator;

/// Appended in place of a reply when a completion request fails. The real
/// error goes to the diagnostic log, not the transcript.
pub const COMPLETION_ERROR_TEXT: &str =
    "Sorry, I encountered an error. Please check your API key and try again.";

/// Canned prompts offered on an empty chat; Alt+1..Alt+4 pre-fill the input.
pub const STARTER_PROMPTS: [&str; 4] = [
    "Explain quantum computing",
    "Write a poem about the ocean",
    "How do neural networks work?",
    "Give me recipe ideas",
];

pub const INPUT_PLACEHOLDER: &str = "Message Gemini...";

/// Which pane keyboard input is directed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// The single in-flight completion request.
///
/// `chat_id` goes to `None` when the owning chat is deleted mid-flight; the
/// outcome still releases the gate but its text is dropped.
#[derive(Debug, Clone)]
struct PendingRequest {
    id: u64,
    chat_id: Option<String>,
}

pub struct AppParams {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub theme: Theme,
    pub store: HistoryStore,
}

/// Owns every piece of mutable chat state: the collection, the input buffer,
/// scroll position, and the submission gate. All mutations go through the
/// methods here; the UI layer only forwards intent and draws the result.
pub struct App {
    pub history: ChatHistory,
    pub focus: Focus,
    /// Sidebar highlight position. Independent of the selected chat until
    /// Enter confirms it.
    pub sidebar_cursor: usize,
    pub textarea: TextArea<'static>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub pulse_start: Instant,
    pub theme: Theme,
    pub client: Client,
    pub model: String,
    pub base_url: String,
    api_key: String,
    store: HistoryStore,
    pending: Option<PendingRequest>,
    next_request_id: u64,
}

impl App {
    pub fn new(params: AppParams) -> Self {
        let AppParams {
            model,
            api_key,
            base_url,
            theme,
            store,
        } = params;

        let history = ChatHistory::from_chats(store.load());
        let textarea = fresh_textarea(&theme);

        Self {
            history,
            focus: Focus::Input,
            sidebar_cursor: 0,
            textarea,
            scroll_offset: 0,
            auto_scroll: true,
            pulse_start: Instant::now(),
            theme,
            client: Client::new(),
            model,
            base_url,
            api_key,
            store,
            pending: None,
            next_request_id: 0,
        }
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.textarea = fresh_textarea(&self.theme);
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accepts the current input as a user message and hands back the request
    /// to spawn, or `None` when the submission is rejected (blank input, or a
    /// request already in flight).
    ///
    /// The user message is appended optimistically before the network call is
    /// even constructed; the collection is persisted right away.
    pub fn submit_message(&mut self) -> Option<CompletionParams> {
        let text = self.input_text();
        if text.trim().is_empty() || self.pending.is_some() {
            return None;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let chat = self.history.current_chat_mut();
        chat.messages.push(Message::user(text));
        let chat_id = chat.id.clone();
        let contents = api::build_contents(&chat.messages);

        self.pending = Some(PendingRequest {
            id: request_id,
            chat_id: Some(chat_id.clone()),
        });
        self.clear_input();
        self.auto_scroll = true;
        self.pulse_start = Instant::now();
        self.persist();

        Some(CompletionParams {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            contents,
            chat_id,
            request_id,
        })
    }

    /// Lands a completion outcome: the reply (or the fixed error text) is
    /// appended to the chat that submitted the request, found by id, so a
    /// selection change mid-flight never misdirects it. The gate returns to
    /// Idle whatever the outcome says.
    pub fn apply_outcome(&mut self, outcome: CompletionOutcome) {
        let Some(pending) = self.pending.as_ref() else {
            warn!(
                request_id = outcome.request_id,
                "Dropping completion outcome with no request pending"
            );
            return;
        };
        if pending.id != outcome.request_id {
            warn!(
                request_id = outcome.request_id,
                pending_id = pending.id,
                "Dropping stale completion outcome"
            );
            return;
        }

        let target = pending.chat_id.clone();
        self.pending = None;

        let succeeded = outcome.result.is_ok();
        let reply = match outcome.result {
            Ok(text) => text,
            Err(err) => {
                error!(error = %err, "Completion request failed");
                COMPLETION_ERROR_TEXT.to_string()
            }
        };

        let Some(chat_id) = target else {
            warn!(
                request_id = outcome.request_id,
                "Owning chat was deleted mid-flight; dropping reply"
            );
            return;
        };
        let Some(chat) = self.history.chat_by_id_mut(&chat_id) else {
            warn!(chat_id = %chat_id, "Owning chat no longer exists; dropping reply");
            return;
        };

        chat.messages.push(Message::assistant(reply));
        chat.last_updated = Some(Utc::now());
        if succeeded && !chat.has_title() {
            if let Some(first) = chat.first_user_message() {
                chat.title = derive_title(&first.content);
            }
        }

        self.auto_scroll = true;
        self.persist();
    }

    /// Starts a fresh chat at the top of the sidebar and clears the input.
    pub fn new_chat(&mut self) {
        self.history.new_chat();
        self.clear_input();
        self.reset_scroll();
        self.persist();
    }

    pub fn select_chat(&mut self, index: usize) {
        self.history.select_chat(index);
        self.reset_scroll();
    }

    pub fn sidebar_cursor_up(&mut self) {
        self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
    }

    pub fn sidebar_cursor_down(&mut self) {
        if self.sidebar_cursor + 1 < self.history.len() {
            self.sidebar_cursor += 1;
        }
    }

    /// Makes the highlighted chat current and hands focus back to the input.
    pub fn select_highlighted_chat(&mut self) {
        self.select_chat(self.sidebar_cursor);
        self.focus = Focus::Input;
    }

    pub fn delete_highlighted_chat(&mut self) {
        self.delete_chat(self.sidebar_cursor);
        self.sidebar_cursor = self
            .sidebar_cursor
            .min(self.history.len().saturating_sub(1));
    }

    /// Deletes the chat at `index`. An in-flight request owned by that chat
    /// is orphaned: its eventual outcome releases the gate but its text is
    /// dropped.
    pub fn delete_chat(&mut self, index: usize) {
        if index >= self.history.len() {
            return;
        }
        let removed_id = self.history.chats()[index].id.clone();
        self.history.delete_chat(index);

        if let Some(pending) = self.pending.as_mut() {
            if pending.chat_id.as_deref() == Some(removed_id.as_str()) {
                pending.chat_id = None;
            }
        }

        self.reset_scroll();
        self.persist();
    }

    /// Replaces the input with one of the canned starter prompts. Only
    /// offered while the active chat is still empty, mirroring when the
    /// prompts are on screen.
    pub fn apply_starter_prompt(&mut self, index: usize) {
        if !self.history.current_chat().messages.is_empty() {
            return;
        }
        let Some(prompt) = STARTER_PROMPTS.get(index) else {
            return;
        };
        self.clear_input();
        self.textarea.insert_str(prompt);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => {
                self.sidebar_cursor = self.history.current_index();
                Focus::Sidebar
            }
            Focus::Sidebar => Focus::Input,
        };
    }

    /// Transcript lines for the active chat, styled but not yet wrapped.
    /// Empty chats show a greeting and the starter prompts instead.
    pub fn build_display_lines(&self) -> Vec<Line<'static>> {
        let chat = self.history.current_chat();
        let mut lines = Vec::new();

        if chat.messages.is_empty() && !self.is_sending() {
            lines.push(Line::from(Span::styled(
                "How can I help you today?",
                self.theme.title_style,
            )));
            lines.push(Line::from(""));
            for (i, prompt) in STARTER_PROMPTS.iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    format!("  Alt+{}  {prompt}", i + 1),
                    self.theme.hint_text_style,
                )));
            }
            return lines;
        }

        for message in &chat.messages {
            match message.role {
                Role::User => {
                    let mut content_lines = message.content.lines();
                    let first = content_lines.next().unwrap_or("");
                    lines.push(Line::from(vec![
                        Span::styled("You: ", self.theme.user_prefix_style),
                        Span::styled(first.to_string(), self.theme.user_text_style),
                    ]));
                    for rest in content_lines {
                        lines.push(Line::from(Span::styled(
                            rest.to_string(),
                            self.theme.user_text_style,
                        )));
                    }
                }
                Role::Assistant => {
                    for content_line in message.content.lines() {
                        if content_line.trim().is_empty() {
                            lines.push(Line::from(""));
                        } else {
                            lines.push(Line::from(Span::styled(
                                content_line.to_string(),
                                self.theme.assistant_text_style,
                            )));
                        }
                    }
                }
            }
            lines.push(Line::from(""));
        }

        if self.is_sending() {
            lines.push(Line::from(Span::styled(
                self.pulse_symbol(),
                self.theme.loading_indicator_style,
            )));
        }

        lines
    }

    pub fn max_scroll_offset(&self, width: u16, viewport_height: u16) -> u16 {
        ScrollCalculator::max_scroll_offset(&self.build_display_lines(), width, viewport_height)
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_offset);
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    /// Animation frame for the loading indicator, two pulses per second.
    fn pulse_symbol(&self) -> &'static str {
        let elapsed = self.pulse_start.elapsed().as_millis() as f32 / 1000.0;
        let phase = (elapsed * 2.0) % 2.0;
        let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
        if intensity < 0.33 {
            "○"
        } else if intensity < 0.66 {
            "◐"
        } else {
            "●"
        }
    }

    fn persist(&self) {
        self.store.save(self.history.as_persisted());
    }
}

fn fresh_textarea(theme: &Theme) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(INPUT_PLACEHOLDER);
    textarea.set_placeholder_style(theme.hint_text_style);
    textarea.set_cursor_line_style(Style::default());
    textarea.set_cursor_style(theme.input_cursor_style);
    textarea.set_style(theme.input_text_style);
    textarea
}
