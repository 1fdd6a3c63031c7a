use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::message::Message;

/// Longest stored title, in characters, before truncation kicks in.
const TITLE_MAX_CHARS: usize = 40;

/// Longest sidebar fallback label derived from a chat's first message.
const FALLBACK_TITLE_MAX_CHARS: usize = 30;

const UNTITLED_LABEL: &str = "New Chat";

/// One conversation: an ordered transcript plus bookkeeping for the sidebar.
///
/// `title` starts empty and is assigned once, from the first user message,
/// when the chat accumulates its first reply. `last_updated` is set on every
/// completed exchange; `created_at` never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            id: generate_chat_id(),
            title: String::new(),
            messages: Vec::new(),
            created_at: Utc::now(),
            last_updated: None,
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Label shown in the sidebar: the stored title, else a prefix of the
    /// first message, else a fixed placeholder for brand-new chats.
    pub fn display_title(&self) -> String {
        if self.has_title() {
            return self.title.clone();
        }
        if let Some(first) = self.messages.first() {
            return truncate_chars(&first.content, FALLBACK_TITLE_MAX_CHARS);
        }
        UNTITLED_LABEL.to_string()
    }

    /// Timestamp the sidebar sorts and labels by.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_updated.unwrap_or(self.created_at)
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role.is_user())
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a chat title from its first user message: the first 40 characters,
/// with an ellipsis marker when the message is longer. Pure; callers invoke it
/// only while the owning chat's title is still unset.
pub fn derive_title(first_user_message: &str) -> String {
    truncate_chars(first_user_message, TITLE_MAX_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let prefix: String = text.chars().take(max_chars).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    }
}

/// Ids are creation-time based with a random suffix so that chats created
/// within the same millisecond stay distinct.
pub fn generate_chat_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    let mut suffix = [0u8; 4];
    match getrandom::fill(&mut suffix) {
        Ok(()) => format!(
            "chat-{millis:x}-{:02x}{:02x}{:02x}{:02x}",
            suffix[0], suffix[1], suffix[2], suffix[3]
        ),
        Err(_) => format!("chat-{millis:x}"),
    }
}

/// The in-memory conversation collection plus the current selection.
///
/// Holds the two structural invariants the rest of the app leans on: the
/// collection never has fewer than one chat, and `current` always indexes a
/// valid element. Construction and every mutation preserve both.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    chats: Vec<Chat>,
    current: usize,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self {
            chats: vec![Chat::new()],
            current: 0,
        }
    }

    /// Builds a history from a loaded collection, seeding one fresh chat when
    /// the collection is empty. The current selection always starts at 0.
    pub fn from_chats(mut chats: Vec<Chat>) -> Self {
        if chats.is_empty() {
            chats.push(Chat::new());
        }
        Self { chats, current: 0 }
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_chat(&self) -> &Chat {
        &self.chats[self.current]
    }

    pub fn current_chat_mut(&mut self) -> &mut Chat {
        &mut self.chats[self.current]
    }

    pub fn chat_by_id_mut(&mut self, id: &str) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| c.id == id)
    }

    /// Prepends a fresh empty chat and makes it current.
    pub fn new_chat(&mut self) {
        self.chats.insert(0, Chat::new());
        self.current = 0;
    }

    /// Sets the current selection. Indices come from the rendered list and
    /// are valid by construction; anything else is ignored.
    pub fn select_chat(&mut self, index: usize) {
        if index < self.chats.len() {
            self.current = index;
        }
    }

    /// Removes the chat at `index`, renumbering the current selection.
    ///
    /// Deleting the sole remaining chat clears it in place instead: the slot
    /// survives (count stays 1) but the chat is reset wholesale, including a
    /// fresh id so an in-flight completion for the old chat cannot land in
    /// the cleared one.
    pub fn delete_chat(&mut self, index: usize) {
        if index >= self.chats.len() {
            return;
        }
        if self.chats.len() == 1 {
            self.chats[0] = Chat::new();
            self.current = 0;
            return;
        }
        self.chats.remove(index);
        if index == self.current {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        }
    }

    /// Hands back the collection for persistence. The persisted form is the
    /// whole collection, never a partial slice.
    pub fn as_persisted(&self) -> &Vec<Chat> {
        &self.chats
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}
