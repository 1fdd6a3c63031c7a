#[cfg(test)]
use crate::core::app::{App, AppParams};
#[cfg(test)]
use crate::core::history::HistoryStore;
#[cfg(test)]
use crate::ui::theme::Theme;
#[cfg(test)]
use tempfile::TempDir;

/// App wired to a store inside a fresh temp directory. The directory guard
/// must stay alive for as long as the app should be able to persist.
#[cfg(test)]
pub fn create_test_app() -> (App, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = HistoryStore::with_path(dir.path().join("history.json"));
    let app = App::new(AppParams {
        model: "test-model".to_string(),
        api_key: "test-key".to_string(),
        base_url: "https://api.test.invalid".to_string(),
        theme: Theme::dark_default(),
        store,
    });
    (app, dir)
}
