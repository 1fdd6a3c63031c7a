use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub hint_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub loading_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Sidebar
    pub sidebar_border_style: Style,
    pub sidebar_title_style: Style,
    pub sidebar_item_style: Style,
    pub sidebar_selected_style: Style,
    pub sidebar_timestamp_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            hint_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            loading_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            sidebar_border_style: Style::default().fg(Color::Gray),
            sidebar_title_style: Style::default().fg(Color::Gray),
            sidebar_item_style: Style::default().fg(Color::White),
            sidebar_selected_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            sidebar_timestamp_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            hint_text_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            loading_indicator_style: Style::default().fg(Color::Black),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            sidebar_border_style: Style::default().fg(Color::Black),
            sidebar_title_style: Style::default().fg(Color::DarkGray),
            sidebar_item_style: Style::default().fg(Color::Black),
            sidebar_selected_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            sidebar_timestamp_style: Style::default().fg(Color::Gray),
        }
    }

    /// Theme named in the config file, if it is one we ship.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark_default()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_theme_names_resolve() {
        assert!(Theme::from_name("dark").is_some());
        assert!(Theme::from_name("Light").is_some());
        assert!(Theme::from_name("dracula").is_none());
    }

    #[test]
    fn dark_and_light_differ() {
        let dark = Theme::dark_default();
        let light = Theme::light();
        assert_ne!(dark.background_color, light.background_color);
    }
}
