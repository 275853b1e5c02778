use crate::core::theme_store::{DocumentRoot, Preference};
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Painted behind the whole frame
    pub background_color: Color,
    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub pending_style: Style,
    pub error_style: Style,
    pub source_style: Style,

    // Chrome
    pub title_style: Style,
    pub suggestion_key_style: Style,
    pub suggestion_text_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub disabled_input_style: Style,
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
            pending_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            error_style: Style::default().fg(Color::LightRed),
            source_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            suggestion_key_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            suggestion_text_style: Style::default().fg(Color::Gray),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            disabled_input_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
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
            pending_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            error_style: Style::default().fg(Color::Red),
            source_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            suggestion_key_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            suggestion_text_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            disabled_input_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::DIM),
        }
    }

    pub fn for_preference(preference: Preference) -> Self {
        match preference {
            Preference::Dark => Self::dark_default(),
            Preference::Light => Self::light(),
        }
    }

    /// Palette for whatever the document root currently says.
    pub fn for_document(document: &DocumentRoot) -> Self {
        Self::for_preference(document.applied_preference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme_store::THEME_ATTRIBUTE;

    #[test]
    fn document_without_attribute_is_dark() {
        let theme = Theme::for_document(&DocumentRoot::new());
        assert_eq!(theme.background_color, Color::Black);
    }

    #[test]
    fn light_attribute_selects_light_palette() {
        let mut document = DocumentRoot::new();
        document.set_attribute(THEME_ATTRIBUTE, "light");
        let theme = Theme::for_document(&document);
        assert_eq!(theme.background_color, Color::White);
        assert_eq!(theme.assistant_text_style.fg, Some(Color::Black));
    }
}
