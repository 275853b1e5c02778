use std::time::Duration;

use crate::core::controller::ChatController;
use crate::ui::theme::Theme;
use crate::ui::transcript_view::{build_display_lines, prewrap_lines, ScrollState};
use crate::utils::url::endpoint_label;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const INPUT_HEIGHT: u16 = 3;

/// Everything a frame needs, borrowed from the chat loop.
pub struct ChatView<'a> {
    pub controller: &'a ChatController,
    pub theme: &'a Theme,
    pub input: &'a str,
    pub toggle_label: &'a str,
    pub base_url: &'a str,
    pub course_count: Option<usize>,
    pub scroll: ScrollState,
    /// Time since the current turn started; drives the busy indicator.
    pub sending_for: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatAreas {
    pub title: Rect,
    pub transcript: Rect,
    pub suggestions: Rect,
    pub input: Rect,
}

pub fn layout_areas(area: Rect) -> ChatAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT),
        ])
        .split(area);
    ChatAreas {
        title: chunks[0],
        transcript: chunks[1],
        suggestions: chunks[2],
        input: chunks[3],
    }
}

pub fn ui(f: &mut Frame, view: &ChatView<'_>) {
    let theme = view.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );
    let areas = layout_areas(f.area());

    let title = Paragraph::new(Line::from(Span::styled(title_text(view), theme.title_style)));
    f.render_widget(title, areas.title);

    let lines = build_display_lines(view.controller.transcript().entries(), theme);
    let rows = prewrap_lines(&lines, areas.transcript.width);
    let total_rows = u16::try_from(rows.len()).unwrap_or(u16::MAX);
    let scroll_offset = view.scroll.offset(total_rows, areas.transcript.height);
    let messages = Paragraph::new(rows).scroll((scroll_offset, 0));
    f.render_widget(messages, areas.transcript);

    f.render_widget(
        Paragraph::new(suggestion_line(view.controller.suggested_questions(), theme)),
        areas.suggestions,
    );

    render_input(f, view, areas.input);
}

fn render_input(f: &mut Frame, view: &ChatView<'_>, area: Rect) {
    let theme = view.theme;
    let sending = view.controller.is_sending();
    let (text_style, input_title) = if view.controller.can_submit() {
        (
            theme.input_text_style,
            "Ask about the courses (Enter to send, Ctrl+T theme, Ctrl+C to quit)",
        )
    } else {
        (theme.disabled_input_style, "Waiting for the answer…")
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let text = match view.sending_for.filter(|_| sending) {
        Some(elapsed) => with_indicator(view.input, pulse_symbol(elapsed), inner_width),
        None => view.input.to_string(),
    };

    let input = Paragraph::new(text)
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.input_border_style)
                .title(Span::styled(input_title, theme.input_title_style)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(input, area);

    if !sending {
        let cursor_x = unicode_width::UnicodeWidthStr::width(view.input) as u16;
        f.set_cursor_position((
            area.x + cursor_x.min(area.width.saturating_sub(3)) + 1,
            area.y + 1,
        ));
    }
}

fn title_text(view: &ChatView<'_>) -> String {
    let mut title = format!(
        "Coursebot v{} - {}",
        env!("CARGO_PKG_VERSION"),
        endpoint_label(view.base_url)
    );
    if let Some(count) = view.course_count {
        title.push_str(&format!(" • {count} courses"));
    }
    if let Some(session) = view.controller.session_id() {
        title.push_str(&format!(" • session {session}"));
    }
    title.push_str(&format!(" • {}", view.toggle_label));
    title
}

fn suggestion_line(suggestions: &[String], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (index, question) in suggestions.iter().enumerate().take(9) {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("Alt+{} ", index + 1),
            theme.suggestion_key_style,
        ));
        spans.push(Span::styled(question.clone(), theme.suggestion_text_style));
    }
    Line::from(spans)
}

pub fn pulse_symbol(elapsed: Duration) -> char {
    // Two cycles per second, ramping up then back down.
    let phase = (elapsed.as_millis() % 1000) as f32 / 500.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        '○'
    } else if intensity < 0.66 {
        '◐'
    } else {
        '●'
    }
}

/// Pad `input` to the box width with the indicator one column from the edge.
fn with_indicator(input: &str, symbol: char, inner_width: usize) -> String {
    if inner_width < 2 {
        return input.to_string();
    }
    let mut result = vec![' '; inner_width];
    let max_input_len = inner_width.saturating_sub(3);
    for (slot, ch) in result.iter_mut().zip(input.chars().take(max_input_len)) {
        *slot = ch;
    }
    result[inner_width - 2] = symbol;
    result.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::{ControllerSettings, SubmitInput};
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn settings() -> ControllerSettings {
        ControllerSettings {
            suggested_questions: vec!["What courses exist?".into()],
            ..ControllerSettings::default()
        }
    }

    #[test]
    fn frame_shows_title_suggestions_and_transcript() {
        let mut controller = ChatController::new(settings());
        let turn = controller
            .submit(SubmitInput::Typed("hello".into()))
            .expect("submit");
        controller.settle(
            turn.turn_id,
            Ok(crate::core::transport::TurnReply {
                answer: "hi there".into(),
                sources: vec![],
                session_id: Some("abc".into()),
            }),
        );

        let theme = Theme::dark_default();
        let view = ChatView {
            controller: &controller,
            theme: &theme,
            input: "next",
            toggle_label: "Switch to light theme",
            base_url: "http://localhost:8000/",
            course_count: Some(4),
            scroll: ScrollState::new(),
            sending_for: None,
        };
        let mut terminal = Terminal::new(TestBackend::new(100, 16)).expect("terminal");
        terminal.draw(|f| ui(f, &view)).expect("draw");
        let text = rendered_text(&terminal);

        assert!(text.contains("localhost:8000"));
        assert!(text.contains("4 courses"));
        assert!(text.contains("session abc"));
        assert!(text.contains("Switch to light theme"));
        assert!(text.contains("You: hello"));
        assert!(text.contains("hi there"));
        assert!(text.contains("Alt+1 What courses exist?"));
        assert!(text.contains("next"));
    }

    #[test]
    fn narrow_frame_keeps_newest_line_in_view() {
        let mut controller = ChatController::new(settings());
        let turn = controller
            .submit(SubmitInput::Typed("show the lesson class".into()))
            .expect("submit");
        controller.settle(
            turn.turn_id,
            Ok(crate::core::transport::TurnReply {
                answer: "class Lesson:\n    def __init__(self, number, title):\n        self.number = number\n        self.title = title\nLAST-LINE-MARKER".into(),
                sources: vec![],
                session_id: None,
            }),
        );

        let theme = Theme::dark_default();
        let view = ChatView {
            controller: &controller,
            theme: &theme,
            input: "",
            toggle_label: "Switch to light theme",
            base_url: "http://localhost:8000",
            course_count: None,
            scroll: ScrollState::new(),
            sending_for: None,
        };
        let mut terminal = Terminal::new(TestBackend::new(20, 12)).expect("terminal");
        terminal.draw(|f| ui(f, &view)).expect("draw");
        let text = rendered_text(&terminal);

        assert!(text.contains("self.title"), "{text}");
        assert!(text.contains("LAST-LINE-MARKER"), "{text}");
    }

    #[test]
    fn input_is_disabled_while_sending() {
        let mut controller = ChatController::new(settings());
        controller
            .submit(SubmitInput::Suggested(0))
            .expect("submit");

        let theme = Theme::light();
        let view = ChatView {
            controller: &controller,
            theme: &theme,
            input: "",
            toggle_label: "Switch to dark theme",
            base_url: "http://localhost:8000",
            course_count: None,
            scroll: ScrollState::new(),
            sending_for: Some(Duration::from_millis(0)),
        };
        let mut terminal = Terminal::new(TestBackend::new(90, 12)).expect("terminal");
        terminal.draw(|f| ui(f, &view)).expect("draw");
        let text = rendered_text(&terminal);

        assert!(text.contains("Waiting for the answer"));
        assert!(text.contains("Thinking"));
        assert!(text.contains('○'));
    }

    #[test]
    fn pulse_cycles_through_symbols() {
        assert_eq!(pulse_symbol(Duration::from_millis(0)), '○');
        assert_eq!(pulse_symbol(Duration::from_millis(250)), '◐');
        assert_eq!(pulse_symbol(Duration::from_millis(450)), '●');
        assert_eq!(pulse_symbol(Duration::from_millis(1000)), '○');
    }

    #[test]
    fn indicator_sits_near_the_right_edge() {
        let text = with_indicator("abc", '●', 10);
        assert_eq!(text.chars().count(), 10);
        assert_eq!(text.chars().nth(8), Some('●'));
        assert!(text.starts_with("abc"));
        assert_eq!(with_indicator("abc", '●', 1), "abc");
    }
}
