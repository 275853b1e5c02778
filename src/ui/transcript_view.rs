//! Projection of the transcript onto terminal lines.
//!
//! Rendering is a pure function of the entries and the palette, so redrawing
//! the same transcript always yields the same lines.

use crate::core::message::{EntryStatus, MessageEntry, TranscriptRole};
use crate::ui::theme::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const USER_PREFIX: &str = "You: ";
pub const PENDING_TEXT: &str = "Thinking…";
const SOURCES_LABEL: &str = "Sources: ";

pub fn build_display_lines(entries: &[MessageEntry], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for entry in entries {
        match (entry.role, entry.status) {
            (TranscriptRole::User, _) => {
                let mut content_lines = entry.content.lines();
                let first = content_lines.next().unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(USER_PREFIX, theme.user_prefix_style),
                    Span::styled(first.to_string(), theme.user_text_style),
                ]));
                for rest in content_lines {
                    lines.push(Line::from(Span::styled(
                        format!("{:width$}{}", "", rest, width = USER_PREFIX.len()),
                        theme.user_text_style,
                    )));
                }
            }
            (TranscriptRole::Assistant, EntryStatus::Pending) => {
                lines.push(Line::from(Span::styled(PENDING_TEXT, theme.pending_style)));
            }
            (TranscriptRole::Assistant, EntryStatus::Failed) => {
                push_text(&mut lines, &entry.content, theme.error_style);
            }
            (TranscriptRole::Assistant, EntryStatus::Complete) => {
                push_text(&mut lines, &entry.content, theme.assistant_text_style);
                if !entry.sources.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("{}{}", SOURCES_LABEL, entry.sources.join(", ")),
                        theme.source_style,
                    )));
                }
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

fn push_text(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        lines.push(Line::from(""));
        return;
    }
    for content_line in text.lines() {
        if content_line.trim().is_empty() {
            lines.push(Line::from(""));
        } else {
            lines.push(Line::from(Span::styled(content_line.to_string(), style)));
        }
    }
}

/// Break `lines` into rows no wider than `width` columns.
///
/// The transcript pane renders these rows as-is, so scrolling and drawing
/// agree on where every row falls. Leading and repeated spaces are kept; a
/// space that would overflow a row ends it instead. Words move to the next
/// row when they fit there, and longer words are split.
pub fn prewrap_lines(lines: &[Line], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        if width == 0 {
            out.push(Line::from(
                line.spans
                    .iter()
                    .map(|span| Span::styled(span.content.to_string(), span.style))
                    .collect::<Vec<_>>(),
            ));
            continue;
        }

        let mut rows = RowBuilder::new(width);
        for span in &line.spans {
            for (run, is_space) in whitespace_runs(&span.content) {
                if is_space {
                    rows.push_spaces(run, span.style);
                } else {
                    rows.push_word(run, span.style);
                }
            }
        }
        out.extend(rows.finish());
    }

    out
}

/// Number of rows the lines occupy once wrapped to `width` columns.
pub fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    u16::try_from(prewrap_lines(lines, width).len()).unwrap_or(u16::MAX)
}

struct RowBuilder {
    width: usize,
    used: usize,
    current: Vec<Span<'static>>,
    rows: Vec<Line<'static>>,
}

impl RowBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            used: 0,
            current: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn push_spaces(&mut self, run: &str, style: Style) {
        for ch in run.chars() {
            let ch_width = char_width(ch);
            if self.used + ch_width > self.width {
                // The overflowing space becomes the row break.
                self.break_row();
                continue;
            }
            self.append(ch.encode_utf8(&mut [0u8; 4]), style, ch_width);
        }
    }

    fn push_word(&mut self, word: &str, style: Style) {
        let word_width = UnicodeWidthStr::width(word);
        if self.used + word_width <= self.width {
            self.append(word, style, word_width);
            return;
        }
        if self.used > 0 && word_width <= self.width {
            self.break_row();
            self.append(word, style, word_width);
            return;
        }
        for ch in word.chars() {
            let ch_width = char_width(ch);
            if self.used > 0 && self.used + ch_width > self.width {
                self.break_row();
            }
            self.append(ch.encode_utf8(&mut [0u8; 4]), style, ch_width);
        }
    }

    fn append(&mut self, text: &str, style: Style, text_width: usize) {
        self.used += text_width;
        match self.current.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.current.push(Span::styled(text.to_string(), style)),
        }
    }

    fn break_row(&mut self) {
        self.rows.push(Line::from(std::mem::take(&mut self.current)));
        self.used = 0;
    }

    /// Every logical line yields at least one row.
    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.rows.is_empty() {
            self.break_row();
        }
        self.rows
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn whitespace_runs(text: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (index, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(previous) if previous != is_space => {
                runs.push((&text[start..index], previous));
                start = index;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if let Some(is_space) = in_space {
        runs.push((&text[start..], is_space));
    }
    runs
}

/// Vertical scroll position of the transcript pane.
///
/// While following, the view stays pinned to the newest line as entries
/// arrive. Scrolling up stops following; reaching the bottom resumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset: u16,
    follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// The offset to render with, given the content and viewport heights.
    pub fn offset(&self, total_rows: u16, viewport: u16) -> u16 {
        let max = max_offset(total_rows, viewport);
        if self.follow {
            max
        } else {
            self.offset.min(max)
        }
    }

    pub fn scroll_up(&mut self, rows: u16, total_rows: u16, viewport: u16) {
        let current = self.offset(total_rows, viewport);
        self.offset = current.saturating_sub(rows);
        self.follow = max_offset(total_rows, viewport) == 0;
    }

    pub fn scroll_down(&mut self, rows: u16, total_rows: u16, viewport: u16) {
        let max = max_offset(total_rows, viewport);
        self.offset = self.offset(total_rows, viewport).saturating_add(rows).min(max);
        self.follow = self.offset >= max;
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.follow = false;
    }

    pub fn follow_latest(&mut self) {
        self.follow = true;
    }
}

pub fn max_offset(total_rows: u16, viewport: u16) -> u16 {
    total_rows.saturating_sub(viewport)
}
