//! Terminal-independent state of the chat view.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::controller::{ChatController, ControllerSettings, PendingTurn, SubmitInput};
use crate::core::error::{ChatError, TransportError};
use crate::core::theme_store::{DocumentRoot, PreferenceStorage, ThemeStore};
use crate::core::theme_toggle::ThemeToggle;
use crate::core::transport::TurnReply;
use crate::ui::chat_loop::bindings::UiAction;
use crate::ui::renderer::ChatView;
use crate::ui::theme::Theme;
use crate::ui::transcript_view::{build_display_lines, wrapped_line_count, ScrollState};

/// Size of the transcript pane at the time a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug)]
pub enum Step {
    Continue,
    /// A turn was accepted; the loop must carry it out.
    Dispatch(PendingTurn),
    Exit,
}

pub struct ChatSession<S> {
    controller: ChatController,
    input: String,
    scroll: ScrollState,
    store: ThemeStore<S>,
    document: DocumentRoot,
    toggle: ThemeToggle,
    theme: Theme,
    sending_since: Option<Instant>,
    course_count: Option<usize>,
}

impl<S: PreferenceStorage> ChatSession<S> {
    pub fn new(settings: ControllerSettings, store: ThemeStore<S>) -> Self {
        let mut document = DocumentRoot::new();
        let mut toggle = ThemeToggle::new();
        toggle.initialize(&store, &mut document);
        let theme = Theme::for_document(&document);
        Self {
            controller: ChatController::new(settings),
            input: String::new(),
            scroll: ScrollState::new(),
            store,
            document,
            toggle,
            theme,
            sending_since: None,
            course_count: None,
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn document(&self) -> &DocumentRoot {
        &self.document
    }

    pub fn toggle_label(&self) -> &'static str {
        self.toggle.label()
    }

    pub fn set_course_count(&mut self, count: usize) {
        self.course_count = Some(count);
    }

    pub fn handle(&mut self, action: UiAction, viewport: Viewport) -> Step {
        match action {
            UiAction::Quit => return Step::Exit,
            UiAction::Submit => {
                let text = self.input.clone();
                return self.submit(SubmitInput::Typed(text), true);
            }
            UiAction::Suggest(index) => return self.submit(SubmitInput::Suggested(index), false),
            UiAction::ToggleTheme => {
                self.toggle.on_activate(&self.store, &mut self.document);
                self.theme = Theme::for_document(&self.document);
            }
            UiAction::Insert(c) => {
                self.input.push(c);
                self.controller.begin_input();
            }
            UiAction::DeleteBackward => {
                self.input.pop();
                if self.input.is_empty() {
                    self.controller.clear_input();
                }
            }
            UiAction::ClearInput => {
                self.input.clear();
                self.controller.clear_input();
            }
            UiAction::ScrollUp => self.scroll_by(viewport, |scroll, total, height| {
                scroll.scroll_up(1, total, height)
            }),
            UiAction::ScrollDown => self.scroll_by(viewport, |scroll, total, height| {
                scroll.scroll_down(1, total, height)
            }),
            UiAction::PageUp => self.scroll_by(viewport, |scroll, total, height| {
                scroll.scroll_up(height.max(1), total, height)
            }),
            UiAction::PageDown => self.scroll_by(viewport, |scroll, total, height| {
                scroll.scroll_down(height.max(1), total, height)
            }),
            UiAction::ScrollTop => self.scroll.scroll_to_top(),
            UiAction::FollowLatest => self.scroll.follow_latest(),
        }
        Step::Continue
    }

    pub fn settle(&mut self, turn_id: u64, result: Result<TurnReply, TransportError>) {
        if self.controller.settle(turn_id, result).is_some() {
            self.sending_since = None;
            self.scroll.follow_latest();
        }
    }

    /// Stop the conversation; any in-flight answer is discarded.
    pub fn shutdown(&mut self) {
        self.controller.teardown();
        self.sending_since = None;
    }

    pub fn view<'a>(&'a self, base_url: &'a str) -> ChatView<'a> {
        ChatView {
            controller: &self.controller,
            theme: &self.theme,
            input: &self.input,
            toggle_label: self.toggle.label(),
            base_url,
            course_count: self.course_count,
            scroll: self.scroll,
            sending_for: self.sending_since.map(|since| since.elapsed()),
        }
    }

    pub fn sending_for(&self) -> Option<Duration> {
        self.sending_since.map(|since| since.elapsed())
    }

    fn submit(&mut self, input: SubmitInput, clears_draft: bool) -> Step {
        if !self.controller.can_submit() {
            return Step::Continue;
        }
        match self.controller.submit(input) {
            Ok(turn) => {
                if clears_draft {
                    self.input.clear();
                }
                self.sending_since = Some(Instant::now());
                self.scroll.follow_latest();
                Step::Dispatch(turn)
            }
            Err(ChatError::Validation(err)) => {
                debug!(error = %err, "submission ignored");
                Step::Continue
            }
            Err(err) => {
                debug!(error = %err, "submission refused");
                Step::Continue
            }
        }
    }

    fn scroll_by(&mut self, viewport: Viewport, apply: impl FnOnce(&mut ScrollState, u16, u16)) {
        let lines = build_display_lines(self.controller.transcript().entries(), &self.theme);
        let total = wrapped_line_count(&lines, viewport.width);
        apply(&mut self.scroll, total, viewport.height);
    }
}
