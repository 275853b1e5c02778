//! Static key map for the chat view.
//!
//! Every shortcut is declared once in [`BINDINGS`]; the loop only ever sees
//! the resulting [`UiAction`].

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Submit,
    ToggleTheme,
    /// Ask the suggested question at this position.
    Suggest(usize),
    Insert(char),
    DeleteBackward,
    ClearInput,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    FollowLatest,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: UiAction,
}

const fn bind(code: KeyCode, modifiers: KeyModifiers, action: UiAction) -> KeyBinding {
    KeyBinding {
        code,
        modifiers,
        action,
    }
}

const NONE: KeyModifiers = KeyModifiers::NONE;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const ALT: KeyModifiers = KeyModifiers::ALT;

pub static BINDINGS: &[KeyBinding] = &[
    bind(KeyCode::Enter, NONE, UiAction::Submit),
    bind(KeyCode::Char('t'), CTRL, UiAction::ToggleTheme),
    bind(KeyCode::Char('c'), CTRL, UiAction::Quit),
    bind(KeyCode::Char('u'), CTRL, UiAction::ClearInput),
    bind(KeyCode::Esc, NONE, UiAction::ClearInput),
    bind(KeyCode::Backspace, NONE, UiAction::DeleteBackward),
    bind(KeyCode::Up, NONE, UiAction::ScrollUp),
    bind(KeyCode::Down, NONE, UiAction::ScrollDown),
    bind(KeyCode::PageUp, NONE, UiAction::PageUp),
    bind(KeyCode::PageDown, NONE, UiAction::PageDown),
    bind(KeyCode::Home, NONE, UiAction::ScrollTop),
    bind(KeyCode::End, NONE, UiAction::FollowLatest),
    bind(KeyCode::F(1), NONE, UiAction::Suggest(0)),
    bind(KeyCode::F(2), NONE, UiAction::Suggest(1)),
    bind(KeyCode::F(3), NONE, UiAction::Suggest(2)),
    bind(KeyCode::F(4), NONE, UiAction::Suggest(3)),
    bind(KeyCode::Char('1'), ALT, UiAction::Suggest(0)),
    bind(KeyCode::Char('2'), ALT, UiAction::Suggest(1)),
    bind(KeyCode::Char('3'), ALT, UiAction::Suggest(2)),
    bind(KeyCode::Char('4'), ALT, UiAction::Suggest(3)),
    bind(KeyCode::Char('5'), ALT, UiAction::Suggest(4)),
    bind(KeyCode::Char('6'), ALT, UiAction::Suggest(5)),
    bind(KeyCode::Char('7'), ALT, UiAction::Suggest(6)),
    bind(KeyCode::Char('8'), ALT, UiAction::Suggest(7)),
    bind(KeyCode::Char('9'), ALT, UiAction::Suggest(8)),
];

/// Map a key press to an action. Unbound printable characters are typed.
pub fn resolve(key: &KeyEvent) -> Option<UiAction> {
    let bound = BINDINGS
        .iter()
        .find(|binding| binding.code == key.code && binding.modifiers == key.modifiers)
        .map(|binding| binding.action);
    if bound.is_some() {
        return bound;
    }

    match key.code {
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            Some(UiAction::Insert(c))
        }
        _ => None,
    }
}
