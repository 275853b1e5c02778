use crate::core::theme_store::{DocumentRoot, Preference, PreferenceStorage, ThemeStore};
use tracing::info;

/// The control that flips between dark and light.
///
/// The toggle holds no preference of its own: the current theme is always
/// read back from the document, so the label cannot drift from what is shown.
#[derive(Debug, Clone)]
pub struct ThemeToggle {
    label: &'static str,
}

impl ThemeToggle {
    pub fn new() -> Self {
        Self {
            label: label_for(Preference::default()),
        }
    }

    /// Load, apply, and label. Call once at startup.
    pub fn initialize<S: PreferenceStorage>(
        &mut self,
        store: &ThemeStore<S>,
        document: &mut DocumentRoot,
    ) -> Preference {
        let preference = store.load();
        store.apply(document, preference);
        self.label = label_for(preference);
        preference
    }

    pub fn on_activate<S: PreferenceStorage>(
        &mut self,
        store: &ThemeStore<S>,
        document: &mut DocumentRoot,
    ) -> Preference {
        let next = document.applied_preference().opposite();
        store.apply(document, next);
        store.save(next);
        self.label = label_for(next);
        info!(theme = next.as_str(), "theme toggled");
        next
    }

    /// Accessible label describing what activating the toggle will do.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Default for ThemeToggle {
    fn default() -> Self {
        Self::new()
    }
}

fn label_for(current: Preference) -> &'static str {
    match current {
        Preference::Dark => "Switch to light theme",
        Preference::Light => "Switch to dark theme",
    }
}
