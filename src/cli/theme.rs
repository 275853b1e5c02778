use std::error::Error;

use clap::Subcommand;

use crate::core::config::data::path_display;
use crate::core::theme_store::{DocumentRoot, FileStorage, Preference, PreferenceStorage, ThemeStore};
use crate::core::theme_toggle::ThemeToggle;

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeCommand {
    /// Print the current preference (default)
    #[default]
    Show,
    /// Flip between dark and light and save the result
    Toggle,
}

pub fn run_theme_command(command: ThemeCommand) -> Result<(), Box<dyn Error>> {
    let storage = FileStorage::default_location()
        .ok_or("Could not determine a data directory for preferences")?;
    let location = path_display(storage.path());
    let store = ThemeStore::new(storage);
    let (preference, label) = apply_theme_command(&store, command);

    match command {
        ThemeCommand::Show => println!("Theme: {} ({location})", preference.as_str()),
        ThemeCommand::Toggle => println!("✅ Theme set to {}", preference.as_str()),
    }
    println!("Toggle: {label}");
    Ok(())
}

/// Run a theme command against a store, returning the resulting preference
/// and the toggle's label.
pub fn apply_theme_command<S: PreferenceStorage>(
    store: &ThemeStore<S>,
    command: ThemeCommand,
) -> (Preference, &'static str) {
    let mut document = DocumentRoot::new();
    let mut toggle = ThemeToggle::new();
    let mut preference = toggle.initialize(store, &mut document);
    if command == ThemeCommand::Toggle {
        preference = toggle.on_activate(store, &mut document);
    }
    (preference, toggle.label())
}
