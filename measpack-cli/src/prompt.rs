//! Terminal prompts.

use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};
use measpack::batch::Prompter;

/// [`Prompter`] backed by the terminal.
pub struct ConsoleInteraction {
    theme: ColorfulTheme,
}

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// True when stdin and stdout are attached to a terminal.
    pub fn is_available() -> bool {
        console::user_attended()
    }
}

impl Default for ConsoleInteraction {
    fn default() -> Self {
        Self::new()
    }
}

fn to_io(err: dialoguer::Error) -> io::Error {
    io::Error::other(err)
}

impl Prompter for ConsoleInteraction {
    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(to_io)
    }

    fn secret(&self, prompt: &str) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(to_io)
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(to_io)
    }
}
