//! Terminal prompt surface

use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Password, Select};
use solizard::prompt::SELECTABLE_LIST_SIZE;
use solizard::{Error, PromptSurface, Report, Result, TextPrompt};
use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::output::print_report;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

/// Yes/no question outside a session; a prompt that cannot be shown counts as no
pub fn confirm_prompt(message: &str, default: bool) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(default)
        .interact()
        .unwrap_or(false)
}

/// Answers session prompts on the terminal
pub struct Console {
    theme: ColorfulTheme,
    json: bool,
    /// Endpoint and chain id entered during the session are written back here
    persist: Option<(PathBuf, ConfigFile)>,
}

impl Console {
    pub fn new(json: bool) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            json,
            persist: None,
        }
    }

    pub fn persist_to(mut self, path: PathBuf, config: ConfigFile) -> Self {
        self.persist = Some((path, config));
        self
    }

    fn remember(&mut self, update: impl FnOnce(&mut ConfigFile)) {
        let Some((path, config)) = self.persist.as_mut() else {
            return;
        };
        update(config);
        match config.save(path) {
            Ok(()) => debug!(path = %path.display(), "Config updated"),
            Err(e) => warn!(error = %e, "Failed to update config"),
        }
    }

    fn masked_text(&mut self, prompt: &TextPrompt) -> Result<String> {
        loop {
            let input = Password::with_theme(&self.theme)
                .with_prompt(&prompt.label)
                .interact()
                .map_err(prompt_error)?;
            match prompt.validate(&input) {
                Ok(()) => return Ok(input),
                Err(e) => eprintln!("{}", e),
            }
        }
    }
}

impl PromptSurface for Console {
    fn text(&mut self, prompt: &TextPrompt) -> Result<String> {
        if prompt.masked {
            return self.masked_text(prompt);
        }

        let validator = prompt.validator;
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(&prompt.label)
            .allow_empty(true)
            .validate_with(move |text: &String| -> std::result::Result<(), String> {
                match validator {
                    Some(validate) => validate(text).map_err(|e| e.to_string()),
                    None => Ok(()),
                }
            });
        if let Some(default) = &prompt.default {
            input = input.default(default.clone());
        }

        input.interact_text().map_err(prompt_error)
    }

    fn select(&mut self, label: &str, items: &[String]) -> Result<usize> {
        if items.len() > SELECTABLE_LIST_SIZE {
            FuzzySelect::with_theme(&self.theme)
                .with_prompt(label)
                .items(items)
                .default(0)
                .interact()
                .map_err(prompt_error)
        } else {
            Select::with_theme(&self.theme)
                .with_prompt(label)
                .items(items)
                .default(0)
                .interact()
                .map_err(prompt_error)
        }
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn report(&mut self, report: &Report) {
        match report {
            Report::EndpointAcquired { endpoint } => {
                let endpoint = endpoint.clone();
                self.remember(|config| config.rpc_url = Some(endpoint));
            }
            Report::ChainIdAcquired { chain_id } => {
                let chain_id = *chain_id;
                self.remember(|config| config.chain_id = Some(chain_id));
            }
            _ => {}
        }
        print_report(report, self.json);
    }
}
