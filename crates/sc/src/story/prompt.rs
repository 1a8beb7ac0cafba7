//! Interactive prompts for `story create` and `story edit`

use dialoguer::{Confirm, Input, Select};

use crate::prelude::*;

type PromptResult<T> = std::result::Result<T, Error>;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(f!("Failed to get user input: {e}"))
}

/// Free-text answer; blank answers are allowed and come back empty
pub fn text(prompt: &str, default: Option<&str>) -> PromptResult<String> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    input.interact_text().map_err(prompt_error)
}

/// Pick one of `labels`, returning its index
pub fn select(prompt: &str, labels: &[String], default: usize) -> PromptResult<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(labels)
        .default(default)
        .interact()
        .map_err(prompt_error)
}

/// Pick one of `(label, value)` choices and return the value
pub fn choose<T: Clone>(prompt: &str, choices: &[(String, T)]) -> PromptResult<T> {
    let labels: Vec<String> = choices.iter().map(|(label, _)| label.clone()).collect();
    let index = select(prompt, &labels, 0)?;
    Ok(choices[index].1.clone())
}

/// Yes/no question defaulting to no
pub fn confirm(prompt: &str) -> PromptResult<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(prompt_error)
}
