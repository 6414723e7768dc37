use anyhow::{Context, Result};
use inquire::InquireError;
#[cfg(test)]
use std::collections::VecDeque;
use std::io::{BufRead, IsTerminal, Write};
#[cfg(test)]
use std::sync::Mutex;

/// Trait for user input operations to enable testing with mocks
pub trait UserInput: Send + Sync {
    /// Display a prompt and return the line the user typed
    fn text(&self, prompt: &str) -> Result<String>;
}

/// Real user input implementation using inquire crate
///
/// Falls back to reading a raw line when stdin is not a terminal, so answers
/// can be piped in.
pub struct InquireUserInput;

impl UserInput for InquireUserInput {
    fn text(&self, prompt: &str) -> Result<String> {
        if std::io::stdin().is_terminal() {
            return answer_or_empty(inquire::Text::new(prompt).prompt());
        }

        print!("{} ", prompt);
        std::io::stdout().flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Esc and Ctrl-C count as an empty answer, which callers treat as "no"
fn answer_or_empty(result: Result<String, InquireError>) -> Result<String> {
    match result {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Ok(String::new())
        }
        Err(e) => Err(e).context("Failed to read answer"),
    }
}

/// Mock user input implementation for testing
#[cfg(test)]
pub struct MockUserInput {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockUserInput {
    /// Create new mock with no pre-configured responses
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create mock with pre-configured responses
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockUserInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl UserInput for MockUserInput {
    fn text(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No more mock responses available"))
    }
}
