use anyhow::Result;

/// Source of operator answers.
pub trait Prompt {
    /// Show a question and return the trimmed answer.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Ask a yes/no question. Only `y` counts as yes.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} (y/n): "))?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}

/// Reads answers from the terminal.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        media_tools::read_user_input(question)
    }
}

#[cfg(test)]
pub mod scripted {
    use std::collections::VecDeque;

    use anyhow::{Result, anyhow};

    use super::Prompt;

    /// Replays canned answers and records the questions asked.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompt {
        answers: VecDeque<String>,
        pub(crate) questions: Vec<String>,
    }

    impl ScriptedPrompt {
        pub(crate) fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(ToString::to_string).collect(),
                questions: Vec::new(),
            }
        }

        pub(crate) fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, question: &str) -> Result<String> {
            self.questions.push(question.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow!("No scripted answer for: {question}"))
        }
    }
}
