//! Scripted collaborators for exercising repositories without git, nmcli or a terminal

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::git::{classify_failure, render_command, CommandError, CommandRunner};
use crate::prompt::Prompt;

const OFFLINE_STDERR: &str =
    "fatal: unable to access 'https://github.com/me/repo/': Could not resolve host: github.com";
const FAILURE_STATUS: i32 = 128;

/// Scripted outcome of one command
#[derive(Clone, Debug)]
pub enum Reply {
    Output(String),
    Fail(String),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn ok(output: impl Into<String>) -> Self {
        Reply::Output(output.into())
    }

    pub fn fail(stderr: impl Into<String>) -> Self {
        Reply::Fail(stderr.into())
    }

    /// A host-resolution failure, classified as lost connectivity
    pub fn offline() -> Self {
        Reply::Fail(OFFLINE_STDERR.to_string())
    }

    pub fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

struct Rule {
    pattern: String,
    replies: VecDeque<Reply>,
}

/// [`CommandRunner`] answering from scripted rules
///
/// Commands are matched on their rendered form with git's `-C <path>` removed,
/// e.g. `git status --porcelain`. The longest matching pattern wins; its replies
/// are consumed in order and the last one repeats. Unmatched commands succeed
/// with empty output. Calls are recorded when they complete.
#[derive(Default)]
pub struct MockRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for commands starting with `pattern`
    pub fn on(&self, pattern: &str, reply: Reply) -> &Self {
        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        match rules.iter_mut().find(|rule| rule.pattern == pattern) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                pattern: pattern.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Every completed command, in completion order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of completed commands matching `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches_pattern(call, pattern))
            .count()
    }

    /// Position of the first completed command matching `pattern`
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.calls()
            .iter()
            .position(|call| matches_pattern(call, pattern))
    }

    fn next_reply(&self, command: &str) -> Reply {
        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        let rule = rules
            .iter_mut()
            .filter(|rule| matches_pattern(command, &rule.pattern))
            .max_by_key(|rule| rule.pattern.len());
        match rule {
            Some(rule) if rule.replies.len() > 1 => rule
                .replies
                .pop_front()
                .unwrap_or_else(|| Reply::ok("")),
            Some(rule) => rule.replies.front().cloned().unwrap_or_else(|| Reply::ok("")),
            None => Reply::ok(""),
        }
    }
}

fn matches_pattern(command: &str, pattern: &str) -> bool {
    command == pattern
        || command
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with(' '))
}

/// Drops git's `-C <path>` so scripts can ignore where a repository lives
fn normalize(program: &str, args: &[String]) -> String {
    match args {
        [flag, _path, rest @ ..] if program == "git" && flag == "-C" => render_command(program, rest),
        _ => render_command(program, args),
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        _cwd: Option<&Path>,
    ) -> Result<String, CommandError> {
        let command = normalize(program, args);
        let mut reply = self.next_reply(&command);
        let outcome = loop {
            match reply {
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                Reply::Output(output) => break Ok(output),
                Reply::Fail(stderr) => break Err(stderr),
            }
        };
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.clone());

        outcome
            .map(|output| output.trim_end().to_string())
            .map_err(|stderr| CommandError::Failed {
                kind: classify_failure(Some(FAILURE_STATUS), &stderr),
                command,
                status: Some(FAILURE_STATUS),
                stderr,
            })
    }
}

/// [`Prompt`] answering from queued responses
///
/// Exhausted queues answer `None` to questions and the default to confirmations.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    confirmations: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, answer: impl Into<String>) -> Self {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(answer.into());
        self
    }

    pub fn confirm_with(self, value: bool) -> Self {
        self.confirmations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(value);
        self
    }

    /// Every question asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, question: &str) {
        self.asked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(question.to_string());
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        self.record(question);
        Ok(self
            .answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .filter(|answer| !answer.is_empty()))
    }

    fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        self.record(question);
        Ok(self
            .confirmations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(default))
    }

    fn choose(&self, question: &str, options: &[String]) -> io::Result<Option<String>> {
        self.record(question);
        let answer = self
            .answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(answer.filter(|answer| options.contains(answer)))
    }
}
