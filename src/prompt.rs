//! Operator prompts

use std::io::{self, BufRead, Write};

const YES_ANSWERS: &[&str] = &["y", "yes"];
const NO_ANSWERS: &[&str] = &["n", "no"];

/// Blocking questions put to the operator
///
/// Implementations block on input; async callers run them on the blocking pool.
pub trait Prompt: Send + Sync {
    /// Free-text question; `None` when the operator answered nothing
    fn ask(&self, question: &str) -> io::Result<Option<String>>;

    /// Yes/no question, `default` on an empty answer
    fn confirm(&self, question: &str, default: bool) -> io::Result<bool>;

    /// Pick one of `options`; `None` when cancelled
    fn choose(&self, question: &str, options: &[String]) -> io::Result<Option<String>>;
}

/// [`Prompt`] reading answers from stdin
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_answer(question: &str) -> io::Result<String> {
        print!("{question}");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        let answer = Self::read_answer(&format!("{question}: "))?;
        Ok(Some(answer).filter(|answer| !answer.is_empty()))
    }

    fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = Self::read_answer(&format!("{question} {hint} "))?.to_lowercase();
            if answer.is_empty() {
                return Ok(default);
            }
            if YES_ANSWERS.contains(&answer.as_str()) {
                return Ok(true);
            }
            if NO_ANSWERS.contains(&answer.as_str()) {
                return Ok(false);
            }
        }
    }

    fn choose(&self, question: &str, options: &[String]) -> io::Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        for (index, option) in options.iter().enumerate() {
            println!("{:>3}) {option}", index + 1);
        }
        let answer = Self::read_answer(&format!("{question} [1-{}]: ", options.len()))?;
        Ok(parse_choice(&answer, options))
    }
}

/// Accepts a 1-based index or an exact option name
fn parse_choice(answer: &str, options: &[String]) -> Option<String> {
    match answer.parse::<usize>() {
        Ok(index) if (1..=options.len()).contains(&index) => Some(options[index - 1].clone()),
        _ => options.iter().find(|option| option.as_str() == answer).cloned(),
    }
}
