//! Porcelain status parsing and change rendering

use colored::{Color, Colorize};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static ANSI pattern is valid"));

/// Diff header lines that are noise once the file banner has been printed
const DIFF_HEADER_PREFIXES: &[&str] = &[
    "index ",
    "--- ",
    "+++ ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
];

/// Kind of change reported by one porcelain status line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Deleted,
    Added,
    Renamed,
    Copied,
    Other,
}

impl ChangeKind {
    /// Classifies a porcelain symbol such as `M`, `AM` or `??`
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().chars().next() {
            Some('M') => ChangeKind::Modified,
            Some('D') => ChangeKind::Deleted,
            Some('A') => ChangeKind::Added,
            Some('R') => ChangeKind::Renamed,
            Some('C') => ChangeKind::Copied,
            _ => ChangeKind::Other,
        }
    }

    /// Returns the glyph printed in front of the file name
    pub fn glyph(&self) -> &str {
        match self {
            ChangeKind::Modified | ChangeKind::Renamed | ChangeKind::Copied => "*",
            ChangeKind::Deleted => "-",
            ChangeKind::Added => "+",
            ChangeKind::Other => "",
        }
    }

    /// Returns the color class of the file name, if any
    pub fn color(&self) -> Option<Color> {
        match self {
            ChangeKind::Modified | ChangeKind::Renamed | ChangeKind::Copied => Some(Color::Blue),
            ChangeKind::Deleted => Some(Color::Red),
            ChangeKind::Added => Some(Color::Green),
            ChangeKind::Other => None,
        }
    }
}

/// True for a `status --porcelain -b` branch line whose tracking info reports
/// local commits, e.g. `## main...origin/main [ahead 1, behind 2]`
///
/// Only the bracketed segment is inspected; `[` cannot occur in a branch name.
pub fn is_ahead(line: &str) -> bool {
    line.starts_with("##")
        && line
            .trim_end()
            .rsplit_once('[')
            .and_then(|(_, tracking)| tracking.strip_suffix(']'))
            .is_some_and(|tracking| tracking.split(", ").any(|part| part.starts_with("ahead ")))
}

/// Splits a porcelain line into its symbol and file name
///
/// Renames report `old -> new`; the new name is kept.
pub fn parse_status_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_end();
    if line.len() < 3 || line.starts_with("##") {
        return None;
    }
    let (symbol, rest) = match line.get(..2) {
        Some(symbol) if line.as_bytes().get(2) == Some(&b' ') => (symbol.trim(), &line[3..]),
        // Output whose first line lost its leading space: "M file"
        _ => line.split_once(' ')?,
    };
    let filename = rest
        .rsplit_once(" -> ")
        .map_or(rest, |(_, new)| new)
        .trim()
        .trim_matches('"');
    if symbol.is_empty() || filename.is_empty() {
        return None;
    }
    Some((symbol.to_string(), filename.to_string()))
}

/// Builds the filename → symbol map used while rendering diffs
pub fn changed_files(status: &[String]) -> BTreeMap<String, String> {
    status
        .iter()
        .filter_map(|line| parse_status_line(line))
        .map(|(symbol, filename)| (filename, symbol))
        .collect()
}

/// Formats one file entry: glyph followed by the bold, colored file name
pub fn format_file_entry(symbol: &str, filename: &str) -> String {
    let kind = ChangeKind::from_symbol(symbol);
    let name = match kind.color() {
        Some(color) => filename.bold().color(color).to_string(),
        None => filename.bold().to_string(),
    };
    format!("{} {}", kind.glyph(), name)
}

pub fn strip_ansi(line: &str) -> String {
    ANSI_ESCAPE.replace_all(line, "").into_owned()
}

/// Renders the output of `git status -v` file by file
///
/// Each `diff --git` section is introduced by its file entry and followed by
/// its hunks. With a `budget` of terminal lines, sections that no longer fit
/// are skipped; `None` renders everything.
pub fn render_verbose_status(
    lines: &[String],
    changed: &BTreeMap<String, String>,
    budget: Option<usize>,
) -> Vec<String> {
    let mut starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| strip_ansi(line).starts_with("diff "))
        .map(|(index, _)| index)
        .collect();
    starts.push(lines.len());

    let mut remaining = budget;
    let mut rendered = Vec::new();
    for window in starts.windows(2) {
        let (start, stop) = (window[0], window[1]);
        let title = strip_ansi(&lines[start]);

        let mut section: Vec<String> = changed
            .iter()
            .filter(|(filename, _)| title.contains(filename.as_str()))
            .map(|(filename, symbol)| format_file_entry(symbol, filename))
            .collect();
        section.extend(
            lines[start + 1..stop]
                .iter()
                .filter(|line| {
                    let plain = strip_ansi(line);
                    !DIFF_HEADER_PREFIXES
                        .iter()
                        .any(|prefix| plain.starts_with(prefix))
                })
                .cloned(),
        );
        section.push(String::new());

        match remaining.as_mut() {
            None => rendered.extend(section),
            Some(left) if *left > section.len() => {
                *left -= section.len();
                rendered.extend(section);
            }
            Some(_) => {}
        }
    }
    rendered
}
