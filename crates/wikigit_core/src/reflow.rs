//! Reflow of article text into diff-friendly lines.
//!
//! Wiki text tends to arrive as very long lines. Breaking them at sentence
//! punctuation, after a target width and around a few structural markup
//! tokens keeps the diffs of consecutive revisions small. Every character of
//! the input survives: joining each line's text with its [`Separator`]
//! restores the original exactly.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Tunable break heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowPolicy {
    /// Soft width; once exceeded the line ends at the next space.
    pub line_length: usize,
    /// Characters after which the line ends at the next space.
    pub break_after: Vec<char>,
    /// Tokens that end a line immediately and are followed by a blank line.
    pub keywords: Vec<String>,
}

impl Default for ReflowPolicy {
    fn default() -> Self {
        Self {
            line_length: 80,
            break_after: vec![',', '.', '!', '?'],
            keywords: vec!["|}|}".to_string(), "<br>".to_string()],
        }
    }
}

/// The input character a line break consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Space,
    Newline,
    /// The break consumed nothing (keyword split or end of text).
    None,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Newline => "\n",
            Separator::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflowLine<'a> {
    pub text: &'a str,
    pub separator: Separator,
}

/// Lazily split `text` into lines. Each call starts from the beginning of
/// `text`; nothing is shared between calls.
pub fn reflow<'a>(text: &'a str, policy: &'a ReflowPolicy) -> Reflow<'a> {
    Reflow {
        text,
        policy,
        cursor: 0,
        queued: VecDeque::new(),
        finished: false,
    }
}

/// Reflowed text as written to a segment file: one line per entry, each
/// terminated by `\n`.
pub fn render_lines(text: &str, policy: &ReflowPolicy) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 20 + 1);
    for line in reflow(text, policy) {
        out.push_str(line.text);
        out.push('\n');
    }
    out
}

pub struct Reflow<'a> {
    text: &'a str,
    policy: &'a ReflowPolicy,
    cursor: usize,
    queued: VecDeque<ReflowLine<'a>>,
    finished: bool,
}

impl<'a> Iterator for Reflow<'a> {
    type Item = ReflowLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.queued.pop_front() {
            return Some(line);
        }
        if self.finished {
            return None;
        }

        let rest = &self.text[self.cursor..];
        let mut width = 0usize;
        let mut break_pending = false;
        for (offset, c) in rest.char_indices() {
            if c == '\n' || (break_pending && c == ' ') {
                let separator = if c == '\n' {
                    Separator::Newline
                } else {
                    Separator::Space
                };
                self.cursor += offset + c.len_utf8();
                self.split_keywords(&rest[..offset], separator);
                return self.queued.pop_front();
            }
            width += 1;
            if width > self.policy.line_length || self.policy.break_after.contains(&c) {
                break_pending = true;
            }
        }

        self.finished = true;
        self.cursor = self.text.len();
        self.split_keywords(rest, Separator::None);
        self.queued.pop_front()
    }
}

impl<'a> Reflow<'a> {
    /// Queue `line` split after every keyword occurrence, each split followed
    /// by an empty line. Always queues at least one line.
    fn split_keywords(&mut self, line: &'a str, separator: Separator) {
        let mut rest = line;
        let mut split_any = false;
        while let Some(end) = self.next_keyword_end(rest) {
            self.queued.push_back(ReflowLine {
                text: &rest[..end],
                separator: Separator::None,
            });
            self.queued.push_back(ReflowLine {
                text: "",
                separator: Separator::None,
            });
            rest = &rest[end..];
            split_any = true;
        }

        if rest.is_empty() && split_any {
            if let Some(last) = self.queued.back_mut() {
                last.separator = separator;
            }
        } else {
            self.queued.push_back(ReflowLine {
                text: rest,
                separator,
            });
        }
    }

    /// Byte offset just past the earliest keyword in `haystack`.
    fn next_keyword_end(&self, haystack: &str) -> Option<usize> {
        self.policy
            .keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .filter_map(|keyword| haystack.find(keyword.as_str()).map(|at| (at, keyword.len())))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(at, len)| at + len)
    }
}
