use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::ConfigError;

/// Quoting rules of the shell the commit command line is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellFlavor {
    /// `sh`-style: backslash escapes inside double quotes.
    Posix,
    /// Windows command line: caret escapes in comments, arguments quoted for
    /// the C runtime's argument parser.
    Windows,
}

impl ShellFlavor {
    /// Flavor of the host this binary was built for.
    pub fn detect() -> Result<Self, ConfigError> {
        if cfg!(unix) {
            Ok(ShellFlavor::Posix)
        } else if cfg!(windows) {
            Ok(ShellFlavor::Windows)
        } else {
            Err(ConfigError::PlatformNotSupported)
        }
    }

    /// Escape a revision comment for the commit message.
    ///
    /// The result is what the message stores; [`ShellFlavor::quote`] is still
    /// applied on top when the message is placed on a command line.
    pub fn escape_comment(self, comment: Option<&str>) -> String {
        let Some(comment) = comment else {
            return String::new();
        };
        let mut out = String::with_capacity(comment.len() + 5);
        match self {
            ShellFlavor::Posix => {
                for c in comment.chars() {
                    if matches!(c, '"' | '&' | '|' | '(' | ')' | '<' | '>' | '^') {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            ShellFlavor::Windows => {
                for c in comment.chars() {
                    match c {
                        '&' | '|' | '(' | ')' | '<' | '>' | '^' => {
                            out.push('^');
                            out.push(c);
                        }
                        '"' => out.push_str("\"\""),
                        _ => out.push(c),
                    }
                }
            }
        }
        out
    }

    /// Wrap `arg` in double quotes so the shell sees exactly one argument
    /// whose value is `arg`.
    pub fn quote(self, arg: &str) -> String {
        let mut out = String::with_capacity(arg.len() + 2);
        out.push('"');
        match self {
            ShellFlavor::Posix => {
                for c in arg.chars() {
                    if matches!(c, '"' | '\\' | '$' | '`') {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            ShellFlavor::Windows => {
                // Backslashes are literal unless they precede a quote.
                let mut backslashes = 0;
                for c in arg.chars() {
                    if c == '\\' {
                        backslashes += 1;
                        continue;
                    }
                    let run = if c == '"' {
                        backslashes * 2 + 1
                    } else {
                        backslashes
                    };
                    out.extend(std::iter::repeat_n('\\', run));
                    out.push(c);
                    backslashes = 0;
                }
                out.extend(std::iter::repeat_n('\\', backslashes * 2));
            }
        }
        out.push('"');
        out
    }
}

/// Make `input` usable as a file name and as a git identity value.
///
/// Accents are stripped, a few confusable characters get ASCII stand-ins and
/// characters that are invalid in file names become `_`. Returns `None` for
/// empty input.
pub fn sanitize_name(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(input.len() + 5);
    for c in input.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            '*' => out.push_str("_STAR_"),
            '¹' => out.push('1'),
            '²' => out.push('2'),
            '³' => out.push('3'),
            '⁴' => out.push('4'),
            '\'' | '"' | '‘' | '’' | '“' | '”' | '„' => out.push('~'),
            c if is_forbidden(c) => out.push('_'),
            c => out.push(c),
        }
    }
    Some(out)
}

/// File-name stem for an article: [`sanitize_name`] plus a guard against
/// names Windows reserves for devices.
pub fn file_stem(article: &str) -> String {
    let mut stem = sanitize_name(article).unwrap_or_else(|| "untitled".to_string());
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '?' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
