use std::cmp::max;
use std::fmt;

use unicode_width::UnicodeWidthStr;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur during template compilation.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    pos: Option<Pos>,
}

/// The category of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The grammar rejected a token.
    Syntax,
    /// A node that forbids children was followed by a child.
    IllegalNesting,
    /// An inline expression was never closed.
    UnterminatedExpression,
    /// A filter name is not in the recognized set.
    InvalidFilter,
    /// A self-closing tag was given a value.
    SelfCloseWithContent,
    /// Evaluation was attempted while `suppress_eval` is active.
    SandboxViolation,
}

/// The captured position of a failing node: its line number and the
/// reconstituted source lines spanning its tokens.
#[derive(Clone)]
struct Pos {
    line: usize,
    snippet: String,
}

impl Error {
    /// Construct an error with no source position. Renderer implementations
    /// can use this to surface runtime failures.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            pos: None,
        }
    }

    pub(crate) fn with_pos(
        kind: ErrorKind,
        msg: impl Into<String>,
        line: usize,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            msg: msg.into(),
            pos: Some(Pos {
                line,
                snippet: snippet.into(),
            }),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The line number the error occurred on, if known.
    pub fn line(&self) -> Option<usize> {
        self.pos.as_ref().map(|p| p.line)
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos {
            Some(pos) => fmt_pretty(&self.msg, pos, f),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos {
            Some(pos) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, pos, f)
                } else {
                    write!(f, "{} on line {}", self.msg, pos.line)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, pos: &Pos, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = pos.snippet.split('\n').collect();
    let last = pos.line + lines.len() - 1;
    let pad = last.to_string().width();
    let pipe = "|";

    writeln!(f)?;
    writeln!(f, " {0:pad$} {pipe}", "")?;
    for (i, code) in lines.iter().enumerate() {
        writeln!(f, " {num:>pad$} {pipe} {code}", num = pos.line + i)?;
    }
    let width = max(1, lines.last().map(|l| l.width()).unwrap_or(0));
    let underline = "^".repeat(width);
    writeln!(f, " {0:pad$} {pipe} {underline} {msg}", "")
}
