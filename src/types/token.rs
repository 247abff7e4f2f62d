//! The token stream contract.
//!
//! The compiler does not tokenize template source itself, it consumes tokens
//! produced by an external tokenizer through the [`TokenStream`] trait. The
//! trait is a fallible pull iterator: the parser repeatedly calls
//! [`.next_token()?`][TokenStream::next_token] until [`None`] is returned.
//!
//! Besides the token kinds the stream must expose the tokenizer's current
//! indentation depth, which the parser uses as the declared depth of every
//! element that does not carry an explicit one.

use crate::types::span::Span;

/// A source of tokens for the compiler.
pub trait TokenStream {
    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> crate::Result<Option<Token>>;

    /// The tokenizer's current indentation depth.
    fn depth(&self) -> usize;
}

/// A single token with its position in the template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The line number this token starts on, 1-based.
    pub line: usize,
    /// The byte range this token covers in the source.
    pub span: Span,
}

/// The unit yielded by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A tag name, e.g. `%div`
    TagName(String),
    /// An id selector, e.g. `#bar`
    Id(String),
    /// A class selector, e.g. `.foo`
    Class(String),
    /// The literal text of an attribute dict expression, e.g. `{'href': url}`
    Dict(String),
    /// A whitespace trim marker containing `<` and/or `>`
    Trim(String),
    /// A self-close marker, e.g. `%br/`
    SelfClose,
    /// Free text
    Value(String),
    /// A script line, e.g. `= user.name`
    Script { sigil: Sigil, code: String },
    /// A silent script line, e.g. `- if logged_in:`
    SilentScript(String),
    /// A doctype marker, e.g. `!!!`
    Doctype,
    /// An HTML doctype subtype following the marker, e.g. `!!! strict`
    HtmlType(String),
    /// An XML prolog charset following the marker, e.g. `!!! XML utf-8`
    XmlType(String),
    /// A comment marker, e.g. `/`
    Comment,
    /// A conditional comment marker carrying the condition, e.g. `/[if IE]`
    CondComment(String),
    /// A filter marker carrying its declared depth and name, e.g. `:markdown`
    Filter { depth: usize, name: String },
    /// One raw line of filter content
    FilterContent(String),
    /// A run of blank lines inside a filter
    FilterBlankLines(usize),
    /// The end of a line
    LineBreak,
}

/// The sigil that introduced a script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `=`, evaluate and write
    Eq,
    /// `&=`, evaluate, escape, and write
    AmpEq,
    /// `~`, evaluate and write preserving whitespace
    Tilde,
}

impl TokenKind {
    /// Returns a human readable description of the token.
    pub fn human(&self) -> &'static str {
        match self {
            Self::TagName(_) => "a tag name",
            Self::Id(_) => "an id selector",
            Self::Class(_) => "a class selector",
            Self::Dict(_) => "an attribute dict",
            Self::Trim(_) => "a trim marker",
            Self::SelfClose => "a self-close marker",
            Self::Value(_) => "text",
            Self::Script { .. } => "a script line",
            Self::SilentScript(_) => "a silent script line",
            Self::Doctype => "a doctype marker",
            Self::HtmlType(_) => "a doctype subtype",
            Self::XmlType(_) => "an XML charset",
            Self::Comment => "a comment marker",
            Self::CondComment(_) => "a conditional comment marker",
            Self::Filter { .. } => "a filter marker",
            Self::FilterContent(_) => "filter content",
            Self::FilterBlankLines(_) => "blank filter lines",
            Self::LineBreak => "a line break",
        }
    }

    /// The raw text carried by the token, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::TagName(s)
            | Self::Id(s)
            | Self::Class(s)
            | Self::Dict(s)
            | Self::Trim(s)
            | Self::Value(s)
            | Self::SilentScript(s)
            | Self::HtmlType(s)
            | Self::XmlType(s)
            | Self::CondComment(s)
            | Self::FilterContent(s) => Some(s),
            Self::Script { code, .. } => Some(code),
            Self::Filter { name, .. } => Some(name),
            _ => None,
        }
    }
}
