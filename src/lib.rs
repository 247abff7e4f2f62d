//! A compiler for an indentation-significant HAML-style template language.
//!
//! The compiler turns a token stream into a *program*: an ordered instruction
//! stream that a runtime interpreter executes to produce HTML or XML output.
//! Tokenizing source text, evaluating host expressions, and rendering the
//! instruction stream are the jobs of external collaborators; this crate
//! covers everything in between.
//!
//! - Nesting is derived purely from each element's declared indentation
//!   depth. There is no end-of-block token: beginning an element closes
//!   everything open at a greater depth, and the end of input closes the
//!   rest.
//! - Emitted instructions pass through an incremental peephole optimizer
//!   that merges adjacent writes and cancels entab/detab pairs.
//! - Literal text may embed host expressions with `@{ ... }`; the splicer
//!   turns such text into a single format expression.
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct, which holds the configuration
//! and the collaborator hooks.
//!
//! ```
//! use hamlet::{Engine, Options};
//!
//! let engine = Engine::new(Options::default());
//! ```
//!
//! Compiling takes the template source (used only for error snippets) and a
//! [`TokenStream`] produced by your tokenizer, and returns a [`Program`].
//! The program is executed against an implementation of [`Renderer`].

mod compile;
mod doctype;
mod error;
mod render;
mod types;

pub use crate::compile::inline::{BasicCodeLexer, CodeLexer};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::render::Renderer;
pub use crate::types::program::{Code, Expr, Instr, Program, WriteArg};
pub use crate::types::span::Span;
pub use crate::types::token::{Sigil, Token, TokenKind, TokenStream};

use std::fmt;

/// The compilation engine: configuration plus the collaborator hooks.
pub struct Engine {
    options: Options,
    code_lexer: Box<dyn CodeLexer + Send + Sync>,
    markdown: Option<Box<MarkdownFn>>,
}

/// A function rendering Markdown to HTML.
type MarkdownFn = dyn Fn(&str) -> String + Send + Sync;

/// The output format, which controls the doctype table and self-close
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xhtml,
    Html4,
    Html5,
}

/// Compilation options.
#[derive(Debug, Clone)]
pub struct Options {
    /// The output format.
    pub format: Format,

    /// Escape `=` scripts by default.
    pub escape_html: bool,

    /// Sandbox mode: forbid silent script and force attribute dicts and
    /// script expressions to be empty.
    pub suppress_eval: bool,

    /// Tags rendered self-closing when they have no value.
    pub autoclose: Vec<String>,

    /// Tags whose inner whitespace is never trimmed.
    pub preserve: Vec<String>,

    /// Abort on grammar errors instead of logging a warning and continuing.
    pub fail_fast: bool,

    /// The template file name, for error messages.
    pub filename: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: Format::Html5,
            escape_html: false,
            suppress_eval: false,
            autoclose: [
                "meta", "img", "link", "br", "hr", "input", "area", "param", "col", "base",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            preserve: ["pre", "textarea"].iter().map(|s| s.to_string()).collect(),
            fail_fast: true,
            filename: "<anonymous>".to_owned(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Engine {
    /// Construct a new engine with the given options.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            code_lexer: Box::new(BasicCodeLexer),
            #[cfg(feature = "markdown")]
            markdown: Some(Box::new(markdown::render)),
            #[cfg(not(feature = "markdown"))]
            markdown: None,
        }
    }

    /// The engine's options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Install a host code lexer, used by the inline expression splicer to
    /// track brace nesting.
    pub fn set_code_lexer<L>(&mut self, lexer: L)
    where
        L: CodeLexer + Send + Sync + 'static,
    {
        self.code_lexer = Box::new(lexer);
    }

    /// Install a Markdown renderer, used by the `:markdown` filter.
    pub fn set_markdown_renderer<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.markdown = Some(Box::new(f));
    }

    /// Compile a template.
    ///
    /// `source` is the raw template text, used only to reconstitute error
    /// snippets; `tokens` is the token stream your tokenizer produced from
    /// it.
    pub fn compile<S>(&self, source: &str, tokens: S) -> Result<Program>
    where
        S: TokenStream,
    {
        compile::template(self, source, tokens)
    }

    pub(crate) fn code_lexer(&self) -> &dyn CodeLexer {
        &*self.code_lexer
    }

    pub(crate) fn render_markdown(&self, code: &str) -> Option<String> {
        self.markdown.as_ref().map(|f| f(code))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "markdown")]
mod markdown {
    /// The built-in Markdown renderer.
    pub(crate) fn render(code: &str) -> String {
        let parser = pulldown_cmark::Parser::new(code);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        let len = html.trim_end().len();
        html.truncate(len);
        html
    }
}
