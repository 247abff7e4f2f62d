#![allow(dead_code)]

use std::collections::VecDeque;

use hamlet::{Renderer, Result, Span, Token, TokenKind, TokenStream};

/// A scripted token stream.
///
/// Each token carries the indentation depth of the line it sits on, which is
/// what [`TokenStream::depth`] reports after the token is produced.
pub struct Stream {
    tokens: VecDeque<(Token, usize)>,
    depth: usize,
}

impl TokenStream for Stream {
    fn next_token(&mut self) -> Result<Option<Token>> {
        Ok(self.tokens.pop_front().map(|(token, depth)| {
            self.depth = depth;
            token
        }))
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// Builds a [`Stream`] one line at a time.
pub struct StreamBuilder {
    tokens: Vec<(Token, usize)>,
    depth: usize,
    line: usize,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            depth: 0,
            line: 1,
        }
    }

    /// Sets the indentation depth for the following tokens.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Pushes a token on the current line with an empty span.
    pub fn tok(self, kind: TokenKind) -> Self {
        self.tok_at(kind, 0..0)
    }

    /// Pushes a token on the current line covering the given byte range.
    pub fn tok_at(mut self, kind: TokenKind, span: std::ops::Range<usize>) -> Self {
        let token = Token {
            kind,
            line: self.line,
            span: Span::from(span),
        };
        self.tokens.push((token, self.depth));
        self
    }

    /// Ends the current line.
    pub fn newline(mut self) -> Self {
        self = self.tok(TokenKind::LineBreak);
        self.line += 1;
        self
    }

    pub fn build(self) -> Stream {
        Stream {
            tokens: self.tokens.into(),
            depth: 0,
        }
    }
}

/// A trivial renderer that concatenates writes and treats the indentation
/// instructions as no-ops. Host expressions evaluate to their own source
/// text and executed statements are recorded.
#[derive(Default)]
pub struct Writer {
    pub out: String,
    pub statements: Vec<(String, usize)>,
}

impl Renderer for Writer {
    fn write(&mut self, s: &str) -> Result<()> {
        self.out.push_str(s);
        Ok(())
    }

    fn indent(&mut self, _trimmable: bool) -> Result<()> {
        Ok(())
    }

    fn trim(&mut self) -> Result<()> {
        Ok(())
    }

    fn entab(&mut self) -> Result<()> {
        Ok(())
    }

    fn detab(&mut self) -> Result<()> {
        Ok(())
    }

    fn attrs(&mut self, id: &str, class: &str, hash: &str) -> Result<()> {
        if !id.is_empty() {
            self.out.push_str(&format!(" id=\"{id}\""));
        }
        if !class.is_empty() {
            self.out.push_str(&format!(" class=\"{class}\""));
        }
        if hash != "{}" && !hash.is_empty() {
            self.out.push_str(&format!(" {hash}"));
        }
        Ok(())
    }

    fn eval(&mut self, code: &str) -> Result<String> {
        Ok(code.to_owned())
    }

    fn exec(&mut self, code: &str, indent: usize) -> Result<()> {
        self.statements.push((code.to_owned(), indent));
        Ok(())
    }

    fn escape(&self, value: &str) -> String {
        value
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn preserve_whitespace(&self, value: &str) -> String {
        value.replace('\n', "&#x000A;")
    }
}
