//! The grammar actions that drive compilation.
//!
//! The parser assembles one AST node per template element from the external
//! token stream and immediately begins it at its declared depth. It is a
//! simple hand written parser with no recursion; it sometimes needs to peek
//! at the next token to know how to proceed and uses the `peeked` buffer to
//! do this.

use crate::compile::node::{
    Comment, Content, Doctype, Filter, FilterKind, NodeKind, Script, SilentScript, Tag, TagValue,
};
use crate::compile::Context;
use crate::types::program::Program;
use crate::types::span::Span;
use crate::types::token::{Sigil, Token, TokenKind, TokenStream};
use crate::{Engine, Error, ErrorKind, Result};

pub(crate) struct Parser<'engine, 'source, S> {
    ctx: Context<'engine>,

    /// The original template source, used to reconstitute error snippets.
    source: &'source str,

    /// The external token stream.
    tokens: S,

    /// Remember a peeked token, even if it was `None`.
    peeked: Option<Option<Token>>,
}

impl<'engine, 'source, S> Parser<'engine, 'source, S>
where
    S: TokenStream,
{
    pub(crate) fn new(engine: &'engine Engine, source: &'source str, tokens: S) -> Self {
        Self {
            ctx: Context::new(engine),
            source,
            tokens,
            peeked: None,
        }
    }

    /// Parses the whole token stream, beginning one node per element, then
    /// flushes every node left open.
    pub(crate) fn parse_template(mut self) -> Result<Program> {
        while let Some(token) = self.next()? {
            match token.kind {
                TokenKind::LineBreak => continue,
                TokenKind::TagName(_) | TokenKind::Id(_) | TokenKind::Class(_) => {
                    self.parse_element(token)?;
                }
                TokenKind::Value(_) => self.parse_content(token)?,
                TokenKind::Doctype => self.parse_doctype(token)?,
                TokenKind::Comment | TokenKind::CondComment(_) => self.parse_comment(token)?,
                TokenKind::Script { .. } => self.parse_script(token)?,
                TokenKind::SilentScript(_) => self.parse_silent_script(token)?,
                TokenKind::Filter { .. } => self.parse_filter(token)?,
                _ => self.unexpected(&token)?,
            }
        }
        self.ctx.finish()
    }

    /// Parses a tag element. The element starts with any of a tag name, an id
    /// selector, or a class selector, followed by more selectors, an optional
    /// attribute dict, trim markers, a self-close marker, and optional text
    /// or script.
    fn parse_element(&mut self, first: Token) -> Result<()> {
        let mut tag = Tag::new();
        let line = first.line;
        let mut span = first.span;

        let apply = |tag: &mut Tag, kind: &TokenKind| match kind {
            TokenKind::TagName(name) => tag.tagname = name.clone(),
            TokenKind::Id(id) => tag.id = id.clone(),
            TokenKind::Class(class) => tag.add_class(class),
            _ => unreachable!(),
        };
        apply(&mut tag, &first.kind);

        while let Some(token) = self.next_if(|kind| {
            matches!(kind, TokenKind::Id(_) | TokenKind::Class(_))
        })? {
            apply(&mut tag, &token.kind);
            span = span.combine(token.span);
        }

        if let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::Dict(_)))? {
            if let TokenKind::Dict(dict) = &token.kind {
                tag.hash = if self.ctx.options().suppress_eval {
                    "{}".to_owned()
                } else {
                    dict.clone()
                };
            }
            span = span.combine(token.span);
        }

        if let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::Trim(_)))? {
            if let TokenKind::Trim(trim) = &token.kind {
                tag.inner = trim.contains('<');
                tag.outer = trim.contains('>');
            }
            span = span.combine(token.span);
        }

        if let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::SelfClose))? {
            tag.selfclose = true;
            span = span.combine(token.span);
        }

        if let Some((value, sp)) = self.parse_value()? {
            tag.value = Some(TagValue::Text(value));
            span = span.combine(sp);
        } else if let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::Script { .. }))? {
            if let TokenKind::Script { sigil, code } = &token.kind {
                let script = self.script(*sigil, code);
                tag.value = Some(TagValue::Script {
                    code: script.code,
                    escape: script.escape,
                });
            }
            span = span.combine(token.span);
        }

        self.begin(line, span, NodeKind::Tag(tag))
    }

    /// Parses a content line: one or more text tokens joined with spaces.
    fn parse_content(&mut self, first: Token) -> Result<()> {
        let mut value = match &first.kind {
            TokenKind::Value(v) => v.clone(),
            _ => unreachable!(),
        };
        let mut span = first.span;
        while let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::Value(_)))? {
            if let TokenKind::Value(v) = &token.kind {
                value.push(' ');
                value.push_str(v);
            }
            span = span.combine(token.span);
        }
        self.begin(first.line, span, NodeKind::Content(Content { value }))
    }

    /// Parses a doctype line with an optional HTML subtype or XML charset.
    fn parse_doctype(&mut self, first: Token) -> Result<()> {
        let mut doctype = Doctype {
            xml: false,
            subtype: String::new(),
        };
        let mut span = first.span;
        if let Some(token) = self.next_if(|kind| {
            matches!(kind, TokenKind::HtmlType(_) | TokenKind::XmlType(_))
        })? {
            match &token.kind {
                TokenKind::HtmlType(subtype) => doctype.subtype = subtype.clone(),
                TokenKind::XmlType(charset) => {
                    doctype.xml = true;
                    doctype.subtype = if charset.is_empty() {
                        "utf-8".to_owned()
                    } else {
                        charset.clone()
                    };
                }
                _ => unreachable!(),
            }
            span = span.combine(token.span);
        }
        self.begin(first.line, span, NodeKind::Doctype(doctype))
    }

    /// Parses a comment line, plain or conditional, with an optional value.
    fn parse_comment(&mut self, first: Token) -> Result<()> {
        let condition = match &first.kind {
            TokenKind::Comment => String::new(),
            TokenKind::CondComment(cond) => cond.trim().to_owned(),
            _ => unreachable!(),
        };
        let mut span = first.span;
        let value = match self.parse_value()? {
            Some((value, sp)) => {
                span = span.combine(sp);
                value.trim().to_owned()
            }
            None => String::new(),
        };
        self.begin(
            first.line,
            span,
            NodeKind::Comment(Comment { value, condition }),
        )
    }

    /// Parses a standalone script line.
    fn parse_script(&mut self, first: Token) -> Result<()> {
        let script = match &first.kind {
            TokenKind::Script { sigil, code } => self.script(*sigil, code),
            _ => unreachable!(),
        };
        self.begin(first.line, first.span, NodeKind::Script(script))
    }

    /// Parses a silent script line. Evaluation is forbidden in sandbox mode.
    fn parse_silent_script(&mut self, first: Token) -> Result<()> {
        let code = match &first.kind {
            TokenKind::SilentScript(code) => code.clone(),
            _ => unreachable!(),
        };
        if self.ctx.options().suppress_eval {
            return Err(Error::with_pos(
                ErrorKind::SandboxViolation,
                "evaluation is not allowed",
                first.line,
                self.snippet(first.span),
            ));
        }
        self.begin(
            first.line,
            first.span,
            NodeKind::SilentScript(SilentScript { code }),
        )
    }

    /// Parses a filter header and its accumulated content lines. Filters are
    /// the one element kind whose declared depth comes from the token itself.
    fn parse_filter(&mut self, first: Token) -> Result<()> {
        let (depth, name) = match &first.kind {
            TokenKind::Filter { depth, name } => (*depth, name.clone()),
            _ => unreachable!(),
        };

        let kind = match FilterKind::from_name(&name) {
            Some(kind) => kind,
            None => {
                return Err(Error::with_pos(
                    ErrorKind::InvalidFilter,
                    format!("invalid filter `{name}`"),
                    first.line,
                    self.snippet(first.span),
                ));
            }
        };

        let mut lines = Vec::new();
        let mut span = first.span;
        while let Some(token) = self.next_if(|kind| {
            matches!(
                kind,
                TokenKind::FilterContent(_) | TokenKind::FilterBlankLines(_)
            )
        })? {
            match &token.kind {
                TokenKind::FilterContent(line) => lines.push(line.clone()),
                TokenKind::FilterBlankLines(count) => {
                    lines.extend(std::iter::repeat(String::new()).take(*count));
                }
                _ => unreachable!(),
            }
            span = span.combine(token.span);
        }

        let node = self.ctx.node(
            first.line,
            self.snippet(span),
            depth,
            NodeKind::Filter(Filter { kind, lines }),
        );
        self.ctx.begin(node)
    }

    /// Joins consecutive text tokens, if any.
    fn parse_value(&mut self) -> Result<Option<(String, Span)>> {
        let first = match self.next_if(|kind| matches!(kind, TokenKind::Value(_)))? {
            Some(token) => token,
            None => return Ok(None),
        };
        let mut value = match &first.kind {
            TokenKind::Value(v) => v.clone(),
            _ => unreachable!(),
        };
        let mut span = first.span;
        while let Some(token) = self.next_if(|kind| matches!(kind, TokenKind::Value(_)))? {
            if let TokenKind::Value(v) = &token.kind {
                value.push(' ');
                value.push_str(v);
            }
            span = span.combine(token.span);
        }
        Ok(Some((value, span)))
    }

    /// Builds a script from its sigil. Escaping defaults on for `&=` and,
    /// when configured, for `=`; `~` preserves whitespace. In sandbox mode
    /// the code is replaced with an empty expression.
    fn script(&self, sigil: Sigil, code: &str) -> Script {
        let code = if self.ctx.options().suppress_eval {
            "\"\"".to_owned()
        } else {
            code.to_owned()
        };
        Script {
            code,
            escape: match sigil {
                Sigil::AmpEq => true,
                Sigil::Eq => self.ctx.options().escape_html,
                Sigil::Tilde => false,
            },
            preserve: sigil == Sigil::Tilde,
        }
    }

    /// Begins a node at the stream's current depth.
    fn begin(&mut self, line: usize, span: Span, kind: NodeKind) -> Result<()> {
        let depth = self.tokens.depth();
        let node = self.ctx.node(line, self.snippet(span), depth, kind);
        self.ctx.begin(node)
    }

    /// Handles a token the grammar cannot place: raise under `fail_fast`,
    /// otherwise log a warning and continue with the next token.
    fn unexpected(&mut self, token: &Token) -> Result<()> {
        let value = token.kind.value().unwrap_or_default();
        let msg = format!(
            "syntax error: unexpected {} [{}] file: {} lineno: {}",
            token.kind.human(),
            value,
            self.ctx.options().filename,
            token.line,
        );
        if self.ctx.options().fail_fast {
            return Err(Error::with_pos(
                ErrorKind::Syntax,
                msg,
                token.line,
                self.snippet(token.span),
            ));
        }
        log::warn!("{msg}");
        Ok(())
    }

    /// Reconstitutes the source lines covering a byte range: the range is
    /// widened to the nearest enclosing newlines, which are themselves
    /// excluded.
    fn snippet(&self, span: Span) -> String {
        lines_in_range(self.source, span)
    }

    /// Returns the next token if its kind matches the predicate.
    fn next_if(&mut self, pred: impl Fn(&TokenKind) -> bool) -> Result<Option<Token>> {
        let matched = match self.peek()? {
            Some(token) => pred(&token.kind),
            None => false,
        };
        if matched {
            self.next()
        } else {
            Ok(None)
        }
    }

    /// Returns a reference to the next token without consuming it.
    fn peek(&mut self) -> Result<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.tokens.next_token()?);
        }
        match &self.peeked {
            Some(peeked) => Ok(peeked.as_ref()),
            None => unreachable!(),
        }
    }

    /// Returns the next token in the stream.
    fn next(&mut self) -> Result<Option<Token>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.tokens.next_token(),
        }
    }
}

pub(crate) fn lines_in_range(source: &str, span: Span) -> String {
    let m = span.m.min(source.len());
    let n = span.n.min(source.len());
    let start = match source[..m].rfind('\n') {
        Some(i) => i + 1,
        None => 0,
    };
    let end = match source[n..].find('\n') {
        Some(i) => n + i,
        None => source.len(),
    };
    source[start..end].to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lines_in_range_single_line() {
        let src = "%p\n  %div hello\n%p";
        assert_eq!(lines_in_range(src, Span::from(5..9)), "  %div hello");
    }

    #[test]
    fn lines_in_range_first_line() {
        let src = "%p\n  %div";
        assert_eq!(lines_in_range(src, Span::from(0..2)), "%p");
    }

    #[test]
    fn lines_in_range_spans_lines() {
        let src = "a\nbb\ncc\nd";
        assert_eq!(lines_in_range(src, Span::from(3..6)), "bb\ncc");
    }

    #[test]
    fn lines_in_range_out_of_bounds() {
        assert_eq!(lines_in_range("ab", Span::from(5..9)), "ab");
    }
}
