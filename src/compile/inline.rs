//! The inline expression splicer.
//!
//! Literal text can embed host expressions using the `@{ ... }` syntax. The
//! splicer scans the text and produces a format template plus the ordered
//! host expression fragments, which together form one runtime expression
//! equivalent to a literal with placeholders.
//!
//! The splicer does not understand the host expression language. It walks the
//! embedded text with a [`CodeLexer`] purely to track `{` / `}` nesting, so
//! that braces inside host string literals do not terminate the expression.

use crate::types::span::Span;

/// The two character sequence that opens an inline expression.
const OPEN: &str = "@{";

/// Tokenizes host expression text.
///
/// This is the seam to the host language's own lexer. Implementations yield
/// the byte span of each successive token; the splicer only ever inspects
/// whether a token is `{` or `}`.
pub trait CodeLexer {
    fn spans(&self, source: &str) -> Vec<Span>;
}

/// A minimal host code lexer.
///
/// Yields one token per character, except that a single or double quoted
/// string literal is one token. That is enough to keep braces inside string
/// literals from being counted.
#[derive(Debug, Default)]
pub struct BasicCodeLexer;

impl CodeLexer for BasicCodeLexer {
    fn spans(&self, source: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut iter = source.char_indices();
        while let Some((i, c)) = iter.next() {
            match c {
                '"' | '\'' => {
                    let mut prev = c;
                    let mut end = source.len();
                    for (j, d) in iter.by_ref() {
                        if d == c && prev != '\\' {
                            end = j + d.len_utf8();
                            break;
                        }
                        prev = d;
                    }
                    spans.push(Span::from(i..end));
                }
                _ => spans.push(Span::from(i..i + c.len_utf8())),
            }
        }
        spans
    }
}

/// The result of splicing: a format template and the captured fragments.
///
/// In the template every literal `%` appears as `%%` and every fragment as
/// `%s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    pub fmt: String,
    pub args: Vec<String>,
}

/// Marker error: an `@{` was never closed by a depth zero `}`.
#[derive(Debug)]
pub(crate) struct Unterminated;

impl Spliced {
    /// Converts the splice into a runtime expression.
    ///
    /// With no fragments the result is a plain constant, with the `%%`
    /// escapes collapsed back to `%`.
    pub(crate) fn into_expr(self) -> crate::Expr {
        if self.args.is_empty() {
            crate::Expr::Literal(self.fmt.replace("%%", "%"))
        } else {
            crate::Expr::Format {
                fmt: self.fmt,
                args: self.args,
            }
        }
    }
}

/// Splices literal text that may contain inline expressions.
pub(crate) fn splice(text: &str, lexer: &dyn CodeLexer) -> Result<Spliced, Unterminated> {
    let mut fmt = String::new();
    let mut args = Vec::new();
    let mut s = text;

    loop {
        let open = match s.find(OPEN) {
            Some(i) => i,
            None => {
                push_literal(&mut fmt, s);
                break;
            }
        };

        // A marker preceded by an odd number of backslashes is escaped. Half
        // of the backslashes (rounded down) are emitted literally.
        let backslashes = s[..open].bytes().rev().take_while(|&b| b == b'\\').count();
        push_literal(&mut fmt, &s[..open - backslashes]);
        for _ in 0..backslashes / 2 {
            fmt.push('\\');
        }
        s = &s[open + OPEN.len()..];

        if backslashes % 2 == 1 {
            push_literal(&mut fmt, OPEN);
            continue;
        }

        let (expr, rest) = read_expr(s, lexer)?;
        fmt.push_str("%s");
        args.push(expr.trim().to_owned());
        s = rest;
    }

    Ok(Spliced { fmt, args })
}

/// Reads the host expression at the start of `s`, up to the first `}` that is
/// not matched by an earlier `{`. Returns the expression text and the
/// remaining text after the terminator.
fn read_expr<'t>(s: &'t str, lexer: &dyn CodeLexer) -> Result<(&'t str, &'t str), Unterminated> {
    let mut level = 0usize;
    for span in lexer.spans(s) {
        match &s[span] {
            "{" => level += 1,
            "}" => {
                if level == 0 {
                    return Ok((&s[..span.m], &s[span.n..]));
                }
                level -= 1;
            }
            _ => {}
        }
    }
    Err(Unterminated)
}

fn push_literal(fmt: &mut String, s: &str) {
    for c in s.chars() {
        if c == '%' {
            fmt.push_str("%%");
        } else {
            fmt.push(c);
        }
    }
}
