//! The interface to the runtime interpreter.
//!
//! The compiler produces a [`Program`]; executing it is the job of an
//! external runtime implementing [`Renderer`]. The driver in this module
//! walks the instruction list and dispatches each instruction; everything
//! with semantics — escaping, indentation rendering, host expression
//! evaluation — lives behind the trait.

use crate::types::program::{Expr, Instr, Program};
use crate::Result;

/// The runtime executing a compiled program.
pub trait Renderer {
    /// Write a string to the output.
    fn write(&mut self, s: &str) -> Result<()>;

    /// Indent the next output. A non-trimmable indent comes from inside a
    /// preserve-whitespace region and must not be suppressed.
    fn indent(&mut self, trimmable: bool) -> Result<()>;

    /// Suppress the next indentation request.
    fn trim(&mut self) -> Result<()>;

    /// Increase the indentation level.
    fn entab(&mut self) -> Result<()>;

    /// Decrease the indentation level.
    fn detab(&mut self) -> Result<()>;

    /// Write an attribute list.
    fn attrs(&mut self, id: &str, class: &str, hash: &str) -> Result<()>;

    /// Evaluate a host expression to a string.
    fn eval(&mut self, code: &str) -> Result<String>;

    /// Execute a host statement at the given nesting depth.
    fn exec(&mut self, code: &str, indent: usize) -> Result<()>;

    /// Escape a value for HTML output.
    fn escape(&self, value: &str) -> String;

    /// Mark a value as whitespace preserving.
    fn preserve_whitespace(&self, value: &str) -> String;
}

impl Program {
    /// Executes the program against a renderer.
    pub fn execute<R>(&self, renderer: &mut R) -> Result<()>
    where
        R: Renderer,
    {
        for code in &self.instrs {
            match &code.instr {
                Instr::Write(args) => {
                    for arg in args {
                        let mut value = match &arg.expr {
                            Expr::Literal(s) => s.clone(),
                            Expr::Code(code) => renderer.eval(code)?,
                            Expr::Format { fmt, args } => {
                                let mut values = Vec::with_capacity(args.len());
                                for arg in args {
                                    values.push(renderer.eval(arg)?);
                                }
                                format(fmt, &values)
                            }
                        };
                        if arg.escape {
                            value = renderer.escape(&value);
                        }
                        if arg.preserve {
                            value = renderer.preserve_whitespace(&value);
                        }
                        renderer.write(&value)?;
                    }
                }
                Instr::Attrs { id, class, hash } => renderer.attrs(id, class, hash)?,
                Instr::Indent { trimmable } => renderer.indent(*trimmable)?,
                Instr::Trim => renderer.trim()?,
                Instr::Entab => renderer.entab()?,
                Instr::Detab => renderer.detab()?,
                Instr::Statement { code, indent } => renderer.exec(code, *indent)?,
            }
        }
        Ok(())
    }
}

/// Substitutes values into a format template: `%s` takes the next value and
/// `%%` is a literal percent.
fn format(fmt: &str, values: &[String]) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut values = values.iter();
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                if let Some(value) = values.next() {
                    out.push_str(value);
                }
            }
            Some('%') => out.push('%'),
            Some(c) => {
                out.push('%');
                out.push(c);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn format_substitutes_in_order() {
        let values = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(format("%s-%s", &values), "a-b");
    }

    #[test]
    fn format_unescapes_percent() {
        let values = vec!["done".to_owned()];
        assert_eq!(format("100%% %s", &values), "100% done");
    }
}
