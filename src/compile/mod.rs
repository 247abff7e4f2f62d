//! Compile a token stream into a program that can be executed by the
//! renderer.
//!
//! This process has two stages:
//! - The parser assembles one AST node per template element from the token
//!   stream and begins it at its declared depth.
//! - Each node emits instructions through the shared [`Context`], which
//!   drives the open node stack and the peephole optimizer.

pub(crate) mod inline;
pub(crate) mod node;
mod parse;

use crate::compile::node::{Node, NodeKind};
use crate::types::program::{Code, Instr, Program};
use crate::types::token::TokenStream;
use crate::{Engine, Options, Result};

/// Compile a template into a program.
pub(crate) fn template<S>(engine: &Engine, source: &str, tokens: S) -> Result<Program>
where
    S: TokenStream,
{
    parse::Parser::new(engine, source, tokens).parse_template()
}

/// The mutable state threaded through one compilation.
///
/// All node operations receive the context by mutable reference; there is no
/// other shared state, so independent templates can be compiled in parallel
/// with independent contexts.
pub(crate) struct Context<'engine> {
    engine: &'engine Engine,

    /// The growing instruction list.
    instrs: Vec<Code>,

    /// The stack of open nodes, outermost first.
    to_close: Vec<Node>,

    /// The code indentation counter, adjusted only by silent script blocks.
    depth: usize,

    /// How many preserve-whitespace regions we are inside.
    preserve: usize,

    /// The id of the last node begun, for the nesting prohibition check.
    last: Option<usize>,

    /// The next node id to hand out.
    next_id: usize,
}

impl<'engine> Context<'engine> {
    pub(crate) fn new(engine: &'engine Engine) -> Self {
        Self {
            engine,
            instrs: Vec::new(),
            to_close: Vec::new(),
            depth: 0,
            preserve: 0,
            last: None,
            next_id: 0,
        }
    }

    pub(crate) fn options(&self) -> &Options {
        &self.engine.options
    }

    pub(crate) fn code_lexer(&self) -> &dyn inline::CodeLexer {
        self.engine.code_lexer()
    }

    pub(crate) fn markdown(&self, code: &str) -> Option<String> {
        self.engine.render_markdown(code)
    }

    /// Allocates a node with a fresh id.
    pub(crate) fn node(
        &mut self,
        line: usize,
        snippet: String,
        depth: usize,
        kind: NodeKind,
    ) -> Node {
        let id = self.next_id;
        self.next_id += 1;
        Node {
            id,
            line,
            snippet,
            depth,
            kind,
        }
    }

    /// Begins a node declared at its depth.
    ///
    /// Everything open at a greater depth is ended first, then the node is
    /// opened and pushed. Comparing against the stack length rather than the
    /// top's declared depth is what makes a sibling at equal depth close the
    /// previous one.
    pub(crate) fn begin(&mut self, node: Node) -> Result<()> {
        while self.to_close.len() > node.depth {
            let open = self.to_close.pop().unwrap();
            self.end(open)?;
        }
        self.last = Some(node.id);
        node.open(self)?;
        node.entab(self);
        self.to_close.push(node);
        Ok(())
    }

    fn end(&mut self, node: Node) -> Result<()> {
        node.detab(self);
        node.close(self)
    }

    /// Ends every remaining open node and returns the finished program.
    pub(crate) fn finish(mut self) -> Result<Program> {
        while let Some(node) = self.to_close.pop() {
            self.end(node)?;
        }
        Ok(Program {
            instrs: self.instrs,
        })
    }

    /// Appends an instruction, after the peephole pass.
    ///
    /// Only the most recently emitted instruction is ever inspected, and only
    /// at equal emission depth: an entab followed by a detab cancels, and
    /// adjacent writes merge into one.
    pub(crate) fn emit(&mut self, instr: Instr) {
        let depth = self.depth;
        let same_depth = self.instrs.last().map_or(false, |c| c.depth == depth);

        if same_depth {
            match instr {
                Instr::Detab if matches!(self.instrs.last(), Some(c) if matches!(c.instr, Instr::Entab)) =>
                {
                    self.instrs.pop();
                    return;
                }
                Instr::Write(args) => {
                    match self.instrs.last_mut() {
                        Some(Code {
                            instr: Instr::Write(prev),
                            ..
                        }) => prev.extend(args),
                        _ => self.instrs.push(Code {
                            instr: Instr::Write(args),
                            depth,
                        }),
                    }
                    return;
                }
                instr => {
                    self.instrs.push(Code { instr, depth });
                    return;
                }
            }
        }

        self.instrs.push(Code { instr, depth });
    }

    /// Requests render-time indentation of the next output. Inside a preserve
    /// region the indent is not trimmable.
    pub(crate) fn indent(&mut self) {
        self.emit(Instr::Indent {
            trimmable: self.preserve == 0,
        });
    }

    /// Emits a host statement carrying the current nesting depth.
    pub(crate) fn statement(&mut self, code: &str) {
        self.emit(Instr::Statement {
            code: code.to_owned(),
            indent: self.depth,
        });
    }

    /// Emits one attribute instruction, but only if there is anything in it.
    pub(crate) fn attrs(&mut self, id: &str, class: &str, hash: &str) {
        if hash != "{}" || !class.is_empty() || !id.is_empty() {
            self.emit(Instr::Attrs {
                id: id.to_owned(),
                class: class.to_owned(),
                hash: hash.to_owned(),
            });
        }
    }

    pub(crate) fn enblock(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn deblock(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn enter_preserve(&mut self) {
        self.preserve += 1;
    }

    pub(crate) fn leave_preserve(&mut self) {
        self.preserve -= 1;
    }

    pub(crate) fn in_preserve(&self) -> bool {
        self.preserve > 0
    }

    pub(crate) fn is_last(&self, node: &Node) -> bool {
        self.last == Some(node.id)
    }

    pub(crate) fn open_nodes(&self) -> usize {
        self.to_close.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::program::{Expr, WriteArg};

    fn context(engine: &Engine) -> Context<'_> {
        Context::new(engine)
    }

    fn write(s: &str) -> Instr {
        Instr::Write(vec![WriteArg::plain(Expr::Literal(s.to_owned()))])
    }

    #[test]
    fn emit_merges_adjacent_writes() {
        let engine = Engine::default();
        let mut ctx = context(&engine);
        ctx.emit(write("a"));
        ctx.emit(write("b"));
        let program = ctx.finish().unwrap();
        assert_eq!(
            program.instrs,
            vec![Code {
                instr: Instr::Write(vec![
                    WriteArg::plain(Expr::Literal("a".to_owned())),
                    WriteArg::plain(Expr::Literal("b".to_owned())),
                ]),
                depth: 0
            }]
        );
    }

    #[test]
    fn emit_cancels_entab_detab() {
        let engine = Engine::default();
        let mut ctx = context(&engine);
        ctx.emit(Instr::Entab);
        ctx.emit(Instr::Detab);
        let program = ctx.finish().unwrap();
        assert_eq!(program.instrs, vec![]);
    }

    #[test]
    fn emit_does_not_cancel_across_depths() {
        let engine = Engine::default();
        let mut ctx = context(&engine);
        ctx.emit(Instr::Entab);
        ctx.enblock();
        ctx.emit(Instr::Detab);
        let program = ctx.finish().unwrap();
        assert_eq!(program.instrs.len(), 2);
    }

    #[test]
    fn emit_does_not_merge_across_depths() {
        let engine = Engine::default();
        let mut ctx = context(&engine);
        ctx.emit(write("a"));
        ctx.enblock();
        ctx.emit(write("b"));
        let program = ctx.finish().unwrap();
        assert_eq!(program.instrs.len(), 2);
        assert_eq!(program.instrs[1].depth, 1);
    }

    #[test]
    fn attrs_skipped_when_empty() {
        let engine = Engine::default();
        let mut ctx = context(&engine);
        ctx.attrs("", "", "{}");
        assert!(ctx.instrs.is_empty());
        ctx.attrs("bar", "foo", "{}");
        assert_eq!(ctx.instrs.len(), 1);
    }
}
