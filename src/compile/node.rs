//! The AST node variants and their open/close behaviors.
//!
//! Each element of the template becomes one [`Node`]. A node is begun when it
//! is reduced from the token stream and ended when a shallower element (or
//! the end of input) closes it, see [`Context::begin`][super::Context::begin].
//! Opening and closing emit instructions through the shared context.

use crate::compile::inline;
use crate::compile::Context;
use crate::types::program::{Expr, Instr, WriteArg};
use crate::{Error, ErrorKind, Format};

/// An element of the template.
#[derive(Debug)]
pub(crate) struct Node {
    /// Identity, used for the last-object-processed check.
    pub id: usize,
    /// The line number this node starts on, 1-based.
    pub line: usize,
    /// The source lines spanning this node's tokens.
    pub snippet: String,
    /// The declared indentation depth.
    pub depth: usize,
    pub kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Tag(Tag),
    Content(Content),
    Script(Script),
    SilentScript(SilentScript),
    Doctype(Doctype),
    Comment(Comment),
    Filter(Filter),
    /// The CDATA wrapper synthesized by the Javascript filter under XHTML.
    CData,
}

#[derive(Debug, Default)]
pub(crate) struct Tag {
    pub tagname: String,
    pub id: String,
    pub class: String,
    /// The dict expression for free-form attributes, `{}` when absent.
    pub hash: String,
    pub value: Option<TagValue>,
    /// Inner whitespace trim, from a `<` marker.
    pub inner: bool,
    /// Outer whitespace trim, from a `>` marker.
    pub outer: bool,
    pub selfclose: bool,
}

#[derive(Debug)]
pub(crate) enum TagValue {
    Text(String),
    Script { code: String, escape: bool },
}

#[derive(Debug)]
pub(crate) struct Content {
    pub value: String,
}

#[derive(Debug)]
pub(crate) struct Script {
    pub code: String,
    pub escape: bool,
    pub preserve: bool,
}

#[derive(Debug)]
pub(crate) struct SilentScript {
    pub code: String,
}

#[derive(Debug)]
pub(crate) struct Doctype {
    pub xml: bool,
    pub subtype: String,
}

#[derive(Debug)]
pub(crate) struct Comment {
    pub value: String,
    pub condition: String,
}

#[derive(Debug)]
pub(crate) struct Filter {
    pub kind: FilterKind,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterKind {
    Plain,
    Escaped,
    Javascript,
    Markdown,
}

impl FilterKind {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "plain" => Some(Self::Plain),
            "escaped" => Some(Self::Escaped),
            "javascript" => Some(Self::Javascript),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

impl Tag {
    pub(crate) fn new() -> Self {
        Self {
            tagname: "div".to_owned(),
            hash: "{}".to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        self.class = format!("{} {}", self.class, class).trim().to_owned();
    }

    /// Whether this tag closes itself: it has no value and was either marked
    /// self-closing or its name is in the configured autoclose set.
    fn auto(&self, ctx: &Context<'_>) -> bool {
        self.value.is_none()
            && (self.selfclose || ctx.options().autoclose.iter().any(|t| t == &self.tagname))
    }

    /// Whether this tag's inner whitespace must never be trimmed.
    fn preserve(&self, ctx: &Context<'_>) -> bool {
        ctx.options().preserve.iter().any(|t| t == &self.tagname)
    }
}

impl Node {
    /// Called when the node is opened (when begin is called).
    pub(crate) fn open(&self, ctx: &mut Context<'_>) -> crate::Result<()> {
        match &self.kind {
            NodeKind::Content(content) => self.push_literal(ctx, &content.value, false),
            NodeKind::Script(script) => {
                self.push(
                    ctx,
                    Expr::Code(script.code.clone()),
                    script.escape,
                    script.preserve,
                );
                Ok(())
            }
            NodeKind::SilentScript(script) => {
                ctx.statement(&script.code);
                ctx.enblock();
                Ok(())
            }
            NodeKind::Doctype(doctype) => self.open_doctype(ctx, doctype),
            NodeKind::Comment(comment) => self.open_comment(ctx, comment),
            NodeKind::Tag(tag) => self.open_tag(ctx, tag),
            NodeKind::Filter(filter) => self.open_filter(ctx, filter),
            NodeKind::CData => self.push_literal(ctx, "//<![CDATA[", false),
        }
    }

    /// Called when the node is closed (when end is called).
    pub(crate) fn close(&self, ctx: &mut Context<'_>) -> crate::Result<()> {
        match &self.kind {
            NodeKind::Content(_) | NodeKind::Doctype(_) => self.no_nesting(ctx),
            NodeKind::Script(_) | NodeKind::Filter(_) => Ok(()),
            NodeKind::SilentScript(_) => {
                ctx.deblock();
                Ok(())
            }
            NodeKind::Comment(comment) => self.close_comment(ctx, comment),
            NodeKind::Tag(tag) => self.close_tag(ctx, tag),
            NodeKind::CData => self.push_literal(ctx, "//]]>", false),
        }
    }

    /// Emits the entab instruction for this node. Silent script manages
    /// indentation through the statement nesting itself.
    pub(crate) fn entab(&self, ctx: &mut Context<'_>) {
        if !matches!(self.kind, NodeKind::SilentScript(_)) {
            ctx.emit(Instr::Entab);
        }
    }

    pub(crate) fn detab(&self, ctx: &mut Context<'_>) {
        if !matches!(self.kind, NodeKind::SilentScript(_)) {
            ctx.emit(Instr::Detab);
        }
    }

    fn open_doctype(&self, ctx: &mut Context<'_>, doctype: &Doctype) -> crate::Result<()> {
        let decl = if doctype.xml {
            crate::doctype::xml_prolog(&doctype.subtype)
        } else {
            match crate::doctype::lookup(ctx.options().format, &doctype.subtype) {
                Some(decl) => decl.to_owned(),
                None => {
                    let msg = format!("unknown doctype `{}`", doctype.subtype);
                    return Err(self.fail(ErrorKind::Syntax, msg));
                }
            }
        };
        self.push_literal(ctx, &decl, false)
    }

    fn open_comment(&self, ctx: &mut Context<'_>, comment: &Comment) -> crate::Result<()> {
        let mut s = if comment.condition.is_empty() {
            "<!--".to_owned()
        } else {
            format!("<!--[{}]>", comment.condition)
        };
        if !comment.value.is_empty() {
            s.push(' ');
            s.push_str(&comment.value);
        }
        self.push_literal(ctx, &s, false)
    }

    fn close_comment(&self, ctx: &mut Context<'_>, comment: &Comment) -> crate::Result<()> {
        let s = if comment.condition.is_empty() {
            "-->"
        } else {
            "<![endif]-->"
        };
        if !comment.value.is_empty() {
            // The value and the close marker share a line, so no indent.
            self.write_literal(ctx, &format!(" {s}"), false)
        } else {
            self.push_literal(ctx, s, false)
        }
    }

    fn open_tag(&self, ctx: &mut Context<'_>, tag: &Tag) -> crate::Result<()> {
        self.tag_push(ctx, tag, &format!("<{}", tag.tagname), false)?;
        ctx.attrs(&tag.id, &tag.class, &tag.hash);

        let s = if tag.auto(ctx) && ctx.options().format == Format::Xhtml {
            "/>"
        } else {
            ">"
        };
        self.write_literal(ctx, s, false)?;

        if let Some(value) = &tag.value {
            if tag.selfclose {
                return Err(self.fail(
                    ErrorKind::SelfCloseWithContent,
                    "self-closing tags cannot have content",
                ));
            }
            match value {
                TagValue::Script { code, escape } => {
                    self.write(ctx, Expr::Code(code.clone()), *escape, false);
                }
                TagValue::Text(text) => self.write_literal(ctx, text, false)?,
            }
        }

        if tag.preserve(ctx) {
            ctx.enter_preserve();
        }
        Ok(())
    }

    fn close_tag(&self, ctx: &mut Context<'_>, tag: &Tag) -> crate::Result<()> {
        if tag.value.is_some() || tag.selfclose {
            self.no_nesting(ctx)?;
        }

        if tag.preserve(ctx) {
            ctx.leave_preserve();
        }

        let s = if tag.auto(ctx) {
            String::new()
        } else {
            format!("</{}>", tag.tagname)
        };
        self.tag_push(ctx, tag, &s, true)
    }

    /// A tag's variant of push: places trims around the indent and write
    /// according to the inner/outer trim flags, whose roles swap when the
    /// tag closes. A closing tag that is the last object processed also
    /// trims, so that no dangling indent follows it.
    fn tag_push(
        &self,
        ctx: &mut Context<'_>,
        tag: &Tag,
        s: &str,
        closing: bool,
    ) -> crate::Result<()> {
        let mut inner = tag.inner || tag.preserve(ctx);
        let mut outer = tag.outer;
        if closing {
            std::mem::swap(&mut inner, &mut outer);
        }

        if outer || closing && ctx.is_last(self) {
            ctx.emit(Instr::Trim);
        }
        ctx.indent();
        self.write_literal(ctx, s, false)?;
        if inner || ctx.in_preserve() {
            ctx.emit(Instr::Trim);
        }
        Ok(())
    }

    fn open_filter(&self, ctx: &mut Context<'_>, filter: &Filter) -> crate::Result<()> {
        match filter.kind {
            FilterKind::Plain => {
                for line in &filter.lines {
                    self.push_literal(ctx, line, false)?;
                }
                Ok(())
            }
            FilterKind::Escaped => {
                for line in &filter.lines {
                    self.push_literal(ctx, line, true)?;
                }
                Ok(())
            }
            FilterKind::Javascript => self.open_javascript_filter(ctx, filter),
            FilterKind::Markdown => self.open_markdown_filter(ctx, filter),
        }
    }

    /// The Javascript filter wraps its lines in a synthesized `<script>` tag,
    /// and under XHTML additionally in a CDATA comment. The synthesized nodes
    /// are closed by the normal stack unwinding.
    fn open_javascript_filter(&self, ctx: &mut Context<'_>, filter: &Filter) -> crate::Result<()> {
        let depth = ctx.open_nodes();
        let tag = Tag {
            tagname: "script".to_owned(),
            hash: "{'type': 'text/javascript'}".to_owned(),
            ..Tag::new()
        };
        let node = ctx.node(self.line, self.snippet.clone(), depth + 1, NodeKind::Tag(tag));
        ctx.begin(node)?;

        if ctx.options().format == Format::Xhtml {
            let cdata = ctx.node(self.line, self.snippet.clone(), depth + 2, NodeKind::CData);
            ctx.begin(cdata)?;
        }

        for line in &filter.lines {
            self.push_literal(ctx, line, false)?;
        }
        Ok(())
    }

    fn open_markdown_filter(&self, ctx: &mut Context<'_>, filter: &Filter) -> crate::Result<()> {
        let code = filter.lines.join("\n");
        let html = match ctx.markdown(&code) {
            Some(html) => html,
            None => {
                return Err(self.fail(
                    ErrorKind::InvalidFilter,
                    "no markdown renderer is installed",
                ));
            }
        };
        for line in html.split('\n') {
            self.push_literal(ctx, line, false)?;
        }
        Ok(())
    }

    /// Emits an indented write of literal text, splicing inline expressions.
    fn push_literal(&self, ctx: &mut Context<'_>, s: &str, escape: bool) -> crate::Result<()> {
        let expr = self.splice(ctx, s)?;
        self.push(ctx, expr, escape, false);
        Ok(())
    }

    /// Emits a write of literal text without an indent.
    fn write_literal(&self, ctx: &mut Context<'_>, s: &str, escape: bool) -> crate::Result<()> {
        let expr = self.splice(ctx, s)?;
        self.write(ctx, expr, escape, false);
        Ok(())
    }

    fn push(&self, ctx: &mut Context<'_>, expr: Expr, escape: bool, preserve: bool) {
        ctx.indent();
        self.write(ctx, expr, escape, preserve);
    }

    fn write(&self, ctx: &mut Context<'_>, expr: Expr, escape: bool, preserve: bool) {
        ctx.emit(Instr::Write(vec![WriteArg {
            expr,
            escape,
            preserve,
        }]));
    }

    fn splice(&self, ctx: &Context<'_>, s: &str) -> crate::Result<Expr> {
        match inline::splice(s, ctx.code_lexer()) {
            Ok(spliced) => Ok(spliced.into_expr()),
            Err(inline::Unterminated) => Err(self.fail(
                ErrorKind::UnterminatedExpression,
                "end of line reached while reading an inline expression",
            )),
        }
    }

    /// For nodes that do not permit nesting: verify that nothing was begun
    /// after this node.
    fn no_nesting(&self, ctx: &Context<'_>) -> crate::Result<()> {
        if !ctx.is_last(self) {
            return Err(self.fail(ErrorKind::IllegalNesting, "illegal nesting"));
        }
        Ok(())
    }

    /// Builds an error carrying this node's position.
    pub(crate) fn fail(&self, kind: ErrorKind, msg: impl Into<String>) -> Error {
        Error::with_pos(kind, msg, self.line, self.snippet.clone())
    }
}
