//! Defines a compiled [`Program`] which is a sequence of [`Instr`] that can
//! be executed by the renderer.

/// The output of compiling one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instrs: Vec<Code>,
}

/// An instruction tagged with its emission depth.
///
/// The depth is the code indentation counter at the time the instruction was
/// emitted. It is consumed only by the peephole optimizer, never by the
/// renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub instr: Instr,
    pub depth: usize,
}

/// An instruction in a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Emit the runtime value of each argument in order
    Write(Vec<WriteArg>),

    /// Emit an attribute list built from the id, class, and dict expression
    Attrs {
        id: String,
        class: String,
        hash: String,
    },

    /// Request render-time indentation of the next output
    Indent { trimmable: bool },

    /// Suppress the next indentation request
    Trim,

    /// Increase the runtime indentation level
    Entab,

    /// Decrease the runtime indentation level
    Detab,

    /// Execute a host statement verbatim, carrying its own nesting depth
    Statement { code: String, indent: usize },
}

/// A single argument to a [`Instr::Write`] instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteArg {
    pub expr: Expr,
    pub escape: bool,
    pub preserve: bool,
}

/// A runtime expression that evaluates to the string to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A constant string
    Literal(String),

    /// A format template with `%s` placeholders and `%%` escapes, filled in
    /// with the values of the host expression fragments
    Format { fmt: String, args: Vec<String> },

    /// A host expression to evaluate and write
    Code(String),
}

impl WriteArg {
    /// A plain unescaped write of the given expression.
    pub fn plain(expr: Expr) -> Self {
        Self {
            expr,
            escape: false,
            preserve: false,
        }
    }
}
