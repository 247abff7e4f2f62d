pub mod program;
pub mod span;
pub mod token;
