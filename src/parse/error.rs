use thiserror::Error;

use crate::types::{Arity, CompositeOp, RuleId};

/// Errors produced when parsing criterion text.
///
/// Only syntax is checked here; whether a leaf's literals fit its signature is
/// reported separately through [`ResolutionError`](crate::ResolutionError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty criterion")]
    Empty,

    #[error("unbalanced brackets at offset {offset}: {detail}")]
    Unbalanced { offset: usize, detail: String },

    #[error("brackets nested deeper than {limit}")]
    TooDeep { limit: usize },

    #[error("parse error: {message}")]
    Syntax { message: String },

    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },

    #[error("'{op}' takes {arity} nested expression(s), found {found}")]
    CompositeArity {
        op: CompositeOp,
        arity: Arity,
        found: usize,
    },

    #[error("rule '{rule}' is not a composite and cannot take nested expressions")]
    LeafWithChildren { rule: RuleId },

    #[error("'{op}' is a composite and takes nested expressions, not literal arguments")]
    CompositeWithLiterals { op: CompositeOp },
}

impl ParseError {
    /// Whether this is a wrong-number-of-children error rather than malformed text.
    ///
    /// Covers composites with the wrong child count and leaves written with
    /// composite syntax.
    #[must_use]
    pub fn is_arity_error(&self) -> bool {
        matches!(
            self,
            ParseError::CompositeArity { .. } | ParseError::LeafWithChildren { .. }
        )
    }
}
