use super::error::ParseError;
use super::grammar::{RawBody, RawNode};
use crate::types::{Expression, RuleId};

/// Turn a raw node into an [`Expression`], looking up identifiers and checking
/// composite child counts.
///
/// A composite's child count is checked before its children are looked at, so
/// `NOT(A, B)` reports the arity problem even though `A` is not a rule.
pub(super) fn lower(node: RawNode<'_>) -> Result<Expression, ParseError> {
    let rule = RuleId::from_name(node.name).ok_or_else(|| ParseError::UnknownRule {
        name: node.name.to_owned(),
    })?;

    match (rule.as_composite(), node.body) {
        (Some(op), RawBody::Children(children)) => {
            let arity = op.arity();
            if !arity.accepts(children.len()) {
                return Err(ParseError::CompositeArity {
                    op,
                    arity,
                    found: children.len(),
                });
            }
            let children = children
                .into_iter()
                .map(lower)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::Composite { op, children })
        }
        (Some(op), RawBody::Bare) => Err(ParseError::CompositeArity {
            op,
            arity: op.arity(),
            found: 0,
        }),
        (Some(op), RawBody::Literals(_)) => Err(ParseError::CompositeWithLiterals { op }),
        (None, RawBody::Children(_)) => Err(ParseError::LeafWithChildren { rule }),
        (None, RawBody::Bare) => Ok(Expression::Leaf {
            rule,
            raw_args: Vec::new(),
        }),
        (None, RawBody::Literals(literals)) => {
            // `X[]` is the same call as `X`.
            let raw_args = if literals == [""] {
                Vec::new()
            } else {
                literals.into_iter().map(str::to_owned).collect()
            };
            Ok(Expression::Leaf { rule, raw_args })
        }
    }
}
