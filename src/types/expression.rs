use std::fmt;

use super::rule_id::{CompositeOp, RuleId};

/// A criterion expression tree.
///
/// Built either by [`parse`](crate::parse::parse) from criterion text or
/// programmatically with [`leaf`], [`and`], [`or`], [`not`] and [`warn_if`].
/// Leaves keep their argument text unvalidated; typing happens when the tree
/// is resolved against a [`SignatureRegistry`](crate::SignatureRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Leaf {
        rule: RuleId,
        raw_args: Vec<String>,
    },
    Composite {
        op: CompositeOp,
        children: Vec<Expression>,
    },
}

impl Expression {
    /// Nesting depth of composites; a leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Expression::Leaf { .. } => 0,
            Expression::Composite { children, .. } => {
                1 + children.iter().map(Expression::depth).max().unwrap_or(0)
            }
        }
    }

    /// Number of leaf calls in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Expression::Leaf { .. } => 1,
            Expression::Composite { children, .. } => {
                children.iter().map(Expression::leaf_count).sum()
            }
        }
    }

    /// The rule or operator identifier at the root.
    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        match self {
            Expression::Leaf { rule, .. } => *rule,
            Expression::Composite { op, .. } => op.rule_id(),
        }
    }

    /// Calls `f` for every leaf in left-to-right order.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(RuleId, &'a [String])) {
        match self {
            Expression::Leaf { rule, raw_args } => f(*rule, raw_args),
            Expression::Composite { children, .. } => {
                for child in children {
                    child.for_each_leaf(f);
                }
            }
        }
    }
}

/// Renders canonical criterion text that parses back to the same tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Leaf { rule, raw_args } => {
                write!(f, "{rule}")?;
                if !raw_args.is_empty() {
                    write!(f, "[{}]", raw_args.join(", "))?;
                }
                Ok(())
            }
            Expression::Composite { op, children } => {
                write!(f, "{op}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A leaf call with the given literal arguments.
#[must_use]
pub fn leaf<I, S>(rule: RuleId, args: I) -> Expression
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expression::Leaf {
        rule,
        raw_args: args.into_iter().map(Into::into).collect(),
    }
}

#[must_use]
pub fn and(children: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Composite {
        op: CompositeOp::And,
        children: children.into_iter().collect(),
    }
}

#[must_use]
pub fn or(children: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Composite {
        op: CompositeOp::Or,
        children: children.into_iter().collect(),
    }
}

#[must_use]
pub fn not(child: Expression) -> Expression {
    Expression::Composite {
        op: CompositeOp::Not,
        children: vec![child],
    }
}

#[must_use]
pub fn warn_if(child: Expression) -> Expression {
    Expression::Composite {
        op: CompositeOp::WarnIf,
        children: vec![child],
    }
}

impl std::ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expression {
        and([
            leaf(RuleId::IsAtLeastXYearsOld, ["18"]),
            or([
                leaf(RuleId::IsPregnant, Vec::<String>::new()),
                !leaf(RuleId::HasHadCategoryXTreatmentOfTypesY, ["CHEMOTHERAPY", "a;b"]),
            ]),
        ])
    }

    #[test]
    fn render() {
        assert_eq!(
            sample().to_string(),
            "AND(IS_AT_LEAST_X_YEARS_OLD[18], OR(IS_PREGNANT, \
             NOT(HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y[CHEMOTHERAPY, a;b])))"
        );
    }

    #[test]
    fn depth_and_leaf_count() {
        let expr = sample();
        assert_eq!(expr.depth(), 3);
        assert_eq!(expr.leaf_count(), 3);
        assert_eq!(leaf(RuleId::IsMale, Vec::<String>::new()).depth(), 0);
    }

    #[test]
    fn leaves_in_order() {
        let mut seen = Vec::new();
        sample().for_each_leaf(&mut |rule, args| seen.push((rule, args.len())));
        assert_eq!(
            seen,
            vec![
                (RuleId::IsAtLeastXYearsOld, 1),
                (RuleId::IsPregnant, 0),
                (RuleId::HasHadCategoryXTreatmentOfTypesY, 2),
            ]
        );
    }

    #[test]
    fn root_identifier() {
        assert_eq!(sample().rule_id(), RuleId::And);
        assert_eq!(warn_if(leaf(RuleId::IsMale, [""; 0])).rule_id(), RuleId::WarnIf);
    }
}
