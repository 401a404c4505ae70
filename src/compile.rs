use tracing::debug;

use crate::registry::RuleRegistry;
use crate::resolve::{validate, Validated};
use crate::types::{
    BindContext, BindError, CompositeOp, Evaluator, EvaluatorKind, Expression, ResolutionError,
    SignatureRegistry,
};

/// Bind an expression to executable evaluators.
///
/// The whole tree is validated first and every problem is reported together;
/// factories are only called once validation has passed.
///
/// # Errors
///
/// Returns [`BindError::TooDeep`] if composites nest deeper than the context
/// allows, [`BindError::Invalid`] with every resolution problem in the tree,
/// [`BindError::Unbound`] if a leaf rule has no factory, or
/// [`BindError::Factory`] if a factory rejects its parameters.
pub fn bind(
    expr: &Expression,
    signatures: &SignatureRegistry,
    rules: &RuleRegistry,
    ctx: &BindContext,
) -> Result<Evaluator, BindError> {
    let depth = expr.depth();
    if depth > ctx.max_depth() {
        return Err(BindError::TooDeep {
            limit: ctx.max_depth(),
        });
    }

    let validated = validate(expr, signatures).map_err(BindError::Invalid)?;
    let evaluator = bind_node(validated, rules, ctx)?;

    debug!(
        root = %expr.rule_id(),
        leaves = expr.leaf_count(),
        depth,
        "criterion bound"
    );
    Ok(evaluator)
}

fn bind_node(
    node: Validated,
    rules: &RuleRegistry,
    ctx: &BindContext,
) -> Result<Evaluator, BindError> {
    match node {
        Validated::Leaf { rule, params } => {
            let factory = rules.factory(rule).ok_or(BindError::Unbound { rule })?;
            let eval = factory(&params, ctx).map_err(|e| BindError::Factory {
                rule,
                message: e.to_string(),
            })?;
            Ok(Evaluator::new(EvaluatorKind::Leaf { rule, eval }))
        }
        Validated::Composite { op, children } => {
            let bound = children
                .into_iter()
                .map(|child| bind_node(child, rules, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let kind = match op {
                CompositeOp::And => EvaluatorKind::And(bound),
                CompositeOp::Or => EvaluatorKind::Or(bound),
                CompositeOp::Not => EvaluatorKind::Not(Box::new(single(op, bound)?)),
                CompositeOp::WarnIf => EvaluatorKind::WarnIf(Box::new(single(op, bound)?)),
            };
            Ok(Evaluator::new(kind))
        }
    }
}

fn single(op: CompositeOp, children: Vec<Evaluator>) -> Result<Evaluator, BindError> {
    let [child]: [Evaluator; 1] = children.try_into().map_err(|rest: Vec<Evaluator>| {
        BindError::Invalid(vec![ResolutionError::CompositeArity {
            op,
            arity: op.arity(),
            found: rest.len(),
        }])
    })?;
    Ok(child)
}
