use winnow::combinator::{alt, cut_err, delimited, opt, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// A criterion node as written, before identifiers are looked up.
#[derive(Debug, PartialEq)]
pub(super) struct RawNode<'i> {
    pub name: &'i str,
    pub body: RawBody<'i>,
}

#[derive(Debug, PartialEq)]
pub(super) enum RawBody<'i> {
    /// `NAME`
    Bare,
    /// `NAME(node, ...)`
    Children(Vec<RawNode<'i>>),
    /// `NAME[literal, ...]`, each literal trimmed
    Literals(Vec<&'i str>),
}

// -- Whitespace & identifiers -----------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// -- Literal arguments ------------------------------------------------------

fn literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(0.., [',', '[', ']', '(', ')'])
        .map(str::trim)
        .parse_next(input)
}

fn literals<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    delimited(
        '[',
        cut_err(separated(0.., literal, ',')),
        cut_err(']').context(StrContext::Expected(StrContextValue::CharLiteral(']'))),
    )
    .parse_next(input)
}

// -- Nested expressions -----------------------------------------------------

fn children<'i>(input: &mut &'i str) -> ModalResult<Vec<RawNode<'i>>> {
    delimited(
        '(',
        cut_err(separated(0.., node, ',')),
        cut_err((ws, ')')).context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
    )
    .parse_next(input)
}

fn node<'i>(input: &mut &'i str) -> ModalResult<RawNode<'i>> {
    ws.parse_next(input)?;
    let name = ident
        .context(StrContext::Expected(StrContextValue::Description(
            "rule identifier",
        )))
        .parse_next(input)?;
    ws.parse_next(input)?;
    let body = opt(alt((
        children.map(RawBody::Children),
        literals.map(RawBody::Literals),
    )))
    .parse_next(input)?
    .unwrap_or(RawBody::Bare);
    ws.parse_next(input)?;
    Ok(RawNode { name, body })
}

// -- Top-level parser -------------------------------------------------------

pub(super) fn criterion<'i>(input: &mut &'i str) -> ModalResult<RawNode<'i>> {
    node.parse_next(input)
}
