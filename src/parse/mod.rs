mod brackets;
mod error;
mod grammar;
mod lower;

pub use brackets::DEFAULT_MAX_DEPTH;
pub use error::ParseError;

use crate::types::Expression;

/// Parse one criterion into an [`Expression`].
///
/// # Errors
///
/// Returns [`ParseError`] if brackets are unbalanced or nested deeper than
/// [`DEFAULT_MAX_DEPTH`], the text is not valid criterion syntax, an
/// identifier is not a known rule, or a composite has the wrong number of
/// nested expressions.
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    parse_with_limit(text, DEFAULT_MAX_DEPTH)
}

/// Like [`parse`] with a custom composite nesting limit.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with_limit(text: &str, max_depth: usize) -> Result<Expression, ParseError> {
    use winnow::Parser;

    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    brackets::check(text, max_depth)?;
    let raw = grammar::criterion
        .parse(text)
        .map_err(|e| ParseError::Syntax {
            message: e.to_string(),
        })?;
    lower::lower(raw)
}
