use super::error::ParseError;

/// Maximum composite nesting accepted by [`parse`](super::parse).
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Check that round and square brackets pair up and that round brackets
/// nest at most `limit` levels.
///
/// Only `(` counts towards the limit, matching
/// [`Expression::depth`](crate::Expression::depth): a leaf's
/// argument list does not add a level.
///
/// Runs before the grammar so unbalanced input gets a precise offset instead
/// of a generic "expected" message.
pub(super) fn check(text: &str, limit: usize) -> Result<(), ParseError> {
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut depth = 0;
    for (offset, c) in text.char_indices() {
        match c {
            '(' => {
                open.push((offset, c));
                depth += 1;
                if depth > limit {
                    return Err(ParseError::TooDeep { limit });
                }
            }
            '[' => open.push((offset, c)),
            ')' | ']' => {
                let expected = if c == ')' { '(' } else { '[' };
                match open.pop() {
                    Some((_, o)) if o == expected => {
                        if o == '(' {
                            depth -= 1;
                        }
                    }
                    Some((at, o)) => {
                        return Err(ParseError::Unbalanced {
                            offset,
                            detail: format!("'{o}' opened at offset {at} closed by '{c}'"),
                        });
                    }
                    None => {
                        return Err(ParseError::Unbalanced {
                            offset,
                            detail: format!("'{c}' has no matching opening bracket"),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some((offset, c)) => Err(ParseError::Unbalanced {
            offset,
            detail: format!("'{c}' is never closed"),
        }),
        None => Ok(()),
    }
}
