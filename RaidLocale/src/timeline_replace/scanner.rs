//! Delimiter scanner for hand-edited trigger source
//!
//! A small explicit state machine: code, quoted literal (`'`, `"` or
//! backtick), line comment, block comment, plus an escape-pending flag while
//! inside a literal. Delimiters are counted only in code, so a value such as
//! `'{Burst}'` or a comment such as `// don't` never disturbs the depth.
//!
//! Regex literals are not recognised: a quote inside one, as in `/'/`, is
//! taken as the start of a string and the scan ends in [`ScanError`].
//! Callers treat that as a signal to fall back to looser scoping.
//!
//! All positions are byte offsets. Every delimiter is ASCII, so stepping by
//! byte never lands inside a multi-byte character.

use std::ops::{ControlFlow, Range};

use thiserror::Error;

/// Why a scan could not complete
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unterminated block comment starting at byte {0}")]
    UnterminatedComment(usize),

    #[error("`{open}` at byte {at} is never closed")]
    Unclosed { open: char, at: usize },

    #[error("unexpected `{found}` at byte {at}")]
    Mismatched { found: char, at: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Visit every code byte from `start`, skipping literals and comments.
///
/// Stops early when `visit` breaks, returning the break value.
fn walk_code<F>(text: &str, start: usize, mut visit: F) -> Result<Option<usize>, ScanError>
where
    F: FnMut(usize, u8) -> Result<ControlFlow<usize>, ScanError>,
{
    let bytes = text.as_bytes();
    let mut state = State::Code;
    let mut state_start = start;
    let mut escape_pending = false;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            State::Code => match (b, next) {
                (b'\'' | b'"' | b'`', _) => {
                    state = State::Quoted(b);
                    state_start = i;
                }
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    state_start = i;
                    i += 1;
                }
                _ => {
                    if let ControlFlow::Break(found) = visit(i, b)? {
                        return Ok(Some(found));
                    }
                }
            },
            State::Quoted(quote) => {
                if escape_pending {
                    escape_pending = false;
                } else if b == b'\\' {
                    escape_pending = true;
                } else if b == quote {
                    state = State::Code;
                } else if b == b'\n' && quote != b'`' {
                    return Err(ScanError::UnterminatedString(state_start));
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    match state {
        State::Quoted(_) => Err(ScanError::UnterminatedString(state_start)),
        State::BlockComment => Err(ScanError::UnterminatedComment(state_start)),
        State::Code | State::LineComment => Ok(None),
    }
}

fn closer_for(open: u8) -> u8 {
    match open {
        b'{' => b'}',
        b'[' => b']',
        _ => b')',
    }
}

/// Index of the delimiter closing the one at `open`
///
/// # Errors
/// Fails if a literal or comment is unterminated, a closer does not match,
/// or the delimiter is never closed.
pub fn matching_close(text: &str, open: usize) -> Result<usize, ScanError> {
    let mut stack: Vec<u8> = Vec::new();

    let found = walk_code(text, open, |i, b| match b {
        b'{' | b'[' | b'(' => {
            stack.push(closer_for(b));
            Ok(ControlFlow::Continue(()))
        }
        b'}' | b']' | b')' => {
            if stack.pop() != Some(b) {
                return Err(ScanError::Mismatched {
                    found: char::from(b),
                    at: i,
                });
            }
            if stack.is_empty() {
                Ok(ControlFlow::Break(i))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        }
        _ => Ok(ControlFlow::Continue(())),
    })?;

    found.ok_or(ScanError::Unclosed {
        open: char::from(text.as_bytes().get(open).copied().unwrap_or(b'?')),
        at: open,
    })
}

/// Spans (`{` through `}` inclusive) of the objects directly inside the
/// array or object opened at `open`.
///
/// # Errors
/// Fails under the same conditions as [`matching_close`].
pub fn child_objects(text: &str, open: usize) -> Result<Vec<Range<usize>>, ScanError> {
    let close = matching_close(text, open)?;
    let mut stack: Vec<u8> = Vec::new();
    let mut child_start = 0;
    let mut children = Vec::new();

    walk_code(text, open + 1, |i, b| {
        if i >= close {
            return Ok(ControlFlow::Break(i));
        }
        match b {
            b'{' | b'[' | b'(' => {
                if stack.is_empty() && b == b'{' {
                    child_start = i;
                }
                stack.push(closer_for(b));
            }
            b'}' | b']' | b')' => {
                stack.pop();
                if stack.is_empty() && b == b'}' {
                    children.push(child_start..i + 1);
                }
            }
            _ => {}
        }
        Ok(ControlFlow::Continue(()))
    })?;

    Ok(children)
}

/// Every `{ .. }` span in `text`, in order of their opening brace
///
/// # Errors
/// Fails if the text is not balanced.
pub fn object_spans(text: &str) -> Result<Vec<Range<usize>>, ScanError> {
    let mut stack: Vec<(u8, usize, Option<usize>)> = Vec::new();
    let mut spans: Vec<Range<usize>> = Vec::new();

    walk_code(text, 0, |i, b| {
        match b {
            b'{' | b'[' | b'(' => {
                let slot = (b == b'{').then(|| {
                    spans.push(i..i);
                    spans.len() - 1
                });
                stack.push((closer_for(b), i, slot));
            }
            b'}' | b']' | b')' => match stack.pop() {
                Some((expected, _, slot)) if expected == b => {
                    if let Some(slot) = slot {
                        spans[slot].end = i + 1;
                    }
                }
                _ => {
                    return Err(ScanError::Mismatched {
                        found: char::from(b),
                        at: i,
                    });
                }
            },
            _ => {}
        }
        Ok(ControlFlow::Continue(()))
    })?;

    if let Some(&(_, at, _)) = stack.last() {
        return Err(ScanError::Unclosed {
            open: char::from(text.as_bytes()[at]),
            at,
        });
    }
    Ok(spans)
}

/// Whether byte `pos` sits in code (not inside a literal or comment)
#[must_use]
pub fn is_code_at(text: &str, pos: usize) -> bool {
    matches!(
        walk_code(text, 0, |i, _| Ok(if i >= pos {
            ControlFlow::Break(i)
        } else {
            ControlFlow::Continue(())
        })),
        Ok(Some(i)) if i == pos
    )
}
