use crate::error::SqliteAccessError;

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    Bracketed,
    LineComment,
    BlockComment,
}

/// One `?` / `?NNN` marker found outside quotes and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Placeholder {
    /// Byte range of the marker in the template.
    pub(super) start: usize,
    pub(super) end: usize,
    /// Zero-based index into the value list.
    pub(super) value_index: usize,
}

/// True when the two bytes at `idx` are exactly `pair`.
fn pair_at(bytes: &[u8], idx: usize, pair: &[u8; 2]) -> bool {
    bytes.get(idx..idx + 2) == Some(&pair[..])
}

fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}

/// Locate every placeholder, left to right.
///
/// Bare `?` markers take the next value in order; `?NNN` takes value NNN (1-based).
///
/// # Errors
/// Returns `InvalidArgument` for a numbered marker that is zero or too large.
pub(super) fn find_placeholders(sql: &str) -> Result<Vec<Placeholder>, SqliteAccessError> {
    let bytes = sql.as_bytes();
    let mut found = Vec::new();
    let mut state = State::Normal;
    let mut next_sequential = 0usize;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                b'[' => state = State::Bracketed,
                _ if pair_at(bytes, idx, b"--") => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if pair_at(bytes, idx, b"/*") => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b'?' => {
                    let (end, value_index) = match scan_digits(bytes, idx + 1) {
                        Some((end, digits)) => match digits.parse::<usize>() {
                            Ok(n) if n > 0 => (end, n - 1),
                            _ => {
                                return Err(SqliteAccessError::InvalidArgument(format!(
                                    "invalid placeholder ?{digits}"
                                )));
                            }
                        },
                        None => {
                            let i = next_sequential;
                            next_sequential += 1;
                            (idx + 1, i)
                        }
                    };
                    found.push(Placeholder {
                        start: idx,
                        end,
                        value_index,
                    });
                    idx = end;
                    continue;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::Backticked => {
                let quote = match state {
                    State::SingleQuoted => b'\'',
                    State::DoubleQuoted => b'"',
                    _ => b'`',
                };
                if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if pair_at(bytes, idx, b"*/") {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    Ok(found)
}
