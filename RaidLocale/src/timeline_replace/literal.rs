//! String literal codec for table keys and values
//!
//! Keys and values are held as the string a literal denotes. Reading
//! understands the usual backslash escapes; writing always produces a
//! single-quoted literal that escapes only `\` and `'`.

/// Decode the body of a quoted literal (quotes already stripped)
#[must_use]
pub fn decode(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('u') => {
                if let Some(decoded) = decode_unicode(&mut chars) {
                    out.push(decoded);
                } else {
                    out.push('u');
                }
            }
            // `\\`, `\'`, `\"` and any other escaped character denote themselves
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// `\uXXXX` or `\u{X..}`, with the `\u` already consumed
fn decode_unicode(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    let mut hex = String::new();
    if chars.peek() == Some(&'{') {
        let mut lookahead = chars.clone();
        lookahead.next();
        for c in lookahead.by_ref() {
            if c == '}' {
                break;
            }
            hex.push(c);
        }
        let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
        *chars = lookahead;
        return Some(decoded);
    }

    let lookahead: String = chars.clone().take(4).collect();
    if lookahead.len() != 4 {
        return None;
    }
    let decoded = u32::from_str_radix(&lookahead, 16).ok().and_then(char::from_u32)?;
    for _ in 0..4 {
        chars.next();
    }
    Some(decoded)
}

/// Encode `value` as the body of a single-quoted literal
#[must_use]
pub fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// `value` as a complete single-quoted literal
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", encode(value))
}
