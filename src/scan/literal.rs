//! Decoding of Go string literals

/// Decode a Go string literal, quotes included.
///
/// Interpreted literals (`"..."`) have their escape sequences resolved; raw
/// literals (`` `...` ``) are taken as-is minus carriage returns. Returns
/// `None` for malformed input or content that is not valid UTF-8.
pub fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
    {
        return Some(raw.replace('\r', ""));
    }

    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let escaped = chars.next()?;
        match escaped {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => out.push(take_hex(&mut chars, 2)? as u8),
            'u' | 'U' => {
                let digits = if escaped == 'u' { 4 } else { 8 };
                let c = char::from_u32(take_hex(&mut chars, digits)?)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            '0'..='7' => {
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }

    String::from_utf8(out).ok()
}

fn take_hex(chars: &mut impl Iterator<Item = char>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain() {
        assert_eq!(unquote(r#""Hello, world""#).as_deref(), Some("Hello, world"));
        assert_eq!(unquote(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(unquote(r#""a\tb\n""#).as_deref(), Some("a\tb\n"));
        assert_eq!(unquote(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(unquote(r#""\\""#).as_deref(), Some("\\"));
        assert_eq!(unquote(r#""été""#).as_deref(), Some("été"));
        assert_eq!(unquote(r#""\U0001F600""#).as_deref(), Some("😀"));
        assert_eq!(unquote(r#""\x41\101""#).as_deref(), Some("AA"));
        // UTF-8 spelled out byte by byte
        assert_eq!(unquote(r#""\xc3\xa9""#).as_deref(), Some("é"));
    }

    #[test]
    fn test_raw() {
        assert_eq!(unquote("`{{.Name}} \\n`").as_deref(), Some("{{.Name}} \\n"));
        assert_eq!(unquote("`a\r\nb`").as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(unquote("Hello"), None);
        assert_eq!(unquote(r#""\q""#), None);
        assert_eq!(unquote(r#""\x4""#), None);
        assert_eq!(unquote(r#""\777""#), None);
        assert_eq!(unquote(r#""\xff""#), None);
        assert_eq!(unquote(r#""\ud800""#), None);
    }
}
