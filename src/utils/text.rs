use once_cell::sync::Lazy;
use regex::Regex;

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\u([0-9a-fA-F]{4})").expect("unicode escape pattern is valid")
});

pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Repairs text the upstream double-encoded: literal `\uXXXX` escapes and
/// UTF-8 bytes re-read as Latin-1/Windows-1252 ("CafÃ©"). Any failure
/// returns the input unchanged.
pub fn decode_best_effort(text: &str) -> String {
    let unescaped = unescape_unicode(text).unwrap_or_else(|| text.to_string());
    reinterpret_as_utf8(&unescaped).unwrap_or(unescaped)
}

fn unescape_unicode(text: &str) -> Option<String> {
    if !UNICODE_ESCAPE.is_match(text) {
        return None;
    }
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut last = 0;
    for caps in UNICODE_ESCAPE.captures_iter(text) {
        let whole = caps.get(0)?;
        units.extend(text[last..whole.start()].encode_utf16());
        units.push(u16::from_str_radix(&caps[1], 16).ok()?);
        last = whole.end();
    }
    units.extend(text[last..].encode_utf16());
    String::from_utf16(&units).ok()
}

fn reinterpret_as_utf8(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        bytes.push(to_single_byte(ch)?);
    }
    let repaired = String::from_utf8(bytes).ok()?;
    (repaired != text).then_some(repaired)
}

/// Byte a character occupies in Windows-1252 (a Latin-1 superset), if any.
fn to_single_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    if code < 0x80 || (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        // C1 controls survive some decoders untouched.
        '\u{80}'..='\u{9F}' => code as u8,
        _ => return None,
    };
    Some(byte)
}
