use encoding_rs::{Encoding, WINDOWS_1250, WINDOWS_1252};
use log::debug;
use std::borrow::Cow;

/// Decodes IMGW text files. Files are published either as UTF-8 or as
/// Windows-1250; Windows-1252 is the last resort and never fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text));
    }
    for encoding in [WINDOWS_1250, WINDOWS_1252] {
        if let Some(text) = decode_strict(encoding, bytes) {
            debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());
            return Cow::Owned(text);
        }
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    Cow::Owned(text.into_owned())
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Picks the column delimiter from a sample line, `None` meaning whitespace.
pub fn detect_delimiter(sample_line: &str) -> Option<u8> {
    [b';', b',', b'\t', b'|']
        .into_iter()
        .find(|delimiter| sample_line.as_bytes().contains(delimiter))
}

/// Replaces Polish diacritics with their ASCII base letters, keeping case.
pub fn strip_polish_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            'Ą' => 'A',
            'Ć' => 'C',
            'Ę' => 'E',
            'Ł' => 'L',
            'Ń' => 'N',
            'Ó' => 'O',
            'Ś' => 'S',
            'Ź' | 'Ż' => 'Z',
            other => other,
        })
        .collect()
}

/// Folds a label for comparison: diacritics stripped, lower-cased, whitespace removed.
///
/// `"Jelenia Góra"` and `"jeleniagora"` fold to the same key, which is also the
/// form the IMGW API expects in `/station/{name}` paths.
pub fn normalize_label(text: &str) -> String {
    strip_polish_diacritics(text)
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
