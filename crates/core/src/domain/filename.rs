use std::borrow::Cow;

/// Recovers a UTF-8 file name that was decoded one byte per character.
///
/// Multipart file names from browsers are UTF-8 bytes, but some layers read
/// them as Latin-1, turning `日本語.txt` into `æ\u{97}¥æ\u{9c}¬è\u{aa}\u{9e}.txt`.
/// When every character fits in a byte and those bytes form valid UTF-8,
/// the UTF-8 reading is returned. Anything else is already proper text and
/// is returned untouched.
pub fn decode_legacy_filename(raw: &str) -> Cow<'_, str> {
    if raw.is_ascii() {
        return Cow::Borrowed(raw);
    }

    let mut bytes = Vec::with_capacity(raw.len());
    for ch in raw.chars() {
        let Ok(byte) = u8::try_from(u32::from(ch)) else {
            return Cow::Borrowed(raw);
        };
        bytes.push(byte);
    }

    match String::from_utf8(bytes) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(raw),
    }
}
