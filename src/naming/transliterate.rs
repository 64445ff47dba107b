//! Accented character to ASCII transliteration

/// Replacement for a single character, or `None` if it passes through.
fn replacement(c: char) -> Option<&'static str> {
    let s = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'é' | 'è' | 'ê' => "e",
        'à' | 'á' | 'â' => "a",
        'ç' => "c",
        'ñ' => "n",
        _ => return None,
    };
    Some(s)
}

/// Replace every character found in the transliteration table by its ASCII
/// equivalent. Characters outside the table are kept as they are.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match replacement(c) {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }
    out
}
