//! Deterministic slugification.
//!
//! A slug is lowercase ASCII made of `[a-z0-9_-]`. Runs of other characters
//! collapse into a single `-`, and leading or trailing `-`/`_` are trimmed,
//! so `"__run"` becomes `"run"` and `"Build & Test"` becomes `"build-test"`.
//! Slugifying a slug returns it unchanged.

/// Render `input` as a slug.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars().flat_map(char::to_lowercase) {
        match transliterate(c) {
            Some(ascii) => out.push_str(ascii),
            None if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            None => {
                if !out.ends_with('-') {
                    out.push('-');
                }
            }
        }
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'ä' | 'æ' => "ae",
        'ö' | 'œ' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' => "a",
        'ç' | 'ć' | 'č' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' => "o",
        'ù' | 'ú' | 'û' => "u",
        'ý' | 'ÿ' => "y",
        'ł' => "l",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        _ => return None,
    };
    Some(ascii)
}
