//! Field-name inflections used to line local names up with remote titles
//!
//! Local fields are usually `snake_case` (or `CamelCase`) while form titles
//! are written for people: `receipt_no` lives in the form as `Receipt No`.
//! [`underscore`] and [`humanize`] go from a local name to a candidate title,
//! [`slug`] goes back from a title to a local-looking name.

use regex::Regex;
use std::sync::OnceLock;

static NON_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

/// `ReceiptNo` → `receipt_no`
///
/// An underscore goes in front of every ASCII capital that follows a word
/// character, then the whole string is lowercased. Already-underscored input
/// passes through unchanged.
pub fn underscore(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut prev: Option<char> = None;

    for c in word.chars() {
        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_alphanumeric() || p == '_' {
                    out.push('_');
                }
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out.to_lowercase()
}

/// `receipt_no` → `Receipt No`
///
/// Underscores become spaces and the first letter of every word is
/// uppercased. The rest of each word is left alone.
pub fn humanize(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;

    for c in word.chars() {
        let c = if c == '_' { ' ' } else { c };
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }

    out
}

/// `Name First` → `Name_First`
///
/// Accented Latin letters are transliterated, anything that is not a letter,
/// digit or whitespace turns into a space, whitespace runs collapse to a
/// single `_`, and leading or trailing `_` are trimmed.
pub fn slug(text: &str) -> String {
    let non_word = NON_WORD_REGEX.get_or_init(|| {
        Regex::new(r"[^\s\p{Ll}\p{Lm}\p{Lo}\p{Lt}\p{Lu}\p{Nd}]").expect("static pattern")
    });
    let whitespace = WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));

    let transliterated = transliterate(text);
    let spaced = non_word.replace_all(&transliterated, " ");
    let joined = whitespace.replace_all(&spaced, "_");

    joined.trim_matches('_').to_string()
}

/// `lower(slug(title))`: the local field name a remote title maps back to
pub fn field_name_for_title(title: &str) -> String {
    slug(title).to_lowercase()
}

/// `humanize(underscore(field))`: the remote title a local field most likely has
pub fn title_for_field_name(field: &str) -> String {
    humanize(&underscore(field))
}

fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ä' | 'æ' | 'ǽ' => out.push_str("ae"),
            'ö' | 'œ' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'Æ' | 'Ǽ' => out.push_str("AE"),
            'Œ' => out.push_str("OE"),
            'ß' => out.push_str("ss"),
            'À' | 'Á' | 'Â' | 'Ã' | 'Å' | 'Ǻ' | 'Ā' | 'Ă' | 'Ą' | 'Ǎ' => out.push('A'),
            'à' | 'á' | 'â' | 'ã' | 'å' | 'ǻ' | 'ā' | 'ă' | 'ą' | 'ǎ' | 'ª' => out.push('a'),
            'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => out.push('C'),
            'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => out.push('c'),
            'Ð' | 'Ď' | 'Đ' => out.push('D'),
            'ð' | 'ď' | 'đ' => out.push('d'),
            'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => out.push('E'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => out.push('e'),
            'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => out.push('G'),
            'ĝ' | 'ğ' | 'ġ' | 'ģ' => out.push('g'),
            'Ĥ' | 'Ħ' => out.push('H'),
            'ĥ' | 'ħ' => out.push('h'),
            'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Ǐ' | 'Į' | 'İ' => out.push('I'),
            'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'ǐ' | 'į' | 'ı' => out.push('i'),
            'Ĵ' => out.push('J'),
            'ĵ' => out.push('j'),
            'Ķ' => out.push('K'),
            'ķ' => out.push('k'),
            'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => out.push('L'),
            'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => out.push('l'),
            'Ñ' | 'Ń' | 'Ņ' | 'Ň' => out.push('N'),
            'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' => out.push('n'),
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ō' | 'Ŏ' | 'Ǒ' | 'Ő' | 'Ơ' | 'Ø' | 'Ǿ' => out.push('O'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ō' | 'ŏ' | 'ǒ' | 'ő' | 'ơ' | 'ø' | 'ǿ' | 'º' => out.push('o'),
            'Ŕ' | 'Ŗ' | 'Ř' => out.push('R'),
            'ŕ' | 'ŗ' | 'ř' => out.push('r'),
            'Ś' | 'Ŝ' | 'Ş' | 'Š' => out.push('S'),
            'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' => out.push('s'),
            'Ţ' | 'Ť' | 'Ŧ' => out.push('T'),
            'ţ' | 'ť' | 'ŧ' => out.push('t'),
            'Ù' | 'Ú' | 'Û' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' | 'Ư' | 'Ǔ' | 'Ǖ' | 'Ǘ' | 'Ǚ'
            | 'Ǜ' => out.push('U'),
            'ù' | 'ú' | 'û' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' | 'ǔ' | 'ǖ' | 'ǘ' | 'ǚ'
            | 'ǜ' => out.push('u'),
            'Ý' | 'Ÿ' | 'Ŷ' => out.push('Y'),
            'ý' | 'ÿ' | 'ŷ' => out.push('y'),
            'Ŵ' => out.push('W'),
            'ŵ' => out.push('w'),
            'Ź' | 'Ż' | 'Ž' => out.push('Z'),
            'ź' | 'ż' | 'ž' => out.push('z'),
            'Ĳ' => out.push_str("IJ"),
            'ĳ' => out.push_str("ij"),
            'ƒ' => out.push('f'),
            _ => out.push(c),
        }
    }
    out
}
