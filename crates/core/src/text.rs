//! Spanish-aware text helpers for name matching and ordering

use std::cmp::Ordering;

/// Lowercase and strip diacritics, keeping `ñ` distinct from `n`.
fn fold_char(c: char, out: &mut String) {
    let folded = match c {
        'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
        'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => {
            // sorts between "nz" and "o"
            out.push('n');
            out.push('~');
            return;
        }
        other => {
            out.extend(other.to_lowercase());
            return;
        }
    };
    out.push(folded);
}

/// Build the primary collation key for a string
pub fn collation_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        fold_char(c, &mut out);
    }
    out
}

/// Compare two names the way a Spanish-locale sort would.
///
/// Accents and case are ignored at the first level; ties fall back to the
/// raw strings so "Lima" sorts before "Límá".
pub fn compare_es(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Normalize user-provided text for equality matching.
///
/// Trims, collapses inner whitespace, lowercases and strips accents.
/// Unlike [`collation_key`] this treats `ñ` as `n`, since users often type
/// "Brena" for "Breña".
pub fn match_key(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collation_key(&collapsed).replace("n~", "n")
}

/// Return `Some(trimmed)` when the value has visible content
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_insensitive_match() {
        assert_eq!(match_key("  Jesús   María "), "jesus maria");
        assert_eq!(match_key("BREÑA"), match_key("brena"));
        assert_eq!(match_key("Rímac"), "rimac");
    }

    #[test]
    fn test_spanish_ordering() {
        let mut names = vec!["Surquillo", "Ñaña", "Ate", "Ancón", "Nazca", "Oyón"];
        names.sort_by(|a, b| compare_es(a, b));
        assert_eq!(names, vec!["Ancón", "Ate", "Nazca", "Ñaña", "Oyón", "Surquillo"]);
    }

    #[test]
    fn test_plain_before_accented_on_tie() {
        assert_eq!(compare_es("Lima", "Límá"), Ordering::Less);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" 8 ")), Some("8"));
    }
}
