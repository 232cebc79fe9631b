//! Header text normalization used before matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a raw header into a matching key.
///
/// Turkish `İ`, `I` and `ı` fold to `i` before anything else, since generic
/// lowercasing turns `İ` into `i` followed by a combining dot. The remaining
/// Turkish letters fold to their ASCII base, leftover combining marks are
/// stripped, then the text is lowercased, whitespace runs collapse to one
/// space, and the ends are trimmed.
pub fn normalize_header(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .map(fold_turkish)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    collapse_whitespace(&folded)
}

fn fold_turkish(c: char) -> char {
    match c {
        'İ' | 'I' | 'ı' => 'i',
        'Ğ' | 'ğ' => 'g',
        'Ü' | 'ü' => 'u',
        'Ş' | 'ş' => 's',
        'Ö' | 'ö' => 'o',
        'Ç' | 'ç' => 'c',
        other => other,
    }
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_and_dotless_i() {
        assert_eq!(normalize_header("İ"), "i");
        assert_eq!(normalize_header("I"), "i");
        assert_eq!(normalize_header("ı"), "i");
        assert_eq!(normalize_header("i"), "i");
        // Decomposed capital I with combining dot above.
        assert_eq!(normalize_header("I\u{307}"), "i");
    }

    #[test]
    fn test_turkish_letters() {
        assert_eq!(normalize_header("İşveren"), "isveren");
        assert_eq!(normalize_header("Proje Türü"), "proje turu");
        assert_eq!(normalize_header("Müşavir"), "musavir");
        assert_eq!(normalize_header("YÜKLENİCİ"), "yuklenici");
        assert_eq!(normalize_header("Başlangıç Tarihi"), "baslangic tarihi");
        assert_eq!(normalize_header("Görev Ğ"), "gorev g");
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(normalize_header("  Proje \t  Adı \n"), "proje adi");
        assert_eq!(normalize_header("   "), "");
        assert_eq!(normalize_header(""), "");
    }

    #[test]
    fn test_other_diacritics_stripped() {
        assert_eq!(normalize_header("Café"), "cafe");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["Proje Adı", "İŞVEREN", "  Lokasyon  "] {
            let once = normalize_header(raw);
            assert_eq!(normalize_header(&once), once);
        }
    }
}
