// src/slug.rs
//! URL slugs for products and categories.

use uuid::Uuid;

/// Builds a slug from a display name: lowercase ASCII words joined by `-`.
/// Vietnamese diacritics are folded to their base letters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = fold_diacritic(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// A slug is valid when it is non-empty, lowercase ASCII alphanumerics and
/// single dashes, with no leading or trailing dash.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Decides whether `slug` is taken for the record being saved.
///
/// `owner` is the id of the record that currently holds the slug, if any.
/// `editing` is `None` when creating and `Some(id)` when updating `id`.
pub fn slug_taken(owner: Option<Uuid>, editing: Option<Uuid>) -> bool {
    match (owner, editing) {
        (None, _) => false,
        (Some(owner), Some(editing)) => owner != editing,
        (Some(_), None) => true,
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' | 'ë' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' | 'ï' | 'î' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' | 'ö' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' | 'ü' | 'û' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' | 'ÿ' => 'y',
        'đ' => 'd',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_vietnamese_titles() {
        assert_eq!(slugify("Mừng cậu trở về"), "mung-cau-tro-ve");
        assert_eq!(slugify("Đất rừng phương Nam"), "dat-rung-phuong-nam");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Light   novel!! "), "light-novel");
        assert_eq!(slugify("C++ -- Primer (5th ed.)"), "c-primer-5th-ed");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn slugify_output_is_valid() {
        for name in ["Manga", "Comic Vol. 2", "Tôi thấy hoa vàng trên cỏ xanh"] {
            assert!(is_valid_slug(&slugify(name)), "{name}");
        }
    }

    #[test]
    fn validity_rules() {
        assert!(is_valid_slug("light-novel"));
        assert!(is_valid_slug("abc123"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-lead"));
        assert!(!is_valid_slug("trail-"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("Upper"));
        assert!(!is_valid_slug("with space"));
    }

    #[test]
    fn free_slug_is_never_taken() {
        assert!(!slug_taken(None, None));
        assert!(!slug_taken(None, Some(Uuid::new_v4())));
    }

    #[test]
    fn create_rejects_existing_slug() {
        assert!(slug_taken(Some(Uuid::new_v4()), None));
    }

    #[test]
    fn update_keeps_its_own_slug_but_not_anothers() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(!slug_taken(Some(me), Some(me)));
        assert!(slug_taken(Some(other), Some(me)));
    }
}
