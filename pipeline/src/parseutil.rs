use lazy_regex::{regex_find, regex_replace_all};

/// Trims a string and collapses each run of whitespace within it, including a lone line break
/// in a wrapped cell, to a single space, in-place.
pub fn clean_text(s: &mut String) {
    let trimmed = s.trim();
    // Skip the copy/realloc if nothing to do.
    if trimmed.len() != s.len() || regex_find!(r"\s{2,}|[^\S ]", &trimmed).is_some() {
        let new = regex_replace_all!(r"\s+", trimmed, " ");
        *s = new.to_string();
    }
}

/// Replaces full-width parentheses with their ASCII forms. The reports mix both forms within
/// otherwise identical product names.
pub fn normalize_parens(s: &str) -> String {
    s.replace('（', "(").replace('）', ")")
}

#[cfg(test)]
mod tests {
    use googletest::{assert_that, matchers::eq};

    use super::*;

    #[test]
    fn test_clean_text() {
        let mut s = "  自己取引計 \n  売り ".to_string();
        clean_text(&mut s);
        assert_that!(s, eq("自己取引計 売り"));

        let mut wrapped = "法人\n内訳\tA".to_string();
        clean_text(&mut wrapped);
        assert_that!(wrapped, eq("法人 内訳 A"));

        let mut unchanged = "1,234 5".to_string();
        clean_text(&mut unchanged);
        assert_that!(unchanged, eq("1,234 5"));
    }

    #[test]
    fn test_normalize_parens() {
        assert_that!(
            normalize_parens("長期国債先物（現金決済型ミニ）"),
            eq("長期国債先物(現金決済型ミニ)")
        );
        assert_that!(
            normalize_parens("JGB(10-year) Futures"),
            eq("JGB(10-year) Futures")
        );
    }
}
