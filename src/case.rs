//! Tag-name case conversion.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CAMEL_BOUNDARY_RE: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// Lower-case a name, inserting `-` at lower/upper boundaries.
///
/// `MyWidget` becomes `my-widget`; already-dashed names pass through.
pub fn dash_case(name: &str) -> String {
    CAMEL_BOUNDARY_RE
        .replace_all(name, "$1-$2")
        .to_lowercase()
}

/// Join `-`/`_`/whitespace-separated words into a camelCase identifier.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let words = name
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty());
    for (i, word) in words.enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_case_splits_camel_boundaries() {
        assert_eq!(dash_case("MyWidget"), "my-widget");
        assert_eq!(dash_case("Show"), "show");
        assert_eq!(dash_case("div"), "div");
        assert_eq!(dash_case("my-tag"), "my-tag");
    }

    #[test]
    fn camel_case_joins_dashed_words() {
        assert_eq!(camel_case("on-div-3f2a-click"), "onDiv3f2aClick");
        assert_eq!(camel_case("on_change"), "onChange");
        assert_eq!(camel_case("click"), "click");
        assert_eq!(camel_case(""), "");
    }
}
