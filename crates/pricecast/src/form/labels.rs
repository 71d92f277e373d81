//! Human-readable labels derived from column names.

/// Title-case a string the way Python's `str.title` does: the first cased
/// character of every run is uppercased and the rest lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for ch in s.chars() {
        let cased = ch.is_alphabetic();
        if cased && prev_cased {
            out.extend(ch.to_lowercase());
        } else if cased {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_cased = cased;
    }
    out
}

/// `km_driven` -> `Km Driven`.
pub fn humanize(name: &str) -> String {
    title_case(&name.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("km_driven", "Km Driven")]
    #[case("BMW", "Bmw")]
    #[case("Mercedes-Benz", "Mercedes-Benz")]
    #[case("C-Class", "C-Class")]
    #[case("5", "5")]
    #[case("3series", "3Series")]
    #[case("seller_type", "Seller Type")]
    fn humanizes_like_python_title(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(humanize(input), expected);
    }
}
