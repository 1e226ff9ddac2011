/// Target surface for [`format_math`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupStyle {
    Html,
    Plain,
}

/// Renders the feed's ASCII math shorthands.
///
/// `<=` and `>=` become `≦` and `≧`; `^2` becomes a superscript two.
#[must_use]
pub fn format_math(text: &str, style: MarkupStyle) -> String {
    let squared = match style {
        MarkupStyle::Html => "<sup>2</sup>",
        MarkupStyle::Plain => "²",
    };
    text.replace("<=", "≦")
        .replace(">=", "≧")
        .replace("^2", squared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_inequalities_and_squares() {
        assert_eq!(
            format_math("x^2 <= 4 and y >= 0", MarkupStyle::Html),
            "x<sup>2</sup> ≦ 4 and y ≧ 0"
        );
        assert_eq!(format_math("a^2+b^2", MarkupStyle::Plain), "a²+b²");
    }

    #[test]
    fn leaves_other_text_alone() {
        assert_eq!(format_math("x^3 < 1", MarkupStyle::Plain), "x^3 < 1");
    }
}
