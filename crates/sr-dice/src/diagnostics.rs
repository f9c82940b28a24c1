use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::DiceError;

/// Render a formula error for terminal output.
///
/// Lex and parse errors point at the offending span of the formula. Other
/// errors have no location and render as a single line.
pub fn render_formula_error(error: &DiceError) -> String {
    let (formula, span, message) = match error {
        DiceError::Lex {
            formula,
            span,
            message,
        }
        | DiceError::Parse {
            formula,
            span,
            message,
        } => (formula, span.clone(), message),
        other => return format!("error: {other}\n"),
    };

    let name = "formula";
    let mut output = Vec::new();
    Report::build(ReportKind::Error, (name, span.clone()))
        .with_message("invalid formula")
        .with_label(
            Label::new((name, span))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .write((name, Source::from(formula.as_str())), &mut output)
        .ok();

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::Roll;

    #[test]
    fn parse_errors_point_into_formula() {
        let err = Roll::parse("1d20 + * 3").unwrap_err();
        let output = render_formula_error(&err);
        assert!(output.contains("invalid formula"));
        assert!(output.contains("1d20 + * 3"));
    }

    #[test]
    fn unlocated_errors_render_one_line() {
        let output = render_formula_error(&DiceError::InvalidDie(0));
        assert_eq!(output, "error: invalid die: d0\n");
    }
}
