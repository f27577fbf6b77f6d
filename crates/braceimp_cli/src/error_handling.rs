use ariadne::{Color, Label, Report, ReportKind, sources};
use braceimp::{
    Error,
    error::{Expected, RuntimeError},
};

fn label_message(error: &Error) -> String {
    match error {
        Error::Lex(e) => format!("unexpected character {:?}", e.character),
        Error::Syntax(e) => match (&e.expected, &e.found) {
            (Expected::EndOfInput, Some(found)) => format!("unexpected {:?}", found),
            (expected, Some(_)) => format!("expected {} here", expected),
            (expected, None) => format!("input ended while expecting {}", expected),
        },
        Error::Runtime(e) => match e {
            RuntimeError::TypeError { left, right, .. } => {
                format!("cannot combine {} with {}", left, right)
            }
            RuntimeError::EvalError { detail, .. } => detail.clone(),
            RuntimeError::DivisionByZero { .. } => "divisor evaluated to zero".to_string(),
            RuntimeError::Overflow { op, .. } => format!("result of '{}' does not fit", op),
            RuntimeError::StringTooLong { op, limit, .. } => {
                format!("result of '{}' would be longer than {} bytes", op, limit)
            }
            RuntimeError::StepLimit { limit, .. } => {
                format!("stopped here after {} steps", limit)
            }
        },
    }
}

/// Prints one diagnostic for `error` against `src`. Errors without a span
/// (input ran out) point at the end of the source.
pub fn output_error(src: &str, file_name: String, error: &Error) {
    let range = match error.span() {
        Some(span) => span.into_range(),
        None => src.len()..src.len(),
    };

    Report::build(ReportKind::Error, (file_name.clone(), range.clone()))
        .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
        .with_message(error.to_string())
        .with_label(
            Label::new((file_name.clone(), range))
                .with_message(label_message(error))
                .with_color(Color::Red),
        )
        .finish()
        .eprint(sources([(file_name, src)]))
        .unwrap_or_else(|e| eprintln!("Failed to print diagnostic: {}", e));
}
