use alloc::string::{String, ToString};

use crate::{ast, hir};

/// An error that occurred while compiling a regular expression.
///
/// Errors are only ever produced when building a [`Regex`](crate::Regex) or
/// a [`RegexSet`](crate::RegexSet). Searching never fails.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The pattern is malformed: unbalanced groups, bad escapes, invalid
    /// repetition bounds, invalid class syntax, duplicate capture names and
    /// the like. The message includes the pattern with the offending span
    /// marked.
    Syntax(String),
    /// The pattern is well formed but one of its constructs has no meaning,
    /// for example an unknown Unicode property or a construct that could
    /// match invalid UTF-8.
    Translate(String),
    /// The compiled program exceeded the configured size limit. The value
    /// is the limit, in bytes.
    ProgramTooLarge(usize),
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Error::Syntax(ref msg) | Error::Translate(ref msg) => {
                write!(f, "{}", msg)
            }
            Error::ProgramTooLarge(limit) => write!(
                f,
                "compiled regex exceeds size limit of {} bytes",
                limit
            ),
        }
    }
}

impl From<ast::Error> for Error {
    fn from(err: ast::Error) -> Error {
        Error::Syntax(err.to_string())
    }
}

impl From<hir::Error> for Error {
    fn from(err: hir::Error) -> Error {
        Error::Translate(err.to_string())
    }
}

/// Renders an error message with the pattern and a caret line pointing at
/// `span`. Shared by parse and translation errors.
///
/// Only the line of the pattern containing the start of the span is shown.
pub(crate) fn render(
    f: &mut core::fmt::Formatter,
    header: &str,
    pattern: &str,
    span: &ast::Span,
    msg: &dyn core::fmt::Display,
) -> core::fmt::Result {
    let start = span.start.min(pattern.len());
    let line_start = pattern[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end =
        pattern[start..].find('\n').map_or(pattern.len(), |i| start + i);
    let line = &pattern[line_start..line_end];
    let column = pattern[line_start..start].chars().count();
    let end = span.end.clamp(start, line_end);
    let width = core::cmp::max(1, pattern[start..end].chars().count());

    writeln!(f, "{}:", header)?;
    writeln!(f, "    {}", line)?;
    write!(f, "    ")?;
    for _ in 0..column {
        write!(f, " ")?;
    }
    for _ in 0..width {
        write!(f, "^")?;
    }
    writeln!(f)?;
    write!(f, "error: {}", msg)
}

#[cfg(test)]
mod tests {
    use crate::Regex;

    use super::Error;

    #[test]
    fn syntax_error_marks_span() {
        let err = Regex::new("a{2,1}").unwrap_err();
        let msg = match err {
            Error::Syntax(msg) => msg,
            err => panic!("expected syntax error, got {:?}", err),
        };
        let expected = "\
regex parse error:
    a{2,1}
     ^^^^^
error: invalid repetition range, the start must be <= the end";
        assert_eq!(expected, msg);
    }

    #[test]
    fn translate_error_kind() {
        let err = Regex::new(r"\p{NotAProperty}").unwrap_err();
        assert!(matches!(err, Error::Translate(_)), "{:?}", err);
    }

    #[test]
    fn too_big_display() {
        let err = Error::ProgramTooLarge(100);
        assert_eq!(
            "compiled regex exceeds size limit of 100 bytes",
            err.to_string()
        );
    }
}
