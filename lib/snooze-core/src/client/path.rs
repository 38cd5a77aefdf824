use std::fmt::Display;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::warn;

use super::SnoozeError;

/// Regular expression for matching positional placeholders in the format `{0}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<index>\d+)}").expect("a valid regex"));

/// Everything but the RFC 3986 unreserved characters.
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_path_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_VALUE).to_string()
}

fn replace_placeholder(path: &str, index: usize, value: &str) -> String {
    let pattern = format!("{{{index}}}");
    path.replace(&pattern, value)
}

/// The arguments of one endpoint call.
///
/// Scalar arguments are kept with their position in the method signature and
/// substituted into the `{position}` placeholders of the path template.
/// At most one structured argument is kept as the request body.
///
/// # Example
///
/// ```rust
/// use snooze_core::Arguments;
///
/// let arguments = Arguments::without_body().path(0, 42).path(1, "a b");
/// let path = arguments.resolve_path("/users/{0}/posts/{1}")?;
/// assert_eq!(path, "/users/42/posts/a%20b");
/// # Ok::<(), snooze_core::SnoozeError>(())
/// ```
#[derive(derive_more::Debug)]
pub struct Arguments<'a, B> {
    path: Vec<(usize, String)>,
    #[debug(skip)]
    body: Option<&'a B>,
}

impl Arguments<'static, ()> {
    /// Arguments of a call without request body.
    #[must_use]
    pub fn without_body() -> Self {
        Self {
            path: Vec::new(),
            body: None,
        }
    }
}

impl<'a, B> Arguments<'a, B> {
    /// Arguments of a call sending `body` as request body.
    ///
    /// The body is ignored for `GET` endpoints.
    #[must_use]
    pub fn with_body(body: &'a B) -> Self {
        Self {
            path: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds the scalar argument at `position` in the method signature.
    #[must_use]
    pub fn path(mut self, position: usize, value: impl Display) -> Self {
        self.path.push((position, value.to_string()));
        self
    }

    pub(super) fn body(&self) -> Option<&'a B> {
        self.body
    }

    /// Substitutes the path arguments into `template`.
    ///
    /// Each `{position}` token is replaced by the percent-encoded argument value.
    ///
    /// # Errors
    ///
    /// Returns [`SnoozeError::PathUnresolved`] if a placeholder has no matching argument,
    /// [`SnoozeError::DotSegment`] if an argument is `.` or `..`.
    ///
    /// Only numeric `{n}` tokens are placeholders here, other braces are kept as is.
    /// The `#[service]` macro is stricter and rejects non-numeric tokens at compile time.
    pub fn resolve_path(&self, template: &str) -> Result<String, SnoozeError> {
        let mut path = template.to_string();
        for (position, value) in &self.path {
            if value == "." || value == ".." {
                return Err(SnoozeError::DotSegment {
                    position: *position,
                    value: value.clone(),
                });
            }
            let replaced = replace_placeholder(&path, *position, &encode_path_value(value));
            if replaced == path {
                warn!(%position, %template, "argument position not found in path");
            }
            path = replaced;
        }

        let missings: Vec<String> = RE
            .captures_iter(&path)
            .filter_map(|caps| caps.name("index"))
            .map(|it| it.as_str().to_string())
            .collect();
        if !missings.is_empty() {
            return Err(SnoozeError::PathUnresolved { path, missings });
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn should_resolve_positional_placeholders() {
        let arguments = Arguments::without_body().path(0, 42).path(1, "a b");

        let path = arguments
            .resolve_path("/users/{0}/posts/{1}")
            .expect("resolved");

        assert_eq!(path, "/users/42/posts/a%20b");
    }

    #[test]
    fn should_replace_repeated_placeholder() {
        let arguments = Arguments::without_body().path(0, 7);

        let path = arguments.resolve_path("/test/{0}/{0}").expect("resolved");

        assert_eq!(path, "/test/7/7");
    }

    #[test]
    fn should_keep_position_when_body_comes_first() {
        let body = "ignored";
        let arguments = Arguments::with_body(&body).path(1, "bob");

        let path = arguments.resolve_path("/users/{1}").expect("resolved");

        assert_eq!(path, "/users/bob");
        assert_eq!(arguments.body(), Some(&"ignored"));
    }

    #[test]
    fn should_not_touch_path_without_placeholder() {
        let path = Arguments::without_body()
            .resolve_path("/health")
            .expect("resolved");

        assert_eq!(path, "/health");
    }

    #[test]
    fn should_fail_on_unresolved_placeholder() {
        let arguments = Arguments::without_body().path(0, 1);

        let result = arguments.resolve_path("/users/{0}/posts/{1}");

        insta::assert_debug_snapshot!(result, @r#"
        Err(
            PathUnresolved {
                path: "/users/1/posts/{1}",
                missings: [
                    "1",
                ],
            },
        )
        "#);
    }

    #[rstest]
    #[case::current(".")]
    #[case::parent("..")]
    fn should_reject_dot_segment_argument(#[case] value: &str) {
        let arguments = Arguments::without_body().path(0, value);

        let result = arguments.resolve_path("/users/{0}/posts");

        match result {
            Err(SnoozeError::DotSegment { position, value: rejected }) => {
                assert_eq!(position, 0);
                assert_eq!(rejected, value);
            }
            other => panic!("expected DotSegment, got {other:?}"),
        }
    }

    #[test]
    fn should_keep_dots_inside_argument() {
        let arguments = Arguments::without_body().path(0, "...").path(1, "v1.2");

        let path = arguments.resolve_path("/{0}/{1}").expect("resolved");

        assert_eq!(path, "/.../v1.2");
    }

    #[rstest]
    #[case::space("a b", "a%20b")]
    #[case::slash("a/b", "a%2Fb")]
    #[case::unreserved("a-b.c_d~e", "a-b.c_d~e")]
    #[case::question("what?", "what%3F")]
    #[case::unicode("café", "caf%C3%A9")]
    #[case::plus("1+1", "1%2B1")]
    fn should_encode_path_value(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(encode_path_value(value), expected);
    }
}
