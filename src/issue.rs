//! The normalized issue value shared by every tracker adapter.
//!
//! An [`Issue`] is a read-only snapshot: built once at fetch or copy time and
//! never mutated afterwards. Identity is exact title equality alone; see
//! [`Issue::matches`].

use anyhow::{bail, Result};

/// One unit of trackable work, normalized across tracker backends.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Tracker-assigned identifier. Opaque, never used for identity; `None`
    /// for issues that are not materialized in any tracker yet.
    pub id: Option<String>,
    /// Normalized single-line title. The only identity field.
    pub title: String,
    /// Descriptive text. Adapters append a source-attribution footer at fetch
    /// time so copies name where they came from.
    pub body: String,
    /// Status flag. Closed issues are counted during a sync but never copied.
    pub closed: bool,
}

/// A value supplied for one field in [`Issue::from_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl FieldValue {
    fn into_text(self, field: &str) -> Result<String> {
        match self {
            FieldValue::Text(text) => Ok(text),
            FieldValue::Flag(_) => bail!("Issue field `{field}` takes text, not a flag"),
        }
    }

    fn into_flag(self, field: &str) -> Result<bool> {
        match self {
            FieldValue::Flag(flag) => Ok(flag),
            FieldValue::Text(_) => bail!("Issue field `{field}` takes a flag, not text"),
        }
    }
}

impl Issue {
    /// Builds an issue from a set of named initial field values.
    ///
    /// Only `id`, `title`, `body` and `closed` are legal names; anything else
    /// fails immediately instead of being stored. `title` is mandatory.
    /// `closed` defaults to `false`, `body` to empty. If a name repeats, the
    /// last value wins.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let mut id = None;
        let mut title = None;
        let mut body = None;
        let mut closed = false;

        for (name, value) in fields {
            match name {
                "id" => id = Some(value.into_text("id")?),
                "title" => title = Some(value.into_text("title")?),
                "body" => body = Some(value.into_text("body")?),
                "closed" => closed = value.into_flag("closed")?,
                other => {
                    bail!("Unknown issue field `{other}` (expected id, title, body or closed)")
                }
            }
        }

        let Some(title) = title else {
            bail!("Issue is missing the mandatory `title` field");
        };

        Ok(Self {
            id,
            title,
            body: body.unwrap_or_default(),
            closed,
        })
    }

    /// Tests whether `other` is the same logical issue.
    ///
    /// Identity is exact string equality of the titles and nothing else:
    /// `id`, `body` and `closed` never participate. Two unrelated issues with
    /// the same title collapse into one; titles differing in case or in
    /// whitespace beyond the fetch-time collapsing stay distinct.
    pub fn matches(&self, other: &Issue) -> bool {
        self.title == other.title
    }
}

/// Collapses every internal whitespace run to a single space and trims the
/// ends. Adapters apply this to titles at fetch time so that line breaks and
/// padding coming from one backend do not defeat the title identity rule.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn issue(title: &str) -> Issue {
        Issue {
            id: None,
            title: title.to_string(),
            body: String::new(),
            closed: false,
        }
    }

    #[test]
    fn test_identity_is_title_only() {
        let a = Issue {
            id: Some("77".to_string()),
            title: "Crash on empty input".to_string(),
            body: "steps to reproduce".to_string(),
            closed: false,
        };
        let b = Issue {
            id: Some("1234".to_string()),
            title: "Crash on empty input".to_string(),
            body: "completely different text".to_string(),
            closed: true,
        };

        assert!(a.matches(&b));
        assert!(b.matches(&a));
    }

    #[test]
    fn test_identity_is_exact() {
        assert!(!issue("Bug 1").matches(&issue("bug 1")));
        assert!(!issue("Bug 1").matches(&issue("Bug 1 ")));
        assert!(!issue("Bug 1").matches(&issue("Bug 2")));
    }

    #[test]
    fn test_from_fields_builds_full_issue() {
        let built = Issue::from_fields([
            ("id", FieldValue::from("42")),
            ("title", FieldValue::from("Bug 1")),
            ("body", FieldValue::from("details")),
            ("closed", FieldValue::from(true)),
        ])
        .unwrap();

        assert_eq!(built.id.as_deref(), Some("42"));
        assert_eq!(built.title, "Bug 1");
        assert_eq!(built.body, "details");
        assert!(built.closed);
    }

    #[test]
    fn test_from_fields_defaults_optional_fields() {
        let built = Issue::from_fields([("title", FieldValue::from("Bug 1"))]).unwrap();

        assert_eq!(built.id, None);
        assert_eq!(built.body, "");
        assert!(!built.closed);
    }

    #[test]
    fn test_from_fields_rejects_unknown_field() {
        let err = Issue::from_fields([
            ("title", FieldValue::from("Bug 1")),
            ("priority", FieldValue::from("high")),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("Unknown issue field `priority`"));
    }

    #[test]
    fn test_from_fields_requires_title() {
        let err = Issue::from_fields([("body", FieldValue::from("orphaned text"))]).unwrap_err();

        assert!(err.to_string().contains("mandatory `title`"));
    }

    #[test]
    fn test_from_fields_rejects_mistyped_values() {
        let err = Issue::from_fields([("closed", FieldValue::from("yes"))]).unwrap_err();
        assert!(err.to_string().contains("`closed`"));

        let err = Issue::from_fields([("title", FieldValue::from(true))]).unwrap_err();
        assert!(err.to_string().contains("`title`"));
    }

    #[test]
    fn test_from_fields_keeps_last_value_on_repeat() {
        let built = Issue::from_fields([
            ("title", FieldValue::from("first")),
            ("title", FieldValue::from("second")),
        ])
        .unwrap();

        assert_eq!(built.title, "second");
    }

    #[test]
    fn test_normalize_title_collapses_whitespace() {
        assert_eq!(normalize_title("  Crash \t on\nempty   input "), "Crash on empty input");
        assert_eq!(normalize_title("already clean"), "already clean");
        assert_eq!(normalize_title("   "), "");
    }

    #[quickcheck]
    fn normalize_title_is_idempotent(raw: String) -> bool {
        let once = normalize_title(&raw);
        normalize_title(&once) == once
    }

    #[quickcheck]
    fn matches_is_symmetric(title_a: String, title_b: String) -> bool {
        let a = issue(&title_a);
        let b = issue(&title_b);
        a.matches(&b) == b.matches(&a)
    }

    #[quickcheck]
    fn matches_ignores_everything_but_title(title: String, body: String, closed: bool) -> bool {
        let plain = issue(&title);
        let decorated = Issue {
            id: Some("9".to_string()),
            title,
            body,
            closed,
        };
        plain.matches(&decorated)
    }
}
