//! Alias handling.
//!
//! DCC aliases have the form `<lab-name>:<identifier>`, e.g.
//! `michael-snyder:B-167`. Aliases frequently end up in file names, so
//! path separators must be removed before use on disk.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters that are replaced by `_` when sanitizing an alias.
const PATH_SEPARATORS: &[char] = &['/', '\\'];

/// Replace every forward slash and backslash in `alias` with an underscore.
///
/// # Examples
///
/// ```
/// use eu_utils::clean_alias_name;
///
/// assert_eq!(
///     clean_alias_name(r"michael-snyder:a/troublesome\alias"),
///     "michael-snyder:a_troublesome_alias",
/// );
/// ```
pub fn clean_alias_name(alias: &str) -> String {
    alias.replace(PATH_SEPARATORS, "_")
}

/// Drop the `<lab-name>:` prefix, returning everything after the first colon.
///
/// Input without a colon is returned unchanged.
pub fn strip_alias_prefix(alias: &str) -> &str {
    alias.split_once(':').map_or(alias, |(_, rest)| rest)
}

/// An alias string with accessors for its lab prefix and local name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(String);

impl Alias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// The lab name before the first colon, if any.
    pub fn lab(&self) -> Option<&str> {
        self.0.split_once(':').map(|(lab, _)| lab)
    }

    /// The identifier with any lab prefix removed.
    pub fn name(&self) -> &str {
        strip_alias_prefix(&self.0)
    }

    /// A copy safe to embed in file names.
    pub fn sanitized(&self) -> Self {
        Self(clean_alias_name(&self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Alias {
    fn from(alias: &str) -> Self {
        Self::new(alias)
    }
}

impl From<String> for Alias {
    fn from(alias: String) -> Self {
        Self(alias)
    }
}

impl AsRef<str> for Alias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_replaces_both_separators() {
        let alias = r"michael-snyder:a/troublesome\alias";
        assert_eq!(clean_alias_name(alias), "michael-snyder:a_troublesome_alias");
    }

    #[test]
    fn clean_leaves_safe_alias_alone() {
        assert_eq!(clean_alias_name("michael-snyder:B-167"), "michael-snyder:B-167");
    }

    #[test]
    fn strip_prefix() {
        assert_eq!(strip_alias_prefix("michael-snyder:B-167"), "B-167");
    }

    #[test]
    fn strip_without_colon() {
        assert_eq!(strip_alias_prefix("no-colon-here"), "no-colon-here");
    }

    #[test]
    fn strip_splits_on_first_colon_only() {
        assert_eq!(strip_alias_prefix("lab:sample:1"), "sample:1");
        assert_eq!(strip_alias_prefix(":leading"), "leading");
        assert_eq!(strip_alias_prefix("trailing:"), "");
    }

    #[test]
    fn alias_views() {
        let alias = Alias::from("michael-snyder:L-3525-1");
        assert_eq!(alias.lab(), Some("michael-snyder"));
        assert_eq!(alias.name(), "L-3525-1");
        assert_eq!(alias.to_string(), "michael-snyder:L-3525-1");

        let bare = Alias::from("L-3525-1");
        assert_eq!(bare.lab(), None);
        assert_eq!(bare.name(), "L-3525-1");
    }

    #[test]
    fn alias_sanitized() {
        let alias = Alias::from(r"lab:run/1\a");
        assert_eq!(alias.sanitized().as_str(), "lab:run_1_a");
    }

    #[test]
    fn alias_serializes_as_plain_string() {
        let alias = Alias::from("lab:x");
        assert_eq!(serde_json::to_string(&alias).unwrap(), "\"lab:x\"");
        let back: Alias = serde_json::from_str("\"lab:x\"").unwrap();
        assert_eq!(back, alias);
    }

    proptest! {
        #[test]
        fn clean_removes_all_separators(s in ".*") {
            let cleaned = clean_alias_name(&s);
            prop_assert!(!cleaned.contains('/'));
            prop_assert!(!cleaned.contains('\\'));
        }

        #[test]
        fn clean_is_idempotent(s in ".*") {
            let once = clean_alias_name(&s);
            prop_assert_eq!(clean_alias_name(&once), once.clone());
        }

        #[test]
        fn clean_preserves_char_count(s in ".*") {
            prop_assert_eq!(clean_alias_name(&s).chars().count(), s.chars().count());
        }
    }
}
