/// Notes ref that holds squash records.
pub const DEFAULT_NOTES_REF: &str = "refs/notes/squash-tree";

/// Prefix under which pre-squash commits are kept reachable.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "refs/squash-archive/";

/// Where records and preservation refs live. Overridable through
/// `SQUASH_TREE_NOTES_REF` and `SQUASH_TREE_ARCHIVE_PREFIX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    pub notes_ref: String,
    pub archive_prefix: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            notes_ref: DEFAULT_NOTES_REF.to_string(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl GitSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let archive_prefix = match non_empty("SQUASH_TREE_ARCHIVE_PREFIX") {
            Some(p) if p.ends_with('/') => p,
            Some(p) => format!("{p}/"),
            None => defaults.archive_prefix,
        };
        Self {
            notes_ref: non_empty("SQUASH_TREE_NOTES_REF").unwrap_or(defaults.notes_ref),
            archive_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = GitSettings::from_lookup(lookup(&[]));
        assert_eq!(s, GitSettings::default());
        assert_eq!(s.notes_ref, "refs/notes/squash-tree");
        assert_eq!(s.archive_prefix, "refs/squash-archive/");
    }

    #[test]
    fn overrides_apply() {
        let s = GitSettings::from_lookup(lookup(&[
            ("SQUASH_TREE_NOTES_REF", "refs/notes/other"),
            ("SQUASH_TREE_ARCHIVE_PREFIX", "refs/keep"),
        ]));
        assert_eq!(s.notes_ref, "refs/notes/other");
        assert_eq!(s.archive_prefix, "refs/keep/");
    }

    #[test]
    fn blank_values_fall_back() {
        let s = GitSettings::from_lookup(lookup(&[("SQUASH_TREE_NOTES_REF", "  ")]));
        assert_eq!(s.notes_ref, DEFAULT_NOTES_REF);
    }
}
