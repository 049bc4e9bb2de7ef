//! Bracketed argument lists: `[id|key=value|k1=k2=value]`.

use crate::models::Args;

/// Which keys an argument list accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgMode {
    /// Block arguments: keys are `[A-Za-z0-9_-]+`
    #[default]
    Block,
    /// Reference arguments additionally allow `:` in keys (`art:key`)
    Reference,
}

impl ArgMode {
    #[must_use]
    pub fn is_valid_key(self, key: &str) -> bool {
        !key.is_empty()
            && key.chars().all(|c| {
                c.is_ascii_alphanumeric()
                    || c == '_'
                    || c == '-'
                    || (c == ':' && self == Self::Reference)
            })
    }
}

/// Split on `sep` where it is not preceded by a backslash.
fn split_unescaped(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in s.char_indices() {
        if is_sep(c) && prev != Some('\\') {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
        prev = Some(c);
    }
    parts.push(&s[start..]);
    parts
}

/// Parse the raw text between the brackets of an argument list.
///
/// Clauses are separated by unescaped `|` or newlines. A clause
/// `k1=...=kn=v` assigns `v` to every valid key; clauses without `=` are
/// ignored except that the first clause becomes the `id` when none is given.
/// An explicit `id` that is not a valid key is dropped.
#[must_use]
pub fn parse_args(raw: Option<&str>, mode: ArgMode) -> Args {
    let mut args = Args::default();
    let Some(raw) = raw else {
        return args;
    };

    let clauses = split_unescaped(raw, |c| c == '|' || c == '\n');
    for clause in &clauses {
        let parts = split_unescaped(clause, |c| c == '=');
        let Some((value, keys)) = parts.split_last() else {
            continue;
        };
        for key in keys.iter().rev() {
            if mode.is_valid_key(key) {
                args.insert(*key, *value);
            }
        }
    }

    match args.id().map(|id| mode.is_valid_key(id)) {
        None => {
            if let Some(first) = clauses.first()
                && mode.is_valid_key(first)
            {
                args.insert("id", *first);
            }
        }
        Some(false) => {
            args.remove("id");
        }
        Some(true) => {}
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(args: &Args) -> Vec<(&str, &str)> {
        args.iter().collect()
    }

    #[test]
    fn test_positional_id() {
        let args = parse_args(Some("eq1"), ArgMode::Block);
        assert_eq!(pairs(&args), vec![("id", "eq1")]);
    }

    #[test]
    fn test_key_values_and_positional_id() {
        let args = parse_args(Some("fig1|width=40|caption=A plot"), ArgMode::Block);
        assert_eq!(args.id(), Some("fig1"));
        assert_eq!(args.get("width"), Some("40"));
        assert_eq!(args.get("caption"), Some("A plot"));
    }

    #[test]
    fn test_multi_key_assignment() {
        let args = parse_args(Some("a=b=c"), ArgMode::Block);
        assert_eq!(args.get("a"), Some("c"));
        assert_eq!(args.get("b"), Some("c"));
        assert_eq!(args.id(), None);
    }

    #[test]
    fn test_later_keys_win() {
        let args = parse_args(Some("x=1|x=2"), ArgMode::Block);
        assert_eq!(args.get("x"), Some("2"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_escaped_separators_stay_in_value() {
        let args = parse_args(Some(r"caption=a\|b\=c"), ArgMode::Block);
        assert_eq!(args.get("caption"), Some(r"a\|b\=c"));
    }

    #[test]
    fn test_invalid_explicit_id_is_removed() {
        let args = parse_args(Some("id=has space|w=1"), ArgMode::Block);
        assert!(!args.contains_key("id"));
        assert_eq!(args.get("w"), Some("1"));
    }

    #[test]
    fn test_reference_mode_allows_colon() {
        let block = parse_args(Some("art:eq1"), ArgMode::Block);
        assert_eq!(block.id(), None);
        let reference = parse_args(Some("art:eq1"), ArgMode::Reference);
        assert_eq!(reference.id(), Some("art:eq1"));
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(parse_args(None, ArgMode::Block).is_empty());
        assert!(parse_args(Some(""), ArgMode::Block).is_empty());
        assert!(parse_args(Some("=v"), ArgMode::Block).is_empty());
    }

    #[test]
    fn test_newline_separates_clauses() {
        let args = parse_args(Some("main\ncaption=hi"), ArgMode::Block);
        assert_eq!(args.id(), Some("main"));
        assert_eq!(args.get("caption"), Some("hi"));
    }
}
