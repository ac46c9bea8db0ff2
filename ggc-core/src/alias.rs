//! Alias parsing, placeholder analysis, and expansion (spec §4.6).
//!
//! Grounded on brush-core's own alias machinery (`brush-core::builtins::alias`
//! / `alias_events`), which likewise distinguishes "define" from "expand"
//! and keeps alias state in an ordered map so iteration order matches
//! definition order for listing commands.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// The raw shape an alias takes in the config file: either a single command
/// string, or a sequence of command strings run one after another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAlias {
    /// A single-command alias.
    Simple(String),
    /// A multi-command sequence alias.
    Sequence(Vec<String>),
}

/// An alias, parsed and validated, ready for expansion.
#[derive(Debug, Clone)]
pub struct ParsedAlias {
    /// The alias name it was registered under.
    pub name: String,
    /// Whether this is a single-command or sequence alias.
    pub kind: AliasKind,
    /// The command template(s), verbatim, one per step.
    pub commands: Vec<String>,
    /// Every `{N}` positional placeholder index referenced across all
    /// steps, plus 1 (i.e. the minimum argument count required), or `0` if
    /// none are referenced.
    ///
    /// Spec §3 names this field `maxPositionalArg`, defined as `-1` when no
    /// `{N}` placeholder occurs, otherwise the largest such `N`. This field
    /// stores that value reinterpreted as an argument *count* rather than a
    /// highest *index* (`largest N + 1`, or `0` in place of `-1`) so it
    /// doubles directly as the minimum `args.len()` [`expand`] requires,
    /// without a signed type or a `-1` sentinel; the two are related by
    /// `max_positional_arg == maxPositionalArg + 1`, and every consumer
    /// here (`expand`'s length check, the `> 0` placeholder-present test)
    /// reads it as a count, never as an index.
    pub max_positional_arg: usize,
    /// Every named (non-numeric) `{name}` placeholder referenced, which are
    /// recognized but never substituted (spec §4.6).
    pub named_placeholders: HashSet<String>,
}

/// Whether an alias expands to one command or a sequence of them.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AliasKind {
    /// A single-command alias.
    Simple,
    /// A multi-command sequence alias, run in order.
    Sequence,
}

/// Parses `raw` into a [`ParsedAlias`], validating the alias name and
/// scanning every step for placeholders.
pub fn parse(name: &str, raw: &RawAlias) -> Result<ParsedAlias, Error> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ErrorKind::InvalidAliasName(name.to_owned()).into());
    }

    let (kind, commands) = match raw {
        RawAlias::Simple(s) => (AliasKind::Simple, vec![s.clone()]),
        RawAlias::Sequence(steps) => {
            if steps.is_empty() {
                return Err(ErrorKind::InvalidAliasSequence(name.to_owned()).into());
            }
            (AliasKind::Sequence, steps.clone())
        }
    };

    let mut max_positional_arg = 0usize;
    let mut named_placeholders = HashSet::new();

    for command in &commands {
        for placeholder in scan_placeholders(command)? {
            match placeholder.parse::<usize>() {
                Ok(index) => max_positional_arg = max_positional_arg.max(index + 1),
                Err(_) => {
                    named_placeholders.insert(placeholder);
                }
            }
        }
    }

    Ok(ParsedAlias {
        name: name.to_owned(),
        kind,
        commands,
        max_positional_arg,
        named_placeholders,
    })
}

/// Extracts every `{...}` placeholder name from `template`, validating that
/// each contains only `[A-Za-z0-9_]` (spec §4.6's placeholder-name safety
/// rule, shared with the shell-metacharacter blacklist's intent of never
/// letting config-supplied text widen what a placeholder can expand into).
fn scan_placeholders(template: &str) -> Result<Vec<String>, Error> {
    let mut placeholders = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '{' {
            continue;
        }
        let Some(end) = template[start + 1..].find('}') else {
            continue;
        };
        let name = &template[start + 1..start + 1 + end];
        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ErrorKind::InvalidPlaceholder(name.to_owned()).into());
        }
        placeholders.push(name.to_owned());
        while let Some(&(idx, _)) = chars.peek() {
            if idx > start + 1 + end {
                break;
            }
            chars.next();
        }
    }

    Ok(placeholders)
}

/// Expands `alias` against `args`, substituting `{0}`, `{1}`, ... with the
/// corresponding positional argument and leaving named placeholders
/// untouched (spec §4.6). Returns one expanded command string per step.
///
/// When the alias has no placeholders at all, a `Sequence` alias forbids
/// arguments outright (`UnexpectedArgs`), while a `Simple` alias forwards
/// them as-is onto its sole command (spec §4.6, §8 property 6) — this
/// crate's resolution of the open question of whether sequence-alias
/// arguments are rejected or silently warned: rejected, since a sequence
/// has no single obvious command to forward unclaimed arguments to.
pub fn expand(alias: &ParsedAlias, args: &[String]) -> Result<Vec<String>, Error> {
    if alias.max_positional_arg == 0 {
        if alias.kind == AliasKind::Sequence && !args.is_empty() {
            return Err(ErrorKind::UnexpectedArgs(alias.name.clone()).into());
        }
        if alias.kind == AliasKind::Simple {
            return Ok(alias
                .commands
                .iter()
                .map(|template| forward_args(template, args))
                .collect());
        }
        return alias.commands.iter().map(|template| substitute(template, args)).collect();
    }

    if args.len() < alias.max_positional_arg {
        return Err(ErrorKind::MissingPlaceholderArg {
            name: alias.name.clone(),
            needed: alias.max_positional_arg,
        }
        .into());
    }

    alias
        .commands
        .iter()
        .map(|template| substitute(template, args))
        .collect()
}

/// Appends caller arguments verbatim onto a placeholder-free `Simple`
/// alias's sole command.
fn forward_args(template: &str, args: &[String]) -> String {
    if args.is_empty() {
        template.to_owned()
    } else {
        format!("{template} {}", args.join(" "))
    }
}

/// Validates that `template`'s literal text — everything outside `{...}`
/// placeholder spans — contains no blacklisted shell metacharacter (spec
/// §4.7's `validateAliasValue` running `validateCommand` over each alias
/// command). This runs at config-validation time, before any caller
/// argument exists to substitute in, so placeholder spans are stripped
/// first rather than substituted — a literal `{0}` in the template must
/// never itself trip the blacklist that guards the *substituted* text.
pub fn validate_template(template: &str) -> Result<(), Error> {
    crate::command::check_metacharacters(&strip_placeholders(template))
}

fn strip_placeholders(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let Some(end) = template[start + 1..].find('}') else {
            out.push(c);
            continue;
        };
        while let Some(&(idx, _)) = chars.peek() {
            if idx > start + 1 + end {
                break;
            }
            chars.next();
        }
    }

    out
}

fn substitute(template: &str, args: &[String]) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let Some(end) = template[start + 1..].find('}') else {
            out.push(c);
            continue;
        };
        let name = &template[start + 1..start + 1 + end];
        match name.parse::<usize>() {
            Ok(index) => out.push_str(&args[index]),
            Err(_) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        while let Some(&(idx, _)) = chars.peek() {
            if idx > start + 1 + end {
                break;
            }
            chars.next();
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_alias_with_no_placeholders() {
        let parsed = parse("st", &RawAlias::Simple("status".to_owned())).unwrap();
        assert_eq!(parsed.kind, AliasKind::Simple);
        assert_eq!(parsed.max_positional_arg, 0);
        assert!(parsed.named_placeholders.is_empty());
    }

    #[test]
    fn rejects_empty_sequence() {
        let err = parse("empty", &RawAlias::Sequence(Vec::new())).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAliasSequence(_)));
    }

    #[test]
    fn rejects_whitespace_in_name() {
        let err = parse("bad name", &RawAlias::Simple("status".to_owned())).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAliasName(_)));
    }

    #[test]
    fn tracks_highest_positional_placeholder() {
        let parsed = parse(
            "save",
            &RawAlias::Sequence(vec!["add -A".to_owned(), "commit -m \"{0}\"".to_owned()]),
        )
        .unwrap();
        assert_eq!(parsed.max_positional_arg, 1);
    }

    #[test]
    fn named_placeholders_are_recognized_but_not_counted() {
        let parsed = parse("thing", &RawAlias::Simple("commit -m {message}".to_owned())).unwrap();
        assert_eq!(parsed.max_positional_arg, 0);
        assert!(parsed.named_placeholders.contains("message"));
    }

    #[test]
    fn rejects_unsafe_placeholder_name() {
        let err = scan_placeholders("run {a;b}").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidPlaceholder(_)));
    }

    #[test]
    fn expand_substitutes_positional_args() {
        let parsed = parse("save", &RawAlias::Simple("commit -m \"{0}\"".to_owned())).unwrap();
        let expanded = expand(&parsed, &["fix bug".to_owned()]).unwrap();
        assert_eq!(expanded, vec!["commit -m \"fix bug\""]);
    }

    #[test]
    fn expand_leaves_named_placeholders_untouched() {
        let parsed = parse("thing", &RawAlias::Simple("commit -m {message}".to_owned())).unwrap();
        let expanded = expand(&parsed, &[]).unwrap();
        assert_eq!(expanded, vec!["commit -m {message}"]);
    }

    #[test]
    fn expand_forwards_args_for_placeholder_free_simple_alias() {
        let parsed = parse("st", &RawAlias::Simple("status".to_owned())).unwrap();
        let expanded = expand(&parsed, &["--short".to_owned()]).unwrap();
        assert_eq!(expanded, vec!["status --short"]);
    }

    #[test]
    fn expand_rejects_args_for_placeholder_free_sequence_alias() {
        let parsed = parse(
            "cleanup",
            &RawAlias::Sequence(vec!["status".to_owned(), "log".to_owned()]),
        )
        .unwrap();
        let err = expand(&parsed, &["extra".to_owned()]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedArgs(_)));
    }

    #[test]
    fn validate_template_ignores_placeholder_braces_but_catches_literal_metacharacters() {
        assert!(validate_template("commit -m \"{0}\"").is_ok());
        assert!(validate_template("status; rm -rf /").is_err());
    }

    #[test]
    fn expand_rejects_too_few_args() {
        let parsed = parse("save", &RawAlias::Simple("commit -m \"{0}\"".to_owned())).unwrap();
        let err = expand(&parsed, &[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingPlaceholderArg { .. }));
    }

    #[test]
    fn expand_is_idempotent_across_repeated_calls() {
        let parsed = parse("save", &RawAlias::Simple("commit -m \"{0}\"".to_owned())).unwrap();
        let args = vec!["same message".to_owned()];
        let first = expand(&parsed, &args).unwrap();
        let second = expand(&parsed, &args).unwrap();
        assert_eq!(first, second);
    }
}
