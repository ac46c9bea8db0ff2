//! The on-disk YAML configuration schema, its validator, and its
//! discovery/load/save discipline (spec §3 data model, §4.7, §5, §6).
//!
//! Grounded on `brush-shell::config`: a `#[serde(default)]` root struct with
//! forward-compatible unknown-field tolerance, a `ConfigLoadResult` carrying
//! the attempted path and any error rather than failing outright, and
//! `etcetera::choose_base_strategy` for the platform config directory. The
//! serialization format itself (YAML, via `serde_yaml`) follows the data
//! model spec.md actually specifies rather than the teacher's TOML, since
//! that's a literal part of this domain's config contract, not an
//! implementation detail left to the teacher's taste.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alias::RawAlias;
use crate::error::{Error, ErrorKind};
use crate::profile::ProfileName;

/// The root of `~/.ggcconfig.yaml` (or its XDG fallback).
///
/// Every field is optional and unknown top-level keys are preserved
/// opaquely in `extra` rather than rejected, so a config written by a
/// newer version of this tool still round-trips through an older one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The `interactive` section: profile selection and keybinding
    /// overrides.
    #[serde(default)]
    pub interactive: InteractiveConfig,

    /// The `aliases` section: name to raw (string or sequence) alias
    /// definition.
    #[serde(default)]
    pub aliases: IndexMap<String, RawAlias>,

    /// Any other top-level keys, preserved verbatim so saving this config
    /// back out doesn't discard sections this tool doesn't understand.
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// The `interactive` config section.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// The active profile name, e.g. `"emacs"`. Absent means the default
    /// profile.
    #[serde(default)]
    pub profile: Option<String>,

    /// Global keybinding overrides: `<action>: <binding>` or
    /// `<action>: [<binding>, ...]`.
    #[serde(default)]
    pub keybindings: IndexMap<String, OneOrMany>,

    /// Per-context keybinding overrides.
    #[serde(default)]
    pub contexts: IndexMap<String, ContextConfig>,

    /// Per-platform keybinding overrides (`darwin`/`linux`/`windows`/...).
    #[serde(flatten)]
    pub platforms: HashMap<String, PlatformConfig>,

    /// Per-terminal keybinding overrides, keyed by terminal identity.
    #[serde(default)]
    pub terminals: IndexMap<String, TerminalConfig>,
}

/// A single context's keybinding overrides.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// `<action>: <binding(s)>` overrides scoped to this context.
    #[serde(default)]
    pub keybindings: IndexMap<String, OneOrMany>,
}

/// A single platform's keybinding overrides (reuses [`ContextConfig`]'s
/// shape).
pub type PlatformConfig = ContextConfig;

/// A single terminal's keybinding overrides (reuses [`ContextConfig`]'s
/// shape).
pub type TerminalConfig = ContextConfig;

/// Accepts either a single binding string or a list of them, the shape the
/// config schema allows everywhere a keybinding value appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single binding token.
    One(String),
    /// An ordered list of binding tokens, tried in order.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Normalizes to a `Vec<String>` regardless of which form was used.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }

    /// Borrowing iteration over the contained token(s), for validation
    /// passes that don't want to consume the config.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let as_str = String::as_str as fn(&String) -> &str;
        match self {
            Self::One(s) => std::slice::from_ref(s).iter().map(as_str),
            Self::Many(v) => v.iter().map(as_str),
        }
    }
}

/// The result of attempting to load a config file: mirrors
/// `ConfigLoadResult` from the teacher, carrying the attempted path and any
/// error alongside a usable (default on failure) config so callers can
/// decide whether to treat load failure as fatal.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration, or [`Config::default`] if loading failed.
    pub config: Config,
    /// The path that was attempted.
    pub path: Option<PathBuf>,
    /// Any error encountered while loading.
    pub error: Option<Error>,
}

/// Returns the first of the two spec-mandated config locations that
/// exists, or the first (`$HOME/.ggcconfig.yaml`) if neither does (spec
/// §6).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    let legacy = strategy.home_dir().join(".ggcconfig.yaml");
    if legacy.exists() {
        return Some(legacy);
    }

    let xdg = strategy.config_dir().join("ggc").join("config.yaml");
    if xdg.exists() {
        return Some(xdg);
    }

    Some(legacy)
}

/// Loads and validates the config at `path`. A missing file is not an
/// error: it yields [`Config::default`] with no error set, matching the
/// "no config yet" case callers must treat as normal startup.
#[must_use]
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    if !path.exists() {
        return ConfigLoadResult {
            config: Config::default(),
            path: Some(path.to_path_buf()),
            error: None,
        };
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(source) => {
            return ConfigLoadResult {
                config: Config::default(),
                path: Some(path.to_path_buf()),
                error: Some(
                    ErrorKind::ConfigReadFailed {
                        path: path.to_path_buf(),
                        source,
                    }
                    .into(),
                ),
            };
        }
    };

    match serde_yaml::from_str::<Config>(&content) {
        Ok(config) => {
            if let Err(e) = validate(&config) {
                return ConfigLoadResult {
                    config: Config::default(),
                    path: Some(path.to_path_buf()),
                    error: Some(e),
                };
            }
            ConfigLoadResult {
                config,
                path: Some(path.to_path_buf()),
                error: None,
            }
        }
        Err(source) => ConfigLoadResult {
            config: Config::default(),
            path: Some(path.to_path_buf()),
            error: Some(
                ErrorKind::ConfigParseFailed {
                    path: path.to_path_buf(),
                    source,
                }
                .into(),
            ),
        },
    }
}

/// Loads from [`default_config_path`], or returns an empty default config
/// with no path if one can't be determined.
#[must_use]
pub fn load_config() -> ConfigLoadResult {
    match default_config_path() {
        Some(path) => load_from_path(&path),
        None => ConfigLoadResult {
            config: Config::default(),
            path: None,
            error: None,
        },
    }
}

/// Saves `config` to `path` atomically: writes to a sibling temp file,
/// `fsync`s it, then renames over the destination (spec §5). Nothing is
/// written if `config` fails validation.
pub fn save_to_path(config: &Config, path: &Path) -> Result<(), Error> {
    validate(config)?;

    let yaml = serde_yaml::to_string(config).map_err(|source| ErrorKind::ConfigParseFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| ErrorKind::ConfigWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| ErrorKind::ConfigWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(yaml.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|source| ErrorKind::ConfigWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;

    tmp.persist(path)
        .map_err(|e| ErrorKind::ConfigWriteFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

/// A key path like `interactive.profile` or `aliases.st`, as accepted by
/// `config set`/`config get`-style operations (spec §4.7).
pub fn validate_key_path(key: &str) -> Result<Vec<&str>, Error> {
    if key.is_empty() {
        return Err(ErrorKind::InvalidPath(key.to_owned()).into());
    }
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| {
        p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }) {
        return Err(ErrorKind::InvalidPath(key.to_owned()).into());
    }
    Ok(parts)
}

/// Validates a loaded or about-to-be-saved config against the schema rules
/// spec.md §4.7 requires beyond what serde's shape-checking already
/// enforces: a recognized profile name, and context sections that, if
/// present at all, are present for every one of the three user-overridable
/// contexts together (all-or-nothing, not partial).
pub fn validate(config: &Config) -> Result<(), Error> {
    if let Some(name) = &config.interactive.profile {
        name.parse::<ProfileName>()
            .map_err(|_| ErrorKind::InvalidProfile(name.clone()))?;
    }

    const REQUIRED_IF_ANY: [&str; 3] = ["input", "results", "search"];
    let present: Vec<&str> = REQUIRED_IF_ANY
        .iter()
        .copied()
        .filter(|name| config.interactive.contexts.contains_key(*name))
        .collect();
    if !present.is_empty() && present.len() != REQUIRED_IF_ANY.len() {
        return Err(ErrorKind::InvalidContextKeybindings(format!(
            "expected all of {REQUIRED_IF_ANY:?}, found only {present:?}"
        ))
        .into());
    }

    for (name, raw) in &config.aliases {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ErrorKind::InvalidAliasName(name.clone()).into());
        }
        // `validateAliasValue` (spec §4.7): parsing catches placeholder-name
        // safety violations (spec §8 property 7 / scenario S4); the
        // metacharacter sweep below covers the literal text around them.
        let parsed = crate::alias::parse(name, raw)?;
        for command in &parsed.commands {
            crate::alias::validate_template(command)?;
        }
    }

    for (action, value) in &config.interactive.keybindings {
        for token in value.iter() {
            if !token.is_empty() {
                crate::keystroke::validate_strict_binding(token).map_err(|_| {
                    ErrorKind::UnsupportedBindingFormat(format!("{action}: {token}"))
                })?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_without_error() {
        let result = load_from_path(Path::new("/nonexistent/ggc/config.yaml"));
        assert!(result.error.is_none());
        assert!(result.config.interactive.profile.is_none());
    }

    #[test]
    fn parses_full_shape() {
        let yaml = r#"
interactive:
  profile: emacs
  keybindings:
    delete_word: ctrl+w
  contexts:
    input:
      keybindings:
        move_to_beginning: ctrl+a
    results:
      keybindings:
        move_up: ctrl+p
    search:
      keybindings: {}
  darwin:
    keybindings:
      delete_word: alt+backspace
aliases:
  st: status
  save:
    - add -A
    - commit -m "{0}"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.interactive.profile.as_deref(), Some("emacs"));
        assert!(config.interactive.platforms.contains_key("darwin"));
        assert_eq!(config.aliases.len(), 2);
        validate(&config).unwrap();
    }

    #[test]
    fn rejects_unknown_profile_name() {
        let yaml = "interactive:\n  profile: nonexistent\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_partial_context_sections() {
        let yaml = "interactive:\n  contexts:\n    input:\n      keybindings: {}\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidContextKeybindings(_)));
    }

    #[test]
    fn key_path_validation() {
        assert!(validate_key_path("interactive.profile").is_ok());
        assert!(validate_key_path("aliases.st").is_ok());
        assert!(validate_key_path("").is_err());
        assert!(validate_key_path("bad path").is_err());
        assert!(validate_key_path("bad..path").is_err());
    }

    #[test]
    fn save_then_load_round_trips_and_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.interactive.profile = Some("vi".to_owned());
        config
            .aliases
            .insert("st".to_owned(), RawAlias::Simple("status".to_owned()));

        save_to_path(&config, &path).unwrap();
        assert!(path.exists());

        let loaded = load_from_path(&path);
        assert!(loaded.error.is_none());
        assert_eq!(loaded.config.interactive.profile.as_deref(), Some("vi"));
    }

    #[test]
    fn save_rejects_invalid_config_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.interactive.profile = Some("not-a-real-profile".to_owned());

        assert!(save_to_path(&config, &path).is_err());
        assert!(!path.exists());
    }
}
