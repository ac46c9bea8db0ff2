//! Error facilities, following the `Error { kind: ErrorKind }` shape used
//! throughout brush-core (`brush-core::error`): a thin wrapper struct that
//! forwards display/source to the kind, plus a blanket `From` impl so every
//! `#[from]`-annotated variant becomes a free `?`-compatible conversion.

/// Unified error type for this crate.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Returns the kind of error this is, for callers that want to match on
    /// it (e.g. tests, or a caller translating kinds to exit codes).
    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes this error, returning its kind.
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

/// Error taxonomy for this crate, grouped by the categories spec'd for
/// propagation policy: validation, resolution, runtime, and I/O.
#[derive(thiserror::Error, Debug)]
pub enum ErrorKind {
    // --- Validation ---
    /// A config key path was empty or contained characters outside
    /// `[A-Za-z0-9_-]`.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An alias name was empty or contained whitespace.
    #[error("invalid alias name: {0}")]
    InvalidAliasName(String),

    /// An alias's raw config value was neither a string nor a list of
    /// strings.
    #[error("invalid alias type for '{0}'")]
    InvalidAliasType(String),

    /// An alias was defined as an empty sequence.
    #[error("invalid alias sequence for '{0}': sequence must not be empty")]
    InvalidAliasSequence(String),

    /// A `{placeholder}` name failed validation.
    #[error("placeholder contains unsafe characters: {0}")]
    InvalidPlaceholder(String),

    /// A command string contained a blacklisted shell metacharacter.
    #[error("command contains unsafe shell metacharacter: {0}")]
    UnsafeMetacharacter(String),

    /// A command's leading token is not in the command whitelist.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A keybinding string didn't match any recognized notation.
    #[error("unsupported keybinding format: {0}")]
    UnsupportedBindingFormat(String),

    /// A `ctrl+<x>` binding used a non-letter key.
    #[error("unsupported ctrl key: {0:?}")]
    UnsupportedCtrlKey(char),

    /// `interactive.profile` named something outside the profile
    /// enumeration.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// Only some of `input`/`results`/`search` supplied a context
    /// keybindings map.
    #[error("invalid context keybindings: {0}")]
    InvalidContextKeybindings(String),

    // --- Resolution ---
    /// A profile switch or cycle referenced an unregistered profile.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Resolving a full `ContextualKeyBindingMap` failed for the given
    /// context.
    #[error("failed to resolve context: {0}")]
    ContextResolutionFailed(String),

    // --- Runtime ---
    /// `HotReloader::start` was called while already watching.
    #[error("already watching for config changes")]
    AlreadyWatching,

    /// Arguments were supplied to an alias that doesn't accept any.
    #[error("alias '{0}' does not accept arguments")]
    UnexpectedArgs(String),

    /// Fewer arguments were supplied than the alias's placeholders require.
    #[error("alias '{name}' requires at least {needed} argument(s)")]
    MissingPlaceholderArg {
        /// The alias name.
        name: String,
        /// The minimum number of arguments required.
        needed: usize,
    },

    // --- I/O ---
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigReadFailed {
        /// The path that failed to load.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be written.
    #[error("failed to write config file {path}: {source}")]
    ConfigWriteFailed {
        /// The path that failed to save.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file's contents were not valid YAML.
    #[error("failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        /// The path that failed to parse.
        path: std::path::PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl<T> From<T> for Error
where
    ErrorKind: From<T>,
{
    fn from(value: T) -> Self {
        Self {
            kind: ErrorKind::from(value),
        }
    }
}
