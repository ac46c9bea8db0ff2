//! The keystroke model and its human-readable parser.
//!
//! A [`Keystroke`] is the smallest unit the resolver deals with: one physical
//! key combination, tagged by kind so callers can exhaustively match on it.
//! This mirrors the approach brush takes with its own `Key`/`KeyStroke`
//! types (`brush-core::interfaces::keybindings`), but collapses the
//! modifier-bools-plus-key-enum shape into a single sum type, since this
//! domain's four kinds (`Ctrl`, `Alt`, raw sequence, named function key) are
//! mutually exclusive rather than combinable modifiers.

use std::fmt::{self, Display, Formatter};

use crate::error::{Error, ErrorKind};

/// A named key accepted after `alt+`/`meta+`/`M-` besides a plain letter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AltNamedKey {
    /// `alt+backspace` / `M-backspace`.
    Backspace,
    /// `alt+delete` / `M-delete`.
    Delete,
    /// `alt+enter` / `M-enter`.
    Enter,
    /// `alt+space` / `M-space`.
    Space,
}

impl AltNamedKey {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Backspace => "backspace",
            Self::Delete => "delete",
            Self::Enter => "enter",
            Self::Space => "space",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "backspace" => Some(Self::Backspace),
            "delete" => Some(Self::Delete),
            "enter" => Some(Self::Enter),
            "space" => Some(Self::Space),
            _ => None,
        }
    }
}

impl Display for AltNamedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single key combination.
///
/// Equality follows the kind-specific rules from the data model: two
/// keystrokes are equal iff they're the same variant and their
/// kind-relevant payload matches; `RawSeq` equality is byte-wise (which
/// falls out of deriving `PartialEq` on the contained `Vec<u8>`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Keystroke {
    /// `ctrl+x` / `^x` / `C-x`; `rune` is always `a..=z`.
    Ctrl {
        /// The control letter, always lowercase `a..=z`.
        rune: char,
    },
    /// `alt+x` / `meta+x` / `M-x`, or one of the named alt combinations.
    Alt(AltTarget),
    /// A raw, unparsed byte sequence (used for arrow keys and the like).
    RawSeq(Vec<u8>),
    /// A named function key, e.g. `F1`.
    FnKey(String),
}

/// What an [`Keystroke::Alt`] combination targets.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum AltTarget {
    /// A plain letter, always lowercase `a..=z`.
    Char(char),
    /// One of the named alt combinations.
    Named(AltNamedKey),
}

impl Keystroke {
    /// Returns the control byte this keystroke encodes, for callers that
    /// need single-byte compatibility with a raw-mode input loop reading one
    /// byte at a time. Only `Ctrl` keystrokes have a control byte.
    #[must_use]
    pub fn control_byte(&self) -> Option<u8> {
        match self {
            Self::Ctrl { rune } => Some(u8::try_from(u32::from(*rune) - u32::from('a') + 1).ok()?),
            _ => None,
        }
    }

    fn new_ctrl(rune: char) -> Result<Self, Error> {
        if !rune.is_ascii_lowercase() {
            return Err(ErrorKind::UnsupportedCtrlKey(rune).into());
        }
        Ok(Self::Ctrl { rune })
    }

    /// Parses a single human-readable binding token.
    ///
    /// Accepted forms (case-insensitive): `ctrl+x` / `^x` / `C-x`;
    /// `alt+x` / `meta+x` / `M-x`; `alt+backspace|delete|enter|space` (and
    /// the `M-` spellings); `up`/`down`/`left`/`right` and their
    /// `arrow-*`/`arrow*` spellings.
    pub fn parse(token: &str) -> Result<Self, Error> {
        Self::parse_with_leniency(token, false)
    }

    /// Like [`Self::parse`], but used only when importing externally
    /// produced config: accepts any `ctrl+...` prefix without failing on an
    /// unrecognized key, encoding the remainder as a raw byte sequence
    /// rather than rejecting the token outright.
    pub fn parse_lenient(token: &str) -> Result<Self, Error> {
        Self::parse_with_leniency(token, true)
    }

    fn parse_with_leniency(token: &str, lenient: bool) -> Result<Self, Error> {
        let lower = token.to_ascii_lowercase();

        if let Some(rest) = lower
            .strip_prefix("ctrl+")
            .or_else(|| lower.strip_prefix("c-"))
        {
            return Self::parse_ctrl_rest(rest, token, lenient);
        }
        if let Some(rest) = lower.strip_prefix('^') {
            return Self::parse_ctrl_rest(rest, token, lenient);
        }

        if let Some(rest) = lower
            .strip_prefix("alt+")
            .or_else(|| lower.strip_prefix("meta+"))
            .or_else(|| lower.strip_prefix("m-"))
        {
            return Self::parse_alt_rest(rest, token);
        }

        if let Some(raw) = Self::parse_arrow(&lower) {
            return Ok(raw);
        }

        Err(ErrorKind::UnsupportedBindingFormat(token.to_owned()).into())
    }

    fn parse_ctrl_rest(rest: &str, original: &str, lenient: bool) -> Result<Self, Error> {
        let mut chars = rest.chars();
        let (Some(rune), None) = (chars.next(), chars.next()) else {
            if lenient {
                return Ok(Self::RawSeq(rest.as_bytes().to_vec()));
            }
            return Err(ErrorKind::UnsupportedCtrlKey('\0').into());
        };

        match Self::new_ctrl(rune) {
            Ok(k) => Ok(k),
            Err(e) if lenient => {
                tracing::debug!(
                    token = original,
                    "accepting unrecognized ctrl binding leniently"
                );
                let _ = e;
                Ok(Self::RawSeq(rest.as_bytes().to_vec()))
            }
            Err(e) => Err(e),
        }
    }

    fn parse_alt_rest(rest: &str, original: &str) -> Result<Self, Error> {
        if let Some(named) = AltNamedKey::parse(rest) {
            return Ok(Self::Alt(AltTarget::Named(named)));
        }

        let mut chars = rest.chars();
        if let (Some(rune), None) = (chars.next(), chars.next()) {
            if rune.is_ascii_alphabetic() {
                return Ok(Self::Alt(AltTarget::Char(rune.to_ascii_lowercase())));
            }
        }

        Err(ErrorKind::UnsupportedBindingFormat(original.to_owned()).into())
    }

    fn parse_arrow(lower: &str) -> Option<Self> {
        let direction = lower
            .strip_prefix("arrow-")
            .or_else(|| lower.strip_prefix("arrow"))
            .unwrap_or(lower);

        let byte = match direction {
            "up" => b'A',
            "down" => b'B',
            "right" => b'C',
            "left" => b'D',
            _ => return None,
        };

        Some(Self::RawSeq(vec![0x1b, b'[', byte]))
    }
}

impl Display for Keystroke {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ctrl { rune } => write!(f, "ctrl+{rune}"),
            Self::Alt(AltTarget::Char(rune)) => write!(f, "alt+{rune}"),
            Self::Alt(AltTarget::Named(name)) => write!(f, "alt+{name}"),
            Self::RawSeq(seq) => match seq.as_slice() {
                [0x1b, b'[', b'A'] => write!(f, "up"),
                [0x1b, b'[', b'B'] => write!(f, "down"),
                [0x1b, b'[', b'C'] => write!(f, "right"),
                [0x1b, b'[', b'D'] => write!(f, "left"),
                other => {
                    write!(f, "raw:")?;
                    for byte in other {
                        write!(f, "{byte:02x}")?;
                    }
                    Ok(())
                }
            },
            Self::FnKey(name) => write!(f, "{name}"),
        }
    }
}

/// Stricter validator used only by config validation (spec §4.7): accepts
/// only `ctrl+x` / `^x` / `c-x` forms, rejecting the `alt+`/arrow forms the
/// runtime parser in [`Self::parse`] also understands. Deliberately
/// narrower than the runtime parser — the config schema only ever asks
/// this validator about `interactive.keybindings`' global entries, which
/// spec.md restricts to ctrl-style notation.
pub fn validate_strict_binding(token: &str) -> Result<(), Error> {
    let lower = token.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("ctrl+")
        .or_else(|| lower.strip_prefix("c-"))
        .or_else(|| lower.strip_prefix('^'));

    let Some(rest) = rest else {
        return Err(ErrorKind::UnsupportedBindingFormat(token.to_owned()).into());
    };

    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(rune), None) if rune.is_ascii_lowercase() => Ok(()),
        _ => Err(ErrorKind::UnsupportedBindingFormat(token.to_owned()).into()),
    }
}

/// Parses either a single binding string or an ordered list of binding
/// strings into one-or-more [`Keystroke`]s, as accepted throughout the
/// config schema (`interactive.keybindings.<action>` etc.).
pub fn parse_one_or_many(values: &[String]) -> Result<Vec<Keystroke>, Error> {
    values.iter().map(|v| Keystroke::parse(v)).collect()
}
