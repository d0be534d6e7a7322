//! Synchronization descriptors.
//!
//! Each instruction leaves the resolver carrying at most one in-order wait
//! distance and at most one scoreboard token. The hardware decodes both
//! before issue: the distance stalls until the in-order pipe has retired all
//! but the last `distance` instructions, the token stalls until the tracked
//! out-of-order producer signals the named direction.

use std::fmt;

/// A scoreboard id, one of the platform's fixed token pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SbId(pub u8);

impl fmt::Display for SbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// What a token on an instruction means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenKind {
    /// The instruction's own sources depend on the token (read obligation).
    Src,
    /// The instruction's destination depends on the token (write obligation).
    /// Subsumes a `Src` obligation on the same id.
    Dst,
    /// The instruction allocates the token for its own completion tracking.
    Set,
}

/// A scoreboard token reference: kind plus id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// How the instruction relates to the token.
    pub kind: TokenKind,
    /// The scoreboard id.
    pub id: SbId,
}

impl Token {
    /// Token allocation marker.
    pub fn set(id: SbId) -> Self {
        Self {
            kind: TokenKind::Set,
            id,
        }
    }

    /// Read-obligation wait.
    pub fn src(id: SbId) -> Self {
        Self {
            kind: TokenKind::Src,
            id,
        }
    }

    /// Write-obligation wait.
    pub fn dst(id: SbId) -> Self {
        Self {
            kind: TokenKind::Dst,
            id,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Set => write!(f, "{}", self.id),
            TokenKind::Src => write!(f, "{}.src", self.id),
            TokenKind::Dst => write!(f, "{}.dst", self.id),
        }
    }
}

/// The synchronization annotation the resolver writes onto an instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwsbInfo {
    /// In-order wait distance, `1..=max` when present.
    pub distance: Option<u8>,
    /// Scoreboard token, if any.
    pub token: Option<Token>,
}

impl SwsbInfo {
    /// Returns `true` if the descriptor carries nothing.
    pub fn is_empty(&self) -> bool {
        self.distance.is_none() && self.token.is_none()
    }
}

impl fmt::Display for SwsbInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.distance, self.token) {
            (None, None) => Ok(()),
            (Some(d), None) => write!(f, "@{d}"),
            (None, Some(t)) => write!(f, "{t}"),
            (Some(d), Some(t)) => write!(f, "@{d} {t}"),
        }
    }
}
