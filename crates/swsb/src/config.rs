//! Platform configuration for the resolver.
//!
//! This module defines all configuration structures used to parameterize the
//! pass for a target. It provides:
//! 1. **Defaults:** Baseline hardware constants (token pool, distances, pipes).
//! 2. **Structures:** Hierarchical config for encoding, tokens, and pipelines.
//!
//! Configuration is supplied as JSON by the driver, or use
//! `Platform::default()` for the baseline target.

use serde::Deserialize;

use crate::ir::{Op, TokenKind};

/// Default configuration constants for the baseline target.
mod defaults {
    /// Scoreboard token pool size.
    ///
    /// The hardware tracks this many out-of-order instructions concurrently;
    /// allocation beyond it forces round-robin reuse.
    pub const TOKEN_COUNT: usize = 16;

    /// Maximum encodable in-order wait distance.
    ///
    /// Computed distances clamp down to this. Clamping down is sound: the
    /// in-order pipe retires in issue order, so waiting on a younger
    /// instruction subsumes every older one.
    pub const MAX_DISTANCE: u8 = 7;

    /// In-order pipeline latency window, in instructions.
    ///
    /// Once this many in-order instructions have issued after a producer,
    /// its results are architecturally visible and the dependency expires.
    pub const LATENCY_WINDOW: u64 = 10;

    /// Number of concurrently tracked in-order pipes.
    pub const IN_ORDER_PIPES: usize = 1;
}

/// Descriptor encoding limits of the target.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// Maximum in-order wait distance the descriptor field can hold.
    #[serde(default = "EncodingConfig::default_max_distance")]
    pub max_distance: u8,

    /// Whether a send may carry a wait distance together with its own token
    /// allocation in one descriptor. Every other distance/token pairing is
    /// split across a standalone sync.
    #[serde(default = "EncodingConfig::default_combined_send_set")]
    pub combined_send_set: bool,
}

impl EncodingConfig {
    fn default_max_distance() -> u8 {
        defaults::MAX_DISTANCE
    }

    fn default_combined_send_set() -> bool {
        true
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            max_distance: defaults::MAX_DISTANCE,
            combined_send_set: true,
        }
    }
}

/// Scoreboard token pool parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Number of scoreboard ids the hardware provides.
    #[serde(default = "TokenConfig::default_count")]
    pub count: usize,
}

impl TokenConfig {
    fn default_count() -> usize {
        defaults::TOKEN_COUNT
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            count: defaults::TOKEN_COUNT,
        }
    }
}

/// In-order pipeline parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeConfig {
    /// Number of concurrently tracked in-order pipes.
    #[serde(default = "PipeConfig::default_in_order")]
    pub in_order: usize,

    /// Latency window after which an in-order dependency expires.
    #[serde(default = "PipeConfig::default_latency_window")]
    pub latency_window: u64,
}

impl PipeConfig {
    fn default_in_order() -> usize {
        defaults::IN_ORDER_PIPES
    }

    fn default_latency_window() -> u64 {
        defaults::LATENCY_WINDOW
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            in_order: defaults::IN_ORDER_PIPES,
            latency_window: defaults::LATENCY_WINDOW,
        }
    }
}

/// Root platform description for the resolver.
///
/// # Examples
///
/// Deserializing a reduced-pool target from JSON:
///
/// ```
/// use swsb_core::config::Platform;
///
/// let json = r#"{
///     "encoding": { "max_distance": 7, "combined_send_set": true },
///     "tokens": { "count": 8 },
///     "pipes": { "in_order": 1, "latency_window": 10 }
/// }"#;
///
/// let platform: Platform = serde_json::from_str(json).unwrap();
/// assert_eq!(platform.tokens.count, 8);
/// assert_eq!(platform.encoding.max_distance, 7);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Platform {
    /// Descriptor encoding limits.
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// Scoreboard token pool.
    #[serde(default)]
    pub tokens: TokenConfig,
    /// In-order pipeline parameters.
    #[serde(default)]
    pub pipes: PipeConfig,
}

impl Platform {
    /// Returns `true` if a wait distance and the given token may share one
    /// descriptor on `op`.
    pub fn jointly_encodable(&self, op: &Op, kind: TokenKind) -> bool {
        matches!(op, Op::Send { .. }) && kind == TokenKind::Set && self.encoding.combined_send_set
    }

    /// Clamps a raw in-order distance into the encodable range.
    pub fn clamp_distance(&self, dist: u64) -> u8 {
        dist.min(u64::from(self.encoding.max_distance)).max(1) as u8
    }
}
