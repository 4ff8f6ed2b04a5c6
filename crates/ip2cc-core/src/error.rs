// ── Core error types ──
//
// Adapter-level errors. None of these ever escape `dispatch` -- the
// adapter logs them and reports a `DispatchOutcome` instead. They are
// public so harnesses can parse commands and options up front.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Action errors ────────────────────────────────────────────────
    #[error("Missing action option '{option}'")]
    MissingOption { option: String },

    #[error("Invalid value '{value}' for action option '{option}'")]
    InvalidOption { option: String, value: String },

    #[error("Invalid port {0}: expected 1, 2, or 3")]
    InvalidPort(u8),

    // ── Transport errors (wrapped) ───────────────────────────────────
    #[error("Transport error: {0}")]
    Transport(#[from] ip2cc_api::Error),
}
