//! Stitch-type profile table.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

/// Key of the profile used when a stitch type is unknown.
pub const DEFAULT_STITCH: &str = "sc";

/// Size of one stitch relative to the base yarn width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StitchProfile {
    /// Along the ring.
    pub width_multiplier: f64,
    /// Along the slicing direction.
    pub height_multiplier: f64,
    /// Off the surface.
    pub depth_multiplier: f64,
}

impl StitchProfile {
    const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width_multiplier: width,
            height_multiplier: height,
            depth_multiplier: depth,
        }
    }
}

impl Default for StitchProfile {
    fn default() -> Self {
        SINGLE_CROCHET
    }
}

const SINGLE_CROCHET: StitchProfile = StitchProfile::new(1.0, 1.0, 1.0);

const PROFILES: [(&str, StitchProfile); 8] = [
    ("sc", SINGLE_CROCHET),
    ("hdc", StitchProfile::new(1.0, 1.5, 1.0)),
    ("dc", StitchProfile::new(1.0, 2.0, 1.0)),
    ("tr", StitchProfile::new(1.0, 2.5, 1.0)),
    ("sl", StitchProfile::new(0.8, 0.5, 0.8)),
    ("ch", StitchProfile::new(0.9, 0.6, 0.8)),
    ("bobble", StitchProfile::new(1.4, 1.0, 1.6)),
    ("puff", StitchProfile::new(1.3, 1.2, 1.4)),
];

/// Looks up a stitch key (case-insensitive).
#[must_use]
pub fn lookup(key: &str) -> Option<StitchProfile> {
    let key = key.trim();
    PROFILES
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, p)| *p)
}

/// Resolves a stitch key, falling back to [`DEFAULT_STITCH`].
///
/// Returns the key actually used with its profile. An unknown key records a
/// [`DiagnosticKind::UnknownStitchType`] entry.
pub fn resolve(key: &str, diagnostics: &mut Diagnostics) -> (String, StitchProfile) {
    match lookup(key) {
        Some(profile) => (key.trim().to_ascii_lowercase(), profile),
        None => {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::UnknownStitchType,
                format!("unknown stitch type {key:?}, using {DEFAULT_STITCH}"),
            ));
            (DEFAULT_STITCH.to_owned(), SINGLE_CROCHET)
        }
    }
}
