//! Non-fatal findings of a generation pass.
//!
//! Every stage records what it skipped, clamped or approximated here instead of
//! failing. Each entry is mirrored to `tracing` when recorded.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::SolidId;

/// How much a diagnostic affects the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Output is complete; an input was adjusted.
    Info,
    /// Output for a solid, ring or layer is reduced or approximate.
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A ring or solid collapsed and was skipped.
    DegenerateGeometry,
    /// Ring generation stopped at `max_rings`.
    RingCapReached,
    /// A stitch key was not in the profile table; the default was used.
    UnknownStitchType,
    /// A ring was too short for its stitches.
    InsufficientLength,
    /// The requested slicing axis is not supported for the kind.
    AxisUnsupported,
    /// A setting was outside its range and was clamped.
    SettingsClamped,
    /// No ring on the solid can hold the requested edge stitch count.
    EdgeStitchesDoNotFit,
    /// A stitch-count change between rings exceeded the allowed factor.
    TransitionClamped,
}

/// One recorded finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub solid: Option<SolidId>,
    /// Ring sequence within the solid, or layer index for planner findings.
    pub ring: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    /// Creates a warning.
    #[must_use]
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            solid: None,
            ring: None,
            message: message.into(),
        }
    }

    /// Creates an informational entry.
    #[must_use]
    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(kind, message)
        }
    }

    /// Attaches the solid the finding concerns.
    #[must_use]
    pub fn for_solid(mut self, solid: SolidId) -> Self {
        self.solid = Some(solid);
        self
    }

    /// Attaches the ring (or layer) the finding concerns.
    #[must_use]
    pub fn for_ring(mut self, ring: usize) -> Self {
        self.ring = Some(ring);
        self
    }
}

/// Ordered collection of diagnostics produced by one stage or pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and mirrors it to `tracing`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let solid = diagnostic.solid.map(|s| s.to_string()).unwrap_or_default();
        match diagnostic.severity {
            Severity::Info => debug!(kind = ?diagnostic.kind, %solid, ring = ?diagnostic.ring, "{}", diagnostic.message),
            Severity::Warning => warn!(kind = ?diagnostic.kind, %solid, ring = ?diagnostic.ring, "{}", diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    /// Appends entries already mirrored by another collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Returns `true` if any entry has the given kind.
    #[must_use]
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    /// Number of entries of the given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_attaches_context() {
        let d = Diagnostic::warning(DiagnosticKind::DegenerateGeometry, "ring collapsed")
            .for_solid(SolidId(3))
            .for_ring(7);
        assert_eq!(d.solid, Some(SolidId(3)));
        assert_eq!(d.ring, Some(7));
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn extend_keeps_order() {
        let mut a = Diagnostics::new();
        a.push(Diagnostic::info(DiagnosticKind::SettingsClamped, "first"));
        let mut b = Diagnostics::new();
        b.push(Diagnostic::warning(DiagnosticKind::RingCapReached, "second"));
        a.extend(b);
        let messages: Vec<&str> = a.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
        assert!(a.contains(DiagnosticKind::RingCapReached));
        assert_eq!(a.count(DiagnosticKind::UnknownStitchType), 0);
    }
}
