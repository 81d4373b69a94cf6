//! Shape ring generators.
//!
//! Each solid kind is turned into rings by one of three strategies, chosen by
//! [`strategy_for`] from the kind and the local slicing axis.

mod axial;
mod capsule;
mod cone;
mod cylinder;
pub mod marching;
mod mesh_section;
pub mod meridian;
mod pyramid;
pub mod section;
mod sphere;
mod torus;
mod triangle;

pub use capsule::CapsuleGenerator;
pub use cone::ConeGenerator;
pub use cylinder::CylinderGenerator;
pub use mesh_section::MeshSectionGenerator;
pub use pyramid::PyramidGenerator;
pub use sphere::SphereGenerator;
pub use torus::TorusGenerator;
pub use triangle::TriangleGenerator;

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{GenerationError, Result};
use crate::geometry::{PlacedSolid, SolidFrame, SolidKind};
use crate::math::{polyline, Axis, Point3, Vector3, TOLERANCE};
use crate::model::{Pole, PoleRole, Ring, RingMeta, RingRole, SolidMarkers};
use crate::settings::Settings;
use crate::stitches::gauge::Gauge;
use crate::stitches::profile;

/// Everything a generator reads besides the solid itself.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Normalized settings of the pass.
    pub settings: Settings,
    pub gauge: Gauge,
    /// Surface distance between consecutive rings.
    pub step: f64,
    /// Centre-to-centre spacing of the primary stitch.
    pub spacing: f64,
}

impl GenerationContext {
    /// Derives the gauge from normalized settings. An unknown primary stitch
    /// falls back to the default profile with a diagnostic.
    #[must_use]
    pub fn new(settings: &Settings, diagnostics: &mut Diagnostics) -> Self {
        let primary = settings.pattern().first().copied().unwrap_or(profile::DEFAULT_STITCH);
        let (_, primary) = profile::resolve(primary, diagnostics);
        let gauge = Gauge::new(settings.yarn_level, &primary, settings.thresholds.edge_gap_fraction);
        Self {
            settings: settings.clone(),
            step: gauge.step_height,
            spacing: gauge.spacing(&primary),
            gauge,
        }
    }

    /// Perimeter the first and last rings must reach.
    #[must_use]
    pub fn edge_perimeter(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let count = self.settings.edge_stitch_count as f64;
        count * self.spacing
    }
}

/// Rings and markers of one solid before clipping.
#[derive(Debug, Clone, Default)]
pub struct GeneratedRings {
    /// Ordered from the start pole; `meta.sequence` is the index.
    pub rings: Vec<Ring>,
    pub markers: SolidMarkers,
    pub diagnostics: Diagnostics,
}

/// Turns one placed solid into rings stacked along `axis`.
pub trait RingGenerator {
    /// Generates the rings of `placed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid's frame is degenerate.
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings>;
}

/// How rings of a kind are produced along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Closed-form marching along a line/arc profile.
    ClosedForm,
    /// Numeric arc-length marching along the sphere meridian.
    ArcLength,
    /// Slicing a tessellation of the solid.
    MeshSection,
}

/// Local axis each kind's profile is defined around.
pub const NATIVE_AXIS: Axis = Axis::Y;

/// Capability lookup: the strategy used for `kind` sliced along `axis`.
///
/// # Errors
///
/// [`GenerationError::Unsupported`] for a kind with no generator and
/// [`GenerationError::AxisUnsupported`] for an axis the kind cannot be sliced
/// along.
pub fn strategy_for(kind: SolidKind, axis: Axis) -> std::result::Result<Strategy, GenerationError> {
    match kind {
        SolidKind::Sphere => Ok(Strategy::ArcLength),
        SolidKind::Cone | SolidKind::Cylinder | SolidKind::Capsule | SolidKind::Pyramid => {
            if axis == NATIVE_AXIS {
                Ok(Strategy::ClosedForm)
            } else {
                Ok(Strategy::MeshSection)
            }
        }
        SolidKind::Torus if axis == NATIVE_AXIS => Ok(Strategy::ClosedForm),
        SolidKind::Torus => Err(GenerationError::AxisUnsupported { kind, axis }),
        SolidKind::Triangle => Ok(Strategy::MeshSection),
        SolidKind::Unknown => Err(GenerationError::Unsupported(kind)),
    }
}

/// Local axis `kind` is actually sliced along when `requested` is asked for.
#[must_use]
pub fn slicing_axis(kind: SolidKind, requested: Axis) -> Axis {
    match strategy_for(kind, requested) {
        Err(GenerationError::AxisUnsupported { .. }) => NATIVE_AXIS,
        _ => requested,
    }
}

fn generator(kind: SolidKind, strategy: Strategy) -> std::result::Result<&'static dyn RingGenerator, GenerationError> {
    let generator: &'static dyn RingGenerator = match (strategy, kind) {
        (Strategy::ArcLength, _) => &SphereGenerator,
        (Strategy::MeshSection, SolidKind::Triangle) => &TriangleGenerator,
        (Strategy::MeshSection, _) => &MeshSectionGenerator,
        (Strategy::ClosedForm, SolidKind::Cone) => &ConeGenerator,
        (Strategy::ClosedForm, SolidKind::Cylinder) => &CylinderGenerator,
        (Strategy::ClosedForm, SolidKind::Capsule) => &CapsuleGenerator,
        (Strategy::ClosedForm, SolidKind::Pyramid) => &PyramidGenerator,
        (Strategy::ClosedForm, SolidKind::Torus) => &TorusGenerator,
        (Strategy::ClosedForm, _) => return Err(GenerationError::Unsupported(kind)),
    };
    Ok(generator)
}

/// Generates the rings of one solid with the strategy its kind and the
/// settings' slicing axis call for.
///
/// An axis the kind cannot be sliced along falls back to [`NATIVE_AXIS`] with
/// a diagnostic.
///
/// # Errors
///
/// Returns [`GenerationError::Unsupported`] for a kind with no generator, or a
/// geometry error for a degenerate frame.
pub fn generate_rings(placed: &PlacedSolid, ctx: &GenerationContext) -> Result<GeneratedRings> {
    let kind = placed.solid.kind;
    let requested = ctx.settings.slice_axis.resolve(NATIVE_AXIS);
    let mut fallback = None;
    let (strategy, axis) = match strategy_for(kind, requested) {
        Ok(strategy) => (strategy, requested),
        Err(GenerationError::AxisUnsupported { .. }) => {
            fallback = Some(
                Diagnostic::warning(
                    DiagnosticKind::AxisUnsupported,
                    format!("{kind:?} cannot be sliced along {requested:?}; using {NATIVE_AXIS:?}"),
                )
                .for_solid(placed.solid.id),
            );
            (strategy_for(kind, NATIVE_AXIS)?, NATIVE_AXIS)
        }
        Err(e) => return Err(e.into()),
    };
    debug!(solid = %placed.solid.id, ?kind, ?strategy, ?axis, "generating rings");
    let mut out = generator(kind, strategy)?.generate(placed, axis, ctx)?;
    if let Some(d) = fallback {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(d);
        diagnostics.extend(std::mem::take(&mut out.diagnostics));
        out.diagnostics = diagnostics;
    }
    Ok(out)
}

/// Geometry of one ring before it is wrapped into a [`Ring`].
pub(crate) struct RingDraft {
    pub arc_position: f64,
    pub center: Point3,
    pub loops: Vec<Vec<Point3>>,
    pub cap_normal: Option<Vector3>,
}

/// Wraps drafts into sequenced rings, skipping empty or collapsed ones.
pub(crate) fn assemble_rings(
    placed: &PlacedSolid,
    frame: &SolidFrame,
    drafts: Vec<RingDraft>,
    diagnostics: &mut Diagnostics,
) -> Vec<Ring> {
    let mut rings: Vec<Ring> = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let circumference: f64 = draft.loops.iter().map(|l| polyline::length(l)).sum();
        if draft.loops.is_empty() || circumference < TOLERANCE {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::DegenerateGeometry,
                    format!("ring at arc position {:.4} collapsed", draft.arc_position),
                )
                .for_solid(placed.solid.id),
            );
            continue;
        }
        let single = draft.loops.len() == 1 && polyline::is_closed(&draft.loops[0]);
        rings.push(Ring {
            sort_key: frame.sort_key(&draft.center),
            object_id: placed.solid.id,
            object_kind: placed.solid.kind,
            full_circumference: circumference,
            full_loop: single,
            meta: RingMeta {
                sequence: rings.len(),
                arc_position: draft.arc_position,
                center: draft.center,
                axis: frame.axis_dir,
                role: if draft.cap_normal.is_some() { RingRole::Cap } else { RingRole::Side },
                partial: !single,
                pristine: draft.loops.first().cloned().unwrap_or_default(),
                cap_normal: draft.cap_normal,
            },
            polylines: draft.loops,
        });
    }
    rings
}

/// Start and end pole markers; roles are reassigned after clipping.
pub(crate) fn pole_markers(start: Point3, end: Point3) -> SolidMarkers {
    SolidMarkers {
        poles: vec![
            Pole {
                position: start,
                role: PoleRole::Start,
                intersected: false,
            },
            Pole {
                position: end,
                role: PoleRole::End,
                intersected: false,
            },
        ],
        ring0: None,
        cut_loops: Vec::new(),
    }
}

/// Records the march-level diagnostics shared by every strategy.
pub(crate) fn note_march(
    march: &marching::March,
    placed: &PlacedSolid,
    ctx: &GenerationContext,
    diagnostics: &mut Diagnostics,
) {
    if march.capped {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::RingCapReached,
                format!("stopped at {} rings", ctx.settings.max_rings),
            )
            .for_solid(placed.solid.id),
        );
    }
    if !march.edge_fit {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::EdgeStitchesDoNotFit,
                format!(
                    "no section holds {} edge stitches; starting at the widest section",
                    ctx.settings.edge_stitch_count
                ),
            )
            .for_solid(placed.solid.id),
        );
    }
}
