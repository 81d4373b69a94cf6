//! The two passes callers run: [`GenerateLayers`] turns solids into a sorted
//! layer stack, and [`crate::stitches::PlanStitches`] places stitches on it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{GenerationError, PipelineError, Result, StitchgeoError};
use crate::generators::{generate_rings, slicing_axis, GeneratedRings, GenerationContext, NATIVE_AXIS};
use crate::geometry::{PlacedSolid, Solid, SolidFrame, SolidId, SolidKind};
use crate::math::Axis;
use crate::model::{LayerStats, Ring, SolidMarkers};
use crate::orientation::orient;
use crate::priority::{clip_rings, rank_solids, ClipParams, PriorityRanking};
use crate::settings::Settings;

/// Shared flag a caller sets to abort a running pass.
///
/// Checked between stages and between solids; a cancelled pass returns
/// [`PipelineError::Cancelled`] and no output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of one [`GenerateLayers`] pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerOutput {
    /// Every ring of every solid, ascending by sort key, then solid order,
    /// then sequence.
    pub layers: Vec<Ring>,
    pub markers: BTreeMap<SolidId, SolidMarkers>,
    pub ranking: PriorityRanking,
    pub stats: LayerStats,
    pub diagnostics: Diagnostics,
}

impl LayerOutput {
    /// Layers of one solid in sequence order.
    pub fn solid_layers(&self, id: SolidId) -> impl Iterator<Item = &Ring> {
        let mut rings: Vec<&Ring> = self.layers.iter().filter(|r| r.object_id == id).collect();
        rings.sort_by_key(|r| r.meta.sequence);
        rings.into_iter()
    }
}

/// Rings of one solid as they move through the stages.
struct SolidLayers {
    placed: PlacedSolid,
    axis: Axis,
    generated: GeneratedRings,
}

/// Generates, ranks, clips and orients the rings of a set of solids.
pub struct GenerateLayers<'a> {
    solids: &'a [Solid],
    settings: &'a Settings,
    cancel: Option<&'a CancelToken>,
}

impl<'a> GenerateLayers<'a> {
    /// Creates a new `GenerateLayers` operation.
    #[must_use]
    pub fn new(solids: &'a [Solid], settings: &'a Settings) -> Self {
        Self {
            solids,
            settings,
            cancel: None,
        }
    }

    /// Checks `token` between stages.
    #[must_use]
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn check_cancel(&self) -> Result<()> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(PipelineError::Cancelled.into());
        }
        Ok(())
    }

    /// Executes the pass.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Unsupported`] if a visible solid has an
    /// unknown kind, [`PipelineError::InvalidInput`] if two solids share an
    /// id, and [`PipelineError::Cancelled`] if the cancel token fires.
    pub fn execute(&self) -> Result<LayerOutput> {
        let mut diagnostics = Diagnostics::new();
        let settings = self.settings.normalized(&mut diagnostics);
        let ctx = GenerationContext::new(&settings, &mut diagnostics);
        info!(solids = self.solids.len(), yarn_level = settings.yarn_level, "generating layers");

        let placed = self.place(&mut diagnostics)?;
        self.check_cancel()?;

        let requested = settings.slice_axis.resolve(NATIVE_AXIS);
        let generated: Vec<Result<GeneratedRings>> =
            placed.par_iter().map(|p| generate_rings(p, &ctx)).collect();
        let mut solids: Vec<SolidLayers> = Vec::with_capacity(placed.len());
        for (p, result) in placed.into_iter().zip(generated) {
            match result {
                Ok(generated) => {
                    let axis = slicing_axis(p.solid.kind, requested);
                    solids.push(SolidLayers {
                        placed: p,
                        axis,
                        generated,
                    });
                }
                Err(StitchgeoError::Generation(e @ GenerationError::Unsupported(_))) => return Err(e.into()),
                Err(e) => diagnostics.push(
                    Diagnostic::warning(DiagnosticKind::DegenerateGeometry, format!("solid skipped: {e}"))
                        .for_solid(p.solid.id),
                ),
            }
        }
        self.check_cancel()?;

        let all: Vec<PlacedSolid> = solids.iter().map(|s| s.placed.clone()).collect();
        let ranking = if settings.cross_object_clipping {
            rank_solids(&all, &settings.thresholds, settings.seed)
        } else {
            PriorityRanking::default()
        };
        self.check_cancel()?;

        let by_id: BTreeMap<SolidId, &PlacedSolid> = all.iter().map(|p| (p.solid.id, p)).collect();
        let spacing = ctx.spacing;
        let stitch_width = spacing - ctx.gauge.edge_gap;
        let params = ClipParams::new(&settings.thresholds, ctx.gauge.yarn_width, stitch_width, spacing);
        let oval_ratio = settings.thresholds.oval_ratio;
        let finished: Vec<(SolidId, Vec<Ring>, SolidMarkers, Diagnostics)> = solids
            .into_par_iter()
            .map(|s| {
                let id = s.placed.solid.id;
                let cutters: Vec<&PlacedSolid> = ranking
                    .cutters_of(id)
                    .iter()
                    .filter_map(|c| by_id.get(c).copied())
                    .collect();
                let GeneratedRings {
                    rings,
                    mut markers,
                    mut diagnostics,
                } = s.generated;
                let clipped = clip_rings(rings, &cutters, &params);
                if clipped.removed > 0 {
                    debug!(solid = %id, removed = clipped.removed, "rings clipped away");
                }
                let mut rings = clipped.rings;
                markers.cut_loops = clipped.cut_loops;
                match SolidFrame::new(&s.placed, s.axis) {
                    Ok(frame) => orient(&frame, &mut rings, &mut markers, &cutters, spacing, oval_ratio),
                    Err(e) => diagnostics.push(
                        Diagnostic::warning(DiagnosticKind::DegenerateGeometry, format!("orientation skipped: {e}"))
                            .for_solid(id),
                    ),
                }
                (id, rings, markers, diagnostics)
            })
            .collect();
        self.check_cancel()?;

        let order: BTreeMap<SolidId, usize> = self
            .solids
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        let mut output = LayerOutput {
            ranking,
            ..LayerOutput::default()
        };
        for (id, rings, markers, solid_diagnostics) in finished {
            diagnostics.extend(solid_diagnostics);
            output.layers.extend(rings);
            output.markers.insert(id, markers);
        }
        output.layers.sort_by(|a, b| {
            a.sort_key
                .total_cmp(&b.sort_key)
                .then_with(|| order.get(&a.object_id).cmp(&order.get(&b.object_id)))
                .then(a.meta.sequence.cmp(&b.meta.sequence))
        });
        output.stats = LayerStats {
            layer_count: output.layers.len(),
            total_line_count: output.layers.iter().map(|r| r.polylines.len()).sum(),
        };
        output.diagnostics = diagnostics;
        info!(
            layers = output.stats.layer_count,
            lines = output.stats.total_line_count,
            "layer generation complete"
        );
        Ok(output)
    }

    /// Places every visible solid, skipping singular ones.
    fn place(&self, diagnostics: &mut Diagnostics) -> Result<Vec<PlacedSolid>> {
        let mut seen = BTreeSet::new();
        let mut placed = Vec::with_capacity(self.solids.len());
        for solid in self.solids.iter().filter(|s| s.visible) {
            if !seen.insert(solid.id) {
                return Err(PipelineError::InvalidInput(format!("duplicate solid id {}", solid.id)).into());
            }
            if solid.kind == SolidKind::Unknown {
                return Err(GenerationError::Unsupported(solid.kind).into());
            }
            match PlacedSolid::new(solid) {
                Ok(p) => placed.push(p),
                Err(e) => diagnostics.push(
                    Diagnostic::warning(DiagnosticKind::DegenerateGeometry, format!("solid skipped: {e}"))
                        .for_solid(solid.id),
                ),
            }
        }
        Ok(placed)
    }
}
