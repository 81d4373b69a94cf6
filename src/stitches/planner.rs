//! Stitch planning over a generated layer stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{PipelineError, Result};
use crate::geometry::SolidId;
use crate::math::{polyline, Point3};
use crate::model::Ring;
use crate::pipeline::{CancelToken, LayerOutput};
use crate::settings::Settings;

use super::gauge::Gauge;
use super::nodes::{self, FitResult, Node, NodeId, StitchCycle};
use super::profile::StitchProfile;
use super::scaffold::{link_slots, target_count, ScaffoldKind, ScaffoldSegment, Transition};

/// Nodes and connectors for every ring of a layer stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StitchPlan {
    pub nodes: SlotMap<NodeId, Node>,
    /// Node ids of each layer, in placement order.
    pub layer_nodes: Vec<Vec<NodeId>>,
    pub scaffold_segments: Vec<ScaffoldSegment>,
    pub stitch_counts_per_layer: Vec<usize>,
    /// Primary stitch spacing after fitting, per layer.
    pub spacing_per_layer: Vec<f64>,
    pub fit_per_layer: Vec<FitResult>,
    pub transitions: Vec<Transition>,
    pub diagnostics: Diagnostics,
}

impl StitchPlan {
    /// Nodes of `layer` in placement order.
    pub fn layer(&self, layer: usize) -> impl Iterator<Item = &Node> {
        self.layer_nodes
            .get(layer)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(*id))
    }
}

/// Places stitch nodes on every layer of a [`LayerOutput`] and plans the
/// connectors between consecutive rings of each solid.
pub struct PlanStitches<'a> {
    output: &'a LayerOutput,
    settings: &'a Settings,
    cancel: Option<&'a CancelToken>,
}

impl<'a> PlanStitches<'a> {
    /// Creates a new `PlanStitches` operation.
    #[must_use]
    pub fn new(output: &'a LayerOutput, settings: &'a Settings) -> Self {
        Self {
            output,
            settings,
            cancel: None,
        }
    }

    /// Checks `token` between solids.
    #[must_use]
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Executes the plan.
    ///
    /// Rings that cannot hold their stitches are reported through
    /// [`FitResult::DoesNotFit`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Cancelled`] if the cancel token fires.
    pub fn execute(&self) -> Result<StitchPlan> {
        let mut diagnostics = Diagnostics::new();
        let settings = self.settings.normalized(&mut diagnostics);
        // Only stitch widths matter here, so the gauge's round height is unused.
        let gauge = Gauge::new(
            settings.yarn_level,
            &StitchProfile::default(),
            settings.thresholds.edge_gap_fraction,
        );
        let cycle = StitchCycle::new(&settings, gauge, &mut diagnostics);
        let layers = &self.output.layers;
        info!(layers = layers.len(), "planning stitches");

        let mut chains: BTreeMap<SolidId, Vec<usize>> = BTreeMap::new();
        for (i, ring) in layers.iter().enumerate() {
            chains.entry(ring.object_id).or_default().push(i);
        }
        for chain in chains.values_mut() {
            chain.sort_by_key(|&i| layers[i].meta.sequence);
        }

        let natural: Vec<Vec<usize>> = layers
            .iter()
            .map(|ring| {
                ring.polylines
                    .iter()
                    .map(|p| cycle.natural_count(polyline::length(p), polyline::is_closed(p)))
                    .collect()
            })
            .collect();

        let mut plan = StitchPlan {
            layer_nodes: vec![Vec::new(); layers.len()],
            stitch_counts_per_layer: vec![0; layers.len()],
            spacing_per_layer: vec![cycle.primary_spacing(); layers.len()],
            fit_per_layer: vec![FitResult::default(); layers.len()],
            ..StitchPlan::default()
        };

        for (&solid, chain) in &chains {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(PipelineError::Cancelled.into());
            }
            let mut lower: Option<usize> = None;
            for &layer in chain {
                let natural_total: usize = natural[layer].iter().sum();
                let total = match lower {
                    Some(below) => {
                        let below_count = plan.stitch_counts_per_layer[below];
                        let total = target_count(
                            below_count,
                            natural_total,
                            settings.increase_factor,
                            settings.decrease_factor,
                        );
                        if total != natural_total {
                            diagnostics.push(
                                Diagnostic::info(
                                    DiagnosticKind::TransitionClamped,
                                    format!("{natural_total} stitches clamped to {total} above {below_count}"),
                                )
                                .for_solid(solid)
                                .for_ring(layers[layer].meta.sequence),
                            );
                        }
                        total
                    }
                    None => natural_total,
                };
                self.place_layer(&mut plan, &cycle, layer, &apportion(total, &natural[layer]), total < natural_total);
                if let FitResult::DoesNotFit { required, available, .. } = plan.fit_per_layer[layer] {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::InsufficientLength,
                            format!("ring needs {required:.4} but has {available:.4}"),
                        )
                        .for_solid(solid)
                        .for_ring(layers[layer].meta.sequence),
                    );
                }
                if let Some(below) = lower {
                    let transition = connect(&mut plan, &settings, layers, below, layer, natural_total);
                    plan.transitions.push(transition);
                }
                lower = Some(layer);
            }
            debug!(solid = %solid, rings = chain.len(), "stitches planned");
        }

        plan.diagnostics = diagnostics;
        info!(
            nodes = plan.nodes.len(),
            connectors = plan.scaffold_segments.len(),
            "stitch plan complete"
        );
        Ok(plan)
    }

    fn place_layer(&self, plan: &mut StitchPlan, cycle: &StitchCycle, layer: usize, counts: &[usize], stretch: bool) {
        let ring = &self.output.layers[layer];
        let mut fit: Option<FitResult> = None;
        for (points, &count) in ring.polylines.iter().zip(counts) {
            let (placements, polyline_fit) = nodes::place(points, count, cycle, stretch);
            fit = Some(fit.map_or(polyline_fit, |f| f.worst(polyline_fit)));
            for p in placements {
                let (normal, orientation) = nodes::orientation(&p.tangent, &p.position, ring);
                let (stitch_type, profile) = cycle.entry(p.index);
                let id = plan.nodes.insert_with_key(|id| Node {
                    id,
                    layer,
                    solid: ring.object_id,
                    position: p.position,
                    tangent: p.tangent,
                    normal,
                    orientation,
                    stitch_type: stitch_type.to_owned(),
                    stitch_profile: *profile,
                });
                plan.layer_nodes[layer].push(id);
            }
        }
        let fit = fit.unwrap_or_default();
        plan.stitch_counts_per_layer[layer] = plan.layer_nodes[layer].len();
        plan.spacing_per_layer[layer] = cycle.primary_spacing() * fit.scale();
        plan.fit_per_layer[layer] = fit;
    }
}

/// Splits `total` stitches over polylines in proportion to their natural
/// counts, by largest remainder.
fn apportion(total: usize, natural: &[usize]) -> Vec<usize> {
    let sum: usize = natural.iter().sum();
    if sum == total || natural.is_empty() {
        return natural.to_vec();
    }
    if sum == 0 {
        let mut out = vec![0; natural.len()];
        out[0] = total;
        return out;
    }
    #[allow(clippy::cast_precision_loss)]
    let shares: Vec<f64> = natural.iter().map(|&n| total as f64 * n as f64 / sum as f64).collect();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut out: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
    let mut order: Vec<usize> = (0..natural.len()).collect();
    order.sort_by(|&a, &b| (shares[b] - shares[b].floor()).total_cmp(&(shares[a] - shares[a].floor())));
    let assigned: usize = out.iter().sum();
    for &i in order.iter().cycle().take(total.saturating_sub(assigned)) {
        out[i] += 1;
    }
    out
}

/// Plans the connectors from layer `lower` to layer `upper`.
fn connect(
    plan: &mut StitchPlan,
    settings: &Settings,
    layers: &[Ring],
    lower: usize,
    upper: usize,
    natural_count: usize,
) -> Transition {
    let below = plan.layer_nodes[lower].clone();
    let above = plan.layer_nodes[upper].clone();
    let upper_ring = &layers[upper];
    let links = link_slots(below.len(), above.len(), settings.distribution, upper);

    // Slot 0 is the upper node nearest the first lower node.
    let nearest = |p: &Point3| {
        above
            .iter()
            .enumerate()
            .filter_map(|(i, id)| plan.nodes.get(*id).map(|n| (i, (n.position - p).norm())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    };
    let origin = below
        .first()
        .and_then(|id| plan.nodes.get(*id))
        .and_then(|n| nearest(&n.position))
        .unwrap_or(0);
    let single_loop = upper_ring.polylines.len() == 1 && upper_ring.full_loop;

    let mut segments = Vec::with_capacity(below.len());
    let (mut increases, mut decreases) = (0, 0);
    for (i, id) in below.iter().enumerate() {
        let Some(node) = plan.nodes.get(*id) else {
            continue;
        };
        let start = node.position;
        let target_index = if above.is_empty() {
            None
        } else if single_loop {
            links.get(i).map(|l| (origin + l.slot) % above.len())
        } else {
            nearest(&start)
        };
        let target = target_index.map(|t| above[t]);
        let snapped = upper_ring
            .polylines
            .iter()
            .filter_map(|p| polyline::closest_point(p, &start))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|c| c.point);
        let end = snapped
            .or_else(|| target.and_then(|t| plan.nodes.get(t)).map(|n| n.position))
            .unwrap_or(start);
        let kind = links.get(i).map_or(ScaffoldKind::Regular, |l| l.kind);
        match kind {
            ScaffoldKind::Increase => increases += 1,
            ScaffoldKind::Decrease => decreases += 1,
            ScaffoldKind::Regular => {}
        }
        segments.push(ScaffoldSegment {
            from: *id,
            layer: lower,
            start,
            end,
            target,
            kind,
        });
    }
    plan.scaffold_segments.extend(segments);

    Transition {
        solid: upper_ring.object_id,
        from_layer: lower,
        to_layer: upper,
        lower_count: below.len(),
        natural_count,
        upper_count: above.len(),
        increases,
        decreases,
    }
}
