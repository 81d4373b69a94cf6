//! JSON interchange documents for layer stacks and stitch plans.

use serde::Serialize;

use crate::error::{ExportError, Result};
use crate::pipeline::LayerOutput;
use crate::stitches::StitchPlan;

/// Version written into every document.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Document<'a, T> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    body: &'a T,
}

fn to_json<T: Serialize>(format: &'static str, body: &T) -> Result<String> {
    let document = Document {
        format,
        version: FORMAT_VERSION,
        body,
    };
    serde_json::to_string_pretty(&document).map_err(|e| ExportError::Serialize(e).into())
}

/// Layer stack, markers, ranking and diagnostics of a generation pass.
///
/// # Errors
///
/// Returns [`ExportError::Serialize`] if a value cannot be encoded, such as a
/// non-finite coordinate.
pub fn layers_to_json(output: &LayerOutput) -> Result<String> {
    to_json("stitchgeo.layers", output)
}

/// Nodes, connectors and per-layer fits of a stitch plan.
///
/// # Errors
///
/// Returns [`ExportError::Serialize`] if a value cannot be encoded.
pub fn plan_to_json(plan: &StitchPlan) -> Result<String> {
    to_json("stitchgeo.stitches", plan)
}
