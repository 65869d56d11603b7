//! Stream network algorithms
//!
//! Derived attributes of a dendritic stream network given as an edge list:
//! - Network graph: index, topology checks, topological order
//! - Terminal resolution: outlet reached by every node
//! - Accumulation: drainage area, arbolate sum
//! - Path length: distance from every node to its outlet
//! - Stream order: Strahler order
//! - Basin partitioning: independent subtrees for parallel processing

mod accumulate;
mod graph;
mod partition;
mod path_length;
mod stream_order;
mod terminal;

pub use accumulate::{
    accumulate, accumulate_with, arbolate_sum, drainage_area, Accumulation, ArbolateSum,
    DrainageArea,
};
pub use graph::{sort_table, FlowNetwork, Link};
pub use partition::{partition_by_basin, Basin};
pub use path_length::{downstream_path_length, path_length, PathLength, PathLengthParams, PathOrigin};
pub use stream_order::{stream_order, StreamOrder};
pub use terminal::{resolve_terminals, terminals, TerminalResolver};

use hydronet_core::network::{
    DiagnosticKind, Diagnostics, MissingWeightPolicy, NetworkId, NetworkOptions,
};
use std::collections::HashSet;
use hydronet_core::{Error, Result};

/// Default column for segment contributing area
pub const AREA_COLUMN: &str = "area";
/// Default column for segment length
pub const LENGTH_COLUMN: &str = "length";

/// Check a weight column against the input contract: one value per row,
/// non-negative where present.
pub(crate) fn validate_weights(column: &str, weights: &[f64], rows: usize) -> Result<()> {
    if weights.len() != rows {
        return Err(Error::ColumnLength {
            name: column.to_string(),
            expected: rows,
            actual: weights.len(),
        });
    }
    if let Some(row) = weights.iter().position(|&w| w < 0.0 || w.is_infinite()) {
        return Err(Error::InvalidWeight {
            column: column.to_string(),
            row,
            value: weights[row],
        });
    }
    Ok(())
}

/// Apply the missing-weight policy.
///
/// Returns the diagnostics to attach to the call (at most one entry), or
/// `MissingWeight` if the policy is `Fail`.
pub(crate) fn missing_weights<I: NetworkId>(
    network: &FlowNetwork<I>,
    column: &str,
    weights: &[f64],
    policy: MissingWeightPolicy,
) -> Result<Diagnostics<I>> {
    let mut diagnostics = Diagnostics::new();
    let mut missing = weights.iter().enumerate().filter(|(_, w)| w.is_nan()).map(|(row, _)| row);

    match policy {
        MissingWeightPolicy::Ignore => {}
        MissingWeightPolicy::Fail => {
            if let Some(row) = missing.next() {
                return Err(Error::MissingWeight {
                    column: column.to_string(),
                    id: network.id(row).to_string(),
                });
            }
        }
        MissingWeightPolicy::Warn => {
            for row in missing {
                diagnostics.record(DiagnosticKind::MissingWeight, network.id(row));
            }
        }
    }

    Ok(diagnostics)
}

/// Rows whose identifier is listed in `options.known_outlets`.
///
/// `None` when no outlet set was given.
pub(crate) fn known_outlet_rows<I: NetworkId>(
    network: &FlowNetwork<I>,
    options: &NetworkOptions<I>,
) -> Option<Vec<bool>> {
    let outlets = options.known_outlets.as_ref()?;
    let keys: HashSet<I::Key> = outlets.iter().map(|id| id.key()).collect();
    Some(
        network
            .ids()
            .iter()
            .map(|id| keys.contains(&id.key()))
            .collect(),
    )
}
