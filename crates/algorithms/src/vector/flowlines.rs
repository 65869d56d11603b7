//! Flowline measurements and conversion to node tables

use crate::network::LENGTH_COLUMN;
use geo::{Euclidean, Length, LineString};
use hydronet_core::network::{NetworkId, NodeTable};
use hydronet_core::{Flowline, Result};

/// Euclidean length of a flowline geometry, in CRS units
pub fn flowline_length(geometry: &LineString<f64>) -> f64 {
    geometry.length::<Euclidean>()
}

/// Convert flowlines into a node table with a `length` column.
///
/// Lengths are in CRS units; project to a metric CRS beforehand if
/// kilometres or metres are needed.
pub fn flowline_table<I: NetworkId>(flowlines: &[Flowline<I>]) -> Result<NodeTable<I>> {
    let ids = flowlines.iter().map(|f| f.id).collect();
    let to_ids = flowlines.iter().map(|f| f.to_id).collect();
    let lengths = flowlines.iter().map(|f| flowline_length(&f.geometry)).collect();

    NodeTable::new(ids, to_ids)?.with_column(LENGTH_COLUMN, lengths)
}
