//! Downstream path length
//!
//! Distance along the channel from every node to its terminal outlet. This
//! is the dual of accumulation: values propagate outlet-first, from each
//! node to its upstream contributors, over the reversed topological order.
//!
//! Each value is a fixed chain of additions with no cross-branch
//! aggregation, so results match a reference chain walk exactly.

use crate::network::graph::{FlowNetwork, Link};
use crate::network::{known_outlet_rows, missing_weights, validate_weights, LENGTH_COLUMN};
use hydronet_core::network::{NetworkId, NetworkOptions, NodeTable, NodeValues};
use hydronet_core::{Algorithm, Error, Result};
use std::marker::PhantomData;

/// Which end of a segment the distance is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathOrigin {
    /// From the segment's upstream end: includes its own length, so an
    /// outlet segment's path length is its own length.
    #[default]
    UpstreamEnd,
    /// From the segment's downstream end: zero at outlets.
    DownstreamEnd,
}

/// Parameters for path length
#[derive(Debug, Clone)]
pub struct PathLengthParams<I> {
    pub origin: PathOrigin,
    pub options: NetworkOptions<I>,
}

impl<I> Default for PathLengthParams<I> {
    fn default() -> Self {
        Self {
            origin: PathOrigin::default(),
            options: NetworkOptions::default(),
        }
    }
}

/// Path length algorithm
#[derive(Debug, Clone)]
pub struct PathLength<I = i64> {
    column: String,
    _id: PhantomData<fn() -> I>,
}

impl<I> PathLength<I> {
    /// Reads segment lengths from the `length` column
    pub fn new() -> Self {
        Self::with_column(LENGTH_COLUMN)
    }

    pub fn with_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            _id: PhantomData,
        }
    }
}

impl<I> Default for PathLength<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: NetworkId> Algorithm for PathLength<I> {
    type Input = NodeTable<I>;
    type Output = NodeValues<I, f64>;
    type Params = PathLengthParams<I>;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Path Length"
    }

    fn description(&self) -> &'static str {
        "Channel distance from every segment to its network outlet"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        path_length(&input, &self.column, params.origin, &params.options)
    }
}

/// Build the network from a table and compute path lengths from one of its
/// columns.
pub fn path_length<I: NetworkId>(
    table: &NodeTable<I>,
    column: &str,
    origin: PathOrigin,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    let lengths = table.column(column)?;
    validate_weights(column, lengths, table.len())?;

    let network = FlowNetwork::build(table, options)?;
    let result = path_length_named(&network, column, lengths, origin, options)?;
    Ok(result.with_prior_diagnostics(network.diagnostics().clone()))
}

/// Compute the channel distance from every node to its outlet.
///
/// With [`PathOrigin::UpstreamEnd`]:
/// `pathlength(A) = length(A) + pathlength(B)` where A drains into B, and an
/// outlet's path length is its own length. With
/// [`PathOrigin::DownstreamEnd`]: `pathlength(A) = length(B) + pathlength(B)`
/// and outlets are zero.
///
/// A dangling `toID` counts as an outlet, and so does a node listed in
/// `options.known_outlets`, matching where terminal resolution ends its
/// chain. Nodes on a cycle, divergent rows,
/// nodes draining into an ambiguous identifier and nodes whose chain meets
/// a missing length are undefined (`NaN`), as is everything upstream of
/// them.
pub fn downstream_path_length<I: NetworkId>(
    network: &FlowNetwork<I>,
    lengths: &[f64],
    origin: PathOrigin,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    path_length_named(network, "length", lengths, origin, options)
}

fn path_length_named<I: NetworkId>(
    network: &FlowNetwork<I>,
    column: &str,
    lengths: &[f64],
    origin: PathOrigin,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    validate_weights(column, lengths, network.len())?;
    let diagnostics = missing_weights(network, column, lengths, options.on_missing_weight)?;
    let known = known_outlet_rows(network, options);
    let outlets = known.as_deref();

    // Distance from each node's upstream end to its outlet
    let mut from_top: Vec<Option<f64>> = vec![None; network.len()];
    for &node in network.topological_order().iter().rev() {
        if network.is_divergent(node) {
            continue;
        }
        let own = lengths[node];
        if own.is_nan() {
            continue;
        }
        from_top[node] = below(network, node, outlets, &from_top).map(|rest| own + rest);
    }

    let values: Vec<f64> = match origin {
        PathOrigin::UpstreamEnd => from_top.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        PathOrigin::DownstreamEnd => (0..network.len())
            .map(|node| {
                let defined = !network.is_cyclic(node) && !network.is_divergent(node);
                let value = if defined { below(network, node, outlets, &from_top) } else { None };
                value.unwrap_or(f64::NAN)
            })
            .collect(),
    };

    diagnostics.emit("path_length");
    Ok(NodeValues::new(network.ids().to_vec(), values, diagnostics))
}

/// Distance from the downstream end of `node` to the outlet
fn below<I: NetworkId>(
    network: &FlowNetwork<I>,
    node: usize,
    known: Option<&[bool]>,
    from_top: &[Option<f64>],
) -> Option<f64> {
    if known.is_some_and(|rows| rows[node]) {
        return Some(0.0);
    }
    match network.link(node) {
        Link::Outlet | Link::Dangling => Some(0.0),
        Link::Node(j) => from_top[j],
        Link::Ambiguous => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_core::network::DiagnosticKind;

    fn chain() -> NodeTable<i64> {
        // 1 → 2 → 3 → outlet, lengths 2, 3, 5
        NodeTable::new(vec![1, 2, 3], vec![2, 3, 0])
            .unwrap()
            .with_column("length", vec![2.0, 3.0, 5.0])
            .unwrap()
    }

    #[test]
    fn test_linear_chain_from_upstream_end() {
        let result = path_length(&chain(), "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();
        assert_eq!(result.values(), &[10.0, 8.0, 5.0]);
    }

    #[test]
    fn test_linear_chain_from_downstream_end() {
        let result = path_length(&chain(), "length", PathOrigin::DownstreamEnd, &NetworkOptions::default()).unwrap();
        assert_eq!(result.values(), &[8.0, 5.0, 0.0]);
    }

    #[test]
    fn test_known_outlets_end_the_path() {
        let opts = NetworkOptions::default().with_known_outlets(vec![2, 3]);

        let up = path_length(&chain(), "length", PathOrigin::UpstreamEnd, &opts).unwrap();
        assert_eq!(up.values(), &[5.0, 3.0, 5.0]);

        let down = path_length(&chain(), "length", PathOrigin::DownstreamEnd, &opts).unwrap();
        assert_eq!(down.values(), &[3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_additive_along_chain() {
        let t = NodeTable::new(vec![10_i64, 20, 30, 40], vec![30, 30, 40, 0])
            .unwrap()
            .with_column("length", vec![1.25, 4.5, 2.0, 0.75])
            .unwrap();
        let result = PathLength::new().execute(t.clone(), PathLengthParams::default()).unwrap();
        let v = result.values();
        let len = t.column("length").unwrap();

        assert_eq!(v[3], len[3]);
        assert_eq!(v[2], len[2] + v[3]);
        assert_eq!(v[0], len[0] + v[2]);
        assert_eq!(v[1], len[1] + v[2]);
    }

    #[test]
    fn test_missing_length_undefines_upstream() {
        // 1 → 2 → 3 → outlet, 4 → 3; length of 2 missing
        let t = NodeTable::new(vec![1_i64, 2, 3, 4], vec![2, 3, 0, 3])
            .unwrap()
            .with_column("length", vec![1.0, f64::NAN, 1.0, 1.0])
            .unwrap();
        let result = path_length(&t, "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();
        let v = result.values();

        assert!(v[0].is_nan() && v[1].is_nan());
        assert_eq!(v[2], 1.0);
        assert_eq!(v[3], 2.0);
        assert_eq!(result.diagnostics().count(DiagnosticKind::MissingWeight), 1);
    }

    #[test]
    fn test_cycle_and_dangling() {
        // 1 ⇄ 2 cycle, 3 → 4 → 99 (dangling)
        let t = NodeTable::new(vec![1_i64, 2, 3, 4], vec![2, 1, 4, 99])
            .unwrap()
            .with_column("length", vec![1.0, 1.0, 2.0, 3.0])
            .unwrap();
        let result = path_length(&t, "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();
        let v = result.values();

        assert!(v[0].is_nan() && v[1].is_nan());
        assert_eq!(v[2], 5.0);
        assert_eq!(v[3], 3.0);
        assert_eq!(result.diagnostics().count(DiagnosticKind::DanglingReference), 1);
    }

    #[test]
    fn test_row_order_independent() {
        let forward = path_length(&chain(), "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();
        let reversed = chain().select(&[2, 1, 0]).unwrap();
        let backward = path_length(&reversed, "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();

        for (id, value) in forward.iter() {
            assert_eq!(backward.get(id), Some(value));
        }
        assert_eq!(backward.ids(), &[3, 2, 1]);
    }
}
