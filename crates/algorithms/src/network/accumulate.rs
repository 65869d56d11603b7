//! Upstream-to-downstream accumulation
//!
//! Generic aggregation over the network's topological order: every node's
//! value is its own contribution combined with the finished values of all of
//! its upstream contributors. Drainage area and arbolate sum are both plain
//! sums of a per-segment weight (area and length respectively); stream order
//! reuses the same traversal with a different combination rule.
//!
//! # Algorithm
//! 1. Headwaters (no upstream contributors) start eligible
//! 2. Finish each eligible node and fold its value into its downstream node
//! 3. A downstream node becomes eligible when all contributors are folded in
//!
//! Independent basins share no node, so they are processed separately (in
//! parallel with the `parallel` feature). Within a basin the order is fixed,
//! so floating-point sums are identical either way.

use crate::maybe_rayon::*;
use crate::network::graph::FlowNetwork;
use crate::network::partition::partition_by_basin;
use crate::network::{missing_weights, validate_weights, AREA_COLUMN, LENGTH_COLUMN};
use hydronet_core::network::{NetworkId, NetworkOptions, NodeTable, NodeValues};
use hydronet_core::{Algorithm, Error, Result};
use std::collections::HashMap;
use std::marker::PhantomData;

/// A rule for combining a node's own contribution with its upstream values.
pub trait Accumulation: Sync {
    /// Running state while contributors are folded in
    type State: Send;
    /// Finished per-node value
    type Value: Copy + Send;

    /// Own contribution of `node`; `None` marks it (and everything
    /// downstream of it) undefined.
    fn seed(&self, node: usize) -> Option<Self::State>;

    /// Fold in the finished value of one upstream contributor
    fn absorb(&self, state: &mut Self::State, upstream: Self::Value);

    /// Turn the running state into the node's value
    fn finish(&self, state: Self::State) -> Self::Value;
}

/// Run an accumulation over every node of the network.
///
/// # Returns
/// One entry per row, aligned with the network's rows. `None` for nodes on
/// a cycle, divergent rows, and every node downstream of an undefined seed.
pub fn accumulate_with<I, A>(network: &FlowNetwork<I>, rule: &A) -> Vec<Option<A::Value>>
where
    I: NetworkId,
    A: Accumulation,
{
    let basins = partition_by_basin(network);

    let results: Vec<Vec<(usize, Option<A::Value>)>> = basins
        .into_par_iter()
        .map(|basin| accumulate_basin(network, &basin.nodes, rule))
        .collect();

    let mut values = vec![None; network.len()];
    for (node, value) in results.into_iter().flatten() {
        values[node] = value;
    }
    values
}

/// Accumulate one basin given its nodes in topological order
fn accumulate_basin<I, A>(
    network: &FlowNetwork<I>,
    order: &[usize],
    rule: &A,
) -> Vec<(usize, Option<A::Value>)>
where
    I: NetworkId,
    A: Accumulation,
{
    let position: HashMap<usize, usize> = order.iter().enumerate().map(|(k, &i)| (i, k)).collect();

    let mut states: Vec<Option<A::State>> = order
        .iter()
        .map(|&i| {
            if network.is_divergent(i) {
                None
            } else {
                rule.seed(i)
            }
        })
        .collect();

    let mut out = Vec::with_capacity(order.len());
    for (k, &node) in order.iter().enumerate() {
        // All contributors precede `node`, so its state is final here
        let value = states[k].take().map(|s| rule.finish(s));

        let below = network.downstream(node).and_then(|j| position.get(&j)).copied();
        if let Some(kd) = below {
            match value {
                Some(v) => {
                    if let Some(state) = states[kd].as_mut() {
                        rule.absorb(state, v);
                    }
                }
                None => states[kd] = None,
            }
        }

        out.push((node, value));
    }
    out
}

/// Sum of a per-node weight column
struct WeightSum<'a> {
    weights: &'a [f64],
}

impl Accumulation for WeightSum<'_> {
    type State = f64;
    type Value = f64;

    fn seed(&self, node: usize) -> Option<f64> {
        let w = self.weights[node];
        (!w.is_nan()).then_some(w)
    }

    fn absorb(&self, state: &mut f64, upstream: f64) {
        *state += upstream;
    }

    fn finish(&self, state: f64) -> f64 {
        state
    }
}

/// Accumulate a weight column over the network.
///
/// Each node's value equals its own weight plus the accumulated values of
/// every node whose `toID` is that node. Headwaters receive their own
/// weight.
///
/// # Arguments
/// * `network` - Network built from the node table
/// * `weights` - Non-negative weight per row; `NaN` is missing
/// * `options` - `on_missing_weight` decides whether missing weights warn,
///   stay silent, or abort
///
/// # Returns
/// Accumulated values aligned with the input rows; `NaN` where undefined.
pub fn accumulate<I: NetworkId>(
    network: &FlowNetwork<I>,
    weights: &[f64],
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    accumulate_named(network, "weight", weights, options)
}

fn accumulate_named<I: NetworkId>(
    network: &FlowNetwork<I>,
    column: &str,
    weights: &[f64],
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    validate_weights(column, weights, network.len())?;
    let diagnostics = missing_weights(network, column, weights, options.on_missing_weight)?;

    let values = accumulate_with(network, &WeightSum { weights })
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    diagnostics.emit("accumulate");
    Ok(NodeValues::new(network.ids().to_vec(), values, diagnostics))
}

/// Build the network from a table and accumulate one of its columns.
///
/// Column presence and weight validity are checked before the network is
/// built, so contract violations abort before any traversal.
fn accumulate_table<I: NetworkId>(
    table: &NodeTable<I>,
    column: &str,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    let weights = table.column(column)?;
    validate_weights(column, weights, table.len())?;

    let network = FlowNetwork::build(table, options)?;
    let result = accumulate_named(&network, column, weights, options)?;
    Ok(result.with_prior_diagnostics(network.diagnostics().clone()))
}

/// Total upstream drainage area of every node.
///
/// `column` holds each segment's own contributing area.
pub fn drainage_area<I: NetworkId>(
    table: &NodeTable<I>,
    column: &str,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    accumulate_table(table, column, options)
}

/// Arbolate sum: total channel length upstream of every node, the node's
/// own segment included.
///
/// `column` holds each segment's length.
pub fn arbolate_sum<I: NetworkId>(
    table: &NodeTable<I>,
    column: &str,
    options: &NetworkOptions<I>,
) -> Result<NodeValues<I, f64>> {
    accumulate_table(table, column, options)
}

/// Drainage area algorithm
#[derive(Debug, Clone)]
pub struct DrainageArea<I = i64> {
    column: String,
    _id: PhantomData<fn() -> I>,
}

impl<I> DrainageArea<I> {
    /// Reads segment areas from the `area` column
    pub fn new() -> Self {
        Self::with_column(AREA_COLUMN)
    }

    pub fn with_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            _id: PhantomData,
        }
    }
}

impl<I> Default for DrainageArea<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: NetworkId> Algorithm for DrainageArea<I> {
    type Input = NodeTable<I>;
    type Output = NodeValues<I, f64>;
    type Params = NetworkOptions<I>;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Drainage Area"
    }

    fn description(&self) -> &'static str {
        "Accumulate contributing area from headwaters to outlets"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        drainage_area(&input, &self.column, &params)
    }
}

/// Arbolate sum algorithm
#[derive(Debug, Clone)]
pub struct ArbolateSum<I = i64> {
    column: String,
    _id: PhantomData<fn() -> I>,
}

impl<I> ArbolateSum<I> {
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

impl<I> Default for ArbolateSum<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: NetworkId> Algorithm for ArbolateSum<I> {
    type Input = NodeTable<I>;
    type Output = NodeValues<I, f64>;
    type Params = NetworkOptions<I>;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Arbolate Sum"
    }

    fn description(&self) -> &'static str {
        "Accumulate total upstream channel length including each segment"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        arbolate_sum(&input, &self.column, &params)
    }
}
