//! Strahler stream order
//!
//! Headwaters are order 1. Where two or more branches of the same highest
//! order meet, the order increases by one; otherwise the highest incoming
//! order carries through.
//!
//! Reference:
//! Strahler, A.N. (1957). Quantitative analysis of watershed geomorphology.
//! *Transactions, American Geophysical Union*, 38(6), 913–920.

use crate::network::accumulate::{accumulate_with, Accumulation};
use crate::network::graph::FlowNetwork;
use hydronet_core::network::{Diagnostics, NetworkId, NetworkOptions, NodeTable, NodeValues};
use hydronet_core::{Algorithm, Error, Result};
use std::marker::PhantomData;

/// Highest incoming order and how many branches carry it
#[derive(Debug, Clone, Copy, Default)]
struct Confluence {
    max: u32,
    count: u32,
}

struct Strahler;

impl Accumulation for Strahler {
    type State = Confluence;
    type Value = u32;

    fn seed(&self, _node: usize) -> Option<Confluence> {
        Some(Confluence::default())
    }

    fn absorb(&self, state: &mut Confluence, upstream: u32) {
        if upstream > state.max {
            state.max = upstream;
            state.count = 1;
        } else if upstream == state.max {
            state.count += 1;
        }
    }

    fn finish(&self, state: Confluence) -> u32 {
        match (state.max, state.count) {
            (0, _) => 1,
            (max, count) if count >= 2 => max + 1,
            (max, _) => max,
        }
    }
}

/// Strahler order of every node.
///
/// Undefined (`None`) for cycle members and divergent rows and for every
/// node downstream of a divergent row.
pub fn stream_order<I: NetworkId>(network: &FlowNetwork<I>) -> NodeValues<I, Option<u32>> {
    let values = accumulate_with(network, &Strahler);
    NodeValues::new(network.ids().to_vec(), values, Diagnostics::new())
}

/// Stream order algorithm
#[derive(Debug, Clone, Copy)]
pub struct StreamOrder<I = i64>(PhantomData<fn() -> I>);

impl<I> StreamOrder<I> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<I> Default for StreamOrder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: NetworkId> Algorithm for StreamOrder<I> {
    type Input = NodeTable<I>;
    type Output = NodeValues<I, Option<u32>>;
    type Params = NetworkOptions<I>;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Stream Order"
    }

    fn description(&self) -> &'static str {
        "Strahler stream order from headwaters to outlets"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let network = FlowNetwork::build(&input, &params)?;
        Ok(stream_order(&network).with_prior_diagnostics(network.diagnostics().clone()))
    }
}
