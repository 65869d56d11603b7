//! Terminal (outlet) resolution
//!
//! For every node, follows `toID` links downstream until the chain ends and
//! records the identifier of the node where it ended. Visited chains are
//! memoized so that shared downstream suffixes are walked once: total work
//! is O(n) regardless of chain length.

use crate::network::graph::{FlowNetwork, Link};
use crate::network::known_outlet_rows;
use hydronet_core::network::{
    DiagnosticKind, Diagnostics, NetworkId, NetworkOptions, NodeTable, NodeValues, TerminalTable,
};
use hydronet_core::{Algorithm, Error, Result};
use std::marker::PhantomData;

/// Per-node walk state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Unvisited,
    InProgress,
    /// Row index of the terminal, or `None` if undefined
    Resolved(Option<usize>),
}

/// Terminal resolution algorithm
#[derive(Debug, Clone, Copy)]
pub struct TerminalResolver<I = i64>(PhantomData<fn() -> I>);

impl<I> TerminalResolver<I> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<I> Default for TerminalResolver<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: NetworkId> Algorithm for TerminalResolver<I> {
    type Input = NodeTable<I>;
    type Output = TerminalTable<I>;
    type Params = NetworkOptions<I>;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Terminal Resolver"
    }

    fn description(&self) -> &'static str {
        "Find the outlet reached by every node of a stream network"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        terminals(&input, &params)
    }
}

/// Resolve the terminal of every node of a node table.
///
/// Builds the network and prepends its structural diagnostics to the result.
pub fn terminals<I: NetworkId>(table: &NodeTable<I>, options: &NetworkOptions<I>) -> Result<TerminalTable<I>> {
    let network = FlowNetwork::build(table, options)?;
    let result = resolve_terminals(&network, options)?;
    Ok(result.with_prior_diagnostics(network.diagnostics().clone()))
}

/// Resolve the terminal (outlet) identifier of every node.
///
/// A chain ends at:
/// - a node whose `toID` is the sentinel or a dangling reference: that node
///   is the terminal,
/// - a node listed in `options.known_outlets`: forced terminal,
/// - a link to an ambiguous (duplicated) identifier, a cycle, or a divergent
///   row: terminal undefined (`None`).
///
/// When `known_outlets` is given, a chain that ends at a dead end outside the
/// set is reported as `UnregisteredOutlet` and the dead end is used as its
/// terminal; a known outlet that has a downstream neighbour is reported as
/// `OutletNotTerminal` and treated as if its `toID` were the sentinel.
///
/// # Returns
/// `ID` → `terminalID` rows aligned with the network's rows.
pub fn resolve_terminals<I: NetworkId>(
    network: &FlowNetwork<I>,
    options: &NetworkOptions<I>,
) -> Result<TerminalTable<I>> {
    let n = network.len();
    let mut diagnostics = Diagnostics::new();

    let known = known_outlet_rows(network, options);
    let is_known = |node: usize| known.as_ref().is_some_and(|rows| rows[node]);

    if known.is_some() {
        for node in 0..n {
            if is_known(node) && !network.link(node).is_dead_end() {
                diagnostics.record(DiagnosticKind::OutletNotTerminal, network.id(node));
            }
        }
    }

    let mut state = vec![Walk::Unvisited; n];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..n {
        if state[start] != Walk::Unvisited {
            continue;
        }

        path.clear();
        let mut cur = start;
        let terminal = loop {
            match state[cur] {
                Walk::Resolved(t) => break t,
                // Back on the current chain: cycle
                Walk::InProgress => break None,
                Walk::Unvisited => {}
            }

            state[cur] = Walk::InProgress;
            path.push(cur);

            // Nothing links to a divergent row, so it can only start a chain
            if network.is_divergent(cur) {
                break None;
            }
            if is_known(cur) {
                break Some(cur);
            }

            match network.link(cur) {
                Link::Node(j) => cur = j,
                Link::Ambiguous => break None,
                Link::Outlet | Link::Dangling => {
                    if known.is_some() {
                        diagnostics.record(DiagnosticKind::UnregisteredOutlet, network.id(cur));
                    }
                    break Some(cur);
                }
            }
        };

        for &p in &path {
            state[p] = Walk::Resolved(terminal);
        }
    }

    let values: Vec<Option<I>> = state
        .iter()
        .map(|s| match s {
            Walk::Resolved(Some(t)) => Some(network.id(*t)),
            _ => None,
        })
        .collect();

    diagnostics.emit("terminals");
    Ok(NodeValues::new(network.ids().to_vec(), values, diagnostics))
}
