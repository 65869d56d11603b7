//! Network graph construction
//!
//! Builds an arena-indexed adjacency structure from an edge list of
//! `(ID, toID)` pairs. Each row becomes one node addressed by its row index;
//! a hash index on `ID` resolves `toID` references in O(n).
//!
//! While building, the graph flags:
//! - dangling references (`toID` absent from the table, treated as an outlet),
//! - self-loops (`ID == toID`),
//! - cycles of length > 1 (iterative walk with in-progress marks),
//! - divergences (several rows claiming one `ID`).
//!
//! and precomputes the headwater → outlet topological order that the
//! accumulation and path length passes consume.

use hydronet_core::network::{
    CyclePolicy, DiagnosticKind, Diagnostics, DivergencePolicy, NetworkId, NetworkOptions,
    NodeTable, TO_ID_COLUMN,
};
use hydronet_core::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

/// Where a node drains to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// `toID` is the outlet sentinel
    Outlet,
    /// Drains into the node at this row index
    Node(usize),
    /// `toID` is absent from the table; treated as an implicit outlet
    Dangling,
    /// `toID` is claimed by several rows, so the target is undefined
    Ambiguous,
}

impl Link {
    /// Whether the chain ends here with a usable outlet
    pub fn is_dead_end(&self) -> bool {
        matches!(self, Link::Outlet | Link::Dangling)
    }
}

/// Walk state for cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A stream network built from a node table.
///
/// Immutable once built. Node `k` is input row `k`.
#[derive(Debug, Clone)]
pub struct FlowNetwork<I: NetworkId> {
    ids: Vec<I>,
    to_ids: Vec<I>,
    index: HashMap<I::Key, usize>,
    links: Vec<Link>,
    upstream: Vec<Vec<usize>>,
    divergent: Vec<bool>,
    cyclic: Vec<bool>,
    /// Headwater → outlet order; cycle members are excluded
    order: Vec<usize>,
    /// Row index of the node where each chain ends (or enters its cycle)
    basins: Vec<usize>,
    diagnostics: Diagnostics<I>,
}

impl<I: NetworkId> FlowNetwork<I> {
    /// Build a network from a node table
    pub fn build(table: &NodeTable<I>, options: &NetworkOptions<I>) -> Result<Self> {
        Self::from_edges(table.ids(), table.to_ids(), options)
    }

    /// Build a network from identifier and downstream identifier slices.
    ///
    /// # Errors
    /// - `ColumnLength` / `InvalidIdentifier` for malformed input
    /// - `DuplicateIdentifier` when `options.on_divergence` is `Fail`
    /// - `CycleDetected` when `options.on_cycle` is `Fail`
    pub fn from_edges(ids: &[I], to_ids: &[I], options: &NetworkOptions<I>) -> Result<Self> {
        if ids.len() != to_ids.len() {
            return Err(Error::ColumnLength {
                name: TO_ID_COLUMN.to_string(),
                expected: ids.len(),
                actual: to_ids.len(),
            });
        }
        if let Some(row) = ids.iter().position(|id| !id.is_valid_node_id()) {
            return Err(Error::InvalidIdentifier {
                row,
                reason: format!("{} cannot identify a node", ids[row]),
            });
        }

        let n = ids.len();
        let mut diagnostics = Diagnostics::new();

        // Step 1: hash index on ID; count rows per duplicated key
        let mut index: HashMap<I::Key, usize> = HashMap::with_capacity(n);
        let mut duplicates: HashMap<I::Key, usize> = HashMap::new();
        for (row, id) in ids.iter().enumerate() {
            match index.entry(id.key()) {
                Entry::Vacant(e) => {
                    e.insert(row);
                }
                Entry::Occupied(_) => {
                    *duplicates.entry(id.key()).or_insert(1) += 1;
                }
            }
        }

        if !duplicates.is_empty() && options.on_divergence == DivergencePolicy::Fail {
            // Report the first duplicated id in row order
            if let Some(id) = ids.iter().find(|id| duplicates.contains_key(&id.key())) {
                return Err(Error::DuplicateIdentifier {
                    id: id.to_string(),
                    count: duplicates[&id.key()],
                });
            }
        }

        let divergent: Vec<bool> = ids
            .iter()
            .map(|id| duplicates.contains_key(&id.key()))
            .collect();

        // Step 2: resolve toID references
        let links: Vec<Link> = to_ids
            .iter()
            .map(|to| {
                if to.is_outlet_sentinel() {
                    Link::Outlet
                } else if duplicates.contains_key(&to.key()) {
                    Link::Ambiguous
                } else {
                    match index.get(&to.key()) {
                        Some(&j) => Link::Node(j),
                        None => Link::Dangling,
                    }
                }
            })
            .collect();

        let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (row, link) in links.iter().enumerate() {
            match *link {
                Link::Node(j) => {
                    if j == row {
                        diagnostics.record(DiagnosticKind::SelfLoop, ids[row]);
                    }
                    upstream[j].push(row);
                }
                Link::Dangling => diagnostics.record(DiagnosticKind::DanglingReference, ids[row]),
                Link::Outlet | Link::Ambiguous => {}
            }
        }

        for (row, &d) in divergent.iter().enumerate() {
            if d {
                diagnostics.record(DiagnosticKind::Divergence, ids[row]);
            }
        }

        // Step 3: cycle detection. Each node has at most one downstream link,
        // so a walk that meets an in-progress node has closed a cycle.
        let mut marks = vec![Mark::Unvisited; n];
        let mut cyclic = vec![false; n];
        let mut basins = vec![0_usize; n];
        let mut path: Vec<usize> = Vec::new();

        for start in 0..n {
            if marks[start] == Mark::Done {
                continue;
            }

            path.clear();
            let mut cur = start;
            let root = loop {
                match marks[cur] {
                    Mark::Done => break basins[cur],
                    Mark::InProgress => {
                        if let Some(pos) = path.iter().position(|&p| p == cur) {
                            let members = &path[pos..];
                            for &m in members {
                                cyclic[m] = true;
                                // Self-loops were already reported as such
                                if members.len() > 1 {
                                    diagnostics.record(DiagnosticKind::Cycle, ids[m]);
                                }
                            }
                        }
                        break cur;
                    }
                    Mark::Unvisited => {
                        marks[cur] = Mark::InProgress;
                        path.push(cur);
                        match links[cur] {
                            Link::Node(j) => cur = j,
                            _ => break cur,
                        }
                    }
                }
            };

            for &p in &path {
                marks[p] = Mark::Done;
                basins[p] = root;
            }
        }

        if options.on_cycle == CyclePolicy::Fail && cyclic.iter().any(|&c| c) {
            let members = cyclic
                .iter()
                .enumerate()
                .filter(|(_, &c)| c)
                .map(|(row, _)| ids[row].to_string())
                .collect();
            return Err(Error::CycleDetected { ids: members });
        }

        // Step 4: topological order (Kahn). A node becomes eligible once all
        // of its upstream contributors have been emitted.
        let mut pending: Vec<usize> = upstream.iter().map(Vec::len).collect();
        let mut frontier: VecDeque<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = frontier.pop_front() {
            order.push(i);
            if let Link::Node(j) = links[i] {
                pending[j] = pending[j].saturating_sub(1);
                if pending[j] == 0 {
                    frontier.push_back(j);
                }
            }
        }

        tracing::debug!(
            nodes = n,
            ordered = order.len(),
            cyclic = n - order.len(),
            "Built flow network"
        );
        diagnostics.emit("network");

        Ok(Self {
            ids: ids.to_vec(),
            to_ids: to_ids.to_vec(),
            index,
            links,
            upstream,
            divergent,
            cyclic,
            order,
            basins,
            diagnostics,
        })
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn id(&self, node: usize) -> I {
        self.ids[node]
    }

    pub fn to_id(&self, node: usize) -> I {
        self.to_ids[node]
    }

    pub fn link(&self, node: usize) -> Link {
        self.links[node]
    }

    /// Row index of the node this one drains into
    pub fn downstream(&self, node: usize) -> Option<usize> {
        match self.links[node] {
            Link::Node(j) => Some(j),
            _ => None,
        }
    }

    /// Immediate upstream contributors
    pub fn upstream(&self, node: usize) -> &[usize] {
        &self.upstream[node]
    }

    /// Row index of the node with identifier `id`.
    ///
    /// `None` if absent or claimed by several rows.
    pub fn position(&self, id: I) -> Option<usize> {
        self.index
            .get(&id.key())
            .copied()
            .filter(|&row| !self.divergent[row])
    }

    /// Whether the node shares its identifier with another row
    pub fn is_divergent(&self, node: usize) -> bool {
        self.divergent[node]
    }

    /// Whether the node lies on a cycle (self-loops included)
    pub fn is_cyclic(&self, node: usize) -> bool {
        self.cyclic[node]
    }

    pub fn is_headwater(&self, node: usize) -> bool {
        self.upstream[node].is_empty()
    }

    /// Rows with no upstream contributors
    pub fn headwaters(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_headwater(i))
    }

    /// Rows whose `toID` is the sentinel or a dangling reference
    pub fn outlets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.links[i].is_dead_end())
    }

    /// Headwater → outlet order over every node not on a cycle.
    ///
    /// Every node appears before the node it drains into.
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }

    /// Structural basin of a node: the row where its chain ends
    pub fn basin(&self, node: usize) -> usize {
        self.basins[node]
    }

    /// Every row in topological order, followed by cycle members in input order
    pub fn sorted_rows(&self) -> Vec<usize> {
        let mut rows = self.order.clone();
        rows.extend((0..self.len()).filter(|&i| self.cyclic[i]));
        rows
    }

    /// Identifiers in [`sorted_rows`](Self::sorted_rows) order
    pub fn sorted_ids(&self) -> Vec<I> {
        self.sorted_rows().into_iter().map(|i| self.ids[i]).collect()
    }

    /// Structural diagnostics found while building
    pub fn diagnostics(&self) -> &Diagnostics<I> {
        &self.diagnostics
    }
}

/// Reorder a node table headwater → outlet.
///
/// Cycle members, which have no valid position, are appended last in
/// input order. Attribute columns travel with their rows.
pub fn sort_table<I: NetworkId>(table: &NodeTable<I>, options: &NetworkOptions<I>) -> Result<NodeTable<I>> {
    let network = FlowNetwork::build(table, options)?;
    table.select(&network.sorted_rows())
}
