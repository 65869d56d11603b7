//! Basin partitioning
//!
//! Splits a network into groups of nodes that share no downstream node.
//! Groups never interact, so each can be processed independently (and in
//! parallel) with no synchronization between them.

use crate::network::graph::FlowNetwork;
use hydronet_core::network::NetworkId;
use std::collections::HashMap;

/// Nodes draining to one outlet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basin {
    /// Row index where the basin's chains end (or enter a cycle)
    pub outlet: usize,
    /// Member rows in topological order
    pub nodes: Vec<usize>,
}

/// Partition the network's topologically ordered nodes by basin.
///
/// Basins appear in the order their first node appears in the topological
/// order, and each basin's node list is itself a valid headwater → outlet
/// order for that basin. Cycle members belong to no basin.
pub fn partition_by_basin<I: NetworkId>(network: &FlowNetwork<I>) -> Vec<Basin> {
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut basins: Vec<Basin> = Vec::new();

    for &node in network.topological_order() {
        let outlet = network.basin(node);
        let k = *slot.entry(outlet).or_insert_with(|| {
            basins.push(Basin {
                outlet,
                nodes: Vec::new(),
            });
            basins.len() - 1
        });
        basins[k].nodes.push(node);
    }

    basins
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydronet_core::network::NetworkOptions;

    #[test]
    fn test_partition_two_basins() {
        // 1 → 2 → outlet, 3 → 4 → outlet, 5 → 4
        let net = FlowNetwork::from_edges(&[1_i64, 2, 3, 4, 5], &[2, 0, 4, 0, 4], &NetworkOptions::default())
            .unwrap();
        let basins = partition_by_basin(&net);

        assert_eq!(basins.len(), 2);
        let a = basins.iter().find(|b| b.outlet == 1).unwrap();
        let b = basins.iter().find(|b| b.outlet == 3).unwrap();
        assert_eq!(a.nodes, vec![0, 1]);
        assert_eq!(b.nodes.len(), 3);
        assert_eq!(*b.nodes.last().unwrap(), 3);
    }

    #[test]
    fn test_partition_covers_acyclic_nodes_once() {
        let net = FlowNetwork::from_edges(
            &[1_i64, 2, 3, 4, 5, 6],
            &[2, 3, 2, 5, 0, 5],
            &NetworkOptions::default(),
        )
        .unwrap();
        let basins = partition_by_basin(&net);

        let mut all: Vec<usize> = basins.iter().flat_map(|b| b.nodes.clone()).collect();
        all.sort_unstable();
        // rows 1 and 2 form a cycle and are excluded
        assert_eq!(all, vec![0, 3, 4, 5]);
    }
}
