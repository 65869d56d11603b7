//! Property tests over random acyclic forests

use hydronet_algorithms::network::{
    drainage_area, path_length, terminals, FlowNetwork, PathOrigin,
};
use hydronet_core::network::{DiagnosticKind, NetworkOptions, NodeTable};
use proptest::prelude::*;
use std::collections::HashMap;

/// A forest over identifiers `1..=n`: every node drains to the sentinel or
/// to a strictly larger identifier, so the network is acyclic.
#[derive(Debug, Clone)]
struct Forest {
    ids: Vec<i64>,
    to_ids: Vec<i64>,
    area: Vec<f64>,
    length: Vec<f64>,
}

impl Forest {
    fn table(&self) -> NodeTable<i64> {
        NodeTable::new(self.ids.clone(), self.to_ids.clone())
            .unwrap()
            .with_column("area", self.area.clone())
            .unwrap()
            .with_column("length", self.length.clone())
            .unwrap()
    }

    fn downstream_row(&self, row: usize) -> Option<usize> {
        let to = self.to_ids[row];
        self.ids.iter().position(|&id| id == to)
    }
}

fn forest() -> impl Strategy<Value = Forest> {
    (1usize..120).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..1.0, n),
            prop::collection::vec(0.0f64..50.0, n),
            prop::collection::vec(0.01f64..10.0, n),
        )
            .prop_map(move |(choice, area, length)| {
                let ids: Vec<i64> = (1..=n as i64).collect();
                let to_ids = ids
                    .iter()
                    .zip(&choice)
                    .map(|(&id, &r)| {
                        let larger = n as i64 - id;
                        if larger == 0 || r < 0.25 {
                            0
                        } else {
                            let k = ((r - 0.25) / 0.75 * larger as f64) as i64;
                            id + 1 + k.min(larger - 1)
                        }
                    })
                    .collect();
                Forest { ids, to_ids, area, length }
            })
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn accumulation_is_own_plus_upstream(f in forest()) {
        let result = drainage_area(&f.table(), "area", &NetworkOptions::default()).unwrap();
        let v = result.values();

        let mut upstream_sum = vec![0.0; f.ids.len()];
        for row in 0..f.ids.len() {
            if let Some(down) = f.downstream_row(row) {
                upstream_sum[down] += v[row];
            }
        }
        for row in 0..f.ids.len() {
            prop_assert!(close(v[row], f.area[row] + upstream_sum[row]));
        }
    }

    #[test]
    fn headwaters_keep_their_own_weight(f in forest()) {
        let table = f.table();
        let network = FlowNetwork::build(&table, &NetworkOptions::default()).unwrap();
        let result = drainage_area(&table, "area", &NetworkOptions::default()).unwrap();

        for node in network.headwaters() {
            prop_assert_eq!(result.values()[node], f.area[node]);
        }
    }

    #[test]
    fn terminal_of_terminal_is_itself(f in forest()) {
        let result = terminals(&f.table(), &NetworkOptions::default()).unwrap();
        let lookup: HashMap<i64, Option<i64>> = result.iter().map(|(id, t)| (id, *t)).collect();

        for (_, terminal) in result.iter() {
            let t = terminal.unwrap();
            prop_assert_eq!(lookup[&t], Some(t));
            let row = f.ids.iter().position(|&id| id == t).unwrap();
            prop_assert_eq!(f.to_ids[row], 0);
        }
    }

    #[test]
    fn path_length_is_additive(f in forest()) {
        let result = path_length(&f.table(), "length", PathOrigin::UpstreamEnd, &NetworkOptions::default()).unwrap();
        let v = result.values();

        for row in 0..f.ids.len() {
            let expected = match f.downstream_row(row) {
                Some(down) => f.length[row] + v[down],
                None => f.length[row] + 0.0,
            };
            prop_assert_eq!(v[row], expected);
        }
    }

    #[test]
    fn row_order_does_not_matter(
        (f, perm) in forest().prop_flat_map(|f| {
            let rows: Vec<usize> = (0..f.ids.len()).collect();
            (Just(f), Just(rows).prop_shuffle())
        })
    ) {
        let table = f.table();
        let shuffled = table.select(&perm).unwrap();
        let options = NetworkOptions::default();

        let area = drainage_area(&table, "area", &options).unwrap();
        let area_shuffled = drainage_area(&shuffled, "area", &options).unwrap();
        for (id, value) in area.iter() {
            prop_assert!(close(*value, *area_shuffled.get(id).unwrap()));
        }

        let path = path_length(&table, "length", PathOrigin::UpstreamEnd, &options).unwrap();
        let path_shuffled = path_length(&shuffled, "length", PathOrigin::UpstreamEnd, &options).unwrap();
        for (id, value) in path.iter() {
            prop_assert_eq!(value, path_shuffled.get(id).unwrap());
        }

        let t = terminals(&table, &options).unwrap();
        let t_shuffled = terminals(&shuffled, &options).unwrap();
        for (id, terminal) in t.iter() {
            prop_assert_eq!(terminal, t_shuffled.get(id).unwrap());
        }
    }

    #[test]
    fn missing_weights_reported_once(
        f in forest(),
        holes in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
    ) {
        let mut area = f.area.clone();
        for hole in &holes {
            let row = hole.index(area.len());
            area[row] = f64::NAN;
        }
        let missing = area.iter().filter(|a| a.is_nan()).count();
        let table = f.table().with_column("area", area.clone()).unwrap();

        let complete = drainage_area(&f.table(), "area", &NetworkOptions::default()).unwrap();
        let result = drainage_area(&table, "area", &NetworkOptions::default()).unwrap();
        let entries = result
            .diagnostics()
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MissingWeight)
            .count();
        prop_assert_eq!(entries, 1);
        prop_assert_eq!(result.diagnostics().count(DiagnosticKind::MissingWeight), missing);

        // Nodes downstream of a hole are undefined; all others are unaffected
        let mut tainted = vec![false; f.ids.len()];
        for row in 0..f.ids.len() {
            if area[row].is_nan() {
                let mut cur = Some(row);
                while let Some(r) = cur {
                    tainted[r] = true;
                    cur = f.downstream_row(r);
                }
            }
        }
        for row in 0..f.ids.len() {
            if tainted[row] {
                prop_assert!(result.values()[row].is_nan());
            } else {
                prop_assert_eq!(result.values()[row], complete.values()[row]);
            }
        }
    }

    #[test]
    fn terminals_are_stable_when_fed_back(f in forest()) {
        let table = f.table();
        let first = terminals(&table, &NetworkOptions::default()).unwrap();

        let mut outlets: Vec<i64> = first.values().iter().flatten().copied().collect();
        outlets.sort_unstable();
        outlets.dedup();

        let options = NetworkOptions::default().with_known_outlets(outlets);
        let second = terminals(&table, &options).unwrap();

        prop_assert_eq!(first.values(), second.values());
        prop_assert_eq!(first.diagnostics(), second.diagnostics());
    }
}
