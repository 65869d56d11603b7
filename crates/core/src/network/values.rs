//! Per-node results aligned with the input row order

use crate::network::{Diagnostics, NetworkId};

/// Values computed for every node of a network.
///
/// `values[k]` belongs to the node in input row `k`, so results zip back
/// onto the original table unchanged in row count and order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeValues<I, V> {
    ids: Vec<I>,
    values: Vec<V>,
    diagnostics: Diagnostics<I>,
}

/// `ID` → `terminalID` table; `None` where the terminal is undefined.
pub type TerminalTable<I> = NodeValues<I, Option<I>>;

impl<I: NetworkId, V> NodeValues<I, V> {
    /// Create from aligned id and value vectors.
    ///
    /// # Panics
    /// Panics if the vectors differ in length.
    pub fn new(ids: Vec<I>, values: Vec<V>, diagnostics: Diagnostics<I>) -> Self {
        assert_eq!(ids.len(), values.len(), "ids and values must be aligned");
        Self {
            ids,
            values,
            diagnostics,
        }
    }

    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn diagnostics(&self) -> &Diagnostics<I> {
        &self.diagnostics
    }

    /// Prepend diagnostics from an earlier stage of the same call
    pub fn with_prior_diagnostics(mut self, mut prior: Diagnostics<I>) -> Self {
        prior.extend(self.diagnostics);
        self.diagnostics = prior;
        self
    }

    /// Value for the first row with identifier `id`
    pub fn get(&self, id: I) -> Option<&V> {
        self.ids.iter().position(|&x| x == id).map(|k| &self.values[k])
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &V)> {
        self.ids.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    pub fn into_parts(self) -> (Vec<I>, Vec<V>, Diagnostics<I>) {
        (self.ids, self.values, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::DiagnosticKind;

    #[test]
    fn test_lookup_and_order() {
        let values = NodeValues::new(vec![3_i64, 1, 2], vec![30.0, 10.0, 20.0], Diagnostics::new());
        assert_eq!(values.get(1), Some(&10.0));
        assert_eq!(values.get(9), None);
        let pairs: Vec<(i64, f64)> = values.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(pairs, vec![(3, 30.0), (1, 10.0), (2, 20.0)]);
    }

    #[test]
    fn test_prior_diagnostics_come_first() {
        let mut own = Diagnostics::new();
        own.record(DiagnosticKind::MissingWeight, 1_i64);
        let mut prior = Diagnostics::new();
        prior.record(DiagnosticKind::Cycle, 2_i64);

        let values = NodeValues::new(vec![1_i64], vec![0.0], own).with_prior_diagnostics(prior);
        let kinds: Vec<DiagnosticKind> = values.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::Cycle, DiagnosticKind::MissingWeight]);
    }
}
