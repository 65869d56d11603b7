//! Flowline features
//!
//! The engine itself only consumes scalar per-node values. Flowlines are the
//! geometry-bearing form that adapters turn into a [`NodeTable`] and whose
//! digitization direction can be checked against their neighbours.
//!
//! [`NodeTable`]: crate::network::NodeTable

use crate::network::NetworkId;
use geo_types::LineString;

/// A stream segment with its topology and line geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Flowline<I: NetworkId> {
    pub id: I,
    /// Downstream segment, or the outlet sentinel
    pub to_id: I,
    /// Geometry, expected to be digitized upstream → downstream
    pub geometry: LineString<f64>,
}

impl<I: NetworkId> Flowline<I> {
    pub fn new(id: I, to_id: I, geometry: LineString<f64>) -> Self {
        Self { id, to_id, geometry }
    }

    /// Whether this segment is a network outlet
    pub fn is_outlet(&self) -> bool {
        self.to_id.is_outlet_sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::line_string;

    #[test]
    fn test_flowline_outlet() {
        let geom = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        assert!(Flowline::new(1_i64, 0, geom.clone()).is_outlet());
        assert!(!Flowline::new(1_i64, 2, geom).is_outlet());
    }
}
