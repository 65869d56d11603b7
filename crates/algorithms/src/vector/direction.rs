//! Flowline digitization direction
//!
//! Flowlines are expected to run upstream → downstream: a segment's last
//! coordinate touches its downstream neighbour. When the first coordinate
//! touches instead, the coordinate order is reversed.
//!
//! A failed check is a no-op: the geometry is only modified once the
//! decision has been made successfully.

use geo::{Coord, LineString};
use hydronet_core::network::NetworkId;
use hydronet_core::{Error, Flowline, Result};
use std::collections::HashMap;
use std::fmt::Display;

/// Parameters for direction fixing
#[derive(Debug, Clone)]
pub struct DirectionParams {
    /// Maximum distance between two endpoints considered touching (CRS units).
    /// Default: 1e-6
    pub tolerance: f64,
}

impl Default for DirectionParams {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

/// Geometry a segment's endpoints are compared against
#[derive(Debug, Clone, Copy)]
pub enum Neighbor<'a> {
    /// The segment it drains into: must touch the segment's last coordinate
    Downstream(&'a LineString<f64>),
    /// Segments draining into it (for outlets): must touch its first coordinate
    Upstream(&'a [LineString<f64>]),
}

/// Outcome of a successful direction check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionFix {
    Unchanged,
    Reversed,
}

/// Result of fixing a whole set of flowlines
#[derive(Debug)]
pub struct DirectionReport<I> {
    /// Identifiers of reversed segments
    pub reversed: Vec<I>,
    /// Segments whose direction could not be determined; left unchanged
    pub failures: Vec<(I, Error)>,
}

fn endpoints(line: &LineString<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    if line.0.len() < 2 {
        return None;
    }
    Some((line.0[0], line.0[line.0.len() - 1]))
}

fn touches(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    let d = a - b;
    d.x.hypot(d.y) <= tolerance
}

/// Decide whether `segment` needs reversing, without touching it
fn decide(segment: &LineString<f64>, neighbor: Neighbor<'_>, tolerance: f64) -> std::result::Result<DirectionFix, String> {
    let (start, end) = endpoints(segment).ok_or("segment has fewer than two coordinates")?;

    let targets: Vec<Coord<f64>> = match neighbor {
        Neighbor::Downstream(line) => {
            let (a, b) = endpoints(line).ok_or("downstream segment has fewer than two coordinates")?;
            vec![a, b]
        }
        Neighbor::Upstream(lines) => lines
            .iter()
            .filter_map(endpoints)
            .flat_map(|(a, b)| [a, b])
            .collect(),
    };
    if targets.is_empty() {
        return Err("no neighbouring geometry to compare against".to_string());
    }

    let start_touches = targets.iter().any(|&t| touches(start, t, tolerance));
    let end_touches = targets.iter().any(|&t| touches(end, t, tolerance));

    match (neighbor, start_touches, end_touches) {
        (_, true, true) => Err("both endpoints touch the neighbouring geometry".to_string()),
        (_, false, false) => Err("no endpoint touches the neighbouring geometry".to_string()),
        (Neighbor::Downstream(_), false, true) | (Neighbor::Upstream(_), true, false) => {
            Ok(DirectionFix::Unchanged)
        }
        _ => Ok(DirectionFix::Reversed),
    }
}

/// Check one segment against its neighbour and reverse it if needed.
///
/// # Errors
/// `FlowDirection` ("unable to determine flow direction for segment X")
/// when the segment or its neighbour is degenerate or the endpoints don't
/// match unambiguously. The geometry is unchanged in that case.
pub fn fix_flow_direction(
    segment_id: impl Display,
    segment: &mut LineString<f64>,
    neighbor: Neighbor<'_>,
    params: &DirectionParams,
) -> Result<DirectionFix> {
    let fix = decide(segment, neighbor, params.tolerance).map_err(|reason| Error::FlowDirection {
        segment: segment_id.to_string(),
        reason,
    })?;

    if fix == DirectionFix::Reversed {
        segment.0.reverse();
    }
    Ok(fix)
}

/// Check and fix the direction of every flowline.
///
/// Each segment is compared with its downstream neighbour, or with its
/// upstream neighbours if it is an outlet. Decisions are made against the
/// input geometries before any segment is reversed. Failures are collected
/// and logged once rather than aborting the batch.
pub fn fix_flowline_directions<I: NetworkId>(
    flowlines: &mut [Flowline<I>],
    params: &DirectionParams,
) -> DirectionReport<I> {
    let index: HashMap<I::Key, usize> = flowlines
        .iter()
        .enumerate()
        .map(|(row, f)| (f.id.key(), row))
        .collect();

    let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); flowlines.len()];
    for (row, f) in flowlines.iter().enumerate() {
        if f.to_id.is_outlet_sentinel() {
            continue;
        }
        if let Some(&j) = index.get(&f.to_id.key()) {
            upstream[j].push(row);
        }
    }

    let snapshot: Vec<LineString<f64>> = flowlines.iter().map(|f| f.geometry.clone()).collect();
    let mut report = DirectionReport {
        reversed: Vec::new(),
        failures: Vec::new(),
    };

    for (row, flowline) in flowlines.iter_mut().enumerate() {
        let downstream = if flowline.to_id.is_outlet_sentinel() {
            None
        } else {
            index.get(&flowline.to_id.key()).copied()
        };

        let upstream_lines: Vec<LineString<f64>>;
        let neighbor = match downstream {
            Some(j) => Neighbor::Downstream(&snapshot[j]),
            None => {
                upstream_lines = upstream[row].iter().map(|&u| snapshot[u].clone()).collect();
                Neighbor::Upstream(&upstream_lines)
            }
        };

        match fix_flow_direction(flowline.id, &mut flowline.geometry, neighbor, params) {
            Ok(DirectionFix::Reversed) => report.reversed.push(flowline.id),
            Ok(DirectionFix::Unchanged) => {}
            Err(e) => report.failures.push((flowline.id, e)),
        }
    }

    if !report.failures.is_empty() {
        tracing::warn!(
            count = report.failures.len(),
            "Unable to determine flow direction for {} segment(s); geometries left unchanged",
            report.failures.len()
        );
    }
    tracing::debug!(reversed = report.reversed.len(), "Fixed flowline directions");

    report
}
