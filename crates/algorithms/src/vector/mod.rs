//! Flowline adapters
//!
//! Bridges between line geometries and the scalar network engine:
//! - Flowline tables: segment lengths measured from geometry
//! - Direction: detect and reverse segments digitized against the flow

mod direction;
mod flowlines;

pub use direction::{
    fix_flow_direction, fix_flowline_directions, DirectionFix, DirectionParams, DirectionReport,
    Neighbor,
};
pub use flowlines::{flowline_length, flowline_table};
