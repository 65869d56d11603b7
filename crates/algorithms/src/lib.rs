//! # HydroNet Algorithms
//!
//! Stream network analysis for HydroNet.
//!
//! ## Available Algorithm Categories
//!
//! - **network**: network graph, terminal outlets, drainage area, arbolate
//!   sum, path length, stream order, basin partitioning
//! - **vector**: flowline lengths and digitization direction
//!
//! Independent basins are processed in parallel when the `parallel`
//! feature is enabled (the default). Results are identical either way.

pub mod network;
pub mod vector;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::network::{
        accumulate, accumulate_with, arbolate_sum, downstream_path_length, drainage_area,
        partition_by_basin, path_length, resolve_terminals, sort_table, stream_order, terminals,
        Accumulation, ArbolateSum, Basin, DrainageArea, FlowNetwork, Link, PathLength,
        PathLengthParams, PathOrigin, StreamOrder, TerminalResolver, AREA_COLUMN, LENGTH_COLUMN,
    };
    pub use crate::vector::{
        fix_flow_direction, fix_flowline_directions, flowline_length, flowline_table,
        DirectionFix, DirectionParams, DirectionReport, Neighbor,
    };
    pub use hydronet_core::prelude::*;
}
