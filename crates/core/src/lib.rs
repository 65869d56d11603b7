//! # HydroNet Core
//!
//! Core types, traits and I/O for the HydroNet stream network library.
//!
//! This crate provides:
//! - `NodeTable<I>`: edge-list input of `(id, toid, attributes...)`
//! - `NetworkId`: integer or real-valued node identifiers
//! - `NetworkOptions`: explicit per-call policies
//! - `Diagnostics`: aggregated structural warnings
//! - Algorithm traits for consistent API
//! - JSON I/O for node tables

pub mod error;
pub mod io;
pub mod network;
pub mod vector;

pub use error::{Error, Result};
pub use network::{Diagnostics, NetworkId, NetworkOptions, NodeTable, NodeValues};
pub use vector::Flowline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::network::{
        CyclePolicy, DiagnosticKind, Diagnostics, DivergencePolicy, MissingWeightPolicy,
        NetworkId, NetworkOptions, NodeTable, NodeValues, TerminalTable,
    };
    pub use crate::vector::Flowline;
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in HydroNet.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
