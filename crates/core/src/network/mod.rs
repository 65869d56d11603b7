//! Stream network data model
//!
//! - [`NetworkId`]: integer or real-valued node identifiers
//! - [`NodeTable`]: `(id, toid, attributes...)` edge-list input
//! - [`NetworkOptions`]: explicit per-call policies
//! - [`Diagnostics`]: aggregated structural warnings
//! - [`NodeValues`]: per-node results aligned with input rows

mod diagnostics;
mod id;
mod options;
mod table;
mod values;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, MAX_EXAMPLES};
pub use id::NetworkId;
pub use options::{CyclePolicy, DivergencePolicy, MissingWeightPolicy, NetworkOptions};
pub use table::{NodeTable, ID_COLUMN, TO_ID_COLUMN};
pub use values::{NodeValues, TerminalTable};
