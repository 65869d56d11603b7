//! Structural warnings collected during a network operation
//!
//! Diagnostics are aggregated per kind: a network with ten thousand dangling
//! references yields one [`Diagnostic`] carrying the count and a handful of
//! example identifiers, not ten thousand messages.

use crate::network::NetworkId;
use std::fmt;

/// Maximum number of example identifiers kept per diagnostic
pub const MAX_EXAMPLES: usize = 8;

/// Kind of structural warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `toID` references an identifier absent from the table
    DanglingReference,
    /// `ID == toID`
    SelfLoop,
    /// Node lies on a cycle of length > 1
    Cycle,
    /// Several rows claim the same identifier
    Divergence,
    /// Weight value is missing
    MissingWeight,
    /// Chain ends at a dead end that is not a known outlet
    UnregisteredOutlet,
    /// Known outlet has a downstream neighbour of its own
    OutletNotTerminal,
}

impl DiagnosticKind {
    fn describe(&self) -> &'static str {
        match self {
            Self::DanglingReference => "reference a downstream identifier absent from the network",
            Self::SelfLoop => "drain into themselves",
            Self::Cycle => "lie on a flow cycle and are left undefined",
            Self::Divergence => "share an identifier with another row and are left undefined",
            Self::MissingWeight => "have a missing weight; downstream values are undefined",
            Self::UnregisteredOutlet => "end at an outlet that is not in the known outlet set",
            Self::OutletNotTerminal => "are known outlets with a downstream neighbour; treated as terminal",
        }
    }
}

/// One aggregated warning
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic<I> {
    pub kind: DiagnosticKind,
    /// Number of affected nodes
    pub count: usize,
    /// First few affected identifiers, in encounter order
    pub examples: Vec<I>,
}

impl<I: NetworkId> fmt::Display for Diagnostic<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let examples: Vec<String> = self.examples.iter().map(|id| id.to_string()).collect();
        write!(
            f,
            "{} node(s) {} (e.g. {})",
            self.count,
            self.kind.describe(),
            examples.join(", ")
        )
    }
}

/// Diagnostics gathered during one call
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics<I> {
    entries: Vec<Diagnostic<I>>,
}

impl<I> Default for Diagnostics<I> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<I: NetworkId> Diagnostics<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one affected node under `kind`
    pub fn record(&mut self, kind: DiagnosticKind, id: I) {
        match self.entries.iter_mut().find(|d| d.kind == kind) {
            Some(entry) => {
                entry.count += 1;
                if entry.examples.len() < MAX_EXAMPLES {
                    entry.examples.push(id);
                }
            }
            None => self.entries.push(Diagnostic {
                kind,
                count: 1,
                examples: vec![id],
            }),
        }
    }

    /// Append another call's diagnostics, merging entries of the same kind
    pub fn extend(&mut self, other: Diagnostics<I>) {
        for incoming in other.entries {
            match self.entries.iter_mut().find(|d| d.kind == incoming.kind) {
                Some(entry) => {
                    entry.count += incoming.count;
                    let room = MAX_EXAMPLES.saturating_sub(entry.examples.len());
                    entry.examples.extend(incoming.examples.into_iter().take(room));
                }
                None => self.entries.push(incoming),
            }
        }
    }

    /// Log every entry once at warn level
    pub fn emit(&self, operation: &str) {
        for entry in &self.entries {
            tracing::warn!(operation, kind = ?entry.kind, count = entry.count, "{}", entry);
        }
    }

    /// Entry for `kind`, if any node was affected
    pub fn get(&self, kind: DiagnosticKind) -> Option<&Diagnostic<I>> {
        self.entries.iter().find(|d| d.kind == kind)
    }

    /// Number of affected nodes for `kind`
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.get(kind).map_or(0, |d| d.count)
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic<I>> {
        self.entries.iter()
    }

    /// Number of distinct diagnostic kinds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
