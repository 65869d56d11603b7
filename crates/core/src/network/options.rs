//! Per-call configuration for network operations

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do when a weight value is missing (`NaN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingWeightPolicy {
    /// Propagate a missing value downstream and report one diagnostic per call
    #[default]
    Warn,
    /// Propagate a missing value downstream without reporting
    Ignore,
    /// Abort the call
    Fail,
}

/// What to do when the network contains a cycle or self-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Leave cycle members undefined and report them
    #[default]
    Warn,
    /// Abort the call
    Fail,
}

/// What to do when several rows claim the same identifier.
///
/// Duplicate identifiers are how a diverging (non-dendritic) network shows
/// up in an edge list: one segment with two downstream targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergencePolicy {
    /// Leave every duplicated row undefined and report it
    Warn,
    /// Abort the call
    #[default]
    Fail,
}

/// Options shared by every network operation.
///
/// This is an explicit value passed to each call; nothing is retained
/// between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions<I> {
    pub on_missing_weight: MissingWeightPolicy,
    pub on_cycle: CyclePolicy,
    pub on_divergence: DivergencePolicy,
    /// Identifiers of nodes that must be treated as network outlets
    /// during terminal resolution.
    pub known_outlets: Option<Vec<I>>,
}

impl<I> Default for NetworkOptions<I> {
    fn default() -> Self {
        Self {
            on_missing_weight: MissingWeightPolicy::default(),
            on_cycle: CyclePolicy::default(),
            on_divergence: DivergencePolicy::default(),
            known_outlets: None,
        }
    }
}

impl<I> NetworkOptions<I> {
    /// Same options with a set of known outlets
    pub fn with_known_outlets(mut self, outlets: Vec<I>) -> Self {
        self.known_outlets = Some(outlets);
        self
    }

    /// Replace the outlet type, keeping every policy.
    pub fn map_outlets<J>(self, f: impl FnMut(I) -> J) -> NetworkOptions<J> {
        NetworkOptions {
            on_missing_weight: self.on_missing_weight,
            on_cycle: self.on_cycle,
            on_divergence: self.on_divergence,
            known_outlets: self
                .known_outlets
                .map(|outlets| outlets.into_iter().map(f).collect()),
        }
    }
}

fn invalid_policy(name: &'static str, value: &str, expected: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: format!("expected one of: {}", expected),
    }
}

impl FromStr for MissingWeightPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            "fail" => Ok(Self::Fail),
            _ => Err(invalid_policy("on_missing_weight", s, "warn, ignore, fail")),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            _ => Err(invalid_policy("on_cycle", s, "warn, fail")),
        }
    }
}

impl FromStr for DivergencePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            _ => Err(invalid_policy("on_divergence", s, "warn, fail")),
        }
    }
}
