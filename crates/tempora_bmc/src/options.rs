//! Check configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loopback::Loopback;

/// Options shared by every checking algorithm.
///
/// The bound range replaces the original single-bound/`must_inc_length`
/// pair: the LTL algorithms walk `min_bound..=max_bound`, the invariant
/// algorithms iterate up to `max_bound`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Solver backend name (see `tempora_solver::available_solvers`).
    pub solver: String,
    /// First bound the LTL algorithms try.
    pub min_bound: usize,
    /// Last bound any algorithm tries.
    pub max_bound: usize,
    /// Loopback selector for LTL problems.
    pub loopback: Loopback,
    /// Directory to drop DIMACS dumps of generated problems into, if any.
    pub dump_dimacs: Option<PathBuf>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            solver: "cadical".to_string(),
            min_bound: 0,
            max_bound: 10,
            loopback: Loopback::All,
            dump_dimacs: None,
        }
    }
}

impl CheckOptions {
    /// Options exploring exactly one bound.
    pub fn at_bound(k: usize) -> Self {
        CheckOptions {
            min_bound: k,
            max_bound: k,
            ..CheckOptions::default()
        }
    }

    pub fn with_loopback(mut self, loopback: Loopback) -> Self {
        self.loopback = loopback;
        self
    }

    pub fn with_max_bound(mut self, max_bound: usize) -> Self {
        self.max_bound = max_bound;
        self
    }
}
