//! Loopback values and `(k, l)` arithmetic.
//!
//! A bounded path of length `k` either does not loop, loops back to one
//! fixed position, or is checked against every admissible loop position at
//! once. The user-side spellings are `"X"` (no loop), `"*"` (all loops) and
//! an integer; a negative integer is relative to the bound, so `-2` with
//! `k = 10` means position `8`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BmcError;

const NO_LOOP_SYMBOL: &str = "X";
const ALL_LOOPS_SYMBOL: &str = "*";

/// A loopback selector.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Loopback {
    /// The path does not loop.
    None,
    /// Every loop position in `[0, k)` is admissible.
    All,
    /// A fixed loop position; negative values are relative to the bound.
    Loop(i64),
}

impl Loopback {
    pub fn is_none(self) -> bool {
        self == Loopback::None
    }

    pub fn is_all(self) -> bool {
        self == Loopback::All
    }

    /// `true` for a fixed (absolute or relative) loop position.
    pub fn is_single(self) -> bool {
        matches!(self, Loopback::Loop(_))
    }

    /// Resolves a relative loop position against the bound `k`.
    ///
    /// `Loop(-2)` at `k = 10` becomes `Loop(8)`; absolute positions and the
    /// `None`/`All` selectors are unchanged.
    pub fn to_absolute(self, k: usize) -> Loopback {
        match self {
            Loopback::Loop(l) if l < 0 => Loopback::Loop(k as i64 + l),
            other => other,
        }
    }

    /// Checks the `(k, l)` pair: a fixed loopback must satisfy `0 ≤ l < k`
    /// strictly.
    pub fn validate(self, k: usize) -> Result<(), BmcError> {
        match self {
            Loopback::None | Loopback::All => Ok(()),
            Loopback::Loop(l) if l >= 0 && (l as usize) < k => Ok(()),
            Loopback::Loop(l) => Err(BmcError::parameter_inconsistent(format!(
                "loopback {} is not admissible for bound {} (need 0 <= l < k)",
                l, k
            ))),
        }
    }
}

impl fmt::Display for Loopback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loopback::None => write!(f, "{}", NO_LOOP_SYMBOL),
            Loopback::All => write!(f, "{}", ALL_LOOPS_SYMBOL),
            Loopback::Loop(l) => write!(f, "{}", l),
        }
    }
}

impl FromStr for Loopback {
    type Err = BmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NO_LOOP_SYMBOL {
            return Ok(Loopback::None);
        }
        if s == ALL_LOOPS_SYMBOL {
            return Ok(Loopback::All);
        }
        s.parse::<i64>().map(Loopback::Loop).map_err(|_| {
            BmcError::parameter_inconsistent(format!(
                "'{}' is not a loopback value (expected '{}', '{}' or an integer)",
                s, NO_LOOP_SYMBOL, ALL_LOOPS_SYMBOL
            ))
        })
    }
}

/// The time step following `time` on a `(k, l)`-path.
///
/// Without a loop the path ends at `k`, so the successor of `k` is `None`.
/// With a fixed loop the positions `[l, k)` repeat: the successor of `k-1`
/// is `l`.
///
/// # Panics
///
/// Panics if `time` lies outside the admissible evaluation range, or if
/// `loopback` is neither `None` nor an absolute fixed loop with `l < k`.
pub fn succ_time(time: usize, k: usize, loopback: Loopback) -> Option<usize> {
    match loopback {
        Loopback::None => {
            assert!(time <= k, "evaluation time {} beyond bound {}", time, k);
            if time < k {
                Some(time + 1)
            } else {
                None
            }
        }
        Loopback::Loop(l) => {
            assert!(l >= 0, "relative loopback not resolved before succ_time");
            let l = l as usize;
            assert!(l < k, "loopback {} must lie strictly below bound {}", l, k);
            assert!(time < k, "evaluation time {} beyond bound {}", time, k);
            if time < k - 1 {
                Some(time + 1)
            } else {
                Some(l)
            }
        }
        Loopback::All => panic!("succ_time is undefined for the all-loops selector"),
    }
}
