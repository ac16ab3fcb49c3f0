//! Boolean expression layer of the tempora bounded model checker.
//!
//! Everything the checker manipulates (transition relations, unrolled
//! paths, LTL tableaux) is a node in one shared propositional DAG owned by
//! a [`BeManager`]. The manager hash-conses every node, so semantically
//! identical subformulas built through the folding constructors share a
//! single [`Be`] handle and equality is handle equality. The same manager
//! owns the persistent BE/CNF variable translation used by
//! [`BeManager::to_cnf`], which is what lets clause sets produced by
//! separate conversions share model variables inside one solver run.
//!
//! ## Example
//!
//! ```
//! use tempora_expr::BeManager;
//!
//! let mut mgr = BeManager::new();
//! mgr.reserve(2);
//!
//! let a = mgr.var(0);
//! let b = mgr.var(1);
//! let left = mgr.and(a, b);
//! let right = mgr.and(b, a);
//!
//! // Structural hashing: the two conjunctions are the same node.
//! assert_eq!(left, right);
//! ```

mod be;
mod cnf;
mod dump;

pub use be::{Be, BeManager};
pub use cnf::{Cnf, Top};
