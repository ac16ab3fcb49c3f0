//! Bounded model checking core.
//!
//! Given a symbolic FSM and a property, an invariant or an LTL formula,
//! this crate builds a propositional formula that is satisfiable iff the
//! property is violated by a finite execution, converts it to CNF, hands
//! it to a SAT solver, and decodes a witness trace from any satisfying
//! assignment.
//!
//! The pieces, bottom up:
//!
//! - [`vars`]: the boolean-variable encoding: untimed current/input/next
//!   blocks plus a growing block of time frames, with the shifting
//!   primitives that move FSM expressions onto frames;
//! - [`fsm`] / [`conv`]: the FSM as delivered by the flattener and its
//!   lowering to boolean expressions;
//! - [`model`]: `init0`, unrollings and fairness constraints;
//! - [`wff`] / [`tableau`]: LTL formulas, negation normal form, and the
//!   bounded `(k, l)` tableau;
//! - [`gen`]: one-shot problem construction;
//! - [`check`]: the invariant procedures (classic, Eén–Sörensson, ZigZag,
//!   Dual) and the LTL procedures (non-incremental, incremental);
//! - [`trace`]: decoding SAT models back into state/input sequences;
//! - [`dump`]: DIMACS output;
//! - [`session`]: the object tying a variable manager and an FSM
//!   together.
//!
//! ## Example
//!
//! ```
//! use tempora_bmc::{BmcSession, CheckOptions, InvariantAlgorithm, PropExpr, SexpFsm};
//!
//! // A one-bit machine that sets x and keeps it set.
//! let mut session = BmcSession::new(["x"], Vec::<&str>::new());
//! session
//!     .load_fsm(&SexpFsm {
//!         init: PropExpr::var("x"),
//!         invar: PropExpr::True,
//!         trans: PropExpr::iff(PropExpr::next("x"), PropExpr::var("x")),
//!         justice: vec![],
//!     })
//!     .unwrap();
//!
//! # #[cfg(feature = "cadical")] {
//! let outcome = session
//!     .check_invariant(
//!         InvariantAlgorithm::Classic,
//!         &PropExpr::var("x"),
//!         &CheckOptions::default(),
//!     )
//!     .unwrap();
//! assert!(outcome.is_proved());
//! # }
//! ```

pub mod check;
pub mod conv;
pub mod dump;
mod error;
pub mod fsm;
pub mod gen;
mod loopback;
pub mod model;
mod options;
mod session;
pub mod tableau;
pub mod trace;
pub mod vars;
pub mod wff;

pub use check::{CheckOutcome, DualCheck, Phase, ZigzagCheck};
pub use conv::PropExpr;
pub use error::{BmcError, BmcErrorKind};
pub use fsm::{BeFsm, SexpFsm};
pub use loopback::{succ_time, Loopback};
pub use options::CheckOptions;
pub use session::{BmcSession, InvariantAlgorithm, LtlAlgorithm};
pub use trace::{Assignment, SatTrace, Trace};
pub use vars::VarManager;
pub use wff::Wff;
