//! SAT solver interface of the tempora bounded model checker.
//!
//! The checker consumes a solver through a deliberately narrow surface:
//! clauses are added into *groups*, a group can force the top literal of a
//! converted formula to a polarity, and solving considers either all groups
//! or all groups minus an excluded set. Incremental solvers additionally
//! create and destroy groups; destroying a group atomically retracts every
//! clause and polarity it carried, which is how the algorithms encode
//! retractable assertions.
//!
//! One backend ships here, behind the default-on `cadical` feature: the
//! CaDiCaL binding, with groups realised as activation literals. Builds
//! without any backend still compile; [`create_inc_solver`] then reports the
//! solver as unavailable and the algorithm layer surfaces that as a
//! structured error.

#[cfg(feature = "cadical")]
mod cadical_solver;

#[cfg(feature = "cadical")]
pub use cadical_solver::CadicalSolver;

use std::fmt;
use std::time::Duration;

use tempora_expr::Cnf;

/// A clause group inside a solver.
///
/// Group 0 is the permanent group, which always exists and is never
/// destroyed; further groups are handed out by
/// [`SatIncSolver::create_group`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Group(pub(crate) usize);

impl Group {
    /// The permanent group.
    pub const PERMANENT: Group = Group(0);

    pub fn is_permanent(self) -> bool {
        self.0 == 0
    }
}

/// Polarity a top literal is forced to by [`SatSolver::set_polarity`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn sign(self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    /// Applies the polarity to a literal.
    pub fn apply(self, lit: i32) -> i32 {
        self.sign() * lit
    }
}

/// Outcome of a successful solver call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveStatus {
    Satisfiable,
    Unsatisfiable,
}

/// Failure of a solver call or of solver construction.
///
/// Timeouts and memouts are not distinguished beyond the reason string:
/// either way the current algorithm run must be abandoned.
#[derive(Clone, Debug)]
pub enum SolverError {
    /// The solver ran out of time or memory.
    ResourceExhausted(String),
    /// The solver failed internally; fatal for the whole check.
    Internal(String),
    /// The requested solver is not compiled in or not known.
    Unavailable(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::ResourceExhausted(reason) => {
                write!(f, "solver ran out of resources: {}", reason)
            }
            SolverError::Internal(reason) => write!(f, "solver internal error: {}", reason),
            SolverError::Unavailable(reason) => write!(f, "solver unavailable: {}", reason),
        }
    }
}

impl std::error::Error for SolverError {}

/// A non-incremental SAT solver.
///
/// Clauses accumulate; there is no retraction beyond what group destruction
/// offers on the incremental extension.
pub trait SatSolver {
    /// The backend name this solver was created under.
    fn name(&self) -> &str;

    /// The always-alive permanent group.
    fn permanent_group(&self) -> Group {
        Group::PERMANENT
    }

    /// Adds the clauses of `cnf` to `group`.
    ///
    /// Only the defining clauses are added; the truth of the original
    /// formula is *not* asserted until [`SatSolver::set_polarity`] forces
    /// the top literal.
    fn add(&mut self, cnf: &Cnf, group: Group);

    /// Forces the top literal of `cnf` to `polarity` within `group`.
    fn set_polarity(&mut self, cnf: &Cnf, polarity: Polarity, group: Group);

    /// Solves the conjunction of all live groups.
    fn solve_all_groups(&mut self) -> Result<SolveStatus, SolverError>;

    /// The model of the last satisfiable call, as signed CNF literals.
    ///
    /// Variables the solver left unassigned are omitted; consumers treat
    /// them as false.
    fn model(&self) -> &[i32];

    /// Wall-clock time spent inside the last solve call.
    fn last_solving_time(&self) -> Duration;
}

/// An incremental SAT solver: adds group lifecycle and solving under a
/// group exclusion set.
pub trait SatIncSolver: SatSolver {
    /// Creates a fresh group.
    fn create_group(&mut self) -> Group;

    /// Destroys `group`, atomically retracting its clauses and polarities.
    ///
    /// # Panics
    ///
    /// Panics if `group` is the permanent group or already destroyed.
    fn destroy_group(&mut self, group: Group);

    /// Solves all live groups except the ones listed.
    fn solve_without_groups(&mut self, excluded: &[Group]) -> Result<SolveStatus, SolverError>;
}

/// Names of the solver backends compiled into this build.
pub fn available_solvers() -> &'static [&'static str] {
    #[cfg(feature = "cadical")]
    {
        &["cadical"]
    }
    #[cfg(not(feature = "cadical"))]
    {
        &[]
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Creates a non-incremental solver by backend name.
pub fn create_solver(name: &str) -> Result<Box<dyn SatSolver>, SolverError> {
    match normalize(name).as_str() {
        #[cfg(feature = "cadical")]
        "cadical" => Ok(Box::new(CadicalSolver::new())),
        other => Err(SolverError::Unavailable(format!(
            "no solver named '{}' is compiled in (available: {:?})",
            other,
            available_solvers()
        ))),
    }
}

/// Creates an incremental solver by backend name.
pub fn create_inc_solver(name: &str) -> Result<Box<dyn SatIncSolver>, SolverError> {
    match normalize(name).as_str() {
        #[cfg(feature = "cadical")]
        "cadical" => Ok(Box::new(CadicalSolver::new())),
        other => Err(SolverError::Unavailable(format!(
            "no incremental solver named '{}' is compiled in (available: {:?})",
            other,
            available_solvers()
        ))),
    }
}
