//! Error kinds of the checking layer.
//!
//! Every recoverable failure of the public API is one of the kinds below.
//! The first four are precondition failures: they are reported before the
//! session is mutated, so the caller may correct the input and retry.
//! Solver failures abort the current run (its solver instances and groups
//! are released on unwind of the run), but the expression and variable
//! managers stay valid for subsequent runs. Index-bound violations are
//! programming errors and panic.

use std::fmt;

use tempora_solver::SolverError;

/// The category of a checking error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BmcErrorKind {
    /// The property is of an unsupported type or refers to unknown symbols.
    InvalidProperty,
    /// An algorithm was invoked before the session was fully set up.
    SetupRequired,
    /// The requested algorithm cannot run: no suitable solver is compiled
    /// in, or the model violates an algorithm precondition.
    AlgorithmUnavailable,
    /// A `(k, l)` pair violates `0 ≤ l < k` for a fixed loopback.
    ParameterInconsistent,
    /// The solver ran out of time or memory; the run was aborted.
    SolverResourceExhausted,
    /// The solver failed internally; fatal for the run.
    SolverInternalError,
    /// A subformula cannot be translated (past-time or CTL residue).
    ConversionUnsupported,
}

/// An error of the checking layer: a kind plus a human-readable message.
#[derive(Clone, Debug)]
pub struct BmcError {
    kind: BmcErrorKind,
    message: String,
}

impl BmcError {
    pub fn kind(&self) -> BmcErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn invalid_property(message: impl Into<String>) -> Self {
        BmcError {
            kind: BmcErrorKind::InvalidProperty,
            message: message.into(),
        }
    }

    pub fn setup_required(message: impl Into<String>) -> Self {
        BmcError {
            kind: BmcErrorKind::SetupRequired,
            message: message.into(),
        }
    }

    pub fn algorithm_unavailable(message: impl Into<String>) -> Self {
        BmcError {
            kind: BmcErrorKind::AlgorithmUnavailable,
            message: message.into(),
        }
    }

    pub fn parameter_inconsistent(message: impl Into<String>) -> Self {
        BmcError {
            kind: BmcErrorKind::ParameterInconsistent,
            message: message.into(),
        }
    }

    pub fn conversion_unsupported(message: impl Into<String>) -> Self {
        BmcError {
            kind: BmcErrorKind::ConversionUnsupported,
            message: message.into(),
        }
    }
}

impl fmt::Display for BmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            BmcErrorKind::InvalidProperty => "invalid property",
            BmcErrorKind::SetupRequired => "setup required",
            BmcErrorKind::AlgorithmUnavailable => "algorithm unavailable",
            BmcErrorKind::ParameterInconsistent => "inconsistent parameters",
            BmcErrorKind::SolverResourceExhausted => "solver resources exhausted",
            BmcErrorKind::SolverInternalError => "solver internal error",
            BmcErrorKind::ConversionUnsupported => "conversion unsupported",
        };
        write!(f, "{}: {}", prefix, self.message)
    }
}

impl std::error::Error for BmcError {}

impl From<SolverError> for BmcError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::ResourceExhausted(reason) => BmcError {
                kind: BmcErrorKind::SolverResourceExhausted,
                message: reason,
            },
            SolverError::Internal(reason) => BmcError {
                kind: BmcErrorKind::SolverInternalError,
                message: reason,
            },
            SolverError::Unavailable(reason) => BmcError {
                kind: BmcErrorKind::AlgorithmUnavailable,
                message: reason,
            },
        }
    }
}
