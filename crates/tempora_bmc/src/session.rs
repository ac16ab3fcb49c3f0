//! The checking session.
//!
//! A [`BmcSession`] owns the variable manager (and through it the
//! expression manager) and the lowered FSM, and exposes the check entry
//! points. It is created from the symbolic encoding (the declared state
//! and input variable names), and the FSM is loaded separately, mirroring
//! the two-step setup of the surrounding tool; checking before the FSM is
//! loaded reports [`BmcErrorKind::SetupRequired`](crate::BmcErrorKind).

use serde::{Deserialize, Serialize};

use crate::check::{self, CheckOutcome};
use crate::conv::PropExpr;
use crate::error::BmcError;
use crate::fsm::{BeFsm, SexpFsm};
use crate::options::CheckOptions;
use crate::vars::VarManager;
use crate::wff::Wff;

/// Selector for the invariant checking procedure.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InvariantAlgorithm {
    Classic,
    EenSorensson,
    Zigzag,
    Dual,
}

/// Selector for the LTL checking procedure.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LtlAlgorithm {
    NonIncremental,
    Incremental,
}

/// A checking session: the managers plus the FSM under analysis.
pub struct BmcSession {
    vars: VarManager,
    fsm: Option<BeFsm>,
}

impl BmcSession {
    /// Creates a session over the given variable declarations.
    pub fn new<I1, S1, I2, S2>(state_vars: I1, input_vars: I2) -> Self
    where
        I1: IntoIterator<Item = S1>,
        S1: AsRef<str>,
        I2: IntoIterator<Item = S2>,
        S2: AsRef<str>,
    {
        BmcSession {
            vars: VarManager::new(state_vars, input_vars),
            fsm: None,
        }
    }

    /// Lowers and installs the FSM. May be called again to replace it.
    pub fn load_fsm(&mut self, sexp: &SexpFsm) -> Result<(), BmcError> {
        let fsm = BeFsm::from_sexp(&mut self.vars, sexp)?;
        self.fsm = Some(fsm);
        Ok(())
    }

    pub fn vars(&self) -> &VarManager {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VarManager {
        &mut self.vars
    }

    /// The lowered FSM, or `SetupRequired` before [`BmcSession::load_fsm`].
    pub fn fsm(&self) -> Result<&BeFsm, BmcError> {
        self.fsm
            .as_ref()
            .ok_or_else(|| BmcError::setup_required("no FSM was loaded into the session"))
    }

    /// Checks an invariant property with the selected procedure.
    pub fn check_invariant(
        &mut self,
        algorithm: InvariantAlgorithm,
        property: &PropExpr,
        opts: &CheckOptions,
    ) -> Result<CheckOutcome, BmcError> {
        let fsm = match &self.fsm {
            Some(fsm) => fsm,
            None => {
                return Err(BmcError::setup_required(
                    "no FSM was loaded into the session",
                ))
            }
        };
        match algorithm {
            InvariantAlgorithm::Classic => {
                check::check_invariant_classic(&mut self.vars, fsm, property, opts)
            }
            InvariantAlgorithm::EenSorensson => {
                check::check_invariant_een_sorensson(&mut self.vars, fsm, property, opts)
            }
            InvariantAlgorithm::Zigzag => {
                check::check_invariant_zigzag(&mut self.vars, fsm, property, opts)
            }
            InvariantAlgorithm::Dual => {
                check::check_invariant_dual(&mut self.vars, fsm, property, opts)
            }
        }
    }

    /// Checks an LTL property with the selected procedure.
    pub fn check_ltl(
        &mut self,
        algorithm: LtlAlgorithm,
        property: &Wff,
        opts: &CheckOptions,
    ) -> Result<CheckOutcome, BmcError> {
        let fsm = match &self.fsm {
            Some(fsm) => fsm,
            None => {
                return Err(BmcError::setup_required(
                    "no FSM was loaded into the session",
                ))
            }
        };
        match algorithm {
            LtlAlgorithm::NonIncremental => {
                check::check_ltl_non_incremental(&mut self.vars, fsm, property, opts)
            }
            LtlAlgorithm::Incremental => {
                check::check_ltl_incremental(&mut self.vars, fsm, property, opts)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BmcErrorKind;

    #[test]
    fn checking_before_load_is_setup_required() {
        let mut session = BmcSession::new(["x"], Vec::<&str>::new());
        let err = session
            .check_invariant(
                InvariantAlgorithm::Classic,
                &PropExpr::var("x"),
                &CheckOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), BmcErrorKind::SetupRequired);
        assert!(session.fsm().is_err());
    }

    #[test]
    fn load_fsm_installs_the_model() {
        let mut session = BmcSession::new(["x"], Vec::<&str>::new());
        let sexp = SexpFsm {
            init: PropExpr::True,
            invar: PropExpr::True,
            trans: PropExpr::True,
            justice: vec![],
        };
        session.load_fsm(&sexp).unwrap();
        assert!(session.fsm().is_ok());
    }
}
