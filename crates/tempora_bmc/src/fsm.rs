//! The finite state machine in boolean-expression form.
//!
//! [`SexpFsm`] is the inbound shape: the four FSM sections as name-based
//! propositional terms, exactly as the flattener/booleanizer delivers them.
//! [`BeFsm`] is the lowered, immutable tuple the algorithms work with.

use serde::{Deserialize, Serialize};

use tempora_expr::Be;

use crate::conv::{prop_to_be, PropExpr};
use crate::error::BmcError;
use crate::vars::VarManager;

/// The FSM as delivered by the upstream flattener.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SexpFsm {
    /// Constraint on initial states, over current and input variables.
    pub init: PropExpr,
    /// Invariant constraint on every state, over current and input
    /// variables.
    pub invar: PropExpr,
    /// Transition relation, over current, input and next-state variables.
    pub trans: PropExpr,
    /// Justice (fairness) constraints, each over current and input
    /// variables.
    pub justice: Vec<PropExpr>,
}

/// The FSM lowered to boolean expressions. Immutable once built.
#[derive(Clone, Debug)]
pub struct BeFsm {
    init: Be,
    invar: Be,
    trans: Be,
    fairness: Vec<Be>,
}

impl BeFsm {
    /// Wraps already-lowered sections.
    pub fn new(init: Be, invar: Be, trans: Be, fairness: Vec<Be>) -> Self {
        BeFsm {
            init,
            invar,
            trans,
            fairness,
        }
    }

    /// Lowers a [`SexpFsm`] through the variable manager.
    ///
    /// `init`, `invar` and the justice constraints may not mention
    /// next-state variables; the transition relation may mention all three
    /// untimed blocks.
    pub fn from_sexp(vm: &mut VarManager, sexp: &SexpFsm) -> Result<Self, BmcError> {
        if sexp.init.has_next() {
            return Err(BmcError::invalid_property(
                "the initial-state constraint may not mention next-state variables",
            ));
        }
        if sexp.invar.has_next() {
            return Err(BmcError::invalid_property(
                "the invariant constraint may not mention next-state variables",
            ));
        }
        if let Some(bad) = sexp.justice.iter().find(|j| j.has_next()) {
            return Err(BmcError::invalid_property(format!(
                "a justice constraint may not mention next-state variables: {:?}",
                bad
            )));
        }

        let init = prop_to_be(vm, &sexp.init)?;
        let invar = prop_to_be(vm, &sexp.invar)?;
        let trans = prop_to_be(vm, &sexp.trans)?;
        let fairness = sexp
            .justice
            .iter()
            .map(|j| prop_to_be(vm, j))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BeFsm::new(init, invar, trans, fairness))
    }

    pub fn init(&self) -> Be {
        self.init
    }

    pub fn invar(&self) -> Be {
        self.invar
    }

    pub fn trans(&self) -> Be {
        self.trans
    }

    /// The justice constraints, in declaration order.
    pub fn fairness(&self) -> &[Be] {
        &self.fairness
    }
}
