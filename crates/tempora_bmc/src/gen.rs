//! One-shot problem generation.
//!
//! The non-incremental algorithms hand complete problems to a fresh solver:
//! the two-frame inductive invariant problem, and the LTL problem of a
//! bound/loopback pair. The incremental algorithms assemble the same pieces
//! step by step instead (see `check`).

use tempora_expr::Be;

use crate::error::BmcError;
use crate::fsm::BeFsm;
use crate::loopback::Loopback;
use crate::model;
use crate::tableau;
use crate::vars::VarManager;
use crate::wff::Wff;

/// Base step of the inductive invariant check: `(init ∧ invar)@0 → P@0`.
pub fn invar_base_step(vm: &mut VarManager, fsm: &BeFsm, property: Be) -> Be {
    let init = model::init0(vm, fsm);
    let invar0 = model::invar_at_time(vm, fsm, 0);
    let premise = vm.be_mut().and(init, invar0);
    let p0 = vm.shift_to_time(property, 0);
    vm.be_mut().implies(premise, p0)
}

/// Induction step of the inductive invariant check:
/// `(P@0 ∧ path(0,1)) → P@1`.
pub fn invar_induct_step(vm: &mut VarManager, fsm: &BeFsm, property: Be) -> Be {
    let path01 = model::path_no_init(vm, fsm, 1);
    let p0 = vm.shift_to_time(property, 0);
    let premise = vm.be_mut().and(path01, p0);
    let p1 = vm.shift_to_time(property, 1);
    vm.be_mut().implies(premise, p1)
}

/// The complete invariant problem: `¬(base ∧ step)`, satisfiable iff the
/// two-frame induction fails.
pub fn invar_problem(vm: &mut VarManager, fsm: &BeFsm, property: Be) -> Be {
    let base = invar_base_step(vm, fsm, property);
    let induct = invar_induct_step(vm, fsm, property);
    let both = vm.be_mut().and(base, induct);
    vm.be_mut().not(both)
}

/// The complete LTL problem of `(k, l)`: the initialised constrained path
/// conjoined with the tableau of the (already negated, NNF) formula.
pub fn ltl_problem(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    k: usize,
    loopback: Loopback,
) -> Result<Be, BmcError> {
    let path = model::path_with_init(vm, fsm, k);
    let tab = tableau::ltl_tableau(vm, fsm, wff, k, loopback)?;
    Ok(vm.be_mut().and(path, tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::PropExpr;
    use crate::fsm::SexpFsm;

    /// One-bit machine stuck at 1 after init 0.
    fn latch() -> (VarManager, BeFsm) {
        let mut vm = VarManager::new(["x"], Vec::<&str>::new());
        let sexp = SexpFsm {
            init: PropExpr::not(PropExpr::var("x")),
            invar: PropExpr::True,
            trans: PropExpr::next("x"),
            justice: vec![],
        };
        let fsm = BeFsm::from_sexp(&mut vm, &sexp).unwrap();
        (vm, fsm)
    }

    #[test]
    fn invar_problem_is_unsat_for_an_inductive_property() {
        // Property ⊤ is trivially inductive: the problem folds to ⊥.
        let (mut vm, fsm) = latch();
        let p = vm.be().truth();
        let problem = invar_problem(&mut vm, &fsm, p);
        assert!(vm.be().is_falsity(problem));
    }

    #[test]
    fn invar_problem_detects_induction_failure_semantically() {
        // Property ¬x is violated by the step 0 -> 1.
        let (mut vm, fsm) = latch();
        let x = vm.name_to_curr("x").unwrap();
        let p = vm.be_mut().not(x);
        let problem = invar_problem(&mut vm, &fsm, p);
        assert!(!vm.be().is_falsity(problem));

        // x@0 = false, x@1 = true satisfies the problem (induction broken).
        let x1 = vm.var_index_to_be_index(0, 1, 1);
        let mut values = vec![false; vm.be().var_count()];
        values[x1] = true;
        assert!(vm.be().eval(problem, &values));
    }

    #[test]
    fn ltl_problem_ties_path_and_tableau() {
        let (mut vm, fsm) = latch();
        // ¬(F x) in NNF: G ¬x; no loop makes the tableau ⊥, hence the
        // problem ⊥.
        let neg = Wff::not(Wff::eventually(Wff::var("x"))).nnf();
        let problem = ltl_problem(&mut vm, &fsm, &neg, 2, Loopback::None).unwrap();
        assert!(vm.be().is_falsity(problem));
    }
}
