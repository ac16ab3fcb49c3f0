//! E2E: DIMACS dumps of generated problems.

mod common;

use std::fs;

use common::*;
use tempora_bmc::{
    tableau, BeFsm, CheckOptions, InvariantAlgorithm, LtlAlgorithm, Loopback, PropExpr, SexpFsm,
    VarManager, Wff,
};

#[test]
fn classic_check_drops_an_invariant_dump() {
    let dir = tempfile::tempdir().unwrap();
    let opts = CheckOptions {
        dump_dimacs: Some(dir.path().to_path_buf()),
        ..CheckOptions::default()
    };

    let mut session = two_bit_counter();
    session
        .check_invariant(InvariantAlgorithm::Classic, &counter_safe(), &opts)
        .unwrap();

    let text = fs::read_to_string(dir.path().join("invar.dimacs")).unwrap();
    assert!(text.starts_with("c BMC problem generated by tempora"));
    assert!(text.contains("p cnf "));
    assert!(text.contains("Model Variable c0"));
}

#[test]
fn non_incremental_ltl_drops_one_dump_per_bound() {
    let dir = tempfile::tempdir().unwrap();
    let opts = CheckOptions {
        dump_dimacs: Some(dir.path().to_path_buf()),
        max_bound: 2,
        loopback: Loopback::None,
        ..CheckOptions::default()
    };

    let mut session = two_bit_counter();
    // G c != 3 as an LTL formula; no loop-free refutation is dumped away.
    let property = Wff::globally(Wff::not(Wff::and(Wff::var("c0"), Wff::var("c1"))));
    session
        .check_ltl(LtlAlgorithm::NonIncremental, &property, &opts)
        .unwrap();

    for k in 0..=2 {
        let path = dir.path().join(format!("ltl_k{}.dimacs", k));
        assert!(path.exists(), "missing dump for bound {}", k);
    }
}

#[test]
fn valid_tableau_dumps_without_clauses() {
    // F (x ∨ ¬x) is true on every (k, l) path: the tableau folds to ⊤ and
    // the dump carries no clauses.
    let mut vm = VarManager::new(["x"], Vec::<&str>::new());
    let fsm = BeFsm::from_sexp(
        &mut vm,
        &SexpFsm {
            init: PropExpr::True,
            invar: PropExpr::True,
            trans: PropExpr::True,
            justice: vec![],
        },
    )
    .unwrap();

    let valid = Wff::eventually(Wff::or(Wff::var("x"), Wff::not(Wff::var("x"))));
    let tab = tableau::ltl_tableau(&mut vm, &fsm, &valid.nnf(), 2, Loopback::None).unwrap();
    assert!(vm.be().is_truth(tab));

    let cnf = vm.be_mut().to_cnf(tab);
    let mut buf = Vec::new();
    tempora_bmc::dump::write_dimacs(&vm, &cnf, 2, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("p cnf 0 0"));
    assert!(text.contains("true constant"));
}
