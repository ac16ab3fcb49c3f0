//! Shared model builders for the integration tests.
#![allow(dead_code)] // not every test file uses every builder

use tempora_bmc::{BmcSession, PropExpr, SexpFsm, Trace, VarManager};

/// Two-bit counter: `c ∈ {0..3}` as bits `c1 c0`, counting modulo 4 from 0.
pub fn two_bit_counter() -> BmcSession {
    let mut session = BmcSession::new(["c1", "c0"], Vec::<&str>::new());
    let sexp = SexpFsm {
        init: PropExpr::and(
            PropExpr::not(PropExpr::var("c0")),
            PropExpr::not(PropExpr::var("c1")),
        ),
        invar: PropExpr::True,
        trans: PropExpr::and(
            // c0' = ¬c0
            PropExpr::iff(PropExpr::next("c0"), PropExpr::not(PropExpr::var("c0"))),
            // c1' = c1 xor c0, spelled c1 <-> ¬c0
            PropExpr::iff(
                PropExpr::next("c1"),
                PropExpr::iff(PropExpr::var("c1"), PropExpr::not(PropExpr::var("c0"))),
            ),
        ),
        justice: vec![],
    };
    session.load_fsm(&sexp).expect("counter FSM loads");
    session
}

/// The counter's safety property `c ≠ 3`.
pub fn counter_safe() -> PropExpr {
    PropExpr::not(PropExpr::and(PropExpr::var("c0"), PropExpr::var("c1")))
}

/// Turn-based lock: the processes occupy their critical sections strictly
/// alternately, driven by `turn`.
pub fn turn_based_lock() -> BmcSession {
    let mut session = BmcSession::new(["crit0", "crit1", "turn"], Vec::<&str>::new());
    let sexp = SexpFsm {
        init: PropExpr::conjoin([
            PropExpr::not(PropExpr::var("crit0")),
            PropExpr::not(PropExpr::var("crit1")),
            PropExpr::not(PropExpr::var("turn")),
        ]),
        invar: PropExpr::True,
        trans: PropExpr::conjoin([
            PropExpr::iff(PropExpr::next("crit0"), PropExpr::not(PropExpr::var("turn"))),
            PropExpr::iff(PropExpr::next("crit1"), PropExpr::var("turn")),
            PropExpr::iff(PropExpr::next("turn"), PropExpr::not(PropExpr::var("turn"))),
        ]),
        justice: vec![],
    };
    session.load_fsm(&sexp).expect("lock FSM loads");
    session
}

/// Mutual exclusion for the lock.
pub fn lock_mutex() -> PropExpr {
    PropExpr::not(PropExpr::and(PropExpr::var("crit0"), PropExpr::var("crit1")))
}

/// Three-station token ring with a one-hot token. The safety property
/// `¬(r0 ∧ r1)` is true from the initial state but not inductive: the
/// unreachable state `r0 r2` steps into `r0 r1`.
pub fn token_ring() -> BmcSession {
    let mut session = BmcSession::new(["r0", "r1", "r2"], Vec::<&str>::new());
    let sexp = SexpFsm {
        init: PropExpr::conjoin([
            PropExpr::var("r0"),
            PropExpr::not(PropExpr::var("r1")),
            PropExpr::not(PropExpr::var("r2")),
        ]),
        invar: PropExpr::True,
        trans: PropExpr::conjoin([
            PropExpr::iff(PropExpr::next("r0"), PropExpr::var("r2")),
            PropExpr::iff(PropExpr::next("r1"), PropExpr::var("r0")),
            PropExpr::iff(PropExpr::next("r2"), PropExpr::var("r1")),
        ]),
        justice: vec![],
    };
    session.load_fsm(&sexp).expect("ring FSM loads");
    session
}

pub fn ring_safe() -> PropExpr {
    PropExpr::not(PropExpr::and(PropExpr::var("r0"), PropExpr::var("r1")))
}

/// Reads a decoded trace back into a valuation of the timed BE variables,
/// suitable for evaluating unrolled expressions.
pub fn trace_to_values(vm: &VarManager, trace: &Trace) -> Vec<bool> {
    let k = trace.len();
    let mut values = vec![false; vm.be().var_count()];
    for (time, state) in trace.states().iter().enumerate() {
        for (name, value) in state.iter() {
            let var_index = vm.name_to_index(name).expect("declared state variable");
            values[vm.var_index_to_be_index(var_index, time, k)] = value;
        }
    }
    for (time, input) in trace.inputs().iter().enumerate() {
        for (name, value) in input.iter() {
            let var_index = vm.name_to_index(name).expect("declared input variable");
            values[vm.var_index_to_be_index(var_index, time, k)] = value;
        }
    }
    values
}

/// The counter value encoded by a state assignment.
pub fn counter_value(trace: &Trace, time: usize) -> u8 {
    let state = trace.state(time);
    let c0 = state.value("c0").unwrap() as u8;
    let c1 = state.value("c1").unwrap() as u8;
    (c1 << 1) | c0
}
