//! Unrolling of the FSM onto time frames.
//!
//! All problem generators start here: the initial condition pinned to frame
//! 0, the invariant pinned to an arbitrary frame, the transition relation
//! unrolled over an interval, and the fairness constraint of a `(k, l)`
//! path.
//!
//! `unroll(j, k)` places `trans ∧ invar` on every frame of `[j, k)` and the
//! bare invariant once on the terminal frame `k`; the transition relation
//! cannot be placed there, but the invariant must still hold.

use tempora_expr::Be;

use crate::fsm::BeFsm;
use crate::loopback::Loopback;
use crate::vars::VarManager;

/// `init ∧ invar` at time 0.
pub fn init0(vm: &mut VarManager, fsm: &BeFsm) -> Be {
    let constrained = vm.be_mut().and(fsm.init(), fsm.invar());
    vm.shift_to_time(constrained, 0)
}

/// The invariant constraint at time `t`.
pub fn invar_at_time(vm: &mut VarManager, fsm: &BeFsm, t: usize) -> Be {
    vm.shift_to_time(fsm.invar(), t)
}

/// The transition relation unrolled from frame `j` to frame `k`, with the
/// invariant on every visited frame including the terminal one.
///
/// # Panics
///
/// Panics if `j > k`.
pub fn unroll(vm: &mut VarManager, fsm: &BeFsm, j: usize, k: usize) -> Be {
    assert!(j <= k, "unrolling interval [{}, {}] is reversed", j, k);
    let step = vm.be_mut().and(fsm.trans(), fsm.invar());
    let body = if k == 0 {
        vm.be().truth()
    } else {
        vm.and_interval(step, j, k - 1)
    };
    let terminal = invar_at_time(vm, fsm, k);
    vm.be_mut().and(body, terminal)
}

/// The constrained path of length `k` starting anywhere.
pub fn path_no_init(vm: &mut VarManager, fsm: &BeFsm, k: usize) -> Be {
    unroll(vm, fsm, 0, k)
}

/// The constrained path of length `k` starting in an initial state.
pub fn path_with_init(vm: &mut VarManager, fsm: &BeFsm, k: usize) -> Be {
    let path = path_no_init(vm, fsm, k);
    let init = init0(vm, fsm);
    vm.be_mut().and(path, init)
}

/// The fairness constraint of a `(k, l)` path: every justice constraint
/// must hold somewhere on the loop `[l, k)`.
///
/// With no justice constraints this is ⊤. Without a loop no finite path
/// witnesses fairness, so the result is ⊥.
///
/// # Panics
///
/// Panics if `loopback` is a fixed loop violating `l < k`, or the
/// unresolved all-loops selector.
pub fn fairness(vm: &mut VarManager, fsm: &BeFsm, k: usize, loopback: Loopback) -> Be {
    if fsm.fairness().is_empty() {
        return vm.be().truth();
    }
    let l = match loopback {
        Loopback::None => return vm.be().falsity(),
        Loopback::Loop(l) => {
            assert!(l >= 0, "relative loopback not resolved before fairness");
            let l = l as usize;
            assert!(l < k, "loopback {} must lie strictly below bound {}", l, k);
            l
        }
        Loopback::All => panic!("fairness is built per fixed loopback"),
    };

    let mut acc = vm.be().truth();
    for &justice in fsm.fairness() {
        let somewhere = vm.or_interval(justice, l, k - 1);
        acc = vm.be_mut().and(acc, somewhere);
    }
    acc
}
