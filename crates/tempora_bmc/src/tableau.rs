//! Bounded tableau for LTL formulas.
//!
//! `tableau_at_time` translates an NNF formula into the constraint that a
//! `(k, l)` path satisfies it *at evaluation time `t`*, by structural
//! recursion. Temporal operators turn into finite windows whose bounds
//! depend on whether the path loops:
//!
//! - `X` advances the evaluation time through [`succ_time`], falling off
//!   the path end (⊥) when there is no loop;
//! - `F`/`G` expand to disjunctions/conjunctions over the reachable window;
//! - `U`/`R` unfold step by step with a budget covering one full round.
//!
//! A fixed-loop path additionally carries the *loop closure* constraint
//! (frame `l` and frame `k` agree on every state bit) and the fairness
//! constraint of the loop; the all-loopbacks form disjoins the closed
//! tableaux over every admissible loop position.

use tempora_expr::Be;

use crate::error::BmcError;
use crate::fsm::BeFsm;
use crate::loopback::{succ_time, Loopback};
use crate::model;
use crate::vars::VarManager;
use crate::wff::Wff;

/// Translates `wff` (in NNF) at evaluation time `time` on a `(k, l)` path.
///
/// `loopback` must be [`Loopback::None`] or an absolute fixed loop; the
/// all-loops selector is resolved by [`ltl_tableau`].
pub fn tableau_at_time(
    vm: &mut VarManager,
    wff: &Wff,
    time: usize,
    k: usize,
    loopback: Loopback,
) -> Result<Be, BmcError> {
    debug_assert!(time < k || (time == k && loopback.is_none()));

    match wff {
        Wff::True => Ok(vm.be().truth()),
        Wff::False => Ok(vm.be().falsity()),

        Wff::Var(name) => timed_literal(vm, name, false, time, k),

        Wff::Not(inner) => match inner.as_ref() {
            Wff::Var(name) => timed_literal(vm, name, true, time, k),
            other => Err(BmcError::invalid_property(format!(
                "tableau requires negation normal form, found negated '{}'",
                other
            ))),
        },

        Wff::And(a, b) => {
            let ta = tableau_at_time(vm, a, time, k, loopback)?;
            let tb = tableau_at_time(vm, b, time, k, loopback)?;
            Ok(vm.be_mut().and(ta, tb))
        }
        Wff::Or(a, b) => {
            let ta = tableau_at_time(vm, a, time, k, loopback)?;
            let tb = tableau_at_time(vm, b, time, k, loopback)?;
            Ok(vm.be_mut().or(ta, tb))
        }
        Wff::Iff(a, b) => {
            let ta = tableau_at_time(vm, a, time, k, loopback)?;
            let tb = tableau_at_time(vm, b, time, k, loopback)?;
            Ok(vm.be_mut().iff(ta, tb))
        }
        Wff::Implies(_, _) => Err(BmcError::invalid_property(
            "implication should have been rewritten away by NNF",
        )),

        Wff::Next(a) => match succ_time(time, k, loopback) {
            Some(succ) => tableau_at_time(vm, a, succ, k, loopback),
            None => Ok(vm.be().falsity()),
        },

        Wff::Eventually(a) => {
            // Three windows: no loop -> [time, k]; loop with time < l ->
            // [time, k); loop with l <= time -> [min(time, l), k).
            let (start, stop) = match loopback {
                Loopback::None => (k, time),
                Loopback::Loop(l) => (k - 1, time.min(l as usize)),
                Loopback::All => unreachable!(),
            };
            let mut acc = vm.be().falsity();
            for t in (stop..=start).rev() {
                let at_t = tableau_at_time(vm, a, t, k, loopback)?;
                if vm.be().is_truth(at_t) {
                    return Ok(at_t);
                }
                acc = vm.be_mut().or(at_t, acc);
            }
            Ok(acc)
        }

        Wff::Globally(a) => match loopback {
            // Nothing holds globally on a path that ends.
            Loopback::None => Ok(vm.be().falsity()),
            Loopback::Loop(l) => {
                let stop = time.min(l as usize);
                let mut acc = vm.be().truth();
                for t in (stop..k).rev() {
                    let at_t = tableau_at_time(vm, a, t, k, loopback)?;
                    if vm.be().is_falsity(at_t) {
                        return Ok(at_t);
                    }
                    acc = vm.be_mut().and(at_t, acc);
                }
                Ok(acc)
            }
            Loopback::All => unreachable!(),
        },

        Wff::Until(p, q) => {
            let steps = unfolding_budget(time, k, loopback);
            until_at_time(vm, p, q, time, k, loopback, steps)
        }

        Wff::Releases(p, q) => {
            let steps = unfolding_budget(time, k, loopback);
            releases_at_time(vm, p, q, time, k, loopback, steps)
        }

        Wff::Prev(_)
        | Wff::NotPrevNot(_)
        | Wff::Once(_)
        | Wff::Historically(_)
        | Wff::Since(_, _)
        | Wff::Triggered(_, _) => Err(BmcError::conversion_unsupported(format!(
            "past-time operator in '{}' is not supported by the bounded tableau",
            wff
        ))),
    }
}

/// The timed literal of a variable, negated or not.
///
/// On the final frame of a loop-free path the inputs do not exist, so a
/// constraint on one, in either polarity, is unsatisfiable.
fn timed_literal(
    vm: &mut VarManager,
    name: &str,
    negated: bool,
    time: usize,
    k: usize,
) -> Result<Be, BmcError> {
    let index = vm
        .name_to_index(name)
        .ok_or_else(|| BmcError::invalid_property(format!("unknown variable '{}'", name)))?;
    if time == k && vm.is_index_input_block(index) {
        return Ok(vm.be().falsity());
    }
    let var = vm.timed_var(index, time, k);
    Ok(if negated { vm.be_mut().not(var) } else { var })
}

/// Number of unfolding steps covering the reachable part of the path: one
/// full pass over `[time, k]` without a loop, one full round of the loop
/// otherwise.
fn unfolding_budget(time: usize, k: usize, loopback: Loopback) -> usize {
    match loopback {
        Loopback::None => k - time + 1,
        Loopback::Loop(l) => (k - 1) - time.min(l as usize) + 1,
        Loopback::All => unreachable!(),
    }
}

/// `p U q` unfolded: `q_t ∨ (p_t ∧ (p U q)_{succ(t)})`.
fn until_at_time(
    vm: &mut VarManager,
    p: &Wff,
    q: &Wff,
    time: usize,
    k: usize,
    loopback: Loopback,
    steps: usize,
) -> Result<Be, BmcError> {
    debug_assert!(steps >= 1);
    let q_t = tableau_at_time(vm, q, time, k, loopback)?;
    if steps == 1 {
        return Ok(q_t);
    }
    let succ = succ_time(time, k, loopback).expect("unfolding budget outlived the path");
    let rest = until_at_time(vm, p, q, succ, k, loopback, steps - 1)?;
    let p_t = tableau_at_time(vm, p, time, k, loopback)?;
    let tail = vm.be_mut().and(p_t, rest);
    Ok(vm.be_mut().or(q_t, tail))
}

/// `p R q` unfolded: `q_t ∧ (p_t ∨ (p R q)_{succ(t)})`, with the base case
/// `q ∧ p` on a loop-free path and plain `q` on a loop.
fn releases_at_time(
    vm: &mut VarManager,
    p: &Wff,
    q: &Wff,
    time: usize,
    k: usize,
    loopback: Loopback,
    steps: usize,
) -> Result<Be, BmcError> {
    debug_assert!(steps >= 1);
    let p_t = tableau_at_time(vm, p, time, k, loopback)?;
    let q_t = tableau_at_time(vm, q, time, k, loopback)?;
    if steps == 1 {
        return Ok(if loopback.is_none() {
            vm.be_mut().and(p_t, q_t)
        } else {
            q_t
        });
    }
    let succ = succ_time(time, k, loopback).expect("unfolding budget outlived the path");
    let rest = releases_at_time(vm, p, q, succ, k, loopback, steps - 1)?;
    let tail = vm.be_mut().or(p_t, rest);
    Ok(vm.be_mut().and(q_t, tail))
}

/// Loop closure of a `(k, l)` path: frame `l` and frame `k` agree on every
/// state bit.
pub fn loop_condition(vm: &mut VarManager, l: usize, k: usize) -> Be {
    assert!(l < k, "loopback {} must lie strictly below bound {}", l, k);
    let mut acc = vm.be().truth();
    for index in vm.state_var_indices() {
        let at_l = vm.timed_var(index, l, k);
        let at_k = vm.timed_var(index, k, k);
        let agree = vm.be_mut().iff(at_l, at_k);
        acc = vm.be_mut().and(acc, agree);
    }
    acc
}

/// Tableau of a loop-free `(k, ⊥)` witness.
pub fn tableau_no_loop(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    k: usize,
) -> Result<Be, BmcError> {
    let fair = model::fairness(vm, fsm, k, Loopback::None);
    if vm.be().is_falsity(fair) {
        // Justice constraints admit no finite witness.
        return Ok(fair);
    }
    let tab = tableau_at_time(vm, wff, 0, k, Loopback::None)?;
    Ok(vm.be_mut().and(tab, fair))
}

/// Tableau of a `(k, l)` witness with a fixed loop: closure ∧ fairness ∧
/// formula.
pub fn tableau_single_loop(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    k: usize,
    l: usize,
) -> Result<Be, BmcError> {
    assert!(l < k, "loopback {} must lie strictly below bound {}", l, k);
    let closure = loop_condition(vm, l, k);
    let fair = model::fairness(vm, fsm, k, Loopback::Loop(l as i64));
    let tab = tableau_at_time(vm, wff, 0, k, Loopback::Loop(l as i64))?;
    let constrained = vm.be_mut().and(tab, fair);
    Ok(vm.be_mut().and(closure, constrained))
}

/// Tableau admitting any loop position: `⋁_{l ∈ [0, k)}` of the
/// fixed-loop tableaux.
pub fn tableau_all_loops(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    k: usize,
) -> Result<Be, BmcError> {
    let mut acc = vm.be().falsity();
    for l in 0..k {
        let single = tableau_single_loop(vm, fsm, wff, k, l)?;
        acc = vm.be_mut().or(acc, single);
    }
    Ok(acc)
}

/// Dispatches on the loopback selector, resolving relative positions and
/// validating `(k, l)` first.
pub fn ltl_tableau(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    k: usize,
    loopback: Loopback,
) -> Result<Be, BmcError> {
    let loopback = loopback.to_absolute(k);
    loopback.validate(k)?;
    match loopback {
        Loopback::None => tableau_no_loop(vm, fsm, wff, k),
        Loopback::All => tableau_all_loops(vm, fsm, wff, k),
        Loopback::Loop(l) => tableau_single_loop(vm, fsm, wff, k, l as usize),
    }
}
