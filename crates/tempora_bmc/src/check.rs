//! Invariant and LTL checking algorithms.
//!
//! Four invariant procedures and two LTL procedures share the problem
//! generators and the solver interface:
//!
//! - **classic**: one SAT query over `¬(base ∧ induction)`;
//! - **Eén–Sörensson**: temporal induction iterated up to the maximum
//!   bound, one fresh solver per query;
//! - **ZigZag**: one incremental solver; the initial condition lives in
//!   its own group so the step check can exclude it, the property of each
//!   bound is asserted negatively in a throwaway group and flipped to a
//!   permanent positive assertion once the bound survives;
//! - **Dual**: two incremental solvers, one growing forward from `init`,
//!   one growing backward from `¬P`; requires a model without inputs;
//! - **LTL**: non-incremental (rebuild everything per bound) and
//!   incremental (permanent unrolling, per-bound tableau in a throwaway
//!   group).
//!
//! The incremental procedures are explicit state machines: every observable
//! point of the loop (step check pending, base check pending, context
//! extension pending) is a [`Phase`], and [`ZigzagCheck::advance`] /
//! [`DualCheck::advance`] perform exactly one transition. Three invariants
//! hold across every run: clauses added to the permanent group stay
//! globally sound, assumption groups are destroyed before the permanent
//! state is interpreted further, and the bound only grows.

use serde::{Deserialize, Serialize};

use tempora_expr::{Be, Cnf};
use tempora_solver::{
    create_inc_solver, create_solver, Group, Polarity, SatIncSolver, SatSolver, SolveStatus,
};

use crate::conv::{prop_to_be, PropExpr};
use crate::error::BmcError;
use crate::fsm::BeFsm;
use crate::gen;
use crate::model;
use crate::options::CheckOptions;
use crate::tableau;
use crate::trace::{SatTrace, Trace};
use crate::vars::VarManager;
use crate::wff::Wff;

/// Outcome of a check run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// The property holds on every reachable behaviour.
    Proved,
    /// The property is violated; the trace witnesses the violation.
    Falsified(Trace),
    /// Neither verdict up to the explored bound.
    Unknown { bound: usize },
}

impl CheckOutcome {
    pub fn is_proved(&self) -> bool {
        matches!(self, CheckOutcome::Proved)
    }

    pub fn is_falsified(&self) -> bool {
        matches!(self, CheckOutcome::Falsified(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CheckOutcome::Unknown { .. })
    }

    /// The witness trace of a falsification.
    pub fn trace(&self) -> Option<&Trace> {
        match self {
            CheckOutcome::Falsified(trace) => Some(trace),
            _ => None,
        }
    }
}

/// Observable phase of an incremental run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// The inductive step of the current bound awaits its SAT query.
    NeedStep,
    /// The base case of the current bound awaits its SAT query.
    NeedBase,
    /// The permanent context must be extended to the next bound.
    Extend,
    DoneProved,
    DoneFalsified,
    /// Every bound up to the maximum was exhausted without a verdict.
    Exhausted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::DoneProved | Phase::DoneFalsified | Phase::Exhausted
        )
    }
}

// ----------------------------------------------------------------------
// Shared helpers
// ----------------------------------------------------------------------

/// Converts an expression and feeds its clauses into a solver group; the
/// polarity stays open.
fn add_be<S: SatSolver + ?Sized>(
    solver: &mut S,
    vm: &mut VarManager,
    expr: Be,
    group: Group,
) -> Cnf {
    let cnf = vm.be_mut().to_cnf(expr);
    solver.add(&cnf, group);
    cnf
}

/// Converts an expression, feeds its clauses into a group and asserts it
/// true there.
fn add_be_positively<S: SatSolver + ?Sized>(
    solver: &mut S,
    vm: &mut VarManager,
    expr: Be,
    group: Group,
) {
    let cnf = add_be(solver, vm, expr, group);
    solver.set_polarity(&cnf, Polarity::Positive, group);
}

/// Distinctness constraint: frames `i` and `j` differ in at least one of
/// the given state bits.
fn states_differ(vm: &mut VarManager, state_vars: &[usize], i: usize, j: usize) -> Be {
    let max_time = i.max(j);
    let mut acc = vm.be().falsity();
    for &var in state_vars {
        let at_i = vm.timed_var(var, i, max_time);
        let at_j = vm.timed_var(var, j, max_time);
        let differ = vm.be_mut().xor(at_i, at_j);
        acc = vm.be_mut().or(acc, differ);
    }
    acc
}

/// Lowers an invariant property, rejecting next-state occurrences.
fn invariant_to_be(vm: &mut VarManager, property: &PropExpr) -> Result<Be, BmcError> {
    if property.has_next() {
        return Err(BmcError::invalid_property(
            "an invariant property ranges over current and input variables only",
        ));
    }
    prop_to_be(vm, property)
}

fn falsified_trace<S: SatSolver + ?Sized>(
    solver: &S,
    vm: &VarManager,
    problem: Be,
    k: usize,
) -> Trace {
    let mut sat = SatTrace::new(problem, solver.model().to_vec());
    sat.symbolic_trace(vm, k)
}

/// The negation of the checked formula, in NNF: what the tableau and the
/// LTL problems actually encode.
fn negated_nnf(wff: &Wff) -> Wff {
    Wff::not(wff.clone()).nnf()
}

// ----------------------------------------------------------------------
// Classic invariant checking
// ----------------------------------------------------------------------

/// Two-frame inductive invariant check.
///
/// Proves the property when `¬(base ∧ induction)` is unsatisfiable. On a
/// satisfiable answer the returned trace witnesses the failure at frame 0
/// or across the step `0 → 1`; when the induction step is the broken half,
/// the trace need not start in an initial state.
pub fn check_invariant_classic(
    vm: &mut VarManager,
    fsm: &BeFsm,
    property: &PropExpr,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    let p = invariant_to_be(vm, property)?;
    let problem = gen::invar_problem(vm, fsm, p);
    let cnf = vm.be_mut().to_cnf(problem);
    crate::dump::dump_if_configured(vm, &cnf, 1, opts, "invar");

    let mut solver = create_solver(&opts.solver)?;
    solver.add(&cnf, Group::PERMANENT);
    solver.set_polarity(&cnf, Polarity::Positive, Group::PERMANENT);

    match solver.solve_all_groups().map_err(BmcError::from)? {
        SolveStatus::Unsatisfiable => Ok(CheckOutcome::Proved),
        SolveStatus::Satisfiable => {
            let trace = falsified_trace(solver.as_ref(), vm, problem, 1);
            Ok(CheckOutcome::Falsified(trace))
        }
    }
}

// ----------------------------------------------------------------------
// Eén–Sörensson temporal induction
// ----------------------------------------------------------------------

/// Temporal induction iterated up to the maximum bound, rebuilding the
/// problem and the solver for every query.
///
/// At each bound `k` two questions are asked: does a real counterexample
/// of length `k` exist (base), and does the simple-path induction step of
/// depth `k+1` close (step). The distinctness constraints bound the
/// induction depth by the recurrence diameter.
pub fn check_invariant_een_sorensson(
    vm: &mut VarManager,
    fsm: &BeFsm,
    property: &PropExpr,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    let p = invariant_to_be(vm, property)?;
    let state_vars: Vec<usize> = vm.state_var_indices().collect();

    for k in 0..=opts.max_bound {
        log::info!("Een-Sorensson: exploring bound {}", k);

        // Base: an initialised path of length k ending in ¬P.
        let base_problem = {
            let path = model::path_with_init(vm, fsm, k);
            let p_k = vm.shift_to_time(p, k);
            let violated = vm.be_mut().not(p_k);
            vm.be_mut().and(path, violated)
        };
        let mut solver = create_solver(&opts.solver)?;
        add_be_positively(solver.as_mut(), vm, base_problem, Group::PERMANENT);
        if solver.solve_all_groups().map_err(BmcError::from)? == SolveStatus::Satisfiable {
            let trace = falsified_trace(solver.as_ref(), vm, base_problem, k);
            return Ok(CheckOutcome::Falsified(trace));
        }

        // Step: a simple path of length k+1 holding P everywhere but at
        // its end.
        let step_problem = {
            let path = model::path_no_init(vm, fsm, k + 1);
            let mut acc = path;
            for i in 0..=k {
                let p_i = vm.shift_to_time(p, i);
                acc = vm.be_mut().and(acc, p_i);
            }
            let p_last = vm.shift_to_time(p, k + 1);
            let violated = vm.be_mut().not(p_last);
            acc = vm.be_mut().and(acc, violated);
            for i in 0..=k {
                for j in (i + 1)..=(k + 1) {
                    let differ = states_differ(vm, &state_vars, i, j);
                    acc = vm.be_mut().and(acc, differ);
                }
            }
            acc
        };
        let mut solver = create_solver(&opts.solver)?;
        add_be_positively(solver.as_mut(), vm, step_problem, Group::PERMANENT);
        if solver.solve_all_groups().map_err(BmcError::from)? == SolveStatus::Unsatisfiable {
            return Ok(CheckOutcome::Proved);
        }
    }
    Ok(CheckOutcome::Unknown {
        bound: opts.max_bound,
    })
}

// ----------------------------------------------------------------------
// ZigZag
// ----------------------------------------------------------------------

struct BoundContext {
    problem: Be,
    cnf: Cnf,
    group: Group,
}

/// The ZigZag incremental invariant check as an explicit state machine.
///
/// One incremental solver carries the whole run. The initial condition
/// lives in its own group so the step check can solve without it; the
/// property of the current bound is added permanently but asserted
/// negatively in a throwaway group, flipped to a permanent positive
/// assertion when the bound survives both checks.
pub struct ZigzagCheck<'a> {
    vm: &'a mut VarManager,
    fsm: &'a BeFsm,
    property: Be,
    solver: Box<dyn SatIncSolver>,
    init_group: Group,
    state_vars: Vec<usize>,
    k: usize,
    max_k: usize,
    phase: Phase,
    bound: Option<BoundContext>,
    witness: Option<Trace>,
}

impl<'a> ZigzagCheck<'a> {
    pub fn new(
        vm: &'a mut VarManager,
        fsm: &'a BeFsm,
        property: &PropExpr,
        opts: &CheckOptions,
    ) -> Result<Self, BmcError> {
        let p = invariant_to_be(vm, property)?;
        let mut solver = create_inc_solver(&opts.solver)?;
        let init_group = solver.create_group();
        let init = model::init0(vm, fsm);
        add_be_positively(solver.as_mut(), vm, init, init_group);
        let state_vars = vm.state_var_indices().collect();

        Ok(ZigzagCheck {
            vm,
            fsm,
            property: p,
            solver,
            init_group,
            state_vars,
            k: 0,
            max_k: opts.max_bound,
            phase: Phase::NeedStep,
            bound: None,
            witness: None,
        })
    }

    /// The phase the run is in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The bound currently under examination. Monotone.
    pub fn bound(&self) -> usize {
        self.k
    }

    /// Performs one transition. A no-op on a terminal phase.
    pub fn advance(&mut self) -> Result<(), BmcError> {
        match self.phase {
            Phase::NeedStep => {
                let group = self.solver.create_group();
                let problem = self.vm.shift_to_time(self.property, self.k);
                let cnf = add_be(self.solver.as_mut(), self.vm, problem, Group::PERMANENT);
                self.solver.set_polarity(&cnf, Polarity::Negative, group);
                self.bound = Some(BoundContext {
                    problem,
                    cnf,
                    group,
                });

                log::debug!("zigzag: step check at bound {}", self.k);
                match self
                    .solver
                    .solve_without_groups(&[self.init_group])
                    .map_err(BmcError::from)?
                {
                    SolveStatus::Unsatisfiable => self.phase = Phase::DoneProved,
                    SolveStatus::Satisfiable => self.phase = Phase::NeedBase,
                }
            }
            Phase::NeedBase => {
                log::debug!("zigzag: base check at bound {}", self.k);
                match self.solver.solve_all_groups().map_err(BmcError::from)? {
                    SolveStatus::Satisfiable => {
                        let problem = self.bound.as_ref().expect("bound context set").problem;
                        self.witness = Some(falsified_trace(
                            self.solver.as_ref(),
                            self.vm,
                            problem,
                            self.k,
                        ));
                        self.phase = Phase::DoneFalsified;
                    }
                    SolveStatus::Unsatisfiable => self.phase = Phase::Extend,
                }
            }
            Phase::Extend => {
                let BoundContext { cnf, group, .. } =
                    self.bound.take().expect("bound context set");
                self.solver.destroy_group(group);
                self.solver
                    .set_polarity(&cnf, Polarity::Positive, Group::PERMANENT);

                let unrolling = model::unroll(self.vm, self.fsm, self.k, self.k + 1);
                add_be_positively(self.solver.as_mut(), self.vm, unrolling, Group::PERMANENT);
                for i in 0..self.k {
                    let differ = states_differ(self.vm, &self.state_vars, i, self.k);
                    add_be_positively(self.solver.as_mut(), self.vm, differ, Group::PERMANENT);
                }

                self.k += 1;
                self.phase = if self.k > self.max_k {
                    Phase::Exhausted
                } else {
                    Phase::NeedStep
                };
            }
            Phase::DoneProved | Phase::DoneFalsified | Phase::Exhausted => {}
        }
        Ok(())
    }

    /// Drives the machine to a terminal phase.
    pub fn run(mut self) -> Result<CheckOutcome, BmcError> {
        while !self.phase.is_terminal() {
            self.advance()?;
        }
        Ok(match self.phase {
            Phase::DoneProved => CheckOutcome::Proved,
            Phase::DoneFalsified => {
                CheckOutcome::Falsified(self.witness.take().expect("witness recorded"))
            }
            Phase::Exhausted => CheckOutcome::Unknown { bound: self.max_k },
            _ => unreachable!(),
        })
    }
}

/// Runs ZigZag to completion.
pub fn check_invariant_zigzag(
    vm: &mut VarManager,
    fsm: &BeFsm,
    property: &PropExpr,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    ZigzagCheck::new(vm, fsm, property, opts)?.run()
}

// ----------------------------------------------------------------------
// Dual
// ----------------------------------------------------------------------

/// The Dual incremental invariant check as an explicit state machine.
///
/// Two incremental solvers advance in lock-step: the base solver grows an
/// initialised forward unrolling and looks for real counterexamples; the
/// step solver grows a backward unrolling from a `¬P` state (frame 0 by
/// construction) and proves the property when that search dies out. The
/// backward transitions need a current/next shift onto two arbitrary
/// frames, which only exists for models without input variables.
pub struct DualCheck<'a> {
    vm: &'a mut VarManager,
    fsm: &'a BeFsm,
    property: Be,
    base: Box<dyn SatIncSolver>,
    step: Box<dyn SatIncSolver>,
    state_vars: Vec<usize>,
    k: usize,
    max_k: usize,
    phase: Phase,
    witness: Option<Trace>,
}

impl<'a> std::fmt::Debug for DualCheck<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualCheck")
            .field("k", &self.k)
            .field("max_k", &self.max_k)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<'a> DualCheck<'a> {
    pub fn new(
        vm: &'a mut VarManager,
        fsm: &'a BeFsm,
        property: &PropExpr,
        opts: &CheckOptions,
    ) -> Result<Self, BmcError> {
        if vm.input_vars_count() > 0 {
            return Err(BmcError::algorithm_unavailable(
                "the Dual algorithm cannot run on models with input variables; use ZigZag",
            ));
        }
        let p = invariant_to_be(vm, property)?;

        let mut base = create_inc_solver(&opts.solver)?;
        let init = model::init0(vm, fsm);
        add_be_positively(base.as_mut(), vm, init, Group::PERMANENT);

        let mut step = create_inc_solver(&opts.solver)?;
        let p0 = vm.shift_to_time(p, 0);
        let cnf = add_be(step.as_mut(), vm, p0, Group::PERMANENT);
        step.set_polarity(&cnf, Polarity::Negative, Group::PERMANENT);

        let state_vars = vm.state_var_indices().collect();
        Ok(DualCheck {
            vm,
            fsm,
            property: p,
            base,
            step,
            state_vars,
            k: 0,
            max_k: opts.max_bound,
            phase: Phase::NeedBase,
            witness: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bound(&self) -> usize {
        self.k
    }

    /// Performs one transition. A no-op on a terminal phase.
    pub fn advance(&mut self) -> Result<(), BmcError> {
        match self.phase {
            Phase::NeedBase => {
                let group = self.base.create_group();
                let problem = self.vm.shift_to_time(self.property, self.k);
                let cnf = add_be(self.base.as_mut(), self.vm, problem, Group::PERMANENT);
                self.base.set_polarity(&cnf, Polarity::Negative, group);

                log::debug!("dual: base check at bound {}", self.k);
                match self.base.solve_all_groups().map_err(BmcError::from)? {
                    SolveStatus::Satisfiable => {
                        self.witness = Some(falsified_trace(
                            self.base.as_ref(),
                            self.vm,
                            problem,
                            self.k,
                        ));
                        self.phase = Phase::DoneFalsified;
                    }
                    SolveStatus::Unsatisfiable => {
                        self.base.destroy_group(group);
                        self.base
                            .set_polarity(&cnf, Polarity::Positive, Group::PERMANENT);
                        let unrolling = model::unroll(self.vm, self.fsm, self.k, self.k + 1);
                        add_be_positively(
                            self.base.as_mut(),
                            self.vm,
                            unrolling,
                            Group::PERMANENT,
                        );
                        self.phase = Phase::NeedStep;
                    }
                }
            }
            Phase::NeedStep => {
                log::debug!("dual: step check at bound {}", self.k);
                match self.step.solve_all_groups().map_err(BmcError::from)? {
                    SolveStatus::Unsatisfiable => self.phase = Phase::DoneProved,
                    SolveStatus::Satisfiable => self.phase = Phase::Extend,
                }
            }
            Phase::Extend => {
                // The backward transition k+1 -> k, invariants on both
                // frames, the property on the new frame, and distinctness
                // against every frame but the bad state 0.
                let trans_back =
                    self.vm
                        .shift_curr_next_to_times(self.fsm.trans(), self.k + 1, self.k);
                let invar_near = model::invar_at_time(self.vm, self.fsm, self.k);
                let invar_far = model::invar_at_time(self.vm, self.fsm, self.k + 1);
                let relation = {
                    let be = self.vm.be_mut();
                    let with_near = be.and(trans_back, invar_near);
                    be.and(with_near, invar_far)
                };
                add_be_positively(self.step.as_mut(), self.vm, relation, Group::PERMANENT);

                let p_far = self.vm.shift_to_time(self.property, self.k + 1);
                add_be_positively(self.step.as_mut(), self.vm, p_far, Group::PERMANENT);

                for i in 1..=self.k {
                    let differ = states_differ(self.vm, &self.state_vars, i, self.k + 1);
                    add_be_positively(self.step.as_mut(), self.vm, differ, Group::PERMANENT);
                }

                self.k += 1;
                self.phase = if self.k > self.max_k {
                    Phase::Exhausted
                } else {
                    Phase::NeedBase
                };
            }
            Phase::DoneProved | Phase::DoneFalsified | Phase::Exhausted => {}
        }
        Ok(())
    }

    /// Drives the machine to a terminal phase.
    pub fn run(mut self) -> Result<CheckOutcome, BmcError> {
        while !self.phase.is_terminal() {
            self.advance()?;
        }
        Ok(match self.phase {
            Phase::DoneProved => CheckOutcome::Proved,
            Phase::DoneFalsified => {
                CheckOutcome::Falsified(self.witness.take().expect("witness recorded"))
            }
            Phase::Exhausted => CheckOutcome::Unknown { bound: self.max_k },
            _ => unreachable!(),
        })
    }
}

/// Runs Dual to completion.
pub fn check_invariant_dual(
    vm: &mut VarManager,
    fsm: &BeFsm,
    property: &PropExpr,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    DualCheck::new(vm, fsm, property, opts)?.run()
}

// ----------------------------------------------------------------------
// LTL
// ----------------------------------------------------------------------

/// Non-incremental LTL check: the complete problem is rebuilt, converted
/// and solved from scratch at every bound.
pub fn check_ltl_non_incremental(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    let negated = negated_nnf(wff);

    for k in opts.min_bound..=opts.max_bound {
        let loopback = opts.loopback.to_absolute(k);
        if loopback.is_single() && loopback.validate(k).is_err() {
            log::warn!(
                "problem with bound {} and loopback {} is not allowed: skipped",
                k,
                opts.loopback
            );
            continue;
        }
        log::info!(
            "generating LTL problem with bound {}, loopback {}",
            k,
            loopback
        );

        let problem = gen::ltl_problem(vm, fsm, &negated, k, loopback)?;
        let cnf = vm.be_mut().to_cnf(problem);
        crate::dump::dump_if_configured(vm, &cnf, k, opts, &format!("ltl_k{}", k));

        let mut solver = create_solver(&opts.solver)?;
        solver.add(&cnf, Group::PERMANENT);
        solver.set_polarity(&cnf, Polarity::Positive, Group::PERMANENT);

        match solver.solve_all_groups().map_err(BmcError::from)? {
            SolveStatus::Satisfiable => {
                let trace = falsified_trace(solver.as_ref(), vm, problem, k);
                return Ok(CheckOutcome::Falsified(trace));
            }
            SolveStatus::Unsatisfiable => {
                log::info!("no counterexample found with bound {}", k);
            }
        }
    }
    Ok(CheckOutcome::Unknown {
        bound: opts.max_bound,
    })
}

/// Incremental LTL check: `init0` and the growing unrolling stay in the
/// permanent group, each bound's tableau goes into a disposable group that
/// is destroyed when the bound yields no counterexample.
pub fn check_ltl_incremental(
    vm: &mut VarManager,
    fsm: &BeFsm,
    wff: &Wff,
    opts: &CheckOptions,
) -> Result<CheckOutcome, BmcError> {
    let negated = negated_nnf(wff);

    let mut solver = create_inc_solver(&opts.solver)?;
    let init = model::init0(vm, fsm);
    add_be_positively(solver.as_mut(), vm, init, Group::PERMANENT);

    let mut unrolled_to = 0usize;
    for k in opts.min_bound..=opts.max_bound {
        let loopback = opts.loopback.to_absolute(k);
        if loopback.is_single() && loopback.validate(k).is_err() {
            log::warn!(
                "problem with bound {} and loopback {} is not allowed: skipped",
                k,
                opts.loopback
            );
            continue;
        }
        log::info!(
            "extending LTL problem to bound {}, loopback {}",
            k,
            loopback
        );

        if unrolled_to < k {
            let unrolling = model::unroll(vm, fsm, unrolled_to, k);
            add_be_positively(solver.as_mut(), vm, unrolling, Group::PERMANENT);
            unrolled_to = k;
        }

        let group = solver.create_group();
        let tab = tableau::ltl_tableau(vm, fsm, &negated, k, loopback)?;
        let cnf = add_be(solver.as_mut(), vm, tab, group);
        solver.set_polarity(&cnf, Polarity::Positive, group);

        match solver.solve_all_groups().map_err(BmcError::from)? {
            SolveStatus::Satisfiable => {
                let trace = falsified_trace(solver.as_ref(), vm, tab, k);
                return Ok(CheckOutcome::Falsified(trace));
            }
            SolveStatus::Unsatisfiable => {
                solver.destroy_group(group);
            }
        }
    }
    Ok(CheckOutcome::Unknown {
        bound: opts.max_bound,
    })
}
