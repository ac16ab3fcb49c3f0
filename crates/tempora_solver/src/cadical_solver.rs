//! CaDiCaL-backed implementation of the solver interface.
//!
//! CaDiCaL has no native clause groups; they are realised the standard way,
//! with one activation literal per group. A clause added to group `g`
//! becomes `¬a_g ∨ clause`, solving assumes `a_g` for every group that is
//! both live and not excluded, and destroying `g` adds the unit `¬a_g`,
//! which permanently satisfies (and thereby retires) every clause of the
//! group.
//!
//! The checker's CNF variables and the activation literals share the
//! solver's variable space through an external/internal mapping: each
//! incoming CNF variable is assigned a solver variable on first sight, and
//! activation literals draw from the same counter. The mapping keeps the
//! two ranges from ever colliding no matter how many CNF variables later
//! conversions introduce.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use tempora_expr::{Cnf, Top};

use crate::{Group, Polarity, SatIncSolver, SatSolver, SolveStatus, SolverError};

struct GroupInfo {
    /// Internal activation variable; 0 for the permanent group.
    act: i32,
    alive: bool,
}

/// The CaDiCaL solver with activation-literal groups.
pub struct CadicalSolver {
    solver: cadical::Solver,
    groups: Vec<GroupInfo>,
    /// External CNF variable -> internal solver variable.
    ext2int: FxHashMap<i32, i32>,
    /// Internal solver variable -> external CNF variable (0 = activation).
    int2ext: Vec<i32>,
    model: Vec<i32>,
    last_time: Duration,
}

impl CadicalSolver {
    pub fn new() -> Self {
        CadicalSolver {
            solver: cadical::Solver::new(),
            groups: vec![GroupInfo { act: 0, alive: true }],
            ext2int: FxHashMap::default(),
            int2ext: vec![0], // dummy slot so internal variables are 1-based
            model: Vec::new(),
            last_time: Duration::ZERO,
        }
    }

    fn fresh_internal_var(&mut self, ext: i32) -> i32 {
        let v = self.int2ext.len() as i32;
        self.int2ext.push(ext);
        v
    }

    fn map_lit(&mut self, lit: i32) -> i32 {
        debug_assert!(lit != 0);
        let ext_var = lit.abs();
        let int_var = match self.ext2int.get(&ext_var) {
            Some(&v) => v,
            None => {
                let v = self.fresh_internal_var(ext_var);
                self.ext2int.insert(ext_var, v);
                v
            }
        };
        if lit > 0 {
            int_var
        } else {
            -int_var
        }
    }

    fn group_info(&self, group: Group) -> &GroupInfo {
        assert!(group.0 < self.groups.len(), "unknown solver group {:?}", group);
        &self.groups[group.0]
    }

    /// Adds one clause (in external literals) guarded by the group's
    /// activation literal.
    fn add_guarded(&mut self, group: Group, clause: &[i32]) {
        let info = self.group_info(group);
        assert!(info.alive, "clause added to a destroyed group");
        let act = info.act;
        let mut mapped: Vec<i32> = Vec::with_capacity(clause.len() + 1);
        if act != 0 {
            mapped.push(-act);
        }
        for &lit in clause {
            mapped.push(self.map_lit(lit));
        }
        self.solver.add_clause(mapped);
    }

    fn solve_with_assumptions(&mut self, excluded: &[Group]) -> Result<SolveStatus, SolverError> {
        let assumptions: Vec<i32> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(id, info)| {
                info.act != 0 && info.alive && !excluded.iter().any(|g| g.0 == *id)
            })
            .map(|(_, info)| info.act)
            .collect();

        let started = Instant::now();
        let outcome = self
            .solver
            .solve_with(assumptions.into_iter());
        self.last_time = started.elapsed();

        match outcome {
            Some(true) => {
                self.extract_model();
                log::debug!(
                    "cadical: SAT in {:?} ({} clauses)",
                    self.last_time,
                    self.solver.num_clauses()
                );
                Ok(SolveStatus::Satisfiable)
            }
            Some(false) => {
                log::debug!("cadical: UNSAT in {:?}", self.last_time);
                Ok(SolveStatus::Unsatisfiable)
            }
            None => Err(SolverError::ResourceExhausted(
                "cadical gave up before reaching a verdict".into(),
            )),
        }
    }

    fn extract_model(&mut self) {
        self.model.clear();
        for int_var in 1..self.int2ext.len() as i32 {
            let ext = self.int2ext[int_var as usize];
            if ext == 0 {
                continue; // activation literal
            }
            match self.solver.value(int_var) {
                Some(true) => self.model.push(ext),
                Some(false) => self.model.push(-ext),
                None => {} // don't-care; consumers default to false
            }
        }
    }
}

impl Default for CadicalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for CadicalSolver {
    fn name(&self) -> &str {
        "cadical"
    }

    fn add(&mut self, cnf: &Cnf, group: Group) {
        for clause in cnf.clauses() {
            self.add_guarded(group, clause);
        }
    }

    fn set_polarity(&mut self, cnf: &Cnf, polarity: Polarity, group: Group) {
        match cnf.top() {
            Top::Lit(top) => {
                self.add_guarded(group, &[polarity.apply(top)]);
            }
            Top::Const(value) => {
                let forced_false = match polarity {
                    Polarity::Positive => !value,
                    Polarity::Negative => value,
                };
                if forced_false {
                    // Asserting the impossible polarity of a constant makes
                    // the group contradictory.
                    self.add_guarded(group, &[]);
                }
            }
        }
    }

    fn solve_all_groups(&mut self) -> Result<SolveStatus, SolverError> {
        self.solve_with_assumptions(&[])
    }

    fn model(&self) -> &[i32] {
        &self.model
    }

    fn last_solving_time(&self) -> Duration {
        self.last_time
    }
}

impl SatIncSolver for CadicalSolver {
    fn create_group(&mut self) -> Group {
        let act = self.fresh_internal_var(0);
        let id = self.groups.len();
        self.groups.push(GroupInfo { act, alive: true });
        Group(id)
    }

    fn destroy_group(&mut self, group: Group) {
        assert!(!group.is_permanent(), "the permanent group cannot be destroyed");
        let info = &mut self.groups[group.0];
        assert!(info.alive, "group {:?} destroyed twice", group);
        info.alive = false;
        let act = info.act;
        self.solver.add_clause([-act]);
    }

    fn solve_without_groups(&mut self, excluded: &[Group]) -> Result<SolveStatus, SolverError> {
        self.solve_with_assumptions(excluded)
    }
}
