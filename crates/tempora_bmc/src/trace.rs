//! Reconstruction of witness traces from SAT models.
//!
//! A satisfying assignment comes back from the solver as signed CNF
//! literals. [`SatTrace`] pairs that raw model with the problem it was
//! computed from and decodes it lazily: CNF indices translate to BE
//! indices through the manager, BE indices to `(time, variable)` pairs
//! through the variable manager, and everything that is not a timed
//! state/input variable within the path length (Tseitin auxiliaries,
//! untimed occurrences, frames beyond `k`) is dropped. Unassigned
//! entries default to false.
//!
//! The decoded [`Trace`] alternates `k+1` state assignments with `k` input
//! assignments; the final state consumes no input.

use std::fmt;

use serde::{Deserialize, Serialize};

use tempora_expr::Be;

use crate::vars::VarManager;

/// A valuation of named variables at one time step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<(String, bool)>,
}

impl Assignment {
    /// The value of a variable, if it belongs to this assignment.
    pub fn value(&self, name: &str) -> Option<bool> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// A witness trace: `k+1` states interleaved with `k` inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    states: Vec<Assignment>,
    inputs: Vec<Assignment>,
}

impl Trace {
    /// The path length `k`.
    pub fn len(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.states.len() <= 1
    }

    pub fn states(&self) -> &[Assignment] {
        &self.states
    }

    pub fn inputs(&self) -> &[Assignment] {
        &self.inputs
    }

    pub fn state(&self, time: usize) -> &Assignment {
        &self.states[time]
    }

    pub fn input(&self, time: usize) -> &Assignment {
        &self.inputs[time]
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (time, state) in self.states.iter().enumerate() {
            writeln!(f, "-> State {} <-", time)?;
            for (name, value) in state.iter() {
                writeln!(f, "  {} = {}", name, value)?;
            }
            if time < self.inputs.len() && !self.inputs[time].values.is_empty() {
                writeln!(f, "-> Input {} <-", time)?;
                for (name, value) in self.inputs[time].iter() {
                    writeln!(f, "  {} = {}", name, value)?;
                }
            }
        }
        Ok(())
    }
}

/// The raw solver outcome paired with its problem, decoded on demand.
pub struct SatTrace {
    problem: Be,
    model: Vec<i32>,
    decoded: Option<(usize, Trace)>,
}

impl SatTrace {
    pub fn new(problem: Be, model: Vec<i32>) -> Self {
        SatTrace {
            problem,
            model,
            decoded: None,
        }
    }

    /// The problem this model satisfies.
    pub fn problem(&self) -> Be {
        self.problem
    }

    /// The raw model, as signed CNF literals.
    pub fn model(&self) -> &[i32] {
        &self.model
    }

    /// Decodes the model into a trace of length `k`. Memoised per `k`.
    ///
    /// A constant problem decodes to the empty trace; there is nothing to
    /// witness.
    pub fn symbolic_trace(&mut self, vm: &VarManager, k: usize) -> Trace {
        if let Some((cached_k, trace)) = &self.decoded {
            if *cached_k == k {
                return trace.clone();
            }
        }
        let trace = if vm.be().is_constant(self.problem) {
            Trace {
                states: Vec::new(),
                inputs: Vec::new(),
            }
        } else {
            self.decode(vm, k)
        };
        self.decoded = Some((k, trace.clone()));
        trace
    }

    /// The decoded model as a valuation of the whole reserved BE variable
    /// block (timed entries filled in, everything else false). Suitable for
    /// [`tempora_expr::BeManager::eval`] against unrolled expressions.
    pub fn timed_assignment(&self, vm: &VarManager, k: usize) -> Vec<bool> {
        let mut values = vec![false; vm.be().var_count()];
        for (be_index, value) in self.timed_entries(vm, k) {
            values[be_index] = value;
        }
        values
    }

    fn timed_entries<'a>(
        &'a self,
        vm: &'a VarManager,
        k: usize,
    ) -> impl Iterator<Item = (usize, bool)> + 'a {
        self.model.iter().filter_map(move |&lit| {
            let cnf_index = lit.abs();
            let be_index = vm.be().var_of_cnf_index(cnf_index)?;
            if vm.is_index_untimed(be_index) {
                return None;
            }
            if !vm.is_index_state_var(be_index, k) && !vm.is_index_input_var(be_index, k) {
                return None;
            }
            Some((be_index, lit > 0))
        })
    }

    fn decode(&self, vm: &VarManager, k: usize) -> Trace {
        let width = vm.state_input_count();
        let mut matrix = vec![vec![false; width]; k + 1];
        for (be_index, value) in self.timed_entries(vm, k) {
            let time = vm.be_index_to_time(be_index);
            let var_index = vm.be_index_to_var_index(be_index);
            debug_assert!(time <= k);
            matrix[time][var_index] = value;
        }

        let mut states = Vec::with_capacity(k + 1);
        let mut inputs = Vec::with_capacity(k);
        for (time, row) in matrix.iter().enumerate() {
            let state_values = vm
                .state_var_indices()
                .map(|i| (vm.index_to_name(i).to_string(), row[i]))
                .collect();
            states.push(Assignment {
                values: state_values,
            });
            if time < k {
                let input_values = vm
                    .input_var_indices()
                    .map(|i| (vm.index_to_name(i).to_string(), row[i]))
                    .collect();
                inputs.push(Assignment {
                    values: input_values,
                });
            }
        }
        Trace { states, inputs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> VarManager {
        VarManager::new(["p", "q"], ["i"])
    }

    /// Builds a model assigning the given timed variables through the CNF
    /// translation (forcing the CNF indices to exist first).
    fn model_of(vm: &mut VarManager, k: usize, entries: &[(usize, usize, bool)]) -> Vec<i32> {
        let mut model = Vec::new();
        for &(var_index, time, value) in entries {
            let be = vm.timed_var(var_index, time, k);
            let cnf = vm.be_mut().to_cnf(be);
            let lit = cnf.top().literal().unwrap();
            model.push(if value { lit } else { -lit });
        }
        model
    }

    #[test]
    fn decodes_states_and_inputs_with_false_defaults() {
        let mut vm = manager();
        let k = 2;
        // p@0 = 1, q@1 = 1, i@1 = 1; the rest defaults to false.
        let model = model_of(&mut vm, k, &[(0, 0, true), (1, 1, true), (2, 1, true)]);
        let problem = vm.timed_var(0, 0, k); // any non-constant BE
        let mut sat = SatTrace::new(problem, model);
        let trace = sat.symbolic_trace(&vm, k);

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.states().len(), 3);
        assert_eq!(trace.inputs().len(), 2);
        assert_eq!(trace.state(0).value("p"), Some(true));
        assert_eq!(trace.state(0).value("q"), Some(false));
        assert_eq!(trace.state(1).value("q"), Some(true));
        assert_eq!(trace.input(1).value("i"), Some(true));
        assert_eq!(trace.input(0).value("i"), Some(false));
        // Inputs do not extend to the final state.
        assert_eq!(trace.state(2).value("i"), None);
    }

    #[test]
    fn untimed_and_out_of_range_literals_are_dropped() {
        let mut vm = manager();
        let k = 1;
        // An untimed occurrence of p and a frame beyond k.
        let untimed = vm.name_to_curr("p").unwrap();
        let cnf_untimed = vm.be_mut().to_cnf(untimed);
        let beyond = vm.timed_var(0, 3, 3);
        let cnf_beyond = vm.be_mut().to_cnf(beyond);

        let model = vec![
            cnf_untimed.top().literal().unwrap(),
            cnf_beyond.top().literal().unwrap(),
        ];
        let problem = vm.timed_var(0, 0, k);
        let mut sat = SatTrace::new(problem, model);
        let trace = sat.symbolic_trace(&vm, k);
        // Nothing decoded: everything defaults to false.
        assert_eq!(trace.state(0).value("p"), Some(false));
        assert_eq!(trace.state(1).value("p"), Some(false));
    }

    #[test]
    fn constant_problem_decodes_to_the_empty_trace() {
        let vm = manager();
        let mut sat = SatTrace::new(vm.be().truth(), vec![]);
        let trace = sat.symbolic_trace(&vm, 4);
        assert!(trace.is_empty());
        assert!(trace.states().is_empty());
    }

    #[test]
    fn decoding_is_memoised_per_length() {
        let mut vm = manager();
        let k = 1;
        let model = model_of(&mut vm, k, &[(0, 0, true)]);
        let problem = vm.timed_var(0, 0, k);
        let mut sat = SatTrace::new(problem, model);
        let first = sat.symbolic_trace(&vm, k);
        let second = sat.symbolic_trace(&vm, k);
        assert_eq!(first, second);
    }

    #[test]
    fn timed_assignment_covers_the_reserved_block() {
        let mut vm = manager();
        let k = 1;
        let model = model_of(&mut vm, k, &[(0, 1, true)]);
        let problem = vm.timed_var(0, 0, k);
        let sat = SatTrace::new(problem, model);

        let values = sat.timed_assignment(&vm, k);
        assert_eq!(values.len(), vm.be().var_count());
        let p1 = vm.var_index_to_be_index(0, 1, k);
        assert!(values[p1]);
        let p0 = vm.var_index_to_be_index(0, 0, k);
        assert!(!values[p0]);
    }

    #[test]
    fn display_lists_states_and_inputs() {
        let mut vm = manager();
        let k = 1;
        let model = model_of(&mut vm, k, &[(0, 0, true)]);
        let problem = vm.timed_var(0, 0, k);
        let mut sat = SatTrace::new(problem, model);
        let text = sat.symbolic_trace(&vm, k).to_string();
        assert!(text.contains("-> State 0 <-"));
        assert!(text.contains("p = true"));
        assert!(text.contains("-> Input 0 <-"));
        assert!(text.contains("-> State 1 <-"));
    }
}
