//! The boolean-variable encoding.
//!
//! The manager owns the expression manager and lays the reserved variable
//! block out as follows, with `S` state variables and `I` input variables:
//!
//! ```text
//! [0, S)                                current-state block
//! [S, S+I)                              input block
//! [S+I, 2S+I)                           next-state block
//! [2S+I + t(S+I), ...)   for t ∈ [0, T]   timed block, frame t
//! ```
//!
//! Every frame repeats the current+input layout, except that the highest
//! allocated frame `T` materialises only its `S` state slots: a path of
//! length `T` consumes no input on its final state. The frame-relative
//! layout is what makes [`VarManager::shift_to_time`] a plain index shift:
//! adding the frame base maps current variables into frame `t`, input
//! variables into frame `t`'s input slots, and next-state variables into
//! frame `t+1`'s state slots, all at once.
//!
//! The timed block grows monotonically ([`VarManager::extend_time`]);
//! untimed indices never move.

use rustc_hash::FxHashMap;

use tempora_base::{Interner, Symbol};
use tempora_expr::{Be, BeManager};

/// Owner of the variable encoding and of the expression manager.
pub struct VarManager {
    be: BeManager,
    names: Interner,
    /// Symbols of the state then input variables, in layout order.
    var_symbols: Vec<Symbol>,
    index_of_symbol: FxHashMap<Symbol, usize>,
    state_count: usize,
    input_count: usize,
    max_time: usize,
}

impl VarManager {
    /// Creates a manager for the given state and input variable names.
    ///
    /// The iteration order fixes the variable indices: state variables take
    /// `[0, S)`, input variables `[S, S+I)`. Frame 0 is allocated
    /// immediately.
    ///
    /// # Panics
    ///
    /// Panics if a name occurs twice; the name/index table must stay
    /// bijective.
    pub fn new<I1, S1, I2, S2>(state_vars: I1, input_vars: I2) -> Self
    where
        I1: IntoIterator<Item = S1>,
        S1: AsRef<str>,
        I2: IntoIterator<Item = S2>,
        S2: AsRef<str>,
    {
        let mut names = Interner::new();
        let mut var_symbols = Vec::new();
        let mut index_of_symbol = FxHashMap::default();

        for name in state_vars {
            let sym = names.intern(name.as_ref());
            let prev = index_of_symbol.insert(sym, var_symbols.len());
            assert!(prev.is_none(), "duplicate variable name '{}'", name.as_ref());
            var_symbols.push(sym);
        }
        let state_count = var_symbols.len();
        for name in input_vars {
            let sym = names.intern(name.as_ref());
            let prev = index_of_symbol.insert(sym, var_symbols.len());
            assert!(prev.is_none(), "duplicate variable name '{}'", name.as_ref());
            var_symbols.push(sym);
        }
        let input_count = var_symbols.len() - state_count;

        let mut mgr = VarManager {
            be: BeManager::new(),
            names,
            var_symbols,
            index_of_symbol,
            state_count,
            input_count,
            max_time: 0,
        };
        let reserve = mgr.frame_base(0) + mgr.state_count;
        mgr.be.reserve(reserve);
        mgr
    }

    /// The underlying expression manager.
    pub fn be(&self) -> &BeManager {
        &self.be
    }

    pub fn be_mut(&mut self) -> &mut BeManager {
        &mut self.be
    }

    pub fn state_vars_count(&self) -> usize {
        self.state_count
    }

    pub fn input_vars_count(&self) -> usize {
        self.input_count
    }

    pub fn state_input_count(&self) -> usize {
        self.state_count + self.input_count
    }

    /// Highest allocated time frame.
    pub fn max_time(&self) -> usize {
        self.max_time
    }

    /// First BE index of frame `t`: `S(t+2) + I(t+1)`.
    pub fn frame_base(&self, t: usize) -> usize {
        self.state_count * (t + 2) + self.input_count * (t + 1)
    }

    /// Highest BE index in use when the final frame is `t`.
    fn max_be_index_at(&self, t: usize) -> usize {
        self.frame_base(t) + self.state_count - 1
    }

    /// Grows the timed block so frames `[0, t]` exist. Monotone.
    pub fn extend_time(&mut self, t: usize) {
        if t > self.max_time {
            log::debug!(
                "extending the timed block from frame {} to frame {}",
                self.max_time,
                t
            );
            self.max_time = t;
        }
        let reserve = self.frame_base(self.max_time) + self.state_count;
        self.be.reserve(reserve);
    }

    // ------------------------------------------------------------------
    // Shifters
    // ------------------------------------------------------------------

    /// Shifts an expression over the untimed blocks onto frame `time`:
    /// current and input variables land in frame `time`, next-state
    /// variables in frame `time + 1`.
    ///
    /// The expression must mention untimed variables only.
    pub fn shift_to_time(&mut self, expr: Be, time: usize) -> Be {
        // Next-state variables spill into the following frame.
        self.extend_time(time + 1);
        let delta = self.frame_base(time);
        self.be.shift(expr, delta)
    }

    /// Shifts current variables onto frame `ctime` and next-state variables
    /// onto frame `ntime` independently; `ntime` may lie below `ctime`.
    ///
    /// # Panics
    ///
    /// Panics if the model has input variables: frame `ctime` would need an
    /// input slot that the final frame does not materialise. (Only the
    /// backward-reasoning Dual algorithm consumes this shift, and it
    /// already refuses models with inputs.)
    pub fn shift_curr_next_to_times(&mut self, expr: Be, ctime: usize, ntime: usize) -> Be {
        assert!(
            self.input_count == 0,
            "shift_curr_next_to_times does not support input variables"
        );
        if self.be.is_constant(expr) {
            return expr;
        }
        self.extend_time(ctime.max(ntime));

        let s = self.state_count;
        let curr_base = self.frame_base(ctime);
        let next_base = self.frame_base(ntime);
        let mut map: Vec<usize> = (0..self.be.var_count()).collect();
        for i in 0..s {
            map[i] = curr_base + i;
            map[s + i] = next_base + i; // next block starts at S when I = 0
        }
        self.be.subst(expr, &map)
    }

    /// Relabels current-state variables as next-state ones.
    ///
    /// The expression must mention current-state variables only.
    pub fn shift_curr_to_next(&mut self, expr: Be) -> Be {
        let delta = self.state_input_count();
        self.be.shift(expr, delta)
    }

    /// `⋀_{t ∈ [from, to]} shift_to_time(expr, t)`; ⊤ for an empty range.
    pub fn and_interval(&mut self, expr: Be, from: usize, to: usize) -> Be {
        let mut acc = self.be.truth();
        if from > to {
            return acc;
        }
        for t in from..=to {
            let at_t = self.shift_to_time(expr, t);
            acc = self.be.and(acc, at_t);
        }
        acc
    }

    /// `⋁_{t ∈ [from, to]} shift_to_time(expr, t)`; ⊥ for an empty range.
    pub fn or_interval(&mut self, expr: Be, from: usize, to: usize) -> Be {
        let mut acc = self.be.falsity();
        if from > to {
            return acc;
        }
        for t in from..=to {
            let at_t = self.shift_to_time(expr, t);
            acc = self.be.or(acc, at_t);
        }
        acc
    }

    // ------------------------------------------------------------------
    // Name and index conversions
    // ------------------------------------------------------------------

    /// The variable index of a name, if declared.
    pub fn name_to_index(&self, name: &str) -> Option<usize> {
        let sym = self.names.lookup(name)?;
        self.index_of_symbol.get(&sym).copied()
    }

    /// The name of a variable index.
    ///
    /// # Panics
    ///
    /// Panics if `var_index` is not in `[0, S+I)`.
    pub fn index_to_name(&self, var_index: usize) -> &str {
        self.names.resolve(self.var_symbols[var_index])
    }

    /// The current-state (or input) occurrence of a declared variable.
    pub fn name_to_curr(&self, name: &str) -> Option<Be> {
        let index = self.name_to_index(name)?;
        Some(self.be.var(index))
    }

    /// The next-state occurrence of a declared *state* variable.
    pub fn name_to_next(&self, name: &str) -> Option<Be> {
        let index = self.name_to_index(name)?;
        if index >= self.state_count {
            return None; // input variables have no next-state occurrence
        }
        Some(self.be.var(self.state_input_count() + index))
    }

    /// The occurrence of a declared variable at `time` on a path of length
    /// `max_time`.
    pub fn name_to_timed(&mut self, name: &str, time: usize, max_time: usize) -> Option<Be> {
        let index = self.name_to_index(name)?;
        Some(self.timed_var(index, time, max_time))
    }

    /// The variable `var_index` at frame `time` on a path of length
    /// `max_time`.
    ///
    /// # Panics
    ///
    /// Panics if `time > max_time`, or if `var_index` is an input variable
    /// and `time == max_time`; the final frame has no inputs.
    pub fn timed_var(&mut self, var_index: usize, time: usize, max_time: usize) -> Be {
        self.extend_time(max_time);
        let be_index = self.var_index_to_be_index(var_index, time, max_time);
        self.be.var(be_index)
    }

    /// The BE index of `var_index` at frame `time` on a path of length
    /// `max_time`. Panics under the same conditions as
    /// [`VarManager::timed_var`].
    pub fn var_index_to_be_index(&self, var_index: usize, time: usize, max_time: usize) -> usize {
        assert!(
            var_index < self.state_input_count(),
            "{} is not a state or input variable index",
            var_index
        );
        assert!(
            time <= max_time,
            "time {} beyond the path length {}",
            time,
            max_time
        );
        assert!(
            time < max_time || var_index < self.state_count,
            "input variable {} does not exist at the final frame {}",
            var_index,
            max_time
        );
        self.frame_base(time) + var_index
    }

    /// The frame of a BE index: 0 for current/input, 1 for next, and the
    /// frame number for timed variables.
    pub fn be_index_to_time(&self, be_index: usize) -> usize {
        assert!(
            be_index <= self.max_be_index_at(self.max_time),
            "BE index {} beyond the allocated timed block",
            be_index
        );
        if self.is_index_curr_input(be_index) {
            0
        } else if self.is_index_next_state(be_index) {
            1
        } else {
            (be_index - self.frame_base(0)) / self.state_input_count()
        }
    }

    /// The frame-relative variable index of a BE index.
    pub fn be_index_to_var_index(&self, be_index: usize) -> usize {
        assert!(
            be_index <= self.max_be_index_at(self.max_time),
            "BE index {} beyond the allocated timed block",
            be_index
        );
        if self.is_index_untimed(be_index) {
            be_index % self.state_input_count()
        } else {
            (be_index - self.frame_base(0)) % self.state_input_count()
        }
    }

    // ------------------------------------------------------------------
    // Block predicates
    // ------------------------------------------------------------------

    /// `true` for indices of the three untimed blocks.
    pub fn is_index_untimed(&self, be_index: usize) -> bool {
        be_index < self.frame_base(0)
    }

    pub fn is_index_curr_state(&self, be_index: usize) -> bool {
        be_index < self.state_count
    }

    pub fn is_index_input_block(&self, be_index: usize) -> bool {
        be_index >= self.state_count && be_index < self.state_input_count()
    }

    pub fn is_index_curr_input(&self, be_index: usize) -> bool {
        be_index < self.state_input_count()
    }

    pub fn is_index_next_state(&self, be_index: usize) -> bool {
        be_index >= self.state_input_count() && be_index < self.frame_base(0)
    }

    /// `true` if the index denotes a state variable (untimed or timed) on a
    /// path of length `max_time`.
    pub fn is_index_state_var(&self, be_index: usize, max_time: usize) -> bool {
        if be_index > self.max_be_index_at(max_time) {
            return false;
        }
        self.be_index_to_var_index(be_index) < self.state_count
    }

    /// `true` if the index denotes an input variable (untimed or timed) on
    /// a path of length `max_time`.
    pub fn is_index_input_var(&self, be_index: usize, max_time: usize) -> bool {
        if be_index > self.max_be_index_at(max_time) {
            return false;
        }
        let var_index = self.be_index_to_var_index(be_index);
        var_index >= self.state_count && var_index < self.state_input_count()
    }

    /// Indices of the state variables, in layout order.
    pub fn state_var_indices(&self) -> std::ops::Range<usize> {
        0..self.state_count
    }

    /// Indices of the input variables, in layout order.
    pub fn input_var_indices(&self) -> std::ops::Range<usize> {
        self.state_count..self.state_input_count()
    }
}
