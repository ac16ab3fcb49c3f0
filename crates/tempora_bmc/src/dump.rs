//! DIMACS output of generated problems.
//!
//! The dump leads with a comment block mapping each CNF index back to its
//! `(time, variable name)` pair, so a model found by an external solver can
//! be read off by hand. The trivial formulas get their reserved encodings:
//! a trivially true problem emits a comment and no clauses, a trivially
//! false one the contradictory units `1 0` and `-1 0`.

use std::fs;
use std::io::{self, Write};

use tempora_expr::{Cnf, Top};

use crate::options::CheckOptions;
use crate::vars::VarManager;

/// Writes `cnf` as a DIMACS problem over a path of length `k`.
pub fn write_dimacs(
    vm: &VarManager,
    cnf: &Cnf,
    k: usize,
    out: &mut dyn Write,
) -> io::Result<()> {
    writeln!(out, "c BMC problem generated by tempora")?;
    writeln!(
        out,
        "c Time steps from 0 to {}, {} state variables and {} input variables",
        k,
        vm.state_vars_count(),
        vm.input_vars_count()
    )?;
    writeln!(out, "c Model to DIMACS conversion table")?;

    for time in 0..=k {
        writeln!(out, "c")?;
        writeln!(out, "c @@@@@ Time {}", time)?;
        for var_index in 0..vm.state_input_count() {
            // Input variables do not exist on the final frame.
            if time == k && var_index >= vm.state_vars_count() {
                continue;
            }
            let be_index = vm.var_index_to_be_index(var_index, time, k);
            if let Some(cnf_index) = vm.be().cnf_index_of_var(be_index) {
                writeln!(
                    out,
                    "c CNF variable {} => Time {}, Model Variable {}",
                    cnf_index,
                    time,
                    vm.index_to_name(var_index)
                )?;
            }
        }
    }
    writeln!(out, "c")?;

    // The independent (model) variables as a special comment line.
    writeln!(out, "c model {}", cnf.var_count())?;
    write!(out, "c ")?;
    for cnf_index in cnf.vars() {
        write!(out, "{} ", cnf_index)?;
    }
    writeln!(out, "0")?;

    match cnf.top() {
        Top::Const(true) => {
            writeln!(out, "p cnf 0 0")?;
            writeln!(out, "c the true constant is printed out")?;
        }
        Top::Const(false) => {
            writeln!(out, "p cnf 1 2")?;
            writeln!(out, "c the false constant is printed out")?;
            writeln!(out, "1 0")?;
            writeln!(out, "-1 0")?;
        }
        Top::Lit(top) => {
            // One extra clause: the unit forcing the top literal.
            writeln!(out, "p cnf {} {}", cnf.max_var(), cnf.clause_count() + 1)?;
            writeln!(out, "{} 0", top)?;
            for clause in cnf.clauses() {
                for lit in clause {
                    write!(out, "{} ", lit)?;
                }
                writeln!(out, "0")?;
            }
        }
    }
    writeln!(out, "c end of dump")
}

/// Writes an invariant problem; the two-frame encoding always spans one
/// step.
pub fn write_invar_dimacs(vm: &VarManager, cnf: &Cnf, out: &mut dyn Write) -> io::Result<()> {
    write_dimacs(vm, cnf, 1, out)
}

/// Drops a DIMACS dump into the configured directory, if any. Dump
/// failures are reported and otherwise ignored; they never abort a check.
pub(crate) fn dump_if_configured(
    vm: &VarManager,
    cnf: &Cnf,
    k: usize,
    opts: &CheckOptions,
    stem: &str,
) {
    let dir = match &opts.dump_dimacs {
        Some(dir) => dir,
        None => return,
    };
    let path = dir.join(format!("{}.dimacs", stem));
    let result = fs::File::create(&path)
        .and_then(|mut file| write_dimacs(vm, cnf, k, &mut file));
    match result {
        Ok(()) => log::info!("problem dumped to {}", path.display()),
        Err(err) => log::warn!("DIMACS dump to {} failed: {}", path.display(), err),
    }
}
