//! Cross-validation of the tableau against an independent evaluator.
//!
//! The tableau encodes the bounded semantics of LTL on `(k, l)` paths. The
//! evaluator below implements that semantics directly on an explicit path
//! (a row of state bits per frame), by the textbook definition rather than
//! by formula construction: windows for F/G, chain walks for U/R, the
//! end-of-path rule for X. Every formula in the catalogue is then checked
//! on every path of every admissible `(k, l)` shape: evaluating the
//! tableau's expression under the path's timed assignment must agree with
//! the evaluator.

use tempora_bmc::{succ_time, tableau, Loopback, VarManager, Wff};

/// One explicit path: `rows[t][v]` is state bit `v` at time `t`.
struct Path {
    rows: Vec<Vec<bool>>,
}

impl Path {
    fn k(&self) -> usize {
        self.rows.len() - 1
    }
}

/// Bounded semantics of an LTL formula at position `t` of a `(k, l)` path.
///
/// `loopback` must be `None` or an admissible fixed loop; for the loop
/// case the caller guarantees `rows[k] == rows[l]`.
fn holds(wff: &Wff, path: &Path, vars: &[&str], t: usize, loopback: Loopback) -> bool {
    let k = path.k();
    let value = |name: &str, pos: usize| -> bool {
        let v = vars.iter().position(|n| *n == name).expect("known variable");
        path.rows[pos][v]
    };

    match wff {
        Wff::True => true,
        Wff::False => false,
        Wff::Var(name) => value(name, t),
        Wff::Not(a) => !holds(a, path, vars, t, loopback),
        Wff::And(a, b) => {
            holds(a, path, vars, t, loopback) && holds(b, path, vars, t, loopback)
        }
        Wff::Or(a, b) => {
            holds(a, path, vars, t, loopback) || holds(b, path, vars, t, loopback)
        }
        Wff::Implies(a, b) => {
            !holds(a, path, vars, t, loopback) || holds(b, path, vars, t, loopback)
        }
        Wff::Iff(a, b) => {
            holds(a, path, vars, t, loopback) == holds(b, path, vars, t, loopback)
        }
        Wff::Next(a) => match succ_time(t, k, loopback) {
            Some(s) => holds(a, path, vars, s, loopback),
            None => false,
        },
        Wff::Eventually(a) => match loopback {
            Loopback::None => (t..=k).any(|pos| holds(a, path, vars, pos, loopback)),
            Loopback::Loop(l) => (t.min(l as usize)..k)
                .any(|pos| holds(a, path, vars, pos, loopback)),
            Loopback::All => unreachable!(),
        },
        Wff::Globally(a) => match loopback {
            Loopback::None => false,
            Loopback::Loop(l) => (t.min(l as usize)..k)
                .all(|pos| holds(a, path, vars, pos, loopback)),
            Loopback::All => unreachable!(),
        },
        Wff::Until(p, q) => {
            // Walk the successor chain; a full cycle without q refutes.
            let mut pos = t;
            let mut steps = 0;
            loop {
                if holds(q, path, vars, pos, loopback) {
                    return true;
                }
                if !holds(p, path, vars, pos, loopback) {
                    return false;
                }
                match succ_time(pos, k, loopback) {
                    Some(next) => pos = next,
                    None => return false,
                }
                steps += 1;
                if steps > 2 * (k + 1) {
                    return false;
                }
            }
        }
        Wff::Releases(p, q) => {
            // q must hold until (and including when) p releases it; on a
            // loop, q forever also suffices.
            let mut pos = t;
            let mut steps = 0;
            loop {
                if !holds(q, path, vars, pos, loopback) {
                    return false;
                }
                if holds(p, path, vars, pos, loopback) {
                    return true;
                }
                match succ_time(pos, k, loopback) {
                    Some(next) => pos = next,
                    None => return false,
                }
                steps += 1;
                if steps > 2 * (k + 1) {
                    return true;
                }
            }
        }
        _ => panic!("past-time operators are outside the tableau's scope"),
    }
}

/// Evaluates the tableau expression of `wff` under the timed assignment of
/// an explicit path.
///
/// Both sides see the NNF form: bounded semantics is not closed under
/// classical negation (on a loop-free prefix neither `F a` nor its dual
/// may be witnessed), so the duality rewriting applied before tableau
/// construction is part of the semantics under test.
fn tableau_agrees(wff: &Wff, path: &Path, vars: &[&str], loopback: Loopback) -> (bool, bool) {
    let k = path.k();
    let mut vm = VarManager::new(vars.iter().copied(), Vec::<&str>::new());
    let nnf = wff.nnf();
    let expr = tableau::tableau_at_time(&mut vm, &nnf, 0, k, loopback).unwrap();

    let mut values = vec![false; vm.be().var_count()];
    for (time, row) in path.rows.iter().enumerate() {
        for (v, &bit) in row.iter().enumerate() {
            values[vm.var_index_to_be_index(v, time, k)] = bit;
        }
    }
    let encoded = vm.be().eval(expr, &values);
    let semantic = holds(&nnf, path, vars, 0, loopback);
    (encoded, semantic)
}

/// All bit rows of the given width.
fn all_rows(width: usize) -> Vec<Vec<bool>> {
    (0..(1u32 << width))
        .map(|bits| (0..width).map(|i| bits & (1 << i) != 0).collect())
        .collect()
}

/// All paths of length `k` over `width` bits; with a fixed loop the final
/// frame is forced to repeat frame `l`.
fn all_paths(width: usize, k: usize, loopback: Loopback) -> Vec<Path> {
    let rows = all_rows(width);
    let mut paths = vec![Vec::new()];
    for _ in 0..=k {
        let mut extended = Vec::new();
        for prefix in &paths {
            for row in &rows {
                let mut longer: Vec<Vec<bool>> = prefix.clone();
                longer.push(row.clone());
                extended.push(longer);
            }
        }
        paths = extended;
    }
    paths
        .into_iter()
        .filter(|rows| match loopback {
            Loopback::Loop(l) => rows[k] == rows[l as usize],
            _ => true,
        })
        .map(|rows| Path { rows })
        .collect()
}

fn formula_catalogue() -> Vec<Wff> {
    let a = || Wff::var("a");
    let b = || Wff::var("b");
    vec![
        Wff::eventually(a()),
        Wff::globally(a()),
        Wff::next(a()),
        Wff::next(Wff::next(b())),
        Wff::until(a(), b()),
        Wff::releases(a(), b()),
        Wff::not(Wff::until(a(), b())),
        Wff::eventually(Wff::and(a(), Wff::next(b()))),
        Wff::globally(Wff::implies(a(), Wff::eventually(b()))),
        Wff::globally(Wff::eventually(a())),
        Wff::eventually(Wff::globally(a())),
        Wff::until(Wff::next(a()), b()),
        Wff::releases(a(), Wff::or(b(), Wff::next(a()))),
        Wff::iff(Wff::eventually(a()), Wff::eventually(b())),
        Wff::not(Wff::globally(Wff::implies(a(), Wff::next(b())))),
    ]
}

fn check_shape(k: usize, loopback: Loopback) {
    let vars = ["a", "b"];
    for wff in formula_catalogue() {
        for path in all_paths(vars.len(), k, loopback) {
            let (encoded, semantic) = tableau_agrees(&wff, &path, &vars, loopback);
            assert_eq!(
                encoded, semantic,
                "tableau disagrees on '{}' at k={} l={} path={:?}",
                wff, k, loopback, path.rows
            );
        }
    }
}

#[test]
fn tableau_matches_semantics_without_loop() {
    for k in 0..=2 {
        check_shape(k, Loopback::None);
    }
}

#[test]
fn tableau_matches_semantics_on_self_loop() {
    check_shape(1, Loopback::Loop(0));
}

#[test]
fn tableau_matches_semantics_on_all_loop_positions_k2() {
    check_shape(2, Loopback::Loop(0));
    check_shape(2, Loopback::Loop(1));
}

#[test]
fn tableau_matches_semantics_on_all_loop_positions_k3() {
    check_shape(3, Loopback::Loop(0));
    check_shape(3, Loopback::Loop(1));
    check_shape(3, Loopback::Loop(2));
}
