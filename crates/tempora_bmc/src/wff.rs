//! LTL well-formed formulas.
//!
//! The formula tree carries the full future-time operator set, the
//! past-time duals, and the propositional connectives. Constructors fold
//! constants where doing so is free. [`Wff::nnf`] drives the formula into
//! negation normal form by polarity-directed rewriting: implications are
//! eliminated, equivalences keep their shape with the polarity pushed into
//! one side, and the temporal duals (G/F, U/R, Y/Z, O/H, S/T) absorb
//! negation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An LTL formula over variable names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wff {
    True,
    False,
    Var(String),
    Not(Box<Wff>),
    And(Box<Wff>, Box<Wff>),
    Or(Box<Wff>, Box<Wff>),
    Implies(Box<Wff>, Box<Wff>),
    Iff(Box<Wff>, Box<Wff>),
    /// X φ
    Next(Box<Wff>),
    /// G φ
    Globally(Box<Wff>),
    /// F φ
    Eventually(Box<Wff>),
    /// φ U ψ
    Until(Box<Wff>, Box<Wff>),
    /// φ R ψ
    Releases(Box<Wff>, Box<Wff>),
    /// Y φ, previous
    Prev(Box<Wff>),
    /// Z φ, weak previous (¬Y¬)
    NotPrevNot(Box<Wff>),
    /// O φ, once
    Once(Box<Wff>),
    /// H φ, historically
    Historically(Box<Wff>),
    /// φ S ψ, since
    Since(Box<Wff>, Box<Wff>),
    /// φ T ψ, triggered
    Triggered(Box<Wff>, Box<Wff>),
}

impl Wff {
    pub fn truth() -> Self {
        Wff::True
    }

    pub fn falsity() -> Self {
        Wff::False
    }

    pub fn var(name: impl Into<String>) -> Self {
        Wff::Var(name.into())
    }

    pub fn not(arg: Wff) -> Self {
        Wff::Not(Box::new(arg))
    }

    /// Conjunction, folding the constants away.
    pub fn and(l: Wff, r: Wff) -> Self {
        match (&l, &r) {
            (Wff::False, _) | (_, Wff::False) => Wff::False,
            (Wff::True, _) => r,
            (_, Wff::True) => l,
            _ => Wff::And(Box::new(l), Box::new(r)),
        }
    }

    /// Disjunction, folding the constants away.
    pub fn or(l: Wff, r: Wff) -> Self {
        match (&l, &r) {
            (Wff::True, _) | (_, Wff::True) => Wff::True,
            (Wff::False, _) => r,
            (_, Wff::False) => l,
            _ => Wff::Or(Box::new(l), Box::new(r)),
        }
    }

    pub fn implies(l: Wff, r: Wff) -> Self {
        Wff::Implies(Box::new(l), Box::new(r))
    }

    pub fn iff(l: Wff, r: Wff) -> Self {
        Wff::Iff(Box::new(l), Box::new(r))
    }

    pub fn next(arg: Wff) -> Self {
        Wff::Next(Box::new(arg))
    }

    /// X applied `n` times.
    pub fn next_n(arg: Wff, n: usize) -> Self {
        (0..n).fold(arg, |acc, _| Wff::next(acc))
    }

    pub fn globally(arg: Wff) -> Self {
        Wff::Globally(Box::new(arg))
    }

    pub fn eventually(arg: Wff) -> Self {
        Wff::Eventually(Box::new(arg))
    }

    pub fn until(l: Wff, r: Wff) -> Self {
        Wff::Until(Box::new(l), Box::new(r))
    }

    pub fn releases(l: Wff, r: Wff) -> Self {
        Wff::Releases(Box::new(l), Box::new(r))
    }

    pub fn prev(arg: Wff) -> Self {
        Wff::Prev(Box::new(arg))
    }

    pub fn not_prev_not(arg: Wff) -> Self {
        Wff::NotPrevNot(Box::new(arg))
    }

    pub fn once(arg: Wff) -> Self {
        Wff::Once(Box::new(arg))
    }

    pub fn historically(arg: Wff) -> Self {
        Wff::Historically(Box::new(arg))
    }

    pub fn since(l: Wff, r: Wff) -> Self {
        Wff::Since(Box::new(l), Box::new(r))
    }

    pub fn triggered(l: Wff, r: Wff) -> Self {
        Wff::Triggered(Box::new(l), Box::new(r))
    }

    /// `true` if the formula contains a past-time operator.
    pub fn has_past_operators(&self) -> bool {
        match self {
            Wff::True | Wff::False | Wff::Var(_) => false,
            Wff::Prev(_)
            | Wff::NotPrevNot(_)
            | Wff::Once(_)
            | Wff::Historically(_)
            | Wff::Since(_, _)
            | Wff::Triggered(_, _) => true,
            Wff::Not(a)
            | Wff::Next(a)
            | Wff::Globally(a)
            | Wff::Eventually(a) => a.has_past_operators(),
            Wff::And(a, b)
            | Wff::Or(a, b)
            | Wff::Implies(a, b)
            | Wff::Iff(a, b)
            | Wff::Until(a, b)
            | Wff::Releases(a, b) => a.has_past_operators() || b.has_past_operators(),
        }
    }

    /// Rewrites the formula into negation normal form.
    pub fn nnf(&self) -> Wff {
        nnf_pol(self, true)
    }
}

/// Polarity-directed NNF: `nnf_pol(φ, true)` is φ in NNF, `nnf_pol(φ,
/// false)` is ¬φ in NNF.
fn nnf_pol(wff: &Wff, pol: bool) -> Wff {
    match wff {
        Wff::True => {
            if pol {
                Wff::True
            } else {
                Wff::False
            }
        }
        Wff::False => {
            if pol {
                Wff::False
            } else {
                Wff::True
            }
        }
        Wff::Var(name) => {
            if pol {
                Wff::Var(name.clone())
            } else {
                Wff::not(Wff::Var(name.clone()))
            }
        }
        Wff::Not(a) => nnf_pol(a, !pol),
        Wff::And(a, b) => {
            if pol {
                Wff::and(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::or(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
        Wff::Or(a, b) => {
            if pol {
                Wff::or(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::and(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
        Wff::Implies(a, b) => {
            // a → b ≡ ¬a ∨ b
            if pol {
                Wff::or(nnf_pol(a, false), nnf_pol(b, true))
            } else {
                Wff::and(nnf_pol(a, true), nnf_pol(b, false))
            }
        }
        Wff::Iff(a, b) => {
            // ¬(a ↔ b) ≡ a ↔ ¬b; both sides end up in NNF.
            if pol {
                Wff::iff(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::iff(nnf_pol(a, true), nnf_pol(b, false))
            }
        }
        Wff::Next(a) => Wff::next(nnf_pol(a, pol)),
        Wff::Globally(a) => {
            if pol {
                Wff::globally(nnf_pol(a, true))
            } else {
                Wff::eventually(nnf_pol(a, false))
            }
        }
        Wff::Eventually(a) => {
            if pol {
                Wff::eventually(nnf_pol(a, true))
            } else {
                Wff::globally(nnf_pol(a, false))
            }
        }
        Wff::Until(a, b) => {
            if pol {
                Wff::until(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::releases(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
        Wff::Releases(a, b) => {
            if pol {
                Wff::releases(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::until(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
        Wff::Prev(a) => {
            if pol {
                Wff::prev(nnf_pol(a, true))
            } else {
                Wff::not_prev_not(nnf_pol(a, false))
            }
        }
        Wff::NotPrevNot(a) => {
            if pol {
                Wff::not_prev_not(nnf_pol(a, true))
            } else {
                Wff::prev(nnf_pol(a, false))
            }
        }
        Wff::Once(a) => {
            if pol {
                Wff::once(nnf_pol(a, true))
            } else {
                Wff::historically(nnf_pol(a, false))
            }
        }
        Wff::Historically(a) => {
            if pol {
                Wff::historically(nnf_pol(a, true))
            } else {
                Wff::once(nnf_pol(a, false))
            }
        }
        Wff::Since(a, b) => {
            if pol {
                Wff::since(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::triggered(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
        Wff::Triggered(a, b) => {
            if pol {
                Wff::triggered(nnf_pol(a, true), nnf_pol(b, true))
            } else {
                Wff::since(nnf_pol(a, false), nnf_pol(b, false))
            }
        }
    }
}

impl fmt::Display for Wff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wff::True => write!(f, "TRUE"),
            Wff::False => write!(f, "FALSE"),
            Wff::Var(name) => write!(f, "{}", name),
            Wff::Not(a) => write!(f, "!{}", Paren(a)),
            Wff::And(a, b) => write!(f, "{} & {}", Paren(a), Paren(b)),
            Wff::Or(a, b) => write!(f, "{} | {}", Paren(a), Paren(b)),
            Wff::Implies(a, b) => write!(f, "{} -> {}", Paren(a), Paren(b)),
            Wff::Iff(a, b) => write!(f, "{} <-> {}", Paren(a), Paren(b)),
            Wff::Next(a) => write!(f, "X {}", Paren(a)),
            Wff::Globally(a) => write!(f, "G {}", Paren(a)),
            Wff::Eventually(a) => write!(f, "F {}", Paren(a)),
            Wff::Until(a, b) => write!(f, "{} U {}", Paren(a), Paren(b)),
            Wff::Releases(a, b) => write!(f, "{} R {}", Paren(a), Paren(b)),
            Wff::Prev(a) => write!(f, "Y {}", Paren(a)),
            Wff::NotPrevNot(a) => write!(f, "Z {}", Paren(a)),
            Wff::Once(a) => write!(f, "O {}", Paren(a)),
            Wff::Historically(a) => write!(f, "H {}", Paren(a)),
            Wff::Since(a, b) => write!(f, "{} S {}", Paren(a), Paren(b)),
            Wff::Triggered(a, b) => write!(f, "{} T {}", Paren(a), Paren(b)),
        }
    }
}

/// Parenthesises compound subformulas for display.
struct Paren<'a>(&'a Wff);

impl fmt::Display for Paren<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Wff::True | Wff::False | Wff::Var(_) => write!(f, "{}", self.0),
            _ => write!(f, "({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Wff {
        Wff::var(name)
    }

    #[test]
    fn and_or_fold_constants() {
        assert_eq!(Wff::and(Wff::True, v("a")), v("a"));
        assert_eq!(Wff::and(v("a"), Wff::False), Wff::False);
        assert_eq!(Wff::or(Wff::False, v("a")), v("a"));
        assert_eq!(Wff::or(v("a"), Wff::True), Wff::True);
    }

    #[test]
    fn nnf_pushes_negation_onto_variables() {
        let formula = Wff::not(Wff::and(v("a"), Wff::not(v("b"))));
        // ¬(a ∧ ¬b) = ¬a ∨ b
        assert_eq!(formula.nnf(), Wff::or(Wff::not(v("a")), v("b")));
    }

    #[test]
    fn nnf_eliminates_implication() {
        let formula = Wff::implies(v("a"), v("b"));
        assert_eq!(formula.nnf(), Wff::or(Wff::not(v("a")), v("b")));

        let negated = Wff::not(Wff::implies(v("a"), v("b")));
        assert_eq!(negated.nnf(), Wff::and(v("a"), Wff::not(v("b"))));
    }

    #[test]
    fn nnf_negates_iff_on_one_side_only() {
        let negated = Wff::not(Wff::iff(v("a"), v("b")));
        assert_eq!(negated.nnf(), Wff::iff(v("a"), Wff::not(v("b"))));
    }

    #[test]
    fn nnf_applies_future_duals() {
        let formula = Wff::not(Wff::globally(v("a")));
        assert_eq!(formula.nnf(), Wff::eventually(Wff::not(v("a"))));

        let formula = Wff::not(Wff::until(v("a"), v("b")));
        assert_eq!(
            formula.nnf(),
            Wff::releases(Wff::not(v("a")), Wff::not(v("b")))
        );
    }

    #[test]
    fn nnf_applies_past_duals() {
        let formula = Wff::not(Wff::prev(v("a")));
        assert_eq!(formula.nnf(), Wff::not_prev_not(Wff::not(v("a"))));

        let formula = Wff::not(Wff::since(v("a"), v("b")));
        assert_eq!(
            formula.nnf(),
            Wff::triggered(Wff::not(v("a")), Wff::not(v("b")))
        );
    }

    #[test]
    fn nnf_commutes_with_next() {
        let formula = Wff::not(Wff::next(v("a")));
        assert_eq!(formula.nnf(), Wff::next(Wff::not(v("a"))));
    }

    #[test]
    fn next_n_stacks_next_operators() {
        assert_eq!(Wff::next_n(v("a"), 0), v("a"));
        assert_eq!(Wff::next_n(v("a"), 2), Wff::next(Wff::next(v("a"))));
    }

    #[test]
    fn past_operator_detection() {
        assert!(Wff::once(v("a")).has_past_operators());
        assert!(Wff::globally(Wff::since(v("a"), v("b"))).has_past_operators());
        assert!(!Wff::globally(Wff::eventually(v("a"))).has_past_operators());
    }

    #[test]
    fn display_is_readable() {
        let formula = Wff::globally(Wff::implies(v("req"), Wff::eventually(v("ack"))));
        assert_eq!(formula.to_string(), "G (req -> (F ack))");
    }
}
