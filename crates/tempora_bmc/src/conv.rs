//! Name-based propositional expressions and their lowering to BEs.
//!
//! The flattener hands the checker its FSM sections, and invariant
//! properties, as propositional terms over variable *names*, with
//! `next(x)` marking next-state occurrences inside the transition relation.
//! [`prop_to_be`] lowers such a term through the variable manager into the
//! untimed blocks of the shared DAG.

use serde::{Deserialize, Serialize};

use tempora_expr::Be;

use crate::error::BmcError;
use crate::vars::VarManager;

/// A propositional term over declared variable names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropExpr {
    True,
    False,
    /// A current-state or input variable.
    Var(String),
    /// The next-state occurrence of a state variable.
    Next(String),
    Not(Box<PropExpr>),
    And(Box<PropExpr>, Box<PropExpr>),
    Or(Box<PropExpr>, Box<PropExpr>),
    Implies(Box<PropExpr>, Box<PropExpr>),
    Iff(Box<PropExpr>, Box<PropExpr>),
    Ite(Box<PropExpr>, Box<PropExpr>, Box<PropExpr>),
}

impl PropExpr {
    pub fn var(name: impl Into<String>) -> Self {
        PropExpr::Var(name.into())
    }

    pub fn next(name: impl Into<String>) -> Self {
        PropExpr::Next(name.into())
    }

    pub fn not(inner: PropExpr) -> Self {
        PropExpr::Not(Box::new(inner))
    }

    pub fn and(l: PropExpr, r: PropExpr) -> Self {
        PropExpr::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: PropExpr, r: PropExpr) -> Self {
        PropExpr::Or(Box::new(l), Box::new(r))
    }

    pub fn implies(l: PropExpr, r: PropExpr) -> Self {
        PropExpr::Implies(Box::new(l), Box::new(r))
    }

    pub fn iff(l: PropExpr, r: PropExpr) -> Self {
        PropExpr::Iff(Box::new(l), Box::new(r))
    }

    pub fn ite(c: PropExpr, t: PropExpr, e: PropExpr) -> Self {
        PropExpr::Ite(Box::new(c), Box::new(t), Box::new(e))
    }

    /// Conjunction of a sequence of terms; ⊤ when empty.
    pub fn conjoin(terms: impl IntoIterator<Item = PropExpr>) -> Self {
        let mut iter = terms.into_iter();
        let first = match iter.next() {
            Some(t) => t,
            None => return PropExpr::True,
        };
        iter.fold(first, PropExpr::and)
    }

    /// `true` if the term mentions a next-state occurrence anywhere.
    pub fn has_next(&self) -> bool {
        match self {
            PropExpr::True | PropExpr::False | PropExpr::Var(_) => false,
            PropExpr::Next(_) => true,
            PropExpr::Not(a) => a.has_next(),
            PropExpr::And(a, b)
            | PropExpr::Or(a, b)
            | PropExpr::Implies(a, b)
            | PropExpr::Iff(a, b) => a.has_next() || b.has_next(),
            PropExpr::Ite(c, t, e) => c.has_next() || t.has_next() || e.has_next(),
        }
    }
}

/// Lowers a propositional term into the untimed blocks.
///
/// Fails with [`BmcErrorKind::InvalidProperty`](crate::BmcErrorKind) when a
/// name was not declared to the variable manager, or when `next()` is
/// applied to an input variable.
pub fn prop_to_be(vm: &mut VarManager, expr: &PropExpr) -> Result<Be, BmcError> {
    match expr {
        PropExpr::True => Ok(vm.be().truth()),
        PropExpr::False => Ok(vm.be().falsity()),
        PropExpr::Var(name) => vm
            .name_to_curr(name)
            .ok_or_else(|| BmcError::invalid_property(format!("unknown variable '{}'", name))),
        PropExpr::Next(name) => {
            if vm.name_to_index(name).is_none() {
                return Err(BmcError::invalid_property(format!(
                    "unknown variable '{}'",
                    name
                )));
            }
            vm.name_to_next(name).ok_or_else(|| {
                BmcError::invalid_property(format!(
                    "next() applied to input variable '{}'",
                    name
                ))
            })
        }
        PropExpr::Not(a) => {
            let a = prop_to_be(vm, a)?;
            Ok(vm.be_mut().not(a))
        }
        PropExpr::And(a, b) => {
            let a = prop_to_be(vm, a)?;
            let b = prop_to_be(vm, b)?;
            Ok(vm.be_mut().and(a, b))
        }
        PropExpr::Or(a, b) => {
            let a = prop_to_be(vm, a)?;
            let b = prop_to_be(vm, b)?;
            Ok(vm.be_mut().or(a, b))
        }
        PropExpr::Implies(a, b) => {
            let a = prop_to_be(vm, a)?;
            let b = prop_to_be(vm, b)?;
            Ok(vm.be_mut().implies(a, b))
        }
        PropExpr::Iff(a, b) => {
            let a = prop_to_be(vm, a)?;
            let b = prop_to_be(vm, b)?;
            Ok(vm.be_mut().iff(a, b))
        }
        PropExpr::Ite(c, t, e) => {
            let c = prop_to_be(vm, c)?;
            let t = prop_to_be(vm, t)?;
            let e = prop_to_be(vm, e)?;
            Ok(vm.be_mut().ite(c, t, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BmcErrorKind;

    #[test]
    fn variables_lower_to_their_blocks() {
        let mut vm = VarManager::new(["p"], ["i"]);
        let curr = prop_to_be(&mut vm, &PropExpr::var("p")).unwrap();
        assert_eq!(vm.be().index_of_var(curr), Some(0));

        let next = prop_to_be(&mut vm, &PropExpr::next("p")).unwrap();
        assert_eq!(vm.be().index_of_var(next), Some(2));
    }

    #[test]
    fn unknown_names_are_invalid_properties() {
        let mut vm = VarManager::new(["p"], Vec::<&str>::new());
        let err = prop_to_be(&mut vm, &PropExpr::var("ghost")).unwrap_err();
        assert_eq!(err.kind(), BmcErrorKind::InvalidProperty);
    }

    #[test]
    fn next_of_input_is_rejected() {
        let mut vm = VarManager::new(["p"], ["i"]);
        let err = prop_to_be(&mut vm, &PropExpr::next("i")).unwrap_err();
        assert_eq!(err.kind(), BmcErrorKind::InvalidProperty);
    }

    #[test]
    fn operators_lower_homomorphically() {
        let mut vm = VarManager::new(["p", "q"], Vec::<&str>::new());
        let expr = PropExpr::implies(PropExpr::var("p"), PropExpr::var("q"));
        let be = prop_to_be(&mut vm, &expr).unwrap();

        let p = vm.name_to_curr("p").unwrap();
        let q = vm.name_to_curr("q").unwrap();
        let expected = vm.be_mut().implies(p, q);
        assert_eq!(be, expected);
    }

    #[test]
    fn has_next_sees_through_structure() {
        let with = PropExpr::and(PropExpr::var("p"), PropExpr::next("q"));
        let without = PropExpr::or(PropExpr::var("p"), PropExpr::not(PropExpr::var("q")));
        assert!(with.has_next());
        assert!(!without.has_next());
    }

    #[test]
    fn conjoin_of_nothing_is_true() {
        assert_eq!(PropExpr::conjoin([]), PropExpr::True);
    }
}
