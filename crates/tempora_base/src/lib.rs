//! Shared structural atoms for the tempora bounded model checker.
//!
//! This crate sits at the bottom of the workspace and holds the pieces every
//! other crate agrees on: interned variable names. Model variables are
//! compared constantly while building name/index tables, decoding traces and
//! printing counterexamples, so they are handled as [`Symbol`] handles rather
//! than strings.

mod intern;

pub use intern::{Interner, Symbol};
