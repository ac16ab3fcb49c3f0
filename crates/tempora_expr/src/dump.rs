//! Textual dumps of the expression DAG.
//!
//! Three debug serialisations, kept intentionally small: an s-expression
//! form, a GDL graph and a daVinci term. They exist to let a human look at a
//! generated problem; nothing in the checker reads them back.

use std::io::{self, Write};

use crate::be::{Be, BeManager, Node};

impl BeManager {
    /// Writes `root` as a nested s-expression.
    pub fn dump_sexp(&self, root: Be, out: &mut dyn Write) -> io::Result<()> {
        self.write_sexp(root, out)?;
        writeln!(out)
    }

    fn write_sexp(&self, be: Be, out: &mut dyn Write) -> io::Result<()> {
        match self.node(be) {
            Node::True => write!(out, "true"),
            Node::False => write!(out, "false"),
            Node::Var(i) => write!(out, "v{}", i),
            Node::Not(a) => {
                write!(out, "(not ")?;
                self.write_sexp(a, out)?;
                write!(out, ")")
            }
            Node::And(a, b) => self.write_sexp_binary("and", a, b, out),
            Node::Or(a, b) => self.write_sexp_binary("or", a, b, out),
            Node::Xor(a, b) => self.write_sexp_binary("xor", a, b, out),
            Node::Iff(a, b) => self.write_sexp_binary("iff", a, b, out),
        }
    }

    fn write_sexp_binary(
        &self,
        op: &str,
        a: Be,
        b: Be,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        write!(out, "({} ", op)?;
        self.write_sexp(a, out)?;
        write!(out, " ")?;
        self.write_sexp(b, out)?;
        write!(out, ")")
    }

    /// Writes `root` as a GDL graph, one `node:` record per DAG node and one
    /// `edge:` record per operand reference.
    pub fn dump_gdl(&self, root: Be, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "graph: {{")?;
        writeln!(out, "title: \"be\"")?;

        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack = vec![root];
        while let Some(be) = stack.pop() {
            if !seen.insert(be) {
                continue;
            }
            let (label, children) = self.gdl_parts(be);
            writeln!(out, "node: {{ title: \"n{}\" label: \"{}\" }}", be.0, label)?;
            for child in children {
                writeln!(
                    out,
                    "edge: {{ sourcename: \"n{}\" targetname: \"n{}\" }}",
                    be.0, child.0
                )?;
                stack.push(child);
            }
        }
        writeln!(out, "}}")
    }

    fn gdl_parts(&self, be: Be) -> (String, Vec<Be>) {
        match self.node(be) {
            Node::True => ("TRUE".into(), vec![]),
            Node::False => ("FALSE".into(), vec![]),
            Node::Var(i) => (format!("v{}", i), vec![]),
            Node::Not(a) => ("NOT".into(), vec![a]),
            Node::And(a, b) => ("AND".into(), vec![a, b]),
            Node::Or(a, b) => ("OR".into(), vec![a, b]),
            Node::Xor(a, b) => ("XOR".into(), vec![a, b]),
            Node::Iff(a, b) => ("IFF".into(), vec![a, b]),
        }
    }

    /// Writes `root` as a daVinci term.
    pub fn dump_davinci(&self, root: Be, out: &mut dyn Write) -> io::Result<()> {
        self.write_davinci(root, out)?;
        writeln!(out)
    }

    fn write_davinci(&self, be: Be, out: &mut dyn Write) -> io::Result<()> {
        let (label, children) = self.gdl_parts(be);
        write!(out, "l(\"n{}\",n(\"{}\",[", be.0, label)?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(out, ",")?;
            }
            write!(out, "e(\"arg\",[],")?;
            self.write_davinci(*child, out)?;
            write!(out, ")")?;
        }
        write!(out, "]))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sexp_of_small_formula() {
        let mut mgr = BeManager::new();
        mgr.reserve(2);
        let a = mgr.var(0);
        let b = mgr.var(1);
        let nb = mgr.not(b);
        let expr = mgr.and(a, nb);

        let mut buf = Vec::new();
        mgr.dump_sexp(expr, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "(and v0 (not v1))\n");
    }

    #[test]
    fn gdl_mentions_every_reachable_node_once() {
        let mut mgr = BeManager::new();
        mgr.reserve(2);
        let a = mgr.var(0);
        let b = mgr.var(1);
        let ab = mgr.and(a, b);
        let expr = mgr.or(ab, a);

        let mut buf = Vec::new();
        mgr.dump_gdl(expr, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("label: \"AND\"").count(), 1);
        assert_eq!(text.matches("label: \"OR\"").count(), 1);
        assert_eq!(text.matches("label: \"v0\"").count(), 1);
    }

    #[test]
    fn davinci_is_nonempty_for_constants() {
        let mgr = BeManager::new();
        let mut buf = Vec::new();
        mgr.dump_davinci(mgr.truth(), &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("TRUE"));
    }
}
