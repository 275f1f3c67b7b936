//! Tree diagnostics: indented text dump and GraphViz DOT emission
//!
//! Both consumers are strictly read-only: they use pre-order iteration and
//! the downlink test (`child.bpos > node.bpos`) and never touch key
//! comparisons or tree state.

use crate::iter::IterMode;
use crate::tree::{PatriciaNode, PatriciaTree};
use std::io::{self, Write};

fn indent<W: Write>(out: &mut W, level: usize) -> io::Result<()> {
    for _ in 0..level {
        out.write_all(b"    ")?;
    }
    Ok(())
}

/// Recursive layout: right subtree above, the node, left subtree below.
/// Uplink targets are rendered in terminal style so the threading becomes
/// visible in the dump.
fn write_node<W: Write>(
    out: &mut W,
    node: *const PatriciaNode,
    level: usize,
    expand: bool,
) -> io::Result<()> {
    unsafe {
        if !expand {
            indent(out, level)?;
            return writeln!(
                out,
                "+--({:p}|{})--> '{}({})'",
                node,
                (*node).payload(),
                String::from_utf8_lossy((*node).key()),
                (*node).bpos()
            );
        }

        let right = (*node).child_ptr(1);
        write_node(out, right, level + 1, (*right).bpos() > (*node).bpos())?;

        indent(out, level)?;
        writeln!(out, "[{:2}, {:p}]", (*node).bpos(), node)?;

        let left = (*node).child_ptr(0);
        write_node(out, left, level + 1, (*left).bpos() > (*node).bpos())
    }
}

/// Dump a tree as crude indented text.
///
/// Key bytes are rendered lossily as UTF-8; non-text keys print as
/// replacement characters but never break the dump.
pub fn write_text<W: Write>(tree: &PatriciaTree, out: &mut W) -> io::Result<()> {
    let sentinel = tree.sentinel_ptr();
    unsafe {
        let first = (*sentinel).child_ptr(0);
        write_node(out, first, 0, (*first).bpos() > (*sentinel).bpos())
    }
}

/// Per-node label callback for [`write_dot`].
pub type DotLabel<'a> = &'a dyn Fn(&mut dyn Write, &PatriciaNode) -> io::Result<()>;

/// Default DOT label: `[bpos]` followed by the key bytes, printed as a
/// NUL-terminated string with `"` and control characters escaped.
fn default_label(out: &mut dyn Write, node: &PatriciaNode) -> io::Result<()> {
    write!(out, "[{}]", node.bpos())?;
    for &byte in node.key() {
        match byte {
            0 => break,
            b'"' => out.write_all(b"\\\"")?,
            0x01..=0x1F => write!(out, "\\{:03o}", byte)?,
            _ => out.write_all(&[byte])?,
        }
    }
    Ok(())
}

/// Emit the two child edges of a node. Downlinks are plain south-anchored
/// edges; uplinks are red non-constraining back-edges, with self-links
/// drawn port-to-port on the node itself.
fn dot_edges<W: Write>(out: &mut W, node: *const PatriciaNode) -> io::Result<()> {
    unsafe {
        for idx in 0..2 {
            let next = (*node).child_ptr(idx);
            let port = [b'w', b'e'][idx] as char;
            if (*next).bpos() > (*node).bpos() {
                writeln!(out, "  N{:p}:s{} -> N{:p};", node, port, next)?;
            } else if std::ptr::eq(next, node) {
                writeln!(
                    out,
                    "  N{:p}:n{} -> N{:p}:s{} [constraint=false,color=red];",
                    node, port, next, port
                )?;
            } else {
                writeln!(
                    out,
                    "  N{:p}:n{} -> N{:p} [constraint=false,color=red];",
                    node, port, next
                )?;
            }
        }
    }
    Ok(())
}

/// Emit a tree as a GraphViz digraph.
///
/// The sentinel is drawn as a filled double circle named `R`; every real
/// node is labelled through `label` (or the default `[bpos]key` labeller)
/// and contributes its two edges.
pub fn write_dot<W: Write>(
    tree: &PatriciaTree,
    out: &mut W,
    label: Option<DotLabel<'_>>,
) -> io::Result<()> {
    let label = label.unwrap_or(&default_label);

    writeln!(out, "digraph G {{")?;

    let sentinel = tree.sentinel_ptr();
    writeln!(
        out,
        "  N{:p} [label=\"R\",shape=doublecircle,style=filled];",
        sentinel
    )?;
    dot_edges(out, sentinel)?;

    for node in tree.iter(IterMode::Pre) {
        write!(out, "  N{:p} [label=\"", node as *const PatriciaNode)?;
        label(out, node)?;
        writeln!(out, "\"];")?;
        dot_edges(out, node as *const PatriciaNode)?;
    }

    writeln!(out, "}}")
}
