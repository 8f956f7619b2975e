//! Post-fixed-point check that every required node has a serializer.

use wirefind_core::TypeTable;

use crate::expr::{ExprId, ExprKind, ExprTree};
use crate::known::{KnownSerializers, render};
use crate::{Error, Result};

/// Walk the tree in pre-order and report the first node without a
/// serializer. Lambda headers and quotes need none; sentinel subtrees are
/// skipped. An unknowable result of the whole tree is reported at the
/// innermost unknowable node it was derived from.
pub(crate) fn audit(
    tree: &ExprTree,
    types: &TypeTable,
    known: &KnownSerializers,
    root: ExprId,
) -> Result<()> {
    let output = strip_lambdas(tree, root);
    if known.get(output).is_some_and(|s| s.is_unknowable()) {
        let culprit = innermost_unknowable(tree, known, output);
        return Err(Error::UnableToDetermineSerializer {
            expression: render(tree, types, culprit),
        });
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match tree.kind(node) {
            ExprKind::Lambda { body, .. } => {
                stack.push(*body);
                continue;
            }
            ExprKind::Quote(inner) => {
                stack.push(*inner);
                continue;
            }
            _ => {}
        }

        match known.get(node) {
            None => {
                return Err(Error::UnableToDetermineSerializer {
                    expression: render(tree, types, node),
                });
            }
            Some(serializer) if serializer.is_sentinel() => continue,
            Some(_) => stack.extend(tree.children(node).into_iter().rev()),
        }
    }
    Ok(())
}

fn strip_lambdas(tree: &ExprTree, mut node: ExprId) -> ExprId {
    loop {
        match tree.kind(node) {
            ExprKind::Lambda { body, .. } => node = *body,
            ExprKind::Quote(inner) => node = *inner,
            _ => return node,
        }
    }
}

fn innermost_unknowable(tree: &ExprTree, known: &KnownSerializers, mut node: ExprId) -> ExprId {
    loop {
        let next = tree
            .children(node)
            .into_iter()
            .map(|child| strip_lambdas(tree, child))
            .find(|&child| known.get(child).is_some_and(|s| s.is_unknowable()));
        match next {
            Some(child) => node = child,
            None => return node,
        }
    }
}
