//! Label / break / continue analysis.
//!
//! Labeled jumps cannot cross function boundaries in the target language,
//! while `for-of` is normally lowered into an expression-valued IIFE. The
//! label rewriter resolves the conflict: a `for-of` carrying a labeled
//! jump is lowered bare (a plain statement), and the outermost labeled
//! block targeted by such a jump is wrapped in a null-returning IIFE so
//! the label and the loop share one function scope.
//!
//! All analysis here runs on the AST, before lowering, and stops at
//! function boundaries (a jump inside a nested `fn` belongs to that
//! function).

use hql_reader::Expr;

fn is_function_form(expr: &Expr) -> bool {
    expr.is_form("fn") || expr.is_form("fn*") || expr.is_form("=>")
}

fn walk_until(expr: &Expr, found: &mut bool, pred: &impl Fn(&Expr) -> bool) {
    if *found {
        return;
    }
    if pred(expr) {
        *found = true;
        return;
    }
    if is_function_form(expr) {
        return;
    }
    if let Some(children) = expr.list_children() {
        for child in children {
            walk_until(child, found, pred);
        }
    }
}

fn jump_targets(expr: &Expr, label: &str) -> bool {
    let Some(children) = expr.list_children() else {
        return false;
    };
    let is_jump = children
        .first()
        .is_some_and(|h| h.is_symbol("break") || h.is_symbol("continue"));
    is_jump && children.get(1).is_some_and(|l| l.is_symbol(label))
}

/// Whether the subtree contains `(break label)` / `(continue label)`.
#[must_use]
pub fn ast_targets_label(expr: &Expr, label: &str) -> bool {
    let mut found = false;
    walk_until(expr, &mut found, &|e| jump_targets(e, label));
    found
}

/// Whether the subtree contains any labeled `break`/`continue` at all.
#[must_use]
pub fn ast_has_labeled_jump(expr: &Expr) -> bool {
    let mut found = false;
    walk_until(expr, &mut found, &|e| {
        let Some(children) = e.list_children() else {
            return false;
        };
        let is_jump = children
            .first()
            .is_some_and(|h| h.is_symbol("break") || h.is_symbol("continue"));
        is_jump && children.get(1).is_some_and(|l| l.symbol_name().is_some())
    });
    found
}

/// Whether the subtree contains a `for-of`/`for-await-of` whose body
/// carries a jump targeting `label`.
#[must_use]
pub fn ast_for_of_targets_label(expr: &Expr, label: &str) -> bool {
    let mut found = false;
    walk_until(expr, &mut found, &|e| {
        (e.is_form("for-of") || e.is_form("for-await-of")) && ast_targets_label(e, label)
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use hql_reader::read;

    fn first(source: &str) -> Expr {
        read(source, "test.hql").expect("read")[0].clone()
    }

    #[test]
    fn finds_targeted_jumps() {
        let form = first("(do (for-of [x xs] (if (big? x) (break outer) x)))");
        assert!(ast_targets_label(&form, "outer"));
        assert!(!ast_targets_label(&form, "other"));
        assert!(ast_for_of_targets_label(&form, "outer"));
        assert!(ast_has_labeled_jump(&form));
    }

    #[test]
    fn stops_at_function_boundaries() {
        let form = first("(do (fn worker [x] (break outer)))");
        assert!(!ast_targets_label(&form, "outer"));
    }

    #[test]
    fn unlabeled_jumps_do_not_count_as_labeled() {
        let form = first("(for-of [x xs] (break))");
        assert!(!ast_has_labeled_jump(&form));
    }
}
