//! Lowering context: the only mutable state of a compilation.
//!
//! The context is an explicit handle threaded through every lowering
//! function, never an ambient global. The loop-context stack and label
//! stack are pushed/popped in strict LIFO order with restoration on every
//! exit path, including errors.

use hql_common::LowerError;

use crate::symbols::SymbolTable;

/// One enclosing `loop` form: the synthesized function name and the
/// number of loop parameters (for `recur` arity validation).
#[derive(Debug, Clone)]
pub struct LoopFrame {
    pub name: String,
    pub arity: usize,
}

/// Compilation-scoped lowering state.
pub struct LowerCtx {
    pub symbols: SymbolTable,
    /// Directory of the file being compiled, for import handling.
    pub current_dir: String,
    /// How many IIFE bodies enclose the current node. `return` inside any
    /// IIFE becomes a sentinel throw.
    iife_depth: usize,
    /// Stack of enclosing `loop` forms; the top frame is what `recur`
    /// targets.
    loop_stack: Vec<LoopFrame>,
    /// Stack of enclosing label names.
    label_stack: Vec<String>,
    /// How many `while`/`for-of` bodies enclose the current node, for
    /// plain `break`/`continue` validation.
    jump_depth: usize,
    /// Recursion depth of the dispatch router, bounded by
    /// `MAX_LOWERING_DEPTH`.
    expr_depth: usize,
    next_loop_id: usize,
}

impl LowerCtx {
    #[must_use]
    pub fn new(current_dir: impl Into<String>) -> Self {
        Self {
            symbols: SymbolTable::new(),
            current_dir: current_dir.into(),
            iife_depth: 0,
            loop_stack: Vec::new(),
            label_stack: Vec::new(),
            jump_depth: 0,
            expr_depth: 0,
            next_loop_id: 0,
        }
    }

    /// Guard one level of dispatch recursion. The matching
    /// [`exit_expr`](Self::exit_expr) runs on every exit path.
    pub fn enter_expr(&mut self, pos: &hql_common::Position) -> Result<(), LowerError> {
        if self.expr_depth >= hql_common::limits::MAX_LOWERING_DEPTH {
            return Err(LowerError::transform(
                "lowering",
                format!(
                    "nesting within {} levels",
                    hql_common::limits::MAX_LOWERING_DEPTH
                ),
                "deeper nesting",
            )
            .with_pos(pos.clone()));
        }
        self.expr_depth += 1;
        Ok(())
    }

    pub fn exit_expr(&mut self) {
        self.expr_depth = self.expr_depth.saturating_sub(1);
    }

    /// Monotonic loop ids within one compilation.
    pub fn fresh_loop_name(&mut self) -> String {
        let name = format!("loop_{}", self.next_loop_id);
        self.next_loop_id += 1;
        name
    }

    #[must_use]
    pub fn iife_depth(&self) -> usize {
        self.iife_depth
    }

    /// Run `f` one IIFE level deeper. The depth is restored on all exit
    /// paths.
    pub fn with_iife<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.iife_depth += 1;
        let result = f(self);
        self.iife_depth -= 1;
        result
    }

    #[must_use]
    pub fn current_loop(&self) -> Option<&LoopFrame> {
        self.loop_stack.last()
    }

    /// Run `f` with `frame` as the innermost loop. Strict LIFO with
    /// guaranteed restoration on failure.
    pub fn with_loop<T>(
        &mut self,
        frame: LoopFrame,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.loop_stack.push(frame);
        self.jump_depth += 1;
        let result = f(self);
        self.jump_depth -= 1;
        self.loop_stack.pop();
        result
    }

    /// Run `f` inside a `while`/`for-of` body, where plain `break` and
    /// `continue` are valid.
    pub fn with_jump_target<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.jump_depth += 1;
        let result = f(self);
        self.jump_depth -= 1;
        result
    }

    #[must_use]
    pub fn in_jump_context(&self) -> bool {
        self.jump_depth > 0
    }

    /// Run `f` with `label` in scope.
    pub fn with_label<T>(
        &mut self,
        label: String,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.label_stack.push(label);
        let result = f(self);
        self.label_stack.pop();
        result
    }

    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.label_stack.iter().any(|l| l == label)
    }

    /// Whether `label` is already in scope *below* the current innermost
    /// entry, i.e. an ancestor label shadows it.
    #[must_use]
    pub fn label_shadowed(&self, label: &str) -> bool {
        self.label_stack
            .iter()
            .rev()
            .skip(1)
            .any(|l| l == label)
    }

    /// Inside a function body, the loop/label context of the enclosing
    /// code must not leak in. Runs `f` with fresh jump state, restoring
    /// the outer state afterwards.
    pub fn with_function_boundary<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        let saved_loops = std::mem::take(&mut self.loop_stack);
        let saved_labels = std::mem::take(&mut self.label_stack);
        let saved_jump = std::mem::replace(&mut self.jump_depth, 0);
        let saved_iife = std::mem::replace(&mut self.iife_depth, 0);
        let result = f(self);
        self.loop_stack = saved_loops;
        self.label_stack = saved_labels;
        self.jump_depth = saved_jump;
        self.iife_depth = saved_iife;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_stack_restores_on_error() {
        let mut ctx = LowerCtx::new(".");
        let frame = LoopFrame {
            name: ctx.fresh_loop_name(),
            arity: 2,
        };
        let result: Result<(), LowerError> = ctx.with_loop(frame, |ctx| {
            assert!(ctx.current_loop().is_some());
            Err(LowerError::validation("test", "anything", "failure"))
        });
        assert!(result.is_err());
        assert!(ctx.current_loop().is_none(), "frame must pop on failure");
        assert!(!ctx.in_jump_context());
    }

    #[test]
    fn loop_ids_are_monotonic() {
        let mut ctx = LowerCtx::new(".");
        assert_eq!(ctx.fresh_loop_name(), "loop_0");
        assert_eq!(ctx.fresh_loop_name(), "loop_1");
    }

    #[test]
    fn function_boundary_isolates_jump_state() {
        let mut ctx = LowerCtx::new(".");
        let frame = LoopFrame {
            name: "loop_9".to_string(),
            arity: 0,
        };
        ctx.with_loop(frame, |ctx| {
            ctx.with_function_boundary(|ctx| {
                assert!(ctx.current_loop().is_none());
                assert_eq!(ctx.iife_depth(), 0);
                Ok(())
            })?;
            assert!(ctx.current_loop().is_some());
            Ok(())
        })
        .expect("lowering succeeds");
    }
}
