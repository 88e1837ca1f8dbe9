//! Label and breakable-context management for control flow.
//!
//! Labels are symbolic branch targets. Branches record a fixup at emission
//! time and are resolved to absolute word offsets once the function body is
//! complete, so forward and backward branches are handled the same way.

use super::{BreakError, Label};

/// What kind of statement a breakable context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakableKind {
    /// `while`, `do-while` and `for`. Supports break and continue.
    Loop,
    /// `switch`. Supports unlabelled break.
    Switch,
    /// A labelled non-loop statement. Only reachable through `break label`.
    Block,
}

/// Context for a single breakable statement.
#[derive(Debug)]
struct Breakable {
    kind: BreakableKind,
    /// Statement labels attached to this context.
    names: Vec<String>,
    break_label: Label,
    continue_label: Option<Label>,
}

/// Tracks label bindings, pending branch fixups, and the stack of enclosing
/// breakable statements.
#[derive(Debug, Default)]
pub struct LabelManager {
    /// Bound offset of each label, indexed by label id.
    bound: Vec<Option<u32>>,
    /// Operand word offsets that must receive a label's final offset.
    fixups: Vec<(usize, Label)>,
    /// Stack of breakable contexts (innermost last).
    breakables: Vec<Breakable>,
}

impl LabelManager {
    /// Create a new label manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new unbound label.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.bound.len() as u32);
        self.bound.push(None);
        label
    }

    /// Bind `label` to `offset`.
    pub fn bind(&mut self, label: Label, offset: u32) {
        if let Some(slot) = self.bound.get_mut(label.0 as usize) {
            *slot = Some(offset);
        }
    }

    /// Offset a label is bound to, if any.
    pub fn offset_of(&self, label: Label) -> Option<u32> {
        self.bound.get(label.0 as usize).copied().flatten()
    }

    /// Record that the word at `word` must hold `label`'s offset.
    pub fn add_fixup(&mut self, word: usize, label: Label) {
        self.fixups.push((word, label));
    }

    /// Drain the pending fixups.
    pub fn take_fixups(&mut self) -> Vec<(usize, Label)> {
        std::mem::take(&mut self.fixups)
    }

    // ==========================================================================
    // Breakable contexts
    // ==========================================================================

    /// Enter a breakable statement.
    pub fn enter(
        &mut self,
        kind: BreakableKind,
        names: Vec<String>,
        break_label: Label,
        continue_label: Option<Label>,
    ) {
        self.breakables.push(Breakable {
            kind,
            names,
            break_label,
            continue_label,
        });
    }

    /// Exit the innermost breakable statement.
    pub fn exit(&mut self) -> Option<BreakableKind> {
        self.breakables.pop().map(|ctx| ctx.kind)
    }

    /// Resolve the target of `break` or `break name`.
    pub fn break_target(&self, name: Option<&str>) -> Result<Label, BreakError> {
        match name {
            None => self
                .breakables
                .iter()
                .rev()
                .find(|ctx| ctx.kind != BreakableKind::Block)
                .map(|ctx| ctx.break_label)
                .ok_or(BreakError::NotInBreakable),
            Some(name) => self
                .find_named(name)
                .map(|ctx| ctx.break_label)
                .ok_or_else(|| BreakError::UnknownLabel(name.to_string())),
        }
    }

    /// Resolve the target of `continue` or `continue name`.
    pub fn continue_target(&self, name: Option<&str>) -> Result<Label, BreakError> {
        match name {
            None => self
                .breakables
                .iter()
                .rev()
                .find_map(|ctx| ctx.continue_label)
                .ok_or(BreakError::NotInLoop),
            Some(name) => {
                let ctx = self
                    .find_named(name)
                    .ok_or_else(|| BreakError::UnknownLabel(name.to_string()))?;
                ctx.continue_label
                    .ok_or_else(|| BreakError::LabelNotLoop(name.to_string()))
            }
        }
    }

    /// Check if currently inside a loop.
    pub fn in_loop(&self) -> bool {
        self.breakables
            .iter()
            .any(|ctx| ctx.kind == BreakableKind::Loop)
    }

    /// Check if currently inside a loop or switch.
    pub fn in_breakable(&self) -> bool {
        self.breakables
            .iter()
            .any(|ctx| ctx.kind != BreakableKind::Block)
    }

    /// Whether `name` labels an enclosing statement.
    pub fn has_name(&self, name: &str) -> bool {
        self.find_named(name).is_some()
    }

    /// Get current breakable nesting depth.
    pub fn depth(&self) -> usize {
        self.breakables.len()
    }

    fn find_named(&self, name: &str) -> Option<&Breakable> {
        self.breakables
            .iter()
            .rev()
            .find(|ctx| ctx.names.iter().any(|n| n == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_not_in_loop() {
        let manager = LabelManager::new();
        assert!(!manager.in_loop());
        assert!(!manager.in_breakable());
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn labels_bind_once_allocated() {
        let mut manager = LabelManager::new();
        let a = manager.new_label();
        let b = manager.new_label();
        assert_ne!(a, b);
        assert_eq!(manager.offset_of(a), None);
        manager.bind(a, 12);
        assert_eq!(manager.offset_of(a), Some(12));
    }

    #[test]
    fn nested_loops() {
        let mut manager = LabelManager::new();
        let (outer_break, outer_cont) = (manager.new_label(), manager.new_label());
        let (inner_break, inner_cont) = (manager.new_label(), manager.new_label());
        manager.enter(BreakableKind::Loop, vec![], outer_break, Some(outer_cont));
        manager.enter(BreakableKind::Loop, vec![], inner_break, Some(inner_cont));

        assert_eq!(manager.depth(), 2);
        assert_eq!(manager.continue_target(None), Ok(inner_cont));
        assert_eq!(manager.break_target(None), Ok(inner_break));

        manager.exit();
        assert_eq!(manager.continue_target(None), Ok(outer_cont));
    }

    #[test]
    fn switch_supports_break_but_not_continue() {
        let mut manager = LabelManager::new();
        let end = manager.new_label();
        manager.enter(BreakableKind::Switch, vec![], end, None);

        assert_eq!(manager.break_target(None), Ok(end));
        assert_eq!(manager.continue_target(None), Err(BreakError::NotInLoop));
    }

    #[test]
    fn continue_inside_switch_targets_enclosing_loop() {
        let mut manager = LabelManager::new();
        let (brk, cont, end) = (manager.new_label(), manager.new_label(), manager.new_label());
        manager.enter(BreakableKind::Loop, vec![], brk, Some(cont));
        manager.enter(BreakableKind::Switch, vec![], end, None);

        assert_eq!(manager.continue_target(None), Ok(cont));
        assert_eq!(manager.break_target(None), Ok(end));
    }

    #[test]
    fn labelled_targets() {
        let mut manager = LabelManager::new();
        let (brk, cont) = (manager.new_label(), manager.new_label());
        let block_end = manager.new_label();
        manager.enter(BreakableKind::Loop, vec!["outer".into()], brk, Some(cont));
        manager.enter(BreakableKind::Block, vec!["inner".into()], block_end, None);

        assert_eq!(manager.break_target(Some("outer")), Ok(brk));
        assert_eq!(manager.continue_target(Some("outer")), Ok(cont));
        assert_eq!(manager.break_target(Some("inner")), Ok(block_end));
        assert_eq!(
            manager.continue_target(Some("inner")),
            Err(BreakError::LabelNotLoop("inner".into()))
        );
        assert_eq!(
            manager.break_target(Some("missing")),
            Err(BreakError::UnknownLabel("missing".into()))
        );
        // Unlabelled break skips labelled blocks.
        assert_eq!(manager.break_target(None), Ok(brk));
    }

    #[test]
    fn break_outside_breakable() {
        let manager = LabelManager::new();
        assert_eq!(manager.break_target(None), Err(BreakError::NotInBreakable));
    }

    #[test]
    fn exit_empty_returns_none() {
        let mut manager = LabelManager::new();
        assert_eq!(manager.exit(), None);
    }
}
