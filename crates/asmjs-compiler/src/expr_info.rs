//! Result of lowering an expression.

use crate::registers::Location;
use crate::types::AsmType;

/// Type and register of a lowered expression.
///
/// `loc` is `None` only for `void` results; callers check the type before
/// reading the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprInfo {
    pub ty: AsmType,
    pub loc: Option<Location>,
}

impl ExprInfo {
    pub fn new(ty: AsmType, loc: Location) -> Self {
        Self { ty, loc: Some(loc) }
    }

    pub fn void() -> Self {
        Self {
            ty: AsmType::Void,
            loc: None,
        }
    }

    /// Register index as an instruction operand.
    pub fn reg(&self) -> u32 {
        self.loc.map_or(0, |loc| loc.index)
    }

    /// Same register, retyped.
    pub fn with_type(self, ty: AsmType) -> Self {
        Self { ty, ..self }
    }
}
