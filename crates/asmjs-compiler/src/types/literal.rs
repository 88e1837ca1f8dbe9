//! Numeric literal classification.

use asmjs_parser::ast::{Expr, LiteralKind};

use super::AsmType;

const TWO_POW_31: f64 = 2_147_483_648.0;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// How a literal participates in the type lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralClass {
    /// Integer in `[-2^31, 2^31)` written without a decimal point.
    Int(i32),
    /// `-2147483648`, which only fits once the sign is folded in.
    MinInt,
    /// Integer in `[2^31, 2^32)`.
    Unsigned(u32),
    /// Literal written with a fraction or exponent.
    Double(f64),
    /// Integer syntax outside `[-2^31, 2^32)`.
    OutOfRange,
    /// Strings and booleans.
    NotNumeric,
}

/// Classify a literal token.
pub fn classify_literal(kind: &LiteralKind<'_>) -> LiteralClass {
    match *kind {
        LiteralKind::Int(value) => LiteralClass::Int(value),
        LiteralKind::Float { value, maybe_int: false } => LiteralClass::Double(value),
        LiteralKind::Float { value, maybe_int: true } => {
            if value == -TWO_POW_31 {
                LiteralClass::MinInt
            } else if (TWO_POW_31..TWO_POW_32).contains(&value) {
                LiteralClass::Unsigned(value as u32)
            } else {
                LiteralClass::OutOfRange
            }
        }
        LiteralKind::Bool(_) | LiteralKind::Str(_) => LiteralClass::NotNumeric,
    }
}

impl LiteralClass {
    /// Classify an expression, `NotNumeric` for anything but a literal.
    pub fn of_expr(expr: &Expr<'_>) -> Self {
        expr.as_literal()
            .map(|lit| classify_literal(&lit.kind))
            .unwrap_or(LiteralClass::NotNumeric)
    }

    /// The expression type of the literal.
    pub fn asm_type(self) -> Option<AsmType> {
        match self {
            LiteralClass::Int(v) if v < 0 => Some(AsmType::Signed),
            LiteralClass::Int(_) => Some(AsmType::Fixnum),
            LiteralClass::MinInt => Some(AsmType::Signed),
            LiteralClass::Unsigned(_) => Some(AsmType::Unsigned),
            LiteralClass::Double(_) => Some(AsmType::DoubleLit),
            LiteralClass::OutOfRange | LiteralClass::NotNumeric => None,
        }
    }

    /// The 32-bit pattern of an integer literal.
    pub fn int_bits(self) -> Option<i32> {
        match self {
            LiteralClass::Int(v) => Some(v),
            LiteralClass::MinInt => Some(i32::MIN),
            LiteralClass::Unsigned(v) => Some(v as i32),
            _ => None,
        }
    }

    /// Value of a non-negative integer literal.
    pub fn as_uint(self) -> Option<u32> {
        match self {
            LiteralClass::Int(v) if v >= 0 => Some(v as u32),
            LiteralClass::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value as a double, for float and double pools.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            LiteralClass::Int(v) => Some(f64::from(v)),
            LiteralClass::MinInt => Some(-TWO_POW_31),
            LiteralClass::Unsigned(v) => Some(f64::from(v)),
            LiteralClass::Double(v) => Some(v),
            LiteralClass::OutOfRange | LiteralClass::NotNumeric => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, LiteralClass::OutOfRange | LiteralClass::NotNumeric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(value: f64, maybe_int: bool) -> LiteralKind<'static> {
        LiteralKind::Float { value, maybe_int }
    }

    #[test]
    fn small_ints_are_fixnum() {
        let class = classify_literal(&LiteralKind::Int(42));
        assert_eq!(class, LiteralClass::Int(42));
        assert_eq!(class.asm_type(), Some(AsmType::Fixnum));
    }

    #[test]
    fn negative_ints_are_signed() {
        let class = classify_literal(&LiteralKind::Int(-3));
        assert_eq!(class.asm_type(), Some(AsmType::Signed));
        assert_eq!(class.as_uint(), None);
    }

    #[test]
    fn min_int_pattern() {
        let class = classify_literal(&float(-2_147_483_648.0, true));
        assert_eq!(class, LiteralClass::MinInt);
        assert_eq!(class.asm_type(), Some(AsmType::Signed));
        assert_eq!(class.int_bits(), Some(i32::MIN));
    }

    #[test]
    fn unsigned_range() {
        let class = classify_literal(&float(4_294_967_295.0, true));
        assert_eq!(class, LiteralClass::Unsigned(u32::MAX));
        assert_eq!(class.asm_type(), Some(AsmType::Unsigned));
        assert_eq!(class.int_bits(), Some(-1));
        assert_eq!(class.as_uint(), Some(u32::MAX));
    }

    #[test]
    fn out_of_range_ints() {
        assert_eq!(
            classify_literal(&float(4_294_967_296.0, true)),
            LiteralClass::OutOfRange
        );
        assert_eq!(
            classify_literal(&float(-2_147_483_649.0, true)),
            LiteralClass::OutOfRange
        );
        assert_eq!(LiteralClass::OutOfRange.asm_type(), None);
    }

    #[test]
    fn floating_syntax_is_double_lit() {
        let class = classify_literal(&float(1.0, false));
        assert_eq!(class.asm_type(), Some(AsmType::DoubleLit));
        assert_eq!(class.int_bits(), None);
    }

    #[test]
    fn non_numeric() {
        assert_eq!(
            classify_literal(&LiteralKind::Str("use asm")),
            LiteralClass::NotNumeric
        );
        assert!(!LiteralClass::NotNumeric.is_numeric());
    }
}
