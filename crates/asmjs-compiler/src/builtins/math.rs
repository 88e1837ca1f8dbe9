//! `stdlib.Math` functions and constants.

use crate::bytecode::OpCode;
use crate::types::AsmType;

/// A callable member of `stdlib.Math`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathBuiltin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ceil,
    Floor,
    Exp,
    Log,
    Pow,
    Sqrt,
    Abs,
    Atan2,
    Imul,
    Fround,
    Min,
    Max,
    Clz32,
}

/// One accepted argument-type combination of a math builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathOverload {
    pub args: &'static [AsmType],
    pub ret: AsmType,
    pub op: OpCode,
}

macro_rules! overload {
    ($args:expr, $ret:expr, $op:expr) => {
        MathOverload {
            args: $args,
            ret: $ret,
            op: $op,
        }
    };
}

use AsmType::{Double, Fixnum, Float, Floatish, Int, Intish, MaybeDouble, MaybeFloat, Signed, Unsigned};

const D: &[AsmType] = &[MaybeDouble];
const DD: &[AsmType] = &[MaybeDouble, MaybeDouble];

impl MathBuiltin {
    const ALL: [MathBuiltin; 19] = [
        MathBuiltin::Sin,
        MathBuiltin::Cos,
        MathBuiltin::Tan,
        MathBuiltin::Asin,
        MathBuiltin::Acos,
        MathBuiltin::Atan,
        MathBuiltin::Ceil,
        MathBuiltin::Floor,
        MathBuiltin::Exp,
        MathBuiltin::Log,
        MathBuiltin::Pow,
        MathBuiltin::Sqrt,
        MathBuiltin::Abs,
        MathBuiltin::Atan2,
        MathBuiltin::Imul,
        MathBuiltin::Fround,
        MathBuiltin::Min,
        MathBuiltin::Max,
        MathBuiltin::Clz32,
    ];

    /// Look up a `Math.<name>` function.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            MathBuiltin::Sin => "sin",
            MathBuiltin::Cos => "cos",
            MathBuiltin::Tan => "tan",
            MathBuiltin::Asin => "asin",
            MathBuiltin::Acos => "acos",
            MathBuiltin::Atan => "atan",
            MathBuiltin::Ceil => "ceil",
            MathBuiltin::Floor => "floor",
            MathBuiltin::Exp => "exp",
            MathBuiltin::Log => "log",
            MathBuiltin::Pow => "pow",
            MathBuiltin::Sqrt => "sqrt",
            MathBuiltin::Abs => "abs",
            MathBuiltin::Atan2 => "atan2",
            MathBuiltin::Imul => "imul",
            MathBuiltin::Fround => "fround",
            MathBuiltin::Min => "min",
            MathBuiltin::Max => "max",
            MathBuiltin::Clz32 => "clz32",
        }
    }

    /// `min` and `max` accept two or more arguments and fold pairwise.
    pub fn is_variadic(self) -> bool {
        matches!(self, MathBuiltin::Min | MathBuiltin::Max)
    }

    /// Every accepted signature, in resolution order.
    pub fn overloads(self) -> &'static [MathOverload] {
        match self {
            MathBuiltin::Sin => &[overload!(D, Double, OpCode::SinDb)],
            MathBuiltin::Cos => &[overload!(D, Double, OpCode::CosDb)],
            MathBuiltin::Tan => &[overload!(D, Double, OpCode::TanDb)],
            MathBuiltin::Asin => &[overload!(D, Double, OpCode::AsinDb)],
            MathBuiltin::Acos => &[overload!(D, Double, OpCode::AcosDb)],
            MathBuiltin::Atan => &[overload!(D, Double, OpCode::AtanDb)],
            MathBuiltin::Exp => &[overload!(D, Double, OpCode::ExpDb)],
            MathBuiltin::Log => &[overload!(D, Double, OpCode::LogDb)],
            MathBuiltin::Pow => &[overload!(DD, Double, OpCode::PowDb)],
            MathBuiltin::Atan2 => &[overload!(DD, Double, OpCode::Atan2Db)],
            MathBuiltin::Ceil => &[
                overload!(D, Double, OpCode::CeilDb),
                overload!(&[MaybeFloat], Floatish, OpCode::CeilFlt),
            ],
            MathBuiltin::Floor => &[
                overload!(D, Double, OpCode::FloorDb),
                overload!(&[MaybeFloat], Floatish, OpCode::FloorFlt),
            ],
            MathBuiltin::Sqrt => &[
                overload!(D, Double, OpCode::SqrtDb),
                overload!(&[MaybeFloat], Floatish, OpCode::SqrtFlt),
            ],
            MathBuiltin::Abs => &[
                overload!(D, Double, OpCode::AbsDb),
                overload!(&[Signed], Unsigned, OpCode::AbsInt),
                overload!(&[MaybeFloat], Floatish, OpCode::AbsFlt),
            ],
            MathBuiltin::Min => &[
                overload!(DD, Double, OpCode::MinDb),
                overload!(&[Signed, Signed], Signed, OpCode::MinInt),
            ],
            MathBuiltin::Max => &[
                overload!(DD, Double, OpCode::MaxDb),
                overload!(&[Signed, Signed], Signed, OpCode::MaxInt),
            ],
            MathBuiltin::Imul => &[overload!(&[Intish, Intish], Signed, OpCode::ImulInt)],
            MathBuiltin::Clz32 => &[overload!(&[Intish], Fixnum, OpCode::Clz32Int)],
            MathBuiltin::Fround => &[
                overload!(&[Floatish], Float, OpCode::FroundFlt),
                overload!(D, Float, OpCode::FroundDb),
                overload!(&[Int], Float, OpCode::FroundInt),
            ],
        }
    }

    /// Pick the overload accepting `args`.
    pub fn resolve(self, args: &[AsmType]) -> Option<&'static MathOverload> {
        self.overloads().iter().find(|candidate| {
            candidate.args.len() == args.len()
                && candidate
                    .args
                    .iter()
                    .zip(args)
                    .all(|(expected, actual)| actual.is_sub_type(*expected))
        })
    }
}

/// A numeric constant reachable from the stdlib object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathConstant {
    E,
    Ln10,
    Ln2,
    Log2E,
    Log10E,
    Pi,
    Sqrt1_2,
    Sqrt2,
    /// `stdlib.Infinity`
    Infinity,
    /// `stdlib.NaN`
    NaN,
}

impl MathConstant {
    const MATH: [MathConstant; 8] = [
        MathConstant::E,
        MathConstant::Ln10,
        MathConstant::Ln2,
        MathConstant::Log2E,
        MathConstant::Log10E,
        MathConstant::Pi,
        MathConstant::Sqrt1_2,
        MathConstant::Sqrt2,
    ];

    /// Look up a `Math.<NAME>` constant.
    pub fn from_math_name(name: &str) -> Option<Self> {
        Self::MATH.into_iter().find(|constant| constant.name() == name)
    }

    /// Look up a constant that lives directly on the stdlib object.
    pub fn from_stdlib_name(name: &str) -> Option<Self> {
        match name {
            "Infinity" => Some(MathConstant::Infinity),
            "NaN" => Some(MathConstant::NaN),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MathConstant::E => "E",
            MathConstant::Ln10 => "LN10",
            MathConstant::Ln2 => "LN2",
            MathConstant::Log2E => "LOG2E",
            MathConstant::Log10E => "LOG10E",
            MathConstant::Pi => "PI",
            MathConstant::Sqrt1_2 => "SQRT1_2",
            MathConstant::Sqrt2 => "SQRT2",
            MathConstant::Infinity => "Infinity",
            MathConstant::NaN => "NaN",
        }
    }

    pub fn value(self) -> f64 {
        use std::f64::consts;
        match self {
            MathConstant::E => consts::E,
            MathConstant::Ln10 => consts::LN_10,
            MathConstant::Ln2 => consts::LN_2,
            MathConstant::Log2E => consts::LOG2_E,
            MathConstant::Log10E => consts::LOG10_E,
            MathConstant::Pi => consts::PI,
            MathConstant::Sqrt1_2 => consts::FRAC_1_SQRT_2,
            MathConstant::Sqrt2 => consts::SQRT_2,
            MathConstant::Infinity => f64::INFINITY,
            MathConstant::NaN => f64::NAN,
        }
    }
}
