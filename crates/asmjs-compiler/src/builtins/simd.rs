//! `stdlib.SIMD` operations.
//!
//! A SIMD builtin is a pair of a concrete [`SimdType`] and a [`SimdOp`]. Not
//! every operation exists on every type; [`SimdOp::from_name`] only resolves
//! the combinations the type provides.

use crate::types::{AsmType, SimdType};

/// An operation on a SIMD type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdOp {
    /// `T(lane, ...)`
    Constructor,
    Check,
    Splat,
    /// Numeric lane conversion, `fromFloat32x4` and friends.
    From(SimdType),
    /// Bit reinterpretation, `fromInt32x4Bits` and friends.
    FromBits(SimdType),
    Neg,
    Not,
    Abs,
    Sqrt,
    ReciprocalApproximation,
    ReciprocalSqrtApproximation,
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    And,
    Or,
    Xor,
    AddSaturate,
    SubSaturate,
    ShiftLeftByScalar,
    ShiftRightByScalar,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    Select,
    ExtractLane,
    ReplaceLane,
    Swizzle,
    Shuffle,
    AnyTrue,
    AllTrue,
    Load,
    Load1,
    Load2,
    Load3,
    Store,
    Store1,
    Store2,
    Store3,
}

/// Property-named operations, in code order.
const NAMED_OPS: [SimdOp; 42] = [
    SimdOp::Check,
    SimdOp::Splat,
    SimdOp::Neg,
    SimdOp::Not,
    SimdOp::Abs,
    SimdOp::Sqrt,
    SimdOp::ReciprocalApproximation,
    SimdOp::ReciprocalSqrtApproximation,
    SimdOp::Add,
    SimdOp::Sub,
    SimdOp::Mul,
    SimdOp::Div,
    SimdOp::Min,
    SimdOp::Max,
    SimdOp::And,
    SimdOp::Or,
    SimdOp::Xor,
    SimdOp::AddSaturate,
    SimdOp::SubSaturate,
    SimdOp::ShiftLeftByScalar,
    SimdOp::ShiftRightByScalar,
    SimdOp::LessThan,
    SimdOp::LessThanOrEqual,
    SimdOp::GreaterThan,
    SimdOp::GreaterThanOrEqual,
    SimdOp::Equal,
    SimdOp::NotEqual,
    SimdOp::Select,
    SimdOp::ExtractLane,
    SimdOp::ReplaceLane,
    SimdOp::Swizzle,
    SimdOp::Shuffle,
    SimdOp::AnyTrue,
    SimdOp::AllTrue,
    SimdOp::Load,
    SimdOp::Load1,
    SimdOp::Load2,
    SimdOp::Load3,
    SimdOp::Store,
    SimdOp::Store1,
    SimdOp::Store2,
    SimdOp::Store3,
];

/// What a builtin argument position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdArg {
    /// Any expression whose type is a subtype of this one.
    Value(AsmType),
    /// An integer literal in `[0, bound)`.
    Lane { bound: u32 },
    /// A heap view name.
    View,
}

/// Argument and result shape of a SIMD builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimdSignature {
    pub args: Vec<SimdArg>,
    pub ret: AsmType,
}

impl SimdOp {
    /// Resolve the property `name` of `SIMD.<ty>`.
    pub fn from_name(ty: SimdType, name: &str) -> Option<Self> {
        let op = NAMED_OPS
            .into_iter()
            .find(|op| op.name() == name)
            .or_else(|| Self::parse_conversion(name))?;
        op.is_supported(ty).then_some(op)
    }

    fn parse_conversion(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("from")?;
        match rest.strip_suffix("Bits") {
            Some(src) => SimdType::from_name(src).map(SimdOp::FromBits),
            None => SimdType::from_name(rest).map(SimdOp::From),
        }
    }

    /// The property name, `None` for the constructor itself.
    pub fn name(self) -> &'static str {
        match self {
            SimdOp::Constructor => "",
            SimdOp::Check => "check",
            SimdOp::Splat => "splat",
            SimdOp::From(SimdType::Float32x4) => "fromFloat32x4",
            SimdOp::From(SimdType::Int32x4) => "fromInt32x4",
            SimdOp::From(SimdType::Uint32x4) => "fromUint32x4",
            SimdOp::From(_) => "from",
            SimdOp::FromBits(SimdType::Int32x4) => "fromInt32x4Bits",
            SimdOp::FromBits(SimdType::Int16x8) => "fromInt16x8Bits",
            SimdOp::FromBits(SimdType::Int8x16) => "fromInt8x16Bits",
            SimdOp::FromBits(SimdType::Uint32x4) => "fromUint32x4Bits",
            SimdOp::FromBits(SimdType::Uint16x8) => "fromUint16x8Bits",
            SimdOp::FromBits(SimdType::Uint8x16) => "fromUint8x16Bits",
            SimdOp::FromBits(SimdType::Float32x4) => "fromFloat32x4Bits",
            SimdOp::FromBits(_) => "fromBits",
            SimdOp::Neg => "neg",
            SimdOp::Not => "not",
            SimdOp::Abs => "abs",
            SimdOp::Sqrt => "sqrt",
            SimdOp::ReciprocalApproximation => "reciprocalApproximation",
            SimdOp::ReciprocalSqrtApproximation => "reciprocalSqrtApproximation",
            SimdOp::Add => "add",
            SimdOp::Sub => "sub",
            SimdOp::Mul => "mul",
            SimdOp::Div => "div",
            SimdOp::Min => "min",
            SimdOp::Max => "max",
            SimdOp::And => "and",
            SimdOp::Or => "or",
            SimdOp::Xor => "xor",
            SimdOp::AddSaturate => "addSaturate",
            SimdOp::SubSaturate => "subSaturate",
            SimdOp::ShiftLeftByScalar => "shiftLeftByScalar",
            SimdOp::ShiftRightByScalar => "shiftRightByScalar",
            SimdOp::LessThan => "lessThan",
            SimdOp::LessThanOrEqual => "lessThanOrEqual",
            SimdOp::GreaterThan => "greaterThan",
            SimdOp::GreaterThanOrEqual => "greaterThanOrEqual",
            SimdOp::Equal => "equal",
            SimdOp::NotEqual => "notEqual",
            SimdOp::Select => "select",
            SimdOp::ExtractLane => "extractLane",
            SimdOp::ReplaceLane => "replaceLane",
            SimdOp::Swizzle => "swizzle",
            SimdOp::Shuffle => "shuffle",
            SimdOp::AnyTrue => "anyTrue",
            SimdOp::AllTrue => "allTrue",
            SimdOp::Load => "load",
            SimdOp::Load1 => "load1",
            SimdOp::Load2 => "load2",
            SimdOp::Load3 => "load3",
            SimdOp::Store => "store",
            SimdOp::Store1 => "store1",
            SimdOp::Store2 => "store2",
            SimdOp::Store3 => "store3",
        }
    }

    /// Instruction operand identifying the operation.
    pub fn code(self) -> u32 {
        match self {
            SimdOp::Constructor => 0,
            SimdOp::From(src) => 0x100 | u32::from(u8::from(src)),
            SimdOp::FromBits(src) => 0x200 | u32::from(u8::from(src)),
            op => NAMED_OPS
                .iter()
                .position(|named| *named == op)
                .map_or(0, |index| index as u32 + 1),
        }
    }

    /// Whether `SIMD.<ty>` provides this operation.
    pub fn is_supported(self, ty: SimdType) -> bool {
        if ty == SimdType::Float64x2 {
            return false;
        }
        let numeric = ty.is_integral() || ty.is_float();
        let bitwise = ty.is_integral() || ty.is_bool();
        let is_32x4 = matches!(
            ty,
            SimdType::Int32x4 | SimdType::Uint32x4 | SimdType::Float32x4
        );
        match self {
            SimdOp::Constructor
            | SimdOp::Check
            | SimdOp::Splat
            | SimdOp::ExtractLane
            | SimdOp::ReplaceLane => true,
            SimdOp::From(src) => matches!(
                (ty, src),
                (SimdType::Int32x4 | SimdType::Uint32x4, SimdType::Float32x4)
                    | (SimdType::Float32x4, SimdType::Int32x4 | SimdType::Uint32x4)
            ),
            SimdOp::FromBits(src) => {
                !ty.is_bool() && !src.is_bool() && src != SimdType::Float64x2 && src != ty
            }
            SimdOp::Neg => ty.lane_kind() != crate::types::LaneKind::Bool,
            SimdOp::Not | SimdOp::And | SimdOp::Or | SimdOp::Xor => bitwise,
            SimdOp::Abs
            | SimdOp::Sqrt
            | SimdOp::ReciprocalApproximation
            | SimdOp::ReciprocalSqrtApproximation
            | SimdOp::Div => ty.is_float(),
            SimdOp::Min | SimdOp::Max => ty.is_float(),
            SimdOp::Add | SimdOp::Sub | SimdOp::Mul => numeric,
            SimdOp::AddSaturate | SimdOp::SubSaturate => {
                ty.is_integral() && ty.lane_bits() <= 16
            }
            SimdOp::ShiftLeftByScalar | SimdOp::ShiftRightByScalar => ty.is_integral(),
            SimdOp::LessThan
            | SimdOp::LessThanOrEqual
            | SimdOp::GreaterThan
            | SimdOp::GreaterThanOrEqual
            | SimdOp::Equal
            | SimdOp::NotEqual
            | SimdOp::Select
            | SimdOp::Swizzle
            | SimdOp::Shuffle
            | SimdOp::Load
            | SimdOp::Store => numeric,
            SimdOp::AnyTrue | SimdOp::AllTrue => ty.is_bool(),
            SimdOp::Load1
            | SimdOp::Load2
            | SimdOp::Load3
            | SimdOp::Store1
            | SimdOp::Store2
            | SimdOp::Store3 => is_32x4,
        }
    }

    pub fn is_load(self) -> bool {
        matches!(
            self,
            SimdOp::Load | SimdOp::Load1 | SimdOp::Load2 | SimdOp::Load3
        )
    }

    pub fn is_store(self) -> bool {
        matches!(
            self,
            SimdOp::Store | SimdOp::Store1 | SimdOp::Store2 | SimdOp::Store3
        )
    }

    /// Number of lanes a load or store moves.
    pub fn access_lanes(self, ty: SimdType) -> u32 {
        match self {
            SimdOp::Load1 | SimdOp::Store1 => 1,
            SimdOp::Load2 | SimdOp::Store2 => 2,
            SimdOp::Load3 | SimdOp::Store3 => 3,
            _ => ty.lane_count(),
        }
    }

    /// Argument kinds and result type of this operation on `ty`.
    pub fn signature(self, ty: SimdType) -> SimdSignature {
        let this = AsmType::Simd(ty);
        let lane = lane_arg_type(ty);
        let lanes = ty.lane_count();
        let value = SimdArg::Value;
        let (args, ret) = match self {
            SimdOp::Constructor => (vec![value(lane); lanes as usize], this),
            SimdOp::Check => (vec![value(this)], this),
            SimdOp::Splat => (vec![value(lane)], this),
            SimdOp::From(src) | SimdOp::FromBits(src) => {
                (vec![value(AsmType::Simd(src))], this)
            }
            SimdOp::Neg
            | SimdOp::Not
            | SimdOp::Abs
            | SimdOp::Sqrt
            | SimdOp::ReciprocalApproximation
            | SimdOp::ReciprocalSqrtApproximation => (vec![value(this)], this),
            SimdOp::Add
            | SimdOp::Sub
            | SimdOp::Mul
            | SimdOp::Div
            | SimdOp::Min
            | SimdOp::Max
            | SimdOp::And
            | SimdOp::Or
            | SimdOp::Xor
            | SimdOp::AddSaturate
            | SimdOp::SubSaturate => (vec![value(this), value(this)], this),
            SimdOp::ShiftLeftByScalar | SimdOp::ShiftRightByScalar => {
                (vec![value(this), value(AsmType::Int)], this)
            }
            SimdOp::LessThan
            | SimdOp::LessThanOrEqual
            | SimdOp::GreaterThan
            | SimdOp::GreaterThanOrEqual
            | SimdOp::Equal
            | SimdOp::NotEqual => (
                vec![value(this), value(this)],
                AsmType::Simd(ty.bool_type()),
            ),
            SimdOp::Select => (
                vec![value(AsmType::Simd(ty.bool_type())), value(this), value(this)],
                this,
            ),
            SimdOp::ExtractLane => (
                vec![value(this), SimdArg::Lane { bound: lanes }],
                lane_result_type(ty),
            ),
            SimdOp::ReplaceLane => (
                vec![value(this), SimdArg::Lane { bound: lanes }, value(lane)],
                this,
            ),
            SimdOp::Swizzle => {
                let mut args = vec![value(this)];
                args.extend(std::iter::repeat_n(SimdArg::Lane { bound: lanes }, lanes as usize));
                (args, this)
            }
            SimdOp::Shuffle => {
                let mut args = vec![value(this), value(this)];
                args.extend(std::iter::repeat_n(
                    SimdArg::Lane { bound: 2 * lanes },
                    lanes as usize,
                ));
                (args, this)
            }
            SimdOp::AnyTrue | SimdOp::AllTrue => (vec![value(this)], AsmType::Int),
            SimdOp::Load | SimdOp::Load1 | SimdOp::Load2 | SimdOp::Load3 => {
                (vec![SimdArg::View, value(AsmType::Intish)], this)
            }
            SimdOp::Store | SimdOp::Store1 | SimdOp::Store2 | SimdOp::Store3 => (
                vec![SimdArg::View, value(AsmType::Intish), value(this)],
                this,
            ),
        };
        SimdSignature { args, ret }
    }
}

/// Type of a scalar lane argument of a constructor, `splat` or `replaceLane`.
pub fn lane_arg_type(ty: SimdType) -> AsmType {
    if ty.is_float() {
        AsmType::FloatishDoubleLit
    } else {
        AsmType::Intish
    }
}

/// Type produced by `extractLane`.
pub fn lane_result_type(ty: SimdType) -> AsmType {
    if ty.is_float() {
        AsmType::Float
    } else if ty.is_unsigned() {
        AsmType::Unsigned
    } else {
        AsmType::Signed
    }
}

/// A member of `stdlib.SIMD` bound in the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimdBuiltin {
    pub ty: SimdType,
    pub op: SimdOp,
}

impl SimdBuiltin {
    pub fn new(ty: SimdType, op: SimdOp) -> Self {
        Self { ty, op }
    }

    pub fn constructor(ty: SimdType) -> Self {
        Self::new(ty, SimdOp::Constructor)
    }

    pub fn signature(&self) -> SimdSignature {
        self.op.signature(self.ty)
    }

    /// `Int32x4.add` style display name.
    pub fn display_name(&self) -> String {
        match self.op {
            SimdOp::Constructor => self.ty.name().to_string(),
            op => format!("{}.{}", self.ty.name(), op.name()),
        }
    }
}
