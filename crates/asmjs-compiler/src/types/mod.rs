//! The asm.js type lattice.
//!
//! Three related vocabularies live here:
//!
//! - [`AsmType`]: the fine-grained static type of an expression result.
//! - [`StorageType`]: the physical representation a binding keeps for its
//!   whole lifetime.
//! - [`ReturnType`]: the legal function return types.
//!
//! All type rules elsewhere in the compiler are phrased in terms of
//! [`AsmType::is_sub_type`].

mod coercion;
mod literal;
mod simd;

use std::fmt;

pub use coercion::{Coercion, SyntacticCoercion};
pub use literal::{LiteralClass, classify_literal};
pub use simd::{LaneKind, LaneValue, SimdBits, SimdType};

/// Expression-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsmType {
    Double,
    MaybeDouble,
    DoubleLit,
    Float,
    MaybeFloat,
    Floatish,
    FloatishDoubleLit,
    Fixnum,
    Int,
    Signed,
    Unsigned,
    Intish,
    Void,
    Simd(SimdType),
}

impl AsmType {
    /// Whether `self ⊑ other`.
    pub fn is_sub_type(self, other: AsmType) -> bool {
        use AsmType::*;
        match other {
            Double => matches!(self, DoubleLit | Double),
            MaybeDouble => matches!(self, DoubleLit | Double | MaybeDouble),
            DoubleLit => self == DoubleLit,
            Float => self == Float,
            MaybeFloat => matches!(self, Float | MaybeFloat),
            Floatish => matches!(self, Float | MaybeFloat | Floatish),
            FloatishDoubleLit => matches!(self, Float | MaybeFloat | Floatish | DoubleLit),
            Fixnum => self == Fixnum,
            Int => matches!(self, Fixnum | Signed | Unsigned | Int),
            Signed => matches!(self, Fixnum | Signed),
            Unsigned => matches!(self, Fixnum | Unsigned),
            Intish => matches!(self, Fixnum | Signed | Unsigned | Int | Intish),
            Void | Simd(_) => self == other,
        }
    }

    /// Whether `other ⊑ self`.
    pub fn is_super_type(self, other: AsmType) -> bool {
        other.is_sub_type(self)
    }

    pub fn is_signed(self) -> bool {
        self.is_sub_type(AsmType::Signed)
    }

    pub fn is_unsigned(self) -> bool {
        self.is_sub_type(AsmType::Unsigned)
    }

    pub fn is_int(self) -> bool {
        self.is_sub_type(AsmType::Int)
    }

    pub fn is_intish(self) -> bool {
        self.is_sub_type(AsmType::Intish)
    }

    pub fn is_double(self) -> bool {
        self.is_sub_type(AsmType::Double)
    }

    pub fn is_maybe_double(self) -> bool {
        self.is_sub_type(AsmType::MaybeDouble)
    }

    pub fn is_float(self) -> bool {
        self.is_sub_type(AsmType::Float)
    }

    pub fn is_maybe_float(self) -> bool {
        self.is_sub_type(AsmType::MaybeFloat)
    }

    pub fn is_floatish(self) -> bool {
        self.is_sub_type(AsmType::Floatish)
    }

    pub fn is_floatish_double_lit(self) -> bool {
        self.is_sub_type(AsmType::FloatishDoubleLit)
    }

    /// Types that may cross the foreign-function boundary.
    pub fn is_extern(self) -> bool {
        self.is_double() || self.is_signed()
    }

    /// Types a variable initializer may have.
    pub fn is_var_type(self) -> bool {
        self.is_int() || self.is_maybe_double() || self.is_maybe_float()
    }

    pub fn is_simd(self) -> bool {
        matches!(self, AsmType::Simd(_))
    }

    pub fn as_simd(self) -> Option<SimdType> {
        match self {
            AsmType::Simd(ty) => Some(ty),
            _ => None,
        }
    }

    /// Register space that holds values of this type, `None` for `void`.
    pub fn register_class(self) -> Option<RegisterClass> {
        if self.is_intish() {
            Some(RegisterClass::Int)
        } else if self.is_floatish() {
            Some(RegisterClass::Float)
        } else if self.is_maybe_double() {
            Some(RegisterClass::Double)
        } else if self.is_simd() {
            Some(RegisterClass::Simd)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AsmType::Double => "double",
            AsmType::MaybeDouble => "double?",
            AsmType::DoubleLit => "doublelit",
            AsmType::Float => "float",
            AsmType::MaybeFloat => "float?",
            AsmType::Floatish => "floatish",
            AsmType::FloatishDoubleLit => "FloatishDoubleLit",
            AsmType::Fixnum => "fixnum",
            AsmType::Int => "int",
            AsmType::Signed => "signed",
            AsmType::Unsigned => "unsigned",
            AsmType::Intish => "intish",
            AsmType::Void => "void",
            AsmType::Simd(ty) => ty.name(),
        }
    }
}

impl fmt::Display for AsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-primitive register space selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    Int,
    Float,
    Double,
    Simd,
}

impl RegisterClass {
    pub const ALL: [RegisterClass; 4] = [
        RegisterClass::Int,
        RegisterClass::Float,
        RegisterClass::Double,
        RegisterClass::Simd,
    ];
}

/// Physical representation of a variable, argument or module value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Int,
    Double,
    Float,
    Simd(SimdType),
}

impl StorageType {
    /// Storage for a value that has already passed a coercion.
    pub fn from_checked_type(ty: AsmType) -> Option<Self> {
        if ty.is_maybe_double() {
            Some(StorageType::Double)
        } else if ty.is_floatish() {
            Some(StorageType::Float)
        } else if ty.is_int() {
            Some(StorageType::Int)
        } else {
            ty.as_simd().map(StorageType::Simd)
        }
    }

    pub fn to_asm_type(self) -> AsmType {
        match self {
            StorageType::Int => AsmType::Int,
            StorageType::Double => AsmType::Double,
            StorageType::Float => AsmType::Float,
            StorageType::Simd(ty) => AsmType::Simd(ty),
        }
    }

    pub fn register_class(self) -> RegisterClass {
        match self {
            StorageType::Int => RegisterClass::Int,
            StorageType::Double => RegisterClass::Double,
            StorageType::Float => RegisterClass::Float,
            StorageType::Simd(_) => RegisterClass::Simd,
        }
    }

    /// Bytes of outgoing-argument space one argument of this type takes.
    pub fn arg_byte_size(self) -> u32 {
        match self {
            StorageType::Simd(_) => 16,
            _ => 8,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_asm_type().fmt(f)
    }
}

/// Legal function return types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Signed,
    Double,
    Float,
    Simd(SimdType),
}

impl ReturnType {
    /// The return type an expression of type `ty` fixes, if it is legal.
    pub fn from_asm_type(ty: AsmType) -> Option<Self> {
        match ty {
            AsmType::Void => Some(ReturnType::Void),
            AsmType::Double | AsmType::DoubleLit => Some(ReturnType::Double),
            AsmType::Signed | AsmType::Fixnum => Some(ReturnType::Signed),
            AsmType::Float => Some(ReturnType::Float),
            AsmType::Simd(simd) => Some(ReturnType::Simd(simd)),
            _ => None,
        }
    }

    pub fn to_asm_type(self) -> AsmType {
        match self {
            ReturnType::Void => AsmType::Void,
            ReturnType::Signed => AsmType::Signed,
            ReturnType::Double => AsmType::Double,
            ReturnType::Float => AsmType::Float,
            ReturnType::Simd(ty) => AsmType::Simd(ty),
        }
    }

    /// Storage of the returned value, `None` for `void`.
    pub fn to_storage(self) -> Option<StorageType> {
        match self {
            ReturnType::Void => None,
            ReturnType::Signed => Some(StorageType::Int),
            ReturnType::Double => Some(StorageType::Double),
            ReturnType::Float => Some(StorageType::Float),
            ReturnType::Simd(ty) => Some(StorageType::Simd(ty)),
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_asm_type().fmt(f)
    }
}
