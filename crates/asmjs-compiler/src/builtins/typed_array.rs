//! Heap views and the typed-array stdlib members.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::types::{AsmType, RegisterClass};

/// The eight typed-array views over the module heap.
///
/// The discriminant is used as an instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ViewKind {
    Int8 = 0,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl ViewKind {
    pub const ALL: [ViewKind; 8] = [
        ViewKind::Int8,
        ViewKind::Uint8,
        ViewKind::Int16,
        ViewKind::Uint16,
        ViewKind::Int32,
        ViewKind::Uint32,
        ViewKind::Float32,
        ViewKind::Float64,
    ];

    /// Look up a view by its stdlib constructor name.
    pub fn from_constructor(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.constructor() == name)
    }

    /// The stdlib constructor name, e.g. `Int32Array`.
    pub fn constructor(self) -> &'static str {
        match self {
            ViewKind::Int8 => "Int8Array",
            ViewKind::Uint8 => "Uint8Array",
            ViewKind::Int16 => "Int16Array",
            ViewKind::Uint16 => "Uint16Array",
            ViewKind::Int32 => "Int32Array",
            ViewKind::Uint32 => "Uint32Array",
            ViewKind::Float32 => "Float32Array",
            ViewKind::Float64 => "Float64Array",
        }
    }

    /// Element size in bytes.
    pub fn element_size(self) -> u32 {
        1 << self.shift()
    }

    /// `log2` of the element size; the shift a dynamic index must carry.
    pub fn shift(self) -> u32 {
        match self {
            ViewKind::Int8 | ViewKind::Uint8 => 0,
            ViewKind::Int16 | ViewKind::Uint16 => 1,
            ViewKind::Int32 | ViewKind::Uint32 | ViewKind::Float32 => 2,
            ViewKind::Float64 => 3,
        }
    }

    pub fn is_byte(self) -> bool {
        self.shift() == 0
    }

    /// Type of a load through this view.
    pub fn load_type(self) -> AsmType {
        match self {
            ViewKind::Float32 => AsmType::MaybeFloat,
            ViewKind::Float64 => AsmType::MaybeDouble,
            _ => AsmType::Intish,
        }
    }

    /// Whether a value of type `ty` may be stored through this view.
    pub fn accepts_store(self, ty: AsmType) -> bool {
        match self {
            ViewKind::Float32 | ViewKind::Float64 => ty.is_floatish() || ty.is_maybe_double(),
            _ => ty.is_intish(),
        }
    }

    /// Register space the loaded or stored element lives in.
    pub fn register_class(self) -> RegisterClass {
        match self {
            ViewKind::Float32 => RegisterClass::Float,
            ViewKind::Float64 => RegisterClass::Double,
            _ => RegisterClass::Int,
        }
    }
}

/// A typed-array member of the stdlib object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayBuiltin {
    /// A view constructor such as `stdlib.Int32Array`.
    View(ViewKind),
    /// `stdlib.byteLength`.
    ByteLength,
}

impl TypedArrayBuiltin {
    /// Look up a stdlib member name.
    pub fn from_stdlib_name(name: &str) -> Option<Self> {
        if name == "byteLength" {
            return Some(TypedArrayBuiltin::ByteLength);
        }
        ViewKind::from_constructor(name).map(TypedArrayBuiltin::View)
    }

    pub fn name(self) -> &'static str {
        match self {
            TypedArrayBuiltin::View(view) => view.constructor(),
            TypedArrayBuiltin::ByteLength => "byteLength",
        }
    }
}
