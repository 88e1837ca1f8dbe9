//! 128-bit SIMD value types.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The eleven 128-bit SIMD variants known to the type lattice.
///
/// The discriminant is used as an instruction operand, so it is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SimdType {
    Int32x4 = 0,
    Int16x8,
    Int8x16,
    Uint32x4,
    Uint16x8,
    Uint8x16,
    Bool32x4,
    Bool16x8,
    Bool8x16,
    Float32x4,
    Float64x2,
}

/// Shape of a single SIMD lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    Signed,
    Unsigned,
    Bool,
    Float32,
    Float64,
}

impl SimdType {
    /// Every variant, in discriminant order.
    pub const ALL: [SimdType; 11] = [
        SimdType::Int32x4,
        SimdType::Int16x8,
        SimdType::Int8x16,
        SimdType::Uint32x4,
        SimdType::Uint16x8,
        SimdType::Uint8x16,
        SimdType::Bool32x4,
        SimdType::Bool16x8,
        SimdType::Bool8x16,
        SimdType::Float32x4,
        SimdType::Float64x2,
    ];

    /// Look up a variant by its `SIMD.<Name>` property name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// The `SIMD.<Name>` property name.
    pub fn name(self) -> &'static str {
        match self {
            SimdType::Int32x4 => "Int32x4",
            SimdType::Int16x8 => "Int16x8",
            SimdType::Int8x16 => "Int8x16",
            SimdType::Uint32x4 => "Uint32x4",
            SimdType::Uint16x8 => "Uint16x8",
            SimdType::Uint8x16 => "Uint8x16",
            SimdType::Bool32x4 => "Bool32x4",
            SimdType::Bool16x8 => "Bool16x8",
            SimdType::Bool8x16 => "Bool8x16",
            SimdType::Float32x4 => "Float32x4",
            SimdType::Float64x2 => "Float64x2",
        }
    }

    pub fn lane_count(self) -> u32 {
        match self {
            SimdType::Float64x2 => 2,
            SimdType::Int32x4 | SimdType::Uint32x4 | SimdType::Bool32x4 | SimdType::Float32x4 => 4,
            SimdType::Int16x8 | SimdType::Uint16x8 | SimdType::Bool16x8 => 8,
            SimdType::Int8x16 | SimdType::Uint8x16 | SimdType::Bool8x16 => 16,
        }
    }

    /// Width of one lane in bits.
    pub fn lane_bits(self) -> u32 {
        128 / self.lane_count()
    }

    pub fn lane_kind(self) -> LaneKind {
        match self {
            SimdType::Int32x4 | SimdType::Int16x8 | SimdType::Int8x16 => LaneKind::Signed,
            SimdType::Uint32x4 | SimdType::Uint16x8 | SimdType::Uint8x16 => LaneKind::Unsigned,
            SimdType::Bool32x4 | SimdType::Bool16x8 | SimdType::Bool8x16 => LaneKind::Bool,
            SimdType::Float32x4 => LaneKind::Float32,
            SimdType::Float64x2 => LaneKind::Float64,
        }
    }

    pub fn is_unsigned(self) -> bool {
        self.lane_kind() == LaneKind::Unsigned
    }

    pub fn is_bool(self) -> bool {
        self.lane_kind() == LaneKind::Bool
    }

    pub fn is_float(self) -> bool {
        matches!(self.lane_kind(), LaneKind::Float32 | LaneKind::Float64)
    }

    /// Integer lanes, signed or unsigned.
    pub fn is_integral(self) -> bool {
        matches!(self.lane_kind(), LaneKind::Signed | LaneKind::Unsigned)
    }

    /// The boolean vector produced by comparing two values of this type.
    pub fn bool_type(self) -> SimdType {
        match self.lane_count() {
            2 | 4 => SimdType::Bool32x4,
            8 => SimdType::Bool16x8,
            _ => SimdType::Bool8x16,
        }
    }

    /// Pack per-lane values into the 128-bit constant representation.
    ///
    /// Integer and boolean lanes are truncated to the lane width; boolean
    /// lanes are all-ones when non-zero.
    pub fn pack_lanes(self, lanes: &[LaneValue]) -> SimdBits {
        let mut bytes = [0u8; 16];
        let width = (self.lane_bits() / 8) as usize;
        for (i, lane) in lanes.iter().enumerate().take(self.lane_count() as usize) {
            let raw: u64 = match (self.lane_kind(), *lane) {
                (LaneKind::Float32, value) => u64::from((value.as_f64() as f32).to_bits()),
                (LaneKind::Float64, value) => value.as_f64().to_bits(),
                (LaneKind::Bool, value) => {
                    if value.as_f64() != 0.0 {
                        u64::MAX
                    } else {
                        0
                    }
                }
                (_, LaneValue::Int(v)) => v as u32 as u64,
                (_, LaneValue::Float(v)) => v as i64 as u64,
            };
            let start = i * width;
            bytes[start..start + width].copy_from_slice(&raw.to_le_bytes()[..width]);
        }

        let mut words = [0u32; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let mut chunk = [0u8; 4];
            chunk.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            *word = u32::from_le_bytes(chunk);
        }
        SimdBits(words)
    }
}

impl fmt::Display for SimdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lane initializer taken from a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneValue {
    Int(i32),
    Float(f64),
}

impl LaneValue {
    fn as_f64(self) -> f64 {
        match self {
            LaneValue::Int(v) => f64::from(v),
            LaneValue::Float(v) => v,
        }
    }
}

/// Raw 128-bit contents of a SIMD constant, as four little-endian words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SimdBits(pub [u32; 4]);

impl SimdBits {
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_counts() {
        assert_eq!(SimdType::Float64x2.lane_count(), 2);
        assert_eq!(SimdType::Int32x4.lane_count(), 4);
        assert_eq!(SimdType::Uint16x8.lane_count(), 8);
        assert_eq!(SimdType::Bool8x16.lane_count(), 16);
        assert_eq!(SimdType::Int8x16.lane_bits(), 8);
    }

    #[test]
    fn names_round_trip() {
        for ty in SimdType::ALL {
            assert_eq!(SimdType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(SimdType::from_name("Int64x2"), None);
    }

    #[test]
    fn bool_type_matches_lane_count() {
        assert_eq!(SimdType::Float32x4.bool_type(), SimdType::Bool32x4);
        assert_eq!(SimdType::Uint16x8.bool_type(), SimdType::Bool16x8);
        assert_eq!(SimdType::Int8x16.bool_type(), SimdType::Bool8x16);
    }

    #[test]
    fn pack_int32x4() {
        let lanes = [
            LaneValue::Int(1),
            LaneValue::Int(-1),
            LaneValue::Int(0),
            LaneValue::Int(7),
        ];
        let bits = SimdType::Int32x4.pack_lanes(&lanes);
        assert_eq!(bits.0, [1, u32::MAX, 0, 7]);
    }

    #[test]
    fn pack_int16x8_truncates() {
        let lanes = [LaneValue::Int(0x1_0002), LaneValue::Int(3)];
        let bits = SimdType::Int16x8.pack_lanes(&lanes);
        assert_eq!(bits.0[0], 0x0003_0002);
    }

    #[test]
    fn pack_float32x4() {
        let lanes = [LaneValue::Float(1.5); 4];
        let bits = SimdType::Float32x4.pack_lanes(&lanes);
        assert_eq!(bits.0, [1.5f32.to_bits(); 4]);
    }

    #[test]
    fn pack_bool_lanes() {
        let lanes = [
            LaneValue::Int(1),
            LaneValue::Int(0),
            LaneValue::Int(5),
            LaneValue::Int(0),
        ];
        let bits = SimdType::Bool32x4.pack_lanes(&lanes);
        assert_eq!(bits.0, [u32::MAX, 0, u32::MAX, 0]);
        assert!(!bits.is_zero());
        assert!(SimdBits::default().is_zero());
    }
}
