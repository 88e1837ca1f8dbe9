//! Module memory layout.
//!
//! The host binds module-level values into a flat array of 8-byte slots at
//! instantiation time. The array is split into regions in a fixed order:
//!
//! ```text
//! heap | stdlib | doubles | functions | imports | tables | floats | ints | simd
//! ```
//!
//! Floats and ints are packed two to a slot. The SIMD region starts on a
//! 16-byte boundary and each value takes two slots.

use std::fmt;

/// Bytes per layout slot.
pub const SLOT_SIZE: u32 = 8;

/// One region of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    HeapBuffer,
    Stdlib,
    DoubleVars,
    ModuleFunctions,
    ImportFunctions,
    FunctionTables,
    FloatVars,
    IntVars,
    SimdVars,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Region::HeapBuffer,
        Region::Stdlib,
        Region::DoubleVars,
        Region::ModuleFunctions,
        Region::ImportFunctions,
        Region::FunctionTables,
        Region::FloatVars,
        Region::IntVars,
        Region::SimdVars,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::HeapBuffer => "heap",
            Region::Stdlib => "stdlib",
            Region::DoubleVars => "double vars",
            Region::ModuleFunctions => "functions",
            Region::ImportFunctions => "imports",
            Region::FunctionTables => "tables",
            Region::FloatVars => "float vars",
            Region::IntVars => "int vars",
            Region::SimdVars => "simd vars",
        }
    }
}

/// Placement of one region, in slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    pub region: Region,
    pub offset: u32,
    /// Number of entries, not slots.
    pub count: u32,
    pub slots: u32,
}

/// Entry counts the layout is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCounts {
    pub double_vars: u32,
    pub functions: u32,
    pub imports: u32,
    pub tables: u32,
    pub float_vars: u32,
    pub int_vars: u32,
    pub simd_vars: u32,
}

/// The module memory layout descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayout {
    regions: Vec<RegionLayout>,
    total_slots: u32,
}

impl MemoryLayout {
    /// Lay out the regions for the given counts.
    pub fn compute(counts: &LayoutCounts) -> Self {
        let mut regions = Vec::with_capacity(Region::ALL.len());
        let mut offset: u32 = 0;
        for region in Region::ALL {
            let (count, slots) = match region {
                Region::HeapBuffer | Region::Stdlib => (1, 1),
                Region::DoubleVars => (counts.double_vars, counts.double_vars),
                Region::ModuleFunctions => (counts.functions, counts.functions),
                Region::ImportFunctions => (counts.imports, counts.imports),
                Region::FunctionTables => (counts.tables, counts.tables),
                Region::FloatVars => (counts.float_vars, packed_slots(counts.float_vars)),
                Region::IntVars => (counts.int_vars, packed_slots(counts.int_vars)),
                Region::SimdVars => {
                    offset = offset.next_multiple_of(2);
                    (counts.simd_vars, counts.simd_vars * 2)
                }
            };
            regions.push(RegionLayout {
                region,
                offset,
                count,
                slots,
            });
            offset += slots;
        }
        Self {
            regions,
            total_slots: offset,
        }
    }

    pub fn regions(&self) -> &[RegionLayout] {
        &self.regions
    }

    pub fn region(&self, region: Region) -> RegionLayout {
        // `compute` pushes every region in `Region::ALL` order.
        self.regions[region as usize]
    }

    /// Slot offset of a region.
    pub fn offset(&self, region: Region) -> u32 {
        self.region(region).offset
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    pub fn total_bytes(&self) -> u32 {
        self.total_slots * SLOT_SIZE
    }
}

impl fmt::Display for MemoryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for region in &self.regions {
            writeln!(
                f,
                "{:>12} @ {:>4}  count {:>4}  slots {:>4}",
                region.region.name(),
                region.offset,
                region.count,
                region.slots
            )?;
        }
        write!(f, "{:>12}   {:>4}", "total", self.total_slots)
    }
}

/// Slots needed for `count` four-byte values.
fn packed_slots(count: u32) -> u32 {
    (count * 4).div_ceil(SLOT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module() {
        let layout = MemoryLayout::compute(&LayoutCounts::default());
        assert_eq!(layout.regions().len(), 9);
        assert_eq!(layout.offset(Region::HeapBuffer), 0);
        assert_eq!(layout.offset(Region::Stdlib), 1);
        assert_eq!(layout.offset(Region::DoubleVars), 2);
        assert_eq!(layout.offset(Region::SimdVars), 2);
        assert_eq!(layout.total_slots(), 2);
    }

    #[test]
    fn offsets_follow_region_order() {
        let layout = MemoryLayout::compute(&LayoutCounts {
            double_vars: 2,
            functions: 3,
            imports: 1,
            tables: 1,
            float_vars: 3,
            int_vars: 3,
            simd_vars: 2,
        });
        assert_eq!(layout.offset(Region::DoubleVars), 2);
        assert_eq!(layout.offset(Region::ModuleFunctions), 4);
        assert_eq!(layout.offset(Region::ImportFunctions), 7);
        assert_eq!(layout.offset(Region::FunctionTables), 8);
        assert_eq!(layout.offset(Region::FloatVars), 9);
        // three floats pack into two slots
        assert_eq!(layout.region(Region::FloatVars).slots, 2);
        assert_eq!(layout.offset(Region::IntVars), 11);
        // 11 + 2 rounds up to 14
        assert_eq!(layout.offset(Region::SimdVars), 14);
        assert_eq!(layout.total_slots(), 18);
        assert_eq!(layout.total_bytes(), 144);
    }

    #[test]
    fn offsets_never_decrease() {
        let layout = MemoryLayout::compute(&LayoutCounts {
            int_vars: 5,
            simd_vars: 1,
            ..LayoutCounts::default()
        });
        let offsets: Vec<u32> = layout.regions().iter().map(|r| r.offset).collect();
        assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(layout.offset(Region::SimdVars) % 2, 0);
    }
}
