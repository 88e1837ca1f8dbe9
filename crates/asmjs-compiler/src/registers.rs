//! Per-scope virtual register allocation.
//!
//! Each function owns one [`RegisterSpace`] per [`RegisterClass`]. A space is
//! laid out as three consecutive ranges:
//!
//! ```text
//! [ constants | named (args, locals) | temporaries ]
//! ```
//!
//! Constants are interned during the pre-scan and sealed before any named
//! slot is handed out, so every index is stable once assigned.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::types::{RegisterClass, SimdBits};

/// Misuse of a register space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A constant was interned after the pre-scan finished.
    #[error("constant pool is sealed")]
    ConstantsSealed,
    /// A named slot was requested after temporaries were handed out.
    #[error("named slot requested after temporaries")]
    NamedAfterTemporary,
}

/// Slot counts of one register space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterCounts {
    pub const_count: u32,
    pub var_count: u32,
    pub tmp_count: u32,
}

impl RegisterCounts {
    pub fn total(&self) -> u32 {
        self.const_count + self.var_count + self.tmp_count
    }
}

/// One typed register space.
#[derive(Debug, Clone)]
pub struct RegisterSpace<K> {
    constants: FxHashMap<K, u32>,
    const_values: Vec<K>,
    sealed: bool,
    var_count: u32,
    /// High-water mark of temporaries.
    tmp_count: u32,
    /// Temporaries currently handed out.
    live_tmps: u32,
    free: Vec<u32>,
}

impl<K> Default for RegisterSpace<K> {
    fn default() -> Self {
        Self {
            constants: FxHashMap::default(),
            const_values: Vec::new(),
            sealed: false,
            var_count: 0,
            tmp_count: 0,
            live_tmps: 0,
            free: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> RegisterSpace<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot holding `value`, allocating one on first sight.
    pub fn intern_constant(&mut self, value: K) -> Result<u32, RegisterError> {
        if let Some(&index) = self.constants.get(&value) {
            return Ok(index);
        }
        if self.sealed {
            return Err(RegisterError::ConstantsSealed);
        }
        let index = self.const_values.len() as u32;
        self.constants.insert(value, index);
        self.const_values.push(value);
        Ok(index)
    }

    /// Slot of an already interned constant.
    pub fn constant(&self, value: K) -> Option<u32> {
        self.constants.get(&value).copied()
    }

    /// Interned constants in slot order.
    pub fn constants(&self) -> &[K] {
        &self.const_values
    }

    pub fn seal_constants(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Allocate a slot for a variable or argument. Seals the constant pool.
    pub fn acquire_named(&mut self) -> Result<u32, RegisterError> {
        if self.tmp_count > 0 {
            return Err(RegisterError::NamedAfterTemporary);
        }
        self.sealed = true;
        let index = self.const_count() + self.var_count;
        self.var_count += 1;
        Ok(index)
    }

    /// Allocate a temporary, reusing a released one when possible.
    pub fn acquire_tmp(&mut self) -> u32 {
        self.sealed = true;
        self.live_tmps += 1;
        if let Some(index) = self.free.pop() {
            return index;
        }
        let index = self.first_tmp() + self.tmp_count;
        self.tmp_count += 1;
        index
    }

    /// Return a temporary to the free list.
    ///
    /// Constants, named slots and already released temporaries are ignored.
    pub fn release(&mut self, index: u32) {
        if !self.is_tmp(index) || self.free.contains(&index) {
            return;
        }
        self.live_tmps -= 1;
        self.free.push(index);
    }

    pub fn is_constant(&self, index: u32) -> bool {
        index < self.const_count()
    }

    pub fn is_named(&self, index: u32) -> bool {
        index >= self.const_count() && index < self.first_tmp()
    }

    pub fn is_tmp(&self, index: u32) -> bool {
        index >= self.first_tmp() && index < self.first_tmp() + self.tmp_count
    }

    /// Temporaries currently handed out.
    pub fn live_tmps(&self) -> u32 {
        self.live_tmps
    }

    pub fn const_count(&self) -> u32 {
        self.const_values.len() as u32
    }

    pub fn counts(&self) -> RegisterCounts {
        RegisterCounts {
            const_count: self.const_count(),
            var_count: self.var_count,
            tmp_count: self.tmp_count,
        }
    }

    fn first_tmp(&self) -> u32 {
        self.const_count() + self.var_count
    }
}

/// A typed register location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub class: RegisterClass,
    pub index: u32,
}

impl Location {
    pub fn new(class: RegisterClass, index: u32) -> Self {
        Self { class, index }
    }
}

/// Register counts of all four spaces of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterUsage {
    pub int: RegisterCounts,
    pub float: RegisterCounts,
    pub double: RegisterCounts,
    pub simd: RegisterCounts,
}

impl RegisterUsage {
    pub fn get(&self, class: RegisterClass) -> RegisterCounts {
        match class {
            RegisterClass::Int => self.int,
            RegisterClass::Float => self.float,
            RegisterClass::Double => self.double,
            RegisterClass::Simd => self.simd,
        }
    }
}

/// The four typed register spaces of one function.
///
/// Float keys are stored as bit patterns so `0.0` and `-0.0` get distinct
/// slots.
#[derive(Debug, Clone, Default)]
pub struct RegisterSet {
    pub int: RegisterSpace<i32>,
    pub float: RegisterSpace<u32>,
    pub double: RegisterSpace<u64>,
    pub simd: RegisterSpace<SimdBits>,
}

impl RegisterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_int(&mut self, value: i32) -> Result<Location, RegisterError> {
        let index = self.int.intern_constant(value)?;
        Ok(Location::new(RegisterClass::Int, index))
    }

    pub fn intern_float(&mut self, value: f32) -> Result<Location, RegisterError> {
        let index = self.float.intern_constant(value.to_bits())?;
        Ok(Location::new(RegisterClass::Float, index))
    }

    pub fn intern_double(&mut self, value: f64) -> Result<Location, RegisterError> {
        let index = self.double.intern_constant(value.to_bits())?;
        Ok(Location::new(RegisterClass::Double, index))
    }

    pub fn intern_simd(&mut self, value: SimdBits) -> Result<Location, RegisterError> {
        let index = self.simd.intern_constant(value)?;
        Ok(Location::new(RegisterClass::Simd, index))
    }

    pub fn int_constant(&self, value: i32) -> Option<Location> {
        self.int
            .constant(value)
            .map(|index| Location::new(RegisterClass::Int, index))
    }

    pub fn float_constant(&self, value: f32) -> Option<Location> {
        self.float
            .constant(value.to_bits())
            .map(|index| Location::new(RegisterClass::Float, index))
    }

    pub fn double_constant(&self, value: f64) -> Option<Location> {
        self.double
            .constant(value.to_bits())
            .map(|index| Location::new(RegisterClass::Double, index))
    }

    pub fn simd_constant(&self, value: SimdBits) -> Option<Location> {
        self.simd
            .constant(value)
            .map(|index| Location::new(RegisterClass::Simd, index))
    }

    pub fn seal_constants(&mut self) {
        self.int.seal_constants();
        self.float.seal_constants();
        self.double.seal_constants();
        self.simd.seal_constants();
    }

    pub fn acquire_named(&mut self, class: RegisterClass) -> Result<Location, RegisterError> {
        let index = match class {
            RegisterClass::Int => self.int.acquire_named()?,
            RegisterClass::Float => self.float.acquire_named()?,
            RegisterClass::Double => self.double.acquire_named()?,
            RegisterClass::Simd => self.simd.acquire_named()?,
        };
        Ok(Location::new(class, index))
    }

    pub fn acquire_tmp(&mut self, class: RegisterClass) -> Location {
        let index = match class {
            RegisterClass::Int => self.int.acquire_tmp(),
            RegisterClass::Float => self.float.acquire_tmp(),
            RegisterClass::Double => self.double.acquire_tmp(),
            RegisterClass::Simd => self.simd.acquire_tmp(),
        };
        Location::new(class, index)
    }

    pub fn release(&mut self, location: Location) {
        match location.class {
            RegisterClass::Int => self.int.release(location.index),
            RegisterClass::Float => self.float.release(location.index),
            RegisterClass::Double => self.double.release(location.index),
            RegisterClass::Simd => self.simd.release(location.index),
        }
    }

    pub fn is_tmp(&self, location: Location) -> bool {
        match location.class {
            RegisterClass::Int => self.int.is_tmp(location.index),
            RegisterClass::Float => self.float.is_tmp(location.index),
            RegisterClass::Double => self.double.is_tmp(location.index),
            RegisterClass::Simd => self.simd.is_tmp(location.index),
        }
    }

    pub fn usage(&self) -> RegisterUsage {
        RegisterUsage {
            int: self.int.counts(),
            float: self.float.counts(),
            double: self.double.counts(),
            simd: self.simd.counts(),
        }
    }
}
