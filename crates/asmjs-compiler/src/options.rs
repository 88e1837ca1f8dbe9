//! Compiler configuration.

/// Options controlling module compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Allow binding members of `stdlib.SIMD`.
    pub simd: bool,
    /// Upper bound on functions per module, change-heap function included.
    pub max_function_count: usize,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simd(mut self, simd: bool) -> Self {
        self.simd = simd;
        self
    }

    pub fn with_max_function_count(mut self, count: usize) -> Self {
        self.max_function_count = count;
        self
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            simd: true,
            max_function_count: u16::MAX as usize,
        }
    }
}
