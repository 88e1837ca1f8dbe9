//! Standard-library builtins known to the validator.
//!
//! - [`MathBuiltin`] / [`MathConstant`] - members of `stdlib.Math`
//! - [`TypedArrayBuiltin`] / [`ViewKind`] - heap view constructors and `byteLength`
//! - [`SimdBuiltin`] - members of `stdlib.SIMD`

mod math;
mod simd;
mod typed_array;

pub use math::{MathBuiltin, MathConstant, MathOverload};
pub use simd::{SimdArg, SimdBuiltin, SimdOp, SimdSignature, lane_arg_type, lane_result_type};
pub use typed_array::{TypedArrayBuiltin, ViewKind};
