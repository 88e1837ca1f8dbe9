//! Lazily fixed function signatures.
//!
//! A module function's signature is fixed by its own argument coercions and
//! first `return`, or earlier by the first call site that reaches it. A
//! function-pointer table's signature is fixed by its first call site or by
//! its first element. Once fixed, every later use must agree.

use std::fmt;

use crate::types::{AsmType, ReturnType, StorageType};

/// Argument storage types and return type of a callee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    args: Option<Vec<StorageType>>,
    ret: Option<ReturnType>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signature with both halves already fixed.
    pub fn fixed(args: Vec<StorageType>, ret: ReturnType) -> Self {
        Self {
            args: Some(args),
            ret: Some(ret),
        }
    }

    pub fn args(&self) -> Option<&[StorageType]> {
        self.args.as_deref()
    }

    pub fn ret(&self) -> Option<ReturnType> {
        self.ret
    }

    pub fn is_fixed(&self) -> bool {
        self.args.is_some() && self.ret.is_some()
    }

    /// Fix the arguments from a declaration.
    ///
    /// Returns `false` if a call site already fixed different arguments.
    pub fn declare_args(&mut self, args: Vec<StorageType>) -> bool {
        match &self.args {
            Some(fixed) => *fixed == args,
            None => {
                self.args = Some(args);
                true
            }
        }
    }

    /// Fix the return type, or check that `ret` is a subtype of the one
    /// already fixed.
    pub fn check_and_set_return(&mut self, ret: ReturnType) -> bool {
        match self.ret {
            Some(first) => ret.to_asm_type().is_sub_type(first.to_asm_type()),
            None => {
                self.ret = Some(ret);
                true
            }
        }
    }

    /// Check a call with arguments of the given types.
    ///
    /// The first call fixes the argument storage types: doubles become
    /// `Double`, floats `Float`, ints `Int` and SIMD values keep their type.
    /// Later calls need the same count and subtype-compatible arguments.
    pub fn supports_arg_call(&mut self, args: &[AsmType]) -> bool {
        if let Some(fixed) = &self.args {
            return fixed.len() == args.len()
                && fixed
                    .iter()
                    .zip(args)
                    .all(|(storage, actual)| actual.is_sub_type(storage.to_asm_type()));
        }

        let mut fixed = Vec::with_capacity(args.len());
        for &arg in args {
            let storage = if arg.is_double() {
                StorageType::Double
            } else if arg.is_float() {
                StorageType::Float
            } else if arg.is_int() {
                StorageType::Int
            } else if let Some(simd) = arg.as_simd() {
                StorageType::Simd(simd)
            } else {
                return false;
            };
            fixed.push(storage);
        }
        self.args = Some(fixed);
        true
    }

    /// Whether `other` can share a function table with this signature.
    ///
    /// Unfixed halves of `self` are fixed from `other`.
    pub fn unify(&mut self, other: &Signature) -> bool {
        let args_ok = match (&self.args, &other.args) {
            (Some(mine), Some(theirs)) => mine == theirs,
            (None, Some(theirs)) => {
                self.args = Some(theirs.clone());
                true
            }
            (_, None) => false,
        };
        let ret_ok = match (self.ret, other.ret) {
            (Some(mine), Some(theirs)) => mine == theirs,
            (None, Some(theirs)) => {
                self.ret = Some(theirs);
                true
            }
            (_, None) => false,
        };
        args_ok && ret_ok
    }

    /// Bytes of outgoing argument space a call needs.
    pub fn arg_byte_size(&self) -> Option<u32> {
        self.args
            .as_ref()
            .map(|args| args.iter().map(|arg| arg.arg_byte_size()).sum())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match &self.args {
            Some(args) => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
            }
            None => f.write_str("?")?,
        }
        f.write_str(") -> ")?;
        match self.ret {
            Some(ret) => write!(f, "{ret}"),
            None => f.write_str("?"),
        }
    }
}
