//! Typed opcodes.
//!
//! Every instruction is encoded as a header word followed by its operands:
//!
//! ```text
//! header  = (opcode << 16) | operand_count
//! operand = u32 (register index, slot, immediate, label target, ...)
//! ```
//!
//! Register operands index the register space implied by the opcode (`Int`
//! opcodes read int registers, `Db` opcodes double registers, and so on).
//! Operands named `ty` carry a [`SimdType`](crate::types::SimdType)
//! discriminant and `view` a [`ViewKind`](crate::builtins::ViewKind)
//! discriminant. Branch targets are absolute word offsets into the chunk.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// asm.js opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum OpCode {
    // =========================================================================
    // Moves
    // =========================================================================
    /// No operation.
    Nop = 0,
    /// `dst, imm`
    LdIntConst,
    /// `dst, src`
    LdInt,
    /// `dst, src`
    LdFlt,
    /// `dst, src`
    LdDb,
    /// `ty, dst, src`
    Simd128Ld,

    // =========================================================================
    // Module slots
    // =========================================================================
    /// `dst, slot`
    LdSlotInt,
    /// `dst, slot`
    LdSlotFlt,
    /// `dst, slot`
    LdSlotDb,
    /// `ty, dst, slot`
    Simd128LdSlot,
    /// `slot, src`
    StSlotInt,
    /// `slot, src`
    StSlotFlt,
    /// `slot, src`
    StSlotDb,
    /// `ty, slot, src`
    Simd128StSlot,

    // =========================================================================
    // Callee loads
    // =========================================================================
    /// Load a module function as the pending callee.
    /// `function`
    LdFunc,
    /// Load a foreign import as the pending callee.
    /// `import`
    LdImport,
    /// Load a function-pointer table entry as the pending callee.
    /// `table, index`
    LdArrFunc,

    // =========================================================================
    // Heap access
    // =========================================================================
    /// `view, dst, addr_reg`
    LdArr,
    /// `view, dst, addr`
    LdArrConst,
    /// `view, src, addr_reg`
    StArr,
    /// `view, src, addr`
    StArrConst,
    /// `ty, dst, addr_reg, view, width`
    Simd128LdArr,
    /// `ty, dst, addr, view, width`
    Simd128LdArrConst,
    /// `ty, src, addr_reg, view, width`
    Simd128StArr,
    /// `ty, src, addr, view, width`
    Simd128StArrConst,

    // =========================================================================
    // Conversions (dst, src)
    // =========================================================================
    /// double to signed
    ConvDTI,
    /// float to signed
    ConvFTI,
    /// signed to double
    ConvITD,
    /// unsigned to double
    ConvUTD,
    /// float to double
    ConvFTD,
    /// int to 0 or 1
    ConvITB,
    /// double to float
    FroundDb,
    /// int to float
    FroundInt,
    /// floatish to float
    FroundFlt,

    // =========================================================================
    // Arithmetic (dst, lhs, rhs)
    // =========================================================================
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    RemInt,
    DivUInt,
    RemUInt,
    AddDb,
    SubDb,
    MulDb,
    DivDb,
    RemDb,
    AddFlt,
    SubFlt,
    MulFlt,
    DivFlt,

    // =========================================================================
    // Unary (dst, src)
    // =========================================================================
    NegInt,
    NegDb,
    NegFlt,
    /// `~`
    NotInt,
    /// `!`
    LogNotInt,

    // =========================================================================
    // Bitwise (dst, lhs, rhs)
    // =========================================================================
    OrInt,
    AndInt,
    XorInt,
    ShlInt,
    ShrInt,
    ShrUInt,

    // =========================================================================
    // Comparisons (dst, lhs, rhs); the result is an int register
    // =========================================================================
    CmEqInt,
    CmNeInt,
    CmLtInt,
    CmLeInt,
    CmGtInt,
    CmGeInt,
    CmLtUInt,
    CmLeUInt,
    CmGtUInt,
    CmGeUInt,
    CmEqDb,
    CmNeDb,
    CmLtDb,
    CmLeDb,
    CmGtDb,
    CmGeDb,
    CmEqFlt,
    CmNeFlt,
    CmLtFlt,
    CmLeFlt,
    CmGtFlt,
    CmGeFlt,

    // =========================================================================
    // Math builtins
    // =========================================================================
    SinDb,
    CosDb,
    TanDb,
    AsinDb,
    AcosDb,
    AtanDb,
    CeilDb,
    FloorDb,
    ExpDb,
    LogDb,
    SqrtDb,
    AbsDb,
    PowDb,
    Atan2Db,
    MinDb,
    MaxDb,
    AbsInt,
    Clz32Int,
    MinInt,
    MaxInt,
    ImulInt,
    AbsFlt,
    CeilFlt,
    FloorFlt,
    SqrtFlt,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// `target`
    Br,
    /// `cond, target`
    BrTrueInt,
    /// `dst, src`
    BeginSwitchInt,
    /// `scrutinee, value, target`
    CaseInt,
    /// `target`
    EndSwitchInt,
    /// Function epilogue.
    Ret,

    // =========================================================================
    // Returns
    // =========================================================================
    /// `src`
    ReturnInt,
    /// `src`
    ReturnDb,
    /// `src`
    ReturnFlt,
    /// `ty, src`
    Simd128Return,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Reserve outgoing argument space.
    /// `bytes`
    StartCall,
    /// Foreign argument. `slot, src`
    ArgOutInt,
    /// Foreign argument. `slot, src`
    ArgOutDb,
    /// Internal argument. `slot, src`
    IArgOutInt,
    /// Internal argument. `slot, src`
    IArgOutDb,
    /// Internal argument. `slot, src`
    IArgOutFlt,
    /// Internal argument. `ty, slot, src`
    Simd128IArgOut,
    /// Call the pending foreign callee. `argc`
    Call,
    /// Call the pending module callee. `argc`
    ICall,
    /// Foreign result to signed. `dst`
    ConvVTI,
    /// Foreign result to double. `dst`
    ConvVTD,
    /// `dst`
    IConvVTI,
    /// `dst`
    IConvVTD,
    /// `dst`
    IConvVTF,
    /// `ty, dst`
    Simd128IConvVT,

    // =========================================================================
    // SIMD
    // =========================================================================
    /// `builtin, ty, dst, args...`
    ///
    /// `dst` lives in the register space of the builtin's return type.
    Simd128Op,
}

impl OpCode {
    /// Decode an opcode from the upper half of a header word.
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Number of operands, `None` for variadic instructions.
    pub fn operand_count(&self) -> Option<usize> {
        use OpCode::*;
        Some(match self {
            Nop | Ret => 0,

            LdFunc | LdImport | Br | EndSwitchInt | ReturnInt | ReturnDb | ReturnFlt
            | StartCall | Call | ICall | ConvVTI | ConvVTD | IConvVTI | IConvVTD | IConvVTF => 1,

            LdIntConst | LdInt | LdFlt | LdDb | LdSlotInt | LdSlotFlt | LdSlotDb | StSlotInt
            | StSlotFlt | StSlotDb | LdArrFunc | BrTrueInt | BeginSwitchInt | Simd128Return
            | ArgOutInt | ArgOutDb | IArgOutInt | IArgOutDb | IArgOutFlt | Simd128IConvVT => 2,

            ConvDTI | ConvFTI | ConvITD | ConvUTD | ConvFTD | ConvITB | FroundDb | FroundInt
            | FroundFlt | NegInt | NegDb | NegFlt | NotInt | LogNotInt => 2,

            SinDb | CosDb | TanDb | AsinDb | AcosDb | AtanDb | CeilDb | FloorDb | ExpDb | LogDb
            | SqrtDb | AbsDb | AbsInt | Clz32Int | AbsFlt | CeilFlt | FloorFlt | SqrtFlt => 2,

            Simd128Ld | Simd128LdSlot | Simd128StSlot | LdArr | LdArrConst | StArr
            | StArrConst | CaseInt | Simd128IArgOut => 3,

            AddInt | SubInt | MulInt | DivInt | RemInt | DivUInt | RemUInt | AddDb | SubDb
            | MulDb | DivDb | RemDb | AddFlt | SubFlt | MulFlt | DivFlt | OrInt | AndInt
            | XorInt | ShlInt | ShrInt | ShrUInt => 3,

            CmEqInt | CmNeInt | CmLtInt | CmLeInt | CmGtInt | CmGeInt | CmLtUInt | CmLeUInt
            | CmGtUInt | CmGeUInt | CmEqDb | CmNeDb | CmLtDb | CmLeDb | CmGtDb | CmGeDb
            | CmEqFlt | CmNeFlt | CmLtFlt | CmLeFlt | CmGtFlt | CmGeFlt => 3,

            PowDb | Atan2Db | MinDb | MaxDb | MinInt | MaxInt | ImulInt => 3,

            Simd128LdArr | Simd128LdArrConst | Simd128StArr | Simd128StArrConst => 5,

            Simd128Op => return None,
        })
    }

    /// Operand positions holding branch targets.
    pub fn label_operand(&self) -> Option<usize> {
        match self {
            OpCode::Br | OpCode::EndSwitchInt => Some(0),
            OpCode::BrTrueInt => Some(1),
            OpCode::CaseInt => Some(2),
            _ => None,
        }
    }

    /// Human-readable instruction name.
    pub fn name(&self) -> &'static str {
        use OpCode::*;
        match self {
            Nop => "NOP",
            LdIntConst => "LD_INT_CONST",
            LdInt => "LD_INT",
            LdFlt => "LD_FLT",
            LdDb => "LD_DB",
            Simd128Ld => "SIMD128_LD",
            LdSlotInt => "LD_SLOT_INT",
            LdSlotFlt => "LD_SLOT_FLT",
            LdSlotDb => "LD_SLOT_DB",
            Simd128LdSlot => "SIMD128_LD_SLOT",
            StSlotInt => "ST_SLOT_INT",
            StSlotFlt => "ST_SLOT_FLT",
            StSlotDb => "ST_SLOT_DB",
            Simd128StSlot => "SIMD128_ST_SLOT",
            LdFunc => "LD_FUNC",
            LdImport => "LD_IMPORT",
            LdArrFunc => "LD_ARR_FUNC",
            LdArr => "LD_ARR",
            LdArrConst => "LD_ARR_CONST",
            StArr => "ST_ARR",
            StArrConst => "ST_ARR_CONST",
            Simd128LdArr => "SIMD128_LD_ARR",
            Simd128LdArrConst => "SIMD128_LD_ARR_CONST",
            Simd128StArr => "SIMD128_ST_ARR",
            Simd128StArrConst => "SIMD128_ST_ARR_CONST",
            ConvDTI => "CONV_DTI",
            ConvFTI => "CONV_FTI",
            ConvITD => "CONV_ITD",
            ConvUTD => "CONV_UTD",
            ConvFTD => "CONV_FTD",
            ConvITB => "CONV_ITB",
            FroundDb => "FROUND_DB",
            FroundInt => "FROUND_INT",
            FroundFlt => "FROUND_FLT",
            AddInt => "ADD_INT",
            SubInt => "SUB_INT",
            MulInt => "MUL_INT",
            DivInt => "DIV_INT",
            RemInt => "REM_INT",
            DivUInt => "DIV_UINT",
            RemUInt => "REM_UINT",
            AddDb => "ADD_DB",
            SubDb => "SUB_DB",
            MulDb => "MUL_DB",
            DivDb => "DIV_DB",
            RemDb => "REM_DB",
            AddFlt => "ADD_FLT",
            SubFlt => "SUB_FLT",
            MulFlt => "MUL_FLT",
            DivFlt => "DIV_FLT",
            NegInt => "NEG_INT",
            NegDb => "NEG_DB",
            NegFlt => "NEG_FLT",
            NotInt => "NOT_INT",
            LogNotInt => "LOG_NOT_INT",
            OrInt => "OR_INT",
            AndInt => "AND_INT",
            XorInt => "XOR_INT",
            ShlInt => "SHL_INT",
            ShrInt => "SHR_INT",
            ShrUInt => "SHR_UINT",
            CmEqInt => "CM_EQ_INT",
            CmNeInt => "CM_NE_INT",
            CmLtInt => "CM_LT_INT",
            CmLeInt => "CM_LE_INT",
            CmGtInt => "CM_GT_INT",
            CmGeInt => "CM_GE_INT",
            CmLtUInt => "CM_LT_UINT",
            CmLeUInt => "CM_LE_UINT",
            CmGtUInt => "CM_GT_UINT",
            CmGeUInt => "CM_GE_UINT",
            CmEqDb => "CM_EQ_DB",
            CmNeDb => "CM_NE_DB",
            CmLtDb => "CM_LT_DB",
            CmLeDb => "CM_LE_DB",
            CmGtDb => "CM_GT_DB",
            CmGeDb => "CM_GE_DB",
            CmEqFlt => "CM_EQ_FLT",
            CmNeFlt => "CM_NE_FLT",
            CmLtFlt => "CM_LT_FLT",
            CmLeFlt => "CM_LE_FLT",
            CmGtFlt => "CM_GT_FLT",
            CmGeFlt => "CM_GE_FLT",
            SinDb => "SIN_DB",
            CosDb => "COS_DB",
            TanDb => "TAN_DB",
            AsinDb => "ASIN_DB",
            AcosDb => "ACOS_DB",
            AtanDb => "ATAN_DB",
            CeilDb => "CEIL_DB",
            FloorDb => "FLOOR_DB",
            ExpDb => "EXP_DB",
            LogDb => "LOG_DB",
            SqrtDb => "SQRT_DB",
            AbsDb => "ABS_DB",
            PowDb => "POW_DB",
            Atan2Db => "ATAN2_DB",
            MinDb => "MIN_DB",
            MaxDb => "MAX_DB",
            AbsInt => "ABS_INT",
            Clz32Int => "CLZ32_INT",
            MinInt => "MIN_INT",
            MaxInt => "MAX_INT",
            ImulInt => "IMUL_INT",
            AbsFlt => "ABS_FLT",
            CeilFlt => "CEIL_FLT",
            FloorFlt => "FLOOR_FLT",
            SqrtFlt => "SQRT_FLT",
            Br => "BR",
            BrTrueInt => "BR_TRUE_INT",
            BeginSwitchInt => "BEGIN_SWITCH_INT",
            CaseInt => "CASE_INT",
            EndSwitchInt => "END_SWITCH_INT",
            Ret => "RET",
            ReturnInt => "RETURN_INT",
            ReturnDb => "RETURN_DB",
            ReturnFlt => "RETURN_FLT",
            Simd128Return => "SIMD128_RETURN",
            StartCall => "START_CALL",
            ArgOutInt => "ARG_OUT_INT",
            ArgOutDb => "ARG_OUT_DB",
            IArgOutInt => "I_ARG_OUT_INT",
            IArgOutDb => "I_ARG_OUT_DB",
            IArgOutFlt => "I_ARG_OUT_FLT",
            Simd128IArgOut => "SIMD128_I_ARG_OUT",
            Call => "CALL",
            ICall => "I_CALL",
            ConvVTI => "CONV_VTI",
            ConvVTD => "CONV_VTD",
            IConvVTI => "I_CONV_VTI",
            IConvVTD => "I_CONV_VTD",
            IConvVTF => "I_CONV_VTF",
            Simd128IConvVT => "SIMD128_I_CONV_VT",
            Simd128Op => "SIMD128_OP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(u16::from(OpCode::Nop), 0);
        assert_eq!(u16::from(OpCode::LdIntConst), 1);
    }

    #[test]
    fn opcode_from_u16() {
        assert_eq!(OpCode::from_u16(0), Some(OpCode::Nop));
        assert_eq!(OpCode::from_u16(1), Some(OpCode::LdIntConst));
        assert_eq!(OpCode::from_u16(u16::MAX), None);

        let last = u16::from(OpCode::Simd128Op);
        assert_eq!(OpCode::from_u16(last), Some(OpCode::Simd128Op));
        assert_eq!(OpCode::from_u16(last + 1), None);
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::LdArrConst.name(), "LD_ARR_CONST");
        assert_eq!(OpCode::FroundDb.name(), "FROUND_DB");
        assert_eq!(OpCode::BrTrueInt.name(), "BR_TRUE_INT");
    }

    #[test]
    fn operand_counts() {
        assert_eq!(OpCode::Ret.operand_count(), Some(0));
        assert_eq!(OpCode::Br.operand_count(), Some(1));
        assert_eq!(OpCode::LdInt.operand_count(), Some(2));
        assert_eq!(OpCode::AddDb.operand_count(), Some(3));
        assert_eq!(OpCode::LdArr.operand_count(), Some(3));
        assert_eq!(OpCode::Simd128LdArrConst.operand_count(), Some(5));
        assert_eq!(OpCode::Simd128Op.operand_count(), None);
    }

    #[test]
    fn label_operands() {
        assert_eq!(OpCode::Br.label_operand(), Some(0));
        assert_eq!(OpCode::BrTrueInt.label_operand(), Some(1));
        assert_eq!(OpCode::CaseInt.label_operand(), Some(2));
        assert_eq!(OpCode::AddInt.label_operand(), None);
    }
}
