//! Human-readable listings of compiled code.
//!
//! `Display` for [`BytecodeChunk`] prints one instruction per line as
//! `offset  NAME  operands`. [`CompiledFunction`] adds a signature header,
//! register counts and the constant tables, and [`CompiledModule`] lists
//! every function followed by its tables and exports.

use std::fmt::{self, Write};

use crate::bytecode::BytecodeChunk;
use crate::output::{CompiledFunction, CompiledModule, ConstantPools, Exports};
use crate::registers::RegisterCounts;
use crate::types::StorageType;

impl fmt::Display for BytecodeChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in self.instructions() {
            write!(f, "    {:04x}  {:<22}", instruction.offset, instruction.op.name())?;
            let mut operands = instruction.operands.iter();
            if let Some(first) = operands.next() {
                write!(f, " {first}")?;
                for operand in operands {
                    write!(f, ", {operand}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.info;
        let args = info
            .args
            .iter()
            .enumerate()
            .map(|(index, storage)| annotated_arg(index, *storage))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            f,
            "{} ({args}) -> {} (size: {} words)",
            self.name,
            info.ret,
            self.chunk.len()
        )?;

        let registers = &info.registers;
        write_counts(f, "int", registers.int)?;
        write_counts(f, "float", registers.float)?;
        write_counts(f, "double", registers.double)?;
        write_counts(f, "simd", registers.simd)?;
        if info.arg_out_depth > 0 {
            writeln!(f, "    arg out depth: {}", info.arg_out_depth)?;
        }

        write_constants(f, &info.constants)?;
        write!(f, "{}", self.chunk)
    }
}

impl fmt::Display for CompiledModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, function) in self.functions.iter().enumerate() {
            write!(f, "[{index}] {function}")?;
            writeln!(f)?;
        }

        for table in &self.tables {
            let entries = table
                .functions
                .iter()
                .map(|index| self.function_name(*index))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "table {}[{}] = [{entries}]", table.name, table.size)?;
        }

        match &self.exports {
            Exports::Single(index) => writeln!(f, "export {}", self.function_name(*index)),
            Exports::Named(exports) => {
                for export in exports {
                    writeln!(
                        f,
                        "export {}: {}",
                        export.name,
                        self.function_name(export.function)
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl CompiledModule {
    fn function_name(&self, index: u32) -> &str {
        self.functions
            .get(index as usize)
            .map_or("?", |function| function.name.as_str())
    }
}

/// Parameter `index` written in its annotation form.
fn annotated_arg(index: usize, storage: StorageType) -> String {
    match storage {
        StorageType::Int => format!("In{index}|0"),
        StorageType::Double => format!("+In{index}"),
        StorageType::Float => format!("fround(In{index})"),
        StorageType::Simd(ty) => format!("{}(In{index})", ty.name()),
    }
}

fn write_counts(f: &mut fmt::Formatter<'_>, class: &str, counts: RegisterCounts) -> fmt::Result {
    if counts.total() == 0 {
        return Ok(());
    }
    writeln!(
        f,
        "    {class:<6} const {} var {} tmp {}",
        counts.const_count, counts.var_count, counts.tmp_count
    )
}

fn write_constants(f: &mut fmt::Formatter<'_>, pools: &ConstantPools) -> fmt::Result {
    write_pool(f, "Int", "I", pools.int.iter().map(i32::to_string))?;
    write_pool(f, "Float", "F", pools.float.iter().map(|value| format!("{value:.4}")))?;
    write_pool(f, "Double", "D", pools.double.iter().map(|value| format!("{value:.4}")))?;
    write_pool(
        f,
        "Simd",
        "S",
        pools.simd.iter().map(|bits| {
            let mut text = String::new();
            for (lane, word) in bits.0.iter().enumerate() {
                if lane > 0 {
                    text.push(' ');
                }
                let _ = write!(text, "{word:08x}");
            }
            text
        }),
    )
}

fn write_pool(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    prefix: &str,
    values: impl ExactSizeIterator<Item = String>,
) -> fmt::Result {
    if values.len() == 0 {
        return Ok(());
    }
    writeln!(f, "    Constant {title}:")?;
    for (index, value) in values.enumerate() {
        writeln!(f, "      {prefix}{index} = {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{compile_body, compile_source};

    #[test]
    fn chunk_lists_one_instruction_per_line() {
        let module = compile_body("function f(i) { i = i|0; return (i + 7)|0; }");
        let chunk = &module.functions[0].chunk;
        let listing = chunk.to_string();
        assert_eq!(listing.lines().count(), chunk.instructions().count());
        assert!(listing.contains("ADD_INT"));
        assert!(listing.lines().all(|line| line.starts_with("    ")));
    }

    #[test]
    fn function_header_and_constants() {
        let module = compile_body("function f(i, x) { i = i|0; x = +x; return +(x * 2.5); }");
        let listing = module.functions[0].to_string();
        let header = listing.lines().next().unwrap();
        assert_eq!(header.split(" (size").next(), Some("f (In0|0, +In1) -> double"));
        assert!(listing.contains("Constant Double:"));
        assert!(listing.contains("= 2.5000"));
    }

    #[test]
    fn module_lists_tables_and_exports() {
        let module = compile_source(
            r#"function M() {
                "use asm";
                function a(x) { x = x|0; return x|0; }
                function b(x) { x = x|0; return (x + 1)|0; }
                function f(i) { i = i|0; return t[i & 1](i)|0; }
                var t = [a, b];
                return { run: f };
            }"#,
        );
        let listing = module.to_string();
        assert!(listing.contains("[0] a (In0|0) -> signed"));
        assert!(listing.contains("table t[2] = [a, b]"));
        assert!(listing.contains("export run: f"));
        assert!(listing.contains("LD_ARR_FUNC"));
    }
}
