//! Ambient, line-oriented bytecode renderer.
//!
//! Used by tests and the CLI's `--disassemble` flag to inspect emitted
//! bytecode without a VM. Not a symbolic debugger: each instruction prints
//! as offset, line, mnemonic, and whatever operand(s) it carries.

use crate::chunk::{Chunk, OpCode};

pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", name));
    let mut offset = 0;
    while offset < chunk.code.len() {
        let (line, next) = disassemble_instruction(chunk, offset);
        out.push_str(&line);
        out.push('\n');
        offset = next;
    }
    out
}

/// Renders the instruction starting at `offset`, returning its text and the
/// offset of the next instruction.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> (String, usize) {
    let mut line = format!("{:04} ", offset);
    if offset > 0 && chunk.lines[offset] == chunk.lines[offset - 1] {
        line.push_str("   | ");
    } else {
        line.push_str(&format!("{:4} ", chunk.lines[offset]));
    }

    let byte = chunk.code[offset];
    let Some(op) = OpCode::from_byte(byte) else {
        line.push_str(&format!("unknown opcode {}", byte));
        return (line, offset + 1);
    };

    match op {
        OpCode::Return => simple(&mut line, "OP_RETURN", offset),
        OpCode::Nil => simple(&mut line, "OP_NIL", offset),
        OpCode::True => simple(&mut line, "OP_TRUE", offset),
        OpCode::False => simple(&mut line, "OP_FALSE", offset),
        OpCode::Negate => simple(&mut line, "OP_NEGATE", offset),
        OpCode::Not => simple(&mut line, "OP_NOT", offset),
        OpCode::Add => simple(&mut line, "OP_ADD", offset),
        OpCode::Subtract => simple(&mut line, "OP_SUBTRACT", offset),
        OpCode::Multiply => simple(&mut line, "OP_MULTIPLY", offset),
        OpCode::Divide => simple(&mut line, "OP_DIVIDE", offset),
        OpCode::Equal => simple(&mut line, "OP_EQUAL", offset),
        OpCode::Greater => simple(&mut line, "OP_GREATER", offset),
        OpCode::Less => simple(&mut line, "OP_LESS", offset),
        OpCode::Print => simple(&mut line, "OP_PRINT", offset),
        OpCode::Pop => simple(&mut line, "OP_POP", offset),
        OpCode::Constant => constant(chunk, &mut line, "OP_CONSTANT", offset),
        OpCode::DefineGlobal => constant(chunk, &mut line, "OP_DEFINE_GLOBAL", offset),
        OpCode::GetGlobal => constant(chunk, &mut line, "OP_GET_GLOBAL", offset),
        OpCode::SetGlobal => constant(chunk, &mut line, "OP_SET_GLOBAL", offset),
        OpCode::GetLocal => byte_operand(chunk, &mut line, "OP_GET_LOCAL", offset),
        OpCode::SetLocal => byte_operand(chunk, &mut line, "OP_SET_LOCAL", offset),
        OpCode::Jump => jump(chunk, &mut line, "OP_JUMP", offset, 1),
        OpCode::JumpIfFalse => jump(chunk, &mut line, "OP_JUMP_IF_FALSE", offset, 1),
        OpCode::Loop => jump(chunk, &mut line, "OP_LOOP", offset, -1),
    }
}

fn simple(line: &mut String, name: &str, offset: usize) -> (String, usize) {
    line.push_str(name);
    (line.clone(), offset + 1)
}

fn constant(chunk: &Chunk, line: &mut String, name: &str, offset: usize) -> (String, usize) {
    let index = chunk.code[offset + 1];
    let value = chunk
        .constants
        .values
        .get(index as usize)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    line.push_str(&format!("{:-16} {:4} '{}'", name, index, value));
    (line.clone(), offset + 2)
}

fn byte_operand(chunk: &Chunk, line: &mut String, name: &str, offset: usize) -> (String, usize) {
    let slot = chunk.code[offset + 1];
    line.push_str(&format!("{:-16} {:4}", name, slot));
    (line.clone(), offset + 2)
}

fn jump(chunk: &Chunk, line: &mut String, name: &str, offset: usize, sign: i32) -> (String, usize) {
    let hi = chunk.code[offset + 1] as u16;
    let lo = chunk.code[offset + 2] as u16;
    let jump = (hi << 8) | lo;
    let target = if sign < 0 {
        (offset as isize + 3 - jump as isize) as usize
    } else {
        (offset as isize + 3 + jump as isize) as usize
    };
    line.push_str(&format!("{:-16} {:4} -> {}", name, offset, target));
    (line.clone(), offset + 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn renders_a_constant_instruction() {
        let mut chunk = Chunk::new();
        let idx = chunk.add_constant(Value::Number(1.2)).unwrap();
        chunk.write_op(OpCode::Constant, 123);
        chunk.write(idx, 123);
        chunk.write_op(OpCode::Return, 123);

        let text = disassemble_chunk(&chunk, "test");
        assert!(text.contains("OP_CONSTANT"));
        assert!(text.contains("1.2"));
        assert!(text.contains("OP_RETURN"));
    }

    #[test]
    fn repeated_lines_collapse_to_a_pipe() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Nil, 5);
        chunk.write_op(OpCode::Return, 5);
        let text = disassemble_chunk(&chunk, "test");
        assert!(text.contains("   | "));
    }
}
