//! Single-pass Pratt parser: walks the token stream once and emits bytecode
//! directly into the caller's `Chunk`, interning string literals and
//! identifier names into the caller's `Heap` as it goes.

use crate::chunk::{Chunk, OpCode};
use crate::config::CompilerOptions;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::disassembler::disassemble_chunk;
use crate::heap::Heap;
use crate::scanner::{Scanner, Token, TokenType};
use crate::value::Value;

const MAX_LOCALS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Precedence {
        use Precedence::*;
        match self {
            None => Assignment,
            Assignment => Or,
            Or => And,
            And => Equality,
            Equality => Comparison,
            Comparison => Term,
            Term => Factor,
            Factor => Unary,
            Unary => Call,
            Call => Primary,
            Primary => Primary,
        }
    }
}

type ParseFn = for<'a> fn(&mut Compiler<'a>, bool);

struct ParseRule {
    prefix: Option<ParseFn>,
    infix: Option<ParseFn>,
    precedence: Precedence,
}

fn get_rule(token_type: TokenType) -> ParseRule {
    use TokenType::*;
    match token_type {
        LeftParen => ParseRule {
            prefix: Some(grouping),
            infix: None,
            precedence: Precedence::None,
        },
        Minus => ParseRule {
            prefix: Some(unary),
            infix: Some(binary),
            precedence: Precedence::Term,
        },
        Plus => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Term,
        },
        Slash | Star => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Factor,
        },
        Bang => ParseRule {
            prefix: Some(unary),
            infix: None,
            precedence: Precedence::None,
        },
        BangEqual | EqualEqual => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Equality,
        },
        Greater | GreaterEqual | Less | LessEqual => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Comparison,
        },
        And => ParseRule {
            prefix: None,
            infix: Some(and_),
            precedence: Precedence::And,
        },
        Or => ParseRule {
            prefix: None,
            infix: Some(or_),
            precedence: Precedence::Or,
        },
        Number => ParseRule {
            prefix: Some(number),
            infix: None,
            precedence: Precedence::None,
        },
        TokenType::String => ParseRule {
            prefix: Some(string),
            infix: None,
            precedence: Precedence::None,
        },
        Identifier => ParseRule {
            prefix: Some(variable),
            infix: None,
            precedence: Precedence::None,
        },
        False | True | Nil => ParseRule {
            prefix: Some(literal),
            infix: None,
            precedence: Precedence::None,
        },
        _ => ParseRule {
            prefix: None,
            infix: None,
            precedence: Precedence::None,
        },
    }
}

struct Local<'a> {
    name: Token<'a>,
    depth: i32,
}

pub struct Compiler<'a> {
    scanner: Scanner<'a>,
    current: Token<'a>,
    previous: Token<'a>,
    had_error: bool,
    panic_mode: bool,
    locals: Vec<Local<'a>>,
    scope_depth: i32,
    chunk: &'a mut Chunk,
    heap: &'a mut Heap,
    diagnostics: Diagnostics,
}

/// Result of a single `compile` call: whether the chunk is safe to hand to
/// a VM, and every diagnostic produced along the way.
pub struct CompileOutcome {
    pub success: bool,
    pub diagnostics: Diagnostics,
}

/// Compiles `source` into `chunk`, interning any string/identifier
/// constants into `heap`. Returns `false` (with diagnostics populated) if
/// any lex, syntax, or semantic error was encountered; the chunk is still
/// fully emitted but is not meant to be executed.
pub fn compile(source: &str, chunk: &mut Chunk, heap: &mut Heap) -> CompileOutcome {
    let mut compiler = Compiler::new(source, chunk, heap);

    while !compiler.check(TokenType::Eof) {
        compiler.declaration();
    }
    compiler.emit_return();

    let success = !compiler.had_error;
    CompileOutcome {
        success,
        diagnostics: compiler.diagnostics,
    }
}

/// Same as [`compile`], but honors ambient [`CompilerOptions`]: on a
/// successful compile with `options.trace` set, the resulting chunk is
/// disassembled to stdout. Never affects the emitted bytecode.
pub fn compile_with_options(
    source: &str,
    chunk: &mut Chunk,
    heap: &mut Heap,
    options: &CompilerOptions,
) -> CompileOutcome {
    let outcome = compile(source, chunk, heap);
    if outcome.success && options.trace {
        print!("{}", disassemble_chunk(chunk, "script"));
    }
    outcome
}

impl<'a> Compiler<'a> {
    fn new(source: &'a str, chunk: &'a mut Chunk, heap: &'a mut Heap) -> Self {
        let scanner = Scanner::new(source);
        let placeholder = Token {
            token_type: TokenType::Error,
            lexeme: "",
            line: 0,
        };
        let mut compiler = Compiler {
            scanner,
            current: placeholder,
            previous: placeholder,
            had_error: false,
            panic_mode: false,
            locals: Vec::new(),
            scope_depth: 0,
            chunk,
            heap,
            diagnostics: Diagnostics::new(),
        };
        compiler.advance();
        compiler
    }

    // -- token-stream utilities ------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.token_type != TokenType::Error {
                break;
            }
            let message = self.current.error_message().to_string();
            self.error_at_current(&message);
        }
    }

    fn consume(&mut self, kind: TokenType, message: &str) {
        if self.current.token_type == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn check(&self, kind: TokenType) -> bool {
        self.current.token_type == kind
    }

    fn match_token(&mut self, kind: TokenType) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    // -- error reporting ---------------------------------------------------

    fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'a>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        let anchor = match token.token_type {
            TokenType::Eof => Some(" at end".to_string()),
            TokenType::Error => None,
            _ => Some(format!(" at '{}'", token.lexeme)),
        };
        self.diagnostics.push(Diagnostic {
            line: token.line,
            anchor,
            message: message.to_string(),
        });
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.token_type != TokenType::Eof {
            if self.previous.token_type == TokenType::Semicolon {
                return;
            }
            match self.current.token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // -- declarations and statements ---------------------------------------

    fn declaration(&mut self) {
        if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");

        if self.match_token(TokenType::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        );

        self.define_variable(global);
    }

    fn statement(&mut self) {
        if self.match_token(TokenType::Print) {
            self.print_statement();
        } else if self.match_token(TokenType::If) {
            self.if_statement();
        } else if self.match_token(TokenType::While) {
            self.while_statement();
        } else if self.match_token(TokenType::For) {
            self.for_statement();
        } else if self.match_token(TokenType::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn block(&mut self) {
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.declaration();
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.");
    }

    fn if_statement(&mut self) {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();

        let else_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(then_jump);
        self.emit_op(OpCode::Pop);

        if self.match_token(TokenType::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk.len();
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_op(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.");

        if self.match_token(TokenType::Semicolon) {
            // no initializer
        } else if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk.len();
        let mut exit_jump: Option<usize> = None;
        if !self.match_token(TokenType::Semicolon) {
            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit_op(OpCode::Pop);
        }

        if !self.match_token(TokenType::RightParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.chunk.len();
            self.expression();
            self.emit_op(OpCode::Pop);
            self.consume(TokenType::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_op(OpCode::Pop);
        }

        self.end_scope();
    }

    // -- expressions ---------------------------------------------------------

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix_rule) = get_rule(self.previous.token_type).prefix else {
            self.error("Expect expression.");
            return;
        };

        let can_assign = precedence <= Precedence::Assignment;
        prefix_rule(self, can_assign);

        while precedence <= get_rule(self.current.token_type).precedence {
            self.advance();
            let infix_rule = get_rule(self.previous.token_type)
                .infix
                .expect("a token admitted by the precedence loop always has an infix rule");
            infix_rule(self, can_assign);
        }

        if can_assign && self.match_token(TokenType::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    // -- variable resolution ---------------------------------------------

    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenType::Identifier, message);

        self.declare_variable();
        if self.scope_depth > 0 {
            return 0;
        }

        let name = self.previous;
        self.identifier_constant(name)
    }

    fn identifier_constant(&mut self, name: Token<'a>) -> u8 {
        let string_ref = self.heap.copy_string(name.lexeme);
        match self.chunk.add_constant(Value::Obj(string_ref)) {
            Ok(idx) => idx,
            Err(_) => {
                self.error("Too many constants in one chunk.");
                0
            }
        }
    }

    fn declare_variable(&mut self) {
        if self.scope_depth == 0 {
            return;
        }

        let name = self.previous;
        let mut i = self.locals.len();
        while i > 0 {
            i -= 1;
            let local = &self.locals[i];
            if local.depth != -1 && local.depth < self.scope_depth {
                break;
            }
            if name.lexeme == local.name.lexeme {
                self.error("Already a variable with this name in this scope.");
            }
        }

        self.add_local(name);
    }

    fn add_local(&mut self, name: Token<'a>) {
        if self.locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.locals.push(Local { name, depth: -1 });
    }

    fn resolve_local(&mut self, name: &Token<'a>) -> Option<u8> {
        for i in (0..self.locals.len()).rev() {
            let local = &self.locals[i];
            if local.name.lexeme == name.lexeme {
                if local.depth == -1 {
                    self.error("Cannot read local variable in its own initializer.");
                }
                return Some(i as u8);
            }
        }
        None
    }

    fn define_variable(&mut self, global: u8) {
        if self.scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_bytes(OpCode::DefineGlobal as u8, global);
    }

    fn mark_initialized(&mut self) {
        if let Some(local) = self.locals.last_mut() {
            local.depth = self.scope_depth;
        }
    }

    fn named_variable(&mut self, name: Token<'a>, can_assign: bool) {
        let (get_op, set_op, arg) = match self.resolve_local(&name) {
            Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
            None => {
                let idx = self.identifier_constant(name);
                (OpCode::GetGlobal, OpCode::SetGlobal, idx)
            }
        };

        if can_assign && self.match_token(TokenType::Equal) {
            self.expression();
            self.emit_bytes(set_op as u8, arg);
        } else {
            self.emit_bytes(get_op as u8, arg);
        }
    }

    // -- scope management ----------------------------------------------

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;
        while let Some(local) = self.locals.last() {
            if local.depth > self.scope_depth {
                self.emit_op(OpCode::Pop);
                self.locals.pop();
            } else {
                break;
            }
        }
    }

    // -- bytecode emission -------------------------------------------------

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk.write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op as u8);
    }

    fn emit_bytes(&mut self, a: u8, b: u8) {
        self.emit_byte(a);
        self.emit_byte(b);
    }

    fn emit_constant(&mut self, value: Value) {
        match self.chunk.add_constant(value) {
            Ok(idx) => self.emit_bytes(OpCode::Constant as u8, idx),
            Err(_) => self.error("Too many constants in one chunk."),
        }
    }

    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit_op(op);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.chunk.len() - 2
    }

    fn patch_jump(&mut self, offset: usize) {
        let jump = self.chunk.len() - offset - 2;
        if jump > u16::MAX as usize {
            self.error("Too much code to jump over.");
            return;
        }
        let jump = jump as u16;
        self.chunk.code[offset] = (jump >> 8) as u8;
        self.chunk.code[offset + 1] = (jump & 0xff) as u8;
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_op(OpCode::Loop);
        let offset = self.chunk.len() - loop_start + 2;
        if offset > u16::MAX as usize {
            self.error("Loop body too large.");
            return;
        }
        let offset = offset as u16;
        self.emit_byte((offset >> 8) as u8);
        self.emit_byte((offset & 0xff) as u8);
    }

    fn emit_return(&mut self) {
        self.emit_op(OpCode::Return);
    }
}

// -- Pratt rule bodies ---------------------------------------------------

fn grouping<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    compiler.expression();
    compiler.consume(TokenType::RightParen, "Expect ')' after expression.");
}

fn number<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let value: f64 = compiler
        .previous
        .lexeme
        .parse()
        .expect("scanner guarantees a well-formed number literal");
    compiler.emit_constant(Value::Number(value));
}

fn string<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let lexeme = compiler.previous.lexeme;
    let contents = &lexeme[1..lexeme.len() - 1];
    let string_ref = compiler.heap.copy_string(contents);
    compiler.emit_constant(Value::Obj(string_ref));
}

fn literal<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    match compiler.previous.token_type {
        TokenType::False => compiler.emit_op(OpCode::False),
        TokenType::Nil => compiler.emit_op(OpCode::Nil),
        TokenType::True => compiler.emit_op(OpCode::True),
        _ => unreachable!("literal() invoked for a non-literal token"),
    }
}

fn unary<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let operator_type = compiler.previous.token_type;
    compiler.parse_precedence(Precedence::Unary);
    match operator_type {
        TokenType::Minus => compiler.emit_op(OpCode::Negate),
        TokenType::Bang => compiler.emit_op(OpCode::Not),
        _ => unreachable!("unary() invoked for a non-unary operator"),
    }
}

fn binary<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let operator_type = compiler.previous.token_type;
    let rule = get_rule(operator_type);
    compiler.parse_precedence(rule.precedence.next());
    match operator_type {
        TokenType::Plus => compiler.emit_op(OpCode::Add),
        TokenType::Minus => compiler.emit_op(OpCode::Subtract),
        TokenType::Star => compiler.emit_op(OpCode::Multiply),
        TokenType::Slash => compiler.emit_op(OpCode::Divide),
        TokenType::EqualEqual => compiler.emit_op(OpCode::Equal),
        TokenType::BangEqual => {
            compiler.emit_op(OpCode::Equal);
            compiler.emit_op(OpCode::Not);
        }
        TokenType::Greater => compiler.emit_op(OpCode::Greater),
        TokenType::GreaterEqual => {
            compiler.emit_op(OpCode::Less);
            compiler.emit_op(OpCode::Not);
        }
        TokenType::Less => compiler.emit_op(OpCode::Less),
        TokenType::LessEqual => {
            compiler.emit_op(OpCode::Greater);
            compiler.emit_op(OpCode::Not);
        }
        _ => unreachable!("binary() invoked for a non-binary operator"),
    }
}

fn variable<'a>(compiler: &mut Compiler<'a>, can_assign: bool) {
    let name = compiler.previous;
    compiler.named_variable(name, can_assign);
}

fn and_<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let end_jump = compiler.emit_jump(OpCode::JumpIfFalse);
    compiler.emit_op(OpCode::Pop);
    compiler.parse_precedence(Precedence::And);
    compiler.patch_jump(end_jump);
}

fn or_<'a>(compiler: &mut Compiler<'a>, _can_assign: bool) {
    let else_jump = compiler.emit_jump(OpCode::JumpIfFalse);
    let end_jump = compiler.emit_jump(OpCode::Jump);

    compiler.patch_jump(else_jump);
    compiler.emit_op(OpCode::Pop);

    compiler.parse_precedence(Precedence::Or);
    compiler.patch_jump(end_jump);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(source: &str) -> (Chunk, Heap) {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let outcome = compile(source, &mut chunk, &mut heap);
        assert!(
            outcome.success,
            "expected a clean compile, got diagnostics: {:?}",
            outcome.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>()
        );
        (chunk, heap)
    }

    #[test]
    fn print_arithmetic_expression() {
        let (chunk, _heap) = compile_ok("print 1 + 2;");
        assert_eq!(
            chunk.code,
            vec![
                OpCode::Constant as u8,
                0,
                OpCode::Constant as u8,
                1,
                OpCode::Add as u8,
                OpCode::Print as u8,
                OpCode::Return as u8,
            ]
        );
    }

    #[test]
    fn global_variable_round_trips_through_the_same_interned_name() {
        let (chunk, _heap) = compile_ok("var x = 3; print x;");
        // Whichever pool slots the identifier "x" occupies, the define and
        // the later read must reference the same interned string object.
        let define_pos = chunk
            .code
            .iter()
            .position(|&b| b == OpCode::DefineGlobal as u8)
            .unwrap();
        let get_pos = chunk
            .code
            .iter()
            .position(|&b| b == OpCode::GetGlobal as u8)
            .unwrap();
        let define_idx = chunk.code[define_pos + 1] as usize;
        let get_idx = chunk.code[get_pos + 1] as usize;
        let define_name = chunk.constants.values[define_idx].as_string().unwrap();
        let get_name = chunk.constants.values[get_idx].as_string().unwrap();
        assert!(crate::heap::string_ref_eq(define_name, get_name));
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));
    }

    #[test]
    fn block_scoped_locals_use_get_local_and_pop_on_scope_exit() {
        let (chunk, _heap) = compile_ok("{ var x = 1; var y = x; print y; }");
        assert_eq!(
            chunk.code,
            vec![
                OpCode::Constant as u8,
                0, // x = 1
                OpCode::GetLocal as u8,
                0, // read x for y's initializer
                OpCode::GetLocal as u8,
                1, // read y for print
                OpCode::Print as u8,
                OpCode::Pop as u8, // end of scope: drop y
                OpCode::Pop as u8, // end of scope: drop x
                OpCode::Return as u8,
            ]
        );
    }

    #[test]
    fn if_else_emits_balanced_jumps() {
        let (chunk, _heap) = compile_ok("if (true) print 1; else print 2;");
        assert_eq!(chunk.code[0], OpCode::True as u8);
        assert_eq!(chunk.code[1], OpCode::JumpIfFalse as u8);
        assert!(chunk.code.contains(&(OpCode::Jump as u8)));
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));
    }

    #[test]
    fn global_reassignment_compiles_get_constant_add_set_pop() {
        let (chunk, _heap) = compile_ok("var x; x = x + 1;");
        assert!(chunk.code.contains(&(OpCode::GetGlobal as u8)));
        assert!(chunk.code.contains(&(OpCode::SetGlobal as u8)));
        assert!(chunk.code.contains(&(OpCode::Add as u8)));
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));
    }

    #[test]
    fn chained_assignment_is_an_invalid_assignment_target() {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let outcome = compile("var a; a = 1 = 2;", &mut chunk, &mut heap);
        assert!(!outcome.success);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.message == "Invalid assignment target."));
    }

    #[test]
    fn redeclaring_a_name_in_the_same_scope_is_an_error() {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let outcome = compile("{ var x = 1; var x = 2; }", &mut chunk, &mut heap);
        assert!(!outcome.success);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.message.contains("Already a variable")));
    }

    #[test]
    fn shadowing_in_a_nested_scope_is_allowed() {
        compile_ok("{ var x = 1; { var x = 2; } }");
    }

    #[test]
    fn reading_a_local_in_its_own_initializer_is_an_error() {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let outcome = compile("{ var x = x; }", &mut chunk, &mut heap);
        assert!(!outcome.success);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.message.contains("own initializer")));
    }

    #[test]
    fn final_byte_is_always_op_return_and_code_lines_stay_in_lockstep() {
        let (chunk, _heap) = compile_ok("print 1; print 2; var x = 3;");
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));
        assert_eq!(chunk.code.len(), chunk.lines.len());
    }

    #[test]
    fn equal_string_literals_intern_to_the_same_constant_identity() {
        let (chunk, _heap) = compile_ok(r#"print "hi" == "hi";"#);
        let a = chunk.constants.values[0].as_string().unwrap();
        let b = chunk.constants.values[1].as_string().unwrap();
        assert!(crate::heap::string_ref_eq(a, b));
    }

    #[test]
    fn while_loop_emits_a_backward_loop_instruction() {
        let (chunk, _heap) = compile_ok("while (true) print 1;");
        assert!(chunk.code.contains(&(OpCode::Loop as u8)));
    }

    #[test]
    fn trace_option_disassembles_without_changing_the_chunk() {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let options = CompilerOptions::new().with_trace(true);
        let outcome = compile_with_options("print 1;", &mut chunk, &mut heap, &options);
        assert!(outcome.success);
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));
    }

    #[test]
    fn diagnostic_format_matches_the_corrected_one_bracket_style() {
        let mut chunk = Chunk::new();
        let mut heap = Heap::new();
        let outcome = compile("print;", &mut chunk, &mut heap);
        assert!(!outcome.success);
        let first = outcome.diagnostics.iter().next().unwrap();
        let text = first.to_string();
        assert!(text.starts_with("[line 1] error"));
        assert!(!text.contains("]]"));
    }
}
