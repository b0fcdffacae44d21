//! Lexical scanner: turns a source byte buffer into a lazy stream of tokens.
//!
//! The scanner never looks ahead more than the single token it is asked to
//! produce, and it never fails: malformed input comes back as a `TOKEN_ERROR`
//! token whose slice *is* the diagnostic message.

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Special tokens
    Error,
    Eof,
}

/// A slice of the original source buffer plus its classification.
///
/// `lexeme` borrows from the `&str` the `Scanner` was built from; the caller
/// must keep that buffer alive for as long as it holds tokens.
#[derive(Debug, Clone, Copy)]
pub struct Token<'src> {
    pub token_type: TokenType,
    pub lexeme: &'src str,
    pub line: u32,
}

impl<'src> Token<'src> {
    /// The text an error token carries is itself the diagnostic message.
    pub fn error_message(&self) -> &'src str {
        debug_assert_eq!(self.token_type, TokenType::Error);
        self.lexeme
    }
}

pub struct Scanner<'src> {
    source: &'src [u8],
    /// Byte offset of the start of the token currently being scanned.
    start: usize,
    /// Byte offset of the scanner's read cursor.
    current: usize,
    line: u32,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Scanner {
            source: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make_token(TokenType::Eof);
        }

        let c = self.advance();

        if c.is_ascii_digit() {
            return self.number();
        }
        if is_alpha(c) {
            return self.identifier();
        }

        match c {
            b'(' => self.make_token(TokenType::LeftParen),
            b')' => self.make_token(TokenType::RightParen),
            b'{' => self.make_token(TokenType::LeftBrace),
            b'}' => self.make_token(TokenType::RightBrace),
            b';' => self.make_token(TokenType::Semicolon),
            b',' => self.make_token(TokenType::Comma),
            b'.' => self.make_token(TokenType::Dot),
            b'-' => self.make_token(TokenType::Minus),
            b'+' => self.make_token(TokenType::Plus),
            b'/' => self.make_token(TokenType::Slash),
            b'*' => self.make_token(TokenType::Star),
            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.make_token(kind)
            }
            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.make_token(kind)
            }
            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.make_token(kind)
            }
            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.make_token(kind)
            }
            b'"' => self.string(),
            _ => self.error_token("Unexpected character."),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source[self.current + 1]
        }
    }

    /// Consumes the next byte and returns true iff it matches `expected`.
    /// Leaves the cursor untouched otherwise.
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                b'\n' => {
                    self.line += 1;
                    self.advance();
                }
                b'/' => {
                    if self.peek_next() == b'/' {
                        while self.peek() != b'\n' && !self.is_at_end() {
                            self.advance();
                        }
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token<'src> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string.");
        }

        self.advance(); // closing quote
        self.make_token(TokenType::String)
    }

    fn number(&mut self) -> Token<'src> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.make_token(TokenType::Number)
    }

    fn identifier(&mut self) -> Token<'src> {
        while is_alpha(self.peek()) || self.peek().is_ascii_digit() {
            self.advance();
        }
        self.make_token(self.identifier_type())
    }

    /// Hand-rolled trie over the lexeme bytes, keyed on the first (and
    /// sometimes second) character; any byte mismatch falls through to a
    /// plain identifier.
    fn identifier_type(&self) -> TokenType {
        let lexeme = &self.source[self.start..self.current];
        match lexeme.first() {
            Some(b'a') => self.check_keyword(1, "nd", TokenType::And),
            Some(b'c') => self.check_keyword(1, "lass", TokenType::Class),
            Some(b'e') => self.check_keyword(1, "lse", TokenType::Else),
            Some(b'i') => self.check_keyword(1, "f", TokenType::If),
            Some(b'n') => self.check_keyword(1, "il", TokenType::Nil),
            Some(b'o') => self.check_keyword(1, "r", TokenType::Or),
            Some(b'p') => self.check_keyword(1, "rint", TokenType::Print),
            Some(b'r') => self.check_keyword(1, "eturn", TokenType::Return),
            Some(b's') => self.check_keyword(1, "uper", TokenType::Super),
            Some(b'v') => self.check_keyword(1, "ar", TokenType::Var),
            Some(b'w') => self.check_keyword(1, "hile", TokenType::While),
            Some(b'f') if lexeme.len() > 1 => match lexeme[1] {
                b'a' => self.check_keyword(2, "lse", TokenType::False),
                b'o' => self.check_keyword(2, "r", TokenType::For),
                b'u' => self.check_keyword(2, "n", TokenType::Fun),
                _ => TokenType::Identifier,
            },
            Some(b't') if lexeme.len() > 1 => match lexeme[1] {
                b'r' => self.check_keyword(2, "ue", TokenType::True),
                b'h' => self.check_keyword(2, "is", TokenType::This),
                _ => TokenType::Identifier,
            },
            _ => TokenType::Identifier,
        }
    }

    fn check_keyword(&self, start: usize, rest: &str, kind: TokenType) -> TokenType {
        let lexeme = &self.source[self.start..self.current];
        let expected_len = start + rest.len();
        if lexeme.len() == expected_len && &lexeme[start..] == rest.as_bytes() {
            kind
        } else {
            TokenType::Identifier
        }
    }

    fn make_token(&self, token_type: TokenType) -> Token<'src> {
        let bytes = &self.source[self.start..self.current];
        Token {
            token_type,
            // Lexemes are ASCII per the language's byte-addressed identifier
            // model, so this slice is always valid UTF-8.
            lexeme: std::str::from_utf8(bytes).expect("lexeme is ASCII"),
            line: self.line,
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token {
            token_type: TokenType::Error,
            lexeme: message,
            line: self.line,
        }
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<TokenType> {
        let mut scanner = Scanner::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = scanner.scan_token();
            let done = token.token_type == TokenType::Eof;
            kinds.push(token.token_type);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        let mut scanner = Scanner::new("  // a comment\n  1");
        let token = scanner.scan_token();
        assert_eq!(token.token_type, TokenType::Number);
        assert_eq!(token.line, 2);
    }

    #[test]
    fn numbers_require_a_digit_after_the_dot() {
        let mut scanner = Scanner::new("1.5 1.");
        let first = scanner.scan_token();
        assert_eq!(first.token_type, TokenType::Number);
        assert_eq!(first.lexeme, "1.5");

        let second = scanner.scan_token();
        assert_eq!(second.token_type, TokenType::Number);
        assert_eq!(second.lexeme, "1");
        let dot = scanner.scan_token();
        assert_eq!(dot.token_type, TokenType::Dot);
    }

    #[test]
    fn keywords_require_exact_match() {
        assert_eq!(
            scan_all("and andy class classy"),
            vec![
                TokenType::And,
                TokenType::Identifier,
                TokenType::Class,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(
            scan_all("!= ! == = <= < >= >"),
            vec![
                TokenType::BangEqual,
                TokenType::Bang,
                TokenType::EqualEqual,
                TokenType::Equal,
                TokenType::LessEqual,
                TokenType::Less,
                TokenType::GreaterEqual,
                TokenType::Greater,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn strings_track_newlines_and_strip_at_the_compiler_layer() {
        let mut scanner = Scanner::new("\"a\nb\" 1");
        let token = scanner.scan_token();
        assert_eq!(token.token_type, TokenType::String);
        assert_eq!(token.lexeme, "\"a\nb\"");
        let next = scanner.scan_token();
        assert_eq!(next.line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let mut scanner = Scanner::new("\"abc");
        let token = scanner.scan_token();
        assert_eq!(token.token_type, TokenType::Error);
        assert_eq!(token.error_message(), "Unterminated string.");
    }

    #[test]
    fn unexpected_byte_is_an_error_token() {
        let mut scanner = Scanner::new("$");
        let token = scanner.scan_token();
        assert_eq!(token.token_type, TokenType::Error);
        assert_eq!(token.error_message(), "Unexpected character.");
    }

    #[test]
    fn lexemes_round_trip_the_source() {
        let source = "var x = 1 + 2;\n";
        let mut scanner = Scanner::new(source);
        let mut rebuilt = String::new();
        let mut last_end = 0usize;
        loop {
            let token = scanner.scan_token();
            if token.token_type == TokenType::Eof {
                break;
            }
            rebuilt.push_str(&source[last_end..scanner.start]);
            rebuilt.push_str(token.lexeme);
            last_end = scanner.current;
        }
        rebuilt.push_str(&source[last_end..]);
        assert_eq!(rebuilt, source);
    }
}
