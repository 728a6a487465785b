//! Conform tokenizer - converts declaration text into a token stream
//!
//! Handles: keywords, identifiers, string literals (single or double
//! quoted), integer/float literals (optionally negative), and symbols
//! (braces, parentheses, brackets, `*`, `**`, `->`, `@`, ...).
//! Comments (//) are discarded.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - Complete error reporting: line:column for every error

/// Token types for declaration syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declaration keywords
    Contract,
    Type,

    // Member keywords
    Fn,
    Prop,
    Attr,
    Wraps,

    // Modifiers
    Static,
    Class,
    Async,
    Gen,

    // Literals
    StringLiteral(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    BooleanLiteral(bool),
    NoneLiteral,

    // Symbols
    LBrace,     // {
    RBrace,     // }
    LParen,     // (
    RParen,     // )
    LBracket,   // [
    RBracket,   // ]
    Colon,      // :
    Semicolon,  // ;
    Comma,      // ,
    Equals,     // =
    Dot,        // .
    Pipe,       // |
    At,         // @
    Star,       // *
    DoubleStar, // **
    Arrow,      // ->

    // Other
    Identifier(String),
    Eof,
}

impl Token {
    /// Source spelling of a keyword token, so keywords can double as names
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::Contract => Some("contract"),
            Token::Type => Some("type"),
            Token::Fn => Some("fn"),
            Token::Prop => Some("prop"),
            Token::Attr => Some("attr"),
            Token::Wraps => Some("wraps"),
            Token::Static => Some("static"),
            Token::Class => Some("class"),
            Token::Async => Some("async"),
            Token::Gen => Some("gen"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(text) = self.keyword_text() {
            return write!(f, "'{}'", text);
        }
        match self {
            Token::StringLiteral(s) => write!(f, "string \"{}\"", s),
            Token::IntegerLiteral(n) => write!(f, "integer {}", n),
            Token::FloatLiteral(n) => write!(f, "float {}", n),
            Token::BooleanLiteral(b) => write!(f, "boolean {}", b),
            Token::NoneLiteral => write!(f, "'None'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Equals => write!(f, "'='"),
            Token::Dot => write!(f, "'.'"),
            Token::Pipe => write!(f, "'|'"),
            Token::At => write!(f, "'@'"),
            Token::Star => write!(f, "'*'"),
            Token::DoubleStar => write!(f, "'**'"),
            Token::Arrow => write!(f, "'->'"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Eof => write!(f, "end of input"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Position in source text for error reporting
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Tokenizer for declaration source text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(&mut self) -> crate::Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    span: self.current_span(),
                });
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn single(&mut self, token: Token, span: Span) -> crate::Result<SpannedToken> {
        self.advance();
        Ok(SpannedToken { token, span })
    }

    fn double(&mut self, token: Token, span: Span) -> crate::Result<SpannedToken> {
        self.advance();
        self.advance();
        Ok(SpannedToken { token, span })
    }

    // ── Whitespace & Comments ──────────────────────────────

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            // Line comments: //
            if self.peek() == Some('/') && self.peek_ahead(1) == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self) -> crate::Result<SpannedToken> {
        let span = self.current_span();
        let Some(ch) = self.peek() else {
            return Ok(SpannedToken { token: Token::Eof, span });
        };

        match ch {
            '{' => self.single(Token::LBrace, span),
            '}' => self.single(Token::RBrace, span),
            '(' => self.single(Token::LParen, span),
            ')' => self.single(Token::RParen, span),
            '[' => self.single(Token::LBracket, span),
            ']' => self.single(Token::RBracket, span),
            ':' => self.single(Token::Colon, span),
            ';' => self.single(Token::Semicolon, span),
            ',' => self.single(Token::Comma, span),
            '=' => self.single(Token::Equals, span),
            '.' => self.single(Token::Dot, span),
            '|' => self.single(Token::Pipe, span),
            '@' => self.single(Token::At, span),
            '*' if self.peek_ahead(1) == Some('*') => self.double(Token::DoubleStar, span),
            '*' => self.single(Token::Star, span),
            '-' if self.peek_ahead(1) == Some('>') => self.double(Token::Arrow, span),
            '-' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(span),
            '"' | '\'' => self.read_string(ch, span),
            c if c.is_ascii_digit() => self.read_number(span),
            c if c.is_alphabetic() || c == '_' => self.read_identifier_or_keyword(span),
            _ => Err(crate::Error::ParseError(
                format!("Unexpected character '{}' at {}", ch, span)
            )),
        }
    }

    // ── String literals ────────────────────────────────────

    fn read_string(&mut self, quote: char, span: Span) -> crate::Result<SpannedToken> {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(crate::Error::ParseError(
                        format!("Unterminated string starting at {}", span)
                    ));
                }
                Some(c) if c == quote => break,
                Some('\\') => {
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('\'') => value.push('\''),
                        Some(c) => {
                            return Err(crate::Error::ParseError(
                                format!("Invalid escape sequence '\\{}' at {}", c, self.current_span())
                            ));
                        }
                        None => {
                            return Err(crate::Error::ParseError(
                                format!("Unterminated escape sequence at {}", self.current_span())
                            ));
                        }
                    }
                }
                Some(c) => value.push(c),
            }
        }

        Ok(SpannedToken {
            token: Token::StringLiteral(value),
            span,
        })
    }

    // ── Numbers ────────────────────────────────────────────

    fn read_number(&mut self, span: Span) -> crate::Result<SpannedToken> {
        let start = self.position;
        if self.peek() == Some('-') {
            self.advance();
        }

        let mut has_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !has_dot && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();

        if has_dot {
            let val: f64 = text.parse().map_err(|_| {
                crate::Error::ParseError(format!("Invalid float '{}' at {}", text, span))
            })?;
            Ok(SpannedToken {
                token: Token::FloatLiteral(val),
                span,
            })
        } else {
            let val: i64 = text.parse().map_err(|_| {
                crate::Error::ParseError(format!("Invalid integer '{}' at {}", text, span))
            })?;
            Ok(SpannedToken {
                token: Token::IntegerLiteral(val),
                span,
            })
        }
    }

    // ── Identifiers & Keywords ─────────────────────────────

    fn read_identifier_or_keyword(&mut self, span: Span) -> crate::Result<SpannedToken> {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();

        let token = match text.as_str() {
            "contract" => Token::Contract,
            "type" => Token::Type,

            "fn" => Token::Fn,
            "prop" => Token::Prop,
            "attr" => Token::Attr,
            "wraps" => Token::Wraps,

            "static" => Token::Static,
            "class" => Token::Class,
            "async" => Token::Async,
            "gen" => Token::Gen,

            "true" | "True" => Token::BooleanLiteral(true),
            "false" | "False" => Token::BooleanLiteral(false),
            "None" => Token::NoneLiteral,

            _ => Token::Identifier(text),
        };

        Ok(SpannedToken { token, span })
    }
}
