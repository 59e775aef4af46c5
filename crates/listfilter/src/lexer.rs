//! Lexer (tokenizer) for filter expressions.

use std::fmt;

use super::error::LexError;

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of whitespace. Never reaches the parser.
    Whitespace,
    /// `&&` or `||`.
    LogicalOp,
    /// One of `=`, `!=`, `>`, `>=`, `<`, `<=`, `~`, `!~`.
    ComparisonOp,
    /// One of `+`, `-`, `*`, `/`.
    ArithmeticOp,
    /// `(`, `)` or `:`.
    Punct,
    /// A single- or double-quoted string.
    String,
    /// A decimal number with optional fraction and exponent.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
    /// A bare name such as a field or modifier.
    Identifier,
    /// An `@name` macro reference.
    Macro,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LogicalOp => "logical operator",
            TokenKind::ComparisonOp => "comparison operator",
            TokenKind::ArithmeticOp => "arithmetic operator",
            TokenKind::Punct => "punctuation",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Bool => "bool",
            TokenKind::Null => "null",
            TokenKind::Identifier => "identifier",
            TokenKind::Macro => "macro",
        };
        f.write_str(name)
    }
}

/// A token with its raw text and position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The lexical class.
    pub kind: TokenKind,
    /// The exact source text, quotes included for strings.
    pub text: &'a str,
    /// The byte offset where the token starts (0-indexed).
    pub offset: usize,
}

impl Token<'_> {
    /// The byte offset one past the token's last byte.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Returns true if this token has the given kind and text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Two-character operators, tried before any single-character lookalike.
const TWO_CHAR_OPERATORS: [(&str, TokenKind); 6] = [
    ("&&", TokenKind::LogicalOp),
    ("||", TokenKind::LogicalOp),
    ("!=", TokenKind::ComparisonOp),
    (">=", TokenKind::ComparisonOp),
    ("<=", TokenKind::ComparisonOp),
    ("!~", TokenKind::ComparisonOp),
];

/// Lexer for tokenizing filter expressions.
///
/// The lexer is lazy: it implements [`Iterator`] and yields one token (or the
/// first error) at a time, whitespace included. Use [`Lexer::tokenize`] for
/// the whitespace-free token stream the parser consumes.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
    /// Set once an error has been yielded; the lexer stops afterwards.
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            failed: false,
        }
    }

    /// The unconsumed remainder of the input.
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peeks `n` characters ahead (0 is the next character).
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Consumes the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate holds.
    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.next_char();
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.input[start..self.position],
            offset: start,
        }
    }

    /// Reads a quoted string; the closing quote must appear before end of input.
    fn read_quoted_string(&mut self, quote_char: char, start: usize) -> Result<Token<'a>, LexError> {
        // Consume the opening quote
        self.next_char();

        while let Some(c) = self.next_char() {
            if c == quote_char {
                return Ok(self.token(TokenKind::String, start));
            }
        }

        Err(LexError {
            offset: start,
            character: quote_char,
        })
    }

    /// Reads `[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    fn read_number(&mut self, start: usize) -> Token<'a> {
        self.eat_while(|c| c.is_ascii_digit());

        // The fraction and exponent are only taken when digits follow them.
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
            self.eat_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let digits_at = match self.peek_nth(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_nth(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    self.next_char();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        self.token(TokenKind::Number, start)
    }

    /// Reads an identifier and classifies the keywords `true`, `false` and `null`.
    fn read_word(&mut self, start: usize) -> Token<'a> {
        self.eat_while(is_identifier_char);
        let kind = match &self.input[start..self.position] {
            "true" | "false" => TokenKind::Bool,
            "null" => TokenKind::Null,
            _ => TokenKind::Identifier,
        };
        self.token(kind, start)
    }

    /// Returns the next token (whitespace included), or None at end of input.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>, LexError>> {
        if self.failed {
            return None;
        }

        let c = self.peek()?;
        let start = self.position;

        if c.is_whitespace() {
            self.eat_while(char::is_whitespace);
            return Some(Ok(self.token(TokenKind::Whitespace, start)));
        }

        if let Some(&(op, kind)) = TWO_CHAR_OPERATORS
            .iter()
            .find(|(op, _)| self.rest().starts_with(*op))
        {
            self.position += op.len();
            return Some(Ok(self.token(kind, start)));
        }

        let result = match c {
            '=' | '>' | '<' | '~' => {
                self.next_char();
                Ok(self.token(TokenKind::ComparisonOp, start))
            }
            '+' | '-' | '*' | '/' => {
                self.next_char();
                Ok(self.token(TokenKind::ArithmeticOp, start))
            }
            '(' | ')' | ':' => {
                self.next_char();
                Ok(self.token(TokenKind::Punct, start))
            }
            '"' | '\'' => self.read_quoted_string(c, start),
            '0'..='9' => Ok(self.read_number(start)),
            _ if is_identifier_start(c) => Ok(self.read_word(start)),
            '@' if self.peek_nth(1).is_some_and(is_identifier_start) => {
                self.next_char();
                self.eat_while(is_identifier_char);
                Ok(self.token(TokenKind::Macro, start))
            }
            _ => Err(LexError {
                offset: start,
                character: c,
            }),
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    /// Collects all non-whitespace tokens, stopping at the first error.
    pub fn tokenize(self) -> Result<Vec<Token<'a>>, LexError> {
        let mut tokens = Vec::new();
        for token in self {
            let token = token?;
            if token.kind != TokenKind::Whitespace {
                tokens.push(token);
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized filter");
        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
