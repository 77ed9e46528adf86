//! Tokenizer for Prolog text.
//!
//! Produces the whole token stream up front. Each token records whether
//! layout (whitespace or a comment) preceded it: `foo(` opens an argument
//! list while `foo (` applies a prefix operator to a parenthesized term,
//! and `- 1` is a compound while `-1` is a negative literal.

use crate::parser::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Unquoted name: letters, a run of symbol characters, `!` or `;`.
    Name(String),
    /// Quoted atom, escapes already processed.
    Quoted(String),
    Var(String),
    Int(i64),
    Float(f64),
    /// Double-quoted text.
    Str(String),
    /// Back-quoted text.
    BackQuoted(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Bar,
    /// The `.` that ends a clause.
    End,
}

#[derive(Clone, Debug)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    pub layout_before: bool,
}

fn is_symbol_char(c: char) -> bool {
    "+-*/\\^<>=~:.?@#&$".contains(c)
}

fn is_alnum(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let layout_before = self.skip_layout()?;
            let (line, column) = (self.line, self.column);
            let Some(token) = self.next_token()? else {
                return Ok(tokens);
            };
            tokens.push(Spanned {
                token,
                line,
                column,
                layout_before,
            });
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Skip whitespace and comments; true if anything was skipped.
    fn skip_layout(&mut self) -> Result<bool, ParseError> {
        let start = self.pos;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('%'), _) => {
                    self.take_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(self.pos > start),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let token = match c {
            '(' | ')' | '[' | ']' | '{' | '}' | ',' | '|' => {
                self.advance();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    ',' => Token::Comma,
                    _ if self.peek() == Some('|') => {
                        self.advance();
                        Token::Name("||".to_string())
                    }
                    _ => Token::Bar,
                }
            }
            '!' | ';' => {
                self.advance();
                Token::Name(c.to_string())
            }
            '\'' => {
                self.advance();
                Token::Quoted(self.quoted('\'')?)
            }
            '"' => {
                self.advance();
                Token::Str(self.quoted('"')?)
            }
            '`' => {
                self.advance();
                Token::BackQuoted(self.quoted('`')?)
            }
            '.' if self.peek_at(1).map_or(true, |n| n.is_whitespace() || n == '%') => {
                self.advance();
                Token::End
            }
            c if c.is_ascii_digit() => self.number()?,
            c if c == '_' || c.is_uppercase() => Token::Var(self.take_while(is_alnum).to_string()),
            c if c.is_alphabetic() => Token::Name(self.take_while(is_alnum).to_string()),
            c if is_symbol_char(c) => Token::Name(self.take_while(is_symbol_char).to_string()),
            other => return Err(self.error(format!("unexpected character {other:?}"))),
        };
        Ok(Some(token))
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x') => Some(16),
                Some('o') => Some(8),
                Some('b') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                if self.peek_at(2).is_some_and(|c| c.is_digit(radix)) {
                    self.advance();
                    self.advance();
                    let digits = self.take_while(|c| c.is_digit(radix));
                    return i64::from_str_radix(digits, radix)
                        .map(Token::Int)
                        .map_err(|_| self.error("integer out of range"));
                }
            }
            if self.peek_at(1) == Some('\'') {
                self.advance();
                self.advance();
                return self.char_code();
            }
        }

        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent = match (self.peek_at(1), self.peek_at(2)) {
                (Some(d), _) if d.is_ascii_digit() => true,
                (Some('+' | '-'), Some(d)) if d.is_ascii_digit() => true,
                _ => false,
            };
            if exponent {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.take_while(|c| c.is_ascii_digit());
            }
        }
        let text: String = self.input[start..self.pos].chars().filter(|&c| c != '_').collect();
        if is_float {
            text.parse()
                .map(Token::Float)
                .map_err(|_| self.error(format!("invalid float {text}")))
        } else {
            text.parse()
                .map(Token::Int)
                .map_err(|_| self.error("integer out of range"))
        }
    }

    /// The character after `0'`.
    fn char_code(&mut self) -> Result<Token, ParseError> {
        let c = match self.advance() {
            Some('\\') => self.escape()?,
            Some('\'') if self.peek() == Some('\'') => {
                self.advance();
                '\''
            }
            Some(c) => c,
            None => return Err(self.error("missing character after 0'")),
        };
        Ok(Token::Int(c as i64))
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        let c = self.advance().ok_or_else(|| self.error("unterminated escape"))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            '0' if !self.peek().is_some_and(|c| c.is_digit(8)) => '\0',
            'e' => '\x1b',
            's' => ' ',
            'x' => {
                let digits = self.take_while(|c| c.is_ascii_hexdigit()).to_string();
                if self.peek() == Some('\\') {
                    self.advance();
                }
                self.code_point(&digits, 16)?
            }
            d if d.is_digit(8) => {
                let mut digits = d.to_string();
                digits.push_str(self.take_while(|c| c.is_digit(8)));
                if self.peek() == Some('\\') {
                    self.advance();
                }
                self.code_point(&digits, 8)?
            }
            '\\' | '\'' | '"' | '`' => c,
            other => return Err(self.error(format!("undefined escape sequence \\{other}"))),
        })
    }

    fn code_point(&self, digits: &str, radix: u32) -> Result<char, ParseError> {
        u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid character code"))
    }

    /// Body of a quoted item; the opening quote is already consumed.
    fn quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                        text.push(quote);
                    } else {
                        return Ok(text);
                    }
                }
                Some('\\') => {
                    if self.peek() == Some('\n') {
                        self.advance();
                    } else {
                        text.push(self.escape()?);
                    }
                }
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated quoted text")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        Lexer::new(text)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn clause_tokens() {
        assert_eq!(
            tokens("foo(X, _y) :- bar. % done"),
            vec![
                Token::Name("foo".into()),
                Token::LParen,
                Token::Var("X".into()),
                Token::Comma,
                Token::Var("_y".into()),
                Token::RParen,
                Token::Name(":-".into()),
                Token::Name("bar".into()),
                Token::End,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("42 3.25 1.0e3 0'a 0x1F 1_000"),
            vec![
                Token::Int(42),
                Token::Float(3.25),
                Token::Float(1000.0),
                Token::Int(97),
                Token::Int(31),
                Token::Int(1000),
            ]
        );
    }

    #[test]
    fn end_needs_layout_after_the_dot() {
        assert_eq!(
            tokens("X = '.'.\n"),
            vec![
                Token::Var("X".into()),
                Token::Name("=".into()),
                Token::Quoted(".".into()),
                Token::End,
            ]
        );
        assert_eq!(tokens("a =.. b"), vec![
            Token::Name("a".into()),
            Token::Name("=..".into()),
            Token::Name("b".into()),
        ]);
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(
            tokens(r"'it''s\n' "),
            vec![Token::Quoted("it's\n".into())]
        );
        assert_eq!(tokens("\"ab\""), vec![Token::Str("ab".into())]);
    }

    #[test]
    fn layout_is_recorded() {
        let spanned = Lexer::new("- (1) -(1)").tokenize().unwrap();
        assert!(spanned[1].layout_before);
        assert!(!spanned[5].layout_before);
    }

    #[test]
    fn unterminated_quote_reports_position() {
        let err = Lexer::new("foo('abc").tokenize().unwrap_err();
        assert_eq!(err.line, 1);
    }
}
