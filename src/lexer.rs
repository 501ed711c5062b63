use crate::error::{QueryError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Punctuation
    LeftBrace,
    RightBrace,
    Comma,
    Colon,
    Star,

    // Comparison operators
    Equal,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals, carrying their decoded value
    Identifier(String),
    String(String),
    Integer(i64),
    Float(f64),

    // Keywords
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Drop,
    Table,
    Create,
    Show,
    Tables,
    Order,
    By,
    Asc,
    Desc,
    And,
    Or,

    // Special
    Eof,
}

/// Reserved words, matched case-insensitively against identifier text.
const KEYWORDS: &[(&str, TokenType)] = &[
    ("select", TokenType::Select),
    ("from", TokenType::From),
    ("where", TokenType::Where),
    ("insert", TokenType::Insert),
    ("into", TokenType::Into),
    ("values", TokenType::Values),
    ("update", TokenType::Update),
    ("set", TokenType::Set),
    ("delete", TokenType::Delete),
    ("drop", TokenType::Drop),
    ("table", TokenType::Table),
    ("create", TokenType::Create),
    ("show", TokenType::Show),
    ("tables", TokenType::Tables),
    ("order", TokenType::Order),
    ("by", TokenType::By),
    ("asc", TokenType::Asc),
    ("desc", TokenType::Desc),
    ("and", TokenType::And),
    ("or", TokenType::Or),
];

fn keyword(text: &str) -> Option<TokenType> {
    KEYWORDS
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(text))
        .map(|(_, token_type)| token_type.clone())
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    /// Raw source text of the token.
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }

    /// Human readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Eof => "end of input".to_string(),
            TokenType::String(_) => format!("string {}", self.lexeme),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

/// Lazy scanner over one statement.
///
/// Tokens are produced on demand through [`Lexer::next_token`] or the
/// `Iterator` implementation. Once the end of input is reached every further
/// call to `next_token` yields `Eof` again; the iterator yields `Eof` once and
/// then stops. A lexer is cheap to clone, so a clone taken before scanning can
/// restart the sequence from the beginning.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            finished: false,
        }
    }

    /// Convenience for callers that want the whole stream at once.
    pub fn scan_tokens(self) -> Result<Vec<Token>, QueryError> {
        self.collect()
    }

    pub fn next_token(&mut self) -> Result<Token, QueryError> {
        self.skip_whitespace();
        self.start = self.current;

        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenType::Eof)),
        };

        let token_type = match c {
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            '*' => TokenType::Star,
            '=' => TokenType::Equal,
            '<' => {
                if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    return Err(self.unexpected('!'));
                }
            }
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            c => return Err(self.unexpected(c)),
        };

        Ok(self.make_token(token_type))
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.current += 1;
                }
                '\n' => {
                    self.line += 1;
                    self.current += 1;
                }
                _ => break,
            }
        }
    }

    fn unexpected(&self, c: char) -> QueryError {
        QueryError::lex_error(
            Span::new(self.start, self.start + c.len_utf8()),
            format!("Unexpected character: '{}' at line {}", c, self.line),
        )
    }

    fn string(&mut self) -> Result<TokenType, QueryError> {
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(QueryError::lex_error(
                        Span::new(self.start, self.current),
                        "Unterminated string".to_string(),
                    ));
                }
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(escaped) => value.push(escaped),
                    None => {
                        return Err(QueryError::lex_error(
                            Span::new(self.start, self.current),
                            "Unterminated string".to_string(),
                        ));
                    }
                },
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                }
            }
        }

        Ok(TokenType::String(value))
    }

    fn number(&mut self) -> Result<TokenType, QueryError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let mut is_float = false;

        // A '.' only belongs to the number when digits follow it
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.source[self.start..self.current];

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(TokenType::Integer(n));
            }
        }

        // Integers past i64 fall back to f64; past f64 there is nothing to store
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenType::Float(n)),
            _ => Err(QueryError::lex_error(
                Span::new(self.start, self.current),
                "Number literal out of range".to_string(),
            )),
        }
    }

    fn identifier(&mut self) -> TokenType {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        keyword(text).unwrap_or_else(|| TokenType::Identifier(text.to_string()))
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        let span = if token_type == TokenType::Eof {
            Span::single(self.source.len())
        } else {
            Span::new(self.start, self.current)
        };

        Token::new(
            token_type,
            self.source[self.start..self.current].to_string(),
            span,
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) if token.token_type == TokenType::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        Lexer::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|token| token.token_type)
            .collect()
    }

    #[test]
    fn keywords_are_case_insensitive_identifiers_keep_case() {
        assert_eq!(
            types("select Name FrOm Users"),
            vec![
                TokenType::Select,
                TokenType::Identifier("Name".to_string()),
                TokenType::From,
                TokenType::Identifier("Users".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators_win_over_prefixes() {
        assert_eq!(
            types("<= >= != < > ="),
            vec![
                TokenType::LessEqual,
                TokenType::GreaterEqual,
                TokenType::BangEqual,
                TokenType::Less,
                TokenType::Greater,
                TokenType::Equal,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn numbers_decode_to_integer_or_float() {
        assert_eq!(
            types("42 3.5 99999999999999999999"),
            vec![
                TokenType::Integer(42),
                TokenType::Float(3.5),
                TokenType::Float(1e20),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn strings_resolve_escapes() {
        assert_eq!(
            types(r#""a\"b\\c\nd""#),
            vec![TokenType::String("a\"b\\c\nd".to_string()), TokenType::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_a_lex_error() {
        let error = Lexer::new("\"abc").scan_tokens().unwrap_err();
        assert!(error.is_lex_error());
        assert_eq!(error.message, "Unterminated string");
    }

    #[test]
    fn integer_past_i64_decodes_as_float() {
        assert_eq!(
            types("9223372036854775807 9223372036854775808"),
            vec![
                TokenType::Integer(i64::MAX),
                TokenType::Float(9223372036854775808.0),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn number_past_f64_is_a_lex_error() {
        let source = format!("age > {}", "9".repeat(400));
        let error = Lexer::new(&source).scan_tokens().unwrap_err();
        assert!(error.is_lex_error());
        assert_eq!(error.message, "Number literal out of range");
        assert_eq!(error.span, Span::new(6, source.len()));
    }

    #[test]
    fn stray_symbol_reports_character_and_position() {
        let error = Lexer::new("SELECT * FROM t;").scan_tokens().unwrap_err();
        assert!(error.is_lex_error());
        assert_eq!(error.span, Span::new(15, 16));
        assert!(error.message.contains("';'"));
    }

    #[test]
    fn newlines_are_tracked_for_diagnostics() {
        let error = Lexer::new("SHOW\nTABLES\n#").scan_tokens().unwrap_err();
        assert!(error.message.contains("line 3"));
    }

    #[test]
    fn iterator_stops_after_eof() {
        let mut lexer = Lexer::new("SHOW");
        assert!(matches!(lexer.next(), Some(Ok(ref t)) if t.token_type == TokenType::Show));
        assert!(matches!(lexer.next(), Some(Ok(ref t)) if t.token_type == TokenType::Eof));
        assert!(lexer.next().is_none());
    }
}
