use crate::ast::{
    Assignment, CompareOp, Comparison, Condition, Direction, Fields, LogicalOp, OrderBy,
    Statement,
};
use crate::error::{QueryError, Span};
use crate::lexer::{Lexer, Token, TokenType};
use crate::store::Row;
use crate::value::Value;

/// Lexes and parses a single statement.
pub fn parse(source: &str) -> Result<Statement, QueryError> {
    Parser::new(Lexer::new(source)).parse()
}

/// Recursive descent parser pulling tokens from the lexer one at a time.
///
/// Only the current token is buffered; nothing is ever pushed back.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Option<Token>,
    previous_end: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: None,
            previous_end: 0,
        }
    }

    /// Parses exactly one statement and requires the input to end after it.
    pub fn parse(&mut self) -> Result<Statement, QueryError> {
        let statement = self.statement()?;

        if !self.is_at_end()? {
            let token = self.peek()?;
            return Err(QueryError::parse_error_with_help(
                token.span.clone(),
                format!("Unexpected token after statement: {}", token.describe()),
                "Only one statement is accepted per query.".to_string(),
            ));
        }

        Ok(statement)
    }

    fn statement(&mut self) -> Result<Statement, QueryError> {
        if self.match_type(&TokenType::Select)? {
            self.select_statement()
        } else if self.match_type(&TokenType::Insert)? {
            self.insert_statement()
        } else if self.match_type(&TokenType::Update)? {
            self.update_statement()
        } else if self.match_type(&TokenType::Delete)? {
            self.delete_statement()
        } else if self.match_type(&TokenType::Create)? {
            self.consume(TokenType::Table, "Expected 'TABLE' after 'CREATE'")?;
            let table = self.table_name("CREATE TABLE")?;
            Ok(Statement::Create { table })
        } else if self.match_type(&TokenType::Drop)? {
            self.consume(TokenType::Table, "Expected 'TABLE' after 'DROP'")?;
            let table = self.table_name("DROP TABLE")?;
            Ok(Statement::Drop { table })
        } else if self.match_type(&TokenType::Show)? {
            self.consume(TokenType::Tables, "Expected 'TABLES' after 'SHOW'")?;
            Ok(Statement::ShowTables)
        } else {
            let token = self.peek()?;
            Err(QueryError::parse_error_with_help(
                token.span.clone(),
                format!("Expected a statement, found {}", token.describe()),
                "Statements start with SELECT, INSERT, UPDATE, DELETE, CREATE, DROP or SHOW."
                    .to_string(),
            ))
        }
    }

    fn select_statement(&mut self) -> Result<Statement, QueryError> {
        let fields = if self.match_type(&TokenType::Star)? {
            Fields::All
        } else {
            let mut names = vec![self.identifier("Expected '*' or a field name after 'SELECT'")?];
            while self.match_type(&TokenType::Comma)? {
                names.push(self.identifier("Expected field name after ','")?);
            }
            Fields::Named(names)
        };

        self.consume_with_help(
            TokenType::From,
            "Expected 'FROM' after field list",
            "SELECT queries look like: SELECT name, age FROM users".to_string(),
        )?;
        let table = self.table_name("FROM")?;

        let condition = if self.match_type(&TokenType::Where)? {
            Some(self.condition()?)
        } else {
            None
        };

        let order = if self.match_type(&TokenType::Order)? {
            self.consume(TokenType::By, "Expected 'BY' after 'ORDER'")?;
            let field = self.identifier("Expected field name after 'ORDER BY'")?;
            let direction = if self.match_type(&TokenType::Desc)? {
                Direction::Desc
            } else {
                self.match_type(&TokenType::Asc)?;
                Direction::Asc
            };
            Some(OrderBy { field, direction })
        } else {
            None
        };

        Ok(Statement::Select {
            fields,
            table,
            condition,
            order,
        })
    }

    fn insert_statement(&mut self) -> Result<Statement, QueryError> {
        self.consume(TokenType::Into, "Expected 'INTO' after 'INSERT'")?;
        let table = self.table_name("INSERT INTO")?;
        self.consume(TokenType::Values, "Expected 'VALUES' after table name")?;
        let row = self.object_literal()?;
        Ok(Statement::Insert { table, row })
    }

    fn update_statement(&mut self) -> Result<Statement, QueryError> {
        let table = self.table_name("UPDATE")?;
        self.consume(TokenType::Set, "Expected 'SET' after table name")?;

        let mut assignments = Vec::new();
        loop {
            let field = self.identifier("Expected field name in SET clause")?;
            self.consume_with_help(
                TokenType::Equal,
                "Expected '=' after field name",
                "Assignments look like: SET age=26, name=\"Bob\"".to_string(),
            )?;
            let value = self.value()?;
            assignments.push(Assignment { field, value });

            if !self.match_type(&TokenType::Comma)? {
                break;
            }
        }

        self.consume_with_help(
            TokenType::Where,
            "Expected 'WHERE' after assignments",
            "UPDATE requires a WHERE clause: UPDATE users SET age=26 WHERE name=\"Bob\""
                .to_string(),
        )?;
        let condition = self.comparison()?;

        Ok(Statement::Update {
            table,
            assignments,
            condition,
        })
    }

    fn delete_statement(&mut self) -> Result<Statement, QueryError> {
        self.consume(TokenType::From, "Expected 'FROM' after 'DELETE'")?;
        let table = self.table_name("DELETE FROM")?;
        self.consume_with_help(
            TokenType::Where,
            "Expected 'WHERE' after table name",
            "DELETE requires a WHERE clause: DELETE FROM users WHERE age < 18".to_string(),
        )?;
        let condition = self.comparison()?;
        Ok(Statement::Delete { table, condition })
    }

    /// `or_condition := and_condition ("OR" and_condition)*`
    fn condition(&mut self) -> Result<Condition, QueryError> {
        let mut condition = self.and_condition()?;

        while self.match_type(&TokenType::Or)? {
            let right = self.and_condition()?;
            condition = Condition::Binary {
                operator: LogicalOp::Or,
                left: Box::new(condition),
                right: Box::new(right),
            };
        }

        Ok(condition)
    }

    /// `and_condition := comparison ("AND" comparison)*`
    fn and_condition(&mut self) -> Result<Condition, QueryError> {
        let mut condition = Condition::Comparison(self.comparison()?);

        while self.match_type(&TokenType::And)? {
            let right = Condition::Comparison(self.comparison()?);
            condition = Condition::Binary {
                operator: LogicalOp::And,
                left: Box::new(condition),
                right: Box::new(right),
            };
        }

        Ok(condition)
    }

    fn comparison(&mut self) -> Result<Comparison, QueryError> {
        let field = self.identifier("Expected field name in condition")?;

        let token = self.peek()?.clone();
        let operator = match token.token_type {
            TokenType::Equal => CompareOp::Equal,
            TokenType::BangEqual => CompareOp::NotEqual,
            TokenType::Less => CompareOp::Less,
            TokenType::LessEqual => CompareOp::LessEqual,
            TokenType::Greater => CompareOp::Greater,
            TokenType::GreaterEqual => CompareOp::GreaterEqual,
            _ => {
                return Err(QueryError::parse_error_with_help(
                    self.error_span(&token),
                    format!(
                        "Expected comparison operator after '{}', found {}",
                        field,
                        token.describe()
                    ),
                    "Supported operators are =, !=, <, <=, > and >=.".to_string(),
                ));
            }
        };
        self.advance()?;

        let value = self.value()?;
        Ok(Comparison {
            field,
            operator,
            value,
        })
    }

    /// `{ "field": value, ... }` with at least one entry.
    fn object_literal(&mut self) -> Result<Row, QueryError> {
        self.consume_with_help(
            TokenType::LeftBrace,
            "Expected '{' to start the row object",
            "Rows are written as objects: VALUES {\"name\": \"Ann\", \"age\": 40}".to_string(),
        )?;

        let mut row = Row::new();
        loop {
            let token = self.advance()?;
            let field = match token.token_type {
                TokenType::String(field) => field,
                _ => {
                    return Err(QueryError::parse_error_with_help(
                        self.error_span(&token),
                        format!("Expected quoted field name, found {}", token.describe()),
                        "Field names in row objects are double-quoted strings.".to_string(),
                    ));
                }
            };
            self.consume(TokenType::Colon, "Expected ':' after field name")?;
            let value = self.value()?;
            row.set(field, value);

            if !self.match_type(&TokenType::Comma)? {
                break;
            }
        }

        self.consume_with_help(
            TokenType::RightBrace,
            "Expected '}' after row fields",
            "Row objects must be closed with '}' after the opening '{'.".to_string(),
        )?;
        Ok(row)
    }

    /// A string or numeric literal.
    fn value(&mut self) -> Result<Value, QueryError> {
        let token = self.advance()?;
        match token.token_type {
            TokenType::String(s) => Ok(Value::String(s)),
            TokenType::Integer(n) => Ok(Value::Integer(n)),
            TokenType::Float(n) => Ok(Value::Float(n)),
            _ => Err(QueryError::parse_error_with_help(
                self.error_span(&token),
                format!("Expected a value, found {}", token.describe()),
                "Values are double-quoted strings or numbers.".to_string(),
            )),
        }
    }

    fn table_name(&mut self, after: &str) -> Result<String, QueryError> {
        self.identifier(&format!("Expected table name after '{}'", after))
    }

    fn identifier(&mut self, message: &str) -> Result<String, QueryError> {
        let token = self.advance()?;
        match token.token_type {
            TokenType::Identifier(name) => Ok(name),
            _ => Err(QueryError::parse_error(
                self.error_span(&token),
                format!("{}, found {}", message, token.describe()),
            )),
        }
    }

    fn match_type(&mut self, token_type: &TokenType) -> Result<bool, QueryError> {
        if self.check(token_type)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn check(&mut self, token_type: &TokenType) -> Result<bool, QueryError> {
        Ok(&self.peek()?.token_type == token_type)
    }

    fn is_at_end(&mut self) -> Result<bool, QueryError> {
        self.check(&TokenType::Eof)
    }

    fn peek(&mut self) -> Result<&Token, QueryError> {
        let token = self.take_current()?;
        Ok(&*self.current.insert(token))
    }

    /// Takes the current token. At the end of input this keeps returning `Eof`.
    fn advance(&mut self) -> Result<Token, QueryError> {
        let token = self.take_current()?;
        if token.token_type != TokenType::Eof {
            self.previous_end = token.span.end;
        }
        Ok(token)
    }

    /// The buffered token, or the next one from the lexer when nothing is buffered.
    fn take_current(&mut self) -> Result<Token, QueryError> {
        match self.current.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token, QueryError> {
        if self.check(&token_type)? {
            self.advance()
        } else {
            let token = self.peek()?.clone();
            Err(QueryError::parse_error(
                self.error_span(&token),
                format!("{}, found {}", message, token.describe()),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<Token, QueryError> {
        if self.check(&token_type)? {
            self.advance()
        } else {
            let token = self.peek()?.clone();
            Err(QueryError::parse_error_with_help(
                self.error_span(&token),
                format!("{}, found {}", message, token.describe()),
                help,
            ))
        }
    }

    /// At the end of input, point just past the last real token instead.
    fn error_span(&self, token: &Token) -> Span {
        if token.token_type == TokenType::Eof {
            Span::single(self.previous_end)
        } else {
            token.span.clone()
        }
    }
}
