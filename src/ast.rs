use crate::store::Row;
use crate::value::Value;
use std::fmt;

/// One parsed statement. Every query string parses to exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select {
        fields: Fields,
        table: String,
        condition: Option<Condition>,
        order: Option<OrderBy>,
    },
    Insert {
        table: String,
        row: Row,
    },
    /// UPDATE and DELETE only accept a single comparison in their WHERE clause.
    Update {
        table: String,
        assignments: Vec<Assignment>,
        condition: Comparison,
    },
    Delete {
        table: String,
        condition: Comparison,
    },
    Create {
        table: String,
    },
    Drop {
        table: String,
    },
    ShowTables,
}

impl Statement {
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select { .. } => "SELECT",
            Statement::Insert { .. } => "INSERT",
            Statement::Update { .. } => "UPDATE",
            Statement::Delete { .. } => "DELETE",
            Statement::Create { .. } => "CREATE",
            Statement::Drop { .. } => "DROP",
            Statement::ShowTables => "SHOW TABLES",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    /// `*`
    All,
    Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub operator: CompareOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison(Comparison),
    Binary {
        operator: LogicalOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}
