use crate::ast::{
    Assignment, Comparison, Condition, Direction, Fields, LogicalOp, OrderBy, Statement,
};
use crate::error::QueryError;
use crate::store::{Row, Store, Table};
use crate::value::{compare, SortKey, Value};
use std::cmp::Reverse;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Tables(Vec<String>),
    Message(String),
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryResult::Rows(rows) => {
                let rows = rows.iter().map(Row::to_json).collect();
                write!(f, "{}", serde_json::Value::Array(rows))
            }
            QueryResult::Tables(names) => {
                let names = names.iter().cloned().map(serde_json::Value::String).collect();
                write!(f, "{}", serde_json::Value::Array(names))
            }
            QueryResult::Message(message) => write!(f, "{}", message),
        }
    }
}

/// What one statement produced, and whether the store must be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: QueryResult,
    pub mutated: bool,
}

impl Outcome {
    fn read(result: QueryResult) -> Self {
        Self {
            result,
            mutated: false,
        }
    }

    fn write(result: QueryResult) -> Self {
        Self {
            result,
            mutated: true,
        }
    }

    fn message(message: String, mutated: bool) -> Self {
        Self {
            result: QueryResult::Message(message),
            mutated,
        }
    }
}

/// Runs one statement against the store.
///
/// UPDATE and DELETE report `mutated` even when no row matched: the flag
/// means the statement ran to completion, not that rows changed.
///
/// The `Result` leaves room for `ErrorKind::EvalError`; no statement the
/// parser accepts produces one today.
pub fn execute(statement: &Statement, store: &mut Store) -> Result<Outcome, QueryError> {
    let outcome = match statement {
        Statement::Select {
            fields,
            table,
            condition,
            order,
        } => Outcome::read(QueryResult::Rows(select(
            store.get(table),
            fields,
            condition.as_ref(),
            order.as_ref(),
        ))),
        Statement::Insert { table, row } => {
            store.get_or_create(table).push(row.clone());
            Outcome::write(QueryResult::Message("OK".to_string()))
        }
        Statement::Update {
            table,
            assignments,
            condition,
        } => {
            let count = store
                .get_mut(table)
                .map(|rows| update(rows, assignments, condition))
                .unwrap_or(0);
            Outcome::message(format!("{} row(s) updated", count), true)
        }
        Statement::Delete { table, condition } => {
            let rows = store.get(table).map(Vec::as_slice).unwrap_or_default();
            let (kept, removed): (Table, Table) = rows
                .iter()
                .cloned()
                .partition(|row| !matches_comparison(row, condition));
            store.replace(table, kept);
            Outcome::message(format!("{} row(s) deleted", removed.len()), true)
        }
        Statement::Create { table } => {
            if store.contains(table) {
                Outcome::message(format!("Table '{}' already exists", table), false)
            } else {
                store.get_or_create(table);
                Outcome::message(format!("Table '{}' created", table), true)
            }
        }
        Statement::Drop { table } => {
            if store.remove(table) {
                Outcome::message(format!("Table '{}' dropped", table), true)
            } else {
                Outcome::message(format!("Table '{}' does not exist", table), false)
            }
        }
        Statement::ShowTables => Outcome::read(QueryResult::Tables(store.table_names())),
    };

    debug!(
        statement = statement.name(),
        mutated = outcome.mutated,
        "statement executed"
    );
    Ok(outcome)
}

/// An absent condition matches every row.
pub fn eval_condition(row: &Row, condition: Option<&Condition>) -> bool {
    match condition {
        None => true,
        Some(condition) => matches_condition(row, condition),
    }
}

fn matches_condition(row: &Row, condition: &Condition) -> bool {
    match condition {
        Condition::Comparison(comparison) => matches_comparison(row, comparison),
        Condition::Binary {
            operator: LogicalOp::And,
            left,
            right,
        } => matches_condition(row, left) && matches_condition(row, right),
        Condition::Binary {
            operator: LogicalOp::Or,
            left,
            right,
        } => matches_condition(row, left) || matches_condition(row, right),
    }
}

fn matches_comparison(row: &Row, comparison: &Comparison) -> bool {
    let value = row.get(&comparison.field).unwrap_or(&Value::Null);
    compare(value, comparison.operator, &comparison.value)
}

fn select(
    rows: Option<&Table>,
    fields: &Fields,
    condition: Option<&Condition>,
    order: Option<&OrderBy>,
) -> Vec<Row> {
    let mut result: Vec<Row> = rows
        .into_iter()
        .flatten()
        .filter(|row| eval_condition(row, condition))
        .map(|row| match fields {
            Fields::All => row.clone(),
            Fields::Named(names) => row.project(names),
        })
        .collect();

    // Keys come from the projected rows, so ordering by an unselected field
    // leaves every key empty and the filter order intact.
    if let Some(order) = order {
        let field = order.field.as_str();
        match order.direction {
            Direction::Asc => result.sort_by_cached_key(|row| sort_key(row, field)),
            Direction::Desc => result.sort_by_cached_key(|row| Reverse(sort_key(row, field))),
        }
    }

    result
}

fn sort_key(row: &Row, field: &str) -> SortKey {
    row.get(field).unwrap_or(&Value::Null).sort_key()
}

/// Applies every assignment to the rows matching the comparison; returns the count.
fn update(rows: &mut Table, assignments: &[Assignment], condition: &Comparison) -> usize {
    let matching: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches_comparison(row, condition))
        .map(|(index, _)| index)
        .collect();

    for &index in &matching {
        for assignment in assignments {
            rows[index].set(assignment.field.clone(), assignment.value.clone());
        }
    }

    matching.len()
}
