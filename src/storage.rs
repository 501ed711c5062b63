//! JSON document persistence for a [`Store`].
//!
//! The document is an object mapping table names to arrays of flat row
//! objects. Table and field order survive a load/save cycle.

use crate::store::{Row, Store, Table};
use crate::value::Value;
use serde_json::Value as Json;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported document: {0}")]
    Unsupported(String),
}

/// Loads the store from `path`. A missing file yields an empty store.
pub fn load(path: &Path) -> Result<Store> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "data file not found, starting with an empty store");
            return Ok(Store::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let store = from_json_str(&text)?;
    info!(path = %path.display(), tables = store.table_names().len(), "store loaded");
    Ok(store)
}

/// Writes the whole store to `path` as pretty-printed JSON.
pub fn save(path: &Path, store: &Store) -> Result<()> {
    let text = to_json_string(store)?;
    fs::write(path, text).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "store saved");
    Ok(())
}

pub fn from_json_str(text: &str) -> Result<Store> {
    let document: Json = serde_json::from_str(text)?;
    store_from_json(document)
}

pub fn to_json_string(store: &Store) -> Result<String> {
    Ok(serde_json::to_string_pretty(&store.to_json())?)
}

fn store_from_json(document: Json) -> Result<Store> {
    let tables = match document {
        Json::Object(tables) => tables,
        other => {
            return Err(StoreError::Unsupported(format!(
                "expected an object of tables, found {}",
                json_type(&other)
            )))
        }
    };

    // JSON object keys are already distinct, so nothing needs deduplicating
    let tables = tables
        .into_iter()
        .map(|(name, rows)| {
            let table = table_from_json(&name, rows)?;
            Ok((name, table))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Store::from_distinct(tables))
}

fn table_from_json(name: &str, rows: Json) -> Result<Table> {
    match rows {
        Json::Array(rows) => rows
            .into_iter()
            .map(|row| row_from_json(name, row))
            .collect(),
        other => Err(StoreError::Unsupported(format!(
            "table '{}' must be an array of rows, found {}",
            name,
            json_type(&other)
        ))),
    }
}

fn row_from_json(table: &str, row: Json) -> Result<Row> {
    let fields = match row {
        Json::Object(fields) => fields,
        other => {
            return Err(StoreError::Unsupported(format!(
                "rows of table '{}' must be objects, found {}",
                table,
                json_type(&other)
            )))
        }
    };

    let fields = fields
        .into_iter()
        .map(|(field, value)| {
            let value = value_from_json(&value).ok_or_else(|| {
                StoreError::Unsupported(format!(
                    "field '{}' in table '{}' holds a {}",
                    field,
                    table,
                    json_type(&value)
                ))
            })?;
            Ok((field, value))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Row::from_distinct(fields))
}

fn value_from_json(value: &Json) -> Option<Value> {
    match value {
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => n.as_f64().map(Value::Float),
        },
        Json::Null => Some(Value::Null),
        Json::Bool(_) | Json::Array(_) | Json::Object(_) => None,
    }
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
