use crate::value::Value;

/// Field name to value mapping that keeps insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps fields whose names are known to be distinct, skipping the
    /// per-field lookup `set` does.
    pub(crate) fn from_distinct(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Overwrites an existing field in place or appends a new one.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Copies the named fields in the requested order; missing ones become null.
    pub fn project(&self, fields: &[String]) -> Row {
        fields
            .iter()
            .map(|field| {
                let value = self.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (field, value) in iter {
            row.set(field, value);
        }
        row
    }
}

pub type Table = Vec<Row>;

/// Named tables, kept in creation order. Table names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Store {
    tables: Vec<(String, Table)>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps tables whose names are known to be distinct.
    pub(crate) fn from_distinct(tables: Vec<(String, Table)>) -> Self {
        Self { tables }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|(table, _)| table == name)
            .map(|(_, rows)| rows)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|(table, _)| table == name)
            .map(|(_, rows)| rows)
    }

    /// Returns the named table, creating it empty when absent.
    pub fn get_or_create(&mut self, name: &str) -> &mut Table {
        let index = match self.tables.iter().position(|(table, _)| table == name) {
            Some(index) => index,
            None => {
                self.tables.push((name.to_string(), Vec::new()));
                self.tables.len() - 1
            }
        };
        &mut self.tables[index].1
    }

    /// Stores `rows` under `name`, replacing any existing table in place.
    pub fn replace(&mut self, name: &str, rows: Table) {
        *self.get_or_create(name) = rows;
    }

    /// Removes the named table; false when it did not exist.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tables.len();
        self.tables.retain(|(table, _)| table != name);
        self.tables.len() != before
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .tables
            .iter()
            .map(|(name, rows)| {
                let rows = rows.iter().map(Row::to_json).collect();
                (name.clone(), serde_json::Value::Array(rows))
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_set_overwrites_in_place() {
        let mut row: Row = [("a", Value::Integer(1)), ("b", Value::Integer(2))]
            .into_iter()
            .collect();
        row.set("a", Value::Integer(3));
        row.set("c", Value::Null);

        let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(row.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn projection_fills_missing_fields_with_null() {
        let row: Row = [("name", Value::String("Ann".to_string()))].into_iter().collect();
        let projected = row.project(&["age".to_string(), "name".to_string()]);
        assert_eq!(projected.get("age"), Some(&Value::Null));
        assert_eq!(projected.iter().next().map(|(name, _)| name), Some("age"));
    }

    #[test]
    fn tables_keep_creation_order() {
        let mut store = Store::new();
        store.get_or_create("b");
        store.get_or_create("a");
        store.replace("b", vec![Row::new()]);
        assert_eq!(store.table_names(), vec!["b", "a"]);
        assert_eq!(store.get("b").map(Vec::len), Some(1));
        assert!(store.remove("b"));
        assert!(!store.remove("b"));
    }

    #[test]
    fn distinct_tables_and_fields_keep_their_order() {
        let row = Row::from_distinct(vec![
            ("z".to_string(), Value::Integer(1)),
            ("a".to_string(), Value::Integer(2)),
        ]);
        let store = Store::from_distinct(vec![
            ("second".to_string(), vec![row.clone()]),
            ("first".to_string(), Vec::new()),
        ]);

        assert_eq!(store.table_names(), vec!["second", "first"]);
        let names: Vec<&str> = store.get("second").unwrap()[0]
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(store.get("second"), Some(&vec![row]));
    }
}
