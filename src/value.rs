use crate::ast::CompareOp;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    /// Also stands in for a field a row does not have.
    Null,
}

impl Value {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Null => serde_json::Value::Null,
        }
    }

    /// Key used by ORDER BY.
    pub fn sort_key(&self) -> SortKey {
        match self {
            Value::String(s) => SortKey::Text(s.to_lowercase()),
            Value::Integer(n) => SortKey::Number(*n as f64),
            Value::Float(n) => SortKey::Number(*n),
            Value::Null => SortKey::Text(String::new()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // Always show at least one decimal place for floats
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Null => write!(f, "null"),
        }
    }
}

/// ORDER BY key. Strings compare case-insensitively, numbers numerically,
/// and every number sorts before every string.
#[derive(Debug, Clone)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Applies `op` to two values.
///
/// A string compared against a number is first read as a float; when that
/// fails the comparison is false for every operator. Values of unrelated
/// types (including null against anything but null) are unordered: only
/// `!=` holds between them.
pub fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::String(s), other) if other.is_numeric() => match parse_float(s) {
            Some(n) => order(&Value::Float(n), other),
            None => return false,
        },
        (other, Value::String(s)) if other.is_numeric() => match parse_float(s) {
            Some(n) => order(other, &Value::Float(n)),
            None => return false,
        },
        _ => order(left, right),
    };

    match op {
        CompareOp::Equal => ordering == Some(Ordering::Equal),
        CompareOp::NotEqual => ordering != Some(Ordering::Equal),
        CompareOp::Less => ordering == Some(Ordering::Less),
        CompareOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Greater => ordering == Some(Ordering::Greater),
        CompareOp::GreaterEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn numeric_strings_are_coerced() {
        assert!(compare(&s("42"), CompareOp::Equal, &Value::Integer(42)));
        assert!(compare(&Value::Integer(31), CompareOp::Greater, &s(" 30.5 ")));
        assert!(compare(&s("2.5"), CompareOp::Less, &Value::Float(3.0)));
    }

    #[test]
    fn failed_coercion_is_false_for_every_operator() {
        let ops = [
            CompareOp::Equal,
            CompareOp::NotEqual,
            CompareOp::Less,
            CompareOp::LessEqual,
            CompareOp::Greater,
            CompareOp::GreaterEqual,
        ];
        for op in ops {
            assert!(!compare(&s("abc"), op, &Value::Integer(1)), "{}", op);
            assert!(!compare(&Value::Float(1.0), op, &s("abc")), "{}", op);
        }
    }

    #[test]
    fn null_is_never_ordered() {
        assert!(!compare(&Value::Null, CompareOp::Greater, &Value::Integer(30)));
        assert!(!compare(&Value::Null, CompareOp::LessEqual, &Value::Integer(30)));
        assert!(!compare(&Value::Null, CompareOp::Equal, &s("")));
        assert!(compare(&Value::Null, CompareOp::NotEqual, &Value::Integer(30)));
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert!(compare(&Value::Integer(1), CompareOp::Equal, &Value::Float(1.0)));
        assert!(compare(&Value::Float(0.5), CompareOp::Less, &Value::Integer(1)));
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert!(compare(&s("apple"), CompareOp::Less, &s("banana")));
        assert!(compare(&s("Bob"), CompareOp::NotEqual, &s("bob")));
    }

    #[test]
    fn sort_keys_fold_case_and_treat_null_as_empty() {
        assert_eq!(s("ALICE").sort_key(), s("alice").sort_key());
        assert!(Value::Null.sort_key() < s("a").sort_key());
        assert!(Value::Integer(2).sort_key() < Value::Float(10.0).sort_key());
        assert!(Value::Integer(100).sort_key() < s("1").sort_key());
    }
}
