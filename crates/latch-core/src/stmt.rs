mod value;
pub use value::Value;

use indexmap::IndexMap;

/// Open-ended column-to-value mapping carried by records whose table has
/// columns the typed schema does not know about. Insertion order is
/// preserved so generated placeholders are deterministic.
pub type Attributes = IndexMap<String, Value>;

/// An ordered set of column assignments for a partial update.
///
/// An empty set is representable but rejected when the UPDATE statement is
/// built; it never serializes to an empty SET clause.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateSet {
    fields: IndexMap<String, Value>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment, builder style. A repeated column keeps its
    /// original position and takes the new value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(column, value)| (column.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_set_preserves_insertion_order() {
        let set = UpdateSet::new()
            .set("name", "b")
            .set("active_expires", 10_i64)
            .set("id", "s1");

        let columns: Vec<_> = set.iter().map(|(column, _)| column).collect();
        assert_eq!(columns, ["name", "active_expires", "id"]);
    }

    #[test]
    fn update_set_repeated_column_takes_last_value() {
        let set = UpdateSet::new().set("name", "a").set("name", "b");

        assert_eq!(set.len(), 1);
        let (_, value) = set.iter().next().unwrap();
        assert_eq!(*value, Value::String("b".to_string()));
    }
}
