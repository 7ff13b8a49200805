use crate::{escape, fmt::ToSql, params::Params, serializer::Formatter};

use latch_core::{
    schema::Record,
    stmt::{Attributes, UpdateSet, Value},
    Error, Result,
};

/// The ordered (escaped column, argument) pairs produced for one record
/// value. Owned by the statement build that created it; index `i` of the
/// column list and the argument list always describe the same field.
#[derive(Debug, Default, Clone)]
pub struct Fields {
    pairs: Vec<(String, Value)>,
}

impl Fields {
    /// Introspects a record's tagged fields, in declaration order. Fields
    /// the record does not list are skipped silently.
    pub fn from_record<R: Record>(record: &R) -> Fields {
        Fields {
            pairs: record
                .fields()
                .into_iter()
                .map(|(column, value)| (escape(column), value))
                .collect(),
        }
    }

    /// Introspects a record and merges its dynamic attribute bag, when it
    /// carries one.
    pub fn from_record_with_attributes<R: Record>(record: &R) -> Result<Fields> {
        let mut fields = Self::from_record(record);
        if let Some(attributes) = record.attributes() {
            fields.merge_attributes(attributes)?;
        }
        Ok(fields)
    }

    /// Builds the SET pairs of a partial update. Emptiness is checked when
    /// the UPDATE statement is serialized.
    pub fn from_update_set(set: &UpdateSet) -> Fields {
        Fields {
            pairs: set
                .iter()
                .map(|(column, value)| (escape(column), value.clone()))
                .collect(),
        }
    }

    /// Appends the dynamic attribute bag after the typed fields. An
    /// attribute naming a column already present is rejected; the
    /// alternative is an INSERT with a duplicate column list.
    pub fn merge_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        for (column, value) in attributes {
            let escaped = escape(column);
            if self.pairs.iter().any(|(existing, _)| *existing == escaped) {
                return Err(Error::column_collision(column));
            }
            self.pairs.push((escaped, value.clone()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The escaped column names, in placeholder order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(column, _)| column.as_str())
    }

    /// The argument values, in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pairs.iter().map(|(_, value)| value)
    }

    pub(crate) fn assignments(&self) -> impl Iterator<Item = Assign<'_>> {
        self.pairs
            .iter()
            .map(|(column, value)| Assign(column, value))
    }
}

/// One `column = placeholder` pair of a SET clause.
pub(crate) struct Assign<'a>(&'a str, &'a Value);

impl ToSql for Assign<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.0, " = ", self.1);
    }
}
