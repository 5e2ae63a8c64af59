//! Field catalog — logical field name → owning table.
//!
//! Built once from storage introspection. The structural columns
//! (`entity_id`, `date`) are not fields. A column name appearing in more
//! than one table is tracked as ambiguous rather than silently resolved;
//! callers disambiguate with the qualified form `"table.field"`.

use crate::store::{TableSchema, DATE_COLUMN, ENTITY_COLUMN};
use std::collections::BTreeMap;

/// A resolved field: the physical table and column to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

/// Outcome of resolving a field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup<'a> {
    Found(FieldRef<'a>),
    Unknown,
    /// The name exists in several tables; the candidates, in schema order.
    Ambiguous(&'a [String]),
}

/// The schema index.
#[derive(Debug)]
pub struct FieldCatalog {
    /// field name → every table owning a column of that name.
    owners: BTreeMap<String, Vec<String>>,
    tables: BTreeMap<String, Vec<String>>,
}

impl FieldCatalog {
    pub fn from_tables(tables: &[TableSchema]) -> Self {
        let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for table in tables {
            for column in &table.columns {
                if column == ENTITY_COLUMN || column == DATE_COLUMN {
                    continue;
                }
                owners
                    .entry(column.clone())
                    .or_default()
                    .push(table.name.clone());
            }
        }
        let tables = tables
            .iter()
            .map(|t| (t.name.clone(), t.columns.clone()))
            .collect();
        Self { owners, tables }
    }

    /// Resolve a field name, qualified (`"table.field"`) or bare.
    pub fn resolve<'a>(&'a self, name: &'a str) -> FieldLookup<'a> {
        if let Some((table, column)) = name.split_once('.') {
            return match self.tables.get_key_value(table) {
                Some((table_name, columns)) => match columns.iter().find(|c| *c == column) {
                    Some(column) if column != ENTITY_COLUMN && column != DATE_COLUMN => {
                        FieldLookup::Found(FieldRef {
                            table: table_name.as_str(),
                            column: column.as_str(),
                        })
                    }
                    _ => FieldLookup::Unknown,
                },
                None => FieldLookup::Unknown,
            };
        }

        match self.owners.get_key_value(name) {
            Some((column, tables)) => match tables.as_slice() {
                [table] => FieldLookup::Found(FieldRef {
                    table: table.as_str(),
                    column: column.as_str(),
                }),
                many => FieldLookup::Ambiguous(many),
            },
            None => FieldLookup::Unknown,
        }
    }

    /// Iterate (field, owning tables) pairs, ascending by field name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.owners
            .iter()
            .map(|(field, tables)| (field.as_str(), tables.as_slice()))
    }

    pub fn field_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &str, columns: &[&str]) -> TableSchema {
        TableSchema {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn catalog() -> FieldCatalog {
        FieldCatalog::from_tables(&[
            schema("price", &["entity_id", "date", "close", "volume"]),
            schema("fundamentals", &["entity_id", "date", "revenue", "volume"]),
        ])
    }

    #[test]
    fn resolves_unique_field_to_owner() {
        let c = catalog();
        assert_eq!(
            c.resolve("close"),
            FieldLookup::Found(FieldRef {
                table: "price",
                column: "close"
            })
        );
    }

    #[test]
    fn structural_columns_are_not_fields() {
        let c = catalog();
        assert_eq!(c.resolve("entity_id"), FieldLookup::Unknown);
        assert_eq!(c.resolve("date"), FieldLookup::Unknown);
        assert_eq!(c.resolve("price.date"), FieldLookup::Unknown);
    }

    #[test]
    fn collision_is_ambiguous_not_last_writer_wins() {
        let c = catalog();
        match c.resolve("volume") {
            FieldLookup::Ambiguous(tables) => {
                assert_eq!(tables, &["price".to_string(), "fundamentals".to_string()]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn qualified_name_disambiguates() {
        let c = catalog();
        assert_eq!(
            c.resolve("fundamentals.volume"),
            FieldLookup::Found(FieldRef {
                table: "fundamentals",
                column: "volume"
            })
        );
        assert_eq!(c.resolve("nope.volume"), FieldLookup::Unknown);
        assert_eq!(c.resolve("price.revenue"), FieldLookup::Unknown);
    }

    #[test]
    fn unknown_field_reported() {
        assert_eq!(catalog().resolve("nonexistent_field"), FieldLookup::Unknown);
    }

    #[test]
    fn fields_enumerates_with_owners() {
        let c = catalog();
        let all: Vec<_> = c.fields().collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].0, "close");
        let (_, volume_owners) = all.iter().find(|(f, _)| *f == "volume").unwrap();
        assert_eq!(volume_owners.len(), 2);
    }
}
