//! Structural description of the refined store
//!
//! These types describe tables, columns and relationships without any
//! reference to stored data. Collections are ordered `Vec`s so that the
//! serialized form is byte-stable.

use serde::{Deserialize, Serialize};

/// Foreign key reference to another table's column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKey {
    /// Target table name
    pub table: String,
    /// Column name in the target table
    pub column: String,
}

/// Column descriptor
///
/// # Example
///
/// ```rust
/// use browsing_refiner::models::ColumnDescriptor;
///
/// let column = ColumnDescriptor::new("url", "text").not_null();
/// assert_eq!(column.data_type, "TEXT");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Data type (e.g., "TEXT", "INTEGER", "DATETIME")
    pub data_type: String,
    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Whether this column is the primary key
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the key is assigned by the store
    #[serde(default)]
    pub autoincrement: bool,
    /// Whether values must be unique
    #[serde(default)]
    pub unique: bool,
    /// Foreign key reference if this column references another table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.as_ref().trim().to_uppercase(),
            nullable: true,
            primary_key: false,
            autoincrement: false,
            unique: false,
            foreign_key: None,
        }
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Mark as a store-assigned integer key
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self.primary_key()
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Reference `table.column`
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Table descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary key column, if any
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// Relationship cardinality, seen from the source table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
}

/// Foreign key column mapping details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyDetails {
    /// Column name in the source table
    pub source_column: String,
    /// Column name in the target table
    pub target_column: String,
}

/// Relationship between two tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    /// Table holding the foreign key
    pub source_table: String,
    /// Referenced table
    pub target_table: String,
    pub cardinality: Cardinality,
    pub foreign_key_details: ForeignKeyDetails,
}

/// Tables and relationships of the refined store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSchema {
    pub tables: Vec<TableDescriptor>,
    pub relationships: Vec<RelationshipDescriptor>,
}

impl ModelSchema {
    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Published schema document
///
/// Serializes to `{"name","version","description","dialect","schema":{...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub dialect: String,
    pub schema: ModelSchema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builders() {
        let id = ColumnDescriptor::new("entry_id", "integer").autoincrement();
        assert_eq!(id.data_type, "INTEGER");
        assert!(id.primary_key);
        assert!(id.autoincrement);
        assert!(!id.nullable);

        let fk = ColumnDescriptor::new("author_id", "TEXT")
            .not_null()
            .references("authors", "author_id");
        assert_eq!(
            fk.foreign_key,
            Some(ForeignKey {
                table: "authors".to_string(),
                column: "author_id".to_string()
            })
        );
    }

    #[test]
    fn test_foreign_key_omitted_when_absent() {
        let json = serde_json::to_value(ColumnDescriptor::new("url", "TEXT")).unwrap();
        assert!(json.get("foreign_key").is_none());
        assert_eq!(json["nullable"], true);
    }

    #[test]
    fn test_cardinality_serialization() {
        assert_eq!(
            serde_json::to_string(&Cardinality::ManyToOne).unwrap(),
            "\"many-to-one\""
        );
    }
}
