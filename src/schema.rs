//! Structural description of the refined store
//!
//! The model is declared statically rather than inspected from data, so
//! two calls always produce the same descriptor and the same bytes.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::SchemaSection;
use crate::error::{RefinerError, RefinerResult};
use crate::models::{
    Cardinality, ColumnDescriptor, ForeignKeyDetails, ModelSchema, RelationshipDescriptor,
    SchemaDescriptor, TableDescriptor,
};

/// Tables and relationships of the refined store
pub fn model_schema() -> ModelSchema {
    let authors = TableDescriptor::new(
        "authors",
        vec![
            ColumnDescriptor::new("author_id", "TEXT").primary_key(),
            ColumnDescriptor::new("created_time", "DATETIME").not_null(),
        ],
    );

    let entries = TableDescriptor::new(
        "entries",
        vec![
            ColumnDescriptor::new("entry_id", "INTEGER").autoincrement(),
            ColumnDescriptor::new("author_id", "TEXT")
                .not_null()
                .references("authors", "author_id"),
            ColumnDescriptor::new("url", "TEXT").not_null(),
            ColumnDescriptor::new("time_spent", "INTEGER").not_null(),
            ColumnDescriptor::new("timestamp", "DATETIME").not_null(),
        ],
    );

    let stats = TableDescriptor::new(
        "stats",
        vec![
            ColumnDescriptor::new("stats_id", "INTEGER").autoincrement(),
            ColumnDescriptor::new("author_id", "TEXT")
                .not_null()
                .unique()
                .references("authors", "author_id"),
            ColumnDescriptor::new("url_count", "INTEGER").not_null(),
            ColumnDescriptor::new("average_time_spent", "REAL").not_null(),
            ColumnDescriptor::new("browsing_type", "TEXT").not_null(),
        ],
    );

    let relationships = vec![
        RelationshipDescriptor {
            source_table: "entries".to_string(),
            target_table: "authors".to_string(),
            cardinality: Cardinality::ManyToOne,
            foreign_key_details: ForeignKeyDetails {
                source_column: "author_id".to_string(),
                target_column: "author_id".to_string(),
            },
        },
        RelationshipDescriptor {
            source_table: "stats".to_string(),
            target_table: "authors".to_string(),
            cardinality: Cardinality::OneToOne,
            foreign_key_details: ForeignKeyDetails {
                source_column: "author_id".to_string(),
                target_column: "author_id".to_string(),
            },
        },
    ];

    ModelSchema {
        tables: vec![authors, entries, stats],
        relationships,
    }
}

/// Wrap the model schema with its published metadata
pub fn schema_descriptor(section: &SchemaSection) -> SchemaDescriptor {
    SchemaDescriptor {
        name: section.name.clone(),
        version: section.version.clone(),
        description: section.description.clone(),
        dialect: section.dialect.clone(),
        schema: model_schema(),
    }
}

/// Serialize with a 4-space indent
pub fn to_json_pretty<T: Serialize>(value: &T) -> RefinerResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| RefinerError::Validation(format!("Failed to serialize: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| RefinerError::Validation(format!("Serialized output is not UTF-8: {}", e)))
}
