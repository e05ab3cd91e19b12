//! In-memory model of one branch transaction's rollback record.
//!
//! Containers serialize structurally with serde; only the column values are
//! polymorphic and go through the installed codec tables. Unknown properties
//! in an encoded document are ignored on decode, so logs written by newer
//! runtime versions stay readable.

use std::sync::Arc;

use minitx_common::value::CellValue;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Statement kind that produced an undo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlOp {
    Insert,
    Update,
    Delete,
}

/// Declared SQL type of a captured column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    Blob,
    Clob,
    Other,
}

/// Role of a column within its table's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyType {
    #[default]
    Null,
    PrimaryKey,
}

impl KeyType {
    pub fn is_null(&self) -> bool {
        matches!(self, KeyType::Null)
    }
}

/// One captured column: name, declared SQL type, and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "KeyType::is_null")]
    pub key_type: KeyType,
    pub sql_type: SqlType,
    pub value: CellValue,
}

impl Field {
    pub fn new(name: impl Into<String>, sql_type: SqlType, value: CellValue) -> Self {
        Self {
            name: name.into(),
            key_type: KeyType::Null,
            sql_type,
            value,
        }
    }

    pub fn primary_key(name: impl Into<String>, sql_type: SqlType, value: CellValue) -> Self {
        Self {
            name: name.into(),
            key_type: KeyType::PrimaryKey,
            sql_type,
            value,
        }
    }
}

/// A row image: columns in insertion order, names unique within the row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Columns marked as primary key in this row.
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|field| field.key_type == KeyType::PrimaryKey)
    }
}

/// Ordered row images for one table, before or after a statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRecords {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
}

impl TableRecords {
    pub fn new(table_name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            table_name: table_name.into(),
            rows,
        }
    }

    /// Empty images are legal: an insert has no before image and a delete
    /// has no after image.
    pub fn is_empty(&self) -> bool {
        self.table_name.is_empty() && self.rows.is_empty()
    }
}

/// Runtime schema handle used by the rollback executor. Never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub table_name: String,
    pub primary_keys: Vec<String>,
}

/// Undo entry for one statement against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlUndoLog {
    pub sql_type: SqlOp,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "TableRecords::is_empty")]
    pub before_image: TableRecords,
    #[serde(default, skip_serializing_if = "TableRecords::is_empty")]
    pub after_image: TableRecords,
    /// Rebuilt from the catalog after decode, never carried in the log.
    #[serde(skip)]
    pub table_meta: Option<Arc<TableMeta>>,
}

impl SqlUndoLog {
    pub fn new(sql_type: SqlOp, table_name: impl Into<String>) -> Self {
        Self {
            sql_type,
            table_name: table_name.into(),
            before_image: TableRecords::default(),
            after_image: TableRecords::default(),
            table_meta: None,
        }
    }
}

/// Root rollback record for one branch transaction.
///
/// The identifiers are opaque to the codec and passed through unchanged. The
/// all-default record is reserved: it encodes to the canonical empty-log
/// token `{}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BranchUndoLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sql_undo_logs: Vec<SqlUndoLog>,
}

impl BranchUndoLog {
    pub fn new(xid: impl Into<String>, branch_id: i64) -> Self {
        Self {
            xid: Some(xid.into()),
            branch_id: Some(branch_id),
            sql_undo_logs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_serializes_to_empty_object() {
        let bytes = serde_json::to_vec(&BranchUndoLog::default()).unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[test]
    fn test_row_field_lookup() {
        let row = Row::new(vec![
            Field::primary_key("id", SqlType::BigInt, CellValue::Int64(1)),
            Field::new("name", SqlType::Varchar, CellValue::from("a")),
        ]);
        assert_eq!(row.field("name").unwrap().sql_type, SqlType::Varchar);
        assert!(row.field("missing").is_none());
        assert_eq!(row.primary_key_fields().count(), 1);
    }

    #[test]
    fn test_sql_type_round_trips_through_str() {
        let parsed: SqlType = "Varchar".parse().unwrap();
        assert_eq!(parsed, SqlType::Varchar);
        assert_eq!(SqlType::BigInt.to_string(), "BigInt");
    }
}
