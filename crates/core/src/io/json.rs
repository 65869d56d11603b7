//! JSON node table reading/writing
//!
//! Tables are stored as an array of records:
//!
//! ```json
//! [
//!   { "ID": 1, "toID": 2, "length": 2.0 },
//!   { "ID": 2, "toID": 0, "length": 3.5 }
//! ]
//! ```
//!
//! Keys are normalised to lower case on read. A `null` or absent `toid` is
//! the outlet sentinel; a `null` or absent attribute value is missing (`NaN`).
//! Non-numeric attribute columns are skipped.

use crate::error::{Error, Result};
use crate::network::{NetworkId, NodeTable, TerminalTable, ID_COLUMN, TO_ID_COLUMN};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A node table with its identifier type detected from the data
#[derive(Debug, Clone)]
pub enum LoadedTable {
    /// Every identifier is integral
    Integer(NodeTable<i64>),
    /// At least one identifier is real-valued
    Real(NodeTable<f64>),
}

impl LoadedTable {
    pub fn len(&self) -> usize {
        match self {
            LoadedTable::Integer(t) => t.len(),
            LoadedTable::Real(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read a JSON node table from a file
pub fn read_node_table<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let file = File::open(path.as_ref())?;
    decode_node_table(BufReader::new(file))
}

/// Read a JSON node table from an in-memory string
pub fn read_node_table_from_str(data: &str) -> Result<LoadedTable> {
    decode_node_table(data.as_bytes())
}

/// Internal: decode from any reader
fn decode_node_table<R: Read>(reader: R) -> Result<LoadedTable> {
    let raw: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
    let records: Vec<Map<String, Value>> = raw
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect()
        })
        .collect();

    let mut ids = Vec::with_capacity(records.len());
    let mut to_ids = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let id = record.get(ID_COLUMN).ok_or_else(|| Error::MissingColumn {
            name: ID_COLUMN.to_string(),
        })?;
        if !id.is_number() {
            return Err(Error::InvalidIdentifier {
                row,
                reason: format!("expected a number, got {}", id),
            });
        }
        let to_id = match record.get(TO_ID_COLUMN) {
            None | Some(Value::Null) => Value::from(0),
            Some(v) if v.is_number() => v.clone(),
            Some(v) => {
                return Err(Error::InvalidIdentifier {
                    row,
                    reason: format!("toid must be a number or null, got {}", v),
                })
            }
        };
        ids.push(id.clone());
        to_ids.push(to_id);
    }

    let integral = ids.iter().chain(to_ids.iter()).all(|v| v.as_i64().is_some());
    let (columns, skipped) = attribute_columns(&records);

    if integral {
        let table = NodeTable::new(
            ids.iter().filter_map(Value::as_i64).collect(),
            to_ids.iter().filter_map(Value::as_i64).collect(),
        )?;
        Ok(LoadedTable::Integer(attach_columns(table, columns, &skipped)?))
    } else {
        let table = NodeTable::new(
            ids.iter().filter_map(Value::as_f64).collect(),
            to_ids.iter().filter_map(Value::as_f64).collect(),
        )?;
        Ok(LoadedTable::Real(attach_columns(table, columns, &skipped)?))
    }
}

/// Numeric attribute columns in key order, and the names of skipped
/// non-numeric columns
fn attribute_columns(records: &[Map<String, Value>]) -> (Vec<(String, Vec<f64>)>, Vec<String>) {
    let mut names: Vec<&String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if key != ID_COLUMN && key != TO_ID_COLUMN && !names.contains(&key) {
                names.push(key);
            }
        }
    }

    let mut columns = Vec::new();
    let mut skipped = Vec::new();
    'column: for name in names {
        let mut values = Vec::with_capacity(records.len());
        for record in records {
            match record.get(name) {
                None | Some(Value::Null) => values.push(f64::NAN),
                Some(Value::Number(n)) => values.push(n.as_f64().unwrap_or(f64::NAN)),
                Some(_) => {
                    tracing::debug!("Skipping non-numeric column '{}'", name);
                    skipped.push(name.clone());
                    continue 'column;
                }
            }
        }
        columns.push((name.clone(), values));
    }
    (columns, skipped)
}

fn attach_columns<I: NetworkId>(
    mut table: NodeTable<I>,
    columns: Vec<(String, Vec<f64>)>,
    skipped: &[String],
) -> Result<NodeTable<I>> {
    for (name, values) in columns {
        table.insert_column(name, values)?;
    }
    for name in skipped {
        table.mark_non_numeric(name.as_str());
    }
    Ok(table)
}

/// Write a node table as a JSON array of records
pub fn write_node_table<I, P>(table: &NodeTable<I>, path: P) -> Result<()>
where
    I: NetworkId,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_node_table(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a node table to a JSON string
pub fn node_table_to_string<I: NetworkId>(table: &NodeTable<I>) -> Result<String> {
    let mut buf = Vec::new();
    encode_node_table(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
}

fn encode_node_table<I: NetworkId, W: Write>(table: &NodeTable<I>, writer: W) -> Result<()> {
    let names: Vec<&str> = table.column_names().collect();
    let columns = names
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let mut record = Map::new();
        record.insert(ID_COLUMN.to_string(), serde_json::to_value(table.ids()[row])?);
        record.insert(TO_ID_COLUMN.to_string(), serde_json::to_value(table.to_ids()[row])?);
        for (name, values) in names.iter().zip(&columns) {
            let value = Number::from_f64(values[row]).map_or(Value::Null, Value::Number);
            record.insert(name.to_string(), value);
        }
        records.push(Value::Object(record));
    }

    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

/// Terminal identifier column name in written terminal tables
pub const TERMINAL_ID_COLUMN: &str = "terminalid";

/// Write an `id` → `terminalid` table.
///
/// Terminal identifiers keep the identifier type of the input; an
/// undefined terminal is written as `null`.
pub fn write_terminal_table<I, P>(table: &TerminalTable<I>, path: P) -> Result<()>
where
    I: NetworkId,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_terminal_table(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize an `id` → `terminalid` table to a JSON string
pub fn terminal_table_to_string<I: NetworkId>(table: &TerminalTable<I>) -> Result<String> {
    let mut buf = Vec::new();
    encode_terminal_table(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
}

fn encode_terminal_table<I: NetworkId, W: Write>(table: &TerminalTable<I>, writer: W) -> Result<()> {
    let mut records = Vec::with_capacity(table.len());
    for (id, terminal) in table.iter() {
        let mut record = Map::new();
        record.insert(ID_COLUMN.to_string(), serde_json::to_value(id)?);
        record.insert(TERMINAL_ID_COLUMN.to_string(), serde_json::to_value(terminal)?);
        records.push(Value::Object(record));
    }

    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integer_table() {
        let data = r#"[
            { "ID": 1, "toID": 2, "LENGTH": 2.0, "name": "a" },
            { "ID": 2, "toID": null, "length": null, "name": "b" }
        ]"#;

        let table = match read_node_table_from_str(data).unwrap() {
            LoadedTable::Integer(t) => t,
            LoadedTable::Real(_) => panic!("expected integer identifiers"),
        };
        assert_eq!(table.ids(), &[1, 2]);
        assert_eq!(table.to_ids(), &[2, 0]);
        let length = table.column("length").unwrap();
        assert_eq!(length[0], 2.0);
        assert!(length[1].is_nan());
        assert!(!table.has_column("name"));
        assert!(matches!(table.column("name"), Err(Error::IncompatibleColumn { .. })));
    }

    #[test]
    fn test_read_string_weight_is_incompatible() {
        let data = r#"[
            { "id": 1, "toid": 2, "area": 1.0 },
            { "id": 2, "toid": 0, "area": "large" }
        ]"#;
        let table = match read_node_table_from_str(data).unwrap() {
            LoadedTable::Integer(t) => t,
            LoadedTable::Real(_) => panic!("expected integer identifiers"),
        };
        let err = table.column("area").unwrap_err();
        assert!(matches!(err, Error::IncompatibleColumn { ref name, .. } if name == "area"));
    }

    #[test]
    fn test_terminal_ids_keep_integer_type() {
        use crate::network::{Diagnostics, NodeValues};

        let terminals = NodeValues::new(vec![1_i64, 2, 3], vec![Some(3), Some(3), None], Diagnostics::new());
        let text = terminal_table_to_string(&terminals).unwrap();
        let records: Vec<Value> = serde_json::from_str(&text).unwrap();

        assert_eq!(records[0]["id"], Value::from(1));
        assert_eq!(records[0][TERMINAL_ID_COLUMN].as_i64(), Some(3));
        assert!(records[0][TERMINAL_ID_COLUMN].is_i64());
        assert!(records[2][TERMINAL_ID_COLUMN].is_null());
        assert!(!text.contains("3.0"));
    }

    #[test]
    fn test_read_real_table() {
        let data = r#"[ { "id": 1.5, "toid": 2 }, { "id": 2, "toid": 0 } ]"#;
        match read_node_table_from_str(data).unwrap() {
            LoadedTable::Real(t) => assert_eq!(t.ids(), &[1.5, 2.0]),
            LoadedTable::Integer(_) => panic!("expected real identifiers"),
        }
    }

    #[test]
    fn test_read_missing_id_column() {
        let err = read_node_table_from_str(r#"[ { "toid": 0 } ]"#).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_read_non_numeric_id() {
        let err = read_node_table_from_str(r#"[ { "id": "a", "toid": 0 } ]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { row: 0, .. }));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");

        let table = NodeTable::new(vec![10_i64, 20], vec![20, 0])
            .unwrap()
            .with_column("area", vec![1.5, f64::NAN])
            .unwrap();
        write_node_table(&table, &path).unwrap();

        let back = match read_node_table(&path).unwrap() {
            LoadedTable::Integer(t) => t,
            LoadedTable::Real(_) => panic!("identifier type should survive a round trip"),
        };
        assert_eq!(back.ids(), table.ids());
        assert_eq!(back.column("area").unwrap()[0], 1.5);
        assert!(back.column("area").unwrap()[1].is_nan());
    }
}
