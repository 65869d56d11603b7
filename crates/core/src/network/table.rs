//! Node table: the engine's abstract edge-list input

use crate::error::{Error, Result};
use crate::network::NetworkId;

/// Identifier column name
pub const ID_COLUMN: &str = "id";
/// Downstream identifier column name
pub const TO_ID_COLUMN: &str = "toid";

/// A table of stream network nodes.
///
/// Each row is one segment: its identifier, the identifier of its immediate
/// downstream neighbour (or the outlet sentinel), and any number of named
/// numeric attribute columns such as `area` or `length`. Missing attribute
/// values are stored as `NaN`.
///
/// # Example
///
/// ```ignore
/// use hydronet_core::network::NodeTable;
///
/// let table = NodeTable::new(vec![1, 2, 3], vec![2, 3, 0])?
///     .with_column("length", vec![2.0, 3.0, 5.0])?;
/// assert_eq!(table.column("length")?, &[2.0, 3.0, 5.0]);
/// ```
#[derive(Debug, Clone)]
pub struct NodeTable<I: NetworkId> {
    ids: Vec<I>,
    to_ids: Vec<I>,
    /// Attribute columns in insertion order
    columns: Vec<(String, Vec<f64>)>,
    /// Source columns dropped because they hold non-numeric values
    non_numeric: Vec<String>,
}

impl<I: NetworkId> NodeTable<I> {
    /// Create a table from identifier and downstream identifier columns.
    ///
    /// Fails when the columns differ in length or when an identifier is not
    /// usable as a node id (non-finite, or equal to the outlet sentinel).
    pub fn new(ids: Vec<I>, to_ids: Vec<I>) -> Result<Self> {
        if ids.len() != to_ids.len() {
            return Err(Error::ColumnLength {
                name: TO_ID_COLUMN.to_string(),
                expected: ids.len(),
                actual: to_ids.len(),
            });
        }

        for (row, id) in ids.iter().enumerate() {
            if !id.is_valid_node_id() {
                return Err(Error::InvalidIdentifier {
                    row,
                    reason: format!("{} cannot identify a node", id),
                });
            }
        }

        Ok(Self {
            ids,
            to_ids,
            columns: Vec::new(),
            non_numeric: Vec::new(),
        })
    }

    /// Builder form of [`insert_column`](Self::insert_column)
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Add an attribute column, replacing any column with the same name.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.ids.len() {
            return Err(Error::ColumnLength {
                name,
                expected: self.ids.len(),
                actual: values.len(),
            });
        }

        self.non_numeric.retain(|n| *n != name);
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    /// Get an attribute column by name.
    ///
    /// Fails with `IncompatibleColumn` if the source had a column of that
    /// name with non-numeric values, and `MissingColumn` otherwise.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        if let Some((_, values)) = self.columns.iter().find(|(n, _)| n == name) {
            return Ok(values.as_slice());
        }
        if self.non_numeric.iter().any(|n| n == name) {
            return Err(Error::IncompatibleColumn {
                name: name.to_string(),
                reason: "expected numeric values".to_string(),
            });
        }
        Err(Error::MissingColumn {
            name: name.to_string(),
        })
    }

    /// Record a source column that could not be read as numbers
    pub fn mark_non_numeric(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.non_numeric.contains(&name) {
            self.non_numeric.push(name);
        }
    }

    /// Whether an attribute column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Attribute column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Node identifiers
    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    /// Downstream identifiers
    pub fn to_ids(&self) -> &[I] {
        &self.to_ids
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Build a new table from the given rows, in the given order.
    ///
    /// Fails with `InvalidParameter` if a row index is out of range.
    pub fn select(&self, rows: &[usize]) -> Result<Self> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.len()) {
            return Err(Error::InvalidParameter {
                name: "rows",
                value: bad.to_string(),
                reason: format!("table has {} rows", self.len()),
            });
        }

        Ok(Self {
            ids: rows.iter().map(|&r| self.ids[r]).collect(),
            to_ids: rows.iter().map(|&r| self.to_ids[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), rows.iter().map(|&r| values[r]).collect()))
                .collect(),
            non_numeric: self.non_numeric.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new_length_mismatch() {
        let err = NodeTable::new(vec![1_i64, 2], vec![0]).unwrap_err();
        assert!(matches!(err, Error::ColumnLength { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_table_rejects_sentinel_id() {
        let err = NodeTable::new(vec![1_i64, 0], vec![0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { row: 1, .. }));

        let err = NodeTable::new(vec![f64::NAN], vec![0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { row: 0, .. }));
    }

    #[test]
    fn test_table_columns() {
        let mut table = NodeTable::new(vec![1_i64, 2], vec![2, 0])
            .unwrap()
            .with_column("area", vec![1.0, 2.0])
            .unwrap();

        assert!(table.has_column("area"));
        assert!(matches!(table.column("length"), Err(Error::MissingColumn { .. })));
        assert!(table.insert_column("length", vec![1.0]).is_err());

        table.insert_column("area", vec![5.0, 6.0]).unwrap();
        assert_eq!(table.column("area").unwrap(), &[5.0, 6.0]);
        assert_eq!(table.column_names().count(), 1);
    }

    #[test]
    fn test_table_non_numeric_column() {
        let mut table = NodeTable::new(vec![1_i64, 2], vec![2, 0]).unwrap();
        table.mark_non_numeric("area");

        assert!(matches!(table.column("area"), Err(Error::IncompatibleColumn { .. })));
        assert!(matches!(table.column("length"), Err(Error::MissingColumn { .. })));

        table.insert_column("area", vec![1.0, 2.0]).unwrap();
        assert_eq!(table.column("area").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_table_select() {
        let table = NodeTable::new(vec![1_i64, 2, 3], vec![2, 3, 0])
            .unwrap()
            .with_column("length", vec![1.0, 2.0, 3.0])
            .unwrap();

        let reordered = table.select(&[2, 0, 1]).unwrap();
        assert_eq!(reordered.ids(), &[3, 1, 2]);
        assert_eq!(reordered.to_ids(), &[0, 2, 3]);
        assert_eq!(reordered.column("length").unwrap(), &[3.0, 1.0, 2.0]);
        assert!(table.select(&[3]).is_err());
    }
}
