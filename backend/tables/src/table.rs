use std::collections::BTreeMap;

use serde::{Serialize, ser::Error as _};
use serde_json::{Map, Value};

use crate::{Record, Result, StoreError};

/// Header plus string rows, the common shape of a CSV file and a sheet range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// First row is the header, the rest are data rows.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let headers = values.remove(0);

        Self {
            headers,
            rows: values,
        }
    }

    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.headers.clone());
        values.extend(self.rows.iter().cloned());

        values
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// False for a missing header or one made only of empty cells.
    pub fn has_header(&self) -> bool {
        !is_blank(&self.headers)
    }

    /// True when every cell of the data row is empty, or the row does not exist.
    pub fn is_blank(&self, row: usize) -> bool {
        self.rows.get(row).is_none_or(|r| is_blank(r))
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Missing trailing cells read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First data row whose `column` cell equals `value`.
    pub fn position(&self, column: &str, value: &str) -> Option<usize> {
        let column = self.column(column)?;

        (0..self.rows.len()).find(|&row| self.cell(row, column) == value)
    }

    pub fn record_at<R: Record>(&self, index: usize) -> Result<R> {
        let mut object = Map::new();

        for (column, header) in self.headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }

            object.insert(
                header.clone(),
                Value::String(self.cell(index, column).to_string()),
            );
        }

        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Every non-blank row as a record.
    pub fn records<R: Record>(&self) -> Result<Vec<R>> {
        (0..self.rows.len())
            .filter(|&row| !self.is_blank(row))
            .map(|row| self.record_at(row))
            .collect()
    }

    /// Serialize a record in header order. Header columns the record lacks stay empty.
    pub fn row_from<R: Serialize>(&self, record: &R) -> Result<Vec<String>> {
        let Value::Object(object) = serde_json::to_value(record)? else {
            return Err(serde_json::Error::custom("record is not an object").into());
        };

        Ok(self
            .headers
            .iter()
            .map(|header| match object.get(header) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect())
    }

    /// Overwrite named columns of a row and return the new row.
    pub fn patch(&mut self, index: usize, updates: &BTreeMap<String, String>) -> Result<Vec<String>> {
        let mut columns = Vec::with_capacity(updates.len());
        for (name, value) in updates {
            let column = self
                .column(name)
                .ok_or_else(|| StoreError::UnknownColumn(name.clone()))?;
            columns.push((column, value));
        }

        let width = self.headers.len();
        let row = self.rows.get_mut(index).ok_or(StoreError::RowOutOfRange {
            table: String::new(),
            index,
        })?;

        if row.len() < width {
            row.resize(width, String::new());
        }

        for (column, value) in columns {
            row[column] = value.clone();
        }

        Ok(row.clone())
    }

    /// Replace a leading prefix in every cell of `column`. Returns how many cells changed.
    pub fn rewrite_prefix(&mut self, column: &str, from: &str, to: &str) -> Result<usize> {
        let column = self
            .column(column)
            .ok_or_else(|| StoreError::UnknownColumn(column.to_string()))?;

        let mut changed = 0;
        for row in &mut self.rows {
            let Some(cell) = row.get_mut(column) else {
                continue;
            };

            if let Some(rest) = cell.strip_prefix(from) {
                if from == to {
                    continue;
                }

                *cell = format!("{to}{rest}");
                changed += 1;
            }
        }

        Ok(changed)
    }

    /// Rows with content but an empty first cell. Fully empty rows are skipped.
    pub fn missing_ids(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !is_blank(row) && row.first().is_none_or(|id| id.is_empty()))
            .map(|(index, _)| index)
            .collect()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}
