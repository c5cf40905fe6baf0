//! A header + rows table and its encodings.

use serde_json::{Map, Value};

use crate::format::BomFormat;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Encode as delimited text (csv/tsv) or as a JSON array of objects.
    pub fn encode(&self, format: BomFormat) -> Result<Vec<u8>, TableError> {
        match format {
            BomFormat::Csv | BomFormat::Tsv => self.encode_delimited(format.delimiter()),
            BomFormat::Json => Ok(serde_json::to_vec_pretty(&self.json_rows())?),
        }
    }

    fn encode_delimited(&self, delimiter: u8) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| TableError::Flush(e.error().to_string()))
    }

    fn json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(Value::String))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to write delimited output: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to flush output: {0}")]
    Flush(String),
}
