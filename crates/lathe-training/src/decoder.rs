use crate::dataset::{Column, Dataset, DatasetId};
use crate::error::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// An upload split into its `data:<mime>;base64` prefix and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedUpload<'a> {
    pub content_type: Option<&'a str>,
    pub payload: &'a str,
}

impl<'a> EncodedUpload<'a> {
    pub fn parse(blob: &'a str) -> Result<Self, DecodeError> {
        let (prefix, payload) = blob.split_once(',').ok_or(DecodeError::MissingDelimiter)?;

        let content_type = prefix
            .strip_prefix("data:")
            .map(|rest| rest.split(';').next().unwrap_or(rest))
            .filter(|mime| !mime.is_empty());

        Ok(Self { content_type, payload })
    }

    pub fn bytes(&self) -> Result<Vec<u8>, DecodeError> {
        let compact: String = self.payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(STANDARD.decode(compact)?)
    }
}

/// Decode a `data:<mime>;base64,<payload>` upload into a typed [`Dataset`].
///
/// The payload is CSV with a header row. Column types are inferred here so that
/// non-numeric features are visible before any model sees them.
pub fn decode(blob: &str) -> Result<Dataset, DecodeError> {
    let upload = EncodedUpload::parse(blob)?;
    let bytes = upload.bytes()?;
    let id = DatasetId::from_bytes(&bytes);
    let text = String::from_utf8(bytes)?;
    parse_csv(id, &text)
}

/// Inverse of [`decode`]'s transport layer, for callers holding raw file bytes.
#[must_use]
pub fn encode_upload(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

fn parse_csv(id: DatasetId, text: &str) -> Result<Dataset, DecodeError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(String::is_empty) {
        return Err(DecodeError::NoColumns);
    }
    for (idx, name) in headers.iter().enumerate() {
        if headers[..idx].contains(name) {
            return Err(DecodeError::DuplicateColumn(name.clone()));
        }
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut n_rows = 0;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, value) in record.iter().enumerate() {
            if value.trim().is_empty() {
                return Err(DecodeError::MissingValue { row: row + 1, column: headers[col].clone() });
            }
            cells[col].push(value.to_string());
        }
        n_rows += 1;
    }

    let columns = headers.into_iter().zip(cells).map(|(name, values)| Column::infer(name, values)).collect();
    tracing::debug!(dataset_id = %id, rows = n_rows, "decoded upload");
    Ok(Dataset::new(id, columns, n_rows))
}
