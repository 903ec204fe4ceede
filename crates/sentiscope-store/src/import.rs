//! Bulk import of sentiment rows
//!
//! Rows are merged by id in a single transaction. Group and scores are always
//! re-derived from the labels, whatever the source file says.

use crate::error::{Result, StoreError};
use crate::sentiments::upsert_sentiment;
use crate::store::Store;
use rusqlite::Connection;
use sentiscope_core::{Month, NewSentiment};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One row of an import file. Extra fields such as `grupo_sentimento` or
/// `score` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportRow {
    pub id: i64,
    pub atendente: String,
    #[serde(alias = "sentimento do cliente")]
    pub sentimento_do_cliente: String,
    pub mes: String,
    pub nome_cliente: String,
    pub sentimento_atendente: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub replaced: usize,
}

/// Supported import file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Comma-separated with a header row
    Csv,
    /// A JSON array of objects
    Json,
}

impl ImportFormat {
    /// Pick the format from the file extension; anything but `.json` is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Parse rows in the given format
pub fn parse_rows<R: Read>(reader: R, format: ImportFormat) -> Result<Vec<ImportRow>> {
    match format {
        ImportFormat::Csv => parse_csv(reader),
        ImportFormat::Json => Ok(serde_json::from_reader(reader)?),
    }
}

/// Parse a CSV export with a header row; columns are matched by name
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Merge rows into the table by id
pub fn import_rows(conn: &Connection, rows: &[ImportRow]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for row in rows {
        if row.id <= 0 {
            return Err(StoreError::Import(format!(
                "row id must be positive, got {}",
                row.id
            )));
        }
        if Month::parse(&row.mes).is_none() {
            tracing::warn!(id = row.id, mes = %row.mes, "Imported row has an unknown month");
        }

        let new = NewSentiment::from_names(
            row.atendente.as_str(),
            row.nome_cliente.as_str(),
            row.sentimento_do_cliente.as_str(),
            row.sentimento_atendente.as_str(),
            row.mes.as_str(),
        );

        if upsert_sentiment(conn, row.id, &new)? {
            summary.replaced += 1;
        } else {
            summary.inserted += 1;
        }
    }

    Ok(summary)
}

impl Store {
    /// Import a CSV or JSON file of sentiment rows in one transaction
    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let format = ImportFormat::from_path(path.as_ref());
        let file = std::fs::File::open(path.as_ref())?;
        let rows = parse_rows(std::io::BufReader::new(file), format)?;
        tracing::info!("Importing {} sentiment rows from {}", rows.len(), path.as_ref().display());

        let summary = self.call(move |tx| import_rows(tx, &rows)).await?;
        tracing::info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            "Import complete"
        );
        Ok(summary)
    }
}
