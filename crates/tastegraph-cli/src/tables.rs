//! CSV tables: watch history, anime catalogue, user profiles, candidate works.

use std::path::Path;
use std::sync::Arc;
use tastegraph::profile::{Catalogue, CatalogueEntry, HistoryEntry};
use tastegraph::{FeatureMatrix, FeatureSchema, Work};
use thiserror::Error;
use tracing::info;

/// First column of a profile table.
pub const USER_COLUMN: &str = "username";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("{path}:{line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        path: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Features(#[from] tastegraph::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

/// An opened CSV file with its header.
struct Table {
    path: String,
    reader: csv::Reader<std::fs::File>,
    headers: csv::StringRecord,
}

impl Table {
    fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let csv_err = |source| TableError::Csv {
            path: display.clone(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();
        Ok(Self {
            path: display,
            reader,
            headers,
        })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn records(&mut self) -> Result<Vec<csv::StringRecord>> {
        let path = &self.path;
        self.reader
            .records()
            .map(|r| {
                r.map_err(|source| TableError::Csv {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Blank cells read as `None`.
    fn number(&self, record: &csv::StringRecord, col: usize, column: &str) -> Result<Option<f64>> {
        let raw = record.get(col).unwrap_or("");
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>().map(Some).map_err(|_| TableError::InvalidNumber {
            path: self.path.clone(),
            line: record.position().map(|p| p.line()).unwrap_or(0),
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}

fn cell(record: &csv::StringRecord, col: Option<usize>) -> &str {
    col.and_then(|c| record.get(c)).unwrap_or("")
}

/// Read `username,anime_id,score` rows grouped by user, users in order of first appearance.
pub fn read_history(path: &Path) -> Result<Vec<(String, Vec<HistoryEntry>)>> {
    let mut table = Table::open(path)?;
    let user_col = table.column("username")?;
    let anime_col = table.column("anime_id")?;
    let score_col = table.column("score")?;

    let mut users: Vec<(String, Vec<HistoryEntry>)> = Vec::new();
    let mut index = std::collections::HashMap::new();
    let mut rows = 0usize;
    for record in table.records()? {
        let user = cell(&record, Some(user_col)).to_string();
        let score = table.number(&record, score_col, "score")?;
        let entry = HistoryEntry::new(cell(&record, Some(anime_col)), score);
        let slot = *index.entry(user.clone()).or_insert_with(|| {
            users.push((user, Vec::new()));
            users.len() - 1
        });
        users[slot].1.push(entry);
        rows += 1;
    }
    info!(path = %table.path, rows, users = users.len(), "loaded watch history");
    Ok(users)
}

/// Read `id,nome,generos,source` rows keyed by id.
pub fn read_catalogue(path: &Path) -> Result<Catalogue> {
    let mut table = Table::open(path)?;
    let id_col = table.column("id")?;
    let title_col = table.optional_column("nome");
    let genres_col = table.column("generos")?;
    let source_col = table.column("source")?;

    let mut catalogue = Catalogue::new();
    for record in table.records()? {
        let entry = CatalogueEntry::from_joined(
            cell(&record, title_col),
            cell(&record, Some(genres_col)),
            cell(&record, Some(source_col)),
        );
        catalogue.insert(cell(&record, Some(id_col)).to_string(), entry);
    }
    info!(path = %table.path, titles = catalogue.len(), "loaded catalogue");
    Ok(catalogue)
}

/// Read a user-feature table: the first column is the user id, the rest are feature keys.
pub fn read_profiles(path: &Path, schema: &Arc<FeatureSchema>) -> Result<FeatureMatrix> {
    let mut table = Table::open(path)?;
    let header: Vec<String> = table.headers.iter().skip(1).map(String::from).collect();

    let mut rows = Vec::new();
    for record in table.records()? {
        let id = cell(&record, Some(0)).to_string();
        let mut values = Vec::with_capacity(header.len());
        for (offset, column) in header.iter().enumerate() {
            values.push(table.number(&record, offset + 1, column)?.unwrap_or(0.0));
        }
        rows.push((id, values));
    }

    let matrix = FeatureMatrix::from_named_columns(Arc::clone(schema), &header, rows)?;
    info!(path = %table.path, users = matrix.len(), "loaded profiles");
    Ok(matrix)
}

/// Write a user-feature table with a `username` column followed by the schema's keys.
pub fn write_profiles(path: &Path, profiles: &FeatureMatrix) -> Result<()> {
    let display = path.display().to_string();
    let csv_err = |source| TableError::Csv {
        path: display.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    let mut header = vec![USER_COLUMN.to_string()];
    header.extend(profiles.schema().keys());
    writer.write_record(&header).map_err(csv_err)?;

    for (id, row) in profiles.iter() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(id.to_string());
        record.extend(row.iter().map(f64::to_string));
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| TableError::Io {
        path: display.clone(),
        source,
    })?;
    Ok(())
}

/// Read `id,nome,score,tipo,generos` rows. Only `id` is required.
pub fn read_works(path: &Path) -> Result<Vec<Work>> {
    let mut table = Table::open(path)?;
    let id_col = table.column("id")?;
    let title_col = table.optional_column("nome");
    let score_col = table.optional_column("score");
    let kind_col = table.optional_column("tipo");
    let genres_col = table.optional_column("generos");

    let mut works = Vec::new();
    for record in table.records()? {
        let score = match score_col {
            Some(col) => table.number(&record, col, "score")?,
            None => None,
        };
        let kind = Some(cell(&record, kind_col)).filter(|k| !k.is_empty());
        works.push(Work::new(
            cell(&record, Some(id_col)),
            cell(&record, title_col),
            score,
            kind,
            cell(&record, genres_col),
        ));
    }
    info!(path = %table.path, works = works.len(), "loaded candidate works");
    Ok(works)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_history_groups_users() {
        let file = csv_file("username,anime_id,score\nkai,1,9\nmio,2,8\nkai,3,\n");
        let users = read_history(file.path()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].0, "kai");
        assert_eq!(users[0].1.len(), 2);
        assert_eq!(users[0].1[1].score, None);
        assert_eq!(users[1].1[0].anime_id, "2");
    }

    #[test]
    fn test_read_history_reports_bad_numbers() {
        let file = csv_file("username,anime_id,score\nkai,1,nine\n");
        let err = read_history(file.path()).unwrap_err();
        assert!(matches!(err, TableError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn test_missing_column() {
        let file = csv_file("id,nome\n1,Blade Saga\n");
        assert!(matches!(
            read_catalogue(file.path()),
            Err(TableError::MissingColumn { column, .. }) if column == "generos"
        ));
    }

    #[test]
    fn test_read_works_defaults() {
        let file = csv_file("id,nome,score,tipo,generos\nw1,Night Blade,8.2,Light Novel,\"Action, Fantasy\"\nw2,Hidden,,,\n");
        let works = read_works(file.path()).unwrap();
        assert_eq!(works[0].kind.as_deref(), Some("Light Novel"));
        assert_eq!(works[0].genre_list(), vec!["Action", "Fantasy"]);
        assert_eq!(works[1].score, None);
        assert_eq!(works[1].kind, None);
        assert!(works[1].genre_list().is_empty());
    }

    #[test]
    fn test_read_profiles_rejects_bad_weights() {
        let schema = Arc::new(FeatureSchema::default());
        let mut header = vec![USER_COLUMN.to_string()];
        header.extend(schema.keys());
        for bad in ["NaN", "-5"] {
            let mut row = vec!["kai".to_string()];
            row.extend((0..schema.dim()).map(|i| if i == 5 { bad.to_string() } else { "0".to_string() }));
            let file = csv_file(&format!("{}\n{}\n", header.join(","), row.join(",")));
            assert!(
                matches!(
                    read_profiles(file.path(), &schema),
                    Err(TableError::Features(tastegraph::Error::InvalidWeight { .. }))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_profiles_written_then_read_back() {
        let schema = Arc::new(FeatureSchema::default());
        let mut profiles = FeatureMatrix::new(Arc::clone(&schema));
        let mut row = vec![0.0; schema.dim()];
        row[0] = 1.0;
        row[5] = 0.5;
        profiles.push_row("kai", row).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.csv");
        write_profiles(&path, &profiles).unwrap();
        let read = read_profiles(&path, &schema).unwrap();
        assert_eq!(read, profiles);
    }
}
