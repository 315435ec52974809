use crate::db::db::Db;
use crate::libs::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

const INSERT_IMPORT: &str = "INSERT INTO csv_imports (file_name, file_contents) VALUES (?1, ?2)";
const UPDATE_DUPLICATES: &str = "UPDATE csv_imports SET duplicate_time_entry_ids = ?2 WHERE id = ?1";
const SELECT_IMPORT: &str = "SELECT id, file_name, file_contents, duplicate_time_entry_ids FROM csv_imports WHERE id = ?1";
const SELECT_ALL_IMPORTS: &str = "SELECT id, file_name, file_contents, duplicate_time_entry_ids FROM csv_imports ORDER BY id";

/// One uploaded file, kept verbatim for audit and replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImport {
    pub id: Option<i64>,
    pub file_name: String,
    pub file_contents: String,
    /// Stored entries this file duplicated.
    pub duplicate_time_entry_ids: Vec<i64>,
}

impl CsvImport {
    pub fn new(file_name: &str, file_contents: &str) -> Self {
        CsvImport {
            id: None,
            file_name: file_name.to_string(),
            file_contents: file_contents.to_string(),
            duplicate_time_entry_ids: Vec::new(),
        }
    }
}

pub struct CsvImports {
    conn: Connection,
}

impl CsvImports {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { conn: db.conn }
    }

    pub fn get(&self, id: i64) -> Result<CsvImport> {
        get(&self.conn, id)
    }

    pub fn list(&self) -> Result<Vec<CsvImport>> {
        let mut stmt = self.conn.prepare(SELECT_ALL_IMPORTS)?;
        let imports = stmt.query_map([], map_import)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(imports)
    }
}

/// Stores `import` and returns it with its new ID.
pub fn insert(conn: &Connection, import: &CsvImport) -> Result<CsvImport> {
    conn.execute(INSERT_IMPORT, params![import.file_name, import.file_contents])?;
    Ok(CsvImport {
        id: Some(conn.last_insert_rowid()),
        duplicate_time_entry_ids: Vec::new(),
        ..import.clone()
    })
}

pub fn set_duplicates(conn: &Connection, id: i64, ids: &[i64]) -> Result<()> {
    let encoded = serde_json::to_string(ids).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    if conn.execute(UPDATE_DUPLICATES, params![id, encoded])? == 0 {
        return Err(Error::NotFound { entity: "CSV import", id });
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<CsvImport> {
    conn.query_row(SELECT_IMPORT, params![id], map_import)
        .optional()?
        .ok_or(Error::NotFound { entity: "CSV import", id })
}

fn map_import(row: &rusqlite::Row) -> rusqlite::Result<CsvImport> {
    let duplicates: String = row.get(3)?;
    Ok(CsvImport {
        id: row.get(0)?,
        file_name: row.get(1)?,
        file_contents: row.get(2)?,
        duplicate_time_entry_ids: serde_json::from_str(&duplicates).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_file_and_duplicates() {
        let db = Db::open_in_memory().unwrap();
        let import = insert(&db.conn, &CsvImport::new("week1.csv", "time started,time ended,comment\n")).unwrap();
        let id = import.id.unwrap();

        set_duplicates(&db.conn, id, &[4, 9]).unwrap();

        let imports = CsvImports::from_db(db);
        let stored = imports.get(id).unwrap();
        assert_eq!(stored.file_name, "week1.csv");
        assert_eq!(stored.file_contents, "time started,time ended,comment\n");
        assert_eq!(stored.duplicate_time_entry_ids, vec![4, 9]);
        assert_eq!(imports.list().unwrap().len(), 1);
    }

    #[test]
    fn missing_import() {
        let db = Db::open_in_memory().unwrap();
        assert!(matches!(get(&db.conn, 42), Err(Error::NotFound { id: 42, .. })));
        assert!(matches!(set_duplicates(&db.conn, 42, &[]), Err(Error::NotFound { .. })));
    }
}
