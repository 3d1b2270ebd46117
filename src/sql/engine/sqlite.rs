use std::path::Path;

use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        compiler::WhereClause,
        schema::{Column, Table},
        types::{DataType, Row, Value},
    },
};

use super::Engine;

const MEMORY_PATH: &str = ":memory:";

/// SQLite backed engine, one connection per instance
///
/// The connection closes when the engine is dropped.
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// Opens the database at `path`, creating missing parent directories.
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let connect_error = |cause: String| Error::Connect {
            path: path.display().to_string(),
            cause,
        };

        if path != Path::new(MEMORY_PATH) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| connect_error(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| connect_error(e.to_string()))?;
        // Opening is lazy; read the header now so a corrupt file fails here
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(|e| connect_error(e.to_string()))?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(MEMORY_PATH)
    }
}

impl Engine for SqliteEngine {
    fn ensure_table(&mut self, table: &Table) -> Result<()> {
        table.validate()?;
        let sql = table.create_sql();
        debug!(%sql, "ensuring table");
        self.conn.execute(&sql, [])?;
        Ok(())
    }

    fn insert_row(&mut self, table_name: &str, row: &Row) -> Result<usize> {
        let sql = if row.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table_name)
        } else {
            let columns = row.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table_name,
                columns.join(", "),
                vec!["?"; columns.len()].join(", ")
            )
        };
        let count = self.conn.execute(&sql, params_from_iter(row.iter().map(|(_, v)| v)))?;
        Ok(count)
    }

    fn scan_where(&self, table_name: &str, clause: Option<&WhereClause>) -> Result<Vec<Row>> {
        let table = self.must_get_table(table_name)?;
        let columns = table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table.name);
        let params: &[Value] = match clause {
            Some(clause) => {
                sql.push(' ');
                sql.push_str(&clause.sql);
                &clause.params
            }
            None => &[],
        };
        debug!(%sql, ?params, "scanning table");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let value: Value = row.get(i)?;
                        Ok((col.name.clone(), value.cast(col.datatype)))
                    })
                    .collect::<rusqlite::Result<Row>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn delete_where(&mut self, table_name: &str, clause: &WhereClause) -> Result<usize> {
        let sql = format!("DELETE FROM {} {}", table_name, clause.sql);
        debug!(%sql, params = ?clause.params, "deleting rows");
        let count = self.conn.execute(&sql, params_from_iter(&clause.params))?;
        Ok(count)
    }

    fn delete_all(&mut self, table_name: &str) -> Result<usize> {
        debug!(table = table_name, "deleting all rows");
        let count = self.conn.execute(&format!("DELETE FROM {}", table_name), [])?;
        Ok(count)
    }

    fn table_columns(&self, table_name: &str) -> Result<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![table_name], |row| {
                let name: String = row.get(0)?;
                let sql_type: String = row.get(1)?;
                Ok(Column::new(name, DataType::from_sql_name(&sql_type)))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }
}
