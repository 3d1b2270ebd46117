use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        compiler::{WhereClause, compile},
        parser::ast::Filter,
        schema::{Column, Table},
        types::Row,
    },
};

pub mod sqlite;

/// Table-level storage operations
///
/// Implementations only deal in compiled [`WhereClause`]s; parsing and
/// compiling filters happens once, in the provided methods.
pub trait Engine {
    /// Creates the table unless it already exists
    fn ensure_table(&mut self, table: &Table) -> Result<()>;
    /// Inserts a single row, returns the number of rows inserted (0 or 1)
    fn insert_row(&mut self, table_name: &str, row: &Row) -> Result<usize>;
    /// Scans the table, optionally restricted by a where clause
    fn scan_where(&self, table_name: &str, clause: Option<&WhereClause>) -> Result<Vec<Row>>;
    /// Deletes the rows matching the clause
    fn delete_where(&mut self, table_name: &str, clause: &WhereClause) -> Result<usize>;
    /// Deletes every row of the table
    fn delete_all(&mut self, table_name: &str) -> Result<usize>;
    /// Declared columns of the table, empty if it does not exist
    fn table_columns(&self, table_name: &str) -> Result<Vec<Column>>;

    /// Scans the table; no filters means the whole table
    fn scan_table(&self, table_name: &str, filters: &[Filter]) -> Result<Vec<Row>> {
        let clause = compile(filters)?;
        self.scan_where(table_name, clause.as_ref())
    }

    /// Deletes matching rows; no filters deletes nothing
    fn delete_rows(&mut self, table_name: &str, filters: &[Filter]) -> Result<usize> {
        match compile(filters)? {
            Some(clause) => self.delete_where(table_name, &clause),
            None => {
                debug!(table = table_name, "delete without filters, nothing to do");
                Ok(0)
            }
        }
    }

    fn get_table(&self, table_name: &str) -> Result<Option<Table>> {
        let columns = self.table_columns(table_name)?;
        Ok((!columns.is_empty()).then(|| Table {
            name: table_name.to_string(),
            columns,
        }))
    }

    /// Returns table info, returns error if table doesn't exist
    fn must_get_table(&self, table_name: &str) -> Result<Table> {
        self.get_table(table_name)?
            .ok_or(Error::Operation(format!("table {} does not exist", table_name)))
    }
}
