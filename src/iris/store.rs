use std::collections::HashSet;

use tracing::info;

use crate::{
    error::Result,
    iris::{
        Field, Iris,
        summary::{Summary, summarize},
    },
    sql::{
        engine::Engine,
        parser::ast::Filter,
        schema::{Column, Table},
    },
};

pub const TABLE_NAME: &str = "iris";

/// Table schema derived from the Iris field set
pub fn iris_table() -> Table {
    Table {
        name: TABLE_NAME.to_string(),
        columns: Field::ALL
            .into_iter()
            .map(|f| Column::new(f.name(), f.datatype()))
            .collect(),
    }
}

/// Iris records on top of a storage engine
pub struct IrisStore<E: Engine> {
    engine: E,
}

impl<E: Engine> IrisStore<E> {
    /// Wraps the engine, creating the iris table if it doesn't exist
    pub fn new(mut engine: E) -> Result<Self> {
        engine.ensure_table(&iris_table())?;
        Ok(Self { engine })
    }

    /// Selects records matching all filters; no filters selects everything
    pub fn select_records(&self, filters: &[Filter]) -> Result<Vec<Iris>> {
        self.engine
            .scan_table(TABLE_NAME, filters)?
            .into_iter()
            .map(Iris::from_fields)
            .collect()
    }

    /// Inserts the records, returns how many rows were inserted.
    ///
    /// With `unique` only records not already stored are inserted, and
    /// duplicates within `records` are inserted once.
    pub fn insert_records(&mut self, records: &[Iris], unique: bool) -> Result<usize> {
        let mut count = 0;
        if unique {
            let mut seen = self.select_records(&[])?.into_iter().collect::<HashSet<_>>();
            for record in records {
                if seen.insert(record.clone()) {
                    count += self.engine.insert_row(TABLE_NAME, &record.to_row())?;
                }
            }
        } else {
            for record in records {
                count += self.engine.insert_row(TABLE_NAME, &record.to_row())?;
            }
        }
        info!(received = records.len(), inserted = count, unique, "inserted iris records");
        Ok(count)
    }

    /// Deletes records matching all filters; no filters deletes nothing
    pub fn delete_records(&mut self, filters: &[Filter]) -> Result<usize> {
        let count = self.engine.delete_rows(TABLE_NAME, filters)?;
        info!(deleted = count, "deleted iris records");
        Ok(count)
    }

    pub fn delete_all_records(&mut self) -> Result<usize> {
        let count = self.engine.delete_all(TABLE_NAME)?;
        info!(deleted = count, "deleted all iris records");
        Ok(count)
    }

    pub fn summary(&self) -> Result<Summary> {
        Ok(summarize(&self.select_records(&[])?))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.engine.scan_table(TABLE_NAME, &[])?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{IrisStore, TABLE_NAME, iris_table};
    use crate::{
        error::Result,
        iris::{Iris, from_csv},
        sql::{
            engine::{Engine, sqlite::SqliteEngine},
            parser::parse_filters,
            types::Value,
        },
    };

    const DATA: &str = "\
sepal_length,sepal_width,petal_length,petal_width,species
5.1,3.5,1.4,0.2,setosa
4.9,3.0,1.4,0.2,setosa
7.0,3.2,4.7,1.4,versicolor
6.3,3.3,6.0,2.5,virginica
5.8,2.7,5.1,1.9,virginica";

    fn store() -> Result<IrisStore<SqliteEngine>> {
        IrisStore::new(SqliteEngine::open_in_memory()?)
    }

    #[test]
    fn test_table_schema() -> Result<()> {
        let store = store()?;
        assert_eq!(store.engine.must_get_table(TABLE_NAME)?, iris_table());
        Ok(())
    }

    #[test]
    fn test_insert_and_select_round_trip() -> Result<()> {
        let mut store = store()?;
        let record = Iris::from_fields([
            ("sepal_length", Value::Float(5.1)),
            ("petal_width", Value::Integer(2)),
            ("species", Value::from("setosa")),
        ])?;
        assert_eq!(store.insert_records(std::slice::from_ref(&record), false)?, 1);
        assert_eq!(store.select_records(&[])?, vec![record]);
        Ok(())
    }

    #[test]
    fn test_select_with_filters() -> Result<()> {
        let mut store = store()?;
        store.insert_records(&from_csv(DATA)?, false)?;

        let virginica = store.select_records(&parse_filters(&["species=virginica"])?)?;
        assert_eq!(virginica.len(), 2);

        let selected = store.select_records(&parse_filters(&[
            "species IN (virginica,setosa)",
            "petal_length>1.4",
        ])?)?;
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.species() == "virginica"));

        let long = store.select_records(&parse_filters(&["sepal_length > 6", "sepal_width<3.3"])?)?;
        assert_eq!(long.len(), 1);
        assert_eq!(long[0].sepal_length(), 7.0);
        Ok(())
    }

    #[test]
    fn test_non_unique_insert_keeps_duplicates() -> Result<()> {
        let mut store = store()?;
        let records = from_csv(DATA)?;
        assert_eq!(store.insert_records(&records, false)?, 5);
        assert_eq!(store.insert_records(&records, false)?, 5);
        assert_eq!(store.count()?, 10);
        Ok(())
    }

    #[test]
    fn test_unique_insert_is_idempotent() -> Result<()> {
        let mut store = store()?;
        let mut records = from_csv(DATA)?;
        records.push(records[0].clone());

        assert_eq!(store.insert_records(&records, true)?, 5);
        assert_eq!(store.count()?, 5);
        assert_eq!(store.insert_records(&records, true)?, 0);
        assert_eq!(store.count()?, 5);
        Ok(())
    }

    #[test]
    fn test_non_finite_rows_never_reach_the_table() -> Result<()> {
        let mut store = store()?;
        let records = from_csv("sepal_length,species\n5.5,setosa")?;
        assert_eq!(store.insert_records(&records, true)?, 1);
        assert_eq!(store.insert_records(&records, true)?, 0);
        assert_eq!(store.select_records(&[])?, records);

        assert!(from_csv("sepal_length,species\nnan,setosa").is_err());
        assert_eq!(store.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_unique_insert_skips_existing() -> Result<()> {
        let mut store = store()?;
        let records = from_csv(DATA)?;
        store.insert_records(&records[..2], false)?;
        assert_eq!(store.insert_records(&records, true)?, 3);
        assert_eq!(store.count()?, 5);
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<()> {
        let mut store = store()?;
        store.insert_records(&from_csv(DATA)?, false)?;

        assert_eq!(store.delete_records(&[])?, 0);
        assert_eq!(store.count()?, 5);

        assert_eq!(store.delete_records(&parse_filters(&["species=setosa"])?)?, 2);
        assert_eq!(store.count()?, 3);

        assert_eq!(store.delete_all_records()?, 3);
        assert_eq!(store.count()?, 0);
        Ok(())
    }

    #[test]
    fn test_summary() -> Result<()> {
        let mut store = store()?;
        let empty = store.summary()?;
        assert_eq!(empty.len(), 5);
        assert!(empty.values().all(|c| c.n_total_values == 0 && c.n_unique_values == 0));

        store.insert_records(&from_csv(DATA)?, false)?;
        let summary = store.summary()?;
        assert_eq!(summary["species"].n_unique_values, 3);
        assert_eq!(summary["petal_length"].n_total_values, 5);
        assert_eq!(summary["petal_length"].n_unique_values, 4);
        assert_eq!(summary["petal_length"].minimum, Some(1.4));
        assert_eq!(summary["petal_length"].maximum, Some(6.0));
        assert_eq!(summary["petal_length"].median, Some(4.7));
        Ok(())
    }
}
