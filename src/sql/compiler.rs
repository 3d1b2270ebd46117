//! Compiles parsed filters into a parameterized WHERE clause

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::{Filter, Operator},
        types::Value,
    },
};

/// A WHERE clause with `?` placeholders and the values bound to them, in order
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds `WHERE a < ? AND b IN (?,?)` from the filters.
///
/// Returns None for an empty filter list; what "no filter" means is up to
/// the caller (scan everything, delete nothing).
pub fn compile(filters: &[Filter]) -> Result<Option<WhereClause>> {
    if filters.is_empty() {
        return Ok(None);
    }

    let mut statements = Vec::with_capacity(filters.len());
    let mut params = Vec::new();
    for filter in filters {
        validate_column(&filter.column)?;
        match filter.operator {
            Operator::In => {
                let values = split_in_values(&filter.value);
                let placeholders = vec!["?"; values.len()].join(",");
                statements.push(format!("{} IN ({})", filter.column, placeholders));
                params.extend(values.into_iter().map(Value::coerce));
            }
            op => {
                statements.push(format!("{} {} ?", filter.column, op));
                params.push(Value::coerce(&filter.value));
            }
        }
    }

    Ok(Some(WhereClause {
        sql: format!("WHERE {}", statements.join(" AND ")),
        params,
    }))
}

/// `(virginica, 'setosa')` -> `["virginica", "setosa"]`
fn split_in_values(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(|piece| piece.trim().trim_matches(|c: char| matches!(c, '\'' | '"' | '(' | ')')).trim())
        .collect()
}

/// Column names end up in the SQL text, so only identifiers and integer
/// literals (the `1=1` sentinel) are let through.
fn validate_column(column: &str) -> Result<()> {
    let mut chars = column.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(c) if c.is_ascii_digit() => chars.all(|c| c.is_ascii_digit()),
        _ => false,
    };
    if !valid {
        return Err(Error::Parse(format!("[Compiler] Invalid column name '{}'", column)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{WhereClause, compile};
    use crate::{
        error::{Error, Result},
        sql::{
            parser::{Parser, ast::Filter},
            types::Value,
        },
    };

    fn parse(statements: &[&str]) -> Result<Vec<Filter>> {
        statements.iter().map(|s| Parser::new(s).parse()).collect()
    }

    #[test]
    fn test_compile_in() -> Result<()> {
        let clause = compile(&parse(&["species IN (virginica,setosa)"])?)?;
        assert_eq!(
            clause,
            Some(WhereClause {
                sql: "WHERE species IN (?,?)".to_string(),
                params: vec![Value::from("virginica"), Value::from("setosa")],
            })
        );

        let clause = compile(&parse(&["petal_width in ('1', \"2.5\", 3)"])?)?.unwrap();
        assert_eq!(clause.sql, "WHERE petal_width IN (?,?,?)");
        assert_eq!(clause.params, vec![Value::Integer(1), Value::Float(2.5), Value::Integer(3)]);
        Ok(())
    }

    #[test]
    fn test_compile_conjunction() -> Result<()> {
        let clause = compile(&parse(&["sepal_length<5", "petal_length>=1.5", "species!=setosa"])?)?
            .unwrap();
        assert_eq!(clause.sql, "WHERE sepal_length < ? AND petal_length > ? AND species != ?");
        assert_eq!(
            clause.params,
            vec![Value::Integer(5), Value::from("=1.5"), Value::from("setosa")]
        );
        Ok(())
    }

    #[test]
    fn test_values_never_reach_sql_text() -> Result<()> {
        let clause = compile(&parse(&["species='x'; DROP TABLE iris; --"])?)?.unwrap();
        assert_eq!(clause.sql, "WHERE species = ?");
        assert_eq!(clause.params, vec![Value::from("'x'; DROP TABLE iris; --")]);
        Ok(())
    }

    #[test]
    fn test_compile_empty_and_sentinel() -> Result<()> {
        assert_eq!(compile(&[])?, None);
        let clause = compile(&parse(&["1=1"])?)?.unwrap();
        assert_eq!(clause.sql, "WHERE 1 = ?");
        assert_eq!(clause.params, vec![Value::Integer(1)]);
        Ok(())
    }

    #[test]
    fn test_compile_rejects_bad_columns() -> Result<()> {
        for statement in ["species; DROP TABLE iris<1", "1a=1", "a b=1"] {
            let result = compile(&parse(&[statement])?);
            assert!(matches!(result, Err(Error::Parse(_))), "{statement} should be rejected");
        }
        Ok(())
    }
}
