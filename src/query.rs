use crate::ident::QuotedIdent;

/// Row cap of the Top-N query.
pub const TOP_N_LIMIT: u32 = 20;

/// Returned in place of a Top-N query when the arguments are unusable.
pub const FALLBACK_SQL: &str = "SELECT 1";

/// Render the Top-N group-by query for an already-quoted table and column.
pub fn top_n_sql(table: &QuotedIdent, column: &QuotedIdent) -> String {
    format!(
        "SELECT {column}, COUNT(*) AS cnt\n\
         FROM   {table}\n\
         GROUP  BY 1\n\
         ORDER  BY cnt DESC\n\
         LIMIT  {limit};",
        column = column,
        table = table,
        limit = TOP_N_LIMIT,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopNRequest {
    pub table: QuotedIdent,
    pub column: QuotedIdent,
}

impl TopNRequest {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: QuotedIdent::new(table),
            column: QuotedIdent::new(column),
        }
    }

    /// Build a request from a host argument list: `(table, column)`.
    /// `None` stands for SQL NULL.
    pub fn from_args(args: &[Option<&str>]) -> Result<Self, String> {
        match args {
            [Some(table), Some(column)] => Ok(Self::new(table, column)),
            [None, _] => Err("table argument is NULL".to_string()),
            [_, None] => Err("column argument is NULL".to_string()),
            _ => Err(format!("expected 2 arguments, got {}", args.len())),
        }
    }

    pub fn to_sql(&self) -> String {
        top_n_sql(&self.table, &self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(args: &[Option<&str>]) -> Option<String> {
        TopNRequest::from_args(args).ok().map(|req| req.to_sql())
    }

    #[test]
    fn test_template_layout() {
        let sql = TopNRequest::new("orders", "customer_id").to_sql();
        assert_eq!(
            sql,
            "SELECT \"customer_id\", COUNT(*) AS cnt\n\
             FROM   \"orders\"\n\
             GROUP  BY 1\n\
             ORDER  BY cnt DESC\n\
             LIMIT  20;"
        );
    }

    #[test]
    fn test_table_first_column_second() {
        let sql = sql_for(&[Some("orders"), Some("customer_id")]).unwrap();
        assert!(sql.contains("\"customer_id\", COUNT(*) AS cnt"));
        assert!(sql.contains("FROM   \"orders\""));
        assert!(sql.contains("GROUP  BY 1"));
        assert!(sql.contains("ORDER  BY cnt DESC"));
        assert!(sql.contains("LIMIT  20;"));
    }

    #[test]
    fn test_quote_in_table_name() {
        let sql = sql_for(&[Some("o\"rders"), Some("id")]).unwrap();
        assert!(sql.contains("FROM   \"o\"\"rders\""));
        assert!(sql.starts_with("SELECT \"id\", "));
    }

    #[test]
    fn test_bad_arity_rejected() {
        assert_eq!(
            TopNRequest::from_args(&[]),
            Err("expected 2 arguments, got 0".to_string())
        );
        assert_eq!(sql_for(&[Some("orders")]), None);
        assert_eq!(
            TopNRequest::from_args(&[Some("orders"), Some("id"), Some("extra")]),
            Err("expected 2 arguments, got 3".to_string())
        );
    }

    #[test]
    fn test_from_args_errors() {
        assert_eq!(
            TopNRequest::from_args(&[Some("a")]),
            Err("expected 2 arguments, got 1".to_string())
        );
        assert_eq!(
            TopNRequest::from_args(&[None, None]),
            Err("table argument is NULL".to_string())
        );
        assert_eq!(
            TopNRequest::from_args(&[Some("a"), None]),
            Err("column argument is NULL".to_string())
        );
    }

    #[test]
    fn test_empty_identifiers_accepted() {
        let sql = sql_for(&[Some(""), Some("")]).unwrap();
        assert!(sql.starts_with("SELECT \"\", COUNT(*)"));
        assert!(sql.contains("FROM   \"\"\n"));
    }
}
