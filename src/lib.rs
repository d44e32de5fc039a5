use pgrx::prelude::*;
use pgrx::VariadicArray;

pg_module_magic!();

mod ident;
mod query;

use query::{TopNRequest, FALLBACK_SQL};

/// Top-N group-by query text for `(table, column)`.
///
/// `SELECT gen_sql('orders', 'customer_id')` returns the query with both
/// names quoted as identifiers. Any other argument count, or a NULL
/// argument, returns `SELECT 1` instead of raising.
#[pg_extern(immutable, parallel_safe)]
fn gen_sql<'a>(args: VariadicArray<'a, &'a str>) -> String {
    let args: Vec<Option<&str>> = args.iter().collect();
    render(&args)
}

/// `gen_sql()` with no arguments. A VARIADIC function is never resolved for
/// an empty call, so the empty arity gets its own overload.
#[pg_extern(immutable, parallel_safe, name = "gen_sql")]
fn gen_sql_no_args() -> String {
    render(&[])
}

/// Same as `gen_sql`, for hosts that hand over their argument list as a
/// JSON array, e.g. `gen_sql_jsonb('["orders", "customer_id"]')`.
#[pg_extern(immutable, parallel_safe)]
fn gen_sql_jsonb(args: pgrx::JsonB) -> String {
    let pgrx::JsonB(val) = args;
    match parse_jsonb_args(&val) {
        Ok(owned) => {
            let args: Vec<Option<&str>> = owned.iter().map(|a| a.as_deref()).collect();
            render(&args)
        }
        Err(reason) => fallback("gen_sql_jsonb", &reason),
    }
}

fn render(args: &[Option<&str>]) -> String {
    match TopNRequest::from_args(args) {
        Ok(req) => req.to_sql(),
        Err(reason) => fallback("gen_sql", &reason),
    }
}

fn fallback(entry: &str, reason: &str) -> String {
    pgrx::debug1!("{}: {}, returning fallback", entry, reason);
    FALLBACK_SQL.to_string()
}

/// Flatten a JSON argument list into host strings.
/// Strings are taken as-is, numbers and booleans by their text, `null` as NULL.
fn parse_jsonb_args(val: &serde_json::Value) -> Result<Vec<Option<String>>, String> {
    use serde_json::Value;

    let arr = val
        .as_array()
        .ok_or_else(|| "argument list is not a JSON array".to_string())?;
    arr.iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Null => Ok(None),
            Value::Array(_) | Value::Object(_) => {
                Err(format!("argument {} is not a scalar", i + 1))
            }
        })
        .collect()
}

// ── Tests ──


#[cfg(any(test, feature = "pg_test"))]
#[pg_schema]
mod tests {
    use pgrx::prelude::*;

    use crate::FALLBACK_SQL;

    #[pg_test]
    fn test_extension_loads() {
        let result = Spi::get_one::<bool>("SELECT true");
        assert_eq!(result, Ok(Some(true)));
    }

    #[pg_test]
    fn test_gen_sql_two_args() {
        let sql = Spi::get_one::<String>("SELECT gen_sql('orders', 'customer_id')")
            .unwrap()
            .unwrap();
        assert!(sql.contains("\"customer_id\", COUNT(*) AS cnt"));
        assert!(sql.contains("FROM   \"orders\""));
        assert!(sql.contains("GROUP  BY 1"));
        assert!(sql.contains("ORDER  BY cnt DESC"));
        assert!(sql.contains("LIMIT  20;"));
    }

    #[pg_test]
    fn test_gen_sql_bad_arity() {
        for call in [
            "SELECT gen_sql()",
            "SELECT gen_sql(VARIADIC ARRAY[]::text[])",
            "SELECT gen_sql('orders')",
            "SELECT gen_sql('orders', 'customer_id', 'extra')",
        ] {
            let sql = Spi::get_one::<String>(call).unwrap();
            assert_eq!(sql.as_deref(), Some(FALLBACK_SQL), "{call}");
        }
    }

    #[pg_test]
    fn test_gen_sql_no_args_is_immutable_overload() {
        let overloads = Spi::get_one::<i64>(
            "SELECT count(*) FROM pg_proc WHERE proname = 'gen_sql' AND provolatile = 'i'",
        )
        .unwrap();
        assert_eq!(overloads, Some(2));
    }

    #[pg_test]
    fn test_gen_sql_null_argument() {
        let sql = Spi::get_one::<String>("SELECT gen_sql(NULL, 'customer_id')").unwrap();
        assert_eq!(sql.as_deref(), Some(FALLBACK_SQL));
    }

    #[pg_test]
    fn test_gen_sql_quoted_table() {
        let sql = Spi::get_one::<String>(r#"SELECT gen_sql('o"rders', 'id')"#)
            .unwrap()
            .unwrap();
        assert!(sql.contains(r#"FROM   "o""rders""#));
    }

    #[pg_test]
    fn test_generated_query_runs() {
        Spi::run(r#"CREATE TABLE "o""rders" (customer_id text)"#).unwrap();
        Spi::run(r#"INSERT INTO "o""rders" VALUES ('a'), ('b'), ('a'), ('c'), ('a'), ('b')"#)
            .unwrap();

        let sql = Spi::get_one::<String>(r#"SELECT gen_sql('o"rders', 'customer_id')"#)
            .unwrap()
            .unwrap();
        let (top, cnt) = Spi::get_two::<String, i64>(&sql).unwrap();
        assert_eq!(top.as_deref(), Some("a"));
        assert_eq!(cnt, Some(3));
    }

    #[pg_test]
    fn test_gen_sql_jsonb() {
        let sql = Spi::get_one::<String>(
            r#"SELECT gen_sql_jsonb('["orders", "customer_id"]'::jsonb)"#,
        )
        .unwrap()
        .unwrap();
        assert!(sql.starts_with("SELECT \"customer_id\", COUNT(*) AS cnt"));

        for doc in [r#"[]"#, r#"["orders"]"#, r#"["orders", null]"#, r#"{"t": 1}"#] {
            let sql = Spi::get_one::<String>(&format!("SELECT gen_sql_jsonb('{doc}'::jsonb)"))
                .unwrap();
            assert_eq!(sql.as_deref(), Some(FALLBACK_SQL), "{doc}");
        }
    }
}
