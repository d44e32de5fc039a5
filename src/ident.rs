use std::fmt;

/// Quote an identifier: double every inner `"` and wrap the result in `"`.
///
/// Total over all inputs. Not idempotent: quoting an already-quoted name
/// quotes it again.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// An identifier that has been through [`quote_ident`].
///
/// The only constructor takes the raw name, so anything holding a
/// `QuotedIdent` can splice it into an identifier position as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedIdent(String);

impl QuotedIdent {
    pub fn new(raw: &str) -> Self {
        Self(quote_ident(raw))
    }
}

impl fmt::Display for QuotedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
