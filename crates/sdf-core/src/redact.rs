use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static PASSWORD_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password.*").expect("Invalid password regex"));

/// Mask everything from the first `password` (any case) to the end of the line.
pub fn redact_statement(sql: &str) -> Cow<'_, str> {
    PASSWORD_CLAUSE.replace_all(sql, "password *****")
}

/// Redact a list of statements for logging.
pub fn redact_statements(statements: &[String]) -> Vec<String> {
    statements
        .iter()
        .map(|s| redact_statement(s).into_owned())
        .collect()
}
