//! SQL text helpers shared by the engine adapter and the orchestrator.
//!
//! Statement batches are assembled from operator-supplied names and file
//! contents, so everything spliced into SQL goes through the quoting
//! helpers here rather than ad-hoc formatting at the call sites.

/// Quotes an identifier for splicing into a statement.
///
/// Wraps the name in double quotes and doubles any embedded double quote,
/// which also preserves the case of mixed-case names.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal for splicing into a statement.
///
/// Wraps the value in single quotes and doubles any embedded single quote.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Removes whitespace-only lines from a batch, keeping the rest verbatim.
///
/// Every retained line ends with a newline, so a file whose final statement
/// lacks a trailing terminator still forms a complete batch on its own.
#[must_use]
pub fn strip_blank_lines(sql: &str) -> String {
    sql.lines()
        .filter(|line| !line.trim().is_empty())
        .fold(String::new(), |mut batch, line| {
            batch.push_str(line);
            batch.push('\n');
            batch
        })
}
