//! Command execution shared by the REPL, `-c` and `-f` modes.

use std::time::Instant;

use anyhow::{Context, Result};
use minidb_sql::{Database, DatabaseResult, StatementResult};
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::formatter::{self, OutputFormat};

/// An open database plus display settings.
pub struct Session {
    db: Database,
    format: OutputFormat,
    timing: bool,
}

/// Counters for a script run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    /// Statements executed successfully.
    pub succeeded: usize,
    /// Statements that failed.
    pub failed: usize,
    /// True if the script stopped at `EXIT` or `QUIT`.
    pub exited: bool,
}

impl Session {
    /// Opens the database described by `config`.
    pub fn open(config: &CliConfig, format: OutputFormat) -> Result<Self> {
        let db = Database::open(config.database_config()).with_context(|| {
            format!("cannot open database at {}", config.data_dir.display())
        })?;
        info!(dir = %config.data_dir.display(), "database opened");

        Ok(Self {
            db,
            format,
            timing: config.timing,
        })
    }

    /// Returns the database.
    pub fn database(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Returns the current output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Sets the output format.
    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// Returns true if timing output is enabled.
    pub fn timing(&self) -> bool {
        self.timing
    }

    /// Enables or disables timing output.
    pub fn set_timing(&mut self, timing: bool) {
        self.timing = timing;
    }

    /// Executes one command and renders its output.
    pub fn execute(&mut self, command: &str) -> DatabaseResult<String> {
        debug!(command, "executing");
        let start = Instant::now();
        let result = self.db.execute(command)?;
        let elapsed = start.elapsed();

        let mut output = self.render(&result);
        if self.timing {
            output.push_str(&format!("\nTime: {:.3}ms", elapsed.as_secs_f64() * 1000.0));
        }
        Ok(output)
    }

    /// Executes one command and prints the output, or the error to stderr.
    ///
    /// Returns true on success.
    pub fn execute_and_print(&mut self, command: &str) -> bool {
        match self.execute(command) {
            Ok(output) => {
                println!("{}", output);
                true
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                false
            }
        }
    }

    /// Executes every statement in `content`, continuing past failures.
    pub fn execute_script(&mut self, content: &str) -> ScriptSummary {
        let mut summary = ScriptSummary::default();

        for statement in split_statements(content) {
            if is_exit_command(statement) {
                summary.exited = true;
                break;
            }
            if self.execute_and_print(statement) {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        summary
    }

    fn render(&self, result: &StatementResult) -> String {
        match result {
            StatementResult::Query(q) => {
                let mut output = formatter::format_result(q, self.format);
                if !output.ends_with('\n') {
                    output.push('\n');
                }
                let n = q.row_count();
                output.push_str(&format!("({} row{})", n, if n == 1 { "" } else { "s" }));
                output
            }
            other => other.to_string(),
        }
    }
}

/// Returns true for the `EXIT` and `QUIT` shell words.
pub fn is_exit_command(line: &str) -> bool {
    let word = line.trim().trim_end_matches(';').trim();
    word.eq_ignore_ascii_case("exit") || word.eq_ignore_ascii_case("quit")
}

/// Splits script content into individual statements.
///
/// Statements end at `;` or a newline outside a quoted literal. `--` starts
/// a comment that runs to the end of the line.
pub fn split_statements(content: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut prev: Option<char> = None;
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_string {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    chars.next();
                } else {
                    in_string = false;
                }
            }
            prev = Some(c);
            continue;
        }

        match c {
            '\'' if prev.map_or(true, starts_token) => in_string = true,
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                push_statement(&mut statements, &content[start..i]);
                start = content.len();
                for (j, d) in chars.by_ref() {
                    if d == '\n' {
                        start = j + 1;
                        break;
                    }
                }
                prev = Some('\n');
                continue;
            }
            ';' | '\n' => {
                push_statement(&mut statements, &content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = Some(c);
    }
    push_statement(&mut statements, &content[start..]);

    statements
}

/// Characters after which a `'` opens a quoted literal.
fn starts_token(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | ',' | '=' | '<' | '>' | '!')
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, statement: &'a str) {
    let trimmed = statement.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir, format: OutputFormat) -> Session {
        let config = CliConfig {
            data_dir: dir.path().join("db"),
            ..Default::default()
        };
        Session::open(&config, format).unwrap()
    }

    #[test]
    fn test_split_statements_simple() {
        let stmts = split_statements("SELECT * FROM a; SELECT * FROM b\nDROP TABLE c");
        assert_eq!(stmts, ["SELECT * FROM a", "SELECT * FROM b", "DROP TABLE c"]);
    }

    #[test]
    fn test_split_statements_with_strings() {
        let stmts = split_statements("INSERT INTO t VALUES ('hello; world', 'it''s;')\nDELETE FROM t");
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("'hello; world'"));
        assert!(stmts[0].ends_with("'it''s;')"));
    }

    #[test]
    fn test_split_statements_apostrophe_in_word() {
        let stmts = split_statements("INSERT INTO t VALUES (O'Brien);\nSELECT * FROM t");
        assert_eq!(stmts, ["INSERT INTO t VALUES (O'Brien)", "SELECT * FROM t"]);
    }

    #[test]
    fn test_split_statements_with_comments() {
        let stmts = split_statements("-- setup ; here\nSELECT * FROM a -- trailing\n\n;;SELECT * FROM b --");
        assert_eq!(stmts, ["SELECT * FROM a", "SELECT * FROM b"]);
    }

    #[test]
    fn test_is_exit_command() {
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command(" quit; "));
        assert!(!is_exit_command("exits"));
    }

    #[test]
    fn test_execute_renders_results() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, OutputFormat::Plain);

        assert_eq!(
            s.execute("CREATE TABLE t (name STRING, age INT)").unwrap(),
            "[OK] Created t"
        );
        assert_eq!(
            s.execute("INSERT INTO t VALUES (Omar, 22)").unwrap(),
            "[OK] Inserted into t"
        );
        assert_eq!(
            s.execute("SELECT * FROM t").unwrap(),
            "name\tage\nOmar\t22\n(1 row)"
        );
        assert_eq!(
            s.execute("SELECT age FROM t WHERE age > 30").unwrap(),
            "age\n(0 rows)"
        );
        assert!(s.execute("SELECT * FROM missing").is_err());
    }

    #[test]
    fn test_csv_output_and_timing() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, OutputFormat::Csv);
        s.execute("CREATE TABLE t (id INT)").unwrap();
        s.execute("INSERT INTO t VALUES (7)").unwrap();

        s.set_timing(true);
        let output = s.execute("SELECT * FROM t").unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(&lines[..3], ["id", "7", "(1 row)"]);
        assert!(lines[3].starts_with("Time: "));
    }

    #[test]
    fn test_execute_script() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, OutputFormat::Plain);

        let summary = s.execute_script(
            "CREATE TABLE t (id INT);\nINSERT INTO t VALUES (x);\nINSERT INTO t VALUES (1)\nexit\nDROP TABLE t",
        );
        assert_eq!(
            summary,
            ScriptSummary {
                succeeded: 2,
                failed: 1,
                exited: true
            }
        );
        assert!(s.database().catalog().has("t"));
    }
}
