//! Special backslash commands for the REPL.
//!
//! Provides commands like `\d`, `\dt`, `\q`, etc.

use anyhow::{Context, Result};
use minidb_sql::{DataType, QueryResult, Row, Value};

use crate::formatter::{self, OutputFormat};
use crate::session::Session;

/// Result of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue the REPL.
    Continue,
    /// Exit the REPL.
    Exit,
    /// Output a message.
    Output(String),
    /// Set timing mode.
    SetTiming(bool),
    /// Set output format.
    SetFormat(OutputFormat),
}

/// A parsed command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Quit the REPL.
    Quit,
    /// Show help.
    Help,
    /// Describe a table.
    Describe(Option<String>),
    /// List tables.
    ListTables,
    /// Toggle timing.
    Timing,
    /// Set output format.
    Format(Option<String>),
    /// Show version.
    Version,
    /// Clear screen.
    Clear,
    /// Execute a file.
    Include(String),
    /// Unknown command.
    Unknown(String),
}

impl Command {
    /// Parses a command string.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let cmd = input.strip_prefix('\\').unwrap_or(input);

        let mut parts = cmd.splitn(2, char::is_whitespace);
        let cmd_name = parts.next().unwrap_or_default().to_lowercase();
        let args = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        match cmd_name.as_str() {
            "q" | "quit" | "exit" => Command::Quit,
            "?" | "h" | "help" => Command::Help,
            "d" => Command::Describe(args),
            "dt" | "tables" => Command::ListTables,
            "timing" | "t" => Command::Timing,
            "format" | "f" => Command::Format(args),
            "version" | "v" => Command::Version,
            "clear" | "cls" => Command::Clear,
            "i" | "include" => Command::Include(args.unwrap_or_default()),
            _ => Command::Unknown(cmd_name),
        }
    }

    /// Executes the command.
    pub fn execute(&self, session: &mut Session) -> Result<CommandResult> {
        match self {
            Command::Quit => Ok(CommandResult::Exit),

            Command::Help => Ok(CommandResult::Output(Self::help_text())),

            Command::Describe(Some(name)) => self.describe_table(session, name),

            Command::Describe(None) | Command::ListTables => self.list_tables(session),

            Command::Timing => Ok(CommandResult::SetTiming(!session.timing())),

            Command::Format(None) => Ok(CommandResult::Output(format!(
                "Output format is {}",
                session.format()
            ))),

            Command::Format(Some(format)) => match format.parse::<OutputFormat>() {
                Ok(fmt) => Ok(CommandResult::SetFormat(fmt)),
                Err(e) => Ok(CommandResult::Output(e)),
            },

            Command::Version => Ok(CommandResult::Output(format!(
                "MiniDB v{}",
                env!("CARGO_PKG_VERSION")
            ))),

            Command::Clear => {
                // ANSI: clear screen, cursor home
                print!("\x1B[2J\x1B[1;1H");
                Ok(CommandResult::Continue)
            }

            Command::Include(path) => {
                if path.is_empty() {
                    Ok(CommandResult::Output("Usage: \\i <filename>".to_string()))
                } else {
                    self.include_file(session, path)
                }
            }

            Command::Unknown(cmd) => Ok(CommandResult::Output(format!(
                "Unknown command '\\{}'. Type \\? for help.",
                cmd
            ))),
        }
    }

    /// Returns help text.
    fn help_text() -> String {
        r#"MiniDB Shell Commands
=====================

General:
  \q, \quit       Exit the shell (EXIT and QUIT also work)
  \?, \help       Show this help
  \v, \version    Show version information
  \clear, \cls    Clear screen

Schema:
  \d [NAME]       Describe a table, or list tables
  \dt, \tables    List all tables

Display:
  \t, \timing     Toggle timing display
  \f [FORMAT]     Show or set output format (plain, table, json, csv)

Files:
  \i FILE         Execute commands from file

Statements:
  CREATE TABLE t (col INT, col STRING)
  INSERT INTO t VALUES (v1, v2)
  SELECT * | col, ... FROM t [WHERE col op value]
  UPDATE t SET col = value [WHERE col op value]
  DELETE FROM t [WHERE col op value]
  DROP TABLE t

  op is one of = != < <= > >=. One command per line.
"#
        .to_string()
    }

    fn describe_table(&self, session: &mut Session, name: &str) -> Result<CommandResult> {
        let schema = session.database().describe(name)?;
        let result = QueryResult {
            columns: vec!["column".to_string(), "type".to_string()],
            column_types: vec![DataType::Text, DataType::Text],
            rows: schema
                .columns()
                .iter()
                .map(|c| Row::new(vec![Value::text(&c.name), Value::text(c.data_type.as_str())]))
                .collect(),
        };
        Ok(CommandResult::Output(render(&result, session.format())))
    }

    fn list_tables(&self, session: &mut Session) -> Result<CommandResult> {
        let tables = session.database().list_tables()?;
        if tables.is_empty() {
            return Ok(CommandResult::Output("No tables.".to_string()));
        }

        let result = QueryResult {
            columns: vec!["table".to_string()],
            column_types: vec![DataType::Text],
            rows: tables
                .into_iter()
                .map(|t| Row::new(vec![Value::text(t)]))
                .collect(),
        };
        Ok(CommandResult::Output(render(&result, session.format())))
    }

    fn include_file(&self, session: &mut Session, path: &str) -> Result<CommandResult> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path))?;

        let summary = session.execute_script(&content);
        if summary.failed > 0 {
            return Ok(CommandResult::Output(format!(
                "{}: {} statement(s) failed",
                path, summary.failed
            )));
        }
        Ok(CommandResult::Continue)
    }
}

fn render(result: &QueryResult, format: OutputFormat) -> String {
    formatter::format_result(result, format)
        .trim_end_matches('\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let config = CliConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        Session::open(&config, OutputFormat::Plain).unwrap()
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(Command::parse("\\q"), Command::Quit);
        assert_eq!(Command::parse("\\quit"), Command::Quit);
        assert_eq!(Command::parse("\\exit"), Command::Quit);
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(Command::parse("\\?"), Command::Help);
        assert_eq!(Command::parse("\\h"), Command::Help);
        assert_eq!(Command::parse("\\help"), Command::Help);
    }

    #[test]
    fn test_parse_describe() {
        assert_eq!(
            Command::parse("\\d  users "),
            Command::Describe(Some("users".to_string()))
        );
        assert_eq!(Command::parse("\\d"), Command::Describe(None));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(
            Command::parse("\\f json"),
            Command::Format(Some("json".to_string()))
        );
        assert_eq!(Command::parse("\\format"), Command::Format(None));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Command::parse("\\xyz"), Command::Unknown("xyz".to_string()));
    }

    #[test]
    fn test_timing_toggles() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);

        assert_eq!(
            Command::Timing.execute(&mut s).unwrap(),
            CommandResult::SetTiming(true)
        );
        s.set_timing(true);
        assert_eq!(
            Command::Timing.execute(&mut s).unwrap(),
            CommandResult::SetTiming(false)
        );
    }

    #[test]
    fn test_set_format() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);

        assert_eq!(
            Command::parse("\\f CSV").execute(&mut s).unwrap(),
            CommandResult::SetFormat(OutputFormat::Csv)
        );
        assert!(matches!(
            Command::parse("\\f xml").execute(&mut s).unwrap(),
            CommandResult::Output(msg) if msg.contains("unknown format")
        ));
    }

    #[test]
    fn test_list_and_describe_tables() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);

        assert_eq!(
            Command::ListTables.execute(&mut s).unwrap(),
            CommandResult::Output("No tables.".to_string())
        );

        s.execute("CREATE TABLE people (name STRING, age INT)").unwrap();
        s.execute("CREATE TABLE books (title STRING)").unwrap();

        assert_eq!(
            Command::parse("\\dt").execute(&mut s).unwrap(),
            CommandResult::Output("table\nbooks\npeople".to_string())
        );
        assert_eq!(
            Command::parse("\\d People").execute(&mut s).unwrap(),
            CommandResult::Output("column\ttype\nname\tSTRING\nage\tINT".to_string())
        );
        assert!(Command::parse("\\d missing").execute(&mut s).is_err());
    }

    #[test]
    fn test_include_file() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let script = dir.path().join("setup.sql");
        std::fs::write(
            &script,
            "-- seed data\nCREATE TABLE t (id INT);\nINSERT INTO t VALUES (1);\nINSERT INTO t VALUES (nope);\n",
        )
        .unwrap();

        let result = Command::Include(script.display().to_string())
            .execute(&mut s)
            .unwrap();
        assert!(matches!(result, CommandResult::Output(msg) if msg.ends_with("1 statement(s) failed")));
        assert_eq!(s.execute("SELECT * FROM t").unwrap(), "id\n1\n(1 row)");

        assert!(Command::Include("/nonexistent/x.sql".to_string())
            .execute(&mut s)
            .is_err());
    }
}
