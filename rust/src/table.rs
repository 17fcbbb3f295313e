//! Plan table parsing.
//!
//! Each line holds a task name, a duration and an optional predecessor list,
//! e.g. `C 4 A,B` or, with a `;` delimiter, `C;4;A,B`.

use thiserror::Error;

use crate::config::TableFormat;
use crate::models::RawTask;

/// Errors that can occur while parsing a plan table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected at least a task name and a duration")]
    MissingFields { line: usize },
    #[error("line {line}: invalid duration {value:?}")]
    InvalidDuration { line: usize, value: String },
}

/// Parse a whole plan table into raw task records, in line order.
pub fn parse_table(input: &str, format: &TableFormat) -> Result<Vec<RawTask>, ParseError> {
    let mut tasks = Vec::new();
    let mut header_pending = format.has_header;

    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(format.comment_prefix) {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }
        tasks.push(parse_row(trimmed, index + 1, format)?);
    }

    Ok(tasks)
}

/// Parse one non-empty row. `line` is the 1-based line number used in errors.
pub fn parse_row(row: &str, line: usize, format: &TableFormat) -> Result<RawTask, ParseError> {
    let fields = split_fields(row, format.delimiter);
    if fields.len() < 2 || fields[0].is_empty() {
        return Err(ParseError::MissingFields { line });
    }

    let duration: f64 = fields[1]
        .parse()
        .map_err(|_| ParseError::InvalidDuration {
            line,
            value: fields[1].clone(),
        })?;

    let predecessors = fields[2..]
        .iter()
        .flat_map(|field| field.split(format.predecessor_separator))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    Ok(RawTask {
        name: fields[0].clone(),
        duration,
        predecessors,
    })
}

/// Split a row into trimmed fields.
///
/// Without a delimiter, any run of whitespace separates fields. With one,
/// double quotes group a field so it may contain the delimiter.
fn split_fields(row: &str, delimiter: Option<char>) -> Vec<String> {
    let Some(delimiter) = delimiter else {
        return row.split_whitespace().map(str::to_string).collect();
    };

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in row.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_table() {
        let input = "A 3\nB 2 A\nC 4 A,B\n";
        let tasks = parse_table(input, &TableFormat::default()).unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], RawTask::new("A", 3.0, Vec::<String>::new()));
        assert_eq!(tasks[1], RawTask::new("B", 2.0, ["A"]));
        assert_eq!(tasks[2], RawTask::new("C", 4.0, ["A", "B"]));
    }

    #[test]
    fn test_skips_blank_comment_and_header() {
        let input = "# plan\nname;duration;after\n\n  A;1.5;\nB ; 2 ; A\n";
        let format = TableFormat {
            has_header: true,
            ..TableFormat::delimited(';')
        };
        let tasks = parse_table(input, &format).unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "A");
        assert!((tasks[0].duration - 1.5).abs() < 1e-9);
        assert!(tasks[0].predecessors.is_empty());
        assert_eq!(tasks[1].predecessors, vec!["A".to_string()]);
    }

    #[test]
    fn test_comma_delimiter_with_quotes() {
        let format = TableFormat::delimited(',');
        let quoted = parse_row("C,4,\"A,B\"", 1, &format).unwrap();
        assert_eq!(quoted.predecessors, vec!["A".to_string(), "B".to_string()]);

        // Unquoted trailing fields are all predecessors
        let spread = parse_row("C,4,A,B", 1, &format).unwrap();
        assert_eq!(spread.predecessors, quoted.predecessors);
    }

    #[test]
    fn test_tab_delimiter_keeps_spaces_in_names() {
        let format = TableFormat::delimited('\t');
        let task = parse_row("Pour concrete\t2\tDig site", 1, &format).unwrap();
        assert_eq!(task.name, "Pour concrete");
        assert_eq!(task.predecessors, vec!["Dig site".to_string()]);
    }

    #[test]
    fn test_missing_fields() {
        let err = parse_table("A 3\nB\n", &TableFormat::default()).unwrap_err();
        assert_eq!(err, ParseError::MissingFields { line: 2 });
    }

    #[test]
    fn test_invalid_duration() {
        let err = parse_table("A three\n", &TableFormat::default()).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDuration {
                line: 1,
                value: "three".to_string()
            }
        );
        assert_eq!(err.to_string(), "line 1: invalid duration \"three\"");
    }
}
