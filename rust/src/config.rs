//! Configuration types for scheduling, table parsing and diagram export.

/// Configuration for the CPM scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
    /// Tolerance for float comparisons (zero float, tight edges), relative to
    /// the project duration (never below this absolute value).
    pub float_tolerance: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            float_tolerance: 1e-9,
        }
    }
}

/// Layout of a plan table.
#[derive(Clone, Debug)]
pub struct TableFormat {
    /// Field delimiter; `None` splits on any run of whitespace.
    pub delimiter: Option<char>,
    /// Separator between predecessor names.
    pub predecessor_separator: char,
    /// Whether the first data line is a header row.
    pub has_header: bool,
    /// Lines starting with this character are ignored.
    pub comment_prefix: char,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: None,
            predecessor_separator: ',',
            has_header: false,
            comment_prefix: '#',
        }
    }
}

impl TableFormat {
    /// Format for delimiter-separated files (e.g. `;` or `\t`).
    pub fn delimited(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
            ..Self::default()
        }
    }
}

/// Styling for rendered diagrams and tables.
#[derive(Clone, Debug)]
pub struct DiagramConfig {
    /// Color of critical nodes and edges.
    pub critical_color: String,
    /// Color of everything else.
    pub default_color: String,
    /// Graphviz rankdir ("LR", "TB", ...).
    pub rank_direction: String,
    /// Whether the synthetic Start/End nodes are drawn.
    pub show_synthetic: bool,
    /// Decimal places for printed times.
    pub precision: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            critical_color: "red".to_string(),
            default_color: "black".to_string(),
            rank_direction: "LR".to_string(),
            show_synthetic: true,
            precision: 2,
        }
    }
}
