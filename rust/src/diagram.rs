//! Rendering of scheduled graphs as Graphviz DOT diagrams and text tables.

use crate::config::DiagramConfig;
use crate::graph::Graph;
use crate::registry::NodeId;
use crate::schedule::ScheduleResult;

/// Render the scheduled graph as a DOT digraph.
///
/// Node labels have four lines: `ES | EF`, name, `D | TF | FF`, `LS | LF`.
/// Critical nodes and every critical edge use the critical color.
pub fn render_dot(graph: &Graph, result: &ScheduleResult, config: &DiagramConfig) -> String {
    let visible = |id: NodeId| config.show_synthetic || !graph.is_synthetic(id);
    let mut lines: Vec<String> = vec![
        "digraph cpm {".to_string(),
        format!("    rankdir={};", config.rank_direction),
        "    node [shape=box, fontname=\"Helvetica\"];".to_string(),
    ];

    for &id in graph.topological_order() {
        if !visible(id) {
            continue;
        }
        let timing = result.timing(id);
        let p = config.precision;
        let label = format!(
            "{} | {}\\n{}\\n{} | {} | {}\\n{} | {}",
            format_time(timing.early_start, p),
            format_time(timing.early_finish, p),
            escape(graph.name(id)),
            format_time(graph.duration(id), p),
            format_time(timing.total_float, p),
            format_time(timing.free_float, p),
            format_time(timing.late_start, p),
            format_time(timing.late_finish, p),
        );
        let color = if timing.is_critical {
            &config.critical_color
        } else {
            &config.default_color
        };
        let shape = if graph.is_synthetic(id) {
            ", shape=ellipse"
        } else {
            ""
        };
        lines.push(format!(
            "    n{} [label=\"{}\", color=\"{}\", fontcolor=\"{}\"{}];",
            id, label, color, color, shape
        ));
    }

    for (from, to) in graph.edges() {
        if !visible(from) || !visible(to) {
            continue;
        }
        let style = if result.is_critical_edge(from, to) {
            format!("color=\"{}\", penwidth=2", config.critical_color)
        } else {
            format!("color=\"{}\"", config.default_color)
        };
        lines.push(format!("    n{} -> n{} [{}];", from, to, style));
    }

    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

/// Render a `|`-separated table with one row per task in input order.
pub fn render_table(graph: &Graph, result: &ScheduleResult, config: &DiagramConfig) -> String {
    let p = config.precision;
    let mut lines: Vec<String> = vec!["name|duration|ES|EF|LS|LF|TF|FF|critical".to_string()];
    for id in graph.task_ids() {
        let timing = result.timing(id);
        lines.push(format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            graph.name(id),
            format_time(graph.duration(id), p),
            format_time(timing.early_start, p),
            format_time(timing.early_finish, p),
            format_time(timing.late_start, p),
            format_time(timing.late_finish, p),
            format_time(timing.total_float, p),
            format_time(timing.free_float, p),
            if timing.is_critical { "yes" } else { "no" },
        ));
    }
    lines.join("\n") + "\n"
}

/// Round to `precision` decimals and print without trailing zeros.
fn format_time(value: f64, precision: usize) -> String {
    let scale = 10f64.powi(precision as i32);
    // Adding 0.0 turns -0.0 into 0.0
    let rounded = (value * scale).round() / scale + 0.0;
    format!("{}", rounded)
}

/// Escape a name for use inside a DOT string literal.
fn escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::RawTask;
    use crate::schedule::plan;

    fn sample() -> (Graph, ScheduleResult) {
        let tasks = vec![
            RawTask::new("A", 3.0, Vec::<String>::new()),
            RawTask::new("B", 2.0, ["A"]),
            RawTask::new("C", 4.0, ["A"]),
        ];
        plan(&tasks, &SchedulerConfig::default()).unwrap()
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3.0, 2), "3");
        assert_eq!(format_time(2.5, 2), "2.5");
        assert_eq!(format_time(0.1 + 0.2, 2), "0.3");
        assert_eq!(format_time(-0.0, 2), "0");
        assert_eq!(format_time(1.26, 1), "1.3");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_dot_labels_and_colors() {
        let (graph, result) = sample();
        let dot = render_dot(&graph, &result, &DiagramConfig::default());

        assert!(dot.starts_with("digraph cpm {\n"));
        assert!(dot.contains("rankdir=LR;"));
        // B: ES 3, EF 5, D 2, TF 2, FF 0, LS 5, LF 7
        assert!(dot.contains("n1 [label=\"3 | 5\\nB\\n2 | 2 | 0\\n5 | 7\", color=\"black\""));
        assert!(dot.contains("n2 [label=\"3 | 7\\nC\\n4 | 0 | 0\\n3 | 7\", color=\"red\""));
        assert!(dot.contains("n0 -> n2 [color=\"red\", penwidth=2];"));
        assert!(dot.contains("n0 -> n1 [color=\"black\"];"));
        assert!(dot.contains("n3 [label=\"0 | 0\\nStart"));
        assert!(dot.ends_with("];\n}\n"));
        assert_eq!(dot.lines().filter(|l| l.contains(" -> ")).count(), 5);
    }

    #[test]
    fn test_dot_hides_synthetic_nodes() {
        let (graph, result) = sample();
        let config = DiagramConfig {
            show_synthetic: false,
            critical_color: "crimson".to_string(),
            ..DiagramConfig::default()
        };
        let dot = render_dot(&graph, &result, &config);

        assert!(!dot.contains("Start"));
        assert!(!dot.contains("End"));
        assert!(!dot.contains("n3"));
        assert!(!dot.contains("n4"));
        assert!(dot.contains("n0 -> n2 [color=\"crimson\", penwidth=2];"));
    }

    #[test]
    fn test_table() {
        let (graph, result) = sample();
        let table = render_table(&graph, &result, &DiagramConfig::default());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "name|duration|ES|EF|LS|LF|TF|FF|critical");
        assert_eq!(lines[1], "A|3|0|3|0|3|0|0|yes");
        assert_eq!(lines[2], "B|2|3|5|5|7|2|0|no");
        assert_eq!(lines[3], "C|4|3|7|3|7|0|0|yes");
        assert!(table.ends_with("yes\n"));
    }
}
