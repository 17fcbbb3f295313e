//! Python bindings for the CPM engine.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;

// Note: We use std HashMap here for PyO3 interface compatibility

use crate::config::{DiagramConfig, SchedulerConfig, TableFormat};
use crate::diagram;
use crate::graph::Graph;
use crate::models::{RawTask, TaskTiming};
use crate::registry::NodeId;
use crate::schedule::{self, PlanError, ScheduleResult, SchedulingError};
use crate::table;

/// A task record (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration: f64,
    #[pyo3(get, set)]
    pub predecessors: Vec<String>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (name, duration, predecessors=None))]
    fn new(name: String, duration: f64, predecessors: Option<Vec<String>>) -> Self {
        Self {
            name,
            duration,
            predecessors: predecessors.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(name={:?}, duration={}, predecessors={:?})",
            self.name, self.duration, self.predecessors
        )
    }
}

impl From<PyTask> for RawTask {
    fn from(task: PyTask) -> Self {
        RawTask {
            name: task.name,
            duration: task.duration,
            predecessors: task.predecessors,
        }
    }
}

impl From<RawTask> for PyTask {
    fn from(task: RawTask) -> Self {
        PyTask {
            name: task.name,
            duration: task.duration,
            predecessors: task.predecessors,
        }
    }
}

/// Computed schedule fields of one task.
#[pyclass(name = "TaskTiming")]
#[derive(Clone, Debug)]
pub struct PyTaskTiming {
    #[pyo3(get)]
    pub early_start: f64,
    #[pyo3(get)]
    pub early_finish: f64,
    #[pyo3(get)]
    pub late_start: f64,
    #[pyo3(get)]
    pub late_finish: f64,
    #[pyo3(get)]
    pub total_float: f64,
    #[pyo3(get)]
    pub free_float: f64,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl PyTaskTiming {
    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(es={}, ef={}, ls={}, lf={}, tf={}, ff={}, critical={})",
            self.early_start,
            self.early_finish,
            self.late_start,
            self.late_finish,
            self.total_float,
            self.free_float,
            self.is_critical
        )
    }
}

impl From<&TaskTiming> for PyTaskTiming {
    fn from(t: &TaskTiming) -> Self {
        Self {
            early_start: t.early_start,
            early_finish: t.early_finish,
            late_start: t.late_start,
            late_finish: t.late_finish,
            total_float: t.total_float,
            free_float: t.free_float,
            is_critical: t.is_critical,
        }
    }
}

/// Schedule keyed by task name.
///
/// The synthetic Start/End nodes never appear under a name, so a task may
/// itself be called "Start". Their timings are `start_timing`/`end_timing`,
/// and they show up as `None` in `critical_edges`.
#[pyclass(name = "ScheduleResult")]
#[derive(Clone, Debug)]
pub struct PyScheduleResult {
    #[pyo3(get)]
    pub project_duration: f64,
    /// Timings of real tasks only.
    #[pyo3(get)]
    pub timings: HashMap<String, PyTaskTiming>,
    #[pyo3(get)]
    pub start_timing: PyTaskTiming,
    #[pyo3(get)]
    pub end_timing: PyTaskTiming,
    /// Critical edges as (from, to); `None` stands for Start or End.
    #[pyo3(get)]
    pub critical_edges: Vec<(Option<String>, Option<String>)>,
    /// Task names along one critical chain, Start and End omitted.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
}

#[pymethods]
impl PyScheduleResult {
    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(project_duration={}, tasks={}, critical_edges={})",
            self.project_duration,
            self.timings.len(),
            self.critical_edges.len()
        )
    }
}

impl PyScheduleResult {
    fn from_schedule(graph: &Graph, result: &ScheduleResult) -> Self {
        let task_name = |id: NodeId| {
            if graph.is_synthetic(id) {
                None
            } else {
                Some(graph.name(id).to_string())
            }
        };

        Self {
            project_duration: result.project_duration(),
            timings: result
                .task_timings(graph)
                .map(|(name, timing)| (name.to_string(), timing.into()))
                .collect(),
            start_timing: result.timing(graph.start()).into(),
            end_timing: result.timing(graph.end()).into(),
            critical_edges: result
                .critical_edges()
                .iter()
                .map(|&(from, to)| (task_name(from), task_name(to)))
                .collect(),
            critical_path: result
                .critical_path(graph)
                .into_iter()
                .filter_map(task_name)
                .collect(),
        }
    }
}

fn to_py_err(err: PlanError) -> PyErr {
    match err {
        PlanError::Graph(e) => PyValueError::new_err(e.to_string()),
        PlanError::Scheduling(e @ SchedulingError::DurationOverflow(_)) => {
            PyValueError::new_err(e.to_string())
        }
        PlanError::Scheduling(e) => PyRuntimeError::new_err(e.to_string()),
    }
}

fn build_and_schedule(
    tasks: Vec<PyTask>,
    config: &SchedulerConfig,
) -> PyResult<(Graph, ScheduleResult)> {
    let raw: Vec<RawTask> = tasks.into_iter().map(RawTask::from).collect();
    schedule::plan(&raw, config).map_err(to_py_err)
}

/// Build the task graph and compute its CPM schedule.
///
/// # Raises
/// * ValueError for duplicate names, unknown predecessors, cycles or overflowing durations
/// * RuntimeError if the scheduler detects an internal invariant violation
#[pyfunction]
#[pyo3(name = "schedule", signature = (tasks, verbosity=0, float_tolerance=1e-9))]
fn py_schedule(
    tasks: Vec<PyTask>,
    verbosity: u8,
    float_tolerance: f64,
) -> PyResult<PyScheduleResult> {
    let config = SchedulerConfig {
        verbosity,
        float_tolerance,
    };
    let (graph, result) = build_and_schedule(tasks, &config)?;
    Ok(PyScheduleResult::from_schedule(&graph, &result))
}

/// Parse a plan table (name, duration, predecessors per line).
#[pyfunction]
#[pyo3(
    name = "parse_table",
    signature = (text, delimiter=None, predecessor_separator=',', has_header=false)
)]
fn py_parse_table(
    text: &str,
    delimiter: Option<char>,
    predecessor_separator: char,
    has_header: bool,
) -> PyResult<Vec<PyTask>> {
    let format = TableFormat {
        delimiter,
        predecessor_separator,
        has_header,
        ..TableFormat::default()
    };
    table::parse_table(text, &format)
        .map(|tasks| tasks.into_iter().map(PyTask::from).collect())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Schedule the tasks and render the network diagram as Graphviz DOT.
#[pyfunction]
#[pyo3(
    name = "render_dot",
    signature = (tasks, critical_color=None, default_color=None, rank_direction=None, show_synthetic=true, precision=2)
)]
fn py_render_dot(
    tasks: Vec<PyTask>,
    critical_color: Option<String>,
    default_color: Option<String>,
    rank_direction: Option<String>,
    show_synthetic: bool,
    precision: usize,
) -> PyResult<String> {
    let defaults = DiagramConfig::default();
    let config = DiagramConfig {
        critical_color: critical_color.unwrap_or(defaults.critical_color),
        default_color: default_color.unwrap_or(defaults.default_color),
        rank_direction: rank_direction.unwrap_or(defaults.rank_direction),
        show_synthetic,
        precision,
    };
    let (graph, result) = build_and_schedule(tasks, &SchedulerConfig::default())?;
    Ok(diagram::render_dot(&graph, &result, &config))
}

/// Schedule the tasks and render a `|`-separated schedule table.
#[pyfunction]
#[pyo3(name = "render_table", signature = (tasks, precision=2))]
fn py_render_table(tasks: Vec<PyTask>, precision: usize) -> PyResult<String> {
    let config = DiagramConfig {
        precision,
        ..DiagramConfig::default()
    };
    let (graph, result) = build_and_schedule(tasks, &SchedulerConfig::default())?;
    Ok(diagram::render_table(&graph, &result, &config))
}

/// The critpath.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<PyTask>()?;
    m.add_class::<PyTaskTiming>()?;
    m.add_class::<PyScheduleResult>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_render_dot, m)?)?;
    m.add_function(wrap_pyfunction!(py_render_table, m)?)?;

    Ok(())
}
