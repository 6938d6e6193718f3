//! Problem data: workers, tasks, and per-pair parameters.
//!
//! [`ProblemData`] is validated once at construction and immutable
//! afterwards. Build it with [`ProblemDataBuilder`] or from a
//! serialized [`ProblemDocument`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::grid::PairGrid;
use crate::config::ConfigError;
use crate::error::DataError;

/// Overtime ceiling used when a worker does not declare one.
pub const DEFAULT_OVERTIME_CEILING: i64 = 10;

/// Largest accepted cost, budget, level, rank or hour count.
///
/// Keeps objective and constraint sums of any built model far from `i64`
/// overflow.
pub const MAX_VALUE: i64 = 1_000_000_000_000;

fn default_overtime_ceiling() -> i64 {
    DEFAULT_OVERTIME_CEILING
}

/// A worker who can be assigned to at most one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier.
    pub id: String,
    /// Skill name → proficiency level.
    #[serde(default)]
    pub skills: BTreeMap<String, i64>,
    /// Regular working-hour capacity.
    pub hours: i64,
    /// Whether the worker may work overtime.
    #[serde(default)]
    pub overtime: bool,
    /// Absolute hour ceiling when overtime is allowed.
    #[serde(default = "default_overtime_ceiling")]
    pub overtime_ceiling: i64,
}

impl Worker {
    /// Creates a worker with the given regular capacity and no skills.
    pub fn new(id: impl Into<String>, hours: i64) -> Self {
        Self {
            id: id.into(),
            skills: BTreeMap::new(),
            hours,
            overtime: false,
            overtime_ceiling: DEFAULT_OVERTIME_CEILING,
        }
    }

    /// Sets the level of a skill.
    pub fn with_skill(mut self, skill: impl Into<String>, level: i64) -> Self {
        self.skills.insert(skill.into(), level);
        self
    }

    /// Allows overtime up to `ceiling` hours in total.
    pub fn with_overtime(mut self, ceiling: i64) -> Self {
        self.overtime = true;
        self.overtime_ceiling = ceiling;
        self
    }

    /// Declared level for a skill.
    pub fn skill_level(&self, skill: &str) -> Option<i64> {
        self.skills.get(skill).copied()
    }

    /// Total hours this worker may be scheduled for.
    pub fn hours_limit(&self) -> i64 {
        if self.overtime {
            self.overtime_ceiling
        } else {
            self.hours
        }
    }
}

/// A task that needs workers with enough combined skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: String,
    /// Skill name → minimum level (0 = not required).
    #[serde(default)]
    pub required_skills: BTreeMap<String, i64>,
    /// Maximum total assignment cost.
    pub budget: i64,
    /// Hours of work the task demands (capacity-aware models only).
    #[serde(default)]
    pub effort_hours: i64,
}

impl Task {
    /// Creates a task with the given budget and no requirements.
    pub fn new(id: impl Into<String>, budget: i64) -> Self {
        Self {
            id: id.into(),
            required_skills: BTreeMap::new(),
            budget,
            effort_hours: 0,
        }
    }

    /// Sets the minimum level of a required skill (0 = not required).
    pub fn requires(mut self, skill: impl Into<String>, level: i64) -> Self {
        self.required_skills.insert(skill.into(), level);
        self
    }

    /// Sets the hours of work the task demands.
    pub fn with_effort(mut self, hours: i64) -> Self {
        self.effort_hours = hours;
        self
    }

    /// Required skills with a positive level, in skill-name order.
    pub fn requirements(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.required_skills
            .iter()
            .filter(|&(_, &level)| level > 0)
            .map(|(skill, &level)| (skill.as_str(), level))
    }
}

/// Validated, immutable description of one assignment problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemData {
    workers: Vec<Worker>,
    tasks: Vec<Task>,
    costs: PairGrid<i64>,
    preferences: PairGrid<i64>,
}

impl ProblemData {
    /// Starts a builder.
    pub fn builder() -> ProblemDataBuilder {
        ProblemDataBuilder::default()
    }

    /// Workers in declaration order.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Assignment cost of a pair.
    pub fn cost(&self, worker: usize, task: usize) -> i64 {
        self.costs[(worker, task)]
    }

    /// Preference rank of a pair (0 = forbidden).
    pub fn preference(&self, worker: usize, task: usize) -> i64 {
        self.preferences[(worker, task)]
    }

    /// The full cost matrix.
    pub fn costs(&self) -> &PairGrid<i64> {
        &self.costs
    }

    /// The full preference matrix.
    pub fn preferences(&self) -> &PairGrid<i64> {
        &self.preferences
    }

    /// Position of a worker by id.
    pub fn worker_index(&self, id: &str) -> Option<usize> {
        self.workers.iter().position(|w| w.id == id)
    }

    /// Position of a task by id.
    pub fn task_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Converts back into a serializable document.
    pub fn to_document(&self) -> ProblemDocument {
        let entries = |grid: &PairGrid<i64>| -> Vec<PairValue> {
            grid.iter()
                .map(|((w, t), &value)| PairValue {
                    worker: self.workers[w].id.clone(),
                    task: self.tasks[t].id.clone(),
                    value,
                })
                .collect()
        };
        ProblemDocument {
            workers: self.workers.clone(),
            tasks: self.tasks.clone(),
            costs: entries(&self.costs),
            preferences: entries(&self.preferences),
        }
    }
}

/// Builder for [`ProblemData`].
///
/// # Examples
///
/// ```
/// use u_assign::assign::{ProblemData, Task, Worker};
///
/// let data = ProblemData::builder()
///     .worker(Worker::new("ann", 8).with_skill("rust", 3))
///     .task(Task::new("parser", 200).requires("rust", 2))
///     .cost("ann", "parser", 120)
///     .preference("ann", "parser", 4)
///     .build()
///     .unwrap();
/// assert_eq!(data.cost(0, 0), 120);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProblemDataBuilder {
    workers: Vec<Worker>,
    tasks: Vec<Task>,
    costs: Vec<PairValue>,
    preferences: Vec<PairValue>,
}

impl ProblemDataBuilder {
    /// Adds a worker.
    pub fn worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    /// Adds a task.
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Sets the assignment cost of a pair.
    pub fn cost(mut self, worker: impl Into<String>, task: impl Into<String>, cost: i64) -> Self {
        self.costs.push(PairValue::new(worker, task, cost));
        self
    }

    /// Sets the preference rank of a pair.
    pub fn preference(
        mut self,
        worker: impl Into<String>,
        task: impl Into<String>,
        rank: i64,
    ) -> Self {
        self.preferences.push(PairValue::new(worker, task, rank));
        self
    }

    /// Validates everything and freezes the data.
    ///
    /// Fails on the first integrity problem found: empty or duplicate
    /// entities, negative quantities, references to unknown ids, duplicate
    /// or missing cost/preference entries, and skills a task requires but
    /// a worker does not declare.
    pub fn build(self) -> Result<ProblemData, DataError> {
        if self.workers.is_empty() {
            return Err(DataError::NoWorkers);
        }
        if self.tasks.is_empty() {
            return Err(DataError::NoTasks);
        }

        let mut seen = HashSet::new();
        for worker in &self.workers {
            if !seen.insert(worker.id.as_str()) {
                return Err(DataError::DuplicateWorker(worker.id.clone()));
            }
            check_value("hours", &worker.id, worker.hours)?;
            check_value("overtime ceiling", &worker.id, worker.overtime_ceiling)?;
            for &level in worker.skills.values() {
                check_value("skill level", &worker.id, level)?;
            }
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(DataError::DuplicateTask(task.id.clone()));
            }
            check_value("budget", &task.id, task.budget)?;
            check_value("effort hours", &task.id, task.effort_hours)?;
            for &level in task.required_skills.values() {
                check_value("required level", &task.id, level)?;
            }
        }

        for task in &self.tasks {
            for skill in task.required_skills.keys() {
                if let Some(worker) = self.workers.iter().find(|w| !w.skills.contains_key(skill)) {
                    return Err(DataError::MissingSkill {
                        worker: worker.id.clone(),
                        task: task.id.clone(),
                        skill: skill.clone(),
                    });
                }
            }
        }

        let index = PairIndex::new(&self.workers, &self.tasks);
        let costs = index.resolve("cost", &self.costs)?;
        let preferences = index.resolve("preference", &self.preferences)?;

        let costs = fill(&costs, &self.workers, &self.tasks, |worker, task| {
            DataError::MissingCost { worker, task }
        })?;
        let preferences = fill(&preferences, &self.workers, &self.tasks, |worker, task| {
            DataError::MissingPreference { worker, task }
        })?;

        Ok(ProblemData {
            workers: self.workers,
            tasks: self.tasks,
            costs,
            preferences,
        })
    }
}

fn check_value(field: &'static str, owner: &str, value: i64) -> Result<(), DataError> {
    if value < 0 {
        return Err(DataError::Negative {
            field,
            owner: owner.to_string(),
            value,
        });
    }
    if value > MAX_VALUE {
        return Err(DataError::TooLarge {
            field,
            owner: owner.to_string(),
            value,
            max: MAX_VALUE,
        });
    }
    Ok(())
}

fn fill(
    sparse: &PairGrid<Option<i64>>,
    workers: &[Worker],
    tasks: &[Task],
    missing: impl Fn(String, String) -> DataError,
) -> Result<PairGrid<i64>, DataError> {
    if let Some(((w, t), _)) = sparse.iter().find(|(_, v)| v.is_none()) {
        return Err(missing(workers[w].id.clone(), tasks[t].id.clone()));
    }
    Ok(sparse.map(|v| v.unwrap_or_default()))
}

struct PairIndex<'a> {
    workers: HashMap<&'a str, usize>,
    tasks: HashMap<&'a str, usize>,
}

impl<'a> PairIndex<'a> {
    fn new(workers: &'a [Worker], tasks: &'a [Task]) -> Self {
        Self {
            workers: workers.iter().enumerate().map(|(i, w)| (w.id.as_str(), i)).collect(),
            tasks: tasks.iter().enumerate().map(|(i, t)| (t.id.as_str(), i)).collect(),
        }
    }

    fn resolve(
        &self,
        kind: &'static str,
        entries: &[PairValue],
    ) -> Result<PairGrid<Option<i64>>, DataError> {
        let mut cells: HashMap<(usize, usize), i64> = HashMap::new();
        for entry in entries {
            let w = *self
                .workers
                .get(entry.worker.as_str())
                .ok_or_else(|| DataError::UnknownWorker(entry.worker.clone()))?;
            let t = *self
                .tasks
                .get(entry.task.as_str())
                .ok_or_else(|| DataError::UnknownTask(entry.task.clone()))?;
            check_value(kind, &format!("({}, {})", entry.worker, entry.task), entry.value)?;
            if cells.insert((w, t), entry.value).is_some() {
                return Err(DataError::DuplicateEntry {
                    kind,
                    worker: entry.worker.clone(),
                    task: entry.task.clone(),
                });
            }
        }
        Ok(PairGrid::from_fn(self.workers.len(), self.tasks.len(), |w, t| {
            cells.get(&(w, t)).copied()
        }))
    }
}

/// One `(worker, task) → value` entry of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairValue {
    pub worker: String,
    pub task: String,
    pub value: i64,
}

impl PairValue {
    pub fn new(worker: impl Into<String>, task: impl Into<String>, value: i64) -> Self {
        Self {
            worker: worker.into(),
            task: task.into(),
            value,
        }
    }
}

/// Serialized form of a problem (TOML or JSON).
///
/// ```
/// use u_assign::assign::ProblemDocument;
///
/// let doc = ProblemDocument::from_toml_str(r#"
///     [[workers]]
///     id = "ann"
///     hours = 8
///     skills = { rust = 3 }
///
///     [[tasks]]
///     id = "parser"
///     budget = 200
///     required_skills = { rust = 2 }
///
///     [[costs]]
///     worker = "ann"
///     task = "parser"
///     value = 120
///
///     [[preferences]]
///     worker = "ann"
///     task = "parser"
///     value = 4
/// "#).unwrap();
/// let data = doc.into_problem().unwrap();
/// assert_eq!(data.worker_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDocument {
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub costs: Vec<PairValue>,
    #[serde(default)]
    pub preferences: Vec<PairValue>,
}

impl ProblemDocument {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a document, choosing JSON for `.json` files and TOML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Validates the document into [`ProblemData`].
    pub fn into_problem(self) -> Result<ProblemData, DataError> {
        ProblemDataBuilder {
            workers: self.workers,
            tasks: self.tasks,
            costs: self.costs,
            preferences: self.preferences,
        }
        .build()
    }
}
