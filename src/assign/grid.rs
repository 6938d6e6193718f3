//! Dense worker × task matrix.

use std::ops::Index;

/// A value per (worker, task) pair, addressed by positional indices.
///
/// Iteration is worker-major: all tasks of worker 0, then worker 1, ...
/// which matches the declaration order of the problem data.
///
/// # Examples
///
/// ```
/// use u_assign::assign::PairGrid;
///
/// let grid = PairGrid::from_fn(2, 3, |w, t| w * 10 + t);
/// assert_eq!(grid[(1, 2)], 12);
/// let order: Vec<_> = grid.iter().map(|(pair, _)| pair).collect();
/// assert_eq!(order[..3], [(0, 0), (0, 1), (0, 2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairGrid<T> {
    workers: usize,
    tasks: usize,
    cells: Vec<T>,
}

impl<T> PairGrid<T> {
    /// Builds a grid by evaluating `f(worker, task)` for every pair.
    pub fn from_fn(workers: usize, tasks: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(workers * tasks);
        for w in 0..workers {
            for t in 0..tasks {
                cells.push(f(w, t));
            }
        }
        Self {
            workers,
            tasks,
            cells,
        }
    }

    /// Number of workers (rows).
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of tasks (columns).
    pub fn tasks(&self) -> usize {
        self.tasks
    }

    /// Value for a pair, or `None` when out of range.
    pub fn get(&self, worker: usize, task: usize) -> Option<&T> {
        if worker < self.workers && task < self.tasks {
            self.cells.get(worker * self.tasks + task)
        } else {
            None
        }
    }

    /// All values of one worker, in task order.
    pub fn row(&self, worker: usize) -> &[T] {
        &self.cells[worker * self.tasks..(worker + 1) * self.tasks]
    }

    /// All values of one task, in worker order.
    pub fn column(&self, task: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.workers).map(move |w| &self.cells[w * self.tasks + task])
    }

    /// `((worker, task), value)` in worker-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        let tasks = self.tasks;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / tasks, i % tasks), v))
    }

    /// Applies `f` to every value, keeping the shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PairGrid<U> {
        PairGrid {
            workers: self.workers,
            tasks: self.tasks,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for PairGrid<T> {
    type Output = T;

    fn index(&self, (worker, task): (usize, usize)) -> &T {
        assert!(
            worker < self.workers && task < self.tasks,
            "pair ({worker}, {task}) out of range {}x{}",
            self.workers,
            self.tasks
        );
        &self.cells[worker * self.tasks + task]
    }
}
