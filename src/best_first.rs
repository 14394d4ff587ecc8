//! Greedy best-first search over a [CellGrid], split into single steps so that a caller can pace
//! the search (and release the grid) between iterations.
//!
//! The frontier is ordered purely by the straight-line distance to the target; no path cost is
//! accumulated. The search therefore finds a path whenever one exists but makes no promise that
//! it is the shortest one.
use crate::cell::{euclidean, Category, Priority};
use crate::cell_grid::CellGrid;
use crate::config::SearchConfig;
use crate::display::Display;
use crate::error::RunError;
use itertools::Itertools;
use log::{debug, info, warn};
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::thread;
use std::time::Duration;

use grid_util::point::Point;

#[derive(Clone, Debug)]
struct SmallestPriorityHolder<K> {
    priority: K,
    seq: usize,
    point: Point,
}

impl<K: Float> Eq for SmallestPriorityHolder<K> {}

impl<K: Float> PartialEq for SmallestPriorityHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Float> PartialOrd for SmallestPriorityHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Float> Ord for SmallestPriorityHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the smallest priority; equal priorities come out in
        // insertion order
        match other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => other.seq.cmp(&self.seq),
            s => s,
        }
    }
}

/// The open set: a min-priority queue of points. The same point may be queued more than once;
/// stale entries are discarded by the search when they are popped.
#[derive(Clone, Debug)]
pub struct Frontier<K> {
    heap: BinaryHeap<SmallestPriorityHolder<K>>,
    next_seq: usize,
}

impl<K: Float> Default for Frontier<K> {
    fn default() -> Frontier<K> {
        Frontier::new()
    }
}

impl<K: Float> Frontier<K> {
    pub fn new() -> Frontier<K> {
        Frontier {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
    pub fn push(&mut self, point: Point, priority: K) {
        self.heap.push(SmallestPriorityHolder {
            priority,
            seq: self.next_seq,
            point,
        });
        self.next_seq += 1;
    }
    pub fn pop(&mut self) -> Option<(Point, K)> {
        self.heap.pop().map(|h| (h.point, h.priority))
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// The target was expanded; `path` runs from start to target, both included.
    Succeeded { path: Vec<Point>, expanded: usize },
    /// The frontier ran dry without reaching the target.
    Exhausted { expanded: usize },
    /// Tracing back from the target hit a cell without any visited neighbour.
    ReconstructionFailed { at: Point },
    Cancelled,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&[Point]> {
        match self {
            SearchOutcome::Succeeded { path, .. } => Some(path),
            _ => None,
        }
    }
    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Succeeded { .. })
    }
}

/// Coarse lifecycle of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running,
    Succeeded,
    Exhausted,
    Failed,
    Cancelled,
}

/// What a single [BestFirstSearch::step] did; the caller paces on this.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Expanded(Point),
    /// The target was expanded; tracing back starts right away.
    Reached(Point),
    Traced(Point),
    Finished(SearchOutcome),
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    Expanding,
    Reconstructing { current: Point, trail: Vec<Point> },
    Finished(SearchOutcome),
}

/// Stepwise greedy best-first search from the grid's start to its target.
///
/// Expansion pops the frontier cell closest to the target, marks it visited, queues its
/// non-wall, unvisited 4-neighbours and then overwrites its priority with the distance to the
/// start. Reconstruction walks back from the target, always moving to the visited neighbour
/// closest to the start and dropping the cell it leaves from the visited set.
#[derive(Clone, Debug)]
pub struct BestFirstSearch {
    start: Point,
    target: Point,
    phase: Phase,
    expanded: usize,
}

impl BestFirstSearch {
    /// Prepares a search on the grid's current start and target. Fails with
    /// [RunError::NotRunnable] if either is missing; the grid is left untouched in that case.
    pub fn new(grid: &CellGrid) -> Result<BestFirstSearch, RunError> {
        match (grid.start(), grid.target()) {
            (Some(start), Some(target)) => Ok(BestFirstSearch {
                start,
                target,
                phase: Phase::Idle,
                expanded: 0,
            }),
            (start, target) => Err(RunError::NotRunnable {
                missing_start: start.is_none(),
                missing_target: target.is_none(),
            }),
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }
    pub fn target(&self) -> Point {
        self.target
    }
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn state(&self) -> SearchState {
        match &self.phase {
            Phase::Idle => SearchState::Idle,
            Phase::Expanding | Phase::Reconstructing { .. } => SearchState::Running,
            Phase::Finished(SearchOutcome::Succeeded { .. }) => SearchState::Succeeded,
            Phase::Finished(SearchOutcome::Exhausted { .. }) => SearchState::Exhausted,
            Phase::Finished(SearchOutcome::ReconstructionFailed { .. }) => SearchState::Failed,
            Phase::Finished(SearchOutcome::Cancelled) => SearchState::Cancelled,
        }
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        match &self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Clears what an earlier search left on the grid and seeds the frontier with the start.
    pub fn begin(&mut self, grid: &mut CellGrid, display: &dyn Display) {
        grid.reset_search(display);
        let h = euclidean(&self.start, &self.target);
        let _ = grid.update_cell(self.start, |cell| cell.priority = Priority::ToTarget(h));
        grid.frontier.push(self.start, h);
        self.expanded = 0;
        self.phase = Phase::Expanding;
        info!("Searching from {} to {}", self.start, self.target);
    }

    /// Abandons the search; further steps keep reporting [SearchOutcome::Cancelled].
    pub fn cancel(&mut self) {
        if !matches!(self.phase, Phase::Finished(_)) {
            info!("Search from {} to {} cancelled", self.start, self.target);
            self.phase = Phase::Finished(SearchOutcome::Cancelled);
        }
    }

    /// Performs one iteration of whichever phase the search is in.
    pub fn step(&mut self, grid: &mut CellGrid, display: &dyn Display) -> Step {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                self.begin(grid, display);
                self.step(grid, display)
            }
            Phase::Expanding => self.expand(grid, display),
            Phase::Reconstructing { current, trail } => {
                self.trace(grid, display, current, trail)
            }
            Phase::Finished(outcome) => {
                self.phase = Phase::Finished(outcome.clone());
                Step::Finished(outcome)
            }
        }
    }

    fn finish(&mut self, outcome: SearchOutcome) -> Step {
        self.phase = Phase::Finished(outcome.clone());
        Step::Finished(outcome)
    }

    fn expand(&mut self, grid: &mut CellGrid, display: &dyn Display) -> Step {
        let current = loop {
            match grid.frontier.pop() {
                None => {
                    info!(
                        "Frontier exhausted after {} expansions, {} is not reachable from {}",
                        self.expanded, self.target, self.start
                    );
                    return self.finish(SearchOutcome::Exhausted {
                        expanded: self.expanded,
                    });
                }
                Some((p, _)) => {
                    // Queued more than once and already expanded through another entry
                    if grid.cell(p).map_or(true, |c| c.is_visited()) {
                        continue;
                    }
                    break p;
                }
            }
        };
        let _ = grid.update_cell(current, |cell| cell.category = Category::Visited);
        display.on_visited(current);
        self.expanded += 1;

        if current == self.target {
            debug!(
                "Reached {} after {} expansions, reconstructing",
                current, self.expanded
            );
            self.phase = Phase::Reconstructing {
                current,
                trail: Vec::new(),
            };
            return Step::Reached(current);
        }

        let target = self.target;
        for n in grid.neumann_neighbours(current) {
            let queued = grid.update_cell(n, |cell| {
                if cell.is_wall() || cell.is_visited() {
                    return None;
                }
                let h = euclidean(&n, &target);
                cell.priority = Priority::ToTarget(h);
                Some(h)
            });
            if let Ok(Some(h)) = queued {
                grid.frontier.push(n, h);
            }
        }
        let to_start = euclidean(&current, &self.start);
        let _ = grid.update_cell(current, |cell| cell.priority = Priority::ToStart(to_start));
        grid.visited.insert(current);
        self.phase = Phase::Expanding;
        Step::Expanded(current)
    }

    fn trace(
        &mut self,
        grid: &mut CellGrid,
        display: &dyn Display,
        current: Point,
        mut trail: Vec<Point>,
    ) -> Step {
        if current == self.start {
            trail.push(current);
            trail.reverse();
            info!(
                "Path of {} cells found after {} expansions",
                trail.len(),
                self.expanded
            );
            return self.finish(SearchOutcome::Succeeded {
                path: trail,
                expanded: self.expanded,
            });
        }

        let start = self.start;
        let mut candidates = Vec::with_capacity(4);
        for n in grid.neumann_neighbours(current) {
            let d = euclidean(&n, &start);
            let open = grid.update_cell(n, |cell| {
                if cell.is_wall() {
                    return false;
                }
                cell.priority = Priority::ToStart(d);
                true
            });
            if open == Ok(true) {
                candidates.push((n, d));
            }
        }

        display.on_final_path(current);
        trail.push(current);

        let next = candidates
            .into_iter()
            .sorted_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
            .find(|p| grid.is_in_visited(p));
        match next {
            Some(next) => {
                grid.visited.swap_remove(&current);
                self.phase = Phase::Reconstructing {
                    current: next,
                    trail,
                };
                Step::Traced(current)
            }
            None => {
                warn!(
                    "Reconstruction stuck at {}: no visited neighbour leads back to {}",
                    current, start
                );
                self.finish(SearchOutcome::ReconstructionFailed { at: current })
            }
        }
    }

    /// Runs a whole search on the calling thread, sleeping between steps as configured.
    /// `cancel` is polled once per iteration.
    pub fn run_to_completion(
        grid: &mut CellGrid,
        display: &dyn Display,
        config: &SearchConfig,
        cancel: Option<&AtomicBool>,
    ) -> Result<SearchOutcome, RunError> {
        let mut search = BestFirstSearch::new(grid)?;
        search.begin(grid, display);
        loop {
            if cancel.map_or(false, |c| c.load(AtomicOrdering::Relaxed)) {
                search.cancel();
            }
            let step = search.step(grid, display);
            if let Step::Finished(outcome) = step {
                return Ok(outcome);
            }
            pause(step.delay(config));
        }
    }
}

impl Step {
    /// How long to wait before the next step: the expansion delay after an expansion, the
    /// reconstruction delay after a traced cell, nothing otherwise.
    pub fn delay(&self, config: &SearchConfig) -> Duration {
        match self {
            Step::Expanded(_) => config.expansion_delay(),
            Step::Traced(_) => config.reconstruction_delay(),
            Step::Reached(_) | Step::Finished(_) => Duration::ZERO,
        }
    }
}

pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Convenience wrapper around [BestFirstSearch::run_to_completion] without pacing or
/// cancellation.
pub fn search(grid: &mut CellGrid, display: &dyn Display) -> Result<SearchOutcome, RunError> {
    let config = SearchConfig::headless(grid.width(), grid.height());
    BestFirstSearch::run_to_completion(grid, display, &config, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{NullDisplay, RecordingDisplay};
    use crate::path_is_connected;

    #[test]
    fn frontier_pops_smallest_first_fifo_on_ties() {
        let mut frontier = Frontier::new();
        frontier.push(Point::new(0, 0), 3.0);
        frontier.push(Point::new(1, 0), 1.0);
        frontier.push(Point::new(2, 0), 1.0);
        frontier.push(Point::new(3, 0), 2.0);
        let order: Vec<Point> = std::iter::from_fn(|| frontier.pop().map(|(p, _)| p)).collect();
        assert_eq!(
            order,
            vec![
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(3, 0),
                Point::new(0, 0)
            ]
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn not_runnable_without_endpoints() {
        let mut grid = CellGrid::new(3, 3);
        assert!(matches!(
            search(&mut grid, &NullDisplay),
            Err(RunError::NotRunnable {
                missing_start: true,
                missing_target: true
            })
        ));
        grid.set_start(Point::new(0, 0)).unwrap();
        assert!(matches!(
            BestFirstSearch::new(&grid),
            Err(RunError::NotRunnable {
                missing_start: false,
                missing_target: true
            })
        ));
        assert_eq!(grid.value_at(Point::new(0, 0)).unwrap(), Category::Start);
    }

    #[test]
    fn straight_line_on_reference_grid() {
        let mut grid = CellGrid::new(80, 80);
        grid.set_start(Point::new(0, 0)).unwrap();
        grid.set_target(Point::new(2, 0)).unwrap();
        let display = RecordingDisplay::new();
        let outcome = search(&mut grid, &display).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Succeeded {
                path: vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)],
                expanded: 3,
            }
        );
        assert_eq!(
            display.visited(),
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]
        );
        assert_eq!(display.final_path(), vec![Point::new(2, 0), Point::new(1, 0)]);
    }

    #[test]
    fn enclosed_target_is_exhausted() {
        let mut grid = CellGrid::new(80, 80);
        grid.set_start(Point::new(0, 0)).unwrap();
        grid.set_target(Point::new(5, 5)).unwrap();
        for p in [(4, 5), (6, 5), (5, 4), (5, 6)] {
            grid.set_wall(Point::new(p.0, p.1)).unwrap();
        }
        let display = RecordingDisplay::new();
        let outcome = search(&mut grid, &display).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Exhausted {
                expanded: 80 * 80 - 5
            }
        );
        assert!(!display.visited().contains(&Point::new(5, 5)));
        assert!(display.final_path().is_empty());
        assert_eq!(grid.value_at(Point::new(5, 5)).unwrap(), Category::Target);
    }

    #[test]
    fn path_around_wall() {
        let mut grid = CellGrid::from_ascii(
            "......
             .S.#G.
             ...#..
             ......",
        )
        .unwrap();
        let outcome = search(&mut grid, &NullDisplay).unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.first(), Some(&Point::new(1, 1)));
        assert_eq!(path.last(), Some(&Point::new(4, 1)));
        assert!(path_is_connected(path));
        assert!(path
            .iter()
            .all(|p| grid.value_at(*p).unwrap() != Category::Wall));
    }

    #[test]
    fn expanded_cells_carry_distance_to_start() {
        let mut grid = CellGrid::from_ascii("S..G").unwrap();
        let mut search = BestFirstSearch::new(&grid).unwrap();
        search.begin(&mut grid, &NullDisplay);
        assert_eq!(search.state(), SearchState::Running);
        assert_eq!(
            search.step(&mut grid, &NullDisplay),
            Step::Expanded(Point::new(0, 0))
        );
        // The neighbour was queued with its distance to the target
        assert_eq!(
            grid.cell(Point::new(1, 0)).unwrap().priority,
            Priority::ToTarget(2.0)
        );
        assert_eq!(
            search.step(&mut grid, &NullDisplay),
            Step::Expanded(Point::new(1, 0))
        );
        assert_eq!(
            grid.cell(Point::new(1, 0)).unwrap().priority,
            Priority::ToStart(1.0)
        );
        assert_eq!(
            grid.visited_order().collect::<Vec<_>>(),
            vec![Point::new(0, 0), Point::new(1, 0)]
        );
    }

    #[test]
    fn dead_end_is_reported() {
        let mut grid = CellGrid::from_ascii("S.G").unwrap();
        let mut search = BestFirstSearch::new(&grid).unwrap();
        search.begin(&mut grid, &NullDisplay);
        for _ in 0..2 {
            assert!(matches!(
                search.step(&mut grid, &NullDisplay),
                Step::Expanded(_)
            ));
        }
        assert_eq!(
            search.step(&mut grid, &NullDisplay),
            Step::Reached(Point::new(2, 0))
        );
        // Pull the middle cell out of the closed set so the trace back cannot continue
        grid.visited.swap_remove(&Point::new(1, 0));
        assert_eq!(
            search.step(&mut grid, &NullDisplay),
            Step::Finished(SearchOutcome::ReconstructionFailed {
                at: Point::new(2, 0)
            })
        );
        assert_eq!(search.state(), SearchState::Failed);
    }

    #[test]
    fn repeated_search_starts_from_clean_grid() {
        let mut grid = CellGrid::from_ascii(
            "S...
             .##.
             ...G",
        )
        .unwrap();
        let first = search(&mut grid, &NullDisplay).unwrap();
        assert_eq!(grid.value_at(Point::new(0, 0)).unwrap(), Category::Visited);
        let display = RecordingDisplay::new();
        let second = search(&mut grid, &display).unwrap();
        assert_eq!(first, second);
        assert!(!display.cleared().is_empty());
    }

    #[test]
    fn no_pause_between_reaching_target_and_tracing() {
        let config = SearchConfig::default();
        let mut grid = CellGrid::from_ascii("SG").unwrap();
        let mut search = BestFirstSearch::new(&grid).unwrap();
        search.begin(&mut grid, &NullDisplay);
        let steps: Vec<Step> = std::iter::from_fn(|| {
            let step = search.step(&mut grid, &NullDisplay);
            (!matches!(step, Step::Finished(_))).then_some(step)
        })
        .collect();
        assert_eq!(
            steps,
            vec![
                Step::Expanded(Point::new(0, 0)),
                Step::Reached(Point::new(1, 0)),
                Step::Traced(Point::new(1, 0)),
            ]
        );
        let delays: Vec<Duration> = steps.iter().map(|s| s.delay(&config)).collect();
        assert_eq!(
            delays,
            vec![
                config.expansion_delay(),
                Duration::ZERO,
                config.reconstruction_delay()
            ]
        );
    }

    #[test]
    fn cancelled_search_stops() {
        let mut grid = CellGrid::new(10, 10);
        grid.set_start(Point::new(0, 0)).unwrap();
        grid.set_target(Point::new(9, 9)).unwrap();
        let cancel = AtomicBool::new(true);
        let outcome = BestFirstSearch::run_to_completion(
            &mut grid,
            &NullDisplay,
            &SearchConfig::headless(10, 10),
            Some(&cancel),
        )
        .unwrap();
        assert_eq!(outcome, SearchOutcome::Cancelled);
    }
}
