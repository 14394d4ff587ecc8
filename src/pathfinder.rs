use crate::best_first::{pause, BestFirstSearch, SearchOutcome, Step};
use crate::cell::Category;
use crate::cell_grid::CellGrid;
use crate::config::SearchConfig;
use crate::display::Display;
use crate::error::{ConfigError, GridError, RunError};
use grid_util::point::Point;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Host-facing facade: a shared [CellGrid], the display it reports to and at most one
/// background search at a time. Edits are refused while a search runs.
#[derive(Clone)]
pub struct Pathfinder {
    grid: Arc<Mutex<CellGrid>>,
    config: SearchConfig,
    display: Arc<dyn Display>,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the worker finishes, panicking or not.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A search in flight on a worker thread.
pub struct SearchHandle {
    handle: JoinHandle<SearchOutcome>,
    cancel: Arc<AtomicBool>,
}

impl SearchHandle {
    /// Asks the worker to stop at its next iteration.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
    /// Waits for the worker and returns how the search ended.
    pub fn join(self) -> Result<SearchOutcome, RunError> {
        self.handle.join().map_err(|_| RunError::WorkerPanicked)
    }
}

impl Pathfinder {
    pub fn new(config: SearchConfig, display: Arc<dyn Display>) -> Result<Pathfinder, ConfigError> {
        config.validate()?;
        Ok(Pathfinder {
            grid: Arc::new(Mutex::new(CellGrid::new(config.width, config.height))),
            config,
            display,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // The grid is consistent between search steps, so a panic elsewhere never leaves it
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, CellGrid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn edit<R, F>(&self, f: F) -> Result<R, GridError>
    where
        F: FnOnce(&mut CellGrid) -> Result<R, GridError>,
    {
        let mut grid = self.lock();
        if self.running.load(Ordering::Acquire) {
            return Err(GridError::SearchInProgress);
        }
        f(&mut *grid)
    }

    pub fn set_start(&self, p: Point) -> Result<Option<Point>, GridError> {
        self.edit(|g| g.set_start(p))
    }
    pub fn set_target(&self, p: Point) -> Result<Option<Point>, GridError> {
        self.edit(|g| g.set_target(p))
    }
    pub fn set_wall(&self, p: Point) -> Result<(), GridError> {
        self.edit(|g| g.set_wall(p))
    }
    pub fn erase(&self, p: Point) -> Result<(), GridError> {
        self.edit(|g| g.erase(p))
    }
    pub fn clear(&self) -> Result<(), GridError> {
        let display = Arc::clone(&self.display);
        self.edit(|g| {
            g.clear(display.as_ref());
            Ok(())
        })
    }

    pub fn value_at(&self, p: Point) -> Result<Category, GridError> {
        self.lock().value_at(p)
    }
    pub fn start(&self) -> Option<Point> {
        self.lock().start()
    }
    pub fn target(&self) -> Option<Point> {
        self.lock().target()
    }
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs `f` against the grid under the lock, e.g. to render it.
    pub fn with_grid<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&CellGrid) -> R,
    {
        f(&*self.lock())
    }

    /// Starts a search on a worker thread. The grid is reset and seeded before this returns,
    /// so the worker only ever continues a search that was valid when it was triggered.
    pub fn run(&self) -> Result<SearchHandle, RunError> {
        let mut grid = self.lock();
        let mut search = match BestFirstSearch::new(&grid) {
            Ok(search) => search,
            Err(e) => {
                warn!("Search not started: {}", e);
                return Err(e);
            }
        };
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Search not started: one is already running");
            return Err(RunError::AlreadyRunning);
        }
        let guard = RunGuard(Arc::clone(&self.running));
        search.begin(&mut grid, self.display.as_ref());
        drop(grid);

        let cancel = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            grid: Arc::clone(&self.grid),
            display: Arc::clone(&self.display),
            config: self.config.clone(),
            cancel: Arc::clone(&cancel),
        };
        let handle = thread::Builder::new()
            .name("best-first-search".to_owned())
            .spawn(move || {
                let _guard = guard;
                worker.drive(search)
            })?;
        Ok(SearchHandle { handle, cancel })
    }

    /// Starts a search and waits for it, honouring the configured pacing.
    pub fn run_blocking(&self) -> Result<SearchOutcome, RunError> {
        self.run()?.join()
    }
}

struct Worker {
    grid: Arc<Mutex<CellGrid>>,
    display: Arc<dyn Display>,
    config: SearchConfig,
    cancel: Arc<AtomicBool>,
}

impl Worker {
    fn drive(&self, mut search: BestFirstSearch) -> SearchOutcome {
        debug!("Search worker started");
        let outcome = loop {
            // Only hold the grid for a single step so edits and reads are not starved while
            // the worker sleeps.
            let step = {
                let mut grid = self.grid.lock().unwrap_or_else(PoisonError::into_inner);
                if self.cancel.load(Ordering::Relaxed) {
                    search.cancel();
                }
                search.step(&mut grid, self.display.as_ref())
            };
            if let Step::Finished(outcome) = step {
                break outcome;
            }
            pause(step.delay(&self.config));
        };
        info!("Search worker finished: {:?}", search.state());
        outcome
    }
}
