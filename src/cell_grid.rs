use crate::best_first::Frontier;
use crate::cell::{Category, Cell};
use crate::display::Display;
use crate::error::GridError;
use crate::FxIndexSet;
use core::fmt;
use grid_util::point::Point;
use grid_util::{Grid, SimpleGrid};
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// [CellGrid] owns every [Cell] of a fixed size grid together with the designated start and
/// target, and the open and closed sets used while a search runs. Walls additionally feed a
/// [UnionFind] of 4-connected components which can answer reachability questions up front.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: SimpleGrid<Cell>,
    width: usize,
    height: usize,
    start: Option<Point>,
    target: Option<Point>,
    pub(crate) frontier: Frontier<f64>,
    pub(crate) visited: FxIndexSet<Point>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for CellGrid {
    fn default() -> CellGrid {
        CellGrid::new(0, 0)
    }
}

impl CellGrid {
    /// Creates a grid in which every cell is [Category::Pathable].
    pub fn new(width: usize, height: usize) -> CellGrid {
        let mut cells = SimpleGrid::new(width, height, Cell::default());
        for x in 0..width as i32 {
            for y in 0..height as i32 {
                let p = Point::new(x, y);
                cells.set_point(p, Cell::new(p));
            }
        }
        CellGrid {
            cells,
            width,
            height,
            start: None,
            target: None,
            frontier: Frontier::new(),
            visited: FxIndexSet::default(),
            components: UnionFind::new(width * height),
            components_dirty: true,
        }
    }

    /// Builds a grid from rows of glyphs, one row per line with `y` growing downwards:
    /// `.` pathable, `#` wall, `S` start and `G` target. Blank lines are skipped.
    pub fn from_ascii(layout: &str) -> Result<CellGrid, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = CellGrid::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let p = Point::new(x as i32, y as i32);
                match Category::from_glyph(glyph) {
                    Some(Category::Pathable) => {}
                    Some(Category::Wall) => grid.set_wall(p)?,
                    Some(Category::Start) => {
                        grid.set_start(p)?;
                    }
                    Some(Category::Target) => {
                        grid.set_target(p)?;
                    }
                    _ => return Err(GridError::InvalidGlyph { glyph, point: p }),
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }
    fn check(&self, p: Point) -> Result<(), GridError> {
        if self.in_bounds(p) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                point: p,
                width: self.width,
                height: self.height,
            })
        }
    }
    fn get_ix_point(&self, p: &Point) -> usize {
        p.y as usize * self.width + p.x as usize
    }

    pub fn cell(&self, p: Point) -> Result<Cell, GridError> {
        self.check(p)?;
        Ok(self.cells.get_point(p))
    }
    /// Applies `f` to a copy of the cell at `p` and writes the result back.
    pub(crate) fn update_cell<R, F>(&mut self, p: Point, f: F) -> Result<R, GridError>
    where
        F: FnOnce(&mut Cell) -> R,
    {
        self.check(p)?;
        let mut cell = self.cells.get_point(p);
        let result = f(&mut cell);
        self.cells.set_point(p, cell);
        Ok(result)
    }

    /// Read-only category query.
    pub fn value_at(&self, p: Point) -> Result<Category, GridError> {
        self.cell(p).map(|c| c.category)
    }
    pub fn start(&self) -> Option<Point> {
        self.start
    }
    pub fn target(&self) -> Option<Point> {
        self.target
    }

    /// Designates `p` as the start, taking over the target role if `p` held it. Returns the
    /// previous start position so a display can redraw it; that cell goes back to pathable.
    /// Placing the start on the cell that already holds it returns [None].
    pub fn set_start(&mut self, p: Point) -> Result<Option<Point>, GridError> {
        self.check(p)?;
        if self.target == Some(p) {
            self.target = None;
        }
        let previous = self.start.filter(|&s| s != p);
        if let Some(prev) = previous {
            self.update_cell(prev, |cell| {
                if cell.category == Category::Start {
                    cell.reset();
                }
            })?;
        }
        self.set_category(p, Category::Start)?;
        self.start = Some(p);
        Ok(previous)
    }

    /// Mirror image of [set_start](Self::set_start).
    pub fn set_target(&mut self, p: Point) -> Result<Option<Point>, GridError> {
        self.check(p)?;
        if self.start == Some(p) {
            self.start = None;
        }
        let previous = self.target.filter(|&t| t != p);
        if let Some(prev) = previous {
            self.update_cell(prev, |cell| {
                if cell.category == Category::Target {
                    cell.reset();
                }
            })?;
        }
        self.set_category(p, Category::Target)?;
        self.target = Some(p);
        Ok(previous)
    }

    pub fn set_wall(&mut self, p: Point) -> Result<(), GridError> {
        self.check(p)?;
        self.release_role(p);
        self.set_category(p, Category::Wall)
    }

    pub fn erase(&mut self, p: Point) -> Result<(), GridError> {
        self.check(p)?;
        self.release_role(p);
        self.set_category(p, Category::Pathable)
    }

    fn release_role(&mut self, p: Point) {
        if self.start == Some(p) {
            self.start = None;
        } else if self.target == Some(p) {
            self.target = None;
        }
    }

    /// Changes a category and keeps the connected components in line with the walls: removing
    /// a wall joins components, placing one marks them dirty since it may split a component.
    fn set_category(&mut self, p: Point, category: Category) -> Result<(), GridError> {
        let was_wall = self.update_cell(p, |cell| {
            let was_wall = cell.is_wall();
            cell.category = category;
            cell.priority = Default::default();
            was_wall
        })?;
        let is_wall = category == Category::Wall;
        if !was_wall && is_wall {
            self.components_dirty = true;
        } else if was_wall && !is_wall && !self.components_dirty {
            let p_ix = self.get_ix_point(&p);
            for n in self.neumann_neighbours(p) {
                if self.cell(n).map_or(false, |c| !c.is_wall()) {
                    let n_ix = self.get_ix_point(&n);
                    self.components.union(p_ix, n_ix);
                }
            }
        }
        Ok(())
    }

    /// Resets every cell to pathable, forgets start and target and empties the open and
    /// closed sets. Every cell is reported to the display in row-major order.
    pub fn clear(&mut self, display: &dyn Display) {
        debug!("Clearing {}x{} grid", self.width, self.height);
        self.start = None;
        self.target = None;
        self.frontier.clear();
        self.visited.clear();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let p = Point::new(x, y);
                let mut cell = self.cells.get_point(p);
                cell.reset();
                self.cells.set_point(p, cell);
                display.on_cleared(p);
            }
        }
        self.components_dirty = true;
    }

    /// Removes what a previous search left behind: visited cells become pathable again (and
    /// are reported as cleared), the start and target get their categories back, priorities
    /// are dropped and the open and closed sets are emptied. Walls are untouched.
    pub fn reset_search(&mut self, display: &dyn Display) {
        self.frontier.clear();
        self.visited.clear();
        let (start, target) = (self.start, self.target);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let p = Point::new(x, y);
                let mut cell = self.cells.get_point(p);
                cell.priority = Default::default();
                if Some(p) == start {
                    cell.category = Category::Start;
                } else if Some(p) == target {
                    cell.category = Category::Target;
                } else if cell.is_visited() {
                    cell.category = Category::Pathable;
                    display.on_cleared(p);
                }
                self.cells.set_point(p, cell);
            }
        }
    }

    /// Positions of the cells expanded so far, in expansion order. Reconstruction consumes
    /// this set, so after a successful search only the unused part of it remains.
    pub fn visited_order(&self) -> impl Iterator<Item = Point> + '_ {
        self.visited.iter().copied()
    }
    pub fn is_in_visited(&self, p: &Point) -> bool {
        self.visited.contains(p)
    }
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// In-bounds 4-neighbourhood in the order left, right, up, down.
    pub fn neumann_neighbours(&self, p: Point) -> SmallVec<[Point; 4]> {
        [
            Point::new(p.x - 1, p.y),
            Point::new(p.x + 1, p.y),
            Point::new(p.x, p.y - 1),
            Point::new(p.x, p.y + 1),
        ]
        .into_iter()
        .filter(|n| self.in_bounds(*n))
        .collect()
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up non-wall 4-neighbours.
    pub fn generate_components(&mut self) {
        debug!("Generating connected components");
        self.components = UnionFind::new(self.width * self.height);
        self.components_dirty = false;
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let point = Point::new(x, y);
                if self.cell(point).map_or(true, |c| c.is_wall()) {
                    continue;
                }
                let parent_ix = self.get_ix_point(&point);
                let linked = [Point::new(x + 1, y), Point::new(x, y + 1)]
                    .into_iter()
                    .filter(|p| self.cell(*p).map_or(false, |c| !c.is_wall()))
                    .map(|p| self.get_ix_point(&p))
                    .collect::<SmallVec<[usize; 2]>>();
                for ix in linked {
                    self.components.union(parent_ix, ix);
                }
            }
        }
    }

    /// Checks if `a` and `b` are on the same component. Only meaningful once the components are
    /// up to date, see [update](Self::update).
    pub fn reachable(&self, a: &Point, b: &Point) -> bool {
        if self.in_bounds(*a) && self.in_bounds(*b) {
            self.components.equiv(self.get_ix_point(a), self.get_ix_point(b))
        } else {
            false
        }
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height as i32 {
            let row = (0..self.width as i32)
                .map(|x| self.cells.get_point(Point::new(x, y)).category.glyph())
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
