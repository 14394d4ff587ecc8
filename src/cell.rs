use core::fmt;
use grid_util::point::Point;

/// Classification of a [Cell]. At most one cell of a grid is [Category::Start] and at most one
/// is [Category::Target]; [Category::Visited] is only ever assigned by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Pathable,
    Start,
    Target,
    Wall,
    Visited,
}

impl Category {
    /// Glyph used by the textual grid rendering and by [CellGrid::from_ascii](crate::cell_grid::CellGrid::from_ascii).
    pub fn glyph(self) -> char {
        match self {
            Category::Pathable => '.',
            Category::Start => 'S',
            Category::Target => 'G',
            Category::Wall => '#',
            Category::Visited => '*',
        }
    }

    pub fn from_glyph(c: char) -> Option<Category> {
        match c {
            '.' => Some(Category::Pathable),
            'S' => Some(Category::Start),
            'G' => Some(Category::Target),
            '#' => Some(Category::Wall),
            '*' => Some(Category::Visited),
            _ => None,
        }
    }
}

/// The heuristic scalar carried by a [Cell]. A single value serves both search phases, so it
/// is tagged with the phase that wrote it: during expansion it is the Euclidean distance to the
/// target, once the cell has been expanded it becomes the Euclidean distance to the start, which
/// is what reconstruction orders by.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Priority {
    #[default]
    Unset,
    ToTarget(f64),
    ToStart(f64),
}

impl Priority {
    pub fn to_target(self) -> Option<f64> {
        match self {
            Priority::ToTarget(d) => Some(d),
            _ => None,
        }
    }
    pub fn to_start(self) -> Option<f64> {
        match self {
            Priority::ToStart(d) => Some(d),
            _ => None,
        }
    }
}

/// Euclidean distance between two grid points.
pub fn euclidean(p1: &Point, p2: &Point) -> f64 {
    ((p1.x - p2.x) as f64).hypot((p1.y - p2.y) as f64)
}

/// A single grid unit. The position is fixed at creation; category and priority change as the
/// grid is edited and searched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pos: Point,
    pub category: Category,
    pub priority: Priority,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::new(Point::new(0, 0))
    }
}

impl Cell {
    pub fn new(pos: Point) -> Cell {
        Cell {
            pos,
            category: Category::Pathable,
            priority: Priority::Unset,
        }
    }
    pub fn pos(&self) -> Point {
        self.pos
    }
    pub fn x(&self) -> i32 {
        self.pos.x
    }
    pub fn y(&self) -> i32 {
        self.pos.y
    }
    pub fn is_wall(&self) -> bool {
        self.category == Category::Wall
    }
    pub fn is_visited(&self) -> bool {
        self.category == Category::Visited
    }
    /// Resets category and priority, leaving the position untouched.
    pub fn reset(&mut self) {
        self.category = Category::Pathable;
        self.priority = Priority::Unset;
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.category.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_phase_accessors() {
        let p = Priority::ToTarget(2.0);
        assert_eq!(p.to_target(), Some(2.0));
        assert_eq!(p.to_start(), None);
        let p = Priority::ToStart(1.5);
        assert_eq!(p.to_start(), Some(1.5));
        assert_eq!(p.to_target(), None);
        assert_eq!(Priority::Unset.to_start(), None);
    }

    #[test]
    fn euclidean_distance() {
        let a = Point::new(0, 0);
        assert_eq!(euclidean(&a, &Point::new(3, 4)), 5.0);
        assert_eq!(euclidean(&Point::new(2, 0), &a), 2.0);
    }

    #[test]
    fn glyphs_round_trip() {
        for c in [
            Category::Pathable,
            Category::Start,
            Category::Target,
            Category::Wall,
            Category::Visited,
        ] {
            assert_eq!(Category::from_glyph(c.glyph()), Some(c));
        }
        assert_eq!(Category::from_glyph('x'), None);
    }

    #[test]
    fn reset_keeps_position() {
        let mut cell = Cell::new(Point::new(3, 7));
        cell.category = Category::Visited;
        cell.priority = Priority::ToStart(4.0);
        cell.reset();
        assert_eq!(cell.pos(), Point::new(3, 7));
        assert_eq!(cell.category, Category::Pathable);
        assert_eq!(cell.priority, Priority::Unset);
    }
}
