use grid_util::point::Point;
use grid_visualizer_core::{search, CellGrid, NullDisplay, SearchOutcome};

// The target at (5, 5) is boxed in by four walls, so the search expands every other
// reachable cell before giving up.

fn main() {
    let mut grid = CellGrid::new(80, 80);
    grid.set_start(Point::new(0, 0)).unwrap();
    grid.set_target(Point::new(5, 5)).unwrap();
    for (x, y) in [(4, 5), (6, 5), (5, 4), (5, 6)] {
        grid.set_wall(Point::new(x, y)).unwrap();
    }
    grid.update();
    println!(
        "Reachable according to components: {}",
        grid.reachable(&Point::new(0, 0), &Point::new(5, 5))
    );
    match search(&mut grid, &NullDisplay).unwrap() {
        SearchOutcome::Exhausted { expanded } => println!("No path, expanded {} cells", expanded),
        other => println!("Unexpected outcome: {:?}", other),
    }
}
