use grid_util::point::Point;
use grid_visualizer_core::{search, CellGrid, RecordingDisplay};

// In this example a path is found on a 6x4 grid with shape
//  ______
// |......|
// |.S.#G.|
// |...#..|
// |......|
//  ______
// where
// - # marks a wall
// - S marks the start
// - G marks the target

fn main() {
    let mut grid = CellGrid::from_ascii(
        "......
         .S.#G.
         ...#..
         ......",
    )
    .unwrap();
    println!("{}", grid);
    let display = RecordingDisplay::new();
    let outcome = search(&mut grid, &display).unwrap();
    println!("Visited {} cells:\n{}", display.visited().len(), grid);
    println!("Path:");
    for p in outcome.path().unwrap_or_default() {
        println!("{:?}", p);
    }
    assert!(outcome.path().map_or(false, |p| p.last() == Some(&Point::new(4, 1))));
}
