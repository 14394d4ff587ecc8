use grid_util::point::Point;
use grid_visualizer_core::{ChannelDisplay, DisplayEvent, Pathfinder, SearchConfig};
use std::sync::mpsc::channel;
use std::sync::Arc;

// Runs a paced search on a worker thread and renders the events on the main thread as they
// arrive, the way a GUI host would.

fn main() {
    let config = SearchConfig::default().with_size(20, 10);
    let (tx, rx) = channel();
    let pathfinder = Pathfinder::new(config, Arc::new(ChannelDisplay::new(tx))).unwrap();
    pathfinder.set_start(Point::new(1, 5)).unwrap();
    pathfinder.set_target(Point::new(18, 5)).unwrap();
    for y in 2..9 {
        pathfinder.set_wall(Point::new(10, y)).unwrap();
    }
    let handle = pathfinder.run().unwrap();
    while !handle.is_finished() {
        for event in rx.try_iter() {
            match event {
                DisplayEvent::Visited(p) => println!("visited {:?}", p),
                DisplayEvent::FinalPath(p) => println!("path    {:?}", p),
                DisplayEvent::Cleared(p) => println!("cleared {:?}", p),
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    let outcome = handle.join().unwrap();
    for event in rx.try_iter() {
        println!("{:?}", event);
    }
    println!("{:?}", outcome);
    pathfinder.with_grid(|grid| println!("{}", grid));
}
