use grid_util::point::Point;
use grid_visualizer_core::{
    path_is_connected, Category, DisplayEvent, Pathfinder, RecordingDisplay, RunError,
    SearchConfig, SearchOutcome,
};
use std::sync::mpsc::channel;
use std::sync::Arc;

fn reference_pathfinder() -> (Pathfinder, Arc<RecordingDisplay>) {
    let display = Arc::new(RecordingDisplay::new());
    let pathfinder = Pathfinder::new(SearchConfig::headless(80, 80), display.clone()).unwrap();
    (pathfinder, display)
}

#[test]
fn two_step_path_on_reference_grid() {
    let (pathfinder, display) = reference_pathfinder();
    pathfinder.set_start(Point::new(0, 0)).unwrap();
    pathfinder.set_target(Point::new(2, 0)).unwrap();
    let outcome = pathfinder.run_blocking().unwrap();
    let path = outcome.path().unwrap();
    assert_eq!(path, &[Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]);
    assert_eq!(
        display.events(),
        vec![
            DisplayEvent::Visited(Point::new(0, 0)),
            DisplayEvent::Visited(Point::new(1, 0)),
            DisplayEvent::Visited(Point::new(2, 0)),
            DisplayEvent::FinalPath(Point::new(2, 0)),
            DisplayEvent::FinalPath(Point::new(1, 0)),
        ]
    );
}

#[test]
fn walled_in_target_is_never_visited() {
    let (pathfinder, display) = reference_pathfinder();
    pathfinder.set_start(Point::new(0, 0)).unwrap();
    pathfinder.set_target(Point::new(5, 5)).unwrap();
    for (x, y) in [(4, 5), (6, 5), (5, 4), (5, 6)] {
        pathfinder.set_wall(Point::new(x, y)).unwrap();
    }
    let outcome = pathfinder.run_blocking().unwrap();
    assert!(matches!(outcome, SearchOutcome::Exhausted { .. }));
    assert!(!display.visited().contains(&Point::new(5, 5)));
    assert!(display.final_path().is_empty());
}

#[test]
fn detour_around_a_wall() {
    let (pathfinder, display) = reference_pathfinder();
    pathfinder.set_start(Point::new(10, 10)).unwrap();
    pathfinder.set_target(Point::new(20, 10)).unwrap();
    for y in 5..16 {
        pathfinder.set_wall(Point::new(15, y)).unwrap();
    }
    let outcome = pathfinder.run_blocking().unwrap();
    let path = outcome.path().unwrap();
    assert!(path_is_connected(path));
    assert!(path.iter().all(|p| p.x != 15 || !(5..16).contains(&p.y)));
    // Everything on the path but the start was reported as final path, target first
    let final_path = display.final_path();
    assert_eq!(final_path.first(), Some(&Point::new(20, 10)));
    assert_eq!(final_path.len(), path.len() - 1);
}

#[test]
fn start_on_target_clears_target() {
    let (pathfinder, _) = reference_pathfinder();
    let p = Point::new(7, 3);
    pathfinder.set_target(p).unwrap();
    pathfinder.set_start(p).unwrap();
    assert_eq!(pathfinder.value_at(p).unwrap(), Category::Start);
    assert_eq!(pathfinder.target(), None);
    assert!(matches!(
        pathfinder.run(),
        Err(RunError::NotRunnable {
            missing_start: false,
            missing_target: true
        })
    ));
}

#[test]
fn clear_after_search() {
    let (pathfinder, display) = reference_pathfinder();
    pathfinder.set_start(Point::new(0, 0)).unwrap();
    pathfinder.set_target(Point::new(3, 3)).unwrap();
    pathfinder.set_wall(Point::new(1, 1)).unwrap();
    pathfinder.run_blocking().unwrap();
    display.take();
    pathfinder.clear().unwrap();
    for x in 0..80 {
        for y in 0..80 {
            assert_eq!(pathfinder.value_at(Point::new(x, y)).unwrap(), Category::Pathable);
        }
    }
    assert_eq!(pathfinder.start(), None);
    assert_eq!(pathfinder.target(), None);
    assert_eq!(display.cleared().len(), 80 * 80);
    pathfinder.with_grid(|grid| {
        assert_eq!(grid.frontier_len(), 0);
        assert_eq!(grid.visited_order().count(), 0);
    });
}

#[test]
fn channel_display_sees_every_visit() {
    let (tx, rx) = channel();
    let pathfinder = Pathfinder::new(
        SearchConfig::headless(10, 10),
        Arc::new(grid_visualizer_core::ChannelDisplay::new(tx)),
    )
    .unwrap();
    pathfinder.set_start(Point::new(0, 9)).unwrap();
    pathfinder.set_target(Point::new(9, 0)).unwrap();
    let outcome = pathfinder.run_blocking().unwrap();
    let events: Vec<DisplayEvent> = rx.try_iter().collect();
    let visits = events
        .iter()
        .filter(|e| matches!(e, DisplayEvent::Visited(_)))
        .count();
    match outcome {
        SearchOutcome::Succeeded { path, expanded } => {
            assert_eq!(visits, expanded);
            assert_eq!(
                events.last(),
                Some(&DisplayEvent::FinalPath(path[1]))
            );
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
