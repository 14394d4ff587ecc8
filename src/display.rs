//! The notification side of the engine. A host implements [Display] to render cell state
//! transitions; the engine only guarantees that events for a given cell arrive in the order
//! they were emitted.
use grid_util::point::Point;
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

/// Receiver of cell state transitions. Calls are made from whichever thread runs the search,
/// so implementations must be cheap and must not block.
pub trait Display: Send + Sync {
    /// A cell was expanded by the search.
    fn on_visited(&self, point: Point);
    /// A cell lies on the reconstructed path.
    fn on_final_path(&self, point: Point);
    /// A cell went back to pathable, either through a full clear or a search reset.
    fn on_cleared(&self, point: Point);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayEvent {
    Visited(Point),
    FinalPath(Point),
    Cleared(Point),
}

impl DisplayEvent {
    pub fn point(&self) -> Point {
        match *self {
            DisplayEvent::Visited(p) | DisplayEvent::FinalPath(p) | DisplayEvent::Cleared(p) => p,
        }
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn on_visited(&self, _: Point) {}
    fn on_final_path(&self, _: Point) {}
    fn on_cleared(&self, _: Point) {}
}

/// Keeps every notification in emission order.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn new() -> RecordingDisplay {
        RecordingDisplay::default()
    }
    fn push(&self, event: DisplayEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    pub fn visited(&self) -> Vec<Point> {
        self.filtered(|e| match e {
            DisplayEvent::Visited(p) => Some(*p),
            _ => None,
        })
    }
    pub fn final_path(&self) -> Vec<Point> {
        self.filtered(|e| match e {
            DisplayEvent::FinalPath(p) => Some(*p),
            _ => None,
        })
    }
    pub fn cleared(&self) -> Vec<Point> {
        self.filtered(|e| match e {
            DisplayEvent::Cleared(p) => Some(*p),
            _ => None,
        })
    }
    fn filtered<F>(&self, f: F) -> Vec<Point>
    where
        F: FnMut(&DisplayEvent) -> Option<Point>,
    {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(f)
            .collect()
    }
    pub fn take(&self) -> Vec<DisplayEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Display for RecordingDisplay {
    fn on_visited(&self, point: Point) {
        self.push(DisplayEvent::Visited(point));
    }
    fn on_final_path(&self, point: Point) {
        self.push(DisplayEvent::FinalPath(point));
    }
    fn on_cleared(&self, point: Point) {
        self.push(DisplayEvent::Cleared(point));
    }
}

/// Forwards notifications over a channel, for hosts that render on their own thread. Events
/// sent after the receiver is dropped are silently lost.
#[derive(Debug)]
pub struct ChannelDisplay {
    sender: Mutex<Sender<DisplayEvent>>,
}

impl ChannelDisplay {
    pub fn new(sender: Sender<DisplayEvent>) -> ChannelDisplay {
        ChannelDisplay {
            sender: Mutex::new(sender),
        }
    }
    fn send(&self, event: DisplayEvent) {
        let _ = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(event);
    }
}

impl Display for ChannelDisplay {
    fn on_visited(&self, point: Point) {
        self.send(DisplayEvent::Visited(point));
    }
    fn on_final_path(&self, point: Point) {
        self.send(DisplayEvent::FinalPath(point));
    }
    fn on_cleared(&self, point: Point) {
        self.send(DisplayEvent::Cleared(point));
    }
}
