use std::cell::Cell;
use std::rc::Rc;

use scrollstage_protocol::{ScrollMetrics, ScrollState};
use serde::Serialize;

/// A committed tracker output. `state` and `metrics` always come from the
/// same sampling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Committed {
    /// Number of ticks committed before this one; `0` is the activation read.
    pub tick: u64,
    pub state: ScrollState,
    pub metrics: ScrollMetrics,
}

/// Create a single-writer, many-reader channel seeded with `initial`.
pub fn channel(initial: Committed) -> (StateWriter, StateReader) {
    let cell = Rc::new(Cell::new(initial));
    (
        StateWriter { cell: cell.clone() },
        StateReader { cell },
    )
}

/// The only handle that can publish. Deliberately not `Clone`.
#[derive(Debug)]
pub struct StateWriter {
    cell: Rc<Cell<Committed>>,
}

impl StateWriter {
    /// Publish a new pair, bumping the tick counter.
    pub fn commit(&self, state: ScrollState, metrics: ScrollMetrics) -> Committed {
        let next = Committed {
            tick: self.cell.get().tick + 1,
            state,
            metrics,
        };
        self.cell.set(next);
        next
    }

    pub fn current(&self) -> Committed {
        self.cell.get()
    }

    pub fn reader(&self) -> StateReader {
        StateReader {
            cell: self.cell.clone(),
        }
    }
}

/// Read-only view of the latest committed pair.
#[derive(Debug, Clone)]
pub struct StateReader {
    cell: Rc<Cell<Committed>>,
}

impl StateReader {
    pub fn get(&self) -> Committed {
        self.cell.get()
    }

    pub fn state(&self) -> ScrollState {
        self.cell.get().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_see_latest_commit() {
        let (writer, reader) = channel(Committed::default());
        let other = reader.clone();

        writer.commit(
            ScrollState::new(0.25, 1.5),
            ScrollMetrics::new(500.0, 3000.0, 1000.0),
        );

        assert_eq!(reader.state(), ScrollState::new(0.25, 1.5));
        assert_eq!(other.get().tick, 1);
        assert!((other.get().metrics.offset - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_counts_commits() {
        let (writer, reader) = channel(Committed::default());
        for _ in 0..3 {
            writer.commit(ScrollState::default(), ScrollMetrics::default());
        }
        assert_eq!(reader.get().tick, 3);
        assert_eq!(writer.reader().get(), writer.current());
    }
}
