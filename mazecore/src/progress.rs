use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam::channel::Sender;
use pausable_clock::{PausableClock, PausableInstant};
use serde::{Deserialize, Serialize};

/// Shared boolean, cheap to clone. Used as the "generation in progress" guard.
#[derive(Clone, Debug, Default)]
pub struct Flag(Arc<AtomicBool>);

impl Flag {
    pub fn new() -> Self {
        Flag(Arc::new(AtomicBool::new(false)))
    }

    /// Sets the flag, returns `false` if it was already set.
    pub fn try_set(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Started,
    Running,
    Done,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Started => "Starting",
            Phase::Running => "On Going...",
            Phase::Done => "Done !",
        }
    }
}

/// Snapshot of generation progress, emitted once per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub visited_count: usize,
    pub total_cells: usize,
    pub percent_complete: f64,
    pub eta_millis: u64,
    pub elapsed_millis: u64,
    pub phase: Phase,
}

impl StepEvent {
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Human readable status lines.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![
            self.phase.label().to_string(),
            format!("visited: {} / {}", self.visited_count, self.total_cells),
            format!("finished: {:.2}%", self.percent_complete),
            format!("time remaining: {}s", self.eta_millis / 1000),
        ];

        if self.is_done() {
            messages.push(format!(
                "total time: {}s and {}ms",
                self.elapsed_millis / 1000,
                self.elapsed_millis % 1000
            ));
        }

        messages
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    fn report(&mut self, event: &StepEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&StepEvent),
{
    fn report(&mut self, event: &StepEvent) {
        self(event)
    }
}

impl ProgressSink for Vec<StepEvent> {
    fn report(&mut self, event: &StepEvent) {
        self.push(event.clone());
    }
}

impl ProgressSink for Sender<StepEvent> {
    fn report(&mut self, event: &StepEvent) {
        // a dropped receiver just means nobody is watching anymore
        if self.send(event.clone()).is_err() {
            log::trace!("Progress receiver disconnected");
        }
    }
}

/// Writes status lines through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&mut self, event: &StepEvent) {
        log::info!("{}", event.messages().join(", "));
    }
}

/// Turns raw progress counters into [`StepEvent`]s with timing information.
pub struct StepReporter {
    total: usize,
    visited: usize,
    clock: PausableClock,
    start: PausableInstant,
}

impl StepReporter {
    pub fn new(total: usize) -> Self {
        let clock = PausableClock::default();
        let start = clock.now();
        Self {
            total,
            visited: 0,
            clock,
            start,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed(&self.clock)
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn start(&mut self, sink: &mut dyn ProgressSink) -> StepEvent {
        self.emit(Phase::Started, sink)
    }

    /// Records new progress. The count never goes backwards and never exceeds the total.
    pub fn step(&mut self, visited: usize, sink: &mut dyn ProgressSink) -> StepEvent {
        self.visited = self.visited.max(visited).min(self.total);
        self.emit(Phase::Running, sink)
    }

    pub fn finish(&mut self, sink: &mut dyn ProgressSink) -> StepEvent {
        self.visited = self.total;
        self.emit(Phase::Done, sink)
    }

    fn emit(&self, phase: Phase, sink: &mut dyn ProgressSink) -> StepEvent {
        let event = self.event(phase);
        sink.report(&event);
        event
    }

    pub fn event(&self, phase: Phase) -> StepEvent {
        let elapsed_millis = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
        let remaining = self.total.saturating_sub(self.visited) as u64;
        let eta_millis = match (phase, self.visited) {
            (Phase::Done, _) | (_, 0) => 0,
            (_, visited) => elapsed_millis.saturating_mul(remaining) / visited as u64,
        };
        let percent_complete = if self.total == 0 {
            100.0
        } else {
            self.visited as f64 / self.total as f64 * 100.0
        };

        StepEvent {
            visited_count: self.visited,
            total_cells: self.total,
            percent_complete,
            eta_millis,
            elapsed_millis,
            phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::unbounded;

    use super::*;

    #[test]
    fn flag_guard() {
        let flag = Flag::new();
        let ui = flag.clone();
        assert!(flag.try_set());
        assert!(ui.is_set());
        assert!(!flag.try_set());
        ui.clear();
        assert!(!flag.is_set());
    }

    #[test]
    fn reporter_is_monotonic() {
        let mut events: Vec<StepEvent> = Vec::new();
        let mut reporter = StepReporter::new(10);
        reporter.start(&mut events);
        reporter.step(3, &mut events);
        reporter.step(2, &mut events);
        reporter.step(42, &mut events);
        reporter.finish(&mut events);

        let counts: Vec<_> = events.iter().map(|e| e.visited_count).collect();
        assert_eq!(counts, [0, 3, 3, 10, 10]);
        assert_eq!(events[0].phase, Phase::Started);
        assert!(events.last().unwrap().is_done());
        assert_eq!(events.last().unwrap().eta_millis, 0);
        assert!((events[1].percent_complete - 30.0).abs() < 1e-9);
    }

    #[test]
    fn done_messages_contain_total_time() {
        let event = StepEvent {
            visited_count: 4,
            total_cells: 4,
            percent_complete: 100.0,
            eta_millis: 0,
            elapsed_millis: 1234,
            phase: Phase::Done,
        };
        let messages = event.messages();
        assert_eq!(messages[0], "Done !");
        assert_eq!(messages[1], "visited: 4 / 4");
        assert_eq!(messages[2], "finished: 100.00%");
        assert_eq!(messages.last().unwrap(), "total time: 1s and 234ms");
    }

    #[test]
    fn channel_and_closure_sinks() {
        let (s, r) = unbounded();
        let mut sender = s;
        let mut reporter = StepReporter::new(2);
        reporter.step(1, &mut sender);
        reporter.finish(&mut sender);
        drop(sender);

        let received: Vec<_> = r.iter().collect();
        assert_eq!(received.len(), 2);
        assert!(received[1].is_done());

        let mut seen = 0;
        let mut counter = |_: &StepEvent| seen += 1;
        reporter.finish(&mut counter);
        assert_eq!(seen, 1);
    }

    #[test]
    fn pause_and_resume() {
        let mut reporter = StepReporter::new(1);
        assert!(!reporter.is_paused());
        reporter.pause();
        assert!(reporter.is_paused());
        let frozen = reporter.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(reporter.elapsed(), frozen);
        reporter.resume();
        assert!(!reporter.is_paused());
    }
}
