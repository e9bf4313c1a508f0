//! Declarative scenario timelines.
//!
//! A timeline is a list of `(tick, command)` entries. Entries may be added
//! in any order; the runner schedules them by tick, keeping submission order
//! for entries sharing a tick. This replaces ad-hoc `if tick == N` branches
//! scattered through a driver loop with data the driver owns and passes in.

use fluxnet_core::command_queue::Command;
use fluxnet_core::fixed::Ticks;

/// An ordered script of engine edits keyed by tick.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<(Ticks, Command)>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: schedule `command` for `tick`.
    pub fn at(mut self, tick: Ticks, command: Command) -> Self {
        self.push(tick, command);
        self
    }

    /// Schedule `command` for `tick`.
    pub fn push(&mut self, tick: Ticks, command: Command) {
        self.entries.push((tick, command));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The latest tick any entry is scheduled for, if any.
    pub fn last_tick(&self) -> Option<Ticks> {
        self.entries.iter().map(|&(t, _)| t).max()
    }

    /// Consume into a schedule ordered by tick, stable for entries that
    /// share one.
    pub(crate) fn into_schedule(self) -> Vec<(Ticks, Command)> {
        let mut entries = self.entries;
        entries.sort_by_key(|&(tick, _)| tick);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_source(name: &str) -> Command {
        Command::AddSource {
            name: name.to_string(),
        }
    }

    #[test]
    fn entries_sort_by_tick() {
        let timeline = Timeline::new()
            .at(30, add_source("late"))
            .at(10, add_source("early"))
            .at(20, add_source("middle"));

        let schedule = timeline.into_schedule();
        let ticks: Vec<_> = schedule.iter().map(|&(t, _)| t).collect();
        assert_eq!(ticks, vec![10, 20, 30]);
    }

    #[test]
    fn same_tick_preserves_submission_order() {
        let timeline = Timeline::new()
            .at(5, add_source("first"))
            .at(5, add_source("second"));

        let schedule = timeline.into_schedule();
        assert!(matches!(
            &schedule[0].1,
            Command::AddSource { name } if name == "first"
        ));
        assert!(matches!(
            &schedule[1].1,
            Command::AddSource { name } if name == "second"
        ));
    }

    #[test]
    fn last_tick_reports_latest_entry() {
        assert_eq!(Timeline::new().last_tick(), None);
        let timeline = Timeline::new().at(7, add_source("a")).at(3, add_source("b"));
        assert_eq!(timeline.last_tick(), Some(7));
    }
}
