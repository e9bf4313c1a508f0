//! The scenario runner: an engine plus its scripted timeline.

use crate::timeline::Timeline;
use fluxnet_core::command_queue::Command;
use fluxnet_core::engine::Engine;
use fluxnet_core::fixed::Ticks;
use std::collections::VecDeque;

/// Owns an [`Engine`] and a schedule of timed edits.
///
/// On each [`step`](Self::step), every entry due at (or before) the current
/// tick is submitted to the engine's command queue, then the engine steps --
/// the edits land in that tick's pre-tick phase, so an entry scheduled for
/// tick N takes effect starting with tick N's distribute/consume/transfer
/// pass.
#[derive(Debug)]
pub struct ScenarioRunner {
    engine: Engine,
    schedule: VecDeque<(Ticks, Command)>,
}

impl ScenarioRunner {
    pub fn new(engine: Engine, timeline: Timeline) -> Self {
        Self {
            engine,
            schedule: timeline.into_schedule().into(),
        }
    }

    /// Submit all due timeline entries, then run one engine step.
    pub fn step(&mut self) {
        let tick = self.engine.tick();
        while self
            .schedule
            .front()
            .is_some_and(|&(due, _)| due <= tick)
        {
            if let Some((_, command)) = self.schedule.pop_front() {
                self.engine.submit(command);
            }
        }
        self.engine.step();
    }

    /// Run `ticks` steps.
    pub fn run(&mut self, ticks: Ticks) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Number of timeline entries not yet submitted.
    pub fn pending_entries(&self) -> usize {
        self.schedule.len()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}
