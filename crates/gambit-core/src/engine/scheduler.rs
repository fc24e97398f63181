//! Per-rule timer, activation and priority transitions.
//!
//! A rule's timer counts down by the tick length. When it reaches the tick
//! the rule fires (if its gate lets it) and is rescheduled from its repeat
//! range. Firing draws a fresh timer; a zero draw leaves the rule active,
//! anything else deactivates it until the countdown elapses.
//!
//! A cast that could not start is retried on the very next tick: the rule is
//! given a one-millisecond timer and a raised priority so it runs ahead of
//! rules that never failed.

use rand::Rng;

use crate::rule::{Interval, RuleInstance, DEFAULT_PRIORITY};

/// Draws a value from `range`; degenerate ranges return `min` without drawing.
pub(crate) fn roll<R: Rng + ?Sized>(range: Interval, rng: &mut R) -> u32 {
    if range.min >= range.max {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

/// Percent roll; 100 and above always pass.
pub(crate) fn roll_chance<R: Rng + ?Sized>(chance: u32, rng: &mut R) -> bool {
    chance >= 100 || rng.gen_range(0..100) < chance
}

impl RuleInstance {
    /// Sets the timer from `range` and activates the rule only on a zero draw.
    pub(crate) fn recalc_timer<R: Rng + ?Sized>(&mut self, range: Interval, rng: &mut R) {
        self.timer = roll(range, rng);
        self.active = self.timer == 0;
    }

    /// Arms the rule as it is when freshly bound or reset.
    pub(crate) fn init_timer<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.def.event.initial_timer() {
            Some(range) => self.recalc_timer(range, rng),
            None => self.active = true,
        }
    }

    /// Schedules the rule for the next tick ahead of unraised rules.
    ///
    /// Returns whether the list needs re-sorting.
    pub(crate) fn raise_priority(&mut self, next_priority: &mut u32) -> bool {
        self.timer = 1;
        if self.priority != DEFAULT_PRIORITY {
            return false;
        }
        self.priority = *next_priority;
        *next_priority = next_priority.saturating_add(1);
        true
    }

    /// Raises the rule and lets it run again without another chance roll.
    ///
    /// Returns whether the list needs re-sorting.
    pub(crate) fn retry_later(&mut self, next_priority: &mut u32) -> bool {
        let resort = self.raise_priority(next_priority);
        self.ignore_chance_once = true;
        self.run_once = false;
        resort
    }

    /// Drops a raised priority once the rule is back on a normal timer.
    ///
    /// Returns whether the list needs re-sorting.
    pub(crate) fn settle_priority(&mut self) -> bool {
        if self.priority != DEFAULT_PRIORITY && self.timer > 1 {
            self.priority = DEFAULT_PRIORITY;
            return true;
        }
        false
    }

    /// Puts the rule back to its bind-time state unless it survives resets.
    ///
    /// Returns whether the list needs re-sorting.
    pub(crate) fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self
            .def
            .flags
            .contains(crate::rule::EventFlags::DONT_RESET)
        {
            self.init_timer(rng);
            self.run_once = false;
        }
        if self.priority == DEFAULT_PRIORITY {
            return false;
        }
        self.priority = DEFAULT_PRIORITY;
        true
    }
}
