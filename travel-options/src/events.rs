//! Bounded journal of travel transitions for hosts, reports and tests.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::avoidance::{AvoidanceAttemptOutcome, AvoidanceTicket};
use crate::constants::EVENT_JOURNAL_CAPACITY;
use crate::journey::{PauseReason, SimTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TravelEvent {
    Began {
        destination: String,
        cautious: bool,
        multiplier: u32,
    },
    Resumed {
        destination: String,
        multiplier: u32,
    },
    Paused {
        reason: PauseReason,
    },
    NegotiationOpened {
        ticket: AvoidanceTicket,
        success_chance: u32,
    },
    AvoidanceDeclined {
        ticket: AvoidanceTicket,
    },
    AvoidanceResolved {
        ticket: AvoidanceTicket,
        outcome: AvoidanceAttemptOutcome,
    },
    EncounterIgnored {
        until: SimTime,
    },
    AccelerationChanged {
        level: usize,
        multiplier: u32,
    },
    Interrupted {
        reason: PauseReason,
    },
    DestinationCleared,
    Arrived {
        destination: String,
        elapsed: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    entries: VecDeque<TravelEvent>,
}

impl EventJournal {
    pub fn push(&mut self, event: TravelEvent) {
        if self.entries.len() == EVENT_JOURNAL_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TravelEvent> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<TravelEvent> {
        self.entries.drain(..).collect()
    }
}
