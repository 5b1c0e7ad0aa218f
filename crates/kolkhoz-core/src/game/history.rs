use crate::game::requisition::RequisitionAction;
use crate::model::suit_map::SuitMap;
use crate::model::trick::Play;
use serde::{Deserialize, Serialize};

/// One entry of the append-only game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Trick {
        year: u32,
        plays: Vec<Play>,
        winner: usize,
    },
    /// Labor totals at the end of a year, before requisition.
    Jobs { year: u32, work_hours: SuitMap<u32> },
    Requisition {
        year: u32,
        actions: Vec<RequisitionAction>,
    },
}

impl Event {
    pub fn year(&self) -> u32 {
        match self {
            Event::Trick { year, .. } | Event::Jobs { year, .. } | Event::Requisition { year, .. } => {
                *year
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    events: Vec<Event>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn for_year(&self, year: u32) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |event| event.year() == year)
    }

    pub fn tricks(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Trick { .. }))
    }
}
