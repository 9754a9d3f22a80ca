//! In-memory fakes for the facility traits, shared by the unit tests.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use fxhash::FxHashMap;

use super::error::DataSourceError;
use super::facility::{DataSource, EpicsStore, NativeEvent, PvValue};
use super::native::{EventIdData, EventKey, EventTime, NativeData, NativeTypeId};

/// A native event backed by parallel key/payload lists
#[derive(Debug, Clone, Default)]
pub struct FakeEvent {
    keys: Vec<EventKey>,
    payloads: Vec<Option<NativeData>>,
}

impl FakeEvent {
    pub fn push(&mut self, key: EventKey, data: NativeData) {
        self.keys.push(key);
        self.payloads.push(Some(data));
    }

    /// A key the event lists but cannot produce a payload for
    pub fn push_key_only(&mut self, key: EventKey) {
        self.keys.push(key);
        self.payloads.push(None);
    }
}

impl NativeEvent for FakeEvent {
    fn keys(&self) -> &[EventKey] {
        &self.keys
    }

    fn get(&self, key: &EventKey) -> Option<&NativeData> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .and_then(|index| self.payloads[index].as_ref())
    }
}

/// EPICS store fake that counts decode calls
#[derive(Debug, Clone, Default)]
pub struct FakeEpics {
    values: FxHashMap<String, PvValue>,
    aliases: FxHashMap<String, String>,
    fetches: Rc<Cell<usize>>,
}

impl FakeEpics {
    pub fn add(&mut self, name: &str, value: PvValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn add_alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_string(), target.to_string());
    }

    /// Shared handle to the decode counter
    pub fn fetch_counter(&self) -> Rc<Cell<usize>> {
        self.fetches.clone()
    }
}

impl EpicsStore for FakeEpics {
    fn pv_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.keys().cloned().collect()
    }

    fn fetch(&self, name: &str) -> Option<PvValue> {
        self.fetches.set(self.fetches.get() + 1);
        self.values.get(name).cloned().or_else(|| {
            self.aliases
                .get(name)
                .and_then(|target| self.values.get(target).cloned())
        })
    }
}

/// Data source fake with a streamed part and an indexed part
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    stream: VecDeque<FakeEvent>,
    indexed: Vec<(EventTime, FakeEvent)>,
    epics: FakeEpics,
}

impl FakeSource {
    pub fn with_stream(events: Vec<FakeEvent>) -> Self {
        Self {
            stream: events.into(),
            ..Self::default()
        }
    }

    pub fn add_indexed(&mut self, seconds: u32, nanoseconds: u32, fiducial: u32, event: FakeEvent) {
        self.indexed
            .push((EventTime::new(seconds, nanoseconds, fiducial), event));
    }

    pub fn set_epics(&mut self, epics: FakeEpics) {
        self.epics = epics;
    }
}

impl DataSource for FakeSource {
    type Event = FakeEvent;
    type Epics = FakeEpics;

    fn next_event(&mut self) -> Result<Option<FakeEvent>, DataSourceError> {
        Ok(self.stream.pop_front())
    }

    fn index_times(&self) -> Result<Vec<EventTime>, DataSourceError> {
        Ok(self.indexed.iter().map(|(stamp, _)| *stamp).collect())
    }

    fn event_at(&mut self, time: &EventTime) -> Result<Option<FakeEvent>, DataSourceError> {
        Ok(self
            .indexed
            .iter()
            .find(|(stamp, _)| stamp == time)
            .map(|(_, event)| event.clone()))
    }

    fn epics(&self) -> FakeEpics {
        self.epics.clone()
    }
}

/// An event carrying only an event identifier with the given coarse time
pub fn event_with_id(seconds: u32) -> FakeEvent {
    let mut event = FakeEvent::default();
    event.push(
        EventKey::new(NativeTypeId::EventId, "EventId", ""),
        NativeData::EventId(EventIdData {
            seconds,
            nanoseconds: 0,
            fiducial: seconds % 360,
            run: 1,
            ticks: 0,
            vector: 0,
        }),
    );
    event
}
