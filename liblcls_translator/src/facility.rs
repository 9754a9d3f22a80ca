//! Traits abstracting the facility data-acquisition library.
//!
//! The translator never touches raw facility data itself; it drives these
//! traits. The embedding application supplies a binding to the real library,
//! and the test suite supplies in-memory fakes.

use super::error::DataSourceError;
use super::native::{EventKey, EventTime, NativeData};

/// One shot's worth of raw facility data, addressed by (type, source, key) triples
pub trait NativeEvent {
    /// All item addresses present in this event
    fn keys(&self) -> &[EventKey];
    /// Decoded payload for one address, None if the event does not carry it
    fn get(&self, key: &EventKey) -> Option<&NativeData>;
}

/// A raw value from the EPICS parameter store
#[derive(Debug, Clone, PartialEq)]
pub enum PvValue {
    Float(f64),
    Int(i64),
    Text(String),
    FloatArray(Vec<f64>),
}

/// The facility control-system parameter store.
///
/// Fetching decodes a single parameter; the store itself performs no caching.
pub trait EpicsStore {
    /// Names of all process variables in the store
    fn pv_names(&self) -> Vec<String>;
    /// Alias names configured for this run
    fn aliases(&self) -> Vec<String>;
    /// Decode the current value of one parameter, None for an unknown name
    fn fetch(&self, name: &str) -> Option<PvValue>;
}

/// The facility library's run/event access surface.
///
/// Covers the three access patterns the translator needs: streaming
/// iteration, the prebuilt run index, and random access by time+fiducial.
pub trait DataSource {
    type Event: NativeEvent;
    type Epics: EpicsStore;

    /// Pull the next event from the stream, None when exhausted
    fn next_event(&mut self) -> Result<Option<Self::Event>, DataSourceError>;
    /// All event stamps in the run index, in acquisition order
    fn index_times(&self) -> Result<Vec<EventTime>, DataSourceError>;
    /// Random access by time+fiducial, None if the stamp resolves to nothing
    fn event_at(&mut self, time: &EventTime) -> Result<Option<Self::Event>, DataSourceError>;
    /// Handle to the EPICS parameter store for this run
    fn epics(&self) -> Self::Epics;
}

/// Hook notified when a worker's share of the run is exhausted.
///
/// The external coordination layer implements this to learn that a worker
/// finished; end-of-stream itself is a normal termination, not an error.
pub trait RunCoordinator {
    fn run_finished(&mut self);
}
