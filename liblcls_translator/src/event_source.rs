use super::config::Config;
use super::error::{DataSourceError, EventSourceError};
use super::facility::{DataSource, RunCoordinator};
use super::native::EventTime;

/// How the adapter walks the run.
///
/// `PickedEvents` iterates an explicit time+fiducial list from the
/// configuration. `Indexed` iterates the run index, sharded across workers.
/// `Stream` pulls from the live iterator, with stride/offset sharding unless
/// the source is a shared-memory stream (those are already per-process).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterationMode {
    PickedEvents,
    Indexed,
    Stream { offset: usize, stride: usize },
}

/// Wraps the facility library's run/event iteration and applies the
/// iteration strategy selected by the configuration.
///
/// Exhaustion of the assigned share is a normal termination: it is logged,
/// the coordinator hook fires once, and every later call returns `None`.
pub struct EventSourceAdapter<D: DataSource> {
    source: D,
    mode: IterationMode,
    /// Event stamps to visit; empty in stream mode
    times: Vec<EventTime>,
    cursor: usize,
    /// Zero-based position in the underlying stream, counting skipped events
    position: usize,
    frame_cap: Option<usize>,
    coordinator: Option<Box<dyn RunCoordinator>>,
    finished: bool,
}

impl<D: DataSource> EventSourceAdapter<D> {
    /// Select the iteration strategy for a validated configuration
    pub fn new(config: &Config, source: D) -> Result<Self, EventSourceError> {
        let mut adapter = Self {
            source,
            mode: IterationMode::Stream {
                offset: 0,
                stride: 1,
            },
            times: Vec::new(),
            cursor: 0,
            position: 0,
            frame_cap: config.n_frames,
            coordinator: None,
            finished: false,
        };

        if let (Some(times), Some(fiducials)) = (&config.times, &config.fiducials) {
            adapter.mode = IterationMode::PickedEvents;
            adapter.times = times
                .iter()
                .zip(fiducials.iter())
                .map(|(&packed, &fiducial)| EventTime::from_packed(packed, fiducial))
                .collect();
        } else if config.indexing {
            adapter.mode = IterationMode::Indexed;
            let mut stamps = adapter.source.index_times()?;
            if let Some(cap) = config.n_frames {
                stamps.truncate(cap);
            }
            adapter.times = stamps
                .into_iter()
                .skip(config.worker_rank)
                .step_by(config.n_workers.max(1))
                .collect();
            adapter.cursor = config.index_offset.unwrap_or(0) / config.n_workers.max(1);
        } else if !config.is_shared_memory() {
            adapter.mode = IterationMode::Stream {
                offset: config.worker_rank,
                stride: config.n_workers.max(1),
            };
        }

        Ok(adapter)
    }

    /// Install the hook the external coordinator listens on
    pub fn set_coordinator(&mut self, coordinator: Box<dyn RunCoordinator>) {
        self.coordinator = Some(coordinator);
    }

    /// Advance to the next event of this worker's share.
    ///
    /// Returns `None` once the share is exhausted or the frame cap is reached.
    pub fn next_event(&mut self) -> Result<Option<D::Event>, DataSourceError> {
        if self.finished {
            return Ok(None);
        }
        let event = match self.mode {
            IterationMode::PickedEvents | IterationMode::Indexed => self.next_listed()?,
            IterationMode::Stream { offset, stride } => self.next_streamed(offset, stride)?,
        };
        if event.is_none() {
            self.finish();
        }
        Ok(event)
    }

    /// Walk the stamp list, skipping stamps the index cannot resolve
    fn next_listed(&mut self) -> Result<Option<D::Event>, DataSourceError> {
        while self.cursor < self.times.len() {
            let stamp = self.times[self.cursor];
            self.cursor += 1;
            match self.source.event_at(&stamp)? {
                Some(event) => return Ok(Some(event)),
                None => {
                    spdlog::warn!(
                        "Unable to find event for time {} fiducial {}; skipping",
                        stamp.packed(),
                        stamp.fiducial
                    );
                }
            }
        }
        Ok(None)
    }

    fn next_streamed(&mut self, offset: usize, stride: usize) -> Result<Option<D::Event>, DataSourceError> {
        // Skip events assigned to other workers
        while self.position % stride != offset {
            if self.source.next_event()?.is_none() {
                return Ok(None);
            }
            self.position += 1;
        }
        if let Some(cap) = self.frame_cap {
            if self.position >= cap {
                return Ok(None);
            }
        }
        let event = self.source.next_event()?;
        if event.is_some() {
            self.position += 1;
        }
        Ok(event)
    }

    fn finish(&mut self) {
        self.finished = true;
        spdlog::info!("End of run");
        if let Some(coordinator) = self.coordinator.as_mut() {
            coordinator.run_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::facility::NativeEvent;
    use crate::native::{NativeData, NativeTypeId};
    use crate::test_support::{event_with_id, FakeSource};

    struct CountingCoordinator(Arc<AtomicUsize>);

    impl RunCoordinator for CountingCoordinator {
        fn run_finished(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stream_config(rank: usize, workers: usize) -> Config {
        Config {
            data_source: String::from("exp=amo12345"),
            worker_rank: rank,
            n_workers: workers,
            ..Config::default()
        }
    }

    fn event_seconds(event: &impl NativeEvent) -> u32 {
        for key in event.keys() {
            if key.type_id == NativeTypeId::EventId {
                if let Some(NativeData::EventId(id)) = event.get(key) {
                    return id.seconds;
                }
            }
        }
        panic!("event carries no id");
    }

    #[test]
    fn test_sharded_stream_partitions_by_position() {
        let workers = 3;
        let mut consumed: Vec<Vec<u32>> = Vec::new();
        for rank in 0..workers {
            let source = FakeSource::with_stream((0..9).map(event_with_id).collect());
            let mut adapter = EventSourceAdapter::new(&stream_config(rank, workers), source).unwrap();
            let mut seen = Vec::new();
            while let Some(event) = adapter.next_event().unwrap() {
                seen.push(event_seconds(&event));
            }
            consumed.push(seen);
        }
        assert_eq!(consumed[0], vec![0, 3, 6]);
        assert_eq!(consumed[1], vec![1, 4, 7]);
        assert_eq!(consumed[2], vec![2, 5, 8]);

        // The union over workers reconstructs the original order
        let mut merged: Vec<u32> = Vec::new();
        for position in 0..9 {
            merged.push(consumed[position % workers][position / workers]);
        }
        assert_eq!(merged, (0..9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_single_worker_stream_consumes_everything_in_order() {
        let source = FakeSource::with_stream((0..5).map(event_with_id).collect());
        let mut adapter = EventSourceAdapter::new(&stream_config(0, 1), source).unwrap();
        let mut seen = Vec::new();
        while let Some(event) = adapter.next_event().unwrap() {
            seen.push(event_seconds(&event));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_frame_cap_bounds_stream_position() {
        let mut config = stream_config(0, 1);
        config.n_frames = Some(3);
        let source = FakeSource::with_stream((0..10).map(event_with_id).collect());
        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let mut count = 0;
        while adapter.next_event().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_shared_memory_stream_is_never_sharded() {
        let mut config = stream_config(1, 4);
        config.data_source = String::from("shmem=psana.0:stop=no");
        let source = FakeSource::with_stream((0..4).map(event_with_id).collect());
        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let mut count = 0;
        while adapter.next_event().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn test_picked_events_skip_unresolvable_stamps() {
        let mut source = FakeSource::default();
        source.add_indexed(10, 0, 1, event_with_id(10));
        source.add_indexed(30, 0, 3, event_with_id(30));

        let mut config = stream_config(0, 1);
        // Stamp (20, fiducial 2) is not in the index and must be skipped
        config.times = Some(vec![10u64 << 32, 20u64 << 32, 30u64 << 32]);
        config.fiducials = Some(vec![1, 2, 3]);

        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let mut seen = Vec::new();
        while let Some(event) = adapter.next_event().unwrap() {
            seen.push(event_seconds(&event));
        }
        assert_eq!(seen, vec![10, 30]);
    }

    #[test]
    fn test_indexed_mode_shards_the_index() {
        let mut source = FakeSource::default();
        for n in 0..6 {
            source.add_indexed(n, 0, n, event_with_id(n));
        }
        let mut config = stream_config(1, 2);
        config.indexing = true;

        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let mut seen = Vec::new();
        while let Some(event) = adapter.next_event().unwrap() {
            seen.push(event_seconds(&event));
        }
        assert_eq!(seen, vec![1, 3, 5]);
    }

    #[test]
    fn test_indexed_mode_applies_cap_before_sharding() {
        let mut source = FakeSource::default();
        for n in 0..8 {
            source.add_indexed(n, 0, n, event_with_id(n));
        }
        let mut config = stream_config(0, 2);
        config.indexing = true;
        config.n_frames = Some(4);

        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let mut seen = Vec::new();
        while let Some(event) = adapter.next_event().unwrap() {
            seen.push(event_seconds(&event));
        }
        assert_eq!(seen, vec![0, 2]);
    }

    #[test]
    fn test_index_offset_is_divided_among_workers() {
        let mut source = FakeSource::default();
        for n in 0..8 {
            source.add_indexed(n, 0, n, event_with_id(n));
        }
        let mut config = stream_config(0, 2);
        config.indexing = true;
        config.index_offset = Some(4);

        let mut adapter = EventSourceAdapter::new(&config, source).unwrap();
        let first = adapter.next_event().unwrap().unwrap();
        assert_eq!(event_seconds(&first), 4);
    }

    #[test]
    fn test_coordinator_notified_exactly_once() {
        let notified = Arc::new(AtomicUsize::new(0));
        let source = FakeSource::with_stream(vec![event_with_id(0)]);
        let mut adapter = EventSourceAdapter::new(&stream_config(0, 1), source).unwrap();
        adapter.set_coordinator(Box::new(CountingCoordinator(notified.clone())));

        assert!(adapter.next_event().unwrap().is_some());
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert!(adapter.next_event().unwrap().is_none());
        assert!(adapter.next_event().unwrap().is_none());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
