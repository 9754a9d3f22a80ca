//! # lcls_translator
//!
//! lcls_translator is the LCLS event-translation layer, written in Rust. It
//! takes raw event records produced by the facility data-acquisition library
//! and translates them into a uniform, facility-agnostic representation of
//! named, unit-tagged records for the downstream analysis pipeline.
//!
//! The facility library itself is a black box behind the traits in
//! [`facility`]: the embedding application supplies a binding that does the
//! actual event iteration, index lookup and parameter decoding, and this
//! crate decides what to ask for and what the answers mean.
//!
//! ## Translation model
//!
//! Each native event addresses its data by (type, source, key) triples. The
//! type registry maps every known native type to one of a small set of
//! semantic categories:
//!
//! | Category | Native types |
//! |---|---|
//! | `pulseEnergies` | gas monitor detector, IPM pulse-energy monitors |
//! | `photonEnergies` | e-beam records (all versions) |
//! | `photonPixelDetectors` | CsPad, CsPad2x2, pnCCD |
//! | `camera` | opal camera frames |
//! | `ionTOFs` | Acqiris digitizer traces |
//! | `eventID` | the per-shot timestamp record |
//! | `eventCodes` | EVR fifo event codes |
//!
//! plus the `parameters` and `analysis` pseudo-categories. A native type with
//! no registry entry is simply not discoverable; asking to *decode* a type
//! with no registered routine is a fatal error, because silently mis-decoded
//! detector data is unacceptable.
//!
//! Photon energy is resolved per event as either a direct reading or a value
//! derived from the beam's peak current and L3 energy with a fixed
//! closed-form formula; see [`physics`].
//!
//! EPICS parameters are decoded on demand through a dict-like view that
//! caches each parameter the first time it is requested and never evicts;
//! decoding the whole store up front is far too slow.
//!
//! ## Iteration
//!
//! The event source adapter selects one of four strategies from the
//! configuration:
//!
//! - live stream iteration;
//! - explicit extraction of listed time+fiducial pairs (requires an indexed
//!   experiment source; unresolvable stamps are logged and skipped);
//! - sharded iteration over the prebuilt run index;
//! - sharded live stream, where a worker with rank r of W consumes the
//!   events whose zero-based position is congruent to r modulo W.
//!
//! Shared-memory sources are already per-process and are never sharded.
//! End-of-stream is a normal termination: it is logged, reported once to the
//! run coordinator hook, and surfaced to the caller as `None`.
//!
//! ## Configuration
//!
//! Configurations are YAML, read with [`config::Config::read_config_file`]:
//!
//! ```yml
//! data_source: exp=amo12345
//! run_number: 96
//! calib_dir: null
//! facility_config: null
//! times: null
//! fiducials: null
//! indexing: true
//! index_offset: null
//! n_frames: 10000
//! worker_rank: 0
//! n_workers: 4
//! ```
//!
//! Invalid combinations (missing data source, times without fiducials,
//! extraction from a non-indexable source, a worker rank outside the worker
//! count) fail fast at construction.
pub mod config;
pub mod constants;
pub mod epics;
pub mod error;
pub mod event_source;
pub mod facility;
pub mod native;
pub mod physics;
pub mod record;
pub mod registry;
pub mod translate;
pub mod translator;

#[cfg(test)]
pub(crate) mod test_support;
