use std::collections::BTreeSet;

use super::config::Config;
use super::epics::EpicsDict;
use super::error::{TranslateError, TranslatorError};
use super::event_source::EventSourceAdapter;
use super::facility::{DataSource, NativeEvent, RunCoordinator};
use super::native::{EventIdData, EventKey};
use super::record::{RecordMap, RecordValue};
use super::registry::{Category, SourceRegistry, TypeRegistry};
use super::translate::DecodeTable;

/// Translates between native facility events and the uniform representation.
///
/// The translator pulls events through the source adapter and answers three
/// questions about each one: which categories are present, what are the
/// decoded records for a category, and what is the event's identifier. EPICS
/// parameters are served by the lazy dict behind [`LclsTranslator::parameters`].
pub struct LclsTranslator<D: DataSource> {
    adapter: EventSourceAdapter<D>,
    types: TypeRegistry,
    sources: SourceRegistry,
    decoders: DecodeTable,
    epics: EpicsDict<D::Epics>,
}

impl<D: DataSource> LclsTranslator<D> {
    /// Validate the configuration and wire up the translation tables
    pub fn new(config: &Config, source: D) -> Result<Self, TranslatorError> {
        config.validate()?;
        spdlog::info!("Translating data source {}", config.resolved_source());
        if let Some(calib_dir) = &config.calib_dir {
            spdlog::info!("Using calibration directory {}", calib_dir.to_string_lossy());
        }
        let epics = EpicsDict::new(source.epics());
        let adapter = EventSourceAdapter::new(config, source)?;
        Ok(Self {
            adapter,
            types: TypeRegistry::new(),
            sources: SourceRegistry::new(),
            decoders: DecodeTable::new(),
            epics,
        })
    }

    /// Install the hook the external coordinator listens on for end-of-run
    pub fn set_coordinator(&mut self, coordinator: Box<dyn RunCoordinator>) {
        self.adapter.set_coordinator(coordinator);
    }

    /// Grab the next event of this worker's share, `None` at end of stream
    pub fn next_event(&mut self) -> Result<Option<D::Event>, TranslatorError> {
        Ok(self.adapter.next_event()?)
    }

    /// The categories available in this event.
    ///
    /// Native types without a registry entry are omitted; `Parameters` and
    /// `Analysis` are always present.
    pub fn event_categories(&self, event: &D::Event) -> BTreeSet<Category> {
        let mut categories: BTreeSet<Category> = event
            .keys()
            .iter()
            .filter_map(|key| self.types.category_of(key.type_id))
            .collect();
        categories.insert(Category::Parameters);
        categories.insert(Category::Analysis);
        categories
    }

    /// The raw native keys of this event
    pub fn native_keys<'a>(&self, event: &'a D::Event) -> &'a [EventKey] {
        event.keys()
    }

    /// Decoded records for one category of one event.
    ///
    /// `Parameters` and `Analysis` decode to an empty map; parameters are
    /// served by [`LclsTranslator::parameters`] and analysis records are
    /// added downstream.
    pub fn translate(&self, event: &D::Event, category: Category) -> Result<RecordMap, TranslateError> {
        match category {
            Category::Parameters | Category::Analysis => Ok(RecordMap::default()),
            _ => self.translate_core(event, category),
        }
    }

    /// Decode every native item of this event that feeds `category`
    fn translate_core(&self, event: &D::Event, category: Category) -> Result<RecordMap, TranslateError> {
        let native_types = self.types.native_types(category);
        let mut values = RecordMap::default();
        for key in event.keys() {
            if !native_types.contains(&key.type_id) {
                continue;
            }
            let decoder = self.decoders.decoder_for(key.type_id)?;
            let data = event
                .get(key)
                .ok_or_else(|| TranslateError::MissingPayload(key.to_string()))?;
            decoder(key, data, &self.sources, &mut values)?;
        }
        Ok(values)
    }

    /// Decode the items matching an arbitrary native key string.
    ///
    /// The records are produced by the same per-type routines as category
    /// translation, so an unregistered type is just as fatal here.
    pub fn translate_native(&self, event: &D::Event, name: &str) -> Result<RecordMap, TranslateError> {
        let mut values = RecordMap::default();
        let mut found = false;
        for key in event.keys() {
            if key.key != name {
                continue;
            }
            found = true;
            let decoder = self.decoders.decoder_for(key.type_id)?;
            let data = event
                .get(key)
                .ok_or_else(|| TranslateError::MissingPayload(key.to_string()))?;
            decoder(key, data, &self.sources, &mut values)?;
        }
        if found {
            Ok(values)
        } else {
            Err(TranslateError::UnknownNativeKey(name.to_string()))
        }
    }

    /// Floating-point event identifier in seconds, unique per shot and
    /// monotonically non-decreasing within a run
    pub fn event_id(&self, event: &D::Event) -> Result<f64, TranslateError> {
        Ok(self.timestamp(event)?.as_seconds())
    }

    /// 64-bit packed alternative to [`LclsTranslator::event_id`], derived
    /// from the same timestamp pair
    pub fn event_id2(&self, event: &D::Event) -> Result<u64, TranslateError> {
        Ok(self.timestamp(event)?.packed())
    }

    fn timestamp(&self, event: &D::Event) -> Result<EventIdData, TranslateError> {
        let values = self.translate_core(event, Category::EventId)?;
        match values.get("Timestamp").map(|record| &record.value) {
            Some(RecordValue::Timestamp(id)) => Ok(*id),
            _ => Err(TranslateError::MissingEventId),
        }
    }

    /// The lazy dict over the EPICS parameter store
    pub fn parameters(&mut self) -> &mut EpicsDict<D::Epics> {
        &mut self.epics
    }
}
