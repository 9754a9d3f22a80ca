use std::path::PathBuf;
use thiserror::Error;

use super::native::NativeTypeId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config is missing the required data source string")]
    MissingDataSource,
    #[error("Config gave one of times/fiducials without the other; event extraction expects both identifiers")]
    MissingEventList,
    #[error("Config gave mismatched event lists -- times: {0} fiducials: {1}")]
    MismatchedEventLists(usize, usize),
    #[error("Config requested indexed access, but data source {0} does not support index files")]
    NotIndexable(String),
    #[error("Config gave an invalid worker count: {0}")]
    InvalidWorkerCount(usize),
    #[error("Config gave worker rank {0} which is out of range for {1} workers")]
    InvalidWorkerRank(usize, usize),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Data source {0} has no event index")]
    NoIndex(String),
    #[error("Facility library failed: {0}")]
    Library(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Found invalid category keyword: {0}")]
    InvalidCategory(String),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Native type {0} has no registered decode routine")]
    UnsupportedType(NativeTypeId),
    #[error("Native event returned a payload that does not match type {type_id} for key {key}")]
    PayloadMismatch { type_id: NativeTypeId, key: String },
    #[error("Native event listed key {0} but returned no payload for it")]
    MissingPayload(String),
    #[error("Event does not carry an event identifier record")]
    MissingEventId,
    #[error("Key {0} not found in event")]
    UnknownNativeKey(String),
}

#[derive(Debug, Error)]
pub enum EpicsError {
    #[error("{0} is not a valid EPICS key")]
    KeyNotFound(String),
}

#[derive(Debug, Error)]
pub enum EventSourceError {
    #[error("Event source failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Event source failed due to data source error: {0}")]
    SourceError(#[from] DataSourceError),
}

#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("Translator failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Translator failed due to event source error: {0}")]
    EventSourceError(#[from] EventSourceError),
    #[error("Translator failed due to data source error: {0}")]
    SourceError(#[from] DataSourceError),
    #[error("Translator failed due to translation error: {0}")]
    TranslateError(#[from] TranslateError),
    #[error("Translator failed due to EPICS error: {0}")]
    EpicsError(#[from] EpicsError),
}
