use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Structure representing the translator configuration. Contains the data
/// source, indexing controls and the worker shard assignment.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Facility data-source string, e.g. "exp=amo12345" or "shmem=psana.0:stop=no"
    pub data_source: String,
    pub run_number: Option<i32>,
    /// Calibration directory handed to the facility library
    pub calib_dir: Option<PathBuf>,
    /// Facility library configuration file
    pub facility_config: Option<PathBuf>,
    /// Packed 64-bit event times for explicit event extraction
    pub times: Option<Vec<u64>>,
    /// Fiducials paired one-to-one with `times`
    pub fiducials: Option<Vec<u32>>,
    /// Iterate the prebuilt run index instead of the live stream
    pub indexing: bool,
    /// Starting offset into the run index, divided evenly among workers
    pub index_offset: Option<usize>,
    /// Stop after this many frames
    pub n_frames: Option<usize>,
    /// This worker's rank, assigned by the external coordination layer
    pub worker_rank: usize,
    pub n_workers: usize,
}

impl Default for Config {
    /// Generate a new Config object. The data source must be filled in
    fn default() -> Self {
        Self {
            data_source: String::from(""),
            run_number: None,
            calib_dir: None,
            facility_config: None,
            times: None,
            fiducials: None,
            indexing: false,
            index_offset: None,
            n_frames: None,
            worker_rank: 0,
            n_workers: 1,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Fail fast on a configuration the translator cannot serve
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_source.is_empty() {
            return Err(ConfigError::MissingDataSource);
        }
        if self.n_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.n_workers));
        }
        if self.worker_rank >= self.n_workers {
            return Err(ConfigError::InvalidWorkerRank(self.worker_rank, self.n_workers));
        }
        match (&self.times, &self.fiducials) {
            (Some(times), Some(fiducials)) => {
                if times.len() != fiducials.len() {
                    return Err(ConfigError::MismatchedEventLists(times.len(), fiducials.len()));
                }
                // Extraction needs XTC index files, which only experiment sources carry
                if !self.data_source.starts_with("exp=") {
                    return Err(ConfigError::NotIndexable(self.data_source.clone()));
                }
            }
            (None, None) => (),
            _ => return Err(ConfigError::MissingEventList),
        }
        if self.indexing && self.is_shared_memory() {
            return Err(ConfigError::NotIndexable(self.data_source.clone()));
        }
        if let Some(path) = &self.facility_config {
            if !path.exists() {
                return Err(ConfigError::BadFilePath(path.clone()));
            }
        }
        Ok(())
    }

    /// The data-source string to hand to the facility library, with the run
    /// number and index suffix applied
    pub fn resolved_source(&self) -> String {
        let mut source = self.data_source.clone();
        if let Some(run) = self.run_number {
            source.push_str(&format!(":run={run}"));
        }
        if (self.times.is_some() || self.indexing) && !source.ends_with(":idx") {
            source.push_str(":idx");
        }
        source
    }

    pub fn is_shared_memory(&self) -> bool {
        self.data_source.starts_with("shmem=")
    }

    pub fn uses_explicit_events(&self) -> bool {
        self.times.is_some() && self.fiducials.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_rejected() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingDataSource)
        ));
    }

    #[test]
    fn test_stream_config_is_accepted() {
        let config = Config {
            data_source: String::from("exp=amo12345"),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_times_without_fiducials_is_rejected() {
        let config = Config {
            data_source: String::from("exp=amo12345"),
            times: Some(vec![1, 2, 3]),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingEventList)));
    }

    #[test]
    fn test_mismatched_lists_are_rejected() {
        let config = Config {
            data_source: String::from("exp=amo12345"),
            times: Some(vec![1, 2, 3]),
            fiducials: Some(vec![1, 2]),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MismatchedEventLists(3, 2))
        ));
    }

    #[test]
    fn test_extraction_requires_experiment_source() {
        let config = Config {
            data_source: String::from("shmem=psana.0:stop=no"),
            times: Some(vec![1]),
            fiducials: Some(vec![1]),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotIndexable(_))));
    }

    #[test]
    fn test_indexing_on_shared_memory_is_rejected() {
        let config = Config {
            data_source: String::from("shmem=psana.0:stop=no"),
            indexing: true,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotIndexable(_))));
    }

    #[test]
    fn test_worker_assignment_is_checked() {
        let config = Config {
            data_source: String::from("exp=amo12345"),
            n_workers: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerCount(0))
        ));

        let config = Config {
            data_source: String::from("exp=amo12345"),
            worker_rank: 4,
            n_workers: 4,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerRank(4, 4))
        ));
    }

    #[test]
    fn test_resolved_source_appends_run_and_index() {
        let config = Config {
            data_source: String::from("exp=amo12345"),
            run_number: Some(96),
            indexing: true,
            ..Config::default()
        };
        assert_eq!(config.resolved_source(), "exp=amo12345:run=96:idx");

        let config = Config {
            data_source: String::from("exp=amo12345:idx"),
            times: Some(vec![1]),
            fiducials: Some(vec![1]),
            ..Config::default()
        };
        assert_eq!(config.resolved_source(), "exp=amo12345:idx");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config {
            data_source: String::from("exp=cxi78913"),
            run_number: Some(12),
            indexing: true,
            index_offset: Some(100),
            n_frames: Some(5000),
            worker_rank: 2,
            n_workers: 8,
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.data_source, config.data_source);
        assert_eq!(back.run_number, config.run_number);
        assert_eq!(back.index_offset, config.index_offset);
        assert_eq!(back.n_workers, config.n_workers);
    }
}
