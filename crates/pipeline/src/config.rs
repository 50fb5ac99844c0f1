//! Pipeline Configuration

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// All tunable parameters of a pipeline run, with the standard training
/// recipe as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Training CSV path
    pub train_csv: PathBuf,
    /// Evaluation CSV path
    pub test_csv: PathBuf,
    /// Gaussian smoothing width, in samples
    pub smoothing_sigma: f64,
    /// Target minority-to-majority ratio after oversampling
    pub oversample_ratio: f64,
    /// Passes over the training set
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// RNG seed; `None` seeds from entropy and the run is not
    /// reproducible
    pub seed: Option<u64>,
    /// Where to write the trained model checkpoint
    pub model_path: PathBuf,
    /// Conv filters per block
    pub filters: [usize; 3],
    /// Conv kernel sizes per block
    pub kernels: [usize; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_csv: PathBuf::from("exoTrain.csv"),
            test_csv: PathBuf::from("exoTest.csv"),
            smoothing_sigma: 7.0,
            oversample_ratio: 0.5,
            epochs: 2,
            batch_size: 10,
            learning_rate: 1e-3,
            seed: None,
            model_path: PathBuf::from("exoplanet-model.json"),
            filters: [16, 32, 16],
            kernels: [8, 5, 3],
        }
    }
}

impl PipelineConfig {
    /// Layer an optional TOML file and `TRANSIT_`-prefixed environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("TRANSIT").try_parsing(true))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run can be built from, before any stage sees
    /// them. File and environment sources are untrusted input.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |reason: String| {
            Err(PipelineError::Config(::config::ConfigError::Message(reason)))
        };
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma <= 0.0 {
            return fail(format!(
                "smoothing_sigma must be a positive finite number, got {}",
                self.smoothing_sigma
            ));
        }
        if !self.oversample_ratio.is_finite()
            || self.oversample_ratio <= 0.0
            || self.oversample_ratio > 1.0
        {
            return fail(format!(
                "oversample_ratio must be in (0, 1], got {}",
                self.oversample_ratio
            ));
        }
        if self.epochs == 0 {
            return fail("epochs must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return fail("batch_size must be at least 1".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return fail(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            ));
        }
        if self.filters.iter().any(|&f| f == 0) {
            return fail(format!("filters must all be at least 1, got {:?}", self.filters));
        }
        if self.kernels.iter().any(|&k| k == 0) {
            return fail(format!("kernels must all be at least 1, got {:?}", self.kernels));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_training_recipe() {
        let config = PipelineConfig::default();
        assert_eq!(config.smoothing_sigma, 7.0);
        assert_eq!(config.oversample_ratio, 0.5);
        assert_eq!(config.epochs, 2);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.learning_rate, 1e-3);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.epochs, PipelineConfig::default().epochs);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("pipeline-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "epochs = 5\nsmoothing_sigma = 2.5\nseed = 123").unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.epochs, 5);
        assert_eq!(config.smoothing_sigma, 2.5);
        assert_eq!(config.seed, Some(123));
        // Untouched keys keep their defaults
        assert_eq!(config.batch_size, 10);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_zero_kernel_from_file_rejected() {
        let path =
            std::env::temp_dir().join(format!("pipeline-badkernel-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "kernels = [0, 3, 3]").unwrap();

        let err = PipelineConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("kernels"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_nonsense_values_rejected() {
        let mut config = PipelineConfig::default();
        config.smoothing_sigma = -2.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.oversample_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        assert!(PipelineConfig::default().validate().is_ok());
    }
}
