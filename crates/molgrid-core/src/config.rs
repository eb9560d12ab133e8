use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Parameters for random coordinate augmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationConfig {
    /// Upper bound on the length of the random translation.
    pub random_translation: f64,
    /// Whether to apply a uniformly random rotation.
    pub random_rotation: bool,
    /// Reseeds the process-wide engine before sampling when set.
    pub seed: Option<u64>,
    /// Rotation center; the centroid of the coordinates when unset.
    pub center: Option<Point3<f64>>,
}

#[derive(Default)]
pub struct AugmentationConfigBuilder {
    random_translation: Option<f64>,
    random_rotation: Option<bool>,
    seed: Option<u64>,
    center: Option<Point3<f64>>,
}

impl AugmentationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn random_translation(mut self, magnitude: f64) -> Self {
        self.random_translation = Some(magnitude);
        self
    }
    pub fn random_rotation(mut self, enabled: bool) -> Self {
        self.random_rotation = Some(enabled);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn center(mut self, center: Point3<f64>) -> Self {
        self.center = Some(center);
        self
    }

    pub fn build(self) -> Result<AugmentationConfig, ConfigError> {
        let random_translation = self
            .random_translation
            .ok_or(ConfigError::MissingParameter("random_translation"))?;
        if !random_translation.is_finite() || random_translation < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "random_translation",
                reason: format!("expected a finite non-negative length, got {random_translation}"),
            });
        }
        if let Some(center) = self.center {
            if center.coords.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: "center",
                    reason: format!("coordinates must be finite, got {center}"),
                });
            }
        }
        Ok(AugmentationConfig {
            random_translation,
            random_rotation: self
                .random_rotation
                .ok_or(ConfigError::MissingParameter("random_rotation"))?,
            seed: self.seed,
            center: self.center,
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct AugmentationFile {
    #[serde(default)]
    random_translation: f64,
    #[serde(default)]
    random_rotation: bool,
    seed: Option<u64>,
    center: Option<[f64; 3]>,
}

impl From<AugmentationFile> for AugmentationConfigBuilder {
    fn from(file: AugmentationFile) -> Self {
        let mut builder = AugmentationConfigBuilder::new()
            .random_translation(file.random_translation)
            .random_rotation(file.random_rotation);
        if let Some(seed) = file.seed {
            builder = builder.seed(seed);
        }
        if let Some([x, y, z]) = file.center {
            builder = builder.center(Point3::new(x, y, z));
        }
        builder
    }
}

impl AugmentationConfig {
    pub fn builder() -> AugmentationConfigBuilder {
        AugmentationConfigBuilder::new()
    }

    /// Reads a TOML file such as:
    ///
    /// ```toml
    /// random-translation = 2.0
    /// random-rotation = true
    /// seed = 42
    /// center = [0.0, 0.0, 1.0]
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config = Self::parse(&content, &path.to_string_lossy())?;
        debug!("Loaded augmentation config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: AugmentationFile = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        AugmentationConfigBuilder::from(file).build()
    }
}
