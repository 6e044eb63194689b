use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Installation-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Push cropped images through the vibrance lookup table
    pub vibrance_bump: bool,
    /// Crops above this resolution are downsampled
    pub max_dpi: u32,
    /// Paper size for new jobs
    pub default_page_size: PaperSize,
    /// Treat crops without a source image as user-supplied precropped
    /// images and rebuild a source for them instead of deleting them
    pub enable_uncrop: bool,
    /// `.cube` file used for the vibrance bump
    pub vibrance_cube: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vibrance_bump: false,
            max_dpi: 1200,
            default_page_size: PaperSize::Letter,
            enable_uncrop: true,
            vibrance_cube: PathBuf::from("vibrance.CUBE"),
        }
    }
}

impl Config {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let bytes = tokio::fs::read(path).await?;
        let config: Config = serde_json::from_slice(&bytes)
            .map_err(|e| ProxyError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save settings to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProxyError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.max_dpi == 0 {
            return Err(ProxyError::Config(
                "Maximum DPI must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
