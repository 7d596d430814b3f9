//! Export settings management
//!
//! Settings live in `settings.json` inside a settings directory. A missing
//! file means defaults; a file that fails to parse is logged and replaced
//! by defaults rather than aborting the export.

use crate::delimited::CsvOptions;
use crate::error::{ExportError, Result};
use crate::pdf::PdfExportOptions;
use crate::raster::{RasterOptions, RasterSnapshotRenderer, MAX_DIMENSION};
use report_model::FormatOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// All export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Shown as "Generated ... by {author}" and in the PDF info dictionary
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub pdf: PdfExportOptions,
    #[serde(default)]
    pub csv: CsvOptions,
    #[serde(default)]
    pub raster: RasterSettings,
    #[serde(default)]
    pub formatting: FormattingSettings,
    #[serde(default)]
    pub download: DownloadSettings,
    /// How long a finished job stays observable
    #[serde(default = "default_post_completion_window_ms")]
    pub post_completion_window_ms: u64,
}

fn default_post_completion_window_ms() -> u64 {
    3000
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            author: String::new(),
            pdf: PdfExportOptions::default(),
            csv: CsvOptions::default(),
            raster: RasterSettings::default(),
            formatting: FormattingSettings::default(),
            download: DownloadSettings::default(),
            post_completion_window_ms: default_post_completion_window_ms(),
        }
    }
}

impl ExportSettings {
    pub fn post_completion_window(&self) -> Duration {
        Duration::from_millis(self.post_completion_window_ms)
    }
}

/// Snapshot image settings
///
/// `row_cap` has no default; PNG exports fail until it is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RasterSettings {
    #[serde(default = "default_raster_width")]
    pub width: u32,
    #[serde(default = "default_raster_scale")]
    pub scale: u32,
    #[serde(default)]
    pub row_cap: Option<usize>,
}

fn default_raster_width() -> u32 {
    1400
}

fn default_raster_scale() -> u32 {
    2
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: default_raster_width(),
            scale: default_raster_scale(),
            row_cap: None,
        }
    }
}

impl RasterSettings {
    /// Renderer options, or a configuration error when no usable cap is set
    ///
    /// A cap is unusable when the snapshot it implies would exceed
    /// [`MAX_DIMENSION`] pixels in either direction.
    pub fn to_options(&self) -> Result<RasterOptions> {
        let options = match self.row_cap {
            None => {
                return Err(ExportError::Config(
                    "raster.rowCap must be set for snapshot exports".to_string(),
                ))
            }
            Some(0) => return Err(ExportError::Config("raster.rowCap must be at least 1".to_string())),
            Some(cap) => RasterOptions::new(cap)
                .with_width(self.width)
                .with_scale(self.scale),
        };

        let geometry = RasterSnapshotRenderer::new(options.clone()).geometry();
        if geometry.width > MAX_DIMENSION || geometry.height > MAX_DIMENSION {
            return Err(ExportError::Config(format!(
                "raster.rowCap {} gives a {}x{} snapshot, larger than {} pixels",
                options.row_cap, geometry.width, geometry.height, MAX_DIMENSION
            )));
        }
        Ok(options)
    }
}

/// Cell and timestamp formatting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormattingSettings {
    #[serde(flatten)]
    pub format: FormatOptions,
    /// chrono pattern for the "Generated on" timestamp
    #[serde(default = "default_timestamp_pattern")]
    pub timestamp_pattern: String,
}

fn default_timestamp_pattern() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            timestamp_pattern: default_timestamp_pattern(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSettings {
    /// Directory exported files are saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Loads and saves [`ExportSettings`]
pub struct SettingsManager {
    settings_path: PathBuf,
    current: ExportSettings,
}

impl SettingsManager {
    /// Create a manager for `settings.json` inside `settings_dir`
    pub fn new(settings_dir: PathBuf) -> Self {
        Self {
            settings_path: settings_dir.join("settings.json"),
            current: ExportSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    pub async fn load(&mut self) -> Result<&ExportSettings> {
        self.current = if self.settings_path.exists() {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            parse_or_default(&content)
        } else {
            ExportSettings::default()
        };
        Ok(&self.current)
    }

    /// Load settings synchronously (for use during startup)
    pub fn load_sync(&mut self) -> Result<&ExportSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            parse_or_default(&content)
        } else {
            ExportSettings::default()
        };
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &ExportSettings {
        &self.current
    }

    /// Replace settings and save
    pub fn update_sync(&mut self, settings: ExportSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Reset to defaults and save
    pub fn reset_sync(&mut self) -> Result<&ExportSettings> {
        self.current = ExportSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

fn parse_or_default(content: &str) -> ExportSettings {
    match serde_json::from_str::<ExportSettings>(content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to parse settings file, using defaults: {}", e);
            ExportSettings::default()
        }
    }
}
