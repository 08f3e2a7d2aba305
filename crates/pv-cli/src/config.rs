//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pv_core::Layout;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Distance between row centers.
    pub row_height: f32,

    /// Height of a task triangle.
    pub bar_height: f32,

    /// Extra vertical space after each process.
    pub process_gap: f32,

    /// Width of the name column in the summary.
    pub name_width: usize,

    /// Width of the numeric columns in the summary.
    pub value_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        let layout = Layout::default();
        Self {
            row_height: layout.row_height,
            bar_height: layout.bar_height,
            process_gap: layout.process_gap,
            name_width: 40,
            value_width: 10,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PV_*)
        figment = figment.merge(Env::prefixed("PV_"));

        figment.extract()
    }

    /// The row layout described by this configuration.
    pub const fn layout(&self) -> Layout {
        Layout {
            row_height: self.row_height,
            bar_height: self.bar_height,
            process_gap: self.process_gap,
        }
    }
}

/// Returns the platform-specific config directory for pv.
///
/// On Linux: `~/.config/pv`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pv"))
}
