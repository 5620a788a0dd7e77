use std::path::{Path, PathBuf};

use chrono::TimeDelta;
#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{errors::BuildError, fs::deserialize_file};

/// The names of the settings files that are picked up from the working directory.
pub const SETTINGS_FILES: [&str; 4] = [
	"compose-builder.yaml",
	"compose-builder.yml",
	"compose-builder.toml",
	"compose-builder.json",
];

/// Settings for the compose builder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Settings {
	/// Where templates are downloaded from.
	pub marketplace: MarketplaceSettings,
	pub output: OutputSettings,
}

/// The location of the template marketplace, a GitHub repository served as raw files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct MarketplaceSettings {
	pub raw_base: String,
	pub owner: String,
	pub repo: String,
	pub branch: String,
	/// How long the template list is considered fresh.
	pub cache_ttl_minutes: u32,
}

impl Default for MarketplaceSettings {
	fn default() -> Self {
		Self {
			raw_base: "https://raw.githubusercontent.com".to_string(),
			owner: "hhftechnology".to_string(),
			repo: "Marketplace".to_string(),
			branch: "main".to_string(),
			cache_ttl_minutes: 60,
		}
	}
}

impl MarketplaceSettings {
	fn base_url(&self) -> String {
		format!(
			"{}/{}/{}/{}",
			self.raw_base.trim_end_matches('/'),
			self.owner,
			self.repo,
			self.branch
		)
	}

	/// The url of the template index.
	pub fn index_url(&self) -> String {
		format!("{}/meta.json", self.base_url())
	}

	/// The url of a file that belongs to a template, such as its logo.
	pub fn asset_url(&self, template_id: &str, file: &str) -> String {
		format!("{}/compose-files/{template_id}/{file}", self.base_url())
	}

	pub fn compose_url(&self, template_id: &str) -> String {
		self.asset_url(template_id, "docker-compose.yml")
	}

	pub fn cache_ttl(&self) -> TimeDelta {
		TimeDelta::minutes(i64::from(self.cache_ttl_minutes))
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct OutputSettings {
	/// Print the warnings about incomplete VPN settings when generating a compose file.
	pub emit_vpn_warnings: bool,
}

impl Default for OutputSettings {
	fn default() -> Self {
		Self {
			emit_vpn_warnings: true,
		}
	}
}

impl Settings {
	/// Reads the settings from a yaml, toml or json file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
		let path = path.as_ref();

		debug!("Loading the settings from `{}`", path.display());

		deserialize_file(path)
	}

	/// Looks for a settings file in the directory.
	pub fn find_in(dir: &Path) -> Option<PathBuf> {
		SETTINGS_FILES
			.iter()
			.map(|file| dir.join(file))
			.find(|path| path.is_file())
	}

	/// Loads the settings from the file in the directory, or returns the defaults if there is none.
	pub fn discover(dir: &Path) -> Result<Self, BuildError> {
		match Self::find_in(dir) {
			Some(path) => Self::from_file(path),
			None => Ok(Self::default()),
		}
	}
}
