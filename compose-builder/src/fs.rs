use std::{
	fs::{File, create_dir_all, read_to_string},
	io::Write,
	path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::BuildError;

pub fn read_text(path: &Path) -> Result<String, BuildError> {
	read_to_string(path).map_err(|e| BuildError::ReadError {
		path: path.to_path_buf(),
		source: e,
	})
}

pub fn read_file(path: &Path) -> Result<File, BuildError> {
	File::open(path).map_err(|e| BuildError::ReadError {
		path: path.to_path_buf(),
		source: e,
	})
}

/// Writes the content to the file, creating its parent directories when needed.
pub fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		create_dir_all(parent).map_err(|e| BuildError::WriteError {
			path: parent.to_path_buf(),
			source: e,
		})?;
	}

	let mut file = File::create(path).map_err(|e| BuildError::WriteError {
		path: path.to_path_buf(),
		source: e,
	})?;

	file
		.write_all(content.as_bytes())
		.map_err(|e| BuildError::WriteError {
			path: path.to_path_buf(),
			source: e,
		})
}

pub fn deserialize_toml<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
	let contents = read_text(path)?;

	toml::from_str(&contents).map_err(|e| BuildError::DeserializationError {
		file: path.to_path_buf(),
		error: e.to_string(),
	})
}

pub fn deserialize_json<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
	let file = read_file(path)?;

	serde_json::from_reader(file).map_err(|e| BuildError::DeserializationError {
		file: path.to_path_buf(),
		error: e.to_string(),
	})
}

pub fn deserialize_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
	let file = read_file(path)?;

	serde_yaml_ng::from_reader(file).map_err(|e| BuildError::DeserializationError {
		file: path.to_path_buf(),
		error: e.to_string(),
	})
}

/// Reads a yaml, toml or json file, picking the format from the extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
	let extension = path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or_default();

	match extension {
		"yaml" | "yml" => deserialize_yaml(path),
		"toml" => deserialize_toml(path),
		"json" => deserialize_json(path),
		_ => Err(BuildError::UnsupportedExtension {
			path: path.to_path_buf(),
		}),
	}
}

/// Writes the item in the format matching the extension of the path.
pub fn serialize_file<T: Serialize>(item: &T, path: &Path) -> Result<(), BuildError> {
	let extension = path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or_default();

	let to_error = |error: String| BuildError::SerializationError {
		file: path.to_path_buf(),
		error,
	};

	let content = match extension {
		"yaml" | "yml" => serde_yaml_ng::to_string(item).map_err(|e| to_error(e.to_string()))?,
		"toml" => toml::to_string_pretty(item).map_err(|e| to_error(e.to_string()))?,
		"json" => serde_json::to_string_pretty(item).map_err(|e| to_error(e.to_string()))?,
		_ => {
			return Err(BuildError::UnsupportedExtension {
				path: path.to_path_buf(),
			});
		}
	};

	write_file(path, &content)
}
