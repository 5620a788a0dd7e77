use std::{io, path::PathBuf};

use thiserror::Error;

/// The kinds of errors that can occur during operations.
#[derive(Debug, Error)]
pub enum BuildError {
	// I/O errors
	#[error("Failed to create or write to the file `{path}`: {source}")]
	WriteError { path: PathBuf, source: io::Error },

	#[error("Could not read the contents of `{path}`: {source}")]
	ReadError { path: PathBuf, source: io::Error },

	// Invalid input
	#[error("{0}")]
	Parse(String),

	#[error("{}", .0.join("\n"))]
	Validation(Vec<String>),

	#[error("Invalid docker-compose.yml in template")]
	InvalidTemplate,

	#[error("Template `{0}` not found")]
	TemplateNotFound(String),

	#[error("Failed to fetch templates: {0}")]
	Fetch(String),

	#[error("Unsupported file extension for `{path}`. Allowed extensions are: yaml, yml, toml, json")]
	UnsupportedExtension { path: PathBuf },

	// Serde errors
	#[error("Error while serializing the content for `{file:?}`: {error}")]
	SerializationError { file: PathBuf, error: String },

	#[error("Error while deserializing the contents of `{file:?}`: {error}")]
	DeserializationError { file: PathBuf, error: String },
}
