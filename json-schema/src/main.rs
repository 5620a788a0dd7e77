use std::{
	fs::{File, create_dir_all, read_to_string},
	path::{Path, PathBuf},
};

use clap::Parser;
use compose_builder::{Project, Settings};
use regex::Regex;
use schemars::{Schema, schema_for};

/// Writes the JSON schemas of the project and settings files.
#[derive(Debug, Parser)]
pub(crate) struct SchemaCmd {
	/// The version of the schemas, like 0.1.0. Only `latest` is updated when it starts with `v`.
	pub(crate) version: String,
}

fn get_version(v: &str) -> Result<(usize, usize, usize), Box<dyn std::error::Error>> {
	let version_regex = Regex::new(r"[v]?(\d+)\.(\d+)\.(\d+)\w*")?;

	let captures = version_regex
		.captures(v)
		.ok_or_else(|| format!("Invalid version `{v}`"))?;

	let major = captures[1].parse::<usize>()?;
	let minor = captures[2].parse::<usize>()?;
	let patch = captures[3].parse::<usize>()?;

	Ok((major, minor, patch))
}

fn write_schema(
	dir: &Path,
	name: &str,
	schema: &Schema,
	version: &str,
) -> Result<(), Box<dyn std::error::Error>> {
	let schemas_dir = dir.join(name);

	create_dir_all(&schemas_dir)?;

	let latest_schema_file = schemas_dir.join("latest.json");

	if latest_schema_file.is_file() {
		let schema_str: String = serde_json::to_string_pretty(schema)?;
		let latest_schema_content = read_to_string(&latest_schema_file)?;

		if latest_schema_content == schema_str {
			return Ok(());
		}
	}

	let latest = File::create(latest_schema_file)?;
	serde_json::to_writer_pretty(&latest, schema)?;

	if !version.starts_with('v') {
		let (major, minor, _) = get_version(version)?;

		let minor_dir = schemas_dir.join(format!("v{major}.{minor}"));

		create_dir_all(&minor_dir)?;

		let versioned = File::create(minor_dir.join(format!("v{version}.json")))?;
		serde_json::to_writer_pretty(&versioned, schema)?;
	}

	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let schemas_dir = PathBuf::from("schemas");
	let version = SchemaCmd::parse().version;

	write_schema(&schemas_dir, "project", &schema_for!(Project), &version)?;
	write_schema(&schemas_dir, "settings", &schema_for!(Settings), &version)?;

	Ok(())
}
