#[cfg(test)]
mod cli_tests;

use std::{
	env::current_dir,
	path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use Commands::*;

use crate::{
	convert::{Conversion, convert},
	errors::BuildError,
	fs::{deserialize_file, read_text, serialize_file, write_file},
	project::Project,
	serialize::serialize,
	settings::Settings,
	validate::{reformat, validate_and_reformat},
};

#[derive(Clone, Debug, Parser)]
#[command(name = "compose-builder", version, about, long_about = None)]
pub struct Cli {
	#[command(flatten)]
	pub settings: SettingsOverrides,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct SettingsOverrides {
	/// Sets a custom settings file. Defaults to compose-builder.{yaml,yml,toml,json} in the working directory.
	#[arg(short, long, value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,

	/// Ignores any settings file
	#[arg(long, global = true, conflicts_with = "config")]
	pub ignore_config: bool,

	/// Do not print the warnings about incomplete VPN settings
	#[arg(long, global = true)]
	pub no_vpn_warnings: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
	/// Generates a docker-compose file from a project file
	Generate {
		/// The project file (yaml, toml or json)
		project: PathBuf,

		/// The output file. Defaults to stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Validates a project file and prints its canonical compose output
	Validate {
		/// The project file (yaml, toml or json)
		project: PathBuf,
	},

	/// Parses a compose file and writes it back in canonical form
	Reformat {
		/// The compose file
		yaml: PathBuf,

		/// The output file. Defaults to stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Converts a project into another format
	Convert {
		/// The output format
		#[arg(value_enum)]
		kind: Conversion,

		/// The project file (yaml, toml or json)
		project: PathBuf,

		/// Only convert this service. Applies to docker-run and systemd
		#[arg(short, long)]
		service: Option<String>,

		/// The output file. Defaults to stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Creates a project file from an existing compose file
	Import {
		/// The compose file
		compose: PathBuf,

		/// The project file to create, in the format of its extension. Defaults to yaml on stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Prints the marketplace urls, for the index or for a single template
	Marketplace {
		/// The id of the template
		template: Option<String>,
	},
}

fn get_settings(overrides: &SettingsOverrides) -> Result<Settings, BuildError> {
	let mut settings = if let Some(path) = &overrides.config {
		Settings::from_file(path)?
	} else if !overrides.ignore_config {
		let cwd = current_dir().map_err(|e| BuildError::ReadError {
			path: PathBuf::from("."),
			source: e,
		})?;

		Settings::discover(&cwd)?
	} else {
		Settings::default()
	};

	if overrides.no_vpn_warnings {
		settings.output.emit_vpn_warnings = false;
	}

	Ok(settings)
}

fn load_project(path: &Path, settings: &Settings) -> Result<Project, BuildError> {
	let project: Project = deserialize_file(path)?;

	debug!(
		"Loaded a project with {} services from `{}`",
		project.services.len(),
		path.display()
	);

	if settings.output.emit_vpn_warnings {
		for warning in project.vpn.warnings() {
			warn!("{warning}");
		}
	}

	Ok(project)
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), BuildError> {
	match output {
		Some(path) => write_file(path, content),
		None => {
			print!("{content}");
			Ok(())
		}
	}
}

pub fn main_entrypoint() -> Result<(), BuildError> {
	execute_cli(Cli::parse())
}

pub fn execute_cli(cli: Cli) -> Result<(), BuildError> {
	let settings = get_settings(&cli.settings)?;

	match cli.command {
		Generate { project, output } => {
			let project = load_project(&project, &settings)?;

			emit(&serialize(&project), output.as_deref())?;
		}

		Validate { project } => {
			let project = load_project(&project, &settings)?;

			print!("{}", validate_and_reformat(&project)?);
		}

		Reformat { yaml, output } => {
			let text = read_text(&yaml)?;

			emit(&reformat(&text)?, output.as_deref())?;
		}

		Convert {
			kind,
			project,
			service,
			output,
		} => {
			let project = load_project(&project, &settings)?;

			let mut converted = convert(kind, &project, service.as_deref());

			if !converted.ends_with('\n') {
				converted.push('\n');
			}

			emit(&converted, output.as_deref())?;
		}

		Import { compose, output } => {
			let text = read_text(&compose)?;

			let mut project = Project::default();
			let summary = project.import_template(&text)?;

			eprintln!(
				"Imported {} services, {} networks and {} volumes",
				summary.services, summary.networks, summary.volumes
			);

			match output {
				Some(path) => serialize_file(&project, &path)?,
				None => {
					let content =
						serde_yaml_ng::to_string(&project).map_err(|e| BuildError::SerializationError {
							file: PathBuf::from("stdout"),
							error: e.to_string(),
						})?;

					print!("{content}");
				}
			}
		}

		Marketplace { template } => {
			let marketplace = &settings.marketplace;

			match template {
				Some(id) => println!("{}", marketplace.compose_url(&id)),
				None => println!("{}", marketplace.index_url()),
			}
		}
	}

	Ok(())
}
