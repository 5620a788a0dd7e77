//! One-way conversions of a project, or of its compose YAML, into other formats.

mod docker_run;
mod env_file;
mod komodo;
mod redact;
mod systemd;

use clap::ValueEnum;
pub use docker_run::to_docker_run;
pub use env_file::generate_env_file;
pub use komodo::generate_komodo_toml;
pub use redact::{REDACTED, redact};
use serde::{Deserialize, Serialize};
pub use systemd::to_systemd;
use tracing::debug;

use crate::{model::ServiceConfig, project::Project, serialize::serialize};

/// The output formats of [`convert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Conversion {
	/// A `docker run` command per service.
	DockerRun,
	/// A systemd unit per service.
	Systemd,
	/// A `.env` file with the environment of every service.
	Env,
	/// The compose YAML with its secrets masked.
	Redact,
	/// A Komodo TOML configuration.
	Komodo,
}

fn per_service(project: &Project, service: Option<&str>, render: fn(&ServiceConfig) -> String) -> String {
	match service {
		Some(name) => project
			.service(name)
			.map(render)
			.unwrap_or_default(),
		None => project
			.named_services()
			.map(render)
			.collect::<Vec<_>>()
			.join("\n\n"),
	}
}

/// Converts the project into the chosen format.
///
/// The per-service formats render only the named service when one is given, otherwise every
/// service separated by a blank line. The other formats always cover the whole project.
pub fn convert(kind: Conversion, project: &Project, service: Option<&str>) -> String {
	debug!("Converting the project to {kind:?}");

	match kind {
		Conversion::DockerRun => per_service(project, service, to_docker_run),
		Conversion::Systemd => per_service(project, service, to_systemd),
		Conversion::Env => generate_env_file(&project.services, &project.vpn),
		Conversion::Redact => redact(&serialize(project)),
		Conversion::Komodo => generate_komodo_toml(&serialize(project)),
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;

	fn project() -> Project {
		Project {
			services: vec![
				ServiceConfig::new("web", "nginx"),
				ServiceConfig::default(),
				ServiceConfig::new("db", "postgres"),
			],
			..Default::default()
		}
	}

	#[test]
	fn all_services_are_joined() {
		assert_eq!(
			convert(Conversion::DockerRun, &project(), None),
			"docker run --name web nginx\n\ndocker run --name db postgres"
		);
	}

	#[test]
	fn selected_service() {
		assert_eq!(
			convert(Conversion::DockerRun, &project(), Some("db")),
			"docker run --name db postgres"
		);
		assert_eq!(convert(Conversion::Systemd, &project(), Some("missing")), "");
	}

	#[test]
	fn komodo_reads_the_serialized_project() {
		let output = convert(Conversion::Komodo, &project(), None);

		assert!(output.contains("[web]"));
		assert!(output.contains("[db]"));
	}
}
