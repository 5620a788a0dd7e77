use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
	errors::BuildError, model::ServiceConfig, project::Project, serialize::serialize,
};

static SERVICE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9_-]+$").expect("Failed to compile the service name regex")
});

static ENV_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to compile the env key regex")
});

static CPUS_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)$").expect("Failed to compile the cpus regex"));

static MEMORY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\d+[kmgKMG]?[bB]?$").expect("Failed to compile the memory regex")
});

fn is_valid_port(port: &str) -> bool {
	// Ranges like 8000-8010 are allowed
	port.split('-').all(|part| {
		part
			.trim()
			.parse::<u32>()
			.is_ok_and(|p| (1..=65535).contains(&p))
	})
}

fn check_port(errors: &mut Vec<String>, label: &str, kind: &str, port: &str) {
	if !port.is_empty() && !is_valid_port(port) {
		errors.push(format!(
			"{label}: {kind} port `{port}` must be between 1 and 65535"
		));
	}
}

/// Checks the services for mistakes that would make the compose file unusable.
///
/// Returns one message per problem. An empty list means the services are valid.
pub fn validate(services: &[ServiceConfig]) -> Vec<String> {
	let mut errors: Vec<String> = Vec::new();

	for (idx, service) in services.iter().enumerate() {
		let name = service.name.trim();

		let label = if name.is_empty() {
			errors.push(format!("Service #{}: name is required", idx + 1));
			format!("Service #{}", idx + 1)
		} else {
			if !SERVICE_NAME_REGEX.is_match(name) {
				errors.push(format!(
					"Service `{name}`: name can only contain letters, numbers, underscores and hyphens"
				));
			}
			format!("Service `{name}`")
		};

		if service.image.trim().is_empty() {
			errors.push(format!("{label}: image is required"));
		}

		for port in &service.ports {
			// The host side may start with an IP address
			let host = port
				.host
				.rsplit_once(':')
				.map_or(port.host.as_str(), |(_, p)| p);

			check_port(&mut errors, &label, "host", host.trim());
			check_port(&mut errors, &label, "container", port.container.trim());
		}

		for var in &service.environment {
			if !var.key.is_empty() && !ENV_KEY_REGEX.is_match(&var.key) {
				errors.push(format!(
					"{label}: environment variable `{}` must start with a letter or underscore and contain only letters, numbers and underscores",
					var.key
				));
			}
		}

		let resources = &service.deploy.resources;

		for (kind, limits) in [
			("limit", &resources.limits),
			("reservation", &resources.reservations),
		] {
			let cpus = limits.cpus.trim();
			if !cpus.is_empty() && !CPUS_REGEX.is_match(cpus) {
				errors.push(format!(
					"{label}: CPU {kind} `{cpus}` must be a non-negative number"
				));
			}

			let memory = limits.memory.trim();
			if !memory.is_empty() && !MEMORY_REGEX.is_match(memory) {
				errors.push(format!(
					"{label}: memory {kind} `{memory}` must be a number with an optional unit, like 512m or 1g"
				));
			}
		}
	}

	errors
}

/// Parses a YAML document and writes it back out in canonical form.
///
/// Parser errors are returned with the parser's own message.
pub fn reformat(yaml: &str) -> Result<String, BuildError> {
	let value: serde_yaml_ng::Value =
		serde_yaml_ng::from_str(yaml).map_err(|e| BuildError::Parse(e.to_string()))?;

	serde_yaml_ng::to_string(&value).map_err(|e| BuildError::Parse(e.to_string()))
}

/// Validates the services of the project, then serializes and reformats it.
pub fn validate_and_reformat(project: &Project) -> Result<String, BuildError> {
	let errors = validate(&project.services);

	if !errors.is_empty() {
		debug!("Validation found {} errors", errors.len());
		return Err(BuildError::Validation(errors));
	}

	reformat(&serialize(project))
}
