#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
	errors::BuildError,
	import::{ParsedTemplate, parse_compose_template},
	model::{NetworkConfig, ServiceConfig, VolumeConfig},
	vpn::VpnConfig,
};

/// A compose project: the services, networks and volumes to write out, plus the VPN sidecar.
///
/// This is also the format of project files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Project {
	pub services: Vec<ServiceConfig>,
	pub networks: Vec<NetworkConfig>,
	pub volumes: Vec<VolumeConfig>,
	pub vpn: VpnConfig,
}

impl Default for Project {
	fn default() -> Self {
		Self {
			services: vec![ServiceConfig::default()],
			networks: vec![],
			volumes: vec![],
			vpn: VpnConfig::default(),
		}
	}
}

/// What an import added to a project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
	pub services: usize,
	pub networks: usize,
	pub volumes: usize,
}

impl Project {
	pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
		self.services.iter().find(|s| s.name == name)
	}

	/// The services that end up in the compose file.
	pub fn named_services(&self) -> impl Iterator<Item = &ServiceConfig> {
		self.services.iter().filter(|s| s.is_named())
	}

	pub fn add_service(&mut self, service: ServiceConfig) {
		self.services.push(service);
	}

	/// Removes a service and every reference to it.
	///
	/// A project always keeps at least one service, so removing the last one leaves an empty
	/// service in its place.
	pub fn remove_service(&mut self, name: &str) -> Option<ServiceConfig> {
		let idx = self.services.iter().position(|s| s.name == name)?;
		let removed = self.services.remove(idx);

		if !removed.name.is_empty() {
			for service in &mut self.services {
				service.depends_on.retain(|dep| dep != name);
			}

			self.vpn.services_using_vpn.retain(|s| s != name);
		}

		if self.services.is_empty() {
			self.services.push(ServiceConfig::default());
		}

		Some(removed)
	}

	/// Adds a network unless one with the same name exists. Returns whether it was added.
	pub fn add_network(&mut self, network: NetworkConfig) -> bool {
		if self.networks.iter().any(|n| n.name == network.name) {
			return false;
		}

		self.networks.push(network);
		true
	}

	/// Adds the networks whose names are not taken yet. Returns how many were added.
	pub fn add_networks(&mut self, networks: impl IntoIterator<Item = NetworkConfig>) -> usize {
		let mut added = 0;

		for network in networks {
			if self.add_network(network) {
				added += 1;
			}
		}

		added
	}

	/// Removes a network, along with its mentions in the services and in the VPN settings.
	pub fn remove_network(&mut self, name: &str) -> Option<NetworkConfig> {
		let idx = self.networks.iter().position(|n| n.name == name)?;
		let removed = self.networks.remove(idx);

		for service in &mut self.services {
			service.networks.retain(|n| n != name);
		}

		self.vpn.networks.retain(|n| n != name);

		debug!("Removed the network `{name}`");

		Some(removed)
	}

	/// Adds a volume unless one with the same name exists. Returns whether it was added.
	pub fn add_volume(&mut self, volume: VolumeConfig) -> bool {
		if self.volumes.iter().any(|v| v.name == volume.name) {
			return false;
		}

		self.volumes.push(volume);
		true
	}

	/// Adds the volumes whose names are not taken yet. Returns how many were added.
	pub fn add_volumes(&mut self, volumes: impl IntoIterator<Item = VolumeConfig>) -> usize {
		let mut added = 0;

		for volume in volumes {
			if self.add_volume(volume) {
				added += 1;
			}
		}

		added
	}

	/// Removes a volume, along with the service mounts that use it.
	pub fn remove_volume(&mut self, name: &str) -> Option<VolumeConfig> {
		let idx = self.volumes.iter().position(|v| v.name == name)?;
		let removed = self.volumes.remove(idx);

		for service in &mut self.services {
			service.volumes.retain(|mount| mount.host != name);
		}

		debug!("Removed the volume `{name}`");

		Some(removed)
	}

	/// Adds the content of a parsed compose file.
	///
	/// Unnamed services are dropped first, so that a fresh project does not keep its placeholder.
	pub fn merge_template(&mut self, template: ParsedTemplate) -> ImportSummary {
		self.services.retain(ServiceConfig::is_named);

		let summary = ImportSummary {
			services: template.services.len(),
			networks: self.add_networks(template.networks),
			volumes: self.add_volumes(template.volumes),
		};

		self.services.extend(template.services);

		if self.services.is_empty() {
			self.services.push(ServiceConfig::default());
		}

		summary
	}

	/// Parses a compose file and adds its content to the project.
	///
	/// The project is left untouched if the file cannot be parsed.
	pub fn import_template(&mut self, text: &str) -> Result<ImportSummary, BuildError> {
		let template = parse_compose_template(text)?;

		Ok(self.merge_template(template))
	}
}
