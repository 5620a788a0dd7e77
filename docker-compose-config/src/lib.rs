//! Tolerant representations of the types that make up a Docker Compose file.
//!
//! These types are meant for reading compose files written by third parties. Every field is
//! optional and a field with an unexpected shape is read as absent rather than rejecting the
//! whole document.

mod serde_utils;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
pub use serde_utils::*;

/// Configuration settings for a Docker Compose file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ComposeFile {
	/// The top-level name property is defined by the Compose Specification as the project name to be used if you don't set one explicitly.
	///
	/// See more: https://docs.docker.com/reference/compose-file/version-and-name/#name-top-level-element
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub name: Option<String>,

	/// Defines the services for the Compose application.
	///
	/// A service declared with an empty body (`web:`), or with a body that is not a map, is kept as `None`.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_map")]
	pub services: Option<IndexMap<String, Option<Service>>>,

	/// The named networks for the Compose application.
	///
	/// See more: https://docs.docker.com/reference/compose-file/networks/
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_map")]
	pub networks: Option<IndexMap<String, Option<TopLevelNetwork>>>,

	/// The named volumes for the Compose application.
	///
	/// See more: https://docs.docker.com/reference/compose-file/volumes/
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_map")]
	pub volumes: Option<IndexMap<String, Option<TopLevelVolume>>>,

	/// Defines or references configuration data that is granted to services in your Compose application.
	///
	/// See more: https://docs.docker.com/reference/compose-file/configs/
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub configs: Option<IndexMap<String, Value>>,
}

impl ComposeFile {
	pub fn new() -> Self {
		Self::default()
	}

	/// Iterates over the declared services, skipping the ones without a body.
	pub fn iter_services(&self) -> impl Iterator<Item = (&String, &Service)> {
		self
			.services
			.iter()
			.flatten()
			.filter_map(|(name, service)| service.as_ref().map(|s| (name, s)))
	}
}

/// Defines a service for a Compose application.
///
/// See more: https://docs.docker.com/reference/compose-file/services/
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Service {
	/// Specifies the image to start the container from. See more: https://docs.docker.com/reference/compose-file/services/#image
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub image: Option<String>,

	/// A string that specifies a custom container name, rather than a name generated by default.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#container_name
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub container_name: Option<String>,

	/// Overrides the default command declared by the container image, for example by Dockerfile's CMD.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#command
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub command: Option<StringOrList>,

	/// Defines the policy that the platform applies on container termination.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#restart
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub restart: Option<String>,

	/// Used to define the port mappings between the host machine and the containers.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#ports
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub ports: Option<Vec<Port>>,

	/// Defines the (incoming) port or a range of ports that Compose exposes from the container.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#expose
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub expose: Option<Vec<StringOrNum>>,

	/// Define mount host paths or named volumes that are accessible by service containers.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#volumes
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub volumes: Option<Vec<ServiceVolume>>,

	/// Defines environment variables set in the container. environment can use either an array or a map.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#environment
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub environment: Option<ListOrMap>,

	/// Declares a check that's run to determine whether or not the service containers are "healthy".
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#healthcheck
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub healthcheck: Option<Healthcheck>,

	/// Controls the order of service startup and shutdown.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#depends_on
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub depends_on: Option<DependsOn>,

	/// Declares the default entrypoint for the service container.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#entrypoint
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub entrypoint: Option<StringOrList>,

	/// One or more files that contain environment variables to be passed to the containers.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#env_file
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub env_file: Option<StringOrList>,

	/// Adds hostname mappings to the container network interface configuration (/etc/hosts for Linux).
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#extra_hosts
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub extra_hosts: Option<ExtraHosts>,

	/// Custom DNS servers to set on the container network interface configuration. It can be a single value or a list.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub dns: Option<StringOrList>,

	/// The networks that service containers are attached to.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#networks
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub networks: Option<ServiceNetworks>,

	/// Overrides the user used to run the container process.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub user: Option<StringOrNum>,

	/// Overrides the container's working directory which is specified by the image, for example Dockerfile's WORKDIR.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub working_dir: Option<String>,

	/// Adds metadata to containers. You can use either an array or a map.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#labels
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub labels: Option<ListOrMap>,

	/// Configures the service container to run with elevated privileges.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub privileged: Option<bool>,

	/// Configures the service container to be created with a read-only filesystem.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub read_only: Option<bool>,

	/// Configures a service's container to run with a TTY.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub tty: Option<bool>,

	/// Configures a service's container to run with an allocated stdin.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub stdin_open: Option<bool>,

	/// Runs an init process (PID 1) inside the container that forwards signals and reaps processes.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub init: Option<bool>,

	/// The size of the shared memory (/dev/shm partition on Linux) allowed by the service container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub shm_size: Option<StringOrNum>,

	/// Overrides the default labeling scheme for each container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub security_opt: Option<Vec<String>>,

	/// Sets a service container's network mode.
	///
	/// See more: https://docs.docker.com/reference/compose-file/services/#network_mode
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub network_mode: Option<String>,

	/// Specifies additional container capabilities as strings.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub cap_add: Option<Vec<String>>,

	/// Specifies container capabilities to drop as strings.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub cap_drop: Option<Vec<String>>,

	/// Defines kernel parameters to set in the container. sysctls can use either an array or a map.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub sysctls: Option<ListOrMap>,

	/// Defines a list of device mappings for created containers in the form of HOST_PATH:CONTAINER_PATH[:CGROUP_PERMISSIONS].
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub devices: Option<Vec<String>>,

	/// Mounts a temporary file system inside the container. It can be a single value or a list.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub tmpfs: Option<StringOrList>,

	/// Overrides the default ulimits for a container. It's specified either as an integer for a single limit or as mapping for soft/hard limits.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub ulimits: Option<IndexMap<String, Ulimit>>,

	/// Specifies how long Compose must wait when attempting to stop a container if it doesn't handle SIGTERM before sending SIGKILL.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub stop_grace_period: Option<String>,

	/// Defines the signal that Compose uses to stop the service containers when it receives SIGTERM.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub stop_signal: Option<String>,

	/// A custom host name to use for the service container. It must be a valid RFC 1123 hostname.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub hostname: Option<String>,

	/// Declares a custom domain name to use for the service container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub domainname: Option<String>,

	/// Sets a Mac address for the service container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub mac_address: Option<String>,

	/// Configures the IPC isolation mode set by the service container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub ipc: Option<String>,

	/// Sets the PID mode for container created by Compose.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub pid: Option<String>,

	/// Configures the UTS namespace mode set for the service container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub uts: Option<String>,

	/// Specifies an optional parent cgroup for the container.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub cgroup_parent: Option<String>,

	/// Specifies a service container's isolation technology. Supported values are platform specific.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub isolation: Option<String>,

	/// Specifies the configuration for the deployment and lifecycle of services.
	///
	/// See more: https://docs.docker.com/reference/compose-file/deploy
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub deploy: Option<Deploy>,
}

/// A port mapping, in short (`"8080:80/tcp"`, `80`) or long syntax.
///
/// See more: https://docs.docker.com/reference/compose-file/services/#ports
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Port {
	Short(StringOrNum),
	Long(PortSettings),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PortSettings {
	/// The container port.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<StringOrNum>,

	/// The publicly exposed port. It is defined as a string and can be set as a range using syntax start-end.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub published: Option<StringOrNum>,

	/// The Host IP mapping. If it is not set, it binds to all network interfaces (0.0.0.0).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub host_ip: Option<String>,

	/// The port protocol (tcp or udp). If it is not set, it defaults to tcp.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protocol: Option<String>,

	/// host: For publishing a host port on each node, or ingress for a port to be load balanced.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mode: Option<String>,
}

/// A volume mount, in short (`"data:/var/lib/data:ro"`) or long syntax.
///
/// See more: https://docs.docker.com/reference/compose-file/services/#volumes
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ServiceVolume {
	Simple(String),
	Advanced(ServiceVolumeSettings),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ServiceVolumeSettings {
	/// The mount type. Either volume, bind, tmpfs, image, npipe, or cluster
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub type_: Option<String>,

	/// The source of the mount, a path on the host for a bind mount, or the name of a volume defined in the top-level volumes key. Not applicable for a tmpfs mount.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,

	/// The path in the container where the volume is mounted.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,

	/// Flag to set the volume as read-only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub read_only: Option<bool>,
}

/// Healthcheck settings for a service.
///
/// See more: https://docs.docker.com/reference/compose-file/services/#healthcheck
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Healthcheck {
	/// Defines the command Compose runs to check container health.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub test: Option<StringOrList>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub interval: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub timeout: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub retries: Option<StringOrNum>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub start_period: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub start_interval: Option<String>,

	/// Disables any default health check set by the image.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub disable: Option<bool>,
}

/// The dependencies of a service, either as a list of names or as a map with extra conditions.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DependsOn {
	Simple(Vec<String>),
	Conditional(IndexMap<String, Value>),
}

impl DependsOn {
	pub fn names(&self) -> Vec<String> {
		match self {
			Self::Simple(list) => list.clone(),
			Self::Conditional(map) => map.keys().cloned().collect(),
		}
	}
}

/// The networks of a service, either as a list of names or as a map with per-network settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ServiceNetworks {
	List(Vec<String>),
	Map(IndexMap<String, Option<Value>>),
}

impl ServiceNetworks {
	pub fn names(&self) -> Vec<String> {
		match self {
			Self::List(list) => list.clone(),
			Self::Map(map) => map.keys().cloned().collect(),
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		match self {
			Self::List(list) => list.iter().any(|n| n == name),
			Self::Map(map) => map.contains_key(name),
		}
	}
}

/// Extra host mappings, as `host:ip` strings or as a `host: ip` map.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExtraHosts {
	List(Vec<String>),
	Map(IndexMap<String, String>),
}

impl ExtraHosts {
	/// Returns the mappings in the `host:ip` form.
	pub fn to_entries(&self) -> Vec<String> {
		match self {
			Self::List(list) => list.clone(),
			Self::Map(map) => map
				.iter()
				.map(|(host, ip)| format!("{host}:{ip}"))
				.collect(),
		}
	}
}

/// A single ulimit, or a soft/hard pair.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Ulimit {
	Single(StringOrNum),
	SoftHard {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		soft: Option<StringOrNum>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		hard: Option<StringOrNum>,
	},
}

/// Deployment settings. Only the resource constraints are modeled.
///
/// See more: https://docs.docker.com/reference/compose-file/deploy
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Deploy {
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub resources: Option<Resources>,
}

/// Physical resource constraints for the container to run on the platform.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Resources {
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub limits: Option<ResourceSpec>,

	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub reservations: Option<ResourceSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ResourceSpec {
	/// How much of the available CPU resources, as number of cores, a container can use.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub cpus: Option<SingleValue>,

	/// The amount of memory a container can allocate.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub memory: Option<StringOrNum>,
}

/// Marks a network or volume as externally managed, either with a plain flag or with a name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum External {
	Bool(bool),
	Named {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
	},
}

impl External {
	pub const fn is_external(&self) -> bool {
		match self {
			Self::Bool(b) => *b,
			Self::Named { .. } => true,
		}
	}

	pub fn name(&self) -> Option<&str> {
		match self {
			Self::Bool(_) => None,
			Self::Named { name } => name.as_deref(),
		}
	}
}

/// The named networks for the Compose application.
///
/// See more: https://docs.docker.com/reference/compose-file/networks/
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct TopLevelNetwork {
	/// Specifies which driver should be used for this network. Compose returns an error if the driver is not available on the platform.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub driver: Option<String>,

	/// A list of options as key-value pairs to pass to the driver. These options are driver-dependent.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub driver_opts: Option<IndexMap<String, SingleValue>>,

	/// If attachable is set to true, then standalone containers should be able to attach to this network, in addition to services.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub attachable: Option<bool>,

	/// By default, Compose provides external connectivity to networks. internal, when set to true, lets you create an externally isolated network.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub internal: Option<bool>,

	/// Enables IPv6 address allocation on the network.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub enable_ipv6: Option<bool>,

	/// If set to true, it specifies that this network’s lifecycle is maintained outside of that of the application.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub external: Option<External>,

	/// Sets a custom name for the network.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub name: Option<String>,

	/// Add metadata to containers using labels. You can use either an array or a dictionary.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub labels: Option<ListOrMap>,

	/// Specifies a custom IPAM configuration.
	///
	/// See more: https://docs.docker.com/reference/compose-file/networks/#ipam
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub ipam: Option<Ipam>,
}

/// A custom IPAM configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Ipam {
	/// Custom IPAM driver, instead of the default.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub driver: Option<String>,

	/// A list with zero or more configuration elements.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
	pub config: Option<Vec<IpamPool>>,

	/// Driver-specific options as a key-value mapping.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub options: Option<IndexMap<String, SingleValue>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct IpamPool {
	/// Subnet in CIDR format that represents a network segment
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subnet: Option<String>,

	/// IPv4 or IPv6 gateway for the master subnet
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gateway: Option<String>,

	/// Range of IPs from which to allocate container IPs
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ip_range: Option<String>,
}

/// The named volumes for the Compose application.
///
/// See more: https://docs.docker.com/reference/compose-file/volumes/
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct TopLevelVolume {
	/// Specifies which volume driver should be used. If the driver is not available, Compose returns an error and doesn't deploy the application.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub driver: Option<String>,

	/// Specifies a list of options as key-value pairs to pass to the driver for this volume. The options are driver-dependent.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub driver_opts: Option<IndexMap<String, SingleValue>>,

	/// If set to true, it specifies that this volume already exists on the platform and its lifecycle is managed outside of that of the application.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub external: Option<External>,

	/// Sets a custom name for a volume.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub name: Option<String>,

	/// Metadata for the volume, as a list or as a map.
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
	pub labels: Option<ListOrMap>,
}
