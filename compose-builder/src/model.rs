//! The in-memory representation of a compose project.
//!
//! Every type has a fully populated default. String fields use the empty string for "unset",
//! which is what a form field holds before the user types into it.

#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A boolean that can also be left unset. Unset flags are omitted from the output,
/// while `False` is written out explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum TriState {
	#[default]
	Unset,
	False,
	True,
}

impl TriState {
	pub const fn is_unset(&self) -> bool {
		matches!(self, Self::Unset)
	}

	pub const fn is_true(&self) -> bool {
		matches!(self, Self::True)
	}

	pub const fn as_bool(self) -> Option<bool> {
		match self {
			Self::Unset => None,
			Self::False => Some(false),
			Self::True => Some(true),
		}
	}
}

impl From<Option<bool>> for TriState {
	fn from(value: Option<bool>) -> Self {
		match value {
			None => Self::Unset,
			Some(false) => Self::False,
			Some(true) => Self::True,
		}
	}
}

impl From<TriState> for Option<bool> {
	fn from(value: TriState) -> Self {
		value.as_bool()
	}
}

impl From<bool> for TriState {
	fn from(value: bool) -> Self {
		Some(value).into()
	}
}

/// Controls the shape used for list-or-map settings such as volumes and environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ListSyntax {
	/// `- "KEY=value"` / `- "host:container"`
	#[default]
	Array,
	/// `KEY: value` / `{ type, source, target }`
	Dict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
	No,
	Always,
	OnFailure,
	UnlessStopped,
}

impl RestartPolicy {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::No => "no",
			Self::Always => "always",
			Self::OnFailure => "on-failure",
			Self::UnlessStopped => "unless-stopped",
		}
	}

	/// Parses a compose restart value. `on-failure:<retries>` is read as `on-failure`.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim() {
			"no" => Some(Self::No),
			"always" => Some(Self::Always),
			"unless-stopped" => Some(Self::UnlessStopped),
			v if v == "on-failure" || v.starts_with("on-failure:") => Some(Self::OnFailure),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
	#[default]
	None,
	Tcp,
	Udp,
}

impl Protocol {
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"tcp" => Self::Tcp,
			"udp" => Self::Udp,
			_ => Self::None,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct KeyValue {
	pub key: String,
	pub value: String,
}

impl KeyValue {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct PortMapping {
	/// The published port. May carry a host IP prefix, as in `127.0.0.1:8080`.
	pub host: String,
	pub container: String,
	pub protocol: Protocol,
}

impl PortMapping {
	pub fn new(host: impl Into<String>, container: impl Into<String>, protocol: Protocol) -> Self {
		Self {
			host: host.into(),
			container: container.into(),
			protocol,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct VolumeMount {
	/// A host path or the name of a top-level volume. Empty for anonymous volumes.
	pub host: String,
	pub container: String,
	pub read_only: bool,
}

impl VolumeMount {
	pub fn new(host: impl Into<String>, container: impl Into<String>) -> Self {
		Self {
			host: host.into(),
			container: container.into(),
			read_only: false,
		}
	}

	/// Whether the source is a path on the host rather than a named volume.
	pub fn is_bind(&self) -> bool {
		self.host.starts_with(['.', '/', '~', '$'])
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Healthcheck {
	/// A raw command, tokenized when written out.
	pub test: String,
	pub interval: String,
	pub timeout: String,
	pub retries: String,
	pub start_period: String,
	pub start_interval: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Ulimit {
	pub name: String,
	pub soft: String,
	pub hard: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ResourceLimits {
	pub cpus: String,
	pub memory: String,
}

impl ResourceLimits {
	pub const fn is_empty(&self) -> bool {
		self.cpus.is_empty() && self.memory.is_empty()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Resources {
	pub limits: ResourceLimits,
	pub reservations: ResourceLimits,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Deploy {
	pub resources: Resources,
}

/// A single container definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ServiceConfig {
	/// The key of the service in the compose file. Services without a name are not written out.
	pub name: String,
	pub image: String,
	pub container_name: String,
	/// A raw command, tokenized when written out.
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub restart: Option<RestartPolicy>,
	pub ports: Vec<PortMapping>,
	pub expose: Vec<String>,
	pub volumes: Vec<VolumeMount>,
	pub volumes_syntax: ListSyntax,
	pub environment: Vec<KeyValue>,
	pub environment_syntax: ListSyntax,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub healthcheck: Option<Healthcheck>,
	pub depends_on: Vec<String>,
	/// A raw command, tokenized when written out.
	pub entrypoint: String,
	/// One or more paths, separated by commas.
	pub env_file: String,
	pub extra_hosts: Vec<String>,
	pub dns: Vec<String>,
	pub networks: Vec<String>,
	pub user: String,
	pub working_dir: String,
	pub labels: Vec<KeyValue>,
	#[serde(skip_serializing_if = "TriState::is_unset")]
	#[cfg_attr(feature = "schemars", schemars(with = "Option<bool>"))]
	pub privileged: TriState,
	#[serde(skip_serializing_if = "TriState::is_unset")]
	#[cfg_attr(feature = "schemars", schemars(with = "Option<bool>"))]
	pub read_only: TriState,
	#[serde(skip_serializing_if = "TriState::is_unset")]
	#[cfg_attr(feature = "schemars", schemars(with = "Option<bool>"))]
	pub tty: TriState,
	#[serde(skip_serializing_if = "TriState::is_unset")]
	#[cfg_attr(feature = "schemars", schemars(with = "Option<bool>"))]
	pub stdin_open: TriState,
	#[serde(skip_serializing_if = "TriState::is_unset")]
	#[cfg_attr(feature = "schemars", schemars(with = "Option<bool>"))]
	pub init: TriState,
	pub shm_size: String,
	pub security_opt: Vec<String>,
	pub network_mode: String,
	pub cap_add: Vec<String>,
	pub cap_drop: Vec<String>,
	pub sysctls: Vec<KeyValue>,
	pub devices: Vec<String>,
	pub tmpfs: Vec<String>,
	pub ulimits: Vec<Ulimit>,
	pub stop_grace_period: String,
	pub stop_signal: String,
	pub hostname: String,
	pub domainname: String,
	pub mac_address: String,
	/// Written out as `ipc`.
	pub ipc_mode: String,
	pub pid: String,
	pub uts: String,
	pub cgroup_parent: String,
	pub isolation: String,
	pub deploy: Deploy,
}

impl ServiceConfig {
	pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			image: image.into(),
			..Default::default()
		}
	}

	/// Whether the service has a usable name and will be part of the output.
	pub fn is_named(&self) -> bool {
		!self.name.trim().is_empty()
	}

	/// The name used for the container at runtime.
	pub fn runtime_name(&self) -> &str {
		if self.container_name.is_empty() {
			&self.name
		} else {
			&self.container_name
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct IpamPool {
	pub subnet: String,
	pub gateway: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct Ipam {
	pub driver: String,
	pub config: Vec<IpamPool>,
	pub options: Vec<KeyValue>,
}

impl Ipam {
	pub fn is_empty(&self) -> bool {
		self.driver.is_empty() && self.config.is_empty() && self.options.is_empty()
	}
}

/// A top-level network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct NetworkConfig {
	pub name: String,
	pub driver: String,
	pub driver_opts: Vec<KeyValue>,
	pub attachable: bool,
	pub internal: bool,
	pub enable_ipv6: bool,
	pub external: bool,
	/// The name of the existing network. Only used when `external` is set.
	pub name_external: String,
	pub labels: Vec<KeyValue>,
	pub ipam: Ipam,
}

impl NetworkConfig {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	pub fn external(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			external: true,
			..Default::default()
		}
	}
}

/// A top-level volume.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct VolumeConfig {
	pub name: String,
	pub driver: String,
	pub driver_opts: Vec<KeyValue>,
	pub driver_opts_type: String,
	pub driver_opts_device: String,
	pub driver_opts_o: String,
	pub labels: Vec<KeyValue>,
	pub external: bool,
	/// The name of the existing volume. Only used when `external` is set.
	pub name_external: String,
}

impl VolumeConfig {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}
}
