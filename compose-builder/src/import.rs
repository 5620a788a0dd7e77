use docker_compose_config::{
	ComposeFile, External, ListOrMap, Port, PortSettings, ResourceSpec, Service, ServiceVolume,
	SingleValue, StringOrList, StringOrNum, TopLevelNetwork, TopLevelVolume, Ulimit as ComposeUlimit,
};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
	errors::BuildError,
	model::{
		Deploy, Healthcheck, Ipam, IpamPool, KeyValue, ListSyntax, NetworkConfig, PortMapping,
		Protocol, ResourceLimits, Resources, RestartPolicy, ServiceConfig, TriState, Ulimit,
		VolumeConfig, VolumeMount,
	},
	tokenize::join_tokens,
};

/// The model entries read from a compose file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
	pub services: Vec<ServiceConfig>,
	pub networks: Vec<NetworkConfig>,
	pub volumes: Vec<VolumeConfig>,
}

/// Reads a third-party compose file into model entries.
///
/// Fields with an unexpected shape are skipped. The file must at least define `services`.
pub fn parse_compose_template(text: &str) -> Result<ParsedTemplate, BuildError> {
	if text.trim().is_empty() {
		return Err(BuildError::InvalidTemplate);
	}

	let compose: ComposeFile =
		serde_yaml_ng::from_str(text).map_err(|e| BuildError::Parse(e.to_string()))?;

	let Some(services) = &compose.services else {
		return Err(BuildError::InvalidTemplate);
	};

	let empty = Service::default();

	let parsed = ParsedTemplate {
		services: services
			.iter()
			.map(|(name, service)| import_service(name, service.as_ref().unwrap_or(&empty)))
			.collect(),
		networks: compose
			.networks
			.iter()
			.flatten()
			.map(|(name, network)| import_network(name, network.as_ref()))
			.collect(),
		volumes: compose
			.volumes
			.iter()
			.flatten()
			.map(|(name, volume)| import_volume(name, volume.as_ref()))
			.collect(),
	};

	debug!(
		"Parsed a template with {} services, {} networks and {} volumes",
		parsed.services.len(),
		parsed.networks.len(),
		parsed.volumes.len()
	);

	Ok(parsed)
}

fn raw_command(value: Option<&StringOrList>) -> String {
	match value {
		Some(StringOrList::String(s)) => s.clone(),
		Some(StringOrList::List(list)) => join_tokens(list),
		None => String::new(),
	}
}

fn string_list(value: Option<&StringOrList>) -> Vec<String> {
	value.map(StringOrList::to_vec).unwrap_or_default()
}

fn key_values(value: Option<&ListOrMap>) -> Vec<KeyValue> {
	value
		.map(|v| {
			v.to_pairs()
				.into_iter()
				.map(|(key, value)| KeyValue { key, value })
				.collect()
		})
		.unwrap_or_default()
}

fn map_key_values(value: Option<&IndexMap<String, SingleValue>>) -> Vec<KeyValue> {
	value
		.into_iter()
		.flatten()
		.map(|(key, value)| KeyValue::new(key.as_str(), value.to_string()))
		.collect()
}

fn to_text<T: ToString>(value: Option<&T>) -> String {
	value.map(ToString::to_string).unwrap_or_default()
}

/// Reads a port in the short syntax.
///
/// The container port follows the last colon, so the host part may carry an IP address,
/// as in `127.0.0.1:8080:80/tcp`.
pub fn parse_port(value: &str) -> Option<PortMapping> {
	let value = value.trim();

	let (mapping, protocol) = match value.rsplit_once('/') {
		Some((mapping, protocol)) => (mapping, Protocol::parse(protocol)),
		None => (value, Protocol::None),
	};

	let (host, container) = mapping.rsplit_once(':').unwrap_or(("", mapping));

	if container.is_empty() {
		return None;
	}

	Some(PortMapping::new(host, container, protocol))
}

fn import_long_port(settings: &PortSettings) -> Option<PortMapping> {
	let container = to_text(settings.target.as_ref());

	if container.is_empty() {
		return None;
	}

	let published = to_text(settings.published.as_ref());
	let host = match settings.host_ip.as_deref() {
		Some(ip) if !ip.is_empty() && !published.is_empty() => format!("{ip}:{published}"),
		_ => published,
	};

	Some(PortMapping::new(
		host,
		container,
		Protocol::parse(settings.protocol.as_deref().unwrap_or_default()),
	))
}

fn import_port(port: &Port) -> Option<PortMapping> {
	match port {
		Port::Short(StringOrNum::Num(n)) => Some(PortMapping::new("", n.to_string(), Protocol::None)),
		Port::Short(StringOrNum::String(s)) => parse_port(s),
		Port::Long(settings) => import_long_port(settings),
	}
}

/// Reads a volume in the short syntax: `[source:]target[:mode]`.
pub fn parse_volume(value: &str) -> VolumeMount {
	let parts: Vec<&str> = value.split(':').collect();

	match parts.as_slice() {
		[container] => VolumeMount::new("", *container),
		[host, container] => VolumeMount::new(*host, *container),
		[host, container, mode, ..] => VolumeMount {
			read_only: mode.split(',').any(|m| m == "ro"),
			..VolumeMount::new(*host, *container)
		},
		[] => VolumeMount::default(),
	}
}

fn import_volume_mount(volume: &ServiceVolume) -> VolumeMount {
	match volume {
		ServiceVolume::Simple(s) => parse_volume(s),
		ServiceVolume::Advanced(settings) => VolumeMount {
			host: settings.source.clone().unwrap_or_default(),
			container: settings.target.clone().unwrap_or_default(),
			read_only: settings.read_only.unwrap_or_default(),
		},
	}
}

fn import_limits(spec: Option<&ResourceSpec>) -> ResourceLimits {
	ResourceLimits {
		cpus: to_text(spec.and_then(|s| s.cpus.as_ref())),
		memory: to_text(spec.and_then(|s| s.memory.as_ref())),
	}
}

fn import_ulimit(name: &str, ulimit: &ComposeUlimit) -> Ulimit {
	match ulimit {
		ComposeUlimit::Single(value) => Ulimit {
			name: name.to_string(),
			soft: value.to_string(),
			hard: String::new(),
		},
		ComposeUlimit::SoftHard { soft, hard } => Ulimit {
			name: name.to_string(),
			soft: to_text(soft.as_ref()),
			hard: to_text(hard.as_ref()),
		},
	}
}

/// Converts a compose service into a model service.
pub fn import_service(name: &str, service: &Service) -> ServiceConfig {
	let ports: Vec<PortMapping> = service
		.ports
		.iter()
		.flatten()
		.filter_map(|port| {
			let mapping = import_port(port);

			if mapping.is_none() {
				warn!("Skipped a port without a container port in the service `{name}`");
			}

			mapping
		})
		.collect();

	let volumes = service.volumes.as_deref().unwrap_or_default();

	let volumes_syntax = if matches!(volumes.first(), Some(ServiceVolume::Advanced(_))) {
		ListSyntax::Dict
	} else {
		ListSyntax::Array
	};

	let environment_syntax = match &service.environment {
		Some(env) if !env.is_list() => ListSyntax::Dict,
		_ => ListSyntax::Array,
	};

	let healthcheck = service.healthcheck.as_ref().map(|hc| Healthcheck {
		test: raw_command(hc.test.as_ref()),
		interval: hc.interval.clone().unwrap_or_default(),
		timeout: hc.timeout.clone().unwrap_or_default(),
		retries: to_text(hc.retries.as_ref()),
		start_period: hc.start_period.clone().unwrap_or_default(),
		start_interval: hc.start_interval.clone().unwrap_or_default(),
	});

	let resources = service
		.deploy
		.as_ref()
		.and_then(|deploy| deploy.resources.as_ref());

	ServiceConfig {
		name: name.to_string(),
		image: service.image.clone().unwrap_or_default(),
		container_name: service.container_name.clone().unwrap_or_default(),
		command: raw_command(service.command.as_ref()),
		restart: service.restart.as_deref().and_then(RestartPolicy::parse),
		ports,
		expose: service
			.expose
			.iter()
			.flatten()
			.map(ToString::to_string)
			.collect(),
		volumes: volumes.iter().map(import_volume_mount).collect(),
		volumes_syntax,
		environment: key_values(service.environment.as_ref()),
		environment_syntax,
		healthcheck,
		depends_on: service
			.depends_on
			.as_ref()
			.map(|d| d.names())
			.unwrap_or_default(),
		entrypoint: raw_command(service.entrypoint.as_ref()),
		env_file: string_list(service.env_file.as_ref()).join(","),
		extra_hosts: service
			.extra_hosts
			.as_ref()
			.map(|h| h.to_entries())
			.unwrap_or_default(),
		dns: string_list(service.dns.as_ref()),
		networks: service
			.networks
			.as_ref()
			.map(|n| n.names())
			.unwrap_or_default(),
		user: to_text(service.user.as_ref()),
		working_dir: service.working_dir.clone().unwrap_or_default(),
		labels: key_values(service.labels.as_ref()),
		privileged: TriState::from(service.privileged),
		read_only: TriState::from(service.read_only),
		tty: TriState::from(service.tty),
		stdin_open: TriState::from(service.stdin_open),
		init: TriState::from(service.init),
		shm_size: to_text(service.shm_size.as_ref()),
		security_opt: service.security_opt.clone().unwrap_or_default(),
		network_mode: service.network_mode.clone().unwrap_or_default(),
		cap_add: service.cap_add.clone().unwrap_or_default(),
		cap_drop: service.cap_drop.clone().unwrap_or_default(),
		sysctls: key_values(service.sysctls.as_ref()),
		devices: service.devices.clone().unwrap_or_default(),
		tmpfs: string_list(service.tmpfs.as_ref()),
		ulimits: service
			.ulimits
			.iter()
			.flatten()
			.map(|(name, ulimit)| import_ulimit(name, ulimit))
			.collect(),
		stop_grace_period: service.stop_grace_period.clone().unwrap_or_default(),
		stop_signal: service.stop_signal.clone().unwrap_or_default(),
		hostname: service.hostname.clone().unwrap_or_default(),
		domainname: service.domainname.clone().unwrap_or_default(),
		mac_address: service.mac_address.clone().unwrap_or_default(),
		ipc_mode: service.ipc.clone().unwrap_or_default(),
		pid: service.pid.clone().unwrap_or_default(),
		uts: service.uts.clone().unwrap_or_default(),
		cgroup_parent: service.cgroup_parent.clone().unwrap_or_default(),
		isolation: service.isolation.clone().unwrap_or_default(),
		deploy: Deploy {
			resources: Resources {
				limits: import_limits(resources.and_then(|r| r.limits.as_ref())),
				reservations: import_limits(resources.and_then(|r| r.reservations.as_ref())),
			},
		},
	}
}

fn external_fields(external: Option<&External>) -> (bool, String) {
	match external {
		Some(external) if external.is_external() => {
			(true, external.name().unwrap_or_default().to_string())
		}
		_ => (false, String::new()),
	}
}

/// Converts a top-level compose network into a model network.
pub fn import_network(name: &str, network: Option<&TopLevelNetwork>) -> NetworkConfig {
	let Some(network) = network else {
		return NetworkConfig::new(name);
	};

	let (external, mut name_external) = external_fields(network.external.as_ref());

	if external && name_external.is_empty() {
		name_external = network.name.clone().unwrap_or_default();
	}

	let ipam = network
		.ipam
		.as_ref()
		.map(|ipam| Ipam {
			driver: ipam.driver.clone().unwrap_or_default(),
			config: ipam
				.config
				.iter()
				.flatten()
				.map(|pool| IpamPool {
					subnet: pool.subnet.clone().unwrap_or_default(),
					gateway: pool.gateway.clone().unwrap_or_default(),
				})
				.collect(),
			options: map_key_values(ipam.options.as_ref()),
		})
		.unwrap_or_default();

	NetworkConfig {
		name: name.to_string(),
		driver: network.driver.clone().unwrap_or_default(),
		driver_opts: map_key_values(network.driver_opts.as_ref()),
		attachable: network.attachable.unwrap_or_default(),
		internal: network.internal.unwrap_or_default(),
		enable_ipv6: network.enable_ipv6.unwrap_or_default(),
		external,
		name_external,
		labels: key_values(network.labels.as_ref()),
		ipam,
	}
}

/// Converts a top-level compose volume into a model volume.
///
/// The `type`, `device` and `o` driver options go to their own fields.
pub fn import_volume(name: &str, volume: Option<&TopLevelVolume>) -> VolumeConfig {
	let Some(volume) = volume else {
		return VolumeConfig::new(name);
	};

	let (external, mut name_external) = external_fields(volume.external.as_ref());

	if external && name_external.is_empty() {
		name_external = volume.name.clone().unwrap_or_default();
	}

	let mut config = VolumeConfig {
		name: name.to_string(),
		driver: volume.driver.clone().unwrap_or_default(),
		labels: key_values(volume.labels.as_ref()),
		external,
		name_external,
		..Default::default()
	};

	for (key, value) in volume.driver_opts.iter().flatten() {
		let value = value.to_string();

		match key.as_str() {
			"type" => config.driver_opts_type = value,
			"device" => config.driver_opts_device = value,
			"o" => config.driver_opts_o = value,
			_ => config.driver_opts.push(KeyValue::new(key.as_str(), value)),
		}
	}

	config
}
