use tracing::{debug, warn};

use crate::{
	model::{
		Healthcheck, KeyValue, ListSyntax, NetworkConfig, PortMapping, Protocol, ResourceLimits,
		ServiceConfig, TriState, Ulimit, VolumeConfig, VolumeMount,
	},
	project::Project,
	tokenize::tokenize,
	vpn::{Sidecar, route_service, synthesize},
	yaml::{Mapping, Node, emit, insert_map, insert_str, insert_str_list},
};

/// Renders the project as a compose file.
pub fn serialize(project: &Project) -> String {
	emit(&compose_document(project))
}

/// Builds the document tree of the compose file, with the VPN sidecar merged in.
///
/// Unnamed services are left out, as is every empty value.
pub fn compose_document(project: &Project) -> Mapping {
	let sidecar = synthesize(&project.vpn);

	let mut services = Mapping::new();

	for service in project.services.iter().filter(|s| s.is_named()) {
		let routed = route_service(&project.vpn, service);
		services.insert(service.name.trim().to_string(), Node::Map(service_entry(&routed)));
	}

	let mut networks: Mapping = project
		.networks
		.iter()
		.filter(|n| !n.name.trim().is_empty())
		.map(|n| (n.name.clone(), Node::Map(network_entry(n))))
		.collect();

	let mut volumes: Mapping = project
		.volumes
		.iter()
		.filter(|v| !v.name.trim().is_empty())
		.map(|v| (v.name.clone(), Node::Map(volume_entry(v))))
		.collect();

	let mut configs = Mapping::new();

	if let Some(sidecar) = sidecar {
		merge_sidecar(
			sidecar,
			&mut services,
			&mut networks,
			&mut volumes,
			&mut configs,
		);
	}

	debug!(
		"Built a compose document with {} services, {} networks and {} volumes",
		services.len(),
		networks.len(),
		volumes.len()
	);

	let mut document = Mapping::new();
	document.insert("services".to_string(), Node::Map(services));
	insert_map(&mut document, "networks", networks);
	insert_map(&mut document, "volumes", volumes);
	insert_map(&mut document, "configs", configs);

	document
}

fn merge_sidecar(
	sidecar: Sidecar,
	services: &mut Mapping,
	networks: &mut Mapping,
	volumes: &mut Mapping,
	configs: &mut Mapping,
) {
	let mut entry = service_entry(&sidecar.service);

	if !sidecar.configs.is_empty() {
		let mounts = sidecar
			.configs
			.iter()
			.map(|mount| {
				let mut map = Mapping::new();
				insert_str(&mut map, "source", &mount.source);
				insert_str(&mut map, "target", &mount.target);
				Node::Map(map)
			})
			.collect();

		entry.insert("configs".to_string(), Node::Seq(mounts));
	}

	if services.contains_key(&sidecar.service.name) {
		warn!(
			"The service `{}` is replaced by the VPN sidecar with the same name",
			sidecar.service.name
		);
	}

	services.insert(sidecar.service.name.clone(), Node::Map(entry));

	for network in sidecar.networks {
		if !networks.contains_key(&network.name) {
			networks.insert(network.name.clone(), Node::Map(network_entry(&network)));
		}
	}

	for volume in sidecar.volumes {
		if !volumes.contains_key(&volume.name) {
			volumes.insert(volume.name.clone(), Node::Map(volume_entry(&volume)));
		}
	}

	for config in sidecar.top_level_configs {
		let mut map = Mapping::new();
		insert_str(&mut map, "content", &config.content);
		configs.insert(config.name, Node::Map(map));
	}
}

/// Formats a port mapping in the short syntax.
///
/// Returns `None` when the container port is missing.
pub fn port_mapping(port: &PortMapping) -> Option<String> {
	let host = port.host.trim();
	let container = port.container.trim();

	if container.is_empty() {
		return None;
	}

	let protocol = match port.protocol {
		Protocol::Tcp => Some("tcp"),
		Protocol::Udp => Some("udp"),
		Protocol::None if !host.is_empty() => Some("tcp"),
		Protocol::None => None,
	};

	let mut mapping = if host.is_empty() {
		container.to_string()
	} else {
		format!("{host}:{container}")
	};

	if let Some(protocol) = protocol {
		mapping.push('/');
		mapping.push_str(protocol);
	}

	Some(mapping)
}

pub(crate) fn volume_string(mount: &VolumeMount) -> Option<String> {
	if mount.container.is_empty() {
		return None;
	}

	let mut entry = if mount.host.is_empty() {
		mount.container.clone()
	} else {
		format!("{}:{}", mount.host, mount.container)
	};

	if mount.read_only {
		entry.push_str(":ro");
	}

	Some(entry)
}

fn volume_map(mount: &VolumeMount) -> Option<Node> {
	if mount.container.is_empty() {
		return None;
	}

	let mut map = Mapping::new();
	let kind = if mount.is_bind() { "bind" } else { "volume" };

	map.insert("type".to_string(), Node::str(kind));
	insert_str(&mut map, "source", &mount.host);
	insert_str(&mut map, "target", &mount.container);

	if mount.read_only {
		map.insert("read_only".to_string(), Node::Bool(true));
	}

	Some(Node::Map(map))
}

fn number_or_str(value: &str) -> Node {
	value
		.trim()
		.parse::<i64>()
		.map_or_else(|_| Node::str(value), Node::Int)
}

fn key_value_map(entries: &[KeyValue]) -> Mapping {
	entries
		.iter()
		.filter(|kv| !kv.key.is_empty())
		.map(|kv| (kv.key.clone(), Node::str(kv.value.as_str())))
		.collect()
}

fn insert_command(map: &mut Mapping, key: &str, raw: &str) {
	let tokens = tokenize(raw);

	if !tokens.is_empty() {
		map.insert(key.to_string(), Node::Inline(tokens));
	}
}

fn insert_flag(map: &mut Mapping, key: &str, value: TriState) {
	if let Some(value) = value.as_bool() {
		map.insert(key.to_string(), Node::Bool(value));
	}
}

fn healthcheck_entry(healthcheck: &Healthcheck) -> Mapping {
	let mut map = Mapping::new();

	insert_command(&mut map, "test", &healthcheck.test);
	insert_str(&mut map, "interval", &healthcheck.interval);
	insert_str(&mut map, "timeout", &healthcheck.timeout);

	if !healthcheck.retries.is_empty() {
		map.insert("retries".to_string(), number_or_str(&healthcheck.retries));
	}

	insert_str(&mut map, "start_period", &healthcheck.start_period);
	insert_str(&mut map, "start_interval", &healthcheck.start_interval);

	map
}

fn ulimit_entry(ulimit: &Ulimit) -> Option<Node> {
	match (ulimit.soft.is_empty(), ulimit.hard.is_empty()) {
		(true, true) => None,
		(false, true) => Some(number_or_str(&ulimit.soft)),
		(true, false) => Some(number_or_str(&ulimit.hard)),
		(false, false) => {
			let mut map = Mapping::new();
			map.insert("soft".to_string(), number_or_str(&ulimit.soft));
			map.insert("hard".to_string(), number_or_str(&ulimit.hard));
			Some(Node::Map(map))
		}
	}
}

fn limits_entry(limits: &ResourceLimits) -> Mapping {
	let mut map = Mapping::new();

	insert_str(&mut map, "cpus", limits.cpus.trim());
	insert_str(&mut map, "memory", limits.memory.trim());

	map
}

fn service_entry(service: &ServiceConfig) -> Mapping {
	let mut map = Mapping::new();

	insert_str(&mut map, "image", &service.image);
	insert_str(&mut map, "container_name", &service.container_name);
	insert_command(&mut map, "command", &service.command);

	if let Some(restart) = service.restart {
		map.insert("restart".to_string(), Node::str(restart.as_str()));
	}

	let ports: Vec<Node> = service
		.ports
		.iter()
		.filter_map(port_mapping)
		.map(Node::Quoted)
		.collect();
	if !ports.is_empty() {
		map.insert("ports".to_string(), Node::Seq(ports));
	}

	insert_str_list(&mut map, "expose", &service.expose);

	let volumes: Vec<Node> = match service.volumes_syntax {
		ListSyntax::Array => service
			.volumes
			.iter()
			.filter_map(volume_string)
			.map(Node::Str)
			.collect(),
		ListSyntax::Dict => service.volumes.iter().filter_map(volume_map).collect(),
	};
	if !volumes.is_empty() {
		map.insert("volumes".to_string(), Node::Seq(volumes));
	}

	match service.environment_syntax {
		ListSyntax::Array => {
			let entries: Vec<String> = service
				.environment
				.iter()
				.filter(|kv| !kv.key.is_empty())
				.map(|kv| format!("{}={}", kv.key, kv.value))
				.collect();
			insert_str_list(&mut map, "environment", &entries);
		}
		ListSyntax::Dict => {
			insert_map(
				&mut map,
				"environment",
				key_value_map(&service.environment),
			);
		}
	}

	if let Some(healthcheck) = &service.healthcheck {
		insert_map(&mut map, "healthcheck", healthcheck_entry(healthcheck));
	}

	insert_str_list(&mut map, "depends_on", &service.depends_on);
	insert_command(&mut map, "entrypoint", &service.entrypoint);

	let env_files: Vec<&str> = service
		.env_file
		.split(',')
		.map(str::trim)
		.filter(|f| !f.is_empty())
		.collect();
	match env_files.as_slice() {
		[] => {}
		[single] => {
			map.insert("env_file".to_string(), Node::str(*single));
		}
		many => {
			map.insert("env_file".to_string(), Node::str_list(many.iter().copied()));
		}
	}

	insert_str_list(&mut map, "extra_hosts", &service.extra_hosts);
	insert_str_list(&mut map, "dns", &service.dns);
	insert_str_list(&mut map, "networks", &service.networks);
	insert_str(&mut map, "user", &service.user);
	insert_str(&mut map, "working_dir", &service.working_dir);

	let labels: Vec<Node> = service
		.labels
		.iter()
		.filter(|kv| !kv.key.is_empty())
		.map(|kv| Node::Quoted(format!("{}={}", kv.key, kv.value)))
		.collect();
	if !labels.is_empty() {
		map.insert("labels".to_string(), Node::Seq(labels));
	}

	insert_flag(&mut map, "privileged", service.privileged);
	insert_flag(&mut map, "read_only", service.read_only);
	insert_flag(&mut map, "tty", service.tty);
	insert_flag(&mut map, "stdin_open", service.stdin_open);
	insert_flag(&mut map, "init", service.init);

	insert_str(&mut map, "shm_size", &service.shm_size);
	insert_str_list(&mut map, "security_opt", &service.security_opt);
	insert_str(&mut map, "network_mode", &service.network_mode);
	insert_str_list(&mut map, "cap_add", &service.cap_add);
	insert_str_list(&mut map, "cap_drop", &service.cap_drop);
	insert_map(&mut map, "sysctls", key_value_map(&service.sysctls));
	insert_str_list(&mut map, "devices", &service.devices);
	insert_str_list(&mut map, "tmpfs", &service.tmpfs);

	let ulimits: Mapping = service
		.ulimits
		.iter()
		.filter(|u| !u.name.is_empty())
		.filter_map(|u| ulimit_entry(u).map(|node| (u.name.clone(), node)))
		.collect();
	insert_map(&mut map, "ulimits", ulimits);

	insert_str(&mut map, "stop_grace_period", &service.stop_grace_period);
	insert_str(&mut map, "stop_signal", &service.stop_signal);
	insert_str(&mut map, "hostname", &service.hostname);
	insert_str(&mut map, "domainname", &service.domainname);
	insert_str(&mut map, "mac_address", &service.mac_address);
	insert_str(&mut map, "ipc", &service.ipc_mode);
	insert_str(&mut map, "pid", &service.pid);
	insert_str(&mut map, "uts", &service.uts);
	insert_str(&mut map, "cgroup_parent", &service.cgroup_parent);
	insert_str(&mut map, "isolation", &service.isolation);

	let resources = &service.deploy.resources;
	let mut resources_map = Mapping::new();
	insert_map(&mut resources_map, "limits", limits_entry(&resources.limits));
	insert_map(
		&mut resources_map,
		"reservations",
		limits_entry(&resources.reservations),
	);

	let mut deploy = Mapping::new();
	insert_map(&mut deploy, "resources", resources_map);
	insert_map(&mut map, "deploy", deploy);

	map
}

fn external_entry(name_external: &str) -> Node {
	if name_external.is_empty() {
		Node::Bool(true)
	} else {
		let mut map = Mapping::new();
		map.insert("name".to_string(), Node::str(name_external));
		Node::Map(map)
	}
}

fn network_entry(network: &NetworkConfig) -> Mapping {
	let mut map = Mapping::new();

	if network.external {
		map.insert(
			"external".to_string(),
			external_entry(&network.name_external),
		);
		return map;
	}

	insert_str(&mut map, "driver", &network.driver);
	insert_map(&mut map, "driver_opts", key_value_map(&network.driver_opts));

	for (key, value) in [
		("attachable", network.attachable),
		("internal", network.internal),
		("enable_ipv6", network.enable_ipv6),
	] {
		if value {
			map.insert(key.to_string(), Node::Bool(true));
		}
	}

	insert_map(&mut map, "labels", key_value_map(&network.labels));

	let ipam = &network.ipam;
	let mut ipam_map = Mapping::new();
	insert_str(&mut ipam_map, "driver", &ipam.driver);

	let pools: Vec<Node> = ipam
		.config
		.iter()
		.filter_map(|pool| {
			let mut pool_map = Mapping::new();
			insert_str(&mut pool_map, "subnet", &pool.subnet);
			insert_str(&mut pool_map, "gateway", &pool.gateway);
			(!pool_map.is_empty()).then_some(Node::Map(pool_map))
		})
		.collect();
	if !pools.is_empty() {
		ipam_map.insert("config".to_string(), Node::Seq(pools));
	}

	insert_map(&mut ipam_map, "options", key_value_map(&ipam.options));
	insert_map(&mut map, "ipam", ipam_map);

	map
}

fn volume_entry(volume: &VolumeConfig) -> Mapping {
	let mut map = Mapping::new();

	if volume.external {
		map.insert("external".to_string(), external_entry(&volume.name_external));
		return map;
	}

	insert_str(&mut map, "driver", &volume.driver);

	let mut driver_opts = key_value_map(&volume.driver_opts);
	for (key, value) in [
		("type", &volume.driver_opts_type),
		("device", &volume.driver_opts_device),
		("o", &volume.driver_opts_o),
	] {
		if !value.is_empty() {
			driver_opts.insert(key.to_string(), Node::str(value.as_str()));
		}
	}
	insert_map(&mut map, "driver_opts", driver_opts);

	insert_map(&mut map, "labels", key_value_map(&volume.labels));

	map
}

#[cfg(test)]
mod test {
	use indoc::indoc;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::{
		model::{Deploy, Ipam, IpamPool, Resources, RestartPolicy},
		vpn::{VpnConfig, VpnKind},
	};

	fn project_with(services: Vec<ServiceConfig>) -> Project {
		Project {
			services,
			..Default::default()
		}
	}

	fn service_node<'a>(document: &'a Mapping, name: &str) -> &'a Mapping {
		document["services"].as_map().unwrap()[name]
			.as_map()
			.unwrap()
	}

	#[test]
	fn ports() {
		assert_eq!(
			port_mapping(&PortMapping::new("8080", "80", Protocol::Tcp)).as_deref(),
			Some("8080:80/tcp")
		);
		assert_eq!(
			port_mapping(&PortMapping::new("", "80", Protocol::None)).as_deref(),
			Some("80")
		);
		assert_eq!(
			port_mapping(&PortMapping::new("53", "53", Protocol::None)).as_deref(),
			Some("53:53/tcp")
		);
		assert_eq!(
			port_mapping(&PortMapping::new("127.0.0.1:53", "53", Protocol::Udp)).as_deref(),
			Some("127.0.0.1:53:53/udp")
		);
		assert_eq!(port_mapping(&PortMapping::new("80", "", Protocol::Tcp)), None);
	}

	#[test]
	fn empty_service_only_has_image() {
		let document = compose_document(&project_with(vec![ServiceConfig::new("web", "nginx")]));

		assert_eq!(
			service_node(&document, "web"),
			&Mapping::from([("image".to_string(), Node::str("nginx"))])
		);
		assert_eq!(document.len(), 1);
	}

	#[test]
	fn unnamed_services_are_skipped() {
		let document = compose_document(&project_with(vec![
			ServiceConfig::new("", "alpine"),
			ServiceConfig::new("  ", "alpine"),
			ServiceConfig::new("web", "nginx"),
		]));

		assert_eq!(document["services"].as_map().unwrap().len(), 1);
	}

	#[test]
	fn full_service() {
		let service = ServiceConfig {
			container_name: "app".to_string(),
			command: "npm run start".to_string(),
			restart: Some(RestartPolicy::OnFailure),
			volumes: vec![
				VolumeMount {
					read_only: true,
					..VolumeMount::new("./config", "/config")
				},
				VolumeMount::new("", "/tmp/cache"),
			],
			environment: vec![KeyValue::new("NODE_ENV", "production"), KeyValue::new("", "x")],
			healthcheck: Some(Healthcheck {
				test: "CMD curl -f http://localhost".to_string(),
				retries: "3".to_string(),
				interval: "30s".to_string(),
				..Default::default()
			}),
			env_file: ".env, .env.local".to_string(),
			labels: vec![KeyValue::new("traefik.enable", "true")],
			privileged: TriState::False,
			init: TriState::True,
			sysctls: vec![KeyValue::new("net.core.somaxconn", "1024")],
			ulimits: vec![
				Ulimit {
					name: "nofile".to_string(),
					soft: "1024".to_string(),
					hard: "2048".to_string(),
				},
				Ulimit {
					name: "nproc".to_string(),
					soft: "512".to_string(),
					hard: String::new(),
				},
			],
			ipc_mode: "host".to_string(),
			deploy: Deploy {
				resources: Resources {
					limits: ResourceLimits {
						cpus: "0.5".to_string(),
						memory: String::new(),
					},
					..Default::default()
				},
			},
			..ServiceConfig::new("app", "node:20")
		};

		assert_eq!(
			serialize(&project_with(vec![service])),
			indoc! {r#"
        services:
          app:
            image: node:20
            container_name: app
            command: ["npm", "run", "start"]
            restart: on-failure
            volumes:
              - ./config:/config:ro
              - /tmp/cache
            environment:
              - NODE_ENV=production
            healthcheck:
              test: ["CMD", "curl", "-f", "http://localhost"]
              interval: 30s
              retries: 3
            env_file:
              - .env
              - .env.local
            labels:
              - "traefik.enable=true"
            privileged: false
            init: true
            sysctls:
              net.core.somaxconn: "1024"
            ulimits:
              nofile:
                soft: 1024
                hard: 2048
              nproc: 512
            ipc: host
            deploy:
              resources:
                limits:
                  cpus: "0.5"
      "#}
		);
	}

	#[test]
	fn dict_syntax() {
		let service = ServiceConfig {
			volumes: vec![
				VolumeMount::new("data", "/var/lib/data"),
				VolumeMount {
					read_only: true,
					..VolumeMount::new("~/certs", "/certs")
				},
			],
			volumes_syntax: ListSyntax::Dict,
			environment: vec![KeyValue::new("PORT", "8080"), KeyValue::new("EMPTY", "")],
			environment_syntax: ListSyntax::Dict,
			..ServiceConfig::new("api", "api:latest")
		};

		assert_eq!(
			serialize(&project_with(vec![service])),
			indoc! {r#"
        services:
          api:
            image: api:latest
            volumes:
              - type: volume
                source: data
                target: /var/lib/data
              - type: bind
                source: ~/certs
                target: /certs
                read_only: true
            environment:
              PORT: "8080"
              EMPTY: ""
      "#}
		);
	}

	#[test]
	fn empty_deploy_is_pruned() {
		let service = ServiceConfig {
			deploy: Deploy {
				resources: Resources {
					limits: ResourceLimits {
						cpus: " ".to_string(),
						memory: String::new(),
					},
					..Default::default()
				},
			},
			healthcheck: Some(Healthcheck::default()),
			..ServiceConfig::new("web", "nginx")
		};

		let document = compose_document(&project_with(vec![service]));
		let web = service_node(&document, "web");

		assert!(!web.contains_key("deploy"));
		assert!(!web.contains_key("healthcheck"));
	}

	#[test]
	fn networks_and_volumes() {
		let project = Project {
			services: vec![ServiceConfig::new("web", "nginx")],
			networks: vec![
				NetworkConfig {
					driver: "bridge".to_string(),
					internal: true,
					ipam: Ipam {
						config: vec![IpamPool {
							subnet: "172.28.0.0/16".to_string(),
							gateway: String::new(),
						}],
						..Default::default()
					},
					..NetworkConfig::new("backend")
				},
				NetworkConfig {
					name_external: "shared".to_string(),
					// Ignored for external networks
					driver: "overlay".to_string(),
					..NetworkConfig::external("proxy")
				},
				NetworkConfig::new("plain"),
			],
			volumes: vec![
				VolumeConfig {
					driver_opts: vec![KeyValue::new("type", "tmpfs"), KeyValue::new("size", "1g")],
					driver_opts_type: "nfs".to_string(),
					driver_opts_o: "addr=10.0.0.2".to_string(),
					..VolumeConfig::new("data")
				},
				VolumeConfig {
					external: true,
					..VolumeConfig::new("legacy")
				},
			],
			..Default::default()
		};

		assert_eq!(
			serialize(&project),
			indoc! {r#"
        services:
          web:
            image: nginx
        networks:
          backend:
            driver: bridge
            internal: true
            ipam:
              config:
                - subnet: 172.28.0.0/16
          proxy:
            external:
              name: shared
          plain: {}
        volumes:
          data:
            driver_opts:
              type: nfs
              size: 1g
              o: addr=10.0.0.2
          legacy:
            external: true
      "#}
		);
	}

	#[test]
	fn tailscale_routing() {
		let mut vpn = VpnConfig {
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		};
		vpn.set_kind(Some(VpnKind::Tailscale));

		let project = Project {
			services: vec![ServiceConfig {
				ports: vec![PortMapping::new("80", "80", Protocol::Tcp)],
				..ServiceConfig::new("web", "nginx")
			}],
			vpn,
			..Default::default()
		};

		let document = compose_document(&project);
		let web = service_node(&document, "web");

		assert!(!web.contains_key("ports"));
		assert_eq!(web["network_mode"].as_str(), Some("service:tailscale"));

		let services: Vec<&String> = document["services"].as_map().unwrap().keys().collect();
		assert_eq!(services, vec!["web", "tailscale"]);
		assert!(document["volumes"].as_map().unwrap().contains_key("tailscale"));
	}

	#[test]
	fn serve_config_is_inlined() -> Result<(), Box<dyn std::error::Error>> {
		let mut vpn = VpnConfig {
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		};
		vpn.set_kind(Some(VpnKind::Tailscale));
		let ts = vpn.tailscale_mut().unwrap();
		ts.enable_serve = true;
		ts.serve_target_service = "web".to_string();

		let project = Project {
			services: vec![ServiceConfig::new("web", "nginx")],
			vpn,
			..Default::default()
		};

		let output = serialize(&project);
		let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&output)?;

		assert_eq!(
			parsed["services"]["tailscale"]["configs"][0]["target"].as_str(),
			Some("/config/serve.json")
		);

		let content = parsed["configs"]["ts-serve"]["content"].as_str().unwrap();
		let serve: serde_json::Value = serde_json::from_str(content)?;
		assert_eq!(serve["TCP"]["443"]["HTTPS"], serde_json::Value::Bool(true));

		Ok(())
	}

	#[test]
	fn user_definitions_win_over_synthesized_ones() {
		let mut vpn = VpnConfig {
			services_using_vpn: vec!["web".to_string()],
			..Default::default()
		};
		vpn.set_kind(Some(VpnKind::Newt));

		let project = Project {
			services: vec![ServiceConfig::new("web", "nginx")],
			networks: vec![NetworkConfig {
				driver: "bridge".to_string(),
				..NetworkConfig::new("newt")
			}],
			vpn,
			..Default::default()
		};

		let document = compose_document(&project);
		let newt = document["networks"].as_map().unwrap()["newt"]
			.as_map()
			.unwrap();

		assert_eq!(newt["driver"].as_str(), Some("bridge"));
		assert!(!newt.contains_key("external"));
	}
}
