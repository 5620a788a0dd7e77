use crate::{
	model::{Protocol, ServiceConfig},
	tokenize::tokenize,
};

/// Quotes an argument for a POSIX shell when it contains anything a shell would split or expand.
pub(crate) fn shell_quote(arg: &str) -> String {
	let is_plain = !arg.is_empty()
		&& arg.chars().all(|c| {
			c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '@' | '+' | '%')
		});

	if is_plain {
		arg.to_string()
	} else {
		format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
	}
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
	let value = value.trim();

	if !value.is_empty() {
		args.push(flag.to_string());
		args.push(shell_quote(value));
	}
}

/// Builds the `docker run` command that starts the service on its own.
pub fn to_docker_run(service: &ServiceConfig) -> String {
	let mut args: Vec<String> = vec!["docker".to_string(), "run".to_string()];

	push_flag(&mut args, "--name", service.runtime_name());

	if let Some(restart) = service.restart {
		push_flag(&mut args, "--restart", restart.as_str());
	}

	for port in &service.ports {
		if port.container.is_empty() {
			continue;
		}

		let mut mapping = if port.host.is_empty() {
			port.container.clone()
		} else {
			format!("{}:{}", port.host, port.container)
		};

		if port.protocol == Protocol::Udp {
			mapping.push_str("/udp");
		}

		push_flag(&mut args, "-p", &mapping);
	}

	for mount in &service.volumes {
		if mount.container.is_empty() {
			continue;
		}

		let mut volume = if mount.host.is_empty() {
			mount.container.clone()
		} else {
			format!("{}:{}", mount.host, mount.container)
		};

		if mount.read_only {
			volume.push_str(":ro");
		}

		push_flag(&mut args, "-v", &volume);
	}

	for var in service.environment.iter().filter(|kv| !kv.key.is_empty()) {
		push_flag(&mut args, "-e", &format!("{}={}", var.key, var.value));
	}

	push_flag(&mut args, "--user", &service.user);
	push_flag(&mut args, "-w", &service.working_dir);

	if service.privileged.is_true() {
		args.push("--privileged".to_string());
	}

	if service.read_only.is_true() {
		args.push("--read-only".to_string());
	}

	push_flag(&mut args, "--shm-size", &service.shm_size);

	for opt in &service.security_opt {
		push_flag(&mut args, "--security-opt", opt);
	}

	for host in &service.extra_hosts {
		push_flag(&mut args, "--add-host", host);
	}

	for dns in &service.dns {
		push_flag(&mut args, "--dns", dns);
	}

	match service.networks.first() {
		Some(network) => push_flag(&mut args, "--network", network),
		None => push_flag(&mut args, "--network", &service.network_mode),
	}

	if !service.image.is_empty() {
		args.push(shell_quote(&service.image));
	}

	let command = service.command.trim();

	if command.starts_with('[') {
		args.extend(tokenize(command).iter().map(|t| shell_quote(t)));
	} else if !command.is_empty() {
		args.push(command.to_string());
	}

	args.join(" ")
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::model::{KeyValue, PortMapping, RestartPolicy, TriState, VolumeMount};

	#[test]
	fn full_command() {
		let service = ServiceConfig {
			container_name: "proxy".to_string(),
			restart: Some(RestartPolicy::UnlessStopped),
			ports: vec![
				PortMapping::new("80", "80", Protocol::Tcp),
				PortMapping::new("53", "53", Protocol::Udp),
			],
			volumes: vec![VolumeMount {
				read_only: true,
				..VolumeMount::new("./conf", "/etc/nginx")
			}],
			environment: vec![KeyValue::new("GREETING", "hello world")],
			privileged: TriState::True,
			networks: vec!["front".to_string(), "back".to_string()],
			command: r#"["nginx", "-g", "daemon off;"]"#.to_string(),
			..ServiceConfig::new("web", "nginx:latest")
		};

		assert_eq!(
			to_docker_run(&service),
			r#"docker run --name proxy --restart unless-stopped -p 80:80 -p 53:53/udp -v ./conf:/etc/nginx:ro -e "GREETING=hello world" --privileged --network front nginx:latest nginx -g "daemon off;""#
		);
	}

	#[test]
	fn raw_commands_pass_through() {
		let service = ServiceConfig {
			command: "redis-server --appendonly yes".to_string(),
			..ServiceConfig::new("cache", "redis")
		};

		assert_eq!(
			to_docker_run(&service),
			"docker run --name cache redis redis-server --appendonly yes"
		);
	}
}
