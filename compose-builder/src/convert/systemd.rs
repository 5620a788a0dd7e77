use std::fmt::Write;

use crate::model::{RestartPolicy, ServiceConfig};

fn systemd_restart(restart: Option<RestartPolicy>) -> &'static str {
	match restart {
		Some(RestartPolicy::Always) => "always",
		Some(RestartPolicy::UnlessStopped) => "on-failure",
		_ => "no",
	}
}

/// Builds a systemd unit that starts and stops the service's container.
///
/// The container must already exist, as the unit only wraps `docker start` and `docker stop`.
pub fn to_systemd(service: &ServiceConfig) -> String {
	let container = service.runtime_name();
	let mut unit = String::new();

	// Writing to a String cannot fail
	let _ = writeln!(unit, "[Unit]");
	let _ = writeln!(unit, "Description={container} container");
	let _ = writeln!(unit, "Requires=docker.service");
	let _ = writeln!(unit, "After=docker.service");
	let _ = writeln!(unit);
	let _ = writeln!(unit, "[Service]");
	let _ = writeln!(unit, "Type=oneshot");
	let _ = writeln!(unit, "RemainAfterExit=yes");
	let _ = writeln!(unit, "ExecStart=/usr/bin/docker start {container}");
	let _ = writeln!(unit, "ExecStop=/usr/bin/docker stop {container}");
	let _ = writeln!(unit, "Restart={}", systemd_restart(service.restart));
	let _ = writeln!(unit);
	let _ = writeln!(unit, "[Install]");
	let _ = writeln!(unit, "WantedBy=multi-user.target");

	unit
}

#[cfg(test)]
mod test {
	use indoc::indoc;
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn unit_file() {
		let service = ServiceConfig {
			container_name: "my-web".to_string(),
			restart: Some(RestartPolicy::UnlessStopped),
			..ServiceConfig::new("web", "nginx")
		};

		assert_eq!(
			to_systemd(&service),
			indoc! {"
        [Unit]
        Description=my-web container
        Requires=docker.service
        After=docker.service

        [Service]
        Type=oneshot
        RemainAfterExit=yes
        ExecStart=/usr/bin/docker start my-web
        ExecStop=/usr/bin/docker stop my-web
        Restart=on-failure

        [Install]
        WantedBy=multi-user.target
      "}
		);
	}

	#[test]
	fn restart_mapping() {
		assert_eq!(systemd_restart(Some(RestartPolicy::Always)), "always");
		assert_eq!(systemd_restart(Some(RestartPolicy::OnFailure)), "no");
		assert_eq!(systemd_restart(None), "no");
	}
}
