use tracing::debug;

use super::{
	CloudflaredConfig, NetbirdConfig, NewtConfig, TailscaleConfig, VpnConfig, VpnProvider,
	WireguardConfig, ZerotierConfig, serve_config_json,
};
use crate::model::{
	Healthcheck, KeyValue, NetworkConfig, RestartPolicy, ServiceConfig, TriState, VolumeConfig,
	VolumeMount,
};

const SERVE_CONFIG_NAME: &str = "ts-serve";
const SERVE_CONFIG_TARGET: &str = "/config/serve.json";

/// A config from the top-level `configs` element, with its content inlined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineConfig {
	pub name: String,
	pub content: String,
}

/// A reference from a service to a top-level config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigMount {
	pub source: String,
	pub target: String,
}

/// Everything that the VPN adds to a compose file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sidecar {
	pub service: ServiceConfig,
	/// Configs mounted into the sidecar service.
	pub configs: Vec<ConfigMount>,
	pub top_level_configs: Vec<InlineConfig>,
	/// Volumes that the sidecar needs to exist at the top level.
	pub volumes: Vec<VolumeConfig>,
	/// Networks that the sidecar needs to exist at the top level.
	pub networks: Vec<NetworkConfig>,
}

impl Sidecar {
	fn new(name: &str, image: &str, vpn: &VpnConfig) -> Self {
		let service = ServiceConfig {
			restart: Some(RestartPolicy::UnlessStopped),
			networks: vpn.networks.clone(),
			..ServiceConfig::new(name, image)
		};

		Self {
			service,
			configs: vec![],
			top_level_configs: vec![],
			volumes: vec![],
			networks: vec![],
		}
	}

	fn env(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();

		if !value.is_empty() {
			self.service.environment.push(KeyValue::new(key, value));
		}
	}

	fn placeholder(&mut self, key: &str) {
		self.env(key, format!("${{{key}}}"));
	}
}

fn flag(value: bool) -> &'static str {
	if value { "true" } else { "false" }
}

/// Derives the sidecar service, and the top-level elements it depends on, from the VPN settings.
///
/// Returns `None` when the VPN is disabled. Secrets are always written as `${VAR}` references.
pub fn synthesize(vpn: &VpnConfig) -> Option<Sidecar> {
	let provider = vpn.provider.as_ref().filter(|_| vpn.enabled)?;

	let sidecar = match provider {
		VpnProvider::Tailscale(ts) => tailscale(ts, vpn),
		VpnProvider::Newt(newt) => newt_sidecar(newt, vpn),
		VpnProvider::Cloudflared(cf) => cloudflared(cf, vpn),
		VpnProvider::Wireguard(wg) => wireguard(wg, vpn),
		VpnProvider::Zerotier(zt) => zerotier(zt, vpn),
		VpnProvider::Netbird(nb) => netbird(nb, vpn),
	};

	debug!(
		"Synthesized the `{}` sidecar for {} service(s)",
		sidecar.service.name,
		vpn.services_using_vpn.len()
	);

	Some(sidecar)
}

fn tailscale(ts: &TailscaleConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("tailscale", "tailscale/tailscale:latest", vpn);

	sidecar.service.privileged = TriState::True;
	sidecar.service.volumes = vec![
		VolumeMount::new("tailscale", "/var/lib/tailscale"),
		VolumeMount::new("/dev/net/tun", "/dev/net/tun"),
	];
	sidecar.volumes.push(VolumeConfig::new("tailscale"));

	sidecar.placeholder("TS_AUTHKEY");
	sidecar.env("TS_HOSTNAME", ts.hostname.as_str());
	sidecar.env("TS_STATE_DIR", "/var/lib/tailscale");
	sidecar.env("TS_ACCEPT_DNS", flag(ts.accept_dns));
	sidecar.env("TS_AUTH_ONCE", flag(ts.auth_once));
	sidecar.env("TS_USERSPACE", flag(ts.userspace));

	if !ts.exit_node.is_empty() {
		let mut extra_args = format!("--exit-node={}", ts.exit_node);

		if ts.exit_node_allow_lan {
			extra_args.push_str(" --exit-node-allow-lan-access");
		}

		sidecar.env("TS_EXTRA_ARGS", extra_args);
	}

	if ts.enable_serve && !ts.serve_target_service.is_empty() {
		sidecar.env("TS_SERVE_CONFIG", SERVE_CONFIG_TARGET);
		sidecar.configs.push(ConfigMount {
			source: SERVE_CONFIG_NAME.to_string(),
			target: SERVE_CONFIG_TARGET.to_string(),
		});
		sidecar.top_level_configs.push(InlineConfig {
			name: SERVE_CONFIG_NAME.to_string(),
			content: serve_config_json(ts),
		});
	}

	sidecar
}

fn newt_sidecar(newt: &NewtConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("newt", "fosrl/newt:latest", vpn);

	sidecar.env("PANGOLIN_ENDPOINT", newt.endpoint.as_str());
	sidecar.placeholder("NEWT_ID");
	sidecar.placeholder("NEWT_SECRET");

	if !newt.network_name.is_empty() {
		if !sidecar.service.networks.contains(&newt.network_name) {
			sidecar.service.networks.push(newt.network_name.clone());
		}

		sidecar
			.networks
			.push(NetworkConfig::external(newt.network_name.as_str()));
	}

	sidecar
}

fn cloudflared(cf: &CloudflaredConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("cloudflared", "cloudflare/cloudflared:latest", vpn);

	sidecar.service.command = if cf.no_autoupdate {
		"--no-autoupdate tunnel run".to_string()
	} else {
		"tunnel run".to_string()
	};
	sidecar.placeholder("TUNNEL_TOKEN");

	sidecar
}

fn wireguard(wg: &WireguardConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("wireguard", "lscr.io/linuxserver/wireguard:latest", vpn);

	sidecar.service.cap_add = vec!["NET_ADMIN".to_string(), "SYS_MODULE".to_string()];
	sidecar.service.sysctls = vec![KeyValue::new("net.ipv4.conf.all.src_valid_mark", "1")];

	if !wg.config_path.is_empty() {
		sidecar.service.volumes = vec![VolumeMount::new(wg.config_path.as_str(), "/config")];
	}

	if !wg.interface_name.is_empty() {
		sidecar.service.healthcheck = Some(Healthcheck {
			test: format!("CMD wg show {}", wg.interface_name),
			interval: "30s".to_string(),
			timeout: "10s".to_string(),
			retries: "3".to_string(),
			..Default::default()
		});
	}

	sidecar
}

fn zerotier(zt: &ZerotierConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("zerotier", "zerotier/zerotier:latest", vpn);

	sidecar.service.privileged = TriState::True;
	sidecar.service.network_mode = "host".to_string();
	// Host networking excludes any other network
	sidecar.service.networks.clear();
	sidecar.service.devices = vec!["/dev/net/tun".to_string()];
	sidecar.service.command.clone_from(&zt.network_id);

	if !zt.identity_path.is_empty() {
		sidecar.service.volumes = vec![VolumeMount::new(
			zt.identity_path.as_str(),
			"/var/lib/zerotier-one",
		)];
	}

	sidecar
}

fn netbird(nb: &NetbirdConfig, vpn: &VpnConfig) -> Sidecar {
	let mut sidecar = Sidecar::new("netbird", "netbirdio/netbird:latest", vpn);

	sidecar.service.privileged = TriState::True;
	sidecar.service.cap_add = vec![
		"NET_ADMIN".to_string(),
		"SYS_ADMIN".to_string(),
		"SYS_RESOURCE".to_string(),
	];
	sidecar.service.sysctls = vec![
		KeyValue::new("net.ipv4.ip_forward", "1"),
		KeyValue::new("net.ipv6.conf.all.forwarding", "1"),
	];
	sidecar.service.volumes = vec![VolumeMount::new("netbird-client", "/etc/netbird")];
	sidecar.volumes.push(VolumeConfig::new("netbird-client"));

	sidecar.placeholder("NB_SETUP_KEY");
	sidecar.env("NB_MANAGEMENT_URL", nb.management_url.as_str());

	sidecar
}

// Names are compared trimmed, the way they are written as compose keys.
fn opted_in(vpn: &VpnConfig, service_name: &str) -> bool {
	let name = service_name.trim();

	vpn
		.services_using_vpn
		.iter()
		.any(|s| s.trim() == name)
}

/// Whether the service shares the network namespace of the sidecar.
pub fn uses_network_mode(vpn: &VpnConfig, service_name: &str) -> bool {
	vpn.kind().is_some_and(|kind| kind.uses_network_mode()) && opted_in(vpn, service_name)
}

/// The `network_mode` value for services routed through the sidecar, as in `service:tailscale`.
pub fn network_mode_target(vpn: &VpnConfig) -> Option<String> {
	vpn
		.kind()
		.filter(|kind| kind.uses_network_mode())
		.map(|kind| format!("service:{}", kind.service_name()))
}

/// Applies the VPN routing to a service that opted into it.
///
/// Services sharing the sidecar's network namespace lose their ports and networks,
/// while newt services join the newt network and keep the rest.
pub fn route_service(vpn: &VpnConfig, service: &ServiceConfig) -> ServiceConfig {
	let mut routed = service.clone();

	let Some(kind) = vpn.kind() else {
		return routed;
	};

	if !opted_in(vpn, &service.name) || service.name.trim() == kind.service_name() {
		return routed;
	}

	if let Some(target) = network_mode_target(vpn) {
		routed.ports.clear();
		routed.networks.clear();
		routed.network_mode = target;

		let sidecar_name = kind.service_name().to_string();
		if !routed.depends_on.contains(&sidecar_name) {
			routed.depends_on.push(sidecar_name);
		}
	} else if let Some(VpnProvider::Newt(newt)) = &vpn.provider
		&& !newt.network_name.is_empty()
		&& !routed.networks.contains(&newt.network_name)
	{
		routed.networks.push(newt.network_name.clone());
	}

	routed
}
