//! VPN sidecar settings and the service definitions derived from them.

mod serve;
mod synth;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use serve::serve_config_json;
pub use synth::*;

/// The VPN sidecar of a project. At most one provider is active at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct VpnConfig {
	pub enabled: bool,
	/// The active provider and its settings.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub provider: Option<VpnProvider>,
	/// The names of the services that route their traffic through the sidecar.
	pub services_using_vpn: Vec<String>,
	/// The networks that the sidecar joins.
	pub networks: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum VpnKind {
	Tailscale,
	Newt,
	Cloudflared,
	Wireguard,
	Zerotier,
	Netbird,
}

impl VpnKind {
	/// The name of the sidecar service.
	pub const fn service_name(&self) -> &'static str {
		match self {
			Self::Tailscale => "tailscale",
			Self::Newt => "newt",
			Self::Cloudflared => "cloudflared",
			Self::Wireguard => "wireguard",
			Self::Zerotier => "zerotier",
			Self::Netbird => "netbird",
		}
	}

	/// Whether opted-in services share the network namespace of the sidecar.
	pub const fn uses_network_mode(&self) -> bool {
		matches!(self, Self::Tailscale | Self::Cloudflared)
	}

	pub fn default_provider(self) -> VpnProvider {
		match self {
			Self::Tailscale => VpnProvider::Tailscale(TailscaleConfig::default()),
			Self::Newt => VpnProvider::Newt(NewtConfig::default()),
			Self::Cloudflared => VpnProvider::Cloudflared(CloudflaredConfig::default()),
			Self::Wireguard => VpnProvider::Wireguard(WireguardConfig::default()),
			Self::Zerotier => VpnProvider::Zerotier(ZerotierConfig::default()),
			Self::Netbird => VpnProvider::Netbird(NetbirdConfig::default()),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VpnProvider {
	Tailscale(TailscaleConfig),
	Newt(NewtConfig),
	Cloudflared(CloudflaredConfig),
	Wireguard(WireguardConfig),
	Zerotier(ZerotierConfig),
	Netbird(NetbirdConfig),
}

impl VpnProvider {
	pub const fn kind(&self) -> VpnKind {
		match self {
			Self::Tailscale(_) => VpnKind::Tailscale,
			Self::Newt(_) => VpnKind::Newt,
			Self::Cloudflared(_) => VpnKind::Cloudflared,
			Self::Wireguard(_) => VpnKind::Wireguard,
			Self::Zerotier(_) => VpnKind::Zerotier,
			Self::Netbird(_) => VpnKind::Netbird,
		}
	}
}

impl VpnConfig {
	/// Returns the kind of the active provider, if the sidecar is enabled.
	pub fn kind(&self) -> Option<VpnKind> {
		self
			.provider
			.as_ref()
			.filter(|_| self.enabled)
			.map(VpnProvider::kind)
	}

	/// Switches to another provider.
	///
	/// Selecting the kind that is already active keeps its settings, any other kind starts
	/// from its defaults. `None` disables the sidecar.
	pub fn set_kind(&mut self, kind: Option<VpnKind>) {
		self.enabled = kind.is_some();

		let current = self.provider.as_ref().map(VpnProvider::kind);

		if current != kind {
			self.provider = kind.map(VpnKind::default_provider);
		}
	}

	pub const fn tailscale(&self) -> Option<&TailscaleConfig> {
		if let Some(VpnProvider::Tailscale(config)) = &self.provider {
			Some(config)
		} else {
			None
		}
	}

	pub const fn tailscale_mut(&mut self) -> Option<&mut TailscaleConfig> {
		if let Some(VpnProvider::Tailscale(config)) = &mut self.provider {
			Some(config)
		} else {
			None
		}
	}

	/// Checks the settings that the sidecar needs to start.
	///
	/// These are advisory and never prevent the compose file from being generated.
	pub fn warnings(&self) -> Vec<String> {
		let mut warnings: Vec<String> = Vec::new();

		let Some(provider) = self.provider.as_ref().filter(|_| self.enabled) else {
			return warnings;
		};

		match provider {
			VpnProvider::Tailscale(ts) => {
				if ts.auth_key.is_empty() {
					warnings.push("Tailscale Auth Key is required".to_string());
				}
				if ts.enable_serve && ts.serve_target_service.is_empty() {
					warnings.push("Target service is required when Serve is enabled".to_string());
				}
			}
			VpnProvider::Newt(newt) => {
				if newt.newt_id.is_empty() || newt.newt_secret.is_empty() {
					warnings.push("Newt ID and Secret are required".to_string());
				}
			}
			VpnProvider::Cloudflared(cf) => {
				if cf.tunnel_token.is_empty() {
					warnings.push("Cloudflared Tunnel Token is required".to_string());
				}
			}
			VpnProvider::Zerotier(zt) => {
				if zt.network_id.is_empty() {
					warnings.push("ZeroTier Network ID is required".to_string());
				}
			}
			VpnProvider::Netbird(nb) => {
				if nb.setup_key.is_empty() {
					warnings.push("Netbird Setup Key is required".to_string());
				}
			}
			VpnProvider::Wireguard(_) => {}
		}

		if self.services_using_vpn.is_empty() {
			warnings.push("At least one service must be selected to use VPN".to_string());
		}

		warnings
	}

	/// The secrets typed into the settings, keyed by the variable that the sidecar reads them from.
	///
	/// Empty values and values that are already `${VAR}` references are left out.
	pub fn env_entries(&self) -> Vec<(String, String)> {
		let Some(provider) = self.provider.as_ref().filter(|_| self.enabled) else {
			return vec![];
		};

		let secrets: Vec<(&str, &str)> = match provider {
			VpnProvider::Tailscale(ts) => vec![("TS_AUTHKEY", ts.auth_key.as_str())],
			VpnProvider::Newt(newt) => vec![
				("NEWT_ID", newt.newt_id.as_str()),
				("NEWT_SECRET", newt.newt_secret.as_str()),
			],
			VpnProvider::Cloudflared(cf) => vec![("TUNNEL_TOKEN", cf.tunnel_token.as_str())],
			VpnProvider::Netbird(nb) => vec![("NB_SETUP_KEY", nb.setup_key.as_str())],
			VpnProvider::Wireguard(_) | VpnProvider::Zerotier(_) => vec![],
		};

		secrets
			.into_iter()
			.filter(|(_, value)| !value.is_empty() && !is_placeholder(value))
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect()
	}
}

pub(crate) fn is_placeholder(value: &str) -> bool {
	value.starts_with("${") && value.ends_with('}')
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum ServeProtocol {
	#[default]
	Https,
	Http,
}

impl ServeProtocol {
	pub const fn default_port(&self) -> &'static str {
		match self {
			Self::Https => "443",
			Self::Http => "80",
		}
	}

	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Https => "HTTPS",
			Self::Http => "HTTP",
		}
	}
}

/// The protocol spoken by the target service behind Tailscale Serve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub enum InsideProtocol {
	#[default]
	#[serde(rename = "http")]
	Http,
	#[serde(rename = "https")]
	Https,
	#[serde(rename = "https+insecure")]
	HttpsInsecure,
}

impl InsideProtocol {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Http => "http",
			Self::Https => "https",
			Self::HttpsInsecure => "https+insecure",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TailscaleConfig {
	pub auth_key: String,
	pub hostname: String,
	pub accept_dns: bool,
	pub auth_once: bool,
	pub userspace: bool,
	pub exit_node: String,
	pub exit_node_allow_lan: bool,
	pub enable_serve: bool,
	pub serve_target_service: String,
	pub serve_external_port: String,
	pub serve_internal_port: String,
	pub serve_path: String,
	pub serve_protocol: ServeProtocol,
	pub serve_inside_protocol: InsideProtocol,
	/// The domain used in the serve config. Defaults to the `${TS_CERT_DOMAIN}` variable.
	pub cert_domain: String,
}

impl Default for TailscaleConfig {
	fn default() -> Self {
		Self {
			auth_key: String::new(),
			hostname: String::new(),
			accept_dns: false,
			auth_once: true,
			userspace: false,
			exit_node: String::new(),
			exit_node_allow_lan: false,
			enable_serve: false,
			serve_target_service: String::new(),
			serve_external_port: "443".to_string(),
			serve_internal_port: "8080".to_string(),
			serve_path: "/".to_string(),
			serve_protocol: ServeProtocol::Https,
			serve_inside_protocol: InsideProtocol::Http,
			cert_domain: String::new(),
		}
	}
}

impl TailscaleConfig {
	/// Changes the serve protocol.
	///
	/// The external port follows the protocol (443 or 80) unless it was changed by hand.
	pub fn set_serve_protocol(&mut self, protocol: ServeProtocol) {
		if protocol == self.serve_protocol {
			return;
		}

		if self.serve_external_port.is_empty()
			|| self.serve_external_port == self.serve_protocol.default_port()
		{
			self.serve_external_port = protocol.default_port().to_string();
		}

		self.serve_protocol = protocol;
	}
}

/// Settings for a Pangolin Newt tunnel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct NewtConfig {
	pub endpoint: String,
	pub newt_id: String,
	pub newt_secret: String,
	pub network_name: String,
}

impl Default for NewtConfig {
	fn default() -> Self {
		Self {
			endpoint: String::new(),
			newt_id: String::new(),
			newt_secret: String::new(),
			network_name: "newt".to_string(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct CloudflaredConfig {
	pub tunnel_token: String,
	pub no_autoupdate: bool,
}

impl Default for CloudflaredConfig {
	fn default() -> Self {
		Self {
			tunnel_token: String::new(),
			no_autoupdate: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct WireguardConfig {
	pub config_path: String,
	pub interface_name: String,
}

impl Default for WireguardConfig {
	fn default() -> Self {
		Self {
			config_path: "./wireguard".to_string(),
			interface_name: "wg0".to_string(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct ZerotierConfig {
	pub network_id: String,
	pub identity_path: String,
}

impl Default for ZerotierConfig {
	fn default() -> Self {
		Self {
			network_id: String::new(),
			identity_path: "./zerotier".to_string(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(default)]
pub struct NetbirdConfig {
	pub setup_key: String,
	pub management_url: String,
}
