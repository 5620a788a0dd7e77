use serde_json::{Map, Value, json};

use super::TailscaleConfig;

// Escaped so that compose leaves it to the tailscale container to expand
const CERT_DOMAIN_VARIABLE: &str = "$${TS_CERT_DOMAIN}";

/// Builds the Tailscale Serve configuration that proxies the external port to the target service.
///
/// The output is a starting point. Setups with several handlers or funnels need manual edits.
pub fn serve_config_json(ts: &TailscaleConfig) -> String {
	let domain = if ts.cert_domain.is_empty() {
		CERT_DOMAIN_VARIABLE
	} else {
		ts.cert_domain.as_str()
	};

	let host = format!("{domain}:{}", ts.serve_external_port);
	let path = if ts.serve_path.is_empty() {
		"/"
	} else {
		ts.serve_path.as_str()
	};
	let proxy = format!(
		"{}://127.0.0.1:{}",
		ts.serve_inside_protocol.as_str(),
		ts.serve_internal_port
	);

	let mut tcp = Map::new();
	tcp.insert(
		ts.serve_external_port.clone(),
		json!({ ts.serve_protocol.as_str(): true }),
	);

	let mut web = Map::new();
	web.insert(
		host.clone(),
		json!({ "Handlers": { path: { "Proxy": proxy } } }),
	);

	let mut funnel = Map::new();
	funnel.insert(host, Value::Bool(false));

	let config = json!({
		"TCP": tcp,
		"Web": web,
		"AllowFunnel": funnel,
	});

	serde_json::to_string_pretty(&config).unwrap_or_default()
}
