use indexmap::IndexMap;

use crate::{model::ServiceConfig, vpn::VpnConfig};

/// Collects the environment of every service, followed by the VPN secrets, into a `.env` file.
///
/// When a key appears more than once, the first value wins.
pub fn generate_env_file(services: &[ServiceConfig], vpn: &VpnConfig) -> String {
	let mut vars: IndexMap<String, String> = IndexMap::new();

	let service_vars = services
		.iter()
		.flat_map(|s| &s.environment)
		.filter(|kv| !kv.key.is_empty())
		.map(|kv| (kv.key.clone(), kv.value.clone()));

	for (key, value) in service_vars.chain(vpn.env_entries()) {
		vars.entry(key).or_insert(value);
	}

	let mut output: String = vars
		.iter()
		.map(|(key, value)| format!("{key}={value}"))
		.collect::<Vec<_>>()
		.join("\n");

	if !output.is_empty() {
		output.push('\n');
	}

	output
}
