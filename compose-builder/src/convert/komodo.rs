use toml_edit::{Array, DocumentMut, Item, Table, Value as TomlValue};
use tracing::warn;

use crate::{
	import::parse_compose_template,
	model::{ListSyntax, ServiceConfig},
	serialize::{port_mapping, volume_string},
};

const HEADER: &str = "# Komodo configuration generated from docker-compose.yml\n# Review it before use, some settings may need manual adjustment\n\n";

fn format_array(arr: &mut Array) {
	const MAX_INLINE_ITEMS: usize = 4;
	const MAX_INLINE_CHARS: usize = 50;

	let total_chars: usize = arr
		.iter()
		.map(|item| item.to_string().len())
		.sum();

	if arr.len() > MAX_INLINE_ITEMS || total_chars > MAX_INLINE_CHARS {
		for item in arr.iter_mut() {
			item.decor_mut().set_prefix("\n\t");
		}

		arr.set_trailing_comma(true);
		arr.set_trailing("\n");
	} else {
		arr.fmt();
	}
}

fn toml_string_list(items: impl IntoIterator<Item = String>) -> Option<Item> {
	let mut arr: Array = items.into_iter().collect();

	if arr.is_empty() {
		return None;
	}

	format_array(&mut arr);

	Some(Item::Value(TomlValue::Array(arr)))
}

fn service_table(service: &ServiceConfig) -> Table {
	let mut table = Table::new();

	for (key, value) in [
		("image", service.image.as_str()),
		("container_name", service.container_name.as_str()),
		("restart", service.restart.map_or("", |r| r.as_str())),
	] {
		if !value.is_empty() {
			table.insert(key, toml_edit::value(value));
		}
	}

	if let Some(ports) = toml_string_list(service.ports.iter().filter_map(port_mapping)) {
		table.insert("ports", ports);
	}

	if let Some(volumes) = toml_string_list(service.volumes.iter().filter_map(volume_string)) {
		table.insert("volumes", volumes);
	}

	let vars = service.environment.iter().filter(|kv| !kv.key.is_empty());

	match service.environment_syntax {
		ListSyntax::Array => {
			if let Some(env) = toml_string_list(vars.map(|kv| format!("{}={}", kv.key, kv.value))) {
				table.insert("environment", env);
			}
		}
		ListSyntax::Dict => {
			let mut env = Table::new();
			env.set_dotted(true);

			for var in vars {
				env.insert(&var.key, toml_edit::value(var.value.as_str()));
			}

			if !env.is_empty() {
				table.insert("environment", Item::Table(env));
			}
		}
	}

	table
}

fn placeholder(error: &str) -> String {
	let error = error.replace('\n', " ");

	format!(
		"{HEADER}# Could not read the compose file: {error}\n#\n# [service_name]\n# image = \"image:tag\"\n# ports = [\"8080:80\"]\n# volumes = [\"./data:/data\"]\n"
	)
}

/// Converts compose YAML into a Komodo TOML file, with one table per service.
///
/// The conversion is best effort. When the YAML cannot be read, the output is a commented
/// placeholder with the reason.
pub fn generate_komodo_toml(yaml: &str) -> String {
	let template = match parse_compose_template(yaml) {
		Ok(template) => template,
		Err(e) => {
			warn!("Could not generate the Komodo configuration: {e}");
			return placeholder(&e.to_string());
		}
	};

	let mut document = DocumentMut::new();

	for service in template.services.iter().filter(|s| s.is_named()) {
		document.insert(&service.name, Item::Table(service_table(service)));
	}

	format!("{HEADER}{document}")
}
