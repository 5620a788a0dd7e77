use std::{fmt::Write, sync::LazyLock};

use regex::Regex;

use super::{Mapping, Node};

const INDENT: usize = 2;

static NUMBER_LIKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[-+]?(?:[0-9][0-9_]*(?:\.[0-9_]*)?(?:[eE][-+]?[0-9]+)?|\.[0-9]+|0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|\.inf|\.Inf|\.INF|\.nan|\.NaN|\.NAN)$",
	)
	.expect("Failed to compile the number regex")
});

static SEXAGESIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+(?:\.[0-9_]*)?$")
		.expect("Failed to compile the sexagesimal regex")
});

const RESERVED_WORDS: &[&str] = &[
	"true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

/// Renders a document as YAML, with 2-space indentation and sequences indented under their key.
pub fn emit(document: &Mapping) -> String {
	let mut out = String::new();

	write_mapping(&mut out, document, 0);

	out
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize) {
	for (key, value) in map {
		pad(out, indent);
		out.push_str(&scalar(key));
		out.push(':');
		write_value(out, value, indent);
	}
}

// Writes whatever follows `key:` or `-`, including the trailing newline.
fn write_value(out: &mut String, value: &Node, indent: usize) {
	match value {
		Node::Map(map) if map.is_empty() => out.push_str(" {}\n"),
		Node::Map(map) => {
			out.push('\n');
			write_mapping(out, map, indent + INDENT);
		}
		Node::Seq(items) if items.is_empty() => out.push_str(" []\n"),
		Node::Seq(items) => {
			out.push('\n');
			write_sequence(out, items, indent + INDENT);
		}
		Node::Str(s) if fits_literal_block(s) => write_block(out, s, indent + INDENT),
		_ => {
			out.push(' ');
			out.push_str(&inline(value));
			out.push('\n');
		}
	}
}

fn write_sequence(out: &mut String, items: &[Node], indent: usize) {
	for item in items {
		match item {
			Node::Map(map) if !map.is_empty() => {
				// The first key sits on the dash line and the rest align with it
				let mut nested = String::new();
				write_mapping(&mut nested, map, indent + INDENT);

				pad(out, indent);
				out.push_str("- ");
				out.push_str(&nested[indent + INDENT..]);
			}
			_ => {
				pad(out, indent);
				out.push('-');
				write_value(out, item, indent);
			}
		}
	}
}

// Block scalars cannot escape anything, and an all-newline body would be clipped away.
fn fits_literal_block(s: &str) -> bool {
	s.contains('\n')
		&& s.chars().any(|c| c != '\n')
		&& !s.chars().any(|c| {
			(c.is_control() && c != '\n' && c != '\t')
				|| matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
		})
}

fn write_block(out: &mut String, text: &str, indent: usize) {
	let body = text.trim_end_matches('\n');
	let trailing_newlines = text.len() - body.len();

	let chomping = match trailing_newlines {
		0 => "-",
		1 => "",
		_ => "+",
	};
	let indicator = if body.trim_start_matches('\n').starts_with(' ') {
		"2"
	} else {
		""
	};

	let _ = writeln!(out, " |{indicator}{chomping}");

	for line in body.split('\n') {
		if !line.is_empty() {
			pad(out, indent);
			out.push_str(line);
		}
		out.push('\n');
	}

	for _ in 1..trailing_newlines {
		out.push('\n');
	}
}

fn inline(value: &Node) -> String {
	match value {
		Node::Str(s) => scalar(s),
		Node::Quoted(s) => double_quoted(s),
		Node::Int(i) => i.to_string(),
		Node::Bool(b) => b.to_string(),
		Node::Inline(items) => {
			let items: Vec<String> = items.iter().map(|i| double_quoted(i)).collect();
			format!("[{}]", items.join(", "))
		}
		Node::Seq(items) => {
			let items: Vec<String> = items.iter().map(inline).collect();
			format!("[{}]", items.join(", "))
		}
		Node::Map(map) => {
			let entries: Vec<String> = map
				.iter()
				.map(|(k, v)| format!("{}: {}", scalar(k), inline(v)))
				.collect();
			format!("{{{}}}", entries.join(", "))
		}
	}
}

fn double_quoted(s: &str) -> String {
	// A JSON string is also a valid YAML double-quoted scalar
	serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn scalar(s: &str) -> String {
	if needs_quotes(s) {
		double_quoted(s)
	} else {
		s.to_string()
	}
}

/// Whether a string would be read back as something else (or not at all) if written plain.
pub(crate) fn needs_quotes(s: &str) -> bool {
	if s.is_empty() || s.trim() != s {
		return true;
	}

	let lower = s.to_ascii_lowercase();

	if RESERVED_WORDS.contains(&lower.as_str())
		|| NUMBER_LIKE_REGEX.is_match(s)
		|| SEXAGESIMAL_REGEX.is_match(s)
	{
		return true;
	}

	let first = s.chars().next().unwrap_or_default();

	if matches!(
		first,
		'[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
	) {
		return true;
	}

	if matches!(first, '-' | '?' | ':') && (s.len() == 1 || s[1..].starts_with(' ')) {
		return true;
	}

	s.contains(": ")
		|| s.contains(" #")
		|| s.ends_with(':')
		|| s.chars().any(|c| c.is_control())
}

fn pad(out: &mut String, indent: usize) {
	out.extend(std::iter::repeat_n(' ', indent));
}

#[cfg(test)]
mod test {
	use indexmap::indexmap;
	use indoc::indoc;
	use pretty_assertions::assert_eq;

	use super::*;

	fn map(entries: Vec<(&str, Node)>) -> Node {
		Node::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.to_string(), v))
				.collect(),
		)
	}

	#[test]
	fn nested_layout() {
		let document: Mapping = indexmap! {
			"services".to_string() => map(vec![
				("web", map(vec![
					("image", Node::str("nginx:latest")),
					("command", Node::Inline(vec!["npm".to_string(), "run dev".to_string()])),
					("ports", Node::Seq(vec![Node::quoted("80:80/tcp")])),
					("privileged", Node::Bool(true)),
					("volumes", Node::Seq(vec![map(vec![
						("type", Node::str("bind")),
						("source", Node::str("./data")),
						("target", Node::str("/data")),
					])])),
				])),
			]),
			"networks".to_string() => map(vec![("default", map(vec![]))]),
		};

		assert_eq!(
			emit(&document),
			indoc! {r#"
        services:
          web:
            image: nginx:latest
            command: ["npm", "run dev"]
            ports:
              - "80:80/tcp"
            privileged: true
            volumes:
              - type: bind
                source: ./data
                target: /data
        networks:
          default: {}
      "#}
		);
	}

	#[test]
	fn ambiguous_scalars_are_quoted() {
		for value in [
			"", "true", "No", "null", "~", "42", "-1.5", "1e3", "0x1F", "22:22", "@scope", "- item",
			"key: value", "value #comment", "trailing:", " padded",
		] {
			assert!(needs_quotes(value), "{value:?} should be quoted");
		}

		for value in [
			"nginx:latest",
			"service:tailscale",
			"${TS_AUTHKEY}",
			"TS_AUTHKEY=${TS_AUTHKEY}",
			"/dev/net/tun:/dev/net/tun",
			"--no-autoupdate",
			"1.2.3",
		] {
			assert!(!needs_quotes(value), "{value:?} should stay plain");
		}
	}

	#[test]
	fn multiline_strings_use_literal_blocks() -> Result<(), Box<dyn std::error::Error>> {
		let document: Mapping = indexmap! {
			"content".to_string() => Node::str("{\n  \"TCP\": {}\n}"),
			"script".to_string() => Node::str("echo one\n\necho two\n"),
		};

		let output = emit(&document);

		assert_eq!(
			output,
			"content: |-\n  {\n    \"TCP\": {}\n  }\nscript: |\n  echo one\n\n  echo two\n"
		);

		let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&output)?;
		assert_eq!(parsed["content"].as_str(), Some("{\n  \"TCP\": {}\n}"));
		assert_eq!(parsed["script"].as_str(), Some("echo one\n\necho two\n"));

		Ok(())
	}

	#[test]
	fn quoted_output_reads_back_as_strings() -> Result<(), Box<dyn std::error::Error>> {
		let values = ["yes", "8080", "12:30", "#hash", "tab\there", "\"quoted\"", "a: b"];
		let document: Mapping = values
			.iter()
			.enumerate()
			.map(|(i, v)| (format!("k{i}"), Node::str(*v)))
			.collect();

		let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&emit(&document))?;

		for (i, value) in values.iter().enumerate() {
			assert_eq!(parsed[format!("k{i}").as_str()].as_str(), Some(*value));
		}

		Ok(())
	}

	#[test]
	fn unsafe_multiline_strings_are_double_quoted() -> Result<(), Box<dyn std::error::Error>> {
		let values = ["a\u{7}\nb", "\n", "\n\n", "x\r\ny"];
		let document: Mapping = values
			.iter()
			.enumerate()
			.map(|(i, v)| (format!("k{i}"), Node::str(*v)))
			.collect();

		let output = emit(&document);

		assert_eq!(output, "k0: \"a\\u0007\\nb\"\nk1: \"\\n\"\nk2: \"\\n\\n\"\nk3: \"x\\r\\ny\"\n");

		let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&output)?;

		for (i, value) in values.iter().enumerate() {
			assert_eq!(parsed[format!("k{i}").as_str()].as_str(), Some(*value));
		}

		Ok(())
	}
}
