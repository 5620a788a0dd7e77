use std::sync::LazyLock;

use regex::Regex;

pub const REDACTED: &str = "***REDACTED***";

static SECRET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?im)(?P<lead>^|[\s"'{,\[])(?P<key>[A-Za-z0-9_.-]*(?:password|passwd|secret|api[_-]?key|token|auth[_-]?token|access[_-]?key|private[_-]?key)[A-Za-z0-9_.-]*)(?P<sep>["']?(?:[ \t]*=[ \t]*|[ \t]*:[ \t]+))(?P<value>"[^"\n]*"|'[^'\n]*'|[^\s"'#|>\n](?:[^"'\n#]*[^\s"'#\n])?)"#,
	)
	.expect("Failed to compile the secret regex")
});

fn redacted_value(value: &str, sep: &str) -> String {
	if value.starts_with('"') || value.starts_with('\'') {
		let quote = &value[..1];
		format!("{quote}{REDACTED}{quote}")
	} else if sep.contains(':') {
		// A bare *** would be read as an alias
		format!("\"{REDACTED}\"")
	} else {
		REDACTED.to_string()
	}
}

// Whether `at` sits inside a `{...}` or `[...]` opened earlier on the same line.
fn in_flow_collection(text: &str, at: usize) -> bool {
	let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);

	let mut depth = 0usize;
	let mut quote: Option<char> = None;

	for c in text[line_start..at].chars() {
		match (quote, c) {
			(Some(q), c) if c == q => quote = None,
			(Some(_), _) => {}
			(None, '"' | '\'') => quote = Some(c),
			(None, '{' | '[') => depth += 1,
			(None, '}' | ']') => depth = depth.saturating_sub(1),
			_ => {}
		}
	}

	depth > 0
}

/// Replaces the values of secret-looking keys in the text.
///
/// Both `key: value` and `key=value` assignments are recognized, with or without quotes.
/// Keys, quotes and the rest of the text are kept as they are. Inside flow collections
/// an unquoted value ends at the next `,`, `}` or `]`.
pub fn redact(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut pos = 0;

	while let Some(caps) = SECRET_REGEX.captures_at(text, pos) {
		let (Some(whole), Some(value)) = (caps.get(0), caps.name("value")) else {
			break;
		};

		let mut value_text = value.as_str();

		if !value_text.starts_with(['"', '\'']) && in_flow_collection(text, value.start()) {
			let cut = value_text
				.find([',', '}', ']'])
				.unwrap_or(value_text.len());
			value_text = value_text[..cut].trim_end();
		}

		out.push_str(&text[pos..whole.start()]);
		out.push_str(&caps["lead"]);
		out.push_str(&caps["key"]);
		out.push_str(&caps["sep"]);

		if !value_text.is_empty() {
			out.push_str(&redacted_value(value_text, &caps["sep"]));
		}

		pos = value.start() + value_text.len();
	}

	out.push_str(&text[pos..]);

	out
}
