use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?:[^\s"']+|"[^"]*"|'[^']*'|["'])+"#).expect("Failed to compile the token regex")
});

static QUOTED_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#""([^"]*)"|'([^']*)'|([^"']+|["'])"#)
		.expect("Failed to compile the quoted run regex")
});

/// Splits a raw command into its arguments.
///
/// A JSON array (`["a", "b c"]`) is taken as is. Anything else is split on whitespace like a
/// shell would, so that `"…"` and `'…'` runs stay in one token and lose their quotes.
pub fn tokenize(raw: &str) -> Vec<String> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return vec![];
	}

	if trimmed.starts_with('[')
		&& let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed)
	{
		return items
			.into_iter()
			.map(|item| match item {
				Value::String(s) => s,
				other => other.to_string(),
			})
			.collect();
	}

	TOKEN_REGEX
		.find_iter(trimmed)
		.map(|token| unquote(token.as_str()))
		.collect()
}

fn unquote(token: &str) -> String {
	QUOTED_RUN_REGEX
		.captures_iter(token)
		.filter_map(|caps| caps.iter().skip(1).flatten().next())
		.map(|run| run.as_str())
		.collect()
}

/// Renders a list of arguments back into a raw command that [`tokenize`] reads as the same list.
///
/// Uses the JSON array form whenever a plain space-separated join would be ambiguous.
pub fn join_tokens(tokens: &[String]) -> String {
	let needs_json = tokens.iter().any(|t| {
		t.is_empty() || t.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'')
	}) || tokens.first().is_some_and(|t| t.starts_with('['));

	if needs_json {
		serde_json::to_string(tokens).unwrap_or_default()
	} else {
		tokens.join(" ")
	}
}
