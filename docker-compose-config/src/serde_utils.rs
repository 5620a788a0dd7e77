use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
#[serde(untagged)]
pub enum StringOrNum {
	Num(i64),
	String(String),
}

impl Display for StringOrNum {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Num(n) => write!(f, "{n}"),
			Self::String(s) => f.write_str(s),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
#[serde(untagged)]
pub enum StringOrList {
	String(String),
	List(Vec<String>),
}

impl StringOrList {
	/// Returns the values as a list. A single string becomes a list with one item.
	pub fn to_vec(&self) -> Vec<String> {
		match self {
			Self::String(s) => vec![s.clone()],
			Self::List(list) => list.clone(),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(untagged)]
pub enum SingleValue {
	String(String),
	Bool(bool),
	Int(i64),
	Float(f64),
}

impl Display for SingleValue {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::String(s) => f.write_str(s),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(fl) => write!(f, "{fl}"),
		}
	}
}

/// A setting that compose accepts either as a list of `KEY=value` strings or as a map.
///
/// The list keeps the order of the source file, which matters for environment variables.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListOrMap {
	List(Vec<String>),
	Map(IndexMap<String, Option<SingleValue>>),
}

impl ListOrMap {
	pub fn contains(&self, key: &str) -> bool {
		match self {
			Self::List(list) => list
				.iter()
				.any(|item| split_key_value(item).0 == key),
			Self::Map(map) => map.contains_key(key),
		}
	}

	pub fn get(&self, key: &str) -> Option<String> {
		match self {
			Self::List(list) => list.iter().find_map(|item| {
				let (k, v) = split_key_value(item);
				(k == key).then(|| v.to_string())
			}),
			Self::Map(map) => map
				.get(key)
				.map(|v| v.as_ref().map(ToString::to_string).unwrap_or_default()),
		}
	}

	/// Flattens both encodings into ordered `(key, value)` pairs.
	///
	/// A list item without `=` yields an empty value, as does a map key with a null value.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		match self {
			Self::List(list) => list
				.iter()
				.map(|item| {
					let (k, v) = split_key_value(item);
					(k.to_string(), v.to_string())
				})
				.collect(),
			Self::Map(map) => map
				.iter()
				.map(|(k, v)| {
					(
						k.clone(),
						v.as_ref().map(ToString::to_string).unwrap_or_default(),
					)
				})
				.collect(),
		}
	}

	pub const fn is_list(&self) -> bool {
		matches!(self, Self::List(_))
	}
}

pub(crate) fn split_key_value(item: &str) -> (&str, &str) {
	item.split_once('=').unwrap_or((item, ""))
}

/// Deserializes a field and falls back to `None` when its shape is not the expected one,
/// instead of failing the whole document.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = Value::deserialize(deserializer)?;

	Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but for lists: items with an unexpected shape are dropped one by one.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = Value::deserialize(deserializer)?;

	Ok(match value {
		Value::Array(items) => Some(
			items
				.into_iter()
				.filter_map(|item| serde_json::from_value(item).ok())
				.collect(),
		),
		_ => None,
	})
}

/// Like [`lenient`], but for maps of named entries: an entry with an unexpected shape is kept
/// under its name with an empty body, so one bad entry does not hide its siblings.
pub(crate) fn lenient_map<'de, D, T>(
	deserializer: D,
) -> Result<Option<IndexMap<String, Option<T>>>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = Value::deserialize(deserializer)?;

	Ok(match value {
		Value::Object(entries) => Some(
			entries
				.into_iter()
				.map(|(name, body)| (name, serde_json::from_value(body).ok().flatten()))
				.collect(),
		),
		_ => None,
	})
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn list_pairs_split_on_first_equals() {
		let list = ListOrMap::List(vec!["A=1".to_string(), "B=x=y".to_string(), "C".to_string()]);

		assert_eq!(
			list.to_pairs(),
			vec![
				("A".to_string(), "1".to_string()),
				("B".to_string(), "x=y".to_string()),
				("C".to_string(), String::new()),
			]
		);
		assert_eq!(list.get("B").as_deref(), Some("x=y"));
		assert!(list.contains("C"));
	}

	#[test]
	fn map_pairs_render_scalars() {
		let map: ListOrMap = serde_json::from_str(r#"{"PORT": 80, "DEBUG": true, "EMPTY": null, "RATIO": 0.5}"#)
			.unwrap();

		assert_eq!(
			map.to_pairs(),
			vec![
				("PORT".to_string(), "80".to_string()),
				("DEBUG".to_string(), "true".to_string()),
				("EMPTY".to_string(), String::new()),
				("RATIO".to_string(), "0.5".to_string()),
			]
		);
	}
}
