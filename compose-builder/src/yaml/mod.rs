//! An ordered document tree and the YAML renderer for it.

mod emit;

use indexmap::IndexMap;
pub use emit::emit;

pub type Mapping = IndexMap<String, Node>;

/// A value in a compose document.
///
/// The tree only records what should be written out, so there is no null variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
	/// A string written plain unless that would change its meaning.
	Str(String),
	/// A string that is always double-quoted, such as a port mapping.
	Quoted(String),
	Int(i64),
	Bool(bool),
	/// A block sequence.
	Seq(Vec<Self>),
	/// A sequence of strings written on one line, as in `["CMD", "curl"]`.
	Inline(Vec<String>),
	Map(Mapping),
}

impl Node {
	pub fn str(value: impl Into<String>) -> Self {
		Self::Str(value.into())
	}

	pub fn quoted(value: impl Into<String>) -> Self {
		Self::Quoted(value.into())
	}

	pub fn str_list<I, S>(items: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Seq(items.into_iter().map(|i| Self::Str(i.into())).collect())
	}

	pub const fn as_map(&self) -> Option<&Mapping> {
		if let Self::Map(map) = self {
			Some(map)
		} else {
			None
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) | Self::Quoted(s) => Some(s),
			_ => None,
		}
	}
}

/// Inserts a string when it is not empty.
pub(crate) fn insert_str(map: &mut Mapping, key: &str, value: &str) {
	if !value.is_empty() {
		map.insert(key.to_string(), Node::str(value));
	}
}

/// Inserts a list of plain strings when it has at least one non-empty item.
pub(crate) fn insert_str_list(map: &mut Mapping, key: &str, values: &[String]) {
	let items: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();

	if !items.is_empty() {
		map.insert(key.to_string(), Node::str_list(items.into_iter().cloned()));
	}
}

/// Inserts a nested mapping when it is not empty.
pub(crate) fn insert_map(map: &mut Mapping, key: &str, value: Mapping) {
	if !value.is_empty() {
		map.insert(key.to_string(), Node::Map(value));
	}
}
