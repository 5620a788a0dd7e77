//! Browsing and caching the templates of the marketplace.
//!
//! Downloads are left to a [`TemplateSource`] and persistence to a [`TemplateCache`], so the
//! store itself only decides when to fetch and which responses to keep.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{errors::BuildError, settings::MarketplaceSettings};

/// The key under which the template list is cached.
pub const CACHE_KEY: &str = "templates";

/// An entry of the marketplace index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMeta {
	pub id: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	/// The file name of the logo, relative to the template's directory.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub logo: Option<String>,
	pub tags: Vec<String>,
}

impl TemplateMeta {
	/// Whether the name or description contain the query, ignoring case.
	pub fn matches(&self, query: &str) -> bool {
		let query = query.to_lowercase();

		self.name.to_lowercase().contains(&query)
			|| self
				.description
				.as_ref()
				.is_some_and(|d| d.to_lowercase().contains(&query))
	}
}

/// A template with its compose file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDetail {
	pub meta: TemplateMeta,
	pub compose_content: String,
	pub logo_url: Option<String>,
}

/// Where templates are downloaded from.
pub trait TemplateSource {
	fn fetch_index(&self) -> Result<Vec<TemplateMeta>, BuildError>;

	fn fetch_compose(&self, template_id: &str) -> Result<String, BuildError>;

	/// The url of a file in the directory of the template.
	fn asset_url(&self, template_id: &str, file: &str) -> String;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
	pub templates: Vec<TemplateMeta>,
	pub timestamp: DateTime<Utc>,
}

/// Persistent storage for downloaded template lists.
pub trait TemplateCache {
	fn get(&self, key: &str) -> Option<CacheEntry>;

	fn set(&mut self, key: &str, templates: Vec<TemplateMeta>, timestamp: DateTime<Utc>);

	fn clear(&mut self, key: &str);
}

/// A [`TemplateCache`] that lives as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
	entries: HashMap<String, CacheEntry>,
}

impl TemplateCache for MemoryCache {
	fn get(&self, key: &str) -> Option<CacheEntry> {
		self.entries.get(key).cloned()
	}

	fn set(&mut self, key: &str, templates: Vec<TemplateMeta>, timestamp: DateTime<Utc>) {
		self
			.entries
			.insert(key.to_string(), CacheEntry { templates, timestamp });
	}

	fn clear(&mut self, key: &str) {
		self.entries.remove(key);
	}
}

/// Identifies a fetch of the template index.
///
/// Only the response to the most recent ticket is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
	seq: u64,
	background: bool,
}

impl FetchTicket {
	pub const fn is_background(&self) -> bool {
		self.background
	}
}

/// The template list of the marketplace, with its loading and error state.
///
/// Cached lists are reused for an hour unless another duration is set with [`Self::with_ttl`]
/// or taken from the settings with [`Self::from_settings`].
pub struct TemplateStore<S, C> {
	source: S,
	cache: C,
	ttl: TimeDelta,
	templates: Vec<TemplateMeta>,
	loading: bool,
	error: Option<String>,
	last_ticket: u64,
}

impl<S: TemplateSource, C: TemplateCache> TemplateStore<S, C> {
	pub fn new(source: S, cache: C) -> Self {
		Self {
			source,
			cache,
			ttl: TimeDelta::hours(1),
			templates: vec![],
			loading: false,
			error: None,
			last_ticket: 0,
		}
	}

	/// Creates a store that keeps cached lists for the configured `cache_ttl_minutes`.
	pub fn from_settings(source: S, cache: C, settings: &MarketplaceSettings) -> Self {
		Self::new(source, cache).with_ttl(settings.cache_ttl())
	}

	#[must_use]
	pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
		self.ttl = ttl;
		self
	}

	pub fn templates(&self) -> &[TemplateMeta] {
		&self.templates
	}

	pub const fn is_loading(&self) -> bool {
		self.loading
	}

	/// The error of the last foreground fetch, if it failed.
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn dismiss_error(&mut self) {
		self.error = None;
	}

	pub const fn cache(&self) -> &C {
		&self.cache
	}

	/// The templates that match the query and carry all of the tags.
	pub fn search(&self, query: &str, tags: &[String]) -> Vec<&TemplateMeta> {
		self
			.templates
			.iter()
			.filter(|t| t.matches(query) && tags.iter().all(|tag| t.tags.contains(tag)))
			.collect()
	}

	/// All the tags used by the templates, sorted and deduplicated.
	pub fn tags(&self) -> Vec<&str> {
		let mut tags: Vec<&str> = self
			.templates
			.iter()
			.flat_map(|t| t.tags.iter().map(String::as_str))
			.collect();

		tags.sort_unstable();
		tags.dedup();
		tags
	}

	fn fresh_cache(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
		self
			.cache
			.get(CACHE_KEY)
			.filter(|entry| {
				!entry.templates.is_empty() && now.signed_duration_since(entry.timestamp) < self.ttl
			})
	}

	/// Loads the template list.
	///
	/// A fresh cached list is served right away, and the returned ticket should be used to
	/// check for updates in the background with [`Self::run`]. Otherwise the list is fetched
	/// immediately.
	pub fn open(&mut self, now: DateTime<Utc>) -> Option<FetchTicket> {
		if let Some(entry) = self.fresh_cache(now) {
			debug!("Serving {} cached templates", entry.templates.len());

			self.templates = entry.templates;
			self.loading = false;
			self.error = None;

			return Some(self.begin_fetch(true));
		}

		let ticket = self.begin_fetch(false);
		self.run(ticket, now);

		None
	}

	/// Drops the cached list and fetches it again.
	pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
		self.cache.clear(CACHE_KEY);

		let ticket = self.begin_fetch(false);
		self.run(ticket, now)
	}

	/// Starts a fetch. Any fetch started before this one becomes stale.
	pub fn begin_fetch(&mut self, background: bool) -> FetchTicket {
		self.last_ticket += 1;

		if !background {
			self.loading = true;
			self.error = None;
		}

		FetchTicket {
			seq: self.last_ticket,
			background,
		}
	}

	/// Fetches the index from the source and applies the response.
	pub fn run(&mut self, ticket: FetchTicket, now: DateTime<Utc>) -> bool {
		let response = self.source.fetch_index();

		self.finish_fetch(ticket, response, now)
	}

	/// Applies the response of a fetch. Returns whether it was applied.
	///
	/// Responses to stale tickets are ignored. A failed fetch keeps the templates that were
	/// already loaded.
	pub fn finish_fetch(
		&mut self,
		ticket: FetchTicket,
		response: Result<Vec<TemplateMeta>, BuildError>,
		now: DateTime<Utc>,
	) -> bool {
		if ticket.seq != self.last_ticket {
			warn!("Ignoring a stale template list response");
			return false;
		}

		self.loading = false;

		match response {
			Ok(templates) => {
				debug!("Fetched {} templates", templates.len());

				self
					.cache
					.set(CACHE_KEY, templates.clone(), now);
				self.templates = templates;
				true
			}
			Err(e) => {
				warn!("Failed to fetch the templates: {e}");

				if !ticket.background {
					self.error = Some(e.to_string());
				}

				false
			}
		}
	}

	/// Downloads the compose file of a template.
	pub fn details(&self, template_id: &str) -> Result<TemplateDetail, BuildError> {
		let meta = self
			.templates
			.iter()
			.find(|t| t.id == template_id)
			.ok_or_else(|| BuildError::TemplateNotFound(template_id.to_string()))?;

		let compose_content = self.source.fetch_compose(template_id)?;

		let logo_url = meta
			.logo
			.as_ref()
			.filter(|logo| !logo.is_empty())
			.map(|logo| self.source.asset_url(template_id, logo));

		Ok(TemplateDetail {
			meta: meta.clone(),
			compose_content,
			logo_url,
		})
	}
}

#[cfg(test)]
mod test {
	use std::cell::{Cell, RefCell};

	use pretty_assertions::assert_eq;

	use super::*;

	struct FakeSource {
		index: RefCell<Result<Vec<TemplateMeta>, String>>,
		fetches: Cell<usize>,
	}

	impl FakeSource {
		fn serving(templates: Vec<TemplateMeta>) -> Self {
			Self {
				index: RefCell::new(Ok(templates)),
				fetches: Cell::new(0),
			}
		}

		fn fail(&self, error: &str) {
			*self.index.borrow_mut() = Err(error.to_string());
		}
	}

	impl TemplateSource for FakeSource {
		fn fetch_index(&self) -> Result<Vec<TemplateMeta>, BuildError> {
			self.fetches.set(self.fetches.get() + 1);
			self
				.index
				.borrow()
				.clone()
				.map_err(BuildError::Fetch)
		}

		fn fetch_compose(&self, template_id: &str) -> Result<String, BuildError> {
			Ok(format!("services:\n  {template_id}:\n    image: {template_id}\n"))
		}

		fn asset_url(&self, template_id: &str, file: &str) -> String {
			format!("https://example.com/{template_id}/{file}")
		}
	}

	fn meta(id: &str, tags: &[&str]) -> TemplateMeta {
		TemplateMeta {
			id: id.to_string(),
			name: id.to_uppercase(),
			tags: tags.iter().map(ToString::to_string).collect(),
			..Default::default()
		}
	}

	fn store(templates: Vec<TemplateMeta>) -> TemplateStore<FakeSource, MemoryCache> {
		TemplateStore::new(FakeSource::serving(templates), MemoryCache::default())
	}

	#[test]
	fn open_fetches_without_cache() {
		let mut store = store(vec![meta("n8n", &[])]);
		let now = Utc::now();

		assert_eq!(store.open(now), None);
		assert_eq!(store.templates(), &[meta("n8n", &[])]);
		assert!(!store.is_loading());
		assert_eq!(
			store.cache().get(CACHE_KEY).map(|e| e.timestamp),
			Some(now)
		);
	}

	#[test]
	fn fresh_cache_is_served_first() {
		let mut cache = MemoryCache::default();
		let now = Utc::now();
		cache.set(CACHE_KEY, vec![meta("cached", &[])], now - TimeDelta::minutes(10));

		let mut store = TemplateStore::new(FakeSource::serving(vec![meta("new", &[])]), cache);

		let ticket = store
			.open(now)
			.expect("Expected a background refresh");

		assert!(ticket.is_background());
		assert_eq!(store.templates(), &[meta("cached", &[])]);
		assert_eq!(store.source.fetches.get(), 0);

		assert!(store.run(ticket, now));
		assert_eq!(store.templates(), &[meta("new", &[])]);
	}

	#[test]
	fn expired_cache_is_refetched() {
		let mut cache = MemoryCache::default();
		let now = Utc::now();
		cache.set(CACHE_KEY, vec![meta("old", &[])], now - TimeDelta::hours(2));

		let mut store = TemplateStore::new(FakeSource::serving(vec![meta("new", &[])]), cache);

		assert_eq!(store.open(now), None);
		assert_eq!(store.templates(), &[meta("new", &[])]);
	}

	#[test]
	fn configured_ttl_decides_freshness() {
		let now = Utc::now();
		let settings = MarketplaceSettings {
			cache_ttl_minutes: 5,
			..Default::default()
		};

		let mut cache = MemoryCache::default();
		cache.set(CACHE_KEY, vec![meta("cached", &[])], now - TimeDelta::minutes(10));

		let mut store =
			TemplateStore::from_settings(FakeSource::serving(vec![meta("new", &[])]), cache, &settings);

		assert_eq!(store.open(now), None);
		assert_eq!(store.templates(), &[meta("new", &[])]);
		assert_eq!(store.source.fetches.get(), 1);
	}

	#[test]
	fn stale_responses_are_ignored() {
		let mut store = store(vec![]);
		let now = Utc::now();

		let background = store.begin_fetch(true);
		let manual = store.begin_fetch(false);

		assert!(store.finish_fetch(manual, Ok(vec![meta("manual", &[])]), now));
		assert!(!store.finish_fetch(background, Ok(vec![meta("background", &[])]), now));

		assert_eq!(store.templates(), &[meta("manual", &[])]);
	}

	#[test]
	fn errors_keep_the_loaded_templates() {
		let mut store = store(vec![meta("n8n", &[])]);
		let now = Utc::now();

		store.open(now);
		store.source.fail("Not Found");

		assert!(!store.refresh(now));
		assert_eq!(store.templates(), &[meta("n8n", &[])]);
		assert_eq!(store.error(), Some("Failed to fetch templates: Not Found"));
		assert!(store.cache().get(CACHE_KEY).is_none());

		store.dismiss_error();
		assert_eq!(store.error(), None);
	}

	#[test]
	fn background_errors_are_silent() {
		let mut store = store(vec![]);

		let ticket = store.begin_fetch(true);
		store.finish_fetch(ticket, Err(BuildError::Fetch("offline".to_string())), Utc::now());

		assert_eq!(store.error(), None);
	}

	#[test]
	fn search_and_details() -> Result<(), Box<dyn std::error::Error>> {
		let mut store = store(vec![
			TemplateMeta {
				description: Some("Workflow automation".to_string()),
				logo: Some("logo.png".to_string()),
				..meta("n8n", &["automation", "low-code"])
			},
			meta("grafana", &["monitoring"]),
		]);
		store.open(Utc::now());

		let ids = |found: Vec<&TemplateMeta>| found.iter().map(|t| t.id.clone()).collect::<Vec<_>>();

		assert_eq!(ids(store.search("workflow", &[])), vec!["n8n".to_string()]);
		assert_eq!(ids(store.search("", &["monitoring".to_string()])), vec!["grafana".to_string()]);
		assert_eq!(store.tags(), vec!["automation", "low-code", "monitoring"]);

		let detail = store.details("n8n")?;

		assert_eq!(detail.logo_url.as_deref(), Some("https://example.com/n8n/logo.png"));
		assert!(detail.compose_content.contains("image: n8n"));

		assert!(matches!(
			store.details("missing"),
			Err(BuildError::TemplateNotFound(_))
		));

		Ok(())
	}
}
