//! Saving, listing and exchanging configurations.
//!
//! Storage sits behind [`ConfigRepository`]; the page only talks to the
//! trait, so the browser store can be swapped for the in-memory one in tests.

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use log::{error, info};

use crate::error::{Error, Result};
use crate::model::{GraphConfig, GraphModel};

/// Key the configuration list lives under in `localStorage`.
pub const STORAGE_KEY: &str = "bipartite-configs";

/// A store of saved configurations.
pub trait ConfigRepository {
	/// All saved configurations, oldest first.
	fn list(&self) -> Result<Vec<GraphConfig>>;
	/// Add a configuration at the end of the list.
	fn append(&self, config: GraphConfig) -> Result<()>;
	/// Delete the configuration carrying `id`.
	fn remove(&self, id: &str) -> Result<()>;
}

/// Configurations serialized as one JSON array under a fixed `localStorage` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalStorageRepository {
	key: &'static str,
}

impl Default for LocalStorageRepository {
	fn default() -> Self {
		Self { key: STORAGE_KEY }
	}
}

impl LocalStorageRepository {
	/// A repository under a custom key.
	pub fn with_key(key: &'static str) -> Self {
		Self { key }
	}

	fn storage(&self) -> Result<web_sys::Storage> {
		web_sys::window()
			.ok_or_else(|| Error::Storage("no window".into()))?
			.local_storage()
			.map_err(|err| Error::Storage(format!("{err:?}")))?
			.ok_or_else(|| Error::Storage("localStorage disabled".into()))
	}

	fn store(&self, configs: &[GraphConfig]) -> Result<()> {
		let text = serde_json::to_string(configs).map_err(Error::Serialize)?;
		self.storage()?.set_item(self.key, &text).map_err(|err| {
			error!("writing {} failed: {err:?}", self.key);
			Error::Storage(format!("{err:?}"))
		})
	}
}

impl ConfigRepository for LocalStorageRepository {
	fn list(&self) -> Result<Vec<GraphConfig>> {
		let stored = self
			.storage()?
			.get_item(self.key)
			.map_err(|err| Error::Storage(format!("{err:?}")))?;
		match stored {
			Some(text) => serde_json::from_str(&text).map_err(Error::InvalidConfig),
			None => Ok(Vec::new()),
		}
	}

	fn append(&self, config: GraphConfig) -> Result<()> {
		let mut configs = self.list()?;
		configs.push(config);
		self.store(&configs)
	}

	fn remove(&self, id: &str) -> Result<()> {
		let mut configs = self.list()?;
		let before = configs.len();
		configs.retain(|c| c.id.as_deref() != Some(id));
		if configs.len() == before {
			return Err(Error::NotFound(id.to_string()));
		}
		self.store(&configs)
	}
}

/// A process-local repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
	configs: RefCell<Vec<GraphConfig>>,
}

impl ConfigRepository for MemoryRepository {
	fn list(&self) -> Result<Vec<GraphConfig>> {
		Ok(self.configs.borrow().clone())
	}

	fn append(&self, config: GraphConfig) -> Result<()> {
		self.configs.borrow_mut().push(config);
		Ok(())
	}

	fn remove(&self, id: &str) -> Result<()> {
		let mut configs = self.configs.borrow_mut();
		let index = configs
			.iter()
			.position(|c| c.id.as_deref() == Some(id))
			.ok_or_else(|| Error::NotFound(id.to_string()))?;
		configs.remove(index);
		Ok(())
	}
}

/// Validate `title`, snapshot `model` and append it to `repo`.
///
/// A blank title is rejected before anything is written.
pub fn save_configuration(
	repo: &dyn ConfigRepository,
	model: &GraphModel,
	title: &str,
	now: DateTime<Utc>,
) -> Result<GraphConfig> {
	let title = title.trim();
	if title.is_empty() {
		return Err(Error::EmptyTitle);
	}
	let config = model.snapshot(title, now);
	repo.append(config.clone())?;
	info!("saved configuration {title:?}");
	Ok(config)
}

/// Pretty-printed JSON of one configuration.
pub fn export_json(config: &GraphConfig) -> Result<String> {
	serde_json::to_string_pretty(config).map_err(Error::Serialize)
}

/// Download name for a configuration: every whitespace run in the title
/// becomes a single `-`.
pub fn export_filename(title: &str) -> String {
	let mut slug = String::with_capacity(title.len());
	let mut in_space = false;
	for ch in title.chars() {
		if ch.is_whitespace() {
			if !in_space {
				slug.push('-');
			}
			in_space = true;
		} else {
			slug.push(ch);
			in_space = false;
		}
	}
	format!("bipartite-graph-{slug}.json")
}

/// Parse an imported file. Nothing is changed on failure.
pub fn import_json(text: &str) -> Result<GraphConfig> {
	serde_json::from_str(text).map_err(Error::InvalidConfig)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::bipartite_graph::style::evidence_color;
	use crate::model::{Evidence, NodeGroup, Side};
	use chrono::TimeZone;

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
	}

	#[test]
	fn empty_title_is_rejected_without_writing() {
		let repo = MemoryRepository::default();
		let model = GraphModel::default();
		for title in ["", "   ", "\t\n"] {
			let err = save_configuration(&repo, &model, title, now()).unwrap_err();
			assert!(matches!(err, Error::EmptyTitle));
		}
		assert!(repo.list().unwrap().is_empty());
	}

	#[test]
	fn save_assigns_id_timestamp_and_trimmed_title() {
		let repo = MemoryRepository::default();
		let model = GraphModel::default();
		let saved = save_configuration(&repo, &model, "  Gene net  ", now()).unwrap();
		assert_eq!(saved.title, "Gene net");
		assert_eq!(saved.id.as_deref(), Some("1715938200000"));
		assert_eq!(saved.timestamp, Some(now()));
		assert_eq!(repo.list().unwrap(), vec![saved]);
	}

	#[test]
	fn remove_deletes_by_id() {
		let repo = MemoryRepository::default();
		let model = GraphModel::default();
		let first = save_configuration(&repo, &model, "one", now()).unwrap();
		let later = now() + chrono::Duration::seconds(1);
		let second = save_configuration(&repo, &model, "two", later).unwrap();

		repo.remove(first.id.as_deref().unwrap()).unwrap();
		assert_eq!(repo.list().unwrap(), vec![second]);
		assert!(matches!(repo.remove("missing"), Err(Error::NotFound(_))));
	}

	#[test]
	fn export_then_import_reproduces_the_graph() {
		let mut model = GraphModel::default();
		model.set_group(Side::A, NodeGroup::new("Genes", 2, "#10b981"));
		model.set_all_evidence(Evidence::Strong);
		model.randomize_weights(|| 0.37);
		model.set_rotation(-45.0);
		let config = model.snapshot("Round trip", now());

		let text = export_json(&config).unwrap();
		assert!(text.contains("\n  \"groupA\""));
		let imported = import_json(&text).unwrap();

		let mut restored = GraphModel::default();
		assert!(!restored.load(imported));
		assert_eq!(restored, model);
	}

	#[test]
	fn import_accepts_files_without_id_or_timestamp() {
		let text = r##"{
			"title": "hand written",
			"groupA": {"name": "Users", "count": 1, "color": "#3b82f6"},
			"groupB": {"name": "Features", "count": 2, "color": "#ef4444"},
			"edges": [
				{"from": 0, "to": 0, "weight": 2.5, "evidence": "Weak"},
				{"from": 0, "to": 1, "weight": 1.0, "evidence": "Preliminary"}
			],
			"rotation": 90
		}"##;
		let config = import_json(text).unwrap();
		assert_eq!(config.id, None);
		assert_eq!(config.timestamp, None);
		assert_eq!(config.edges[0].evidence, Evidence::Weak);
		assert_eq!(config.rotation, 90.0);
	}

	#[test]
	fn unknown_evidence_imports_and_draws_gray() {
		let text = r##"{
			"title": "shared",
			"groupA": {"name": "A", "count": 1, "color": "#3b82f6"},
			"groupB": {"name": "B", "count": 1, "color": "#ef4444"},
			"edges": [{"from": 0, "to": 0, "weight": 1.5, "evidence": "Tentative"}],
			"rotation": 0
		}"##;
		let config = import_json(text).unwrap();
		let edge = &config.edges[0];
		assert_eq!(edge.evidence, Evidence::Unknown);
		assert_eq!(evidence_color(edge.evidence), "#6b7280");

		let mut model = GraphModel::default();
		assert!(!model.load(config));
		assert_eq!(model.edges[0].evidence, Evidence::Unknown);
		assert_eq!(model.edges[0].weight, 1.5);
	}

	#[test]
	fn malformed_import_is_an_error() {
		for text in ["", "{", "[]", r#"{"title": "x"}"#] {
			assert!(matches!(import_json(text), Err(Error::InvalidConfig(_))));
		}
	}

	#[test]
	fn filenames_collapse_whitespace() {
		assert_eq!(export_filename("Gene Disease  v1"), "bipartite-graph-Gene-Disease-v1.json");
		assert_eq!(export_filename(" a\tb "), "bipartite-graph--a-b-.json");
		assert_eq!(export_filename("plain"), "bipartite-graph-plain.json");
	}
}
