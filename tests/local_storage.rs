#![cfg(target_arch = "wasm32")]

use bipartite_graph_designer::error::Error;
use bipartite_graph_designer::model::{Evidence, GraphModel};
use bipartite_graph_designer::persistence::{
	ConfigRepository, LocalStorageRepository, save_configuration,
};
use chrono::{TimeZone, Utc};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh(key: &'static str) -> LocalStorageRepository {
	let repo = LocalStorageRepository::with_key(key);
	for config in repo.list().unwrap() {
		repo.remove(config.id.as_deref().unwrap()).unwrap();
	}
	repo
}

#[wasm_bindgen_test]
fn saves_lists_and_removes() {
	let repo = fresh("bipartite-configs-test-roundtrip");
	let now = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
	let saved = save_configuration(&repo, &GraphModel::default(), "  Pilot  ", now).unwrap();
	assert_eq!(saved.title, "Pilot");

	let listed = repo.list().unwrap();
	assert_eq!(listed, vec![saved.clone()]);

	repo.remove(saved.id.as_deref().unwrap()).unwrap();
	assert!(repo.list().unwrap().is_empty());
}

#[wasm_bindgen_test]
fn blank_title_writes_nothing() {
	let repo = fresh("bipartite-configs-test-blank");
	let err = save_configuration(&repo, &GraphModel::default(), "   ", Utc::now()).unwrap_err();
	assert!(matches!(err, Error::EmptyTitle));
	assert!(repo.list().unwrap().is_empty());
}

#[wasm_bindgen_test]
fn removing_unknown_id_is_not_found() {
	let repo = fresh("bipartite-configs-test-missing");
	assert!(matches!(repo.remove("nope"), Err(Error::NotFound(id)) if id == "nope"));
}

#[wasm_bindgen_test]
fn foreign_evidence_in_storage_does_not_block_saves() {
	let key = "bipartite-configs-test-foreign";
	let storage = web_sys::window().unwrap().local_storage().unwrap().unwrap();
	storage
		.set_item(
			key,
			r##"[{"id":"1","title":"other app","groupA":{"name":"A","count":1,"color":"#000"},
			"groupB":{"name":"B","count":1,"color":"#fff"},
			"edges":[{"from":0,"to":0,"weight":1,"evidence":"Tentative"}],"rotation":0}]"##,
		)
		.unwrap();
	let repo = LocalStorageRepository::with_key(key);
	save_configuration(&repo, &GraphModel::default(), "mine", Utc::now()).unwrap();

	let listed = repo.list().unwrap();
	assert_eq!(listed.len(), 2);
	assert_eq!(listed[0].edges[0].evidence, Evidence::Unknown);
	storage.remove_item(key).unwrap();
}
