//! Save, load, delete, export and import of configurations.

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, FileReader, HtmlAnchorElement, HtmlInputElement, Url};

use super::notice::Notices;
use crate::model::GraphConfig;
use crate::persistence::{export_filename, export_json, import_json};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
	Save,
	Load,
	ImportExport,
}

fn download(filename: &str, contents: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let link: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(JsValue::from)?;
	link.set_href(&url);
	link.set_download(filename);
	link.click();
	Url::revoke_object_url(&url)
}

fn export(config: &GraphConfig, notices: Notices) {
	let written = export_json(config)
		.map_err(|err| JsValue::from_str(&err.to_string()))
		.and_then(|json| download(&export_filename(&config.title), &json));
	match written {
		Ok(()) => {
			info!("exported configuration {:?}", config.title);
			notices.success("Configuration exported");
		}
		Err(err) => {
			error!("export failed: {err:?}");
			notices.error("Could not export configuration");
		}
	}
}

/// Read the selected file and hand a parsed configuration to `on_import`.
fn read_import(input: &HtmlInputElement, on_import: Callback<GraphConfig>, notices: Notices) {
	let Some(file) = input.files().and_then(|files| files.get(0)) else {
		return;
	};
	let reader = match FileReader::new() {
		Ok(reader) => reader,
		Err(err) => {
			error!("no FileReader: {err:?}");
			return;
		}
	};
	let done = reader.clone();
	let onload = Closure::once_into_js(move || {
		let text = done.result().ok().and_then(|r| r.as_string()).unwrap_or_default();
		match import_json(&text) {
			Ok(config) => on_import.run(config),
			Err(err) => {
				error!("{err}");
				notices.error("Invalid configuration file");
			}
		}
	});
	reader.set_onload(Some(onload.unchecked_ref()));
	if let Err(err) = reader.read_as_text(&file) {
		error!("reading {} failed: {err:?}", file.name());
		notices.error("Could not read file");
	}
}

/// Modal with save, load and import/export tabs.
///
/// `on_save` returns whether the save succeeded; the dialog only closes
/// (and clears the title) when it did.
#[component]
pub fn SaveLoadDialog(
	open: RwSignal<bool>,
	#[prop(into)] configurations: Signal<Vec<GraphConfig>>,
	on_save: Callback<String, bool>,
	on_load: Callback<GraphConfig>,
	/// Receives a configuration read from a file.
	on_import: Callback<GraphConfig>,
	on_delete: Callback<String>,
	notices: Notices,
) -> impl IntoView {
	let tab = RwSignal::new(Tab::Save);
	let title = RwSignal::new(String::new());

	let save = move |_| {
		if on_save.run(title.get_untracked()) {
			title.set(String::new());
			open.set(false);
		}
	};

	let load = move |config: GraphConfig| {
		on_load.run(config);
		open.set(false);
	};

	let tab_button = move |target: Tab, label: &'static str| {
		view! {
			<button
				class=move || if tab.get() == target { "tab active" } else { "tab" }
				on:click=move |_| tab.set(target)
			>
				{label}
			</button>
		}
	};

	let saved_list = move || {
		let configs = configurations.get();
		if configs.is_empty() {
			return view! { <div class="empty">"No saved configurations found"</div> }.into_any();
		}
		configs
			.into_iter()
			.map(|config| {
				let date = config.timestamp.map_or_else(
					|| "Unknown date".to_string(),
					|t| t.format("%Y-%m-%d").to_string(),
				);
				let summary = format!(
					"{date} • {} ({}) ↔ {} ({})",
					config.group_a.name,
					config.group_a.count,
					config.group_b.name,
					config.group_b.count
				);
				let id = config.id.clone().unwrap_or_default();
				let (to_export, to_load) = (config.clone(), config.clone());
				view! {
					<div class="saved-entry">
						<div class="grow">
							<h4>{config.title.clone()}</h4>
							<p class="muted">{summary}</p>
						</div>
						<div class="row">
							<button
								class="outline small"
								title="Export"
								on:click=move |_| export(&to_export, notices)
							>
								"Export"
							</button>
							<button
								class="outline small"
								title="Delete"
								on:click=move |_| on_delete.run(id.clone())
							>
								"Delete"
							</button>
							<button class="small" on:click=move |_| load(to_load.clone())>
								"Load"
							</button>
						</div>
					</div>
				}
			})
			.collect_view()
			.into_any()
	};

	let on_file = move |ev: web_sys::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let imported = Callback::new(move |config| {
			on_import.run(config);
			open.set(false);
		});
		read_import(&input, imported, notices);
		input.set_value("");
	};

	view! {
		<Show when=move || open.get()>
			<div class="modal-backdrop" on:click=move |_| open.set(false)>
				<div class="modal" on:click=|ev| ev.stop_propagation()>
					<header>
						<h2>"Save & Load Configurations"</h2>
						<p class="muted">"Manage your bipartite graph configurations"</p>
					</header>
					<nav class="tabs">
						{tab_button(Tab::Save, "Save")}
						{tab_button(Tab::Load, "Load")}
						{tab_button(Tab::ImportExport, "Import/Export")}
					</nav>
					{move || match tab.get() {
						Tab::Save => {
							view! {
								<section>
									<label for="save-title">"Configuration Title"</label>
									<input
										id="save-title"
										type="text"
										placeholder="e.g., Gene-Disease Network v1"
										prop:value=move || title.get()
										on:input=move |ev| title.set(event_target_value(&ev))
									/>
									<button class="wide" on:click=save>
										"Save Current Configuration"
									</button>
								</section>
							}
								.into_any()
						}
						Tab::Load => {
							view! { <section class="saved-list">{saved_list}</section> }.into_any()
						}
						Tab::ImportExport => {
							view! {
								<section>
									<h4>"Import Configuration"</h4>
									<input type="file" accept=".json" on:change=on_file />
									<p class="muted">
										"Select a JSON file to import a saved configuration"
									</p>
									<p class="muted">
										"You can also export individual configurations "
										"from the Load tab."
									</p>
								</section>
							}
								.into_any()
						}
					}}
				</div>
			</div>
		</Show>
	}
}
