use chrono::Utc;
use leptos::prelude::*;
use log::{error, info, warn};

use crate::components::bipartite_graph::BipartiteGraph;
use crate::components::controls::{EdgeControls, GraphControls};
use crate::components::notice::{NoticeKind, NoticeStack, Notices};
use crate::components::save_load::SaveLoadDialog;
use crate::model::{Edge, GraphConfig, GraphModel, NodeGroup, Side};
use crate::persistence::{ConfigRepository, LocalStorageRepository, save_configuration};

fn saved_configurations(repo: &impl ConfigRepository, notices: Notices) -> Vec<GraphConfig> {
	repo.list().unwrap_or_else(|err| {
		error!("listing saved configurations failed: {err}");
		notices.error(err.to_string());
		Vec::new()
	})
}

/// Notice for a configuration that was just `action` ("loaded", "imported").
fn applied_notice(action: &str, repaired: bool) -> (NoticeKind, String) {
	if repaired {
		(
			NoticeKind::Error,
			"Configuration did not match its group sizes; edges were reset".to_string(),
		)
	} else {
		(NoticeKind::Success, format!("Configuration {action}!"))
	}
}

/// The designer page: owns the model and applies every edit coming from the panels.
#[component]
pub fn Home() -> impl IntoView {
	let model = RwSignal::new(GraphModel::default());
	let generated = RwSignal::new(false);
	let dialog_open = RwSignal::new(false);
	let notices = Notices::new();
	let repo = LocalStorageRepository::default();
	let saved = RwSignal::new(saved_configurations(&repo, notices));

	let group_a = Memo::new(move |_| model.with(|m| m.group_a.clone()));
	let group_b = Memo::new(move |_| model.with(|m| m.group_b.clone()));
	let edges = Memo::new(move |_| model.with(|m| m.edges.clone()));
	let rotation = Memo::new(move |_| model.with(|m| m.rotation));

	let set_group = move |side: Side, group: NodeGroup| {
		model.update(|m| {
			if m.set_group(side, group) {
				info!("group {side:?} resized; edges regenerated");
			}
		});
	};
	let on_group_a_change = Callback::new(move |group| set_group(Side::A, group));
	let on_group_b_change = Callback::new(move |group| set_group(Side::B, group));
	let on_rotation_change =
		Callback::new(move |degrees| model.update(|m| m.set_rotation(degrees)));
	let on_edges_change = Callback::new(move |next: Vec<Edge>| {
		model.update(|m| {
			m.set_edges(next);
		});
	});
	let on_bulk_evidence = Callback::new(move |evidence| {
		model.update(|m| m.set_all_evidence(evidence));
		notices.success(format!("All edges set to {evidence}"));
	});
	let on_randomize_weights = Callback::new(move |()| {
		model.update(|m| m.randomize_weights(js_sys::Math::random));
		notices.success("Edge weights randomized");
	});

	let generate = move |_| {
		generated.set(true);
		notices.success("Graph generated successfully!");
	};
	let random_data = move |_| {
		model.update(|m| m.randomize_groups(js_sys::Math::random));
		notices.success("Random data generated!");
	};

	let on_save = Callback::new(move |title: String| {
		let current = model.get_untracked();
		match save_configuration(&repo, &current, &title, Utc::now()) {
			Ok(_) => {
				saved.set(saved_configurations(&repo, notices));
				notices.success("Configuration saved!");
				true
			}
			Err(err) => {
				warn!("save rejected: {err}");
				notices.error(err.to_string());
				false
			}
		}
	});
	let apply = move |config: GraphConfig, done: &str| {
		let title = config.title.clone();
		let mut repaired = false;
		model.update(|m| repaired = m.load(config));
		generated.set(true);
		info!("{done} configuration {title:?}");
		match applied_notice(done, repaired) {
			(NoticeKind::Error, message) => notices.error(message),
			(NoticeKind::Success, message) => notices.success(message),
		}
	};
	let on_load = Callback::new(move |config: GraphConfig| apply(config, "loaded"));
	let on_import = Callback::new(move |config: GraphConfig| apply(config, "imported"));
	let on_delete = Callback::new(move |id: String| match repo.remove(&id) {
		Ok(()) => {
			info!("deleted configuration {id}");
			saved.set(saved_configurations(&repo, notices));
			notices.success("Configuration deleted");
		}
		Err(err) => {
			error!("delete failed: {err}");
			notices.error(err.to_string());
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="designer">
				<header class="designer-header">
					<h1>"Bipartite Graph Designer"</h1>
					<p class="subtitle">
						"Create and customize interactive bipartite network visualizations"
					</p>
				</header>

				<div class="designer-grid">
					<aside class="panels">
						<div class="card">
							<GraphControls
								group_a=group_a
								group_b=group_b
								rotation=rotation
								on_group_a_change=on_group_a_change
								on_group_b_change=on_group_b_change
								on_rotation_change=on_rotation_change
							/>
							<div class="row">
								<button class="grow" on:click=generate>"Generate Graph"</button>
								<button class="outline" on:click=random_data>"Random Data"</button>
							</div>
						</div>

						<Show when=move || generated.get()>
							<div class="card">
								<EdgeControls
									edges=edges
									group_a=group_a
									group_b=group_b
									on_bulk_evidence=on_bulk_evidence
									on_randomize_weights=on_randomize_weights
									on_edges_change=on_edges_change
								/>
							</div>
						</Show>

						<div class="card">
							<button
								class="wide"
								disabled=move || !generated.get()
								on:click=move |_| dialog_open.set(true)
							>
								"Save/Load Configurations"
							</button>
						</div>
					</aside>

					<main class="card graph-card">
						<Show
							when=move || generated.get()
							fallback=|| {
								view! {
									<div class="placeholder">
										<p>
											"Configure your graph and click "
											"\"Generate Graph\" to begin"
										</p>
									</div>
								}
							}
						>
							<BipartiteGraph
								group_a=group_a
								group_b=group_b
								edges=edges
								rotation=rotation
							/>
						</Show>
					</main>
				</div>
			</div>

			<SaveLoadDialog
				open=dialog_open
				configurations=saved
				on_save=on_save
				on_load=on_load
				on_import=on_import
				on_delete=on_delete
				notices=notices
			/>
			<NoticeStack notices=notices />
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn import_and_load_report_their_own_action() {
		assert_eq!(
			applied_notice("imported", false),
			(NoticeKind::Success, "Configuration imported!".to_string())
		);
		assert_eq!(
			applied_notice("loaded", false),
			(NoticeKind::Success, "Configuration loaded!".to_string())
		);
		assert_eq!(applied_notice("imported", true).0, NoticeKind::Error);
	}
}
