//! Form panels editing the model. They never mutate state themselves:
//! every edit is reported as a full replacement value.

use leptos::prelude::*;

use crate::model::{
	Edge, Evidence, MAX_GROUP_COUNT, MAX_WEIGHT, MIN_GROUP_COUNT, MIN_WEIGHT, NodeGroup,
	ROTATION_RANGE,
};

#[component]
fn GroupFields(
	title: &'static str,
	id_prefix: &'static str,
	placeholder: &'static str,
	#[prop(into)] group: Signal<NodeGroup>,
	on_change: Callback<NodeGroup>,
) -> impl IntoView {
	let edit = move |apply: &dyn Fn(&mut NodeGroup)| {
		let mut next = group.get_untracked();
		apply(&mut next);
		on_change.run(next);
	};

	view! {
		<fieldset class="group-fields">
			<legend>{title}</legend>
			<label for=format!("{id_prefix}-name")>"Group Name"</label>
			<input
				id=format!("{id_prefix}-name")
				type="text"
				placeholder=placeholder
				prop:value=move || group.get().name
				on:input=move |ev| {
					let name = event_target_value(&ev);
					edit(&|g| g.name = name.clone());
				}
			/>
			<label for=format!("{id_prefix}-count")>
				{move || format!("Node Count: {}", group.get().count)}
			</label>
			<input
				id=format!("{id_prefix}-count")
				type="range"
				min=MIN_GROUP_COUNT.to_string()
				max=MAX_GROUP_COUNT.to_string()
				step="1"
				prop:value=move || group.get().count.to_string()
				on:input=move |ev| {
					if let Ok(count) = event_target_value(&ev).parse::<usize>() {
						edit(&|g| g.count = count);
					}
				}
			/>
			<label for=format!("{id_prefix}-color")>"Color"</label>
			<div class="color-row">
				<input
					id=format!("{id_prefix}-color")
					type="color"
					prop:value=move || group.get().color
					on:input=move |ev| {
						let color = event_target_value(&ev);
						edit(&|g| g.color = color.clone());
					}
				/>
				<span class="muted">{move || group.get().color}</span>
			</div>
		</fieldset>
	}
}

/// Names, sizes and colors of both groups plus the diagram rotation.
#[component]
pub fn GraphControls(
	#[prop(into)] group_a: Signal<NodeGroup>,
	#[prop(into)] group_b: Signal<NodeGroup>,
	#[prop(into)] rotation: Signal<f64>,
	on_group_a_change: Callback<NodeGroup>,
	on_group_b_change: Callback<NodeGroup>,
	on_rotation_change: Callback<f64>,
) -> impl IntoView {
	view! {
		<div class="graph-controls">
			<h3>"Graph Configuration"</h3>
			<GroupFields
				title="Group A"
				id_prefix="groupA"
				placeholder="e.g., Users, Genes"
				group=group_a
				on_change=on_group_a_change
			/>
			<GroupFields
				title="Group B"
				id_prefix="groupB"
				placeholder="e.g., Features, Diseases"
				group=group_b
				on_change=on_group_b_change
			/>
			<label for="rotation">{move || format!("Graph Rotation: {}°", rotation.get())}</label>
			<input
				id="rotation"
				type="range"
				min=ROTATION_RANGE.0.to_string()
				max=ROTATION_RANGE.1.to_string()
				step="5"
				prop:value=move || rotation.get().to_string()
				on:input=move |ev| {
					if let Ok(degrees) = event_target_value(&ev).parse::<f64>() {
						on_rotation_change.run(degrees);
					}
				}
			/>
		</div>
	}
}

/// Per-edge weight and evidence editors with bulk actions.
#[component]
pub fn EdgeControls(
	#[prop(into)] edges: Signal<Vec<Edge>>,
	#[prop(into)] group_a: Signal<NodeGroup>,
	#[prop(into)] group_b: Signal<NodeGroup>,
	/// Sets every edge to one evidence category.
	on_bulk_evidence: Callback<Evidence>,
	on_randomize_weights: Callback<()>,
	on_edges_change: Callback<Vec<Edge>>,
) -> impl IntoView {
	let bulk = [Evidence::Strong, Evidence::Moderate, Evidence::Weak]
		.into_iter()
		.map(|evidence| {
			view! {
				<button class="outline small" on:click=move |_| on_bulk_evidence.run(evidence)>
					{format!("All {evidence}")}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="edge-controls">
			<div class="row spread">
				<h3>"Edge Controls"</h3>
				<span class="muted">{move || format!("{} connections", edges.with(Vec::len))}</span>
			</div>
			<div class="bulk-actions">
				<span>"Bulk Actions"</span>
				<div class="row wrap">
					{bulk}
					<button class="outline small" on:click=move |_| on_randomize_weights.run(())>
						"Random Weights"
					</button>
				</div>
			</div>
			<div class="edge-list">
				<For
					each=move || {
						edges.with(|edges| {
							edges.iter().map(|e| (e.from, e.to)).enumerate().collect::<Vec<_>>()
						})
					}
					key=|entry| *entry
					children=move |(index, (from, to))| {
						view! {
							<EdgeRow
								index=index
								from=from
								to=to
								edges=edges
								group_a=group_a
								group_b=group_b
								on_change=on_edges_change
							/>
						}
					}
				/>
			</div>
		</div>
	}
}

#[component]
fn EdgeRow(
	index: usize,
	from: usize,
	to: usize,
	edges: Signal<Vec<Edge>>,
	group_a: Signal<NodeGroup>,
	group_b: Signal<NodeGroup>,
	on_change: Callback<Vec<Edge>>,
) -> impl IntoView {
	let edge = move || edges.with(|edges| edges.get(index).cloned());
	let edit = move |apply: &dyn Fn(&mut Edge)| {
		let mut next = edges.get_untracked();
		if let Some(edge) = next.get_mut(index) {
			apply(edge);
			on_change.run(next);
		}
	};
	let evidence_options = Evidence::ALL
		.into_iter()
		.map(|evidence| {
			view! {
				<option
					value=evidence.label()
					prop:selected=move || edge().map(|e| e.evidence) == Some(evidence)
				>
					{evidence.label()}
				</option>
			}
		})
		.collect_view();

	view! {
		<div class="edge-row">
			<div class="edge-title">
				{move || {
					format!(
						"{} {} → {} {}",
						group_a.with(|g| g.name.clone()),
						from + 1,
						group_b.with(|g| g.name.clone()),
						to + 1,
					)
				}}
			</div>
			<div class="edge-fields">
				<label>
					{move || format!("Weight: {}", edge().map_or(0.0, |e| e.weight))}
					<input
						type="range"
						min=MIN_WEIGHT.to_string()
						max=MAX_WEIGHT.to_string()
						step="0.1"
						prop:value=move || edge().map_or(String::new(), |e| e.weight.to_string())
						on:input=move |ev| {
							if let Ok(weight) = event_target_value(&ev).parse::<f64>() {
								edit(&|e| e.weight = weight);
							}
						}
					/>
				</label>
				<label>
					"Evidence"
					<select on:change=move |ev| {
						if let Some(evidence) = Evidence::from_label(&event_target_value(&ev)) {
							edit(&|e| e.evidence = evidence);
						}
					}>
						{evidence_options}
					</select>
				</label>
			</div>
		</div>
	}
}
