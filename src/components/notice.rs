//! Short-lived user notifications.

use std::time::Duration;

use leptos::prelude::*;

const NOTICE_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
	Success,
	Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	pub id: u64,
	pub kind: NoticeKind,
	pub message: String,
}

/// A queue of visible notices, shared by copy.
#[derive(Clone, Copy)]
pub struct Notices {
	items: RwSignal<Vec<Notice>>,
	next_id: RwSignal<u64>,
}

impl Notices {
	pub fn new() -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
			next_id: RwSignal::new(0),
		}
	}

	pub fn success(&self, message: impl Into<String>) {
		self.push(NoticeKind::Success, message.into());
	}

	pub fn error(&self, message: impl Into<String>) {
		self.push(NoticeKind::Error, message.into());
	}

	fn push(&self, kind: NoticeKind, message: String) {
		let id = self.next_id.get_untracked();
		self.next_id.set(id + 1);
		self.items.update(|items| items.push(Notice { id, kind, message }));
		let items = self.items;
		set_timeout(
			move || items.update(|items| items.retain(|n| n.id != id)),
			NOTICE_LIFETIME,
		);
	}
}

#[component]
pub fn NoticeStack(notices: Notices) -> impl IntoView {
	view! {
		<div class="notice-stack" role="status">
			<For
				each=move || notices.items.get()
				key=|notice| notice.id
				children=move |notice| {
					let class = match notice.kind {
						NoticeKind::Success => "notice notice-success",
						NoticeKind::Error => "notice notice-error",
					};
					view! { <div class=class>{notice.message}</div> }
				}
			/>
		</div>
	}
}
