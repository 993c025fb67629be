//! 通知提示
//!
//! 页面通过 [`use_notifier`] 推送提示，[`ToastHost`] 统一渲染，3 秒后自动消失。

use std::time::Duration;

use leptos::prelude::*;

use crate::api::ApiError;

const TOAST_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    id: u64,
    pub title: String,
    pub description: String,
    pub is_error: bool,
}

#[derive(Clone, Copy)]
pub struct Notifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn success(&self, title: &str, description: impl Into<String>) {
        self.push(title, description.into(), false);
    }

    pub fn error(&self, title: &str, description: impl Into<String>) {
        self.push(title, description.into(), true);
    }

    /// 接口错误统一以错误提示展示
    pub fn api_error(&self, title: &str, err: &ApiError) {
        log::warn!("{}: {} [{}]", title, err, err.error_code());
        self.push(title, err.to_string(), true);
    }

    fn push(&self, title: &str, description: String, is_error: bool) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                title: title.to_string(),
                description,
                is_error,
            })
        });

        let toasts = self.toasts;
        set_timeout(
            move || toasts.update(|list| list.retain(|t| t.id != id)),
            TOAST_LIFETIME,
        );
    }
}

pub fn use_notifier() -> Notifier {
    expect_context::<Notifier>()
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let notifier = use_notifier();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || notifier.toasts.get()
                key=|t| t.id
                children=move |toast| {
                    let class = if toast.is_error {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    view! {
                        <div class=class>
                            <div class="flex flex-col">
                                <span class="font-bold">{toast.title}</span>
                                <span class="text-sm">{toast.description}</span>
                            </div>
                        </div>
                    }
                }
            />
        </div>
    }
}
