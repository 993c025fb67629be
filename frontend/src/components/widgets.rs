//! 通用界面部件

use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::date;
use maisha_shared::wallet::format_money;
use maisha_shared::{DEFAULT_CURRENCY, Group, GroupScope, WalletTransaction};

use crate::api::use_api;
use crate::components::icons::{ArrowDownLeft, ArrowUpRight, ShieldCheck};
use crate::components::toast::use_notifier;

#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-16">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

#[component]
pub fn AccessDenied() -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl max-w-lg mx-auto mt-16">
            <div class="card-body items-center text-center">
                <ShieldCheck attr:class="h-12 w-12 text-error" />
                <h2 class="card-title">"Access Denied"</h2>
                <p class="text-base-content/70">"You do not have permission to view this page."</p>
            </div>
        </div>
    }
}

#[component]
pub fn PageHeader(
    #[prop(into)] title: String,
    #[prop(into)] subtitle: String,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4">
            <div>
                <h1 class="text-3xl font-bold">{title}</h1>
                <p class="text-base-content/70 mt-1">{subtitle}</p>
            </div>
            <div class="flex gap-2">{children.map(|c| c())}</div>
        </div>
    }
}

#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: Signal<String>,
    #[prop(optional, into)] description: Option<String>,
) -> impl IntoView {
    view! {
        <div class="stat bg-base-100 rounded-box shadow">
            <div class="stat-title">{title}</div>
            <div class="stat-value text-primary text-2xl">{move || value.get()}</div>
            {description.map(|d| view! { <div class="stat-desc">{d}</div> })}
        </div>
    }
}

/// 表格无数据时的占位行
#[component]
pub fn EmptyRow(colspan: u32, #[prop(into)] message: String) -> impl IntoView {
    view! {
        <tr>
            <td colspan=colspan.to_string() class="text-center py-8 text-base-content/50">
                {message}
            </td>
        </tr>
    }
}

/// 模态框，打开状态由 `open` 控制
#[component]
pub fn Modal(open: RwSignal<bool>, #[prop(into)] title: String, children: Children) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        let Some(dialog) = dialog_ref.get() else {
            return;
        };
        if open.get() {
            if !dialog.open() {
                let _ = dialog.show_modal();
            }
        } else if dialog.open() {
            dialog.close();
        }
    });

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg mb-4">{title}</h3>
                {children()}
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}

/// 钱包流水表
#[component]
pub fn TransactionTable(#[prop(into)] transactions: Signal<Vec<WalletTransaction>>) -> impl IntoView {
    view! {
        <div class="overflow-x-auto">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"Type"</th>
                        <th>"Amount"</th>
                        <th class="hidden md:table-cell">"Balance After"</th>
                        <th class="hidden md:table-cell">"Description"</th>
                        <th>"Date"</th>
                    </tr>
                </thead>
                <tbody>
                    <Show when=move || transactions.with(|t| t.is_empty())>
                        <EmptyRow colspan=5 message="No transactions yet" />
                    </Show>
                    <For
                        each=move || transactions.get()
                        key=|t| t.id
                        children=|tx| {
                            let credit = tx.is_credit();
                            view! {
                                <tr>
                                    <td>
                                        <div class="flex items-center gap-2 capitalize">
                                            {if credit {
                                                view! { <ArrowDownLeft attr:class="h-4 w-4 text-success" /> }.into_any()
                                            } else {
                                                view! { <ArrowUpRight attr:class="h-4 w-4 text-error" /> }.into_any()
                                            }}
                                            {tx.transaction_type.clone()}
                                        </div>
                                    </td>
                                    <td class=if credit { "text-success" } else { "text-error" }>
                                        {format!("{}{}", if credit { "+" } else { "-" }, format_money(tx.amount, DEFAULT_CURRENCY))}
                                    </td>
                                    <td class="hidden md:table-cell">{format_money(tx.balance_after, DEFAULT_CURRENCY)}</td>
                                    <td class="hidden md:table-cell">{tx.description.clone()}</td>
                                    <td class="text-sm">{date::display(&tx.created_at)}</td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}

// =========================================================
// 小组范围
// =========================================================

/// 页面使用的小组
///
/// super_admin 从小组列表中选择（默认第一个），小组角色固定为自己的小组。
#[derive(Clone, Copy)]
pub struct GroupSelection {
    pub scope: GroupScope,
    pub groups: RwSignal<Vec<Group>>,
    pub selected: RwSignal<Option<i64>>,
}

impl GroupSelection {
    pub fn new(scope: GroupScope) -> Self {
        let selection = Self {
            scope,
            groups: RwSignal::new(Vec::new()),
            selected: RwSignal::new(scope.resolve(None)),
        };

        if scope.needs_group_picker() {
            let api = use_api();
            let notifier = use_notifier();
            spawn_local(async move {
                match api.get_groups().await {
                    Ok(groups) => {
                        if selection.selected.get_untracked().is_none() {
                            selection.selected.set(groups.first().map(|g| g.id));
                        }
                        selection.groups.set(groups);
                    }
                    Err(e) => notifier.api_error("Failed to load groups", &e),
                }
            });
        }
        selection
    }

    /// 当前小组（响应式）
    pub fn group_id(&self) -> Option<i64> {
        self.scope.resolve(self.selected.get())
    }
}

/// super_admin 的小组选择器；其他角色不渲染
#[component]
pub fn GroupPicker(selection: GroupSelection) -> impl IntoView {
    let on_change = move |ev| {
        selection
            .selected
            .set(event_target_value(&ev).parse::<i64>().ok());
    };

    view! {
        <Show when=move || selection.scope.needs_group_picker()>
            <select class="select select-bordered w-64" on:change=on_change>
                <For
                    each=move || selection.groups.get()
                    key=|g| g.id
                    children=move |group| {
                        let id = group.id;
                        view! {
                            <option
                                value=id.to_string()
                                selected=move || selection.selected.get() == Some(id)
                            >
                                {group.name}
                            </option>
                        }
                    }
                />
            </select>
        </Show>
    }
}

/// 没有可用小组时的提示
#[component]
pub fn NoGroup() -> impl IntoView {
    view! {
        <div role="alert" class="alert">
            <span>"No group is associated with this account."</span>
        </div>
    }
}
