use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::wallet::format_money;
use maisha_shared::withdrawal::pending_count;
use maisha_shared::{DEFAULT_CURRENCY, Feature, RejectWithdrawalPayload, WithdrawalRequest, date};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{Check, RefreshCw, XMark};
use crate::components::toast::use_notifier;
use crate::components::widgets::{
    EmptyRow, GroupPicker, GroupSelection, NoGroup, PageHeader, StatCard,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

#[component]
pub fn WithdrawalsPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let selection = GroupSelection::new(auth.scope());

    let requests = RwSignal::new(Vec::<WithdrawalRequest>::new());
    let loading = RwSignal::new(false);
    let processing = RwSignal::new(Option::<i64>::None);

    let load = {
        let api = api.clone();
        move |group_id: i64| {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_withdrawal_requests(group_id).await {
                    Ok(list) => requests.set(list),
                    Err(e) => notifier.api_error("Failed to load withdrawal requests", &e),
                }
                loading.set(false);
            });
        }
    };
    let load = StoredValue::new(load);
    let reload = move || {
        if let Some(group_id) = selection.group_id() {
            load.with_value(|f| f(group_id));
        }
    };
    Effect::new(move |_| reload());

    let decide = {
        let api = api.clone();
        move |id: i64, decision: Decision| {
            let api = api.clone();
            let admin = auth.display_name();
            processing.set(Some(id));
            spawn_local(async move {
                let result = match decision {
                    Decision::Approve => api.approve_withdrawal(id, &admin).await,
                    Decision::Reject => {
                        api.reject_withdrawal(id, &RejectWithdrawalPayload::by_admin(&admin))
                            .await
                    }
                };
                match result {
                    Ok(()) => {
                        let msg = match decision {
                            Decision::Approve => "Withdrawal approved",
                            Decision::Reject => "Withdrawal rejected",
                        };
                        notifier.success("Success", msg);
                        reload();
                    }
                    Err(e) => notifier.api_error("Failed to process withdrawal", &e),
                }
                processing.set(None);
            });
        }
    };
    let decide = StoredValue::new(decide);

    let can_approve = move || auth.authorize(Feature::ApproveWithdrawals);
    let pending = Signal::derive(move || requests.with(|r| pending_count(r).to_string()));
    let total = Signal::derive(move || requests.with(|r| r.len().to_string()));

    view! {
        <div class="space-y-6">
            <PageHeader title="Withdrawal Requests" subtitle="Review member withdrawal requests">
                <GroupPicker selection=selection />
                <button class="btn btn-ghost btn-circle" on:click=move |_| reload()>
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </PageHeader>

            <Show
                when=move || selection.group_id().is_some() || selection.scope.needs_group_picker()
                fallback=|| view! { <NoGroup /> }
            >
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <StatCard title="Pending" value=pending description="Awaiting approval" />
                    <StatCard title="Total Requests" value=total />
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="overflow-x-auto">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Member"</th>
                                    <th>"Amount"</th>
                                    <th class="hidden md:table-cell">"Phone"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Requested"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || !loading.get() && requests.with(|r| r.is_empty())>
                                    <EmptyRow colspan=6 message="No withdrawal requests" />
                                </Show>
                                <For
                                    each=move || requests.get()
                                    key=|r| (r.id, r.status.clone())
                                    children=move |req| {
                                        let id = req.id;
                                        let status = req.status();
                                        let busy = move || processing.get() == Some(id);
                                        view! {
                                            <tr>
                                                <td class="font-semibold">{req.requester()}</td>
                                                <td>{format_money(req.amount, DEFAULT_CURRENCY)}</td>
                                                <td class="hidden md:table-cell">{req.phone.clone()}</td>
                                                <td>
                                                    <span class=status.badge_class()>{req.status.clone()}</span>
                                                    {req.notes.clone().map(|n| view! { <p class="text-xs text-base-content/60">{n}</p> })}
                                                </td>
                                                <td class="hidden md:table-cell text-sm">{date::display(&req.created_at)}</td>
                                                <td>
                                                    <Show when=move || status.is_actionable() && can_approve()>
                                                        <div class="flex gap-1 justify-end">
                                                            <button
                                                                class="btn btn-success btn-xs gap-1"
                                                                disabled=busy
                                                                on:click=move |_| decide.with_value(|f| f(id, Decision::Approve))
                                                            >
                                                                <Check attr:class="h-3 w-3" /> "Approve"
                                                            </button>
                                                            <button
                                                                class="btn btn-error btn-xs gap-1"
                                                                disabled=busy
                                                                on:click=move |_| decide.with_value(|f| f(id, Decision::Reject))
                                                            >
                                                                <XMark attr:class="h-3 w-3" /> "Reject"
                                                            </button>
                                                        </div>
                                                    </Show>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </Show>
        </div>
    }
}
