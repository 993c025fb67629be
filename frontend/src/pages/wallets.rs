use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::wallet::{FUND_CHANNELS, format_money, parse_amount, total_balance};
use maisha_shared::{CashoutRequest, DEFAULT_CURRENCY, TopupRequest, Wallet, WalletTransaction};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{ArrowDownLeft, ArrowUpRight, FileText};
use crate::components::toast::use_notifier;
use crate::components::widgets::{
    EmptyRow, GroupPicker, GroupSelection, Loading, Modal, NoGroup, PageHeader, StatCard,
    TransactionTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Topup,
    Cashout,
}

impl Operation {
    fn title(&self) -> &'static str {
        match self {
            Operation::Topup => "Top Up Wallet",
            Operation::Cashout => "Cash Out",
        }
    }

    fn channel_label(&self) -> &'static str {
        match self {
            Operation::Topup => "Source",
            Operation::Cashout => "Method",
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    let s = s.trim().to_string();
    (!s.is_empty()).then_some(s)
}

fn currency_of(wallet: &Wallet) -> &str {
    if wallet.currency.is_empty() {
        DEFAULT_CURRENCY
    } else {
        &wallet.currency
    }
}

#[component]
pub fn WalletsPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let selection = GroupSelection::new(auth.scope());

    let wallets = RwSignal::new(Vec::<Wallet>::new());
    let loading = RwSignal::new(false);

    // 操作表单
    let op_open = RwSignal::new(false);
    let operation = RwSignal::new(Operation::Topup);
    let target = RwSignal::new(Option::<Wallet>::None);
    let amount = RwSignal::new(String::new());
    let channel = RwSignal::new(FUND_CHANNELS[0].to_string());
    let description = RwSignal::new(String::new());
    let reference = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    // 流水
    let history_open = RwSignal::new(false);
    let history = RwSignal::new(Vec::<WalletTransaction>::new());

    let load = {
        let api = api.clone();
        move |group_id: i64| {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_group_wallets(group_id).await {
                    Ok(list) => wallets.set(list),
                    Err(e) => notifier.api_error("Failed to load wallets", &e),
                }
                loading.set(false);
            });
        }
    };
    let load = StoredValue::new(load);

    Effect::new(move |_| {
        if let Some(group_id) = selection.group_id() {
            load.with_value(|f| f(group_id));
        }
    });

    let open_operation = move |op: Operation, wallet: Wallet| {
        operation.set(op);
        target.set(Some(wallet));
        amount.set(String::new());
        channel.set(FUND_CHANNELS[0].to_string());
        description.set(String::new());
        reference.set(String::new());
        op_open.set(true);
    };

    let open_history = {
        let api = api.clone();
        move |wallet: Wallet| {
            history.set(Vec::new());
            history_open.set(true);
            let api = api.clone();
            spawn_local(async move {
                match api.get_wallet_transactions(wallet.member_id).await {
                    Ok(list) => history.set(list),
                    Err(e) => notifier.api_error("Failed to load transactions", &e),
                }
            });
        }
    };
    let open_history = StoredValue::new(open_history);

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let (Some(wallet), Some(user)) = (target.get(), auth.user().get()) else {
                return;
            };
            let value = match parse_amount(&amount.get()) {
                Ok(v) => v,
                Err(msg) => {
                    notifier.error("Invalid amount", msg);
                    return;
                }
            };
            let op = operation.get();
            if op == Operation::Cashout && value > wallet.balance {
                notifier.error("Insufficient balance", "Amount exceeds the wallet balance");
                return;
            }

            submitting.set(true);
            let api = api.clone();
            let (desc, refr, chan) = (non_blank(description.get()), non_blank(reference.get()), channel.get());
            spawn_local(async move {
                let result = match op {
                    Operation::Topup => {
                        let mut req = TopupRequest::new(&user, wallet.member_id, value);
                        req.source = chan;
                        req.reference = refr;
                        if let Some(d) = desc {
                            req.description = d;
                        }
                        api.wallet_topup(&req).await
                    }
                    Operation::Cashout => {
                        let mut req = CashoutRequest::new(&user, wallet.member_id, value);
                        req.method = chan;
                        req.reference = refr;
                        if let Some(d) = desc {
                            req.description = d;
                        }
                        api.wallet_cashout(&req).await
                    }
                };
                match result {
                    Ok(()) => {
                        let msg = match op {
                            Operation::Topup => "Wallet topped up successfully",
                            Operation::Cashout => "Cash-out successful",
                        };
                        notifier.success("Success", msg);
                        op_open.set(false);
                        if let Some(group_id) = selection.group_id() {
                            load.with_value(|f| f(group_id));
                        }
                    }
                    Err(e) => notifier.api_error("Wallet operation failed", &e),
                }
                submitting.set(false);
            });
        }
    };

    let total = Signal::derive(move || wallets.with(|w| format_money(total_balance(w), DEFAULT_CURRENCY)));
    let count = Signal::derive(move || wallets.with(|w| w.len().to_string()));

    view! {
        <div class="space-y-6">
            <PageHeader title="Wallets" subtitle="Member wallets, top-ups and cash-outs">
                <GroupPicker selection=selection />
            </PageHeader>

            <Show when=move || selection.group_id().is_some() fallback=move || {
                if selection.scope.needs_group_picker() { view! { <Loading /> }.into_any() } else { view! { <NoGroup /> }.into_any() }
            }>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <StatCard title="Total Balance" value=total />
                    <StatCard title="Wallets" value=count />
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="overflow-x-auto">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Member"</th>
                                    <th class="hidden md:table-cell">"Phone"</th>
                                    <th>"Balance"</th>
                                    <th class="hidden md:table-cell">"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || !loading.get() && wallets.with(|w| w.is_empty())>
                                    <EmptyRow colspan=5 message="No wallets in this group" />
                                </Show>
                                <For
                                    each=move || wallets.get()
                                    key=|w| (w.id, w.balance.to_bits())
                                    children=move |wallet| {
                                        let (topup, cashout, hist) = (wallet.clone(), wallet.clone(), wallet.clone());
                                        view! {
                                            <tr>
                                                <td class="font-semibold">{wallet.owner_name()}</td>
                                                <td class="hidden md:table-cell">
                                                    {wallet.member.as_ref().map(|m| m.phone.clone()).unwrap_or_default()}
                                                </td>
                                                <td>{format_money(wallet.balance, currency_of(&wallet))}</td>
                                                <td class="hidden md:table-cell">
                                                    {if wallet.is_active {
                                                        view! { <span class="badge badge-success">"Active"</span> }.into_any()
                                                    } else {
                                                        view! { <span class="badge badge-ghost">"Inactive"</span> }.into_any()
                                                    }}
                                                </td>
                                                <td class="flex gap-1 justify-end">
                                                    <button class="btn btn-success btn-xs gap-1" on:click=move |_| open_operation(Operation::Topup, topup.clone())>
                                                        <ArrowDownLeft attr:class="h-3 w-3" /> "Top Up"
                                                    </button>
                                                    <button class="btn btn-warning btn-xs gap-1" on:click=move |_| open_operation(Operation::Cashout, cashout.clone())>
                                                        <ArrowUpRight attr:class="h-3 w-3" /> "Cash Out"
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| open_history.with_value(|f| f(hist.clone()))>
                                                        <FileText attr:class="h-4 w-4" />
                                                    </button>
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

            <Modal open=op_open title="Wallet Operation">
                <form class="space-y-3" on:submit=on_submit>
                    <p class="font-semibold">{move || operation.get().title()}</p>
                    <p class="text-sm text-base-content/70">
                        {move || target.with(|t| t.as_ref().map(|w| {
                            format!("{} · balance {}", w.owner_name(), format_money(w.balance, currency_of(w)))
                        }).unwrap_or_default())}
                    </p>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Amount"</span></label>
                        <input
                            type="number"
                            min="1"
                            class="input input-bordered"
                            prop:value=amount
                            on:input=move |ev| amount.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">{move || operation.get().channel_label()}</span></label>
                        <select class="select select-bordered" on:change=move |ev| channel.set(event_target_value(&ev))>
                            {FUND_CHANNELS
                                .iter()
                                .map(|c| view! { <option value=*c selected=move || channel.get() == *c>{c.replace('_', " ")}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Description"</span></label>
                        <input class="input input-bordered" prop:value=description on:input=move |ev| description.set(event_target_value(&ev)) />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Reference"</span></label>
                        <input class="input input-bordered" prop:value=reference on:input=move |ev| reference.set(event_target_value(&ev)) />
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| op_open.set(false)>"Cancel"</button>
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                            {move || if submitting.get() { "Processing..." } else { "Confirm" }}
                        </button>
                    </div>
                </form>
            </Modal>

            <Modal open=history_open title="Transaction History">
                <TransactionTable transactions=history />
            </Modal>
        </div>
    }
}
