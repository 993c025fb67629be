use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::payment::{InitiateResponse, PaymentForm, TransferForm};
use maisha_shared::wallet::format_money;
use maisha_shared::{DEFAULT_CURRENCY, PaymentStatus, PaymentStatusDoc, PaymentTransaction, date};

use crate::api::use_api;
use crate::components::icons::{CreditCard, Plus, RefreshCw, Search, Trash2};
use crate::components::toast::use_notifier;
use crate::components::widgets::{EmptyRow, PageHeader};

/// 网关可能在 200 响应里返回 `error` 而没有交易号
fn initiate_outcome(resp: InitiateResponse) -> Result<String, String> {
    match (resp.transaction_id, resp.error) {
        (Some(id), _) if !id.is_empty() => Ok(id),
        (_, Some(err)) if !err.is_empty() => Err(err),
        _ => Err("The gateway did not return a transaction ID".to_string()),
    }
}

fn currency_or_default(currency: &str) -> &str {
    if currency.is_empty() { DEFAULT_CURRENCY } else { currency }
}

#[component]
pub fn PaymentsPage() -> impl IntoView {
    let api = use_api();
    let notifier = use_notifier();

    let form = RwSignal::new(PaymentForm::default());
    // (行号, 行内容)，行号只用于 For 的 key
    let transfers = RwSignal::new(Vec::<(usize, RwSignal<TransferForm>)>::new());
    let next_row = StoredValue::new(0usize);
    let submitting = RwSignal::new(false);

    let status_id = RwSignal::new(String::new());
    let status = RwSignal::new(Option::<PaymentStatusDoc>::None);
    let checking = RwSignal::new(false);

    let transactions = RwSignal::new(Vec::<PaymentTransaction>::new());
    let loading = RwSignal::new(false);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_transactions().await {
                    Ok(list) => transactions.set(list),
                    Err(e) => notifier.api_error("Failed to load transactions", &e),
                }
                loading.set(false);
            });
        }
    };
    load();
    let load = StoredValue::new(load);

    let check_status = {
        let api = api.clone();
        move |id: String| {
            let api = api.clone();
            checking.set(true);
            spawn_local(async move {
                match api.check_payment_status(&id).await {
                    Ok(doc) => status.set(Some(doc)),
                    Err(e) => {
                        status.set(None);
                        notifier.api_error("Failed to check payment status", &e);
                    }
                }
                checking.set(false);
            });
        }
    };
    let check_status = StoredValue::new(check_status);

    let add_transfer = move |_| {
        let row = next_row.get_value();
        next_row.set_value(row + 1);
        transfers.update(|rows| rows.push((row, RwSignal::new(TransferForm::default()))));
    };

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let mut current = form.get();
            current.transfers = transfers.with(|rows| rows.iter().map(|(_, t)| t.get()).collect());
            let payload = match current.to_request() {
                Ok(p) => p,
                Err(msg) => {
                    notifier.error("Invalid payment", msg);
                    return;
                }
            };
            submitting.set(true);
            let api = api.clone();
            spawn_local(async move {
                match api.initiate_payment(&payload).await.map(initiate_outcome) {
                    Ok(Ok(id)) => {
                        log::info!("[Payments] initiated {}", id);
                        notifier.success("Payment Initiated", format!("Transaction ID: {}", id));
                        form.set(PaymentForm::default());
                        transfers.set(Vec::new());
                        status_id.set(id);
                        load.with_value(|reload| reload());
                    }
                    Ok(Err(msg)) => notifier.error("Payment failed", msg),
                    Err(e) => notifier.api_error("Failed to initiate payment", &e),
                }
                submitting.set(false);
            });
        }
    };

    let field = move |label: &'static str, kind: &'static str, get: fn(&PaymentForm) -> String, set: fn(&mut PaymentForm, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered"
                    prop:value=move || form.with(get)
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| set(f, value));
                    }
                />
            </div>
        }
    };

    let transfer_input = |row: RwSignal<TransferForm>, placeholder: &'static str, get: fn(&TransferForm) -> String, set: fn(&mut TransferForm, String)| {
        view! {
            <input
                class="input input-bordered input-sm"
                placeholder=placeholder
                prop:value=move || row.with(get)
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    row.update(|t| set(t, value));
                }
            />
        }
    };

    view! {
        <div class="space-y-6">
            <PageHeader title="Payments" subtitle="Initiate mobile-money payments and track their status" />

            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                <div class="card bg-base-100 shadow">
                    <form class="card-body space-y-2" on:submit=on_submit>
                        <div class="flex items-center gap-2">
                            <CreditCard attr:class="h-5 w-5 text-primary" />
                            <h3 class="card-title">"Initiate Payment"</h3>
                        </div>
                        <div class="grid grid-cols-2 gap-3">
                            {field("Amount", "number", |f| f.amount.clone(), |f, v| f.amount = v)}
                            {field("Currency", "text", |f| f.currency.clone(), |f, v| f.currency = v)}
                            {field("Phone", "tel", |f| f.phone.clone(), |f, v| f.phone = v)}
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Payment Mode"</span></label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| {
                                        let value = event_target_value(&ev);
                                        form.update(|f| f.payment_mode = value);
                                    }
                                >
                                    <option value="MOBILE" selected=move || form.with(|f| f.payment_mode == "MOBILE")>"Mobile Money"</option>
                                    <option value="CARD" selected=move || form.with(|f| f.payment_mode == "CARD")>"Card"</option>
                                </select>
                            </div>
                        </div>
                        {field("Message", "text", |f| f.message.clone(), |f, v| f.message = v)}
                        {field("Callback URL", "url", |f| f.callback_url.clone(), |f, v| f.callback_url = v)}

                        <div class="divider my-1">"Transfers"</div>
                        <For
                            each=move || transfers.get()
                            key=|(row, _)| *row
                            children=move |(row, transfer)| view! {
                                <div class="flex gap-2 items-center">
                                    {transfer_input(transfer, "Amount", |t| t.amount.clone(), |t, v| t.amount = v)}
                                    {transfer_input(transfer, "Phone", |t| t.phone.clone(), |t, v| t.phone = v)}
                                    {transfer_input(transfer, "Message", |t| t.message.clone(), |t, v| t.message = v)}
                                    <button
                                        type="button"
                                        class="btn btn-ghost btn-sm text-error"
                                        on:click=move |_| transfers.update(|rows| rows.retain(|(r, _)| *r != row))
                                    >
                                        <Trash2 attr:class="h-4 w-4" />
                                    </button>
                                </div>
                            }
                        />
                        <button type="button" class="btn btn-ghost btn-sm gap-2 w-fit" on:click=add_transfer>
                            <Plus attr:class="h-4 w-4" /> "Add Transfer"
                        </button>

                        <div class="card-actions justify-end">
                            <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                                {move || if submitting.get() { "Processing..." } else { "Initiate Payment" }}
                            </button>
                        </div>
                    </form>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body space-y-3">
                        <h3 class="card-title">"Check Status"</h3>
                        <div class="join w-full">
                            <input
                                class="input input-bordered join-item w-full"
                                placeholder="Transaction ID"
                                prop:value=status_id
                                on:input=move |ev| status_id.set(event_target_value(&ev))
                            />
                            <button
                                class="btn btn-primary join-item"
                                disabled=move || checking.get()
                                on:click=move |_| check_status.with_value(|f| f(status_id.get()))
                            >
                                <Search attr:class="h-4 w-4" />
                            </button>
                        </div>
                        {move || status.get().map(|doc| {
                            let badge = doc.status();
                            view! {
                                <div class="space-y-2 text-sm">
                                    <div class="flex justify-between">
                                        <span class="font-mono">{doc.transaction_id.clone()}</span>
                                        {badge.map(|s| view! { <span class=s.badge_class()>{s.label()}</span> })}
                                    </div>
                                    <p>"Phone: " {doc.phone.clone()}</p>
                                    <p>"Amount: " {format_money(doc.amount, DEFAULT_CURRENCY)}</p>
                                    <Show when={
                                        let has_transfers = !doc.transfers.is_empty();
                                        move || has_transfers
                                    }>
                                        <p class="font-semibold">"Transfers"</p>
                                    </Show>
                                    <ul class="space-y-1">
                                        {doc.transfers.iter().map(|t| {
                                            let badge = t.status.map(PaymentStatus::from_code);
                                            view! {
                                                <li class="flex justify-between">
                                                    <span>{t.phone.clone()} " · " {format_money(t.amount, DEFAULT_CURRENCY)}</span>
                                                    {badge.map(|s| view! { <span class=s.badge_class()>{s.label()}</span> })}
                                                </li>
                                            }
                                        }).collect_view()}
                                    </ul>
                                </div>
                            }
                        })}
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h3 class="card-title">"Transactions"</h3>
                        <button class="btn btn-ghost btn-circle" on:click=move |_| load.with_value(|reload| reload())>
                            <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                    </div>
                    <div class="overflow-x-auto">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Transaction"</th>
                                    <th>"Phone"</th>
                                    <th>"Amount"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Date"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || !loading.get() && transactions.with(|t| t.is_empty())>
                                    <EmptyRow colspan=6 message="No transactions yet" />
                                </Show>
                                <For
                                    each=move || transactions.get()
                                    key=|t| (t.id, t.status)
                                    children=move |t| {
                                        let tx_id = t.transaction_id.clone();
                                        let badge = t.status();
                                        view! {
                                            <tr>
                                                <td class="font-mono text-xs">{t.transaction_id.clone()}</td>
                                                <td>{t.phone.clone()}</td>
                                                <td>{format_money(t.amount, currency_or_default(&t.currency))}</td>
                                                <td>
                                                    {badge.map(|s| view! { <span class=s.badge_class()>{s.label()}</span> })}
                                                </td>
                                                <td class="hidden md:table-cell text-sm">{date::display(&t.created_at)}</td>
                                                <td>
                                                    <button
                                                        class="btn btn-ghost btn-xs"
                                                        on:click=move |_| {
                                                            status_id.set(tx_id.clone());
                                                            check_status.with_value(|f| f(tx_id.clone()));
                                                        }
                                                    >
                                                        "Check"
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
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_prefers_transaction_id() {
        let resp = InitiateResponse {
            transaction_id: Some("TX-1".to_string()),
            error: None,
        };
        assert_eq!(initiate_outcome(resp), Ok("TX-1".to_string()));
    }

    #[test]
    fn outcome_surfaces_gateway_error() {
        let resp = InitiateResponse {
            transaction_id: None,
            error: Some("Insufficient funds".to_string()),
        };
        assert_eq!(initiate_outcome(resp), Err("Insufficient funds".to_string()));
        assert!(initiate_outcome(InitiateResponse::default()).is_err());
    }

    #[test]
    fn blank_currency_falls_back() {
        assert_eq!(currency_or_default(""), "RWF");
        assert_eq!(currency_or_default("USD"), "USD");
    }
}
