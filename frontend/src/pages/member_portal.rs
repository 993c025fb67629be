use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::report::MyReport;
use maisha_shared::wallet::{format_money, parse_amount};
use maisha_shared::{CreateWithdrawalPayload, DEFAULT_CURRENCY, date};

use crate::api::use_api;
use crate::components::icons::{DollarSign, RefreshCw};
use crate::components::toast::use_notifier;
use crate::components::widgets::{EmptyRow, Loading, Modal, PageHeader, StatCard, TransactionTable};

/// 提现申请：电话留空时使用成员登记的号码
fn withdrawal_payload(
    member_id: i64,
    amount: &str,
    phone: &str,
    member_phone: &str,
    notes: &str,
) -> Result<CreateWithdrawalPayload, String> {
    let amount = parse_amount(amount)?;
    let phone = match phone.trim() {
        "" => member_phone.trim(),
        p => p,
    };
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }
    Ok(CreateWithdrawalPayload {
        member_id,
        amount,
        phone: phone.to_string(),
        notes: (!notes.trim().is_empty()).then(|| notes.trim().to_string()),
    })
}

#[component]
pub fn MemberPortalPage() -> impl IntoView {
    let api = use_api();
    let notifier = use_notifier();

    let report = RwSignal::new(MyReport::default());
    let loading = RwSignal::new(true);

    let form_open = RwSignal::new(false);
    let amount = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let notes = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_my_report().await {
                    Ok(data) => report.set(data),
                    Err(e) => notifier.api_error("Failed to load member data", &e),
                }
                loading.set(false);
            });
        }
    };
    load();
    let load = StoredValue::new(load);

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(member) = report.with(|r| r.member.clone()) else {
                notifier.error("Unavailable", "No member record is linked to this account");
                return;
            };
            let payload = match withdrawal_payload(member.id, &amount.get(), &phone.get(), &member.phone, &notes.get()) {
                Ok(p) => p,
                Err(msg) => {
                    notifier.error("Invalid request", msg);
                    return;
                }
            };
            submitting.set(true);
            let api = api.clone();
            spawn_local(async move {
                match api.create_withdrawal_request(&payload).await {
                    Ok(()) => {
                        notifier.success("Success", "Withdrawal request submitted successfully");
                        amount.set(String::new());
                        phone.set(String::new());
                        notes.set(String::new());
                        form_open.set(false);
                        load.with_value(|reload| reload());
                    }
                    Err(e) => notifier.api_error("Failed to submit withdrawal request", &e),
                }
                submitting.set(false);
            });
        }
    };

    let balance = Signal::derive(move || {
        report.with(|r| {
            r.wallet
                .as_ref()
                .map(|w| {
                    let currency = if w.currency.is_empty() { DEFAULT_CURRENCY } else { &w.currency };
                    format_money(w.balance, currency)
                })
                .unwrap_or_else(|| "No wallet".to_string())
        })
    });
    let member_name = move || {
        report.with(|r| {
            r.member
                .as_ref()
                .map(|m| format!("{} {}", m.first_name, m.last_name).trim().to_string())
                .unwrap_or_default()
        })
    };
    let member_phone = move || report.with(|r| r.member.as_ref().map(|m| m.phone.clone()).unwrap_or_default());
    let transactions = Signal::derive(move || report.with(|r| r.transactions.clone()));

    view! {
        <div class="space-y-6">
            <PageHeader title="My Wallet" subtitle="Your balance, transactions and withdrawal requests">
                <button class="btn btn-ghost btn-circle" on:click=move |_| load.with_value(|reload| reload())>
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
                <button
                    class="btn btn-primary gap-2"
                    disabled=move || report.with(|r| r.member.is_none())
                    on:click=move |_| form_open.set(true)
                >
                    <DollarSign attr:class="h-4 w-4" /> "Request Withdrawal"
                </button>
            </PageHeader>

            <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <StatCard title="Wallet Balance" value=balance />
                    <StatCard
                        title="Member"
                        value=Signal::derive(member_name)
                        description=member_phone()
                    />
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h3 class="card-title">"Transactions"</h3>
                        <TransactionTable transactions=transactions />
                    </div>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h3 class="card-title">"Withdrawal Requests"</h3>
                        <div class="overflow-x-auto">
                            <table class="table w-full">
                                <thead>
                                    <tr>
                                        <th>"Amount"</th>
                                        <th>"Phone"</th>
                                        <th>"Status"</th>
                                        <th>"Requested"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <Show when=move || report.with(|r| r.withdrawal_requests.is_empty())>
                                        <EmptyRow colspan=4 message="No withdrawal requests yet" />
                                    </Show>
                                    <For
                                        each=move || report.with(|r| r.withdrawal_requests.clone())
                                        key=|w| (w.id, w.status.clone())
                                        children=|w| view! {
                                            <tr>
                                                <td>{format_money(w.amount, DEFAULT_CURRENCY)}</td>
                                                <td>{w.phone.clone()}</td>
                                                <td><span class=w.status().badge_class()>{w.status.clone()}</span></td>
                                                <td class="text-sm">{date::display(&w.created_at)}</td>
                                            </tr>
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            </Show>

            <Modal open=form_open title="Request Withdrawal">
                <form class="space-y-3" on:submit=on_submit>
                    <p class="text-sm text-base-content/70">"Available: " {move || balance.get()}</p>
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
                        <label class="label"><span class="label-text">"Phone"</span></label>
                        <input
                            class="input input-bordered"
                            placeholder=member_phone
                            prop:value=phone
                            on:input=move |ev| phone.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Notes"</span></label>
                        <textarea class="textarea textarea-bordered" prop:value=notes on:input=move |ev| notes.set(event_target_value(&ev))></textarea>
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| form_open.set(false)>"Cancel"</button>
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                            {move || if submitting.get() { "Submitting..." } else { "Submit Request" }}
                        </button>
                    </div>
                </form>
            </Modal>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::withdrawal_payload;

    #[test]
    fn phone_defaults_to_member_phone() {
        let p = withdrawal_payload(7, "5000", "  ", "250788111222", "").unwrap();
        assert_eq!(p.phone, "250788111222");
        assert_eq!(p.amount, 5000.0);
        assert_eq!(p.notes, None);

        let p = withdrawal_payload(7, "5000", "0788999000", "250788111222", "rent").unwrap();
        assert_eq!(p.phone, "0788999000");
        assert_eq!(p.notes.as_deref(), Some("rent"));
    }

    #[test]
    fn rejects_bad_amount_or_missing_phone() {
        assert!(withdrawal_payload(7, "-3", "", "250788111222", "").is_err());
        assert!(withdrawal_payload(7, "100", "", "", "").is_err());
    }
}
