use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::DEFAULT_CURRENCY;
use maisha_shared::report::MyReport;
use maisha_shared::wallet::format_money;
use maisha_shared::withdrawal::pending_count;

use super::WelcomeBanner;
use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::toast::use_notifier;
use crate::components::widgets::{Loading, StatCard, TransactionTable};
use crate::web::router::Link;

const RECENT_TRANSACTIONS: usize = 5;

/// 成员概览：余额、最近流水与提现状态
#[component]
pub fn MemberView() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let report = RwSignal::new(MyReport::default());
    let loading = RwSignal::new(true);

    spawn_local(async move {
        match api.get_my_report().await {
            Ok(data) => report.set(data),
            Err(e) => notifier.api_error("Failed to load member data", &e),
        }
        loading.set(false);
    });

    let balance = Signal::derive(move || {
        report.with(|r| match &r.wallet {
            Some(w) if !w.currency.is_empty() => format_money(w.balance, &w.currency),
            Some(w) => format_money(w.balance, DEFAULT_CURRENCY),
            None => "No wallet".to_string(),
        })
    });
    let recent = Signal::derive(move || {
        report.with(|r| r.transactions.iter().take(RECENT_TRANSACTIONS).cloned().collect())
    });

    view! {
        <div class="space-y-6">
            <WelcomeBanner
                greeting=format!("Welcome, {}!", auth.display_name())
                subtitle="Member Dashboard"
                tone="from-info to-primary"
            />

            <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    <StatCard title="Wallet Balance" value=balance />
                    <StatCard
                        title="Transactions"
                        value=Signal::derive(move || report.with(|r| r.transactions.len().to_string()))
                    />
                    <StatCard
                        title="Pending Withdrawals"
                        value=Signal::derive(move || report.with(|r| pending_count(&r.withdrawal_requests).to_string()))
                    />
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <div class="flex items-center justify-between">
                            <h3 class="card-title">"Recent Transactions"</h3>
                            <Link to="/member-portal" class="btn btn-primary btn-sm">"Request Withdrawal"</Link>
                        </div>
                        <TransactionTable transactions=recent />
                    </div>
                </div>
            </Show>
        </div>
    }
}
