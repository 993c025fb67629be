use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::{DEFAULT_CURRENCY, GroupScope};
use maisha_shared::report::GroupStats;
use maisha_shared::wallet::format_money;

use super::{QuickActions, WelcomeBanner};
use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::toast::use_notifier;
use crate::components::widgets::{Loading, NoGroup, StatCard};

const ACTIONS: &[(&str, &str, &str)] = &[
    ("Members", "/members", "user-plus"),
    ("Wallets", "/wallets", "wallet"),
    ("Withdrawals", "/withdrawals", "dollar"),
    ("Deductions", "/deductions", "calendar"),
];

#[component]
pub fn GroupAdminView() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let group_id = auth.scope().resolve(None);
    let stats = RwSignal::new(GroupStats::default());
    let loading = RwSignal::new(group_id.is_some());

    if let Some(group_id) = group_id {
        spawn_local(async move {
            let batch = futures::try_join!(
                api.get_scoped_members(GroupScope::Group(group_id)),
                api.get_group_wallets(group_id),
                api.get_withdrawal_requests(group_id),
                api.get_monthly_deductions(group_id),
            );
            match batch {
                Ok((members, wallets, withdrawals, deductions)) => {
                    stats.set(GroupStats::compute(&members, &wallets, &withdrawals, &deductions))
                }
                Err(e) => notifier.api_error("Failed to load stats", &e),
            }
            loading.set(false);
        });
    }

    let group_label = auth
        .user()
        .get_untracked()
        .and_then(|u| u.group_label())
        .unwrap_or_else(|| "Your Group".to_string());

    view! {
        <div class="space-y-6">
            <WelcomeBanner
                greeting=format!("Welcome, {}!", auth.display_name())
                subtitle=format!("Group Administrator - {}", group_label)
                tone="from-success to-accent"
            />

            <Show when=move || group_id.is_some() fallback=|| view! { <NoGroup /> }>
                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                        <StatCard
                            title="Group Members"
                            value=Signal::derive(move || stats.with(|s| s.group_members.to_string()))
                            description="In your group"
                        />
                        <StatCard
                            title="Total Wallet Balance"
                            value=Signal::derive(move || stats.with(|s| format_money(s.total_wallet_balance, DEFAULT_CURRENCY)))
                            description="All member wallets"
                        />
                        <StatCard
                            title="Pending Withdrawals"
                            value=Signal::derive(move || stats.with(|s| s.pending_withdrawals.to_string()))
                            description="Awaiting approval"
                        />
                        <StatCard
                            title="Active Deductions"
                            value=Signal::derive(move || stats.with(|s| s.active_deductions.to_string()))
                            description="Monthly deductions"
                        />
                        <StatCard
                            title="Monthly Collection"
                            value=Signal::derive(move || stats.with(|s| format_money(s.monthly_collection, DEFAULT_CURRENCY)))
                            description="Expected from active deductions"
                        />
                    </div>
                </Show>
            </Show>

            <QuickActions actions=ACTIONS />
        </div>
    }
}
