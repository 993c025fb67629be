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
    ("Reports", "/reports", "chart"),
];

/// 小组职员：成员数与钱包余额
#[component]
pub fn GroupUserView() -> impl IntoView {
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
            );
            match batch {
                Ok((members, wallets)) => stats.set(GroupStats::compute(&members, &wallets, &[], &[])),
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
                subtitle=format!("Group Staff - {}", group_label)
                tone="from-secondary to-primary"
            />

            <Show when=move || group_id.is_some() fallback=|| view! { <NoGroup /> }>
                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                        <StatCard
                            title="Group Members"
                            value=Signal::derive(move || stats.with(|s| s.group_members.to_string()))
                        />
                        <StatCard
                            title="Total Wallet Balance"
                            value=Signal::derive(move || stats.with(|s| format_money(s.total_wallet_balance, DEFAULT_CURRENCY)))
                        />
                        <StatCard
                            title="Average Balance"
                            value=Signal::derive(move || stats.with(|s| format_money(s.average_balance, DEFAULT_CURRENCY)))
                            description="Per wallet"
                        />
                    </div>
                </Show>
            </Show>

            <QuickActions actions=ACTIONS />
        </div>
    }
}
