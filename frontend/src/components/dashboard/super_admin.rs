use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::Group;
use maisha_shared::report::{GenderStats, SystemStats};

use super::{QuickActions, WelcomeBanner};
use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::toast::use_notifier;
use crate::components::widgets::{Loading, StatCard};

const ACTIONS: &[(&str, &str, &str)] = &[
    ("Manage Groups", "/groups", "users"),
    ("Manage Members", "/members", "user-plus"),
    ("Withdrawals", "/withdrawals", "dollar"),
    ("View Reports", "/reports", "chart"),
];

#[component]
pub fn SuperAdminView() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let stats = RwSignal::new(SystemStats::default());
    let genders = RwSignal::new(GenderStats::default());
    let largest = RwSignal::new(Vec::<Group>::new());
    let loading = RwSignal::new(true);

    spawn_local(async move {
        match api.get_groups_with_counts().await {
            Ok((mut groups, members)) => {
                stats.set(SystemStats::compute(groups.len(), &members));
                genders.set(GenderStats::compute(&members));
                groups.sort_by(|a, b| b.member_count.cmp(&a.member_count));
                groups.truncate(5);
                largest.set(groups);
            }
            Err(e) => notifier.api_error("Failed to load stats", &e),
        }
        loading.set(false);
    });

    let gender_row = move |label: &'static str, pick: fn(&GenderStats) -> usize| {
        view! {
            <div>
                <div class="flex justify-between text-sm mb-1">
                    <span>{label}</span>
                    <span>{move || genders.with(|g| format!("{} ({}%)", pick(g), g.percent(pick(g))))}</span>
                </div>
                <progress
                    class="progress progress-primary w-full"
                    value=move || genders.with(|g| g.percent(pick(g)).to_string())
                    max="100"
                ></progress>
            </div>
        }
    };

    view! {
        <div class="space-y-6">
            <WelcomeBanner
                greeting=format!("Welcome back, {}!", auth.display_name())
                subtitle="Super Administrator Dashboard - Full System Access"
                tone="from-primary to-secondary"
            />

            <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    <StatCard
                        title="Total Groups"
                        value=Signal::derive(move || stats.with(|s| s.total_groups.to_string()))
                        description="Across all system"
                    />
                    <StatCard
                        title="Total Members"
                        value=Signal::derive(move || stats.with(|s| s.total_members.to_string()))
                        description="Registered members"
                    />
                    <StatCard
                        title="Active Members"
                        value=Signal::derive(move || stats.with(|s| s.active_members.to_string()))
                        description="Currently active"
                    />
                </div>

                <div class="grid grid-cols-1 lg:grid-cols-2 gap-4">
                    <div class="card bg-base-100 shadow">
                        <div class="card-body space-y-3">
                            <h3 class="card-title">"Gender Distribution"</h3>
                            {gender_row("Male", |g| g.male)}
                            {gender_row("Female", |g| g.female)}
                            {gender_row("Other", |g| g.other)}
                        </div>
                    </div>
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h3 class="card-title">"Largest Groups"</h3>
                            <ul class="divide-y divide-base-300">
                                <For
                                    each=move || largest.get()
                                    key=|g| g.id
                                    children=|group| view! {
                                        <li class="flex justify-between py-2">
                                            <span>{group.name}</span>
                                            <span class="badge badge-ghost">{group.member_count} " members"</span>
                                        </li>
                                    }
                                />
                            </ul>
                        </div>
                    </div>
                </div>
            </Show>

            <QuickActions actions=ACTIONS />
        </div>
    }
}
