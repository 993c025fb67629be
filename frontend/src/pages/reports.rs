use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::csv::Record;
use maisha_shared::group::group_name;
use maisha_shared::report::{
    GenderStats, ReportDocument, groups_report_records, members_report_records,
};
use maisha_shared::{Feature, Group, Member, date};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{BarChart, Download};
use crate::components::toast::use_notifier;
use crate::components::widgets::{EmptyRow, Loading, PageHeader};
use crate::web::download::{BrowserDownload, export_csv};

const GROUPS_FILENAME: &str = "groups_report.csv";
const MEMBERS_FILENAME: &str = "members_report.csv";

/// `None` 表示全部小组
fn members_in(members: &[Member], group: Option<i64>) -> Vec<Member> {
    members
        .iter()
        .filter(|m| group.is_none() || m.group_id == group)
        .cloned()
        .collect()
}

#[component]
pub fn ReportsPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let groups = RwSignal::new(Vec::<Group>::new());
    let members = RwSignal::new(Vec::<Member>::new());
    let loading = RwSignal::new(true);
    let selected = RwSignal::new(Option::<i64>::None);
    let system = RwSignal::new(Option::<ReportDocument>::None);

    {
        let api = api.clone();
        let scope = auth.scope();
        spawn_local(async move {
            match api.get_groups_with_counts().await {
                Ok((list, all_members)) => {
                    groups.set(list.into_iter().filter(|g| scope.allows(g.id)).collect());
                    members.set(scope.retain_members(all_members));
                }
                Err(e) => notifier.api_error("Failed to load report data", &e),
            }
            loading.set(false);
        });
    }

    if auth.authorize(Feature::SystemReport) {
        let api = api.clone();
        spawn_local(async move {
            match api.get_system_report().await {
                Ok(doc) => system.set(Some(doc)),
                Err(e) => log::warn!("[Reports] system report unavailable: {}", e),
            }
        });
    }

    let filtered = Memo::new(move |_| members.with(|m| members_in(m, selected.get())));
    let gender = Memo::new(move |_| filtered.with(|m| GenderStats::compute(m.iter())));

    let export = move |filename: &'static str, records: Vec<Record>| {
        if records.is_empty() {
            notifier.error("Nothing to export", "The report has no rows");
            return;
        }
        match export_csv(&BrowserDownload, filename, &records) {
            Ok(()) => log::info!("[Reports] exported {} rows to {}", records.len(), filename),
            Err(e) => notifier.error("Export failed", e),
        }
    };
    let export_groups = move |_| export(GROUPS_FILENAME, groups.with(|g| groups_report_records(g)));
    let export_members = move |_| {
        let records = filtered.with(|m| groups.with(|g| members_report_records(m, g)));
        export(MEMBERS_FILENAME, records)
    };

    let gender_row = move |label: &'static str, count: fn(&GenderStats) -> usize, bar: &'static str| {
        view! {
            <div class="space-y-1">
                <div class="flex justify-between text-sm">
                    <span>{label}</span>
                    <span class="font-semibold">
                        {move || {
                            let stats = gender.get();
                            let n = count(&stats);
                            format!("{} ({}%)", n, stats.percent(n))
                        }}
                    </span>
                </div>
                <progress
                    class=format!("progress {} w-full", bar)
                    max="100"
                    value=move || {
                        let stats = gender.get();
                        stats.percent(count(&stats))
                    }
                ></progress>
            </div>
        }
    };

    view! {
        <div class="space-y-8">
            <PageHeader title="Reports & Analytics" subtitle="View detailed reports and statistics" />

            <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                <Show when=move || system.with(Option::is_some)>
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h3 class="card-title">"System Overview"</h3>
                            <div class="stats stats-vertical md:stats-horizontal shadow-none">
                                {move || system.with(|doc| {
                                    doc.as_ref()
                                        .map(ReportDocument::scalar_entries)
                                        .unwrap_or_default()
                                        .into_iter()
                                        .map(|(key, value)| view! {
                                            <div class="stat">
                                                <div class="stat-title">{key}</div>
                                                <div class="stat-value text-2xl">{value}</div>
                                            </div>
                                        })
                                        .collect_view()
                                })}
                            </div>
                        </div>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <div class="flex items-center justify-between">
                            <div>
                                <h3 class="card-title">"Groups Report"</h3>
                                <p class="text-sm text-base-content/60">"Overview of all groups"</p>
                            </div>
                            <button class="btn btn-outline gap-2" on:click=export_groups>
                                <Download attr:class="h-4 w-4" /> "Export CSV"
                            </button>
                        </div>
                        <div class="overflow-x-auto">
                            <table class="table w-full">
                                <thead>
                                    <tr>
                                        <th>"Group Name"</th>
                                        <th>"Description"</th>
                                        <th>"Members"</th>
                                        <th class="hidden md:table-cell">"Created By"</th>
                                        <th class="hidden md:table-cell">"Created Date"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <Show when=move || groups.with(|g| g.is_empty())>
                                        <EmptyRow colspan=5 message="No groups found" />
                                    </Show>
                                    <For
                                        each=move || groups.get()
                                        key=|g| (g.id, g.member_count)
                                        children=|g| view! {
                                            <tr>
                                                <td class="font-semibold">{g.name.clone()}</td>
                                                <td>{g.description.clone()}</td>
                                                <td>{g.member_count}</td>
                                                <td class="hidden md:table-cell">{g.created_by.clone()}</td>
                                                <td class="hidden md:table-cell text-sm">{date::format_date(&g.created_at)}</td>
                                            </tr>
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <div class="flex flex-wrap items-center justify-between gap-2">
                            <div>
                                <h3 class="card-title">"Members Report"</h3>
                                <p class="text-sm text-base-content/60">"Member listing and gender distribution"</p>
                            </div>
                            <div class="flex gap-2">
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| selected.set(event_target_value(&ev).parse::<i64>().ok())
                                >
                                    <option value="all" selected=move || selected.get().is_none()>"All Groups"</option>
                                    <For
                                        each=move || groups.get()
                                        key=|g| g.id
                                        children=move |g| {
                                            let id = g.id;
                                            view! {
                                                <option value=id.to_string() selected=move || selected.get() == Some(id)>
                                                    {g.name}
                                                </option>
                                            }
                                        }
                                    />
                                </select>
                                <button class="btn btn-outline gap-2" on:click=export_members>
                                    <Download attr:class="h-4 w-4" /> "Export CSV"
                                </button>
                            </div>
                        </div>

                        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6 mt-4">
                            <div class="space-y-4">
                                <div class="flex items-center gap-2">
                                    <BarChart attr:class="h-5 w-5 text-primary" />
                                    <span class="font-semibold">
                                        "Gender Distribution · " {move || gender.get().total()} " members"
                                    </span>
                                </div>
                                {gender_row("Male", |s| s.male, "progress-info")}
                                {gender_row("Female", |s| s.female, "progress-secondary")}
                                {gender_row("Other", |s| s.other, "progress-accent")}
                            </div>

                            <div class="overflow-x-auto lg:col-span-2">
                                <table class="table table-sm w-full">
                                    <thead>
                                        <tr>
                                            <th>"Full Name"</th>
                                            <th class="hidden md:table-cell">"National ID"</th>
                                            <th>"Gender"</th>
                                            <th>"Phone"</th>
                                            <th>"Group"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        <Show when=move || filtered.with(|m| m.is_empty())>
                                            <EmptyRow colspan=5 message="No members found" />
                                        </Show>
                                        <For
                                            each=move || filtered.get()
                                            key=|m| (m.id, m.group_id)
                                            children=move |m| {
                                                let group_id = m.group_id;
                                                view! {
                                                    <tr>
                                                        <td>{m.full_name.clone()}</td>
                                                        <td class="hidden md:table-cell font-mono text-sm">{m.national_id.clone()}</td>
                                                        <td>{m.gender().to_string()}</td>
                                                        <td>{m.phone.clone()}</td>
                                                        <td>{move || groups.with(|g| group_name(g, group_id))}</td>
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
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::members_in;
    use maisha_shared::{Member, MemberRecord};
    use serde_json::json;

    fn member(id: i64, group_id: i64) -> Member {
        Member::from(
            serde_json::from_value::<MemberRecord>(json!({ "id": id, "group_id": group_id }))
                .unwrap(),
        )
    }

    #[test]
    fn filters_by_selected_group() {
        let members = vec![member(1, 10), member(2, 20), member(3, 10)];
        assert_eq!(members_in(&members, None).len(), 3);

        let ids: Vec<i64> = members_in(&members, Some(10)).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(members_in(&members, Some(99)).is_empty());
    }
}
