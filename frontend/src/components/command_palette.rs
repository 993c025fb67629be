//! 命令面板 (Ctrl/Cmd+K)
//!
//! 列出可访问的导航项；输入关键字时额外显示最多 5 个小组与 5 个成员。

use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::{Feature, Group, Member, NavItem, visible_nav_items};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{NavIcon, Search, UserPlus, Users};
use crate::components::toast::use_notifier;
use crate::web::router::use_router;

const MAX_MATCHES: usize = 5;

/// 按关键字过滤（大小写不敏感的子串匹配）
fn filter_entries<'a>(
    query: &str,
    nav: &'a [NavItem],
    groups: &'a [Group],
    members: &'a [Member],
) -> (Vec<&'a NavItem>, Vec<&'a Group>, Vec<&'a Member>) {
    let needle = query.trim().to_lowercase();
    let nav = nav
        .iter()
        .filter(|item| needle.is_empty() || item.title.to_lowercase().contains(&needle))
        .collect();
    if needle.is_empty() {
        return (nav, Vec::new(), Vec::new());
    }
    let groups = groups
        .iter()
        .filter(|g| g.name.to_lowercase().contains(&needle))
        .take(MAX_MATCHES)
        .collect();
    let members = members
        .iter()
        .filter(|m| m.full_name.to_lowercase().contains(&needle))
        .take(MAX_MATCHES)
        .collect();
    (nav, groups, members)
}

#[component]
pub fn CommandPalette(open: RwSignal<bool>) -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let router = use_router();

    let query = RwSignal::new(String::new());
    let groups = RwSignal::new(Vec::<Group>::new());
    let members = RwSignal::new(Vec::<Member>::new());
    let loaded = StoredValue::new(false);
    let input_ref = NodeRef::<leptos::html::Input>::new();

    // 首次打开时加载搜索数据
    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        if let Some(input) = input_ref.get() {
            let _ = input.focus();
        }
        if loaded.get_value() {
            return;
        }
        loaded.set_value(true);

        let scope = auth.scope();
        let (can_groups, can_members) = (auth.authorize(Feature::Groups), auth.authorize(Feature::Members));
        let api = api.clone();
        spawn_local(async move {
            if can_groups {
                match api.get_groups().await {
                    Ok(list) => groups.set(
                        list.into_iter()
                            .filter(|g| scope.allows(g.id))
                            .collect(),
                    ),
                    Err(e) => notifier.api_error("Search unavailable", &e),
                }
            }
            if can_members {
                match api.get_scoped_members(scope).await {
                    Ok(list) => members.set(list),
                    Err(e) => notifier.api_error("Search unavailable", &e),
                }
            }
        });
    });

    let go = move |path: &'static str| {
        open.set(false);
        query.set(String::new());
        router.navigate(path);
    };

    let user = auth.user();
    let results = Memo::new(move |_| {
        let nav = user.with(|u| visible_nav_items(u.as_ref()));
        let q = query.get();
        groups.with(|g| {
            members.with(|m| {
                let (n, g, m) = filter_entries(&q, &nav, g, m);
                (
                    n.into_iter().copied().collect::<Vec<_>>(),
                    g.into_iter().map(|g| (g.id, g.name.clone())).collect::<Vec<_>>(),
                    m.into_iter().map(|m| (m.id, m.full_name.clone())).collect::<Vec<_>>(),
                )
            })
        })
    });

    view! {
        <Show when=move || open.get()>
            <div class="fixed inset-0 z-40 bg-black/40 flex items-start justify-center pt-24" on:click=move |_| open.set(false)>
                <div class="bg-base-100 rounded-box shadow-2xl w-full max-w-lg" on:click=|ev| ev.stop_propagation()>
                    <label class="input input-bordered flex items-center gap-2 m-3">
                        <Search attr:class="h-4 w-4 opacity-60" />
                        <input
                            node_ref=input_ref
                            type="text"
                            class="grow"
                            placeholder="Search groups, members, or navigate..."
                            prop:value=query
                            on:input=move |ev| query.set(event_target_value(&ev))
                        />
                    </label>
                    <ul class="menu max-h-96 overflow-y-auto flex-nowrap w-full">
                        <li class="menu-title">"Navigate"</li>
                        {move || results.with(|(nav, _, _)| nav.iter().map(|item| {
                            let path = item.path;
                            view! {
                                <li><a on:click=move |_| go(path)><NavIcon name=item.icon />{item.title}</a></li>
                            }
                        }).collect_view())}

                        <Show when=move || results.with(|(_, g, _)| !g.is_empty())>
                            <li class="menu-title">"Groups"</li>
                            {move || results.with(|(_, g, _)| g.iter().map(|(_, name)| {
                                let name = name.clone();
                                view! { <li><a on:click=move |_| go("/groups")><Users attr:class="h-4 w-4" />{name}</a></li> }
                            }).collect_view())}
                        </Show>

                        <Show when=move || results.with(|(_, _, m)| !m.is_empty())>
                            <li class="menu-title">"Members"</li>
                            {move || results.with(|(_, _, m)| m.iter().map(|(_, name)| {
                                let name = name.clone();
                                view! { <li><a on:click=move |_| go("/members")><UserPlus attr:class="h-4 w-4" />{name}</a></li> }
                            }).collect_view())}
                        </Show>

                        <Show when=move || results.with(|(n, g, m)| n.is_empty() && g.is_empty() && m.is_empty())>
                            <li class="disabled"><span>"No results found."</span></li>
                        </Show>
                    </ul>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maisha_shared::capability::NAV_ITEMS;
    use maisha_shared::{GroupRecord, MemberRecord};
    use serde_json::json;

    fn groups(names: &[&str]) -> Vec<Group> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                Group::from(
                    serde_json::from_value::<GroupRecord>(json!({ "id": i, "name": n })).unwrap(),
                )
            })
            .collect()
    }

    fn members(count: usize) -> Vec<Member> {
        (0..count)
            .map(|i| {
                Member::from(
                    serde_json::from_value::<MemberRecord>(json!({
                        "id": i, "first_name": "Alice", "last_name": format!("N{}", i)
                    }))
                    .unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_query_lists_navigation_only() {
        let (all_groups, all_members) = (groups(&["Alpha"]), members(2));
        let (nav, g, m) = filter_entries("  ", NAV_ITEMS, &all_groups, &all_members);
        assert_eq!(nav.len(), NAV_ITEMS.len());
        assert!(g.is_empty() && m.is_empty());
    }

    #[test]
    fn matches_are_case_insensitive_and_capped() {
        let g = groups(&["Alpha", "alphabet", "Beta"]);
        let m = members(8);
        let (_, groups, members) = filter_entries("ALPHA", NAV_ITEMS, &g, &m);
        assert_eq!(groups.len(), 2);
        assert!(members.is_empty());

        let (nav, _, members) = filter_entries("alice", NAV_ITEMS, &g, &m);
        assert_eq!(members.len(), MAX_MATCHES);
        assert!(nav.is_empty());
    }

    #[test]
    fn navigation_filters_by_title() {
        let (nav, _, _) = filter_entries("wall", NAV_ITEMS, &[], &[]);
        let titles: Vec<_> = nav.iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["My Wallet", "Wallets"]);
    }
}
