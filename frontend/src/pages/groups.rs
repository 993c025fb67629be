use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::{CreateGroupPayload, Feature, Group, Member, date};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{Plus, RefreshCw, Search, Trash2, Users};
use crate::components::toast::use_notifier;
use crate::components::widgets::{EmptyRow, Modal, PageHeader};

#[component]
pub fn GroupsPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let groups = RwSignal::new(Vec::<Group>::new());
    let members = RwSignal::new(Vec::<Member>::new());
    let loading = RwSignal::new(true);
    let query = RwSignal::new(String::new());

    let create_open = RwSignal::new(false);
    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let saving = RwSignal::new(false);

    let detail_open = RwSignal::new(false);
    let detail = RwSignal::new(Option::<Group>::None);

    let can_manage = move || auth.authorize(Feature::ManageGroups);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            let scope = auth.scope();
            loading.set(true);
            spawn_local(async move {
                match api.get_groups_with_counts().await {
                    Ok((list, all_members)) => {
                        groups.set(list.into_iter().filter(|g| scope.allows(g.id)).collect());
                        members.set(all_members);
                    }
                    Err(e) => notifier.api_error("Failed to load groups", &e),
                }
                loading.set(false);
            });
        }
    };
    load();
    let load = StoredValue::new(load);

    let on_create = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let payload = CreateGroupPayload {
                name: name.get().trim().to_string(),
                description: description.get().trim().to_string(),
                created_by: auth.display_name(),
            };
            if let Err(msg) = payload.validate() {
                notifier.error("Invalid group", msg);
                return;
            }
            saving.set(true);
            let api = api.clone();
            spawn_local(async move {
                match api.create_group(&payload).await {
                    Ok(_) => {
                        notifier.success("Success", "Group created successfully");
                        name.set(String::new());
                        description.set(String::new());
                        create_open.set(false);
                        load.with_value(|reload| reload());
                    }
                    Err(e) => notifier.api_error("Failed to create group", &e),
                }
                saving.set(false);
            });
        }
    };

    let on_delete = {
        let api = api.clone();
        move |group: Group| {
            if !confirm(&format!("Delete group \"{}\"?", group.name)) {
                return;
            }
            let api = api.clone();
            spawn_local(async move {
                match api.delete_group(group.id).await {
                    Ok(()) => {
                        notifier.success("Success", "Group deleted successfully");
                        groups.update(|list| list.retain(|g| g.id != group.id));
                    }
                    Err(e) => notifier.api_error("Failed to delete group", &e),
                }
            });
        }
    };
    let on_delete = StoredValue::new(on_delete);

    let visible = move || {
        let q = query.get();
        groups.with(|list| list.iter().filter(|g| g.matches(&q)).cloned().collect::<Vec<_>>())
    };

    let detail_members = move || {
        let Some(group_id) = detail.with(|d| d.as_ref().map(|g| g.id)) else {
            return Vec::new();
        };
        members.with(|list| {
            list.iter()
                .filter(|m| m.group_id == Some(group_id))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="space-y-6">
            <PageHeader title="Groups" subtitle="Manage member groups">
                <button class="btn btn-ghost btn-circle" on:click=move |_| load.with_value(|reload| reload())>
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
                <Show when=can_manage>
                    <button class="btn btn-primary gap-2" on:click=move |_| create_open.set(true)>
                        <Plus attr:class="h-4 w-4" /> "New Group"
                    </button>
                </Show>
            </PageHeader>

            <label class="input input-bordered flex items-center gap-2 max-w-md">
                <Search attr:class="h-4 w-4 opacity-60" />
                <input
                    type="text"
                    class="grow"
                    placeholder="Search groups..."
                    prop:value=query
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
            </label>

            <div class="card bg-base-100 shadow">
                <div class="overflow-x-auto">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th class="hidden md:table-cell">"Description"</th>
                                <th>"Members"</th>
                                <th class="hidden md:table-cell">"Created"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || !loading.get() && groups.with(|g| g.is_empty())>
                                <EmptyRow colspan=5 message="No groups found" />
                            </Show>
                            <For
                                each=visible
                                key=|g| (g.id, g.member_count)
                                children=move |group| {
                                    let for_detail = group.clone();
                                    let for_delete = group.clone();
                                    view! {
                                        <tr>
                                            <td class="font-semibold">{group.name.clone()}</td>
                                            <td class="hidden md:table-cell text-base-content/70">{group.description.clone()}</td>
                                            <td>
                                                <button
                                                    class="badge badge-primary badge-outline gap-1"
                                                    on:click=move |_| {
                                                        detail.set(Some(for_detail.clone()));
                                                        detail_open.set(true);
                                                    }
                                                >
                                                    <Users attr:class="h-3 w-3" /> {group.member_count}
                                                </button>
                                            </td>
                                            <td class="hidden md:table-cell text-sm">{date::format_date(&group.created_at)}</td>
                                            <td>
                                                <Show when=can_manage>
                                                    {
                                                        let target = for_delete.clone();
                                                        view! {
                                                            <button
                                                                class="btn btn-ghost btn-sm text-error"
                                                                on:click=move |_| on_delete.with_value(|f| f(target.clone()))
                                                            >
                                                                <Trash2 attr:class="h-4 w-4" />
                                                            </button>
                                                        }
                                                    }
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

            <Modal open=create_open title="Create Group">
                <form class="space-y-4" on:submit=on_create>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Group Name"</span></label>
                        <input
                            class="input input-bordered"
                            prop:value=name
                            on:input=move |ev| name.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Description"</span></label>
                        <textarea
                            class="textarea textarea-bordered"
                            prop:value=description
                            on:input=move |ev| description.set(event_target_value(&ev))
                        ></textarea>
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| create_open.set(false)>"Cancel"</button>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() { "Creating..." } else { "Create" }}
                        </button>
                    </div>
                </form>
            </Modal>

            <Modal open=detail_open title="Group Members">
                <p class="text-base-content/70 mb-2">{move || detail.with(|d| d.as_ref().map(|g| g.name.clone()).unwrap_or_default())}</p>
                <ul class="divide-y divide-base-300 max-h-80 overflow-y-auto">
                    <Show when=move || detail_members().is_empty()>
                        <li class="py-4 text-center text-base-content/50">"No members in this group"</li>
                    </Show>
                    <For
                        each=detail_members
                        key=|m| m.id
                        children=|member| view! {
                            <li class="flex justify-between py-2">
                                <span>{member.full_name}</span>
                                <span class="text-sm text-base-content/60">{member.phone}</span>
                            </li>
                        }
                    />
                </ul>
            </Modal>
        </div>
    }
}

/// 浏览器确认框；无法弹出时视为取消
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
