use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::csv::format_phone_for_lookup;
use maisha_shared::group::group_name;
use maisha_shared::member::generate_national_id;
use maisha_shared::{CustomerInfo, Feature, Gender, Group, GroupScope, Member, MemberDraft, Role, date};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{Pencil, Phone, Plus, Search};
use crate::components::toast::use_notifier;
use crate::components::widgets::{EmptyRow, Loading, Modal, NoGroup, PageHeader};

/// 成员表单状态
#[derive(Clone, Copy)]
struct MemberForm {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    phone: RwSignal<String>,
    national_id: RwSignal<String>,
    gender: RwSignal<String>,
    birth_date: RwSignal<String>,
    is_active: RwSignal<bool>,
    group_id: RwSignal<Option<i64>>,
    /// 编辑中的成员；`None` 表示新增
    editing: RwSignal<Option<i64>>,
}

impl MemberForm {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            national_id: RwSignal::new(String::new()),
            gender: RwSignal::new(Gender::Male.code().to_string()),
            birth_date: RwSignal::new(String::new()),
            is_active: RwSignal::new(true),
            group_id: RwSignal::new(None),
            editing: RwSignal::new(None),
        }
    }

    fn reset(&self, group_id: Option<i64>) {
        self.fill(&MemberDraft {
            gender_code: Some(Gender::Male.code().to_string()),
            is_active: true,
            group_id,
            ..Default::default()
        });
        self.editing.set(None);
    }

    fn fill(&self, draft: &MemberDraft) {
        self.first_name.set(draft.first_name.clone());
        self.last_name.set(draft.last_name.clone());
        self.phone.set(draft.phone.clone());
        self.national_id.set(draft.national_id.clone());
        self.gender.set(draft.resolved_gender());
        self.birth_date.set(date::input_value(draft.birth_date));
        self.is_active.set(draft.is_active);
        self.group_id.set(draft.group_id);
    }

    fn to_draft(&self) -> MemberDraft {
        MemberDraft {
            first_name: self.first_name.get().trim().to_string(),
            last_name: self.last_name.get().trim().to_string(),
            birth_date: date::parse_date(&self.birth_date.get()),
            gender_code: Some(self.gender.get()),
            gender_label: None,
            is_active: self.is_active.get(),
            national_id: self.national_id.get().trim().to_string(),
            phone: self.phone.get().trim().to_string(),
            group_id: self.group_id.get(),
        }
    }
}

#[component]
pub fn MembersPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let scope = auth.scope();
    let own_group = scope.resolve(None);
    let picks_group = auth.has_role(&[Role::SuperAdmin]);

    let members = RwSignal::new(Vec::<Member>::new());
    let groups = RwSignal::new(Vec::<Group>::new());
    let loading = RwSignal::new(true);
    let query = RwSignal::new(String::new());
    let group_filter = RwSignal::new(Option::<i64>::None);

    let form = MemberForm::new();
    let form_open = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let looking_up = RwSignal::new(false);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match futures::try_join!(api.get_groups(), api.get_scoped_members(scope)) {
                    Ok((all_groups, list)) => {
                        groups.set(all_groups.into_iter().filter(|g| scope.allows(g.id)).collect());
                        members.set(list);
                    }
                    Err(e) => notifier.api_error("Failed to load members", &e),
                }
                loading.set(false);
            });
        }
    };
    load();
    let load = StoredValue::new(load);

    let open_add = move |_| {
        form.reset(own_group.or_else(|| groups.with(|g| g.first().map(|g| g.id))));
        form_open.set(true);
    };

    let open_edit = move |member: Member| {
        form.fill(&MemberDraft::from(&member));
        form.editing.set(Some(member.id));
        form_open.set(true);
    };

    let on_lookup = {
        let api = api.clone();
        move |_| {
            let phone = form.phone.get();
            if phone.trim().is_empty() {
                notifier.error("Lookup", "Enter a phone number first");
                return;
            }
            looking_up.set(true);
            let api = api.clone();
            spawn_local(async move {
                let lookup = format_phone_for_lookup(&phone);
                match api.get_customer_info(&lookup).await {
                    Ok(Some(info)) => {
                        let group_id = form.group_id.get_untracked().unwrap_or_default();
                        let national_id = form.national_id.get_untracked();
                        let mut draft = CustomerInfo::into_draft(Some(info), &lookup, group_id, national_id);
                        draft.group_id = form.group_id.get_untracked();
                        form.fill(&draft);
                        notifier.success("Customer found", "Details filled from lookup");
                    }
                    Ok(None) => notifier.error("Lookup", "No customer found for this number"),
                    Err(e) => notifier.api_error("Lookup failed", &e),
                }
                looking_up.set(false);
            });
        }
    };

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let mut draft = form.to_draft();
            if draft.national_id.is_empty() && form.editing.get().is_none() {
                draft.national_id = generate_national_id(0);
            }
            if let Err(msg) = draft.validate() {
                notifier.error("Invalid member", msg);
                return;
            }
            if !draft.group_id.is_some_and(|id| auth.can_access_group(id)) {
                notifier.error("Invalid member", "Choose a group you manage");
                return;
            }
            saving.set(true);
            let api = api.clone();
            let editing = form.editing.get();
            spawn_local(async move {
                let result = match editing {
                    Some(id) => api.update_member(id, &draft).await,
                    None => api.add_member(&draft).await,
                };
                match result {
                    Ok(_) => {
                        let msg = if editing.is_some() { "Member updated successfully" } else { "Member added successfully" };
                        notifier.success("Success", msg);
                        form_open.set(false);
                        load.with_value(|reload| reload());
                    }
                    Err(e) => notifier.api_error("Failed to save member", &e),
                }
                saving.set(false);
            });
        }
    };

    let visible = move || {
        let q = query.get();
        let filter = group_filter.get();
        members.with(|list| {
            list.iter()
                .filter(|m| m.matches(&q))
                .filter(|m| filter.is_none() || m.group_id == filter)
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let can_manage = move || auth.authorize(Feature::ManageMembers);

    view! {
        <div class="space-y-6">
            <PageHeader title="Members" subtitle="Manage group members">
                <Show when=can_manage>
                    <button class="btn btn-primary gap-2" on:click=open_add>
                        <Plus attr:class="h-4 w-4" /> "Add Member"
                    </button>
                </Show>
            </PageHeader>

            <div class="flex flex-col md:flex-row gap-3">
                <label class="input input-bordered flex items-center gap-2 flex-1">
                    <Search attr:class="h-4 w-4 opacity-60" />
                    <input
                        type="text"
                        class="grow"
                        placeholder="Search by name, phone or national ID..."
                        prop:value=query
                        on:input=move |ev| query.set(event_target_value(&ev))
                    />
                </label>
                <Show when=move || picks_group>
                    <select
                        class="select select-bordered w-64"
                        on:change=move |ev| group_filter.set(event_target_value(&ev).parse::<i64>().ok())
                    >
                        <option value="">"All Groups"</option>
                        <For
                            each=move || groups.get()
                            key=|g| g.id
                            children=|g| view! { <option value=g.id.to_string()>{g.name}</option> }
                        />
                    </select>
                </Show>
            </div>

            <Show when=move || scope != GroupScope::Nothing fallback=|| view! { <NoGroup /> }>
                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <div class="card bg-base-100 shadow">
                        <div class="overflow-x-auto">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"Name"</th>
                                        <th>"Phone"</th>
                                        <th class="hidden md:table-cell">"National ID"</th>
                                        <th class="hidden md:table-cell">"Gender"</th>
                                        <th class="hidden lg:table-cell">"Group"</th>
                                        <th>"Status"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <Show when=move || visible().is_empty()>
                                        <EmptyRow colspan=7 message="No members found" />
                                    </Show>
                                    <For
                                        each=visible
                                        key=|m| (m.id, m.full_name.clone(), m.phone.clone(), m.is_active)
                                        children=move |member| {
                                            let group = groups.with(|g| group_name(g, member.group_id));
                                            let target = member.clone();
                                            view! {
                                                <tr>
                                                    <td class="font-semibold">{member.full_name.clone()}</td>
                                                    <td>{member.phone.clone()}</td>
                                                    <td class="hidden md:table-cell font-mono text-xs">{member.national_id.clone()}</td>
                                                    <td class="hidden md:table-cell">{member.gender()}</td>
                                                    <td class="hidden lg:table-cell">{group}</td>
                                                    <td>
                                                        {if member.is_active {
                                                            view! { <span class="badge badge-success">"Active"</span> }.into_any()
                                                        } else {
                                                            view! { <span class="badge badge-ghost">"Inactive"</span> }.into_any()
                                                        }}
                                                    </td>
                                                    <td>
                                                        <Show when=can_manage>
                                                            {
                                                                let target = target.clone();
                                                                view! {
                                                                    <button class="btn btn-ghost btn-sm" on:click=move |_| open_edit(target.clone())>
                                                                        <Pencil attr:class="h-4 w-4" />
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
                </Show>
            </Show>

            <Modal open=form_open title="Member Details">
                <form class="space-y-3" on:submit=on_submit>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Phone"</span></label>
                        <div class="join w-full">
                            <input
                                class="input input-bordered join-item flex-1"
                                placeholder="0788123456"
                                prop:value=form.phone
                                on:input=move |ev| form.phone.set(event_target_value(&ev))
                            />
                            <button type="button" class="btn join-item gap-2" on:click=on_lookup disabled=move || looking_up.get()>
                                <Phone attr:class="h-4 w-4" /> "Lookup"
                            </button>
                        </div>
                    </div>
                    <div class="grid grid-cols-2 gap-3">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"First Name"</span></label>
                            <input class="input input-bordered" prop:value=form.first_name on:input=move |ev| form.first_name.set(event_target_value(&ev)) />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Last Name"</span></label>
                            <input class="input input-bordered" prop:value=form.last_name on:input=move |ev| form.last_name.set(event_target_value(&ev)) />
                        </div>
                    </div>
                    <div class="grid grid-cols-2 gap-3">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"National ID"</span></label>
                            <input class="input input-bordered" prop:value=form.national_id on:input=move |ev| form.national_id.set(event_target_value(&ev)) />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Birth Date"</span></label>
                            <input type="date" class="input input-bordered" prop:value=form.birth_date on:input=move |ev| form.birth_date.set(event_target_value(&ev)) />
                        </div>
                    </div>
                    <div class="grid grid-cols-2 gap-3">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Gender"</span></label>
                            <select class="select select-bordered" on:change=move |ev| form.gender.set(event_target_value(&ev))>
                                {Gender::ALL
                                    .iter()
                                    .map(|g| {
                                        let code = g.code();
                                        view! {
                                            <option value=code selected=move || form.gender.get() == code>{g.label()}</option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                        </div>
                        <Show when=move || picks_group>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Group"</span></label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| form.group_id.set(event_target_value(&ev).parse::<i64>().ok())
                                >
                                    <For
                                        each=move || groups.get()
                                        key=|g| g.id
                                        children=move |g| {
                                            let id = g.id;
                                            view! {
                                                <option value=id.to_string() selected=move || form.group_id.get() == Some(id)>{g.name}</option>
                                            }
                                        }
                                    />
                                </select>
                            </div>
                        </Show>
                    </div>
                    <label class="label cursor-pointer justify-start gap-3">
                        <input
                            type="checkbox"
                            class="toggle toggle-success"
                            prop:checked=form.is_active
                            on:change=move |ev| form.is_active.set(event_target_checked(&ev))
                        />
                        <span class="label-text">"Active"</span>
                    </label>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| form_open.set(false)>"Cancel"</button>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </form>
            </Modal>
        </div>
    }
}
