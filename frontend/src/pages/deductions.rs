use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::DEFAULT_CURRENCY;
use maisha_shared::deduction::DeductionForm;
use maisha_shared::wallet::format_money;
use maisha_shared::{CreateDeductionPayload, MonthlyDeduction, UpdateDeductionPayload};

use super::groups::confirm;
use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{Pencil, Plus, Trash2};
use crate::components::toast::use_notifier;
use crate::components::widgets::{
    EmptyRow, GroupPicker, GroupSelection, Modal, NoGroup, PageHeader,
};

#[component]
pub fn DeductionsPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let selection = GroupSelection::new(auth.scope());

    let deductions = RwSignal::new(Vec::<MonthlyDeduction>::new());
    let loading = RwSignal::new(false);

    let form = RwSignal::new(DeductionForm::default());
    let editing = RwSignal::new(Option::<i64>::None);
    let form_open = RwSignal::new(false);
    let saving = RwSignal::new(false);

    let load = {
        let api = api.clone();
        move |group_id: i64| {
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_monthly_deductions(group_id).await {
                    Ok(list) => deductions.set(list),
                    Err(e) => notifier.api_error("Failed to load deductions", &e),
                }
                loading.set(false);
            });
        }
    };
    let load = StoredValue::new(load);
    let reload = move || {
        if let Some(group_id) = selection.group_id() {
            load.with_value(|f| f(group_id));
        }
    };

    Effect::new(move |_| reload());

    let open_create = move |_| {
        form.set(DeductionForm::default());
        editing.set(None);
        form_open.set(true);
    };

    let open_edit = move |d: MonthlyDeduction| {
        form.set(DeductionForm::from(&d));
        editing.set(Some(d.id));
        form_open.set(true);
    };

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let fields = match form.with(|f| f.validate()) {
                Ok(fields) => fields,
                Err(msg) => {
                    notifier.error("Invalid deduction", msg);
                    return;
                }
            };
            let Some(group_id) = selection.group_id() else {
                return;
            };
            saving.set(true);
            let api = api.clone();
            let editing = editing.get();
            let created_by = auth.display_name();
            spawn_local(async move {
                let result = match editing {
                    Some(id) => {
                        api.update_monthly_deduction(id, &UpdateDeductionPayload::from(fields))
                            .await
                    }
                    None => {
                        api.create_monthly_deduction(&CreateDeductionPayload::new(group_id, fields, &created_by))
                            .await
                    }
                };
                match result {
                    Ok(()) => {
                        notifier.success("Success", "Deduction saved successfully");
                        form_open.set(false);
                        reload();
                    }
                    Err(e) => notifier.api_error("Failed to save deduction", &e),
                }
                saving.set(false);
            });
        }
    };

    let on_toggle = {
        let api = api.clone();
        move |d: MonthlyDeduction| {
            let api = api.clone();
            spawn_local(async move {
                match api
                    .update_monthly_deduction(d.id, &UpdateDeductionPayload::toggle(&d))
                    .await
                {
                    Ok(()) => reload(),
                    Err(e) => notifier.api_error("Failed to update deduction", &e),
                }
            });
        }
    };
    let on_toggle = StoredValue::new(on_toggle);

    let on_delete = {
        let api = api.clone();
        move |d: MonthlyDeduction| {
            if !confirm(&format!("Delete deduction \"{}\"?", d.name)) {
                return;
            }
            let api = api.clone();
            spawn_local(async move {
                match api.delete_monthly_deduction(d.id).await {
                    Ok(()) => {
                        notifier.success("Success", "Deduction deleted");
                        deductions.update(|list| list.retain(|x| x.id != d.id));
                    }
                    Err(e) => notifier.api_error("Failed to delete deduction", &e),
                }
            });
        }
    };
    let on_delete = StoredValue::new(on_delete);

    let text_field = move |label: &'static str, kind: &'static str, get: fn(&DeductionForm) -> String, set: fn(&mut DeductionForm, String)| {
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

    view! {
        <div class="space-y-6">
            <PageHeader title="Monthly Deductions" subtitle="Recurring deductions applied to group members">
                <GroupPicker selection=selection />
                <button class="btn btn-primary gap-2" on:click=open_create disabled=move || selection.group_id().is_none()>
                    <Plus attr:class="h-4 w-4" /> "New Deduction"
                </button>
            </PageHeader>

            <Show
                when=move || selection.group_id().is_some() || selection.scope.needs_group_picker()
                fallback=|| view! { <NoGroup /> }
            >
                <div class="card bg-base-100 shadow">
                    <div class="overflow-x-auto">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Name"</th>
                                    <th>"Amount"</th>
                                    <th class="hidden md:table-cell">"Account"</th>
                                    <th>"Day"</th>
                                    <th>"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || !loading.get() && deductions.with(|d| d.is_empty())>
                                    <EmptyRow colspan=6 message="No monthly deductions configured" />
                                </Show>
                                <For
                                    each=move || deductions.get()
                                    key=|d| (d.id, d.is_active, d.name.clone(), d.amount.to_bits())
                                    children=move |d| {
                                        let (edit, toggle, delete) = (d.clone(), d.clone(), d.clone());
                                        view! {
                                            <tr>
                                                <td class="font-semibold">{d.name.clone()}</td>
                                                <td>{format_money(d.amount, DEFAULT_CURRENCY)}</td>
                                                <td class="hidden md:table-cell font-mono text-sm">{d.account_number.clone()}</td>
                                                <td>{d.day_of_month.map(|day| day.to_string()).unwrap_or_else(|| "-".to_string())}</td>
                                                <td>
                                                    <input
                                                        type="checkbox"
                                                        class="toggle toggle-success toggle-sm"
                                                        prop:checked=d.is_active
                                                        on:change=move |_| on_toggle.with_value(|f| f(toggle.clone()))
                                                    />
                                                </td>
                                                <td class="flex gap-1 justify-end">
                                                    <button class="btn btn-ghost btn-sm" on:click=move |_| open_edit(edit.clone())>
                                                        <Pencil attr:class="h-4 w-4" />
                                                    </button>
                                                    <button class="btn btn-ghost btn-sm text-error" on:click=move |_| on_delete.with_value(|f| f(delete.clone()))>
                                                        <Trash2 attr:class="h-4 w-4" />
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
            </Show>

            <Modal open=form_open title="Monthly Deduction">
                <form class="space-y-3" on:submit=on_submit>
                    {text_field("Name", "text", |f| f.name.clone(), |f, v| f.name = v)}
                    {text_field("Amount", "number", |f| f.amount.clone(), |f, v| f.amount = v)}
                    {text_field("Account Number", "text", |f| f.account_number.clone(), |f, v| f.account_number = v)}
                    {text_field("Day of Month", "number", |f| f.day_of_month.clone(), |f, v| f.day_of_month = v)}
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
