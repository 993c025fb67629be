use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::policy::parse_limit;
use maisha_shared::{GroupPolicy, UpdatePolicyPayload};

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::ShieldCheck;
use crate::components::toast::use_notifier;
use crate::components::widgets::{GroupPicker, GroupSelection, Loading, NoGroup, PageHeader};

fn limit_text(limit: Option<f64>) -> String {
    limit.filter(|v| *v > 0.0).map(|v| v.to_string()).unwrap_or_default()
}

#[component]
pub fn GroupPolicyPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let selection = GroupSelection::new(auth.scope());

    let policy = RwSignal::new(Option::<GroupPolicy>::None);
    let cashout_limit = RwSignal::new(String::new());
    let withdrawal_limit = RwSignal::new(String::new());
    let loading = RwSignal::new(false);
    let saving = RwSignal::new(false);

    {
        let api = api.clone();
        Effect::new(move |_| {
            let Some(group_id) = selection.group_id() else {
                return;
            };
            let api = api.clone();
            loading.set(true);
            spawn_local(async move {
                match api.get_group_policy(group_id).await {
                    Ok(p) => {
                        cashout_limit.set(limit_text(p.max_cashout_amount));
                        withdrawal_limit.set(limit_text(p.max_withdrawal_amount));
                        policy.set(Some(p));
                    }
                    Err(e) => {
                        policy.set(None);
                        notifier.api_error("Failed to load group policy", &e);
                    }
                }
                loading.set(false);
            });
        });
    }

    let on_save = move || {
        let (Some(group_id), Some(current)) = (selection.group_id(), policy.get()) else {
            return;
        };
        let mut payload = UpdatePolicyPayload::from(&current);
        payload.max_cashout_amount = parse_limit(&cashout_limit.get());
        payload.max_withdrawal_amount = parse_limit(&withdrawal_limit.get());

        saving.set(true);
        let api = api.clone();
        spawn_local(async move {
            match api.update_group_policy(group_id, &payload).await {
                Ok(()) => notifier.success("Success", "Group policy updated successfully"),
                Err(e) => notifier.api_error("Failed to update group policy", &e),
            }
            saving.set(false);
        });
    };
    let on_save = StoredValue::new(on_save);

    let switch = move |label: &'static str, hint: &'static str, get: fn(&GroupPolicy) -> bool, set: fn(&mut GroupPolicy, bool)| {
        view! {
            <label class="flex items-center justify-between gap-4 py-3 cursor-pointer">
                <div>
                    <p class="font-medium">{label}</p>
                    <p class="text-sm text-base-content/60">{hint}</p>
                </div>
                <input
                    type="checkbox"
                    class="toggle toggle-primary"
                    prop:checked=move || policy.with(|p| p.as_ref().map(get).unwrap_or(false))
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        policy.update(|p| if let Some(p) = p { set(p, checked) });
                    }
                />
            </label>
        }
    };

    let limit_input = move |label: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control pl-4">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type="number"
                    min="0"
                    class="input input-bordered input-sm w-64"
                    placeholder="No limit"
                    prop:value=value
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </div>
        }
    };

    view! {
        <div class="space-y-6">
            <PageHeader title="Group Policy" subtitle="Control cash-out and withdrawal permissions">
                <GroupPicker selection=selection />
            </PageHeader>

            <Show
                when=move || selection.group_id().is_some() || selection.scope.needs_group_picker()
                fallback=|| view! { <NoGroup /> }
            >
                <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                    <Show
                        when=move || policy.with(Option::is_some)
                        fallback=|| view! { <div class="alert">"No policy found for this group."</div> }
                    >
                        <div class="card bg-base-100 shadow max-w-2xl">
                            <div class="card-body divide-y divide-base-300">
                                <div class="flex items-center gap-2 pb-3">
                                    <ShieldCheck attr:class="h-5 w-5 text-primary" />
                                    <h3 class="card-title">"Permissions"</h3>
                                </div>
                                {switch(
                                    "Allow group staff cash-out",
                                    "Group users may cash out member wallets",
                                    |p| p.allow_group_user_cashout,
                                    |p, v| p.allow_group_user_cashout = v,
                                )}
                                <Show when=move || policy.with(|p| p.as_ref().is_some_and(|p| p.allow_group_user_cashout))>
                                    {limit_input("Maximum cash-out amount", cashout_limit)}
                                </Show>
                                {switch(
                                    "Allow member withdrawals",
                                    "Members may request withdrawals from their wallets",
                                    |p| p.allow_member_withdrawal,
                                    |p, v| p.allow_member_withdrawal = v,
                                )}
                                <Show when=move || policy.with(|p| p.as_ref().is_some_and(|p| p.allow_member_withdrawal))>
                                    {limit_input("Maximum withdrawal amount", withdrawal_limit)}
                                    {switch(
                                        "Require approval",
                                        "Withdrawals wait for an administrator",
                                        |p| p.require_approval_for_withdrawal,
                                        |p, v| p.require_approval_for_withdrawal = v,
                                    )}
                                </Show>
                                <div class="card-actions justify-end pt-4">
                                    <button class="btn btn-primary" on:click=move |_| on_save.with_value(|save| save()) disabled=move || saving.get()>
                                        {move || if saving.get() { "Saving..." } else { "Save Policy" }}
                                    </button>
                                </div>
                            </div>
                        </div>
                    </Show>
                </Show>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::limit_text;

    #[test]
    fn zero_or_missing_limit_shows_empty() {
        assert_eq!(limit_text(None), "");
        assert_eq!(limit_text(Some(0.0)), "");
        assert_eq!(limit_text(Some(50000.0)), "50000");
    }
}
