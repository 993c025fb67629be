use crate::api::use_api;
use crate::auth::{register, use_auth};
use crate::components::icons::UserPlus;
use crate::components::toast::use_notifier;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;

const MIN_PASSWORD_LEN: usize = 6;

/// 注册表单的本地校验
fn validate(name: &str, email: &str, password: &str, confirm: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    if password != confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if let Err(msg) = validate(&name.get(), &email.get(), &password.get(), &confirm.get()) {
            set_error_msg.set(Some(msg.to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let api = api.clone();
        let (n, e, p) = (name.get().trim().to_string(), email.get().trim().to_string(), password.get());
        spawn_local(async move {
            if register(&auth, &api, n, e, p).await {
                notifier.success("Account created", "Welcome to Maisha App");
            } else {
                set_error_msg.set(Some("Registration failed. Please try again.".to_string()));
            }
            set_is_submitting.set(false);
        });
    };

    let on_submit = StoredValue::new(on_submit);

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="flex flex-col items-center gap-2 mb-4 text-center">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <UserPlus attr:class="h-8 w-8" />
                    </div>
                    <h1 class="text-3xl font-bold">"Create an account"</h1>
                    <p class="text-base-content/70">"Register to start using Maisha App"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=move |ev| on_submit.with_value(|submit| submit(ev))>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        {field("name", "Full Name", "text", name)}
                        {field("email", "Email", "email", email)}
                        {field("password", "Password", "password", password)}
                        {field("confirm", "Confirm Password", "password", confirm)}

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Creating account..." } else { "Register" }}
                            </button>
                        </div>
                        <p class="text-sm text-center text-base-content/70 mt-2">
                            "Already have an account? "
                            <Link to="/login" class="link link-primary font-medium">"Sign in"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::validate;

    #[test]
    fn registration_form_checks() {
        assert_eq!(validate("", "a@b.c", "secret", "secret"), Err("Please fill in all fields"));
        assert_eq!(
            validate("Ann", "a@b.c", "abc", "abc"),
            Err("Password must be at least 6 characters")
        );
        assert_eq!(
            validate("Ann", "a@b.c", "secret1", "secret2"),
            Err("Passwords do not match")
        );
        assert_eq!(validate("Ann", "a@b.c", "secret", "secret"), Ok(()));
    }
}
