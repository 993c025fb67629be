use crate::api::use_api;
use crate::auth::{login, use_auth};
use crate::components::icons::LogOut;
use crate::components::toast::use_notifier;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 登录表单的本地校验，返回去除空白后的邮箱与原始密码
fn credentials(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Please fill in all fields");
    }
    Ok((email.to_string(), password.to_string()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = match credentials(&email.get(), &password.get()) {
            Ok(pair) => pair,
            Err(msg) => {
                set_error_msg.set(Some(msg.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let api = api.clone();
        spawn_local(async move {
            // 成功后由路由服务的认证监听跳转到面板
            if login(&auth, &api, email, password).await {
                notifier.success("Welcome back!", "Login successful");
            } else {
                set_error_msg.set(Some("Invalid email or password".to_string()));
                notifier.error("Login failed", "Invalid email or password");
            }
            set_is_submitting.set(false);
        });
    };

    let on_submit = StoredValue::new(on_submit);

    view! {
        <Show
            when=move || !auth.is_loading()
            fallback=|| view! { <div class="flex items-center justify-center min-h-screen"><span class="loading loading-spinner loading-lg text-primary"></span></div> }
        >
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <div class="flex flex-col items-center gap-2">
                            <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                                <LogOut attr:class="h-8 w-8 rotate-180" />
                            </div>
                            <h1 class="text-3xl font-bold">"Welcome to Maisha App"</h1>
                            <p class="text-base-content/70">
                                "Sign in to manage your groups and members"
                            </p>
                        </div>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=move |ev| on_submit.with_value(|submit| submit(ev))>
                            <Show when=move || error_msg.get().is_some()>
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <span>{move || error_msg.get().unwrap_or_default()}</span>
                                </div>
                            </Show>

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"Email"</span>
                                </label>
                                <input
                                    id="email"
                                    type="email"
                                    placeholder="Enter your email"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"Password"</span>
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    placeholder="Enter your password"
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                    prop:value=password
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                    {move || if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                    } else {
                                        "Sign In".into_any()
                                    }}
                                </button>
                            </div>
                            <p class="text-sm text-center text-base-content/70 mt-2">
                                "Don't have an account? "
                                <Link to="/register" class="link link-primary font-medium">"Register here"</Link>
                            </p>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::credentials;

    #[test]
    fn login_form_requires_both_fields() {
        assert_eq!(credentials("   ", "secret"), Err("Please fill in all fields"));
        assert_eq!(credentials("a@b.c", ""), Err("Please fill in all fields"));
        assert_eq!(
            credentials(" a@b.c ", " pass "),
            Ok(("a@b.c".to_string(), " pass ".to_string()))
        );
    }
}
