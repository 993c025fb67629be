//! 按角色分发的仪表盘

mod group_admin;
mod group_user;
mod member;
mod super_admin;

use leptos::prelude::*;
use maisha_shared::Role;

use crate::auth::use_auth;
use crate::components::icons::NavIcon;
use crate::web::router::Link;

use group_admin::GroupAdminView;
use group_user::GroupUserView;
use member::MemberView;
use super_admin::SuperAdminView;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let role = Memo::new(move |_| auth.state.with(|s| s.user.as_ref().and_then(|u| u.role)));

    move || match role.get() {
        Some(Role::SuperAdmin) => view! { <SuperAdminView /> }.into_any(),
        Some(Role::GroupAdmin) => view! { <GroupAdminView /> }.into_any(),
        Some(Role::GroupUser) => view! { <GroupUserView /> }.into_any(),
        Some(Role::Member) => view! { <MemberView /> }.into_any(),
        None => view! {
            <WelcomeBanner
                greeting=format!("Welcome, {}!", auth.display_name())
                subtitle="Member Dashboard"
                tone="from-neutral to-base-300"
            />
        }
        .into_any(),
    }
}

/// 仪表盘顶部的欢迎横幅
#[component]
fn WelcomeBanner(
    #[prop(into)] greeting: String,
    #[prop(into)] subtitle: String,
    /// 渐变色 class
    tone: &'static str,
) -> impl IntoView {
    view! {
        <div class=format!("bg-gradient-to-r {} rounded-box p-6 text-primary-content shadow", tone)>
            <h1 class="text-2xl md:text-3xl font-bold mb-2">{greeting}</h1>
            <p class="opacity-80">{subtitle}</p>
        </div>
    }
}

/// 快捷入口
#[component]
fn QuickActions(actions: &'static [(&'static str, &'static str, &'static str)]) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title">"Quick Actions"</h3>
                <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-3">
                    {actions
                        .iter()
                        .map(|(label, path, icon)| {
                            view! {
                                <Link to=*path class="p-4 border border-base-300 rounded-box hover:bg-base-200 text-center">
                                    <div class="flex flex-col items-center gap-2">
                                        <NavIcon name=*icon />
                                        <span class="font-medium">{*label}</span>
                                    </div>
                                </Link>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        </div>
    }
}
