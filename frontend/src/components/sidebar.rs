use leptos::prelude::*;
use maisha_shared::visible_nav_items;

use crate::api::use_api;
use crate::auth::{logout, use_auth};
use crate::components::icons::{LogOut, NavIcon};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 侧边栏：按权限表过滤的导航项、当前用户与注销
#[component]
pub fn Sidebar() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let router = use_router();

    let user = auth.user();
    let items = move || user.with(|u| visible_nav_items(u.as_ref()));

    let on_logout = move |_| logout(&auth, &api);

    view! {
        <aside class="w-64 min-h-full bg-base-100 border-r border-base-300 flex flex-col">
            <div class="p-6 border-b border-base-300">
                <h2 class="text-xl font-bold text-primary">"Maisha App"</h2>
                <p class="text-xs text-base-content/60">"Management System"</p>
            </div>

            <ul class="menu p-4 flex-1 gap-1">
                <For
                    each=items
                    key=|item| item.path
                    children=move |item| {
                        let active = move || {
                            router.current_route().get() == AppRoute::from_path(item.path)
                        };
                        view! {
                            <li>
                                <Link to=item.path>
                                    <span class=move || if active() { "flex items-center gap-3 font-semibold text-primary" } else { "flex items-center gap-3" }>
                                        <NavIcon name=item.icon />
                                        {item.title}
                                    </span>
                                </Link>
                            </li>
                        }
                    }
                />
            </ul>

            <div class="p-4 border-t border-base-300 space-y-3">
                {move || user.get().map(|u| {
                    let role = u.role.map(|r| r.label()).unwrap_or("No role");
                    view! {
                        <div>
                            <p class="font-semibold truncate">{u.name.clone()}</p>
                            <p class="text-xs text-base-content/60">{role}</p>
                            {u.group_label().map(|g| view! { <p class="text-xs text-base-content/60">{g}</p> })}
                        </div>
                    }
                })}
                <button class="btn btn-outline btn-error btn-sm w-full gap-2" on:click=on_logout>
                    <LogOut attr:class="h-4 w-4" /> "Logout"
                </button>
            </div>
        </aside>
    }
}
