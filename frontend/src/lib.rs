//! Maisha App 管理后台
//!
//! 采用 Context-Driven 架构：
//! - `web::route` / `web::router`: 路由定义与路由服务
//! - `api`: 后端适配层，`auth`: 会话状态
//! - `components`: 外壳与通用组件，`pages`: 各业务页面

mod api;
mod auth;
mod config;
mod components {
    pub mod command_palette;
    pub mod dashboard;
    pub mod icons;
    pub mod layout;
    pub mod login;
    pub mod register;
    pub mod sidebar;
    pub mod toast;
    pub mod widgets;
}
mod pages {
    pub mod deductions;
    pub mod group_policy;
    pub mod groups;
    pub mod member_portal;
    pub mod members;
    pub mod payments;
    pub mod reports;
    pub mod upload;
    pub mod wallets;
    pub mod withdrawals;
}

use crate::api::Api;
use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::layout::Shell;
use crate::components::login::LoginPage;
use crate::components::register::RegisterPage;
use crate::components::toast::{Notifier, ToastHost};
use crate::config::AppConfig;
use crate::pages::deductions::DeductionsPage;
use crate::pages::group_policy::GroupPolicyPage;
use crate::pages::groups::GroupsPage;
use crate::pages::member_portal::MemberPortalPage;
use crate::pages::members::MembersPage;
use crate::pages::payments::PaymentsPage;
use crate::pages::reports::ReportsPage;
use crate::pages::upload::UploadPage;
use crate::pages::wallets::WalletsPage;
use crate::pages::withdrawals::WithdrawalsPage;

use leptos::prelude::*;

// 浏览器原生 API 的轻量封装
pub(crate) mod web {
    pub mod download;
    mod http;
    pub mod logger;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::{FetchHttpClient, HttpClient, HttpError, HttpRequest};
    pub use storage::{KeyValueStore, LocalStorage};

    #[cfg(test)]
    pub use http::MockHttpClient;
    #[cfg(test)]
    pub use storage::MemoryStorage;
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 外壳内的页面内容
fn shell_page(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Groups => view! { <GroupsPage /> }.into_any(),
        AppRoute::Members => view! { <MembersPage /> }.into_any(),
        AppRoute::Wallets => view! { <WalletsPage /> }.into_any(),
        AppRoute::Deductions => view! { <DeductionsPage /> }.into_any(),
        AppRoute::Withdrawals => view! { <WithdrawalsPage /> }.into_any(),
        AppRoute::MemberPortal => view! { <MemberPortalPage /> }.into_any(),
        AppRoute::GroupPolicy => view! { <GroupPolicyPage /> }.into_any(),
        AppRoute::Upload => view! { <UploadPage /> }.into_any(),
        AppRoute::Reports => view! { <ReportsPage /> }.into_any(),
        AppRoute::Payments => view! { <PaymentsPage /> }.into_any(),
        AppRoute::Login | AppRoute::Register | AppRoute::NotFound => view! { <NotFound /> }.into_any(),
    }
}

/// 路由匹配函数
///
/// 登录、注册与 404 独立渲染，其余页面包裹在导航外壳中。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFound /> }.into_any(),
        route => view! { <Shell route=route>{shell_page(route)}</Shell> }.into_any(),
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center space-y-4">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl">"Oops! Page not found"</p>
                <Link to="/" class="link link-primary">"Return to Home"</Link>
            </div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 构建期配置与日志
    let config = AppConfig::from_build_env();
    web::logger::init(config.log_level);
    log::info!("[App] api base {}", config.api_base);

    // 2. 全局上下文：API 客户端、通知、认证
    let api = Api::from_config(&config);
    provide_context(api.clone());
    provide_context(Notifier::new());

    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 3. 恢复持久化会话
    init_auth(&auth_ctx, &api);

    // 4. 认证信号注入路由守卫
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <ToastHost />
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
