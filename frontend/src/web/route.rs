//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

use maisha_shared::Feature;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// 控制面板，按角色分发
    Dashboard,
    Groups,
    Members,
    Wallets,
    Deductions,
    Withdrawals,
    MemberPortal,
    GroupPolicy,
    Upload,
    Reports,
    Payments,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 需要认证、渲染在导航外壳中的页面
    pub const SHELL: [AppRoute; 11] = [
        Self::Dashboard,
        Self::Groups,
        Self::Members,
        Self::Wallets,
        Self::Deductions,
        Self::Withdrawals,
        Self::MemberPortal,
        Self::GroupPolicy,
        Self::Upload,
        Self::Reports,
        Self::Payments,
    ];

    /// 将 URL path 解析为路由枚举
    ///
    /// 末尾斜杠与查询串被忽略。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" | "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/groups" => Self::Groups,
            "/members" => Self::Members,
            "/wallets" => Self::Wallets,
            "/deductions" => Self::Deductions,
            "/withdrawals" => Self::Withdrawals,
            "/member-portal" => Self::MemberPortal,
            "/group-policy" => Self::GroupPolicy,
            "/upload" => Self::Upload,
            "/reports" => Self::Reports,
            "/payments" => Self::Payments,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Groups => "/groups",
            Self::Members => "/members",
            Self::Wallets => "/wallets",
            Self::Deductions => "/deductions",
            Self::Withdrawals => "/withdrawals",
            Self::MemberPortal => "/member-portal",
            Self::GroupPolicy => "/group-policy",
            Self::Upload => "/upload",
            Self::Reports => "/reports",
            Self::Payments => "/payments",
            Self::NotFound => "/404",
        }
    }

    /// 顶栏标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Register => "Create Account",
            Self::Dashboard => "Dashboard",
            Self::Groups => "Groups",
            Self::Members => "Members",
            Self::Wallets => "Wallets",
            Self::Deductions => "Monthly Deductions",
            Self::Withdrawals => "Withdrawal Requests",
            Self::MemberPortal => "Member Portal",
            Self::GroupPolicy => "Group Policy",
            Self::Upload => "Bulk Upload",
            Self::Reports => "Reports",
            Self::Payments => "Payments",
            Self::NotFound => "Not Found",
        }
    }

    /// 外壳页面守卫使用的权限项；`None` 表示只需登录
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Self::Dashboard => Some(Feature::Dashboard),
            Self::Groups => Some(Feature::Groups),
            Self::Members => Some(Feature::Members),
            Self::Wallets => Some(Feature::Wallets),
            Self::Deductions => Some(Feature::Deductions),
            Self::Withdrawals => Some(Feature::Withdrawals),
            Self::MemberPortal => Some(Feature::MemberPortal),
            Self::GroupPolicy => Some(Feature::GroupPolicy),
            Self::Upload => Some(Feature::Upload),
            Self::Reports => Some(Feature::Reports),
            Self::Payments => Some(Feature::Payments),
            Self::Login | Self::Register | Self::NotFound => None,
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    ///
    /// 只检查会话是否存在；角色由外壳按权限表检查。
    pub fn requires_auth(&self) -> bool {
        Self::SHELL.contains(self)
    }

    /// 定义已认证用户是否应该离开此路由（登录、注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maisha_shared::NavItem;
    use maisha_shared::capability::NAV_ITEMS;

    #[test]
    fn root_and_login_share_a_page() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path(""), AppRoute::Login);
    }

    #[test]
    fn paths_round_trip() {
        for route in AppRoute::SHELL {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/register"), AppRoute::Register);
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        assert_eq!(AppRoute::from_path("/members/"), AppRoute::Members);
        assert_eq!(AppRoute::from_path("/reports?tab=groups"), AppRoute::Reports);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/admin"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/groups/7"), AppRoute::NotFound);
        assert!(!AppRoute::NotFound.requires_auth());
    }

    #[test]
    fn guard_flags() {
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(AppRoute::Upload.requires_auth());
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::Register.requires_auth());
        assert!(!AppRoute::SHELL.contains(&AppRoute::NotFound));
        assert!(AppRoute::SHELL.iter().all(|r| r.requires_auth() && r.feature().is_some()));
        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert!(AppRoute::Register.should_redirect_when_authenticated());
        assert!(!AppRoute::Payments.should_redirect_when_authenticated());
    }

    #[test]
    fn every_nav_item_has_a_route_with_the_same_feature() {
        for NavItem { path, feature, .. } in NAV_ITEMS.iter().copied() {
            let route = AppRoute::from_path(path);
            assert_ne!(route, AppRoute::NotFound, "{}", path);
            assert_eq!(route.feature(), Some(feature), "{}", path);
        }
    }
}
