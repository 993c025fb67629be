//! 权限表
//!
//! 所有按角色的可见性判断都经过 [`authorize`]：侧边栏、命令面板、
//! 页面守卫以及页面内的操作按钮。新增功能时只需在 [`CAPABILITIES`] 中登记。

use crate::role::{Role, has_role};
use crate::session::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Dashboard,
    Groups,
    ManageGroups,
    Members,
    ManageMembers,
    MemberPortal,
    Wallets,
    Deductions,
    Withdrawals,
    ApproveWithdrawals,
    GroupPolicy,
    Upload,
    Reports,
    SystemReport,
    Payments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 任意已登录用户（包括没有角色的用户）
    Authenticated,
    /// 仅限列出的角色
    Roles(&'static [Role]),
}

const ADMINS: &[Role] = &[Role::SuperAdmin, Role::GroupAdmin];
const STAFF: &[Role] = &[Role::SuperAdmin, Role::GroupAdmin, Role::GroupUser];

pub const CAPABILITIES: &[(Feature, Access)] = &[
    (Feature::Dashboard, Access::Authenticated),
    (Feature::Groups, Access::Roles(STAFF)),
    (Feature::ManageGroups, Access::Roles(ADMINS)),
    (Feature::Members, Access::Roles(STAFF)),
    (Feature::ManageMembers, Access::Roles(STAFF)),
    (Feature::MemberPortal, Access::Roles(&[Role::Member])),
    (Feature::Wallets, Access::Roles(STAFF)),
    (Feature::Deductions, Access::Roles(ADMINS)),
    (Feature::Withdrawals, Access::Roles(STAFF)),
    (Feature::ApproveWithdrawals, Access::Roles(ADMINS)),
    (Feature::GroupPolicy, Access::Roles(ADMINS)),
    (Feature::Upload, Access::Roles(ADMINS)),
    (Feature::Reports, Access::Roles(STAFF)),
    (Feature::SystemReport, Access::Roles(&[Role::SuperAdmin])),
    (Feature::Payments, Access::Roles(ADMINS)),
];

impl Feature {
    pub fn access(&self) -> Access {
        CAPABILITIES
            .iter()
            .find(|(f, _)| f == self)
            .map(|(_, access)| *access)
            .unwrap_or(Access::Roles(&[]))
    }
}

/// 判断当前会话能否使用某功能
pub fn authorize(user: Option<&AuthUser>, feature: Feature) -> bool {
    match feature.access() {
        Access::Authenticated => user.is_some(),
        Access::Roles(roles) => has_role(user, roles),
    }
}

// =========================================================
// 导航项
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub path: &'static str,
    pub feature: Feature,
    /// 图标名称，由前端映射为 SVG
    pub icon: &'static str,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem { title: "Dashboard", path: "/dashboard", feature: Feature::Dashboard, icon: "dashboard" },
    NavItem { title: "Groups", path: "/groups", feature: Feature::Groups, icon: "users" },
    NavItem { title: "Members", path: "/members", feature: Feature::Members, icon: "user-plus" },
    NavItem { title: "My Wallet", path: "/member-portal", feature: Feature::MemberPortal, icon: "wallet" },
    NavItem { title: "Wallets", path: "/wallets", feature: Feature::Wallets, icon: "wallet" },
    NavItem { title: "Monthly Deductions", path: "/deductions", feature: Feature::Deductions, icon: "calendar" },
    NavItem { title: "Withdrawals", path: "/withdrawals", feature: Feature::Withdrawals, icon: "dollar" },
    NavItem { title: "Group Policy", path: "/group-policy", feature: Feature::GroupPolicy, icon: "shield" },
    NavItem { title: "Excel Upload", path: "/upload", feature: Feature::Upload, icon: "upload" },
    NavItem { title: "Reports", path: "/reports", feature: Feature::Reports, icon: "chart" },
    NavItem { title: "Payments", path: "/payments", feature: Feature::Payments, icon: "card" },
];

pub fn visible_nav_items(user: Option<&AuthUser>) -> Vec<NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|item| authorize(user, item.feature))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FEATURES: [Feature; 15] = [
        Feature::Dashboard,
        Feature::Groups,
        Feature::ManageGroups,
        Feature::Members,
        Feature::ManageMembers,
        Feature::MemberPortal,
        Feature::Wallets,
        Feature::Deductions,
        Feature::Withdrawals,
        Feature::ApproveWithdrawals,
        Feature::GroupPolicy,
        Feature::Upload,
        Feature::Reports,
        Feature::SystemReport,
        Feature::Payments,
    ];

    fn user(role: Option<Role>) -> AuthUser {
        AuthUser {
            id: 1,
            name: "U".to_string(),
            email: "u@example.com".to_string(),
            role,
            group_id: Some(1),
            group: None,
        }
    }

    #[test]
    fn every_feature_is_registered_once() {
        for feature in ALL_FEATURES {
            let count = CAPABILITIES.iter().filter(|(f, _)| *f == feature).count();
            assert_eq!(count, 1, "{:?}", feature);
        }
    }

    #[test]
    fn super_admin_reaches_every_administrative_feature() {
        let admin = user(Some(Role::SuperAdmin));
        for feature in ALL_FEATURES {
            if feature != Feature::MemberPortal {
                assert!(authorize(Some(&admin), feature), "{:?}", feature);
            }
        }
    }

    #[test]
    fn nav_hides_items_outside_allow_list() {
        for role in Role::ALL {
            let u = user(Some(role));
            let visible = visible_nav_items(Some(&u));
            for item in NAV_ITEMS {
                let allowed = match item.feature.access() {
                    Access::Authenticated => true,
                    Access::Roles(roles) => roles.contains(&role),
                };
                assert_eq!(visible.contains(item), allowed, "{:?} {}", role, item.title);
            }
        }
    }

    #[test]
    fn member_sees_portal_but_not_wallet_admin() {
        let member = user(Some(Role::Member));
        let paths: Vec<&str> = visible_nav_items(Some(&member)).iter().map(|i| i.path).collect();
        assert_eq!(paths, vec!["/dashboard", "/member-portal"]);
    }

    #[test]
    fn roleless_and_anonymous_sessions() {
        let roleless = user(None);
        assert!(authorize(Some(&roleless), Feature::Dashboard));
        assert!(!authorize(Some(&roleless), Feature::Groups));
        assert!(visible_nav_items(None).is_empty());
    }

    #[test]
    fn withdrawal_approval_is_admin_only() {
        assert!(!authorize(Some(&user(Some(Role::GroupUser))), Feature::ApproveWithdrawals));
        assert!(authorize(Some(&user(Some(Role::GroupAdmin))), Feature::ApproveWithdrawals));
    }
}
