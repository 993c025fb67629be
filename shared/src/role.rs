//! 角色定义
//!
//! 角色集合是封闭的，但不是严格的层级：每个功能都有自己的允许列表，
//! 见 [`crate::capability`]。

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::session::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    GroupAdmin,
    GroupUser,
    Member,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::GroupAdmin,
        Role::GroupUser,
        Role::Member,
    ];

    /// 线上格式 (`super_admin` ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::GroupAdmin => "group_admin",
            Role::GroupUser => "group_user",
            Role::Member => "member",
        }
    }

    /// 界面显示名称
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::GroupAdmin => "Group Admin",
            Role::GroupUser => "Group User",
            Role::Member => "Member",
        }
    }

    /// 是否按自身 `group_id` 限定访问范围
    pub fn is_group_scoped(&self) -> bool {
        matches!(self, Role::GroupAdmin | Role::GroupUser)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// 会话存在、角色存在且属于 `roles` 时为真。
///
/// 没有会话或没有角色时一律失败，`roles` 为空时也失败。
pub fn has_role(user: Option<&AuthUser>, roles: &[Role]) -> bool {
    user.and_then(|u| u.role)
        .is_some_and(|role| roles.contains(&role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Option<Role>) -> AuthUser {
        AuthUser {
            id: 1,
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            role,
            group_id: None,
            group: None,
        }
    }

    #[test]
    fn role_wire_format_round_trips() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn empty_allow_list_never_matches() {
        for role in Role::ALL {
            assert!(!has_role(Some(&user_with(Some(role))), &[]));
        }
    }

    #[test]
    fn missing_user_or_role_fails_closed() {
        assert!(!has_role(None, &Role::ALL));
        assert!(!has_role(Some(&user_with(None)), &Role::ALL));
    }

    #[test]
    fn membership_check() {
        let admin = user_with(Some(Role::GroupAdmin));
        assert!(has_role(Some(&admin), &[Role::SuperAdmin, Role::GroupAdmin]));
        assert!(!has_role(Some(&admin), &[Role::SuperAdmin]));
    }
}
