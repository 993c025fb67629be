//! 会话模型
//!
//! `AuthUser` 同时是持久化格式（`maisha_user` 中的 JSON）与内存状态。

use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::role::Role;
use crate::serde_helper;

/// 用户所属小组的摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// 已认证用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// 未知角色按缺失处理，所有角色检查随之失败
    #[serde(default, deserialize_with = "serde_helper::lenient")]
    pub role: Option<Role>,
    #[serde(
        default,
        deserialize_with = "serde_helper::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::lenient", skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupSummary>,
}

impl AuthUser {
    pub fn has_role(&self, roles: &[Role]) -> bool {
        crate::role::has_role(Some(self), roles)
    }

    /// 显示用的小组名称，优先使用内嵌摘要
    pub fn group_label(&self) -> Option<String> {
        match (&self.group, self.group_id) {
            (Some(group), _) if !group.name.is_empty() => Some(group.name.clone()),
            (_, Some(id)) => Some(format!("Group #{}", id)),
            _ => None,
        }
    }
}

/// `auth/login` 与 `auth/register` 的响应
///
/// `user` 保留原始 JSON，由 [`AuthResponse::into_session`] 负责校验。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// 规范化为会话用户与令牌
    ///
    /// `user` 缺失或格式错误时返回 `None`。注册响应不携带小组摘要。
    pub fn into_session(self, keep_group: bool) -> Option<(AuthUser, Option<String>)> {
        let value = self.user.filter(|v| v.is_object())?;
        let mut user: AuthUser = serde_json::from_value(value).ok()?;
        if !keep_group {
            user.group = None;
        }
        let token = self.token.filter(|t| !t.is_empty());
        Some((user, token))
    }
}

/// 会话可读取的数据范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScope {
    /// super_admin：所有小组
    All,
    /// group_admin / group_user：仅自己的小组
    Group(i64),
    /// member：仅自己的成员记录
    OwnRecord,
    /// 无会话，或小组角色缺少 `group_id`
    Nothing,
}

impl GroupScope {
    pub fn for_user(user: Option<&AuthUser>) -> Self {
        let Some(user) = user else {
            return GroupScope::Nothing;
        };
        match user.role {
            Some(Role::SuperAdmin) => GroupScope::All,
            Some(Role::GroupAdmin | Role::GroupUser) => user
                .group_id
                .map(GroupScope::Group)
                .unwrap_or(GroupScope::Nothing),
            Some(Role::Member) => GroupScope::OwnRecord,
            None => GroupScope::Nothing,
        }
    }

    /// 解析页面实际使用的小组
    ///
    /// `All` 需要调用方提供选中的小组；小组角色忽略选择，固定为自己的小组。
    pub fn resolve(&self, selected: Option<i64>) -> Option<i64> {
        match self {
            GroupScope::All => selected,
            GroupScope::Group(id) => Some(*id),
            GroupScope::OwnRecord | GroupScope::Nothing => None,
        }
    }

    pub fn allows(&self, group_id: i64) -> bool {
        match self {
            GroupScope::All => true,
            GroupScope::Group(id) => *id == group_id,
            GroupScope::OwnRecord | GroupScope::Nothing => false,
        }
    }

    /// 是否需要在界面上提供小组选择器
    pub fn needs_group_picker(&self) -> bool {
        matches!(self, GroupScope::All)
    }

    /// 成员列表的查询条件
    ///
    /// `Some(None)` 查询全部，`Some(Some(id))` 只查该小组，`None` 不应发起查询。
    pub fn member_query(&self) -> Option<Option<i64>> {
        match self {
            GroupScope::All => Some(None),
            GroupScope::Group(id) => Some(Some(*id)),
            GroupScope::OwnRecord | GroupScope::Nothing => None,
        }
    }

    /// 成员是否在范围内；未分组的成员只对 `All` 可见
    pub fn allows_member(&self, group_id: Option<i64>) -> bool {
        match self {
            GroupScope::All => true,
            _ => group_id.is_some_and(|id| self.allows(id)),
        }
    }

    /// 丢弃范围外的成员
    pub fn retain_members(&self, mut members: Vec<Member>) -> Vec<Member> {
        members.retain(|m| self.allows_member(m.group_id));
        members
    }
}

/// super_admin 可访问任意小组；小组角色仅可访问自身 `group_id`；其余一律拒绝。
pub fn can_access_group(user: Option<&AuthUser>, group_id: i64) -> bool {
    GroupScope::for_user(user).allows(group_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: Option<Role>, group_id: Option<i64>) -> AuthUser {
        AuthUser {
            id: 7,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role,
            group_id,
            group: None,
        }
    }

    #[test]
    fn super_admin_accesses_every_group() {
        let admin = user(Some(Role::SuperAdmin), None);
        for g in [-1, 0, 1, 42, i64::MAX] {
            assert!(can_access_group(Some(&admin), g));
        }
    }

    #[test]
    fn members_and_anonymous_access_nothing() {
        let member = user(Some(Role::Member), Some(3));
        for g in [0, 1, 3, 99] {
            assert!(!can_access_group(Some(&member), g));
            assert!(!can_access_group(None, g));
        }
    }

    #[test]
    fn group_roles_are_limited_to_their_group() {
        for role in [Role::GroupAdmin, Role::GroupUser] {
            let u = user(Some(role), Some(5));
            assert!(can_access_group(Some(&u), 5));
            assert!(!can_access_group(Some(&u), 6));

            let unscoped = user(Some(role), None);
            assert!(!can_access_group(Some(&unscoped), 5));
        }
    }

    #[test]
    fn scope_resolution_follows_session() {
        let admin = user(Some(Role::SuperAdmin), Some(1));
        assert_eq!(GroupScope::for_user(Some(&admin)).resolve(Some(9)), Some(9));
        assert_eq!(GroupScope::for_user(Some(&admin)).resolve(None), None);

        let group_user = user(Some(Role::GroupUser), Some(4));
        assert_eq!(GroupScope::for_user(Some(&group_user)).resolve(Some(9)), Some(4));

        let member = user(Some(Role::Member), Some(4));
        assert_eq!(GroupScope::for_user(Some(&member)).resolve(Some(4)), None);
    }

    fn member_in(id: i64, group_id: Option<i64>) -> Member {
        Member::from(
            serde_json::from_value::<crate::MemberRecord>(json!({ "id": id, "group_id": group_id }))
                .unwrap(),
        )
    }

    #[test]
    fn unscoped_group_role_queries_no_members() {
        for role in [Role::GroupAdmin, Role::GroupUser] {
            let scope = GroupScope::for_user(Some(&user(Some(role), None)));
            assert_eq!(scope, GroupScope::Nothing);
            assert_eq!(scope.member_query(), None);

            let kept = scope.retain_members(vec![member_in(1, Some(1)), member_in(2, Some(2))]);
            assert!(kept.is_empty());
        }
        assert_eq!(GroupScope::OwnRecord.member_query(), None);
    }

    #[test]
    fn group_scope_drops_foreign_members() {
        let scope = GroupScope::for_user(Some(&user(Some(Role::GroupAdmin), Some(1))));
        assert_eq!(scope.member_query(), Some(Some(1)));

        let kept = scope.retain_members(vec![
            member_in(1, Some(1)),
            member_in(2, Some(2)),
            member_in(3, None),
        ]);
        let ids: Vec<i64> = kept.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn super_admin_keeps_every_member() {
        let scope = GroupScope::All;
        assert_eq!(scope.member_query(), Some(None));
        let kept = scope.retain_members(vec![member_in(1, Some(1)), member_in(2, None)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn login_response_is_normalized() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "token": "abc",
            "user": {
                "id": "12",
                "name": "Bob",
                "email": "bob@example.com",
                "role": "group_admin",
                "group_id": 3,
                "group": { "id": 3, "name": "Kigali Savers" },
                "extra": true
            }
        }))
        .unwrap();

        let (user, token) = resp.into_session(true).unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(user.role, Some(Role::GroupAdmin));
        assert_eq!(user.group_id, Some(3));
        assert_eq!(user.group_label().as_deref(), Some("Kigali Savers"));
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn register_response_drops_group_summary() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "user": { "id": 1, "name": "N", "email": "e", "group": { "id": 2, "name": "G" } }
        }))
        .unwrap();
        let (user, token) = resp.into_session(false).unwrap();
        assert!(user.group.is_none());
        assert!(user.role.is_none());
        assert!(token.is_none());
    }

    #[test]
    fn unknown_role_is_treated_as_missing() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "user": { "id": 1, "name": "N", "email": "e", "role": "root" }
        }))
        .unwrap();
        let (user, _) = resp.into_session(true).unwrap();
        assert_eq!(user.role, None);
        assert!(!user.has_role(&Role::ALL));
    }

    #[test]
    fn missing_or_malformed_user_is_rejected() {
        let no_user: AuthResponse = serde_json::from_value(json!({ "token": "t" })).unwrap();
        assert!(no_user.into_session(true).is_none());

        let bad_user: AuthResponse =
            serde_json::from_value(json!({ "user": "not-an-object" })).unwrap();
        assert!(bad_user.into_session(true).is_none());

        let no_id: AuthResponse =
            serde_json::from_value(json!({ "user": { "name": "x" } })).unwrap();
        assert!(no_id.into_session(true).is_none());
    }

    #[test]
    fn persisted_user_round_trips() {
        let mut u = user(Some(Role::GroupUser), Some(2));
        u.group = Some(GroupSummary {
            id: 2,
            name: "Two".to_string(),
        });
        let json = serde_json::to_string(&u).unwrap();
        let back: AuthUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
    }
}
