use serde::{Deserialize, Serialize};

use crate::serde_helper;

/// 小组策略：控制提现权限与限额
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupPolicy {
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub group_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub allow_group_user_cashout: bool,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub allow_member_withdrawal: bool,
    #[serde(default, deserialize_with = "serde_helper::optional_amount")]
    pub max_cashout_amount: Option<f64>,
    #[serde(default, deserialize_with = "serde_helper::optional_amount")]
    pub max_withdrawal_amount: Option<f64>,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub require_approval_for_withdrawal: bool,
}

/// 更新负载
///
/// 限额为 0 或缺失时不发送，表示不限额。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePolicyPayload {
    pub allow_group_user_cashout: bool,
    pub allow_member_withdrawal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cashout_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_withdrawal_amount: Option<f64>,
    pub require_approval_for_withdrawal: bool,
}

impl From<&GroupPolicy> for UpdatePolicyPayload {
    fn from(p: &GroupPolicy) -> Self {
        let limit = |v: Option<f64>| v.filter(|a| *a > 0.0);
        Self {
            allow_group_user_cashout: p.allow_group_user_cashout,
            allow_member_withdrawal: p.allow_member_withdrawal,
            max_cashout_amount: limit(p.max_cashout_amount),
            max_withdrawal_amount: limit(p.max_withdrawal_amount),
            require_approval_for_withdrawal: p.require_approval_for_withdrawal,
        }
    }
}

/// 解析限额输入，空串表示不限额
pub fn parse_limit(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_limits_are_omitted() {
        let policy: GroupPolicy = serde_json::from_value(json!({
            "id": 1,
            "group_id": 2,
            "allow_group_user_cashout": 1,
            "allow_member_withdrawal": false,
            "max_cashout_amount": "0.00",
            "max_withdrawal_amount": 50000,
            "require_approval_for_withdrawal": true
        }))
        .unwrap();
        let body = serde_json::to_value(UpdatePolicyPayload::from(&policy)).unwrap();
        assert_eq!(
            body,
            json!({
                "allow_group_user_cashout": true,
                "allow_member_withdrawal": false,
                "max_withdrawal_amount": 50000.0,
                "require_approval_for_withdrawal": true
            })
        );
    }

    #[test]
    fn limit_input() {
        assert_eq!(parse_limit(""), None);
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("2500"), Some(2500.0));
    }
}
