use serde::{Deserialize, Deserializer, Serialize};

use crate::serde_helper;
use crate::wallet::WalletMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
    Failed,
    Other,
}

impl WithdrawalStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "completed" => Self::Completed,
            "rejected" => Self::Rejected,
            "failed" => Self::Failed,
            _ => Self::Other,
        }
    }

    /// DaisyUI badge 样式
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Completed => "badge badge-success",
            Self::Approved => "badge badge-info",
            Self::Pending => "badge badge-warning",
            Self::Rejected | Self::Failed => "badge badge-error",
            Self::Other => "badge badge-ghost",
        }
    }

    /// 只有待处理的请求可以审批或拒绝
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl<'de> Deserialize<'de> for WithdrawalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or(Self::Other))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WithdrawalRequest {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub member_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub wallet_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
    /// 原始状态文本，用于显示
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
    #[serde(default)]
    pub mopay_transaction_id: Option<String>,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "serde_helper::lenient")]
    pub member: Option<WalletMember>,
}

impl WithdrawalRequest {
    pub fn status(&self) -> WithdrawalStatus {
        WithdrawalStatus::parse(&self.status)
    }

    pub fn requester(&self) -> String {
        match (&self.member, self.member_id) {
            (Some(m), _) => m.full_name(),
            (None, Some(id)) => format!("Member #{}", id),
            (None, None) => "Unknown".to_string(),
        }
    }
}

/// 统计待处理请求
pub fn pending_count(requests: &[WithdrawalRequest]) -> usize {
    requests
        .iter()
        .filter(|r| r.status() == WithdrawalStatus::Pending)
        .count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWithdrawalPayload {
    pub member_id: i64,
    pub amount: f64,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproveWithdrawalPayload {
    pub approved_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectWithdrawalPayload {
    pub approved_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RejectWithdrawalPayload {
    pub fn by_admin(approved_by: &str) -> Self {
        Self {
            approved_by: approved_by.to_string(),
            notes: Some("Rejected by admin".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_is_other() {
        let r: WithdrawalRequest = serde_json::from_value(json!({
            "id": 3, "member_id": 2, "amount": 500, "status": "queued"
        }))
        .unwrap();
        assert_eq!(r.status(), WithdrawalStatus::Other);
        assert!(!r.status().is_actionable());
        assert_eq!(r.requester(), "Member #2");
    }

    #[test]
    fn counts_pending() {
        let list: Vec<WithdrawalRequest> = serde_json::from_value(json!([
            { "id": 1, "status": "pending" },
            { "id": 2, "status": "completed" },
            { "id": 3, "status": "pending", "member": { "id": 1, "first_name": "A", "last_name": "B" } }
        ]))
        .unwrap();
        assert_eq!(pending_count(&list), 2);
        assert_eq!(list[2].requester(), "A B");
        assert_eq!(list[1].status().badge_class(), "badge badge-success");
    }

    #[test]
    fn reject_payload_includes_note() {
        let body = serde_json::to_value(RejectWithdrawalPayload::by_admin("a@b.c")).unwrap();
        assert_eq!(body, json!({ "approved_by": "a@b.c", "notes": "Rejected by admin" }));
    }
}
