//! 钱包与流水
//!
//! 余额只能通过后端的充值/提现接口改变，这里仅描述请求与展示数据。

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::serde_helper;
use crate::session::AuthUser;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletMember {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
}

impl WalletMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wallet {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(deserialize_with = "serde_helper::id")]
    pub member_id: i64,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub balance: f64,
    #[serde(default = "default_currency", deserialize_with = "serde_helper::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helper::lenient")]
    pub member: Option<WalletMember>,
}

fn default_currency() -> String {
    crate::DEFAULT_CURRENCY.to_string()
}

impl Wallet {
    pub fn owner_name(&self) -> String {
        self.member
            .as_ref()
            .map(WalletMember::full_name)
            .unwrap_or_else(|| format!("Member #{}", self.member_id))
    }
}

/// 钱包列表的余额合计
pub fn total_balance(wallets: &[Wallet]) -> f64 {
    wallets.iter().map(|w| w.balance).sum()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletTransaction {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub transaction_type: String,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub balance_before: f64,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub balance_after: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub description: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_by: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_at: String,
}

impl WalletTransaction {
    pub fn is_credit(&self) -> bool {
        self.balance_after >= self.balance_before
    }
}

/// 发起操作的身份，由角色推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatedBy {
    SuperAdmin,
    GroupAdmin,
    GroupUser,
}

impl InitiatedBy {
    /// super_admin 与 group_user 原样保留，其余按 group_admin 处理
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::SuperAdmin) => InitiatedBy::SuperAdmin,
            Some(Role::GroupUser) => InitiatedBy::GroupUser,
            _ => InitiatedBy::GroupAdmin,
        }
    }
}

/// 充值来源 / 提现方式
pub const FUND_CHANNELS: [&str; 3] = ["cash", "mobile_money", "bank"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopupRequest {
    pub member_id: i64,
    pub amount: f64,
    pub description: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    pub initiated_by: InitiatedBy,
}

impl TopupRequest {
    pub fn new(user: &AuthUser, member_id: i64, amount: f64) -> Self {
        Self {
            member_id,
            amount,
            description: "Wallet top-up".to_string(),
            source: "cash".to_string(),
            reference: None,
            notes: None,
            created_by: user.email.clone(),
            initiated_by: InitiatedBy::for_role(user.role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashoutRequest {
    pub member_id: i64,
    pub amount: f64,
    pub description: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<Role>,
    pub initiated_by: InitiatedBy,
}

impl CashoutRequest {
    pub fn new(user: &AuthUser, member_id: i64, amount: f64) -> Self {
        Self {
            member_id,
            amount,
            description: "Wallet cash-out".to_string(),
            method: "cash".to_string(),
            reference: None,
            notes: None,
            created_by: user.email.clone(),
            user_role: user.role,
            initiated_by: InitiatedBy::for_role(user.role),
        }
    }
}

/// 解析界面输入的金额，必须为正数
pub fn parse_amount(input: &str) -> Result<f64, String> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err("Please enter a valid amount".to_string()),
    }
}

/// 金额显示，如 `12,500 RWF`
pub fn format_money(amount: f64, currency: &str) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} {}", sign, grouped, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: 1,
            name: "Op".to_string(),
            email: "op@example.com".to_string(),
            role: Some(role),
            group_id: Some(1),
            group: None,
        }
    }

    #[test]
    fn parses_wallet_with_string_balance() {
        let w: Wallet = serde_json::from_value(json!({
            "id": 1,
            "member_id": 9,
            "balance": "2500.00",
            "is_active": true,
            "member": { "id": 9, "first_name": "Aline", "last_name": "U", "phone": "250700" }
        }))
        .unwrap();
        assert_eq!(w.balance, 2500.0);
        assert_eq!(w.currency, "RWF");
        assert_eq!(w.owner_name(), "Aline U");
    }

    #[test]
    fn initiated_by_follows_role() {
        assert_eq!(InitiatedBy::for_role(Some(Role::SuperAdmin)), InitiatedBy::SuperAdmin);
        assert_eq!(InitiatedBy::for_role(Some(Role::GroupUser)), InitiatedBy::GroupUser);
        assert_eq!(InitiatedBy::for_role(Some(Role::GroupAdmin)), InitiatedBy::GroupAdmin);
        assert_eq!(InitiatedBy::for_role(None), InitiatedBy::GroupAdmin);
    }

    #[test]
    fn cashout_carries_user_role() {
        let req = CashoutRequest::new(&user(Role::GroupUser), 4, 100.0);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["user_role"], "group_user");
        assert_eq!(body["initiated_by"], "group_user");
        assert_eq!(body["created_by"], "op@example.com");
        assert!(body.get("reference").is_none());

        let topup = serde_json::to_value(TopupRequest::new(&user(Role::SuperAdmin), 4, 5.0)).unwrap();
        assert!(topup.get("user_role").is_none());
        assert_eq!(topup["initiated_by"], "super_admin");
    }

    #[test]
    fn amount_input_validation() {
        assert_eq!(parse_amount(" 150.5 "), Ok(150.5));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(1234567.0, "RWF"), "1,234,567 RWF");
        assert_eq!(format_money(999.0, "RWF"), "999 RWF");
        assert_eq!(format_money(-1500.0, "RWF"), "-1,500 RWF");
    }
}
