//! 月度扣款规则
//!
//! 调度与执行由后端完成，这里只负责规则的展示与编辑。

use serde::{Deserialize, Serialize};

use crate::serde_helper;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyDeduction {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub group_id: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub account_number: String,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub day_of_month: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_by: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_at: String,
}

/// 表单输入（均为文本，提交时校验）
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionForm {
    pub name: String,
    pub amount: String,
    pub account_number: String,
    pub day_of_month: String,
}

impl Default for DeductionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            amount: String::new(),
            account_number: String::new(),
            day_of_month: "1".to_string(),
        }
    }
}

impl From<&MonthlyDeduction> for DeductionForm {
    fn from(d: &MonthlyDeduction) -> Self {
        Self {
            name: d.name.clone(),
            amount: d.amount.to_string(),
            account_number: d.account_number.clone(),
            day_of_month: d.day_of_month.unwrap_or(1).to_string(),
        }
    }
}

/// 校验后的字段
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionFields {
    pub name: String,
    pub amount: f64,
    pub account_number: String,
    pub day_of_month: u8,
}

impl DeductionForm {
    pub fn validate(&self) -> Result<DeductionFields, String> {
        if self.name.trim().is_empty() || self.account_number.trim().is_empty() {
            return Err("Please fill in all required fields".to_string());
        }
        let amount = crate::wallet::parse_amount(&self.amount)?;
        let day_of_month = parse_day_of_month(&self.day_of_month)?;
        Ok(DeductionFields {
            name: self.name.trim().to_string(),
            amount,
            account_number: self.account_number.trim().to_string(),
            day_of_month,
        })
    }
}

/// 扣款日必须在 1..=31
pub fn parse_day_of_month(input: &str) -> Result<u8, String> {
    match input.trim().parse::<u8>() {
        Ok(day @ 1..=31) => Ok(day),
        _ => Err("Day of month must be between 1 and 31".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDeductionPayload {
    pub group_id: i64,
    pub name: String,
    pub amount: f64,
    pub account_number: String,
    pub day_of_month: u8,
    pub created_by: String,
}

impl CreateDeductionPayload {
    pub fn new(group_id: i64, fields: DeductionFields, created_by: &str) -> Self {
        Self {
            group_id,
            name: fields.name,
            amount: fields.amount,
            account_number: fields.account_number,
            day_of_month: fields.day_of_month,
            created_by: created_by.to_string(),
        }
    }
}

/// 部分更新，只序列化提供的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDeductionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateDeductionPayload {
    pub fn toggle(current: &MonthlyDeduction) -> Self {
        Self {
            is_active: Some(!current.is_active),
            ..Default::default()
        }
    }
}

impl From<DeductionFields> for UpdateDeductionPayload {
    fn from(fields: DeductionFields) -> Self {
        Self {
            name: Some(fields.name),
            amount: Some(fields.amount),
            account_number: Some(fields.account_number),
            day_of_month: Some(fields.day_of_month),
            is_active: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_of_month_bounds() {
        assert_eq!(parse_day_of_month("1"), Ok(1));
        assert_eq!(parse_day_of_month("31"), Ok(31));
        assert!(parse_day_of_month("0").is_err());
        assert!(parse_day_of_month("32").is_err());
        assert!(parse_day_of_month("x").is_err());
    }

    #[test]
    fn form_validation() {
        let form = DeductionForm {
            name: " Savings ".to_string(),
            amount: "2000".to_string(),
            account_number: "ACC-1".to_string(),
            day_of_month: "15".to_string(),
        };
        let fields = form.validate().unwrap();
        assert_eq!(fields.name, "Savings");
        assert_eq!(fields.day_of_month, 15);

        let empty = DeductionForm::default();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn toggle_only_sends_active_flag() {
        let d: MonthlyDeduction =
            serde_json::from_value(json!({ "id": 1, "is_active": true, "name": "X" })).unwrap();
        let body = serde_json::to_value(UpdateDeductionPayload::toggle(&d)).unwrap();
        assert_eq!(body, json!({ "is_active": false }));
    }
}
