//! 移动支付
//!
//! 支付网关的语义由后端负责，这里只构造请求并解释状态码。
//! 状态码是 200 响应体中的业务值，不是 HTTP 状态。

use serde::{Deserialize, Serialize};

use crate::serde_helper;

pub const DEFAULT_PAYMENT_MODE: &str = "MOBILE";
pub const DEFAULT_PAYMENT_MESSAGE: &str = "Payment transaction";
pub const DEFAULT_TRANSFER_MESSAGE: &str = "Transfer transaction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Pending,
    Processing,
    Failed,
    NotFound,
    Error,
    Unknown(i64),
}

impl PaymentStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            200 => Self::Success,
            201 => Self::Pending,
            202 => Self::Processing,
            400 => Self::Failed,
            404 => Self::NotFound,
            500 => Self::Error,
            other => Self::Unknown(other),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Success => "Success".to_string(),
            Self::Pending => "Pending".to_string(),
            Self::Processing => "Processing".to_string(),
            Self::Failed => "Failed".to_string(),
            Self::NotFound => "Not Found".to_string(),
            Self::Error => "Error".to_string(),
            Self::Unknown(code) => format!("Status {}", code),
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Success => "badge badge-success",
            Self::Pending | Self::Processing => "badge badge-warning",
            Self::Failed | Self::Error | Self::NotFound => "badge badge-error",
            Self::Unknown(_) => "badge badge-ghost",
        }
    }
}

// =========================================================
// 发起支付
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub amount: f64,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub currency: String,
    pub phone: String,
    pub payment_mode: String,
    pub message: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfers: Option<Vec<Transfer>>,
}

/// 转账行的表单输入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferForm {
    pub amount: String,
    pub phone: String,
    pub message: String,
}

/// 支付表单输入
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    pub amount: String,
    pub currency: String,
    pub phone: String,
    pub payment_mode: String,
    pub message: String,
    pub callback_url: String,
    pub transfers: Vec<TransferForm>,
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self {
            amount: String::new(),
            currency: crate::DEFAULT_CURRENCY.to_string(),
            phone: String::new(),
            payment_mode: DEFAULT_PAYMENT_MODE.to_string(),
            message: String::new(),
            callback_url: String::new(),
            transfers: Vec::new(),
        }
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl PaymentForm {
    /// 构造请求
    ///
    /// 缺少金额或电话的转账行被丢弃；没有转账行时不发送 `transfers`。
    pub fn to_request(&self) -> Result<PaymentRequest, String> {
        let amount = crate::wallet::parse_amount(&self.amount)?;
        if self.phone.trim().is_empty() {
            return Err("Phone number is required".to_string());
        }
        let transfers = if self.transfers.is_empty() {
            None
        } else {
            Some(
                self.transfers
                    .iter()
                    .filter(|t| !t.amount.trim().is_empty() && !t.phone.trim().is_empty())
                    .filter_map(|t| {
                        let amount = t.amount.trim().parse::<f64>().ok()?;
                        Some(Transfer {
                            amount,
                            phone: t.phone.clone(),
                            message: or_default(&t.message, DEFAULT_TRANSFER_MESSAGE),
                        })
                    })
                    .collect(),
            )
        };
        Ok(PaymentRequest {
            amount,
            currency: self.currency.clone(),
            phone: self.phone.trim().to_string(),
            payment_mode: self.payment_mode.clone(),
            message: or_default(&self.message, DEFAULT_PAYMENT_MESSAGE),
            callback_url: self.callback_url.clone(),
            transfers,
        })
    }
}

/// `payments/initiate` 的响应
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// =========================================================
// 状态查询
// =========================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatus {
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub status: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusDoc {
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub status: Option<i64>,
    #[serde(default)]
    pub transfers: Vec<TransferStatus>,
}

impl PaymentStatusDoc {
    pub fn status(&self) -> Option<PaymentStatus> {
        self.status.map(PaymentStatus::from_code)
    }
}

/// 已跟踪的支付交易
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentTransaction {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub payment_mode: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub message: String,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub created_at: String,
}

impl PaymentTransaction {
    pub fn status(&self) -> Option<PaymentStatus> {
        self.status.map(PaymentStatus::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_labels() {
        let cases = [
            (200, "Success"),
            (201, "Pending"),
            (202, "Processing"),
            (400, "Failed"),
            (404, "Not Found"),
            (500, "Error"),
            (418, "Status 418"),
        ];
        for (code, label) in cases {
            assert_eq!(PaymentStatus::from_code(code).label(), label);
        }
    }

    #[test]
    fn request_defaults_and_transfer_filtering() {
        let form = PaymentForm {
            amount: "1000".to_string(),
            phone: "250788000000".to_string(),
            transfers: vec![
                TransferForm {
                    amount: "400".to_string(),
                    phone: "250788111111".to_string(),
                    message: String::new(),
                },
                TransferForm {
                    amount: String::new(),
                    phone: "250788222222".to_string(),
                    message: "skip".to_string(),
                },
            ],
            ..Default::default()
        };
        let req = form.to_request().unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["currency"], "RWF");
        assert_eq!(body["payment_mode"], "MOBILE");
        assert_eq!(body["message"], DEFAULT_PAYMENT_MESSAGE);
        assert_eq!(body["callback_url"], "");
        let transfers = body["transfers"].as_array().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0]["message"], DEFAULT_TRANSFER_MESSAGE);
    }

    #[test]
    fn no_transfers_field_without_rows() {
        let form = PaymentForm {
            amount: "5".to_string(),
            phone: "1".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(form.to_request().unwrap()).unwrap();
        assert!(body.get("transfers").is_none());
    }

    #[test]
    fn status_document() {
        let doc: PaymentStatusDoc = serde_json::from_value(json!({
            "transactionId": "TX1",
            "phone": "250788",
            "amount": "100",
            "status": 202,
            "transfers": [{ "transactionId": "TX1-a", "amount": 50, "phone": "1", "status": 200 }]
        }))
        .unwrap();
        assert_eq!(doc.status(), Some(PaymentStatus::Processing));
        assert_eq!(doc.transfers[0].status, Some(200));
    }
}
