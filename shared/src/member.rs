//! 成员记录及其双向映射
//!
//! 服务端使用 snake_case 记录 (`MemberRecord`)，界面使用 `Member`。
//! 写回服务端时由 `MemberDraft` 生成 `MemberPayload`。
//! 映射对 `first_name`、`last_name`、`gender`、`is_active`、`national_id`、
//! `phone`、`group_id` 无损。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date;
use crate::serde_helper;

// =========================================================
// Gender
// =========================================================

/// 性别代码
///
/// 线上为 `MALE` / `FEMALE` / `OTHER`，界面显示为 `Male` / `Female` / `Other`。
/// 未知值一律收敛为 `Other`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// `MALE → Male`，`FEMALE → Female`，其余 `Other`
    pub fn from_code(code: &str) -> Self {
        match code {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            _ => Gender::Other,
        }
    }

    /// `Male → MALE`，`Female → FEMALE`，其余 `OTHER`
    pub fn from_label(label: &str) -> Self {
        match label {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            _ => Gender::Other,
        }
    }

    /// 同时接受代码或显示名（客户信息查询两种都可能返回）
    pub fn parse_any(s: &str) -> Self {
        match Gender::from_code(s) {
            Gender::Other => Gender::from_label(s),
            g => g,
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Gender::from_code).unwrap_or_default())
    }
}

// =========================================================
// 服务端格式
// =========================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberRecord {
    #[serde(deserialize_with = "serde_helper::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub national_id: String,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "serde_helper::optional_id")]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 写回服务端的成员负载（新增与更新共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    pub gender: String,
    pub is_active: bool,
    pub national_id: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

// =========================================================
// 客户端格式
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender_code: Gender,
    /// 由 `gender_code` 推导，保留原始代码以便无损写回
    pub raw_gender: Option<String>,
    pub is_active: bool,
    pub national_id: String,
    pub phone: String,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn gender(&self) -> &'static str {
        self.gender_code.label()
    }

    /// 姓名、电话、身份证号的大小写不敏感子串匹配
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.full_name.to_lowercase().contains(&query)
            || self.phone.to_lowercase().contains(&query)
            || self.national_id.to_lowercase().contains(&query)
    }
}

impl From<MemberRecord> for Member {
    fn from(m: MemberRecord) -> Self {
        let full_name = format!("{} {}", m.first_name, m.last_name).trim().to_string();
        let gender_code = m.gender.as_deref().map(Gender::from_code).unwrap_or_default();
        Self {
            id: m.id,
            full_name,
            birth_date: m.birth_date.as_deref().and_then(date::parse_date),
            gender_code,
            raw_gender: m.gender,
            is_active: m.is_active,
            national_id: m.national_id,
            phone: m.phone,
            group_id: m.group_id,
            created_at: m
                .created_at
                .as_deref()
                .and_then(date::parse_datetime)
                .unwrap_or_else(date::now),
            first_name: m.first_name,
            last_name: m.last_name,
        }
    }
}

/// 界面表单中的成员数据
///
/// 当同时提供性别代码与显示名时，以代码为准。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender_code: Option<String>,
    pub gender_label: Option<String>,
    pub is_active: bool,
    pub national_id: String,
    pub phone: String,
    pub group_id: Option<i64>,
}

impl MemberDraft {
    pub fn resolved_gender(&self) -> String {
        match (&self.gender_code, &self.gender_label) {
            (Some(code), _) => code.clone(),
            (None, Some(label)) => Gender::from_label(label).code().to_string(),
            (None, None) => Gender::Other.code().to_string(),
        }
    }

    /// 提交前的本地校验
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("Phone number is required".to_string());
        }
        if self.group_id.is_none() {
            return Err("Please select a group".to_string());
        }
        Ok(())
    }

    /// 新增负载：缺少出生日期时填入占位日期
    pub fn to_create_payload(&self) -> MemberPayload {
        let mut payload = self.to_update_payload();
        if payload.birth_date.is_none() {
            payload.birth_date = Some(date::PLACEHOLDER_BIRTH_DATE.to_string());
        }
        payload
    }

    /// 更新负载：缺少出生日期时保持缺省
    pub fn to_update_payload(&self) -> MemberPayload {
        MemberPayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            birth_date: self.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            gender: self.resolved_gender(),
            is_active: self.is_active,
            national_id: self.national_id.clone(),
            phone: self.phone.clone(),
            group_id: self.group_id,
        }
    }
}

impl From<&Member> for MemberDraft {
    fn from(m: &Member) -> Self {
        Self {
            first_name: m.first_name.clone(),
            last_name: m.last_name.clone(),
            birth_date: m.birth_date,
            gender_code: Some(
                m.raw_gender
                    .clone()
                    .unwrap_or_else(|| m.gender_code.code().to_string()),
            ),
            gender_label: Some(m.gender().to_string()),
            is_active: m.is_active,
            national_id: m.national_id.clone(),
            phone: m.phone.clone(),
            group_id: m.group_id,
        }
    }
}

// =========================================================
// 客户信息查询
// =========================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerInfoRaw {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

/// `customer-info` 查询结果，缺失字段已补默认值
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CustomerInfoRaw")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub is_active: bool,
}

impl From<CustomerInfoRaw> for CustomerInfo {
    fn from(raw: CustomerInfoRaw) -> Self {
        Self {
            first_name: raw.first_name.unwrap_or_default(),
            last_name: raw.last_name.unwrap_or_default(),
            birth_date: raw.birth_date.unwrap_or_default(),
            gender: raw.gender.as_deref().map(Gender::parse_any).unwrap_or_default(),
            is_active: raw.is_active.unwrap_or(true),
        }
    }
}

impl CustomerInfo {
    /// 批量导入时由查询结果生成成员
    ///
    /// 查询不到的姓名使用 `Unknown` / `User`。
    pub fn into_draft(info: Option<Self>, phone: &str, group_id: i64, national_id: String) -> MemberDraft {
        let info = info.unwrap_or_else(|| CustomerInfo {
            first_name: String::new(),
            last_name: String::new(),
            birth_date: String::new(),
            gender: Gender::Other,
            is_active: true,
        });
        let non_empty = |s: String, fallback: &str| {
            if s.trim().is_empty() {
                fallback.to_string()
            } else {
                s
            }
        };
        MemberDraft {
            birth_date: date::parse_date(&info.birth_date),
            gender_code: Some(info.gender.code().to_string()),
            gender_label: None,
            is_active: info.is_active,
            national_id,
            phone: phone.to_string(),
            group_id: Some(group_id),
            first_name: non_empty(info.first_name, "Unknown"),
            last_name: non_empty(info.last_name, "User"),
        }
    }
}

/// 生成批量导入用的临时身份证号
pub fn generate_national_id(seq: usize) -> String {
    format!("ID{}{:03}", date::now().timestamp_millis(), seq % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> MemberRecord {
        serde_json::from_value(json!({
            "id": 21,
            "first_name": "Jean",
            "last_name": "Mugisha",
            "birth_date": "1988-06-15T00:00:00.000Z",
            "gender": "MALE",
            "is_active": 1,
            "national_id": "1198880012345678",
            "phone": "250788123456",
            "group_id": "3",
            "created_at": "2024-01-10T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn maps_server_record_to_client() {
        let m = Member::from(record());
        assert_eq!(m.full_name, "Jean Mugisha");
        assert_eq!(m.gender(), "Male");
        assert!(m.is_active);
        assert_eq!(m.group_id, Some(3));
        assert_eq!(m.birth_date.unwrap().to_string(), "1988-06-15");
    }

    #[test]
    fn full_name_is_trimmed() {
        let r: MemberRecord =
            serde_json::from_value(json!({ "id": 1, "first_name": "Solo", "last_name": "" }))
                .unwrap();
        let m = Member::from(r);
        assert_eq!(m.full_name, "Solo");
        assert!(m.birth_date.is_none());
        assert_eq!(m.gender_code, Gender::Other);
    }

    #[test]
    fn round_trip_preserves_declared_fields() {
        let r = record();
        let payload = MemberDraft::from(&Member::from(r.clone())).to_update_payload();
        assert_eq!(payload.first_name, r.first_name);
        assert_eq!(payload.last_name, r.last_name);
        assert_eq!(Some(payload.gender.clone()), r.gender);
        assert_eq!(payload.is_active, r.is_active);
        assert_eq!(payload.national_id, r.national_id);
        assert_eq!(payload.phone, r.phone);
        assert_eq!(payload.group_id, r.group_id);
    }

    #[test]
    fn gender_codes_and_labels_are_inverse() {
        for g in [Gender::Male, Gender::Female] {
            assert_eq!(Gender::from_label(Gender::from_code(g.code()).label()), g);
        }
        assert_eq!(Gender::from_code("X"), Gender::Other);
        assert_eq!(Gender::from_code(Gender::from_code("X").code()), Gender::Other);
        assert_eq!(Gender::from_label("unknown"), Gender::Other);
    }

    #[test]
    fn gender_code_wins_over_label() {
        let draft = MemberDraft {
            gender_code: Some("FEMALE".to_string()),
            gender_label: Some("Male".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.resolved_gender(), "FEMALE");

        let label_only = MemberDraft {
            gender_label: Some("Male".to_string()),
            ..Default::default()
        };
        assert_eq!(label_only.resolved_gender(), "MALE");
        assert_eq!(MemberDraft::default().resolved_gender(), "OTHER");
    }

    #[test]
    fn create_defaults_birth_date_but_update_does_not() {
        let draft = MemberDraft {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.to_create_payload().birth_date.as_deref(),
            Some(date::PLACEHOLDER_BIRTH_DATE)
        );
        assert!(draft.to_update_payload().birth_date.is_none());

        let json = serde_json::to_value(draft.to_update_payload()).unwrap();
        assert!(json.get("birth_date").is_none());
    }

    #[test]
    fn customer_info_defaults() {
        let info: CustomerInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info.first_name, "");
        assert_eq!(info.gender, Gender::Other);
        assert!(info.is_active);

        let labelled: CustomerInfo =
            serde_json::from_value(json!({ "gender": "Female", "isActive": false })).unwrap();
        assert_eq!(labelled.gender, Gender::Female);
        assert!(!labelled.is_active);
    }

    #[test]
    fn import_draft_uses_placeholder_names() {
        let draft = CustomerInfo::into_draft(None, "250788000111", 4, "ID1".to_string());
        assert_eq!(draft.first_name, "Unknown");
        assert_eq!(draft.last_name, "User");
        assert_eq!(draft.group_id, Some(4));
        assert!(draft.is_active);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn search_matches_name_phone_and_id() {
        let m = Member::from(record());
        assert!(m.matches("mugi"));
        assert!(m.matches("788123"));
        assert!(m.matches("119888"));
        assert!(m.matches(""));
        assert!(!m.matches("kamali"));
    }
}
