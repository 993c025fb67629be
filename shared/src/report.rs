//! 报表与统计
//!
//! - 报表查询参数 (`ReportFilter`, `StatementFilter`)
//! - 仪表盘统计 (`SystemStats`, `GroupStats`, `GenderStats`)
//! - 后端报表文档
//! - 小组/成员报表的 CSV 记录

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::csv::Record;
use crate::date;
use crate::deduction::MonthlyDeduction;
use crate::group::Group;
use crate::member::{Gender, Member, MemberRecord};
use crate::protocol::QueryString;
use crate::serde_helper;
use crate::wallet::{Wallet, WalletTransaction, total_balance};
use crate::withdrawal::{WithdrawalRequest, pending_count};

// =========================================================
// 查询参数
// =========================================================

/// 充值/提现报表过滤条件，空值不进入查询串
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub group_id: Option<i64>,
    pub member_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub initiated_by: Option<String>,
}

impl ReportFilter {
    pub fn to_query(&self) -> QueryString {
        QueryString::new()
            .append_opt("group_id", self.group_id)
            .append_opt("member_id", self.member_id)
            .append_opt("start_date", self.start_date.as_deref())
            .append_opt("end_date", self.end_date.as_deref())
            .append_opt("initiated_by", self.initiated_by.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub transaction_type: Option<String>,
}

impl StatementFilter {
    pub fn to_query(&self) -> QueryString {
        QueryString::new()
            .append_opt("start_date", self.start_date.as_deref())
            .append_opt("end_date", self.end_date.as_deref())
            .append_opt("transaction_type", self.transaction_type.as_deref())
    }
}

// =========================================================
// 仪表盘统计
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemStats {
    pub total_groups: usize,
    pub total_members: usize,
    pub active_members: usize,
}

impl SystemStats {
    pub fn compute(group_count: usize, members: &[Member]) -> Self {
        Self {
            total_groups: group_count,
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.is_active).count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStats {
    pub group_members: usize,
    pub total_wallet_balance: f64,
    pub average_balance: f64,
    pub pending_withdrawals: usize,
    pub active_deductions: usize,
    /// 启用中的扣款规则每月合计金额
    pub monthly_collection: f64,
}

impl GroupStats {
    pub fn compute(
        members: &[Member],
        wallets: &[Wallet],
        withdrawals: &[WithdrawalRequest],
        deductions: &[MonthlyDeduction],
    ) -> Self {
        let total = total_balance(wallets);
        let active: Vec<&MonthlyDeduction> = deductions.iter().filter(|d| d.is_active).collect();
        Self {
            group_members: members.len(),
            total_wallet_balance: total,
            average_balance: if wallets.is_empty() {
                0.0
            } else {
                total / wallets.len() as f64
            },
            pending_withdrawals: pending_count(withdrawals),
            active_deductions: active.len(),
            monthly_collection: active.iter().map(|d| d.amount * members.len() as f64).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderStats {
    pub male: usize,
    pub female: usize,
    pub other: usize,
}

impl GenderStats {
    pub fn compute<'a>(members: impl IntoIterator<Item = &'a Member>) -> Self {
        let mut stats = Self::default();
        for m in members {
            match m.gender_code {
                Gender::Male => stats.male += 1,
                Gender::Female => stats.female += 1,
                Gender::Other => stats.other += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.male + self.female + self.other
    }

    /// 百分比（整数，四舍五入）
    pub fn percent(&self, count: usize) -> u32 {
        match self.total() {
            0 => 0,
            total => ((count as f64 / total as f64) * 100.0).round() as u32,
        }
    }
}

// =========================================================
// 后端报表文档
// =========================================================

/// 结构不固定的报表，保留原始 JSON 并提供标量字段的扁平视图
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ReportDocument(pub Value);

impl ReportDocument {
    /// 顶层标量字段 (键, 显示值)，嵌套对象与数组被忽略
    pub fn scalar_entries(&self) -> Vec<(String, String)> {
        let Value::Object(map) = &self.0 else {
            return Vec::new();
        };
        map.iter()
            .filter_map(|(k, v)| scalar_display(v).map(|s| (humanize_key(k), s)))
            .collect()
    }

    /// 顶层数组字段中的对象行
    pub fn rows(&self, key: &str) -> Vec<Map<String, Value>> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub type SystemReport = ReportDocument;
pub type GroupReport = ReportDocument;
pub type MemberReport = ReportDocument;

fn scalar_display(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        Value::Null => Some("-".to_string()),
        _ => None,
    }
}

/// `total_members` -> `Total Members`
pub fn humanize_key(key: &str) -> String {
    key.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WalletSummary {
    #[serde(default, deserialize_with = "serde_helper::amount")]
    pub balance: f64,
    #[serde(default, deserialize_with = "serde_helper::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "serde_helper::truthy")]
    pub is_active: bool,
}

/// `reports/my`：成员自己的记录、钱包、流水与提现请求
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MyReport {
    #[serde(default, deserialize_with = "serde_helper::lenient")]
    pub member: Option<MemberRecord>,
    #[serde(default, deserialize_with = "serde_helper::lenient")]
    pub wallet: Option<WalletSummary>,
    #[serde(default, deserialize_with = "serde_helper::lenient_list")]
    pub transactions: Vec<WalletTransaction>,
    #[serde(default, deserialize_with = "serde_helper::lenient_list")]
    pub withdrawal_requests: Vec<WithdrawalRequest>,
}

// =========================================================
// CSV 导出记录
// =========================================================

pub fn groups_report_records(groups: &[Group]) -> Vec<Record> {
    groups
        .iter()
        .map(|g| {
            vec![
                ("Group Name".to_string(), g.name.clone()),
                ("Description".to_string(), g.description.clone()),
                ("Members".to_string(), g.member_count.to_string()),
                ("Created By".to_string(), g.created_by.clone()),
                ("Created Date".to_string(), date::format_date(&g.created_at)),
            ]
        })
        .collect()
}

/// 小组名称找不到时写 `Unknown`
pub fn members_report_records(members: &[Member], groups: &[Group]) -> Vec<Record> {
    members
        .iter()
        .map(|m| {
            let group = m
                .group_id
                .and_then(|id| groups.iter().find(|g| g.id == id))
                .map(|g| g.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            vec![
                ("Full Name".to_string(), m.full_name.clone()),
                ("National ID".to_string(), m.national_id.clone()),
                ("Gender".to_string(), m.gender().to_string()),
                ("Phone".to_string(), m.phone.clone()),
                ("Group".to_string(), group),
                ("Joined Date".to_string(), date::format_date(&m.created_at)),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(id: i64, gender: &str, active: bool) -> Member {
        Member::from(
            serde_json::from_value::<MemberRecord>(json!({
                "id": id, "gender": gender, "is_active": active, "group_id": 1
            }))
            .unwrap(),
        )
    }

    #[test]
    fn filter_omits_empty_values() {
        let filter = ReportFilter {
            group_id: Some(3),
            start_date: Some(String::new()),
            initiated_by: Some("group_admin".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.to_query().to_string(), "group_id=3&initiated_by=group_admin");
        assert_eq!(ReportFilter::default().to_query().to_string(), "");
    }

    #[test]
    fn gender_statistics() {
        let members = vec![
            member(1, "MALE", true),
            member(2, "FEMALE", true),
            member(3, "FEMALE", false),
            member(4, "X", true),
        ];
        let stats = GenderStats::compute(&members);
        assert_eq!((stats.male, stats.female, stats.other), (1, 2, 1));
        assert_eq!(stats.percent(stats.female), 50);
        assert_eq!(GenderStats::default().percent(0), 0);

        let system = SystemStats::compute(2, &members);
        assert_eq!(system.active_members, 3);
    }

    #[test]
    fn group_statistics() {
        let members = vec![member(1, "MALE", true), member(2, "FEMALE", true)];
        let wallets: Vec<Wallet> = serde_json::from_value(json!([
            { "id": 1, "member_id": 1, "balance": "100" },
            { "id": 2, "member_id": 2, "balance": 300 }
        ]))
        .unwrap();
        let withdrawals: Vec<WithdrawalRequest> =
            serde_json::from_value(json!([{ "id": 1, "status": "pending" }])).unwrap();
        let deductions: Vec<MonthlyDeduction> = serde_json::from_value(json!([
            { "id": 1, "amount": 50, "is_active": true },
            { "id": 2, "amount": 70, "is_active": false }
        ]))
        .unwrap();

        let stats = GroupStats::compute(&members, &wallets, &withdrawals, &deductions);
        assert_eq!(stats.total_wallet_balance, 400.0);
        assert_eq!(stats.average_balance, 200.0);
        assert_eq!(stats.pending_withdrawals, 1);
        assert_eq!(stats.active_deductions, 1);
        assert_eq!(stats.monthly_collection, 100.0);
    }

    #[test]
    fn report_document_views() {
        let doc: ReportDocument = serde_json::from_value(json!({
            "total_members": 12,
            "active": true,
            "nested": { "a": 1 },
            "groups": [{ "name": "A" }, 3]
        }))
        .unwrap();
        let entries = doc.scalar_entries();
        assert!(entries.contains(&("Total Members".to_string(), "12".to_string())));
        assert!(entries.contains(&("Active".to_string(), "Yes".to_string())));
        assert_eq!(entries.len(), 2);
        assert_eq!(doc.rows("groups").len(), 1);
    }

    #[test]
    fn my_report_tolerates_partial_documents() {
        let report: MyReport = serde_json::from_value(json!({
            "member": { "id": 5, "first_name": "Eric", "phone": "250788" },
            "wallet": { "balance": "120.5", "currency": "RWF", "is_active": true },
            "transactions": "unavailable"
        }))
        .unwrap();
        assert_eq!(report.member.unwrap().id, 5);
        assert_eq!(report.wallet.unwrap().balance, 120.5);
        assert!(report.transactions.is_empty());
        assert!(report.withdrawal_requests.is_empty());
    }

    #[test]
    fn members_report_resolves_group_names() {
        let groups = vec![Group::from(
            serde_json::from_value::<crate::group::GroupRecord>(json!({
                "id": 1, "name": "Abakorana", "created_at": "2024-03-05T10:00:00Z"
            }))
            .unwrap(),
        )];
        let mut orphan = member(2, "FEMALE", true);
        orphan.group_id = Some(99);

        let rows = members_report_records(&[member(1, "MALE", true), orphan], &groups);
        assert_eq!(rows[0][4], ("Group".to_string(), "Abakorana".to_string()));
        assert_eq!(rows[1][4].1, "Unknown");
        assert_eq!(rows[1][2].1, "Female");

        let csv = crate::csv::records_to_csv(&groups_report_records(&groups));
        assert_eq!(
            csv,
            "Group Name,Description,Members,Created By,Created Date\nAbakorana,,0,,2024-03-05"
        );
    }
}
