//! API endpoint catalogue
//!
//! Every backend call is described by an [`Endpoint`]: its HTTP method and its
//! path relative to `{base}/api/`. The adapter in the frontend only ever
//! builds URLs through this enum.

use std::fmt::Display;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================
// Query strings
// =========================================================

/// Percent-encode a query component (same unreserved set as `encodeURIComponent`)
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Ordered query parameters; empty values are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString(Vec<(String, String)>);

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(mut self, key: &str, value: impl Display) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.0.push((key.to_string(), value));
        }
        self
    }

    pub fn append_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(v) => self.append(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `path` or `path?query`
    pub fn attach(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self)
        }
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_component(k), encode_component(v))?;
        }
        Ok(())
    }
}

// =========================================================
// Endpoint Definitions
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Login,
    Register,
    Me,

    ListGroups,
    CreateGroup,
    DeleteGroup(i64),

    ListMembers(Option<i64>),
    CreateMember,
    UpdateMember(i64),
    CustomerInfo(String),

    InitiatePayment,
    PaymentStatus(String),
    PaymentTransactions,
    PaymentTransaction(String),

    MemberWallet(i64),
    GroupWallets(i64),
    WalletTopup,
    WalletCashout,
    WalletTransactions(i64),

    CreateWithdrawal,
    GroupWithdrawals(i64),
    ApproveWithdrawal(i64),
    RejectWithdrawal(i64),

    GroupDeductions(i64),
    CreateDeduction,
    UpdateDeduction(i64),
    DeleteDeduction(i64),

    SystemReport,
    GroupReport(i64),
    MemberReport(i64),
    MyReport,
    AuditLog,

    GroupPolicy(i64),
    UpdateGroupPolicy(i64),

    TopupReport(QueryString),
    CashoutReport(QueryString),
    GroupWalletSummary(i64),
    MemberStatement(i64, QueryString),
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        use Endpoint::*;
        match self {
            Login | Register | CreateGroup | CreateMember | InitiatePayment | WalletTopup
            | WalletCashout | CreateWithdrawal | ApproveWithdrawal(_) | RejectWithdrawal(_)
            | CreateDeduction => HttpMethod::Post,
            UpdateMember(_) | UpdateDeduction(_) | UpdateGroupPolicy(_) => HttpMethod::Put,
            DeleteGroup(_) | DeleteDeduction(_) => HttpMethod::Delete,
            _ => HttpMethod::Get,
        }
    }

    /// Path relative to `/api/`, query string included
    pub fn path(&self) -> String {
        use Endpoint::*;
        match self {
            Login => "auth/login".to_string(),
            Register => "auth/register".to_string(),
            Me => "auth/me".to_string(),

            ListGroups | CreateGroup => "groups".to_string(),
            DeleteGroup(id) => format!("groups/{}", id),

            ListMembers(group) => QueryString::new()
                .append_opt("group_id", *group)
                .attach("members"),
            CreateMember => "members".to_string(),
            UpdateMember(id) => format!("members/{}", id),
            CustomerInfo(phone) => QueryString::new()
                .append("phone", phone)
                .attach("customer-info"),

            InitiatePayment => "payments/initiate".to_string(),
            PaymentStatus(tx) => format!("payments/check-status/{}", encode_component(tx)),
            PaymentTransactions => "payments/transactions".to_string(),
            PaymentTransaction(tx) => format!("payments/transactions/{}", encode_component(tx)),

            MemberWallet(member) => format!("wallets/member/{}", member),
            GroupWallets(group) => format!("wallets/group/{}", group),
            WalletTopup => "wallets/topup".to_string(),
            WalletCashout => "wallets/cashout".to_string(),
            WalletTransactions(member) => format!("wallets/transactions/{}", member),

            CreateWithdrawal => "withdrawals".to_string(),
            GroupWithdrawals(group) => format!("withdrawals/group/{}", group),
            ApproveWithdrawal(id) => format!("withdrawals/{}/approve", id),
            RejectWithdrawal(id) => format!("withdrawals/{}/reject", id),

            GroupDeductions(group) => format!("deductions/group/{}", group),
            CreateDeduction => "deductions".to_string(),
            UpdateDeduction(id) | DeleteDeduction(id) => format!("deductions/{}", id),

            SystemReport => "reports/system".to_string(),
            GroupReport(group) => format!("reports/group/{}", group),
            MemberReport(member) => format!("reports/member/{}", member),
            MyReport => "reports/my".to_string(),
            AuditLog => "reports/audit".to_string(),

            GroupPolicy(group) | UpdateGroupPolicy(group) => format!("group-policy/{}", group),

            TopupReport(query) => query.attach("wallet-reports/topup"),
            CashoutReport(query) => query.attach("wallet-reports/cashout"),
            GroupWalletSummary(group) => format!("wallet-reports/group-summary/{}", group),
            MemberStatement(member, query) => {
                query.attach(&format!("wallet-reports/member-statement/{}", member))
            }
        }
    }

    /// The customer lookup authenticates with the secondary token instead of the session token
    pub fn uses_lookup_token(&self) -> bool {
        matches!(self, Endpoint::CustomerInfo(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("+250 788"), "%2B250%20788");
        assert_eq!(encode_component("a-b_c.d~"), "a-b_c.d~");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn member_listing_path() {
        assert_eq!(Endpoint::ListMembers(None).path(), "members");
        assert_eq!(Endpoint::ListMembers(Some(4)).path(), "members?group_id=4");
    }

    #[test]
    fn methods() {
        assert_eq!(Endpoint::DeleteGroup(1).method(), HttpMethod::Delete);
        assert_eq!(Endpoint::UpdateMember(1).method(), HttpMethod::Put);
        assert_eq!(Endpoint::ApproveWithdrawal(1).method(), HttpMethod::Post);
        assert_eq!(Endpoint::GroupPolicy(1).method(), HttpMethod::Get);
        assert_eq!(Endpoint::UpdateGroupPolicy(1).method(), HttpMethod::Put);
    }

    #[test]
    fn customer_info_is_encoded_and_flagged() {
        let ep = Endpoint::CustomerInfo("+250788000111".to_string());
        assert_eq!(ep.path(), "customer-info?phone=%2B250788000111");
        assert!(ep.uses_lookup_token());
        assert!(!Endpoint::Me.uses_lookup_token());
    }

    #[test]
    fn report_paths_carry_queries() {
        let q = QueryString::new().append("start_date", "2024-01-01").append("member_id", "");
        assert_eq!(
            Endpoint::MemberStatement(8, q).path(),
            "wallet-reports/member-statement/8?start_date=2024-01-01"
        );
        assert_eq!(Endpoint::TopupReport(QueryString::new()).path(), "wallet-reports/topup");
    }
}
