//! Maisha 控制台共享领域层
//!
//! 不依赖浏览器 API 的纯逻辑：角色与会话、权限表、
//! 服务端/客户端记录映射、接口目录以及 CSV 工具。

pub mod capability;
pub mod csv;
pub mod date;
pub mod deduction;
pub mod group;
pub mod member;
pub mod payment;
pub mod policy;
pub mod protocol;
pub mod report;
pub mod role;
pub mod serde_helper;
pub mod session;
pub mod wallet;
pub mod withdrawal;

pub use capability::{Access, Feature, NavItem, authorize, visible_nav_items};
pub use deduction::{CreateDeductionPayload, MonthlyDeduction, UpdateDeductionPayload};
pub use group::{CreateGroupPayload, Group, GroupRecord};
pub use member::{CustomerInfo, Gender, Member, MemberDraft, MemberPayload, MemberRecord};
pub use payment::{PaymentRequest, PaymentStatus, PaymentStatusDoc, PaymentTransaction, Transfer};
pub use policy::{GroupPolicy, UpdatePolicyPayload};
pub use protocol::{Endpoint, HttpMethod};
pub use report::{GroupReport, MemberReport, ReportFilter, StatementFilter, SystemReport};
pub use role::{Role, has_role};
pub use session::{AuthResponse, AuthUser, GroupScope, GroupSummary, can_access_group};
pub use wallet::{CashoutRequest, InitiatedBy, TopupRequest, Wallet, WalletTransaction};
pub use withdrawal::{
    CreateWithdrawalPayload, RejectWithdrawalPayload, WithdrawalRequest, WithdrawalStatus,
};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 会话用户记录（JSON）
pub const STORAGE_USER_KEY: &str = "maisha_user";
/// 会话令牌
pub const STORAGE_TOKEN_KEY: &str = "maisha_token";
/// 客户信息查询使用的第二令牌（只读）
pub const STORAGE_MOPAY_TOKEN_KEY: &str = "mopay_token";
/// 主题偏好 ("light" / "dark")
pub const STORAGE_THEME_KEY: &str = "theme";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_MOPAY_TOKEN: &str = "X-Mopay-Token";

/// 默认货币
pub const DEFAULT_CURRENCY: &str = "RWF";
