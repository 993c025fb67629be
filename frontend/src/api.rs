//! API 适配层
//!
//! 所有后端调用都经过 [`MaishaApi`]：
//! - URL 统一为 `{base}/api/{path}`，路径来自 [`Endpoint`]
//! - 自动附加 JSON 请求头与 Bearer 令牌（读取自存储）
//! - 非 2xx 响应统一转换为 [`ApiError::Status`]
//! - 服务端 snake_case 记录转换为客户端结构

use std::sync::Arc;

use futures::try_join;
use maisha_shared::csv::format_phone_for_lookup;
use maisha_shared::group::with_member_counts;
use maisha_shared::member::generate_national_id;
use maisha_shared::payment::InitiateResponse;
use maisha_shared::report::{MyReport, ReportDocument};
use maisha_shared::serde_helper::decode_list;
use maisha_shared::withdrawal::ApproveWithdrawalPayload;
use maisha_shared::{
    AuthResponse, AuthUser, CashoutRequest, CreateDeductionPayload, CreateGroupPayload, CreateWithdrawalPayload,
    CustomerInfo, Endpoint, Group, GroupPolicy, GroupRecord, GroupScope, HEADER_AUTHORIZATION,
    HEADER_CONTENT_TYPE, HEADER_MOPAY_TOKEN, Member, MemberDraft, MemberRecord, MonthlyDeduction,
    PaymentRequest, PaymentStatusDoc, PaymentTransaction, RejectWithdrawalPayload, ReportFilter,
    STORAGE_MOPAY_TOKEN_KEY, STORAGE_TOKEN_KEY, StatementFilter, TopupRequest,
    UpdateDeductionPayload, UpdatePolicyPayload, Wallet, WalletTransaction, WithdrawalRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;
use crate::web::{FetchHttpClient, HttpClient, HttpError, HttpRequest, KeyValueStore, LocalStorage};

#[cfg(test)]
mod tests;

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 请求未到达服务器或响应无法读取
    #[error("{0}")]
    Network(#[from] HttpError),
    /// 非 2xx 响应；`message` 为响应体文本，为空时为 `Request failed: <status>`
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 必需的单个文档无法解析
    #[error("Unexpected response: {0}")]
    Decode(String),
    /// 提交前的本地校验失败
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed: {}", status)
        } else {
            body.to_string()
        };
        ApiError::Status { status, message }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Status { .. } => "HTTP_STATUS",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::Validation(_) => "INVALID_INPUT",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// 批量导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub success: usize,
    pub failed: Vec<String>,
}

// =========================================================
// 客户端
// =========================================================

/// 浏览器环境下的默认客户端类型
pub type Api = MaishaApi<FetchHttpClient, LocalStorage>;

pub struct MaishaApi<C, S> {
    base_url: String,
    lookup_token: Option<String>,
    client: Arc<C>,
    storage: S,
}

impl<C, S: Clone> Clone for MaishaApi<C, S> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            lookup_token: self.lookup_token.clone(),
            client: Arc::clone(&self.client),
            storage: self.storage.clone(),
        }
    }
}

impl Api {
    pub fn from_config(config: &AppConfig) -> Self {
        MaishaApi::new(config, Arc::new(FetchHttpClient), LocalStorage)
    }
}

/// 从 Context 获取 API 客户端
pub fn use_api() -> Api {
    leptos::prelude::expect_context::<Api>()
}

impl<C: HttpClient, S: KeyValueStore> MaishaApi<C, S> {
    pub fn new(config: &AppConfig, client: Arc<C>, storage: S) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            lookup_token: config.lookup_token.clone(),
            client,
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}/api/{}", self.base_url, endpoint.path())
    }

    /// 客户信息查询使用独立令牌，存储优先于构建期默认值
    fn lookup_token(&self) -> Option<String> {
        self.storage
            .get(STORAGE_MOPAY_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| self.lookup_token.clone())
    }

    fn build_request(&self, endpoint: &Endpoint, body: Option<Value>) -> HttpRequest {
        let mut req = HttpRequest::new(&self.url(endpoint), endpoint.method())
            .with_header(HEADER_CONTENT_TYPE, "application/json");

        if endpoint.uses_lookup_token() {
            if let Some(token) = self.lookup_token() {
                req = req
                    .with_header(HEADER_MOPAY_TOKEN, &token)
                    .with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
            }
        } else if let Some(token) = self.storage.get(STORAGE_TOKEN_KEY).filter(|t| !t.is_empty()) {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        match body {
            Some(body) => req.with_body(body),
            None => req,
        }
    }

    /// 发送请求
    ///
    /// 返回 `None` 表示 204 或空响应体。
    async fn request(&self, endpoint: Endpoint, body: Option<Value>) -> ApiResult<Option<Value>> {
        let req = self.build_request(&endpoint, body);
        let resp = self.client.send(req).await.map_err(|e| {
            log::error!("{} {} failed: {}", endpoint.method(), endpoint.path(), e);
            ApiError::from(e)
        })?;

        if !resp.ok() {
            log::warn!(
                "{} {} -> {}",
                endpoint.method(),
                endpoint.path(),
                resp.status
            );
            return Err(ApiError::from_status(resp.status, &resp.body));
        }

        // 只含空白的 2xx 响应体按无内容处理，不报解码错误
        if resp.status == 204 || resp.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&resp.body)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn encode<T: Serialize>(payload: &T) -> ApiResult<Value> {
        serde_json::to_value(payload).map_err(|e| ApiError::Validation(e.to_string()))
    }

    /// 列表请求：非数组视为空列表，无法解析的元素被跳过
    async fn fetch_list<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<Vec<T>> {
        let path = endpoint.path();
        let value = self.request(endpoint, None).await?.unwrap_or(Value::Null);
        if !value.is_array() {
            log::warn!("{}: expected a list, got {}", path, kind_of(&value));
        }
        let (items, skipped) = decode_list(value);
        if skipped > 0 {
            log::warn!("{}: skipped {} malformed item(s)", path, skipped);
        }
        Ok(items)
    }

    /// 必需的单个文档
    async fn fetch_one<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let value = self
            .request(endpoint, body)
            .await?
            .ok_or_else(|| ApiError::Decode("empty response".to_string()))?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 忽略响应体
    async fn execute(&self, endpoint: Endpoint, body: Option<Value>) -> ApiResult<()> {
        self.request(endpoint, body).await.map(|_| ())
    }

    /// 原始响应（报表等结构不固定的文档）
    async fn fetch_document(&self, endpoint: Endpoint) -> ApiResult<ReportDocument> {
        Ok(ReportDocument(
            self.request(endpoint, None).await?.unwrap_or(Value::Null),
        ))
    }

    // =========================================================
    // 认证
    // =========================================================

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.fetch_auth(Endpoint::Login, body).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.fetch_auth(Endpoint::Register, body).await
    }

    /// 空响应视为没有 `user` 的响应，由调用方判定失败
    async fn fetch_auth(&self, endpoint: Endpoint, body: Value) -> ApiResult<AuthResponse> {
        match self.request(endpoint, Some(body)).await? {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            None => Ok(AuthResponse::default()),
        }
    }

    /// 当前令牌对应的用户；响应可能是 `{ "user": ... }` 或用户本身
    pub async fn get_me(&self) -> ApiResult<Option<AuthUser>> {
        let Some(mut value) = self.request(Endpoint::Me, None).await? else {
            return Ok(None);
        };
        if let Some(user) = value.get_mut("user") {
            value = user.take();
        }
        Ok(serde_json::from_value(value).ok())
    }

    // =========================================================
    // 小组与成员
    // =========================================================

    pub async fn get_groups(&self) -> ApiResult<Vec<Group>> {
        let records: Vec<GroupRecord> = self.fetch_list(Endpoint::ListGroups).await?;
        Ok(records.into_iter().map(Group::from).collect())
    }

    pub async fn create_group(&self, payload: &CreateGroupPayload) -> ApiResult<Group> {
        payload.validate().map_err(ApiError::Validation)?;
        let record: GroupRecord = self
            .fetch_one(Endpoint::CreateGroup, Some(Self::encode(payload)?))
            .await?;
        Ok(Group::from(record))
    }

    pub async fn delete_group(&self, id: i64) -> ApiResult<()> {
        self.execute(Endpoint::DeleteGroup(id), None).await
    }

    pub async fn get_members(&self, group_id: Option<i64>) -> ApiResult<Vec<Member>> {
        let records: Vec<MemberRecord> = self.fetch_list(Endpoint::ListMembers(group_id)).await?;
        Ok(records.into_iter().map(Member::from).collect())
    }

    /// 会话范围内的成员
    ///
    /// 无可读小组时不发请求；返回结果再按范围过滤一次。
    pub async fn get_scoped_members(&self, scope: GroupScope) -> ApiResult<Vec<Member>> {
        let Some(group_id) = scope.member_query() else {
            log::debug!("[Api] member list skipped for scope {:?}", scope);
            return Ok(Vec::new());
        };
        let members = self.get_members(group_id).await?;
        Ok(scope.retain_members(members))
    }

    /// 小组列表与成员数（并行请求，任一失败则整体失败）
    pub async fn get_groups_with_counts(&self) -> ApiResult<(Vec<Group>, Vec<Member>)> {
        let (groups, members) = try_join!(self.get_groups(), self.get_members(None))?;
        Ok((with_member_counts(groups, &members), members))
    }

    pub async fn add_member(&self, draft: &MemberDraft) -> ApiResult<Member> {
        draft.validate().map_err(ApiError::Validation)?;
        let body = Self::encode(&draft.to_create_payload())?;
        let record: MemberRecord = self.fetch_one(Endpoint::CreateMember, Some(body)).await?;
        Ok(Member::from(record))
    }

    pub async fn update_member(&self, id: i64, draft: &MemberDraft) -> ApiResult<Member> {
        draft.validate().map_err(ApiError::Validation)?;
        let body = Self::encode(&draft.to_update_payload())?;
        let record: MemberRecord = self.fetch_one(Endpoint::UpdateMember(id), Some(body)).await?;
        Ok(Member::from(record))
    }

    /// 按电话查询客户信息，空响应返回 `None`
    pub async fn get_customer_info(&self, phone: &str) -> ApiResult<Option<CustomerInfo>> {
        match self
            .request(Endpoint::CustomerInfo(phone.to_string()), None)
            .await?
        {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    /// 批量导入成员
    ///
    /// 逐个号码查询客户信息并创建成员；单个号码失败不会中断导入。
    pub async fn import_members(&self, group_id: i64, phones: &[String]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for (seq, phone) in phones.iter().enumerate() {
            let result = self.import_one(group_id, phone, seq).await;

            match result {
                Ok(_) => summary.success += 1,
                Err(e) => {
                    log::warn!("import of {} failed: {}", phone, e);
                    summary.failed.push(phone.clone());
                }
            }
        }
        log::info!(
            "member import into group {}: {} added, {} failed",
            group_id,
            summary.success,
            summary.failed.len()
        );
        summary
    }

    async fn import_one(&self, group_id: i64, phone: &str, seq: usize) -> ApiResult<Member> {
        let formatted = format_phone_for_lookup(phone);
        let info = self.get_customer_info(&formatted).await?;
        let draft = CustomerInfo::into_draft(info, &formatted, group_id, generate_national_id(seq));
        self.add_member(&draft).await
    }

    // =========================================================
    // 支付
    // =========================================================

    pub async fn initiate_payment(&self, payload: &PaymentRequest) -> ApiResult<InitiateResponse> {
        self.fetch_one(Endpoint::InitiatePayment, Some(Self::encode(payload)?))
            .await
    }

    pub async fn check_payment_status(&self, transaction_id: &str) -> ApiResult<PaymentStatusDoc> {
        let id = transaction_id.trim();
        if id.is_empty() {
            return Err(ApiError::Validation("Please enter a transaction ID".to_string()));
        }
        self.fetch_one(Endpoint::PaymentStatus(id.to_string()), None)
            .await
    }

    pub async fn get_transactions(&self) -> ApiResult<Vec<PaymentTransaction>> {
        self.fetch_list(Endpoint::PaymentTransactions).await
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> ApiResult<PaymentTransaction> {
        self.fetch_one(Endpoint::PaymentTransaction(transaction_id.to_string()), None)
            .await
    }

    // =========================================================
    // 钱包
    // =========================================================

    pub async fn get_wallet(&self, member_id: i64) -> ApiResult<Wallet> {
        self.fetch_one(Endpoint::MemberWallet(member_id), None).await
    }

    pub async fn get_group_wallets(&self, group_id: i64) -> ApiResult<Vec<Wallet>> {
        self.fetch_list(Endpoint::GroupWallets(group_id)).await
    }

    pub async fn wallet_topup(&self, payload: &TopupRequest) -> ApiResult<()> {
        self.execute(Endpoint::WalletTopup, Some(Self::encode(payload)?))
            .await
    }

    pub async fn wallet_cashout(&self, payload: &CashoutRequest) -> ApiResult<()> {
        self.execute(Endpoint::WalletCashout, Some(Self::encode(payload)?))
            .await
    }

    pub async fn get_wallet_transactions(&self, member_id: i64) -> ApiResult<Vec<WalletTransaction>> {
        self.fetch_list(Endpoint::WalletTransactions(member_id)).await
    }

    // =========================================================
    // 提现请求
    // =========================================================

    pub async fn create_withdrawal_request(&self, payload: &CreateWithdrawalPayload) -> ApiResult<()> {
        self.execute(Endpoint::CreateWithdrawal, Some(Self::encode(payload)?))
            .await
    }

    pub async fn get_withdrawal_requests(&self, group_id: i64) -> ApiResult<Vec<WithdrawalRequest>> {
        self.fetch_list(Endpoint::GroupWithdrawals(group_id)).await
    }

    pub async fn approve_withdrawal(&self, id: i64, approved_by: &str) -> ApiResult<()> {
        let body = Self::encode(&ApproveWithdrawalPayload {
            approved_by: approved_by.to_string(),
        })?;
        self.execute(Endpoint::ApproveWithdrawal(id), Some(body)).await
    }

    pub async fn reject_withdrawal(&self, id: i64, payload: &RejectWithdrawalPayload) -> ApiResult<()> {
        self.execute(Endpoint::RejectWithdrawal(id), Some(Self::encode(payload)?))
            .await
    }

    // =========================================================
    // 月度扣款
    // =========================================================

    pub async fn get_monthly_deductions(&self, group_id: i64) -> ApiResult<Vec<MonthlyDeduction>> {
        self.fetch_list(Endpoint::GroupDeductions(group_id)).await
    }

    pub async fn create_monthly_deduction(&self, payload: &CreateDeductionPayload) -> ApiResult<()> {
        self.execute(Endpoint::CreateDeduction, Some(Self::encode(payload)?))
            .await
    }

    pub async fn update_monthly_deduction(
        &self,
        id: i64,
        payload: &UpdateDeductionPayload,
    ) -> ApiResult<()> {
        self.execute(Endpoint::UpdateDeduction(id), Some(Self::encode(payload)?))
            .await
    }

    pub async fn delete_monthly_deduction(&self, id: i64) -> ApiResult<()> {
        self.execute(Endpoint::DeleteDeduction(id), None).await
    }

    // =========================================================
    // 报表
    // =========================================================

    pub async fn get_system_report(&self) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::SystemReport).await
    }

    pub async fn get_group_report(&self, group_id: i64) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::GroupReport(group_id)).await
    }

    pub async fn get_member_report(&self, member_id: i64) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::MemberReport(member_id)).await
    }

    pub async fn get_my_report(&self) -> ApiResult<MyReport> {
        self.fetch_one(Endpoint::MyReport, None).await
    }

    pub async fn get_audit_log(&self) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::AuditLog).await
    }

    // =========================================================
    // 小组策略
    // =========================================================

    pub async fn get_group_policy(&self, group_id: i64) -> ApiResult<GroupPolicy> {
        self.fetch_one(Endpoint::GroupPolicy(group_id), None).await
    }

    pub async fn update_group_policy(
        &self,
        group_id: i64,
        payload: &UpdatePolicyPayload,
    ) -> ApiResult<()> {
        self.execute(Endpoint::UpdateGroupPolicy(group_id), Some(Self::encode(payload)?))
            .await
    }

    // =========================================================
    // 钱包报表
    // =========================================================

    pub async fn get_topup_report(&self, filter: &ReportFilter) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::TopupReport(filter.to_query()))
            .await
    }

    pub async fn get_cashout_report(&self, filter: &ReportFilter) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::CashoutReport(filter.to_query()))
            .await
    }

    pub async fn get_group_wallet_summary(&self, group_id: i64) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::GroupWalletSummary(group_id))
            .await
    }

    pub async fn get_member_statement(
        &self,
        member_id: i64,
        filter: &StatementFilter,
    ) -> ApiResult<ReportDocument> {
        self.fetch_document(Endpoint::MemberStatement(member_id, filter.to_query()))
            .await
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
