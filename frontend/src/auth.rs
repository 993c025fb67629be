//! 认证模块
//!
//! 管理用户会话，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态。
//!
//! - [`SessionStore`]: 会话持久化（`maisha_user` / `maisha_token`）
//! - [`Authenticator`]: 登录、注册、恢复、注销的状态转换
//! - [`AuthContext`]: 提供给组件的响应式状态

use maisha_shared::{
    AuthResponse, AuthUser, Feature, GroupScope, Role, STORAGE_TOKEN_KEY, STORAGE_USER_KEY,
};
use leptos::prelude::*;

use crate::api::{Api, MaishaApi};
use crate::web::{HttpClient, KeyValueStore};

#[cfg(test)]
mod tests;

// =========================================================
// 会话持久化
// =========================================================

pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 读取持久化用户
    ///
    /// 无法解析的记录视为不存在并被删除。令牌不在此处校验。
    pub fn load(&self) -> Option<AuthUser> {
        let raw = self.storage.get(STORAGE_USER_KEY)?;
        match serde_json::from_str::<AuthUser>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("[Auth] discarding corrupt session record: {}", e);
                self.storage.delete(STORAGE_USER_KEY);
                None
            }
        }
    }

    /// 保存用户；令牌仅在存在时写入
    pub fn save(&self, user: &AuthUser, token: Option<&str>) {
        match serde_json::to_string(user) {
            Ok(json) => {
                self.storage.set(STORAGE_USER_KEY, &json);
            }
            Err(e) => log::error!("[Auth] failed to serialize session: {}", e),
        }
        if let Some(token) = token {
            self.storage.set(STORAGE_TOKEN_KEY, token);
        }
    }

    pub fn clear(&self) {
        self.storage.delete(STORAGE_USER_KEY);
        self.storage.delete(STORAGE_TOKEN_KEY);
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(STORAGE_TOKEN_KEY)
    }
}

// =========================================================
// 状态转换
// =========================================================

/// 会话状态转换
///
/// 成功的转换写入存储；任何失败都不写入，之前的会话保持不变。
pub struct Authenticator<C, S> {
    api: MaishaApi<C, S>,
    store: SessionStore<S>,
}

impl<C: HttpClient, S: KeyValueStore + Clone> Authenticator<C, S> {
    pub fn new(api: MaishaApi<C, S>) -> Self {
        let store = SessionStore::new(api.storage().clone());
        Self { api, store }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn restore(&self) -> Option<AuthUser> {
        let user = self.store.load()?;
        if self.store.token().is_none() {
            log::debug!("[Auth] restored {} without a session token", user.email);
        }
        Some(user)
    }

    /// 登录；失败时返回 `None`，不会产生错误
    pub async fn login(&self, email: &str, password: &str) -> Option<AuthUser> {
        let response = self.api.login(email, password).await;
        self.accept(response, true, email)
    }

    /// 注册；响应中的小组摘要不保留
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Option<AuthUser> {
        let response = self.api.register(name, email, password).await;
        self.accept(response, false, email)
    }

    pub fn logout(&self) {
        self.store.clear();
    }

    fn accept(
        &self,
        response: crate::api::ApiResult<AuthResponse>,
        keep_group: bool,
        email: &str,
    ) -> Option<AuthUser> {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::warn!("[Auth] authentication for {} failed: {}", email, e);
                return None;
            }
        };
        let Some((user, token)) = response.into_session(keep_group) else {
            log::warn!("[Auth] response for {} carried no usable user", email);
            return None;
        };
        self.store.save(&user, token.as_deref());
        log::info!(
            "[Auth] signed in as {} ({})",
            user.email,
            user.role.map(|r| r.as_str()).unwrap_or("no role")
        );
        Some(user)
    }
}

// =========================================================
// 响应式上下文
// =========================================================

/// `uninitialized → loading → {authenticated | anonymous}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

/// 认证状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub phase: AuthPhase,
}

impl AuthState {
    fn signed_in(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            phase: AuthPhase::Authenticated,
        }
    }

    fn anonymous() -> Self {
        Self {
            user: None,
            phase: AuthPhase::Anonymous,
        }
    }
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self { state, set_state }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user.is_some()))
    }

    pub fn user(&self) -> Signal<Option<AuthUser>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user.clone()))
    }

    pub fn is_loading(&self) -> bool {
        self.state
            .with(|s| matches!(s.phase, AuthPhase::Uninitialized | AuthPhase::Loading))
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.state.with(|s| maisha_shared::has_role(s.user.as_ref(), roles))
    }

    pub fn can_access_group(&self, group_id: i64) -> bool {
        self.state
            .with(|s| maisha_shared::can_access_group(s.user.as_ref(), group_id))
    }

    pub fn authorize(&self, feature: Feature) -> bool {
        self.state
            .with(|s| maisha_shared::authorize(s.user.as_ref(), feature))
    }

    pub fn scope(&self) -> GroupScope {
        self.state.with(|s| GroupScope::for_user(s.user.as_ref()))
    }

    /// 当前用户名称，用于 `approved_by` / `created_by`
    pub fn display_name(&self) -> String {
        self.state.with(|s| {
            s.user
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default()
        })
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// 初始化认证状态
///
/// 同步恢复持久化的会话后才进入就绪状态。
pub fn init_auth(ctx: &AuthContext, api: &Api) {
    ctx.set_state.update(|state| state.phase = AuthPhase::Loading);

    let next = match Authenticator::new(api.clone()).restore() {
        Some(user) => {
            log::info!("[Auth] restored session for {}", user.email);
            AuthState::signed_in(user)
        }
        None => AuthState::anonymous(),
    };
    ctx.set_state.set(next);
}

/// 登录并保存状态
///
/// # Returns
/// 登录是否成功；失败时状态与存储均不变
pub async fn login(ctx: &AuthContext, api: &Api, email: String, password: String) -> bool {
    match Authenticator::new(api.clone()).login(&email, &password).await {
        Some(user) => {
            ctx.set_state.set(AuthState::signed_in(user));
            true
        }
        None => false,
    }
}

/// 注册并登录
pub async fn register(
    ctx: &AuthContext,
    api: &Api,
    name: String,
    email: String,
    password: String,
) -> bool {
    match Authenticator::new(api.clone())
        .register(&name, &email, &password)
        .await
    {
        Some(user) => {
            ctx.set_state.set(AuthState::signed_in(user));
            true
        }
        None => false,
    }
}

/// 注销并清除状态
///
/// 导航将由路由服务的认证状态监听自动处理。
pub fn logout(ctx: &AuthContext, api: &Api) {
    Authenticator::new(api.clone()).logout();
    ctx.set_state.set(AuthState::anonymous());
    log::info!("[Auth] signed out");
}
