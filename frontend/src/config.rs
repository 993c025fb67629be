//! 构建期配置
//!
//! WASM 前端没有运行时环境变量，配置在编译时通过 `option_env!` 注入：
//!
//! ```text
//! MAISHA_API_BASE=https://api.example.com MAISHA_MOPAY_TOKEN=... trunk build --release
//! ```

const DEFAULT_API_BASE: &str = "https://bbesoft.mbanirashop.com";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 后端根地址（不含 `/api`）
    pub api_base: String,
    /// 客户信息查询的默认令牌，LocalStorage 中的 `mopay_token` 优先
    pub lookup_token: Option<String>,
    pub log_level: log::LevelFilter,
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::new(
            option_env!("MAISHA_API_BASE"),
            option_env!("MAISHA_MOPAY_TOKEN"),
            option_env!("MAISHA_LOG_LEVEL"),
        )
    }

    fn new(api_base: Option<&str>, lookup_token: Option<&str>, log_level: Option<&str>) -> Self {
        Self {
            api_base: non_empty(api_base)
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            lookup_token: non_empty(lookup_token).map(str::to_string),
            log_level: non_empty(log_level)
                .and_then(|l| l.parse().ok())
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let cfg = AppConfig::new(None, Some("  "), Some("verbose"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.lookup_token, None);
        assert_eq!(cfg.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn blank_values_count_as_unset() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" \t")), None);
        assert_eq!(non_empty(Some(" tok ")), Some("tok"));
        assert_eq!(AppConfig::new(Some("  "), None, None), AppConfig::default());
    }

    #[test]
    fn overrides_are_normalized() {
        let cfg = AppConfig::new(Some("http://localhost:8080/"), Some("tok"), Some("debug"));
        assert_eq!(cfg.api_base, "http://localhost:8080");
        assert_eq!(cfg.lookup_token.as_deref(), Some("tok"));
        assert_eq!(cfg.log_level, log::LevelFilter::Debug);
    }
}
