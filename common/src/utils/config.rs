use std::time::Duration;

use config::{
    builder::{ConfigBuilder, DefaultState},
    Config, Environment, File,
};
use serde::Deserialize;

use crate::error::AppError;

const WECHAT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 16; 24129PN74C Build/BP2A.250605.031.A3; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/116.0.0.0 Mobile Safari/537.36 XWEB/1160117 MMWEBSDK/20250904 MMWEBID/1666 MicroMessenger/8.0.65.2942(0x28004142) WeChat/arm64 Weixin GPVersion/1 NetType/4G Language/zh_CN ABI/arm64";

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_schedule_cache_ttl_secs")]
    pub schedule_cache_ttl_secs: u64,
    #[serde(default = "default_score_cache_ttl_secs")]
    pub score_cache_ttl_secs: u64,
    #[serde(default = "default_exam_cache_ttl_secs")]
    pub exam_cache_ttl_secs: u64,
    #[serde(default = "default_valid_terms_cache_ttl_secs")]
    pub valid_terms_cache_ttl_secs: u64,
}

fn default_http_port() -> u16 {
    6894
}

fn default_portal_base_url() -> String {
    "https://jwxt.ecjtu.edu.cn/weixin".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    WECHAT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "zh-CN,zh;q=0.9".to_string()
}

fn default_schedule_cache_ttl_secs() -> u64 {
    1800
}

fn default_score_cache_ttl_secs() -> u64 {
    3600
}

fn default_exam_cache_ttl_secs() -> u64 {
    3600
}

fn default_valid_terms_cache_ttl_secs() -> u64 {
    7200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            portal_base_url: default_portal_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            schedule_cache_ttl_secs: default_schedule_cache_ttl_secs(),
            score_cache_ttl_secs: default_score_cache_ttl_secs(),
            exam_cache_ttl_secs: default_exam_cache_ttl_secs(),
            valid_terms_cache_ttl_secs: default_valid_terms_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn schedule_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.schedule_cache_ttl_secs)
    }

    pub fn score_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.score_cache_ttl_secs)
    }

    pub fn exam_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.exam_cache_ttl_secs)
    }

    pub fn valid_terms_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.valid_terms_cache_ttl_secs)
    }
}

pub fn get_config() -> Result<AppConfig, AppError> {
    load_config(
        Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default()),
    )
}

fn load_config(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, AppError> {
    Ok(builder.build()?.try_deserialize()?)
}
