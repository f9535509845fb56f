//! # plume-foundation
//!
//! Foundation layer for Plume:
//! - Error: 중앙 에러 타입 (로드 실패, 플러그인 장애, 설정 오류)
//! - Config: 호스트 설정 (HostConfig, LimitsConfig)
//! - Storage: JsonStore (글로벌/프로젝트 JSON 설정)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HostConfig                                             │
//! │  ├── installDir / userDataDir / pluginsDir             │
//! │  └── LimitsConfig (명령 ID, 마커, 렉서 용량)            │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          JsonStore (global ← project 병합)              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result, LOAD_FAILURE_GUIDANCE};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    HostConfig, LimitsConfig, DEFAULT_MENU_TITLE, HOST_CONFIG_FILE, LEXER_CONFIG_EXT,
    PLUGINS_CONFIG_DIR, PLUGINS_DIR,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
