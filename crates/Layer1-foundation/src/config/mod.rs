//! Config - 호스트 설정 관리
//!
//! - `limits.rs` - 명령/마커 ID 범위, 외부 렉서 용량
//! - `host.rs` - HostConfig 통합 설정 (경로, 대화형 여부, 메뉴)

mod host;
mod limits;

pub use host::{
    HostConfig, DEFAULT_MENU_TITLE, HOST_CONFIG_FILE, LEXER_CONFIG_EXT, PLUGINS_CONFIG_DIR,
    PLUGINS_DIR,
};
pub use limits::{
    LimitsConfig, DEFAULT_COMMAND_BASE, DEFAULT_COMMAND_LIMIT, DEFAULT_DYNAMIC_COMMAND_BASE,
    DEFAULT_DYNAMIC_COMMAND_LIMIT, DEFAULT_MARKER_BASE, DEFAULT_MARKER_LIMIT,
    DEFAULT_MAX_EXTERNAL_LANGS, DEFAULT_MAX_LEXERS_PER_PLUGIN,
};
