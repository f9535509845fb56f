//! Limits Configuration - 식별자 범위 및 용량 제한
//!
//! 플러그인에 발급하는 명령 ID / 마커 ID 범위와
//! 외부 렉서 등록 용량을 설정합니다.

use serde::{Deserialize, Serialize};

/// 정적 명령 ID 시작값 (플러그인 메뉴 항목)
pub const DEFAULT_COMMAND_BASE: u32 = 22000;
/// 정적 명령 ID 상한 (미포함)
pub const DEFAULT_COMMAND_LIMIT: u32 = 22500;
/// 동적 명령 ID 시작값 (allocate_cmd_id)
pub const DEFAULT_DYNAMIC_COMMAND_BASE: u32 = 23000;
/// 동적 명령 ID 상한 (미포함)
pub const DEFAULT_DYNAMIC_COMMAND_LIMIT: u32 = 24999;
/// 플러그인용 에디터 마커 시작값
pub const DEFAULT_MARKER_BASE: u32 = 3;
/// 플러그인용 에디터 마커 상한 (미포함)
pub const DEFAULT_MARKER_LIMIT: u32 = 19;
/// 등록 가능한 외부 언어 최대 수
pub const DEFAULT_MAX_EXTERNAL_LANGS: usize = 30;
/// 플러그인 하나가 선언할 수 있는 렉서 최대 수
pub const DEFAULT_MAX_LEXERS_PER_PLUGIN: usize = 30;

/// 식별자 범위 / 용량 제한
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    #[serde(default = "default_command_base")]
    pub command_base: u32,

    #[serde(default = "default_command_limit")]
    pub command_limit: u32,

    #[serde(default = "default_dynamic_command_base")]
    pub dynamic_command_base: u32,

    #[serde(default = "default_dynamic_command_limit")]
    pub dynamic_command_limit: u32,

    #[serde(default = "default_marker_base")]
    pub marker_base: u32,

    #[serde(default = "default_marker_limit")]
    pub marker_limit: u32,

    #[serde(default = "default_max_external_langs")]
    pub max_external_langs: usize,

    #[serde(default = "default_max_lexers_per_plugin")]
    pub max_lexers_per_plugin: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            command_base: DEFAULT_COMMAND_BASE,
            command_limit: DEFAULT_COMMAND_LIMIT,
            dynamic_command_base: DEFAULT_DYNAMIC_COMMAND_BASE,
            dynamic_command_limit: DEFAULT_DYNAMIC_COMMAND_LIMIT,
            marker_base: DEFAULT_MARKER_BASE,
            marker_limit: DEFAULT_MARKER_LIMIT,
            max_external_langs: DEFAULT_MAX_EXTERNAL_LANGS,
            max_lexers_per_plugin: DEFAULT_MAX_LEXERS_PER_PLUGIN,
        }
    }
}

impl LimitsConfig {
    /// 범위 설정이 올바른지 확인 (base < limit, 정적/동적 명령 범위 비중첩)
    pub fn validate(&self) -> Result<(), String> {
        if self.command_base >= self.command_limit {
            return Err("commandBase must be lower than commandLimit".into());
        }
        if self.dynamic_command_base >= self.dynamic_command_limit {
            return Err("dynamicCommandBase must be lower than dynamicCommandLimit".into());
        }
        if self.marker_base >= self.marker_limit {
            return Err("markerBase must be lower than markerLimit".into());
        }
        let overlaps = self.command_base < self.dynamic_command_limit
            && self.dynamic_command_base < self.command_limit;
        if overlaps {
            return Err("static and dynamic command ranges overlap".into());
        }
        Ok(())
    }

    /// 다른 설정과 병합 (기본값이 아닌 값만 덮어씀)
    pub fn merge(&mut self, other: LimitsConfig) {
        let defaults = LimitsConfig::default();
        if other.command_base != defaults.command_base {
            self.command_base = other.command_base;
        }
        if other.command_limit != defaults.command_limit {
            self.command_limit = other.command_limit;
        }
        if other.dynamic_command_base != defaults.dynamic_command_base {
            self.dynamic_command_base = other.dynamic_command_base;
        }
        if other.dynamic_command_limit != defaults.dynamic_command_limit {
            self.dynamic_command_limit = other.dynamic_command_limit;
        }
        if other.marker_base != defaults.marker_base {
            self.marker_base = other.marker_base;
        }
        if other.marker_limit != defaults.marker_limit {
            self.marker_limit = other.marker_limit;
        }
        if other.max_external_langs != defaults.max_external_langs {
            self.max_external_langs = other.max_external_langs;
        }
        if other.max_lexers_per_plugin != defaults.max_lexers_per_plugin {
            self.max_lexers_per_plugin = other.max_lexers_per_plugin;
        }
    }
}

fn default_command_base() -> u32 {
    DEFAULT_COMMAND_BASE
}

fn default_command_limit() -> u32 {
    DEFAULT_COMMAND_LIMIT
}

fn default_dynamic_command_base() -> u32 {
    DEFAULT_DYNAMIC_COMMAND_BASE
}

fn default_dynamic_command_limit() -> u32 {
    DEFAULT_DYNAMIC_COMMAND_LIMIT
}

fn default_marker_base() -> u32 {
    DEFAULT_MARKER_BASE
}

fn default_marker_limit() -> u32 {
    DEFAULT_MARKER_LIMIT
}

fn default_max_external_langs() -> usize {
    DEFAULT_MAX_EXTERNAL_LANGS
}

fn default_max_lexers_per_plugin() -> usize {
    DEFAULT_MAX_LEXERS_PER_PLUGIN
}
