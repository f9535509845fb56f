//! Host Config - 플러그인 호스트 통합 설정
//!
//! 설치 경로, 사용자 데이터 경로, 플러그인 디렉토리, 대화형 여부 등
//! 플러그인 코어가 필요로 하는 모든 설정을 관리

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::LimitsConfig;

/// 설정 파일명
pub const HOST_CONFIG_FILE: &str = "config.json";

/// 플러그인 디렉토리 이름
pub const PLUGINS_DIR: &str = "plugins";

/// 렉서 설정 문서 디렉토리 이름 (plugins/ 아래, 스캔에서 제외됨)
pub const PLUGINS_CONFIG_DIR: &str = "Config";

/// 렉서 설정 문서 확장자
pub const LEXER_CONFIG_EXT: &str = "xml";

/// 기본 플러그인 메뉴 이름
pub const DEFAULT_MENU_TITLE: &str = "&Plugins";

// ============================================================================
// Host Config (통합)
// ============================================================================

/// Plume 호스트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 설치 디렉토리 (없으면 실행 파일 위치)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// 사용자 데이터 디렉토리 (없으면 <data_dir>/plume)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data_dir: Option<PathBuf>,

    /// 플러그인 루트 (없으면 <install>/plugins)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_dir: Option<PathBuf>,

    /// 플러그인 로딩 비활성화
    #[serde(default)]
    pub no_plugin: bool,

    /// 로드 실패 시 사용자에게 묻기 (false면 로그만 남김)
    #[serde(default = "default_true")]
    pub interactive: bool,

    /// 플러그인 메뉴 이름
    #[serde(default = "default_menu_title")]
    pub menu_title: String,

    /// "Plugins Admin..." 메뉴 항목 표시
    #[serde(default = "default_true")]
    pub enable_plugin_admin: bool,

    /// 식별자 범위 / 용량 제한
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            install_dir: None,
            user_data_dir: None,
            plugins_dir: None,
            no_plugin: false,
            interactive: true,
            menu_title: default_menu_title(),
            enable_plugin_admin: true,
            limits: LimitsConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<HostConfig>(HOST_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<HostConfig>(HOST_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 지정한 파일에서 로드 (글로벌/프로젝트 설정 무시)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: HostConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<()> {
        self.limits.validate().map_err(Error::Config)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: HostConfig) {
        if other.install_dir.is_some() {
            self.install_dir = other.install_dir;
        }
        if other.user_data_dir.is_some() {
            self.user_data_dir = other.user_data_dir;
        }
        if other.plugins_dir.is_some() {
            self.plugins_dir = other.plugins_dir;
        }
        if other.menu_title != default_menu_title() {
            self.menu_title = other.menu_title;
        }
        // 기본값과 같은 bool 은 "미지정" 으로 보고 기존 값을 유지
        if other.no_plugin {
            self.no_plugin = true;
        }
        if !other.interactive {
            self.interactive = false;
        }
        if !other.enable_plugin_admin {
            self.enable_plugin_admin = false;
        }
        self.limits.merge(other.limits);
    }

    // ========================================================================
    // 경로 해석
    // ========================================================================

    /// 설치 디렉토리
    pub fn install_dir(&self) -> PathBuf {
        if let Some(dir) = &self.install_dir {
            return dir.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// 사용자 데이터 디렉토리
    pub fn user_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.user_data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("plume"))
            .unwrap_or_else(|| self.install_dir())
    }

    /// 플러그인 루트 디렉토리
    pub fn plugins_dir(&self) -> PathBuf {
        self.plugins_dir
            .clone()
            .unwrap_or_else(|| self.install_dir().join(PLUGINS_DIR))
    }

    /// 렉서 설정 문서 후보 경로 (설치 경로 우선, 사용자 데이터 경로 fallback)
    pub fn lexer_config_candidates(&self, module_stem: &str) -> [PathBuf; 2] {
        let file_name = format!("{}.{}", module_stem, LEXER_CONFIG_EXT);
        let install = self
            .install_dir()
            .join(PLUGINS_DIR)
            .join(PLUGINS_CONFIG_DIR)
            .join(&file_name);
        let user = self
            .user_data_dir()
            .join(PLUGINS_DIR)
            .join(PLUGINS_CONFIG_DIR)
            .join(&file_name);
        debug!(
            "Lexer config candidates for {}: {} / {}",
            module_stem,
            install.display(),
            user.display()
        );
        [install, user]
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn install_dir_at(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    pub fn user_data_dir_at(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn plugins_dir_at(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = Some(dir.into());
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn no_plugin(mut self, no_plugin: bool) -> Self {
        self.no_plugin = no_plugin;
        self
    }

    pub fn limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_menu_title() -> String {
    DEFAULT_MENU_TITLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert!(config.interactive);
        assert!(!config.no_plugin);
        assert_eq!(config.menu_title, "&Plugins");
    }

    #[test]
    fn test_plugins_dir_defaults_to_install() {
        let config = HostConfig::new().install_dir_at("/opt/plume");
        assert_eq!(config.plugins_dir(), PathBuf::from("/opt/plume/plugins"));

        let config = config.plugins_dir_at("/tmp/custom");
        assert_eq!(config.plugins_dir(), PathBuf::from("/tmp/custom"));
    }

    #[test]
    fn test_lexer_config_candidates_order() {
        let config = HostConfig::new()
            .install_dir_at("/opt/plume")
            .user_data_dir_at("/home/u/.local/share/plume");

        let [install, user] = config.lexer_config_candidates("MyLexer");
        assert_eq!(install, PathBuf::from("/opt/plume/plugins/Config/MyLexer.xml"));
        assert_eq!(
            user,
            PathBuf::from("/home/u/.local/share/plume/plugins/Config/MyLexer.xml")
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = HostConfig::new().install_dir_at("/a");
        let other: HostConfig =
            serde_json::from_str(r#"{ "pluginsDir": "/b/plugins", "interactive": false }"#).unwrap();

        base.merge(other);
        assert_eq!(base.install_dir, Some(PathBuf::from("/a")));
        assert_eq!(base.plugins_dir, Some(PathBuf::from("/b/plugins")));
        assert!(!base.interactive);
    }

    #[test]
    fn test_merge_keeps_flags_not_set_by_other() {
        let mut config = HostConfig::new();
        let global: HostConfig = serde_json::from_str(
            r#"{ "noPlugin": true, "interactive": false, "enablePluginAdmin": false }"#,
        )
        .unwrap();
        let project: HostConfig = serde_json::from_str(r#"{ "menuTitle": "&Ext" }"#).unwrap();

        config.merge(global);
        config.merge(project);
        assert!(config.no_plugin);
        assert!(!config.interactive);
        assert!(!config.enable_plugin_admin);
        assert_eq!(config.menu_title, "&Ext");
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "noPlugin": true, "limits": { "commandBase": 30000, "commandLimit": 30100 } }"#,
        )
        .unwrap();

        let config = HostConfig::load_from(&path).unwrap();
        assert!(config.no_plugin);
        assert_eq!(config.limits.command_base, 30000);
    }

    #[test]
    fn test_load_from_rejects_invalid_limits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{ "limits": { "markerBase": 20, "markerLimit": 10 } }"#).unwrap();

        assert!(matches!(HostConfig::load_from(&path), Err(Error::Config(_))));
    }
}
