//! plume-core: Plugin host for the Plume editor
//!
//! Layer2 - 플러그인 서브시스템 레이어
//!
//! # 주요 모듈
//!
//! - `plugin`: 네이티브 플러그인 로드, 명령 레지스트리, 알림 버스, 외부 렉서 브리지
//!
//! # 사용 예시
//!
//! ```ignore
//! use plume_core::{HostDescriptor, LogUi, Notification, NotificationCode, PluginManager};
//! use plume_foundation::HostConfig;
//!
//! let config = HostConfig::load()?;
//! let host = HostDescriptor::default();
//! let mut plugins = PluginManager::new(config, host, Box::new(LogUi::new()));
//!
//! // 플러그인 디렉토리 로드 후 메뉴 구성
//! plugins.load_all(None);
//! plugins.setup_menu("&Plugins", true);
//!
//! // 메뉴 클릭
//! plugins.run_command_by_id(22000);
//!
//! // 종료
//! plugins.broadcast(&Notification::host(NotificationCode::Shutdown, 0));
//! ```

pub mod plugin;

// Re-exports: Plugin
pub use plugin::{
    CallOutcome, CapabilityRegistry, DiscoveredPlugin, ExportedCommand, FaultKind, FaultRecord,
    HostDescriptor, HostMessage, HostUi, KeyCombo, LanguageRegistry, LexerEngine, LoadOutcome,
    LogUi, Machine, MenuId, ModuleBinder, NativeBinder, Notification, NotificationCode,
    NullLexerEngine, PluginFault, PluginHandle, PluginManager, PluginModule, PluginSummary,
};

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
