//! # Plugin System
//!
//! 네이티브 공유 라이브러리 플러그인 호스트
//!
//! ## 개요
//!
//! 플러그인 디렉토리에서 바이너리를 로드하고 다음 기능을 제공합니다:
//! - 명령 ID 발급 및 플러그인 메뉴 구성
//! - 메뉴 클릭 / 이름 기반 명령 실행
//! - 수명주기 알림 broadcast 와 원시 메시지 relay
//! - 동적 명령 ID / 마커 발급
//! - 외부 렉서 플러그인 등록
//!
//! 모든 플러그인 호출은 장애 장벽(`fault::guard`)을 통과하므로
//! 플러그인 하나의 실패가 호스트를 종료시키지 않습니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PluginManager                           │
//! │  ┌───────────────────────────────────────────────────────┐ │
//! │  │  plugins: Vec<PluginHandle>   (로드 순서, 인덱스 고정) │ │
//! │  │  ┌────────────┬────────────┬────────────────────┐    │ │
//! │  │  │ Alpha.so   │ Beta.so    │ Lexer.so (렉서)    │    │ │
//! │  │  └────────────┴────────────┴────────────────────┘    │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! │       │                │                    │               │
//! │  CapabilityRegistry  IdentifierRange   LanguageRegistry     │
//! │  (명령 / 단축키)      (동적 ID, 마커)    (외부 렉서)         │
//! │       │                                                     │
//! │  HostUi / ModuleBinder / LexerEngine  (주변 협력자)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let mut manager = PluginManager::new(config, host, Box::new(LogUi::new()));
//! manager.load_all(None);
//! manager.setup_menu("&Plugins", true);
//!
//! manager.broadcast(&Notification::host(NotificationCode::Ready, host.host_window));
//! manager.run_command_by_id(22000);
//! manager.broadcast(&Notification::host(NotificationCode::Shutdown, host.host_window));
//! ```

pub mod abi;
mod alloc;
mod arch;
mod bus;
mod command;
mod discovery;
mod dispatch;
mod events;
mod fault;
mod handle;
mod lexer;
mod loader;
mod manager;
mod native;
mod registry;
mod traits;
mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use alloc::IdentifierRange;
pub use arch::{read_machine, Machine};
pub use command::{
    CommandEntry, ExportedCommand, KeyCombo, PluginCmdShortcut, PluginCommand,
};
pub use discovery::{DiscoveredPlugin, PluginDiscovery, PluginInventory};
pub use events::{HostMessage, Notification, NotificationCode};
pub use fault::{
    guard, CallOutcome, CallResult, CallSite, FaultHistory, FaultKind, FaultRecord, Faulted,
    PluginFault, MAX_FAULT_HISTORY,
};
pub use handle::{LoadedModules, PluginHandle, PluginSummary};
pub use lexer::{
    ExternalLexerDescriptor, LanguageRegistry, LexerDocument, LexerEngine, LexerStyle,
    LexerStyleSet, NullLexerEngine,
};
pub use loader::LoadOutcome;
pub use manager::PluginManager;
pub use native::{NativeBinder, NativeModule};
pub use registry::CapabilityRegistry;
pub use traits::{Export, HostDescriptor, ModuleBinder, PluginModule};
pub use ui::{HostUi, LogUi, MenuId, OPEN_PLUGINS_FOLDER_CMD_ID, PLUGINS_ADMIN_CMD_ID};
