//! Plugin Manager - 플러그인 호스트 컨텍스트
//!
//! 플러그인 목록, 로드된 모듈 기록, 명령 레지스트리, ID 발급기,
//! 언어 레지스트리, 종료 래치, 장애 기록과 협력자(UI / 바인더 / 렉서 엔진)를
//! 하나의 명시적 컨텍스트로 보관합니다.
//!
//! 동작은 기능별 파일에 나뉘어 있습니다.
//! - `loader.rs` - 로드 / 디렉토리 스캔 / 언로드
//! - `dispatch.rs` - 명령 실행
//! - `bus.rs` - 알림 broadcast / 메시지 relay

use plume_foundation::{HostConfig, DEFAULT_MENU_TITLE};
use std::ops::Range;
use tracing::{debug, error, info, warn};

use super::alloc::IdentifierRange;
use super::command::KeyCombo;
use super::discovery::PluginInventory;
use super::fault::{
    guard, CallOutcome, CallResult, CallSite, FaultHistory, FaultKind, FaultRecord, Faulted,
    PluginFault,
};
use super::handle::{LoadedModules, PluginHandle, PluginSummary};
use super::lexer::{LanguageRegistry, LexerEngine, NullLexerEngine};
use super::native::NativeBinder;
use super::registry::CapabilityRegistry;
use super::traits::{HostDescriptor, ModuleBinder, PluginModule};
use super::ui::{HostUi, MenuId, OPEN_PLUGINS_FOLDER_CMD_ID, PLUGINS_ADMIN_CMD_ID};

/// 플러그인 매니저 - 전체 플러그인 시스템 관리
pub struct PluginManager {
    /// 설정
    pub(crate) config: HostConfig,

    /// setInfo 로 전달되는 호스트 핸들
    pub(crate) host: HostDescriptor,

    /// 로드 순서대로 정렬된 플러그인 (인덱스는 프로세스 수명 동안 고정)
    pub(crate) plugins: Vec<PluginHandle>,

    /// 바인딩된 파일 이름
    pub(crate) loaded: LoadedModules,

    /// 명령 / 단축키 레지스트리
    pub(crate) registry: CapabilityRegistry,

    /// 동적 명령 ID 발급기
    dynamic_ids: IdentifierRange,

    /// 에디터 마커 발급기
    markers: IdentifierRange,

    /// 외부 언어 레지스트리
    pub(crate) languages: LanguageRegistry,

    /// Shutdown broadcast 이후 true
    pub(crate) no_more_notification: bool,

    /// 스캔에서 발견된 플러그인 폴더
    pub(crate) inventory: PluginInventory,

    /// 격리된 장애 기록
    pub(crate) faults: FaultHistory,

    /// 루트 플러그인 메뉴 (setup_menu 이후)
    root_menu: Option<MenuId>,

    pub(crate) ui: Box<dyn HostUi>,
    pub(crate) binder: Box<dyn ModuleBinder>,
    pub(crate) engine: Box<dyn LexerEngine>,
}

impl PluginManager {
    /// 새 매니저 생성 (네이티브 바인더, 렌더링 엔진 없음)
    pub fn new(config: HostConfig, host: HostDescriptor, ui: Box<dyn HostUi>) -> Self {
        let limits = &config.limits;
        Self {
            host,
            plugins: Vec::new(),
            loaded: LoadedModules::new(),
            registry: CapabilityRegistry::new(limits),
            dynamic_ids: IdentifierRange::new(
                limits.dynamic_command_base,
                limits.dynamic_command_limit,
            ),
            markers: IdentifierRange::new(limits.marker_base, limits.marker_limit),
            languages: LanguageRegistry::new(limits.max_external_langs),
            no_more_notification: false,
            inventory: PluginInventory::new(),
            faults: FaultHistory::new(),
            root_menu: None,
            ui,
            binder: Box::new(NativeBinder),
            engine: Box::new(NullLexerEngine),
            config,
        }
    }

    /// 바인더 교체
    pub fn with_binder(mut self, binder: Box<dyn ModuleBinder>) -> Self {
        self.binder = binder;
        self
    }

    /// 렌더링 엔진 교체
    pub fn with_lexer_engine(mut self, engine: Box<dyn LexerEngine>) -> Self {
        self.engine = engine;
        self
    }

    // ========================================================================
    // 메뉴 구성
    // ========================================================================

    /// 루트 플러그인 메뉴 생성 후 로드된 모든 플러그인의 하위 메뉴 구성
    ///
    /// 이후에 로드되는 플러그인은 로드 즉시 메뉴가 구성된다.
    pub fn setup_menu(&mut self, title: &str, enable_plugin_admin: bool) -> MenuId {
        let root = match self.root_menu {
            Some(root) => root,
            None => {
                let title = if title.is_empty() {
                    DEFAULT_MENU_TITLE
                } else {
                    title
                };
                let root = self.ui.create_root_menu(title);

                let mut position = 0;
                if !self.plugins.is_empty() {
                    self.ui.insert_separator(root, position);
                    position += 1;
                }
                if enable_plugin_admin {
                    self.ui
                        .insert_item(root, position, PLUGINS_ADMIN_CMD_ID, "Plugins Admin...");
                    position += 1;
                    self.ui.insert_separator(root, position);
                    position += 1;
                }
                self.ui.insert_item(
                    root,
                    position,
                    OPEN_PLUGINS_FOLDER_CMD_ID,
                    "Open Plugins Folder...",
                );
                self.root_menu = Some(root);
                root
            }
        };

        for index in 0..self.plugins.len() {
            self.materialize(index);
        }
        root
    }

    /// 플러그인 하나의 메뉴 구성 (메뉴 미생성, 비활성, 이미 구성된 경우 무시)
    pub(crate) fn materialize(&mut self, index: usize) {
        let Some(root) = self.root_menu else {
            return;
        };
        let Some(handle) = self.plugins.get_mut(index) else {
            return;
        };
        if handle.is_inert() || handle.menu().is_some() {
            return;
        }
        self.registry
            .materialize(index, handle, root, self.ui.as_mut());
    }

    pub fn root_menu(&self) -> Option<MenuId> {
        self.root_menu
    }

    // ========================================================================
    // ID 발급
    // ========================================================================

    /// 동적 명령 ID `count` 개 발급
    pub fn allocate_cmd_id(&mut self, count: u32) -> Option<Range<u32>> {
        let range = self.dynamic_ids.allocate(count);
        debug!("allocate_cmd_id({}) -> {:?}", count, range);
        range
    }

    /// 에디터 마커 `count` 개 발급
    pub fn allocate_marker(&mut self, count: u32) -> Option<Range<u32>> {
        let range = self.markers.allocate(count);
        debug!("allocate_marker({}) -> {:?}", count, range);
        range
    }

    // ========================================================================
    // 단축키
    // ========================================================================

    pub fn get_shortcut_by_cmd_id(&self, cmd_id: u32) -> Option<KeyCombo> {
        self.registry.get_shortcut_by_cmd_id(cmd_id)
    }

    pub fn remove_shortcut_by_cmd_id(&mut self, cmd_id: u32) -> bool {
        self.registry.remove_shortcut_by_cmd_id(cmd_id)
    }

    // ========================================================================
    // 장애 격리
    // ========================================================================

    /// 플러그인 호출을 장애 장벽 안에서 실행 (비활성 / 범위 밖이면 Skipped)
    pub(crate) fn call_plugin(
        &mut self,
        index: usize,
        site: CallSite,
        call: impl FnOnce(&mut dyn PluginModule) -> CallResult<()>,
    ) -> CallOutcome {
        let Some(handle) = self.plugins.get_mut(index) else {
            return CallOutcome::Skipped;
        };
        let Some(module) = handle.module.as_deref_mut() else {
            return CallOutcome::Skipped;
        };
        match guard(|| call(module)) {
            Ok(()) => CallOutcome::Completed,
            Err(fault) => {
                let plugin = handle.file_name().to_string();
                CallOutcome::Faulted(self.contain(Faulted::new(plugin, site, fault)))
            }
        }
    }

    /// 격리된 장애를 알림으로 변환하고 기록
    pub(crate) fn contain(&mut self, faulted: Faulted) -> FaultKind {
        match &faulted.fault {
            PluginFault::Runtime(message) => {
                warn!("Plugin exception in {}: {}", faulted.plugin, message);
                self.ui.plugin_exception_alert(&faulted.plugin, message);
            }
            PluginFault::Fatal(message) => {
                error!(
                    "Plugin crash in {} at {}: {}",
                    faulted.plugin, faulted.site, message
                );
                self.ui.plugin_crash_alert(&faulted.plugin, &faulted.site);
            }
        }
        self.faults.push(FaultRecord::from(&faulted));
        faulted.kind()
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn host(&self) -> &HostDescriptor {
        &self.host
    }

    pub fn plugins(&self) -> &[PluginHandle] {
        &self.plugins
    }

    pub fn plugin(&self, index: usize) -> Option<&PluginHandle> {
        self.plugins.get(index)
    }

    /// 이름(파일 이름 또는 확장자를 뺀 이름)으로 플러그인 위치 찾기
    pub fn find_plugin(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.matches_name(name))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    pub fn inventory(&self) -> &PluginInventory {
        &self.inventory
    }

    pub fn faults(&self) -> &FaultHistory {
        &self.faults
    }

    /// 공백으로 구분된 로드된 파일 이름 목록
    pub fn loaded_plugin_names(&self) -> String {
        self.loaded.names()
    }

    /// Shutdown 이후 broadcast 가 막혔는지
    pub fn is_notification_closed(&self) -> bool {
        self.no_more_notification
    }

    pub fn summaries(&self) -> Vec<PluginSummary> {
        self.plugins
            .iter()
            .enumerate()
            .map(|(index, plugin)| plugin.summary(index))
            .collect()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        let released = self
            .plugins
            .iter_mut()
            .filter_map(|plugin| plugin.release())
            .count();
        if released > 0 {
            info!("Released {} plugin module(s)", released);
        }
    }
}
