//! Module Loader - 플러그인 바이너리 로드
//!
//! 로드 순서:
//! 1. 중복 확인 (파일 이름 기준)
//! 2. 바이너리 헤더의 아키텍처 확인
//! 3. 동적 바인딩
//! 4. `isUnicode` → `setInfo` / `getName` / `beNotified` / `messageProc` 확인
//! 5. `setInfo` 호출, `getFuncsArray` 로 명령 테이블 수집
//! 6. 외부 렉서 브리지
//!
//! 어느 단계에서든 실패하면 부분 생성된 핸들은 버려지고
//! 호출자는 UI 를 통해 바이너리 삭제 여부를 묻습니다.

use plume_foundation::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

use super::arch::Machine;
use super::discovery::PluginDiscovery;
use super::events::{Notification, NotificationCode};
use super::fault::{guard, CallSite, FaultKind, FaultRecord, Faulted, PluginFault};
use super::handle::{file_name_of, PluginHandle};
use super::lexer::LexerBridge;
use super::manager::PluginManager;
use super::traits::Export;

/// 로드 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 새로 로드됨 (플러그인 인덱스)
    Loaded(usize),

    /// 같은 파일 이름이 이미 로드되어 있음
    AlreadyLoaded,
}

impl LoadOutcome {
    pub fn index(&self) -> Option<usize> {
        match self {
            LoadOutcome::Loaded(index) => Some(*index),
            LoadOutcome::AlreadyLoaded => None,
        }
    }
}

const ANSI_PLUGIN_REASON: &str = "This ANSI plugin is not compatible with your Unicode host.";
const MISSING_FUNC_ITEMS_REASON: &str =
    "Missing \"FuncItems\" array, or the nb of Function Item is not set correctly";

impl PluginManager {
    // ========================================================================
    // 단일 로드
    // ========================================================================

    /// 플러그인 바이너리 하나 로드
    ///
    /// 실패 시 UI 에 알린 뒤 에러를 반환한다. 목록은 변경되지 않는다.
    pub fn load_plugin(&mut self, path: &Path) -> Result<LoadOutcome> {
        let file_name = file_name_of(path);
        if self.loaded.contains(&file_name) {
            debug!("{} is already loaded, skipping", file_name);
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        info!("Loading plugin: {}", path.display());
        match self.bind_plugin(path, &file_name) {
            Ok(handle) => {
                let index = self.plugins.len();
                info!(
                    "Loaded plugin {} as '{}' ({} command(s))",
                    file_name,
                    handle.display_name(),
                    handle.commands().len()
                );
                self.plugins.push(handle);
                self.loaded.insert(path.to_path_buf(), file_name);
                self.materialize(index);
                Ok(LoadOutcome::Loaded(index))
            }
            Err(e) => {
                self.report_load_failure(path, &file_name, &e);
                Err(e)
            }
        }
    }

    fn bind_plugin(&mut self, path: &Path, file_name: &str) -> Result<PluginHandle> {
        let fault = |fault: PluginFault| Error::from(Faulted::new(file_name, CallSite::Load, fault));

        let machine = self.binder.machine(path);
        if !machine.is_compatible() {
            return Err(Error::ArchitectureMismatch {
                expected: Machine::current().to_string(),
                found: machine.to_string(),
            });
        }

        let mut module = self.binder.bind(path)?;

        if !module.has_export(Export::IsUnicode) {
            return Err(Error::missing_export(Export::IsUnicode.symbol()));
        }
        if !guard(|| module.probe_unicode()).map_err(fault)? {
            return Err(Error::invalid_export(
                Export::IsUnicode.symbol(),
                ANSI_PLUGIN_REASON,
            ));
        }

        let mut display_name = String::new();
        for export in Export::HANDSHAKE {
            if !module.has_export(export) {
                return Err(Error::missing_export(export.symbol()));
            }
            if export == Export::GetName {
                display_name = guard(|| module.name()).map_err(fault)?;
            }
        }
        if display_name.is_empty() {
            display_name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.to_string());
        }

        let host = self.host;
        guard(|| module.set_host_info(&host)).map_err(fault)?;

        if !module.has_export(Export::GetFuncsArray) {
            return Err(Error::missing_export(Export::GetFuncsArray.symbol()));
        }
        let commands = guard(|| module.commands()).map_err(fault)?;
        if commands.is_empty() {
            return Err(Error::invalid_export(
                Export::GetFuncsArray.symbol(),
                MISSING_FUNC_ITEMS_REASON,
            ));
        }

        let lexer_provider = LexerBridge {
            config: &self.config,
            languages: &mut self.languages,
            engine: self.engine.as_mut(),
        }
        .run(module.as_mut(), path, file_name)?;

        Ok(PluginHandle::new(
            module,
            path.to_path_buf(),
            display_name,
            commands,
            lexer_provider,
        ))
    }

    /// 로드 실패 보고 (비대화형이면 로그만 남김)
    fn report_load_failure(&mut self, path: &Path, file_name: &str, error: &Error) {
        warn!("Failed to load plugin {}: {}", path.display(), error);

        match error {
            Error::RuntimeFault { message, .. } => {
                self.faults.push(FaultRecord::new(
                    file_name,
                    CallSite::Load.to_string(),
                    FaultKind::Runtime,
                    message.as_str(),
                ));
            }
            Error::FatalFault { site, .. } => {
                self.faults.push(FaultRecord::new(
                    file_name,
                    site.as_str(),
                    FaultKind::Fatal,
                    error.to_string(),
                ));
            }
            _ => {}
        }

        if !self.config.interactive {
            return;
        }

        if !error.offers_removal() {
            if let Error::RuntimeFault { message, .. } = error {
                self.ui.plugin_exception_alert(file_name, message);
            }
            return;
        }

        let reason = match error {
            Error::FatalFault { .. } => "Failed to load".to_string(),
            other => other.to_string(),
        };
        let message = format!(
            "{}\n\n{} is not compatible with the current version of the host.\n\n\
             Do you want to remove this plugin from the plugins directory to prevent this message from the next launch?",
            reason, file_name
        );
        if self.ui.confirm_remove_incompatible(path, &message) {
            match std::fs::remove_file(path) {
                Ok(()) => info!("Removed incompatible plugin {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    // ========================================================================
    // 디렉토리 스캔
    // ========================================================================

    /// 플러그인 디렉토리의 모든 하위 폴더 로드
    ///
    /// `dir` 이 None 이면 설정된 플러그인 디렉토리를 사용한다.
    /// 한 플러그인의 실패는 나머지 로드에 영향을 주지 않는다.
    pub fn load_all(&mut self, dir: Option<&Path>) -> bool {
        if self.config.no_plugin {
            info!("Plugins are disabled, skipping plugin directory scan");
            return false;
        }

        let root = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.plugins_dir());
        let discovered = match PluginDiscovery::new(&root).scan() {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!("Cannot scan plugin directory {}: {}", root.display(), e);
                return false;
            }
        };

        let mut loaded = 0;
        for plugin in discovered {
            self.inventory.push(plugin.clone());
            if !plugin.has_binary() {
                debug!(
                    "No plugin binary in {}, skipping",
                    plugin.binary_path.display()
                );
                continue;
            }
            if let Ok(LoadOutcome::Loaded(_)) = self.load_plugin(&plugin.binary_path) {
                loaded += 1;
            }
        }
        info!(
            "Loaded {}/{} plugin(s) from {}",
            loaded,
            self.inventory.len(),
            root.display()
        );
        true
    }

    // ========================================================================
    // 언로드
    // ========================================================================

    /// 플러그인 하나에 Shutdown 을 보낸 뒤 모듈 해제 (슬롯은 유지)
    pub fn unload(&mut self, index: usize) -> bool {
        match self.plugins.get(index) {
            Some(plugin) if !plugin.is_inert() => {}
            _ => return false,
        }

        let shutdown = Notification::host(NotificationCode::Shutdown, self.host.host_window);
        self.notify(index, &shutdown);

        let released = self.plugins[index].release();
        info!("Unloaded plugin {}", self.plugins[index].file_name());
        drop(released);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{Behavior, FakeBinder, FakeModule, RecordingUi};
    use crate::plugin::traits::HostDescriptor;
    use plume_foundation::HostConfig;

    fn manager(binder: FakeBinder, ui: &RecordingUi, interactive: bool) -> PluginManager {
        PluginManager::new(
            HostConfig::new().interactive(interactive),
            HostDescriptor {
                host_window: 7,
                main_view: 8,
                secondary_view: 9,
            },
            Box::new(ui.clone()),
        )
        .with_binder(Box::new(binder))
    }

    #[test]
    fn test_load_records_handle() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha Tools");
        let log = alpha.log();
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);

        let outcome = manager.load_plugin(Path::new("/p/Alpha/Alpha.so")).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(0));
        assert_eq!(manager.plugin(0).unwrap().display_name(), "Alpha Tools");
        assert_eq!(manager.loaded_plugin_names(), "Alpha.so ");
        assert_eq!(log.borrow().host_info.map(|h| h.main_view), Some(8));
    }

    #[test]
    fn test_duplicate_file_name_is_noop() {
        let ui = RecordingUi::new();
        let binder = FakeBinder::new().with("Alpha.so", FakeModule::new("Alpha"));
        let mut manager = manager(binder, &ui, true);

        manager.load_plugin(Path::new("/a/Alpha/Alpha.so")).unwrap();
        let again = manager.load_plugin(Path::new("/b/Alpha/Alpha.so")).unwrap();
        assert_eq!(again, LoadOutcome::AlreadyLoaded);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_missing_export_is_named() {
        for export in [
            Export::IsUnicode,
            Export::SetInfo,
            Export::GetName,
            Export::BeNotified,
            Export::MessageProc,
            Export::GetFuncsArray,
        ] {
            let ui = RecordingUi::new();
            let binder =
                FakeBinder::new().with("Alpha.so", FakeModule::new("Alpha").without(export));
            let mut manager = manager(binder, &ui, false);

            match manager.load_plugin(Path::new("/p/Alpha/Alpha.so")) {
                Err(Error::MissingCapability { export: name, .. }) => {
                    assert_eq!(name, export.symbol())
                }
                other => panic!("unexpected result for {export}: {other:?}"),
            }
            assert!(manager.is_empty());
            assert!(manager.registry().commands().is_empty());
        }
    }

    #[test]
    fn test_set_info_not_called_when_probe_missing() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").without(Export::MessageProc);
        let log = alpha.log();
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, false);

        assert!(manager.load_plugin(Path::new("/p/Alpha/Alpha.so")).is_err());
        assert!(log.borrow().host_info.is_none());
    }

    #[test]
    fn test_empty_function_table_rejected() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").with_commands(Vec::new());
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);

        let err = manager
            .load_plugin(Path::new("/p/Alpha/Alpha.so"))
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("FuncItems"));
        assert_eq!(ui.prompts().len(), 1);
    }

    #[test]
    fn test_ansi_plugin_prompts() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").ansi();
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);

        assert!(manager.load_plugin(Path::new("/p/Alpha/Alpha.so")).is_err());
        let prompts = ui.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].1.starts_with(ANSI_PLUGIN_REASON));
        assert!(prompts[0].1.contains("Alpha.so is not compatible"));
    }

    #[test]
    fn test_runtime_fault_during_load_alerts_without_prompt() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").on_set_info(Behavior::Fail("no host".into()));
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);

        let result = manager.load_plugin(Path::new("/p/Alpha/Alpha.so"));
        assert!(matches!(result, Err(Error::RuntimeFault { .. })));
        assert!(ui.prompts().is_empty());
        assert_eq!(
            ui.exception_alerts(),
            vec![("Alpha.so".to_string(), "no host".to_string())]
        );
        assert_eq!(manager.faults().len(), 1);
    }

    #[test]
    fn test_panic_during_load_prompts_failed_to_load() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").on_set_info(Behavior::Panic("boom".into()));
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);

        let result = manager.load_plugin(Path::new("/p/Alpha/Alpha.so"));
        assert!(matches!(result, Err(Error::FatalFault { .. })));
        let prompts = ui.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].1.starts_with("Failed to load\n\n"));
    }

    #[test]
    fn test_non_interactive_only_logs() {
        let ui = RecordingUi::new();
        let mut manager = manager(FakeBinder::new(), &ui, false);

        let result = manager.load_plugin(Path::new("/p/Ghost/Ghost.so"));
        assert!(matches!(result, Err(Error::LoadFailure(_))));
        assert!(ui.prompts().is_empty());
    }

    #[test]
    fn test_unload_sends_shutdown_and_keeps_slot() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha");
        let log = alpha.log();
        let mut manager = manager(FakeBinder::new().with("Alpha.so", alpha), &ui, true);
        manager.load_plugin(Path::new("/p/Alpha/Alpha.so")).unwrap();

        assert!(manager.unload(0));
        assert!(!manager.unload(0));
        assert_eq!(manager.len(), 1);
        assert!(manager.plugin(0).unwrap().is_inert());

        let log = log.borrow();
        assert_eq!(log.notifications.len(), 1);
        assert!(log.notifications[0].is_shutdown());
        assert_eq!(log.notifications[0].hwnd_from, 7);
    }
}
