//! Command Dispatch - 플러그인 명령 실행
//!
//! 명령 주소 지정 방식:
//! - 플랫 목록 위치 (`run_command`)
//! - 발급된 명령 ID (`run_command_by_id`, 메뉴 클릭)
//! - 플러그인 이름 + 로컬 인덱스 (`run_command_by_name`)
//!
//! 함수 포인터가 없는 항목(구분선)이나 비활성 플러그인은 `Skipped` 입니다.

use tracing::debug;

use super::command::CommandEntry;
use super::fault::{CallOutcome, CallSite};
use super::manager::PluginManager;

impl PluginManager {
    /// 플랫 목록 위치로 명령 실행
    pub fn run_command(&mut self, position: usize) -> CallOutcome {
        let Some(command) = self.registry.command(position) else {
            debug!("No plugin command at position {}", position);
            return CallOutcome::Skipped;
        };
        let (plugin_index, local_index) = (command.plugin_index, command.local_index);
        let Some(entry) = self.entry_of(plugin_index, local_index) else {
            return CallOutcome::Skipped;
        };

        self.call_plugin(plugin_index, CallSite::Command { position }, |module| {
            module.invoke(entry)
        })
    }

    /// 발급된 명령 ID 로 명령 실행
    pub fn run_command_by_id(&mut self, cmd_id: u32) -> CallOutcome {
        match self.registry.position_of(cmd_id) {
            Some(position) => self.run_command(position),
            None => {
                debug!("Command id {} is not a plugin command", cmd_id);
                CallOutcome::Skipped
            }
        }
    }

    /// 플러그인 이름(대소문자 무시) + 로컬 함수 인덱스로 명령 실행
    pub fn run_command_by_name(&mut self, plugin_name: &str, local_index: usize) -> CallOutcome {
        let target = self
            .registry
            .commands()
            .iter()
            .filter(|command| command.local_index == local_index)
            .map(|command| command.plugin_index)
            .find(|&index| {
                self.plugins
                    .get(index)
                    .map(|plugin| !plugin.is_inert() && plugin.matches_name(plugin_name))
                    .unwrap_or(false)
            });
        let Some(plugin_index) = target else {
            debug!("No command {} in plugin '{}'", local_index, plugin_name);
            return CallOutcome::Skipped;
        };
        let Some(entry) = self.entry_of(plugin_index, local_index) else {
            return CallOutcome::Skipped;
        };

        let site = CallSite::NamedCommand {
            plugin: plugin_name.to_string(),
            local_index,
        };
        self.call_plugin(plugin_index, site, |module| module.invoke(entry))
    }

    fn entry_of(&self, plugin_index: usize, local_index: usize) -> Option<CommandEntry> {
        self.plugins
            .get(plugin_index)?
            .commands()
            .get(local_index)?
            .entry
    }
}

#[cfg(test)]
mod tests {
    use crate::plugin::command::ExportedCommand;
    use crate::plugin::fault::{CallOutcome, FaultKind};
    use crate::plugin::manager::PluginManager;
    use crate::plugin::testing::{Behavior, FakeBinder, FakeModule, RecordingUi};
    use crate::plugin::traits::HostDescriptor;
    use plume_foundation::HostConfig;
    use std::path::Path;

    fn commands() -> Vec<ExportedCommand> {
        vec![
            ExportedCommand::new("First", 0),
            ExportedCommand::separator(),
            ExportedCommand::new("Third", 2),
        ]
    }

    fn setup(module: FakeModule, ui: &RecordingUi) -> PluginManager {
        let mut manager = PluginManager::new(
            HostConfig::new(),
            HostDescriptor::default(),
            Box::new(ui.clone()),
        )
        .with_binder(Box::new(FakeBinder::new().with("Alpha.so", module)));
        manager.load_plugin(Path::new("/p/Alpha/Alpha.so")).unwrap();
        manager.setup_menu("&Plugins", true);
        manager
    }

    #[test]
    fn test_run_by_position_and_id() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").with_commands(commands());
        let log = alpha.log();
        let mut manager = setup(alpha, &ui);

        assert_eq!(manager.run_command(1), CallOutcome::Completed);
        assert_eq!(manager.run_command_by_id(22000), CallOutcome::Completed);
        assert_eq!(manager.run_command(5), CallOutcome::Skipped);
        assert_eq!(manager.run_command_by_id(22002), CallOutcome::Skipped);
        assert_eq!(log.borrow().invoked, vec![2, 0]);
    }

    #[test]
    fn test_run_by_name_is_case_insensitive() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha").with_commands(commands());
        let log = alpha.log();
        let mut manager = setup(alpha, &ui);

        assert_eq!(manager.run_command_by_name("ALPHA", 2), CallOutcome::Completed);
        assert_eq!(manager.run_command_by_name("alpha.so", 0), CallOutcome::Completed);
        assert_eq!(manager.run_command_by_name("alpha", 1), CallOutcome::Skipped);
        assert_eq!(manager.run_command_by_name("Beta", 0), CallOutcome::Skipped);
        assert_eq!(log.borrow().invoked, vec![2, 0]);
    }

    #[test]
    fn test_faults_are_contained() {
        let ui = RecordingUi::new();
        let alpha = FakeModule::new("Alpha")
            .with_commands(commands())
            .on_command(0, Behavior::Fail("bad selection".into()))
            .on_command(2, Behavior::Panic("null deref".into()));
        let mut manager = setup(alpha, &ui);

        assert_eq!(
            manager.run_command(0),
            CallOutcome::Faulted(FaultKind::Runtime)
        );
        assert_eq!(
            ui.exception_alerts(),
            vec![("Alpha.so".to_string(), "bad selection".to_string())]
        );

        assert_eq!(manager.run_command(1), CallOutcome::Faulted(FaultKind::Fatal));
        assert_eq!(
            ui.crash_alerts(),
            vec![(
                "Alpha.so".to_string(),
                "run_command(position: 1)".to_string()
            )]
        );
        assert_eq!(manager.faults().len(), 2);

        // 장애 이후에도 호출 가능
        assert_eq!(
            manager.run_command(0),
            CallOutcome::Faulted(FaultKind::Runtime)
        );
    }

    #[test]
    fn test_inert_plugin_is_skipped() {
        let ui = RecordingUi::new();
        let mut manager = setup(FakeModule::new("Alpha").with_commands(commands()), &ui);

        assert!(manager.unload(0));
        assert_eq!(manager.run_command(0), CallOutcome::Skipped);
        assert_eq!(manager.run_command_by_name("Alpha", 0), CallOutcome::Skipped);
    }
}
