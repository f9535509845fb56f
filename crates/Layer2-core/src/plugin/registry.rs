//! Capability Registry - 명령 ID 발급 및 메뉴 구성
//!
//! 로드 순서대로 플러그인마다 하위 메뉴 하나를 만들고,
//! 명령 테이블의 각 항목에 전역 명령 ID 를 발급합니다.
//! 발급된 ID 는 프로세스 수명 동안 재사용되지 않습니다.

use plume_foundation::LimitsConfig;
use tracing::{debug, warn};

use super::command::{KeyCombo, PluginCmdShortcut, PluginCommand};
use super::handle::PluginHandle;
use super::ui::{HostUi, MenuId};

/// 전역 명령 / 단축키 레지스트리
#[derive(Debug)]
pub struct CapabilityRegistry {
    /// 플랫 명령 목록 (위치 = cmd_id - command_base)
    commands: Vec<PluginCommand>,

    /// 단축키 슬롯 (비활성 자리표시 포함)
    shortcuts: Vec<PluginCmdShortcut>,

    /// 단축키 변경 여부 (저장 필요)
    shortcuts_dirty: bool,

    command_base: u32,
    command_limit: u32,
}

impl CapabilityRegistry {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            commands: Vec::new(),
            shortcuts: Vec::new(),
            shortcuts_dirty: false,
            command_base: limits.command_base,
            command_limit: limits.command_limit,
        }
    }

    fn next_cmd_id(&self) -> Option<u32> {
        let id = self.command_base.checked_add(self.commands.len() as u32)?;
        (id < self.command_limit).then_some(id)
    }

    // ========================================================================
    // 메뉴 구성
    // ========================================================================

    /// 플러그인 하나의 하위 메뉴 구성 및 명령 등록
    ///
    /// 반환값: 등록된 명령 수
    pub fn materialize(
        &mut self,
        plugin_index: usize,
        handle: &mut PluginHandle,
        root: MenuId,
        ui: &mut dyn HostUi,
    ) -> usize {
        let submenu = ui.create_submenu(root, plugin_index, handle.display_name());
        handle.menu = Some(submenu);

        let module_name = handle.file_name().to_string();
        let mut registered = 0;

        for local_index in 0..handle.commands.len() {
            if handle.commands[local_index].is_separator() {
                ui.insert_separator(submenu, local_index);
                continue;
            }

            let Some(cmd_id) = self.next_cmd_id() else {
                warn!(
                    "Command id range exhausted, skipping '{}' from {}",
                    handle.commands[local_index].name, module_name
                );
                continue;
            };

            let command = &mut handle.commands[local_index];
            command.cmd_id = cmd_id;
            self.commands.push(PluginCommand {
                module_name: module_name.clone(),
                plugin_index,
                local_index,
                cmd_id,
            });
            self.shortcuts.push(PluginCmdShortcut {
                label: command.name.clone(),
                shortcut: command.shortcut.unwrap_or_else(KeyCombo::disabled),
                cmd_id,
                module_name: module_name.clone(),
                local_index,
            });

            ui.insert_item(submenu, local_index, cmd_id, &command.menu_label());
            if command.init_checked {
                ui.check_item(cmd_id, true);
            }
            if let Some(module) = handle.module.as_deref_mut() {
                module.assign_command_id(local_index, cmd_id);
            }
            registered += 1;
        }

        debug!(
            "Materialized {} command(s) for {}",
            registered,
            handle.file_name()
        );
        registered
    }

    // ========================================================================
    // 조회
    // ========================================================================

    pub fn commands(&self) -> &[PluginCommand] {
        &self.commands
    }

    pub fn command(&self, position: usize) -> Option<&PluginCommand> {
        self.commands.get(position)
    }

    pub fn find_by_cmd_id(&self, cmd_id: u32) -> Option<&PluginCommand> {
        self.commands.get(self.position_of(cmd_id)?)
    }

    /// 명령 ID 의 플랫 목록 위치
    pub fn position_of(&self, cmd_id: u32) -> Option<usize> {
        let position = cmd_id.checked_sub(self.command_base)? as usize;
        (position < self.commands.len()).then_some(position)
    }

    pub fn shortcuts(&self) -> &[PluginCmdShortcut] {
        &self.shortcuts
    }

    // ========================================================================
    // 단축키
    // ========================================================================

    /// 명령 ID 의 단축키 (0, 미등록, 비활성이면 None)
    pub fn get_shortcut_by_cmd_id(&self, cmd_id: u32) -> Option<KeyCombo> {
        if cmd_id == 0 {
            return None;
        }
        self.shortcuts
            .iter()
            .find(|slot| slot.cmd_id == cmd_id)
            .filter(|slot| slot.is_enabled())
            .map(|slot| slot.shortcut)
    }

    /// 명령 ID 의 단축키 제거 (슬롯은 유지)
    pub fn remove_shortcut_by_cmd_id(&mut self, cmd_id: u32) -> bool {
        if cmd_id == 0 {
            return false;
        }
        let Some(slot) = self.shortcuts.iter_mut().find(|slot| slot.cmd_id == cmd_id) else {
            return false;
        };
        slot.shortcut = KeyCombo::disabled();
        self.shortcuts_dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.shortcuts_dirty
    }
}
