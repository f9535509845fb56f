//! Host UI - 주변 UI 협력자 인터페이스
//!
//! 플러그인 코어는 창/대화상자를 직접 만들지 않고 `HostUi` 를 통해 요청합니다.

use std::path::Path;
use tracing::{error, info, warn};

use super::fault::CallSite;

/// "Plugins Admin..." 메뉴 명령 ID
pub const PLUGINS_ADMIN_CMD_ID: u32 = 46180;

/// "Open Plugins Folder..." 메뉴 명령 ID
pub const OPEN_PLUGINS_FOLDER_CMD_ID: u32 = 46181;

/// 메뉴 핸들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuId(pub u32);

/// 호스트 UI 협력자
pub trait HostUi {
    /// 호환되지 않는 플러그인 삭제 여부 확인 (true = 삭제)
    fn confirm_remove_incompatible(&mut self, plugin_path: &Path, message: &str) -> bool;

    /// 복구 가능한 플러그인 예외 알림
    fn plugin_exception_alert(&mut self, plugin: &str, message: &str);

    /// 플러그인 크래시 알림
    fn plugin_crash_alert(&mut self, plugin: &str, site: &CallSite);

    // ========================================================================
    // 메뉴
    // ========================================================================

    /// 루트 플러그인 메뉴 생성
    fn create_root_menu(&mut self, title: &str) -> MenuId;

    /// 하위 메뉴 생성 (`position` 위치에 삽입)
    fn create_submenu(&mut self, parent: MenuId, position: usize, title: &str) -> MenuId;

    /// 명령 항목 삽입
    fn insert_item(&mut self, menu: MenuId, position: usize, cmd_id: u32, label: &str);

    /// 구분선 삽입
    fn insert_separator(&mut self, menu: MenuId, position: usize);

    /// 명령 항목 체크 상태
    fn check_item(&mut self, cmd_id: u32, checked: bool);
}

/// 비대화형 UI (로그만 남김, 삭제 확인은 항상 거절)
#[derive(Debug, Default)]
pub struct LogUi {
    next_menu: u32,
}

impl LogUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostUi for LogUi {
    fn confirm_remove_incompatible(&mut self, plugin_path: &Path, message: &str) -> bool {
        warn!("{} ({})", message, plugin_path.display());
        false
    }

    fn plugin_exception_alert(&mut self, plugin: &str, message: &str) {
        error!("Plugin exception in {}: {}", plugin, message);
    }

    fn plugin_crash_alert(&mut self, plugin: &str, site: &CallSite) {
        error!("Plugin crash in {} at {}", plugin, site);
    }

    fn create_root_menu(&mut self, title: &str) -> MenuId {
        self.next_menu += 1;
        info!("Menu '{}' created", title);
        MenuId(self.next_menu)
    }

    fn create_submenu(&mut self, _parent: MenuId, _position: usize, _title: &str) -> MenuId {
        self.next_menu += 1;
        MenuId(self.next_menu)
    }

    fn insert_item(&mut self, _menu: MenuId, _position: usize, _cmd_id: u32, _label: &str) {}

    fn insert_separator(&mut self, _menu: MenuId, _position: usize) {}

    fn check_item(&mut self, _cmd_id: u32, _checked: bool) {}
}
