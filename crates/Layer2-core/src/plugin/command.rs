//! Plugin Commands - 명령 테이블 / 단축키 타입

use serde::Serialize;
use std::fmt;

// ============================================================================
// KeyCombo - 단축키
// ============================================================================

/// 단축키 조합 (key == 0 이면 비활성)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: u8,
}

impl KeyCombo {
    pub fn new(ctrl: bool, alt: bool, shift: bool, key: u8) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            key,
        }
    }

    /// 비활성 자리표시 단축키
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.key != 0
    }

    /// 가상 키 코드 이름
    pub fn key_name(&self) -> String {
        match self.key {
            0x08 => "Backspace".into(),
            0x09 => "Tab".into(),
            0x0d => "Enter".into(),
            0x1b => "Esc".into(),
            0x20 => "Space".into(),
            0x21 => "Page up".into(),
            0x22 => "Page down".into(),
            0x23 => "End".into(),
            0x24 => "Home".into(),
            0x25 => "Left".into(),
            0x26 => "Up".into(),
            0x27 => "Right".into(),
            0x28 => "Down".into(),
            0x2d => "INS".into(),
            0x2e => "DEL".into(),
            k @ (b'0'..=b'9' | b'A'..=b'Z') => (k as char).to_string(),
            k @ 0x60..=0x69 => format!("Numpad {}", k - 0x60),
            k @ 0x70..=0x87 => format!("F{}", k - 0x6f),
            k => format!("0x{:02X}", k),
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_enabled() {
            return Ok(());
        }
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key_name())
    }
}

// ============================================================================
// ExportedCommand - 플러그인 명령 테이블 항목
// ============================================================================

/// 플러그인 함수 진입점 (명령 테이블 내 위치)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandEntry(pub usize);

/// 플러그인이 export 한 명령 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedCommand {
    /// 표시 이름
    pub name: String,

    /// 기본 단축키
    pub shortcut: Option<KeyCombo>,

    /// 체크 상태로 시작
    pub init_checked: bool,

    /// 함수 진입점 (None 이면 구분선)
    pub entry: Option<CommandEntry>,

    /// 호스트가 발급한 명령 ID (발급 전 0)
    pub cmd_id: u32,
}

impl ExportedCommand {
    /// 일반 명령 항목
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            init_checked: false,
            entry: Some(CommandEntry(index)),
            cmd_id: 0,
        }
    }

    /// 구분선 항목
    pub fn separator() -> Self {
        Self {
            name: String::new(),
            shortcut: None,
            init_checked: false,
            entry: None,
            cmd_id: 0,
        }
    }

    pub fn with_shortcut(mut self, shortcut: KeyCombo) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn checked(mut self) -> Self {
        self.init_checked = true;
        self
    }

    pub fn is_separator(&self) -> bool {
        self.entry.is_none()
    }

    /// 메뉴 레이블 (`name` 또는 `name\t<단축키>`)
    pub fn menu_label(&self) -> String {
        match self.shortcut {
            Some(shortcut) => format!("{}\t{}", self.name, shortcut),
            None => self.name.clone(),
        }
    }
}

// ============================================================================
// Registry 항목
// ============================================================================

/// 플랫 명령 목록의 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginCommand {
    /// 모듈 파일 이름
    pub module_name: String,

    /// 플러그인 목록 내 위치
    pub plugin_index: usize,

    /// 플러그인 명령 테이블 내 위치
    pub local_index: usize,

    /// 발급된 명령 ID
    pub cmd_id: u32,
}

/// 명령 단축키 슬롯 (키 재매핑 UI용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginCmdShortcut {
    pub label: String,
    pub shortcut: KeyCombo,
    pub cmd_id: u32,
    pub module_name: String,
    pub local_index: usize,
}

impl PluginCmdShortcut {
    pub fn is_enabled(&self) -> bool {
        self.shortcut.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_combo_display() {
        let combo = KeyCombo::new(true, true, true, 0x74);
        assert_eq!(combo.to_string(), "Ctrl+Alt+Shift+F5");

        let combo = KeyCombo::new(true, false, false, b'Q');
        assert_eq!(combo.to_string(), "Ctrl+Q");

        assert_eq!(KeyCombo::disabled().to_string(), "");
    }

    #[test]
    fn test_menu_label() {
        let plain = ExportedCommand::new("About", 0);
        assert_eq!(plain.menu_label(), "About");

        let bound = ExportedCommand::new("Run", 1).with_shortcut(KeyCombo::new(false, true, false, 0x70));
        assert_eq!(bound.menu_label(), "Run\tAlt+F1");
    }

    #[test]
    fn test_separator() {
        assert!(ExportedCommand::separator().is_separator());
        assert!(!ExportedCommand::new("x", 0).is_separator());
    }
}
