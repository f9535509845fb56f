//! Plugin Events - 알림 / 메시지 타입

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::abi::RawNotification;

// ============================================================================
// NotificationCode - 알림 코드
// ============================================================================

/// 알림 코드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCode {
    // 호스트 수명주기
    Ready,
    ToolbarModification,
    FileBeforeClose,
    FileOpened,
    FileClosed,
    FileBeforeOpen,
    FileBeforeSave,
    FileSaved,
    Shutdown,
    BufferActivated,
    LangChanged,
    WordStylesUpdated,
    ShortcutRemapped,
    FileBeforeLoad,
    FileLoadFailed,
    ReadOnlyChanged,
    DocOrderChanged,
    BeforeShutdown,
    CancelShutdown,

    // 에디터 이벤트
    CharAdded,
    SavePointReached,
    SavePointLeft,
    UpdateUi,
    Modified,

    // 기타
    Other(u32),
}

impl NotificationCode {
    /// 이름이 있는 코드 전체 (파싱/도움말용)
    pub const NAMED: [NotificationCode; 24] = [
        Self::Ready,
        Self::ToolbarModification,
        Self::FileBeforeClose,
        Self::FileOpened,
        Self::FileClosed,
        Self::FileBeforeOpen,
        Self::FileBeforeSave,
        Self::FileSaved,
        Self::Shutdown,
        Self::BufferActivated,
        Self::LangChanged,
        Self::WordStylesUpdated,
        Self::ShortcutRemapped,
        Self::FileBeforeLoad,
        Self::FileLoadFailed,
        Self::ReadOnlyChanged,
        Self::DocOrderChanged,
        Self::BeforeShutdown,
        Self::CancelShutdown,
        Self::CharAdded,
        Self::SavePointReached,
        Self::SavePointLeft,
        Self::UpdateUi,
        Self::Modified,
    ];

    /// 숫자 코드
    pub fn code(&self) -> u32 {
        match self {
            Self::Ready => 1001,
            Self::ToolbarModification => 1002,
            Self::FileBeforeClose => 1003,
            Self::FileOpened => 1004,
            Self::FileClosed => 1005,
            Self::FileBeforeOpen => 1006,
            Self::FileBeforeSave => 1007,
            Self::FileSaved => 1008,
            Self::Shutdown => 1009,
            Self::BufferActivated => 1010,
            Self::LangChanged => 1011,
            Self::WordStylesUpdated => 1012,
            Self::ShortcutRemapped => 1013,
            Self::FileBeforeLoad => 1014,
            Self::FileLoadFailed => 1015,
            Self::ReadOnlyChanged => 1016,
            Self::DocOrderChanged => 1017,
            Self::BeforeShutdown => 1019,
            Self::CancelShutdown => 1020,
            Self::CharAdded => 2001,
            Self::SavePointReached => 2002,
            Self::SavePointLeft => 2003,
            Self::UpdateUi => 2007,
            Self::Modified => 2008,
            Self::Other(code) => *code,
        }
    }

    /// 숫자 코드에서 변환
    pub fn from_code(code: u32) -> Self {
        Self::NAMED
            .iter()
            .copied()
            .find(|named| named.code() == code)
            .unwrap_or(Self::Other(code))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::ToolbarModification => "toolbar_modification",
            Self::FileBeforeClose => "file_before_close",
            Self::FileOpened => "file_opened",
            Self::FileClosed => "file_closed",
            Self::FileBeforeOpen => "file_before_open",
            Self::FileBeforeSave => "file_before_save",
            Self::FileSaved => "file_saved",
            Self::Shutdown => "shutdown",
            Self::BufferActivated => "buffer_activated",
            Self::LangChanged => "lang_changed",
            Self::WordStylesUpdated => "word_styles_updated",
            Self::ShortcutRemapped => "shortcut_remapped",
            Self::FileBeforeLoad => "file_before_load",
            Self::FileLoadFailed => "file_load_failed",
            Self::ReadOnlyChanged => "read_only_changed",
            Self::DocOrderChanged => "doc_order_changed",
            Self::BeforeShutdown => "before_shutdown",
            Self::CancelShutdown => "cancel_shutdown",
            Self::CharAdded => "char_added",
            Self::SavePointReached => "save_point_reached",
            Self::SavePointLeft => "save_point_left",
            Self::UpdateUi => "update_ui",
            Self::Modified => "modified",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for NotificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "other({})", code),
            named => write!(f, "{}", named.name()),
        }
    }
}

impl FromStr for NotificationCode {
    type Err = String;

    /// 이름 (`file_opened`, `FileOpened`, `file-opened`) 또는 숫자 코드
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Ok(Self::from_code(code));
        }
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::NAMED
            .iter()
            .copied()
            .find(|named| named.name().replace('_', "") == normalized)
            .ok_or_else(|| format!("Unknown notification: {}", s))
    }
}

// ============================================================================
// Notification - 알림 descriptor
// ============================================================================

/// 플러그인에 전달되는 알림 (플러그인마다 복사본 전달)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub code: NotificationCode,
    pub hwnd_from: usize,
    pub id_from: usize,
    pub position: isize,
    pub ch: i32,
    pub modifiers: i32,
    pub modification_type: i32,
    pub length: isize,
    pub lines_added: isize,
    pub line: isize,
}

impl Notification {
    pub fn new(code: NotificationCode) -> Self {
        Self {
            code,
            hwnd_from: 0,
            id_from: 0,
            position: 0,
            ch: 0,
            modifiers: 0,
            modification_type: 0,
            length: 0,
            lines_added: 0,
            line: 0,
        }
    }

    /// 호스트 수명주기 알림 (hwnd_from = 호스트 창)
    pub fn host(code: NotificationCode, host_window: usize) -> Self {
        Self {
            hwnd_from: host_window,
            ..Self::new(code)
        }
    }

    pub fn with_id_from(mut self, id_from: usize) -> Self {
        self.id_from = id_from;
        self
    }

    pub fn with_position(mut self, position: isize) -> Self {
        self.position = position;
        self
    }

    pub fn is_shutdown(&self) -> bool {
        self.code == NotificationCode::Shutdown
    }

    pub fn to_raw(&self) -> RawNotification {
        RawNotification {
            code: self.code.code(),
            hwnd_from: self.hwnd_from,
            id_from: self.id_from,
            position: self.position,
            ch: self.ch,
            modifiers: self.modifiers,
            modification_type: self.modification_type,
            length: self.length,
            lines_added: self.lines_added,
            line: self.line,
        }
    }

    pub fn from_raw(raw: &RawNotification) -> Self {
        Self {
            code: NotificationCode::from_code(raw.code),
            hwnd_from: raw.hwnd_from,
            id_from: raw.id_from,
            position: raw.position,
            ch: raw.ch,
            modifiers: raw.modifiers,
            modification_type: raw.modification_type,
            length: raw.length,
            lines_added: raw.lines_added,
            line: raw.line,
        }
    }
}

// ============================================================================
// HostMessage - relay 채널 메시지
// ============================================================================

/// 원시 호스트 메시지 (message, wparam, lparam)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostMessage {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl HostMessage {
    pub fn new(message: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            message,
            wparam,
            lparam,
        }
    }
}
