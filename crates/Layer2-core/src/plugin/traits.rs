//! Plugin Traits - 플러그인 모듈 capability 인터페이스
//!
//! 동적 심볼 조회와 원시 함수 포인터 호출을 `PluginModule` 뒤로 숨깁니다.
//! 실제 구현은 `NativeModule` (libloading), 테스트는 in-process fake 를 사용합니다.

use plume_foundation::Result;
use std::fmt;
use std::path::Path;

use super::abi::{self, RawHostDescriptor};
use super::arch::{self, Machine};
use super::command::{CommandEntry, ExportedCommand};
use super::events::{HostMessage, Notification};
use super::fault::CallResult;

// ============================================================================
// Export - 플러그인 export 심볼
// ============================================================================

/// 플러그인 export 심볼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Export {
    IsUnicode,
    SetInfo,
    GetName,
    BeNotified,
    MessageProc,
    GetFuncsArray,
    GetLexerCount,
    GetLexerName,
    GetLexerStatusText,
}

impl Export {
    /// 로드 시 순서대로 확인하는 필수 export (isUnicode 제외)
    pub const HANDSHAKE: [Export; 4] = [
        Export::SetInfo,
        Export::GetName,
        Export::BeNotified,
        Export::MessageProc,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Export::IsUnicode => abi::SYM_IS_UNICODE,
            Export::SetInfo => abi::SYM_SET_INFO,
            Export::GetName => abi::SYM_GET_NAME,
            Export::BeNotified => abi::SYM_BE_NOTIFIED,
            Export::MessageProc => abi::SYM_MESSAGE_PROC,
            Export::GetFuncsArray => abi::SYM_GET_FUNCS_ARRAY,
            Export::GetLexerCount => abi::SYM_GET_LEXER_COUNT,
            Export::GetLexerName => abi::SYM_GET_LEXER_NAME,
            Export::GetLexerStatusText => abi::SYM_GET_LEXER_STATUS_TEXT,
        }
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ============================================================================
// HostDescriptor - setInfo 로 전달되는 호스트 정보
// ============================================================================

/// 플러그인이 콜백 등록에 사용하는 호스트 핸들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostDescriptor {
    pub host_window: usize,
    pub main_view: usize,
    pub secondary_view: usize,
}

impl HostDescriptor {
    pub fn to_raw(&self) -> RawHostDescriptor {
        RawHostDescriptor {
            host_window: self.host_window,
            main_view: self.main_view,
            secondary_view: self.secondary_view,
        }
    }
}

// ============================================================================
// PluginModule - 바인딩된 플러그인 모듈
// ============================================================================

/// 바인딩된 플러그인 모듈
///
/// 각 메서드는 플러그인 코드 하나를 호출합니다. 호출은 항상 `fault::guard` 안에서 이루어지므로
/// 구현체는 panic 을 그대로 전파해도 됩니다.
pub trait PluginModule {
    /// export 존재 여부
    fn has_export(&self, export: Export) -> bool;

    /// `isUnicode`
    fn probe_unicode(&mut self) -> CallResult<bool>;

    /// `setInfo`
    fn set_host_info(&mut self, host: &HostDescriptor) -> CallResult<()>;

    /// `getName`
    fn name(&mut self) -> CallResult<String>;

    /// `beNotified` (플러그인은 자신이 받은 복사본만 수정할 수 있음)
    fn notify(&mut self, notification: &mut Notification) -> CallResult<()>;

    /// `messageProc`
    fn dispatch_message(&mut self, message: &HostMessage) -> CallResult<isize>;

    /// `getFuncsArray`
    fn commands(&mut self) -> CallResult<Vec<ExportedCommand>>;

    /// 명령 테이블 함수 호출
    fn invoke(&mut self, entry: CommandEntry) -> CallResult<()>;

    /// 발급된 명령 ID 를 플러그인 명령 테이블에 기록
    fn assign_command_id(&mut self, _local_index: usize, _cmd_id: u32) {}

    /// `GetLexerCount`
    fn lexer_count(&mut self) -> CallResult<usize> {
        Ok(0)
    }

    /// `GetLexerName`
    fn lexer_name(&mut self, _index: usize) -> CallResult<String> {
        Ok(String::new())
    }

    /// `GetLexerStatusText`
    fn lexer_status_text(&mut self, _index: usize) -> CallResult<String> {
        Ok(String::new())
    }
}

// ============================================================================
// ModuleBinder - 동적 바인딩 seam
// ============================================================================

/// 플러그인 바이너리를 `PluginModule` 로 바인딩
pub trait ModuleBinder {
    /// 바이너리 대상 아키텍처
    fn machine(&self, path: &Path) -> Machine {
        arch::read_machine(path)
    }

    /// 동적 바인딩 (실패 시 `Error::LoadFailure`)
    fn bind(&self, path: &Path) -> Result<Box<dyn PluginModule>>;
}
