//! Plugin ABI - 네이티브 플러그인 바이너리 계약
//!
//! 플러그인은 아래 심볼을 `extern "C-unwind"` 로 export 합니다.
//!
//! | 심볼 | 시그니처 | 필수 |
//! |------|----------|------|
//! | `isUnicode` | `fn() -> bool` | O |
//! | `setInfo` | `fn(RawHostDescriptor)` | O |
//! | `getName` | `fn() -> *const c_char` | O |
//! | `beNotified` | `fn(*mut RawNotification)` | O |
//! | `messageProc` | `fn(u32, usize, isize) -> isize` | O |
//! | `getFuncsArray` | `fn(*mut c_int) -> *mut RawFuncItem` | O |
//! | `GetLexerCount` | `fn() -> c_int` | |
//! | `GetLexerName` | `fn(c_uint, *mut c_char, c_int)` | |
//! | `GetLexerStatusText` | `fn(c_uint, *mut c_char, c_int)` | |
//!
//! 문자열은 NUL 종료 UTF-8 입니다.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint};

// ============================================================================
// 심볼 이름
// ============================================================================

pub const SYM_IS_UNICODE: &str = "isUnicode";
pub const SYM_SET_INFO: &str = "setInfo";
pub const SYM_GET_NAME: &str = "getName";
pub const SYM_BE_NOTIFIED: &str = "beNotified";
pub const SYM_MESSAGE_PROC: &str = "messageProc";
pub const SYM_GET_FUNCS_ARRAY: &str = "getFuncsArray";
pub const SYM_GET_LEXER_COUNT: &str = "GetLexerCount";
pub const SYM_GET_LEXER_NAME: &str = "GetLexerName";
pub const SYM_GET_LEXER_STATUS_TEXT: &str = "GetLexerStatusText";

// ============================================================================
// 버퍼 크기
// ============================================================================

/// 명령 테이블 항목 이름 버퍼 크기
pub const FUNC_ITEM_NAME_LEN: usize = 64;

/// 외부 렉서 이름 버퍼 크기
pub const MAX_EXTERNAL_LEXER_NAME_LEN: usize = 16;

/// 외부 렉서 상태 텍스트 버퍼 크기
pub const MAX_EXTERNAL_LEXER_DESC_LEN: usize = 32;

// ============================================================================
// repr(C) 구조체
// ============================================================================

/// `setInfo` 로 전달되는 호스트 핸들
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHostDescriptor {
    pub host_window: usize,
    pub main_view: usize,
    pub secondary_view: usize,
}

/// 기본 단축키
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawShortcutKey {
    pub is_ctrl: bool,
    pub is_alt: bool,
    pub is_shift: bool,
    pub key: u8,
}

/// 명령 테이블 항목 (`p_func` 가 None 이면 구분선)
#[repr(C)]
pub struct RawFuncItem {
    pub item_name: [c_char; FUNC_ITEM_NAME_LEN],
    pub p_func: Option<unsafe extern "C-unwind" fn()>,
    pub cmd_id: c_int,
    pub init2check: bool,
    pub p_sh_key: *const RawShortcutKey,
}

/// `beNotified` 로 전달되는 알림 구조체
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNotification {
    pub code: u32,
    pub hwnd_from: usize,
    pub id_from: usize,
    pub position: isize,
    pub ch: c_int,
    pub modifiers: c_int,
    pub modification_type: c_int,
    pub length: isize,
    pub lines_added: isize,
    pub line: isize,
}

// ============================================================================
// 함수 타입
// ============================================================================

pub type IsUnicodeFn = unsafe extern "C-unwind" fn() -> bool;
pub type SetInfoFn = unsafe extern "C-unwind" fn(RawHostDescriptor);
pub type GetNameFn = unsafe extern "C-unwind" fn() -> *const c_char;
pub type BeNotifiedFn = unsafe extern "C-unwind" fn(*mut RawNotification);
pub type MessageProcFn = unsafe extern "C-unwind" fn(u32, usize, isize) -> isize;
pub type GetFuncsArrayFn = unsafe extern "C-unwind" fn(*mut c_int) -> *mut RawFuncItem;
pub type GetLexerCountFn = unsafe extern "C-unwind" fn() -> c_int;
pub type GetLexerNameFn = unsafe extern "C-unwind" fn(c_uint, *mut c_char, c_int);
pub type GetLexerStatusTextFn = unsafe extern "C-unwind" fn(c_uint, *mut c_char, c_int);

// ============================================================================
// 문자열 변환
// ============================================================================

/// 고정 크기 버퍼에서 NUL 이전까지 읽기 (NUL 이 없으면 버퍼 전체)
pub fn read_c_buffer(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// NUL 종료 포인터 읽기
///
/// # Safety
///
/// `ptr` 는 null 이거나 유효한 NUL 종료 문자열을 가리켜야 한다.
pub unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}
