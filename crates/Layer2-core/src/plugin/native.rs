//! Native Module - libloading 기반 플러그인 바인딩

use libloading::Library;
use plume_foundation::{Error, Result};
use std::os::raw::{c_char, c_int, c_uint};
use std::path::Path;
use tracing::debug;

use super::abi::{
    self, BeNotifiedFn, GetFuncsArrayFn, GetLexerCountFn, GetLexerNameFn, GetLexerStatusTextFn,
    GetNameFn, IsUnicodeFn, MessageProcFn, RawFuncItem, SetInfoFn,
    MAX_EXTERNAL_LEXER_DESC_LEN, MAX_EXTERNAL_LEXER_NAME_LEN,
};
use super::command::{CommandEntry, ExportedCommand, KeyCombo};
use super::events::{HostMessage, Notification};
use super::fault::{CallResult, PluginFault};
use super::traits::{Export, HostDescriptor, ModuleBinder, PluginModule};

/// 네이티브 동적 라이브러리 바인더
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBinder;

impl ModuleBinder for NativeBinder {
    fn bind(&self, path: &Path) -> Result<Box<dyn PluginModule>> {
        Ok(Box::new(NativeModule::open(path)?))
    }
}

/// 바인딩된 네이티브 플러그인
///
/// 함수 포인터는 `library` 가 살아있는 동안만 유효하므로 라이브러리를 마지막 필드로 보관한다.
pub struct NativeModule {
    is_unicode: Option<IsUnicodeFn>,
    set_info: Option<SetInfoFn>,
    get_name: Option<GetNameFn>,
    be_notified: Option<BeNotifiedFn>,
    message_proc: Option<MessageProcFn>,
    get_funcs_array: Option<GetFuncsArrayFn>,
    get_lexer_count: Option<GetLexerCountFn>,
    get_lexer_name: Option<GetLexerNameFn>,
    get_lexer_status_text: Option<GetLexerStatusTextFn>,

    /// 플러그인 소유의 명령 테이블
    items: *mut RawFuncItem,
    item_count: usize,

    library: Library,
}

impl NativeModule {
    /// 라이브러리 로드 및 심볼 조회
    pub fn open(path: &Path) -> Result<Self> {
        // SAFETY: 플러그인 초기화 코드가 실행된다. 호출자는 아키텍처 검사를 먼저 수행한다.
        let library =
            unsafe { Library::new(path) }.map_err(|e| Error::load_failure(e.to_string()))?;
        debug!("Bound {}", path.display());

        Ok(Self {
            is_unicode: lookup(&library, abi::SYM_IS_UNICODE),
            set_info: lookup(&library, abi::SYM_SET_INFO),
            get_name: lookup(&library, abi::SYM_GET_NAME),
            be_notified: lookup(&library, abi::SYM_BE_NOTIFIED),
            message_proc: lookup(&library, abi::SYM_MESSAGE_PROC),
            get_funcs_array: lookup(&library, abi::SYM_GET_FUNCS_ARRAY),
            get_lexer_count: lookup(&library, abi::SYM_GET_LEXER_COUNT),
            get_lexer_name: lookup(&library, abi::SYM_GET_LEXER_NAME),
            get_lexer_status_text: lookup(&library, abi::SYM_GET_LEXER_STATUS_TEXT),
            items: std::ptr::null_mut(),
            item_count: 0,
            library,
        })
    }

    fn item(&self, index: usize) -> Option<&RawFuncItem> {
        if self.items.is_null() || index >= self.item_count {
            return None;
        }
        // SAFETY: getFuncsArray 가 반환한 배열은 라이브러리 수명 동안 유효하다.
        Some(unsafe { &*self.items.add(index) })
    }

    fn read_lexer_text(
        &self,
        func: Option<GetLexerNameFn>,
        index: usize,
        capacity: usize,
        export: Export,
    ) -> CallResult<String> {
        let func = func.ok_or_else(|| missing(export))?;
        let mut buffer = vec![0 as c_char; capacity];
        // SAFETY: 버퍼 길이를 함께 전달한다.
        unsafe { func(index as c_uint, buffer.as_mut_ptr(), capacity as c_int) };
        Ok(abi::read_c_buffer(&buffer))
    }
}

fn lookup<T: Copy>(library: &Library, symbol: &str) -> Option<T> {
    // SAFETY: 심볼 타입은 abi 모듈의 계약을 따른다.
    unsafe { library.get::<T>(symbol.as_bytes()) }
        .ok()
        .map(|symbol| *symbol)
}

fn missing(export: Export) -> PluginFault {
    PluginFault::Runtime(format!("Missing \"{}\" function", export))
}

impl PluginModule for NativeModule {
    fn has_export(&self, export: Export) -> bool {
        match export {
            Export::IsUnicode => self.is_unicode.is_some(),
            Export::SetInfo => self.set_info.is_some(),
            Export::GetName => self.get_name.is_some(),
            Export::BeNotified => self.be_notified.is_some(),
            Export::MessageProc => self.message_proc.is_some(),
            Export::GetFuncsArray => self.get_funcs_array.is_some(),
            Export::GetLexerCount => self.get_lexer_count.is_some(),
            Export::GetLexerName => self.get_lexer_name.is_some(),
            Export::GetLexerStatusText => self.get_lexer_status_text.is_some(),
        }
    }

    fn probe_unicode(&mut self) -> CallResult<bool> {
        let func = self.is_unicode.ok_or_else(|| missing(Export::IsUnicode))?;
        Ok(unsafe { func() })
    }

    fn set_host_info(&mut self, host: &HostDescriptor) -> CallResult<()> {
        let func = self.set_info.ok_or_else(|| missing(Export::SetInfo))?;
        unsafe { func(host.to_raw()) };
        Ok(())
    }

    fn name(&mut self) -> CallResult<String> {
        let func = self.get_name.ok_or_else(|| missing(Export::GetName))?;
        Ok(unsafe { abi::read_c_str(func()) }.unwrap_or_default())
    }

    fn notify(&mut self, notification: &mut Notification) -> CallResult<()> {
        let func = self.be_notified.ok_or_else(|| missing(Export::BeNotified))?;
        let mut raw = notification.to_raw();
        unsafe { func(&mut raw) };
        *notification = Notification::from_raw(&raw);
        Ok(())
    }

    fn dispatch_message(&mut self, message: &HostMessage) -> CallResult<isize> {
        let func = self.message_proc.ok_or_else(|| missing(Export::MessageProc))?;
        Ok(unsafe { func(message.message, message.wparam, message.lparam) })
    }

    fn commands(&mut self) -> CallResult<Vec<ExportedCommand>> {
        let func = self
            .get_funcs_array
            .ok_or_else(|| missing(Export::GetFuncsArray))?;
        let mut count: c_int = 0;
        let items = unsafe { func(&mut count) };
        if items.is_null() || count <= 0 {
            self.items = std::ptr::null_mut();
            self.item_count = 0;
            return Ok(Vec::new());
        }
        self.items = items;
        self.item_count = count as usize;

        let commands = (0..self.item_count)
            .filter_map(|index| self.item(index).map(|item| (index, item)))
            .map(|(index, item)| {
                if item.p_func.is_none() {
                    return ExportedCommand::separator();
                }
                let mut command = ExportedCommand::new(abi::read_c_buffer(&item.item_name), index);
                if !item.p_sh_key.is_null() {
                    // SAFETY: 플러그인이 소유한 단축키 구조체
                    let key = unsafe { &*item.p_sh_key };
                    command = command
                        .with_shortcut(KeyCombo::new(key.is_ctrl, key.is_alt, key.is_shift, key.key));
                }
                if item.init2check {
                    command = command.checked();
                }
                command
            })
            .collect();
        Ok(commands)
    }

    fn invoke(&mut self, entry: CommandEntry) -> CallResult<()> {
        if let Some(func) = self.item(entry.0).and_then(|item| item.p_func) {
            unsafe { func() };
        }
        Ok(())
    }

    fn assign_command_id(&mut self, local_index: usize, cmd_id: u32) {
        if self.item(local_index).is_some() {
            // SAFETY: 범위 확인 완료, 단일 스레드에서만 접근한다.
            unsafe { (*self.items.add(local_index)).cmd_id = cmd_id as c_int };
        }
    }

    fn lexer_count(&mut self) -> CallResult<usize> {
        let func = self
            .get_lexer_count
            .ok_or_else(|| missing(Export::GetLexerCount))?;
        Ok(unsafe { func() }.max(0) as usize)
    }

    fn lexer_name(&mut self, index: usize) -> CallResult<String> {
        self.read_lexer_text(
            self.get_lexer_name,
            index,
            MAX_EXTERNAL_LEXER_NAME_LEN,
            Export::GetLexerName,
        )
    }

    fn lexer_status_text(&mut self, index: usize) -> CallResult<String> {
        self.read_lexer_text(
            self.get_lexer_status_text,
            index,
            MAX_EXTERNAL_LEXER_DESC_LEN,
            Export::GetLexerStatusText,
        )
    }
}

impl std::fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModule")
            .field("library", &self.library)
            .field("item_count", &self.item_count)
            .finish()
    }
}
