//! Fault Barrier - 플러그인 호출 장애 격리
//!
//! 모든 플러그인 호출은 `guard` 를 통과합니다.
//! - 플러그인이 보고한 실패 → `PluginFault::Runtime` (예외 알림)
//! - 호출 중 panic unwinding → `PluginFault::Fatal` (크래시 알림)
//!
//! 어느 경우든 호스트 프로세스는 계속 실행됩니다.

use chrono::{DateTime, Utc};
use plume_foundation::Error;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// 장애 기록 최대 보관 수
pub const MAX_FAULT_HISTORY: usize = 100;

// ============================================================================
// PluginFault
// ============================================================================

/// 플러그인 호출 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginFault {
    /// 플러그인이 보고한 복구 가능한 실패
    #[error("{0}")]
    Runtime(String),

    /// 복구 불가능한 장애 (panic, 잘못된 메모리 접근 등)
    #[error("{0}")]
    Fatal(String),
}

impl PluginFault {
    pub fn kind(&self) -> FaultKind {
        match self {
            PluginFault::Runtime(_) => FaultKind::Runtime,
            PluginFault::Fatal(_) => FaultKind::Fatal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PluginFault::Runtime(message) | PluginFault::Fatal(message) => message,
        }
    }
}

/// 플러그인 호출 결과
pub type CallResult<T> = std::result::Result<T, PluginFault>;

/// 장애 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Runtime,
    Fatal,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime => write!(f, "runtime"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

// ============================================================================
// CallSite - 장애가 발생한 진입점
// ============================================================================

/// 플러그인 진입점 (크래시 알림에 표시)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSite {
    Load,
    Command { position: usize },
    NamedCommand { plugin: String, local_index: usize },
    Notify { code: u32, hwnd_from: usize, id_from: usize },
    RelayAll { message: u32, wparam: usize, lparam: isize },
    RelayTo { message: u32, wparam: usize, lparam: isize },
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Command { position } => write!(f, "run_command(position: {})", position),
            Self::NamedCommand {
                plugin,
                local_index,
            } => write!(
                f,
                "run_command_by_name(plugin: {}, index: {})",
                plugin, local_index
            ),
            Self::Notify {
                code,
                hwnd_from,
                id_from,
            } => write!(
                f,
                "notify(code: {}, hwnd_from: {:#x}, id_from: {})",
                code, hwnd_from, id_from
            ),
            Self::RelayAll {
                message,
                wparam,
                lparam,
            } => write!(
                f,
                "relay(message: {}, wparam: {}, lparam: {})",
                message, wparam, lparam
            ),
            Self::RelayTo {
                message,
                wparam,
                lparam,
            } => write!(
                f,
                "relay_to(message: {}, wparam: {}, lparam: {})",
                message, wparam, lparam
            ),
        }
    }
}

// ============================================================================
// Faulted - 격리된 장애
// ============================================================================

/// 장벽에서 격리된 장애 (플러그인 + 진입점)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faulted {
    pub plugin: String,
    pub site: CallSite,
    pub fault: PluginFault,
}

impl Faulted {
    pub fn new(plugin: impl Into<String>, site: CallSite, fault: PluginFault) -> Self {
        Self {
            plugin: plugin.into(),
            site,
            fault,
        }
    }

    pub fn kind(&self) -> FaultKind {
        self.fault.kind()
    }
}

impl From<Faulted> for Error {
    fn from(faulted: Faulted) -> Self {
        match faulted.fault {
            PluginFault::Runtime(message) => Error::RuntimeFault {
                plugin: faulted.plugin,
                message,
            },
            PluginFault::Fatal(_) => Error::FatalFault {
                plugin: faulted.plugin,
                site: faulted.site.to_string(),
            },
        }
    }
}

/// 플러그인 호출 결과 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// 호출 완료
    Completed,
    /// 호출 대상 없음 (구분선, 비활성 핸들, 범위 밖)
    Skipped,
    /// 장애 격리됨
    Faulted(FaultKind),
}

// ============================================================================
// guard - 장애 장벽
// ============================================================================

/// 플러그인 호출을 장애 장벽 안에서 실행
///
/// panic 페이로드가 `PluginFault` 이면 그대로, 그 외에는 `Fatal` 로 변환한다.
pub fn guard<T>(call: impl FnOnce() -> CallResult<T>) -> CallResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(fault_from_panic(payload)),
    }
}

fn fault_from_panic(payload: Box<dyn std::any::Any + Send>) -> PluginFault {
    let payload = match payload.downcast::<PluginFault>() {
        Ok(fault) => return *fault,
        Err(payload) => payload,
    };
    if let Some(message) = payload.downcast_ref::<&str>() {
        PluginFault::Fatal((*message).to_string())
    } else if let Some(message) = payload.downcast_ref::<String>() {
        PluginFault::Fatal(message.clone())
    } else {
        PluginFault::Fatal("unknown fault".to_string())
    }
}

// ============================================================================
// FaultRecord / FaultHistory
// ============================================================================

/// 격리된 장애 기록
#[derive(Debug, Clone, Serialize)]
pub struct FaultRecord {
    pub timestamp: DateTime<Utc>,
    pub plugin: String,
    pub site: String,
    pub kind: FaultKind,
    pub message: String,
}

impl FaultRecord {
    pub fn new(
        plugin: impl Into<String>,
        site: impl Into<String>,
        kind: FaultKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            plugin: plugin.into(),
            site: site.into(),
            kind,
            message: message.into(),
        }
    }
}

impl From<&Faulted> for FaultRecord {
    fn from(faulted: &Faulted) -> Self {
        Self {
            timestamp: Utc::now(),
            plugin: faulted.plugin.clone(),
            site: faulted.site.to_string(),
            kind: faulted.kind(),
            message: faulted.fault.message().to_string(),
        }
    }
}

/// 최근 장애 기록 (최대 `MAX_FAULT_HISTORY` 개)
#[derive(Debug, Default)]
pub struct FaultHistory {
    records: VecDeque<FaultRecord>,
}

impl FaultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FaultRecord) {
        if self.records.len() >= MAX_FAULT_HISTORY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &FaultRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
