//! Error types for Plume
//!
//! 모든 에러를 중앙에서 관리

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 로드 실패 시 안내 메시지 (플랫폼 로더가 진단 메시지를 주지 않은 경우)
pub const LOAD_FAILURE_GUIDANCE: &str = "Load Library has failed.\n\
    Building the plugin against the same runtime and toolchain as the host might solve this problem.";

/// Plume 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 플러그인 로드 관련
    // ========================================================================
    #[error("Cannot load {found} plugin into a {expected} host.")]
    ArchitectureMismatch { expected: String, found: String },

    #[error("{0}")]
    LoadFailure(String),

    #[error("{reason}")]
    MissingCapability { export: String, reason: String },

    // ========================================================================
    // 외부 렉서 관련
    // ========================================================================
    #[error("{} is missing.", .0.display())]
    MissingConfig(PathBuf),

    #[error("{} failed to load: {reason}", .path.display())]
    ConfigParseFailure { path: PathBuf, reason: String },

    // ========================================================================
    // 플러그인 호출 관련
    // ========================================================================
    #[error("{plugin}: {message}")]
    RuntimeFault { plugin: String, message: String },

    #[error("{plugin} crashed in {site}")]
    FatalFault { plugin: String, site: String },

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 플러그인 로드 단계에서 발생한 에러인지 확인
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::ArchitectureMismatch { .. }
                | Error::LoadFailure(_)
                | Error::MissingCapability { .. }
                | Error::MissingConfig(_)
                | Error::ConfigParseFailure { .. }
        )
    }

    /// 사용자에게 플러그인 파일 삭제를 제안해야 하는지 확인
    ///
    /// 플러그인이 직접 던진 RuntimeFault는 예외 알림으로 처리하고,
    /// 그 외 로드 실패는 모두 삭제 여부를 묻는다.
    pub fn offers_removal(&self) -> bool {
        !matches!(self, Error::RuntimeFault { .. })
    }

    /// 바인딩 실패 에러 생성 헬퍼 (진단 메시지가 없으면 안내 메시지 사용)
    pub fn load_failure(diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        if diagnostic.trim().is_empty() {
            Error::LoadFailure(LOAD_FAILURE_GUIDANCE.to_string())
        } else {
            Error::LoadFailure(diagnostic)
        }
    }

    /// 필수 export 누락 에러 생성 헬퍼
    pub fn missing_export(export: impl Into<String>) -> Self {
        let export = export.into();
        Error::MissingCapability {
            reason: format!("Missing \"{}\" function", export),
            export,
        }
    }

    /// 필수 export가 잘못된 결과를 반환한 경우
    pub fn invalid_export(export: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MissingCapability {
            export: export.into(),
            reason: reason.into(),
        }
    }

    /// 설정 문서 파싱 실패 에러 생성 헬퍼
    pub fn config_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ConfigParseFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
