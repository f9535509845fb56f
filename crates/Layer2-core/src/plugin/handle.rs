//! Plugin Handle - 로드된 플러그인 레코드

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::command::ExportedCommand;
use super::traits::PluginModule;
use super::ui::MenuId;

// ============================================================================
// PluginHandle
// ============================================================================

/// 로드된 플러그인
///
/// `module` 이 None 이면 비활성 핸들이며 어떤 호출도 전달되지 않는다.
pub struct PluginHandle {
    pub(crate) module: Option<Box<dyn PluginModule>>,
    path: PathBuf,
    file_name: String,
    display_name: String,
    pub(crate) commands: Vec<ExportedCommand>,
    pub(crate) menu: Option<MenuId>,
    lexer_provider: bool,
}

impl PluginHandle {
    pub(crate) fn new(
        module: Box<dyn PluginModule>,
        path: PathBuf,
        display_name: String,
        commands: Vec<ExportedCommand>,
        lexer_provider: bool,
    ) -> Self {
        let file_name = file_name_of(&path);
        Self {
            module: Some(module),
            path,
            file_name,
            display_name,
            commands,
            menu: None,
            lexer_provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 모듈 파일 이름 (예: `Alpha.so`)
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// `getName` 이 반환한 표시 이름
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn commands(&self) -> &[ExportedCommand] {
        &self.commands
    }

    pub fn menu(&self) -> Option<MenuId> {
        self.menu
    }

    pub fn is_lexer_provider(&self) -> bool {
        self.lexer_provider
    }

    pub fn is_inert(&self) -> bool {
        self.module.is_none()
    }

    /// 파일 이름 또는 확장자를 뺀 이름과 일치하는지 (대소문자 무시)
    pub fn matches_name(&self, name: &str) -> bool {
        if self.file_name.eq_ignore_ascii_case(name) {
            return true;
        }
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }

    /// 모듈 해제 (슬롯은 유지)
    pub(crate) fn release(&mut self) -> Option<Box<dyn PluginModule>> {
        self.module.take()
    }

    pub fn summary(&self, index: usize) -> PluginSummary {
        PluginSummary {
            index,
            file_name: self.file_name.clone(),
            display_name: self.display_name.clone(),
            path: self.path.clone(),
            commands: self.commands.iter().filter(|c| !c.is_separator()).count(),
            lexer_provider: self.lexer_provider,
            loaded: !self.is_inert(),
        }
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("file_name", &self.file_name)
            .field("display_name", &self.display_name)
            .field("commands", &self.commands.len())
            .field("inert", &self.is_inert())
            .finish()
    }
}

/// 플러그인 요약 (UI 표시용)
#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    pub index: usize,
    pub file_name: String,
    pub display_name: String,
    pub path: PathBuf,
    pub commands: usize,
    pub lexer_provider: bool,
    pub loaded: bool,
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// LoadedModules - 바인딩된 파일 목록
// ============================================================================

/// 이미 바인딩된 모듈 파일 목록 (중복 로드 방지)
#[derive(Debug, Default)]
pub struct LoadedModules {
    entries: Vec<(PathBuf, String)>,
}

impl LoadedModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries
            .iter()
            .any(|(_, name)| name.eq_ignore_ascii_case(file_name))
    }

    pub fn insert(&mut self, path: PathBuf, file_name: String) {
        self.entries.push((path, file_name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 공백으로 구분된 파일 이름 목록
    pub fn names(&self) -> String {
        self.entries
            .iter()
            .map(|(_, name)| format!("{} ", name))
            .collect()
    }
}
