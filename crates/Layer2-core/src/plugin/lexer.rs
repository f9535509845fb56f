//! External Lexer Bridge - 렉서 플러그인 로드 경로
//!
//! `GetLexerCount` 를 export 하는 플러그인은 외부 구문 강조 렉서를 제공합니다.
//!
//! ```text
//! PROBE ──(렉서 플러그인 아님)──▶ DONE
//!   │
//!   ▼
//! COLLECT ─▶ LOCATE-CONFIG ─▶ PARSE ─▶ COMMIT ─▶ DONE
//!                 │              │
//!                 ▼              ▼
//!          MissingConfig   ConfigParseFailure   (ABORT)
//! ```
//!
//! 수집한 렉서는 설정 문서 파싱이 성공한 뒤에만 언어 레지스트리에 등록됩니다.

use plume_foundation::{Error, HostConfig, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::fault::{guard, CallSite, Faulted};
use super::traits::{Export, PluginModule};

// ============================================================================
// 언어 레지스트리
// ============================================================================

/// 외부 렉서 descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLexerDescriptor {
    pub name: String,
    pub status_text: String,
    pub config_path: PathBuf,
}

/// 렉서 스타일 하나 (`WordsStyle`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LexerStyle {
    pub name: String,
    pub style_id: Option<u32>,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
    pub font_name: Option<String>,
    pub font_style: Option<u32>,
    pub font_size: Option<u32>,
}

/// 렉서 스타일 집합 (`LexerType`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LexerStyleSet {
    pub lexer_name: String,
    pub description: String,
    pub extensions: Vec<String>,
    pub styles: Vec<LexerStyle>,
}

/// 파싱된 렉서 설정 문서
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerDocument {
    pub path: PathBuf,
    pub style_sets: Vec<LexerStyleSet>,
}

impl LexerDocument {
    /// 파일에서 로드 (읽기 실패도 ConfigParseFailure)
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::config_parse(path, e.to_string()))?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let document =
            roxmltree::Document::parse(text).map_err(|e| Error::config_parse(path, e.to_string()))?;

        let style_sets = document
            .descendants()
            .filter(|node| node.has_tag_name("LexerType"))
            .map(|node| LexerStyleSet {
                lexer_name: node.attribute("name").unwrap_or_default().to_string(),
                description: node.attribute("desc").unwrap_or_default().to_string(),
                extensions: node
                    .attribute("ext")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                styles: node
                    .children()
                    .filter(|child| child.has_tag_name("WordsStyle"))
                    .map(|style| LexerStyle {
                        name: style.attribute("name").unwrap_or_default().to_string(),
                        style_id: style.attribute("styleID").and_then(|v| v.parse().ok()),
                        fg_color: non_empty(style.attribute("fgColor")),
                        bg_color: non_empty(style.attribute("bgColor")),
                        font_name: non_empty(style.attribute("fontName")),
                        font_style: style.attribute("fontStyle").and_then(|v| v.parse().ok()),
                        font_size: style.attribute("fontSize").and_then(|v| v.parse().ok()),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            style_sets,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// 호스트 전역 외부 언어 레지스트리
#[derive(Debug)]
pub struct LanguageRegistry {
    capacity: usize,
    languages: Vec<ExternalLexerDescriptor>,
    documents: Vec<LexerDocument>,
}

impl LanguageRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            languages: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.languages.iter().any(|lang| lang.name == name)
    }

    pub fn has_room(&self) -> bool {
        self.languages.len() < self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 끝에 등록 (중복이거나 공간이 없으면 false)
    pub fn register(&mut self, descriptor: ExternalLexerDescriptor) -> bool {
        if self.contains(&descriptor.name) || !self.has_room() {
            return false;
        }
        self.languages.push(descriptor);
        true
    }

    pub fn retain_document(&mut self, document: LexerDocument) {
        self.documents.push(document);
    }

    pub fn languages(&self) -> &[ExternalLexerDescriptor] {
        &self.languages
    }

    pub fn documents(&self) -> &[LexerDocument] {
        &self.documents
    }

    /// 렉서 이름으로 스타일 집합 조회
    pub fn style_set(&self, lexer_name: &str) -> Option<&LexerStyleSet> {
        self.documents
            .iter()
            .flat_map(|doc| doc.style_sets.iter())
            .find(|set| set.lexer_name == lexer_name)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

// ============================================================================
// LexerEngine - 렌더링 엔진 협력자
// ============================================================================

/// 렌더링 엔진 (플러그인 바이너리를 렉서 구현으로 로드)
pub trait LexerEngine {
    fn load_lexer_library(&mut self, path: &Path);
}

/// 렌더링 엔진이 없는 호스트용 (로그만 남김)
#[derive(Debug, Default)]
pub struct NullLexerEngine;

impl LexerEngine for NullLexerEngine {
    fn load_lexer_library(&mut self, path: &Path) {
        debug!("Lexer library registered: {}", path.display());
    }
}

// ============================================================================
// LexerBridge - 상태 기계
// ============================================================================

/// 수집 단계에서 보류된 렉서
#[derive(Debug, Clone)]
struct PendingLexer {
    name: String,
    status_text: String,
}

enum Phase {
    Probe,
    Collect,
    LocateConfig { pending: Vec<PendingLexer> },
    Parse { pending: Vec<PendingLexer>, path: PathBuf },
    Commit { pending: Vec<PendingLexer>, document: LexerDocument },
    Done { provider: bool },
}

/// 플러그인 로드 한 번에 대한 렉서 브리지
pub(crate) struct LexerBridge<'a> {
    pub config: &'a HostConfig,
    pub languages: &'a mut LanguageRegistry,
    pub engine: &'a mut dyn LexerEngine,
}

impl LexerBridge<'_> {
    /// 브리지 실행 (렉서 플러그인이면 true)
    ///
    /// 실패 시 레지스트리는 변경되지 않는다.
    pub fn run(
        &mut self,
        module: &mut dyn PluginModule,
        plugin_path: &Path,
        file_name: &str,
    ) -> Result<bool> {
        let mut phase = Phase::Probe;
        loop {
            phase = match phase {
                Phase::Probe => {
                    if !module.has_export(Export::GetLexerCount) {
                        Phase::Done { provider: false }
                    } else {
                        for export in [Export::GetLexerName, Export::GetLexerStatusText] {
                            if !module.has_export(export) {
                                return Err(Error::invalid_export(
                                    export.symbol(),
                                    format!("Loading {} function failed.", export),
                                ));
                            }
                        }
                        Phase::Collect
                    }
                }
                Phase::Collect => Phase::LocateConfig {
                    pending: self.collect(module, file_name)?,
                },
                Phase::LocateConfig { pending } => {
                    let path = self.locate_config(plugin_path)?;
                    Phase::Parse { pending, path }
                }
                Phase::Parse { pending, path } => {
                    let document = LexerDocument::load(&path)?;
                    debug!(
                        "Parsed lexer config {} ({} lexer types)",
                        path.display(),
                        document.style_sets.len()
                    );
                    Phase::Commit { pending, document }
                }
                Phase::Commit { pending, document } => {
                    self.commit(pending, document, plugin_path);
                    Phase::Done { provider: true }
                }
                Phase::Done { provider } => return Ok(provider),
            };
        }
    }

    fn collect(
        &mut self,
        module: &mut dyn PluginModule,
        file_name: &str,
    ) -> Result<Vec<PendingLexer>> {
        let fault = |fault| Error::from(Faulted::new(file_name, CallSite::Load, fault));
        let limit = self.config.limits.max_lexers_per_plugin;

        let count = guard(|| module.lexer_count()).map_err(fault)?;
        if count > limit {
            debug!("{} declares {} lexers, only {} are read", file_name, count, limit);
        }

        let mut pending: Vec<PendingLexer> = Vec::new();
        for index in 0..count.min(limit) {
            let name = guard(|| module.lexer_name(index)).map_err(fault)?;
            let status_text = guard(|| module.lexer_status_text(index)).map_err(fault)?;

            let duplicate =
                self.languages.contains(&name) || pending.iter().any(|p| p.name == name);
            if duplicate || !self.languages.has_room() {
                debug!("Skipping external lexer '{}' from {}", name, file_name);
                continue;
            }
            pending.push(PendingLexer { name, status_text });
        }
        Ok(pending)
    }

    fn locate_config(&self, plugin_path: &Path) -> Result<PathBuf> {
        let stem = plugin_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let [install, user] = self.config.lexer_config_candidates(&stem);
        if install.exists() {
            return Ok(install);
        }
        if user.exists() {
            return Ok(user);
        }
        Err(Error::MissingConfig(user))
    }

    fn commit(&mut self, pending: Vec<PendingLexer>, document: LexerDocument, plugin_path: &Path) {
        let config_path = document.path.clone();
        let mut registered = 0;
        for lexer in pending {
            let descriptor = ExternalLexerDescriptor {
                name: lexer.name,
                status_text: lexer.status_text,
                config_path: config_path.clone(),
            };
            if self.languages.register(descriptor) {
                registered += 1;
            }
        }
        self.languages.retain_document(document);
        self.engine.load_lexer_library(plugin_path);
        info!(
            "Registered {} external lexer(s) from {}",
            registered,
            plugin_path.display()
        );
    }
}
