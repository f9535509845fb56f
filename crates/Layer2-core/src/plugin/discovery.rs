//! Plugin Discovery - 플러그인 디렉토리 스캔
//!
//! `<plugins>/<Folder>/<Folder>.<dll|so|dylib>` 구조에서 플러그인 바이너리를 찾습니다.
//! 예약된 `Config` 디렉토리는 건너뜁니다.

use plume_foundation::{Result, PLUGINS_CONFIG_DIR};
use serde::Serialize;
use std::env::consts::DLL_EXTENSION;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// PluginInventory - 발견된 플러그인 목록
// ============================================================================

/// 스캔에서 발견된 플러그인 폴더
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredPlugin {
    /// 폴더 이름 (= 바이너리 이름)
    pub folder_name: String,

    /// 기대하는 바이너리 경로
    pub binary_path: PathBuf,
}

impl DiscoveredPlugin {
    /// 바이너리 파일 존재 여부
    pub fn has_binary(&self) -> bool {
        self.binary_path.is_file()
    }
}

/// 발견된 플러그인 목록 (로드 성공 여부와 무관, UI 표시용)
#[derive(Debug, Default, Clone)]
pub struct PluginInventory {
    entries: Vec<DiscoveredPlugin>,
}

impl PluginInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plugin: DiscoveredPlugin) {
        self.entries.push(plugin);
    }

    pub fn entries(&self) -> &[DiscoveredPlugin] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// PluginDiscovery
// ============================================================================

/// 플러그인 디렉토리 스캐너
#[derive(Debug, Clone)]
pub struct PluginDiscovery {
    root: PathBuf,
}

impl PluginDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 플러그인 바이너리 이름 (`<folder>.<플랫폼 확장자>`)
    pub fn binary_name(folder_name: &str) -> String {
        format!("{}.{}", folder_name, DLL_EXTENSION)
    }

    /// 하위 디렉토리 스캔 (이름 순)
    ///
    /// 바이너리가 없는 폴더도 목록에 포함된다 (`has_binary` 로 구분, 로드 대상 아님).
    pub fn scan(&self) -> Result<Vec<DiscoveredPlugin>> {
        let mut plugins = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let folder_name = entry.file_name().to_string_lossy().into_owned();
            if folder_name.eq_ignore_ascii_case(PLUGINS_CONFIG_DIR) {
                debug!("Skipping reserved directory {}", path.display());
                continue;
            }

            let binary_path = path.join(Self::binary_name(&folder_name));
            plugins.push(DiscoveredPlugin {
                folder_name,
                binary_path,
            });
        }

        plugins.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
        info!(
            "Discovered {} plugin folder(s) in {}",
            plugins.len(),
            self.root.display()
        );
        Ok(plugins)
    }
}
