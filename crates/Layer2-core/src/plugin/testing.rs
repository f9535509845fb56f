//! 테스트용 in-process 플러그인 / UI / 엔진

use plume_foundation::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::arch::Machine;
use super::command::{CommandEntry, ExportedCommand};
use super::events::{HostMessage, Notification};
use super::fault::{CallResult, CallSite, PluginFault};
use super::lexer::LexerEngine;
use super::traits::{Export, HostDescriptor, ModuleBinder, PluginModule};
use super::ui::{HostUi, MenuId};

// ============================================================================
// FakeModule
// ============================================================================

/// 호출 동작
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(String),
    Panic(String),
}

impl Behavior {
    fn apply(&self) -> CallResult<()> {
        match self {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(PluginFault::Runtime(message.clone())),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// FakeModule 이 관찰한 호출
#[derive(Debug, Default)]
pub struct FakeLog {
    pub host_info: Option<HostDescriptor>,
    pub notifications: Vec<Notification>,
    pub messages: Vec<HostMessage>,
    pub invoked: Vec<usize>,
    pub assigned: Vec<(usize, u32)>,
}

/// in-process 플러그인
pub struct FakeModule {
    name: String,
    unicode: bool,
    missing: HashSet<Export>,
    commands: Vec<ExportedCommand>,
    lexers: Option<Vec<(String, String)>>,
    on_set_info: Behavior,
    on_notify: Behavior,
    on_message: Behavior,
    on_command: HashMap<usize, Behavior>,
    mutate_notifications: bool,
    log: Rc<RefCell<FakeLog>>,
}

impl FakeModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unicode: true,
            missing: HashSet::new(),
            commands: vec![ExportedCommand::new("About", 0)],
            lexers: None,
            on_set_info: Behavior::Succeed,
            on_notify: Behavior::Succeed,
            on_message: Behavior::Succeed,
            on_command: HashMap::new(),
            mutate_notifications: false,
            log: Rc::new(RefCell::new(FakeLog::default())),
        }
    }

    pub fn with_commands(mut self, commands: Vec<ExportedCommand>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_lexers(mut self, lexers: &[(&str, &str)]) -> Self {
        self.lexers = Some(
            lexers
                .iter()
                .map(|(name, status)| (name.to_string(), status.to_string()))
                .collect(),
        );
        self
    }

    pub fn without(mut self, export: Export) -> Self {
        self.missing.insert(export);
        self
    }

    pub fn ansi(mut self) -> Self {
        self.unicode = false;
        self
    }

    pub fn on_set_info(mut self, behavior: Behavior) -> Self {
        self.on_set_info = behavior;
        self
    }

    pub fn on_notify(mut self, behavior: Behavior) -> Self {
        self.on_notify = behavior;
        self
    }

    pub fn on_message(mut self, behavior: Behavior) -> Self {
        self.on_message = behavior;
        self
    }

    pub fn on_command(mut self, index: usize, behavior: Behavior) -> Self {
        self.on_command.insert(index, behavior);
        self
    }

    pub fn mutating_notifications(mut self) -> Self {
        self.mutate_notifications = true;
        self
    }

    pub fn log(&self) -> Rc<RefCell<FakeLog>> {
        Rc::clone(&self.log)
    }
}

impl PluginModule for FakeModule {
    fn has_export(&self, export: Export) -> bool {
        if self.missing.contains(&export) {
            return false;
        }
        match export {
            Export::GetLexerCount | Export::GetLexerName | Export::GetLexerStatusText => {
                self.lexers.is_some()
            }
            _ => true,
        }
    }

    fn probe_unicode(&mut self) -> CallResult<bool> {
        Ok(self.unicode)
    }

    fn set_host_info(&mut self, host: &HostDescriptor) -> CallResult<()> {
        self.on_set_info.apply()?;
        self.log.borrow_mut().host_info = Some(*host);
        Ok(())
    }

    fn name(&mut self) -> CallResult<String> {
        Ok(self.name.clone())
    }

    fn notify(&mut self, notification: &mut Notification) -> CallResult<()> {
        self.log.borrow_mut().notifications.push(notification.clone());
        if self.mutate_notifications {
            notification.position = -1;
            notification.id_from = usize::MAX;
        }
        self.on_notify.apply()
    }

    fn dispatch_message(&mut self, message: &HostMessage) -> CallResult<isize> {
        self.log.borrow_mut().messages.push(*message);
        self.on_message.apply().map(|_| 1)
    }

    fn commands(&mut self) -> CallResult<Vec<ExportedCommand>> {
        Ok(self.commands.clone())
    }

    fn invoke(&mut self, entry: CommandEntry) -> CallResult<()> {
        self.log.borrow_mut().invoked.push(entry.0);
        match self.on_command.get(&entry.0) {
            Some(behavior) => behavior.apply(),
            None => Ok(()),
        }
    }

    fn assign_command_id(&mut self, local_index: usize, cmd_id: u32) {
        self.log.borrow_mut().assigned.push((local_index, cmd_id));
    }

    fn lexer_count(&mut self) -> CallResult<usize> {
        Ok(self.lexers.as_ref().map(Vec::len).unwrap_or(0))
    }

    fn lexer_name(&mut self, index: usize) -> CallResult<String> {
        Ok(self
            .lexers
            .as_ref()
            .and_then(|lexers| lexers.get(index))
            .map(|(name, _)| name.clone())
            .unwrap_or_default())
    }

    fn lexer_status_text(&mut self, index: usize) -> CallResult<String> {
        Ok(self
            .lexers
            .as_ref()
            .and_then(|lexers| lexers.get(index))
            .map(|(_, status)| status.clone())
            .unwrap_or_default())
    }
}

// ============================================================================
// FakeBinder
// ============================================================================

/// 파일 이름 → FakeModule 바인더
#[derive(Default)]
pub struct FakeBinder {
    modules: RefCell<HashMap<String, FakeModule>>,
    machines: HashMap<String, Machine>,
}

impl FakeBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, file_name: &str, module: FakeModule) -> Self {
        self.modules
            .borrow_mut()
            .insert(file_name.to_string(), module);
        self
    }

    pub fn with_machine(mut self, file_name: &str, machine: Machine) -> Self {
        self.machines.insert(file_name.to_string(), machine);
        self
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ModuleBinder for FakeBinder {
    fn machine(&self, path: &Path) -> Machine {
        self.machines
            .get(&file_name(path))
            .copied()
            .unwrap_or_else(Machine::current)
    }

    fn bind(&self, path: &Path) -> Result<Box<dyn PluginModule>> {
        match self.modules.borrow_mut().remove(&file_name(path)) {
            Some(module) => Ok(Box::new(module)),
            None => Err(Error::load_failure("")),
        }
    }
}

// ============================================================================
// RecordingUi
// ============================================================================

/// 메뉴 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item { cmd_id: u32, label: String },
    Separator,
    Submenu { menu: MenuId, title: String },
}

impl MenuEntry {
    pub fn is_separator(&self) -> bool {
        matches!(self, MenuEntry::Separator)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuEntry::Item { label, .. } => Some(label),
            MenuEntry::Submenu { title, .. } => Some(title),
            MenuEntry::Separator => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct UiLog {
    pub menus: HashMap<MenuId, Vec<MenuEntry>>,
    pub checked: HashSet<u32>,
    pub prompts: Vec<(PathBuf, String)>,
    pub exception_alerts: Vec<(String, String)>,
    pub crash_alerts: Vec<(String, String)>,
    next_menu: u32,
}

/// 모든 요청을 기록하는 UI (clone 은 같은 기록을 공유)
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    log: Rc<RefCell<UiLog>>,
    remove_answer: bool,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 삭제 확인에 대한 응답
    pub fn answering(mut self, remove: bool) -> Self {
        self.remove_answer = remove;
        self
    }

    pub fn entries(&self, menu: MenuId) -> Vec<MenuEntry> {
        self.log.borrow().menus.get(&menu).cloned().unwrap_or_default()
    }

    pub fn is_checked(&self, cmd_id: u32) -> bool {
        self.log.borrow().checked.contains(&cmd_id)
    }

    pub fn prompts(&self) -> Vec<(PathBuf, String)> {
        self.log.borrow().prompts.clone()
    }

    pub fn exception_alerts(&self) -> Vec<(String, String)> {
        self.log.borrow().exception_alerts.clone()
    }

    pub fn crash_alerts(&self) -> Vec<(String, String)> {
        self.log.borrow().crash_alerts.clone()
    }

    fn insert(&mut self, menu: MenuId, position: usize, entry: MenuEntry) {
        let mut log = self.log.borrow_mut();
        let entries = log.menus.entry(menu).or_default();
        let position = position.min(entries.len());
        entries.insert(position, entry);
    }
}

impl HostUi for RecordingUi {
    fn confirm_remove_incompatible(&mut self, plugin_path: &Path, message: &str) -> bool {
        self.log
            .borrow_mut()
            .prompts
            .push((plugin_path.to_path_buf(), message.to_string()));
        self.remove_answer
    }

    fn plugin_exception_alert(&mut self, plugin: &str, message: &str) {
        self.log
            .borrow_mut()
            .exception_alerts
            .push((plugin.to_string(), message.to_string()));
    }

    fn plugin_crash_alert(&mut self, plugin: &str, site: &CallSite) {
        self.log
            .borrow_mut()
            .crash_alerts
            .push((plugin.to_string(), site.to_string()));
    }

    fn create_root_menu(&mut self, _title: &str) -> MenuId {
        let mut log = self.log.borrow_mut();
        log.next_menu += 1;
        let menu = MenuId(log.next_menu);
        log.menus.insert(menu, Vec::new());
        menu
    }

    fn create_submenu(&mut self, parent: MenuId, position: usize, title: &str) -> MenuId {
        let menu = {
            let mut log = self.log.borrow_mut();
            log.next_menu += 1;
            let menu = MenuId(log.next_menu);
            log.menus.insert(menu, Vec::new());
            menu
        };
        self.insert(
            parent,
            position,
            MenuEntry::Submenu {
                menu,
                title: title.to_string(),
            },
        );
        menu
    }

    fn insert_item(&mut self, menu: MenuId, position: usize, cmd_id: u32, label: &str) {
        self.insert(
            menu,
            position,
            MenuEntry::Item {
                cmd_id,
                label: label.to_string(),
            },
        );
    }

    fn insert_separator(&mut self, menu: MenuId, position: usize) {
        self.insert(menu, position, MenuEntry::Separator);
    }

    fn check_item(&mut self, cmd_id: u32, checked: bool) {
        let mut log = self.log.borrow_mut();
        if checked {
            log.checked.insert(cmd_id);
        } else {
            log.checked.remove(&cmd_id);
        }
    }
}

// ============================================================================
// RecordingEngine
// ============================================================================

/// 렉서 라이브러리 로드 요청 기록
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    loaded: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.borrow().clone()
    }
}

impl LexerEngine for RecordingEngine {
    fn load_lexer_library(&mut self, path: &Path) {
        self.loaded.borrow_mut().push(path.to_path_buf());
    }
}
