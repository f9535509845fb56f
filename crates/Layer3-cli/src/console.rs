//! Console collaborators - 터미널용 HostUi / LexerEngine

use plume_core::plugin::CallSite;
use plume_core::{HostUi, LexerEngine, MenuId, PluginManager};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

// ============================================================================
// ConsoleUi
// ============================================================================

#[derive(Debug, Clone)]
enum MenuNode {
    Item { cmd_id: u32, label: String, checked: bool },
    Separator,
    Submenu { menu: MenuId, title: String },
}

#[derive(Debug, Default)]
struct MenuTree {
    root: Option<(MenuId, String)>,
    menus: HashMap<MenuId, Vec<MenuNode>>,
    next_menu: u32,
}

impl MenuTree {
    fn new_menu(&mut self) -> MenuId {
        self.next_menu += 1;
        let menu = MenuId(self.next_menu);
        self.menus.insert(menu, Vec::new());
        menu
    }

    fn insert(&mut self, menu: MenuId, position: usize, node: MenuNode) {
        let nodes = self.menus.entry(menu).or_default();
        let position = position.min(nodes.len());
        nodes.insert(position, node);
    }
}

/// 터미널 UI (메뉴 트리를 기억하고 삭제 확인은 stdin 으로 묻는다)
#[derive(Debug, Clone, Default)]
pub struct ConsoleUi {
    tree: Rc<RefCell<MenuTree>>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 메뉴 트리 출력
    pub fn print_menu(&self) {
        let tree = self.tree.borrow();
        let Some((root, title)) = &tree.root else {
            println!("(menu not set up)");
            return;
        };
        println!("{}", title.replace('&', ""));
        print_nodes(&tree, *root, 1);
    }
}

fn print_nodes(tree: &MenuTree, menu: MenuId, depth: usize) {
    let indent = "  ".repeat(depth);
    for node in tree.menus.get(&menu).map(Vec::as_slice).unwrap_or_default() {
        match node {
            MenuNode::Item {
                cmd_id,
                label,
                checked,
            } => {
                let mark = if *checked { "[x] " } else { "" };
                println!("{}{}{}  ({})", indent, mark, label.replace('\t', "    "), cmd_id);
            }
            MenuNode::Separator => println!("{}──────", indent),
            MenuNode::Submenu { menu, title } => {
                println!("{}{} ▸", indent, title);
                print_nodes(tree, *menu, depth + 1);
            }
        }
    }
}

impl HostUi for ConsoleUi {
    fn confirm_remove_incompatible(&mut self, plugin_path: &Path, message: &str) -> bool {
        println!("\n{}\n  ({})", message, plugin_path.display());
        print!("Remove? [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn plugin_exception_alert(&mut self, plugin: &str, message: &str) {
        eprintln!("✗ {} Exception: {}", plugin, message);
    }

    fn plugin_crash_alert(&mut self, plugin: &str, site: &CallSite) {
        eprintln!(
            "✗ {} crashed\n  {}\n  The plugin was isolated; the host keeps running.",
            plugin, site
        );
    }

    fn create_root_menu(&mut self, title: &str) -> MenuId {
        let mut tree = self.tree.borrow_mut();
        let menu = tree.new_menu();
        tree.root = Some((menu, title.to_string()));
        menu
    }

    fn create_submenu(&mut self, parent: MenuId, position: usize, title: &str) -> MenuId {
        let mut tree = self.tree.borrow_mut();
        let menu = tree.new_menu();
        tree.insert(
            parent,
            position,
            MenuNode::Submenu {
                menu,
                title: title.to_string(),
            },
        );
        menu
    }

    fn insert_item(&mut self, menu: MenuId, position: usize, cmd_id: u32, label: &str) {
        self.tree.borrow_mut().insert(
            menu,
            position,
            MenuNode::Item {
                cmd_id,
                label: label.to_string(),
                checked: false,
            },
        );
    }

    fn insert_separator(&mut self, menu: MenuId, position: usize) {
        self.tree
            .borrow_mut()
            .insert(menu, position, MenuNode::Separator);
    }

    fn check_item(&mut self, cmd_id: u32, checked: bool) {
        let mut tree = self.tree.borrow_mut();
        for node in tree.menus.values_mut().flatten() {
            if let MenuNode::Item {
                cmd_id: id,
                checked: state,
                ..
            } = node
            {
                if *id == cmd_id {
                    *state = checked;
                }
            }
        }
    }
}

// ============================================================================
// ConsoleEngine
// ============================================================================

/// 렌더링 엔진 없이 렉서 라이브러리 등록만 알린다
#[derive(Debug, Default)]
pub struct ConsoleEngine;

impl LexerEngine for ConsoleEngine {
    fn load_lexer_library(&mut self, path: &Path) {
        println!("Lexer library: {}", path.display());
    }
}

// ============================================================================
// 출력
// ============================================================================

pub fn print_listing(manager: &PluginManager, ui: &ConsoleUi) {
    println!("Plugins ({}):", manager.len());
    for summary in manager.summaries() {
        let state = if summary.loaded { "" } else { " (unloaded)" };
        let lexer = if summary.lexer_provider { " [lexer]" } else { "" };
        println!(
            "  {}. {} - {} ({} command(s)){}{}",
            summary.index, summary.file_name, summary.display_name, summary.commands, lexer, state
        );
    }

    let inventory = manager.inventory();
    if !inventory.is_empty() {
        println!("\nDiscovered folders ({}):", inventory.len());
        for plugin in inventory.entries() {
            let mark = if plugin.has_binary() { "✓" } else { "✗" };
            println!("  {} {}", mark, plugin.binary_path.display());
        }
    }

    println!();
    ui.print_menu();

    let shortcuts: Vec<_> = manager
        .registry()
        .shortcuts()
        .iter()
        .filter(|slot| slot.is_enabled())
        .collect();
    if !shortcuts.is_empty() {
        println!("\nShortcuts:");
        for slot in shortcuts {
            println!(
                "  {:<20} {} ({}, {})",
                slot.shortcut.to_string(),
                slot.label,
                slot.module_name,
                slot.cmd_id
            );
        }
    }
}

pub fn print_json(manager: &PluginManager) -> anyhow::Result<()> {
    let listing = serde_json::json!({
        "plugins": manager.summaries(),
        "inventory": manager.inventory().entries(),
        "commands": manager.registry().commands(),
        "shortcuts": manager.registry().shortcuts(),
        "languages": manager.languages().languages(),
    });
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
