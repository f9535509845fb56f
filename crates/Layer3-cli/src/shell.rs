//! Interactive plugin shell
//!
//! stdin 한 줄씩 명령을 읽어 PluginManager 를 호출한다.
//! `quit` 또는 Ctrl+C 로 종료하면 Shutdown 을 한 번 broadcast 한다.

use plume_core::plugin::HostMessage;
use plume_core::{CallOutcome, Notification, NotificationCode, PluginManager};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::{self, ConsoleUi};

const HELP: &str = "\
Commands:
  list                     plugins, menu and shortcuts
  run <cmd-id>             run a command as a menu click
  call <plugin> <index>    run a command by plugin name and index
  notify <event>           broadcast a notification
  relay <msg> [plugin]     relay a raw message to all plugins or one
  alloc cmd|marker <n>     allocate command ids or markers
  unload <index>           unload a plugin
  shortcut <cmd-id>        show the shortcut of a command
  unmap <cmd-id>           remove the shortcut of a command
  faults                   contained plugin faults
  langs                    external languages
  quit                     shutdown and exit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run(manager: &mut PluginManager, ui: &ConsoleUi) -> anyhow::Result<()> {
    println!("Plume plugin shell - {} plugin(s). Type 'help' for commands.", manager.len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("plume> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = execute(manager, ui, line.trim()) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    crate::shutdown(manager);
    Ok(())
}

fn execute(manager: &mut PluginManager, ui: &ConsoleUi, line: &str) -> Flow {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, rest)) = words.split_first() else {
        return Flow::Continue;
    };

    match (command, rest) {
        ("quit" | "exit", _) => return Flow::Quit,
        ("help", _) => println!("{}", HELP),
        ("list", _) => console::print_listing(manager, ui),
        ("run", [cmd_id]) => match cmd_id.parse::<u32>() {
            Ok(cmd_id) => print_outcome(&format!("command {}", cmd_id), manager.run_command_by_id(cmd_id)),
            Err(_) => println!("Invalid command id: {}", cmd_id),
        },
        ("call", [plugin, index]) => match index.parse::<usize>() {
            Ok(index) => crate::report(plugin, index, manager.run_command_by_name(plugin, index)),
            Err(_) => println!("Invalid index: {}", index),
        },
        ("notify", [event]) => match event.parse::<NotificationCode>() {
            Ok(code) => {
                let host_window = manager.host().host_window;
                let delivered = manager.broadcast(&Notification::host(code, host_window));
                println!("{} delivered to {} plugin(s)", code, delivered);
            }
            Err(e) => println!("{}", e),
        },
        ("relay", [message, target @ ..]) if target.len() <= 1 => match message.parse::<u32>() {
            Ok(message) => {
                let message = HostMessage::new(message, 0, 0);
                match target.first() {
                    Some(plugin) => {
                        let found = manager.relay_to(plugin, &message);
                        println!("{}", if found { "relayed" } else { "no such loaded plugin" });
                    }
                    None => println!("relayed to {} plugin(s)", manager.relay(&message)),
                }
            }
            Err(_) => println!("Invalid message: {}", message),
        },
        ("alloc", [kind, count]) => {
            let Ok(count) = count.parse::<u32>() else {
                println!("Invalid count: {}", count);
                return Flow::Continue;
            };
            let range = match *kind {
                "cmd" => manager.allocate_cmd_id(count),
                "marker" => manager.allocate_marker(count),
                other => {
                    println!("Unknown allocation kind: {}", other);
                    return Flow::Continue;
                }
            };
            match range {
                Some(range) => println!("{}..{}", range.start, range.end),
                None => println!("allocation failed"),
            }
        }
        ("unload", [index]) => match index.parse::<usize>() {
            Ok(index) if manager.unload(index) => println!("unloaded #{}", index),
            Ok(index) => println!("plugin #{} is not loaded", index),
            Err(_) => println!("Invalid index: {}", index),
        },
        ("shortcut", [cmd_id]) => match cmd_id.parse::<u32>() {
            Ok(cmd_id) => match manager.get_shortcut_by_cmd_id(cmd_id) {
                Some(shortcut) => println!("{}", shortcut),
                None => println!("no shortcut"),
            },
            Err(_) => println!("Invalid command id: {}", cmd_id),
        },
        ("unmap", [cmd_id]) => match cmd_id.parse::<u32>() {
            Ok(cmd_id) if manager.remove_shortcut_by_cmd_id(cmd_id) => println!("removed"),
            Ok(_) => println!("no such command"),
            Err(_) => println!("Invalid command id: {}", cmd_id),
        },
        ("faults", _) => {
            if manager.faults().is_empty() {
                println!("no faults");
            }
            for record in manager.faults().records() {
                println!(
                    "{} {} {} at {}: {}",
                    record.timestamp.format("%H:%M:%S"),
                    record.kind,
                    record.plugin,
                    record.site,
                    record.message
                );
            }
        }
        ("langs", _) => {
            let languages = manager.languages();
            println!("{}/{} external language(s)", languages.len(), languages.capacity());
            for language in languages.languages() {
                println!("  {} - {}", language.name, language.status_text);
            }
        }
        _ => println!("Unknown command. Type 'help' for commands."),
    }
    Flow::Continue
}

fn print_outcome(what: &str, outcome: CallOutcome) {
    match outcome {
        CallOutcome::Completed => println!("✓ {} completed", what),
        CallOutcome::Skipped => println!("- {} is not a callable plugin command", what),
        CallOutcome::Faulted(kind) => println!("✗ {} faulted ({})", what, kind),
    }
}
