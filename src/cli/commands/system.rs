use std::path::PathBuf;

use super::{usage_error, CommandDefinition};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::{help, io};
use crate::storage::JsonStorage;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "save",
            "Write the ledger to disk",
            "save [path]",
            cmd_save,
        ),
        CommandDefinition::new(
            "load",
            "Replace the ledger with a saved snapshot",
            "load [path]",
            cmd_load,
        ),
        CommandDefinition::new(
            "outbox",
            "List notifications sent in this session",
            "outbox",
            cmd_outbox,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&name) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    io::print_section(format!("Budget Ledger {}", meta.version));
    io::print_info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    io::print_info(format!("  Built at     : {}", meta.timestamp));
    io::print_info(format!("  Target       : {}", meta.target));
    io::print_info(format!("  Profile      : {}", meta.profile));
    io::print_info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [path] => context.storage = JsonStorage::new(PathBuf::from(path)),
        _ => return Err(usage_error("save [path]")),
    }
    context.storage.save(&context.store)?;
    io::print_success(format!(
        "Ledger saved to {}.",
        context.storage.path().display()
    ));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args {
        [] => context.storage.path().to_path_buf(),
        [path] => PathBuf::from(path),
        _ => return Err(usage_error("load [path]")),
    };
    if !path.exists() {
        return Err(CommandError::InvalidArguments(format!(
            "no ledger file at {}",
            path.display()
        )));
    }
    context.load_from(path)?;
    io::print_success(format!(
        "Ledger loaded from {}.",
        context.storage.path().display()
    ));
    Ok(())
}

fn cmd_outbox(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let messages = context.outbox.messages()?;
    if messages.is_empty() {
        io::print_info("Outbox is empty.");
        return Ok(());
    }
    io::print_section("Outbox");
    for message in messages {
        io::print_info(format!(
            "{}  to {}  {}",
            message.sent_at.format("%Y-%m-%d %H:%M"),
            message.recipient,
            message.subject
        ));
        for line in message.body.lines() {
            io::print_detail(line);
        }
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
