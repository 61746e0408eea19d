use super::{usage_error, CommandDefinition};
use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;

const USAGE: &str = "user <add <username> <email>|list|use <username>>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "user",
        "Create, list and switch users",
        USAGE,
        cmd_user,
    )]
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    match sub.to_lowercase().as_str() {
        "add" => {
            let [username, email] = rest else {
                return Err(usage_error("user add <username> <email>"));
            };
            let user = context.tracker.users().create(username, email)?;
            context.active_user = Some(user.id);
            io::print_success(format!(
                "User `{}` created and selected ({}).",
                user.username,
                short_id(user.id)
            ));
            Ok(())
        }
        "list" => {
            let users = context.tracker.users().list()?;
            if users.is_empty() {
                io::print_info("No users yet.");
                return Ok(());
            }
            io::print_section("Users");
            for user in users {
                let marker = if context.active_user == Some(user.id) {
                    "*"
                } else {
                    " "
                };
                io::print_info(format!(
                    "{marker} {}  {:<16} {}",
                    short_id(user.id),
                    user.username,
                    user.email
                ));
            }
            Ok(())
        }
        "use" => {
            let [username] = rest else {
                return Err(usage_error("user use <username>"));
            };
            let user = context.resolve_user(username)?;
            context.active_user = Some(user.id);
            io::print_success(format!("Now acting as `{}`.", user.username));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown user subcommand `{other}`"
        ))),
    }
}
