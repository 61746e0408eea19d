use rust_decimal::Decimal;

use super::{usage_error, CommandDefinition};
use crate::cli::context::{parse_amount, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::ledger::AccountKind;

const USAGE: &str =
    "account <add <name> <kind> [opening]|list|rename <account> <name> [kind]|delete <account>>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "account",
        "Manage the active user's accounts",
        USAGE,
        cmd_account,
    )]
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    let owner = context.require_user()?;
    match sub.to_lowercase().as_str() {
        "add" => {
            let (name, kind, opening) = match rest {
                [name, kind] => (*name, *kind, Decimal::ZERO),
                [name, kind, opening] => (*name, *kind, parse_amount(opening)?),
                _ => return Err(usage_error("account add <name> <kind> [opening]")),
            };
            let kind = parse_kind(kind)?;
            let account = context
                .tracker
                .accounts()
                .create(owner, name, kind, opening)?;
            io::print_success(format!(
                "Account `{}` created ({}).",
                account.name,
                short_id(account.id)
            ));
            Ok(())
        }
        "list" => {
            let accounts = context.tracker.accounts().list(owner)?;
            if accounts.is_empty() {
                io::print_info("No accounts yet.");
                return Ok(());
            }
            io::print_section("Accounts");
            for account in accounts {
                io::print_info(format!(
                    "{}  {:<16} {:<9} {:>12}",
                    short_id(account.id),
                    account.name,
                    account.kind.to_string(),
                    context.money(account.balance)
                ));
            }
            Ok(())
        }
        "rename" => {
            let (token, name, kind) = match rest {
                [token, name] => (*token, *name, None),
                [token, name, kind] => (*token, *name, Some(parse_kind(kind)?)),
                _ => return Err(usage_error("account rename <account> <name> [kind]")),
            };
            let account = context.resolve_account(owner, token)?;
            let updated = context.tracker.accounts().rename(
                account.id,
                name,
                kind.unwrap_or(account.kind),
            )?;
            io::print_success(format!("Account renamed to `{}`.", updated.name));
            Ok(())
        }
        "delete" => {
            let [token] = rest else {
                return Err(usage_error("account delete <account>"));
            };
            let account = context.resolve_account(owner, token)?;
            context.tracker.accounts().delete(account.id)?;
            io::print_success(format!("Account `{}` deleted.", account.name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown account subcommand `{other}`"
        ))),
    }
}

fn parse_kind(raw: &str) -> Result<AccountKind, CommandError> {
    raw.parse::<AccountKind>()
        .map_err(CommandError::InvalidArguments)
}
