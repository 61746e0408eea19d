use uuid::Uuid;

use super::{is_none_token, usage_error, CommandDefinition, Flags};
use crate::cli::context::{
    parse_amount, parse_date, short_id, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::ledger::TransactionInput;

const USAGE: &str = "txn <post|edit|delete|list> ...";
const POST_USAGE: &str =
    "txn post <category> <amount> [--account <account>] [--date YYYY-MM-DD] [--note <text>]";
const EDIT_USAGE: &str = "txn edit <id> [--category <category>] [--amount <amount>] \
     [--account <account|none>] [--date YYYY-MM-DD] [--note <text>]";
const OPTIONS: &[&str] = &["account", "date", "note", "category", "amount"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "txn",
        "Post, edit, delete and list transactions",
        USAGE,
        cmd_txn,
    )]
}

fn cmd_txn(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    let owner = context.require_user()?;
    match sub.to_lowercase().as_str() {
        "post" => post(context, owner, rest),
        "edit" => edit(context, owner, rest),
        "delete" => {
            let [token] = rest else {
                return Err(usage_error("txn delete <id>"));
            };
            let txn = context.resolve_transaction(owner, token)?;
            context.tracker.delete_transaction(txn.id)?;
            io::print_success(format!("Transaction {} deleted.", short_id(txn.id)));
            Ok(())
        }
        "list" => list(context, owner),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown txn subcommand `{other}`"
        ))),
    }
}

fn post(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let flags = Flags::parse(args, OPTIONS)?;
    let [category, amount] = flags.positional.as_slice() else {
        return Err(usage_error(POST_USAGE));
    };
    let category = context.resolve_category(category)?;
    let date = match flags.get("date") {
        Some(raw) => parse_date(raw)?,
        None => context.today(),
    };
    let mut input = TransactionInput::new(owner, category.id, parse_amount(amount)?, date)
        .with_description(flags.get("note").unwrap_or_default());
    if let Some(token) = flags.get("account") {
        input = input.with_account(context.resolve_account(owner, token)?.id);
    }
    let txn = context.tracker.post_transaction(input)?;
    io::print_success(format!(
        "Posted {} {} on {} ({}).",
        category.name,
        context.money(txn.amount),
        txn.date,
        short_id(txn.id)
    ));
    Ok(())
}

fn edit(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let flags = Flags::parse(args, OPTIONS)?;
    let [token] = flags.positional.as_slice() else {
        return Err(usage_error(EDIT_USAGE));
    };
    let current = context.resolve_transaction(owner, token)?;
    let mut input = TransactionInput::from(&current);
    if let Some(raw) = flags.get("category") {
        input.category_id = context.resolve_category(raw)?.id;
    }
    if let Some(raw) = flags.get("amount") {
        input.amount = parse_amount(raw)?;
    }
    if let Some(raw) = flags.get("account") {
        input.account_id = if is_none_token(raw) {
            None
        } else {
            Some(context.resolve_account(owner, raw)?.id)
        };
    }
    if let Some(raw) = flags.get("date") {
        input.date = parse_date(raw)?;
    }
    if let Some(note) = flags.get("note") {
        input.description = note.to_string();
    }
    let updated = context.tracker.update_transaction(current.id, input)?;
    io::print_success(format!(
        "Transaction {} updated ({}).",
        short_id(updated.id),
        context.money(updated.amount)
    ));
    Ok(())
}

fn list(context: &mut ShellContext, owner: Uuid) -> CommandResult {
    let transactions = context.tracker.transactions().list(owner)?;
    if transactions.is_empty() {
        io::print_info("No transactions yet.");
        return Ok(());
    }
    let snapshot = context.store.snapshot()?;
    io::print_section("Transactions");
    for txn in transactions {
        let category = snapshot
            .categories
            .get(&txn.category_id)
            .map(|category| category.name.as_str())
            .unwrap_or("?");
        let account = txn
            .account_id
            .and_then(|id| snapshot.accounts.get(&id))
            .map(|account| account.name.as_str())
            .unwrap_or("unbanked");
        io::print_info(format!(
            "{}  {}  {:<14} {:<12} {:>12}  {}",
            short_id(txn.id),
            txn.date,
            category,
            account,
            context.money(txn.amount),
            txn.description
        ));
    }
    Ok(())
}
