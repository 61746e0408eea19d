use uuid::Uuid;

use super::{is_none_token, usage_error, CommandDefinition, Flags};
use crate::cli::context::{
    parse_amount, parse_date, short_id, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::ledger::{Frequency, PlanInput};

const USAGE: &str = "plan <add|edit|delete|list|materialize|skip|due> ...";
const ADD_USAGE: &str = "plan add <category> <amount> <daily|monthly> <first-due YYYY-MM-DD> \
     [--account <account>] [--note <text>]";
const EDIT_USAGE: &str = "plan edit <id> [--category <category>] [--amount <amount>] \
     [--frequency <daily|monthly>] [--due YYYY-MM-DD] [--account <account|none>] [--note <text>]";
const OPTIONS: &[&str] = &["account", "note", "category", "amount", "frequency", "due"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "plan",
        "Manage recurring plans and post or skip their occurrences",
        USAGE,
        cmd_plan,
    )]
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    let owner = context.require_user()?;
    match sub.to_lowercase().as_str() {
        "add" => add(context, owner, rest),
        "edit" => edit(context, owner, rest),
        "delete" => {
            let plan = single_plan(context, owner, rest, "plan delete <id>")?;
            context.tracker.plans().delete(plan)?;
            io::print_success(format!("Plan {} deleted.", short_id(plan)));
            Ok(())
        }
        "list" => list(context, owner),
        "materialize" => {
            let plan = single_plan(context, owner, rest, "plan materialize <id>")?;
            let txn = context.tracker.materialize_plan(plan)?;
            let next = context.tracker.plans().get(plan)?.upcoming_date;
            io::print_success(format!(
                "Posted {} dated {} ({}). Next due {}.",
                context.money(txn.amount),
                txn.date,
                short_id(txn.id),
                next
            ));
            Ok(())
        }
        "skip" => {
            let plan = single_plan(context, owner, rest, "plan skip <id>")?;
            let updated = context.tracker.skip_plan(plan)?;
            io::print_success(format!(
                "Occurrence skipped. Next due {}.",
                updated.upcoming_date
            ));
            Ok(())
        }
        "due" => {
            if rest.is_empty() {
                return due_now(context, owner);
            }
            let plan = single_plan(context, owner, rest, "plan due [id]")?;
            io::print_info(context.tracker.get_due_status(plan)?.to_string());
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown plan subcommand `{other}`"
        ))),
    }
}

fn single_plan(
    context: &ShellContext,
    owner: Uuid,
    args: &[&str],
    usage: &str,
) -> Result<Uuid, CommandError> {
    let [token] = args else {
        return Err(usage_error(usage));
    };
    Ok(context.resolve_plan(owner, token)?.id)
}

fn add(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let flags = Flags::parse(args, OPTIONS)?;
    let [category, amount, frequency, due] = flags.positional.as_slice() else {
        return Err(usage_error(ADD_USAGE));
    };
    let account_id = match flags.get("account") {
        Some(token) => Some(context.resolve_account(owner, token)?.id),
        None => None,
    };
    let input = PlanInput {
        owner_id: owner,
        category_id: context.resolve_category(category)?.id,
        account_id,
        amount: parse_amount(amount)?,
        description: flags.get("note").unwrap_or_default().to_string(),
        frequency: Frequency::from(*frequency),
        upcoming_date: parse_date(due)?,
    };
    let plan = context.tracker.plans().create(input)?;
    io::print_success(format!(
        "Plan {} created, first due {}.",
        short_id(plan.id),
        plan.upcoming_date
    ));
    Ok(())
}

fn edit(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let flags = Flags::parse(args, OPTIONS)?;
    let [token] = flags.positional.as_slice() else {
        return Err(usage_error(EDIT_USAGE));
    };
    let plan = context.resolve_plan(owner, token)?;
    let mut input = PlanInput {
        owner_id: plan.owner_id,
        category_id: plan.category_id,
        account_id: plan.account_id,
        amount: plan.amount,
        description: plan.description.clone(),
        frequency: plan.frequency.clone(),
        upcoming_date: plan.upcoming_date,
    };
    if let Some(raw) = flags.get("category") {
        input.category_id = context.resolve_category(raw)?.id;
    }
    if let Some(raw) = flags.get("amount") {
        input.amount = parse_amount(raw)?;
    }
    if let Some(raw) = flags.get("frequency") {
        input.frequency = Frequency::from(raw);
    }
    if let Some(raw) = flags.get("due") {
        input.upcoming_date = parse_date(raw)?;
    }
    if let Some(raw) = flags.get("account") {
        input.account_id = if is_none_token(raw) {
            None
        } else {
            Some(context.resolve_account(owner, raw)?.id)
        };
    }
    if let Some(note) = flags.get("note") {
        input.description = note.to_string();
    }
    let updated = context.tracker.plans().edit(plan.id, input)?;
    io::print_success(format!(
        "Plan {} updated, next due {}.",
        short_id(updated.id),
        updated.upcoming_date
    ));
    Ok(())
}

fn list(context: &mut ShellContext, owner: Uuid) -> CommandResult {
    let plans = context.tracker.plans().list(owner)?;
    if plans.is_empty() {
        io::print_info("No recurring plans yet.");
        return Ok(());
    }
    let snapshot = context.store.snapshot()?;
    io::print_section("Recurring plans");
    for (plan, status) in plans {
        let category = snapshot
            .categories
            .get(&plan.category_id)
            .map(|category| category.name.as_str())
            .unwrap_or("?");
        let line = format!(
            "{}  {:<14} {:>12} {:<8} {}  {}",
            short_id(plan.id),
            category,
            context.money(plan.amount),
            plan.frequency.to_string(),
            plan.upcoming_date,
            status
        );
        if status.is_overdue() {
            io::print_warning(line);
        } else {
            io::print_info(line);
        }
    }
    Ok(())
}

fn due_now(context: &mut ShellContext, owner: Uuid) -> CommandResult {
    let due: Vec<_> = context
        .tracker
        .schedule()
        .due_plans()?
        .into_iter()
        .filter(|plan| plan.owner_id == owner)
        .collect();
    if due.is_empty() {
        io::print_info("Nothing is due.");
        return Ok(());
    }
    io::print_section("Due plans");
    for plan in due {
        let status = context.tracker.schedule().classify(&plan);
        io::print_info(format!(
            "{}  {} {}  {}",
            short_id(plan.id),
            context.money(plan.amount),
            plan.upcoming_date,
            status
        ));
    }
    Ok(())
}
