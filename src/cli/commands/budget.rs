use uuid::Uuid;

use super::{usage_error, CommandDefinition};
use crate::cli::context::{parse_amount, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::core::AlertOutcome;

const USAGE: &str = "budget <add <category> <amount> [month year]|edit <id> <amount>|delete <id>|list [month year]|progress [month year]>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "budget",
            "Manage monthly category budgets",
            USAGE,
            cmd_budget,
        ),
        CommandDefinition::new(
            "sweep",
            "Check budgets of a period and send threshold alerts",
            "sweep [month year]",
            cmd_sweep,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    let owner = context.require_user()?;
    match sub.to_lowercase().as_str() {
        "add" => {
            let [category, amount, period @ ..] = rest else {
                return Err(usage_error("budget add <category> <amount> [month year]"));
            };
            let (month, year) = context.period_args(period)?;
            let category = context.resolve_category(category)?;
            let budget = context.tracker.budgets().create(
                owner,
                category.id,
                month,
                year,
                parse_amount(amount)?,
            )?;
            io::print_success(format!(
                "Budget {} for `{}` in {:02}/{} set to {}.",
                short_id(budget.id),
                category.name,
                month,
                year,
                context.money(budget.amount)
            ));
            Ok(())
        }
        "edit" => {
            let [token, amount] = rest else {
                return Err(usage_error("budget edit <id> <amount>"));
            };
            let budget = context.resolve_budget(owner, token)?;
            let updated = context
                .tracker
                .budgets()
                .update(budget.id, parse_amount(amount)?)?;
            io::print_success(format!(
                "Budget {} set to {}.",
                short_id(updated.id),
                context.money(updated.amount)
            ));
            Ok(())
        }
        "delete" => {
            let [token] = rest else {
                return Err(usage_error("budget delete <id>"));
            };
            let budget = context.resolve_budget(owner, token)?;
            context.tracker.budgets().delete(budget.id)?;
            io::print_success(format!("Budget {} deleted.", short_id(budget.id)));
            Ok(())
        }
        "list" => list(context, owner, rest),
        "progress" => progress(context, owner, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown budget subcommand `{other}`"
        ))),
    }
}

fn list(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let (month, year) = context.period_args(args)?;
    let budgets = context.tracker.budgets().list(owner, month, year)?;
    if budgets.is_empty() {
        io::print_info(format!("No budgets for {month:02}/{year}."));
        return Ok(());
    }
    io::print_section(format!("Budgets {month:02}/{year}"));
    for budget in budgets {
        let category = context.tracker.categories().get(budget.category_id)?;
        io::print_info(format!(
            "{}  {:<14} {:>12}  {}",
            short_id(budget.id),
            category.name,
            context.money(budget.amount),
            if budget.alert_sent { "alert sent" } else { "" }
        ));
    }
    Ok(())
}

fn progress(context: &mut ShellContext, owner: Uuid, args: &[&str]) -> CommandResult {
    let (month, year) = context.period_args(args)?;
    let rows = context.tracker.budgets().progress(owner, month, year)?;
    if rows.is_empty() {
        io::print_info(format!("No budgets for {month:02}/{year}."));
        return Ok(());
    }
    io::print_section(format!("Budget progress {month:02}/{year}"));
    for row in rows {
        let line = format!(
            "{:<14} {:>12} of {:>12}  {:>7.2}%",
            row.category_name,
            context.money(row.spent),
            context.money(row.budgeted),
            row.percent_used
        );
        if row.over_budget {
            io::print_warning(format!("{line}  over budget"));
        } else {
            io::print_info(line);
        }
    }
    Ok(())
}

fn cmd_sweep(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (month, year) = context.period_args(args)?;
    let report = context.tracker.run_budget_sweep(month, year)?;
    for check in &report.checks {
        match &check.outcome {
            AlertOutcome::Sent => {
                io::print_success(format!("Alert sent for budget {}.", short_id(check.budget_id)))
            }
            AlertOutcome::SentFlagNotSaved(reason) => io::print_warning(format!(
                "Alert sent for budget {} but not recorded: {reason}",
                short_id(check.budget_id)
            )),
            AlertOutcome::Failed(reason) => io::print_error(format!(
                "Budget {} not checked: {reason}",
                short_id(check.budget_id)
            )),
            AlertOutcome::AlreadySent | AlertOutcome::BelowThreshold => {}
        }
    }
    io::print_info(format!(
        "Sweep {:02}/{} checked {} budget(s), sent {} alert(s), {} failure(s).",
        month,
        year,
        report.checks.len(),
        report.sent(),
        report.failed()
    ));
    Ok(())
}
