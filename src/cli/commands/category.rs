use super::{usage_error, CommandDefinition};
use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::ledger::CategoryKind;

const USAGE: &str = "category <add <name> <income|expense|transfer>|list|enable <category>|disable <category>>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "category",
        "Manage shared categories",
        USAGE,
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    match sub.to_lowercase().as_str() {
        "add" => {
            let [name, kind] = rest else {
                return Err(usage_error("category add <name> <income|expense|transfer>"));
            };
            let kind = kind
                .parse::<CategoryKind>()
                .map_err(CommandError::InvalidArguments)?;
            let category = context.tracker.categories().create(name, kind)?;
            io::print_success(format!(
                "Category `{}` created ({}).",
                category.name,
                short_id(category.id)
            ));
            Ok(())
        }
        "list" => {
            let categories = context.tracker.categories().list()?;
            if categories.is_empty() {
                io::print_info("No categories yet.");
                return Ok(());
            }
            io::print_section("Categories");
            for category in categories {
                io::print_info(format!(
                    "{}  {:<16} {:<8} {}",
                    short_id(category.id),
                    category.name,
                    format!("{:?}", category.kind).to_uppercase(),
                    if category.enabled { "" } else { "(disabled)" }
                ));
            }
            Ok(())
        }
        toggle @ ("enable" | "disable") => {
            let [token] = rest else {
                return Err(usage_error(USAGE));
            };
            let category = context.resolve_category(token)?;
            let enabled = toggle == "enable";
            context
                .tracker
                .categories()
                .set_enabled(category.id, enabled)?;
            io::print_success(format!("Category `{}` {toggle}d.", category.name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category subcommand `{other}`"
        ))),
    }
}
