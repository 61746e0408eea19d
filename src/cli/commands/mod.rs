use std::collections::HashMap;

pub mod account;
pub mod budget;
pub mod category;
pub mod plan;
pub mod system;
pub mod transaction;
pub mod user;

use crate::cli::context::{CommandError, CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(user::definitions());
    commands.extend(account::definitions());
    commands.extend(category::definitions());
    commands.extend(transaction::definitions());
    commands.extend(plan::definitions());
    commands.extend(budget::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Positional arguments plus `--flag value` pairs, in any order.
pub(crate) struct Flags<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<String, &'a str>,
}

impl<'a> Flags<'a> {
    pub fn parse(args: &[&'a str], known: &[&str]) -> Result<Self, CommandError> {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if let Some(flag) = arg.strip_prefix("--") {
                let flag = flag.to_lowercase();
                if !known.contains(&flag.as_str()) {
                    return Err(CommandError::InvalidArguments(format!(
                        "unknown option `--{flag}`"
                    )));
                }
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("option `--{flag}` needs a value"))
                })?;
                options.insert(flag, *value);
            } else {
                positional.push(*arg);
            }
        }
        Ok(Self {
            positional,
            options,
        })
    }

    pub fn get(&self, flag: &str) -> Option<&'a str> {
        self.options.get(flag).copied()
    }
}

/// `none` clears an optional reference.
pub(crate) fn is_none_token(value: &str) -> bool {
    value.eq_ignore_ascii_case("none")
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_split_positionals_and_options() {
        let args = ["Groceries", "--account", "Checking", "50"];
        let flags = Flags::parse(&args, &["account", "date"]).unwrap();
        assert_eq!(flags.positional, vec!["Groceries", "50"]);
        assert_eq!(flags.get("account"), Some("Checking"));
        assert_eq!(flags.get("date"), None);
    }

    #[test]
    fn unknown_or_dangling_flags_are_rejected() {
        assert!(Flags::parse(&["--color", "red"], &["account"]).is_err());
        assert!(Flags::parse(&["--account"], &["account"]).is_err());
    }

    #[test]
    fn registry_keeps_definition_order() {
        let registry = CommandRegistry::new(all_definitions());
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names.first(), Some(&"help"));
        assert!(registry.get("plan").is_some());
        assert_eq!(registry.iter().count(), names.len());
    }
}
