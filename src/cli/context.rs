//! Shell state, dispatch, and the lookups commands share.

use std::{env, io, path::PathBuf, str::FromStr, sync::Arc};

use chrono::{Datelike, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use rust_decimal::Decimal;
use strsim::levenshtein;
use uuid::Uuid;

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::io as cli_io;
use crate::{
    config::{Config, ConfigManager},
    core::{AlertSettings, Tracker},
    errors::LedgerError,
    ledger::{
        Account, Budget, Calendar, Category, FixedCalendar, RecurringPlan, SystemCalendar,
        Transaction, User,
    },
    notify::Outbox,
    storage::{JsonStorage, MemoryStore, Stores},
};

/// Pins the shell's notion of today, mainly for scripted runs.
pub const TODAY_ENV: &str = "BUDGET_LEDGER_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("input error: {0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No active user. Use `user add` or `user use` first.")]
    NoActiveUser,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub tracker: Tracker,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub active_user: Option<Uuid>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(config.resolve_data_file(config_manager.base_dir()));
        let store = Arc::new(storage.load()?);
        let outbox = Arc::new(Outbox::new());
        let tracker = Tracker::new(
            Stores::shared(Arc::clone(&store)),
            calendar_from_env()?,
            outbox.clone(),
            AlertSettings::from(&config),
        );
        let active_user = match store.snapshot()?.users.values().collect::<Vec<_>>().as_slice() {
            [only] => Some(only.id),
            _ => None,
        };
        tracing::debug!(path = %storage.path().display(), "shell context ready");
        Ok(Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            theme: ColorfulTheme::default(),
            tracker,
            store,
            outbox,
            storage,
            config_manager,
            config,
            active_user,
            last_command: None,
            running: true,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        let user = self
            .active_user
            .and_then(|id| self.store.snapshot().ok()?.users.get(&id).cloned())
            .map(|user| user.username)
            .unwrap_or_else(|| "no user".into());
        format!("budget_ledger ({user}) ⮞ ")
    }

    pub fn today(&self) -> NaiveDate {
        self.tracker.schedule().calendar().today()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Input(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(err) if err.is_partial() => {
                cli_io::print_error(&err.to_string());
                cli_io::print_hint("The operation was only partly applied; review and retry it.");
                Ok(())
            }
            CommandError::Core(err) if err.is_transient() => {
                cli_io::print_error(&err.to_string());
                cli_io::print_hint("Nothing was changed; the operation can be retried.");
                Ok(())
            }
            other => {
                cli_io::print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn require_user(&self) -> Result<Uuid, CommandError> {
        self.active_user.ok_or(CommandError::NoActiveUser)
    }

    pub(crate) fn money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.config.currency_symbol, amount)
    }

    pub(crate) fn resolve_user(&self, token: &str) -> Result<User, CommandError> {
        let users = self.tracker.users().list()?;
        resolve(users, token, "user", |user| user.id, |user| Some(&user.username))
    }

    pub(crate) fn resolve_account(&self, owner: Uuid, token: &str) -> Result<Account, CommandError> {
        let accounts = self.tracker.accounts().list(owner)?;
        resolve(accounts, token, "account", |account| account.id, |account| {
            Some(&account.name)
        })
    }

    pub(crate) fn resolve_category(&self, token: &str) -> Result<Category, CommandError> {
        let categories = self.tracker.categories().list()?;
        resolve(categories, token, "category", |category| category.id, |category| {
            Some(&category.name)
        })
    }

    pub(crate) fn resolve_transaction(
        &self,
        owner: Uuid,
        token: &str,
    ) -> Result<Transaction, CommandError> {
        let transactions = self.tracker.transactions().list(owner)?;
        resolve(transactions, token, "transaction", |txn| txn.id, |_| None)
    }

    pub(crate) fn resolve_plan(&self, owner: Uuid, token: &str) -> Result<RecurringPlan, CommandError> {
        let plans = self
            .tracker
            .plans()
            .list(owner)?
            .into_iter()
            .map(|(plan, _)| plan)
            .collect();
        resolve(plans, token, "plan", |plan| plan.id, |_| None)
    }

    pub(crate) fn resolve_budget(&self, owner: Uuid, token: &str) -> Result<Budget, CommandError> {
        let budgets: Vec<Budget> = self
            .store
            .snapshot()?
            .budgets
            .into_values()
            .filter(|budget| budget.owner_id == owner)
            .collect();
        resolve(budgets, token, "budget", |budget| budget.id, |_| None)
    }

    /// `[month year]` arguments, defaulting to the current period.
    pub(crate) fn period_args(&self, args: &[&str]) -> Result<(u32, i32), CommandError> {
        match args {
            [] => {
                let today = self.today();
                Ok((today.month(), today.year()))
            }
            [month, year] => Ok((parse_value(month, "month")?, parse_value(year, "year")?)),
            _ => Err(CommandError::InvalidArguments(
                "expected no period or `<month> <year>`".into(),
            )),
        }
    }

    /// Replaces the in-memory ledger with the snapshot at `path`.
    pub(crate) fn load_from(&mut self, path: PathBuf) -> CommandResult {
        let state = JsonStorage::new(&path).load_state()?;
        let single_user = match state.users.values().collect::<Vec<_>>().as_slice() {
            [only] => Some(only.id),
            _ => None,
        };
        self.store.restore(state)?;
        self.active_user = single_user;
        self.storage = JsonStorage::new(path);
        Ok(())
    }
}

fn calendar_from_env() -> Result<Arc<dyn Calendar>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) => {
            let today = parse_date(&raw).map_err(|err| CliError::Input(err.to_string()))?;
            Ok(Arc::new(FixedCalendar::new(today)))
        }
        Err(_) => Ok(Arc::new(SystemCalendar)),
    }
}

/// Finds one item by exact name (ignoring case) or by a unique id prefix.
fn resolve<T>(
    items: Vec<T>,
    token: &str,
    what: &str,
    id: impl Fn(&T) -> Uuid,
    name: impl Fn(&T) -> Option<&String>,
) -> Result<T, CommandError> {
    let needle = token.trim().to_lowercase();
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(format!("{what} is required")));
    }
    let mut matches: Vec<T> = Vec::new();
    for item in items {
        let by_name = name(&item).is_some_and(|name| name.to_lowercase() == needle);
        if by_name {
            return Ok(item);
        }
        if id(&item).simple().to_string().starts_with(&needle.replace('-', ""))
            || id(&item).to_string().starts_with(&needle)
        {
            matches.push(item);
        }
    }
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(CommandError::InvalidArguments(format!(
            "no {what} matches `{token}`"
        ))),
        n => Err(CommandError::InvalidArguments(format!(
            "`{token}` matches {n} {what} entries; use a longer id"
        ))),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(input.trim())
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_value<T: FromStr>(input: &str, what: &str) -> Result<T, CommandError> {
    input
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid {what} `{input}`")))
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}
