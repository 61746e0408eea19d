//! One line loop for both the interactive prompt and piped scripts.

use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context as ReadlineContext, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};

use crate::cli::context::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::{self, OutputPreferences};

/// Any value switches the shell to line-by-line stdin processing.
pub const SCRIPT_ENV: &str = "BUDGET_LEDGER_CLI_SCRIPT";

/// Second words offered after each command that takes a subcommand.
const SUBCOMMANDS: &[(&str, &[&str])] = &[
    ("user", &["add", "list", "use"]),
    ("account", &["add", "list", "rename", "delete"]),
    ("category", &["add", "list", "enable", "disable"]),
    ("txn", &["post", "edit", "delete", "list"]),
    (
        "plan",
        &["add", "edit", "delete", "list", "materialize", "skip", "due"],
    ),
    ("budget", &["add", "edit", "delete", "list", "progress"]),
];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    if mode == CliMode::Script {
        output::set_preferences(OutputPreferences { plain: true });
    }

    let mut context = ShellContext::new(mode)?;
    let mut source = LineSource::open(mode, context.command_names())?;

    while context.running {
        let line = match source.read(&context.prompt())? {
            Input::Line(line) => line,
            Input::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Input::Closed => {
                if mode == CliMode::Interactive {
                    output::info("Exiting shell.");
                }
                break;
            }
        };

        let tokens = match split_line(&line) {
            Ok(Some(tokens)) => tokens,
            Ok(None) => continue,
            Err(err) => {
                context.print_warning(&format!("could not parse `{}`: {err}", line.trim()));
                continue;
            }
        };
        source.remember(line.trim());

        match execute(&mut context, line.trim(), &tokens) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                context.report_error(err)?;
                if let Some(number) = source.line_number() {
                    cli_io::print_detail(format!("(script line {number}: {})", line.trim()));
                }
            }
        }
    }
    Ok(())
}

fn execute(
    context: &mut ShellContext,
    line: &str,
    tokens: &[String],
) -> Result<LoopControl, CommandError> {
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());
    tracing::debug!(command = %command, args = args.len(), "dispatching command");

    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tokens of one command line; `None` for blank lines and `#` comments.
pub(crate) fn split_line(line: &str) -> Result<Option<Vec<String>>, shell_words::ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let tokens = shell_words::split(trimmed)?;
    Ok((!tokens.is_empty()).then_some(tokens))
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

enum LineSource {
    Prompt(Box<Editor<LedgerCompleter, DefaultHistory>>),
    Script {
        lines: Lines<StdinLock<'static>>,
        number: usize,
    },
}

impl LineSource {
    fn open(mode: CliMode, commands: Vec<&'static str>) -> Result<Self, CliError> {
        match mode {
            CliMode::Script => Ok(LineSource::Script {
                lines: io::stdin().lock().lines(),
                number: 0,
            }),
            CliMode::Interactive => {
                let mut editor = Editor::<LedgerCompleter, DefaultHistory>::new()?;
                editor.set_helper(Some(LedgerCompleter::new(commands)));
                editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
                Ok(LineSource::Prompt(Box::new(editor)))
            }
        }
    }

    fn read(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self {
            LineSource::Prompt(editor) => match editor.readline(prompt) {
                Ok(line) => Ok(Input::Line(line)),
                Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                Err(ReadlineError::Eof) => Ok(Input::Closed),
                Err(err) => Err(err.into()),
            },
            LineSource::Script { lines, number } => match lines.next() {
                Some(line) => {
                    *number += 1;
                    Ok(Input::Line(line?))
                }
                None => Ok(Input::Closed),
            },
        }
    }

    fn remember(&mut self, line: &str) {
        if let LineSource::Prompt(editor) = self {
            editor.add_history_entry(line).ok();
        }
    }

    fn line_number(&self) -> Option<usize> {
        match self {
            LineSource::Script { number, .. } => Some(*number),
            LineSource::Prompt(_) => None,
        }
    }
}

/// Completes command names, their subcommands, and `help <command>`.
#[derive(Helper, Hinter, Highlighter, Validator)]
struct LedgerCompleter {
    commands: Vec<&'static str>,
}

impl LedgerCompleter {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    /// Start of the word under the cursor and the words that fit there.
    fn suggest(&self, prefix: &str) -> (usize, Vec<&'static str>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let word = prefix[start..].to_ascii_lowercase();
        let before: Vec<String> = prefix[..start]
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();

        let pool: &[&'static str] = match before.as_slice() {
            [] => &self.commands,
            [command] if command == "help" => &self.commands,
            [command] => SUBCOMMANDS
                .iter()
                .find(|(name, _)| name == command)
                .map(|(_, subs)| *subs)
                .unwrap_or(&[]),
            _ => &[],
        };
        let matches = pool
            .iter()
            .copied()
            .filter(|candidate| candidate.starts_with(&word))
            .collect();
        (start, matches)
    }
}

impl Completer for LedgerCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.suggest(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: format!("{word} "),
            })
            .collect();
        Ok((start, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> LedgerCompleter {
        LedgerCompleter::new(vec!["txn", "plan", "help", "budget", "sweep", "plan"])
    }

    #[test]
    fn quoted_note_stays_one_token() {
        let tokens = split_line(r#"txn post Groceries 12.50 --note "weekly shop""#)
            .unwrap()
            .unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[5], "weekly shop");
    }

    #[test]
    fn blank_and_comment_lines_yield_nothing() {
        assert!(split_line("   ").unwrap().is_none());
        assert!(split_line("  # monthly rent setup").unwrap().is_none());
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(split_line("user add \"ana").is_err());
    }

    #[test]
    fn first_word_completes_to_commands() {
        let (start, words) = completer().suggest("pl");
        assert_eq!(start, 0);
        assert_eq!(words, vec!["plan"]);
    }

    #[test]
    fn second_word_completes_to_subcommands() {
        let (start, words) = completer().suggest("plan s");
        assert_eq!(start, 5);
        assert_eq!(words, vec!["skip"]);
        assert_eq!(completer().suggest("BUDGET p").1, vec!["progress"]);
    }

    #[test]
    fn help_completes_command_names_and_arguments_get_nothing() {
        assert_eq!(completer().suggest("help sw").1, vec!["sweep"]);
        assert!(completer().suggest("sweep 3 ").1.is_empty());
        assert!(completer().suggest("txn post Gro").1.is_empty());
    }
}
