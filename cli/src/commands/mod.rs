mod dump;
mod grep;
mod replace;
mod split;

pub use dump::*;
pub use grep::*;
pub use replace::*;
pub use split::*;

use std::fs;
use std::io::{stdin, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{arg, command, crate_authors, Arg, ArgMatches, Command};

use retrace::{Flags, Pattern};

use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::grep(),
            commands::replace(),
            commands::split(),
            commands::dump(),
        ])
}

/// Arguments that select the flags the pattern is compiled with. Shared by
/// every command that compiles a pattern.
fn flag_args() -> Vec<Arg> {
    vec![
        arg!(-i --"ignore-case" "Letters match regardless of their case"),
        arg!(-m --multiline)
            .help("`^` and `$` match at the start and end of every line"),
        arg!(-s --dotall "`.` matches line terminators too"),
        arg!(-x --extended "White space in the pattern is ignored")
            .long_help(help::EXTENDED_LONG_HELP),
        arg!(-u --unicode)
            .help(r"`\w`, `\d`, `\s` and `\b` use Unicode definitions"),
    ]
}

/// Returns the pattern flags selected in the command-line.
fn get_flags(args: &ArgMatches) -> Flags {
    let mut flags = Flags::empty();
    for (arg, flag) in [
        ("ignore-case", Flags::IGNORE_CASE),
        ("multiline", Flags::MULTILINE),
        ("dotall", Flags::DOTALL),
        ("extended", Flags::IGNORE_SPACES),
        ("unicode", Flags::UNICODE),
    ] {
        if args.get_flag(arg) {
            flags |= flag;
        }
    }
    flags
}

/// Compiles the pattern passed in the `PATTERN` argument.
fn compile_pattern(
    args: &ArgMatches,
    config: &retrace::Config,
) -> anyhow::Result<Pattern> {
    let source = args
        .get_one::<String>("PATTERN")
        .ok_or_else(|| anyhow!("missing pattern"))?;

    Pattern::with_config(source, get_flags(args), config)
        .with_context(|| format!("invalid pattern `{}`", source))
}

/// Reads the whole content of a file as text. If no file is given the text
/// is read from stdin.
fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    let mut text = String::new();
    match path {
        Some(path) => {
            text = fs::read_to_string(path).with_context(|| {
                format!("can not read `{}`", path.display())
            })?;
        }
        None => {
            stdin()
                .read_to_string(&mut text)
                .context("can not read from stdin")?;
        }
    }
    Ok(text)
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}
