use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;

use clap::{arg, value_parser, ArgMatches, Command};

use crate::config::Config;
use crate::help;

pub fn split() -> Command {
    super::command("split")
        .about("Split a text at the matches of a pattern")
        .long_about(help::SPLIT_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Pattern that matches the delimiters"))
        .arg(
            arg!([FILE])
                .help("File to read the text from. Reads stdin if omitted")
                .value_parser(value_parser!(PathBuf)),
        )
        .args(super::flag_args())
        .arg(arg!(-e --empty "Print empty tokens too"))
}

pub fn exec_split(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = super::compile_pattern(args, &config.engine)?;
    let text = super::read_input(args.get_one::<PathBuf>("FILE"))?;
    let mut out = BufWriter::new(stdout().lock());

    for token in pattern.tokenizer(&text).allow_empty(args.get_flag("empty"))
    {
        writeln!(out, "{}", token)?;
    }

    out.flush()?;
    Ok(())
}
