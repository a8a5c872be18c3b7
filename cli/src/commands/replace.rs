use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, value_parser, ArgMatches, Command};

use retrace::Replacer;

use crate::config::Config;
use crate::help;

pub fn replace() -> Command {
    super::command("replace")
        .about("Replace the matches of a pattern")
        .long_about(help::REPLACE_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Pattern to search for"))
        .arg(arg!(<TEMPLATE>).help("Replacement for each match"))
        .arg(
            arg!([FILE])
                .help("File to read the text from. Reads stdin if omitted")
                .value_parser(value_parser!(PathBuf)),
        )
        .args(super::flag_args())
        .arg(
            arg!(--literal)
                .help("Use the template as is, without expanding groups"),
        )
        .arg(
            arg!(--limit <N> "Replace at most N matches")
                .value_parser(value_parser!(usize)),
        )
}

pub fn exec_replace(
    args: &ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let pattern = super::compile_pattern(args, &config.engine)?;
    let template = args.get_one::<String>("TEMPLATE").unwrap();

    let replacer = if args.get_flag("literal") {
        Replacer::literal(pattern, template.as_str())
    } else {
        Replacer::new(pattern, template)
            .with_context(|| format!("invalid template `{}`", template))?
    };

    let text = super::read_input(args.get_one::<PathBuf>("FILE"))?;
    let mut out = BufWriter::new(stdout().lock());

    match args.get_one::<usize>("limit") {
        Some(limit) => {
            out.write_all(replacer.replace_n(&text, *limit).as_bytes())?
        }
        None => {
            replacer.replace_to_writer(&text, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
