use clap::{arg, ArgMatches, Command};

use crate::config::Config;
use crate::help;

pub fn dump() -> Command {
    super::command("dump")
        .about("Show the program a pattern is compiled into")
        .long_about(help::DUMP_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Pattern to compile"))
        .args(super::flag_args())
        .arg(
            arg!(--"no-optimize")
                .help("Show the program before the scan optimizer runs"),
        )
}

pub fn exec_dump(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let mut engine = config.engine.clone();

    if args.get_flag("no-optimize") {
        engine.optimize = false;
    }

    let pattern = super::compile_pattern(args, &engine)?;

    println!("groups: {}", pattern.group_count());
    print!("{}", pattern);

    Ok(())
}
