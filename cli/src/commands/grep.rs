use std::io::{stdout, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::{arg, value_parser, ArgMatches, Command};
use yansi::Color::{Green, Magenta, Red};
use yansi::Paint;

use retrace::Pattern;

use crate::config::Config;
use crate::help;

pub fn grep() -> Command {
    super::command("grep")
        .about("Print the lines that match a pattern")
        .long_about(help::GREP_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Pattern to search for"))
        .arg(
            arg!([FILE]...)
                .help("Files to search. Reads stdin if none is given")
                .value_parser(value_parser!(PathBuf)),
        )
        .args(super::flag_args())
        .arg(arg!(-c --count "Print only the number of matching lines"))
        .arg(
            arg!(-n --"line-number")
                .help("Print the line number before each line"),
        )
        .arg(
            arg!(-o --"only-matching")
                .help("Print only the matched parts of each line"),
        )
}

struct GrepOptions {
    count: bool,
    line_number: bool,
    only_matching: bool,
    color: bool,
    show_path: bool,
}

pub fn exec_grep(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = super::compile_pattern(args, &config.engine)?;

    let files: Vec<&PathBuf> = args
        .get_many::<PathBuf>("FILE")
        .map(|files| files.collect())
        .unwrap_or_default();

    let options = GrepOptions {
        count: args.get_flag("count"),
        line_number: args.get_flag("line-number") || config.grep.line_number,
        only_matching: args.get_flag("only-matching"),
        color: config.grep.color,
        show_path: files.len() > 1,
    };

    let mut out = BufWriter::new(stdout().lock());

    if files.is_empty() {
        let text = super::read_input(None)?;
        grep_text(&pattern, &text, None, &options, &mut out)?;
    } else {
        for path in files {
            let text = super::read_input(Some(path))?;
            let path = Some(path.as_path());
            grep_text(&pattern, &text, path, &options, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn grep_text<W: Write>(
    pattern: &Pattern,
    text: &str,
    path: Option<&Path>,
    options: &GrepOptions,
    out: &mut W,
) -> anyhow::Result<()> {
    let path = path.filter(|_| options.show_path);
    let mut matching_lines = 0;

    for (index, line) in text.lines().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        let mut matcher = pattern.matcher_for_chars(&chars);
        let spans: Vec<Range<usize>> = matcher.find_all().collect();

        if spans.is_empty() {
            continue;
        }

        matching_lines += 1;

        if options.count {
            continue;
        }

        let mut prefix = String::new();

        if let Some(path) = path {
            let path = path.display().to_string();
            prefix.push_str(&paint(&path, Magenta, options));
            prefix.push(':');
        }

        if options.line_number {
            let number = (index + 1).to_string();
            prefix.push_str(&paint(&number, Green, options));
            prefix.push(':');
        }

        if options.only_matching {
            for span in spans.into_iter().filter(|span| !span.is_empty()) {
                let found: String = chars[span].iter().collect();
                writeln!(out, "{}{}", prefix, paint(&found, Red, options))?;
            }
            continue;
        }

        let mut highlighted = prefix;
        let mut last = 0;

        for span in spans {
            highlighted.extend(&chars[last..span.start]);
            let found: String = chars[span.clone()].iter().collect();
            highlighted.push_str(&paint(&found, Red, options));
            last = span.end;
        }

        highlighted.extend(&chars[last..]);
        writeln!(out, "{}", highlighted)?;
    }

    if options.count {
        match path {
            Some(path) => {
                writeln!(out, "{}:{}", path.display(), matching_lines)?
            }
            None => writeln!(out, "{}", matching_lines)?,
        }
    }

    Ok(())
}

fn paint(text: &str, color: yansi::Color, options: &GrepOptions) -> String {
    if options.color && !text.is_empty() {
        text.paint(color).bold().to_string()
    } else {
        text.to_string()
    }
}
