pub const CONFIG_FILE: &str = r#"Config file for retrace

Specifies a config file which controls the behavior of retrace. If config file is not
specified, ${HOME}/.retrace.toml is used. If it does not exist the default options are
applied.

Example:

[engine]
optimize = true
scan_threshold = 20

[grep]
line_number = false
color = true"#;

pub const DUMP_LONG_HELP: &str = r#"Show the program a pattern is compiled into

Each line is a term of the program, identified by its index. The term that follows
in case of success is shown after `->`, and the one that follows in case of failure
after `|`.

Examples:

rt dump 'a+b'
rt dump --no-optimize '(?i)foo|bar'"#;

pub const EXTENDED_LONG_HELP: &str = r#"Ignore white space in the pattern

White space in the pattern is ignored, unless it is escaped or it appears within a
character class. Combined with `(?#...)` comments this allows writing long patterns
in a readable way."#;

pub const GREP_LONG_HELP: &str = r#"Print the lines that match a pattern

Each line of the input is searched separately, and the matches are highlighted when
the output is a terminal. If no file is given the text is read from stdin.

Examples:

rt grep -n '\bfn\s+\w+' src/main.rs
rt grep -o -i 'error: .*' build.log
cat SOMEFILE | rt grep -c '^$'"#;

pub const REPLACE_LONG_HELP: &str = r#"Replace the matches of a pattern

The template can refer to the text captured by groups with `$1`, `$&` (the whole
match) or `${name}`. A group reference can be prefixed by modifiers that transform
the captured text, like `${/name}` for reversing it. Use `\$` for a literal dollar
sign, or `--literal` for using the template as is.

If no file is given the text is read from stdin.

Examples:

rt replace '(\w+)=(\w+)' '$2=$1' config.ini
rt replace --limit 1 'foo' 'bar' SOMEFILE
echo 'a.b.c' | rt replace --literal '.' '$'"#;

pub const SPLIT_LONG_HELP: &str = r#"Split a text at the matches of a pattern

Each piece of the text between two matches is printed in a separate line. Empty
pieces are skipped unless `--empty` is used. If no file is given the text is read
from stdin.

Examples:

rt split '\s*,\s*' values.csv
echo 'a::b' | rt split --empty ':'"#;
