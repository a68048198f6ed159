//! lineio - Line-oriented file reader and path toolkit
//!
//! Prints the records of plain, CSV, JSON lines and gzip files, and exposes the
//! path string helpers on the command line.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lineio::file_handler::{
    filter_by_extension, list_files, CsvFile, JsonFile, LineCursor, LineFile, LineFlags,
    SortOrder,
};
use lineio::{path, Config};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let matches = cli().get_matches();

    let config_path = matches.get_one::<PathBuf>("config");
    let config = Config::resolve(config_path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match matches.subcommand() {
        Some(("lines", args)) => run_lines(&config, args, &mut out)?,
        Some(("count", args)) => {
            let mut file = open_line_file(&config, file_arg(args))?;
            writeln!(out, "{}", file.count_lines()?)?;
        }
        Some(("size", args)) => {
            let mut file = open_line_file(&config, file_arg(args))?;
            file.set_size_estimator(Box::new(config.size_estimator()));
            let estimate = file.size()?;
            let marker = if estimate.exact { "" } else { " (estimated)" };
            writeln!(out, "{}{}", estimate.size, marker)?;
        }
        Some(("header", args)) => {
            let mut csv = open_csv_file(&config, args)?;
            writeln!(out, "{}", serde_json::to_string(&csv.header_fields()?)?)?;
        }
        Some(("path", args)) => run_path(args, &mut out)?,
        Some(("list", args)) => run_list(args, &mut out)?,
        _ => bail!("A subcommand is required"),
    }

    out.flush()?;
    Ok(())
}

fn cli() -> Command {
    let file = Arg::new("file")
        .help("Path to the file to read")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);

    let delimiter_args = [
        Arg::new("delimiter")
            .long("delimiter")
            .help("CSV delimiter character")
            .conflicts_with("detect-delimiter"),
        Arg::new("detect-delimiter")
            .long("detect-delimiter")
            .help("Detect the CSV delimiter from the first line")
            .action(ArgAction::SetTrue),
    ];

    Command::new("lineio")
        .version(lineio::VERSION)
        .about("Line-oriented reader for plain, CSV, JSON lines and gzip files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Configuration file (defaults to the platform config folder)")
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("lines")
                .about("Print the records of a file")
                .arg(file.clone())
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .help("Tokenize lines as CSV and print each row as a JSON array")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("json"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print valid JSON objects, skipping other lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-empty")
                        .long("keep-empty")
                        .help("Do not skip empty lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-newlines")
                        .long("keep-newlines")
                        .help("Keep line terminators")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("remove-bom")
                        .long("remove-bom")
                        .help("Strip a leading byte order mark")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("skip-header")
                        .long("skip-header")
                        .help("Skip the CSV header row")
                        .action(ArgAction::SetTrue)
                        .requires("csv"),
                )
                .args(delimiter_args.clone()),
        )
        .subcommand(
            Command::new("count")
                .about("Count the lines of a file")
                .arg(file.clone()),
        )
        .subcommand(
            Command::new("size")
                .about("Print the uncompressed size of a file")
                .arg(file.clone()),
        )
        .subcommand(
            Command::new("header")
                .about("Print the CSV header fields as a JSON array")
                .arg(file)
                .args(delimiter_args),
        )
        .subcommand(path_command())
        .subcommand(
            Command::new("list")
                .about("List files below a directory")
                .arg(
                    Arg::new("dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .help("Keep only files with this extension (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .help("Sort in descending order")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn path_command() -> Command {
    let positional = |name: &'static str, index: usize| Arg::new(name).required(true).index(index);
    let levels = Arg::new("levels")
        .long("levels")
        .default_value("1")
        .value_parser(value_parser!(usize));
    let from_start = Arg::new("from-start")
        .long("from-start")
        .help("Count levels from the start of the path")
        .action(ArgAction::SetTrue);

    Command::new("path")
        .about("Path string helpers")
        .subcommand_required(true)
        .subcommand(
            Command::new("normalize")
                .arg(positional("path", 1))
                .arg(
                    Arg::new("no-leading")
                        .long("no-leading")
                        .help("Do not prepend a separator")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("build").arg(
                Arg::new("elements")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            ),
        )
        .subcommand(
            Command::new("dirname")
                .arg(positional("path", 1))
                .arg(levels.clone())
                .arg(from_start.clone()),
        )
        .subcommand(
            Command::new("element")
                .arg(positional("path", 1))
                .arg(levels)
                .arg(from_start),
        )
        .subcommand(
            Command::new("relative")
                .arg(positional("full", 1))
                .arg(positional("base", 2))
                .arg(
                    Arg::new("one-level")
                        .long("one-level")
                        .help("Reject relative parts deeper than one segment")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("join")
                .arg(positional("root", 1))
                .arg(positional("relative", 2))
                .arg(
                    Arg::new("append")
                        .long("append")
                        .help("Append instead of failing when the paths diverge")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn file_arg(args: &ArgMatches) -> &Path {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .unwrap_or_else(|| Path::new(""))
}

fn open_line_file(config: &Config, path: &Path) -> Result<LineFile> {
    let mut file =
        LineFile::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    file.set_flags(config.line_flags())
        .remove_bom(config.reader.remove_bom)
        .set_csv_control(config.csv_control()?);
    Ok(file)
}

fn open_csv_file(config: &Config, args: &ArgMatches) -> Result<CsvFile> {
    let mut csv = CsvFile::from_line_file(open_line_file(config, file_arg(args))?);

    if let Some(delimiter) = args.get_one::<String>("delimiter") {
        let &[byte] = delimiter.as_bytes() else {
            bail!("Delimiter must be a single ASCII character: {delimiter:?}");
        };
        let control = csv.csv_control().with_delimiter(byte);
        csv.set_csv_control(control);
    } else if args.get_flag("detect-delimiter") {
        csv.auto_detect_delimiter(&config.extra_delimiters()?)?;
    }

    Ok(csv)
}

fn run_lines(config: &Config, args: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let keep_newlines = args.get_flag("keep-newlines");
    let terminator = if keep_newlines { "" } else { "\n" };

    if args.get_flag("json") {
        let mut json = JsonFile::from_line_file(open_line_file(config, file_arg(args))?);
        for item in json.records() {
            let (_, object) = item?;
            writeln!(out, "{}", serde_json::to_string(&object)?)?;
        }
        return Ok(());
    }

    if args.get_flag("csv") {
        let mut csv = open_csv_file(config, args)?;
        apply_line_args(csv.inner_mut(), args);
        let skip_header = args.get_flag("skip-header") || config.csv.skip_header;
        csv.skip_header(skip_header)?;

        for item in csv.records() {
            let (_, record) = item?;
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
        return Ok(());
    }

    let mut file = open_line_file(config, file_arg(args))?;
    apply_line_args(&mut file, args);
    for item in file.records() {
        let (_, record) = item?;
        if let Some(line) = record.as_line() {
            write!(out, "{line}{terminator}")?;
        }
    }

    Ok(())
}

fn apply_line_args(file: &mut LineFile, args: &ArgMatches) {
    if args.get_flag("keep-empty") {
        file.set_flag(LineFlags::SKIP_EMPTY, false);
    }
    if args.get_flag("keep-newlines") {
        file.set_flag(LineFlags::DROP_NEWLINE, false);
    }
    if args.get_flag("remove-bom") {
        file.remove_bom(true);
    }
}

fn run_path(args: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let string = |args: &ArgMatches, name: &str| -> String {
        args.get_one::<String>(name).cloned().unwrap_or_default()
    };
    let levels = |args: &ArgMatches| args.get_one::<usize>("levels").copied().unwrap_or(1);

    let result = match args.subcommand() {
        Some(("normalize", args)) => {
            path::normalize(&string(args, "path"), !args.get_flag("no-leading"))
        }
        Some(("build", args)) => {
            let elements: Vec<&String> = args
                .get_many::<String>("elements")
                .map(|values| values.collect())
                .unwrap_or_default();
            path::build(&elements)
        }
        Some(("dirname", args)) => path::dirname(
            &string(args, "path"),
            levels(args),
            !args.get_flag("from-start"),
        ),
        Some(("element", args)) => path::element(
            &string(args, "path"),
            levels(args),
            !args.get_flag("from-start"),
        ),
        Some(("relative", args)) => path::relative(
            &string(args, "full"),
            &string(args, "base"),
            args.get_flag("one-level"),
        )?,
        Some(("join", args)) => path::join(
            &string(args, "root"),
            &string(args, "relative"),
            args.get_flag("append"),
        )?,
        _ => bail!("A path subcommand is required"),
    };

    writeln!(out, "{result}")?;
    Ok(())
}

fn run_list(args: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let Some(dir) = args.get_one::<PathBuf>("dir") else {
        bail!("Directory argument is required");
    };
    let order = if args.get_flag("desc") {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };

    let mut files = list_files(dir, order)?;
    if let Some(extensions) = args.get_many::<String>("ext") {
        let extensions: Vec<&str> = extensions.map(String::as_str).collect();
        files = filter_by_extension(files, &extensions);
    }

    for file in files {
        writeln!(out, "{}", file.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        // Ensure version is accessible
        assert!(!lineio::VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_path_subcommands() {
        let run = |argv: &[&str]| -> String {
            let matches = cli().try_get_matches_from(argv).unwrap();
            let (_, args) = matches.subcommand().unwrap();
            let mut out = Vec::new();
            run_path(args, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        };

        assert_eq!(run(&["lineio", "path", "normalize", "/a//b/"]), "/a/b\n");
        assert_eq!(run(&["lineio", "path", "build", "my", "path", "/built"]), "/my/path/built\n");
        assert_eq!(
            run(&["lineio", "path", "dirname", "/my/path/file", "--levels", "2"]),
            "/my\n"
        );
        assert_eq!(
            run(&["lineio", "path", "element", "/my/full/path/file", "--from-start"]),
            "my\n"
        );
        assert_eq!(
            run(&["lineio", "path", "join", "/my/full/path", "/my/full/any", "--append"]),
            "/my/full/path/full/any\n"
        );
    }
}
