use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docverdict::options::optionflag_by_name;
use docverdict::sandbox::Sandbox;
use docverdict::{
    DocTestParser, DocTestRunner, Error, Fragment, Host, OptionFlags, RunReport, RunnerOptions,
    Verdict, read_text, render_parse_error, render_parse_error_to_string_no_color,
};
use miette::Result;
use tracing::debug;

/// Docverdict - grade the doctest-style examples of a text
#[derive(Parser, Debug)]
#[command(name = "docverdict")]
#[command(about = "Extract and grade doctest-style examples", long_about = None)]
struct Args {
    /// Text file holding the examples
    file: PathBuf,

    /// Name used in reports (defaults to the file path)
    #[arg(long)]
    name: Option<String>,

    /// Enable (`+NAME`) or disable (`-NAME`) an option flag for every example
    #[arg(long = "option", value_name = "±FLAG", value_parser = parse_option, allow_hyphen_values = true)]
    options: Vec<(OptionFlags, bool)>,

    /// Run every example in fresh namespaces
    #[arg(long)]
    isolate: bool,

    /// List the examples instead of running them
    #[arg(long)]
    list: bool,

    /// Print passing examples too
    #[arg(short, long)]
    verbose: bool,

    /// Render parse errors without colors
    #[arg(long)]
    no_color: bool,
}

fn parse_option(raw: &str) -> Result<(OptionFlags, bool), String> {
    let (enabled, name) = match raw.split_at_checked(1) {
        Some(("+", name)) => (true, name),
        Some(("-", name)) => (false, name),
        _ => return Err(format!("`{raw}` must start with `+` or `-`")),
    };
    optionflag_by_name(name)
        .map(|flag| (flag, enabled))
        .ok_or_else(|| format!("unknown option flag `{name}`"))
}

fn list_examples(fragments: &[Fragment]) {
    for example in fragments.iter().filter_map(Fragment::as_example) {
        println!(
            "{}:{}: {} {}",
            example.filename(),
            example.lineno(),
            example.prompt(),
            example.tested_line()
        );
    }
}

fn print_report(report: &RunReport, verbose: bool) {
    for verdict in &report.verdicts {
        match verdict {
            Verdict::Passed(_) | Verdict::Empty(_) if !verbose => {}
            _ => println!("{verdict}"),
        }
    }
    println!(
        "{} attempted, {} failed, {} skipped",
        report.results.attempted, report.results.failed, report.skipped
    );
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // DOCVERDICT_LOG or RUST_LOG control the log level, WARN when unset.
    let filter = EnvFilter::try_from_env("DOCVERDICT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let text = read_text(&args.file)?;
    match run(&args, &text) {
        Ok(code) => Ok(code),
        Err(Error::Parse(err)) => {
            if args.no_color {
                eprint!("{}", render_parse_error_to_string_no_color(&text, &err));
            } else {
                render_parse_error(&text, &err);
            }
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}

/// List or grade the examples of `text`.
fn run(args: &Args, text: &str) -> std::result::Result<ExitCode, Error> {
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| args.file.display().to_string());

    if args.list {
        let fragments = DocTestParser::new().parse(text, &name)?;
        list_examples(&fragments);
        return Ok(ExitCode::SUCCESS);
    }

    let overrides: BTreeMap<OptionFlags, bool> = args.options.iter().copied().collect();
    let optionflags = OptionFlags::empty().with_overrides(&overrides);
    debug!(?optionflags, isolate = args.isolate, "running examples");
    let options = RunnerOptions {
        optionflags,
        isolate: args.isolate,
    };

    let sandbox = Sandbox::new();
    let mut globals = sandbox.new_namespace();
    let mut locals = sandbox.new_namespace();
    let report =
        DocTestRunner::new(&sandbox, options).run(text, &name, None, &mut globals, &mut locals)?;

    print_report(&report, args.verbose);
    Ok(if report.results.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docverdict::ParseError;

    #[test]
    fn test_parse_option() {
        assert_eq!(parse_option("+ELLIPSIS"), Ok((OptionFlags::ELLIPSIS, true)));
        assert_eq!(parse_option("-SKIP"), Ok((OptionFlags::SKIP, false)));
        assert!(parse_option("SKIP").is_err());
        assert!(parse_option("+NOPE").is_err());
        assert!(parse_option("").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "docverdict",
            "notes.txt",
            "--option",
            "+FAIL_FAST",
            "--option=-SKIP",
            "--isolate",
        ])
        .unwrap();
        assert_eq!(args.file, PathBuf::from("notes.txt"));
        assert_eq!(
            args.options,
            vec![(OptionFlags::FAIL_FAST, true), (OptionFlags::SKIP, false)]
        );
        assert!(args.isolate);
        assert!(!args.list);
    }

    #[test]
    fn test_parse_failures_come_back_as_parse_errors() {
        for extra in [None, Some("--list")] {
            let argv: Vec<&str> = ["docverdict", "notes.txt"].into_iter().chain(extra).collect();
            let args = Args::try_parse_from(argv).unwrap();
            let err = run(&args, "Notes.\n>>>1\n").unwrap_err();
            assert!(matches!(
                err,
                Error::Parse(ParseError::SpaceMissingAfterPrompt { line: 2, .. })
            ));
        }
    }

    #[test]
    fn test_exit_codes() {
        let args = Args::try_parse_from(["docverdict", "notes.txt"]).unwrap();
        assert_eq!(run(&args, ">>> 1 + 1\n2\n").unwrap(), ExitCode::SUCCESS);
        assert_eq!(run(&args, ">>> 1 + 1\n3\n").unwrap(), ExitCode::FAILURE);
    }
}
