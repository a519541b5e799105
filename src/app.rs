use std::collections::HashMap;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::command::{self, Command, HELP};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::dashboard::{Action, Dashboard};
use crate::fetcher::{EmployeeFetcher, Endpoints, EMPLOYEES_API, FILTERS_API};
use crate::filters::{FilterField, FilterState, Location, DEFAULT_PAGE_SIZE};
use crate::output::{self, OutputFormat};
use crate::session::Session;
use crate::table::SortKey;

fn print_banner() {
    println!(
        ":: empdash v{} :: employee directory dashboard",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or_else(|| cmd.get_about()) {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n\n", cmd.get_name()));

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = *section_idx.entry(heading.clone()).or_insert_with(|| {
            sections.push((heading, Vec::new()));
            sections.len() - 1
        });
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");
        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            for alias in arg.get_visible_aliases().unwrap_or_default() {
                let rendered = format!("--{alias}");
                if !parts.contains(&rendered) {
                    parts.push(rendered);
                }
            }
            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }
            out.push_str(&format!("  {flags}\n"));
            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str(&format!("          {}\n", help.trim()));
                }
            }
            out.push('\n');
        }
    }
    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    employees_endpoint: String,
    filters_endpoint: String,
    timeout: Option<u64>,
    page_size: u32,
    link: String,
    actions: Vec<Action>,
    interactive: bool,
    output: Option<String>,
    output_format: OutputFormat,
    stdout_format: OutputFormat,
    no_color: bool,
    log_level: String,
}

/// Filter flags as dashboard actions, in the order a user would click them:
/// reset, legal entity, the other fields, then apply and the view controls.
fn cli_actions(args: &CliArgs) -> Result<Vec<Action>, String> {
    let mut actions: Vec<Action> = Vec::new();
    if args.reset {
        actions.push(Action::Reset);
    }
    if let Some(entity) = args.legal_entity.as_deref() {
        actions.push(Action::LegalEntity(entity.trim().to_string()));
    }
    let fields: [(FilterField, &Option<String>); 6] = [
        (FilterField::SubEntity, &args.sub_entity),
        (FilterField::Department, &args.department),
        (FilterField::Designation, &args.designation),
        (FilterField::Status, &args.status),
        (FilterField::Skills, &args.skills),
        (FilterField::SalaryRange, &args.salary_range),
    ];
    for (field, raw) in fields {
        if let Some(raw) = raw.as_deref() {
            actions.push(Action::Edit(command::edit_from_text(field, raw)));
        }
    }
    if args.apply {
        actions.push(Action::Apply);
    }
    if let Some(size) = args.page_size {
        actions.push(Action::PageSize(size));
    }
    if let Some(page) = args.page {
        actions.push(Action::Page(page));
    }
    if let Some(text) = args.search.as_deref() {
        actions.push(Action::Search(text.to_string()));
    }
    if let Some(raw) = args.sort.as_deref() {
        let key = raw
            .parse::<SortKey>()
            .map_err(|e| format!("invalid --sort: {e}"))?;
        actions.push(Action::Sort(Some(key)));
    }
    Ok(actions)
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let employees_endpoint = args
        .employees_endpoint
        .clone()
        .or(cfg.employees_endpoint)
        .unwrap_or_else(|| EMPLOYEES_API.to_string());
    let filters_endpoint = args
        .filters_endpoint
        .clone()
        .or(cfg.filters_endpoint)
        .unwrap_or_else(|| FILTERS_API.to_string());
    Endpoints::parse(&employees_endpoint, &filters_endpoint).map_err(|e| e.to_string())?;

    let timeout = args.timeout.or(cfg.timeout).filter(|t| *t > 0);
    let page_size = match cfg.page_size {
        Some(0) => return Err("invalid page_size in config, expected positive integer".to_string()),
        Some(size) => size,
        None => DEFAULT_PAGE_SIZE,
    };
    let link = args
        .link
        .clone()
        .or(cfg.link)
        .unwrap_or_else(|| "/".to_string());

    let output = args
        .output
        .clone()
        .or(cfg.output)
        .map(|p| config::expand_tilde(&p).to_string_lossy().to_string());
    let explicit_format = match args.output_format.clone().or(cfg.output_format) {
        Some(raw) => Some(OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json, csv, or html")
        })?),
        None => None,
    };
    let output_format = explicit_format
        .or_else(|| output.as_deref().and_then(output::infer_format_from_path))
        .unwrap_or(OutputFormat::Text);
    let stdout_format = if output.is_some() {
        OutputFormat::Text
    } else {
        explicit_format.unwrap_or(OutputFormat::Text)
    };

    let log_level = match args.verbose {
        0 => cfg.log_level.unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    Ok(RunConfig {
        actions: cli_actions(&args)?,
        employees_endpoint,
        filters_endpoint,
        timeout,
        page_size,
        link,
        interactive: args.interactive,
        output,
        output_format,
        stdout_format,
        no_color,
        log_level,
    })
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,empdash={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn loading_spinner(no_color: bool) -> Result<Option<ProgressBar>, String> {
    if no_color {
        return Ok(None);
    }
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
            .map_err(|e| format!("failed to build spinner style: {e}"))?,
    );
    pb.set_message("Loading employees...");
    Ok(Some(pb))
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file '{path}': {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
    info!(path, bytes = rendered.len(), "wrote output file");
    Ok(())
}

fn print_view(dashboard: &Dashboard, format: OutputFormat) {
    let rendered = output::render(format, &dashboard.snapshot());
    print!("{}", String::from_utf8_lossy(&rendered));
}

async fn run_once(session: &mut Session, run: &RunConfig) -> Result<(), String> {
    let spinner = loading_spinner(run.no_color)?;
    let settled = session.settle().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    print_view(session.dashboard(), run.stdout_format);
    if let Some(path) = run.output.as_deref() {
        let rendered = output::render(run.output_format, &session.dashboard().snapshot());
        write_output(path, &rendered).await?;
    }
    settled.map_err(|e| e.to_string())
}

/// Returns `false` once the user asked to leave.
fn handle_line(session: &mut Session, line: &str) -> bool {
    let cmd = match command::parse(line) {
        Ok(Some(cmd)) => cmd,
        Ok(None) => return true,
        Err(e) => {
            println!("{e}");
            return true;
        }
    };
    debug!(?cmd, "shell command");
    match cmd {
        Command::Quit => return false,
        Command::Help => println!("{HELP}"),
        Command::Url => println!("{}", session.dashboard().filters().location()),
        Command::Catalog => print!("{}", output::render_catalog(session.dashboard().catalog())),
        Command::Show => print_view(session.dashboard(), OutputFormat::Text),
        Command::Retry => {
            if !session.retry() {
                println!("nothing to retry");
            }
        }
        other => {
            if let Some(action) = other.into_action() {
                session.perform(action);
                print_view(session.dashboard(), OutputFormat::Text);
            }
        }
    }
    true
}

async fn run_shell(session: &mut Session, run: &RunConfig) -> Result<(), String> {
    print_banner();
    format_kv_line("Employees", &run.employees_endpoint);
    format_kv_line("Filters", &run.filters_endpoint);
    format_kv_line("Page size", &run.page_size.to_string());
    println!();
    println!("type `help` for commands");
    print_view(session.dashboard(), OutputFormat::Text);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(session, &line) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read from stdin: {e}")),
                }
            }
            outcome = session.next_outcome() => {
                match outcome {
                    Some(outcome) => {
                        if session.accept(outcome) {
                            print_view(session.dashboard(), OutputFormat::Text);
                        }
                    }
                    None => break,
                }
            }
        }
    }

    if let Some(path) = run.output.as_deref() {
        let rendered = output::render(run.output_format, &session.dashboard().snapshot());
        write_output(path, &rendered).await?;
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let endpoints =
        Endpoints::parse(&run.employees_endpoint, &run.filters_endpoint).map_err(|e| e.to_string())?;
    let fetcher = EmployeeFetcher::new(endpoints, run.timeout.map(Duration::from_secs))
        .map_err(|e| e.to_string())?;
    let state = FilterState::from_location(Location::parse(&run.link), run.page_size);
    info!(link = %state.location(), page = state.page(), "opening dashboard");

    let mut session = Session::new(Dashboard::new(state), fetcher);
    session.mount().await;
    for action in run.actions.iter().cloned() {
        session.perform(action);
    }

    if run.interactive {
        run_shell(&mut session, &run).await
    } else {
        run_once(&mut session, &run).await
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            println!("wrote {}", path.display());
        } else {
            println!("{} already exists", path.display());
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_tracing(&run.log_level);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use crate::filters::FilterEdit;
    use clap::Parser;

    fn run_for(argv: &[&str], cfg: ConfigFile) -> Result<RunConfig, String> {
        let mut full = vec!["empdash"];
        full.extend_from_slice(argv);
        build_run_config(CliArgs::parse_from(full), cfg)
    }

    #[test]
    fn defaults_use_hosted_api_and_text() {
        let run = run_for(&[], ConfigFile::default()).unwrap();
        assert_eq!(run.employees_endpoint, EMPLOYEES_API);
        assert_eq!(run.filters_endpoint, FILTERS_API);
        assert_eq!(run.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(run.link, "/");
        assert_eq!(run.timeout, None);
        assert_eq!(run.stdout_format, OutputFormat::Text);
        assert!(run.actions.is_empty());
        assert_eq!(run.log_level, "warn");
    }

    #[test]
    fn cli_overrides_config() {
        let cfg = ConfigFile {
            employees_endpoint: Some("http://cfg.local/api/employees".to_string()),
            page_size: Some(25),
            timeout: Some(30),
            no_color: Some(true),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        let run = run_for(
            &["--employees-endpoint", "http://cli.local/api/employees", "--timeout", "5", "--color"],
            cfg,
        )
        .unwrap();
        assert_eq!(run.employees_endpoint, "http://cli.local/api/employees");
        assert_eq!(run.timeout, Some(5));
        assert_eq!(run.page_size, 25);
        assert!(!run.no_color);
        assert_eq!(run.log_level, "debug");

        let run = run_for(&["-vv"], ConfigFile::default()).unwrap();
        assert_eq!(run.log_level, "debug");
    }

    #[test]
    fn filter_flags_become_ordered_actions() {
        let run = run_for(
            &[
                "--reset",
                "--department",
                "Engineering,Sales",
                "--legal-entity",
                "Acme",
                "--apply",
                "--page",
                "2",
                "--sort",
                "salary-desc",
            ],
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(
            run.actions,
            vec![
                Action::Reset,
                Action::LegalEntity("Acme".to_string()),
                Action::Edit(FilterEdit::new(
                    FilterField::Department,
                    vec!["Engineering".to_string(), "Sales".to_string()]
                )),
                Action::Apply,
                Action::Page(2),
                Action::Sort(Some(SortKey::SalaryDesc)),
            ]
        );
    }

    #[test]
    fn output_format_inferred_from_file() {
        let run = run_for(&["-o", "report.html"], ConfigFile::default()).unwrap();
        assert_eq!(run.output_format, OutputFormat::Html);
        assert_eq!(run.stdout_format, OutputFormat::Text);

        let run = run_for(&["--output-format", "json"], ConfigFile::default()).unwrap();
        assert_eq!(run.stdout_format, OutputFormat::Json);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = run_for(&["--filters-endpoint", "not a url"], ConfigFile::default()).unwrap_err();
        assert!(err.contains("not a url"));
    }

    #[test]
    fn zero_page_size_in_config_is_rejected() {
        let cfg = ConfigFile {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(run_for(&[], cfg).unwrap_err().contains("page_size"));
    }

    #[test]
    fn help_lists_headings() {
        let help = render_custom_help();
        assert!(help.contains("Filters:"));
        assert!(help.contains("--salary-range"));
        assert!(help.contains("--interactive"));
    }
}
