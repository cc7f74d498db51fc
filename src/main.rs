//! CLI entry point for `mailrules`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailrules::config::{self, Config, ForwardMode};
use mailrules::forward::{Forwarder, LogForwarder, OutboxForwarder};
use mailrules::{store, Action, AutomationEngine, Condition, Email, ProcessReport, RuleDefinition};

#[derive(Parser)]
#[command(
    name = "mailrules",
    version,
    about = "Apply star/label/forward rules to email",
    long_about = "Manage automation rules and apply them to emails. Rules match \
                  substrings of the sender, subject or body; matching emails are \
                  starred, labelled or forwarded."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rules file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH", env = "MAILRULES_RULES")]
    rules: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, list and toggle rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Run the rules over a JSON email store
    Process {
        /// JSON file holding an array of emails
        path: PathBuf,
        /// Write the processed emails back to PATH
        #[arg(long, conflicts_with = "output")]
        write: bool,
        /// Write the processed emails to this file instead
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the per-email report as JSON
        #[arg(long)]
        json: bool,
        /// Queue forwards as .eml files in this directory
        #[arg(long, value_name = "DIR")]
        outbox: Option<PathBuf>,
    },
    /// Import .eml files into a JSON email store
    Import {
        /// .eml files to import
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// JSON email store to append to (created if missing)
        #[arg(short, long)]
        output: PathBuf,
        /// Run the rules over each imported email
        #[arg(long)]
        process: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the config file as well
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// List rules in creation order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a rule
    Add {
        /// Rule name
        #[arg(long)]
        name: String,
        /// Condition, e.g. `subject:urgent` (repeatable; all must match)
        #[arg(long = "when", value_name = "FIELD:VALUE")]
        conditions: Vec<Condition>,
        /// Action, e.g. `star`, `label:work`, `forward:me@example.com` (repeatable)
        #[arg(long = "then", value_name = "KIND[:VALUE]")]
        actions: Vec<Action>,
    },
    /// Flip a rule between active and inactive
    Toggle { id: u64 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let rules_path = cli
        .rules
        .clone()
        .unwrap_or_else(|| config::rules_file_path(&config));

    match cli.command {
        Commands::Rules { command } => match command {
            RulesCommand::List { json } => cmd_rules_list(&rules_path, json),
            RulesCommand::Add {
                name,
                conditions,
                actions,
            } => cmd_rules_add(&rules_path, name, conditions, actions),
            RulesCommand::Toggle { id } => cmd_rules_toggle(&rules_path, id),
        },
        Commands::Process {
            path,
            write,
            output,
            json,
            outbox,
        } => {
            let target = if write { Some(path.clone()) } else { output };
            cmd_process(&config, &rules_path, &path, target.as_deref(), json, outbox)
        }
        Commands::Import {
            inputs,
            output,
            process,
        } => cmd_import(&config, &rules_path, &inputs, &output, process),
        Commands::Config { save } => cmd_config(&config, save),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = config::log_file_path(config);
    let log_dir = log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "mailrules.log".into());

    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build the engine over the saved rules with the configured forwarder.
fn build_engine(
    config: &Config,
    rules_path: &Path,
    outbox: Option<PathBuf>,
) -> anyhow::Result<AutomationEngine<Box<dyn Forwarder>>> {
    let rules = store::load_rules(rules_path)?;

    let forwarder: Box<dyn Forwarder> = match (outbox, config.forward.mode) {
        (Some(dir), _) => Box::new(OutboxForwarder::new(dir, config.forward.sender.clone())),
        (None, ForwardMode::Outbox) => Box::new(OutboxForwarder::new(
            config::outbox_dir(config),
            config.forward.sender.clone(),
        )),
        (None, ForwardMode::Log) => Box::new(LogForwarder),
    };

    Ok(AutomationEngine::with_rules(rules, forwarder).with_options(config.engine.match_options()))
}

fn progress_bar(len: usize, verb: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {verb} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

// ── rules ───────────────────────────────────────────────────────

fn cmd_rules_list(rules_path: &Path, json: bool) -> anyhow::Result<()> {
    let rules = store::load_rules(rules_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(rules.list_rules())?);
        return Ok(());
    }

    println!();
    println!("  {} rule(s) in {}", rules.len(), rules_path.display());
    println!();
    if rules.is_empty() {
        return Ok(());
    }

    println!(
        "  {:<14} {:<8} {:<20} {:<30} {}",
        "ID", "Active", "Name", "When", "Then"
    );
    println!("  {}", "-".repeat(96));
    for rule in rules.list_rules() {
        let when = join_display(&rule.conditions, " AND ");
        let then = join_display(&rule.actions, ", ");
        let name: String = rule.name.chars().take(19).collect();
        println!(
            "  {:<14} {:<8} {:<20} {:<30} {}",
            rule.id,
            if rule.active { "yes" } else { "no" },
            name,
            when,
            then
        );
    }
    println!();
    Ok(())
}

fn join_display<T: std::fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn cmd_rules_add(
    rules_path: &Path,
    name: String,
    conditions: Vec<Condition>,
    actions: Vec<Action>,
) -> anyhow::Result<()> {
    let mut rules = store::load_rules(rules_path)?;

    if conditions.is_empty() || actions.is_empty() {
        tracing::warn!(
            conditions = conditions.len(),
            actions = actions.len(),
            "Rule without conditions or actions will have no useful effect"
        );
    }

    let rule = rules.create_rule(RuleDefinition {
        name,
        conditions,
        actions,
    });
    store::save_rules(rules_path, &rules)?;

    println!("  Created rule {} ({})", rule.id, rule.name);
    Ok(())
}

fn cmd_rules_toggle(rules_path: &Path, id: u64) -> anyhow::Result<()> {
    let mut rules = store::load_rules(rules_path)?;
    match rules.toggle_rule(id) {
        Some(active) => {
            store::save_rules(rules_path, &rules)?;
            let state = if active { "active" } else { "inactive" };
            println!("  Rule {id} is now {state}");
        }
        None => println!("  No rule with id {id}"),
    }
    Ok(())
}

// ── process / import ────────────────────────────────────────────

fn cmd_process(
    config: &Config,
    rules_path: &Path,
    path: &Path,
    target: Option<&Path>,
    json: bool,
    outbox: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let engine = build_engine(config, rules_path, outbox)?;
    let mut emails = store::load_emails(path)?;

    let pb = progress_bar(emails.len(), "Processing");
    let mut reports = Vec::with_capacity(emails.len());
    for (i, email) in emails.iter_mut().enumerate() {
        pb.set_position(i as u64);
        reports.push(engine.process_email(email));
    }
    pb.finish_and_clear();

    if json {
        print_report_json(&emails, &reports)?;
    } else {
        print_report_table(&emails, &reports);
    }

    if let Some(target) = target {
        store::save_emails(target, &emails)?;
        println!("  Wrote {} email(s) to {}", emails.len(), target.display());
    }
    Ok(())
}

fn cmd_import(
    config: &Config,
    rules_path: &Path,
    inputs: &[PathBuf],
    output: &Path,
    process: bool,
) -> anyhow::Result<()> {
    let engine = if process {
        Some(build_engine(config, rules_path, None)?)
    } else {
        None
    };

    let mut emails = store::load_emails(output)?;
    let before = emails.len();

    let pb = progress_bar(inputs.len(), "Importing");
    for (i, input) in inputs.iter().enumerate() {
        pb.set_position(i as u64);
        match mailrules::parser::import_eml(input) {
            Ok(mut email) => {
                if let Some(engine) = &engine {
                    engine.process_email(&mut email);
                }
                emails.push(email);
            }
            Err(e) => {
                tracing::warn!(path = %input.display(), error = %e, "Skipping file");
            }
        }
    }
    pb.finish_and_clear();

    store::save_emails(output, &emails)?;
    println!(
        "  Imported {} of {} file(s) into {}",
        emails.len() - before,
        inputs.len(),
        output.display()
    );
    Ok(())
}

/// Print one line per email that at least one rule fired on.
fn print_report_table(emails: &[Email], reports: &[ProcessReport]) {
    let touched: Vec<(usize, &Email, &ProcessReport)> = emails
        .iter()
        .zip(reports)
        .enumerate()
        .filter(|(_, (_, r))| r.matched_count() > 0)
        .map(|(i, (e, r))| (i, e, r))
        .collect();

    println!();
    println!(
        "  {} email(s) processed, {} matched at least one rule",
        emails.len(),
        touched.len()
    );
    println!();
    if touched.is_empty() {
        return;
    }

    println!(
        "  {:<4} {:<25} {:<40} {:<5} {}",
        "#", "From", "Subject", "Star", "Labels"
    );
    println!("  {}", "-".repeat(96));
    for (i, email, _) in touched {
        let from: String = email.from.chars().take(24).collect();
        let subject: String = email.subject.chars().take(39).collect();
        println!(
            "  {:<4} {:<25} {:<40} {:<5} {}",
            i + 1,
            from,
            subject,
            if email.starred { "*" } else { "" },
            email.labels.join(", ")
        );
    }
    println!();
}

fn print_report_json(emails: &[Email], reports: &[ProcessReport]) -> anyhow::Result<()> {
    let items: Vec<serde_json::Value> = emails
        .iter()
        .zip(reports)
        .enumerate()
        .map(|(i, (email, report))| {
            serde_json::json!({
                "index": i,
                "from": email.from,
                "subject": email.subject,
                "starred": email.starred,
                "labels": email.labels,
                "matched_rules": report.matched().collect::<Vec<_>>(),
                "outcomes": report.outcomes,
            })
        })
        .collect();

    let output = serde_json::json!({
        "email_count": emails.len(),
        "matched_count": reports.iter().filter(|r| r.matched_count() > 0).count(),
        "emails": items,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ── config ──────────────────────────────────────────────────────

fn cmd_config(config: &Config, save: bool) -> anyhow::Result<()> {
    match config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config file location)"),
    }
    print!("{}", toml::to_string_pretty(config)?);

    if save {
        config::save_config(config)?;
        println!("# saved");
    }
    Ok(())
}

// ── completions / manpage ───────────────────────────────────────

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailrules", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
