mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use finplan_core::PlannerConfig;
use std::process;

use commands::growth::{CompoundArgs, FdArgs, PpfArgs, ProjectArgs, RetirementArgs, SipArgs};
use commands::loans::{EmiArgs, LoansArgs};
use commands::tax::{TaxArgs, TaxCompareArgs};

/// Personal finance projections with decimal precision
#[derive(Parser)]
#[command(
    name = "finplan",
    version,
    about = "Personal finance projections with decimal precision",
    long_about = "A CLI for loan, investment, retirement and income tax projections. \
                  Supports EMI schedules, loan comparison, SIP, compound interest, \
                  fixed deposits, PPF, retirement planning and slab-based income tax."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML or JSON file overriding tax slabs, scheme rates and bank rates
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log computation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Equated monthly installment and yearly amortisation schedule
    Emi(EmiArgs),
    /// Compare several loans side by side
    Loans(LoansArgs),
    /// Project a monthly systematic investment plan
    Sip(SipArgs),
    /// Compound interest with optional top-ups
    Compound(CompoundArgs),
    /// Fixed deposit maturity and post-tax returns
    Fd(FdArgs),
    /// Public Provident Fund maturity and extensions
    Ppf(PpfArgs),
    /// Retirement corpus and required monthly SIP
    Retirement(RetirementArgs),
    /// Income tax under one regime
    Tax(TaxArgs),
    /// Compare the old and new tax regimes
    TaxCompare(TaxCompareArgs),
    /// Run any growth calculator from a tagged JSON scenario
    Project(ProjectArgs),
    /// List the available calculators
    Calculators,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&str>) -> Result<PlannerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => input::file::read_config(path),
        None => Ok(PlannerConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loans::run_emi(args, &config),
        Commands::Loans(args) => commands::loans::run_loans(args),
        Commands::Sip(args) => commands::growth::run_sip(args),
        Commands::Compound(args) => commands::growth::run_compound(args),
        Commands::Fd(args) => commands::growth::run_fd(args, &config),
        Commands::Ppf(args) => commands::growth::run_ppf(args, &config),
        Commands::Retirement(args) => commands::growth::run_retirement(args, &config),
        Commands::Tax(args) => commands::tax::run_tax(args, &config),
        Commands::TaxCompare(args) => commands::tax::run_tax_compare(args, &config),
        Commands::Project(args) => commands::growth::run_project(args, &config),
        Commands::Calculators => commands::run_calculators(),
        Commands::Version => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
