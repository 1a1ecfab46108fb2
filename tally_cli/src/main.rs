//! # Tally CLI
//!
//! Command-line front end for `tally_core`. Every subcommand is lowered onto
//! a [`CalculationItem`], evaluated, and printed either as aligned text or as
//! the serialized result.
//!
//! ```text
//! tally formula ohms_law --solve-for current --voltage 12 --resistance 4
//! tally subnet 192.168.1.10/24
//! tally payoff --balance 5000 --apr 18 --payment 200 --schedule
//! tally --json calc problem.json
//! ```

mod render;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tally_core::amortization::{LoanTerms, PaymentInput, PayoffInput};
use tally_core::calculations::CalculationItem;
use tally_core::formulas::{Formula, FormulaInput, Variable, VariableSet};
use tally_core::subnet::{self, SubnetInput};
use tally_core::{CalcError, OutputFormat, Settings};

#[derive(Parser, Debug)]
#[command(name = "tally", author, version, about = "Solve formulas, subnet math and loan payoffs")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results (and errors) as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Decimal places for text output
    #[arg(long, global = true)]
    decimals: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a formula for one unknown
    #[command(alias = "f")]
    Formula(FormulaArgs),
    /// List the formula catalog with variables and units
    Formulas,
    /// Mask, network, broadcast and host range of an IPv4 subnet
    #[command(alias = "s")]
    Subnet {
        /// Address in a.b.c.d/p notation, or a bare address with --prefix
        target: String,
        #[arg(long)]
        prefix: Option<u8>,
    },
    /// Months to pay off a balance at a fixed monthly payment
    Payoff {
        #[arg(long)]
        balance: f64,
        /// Annual rate in percent
        #[arg(long)]
        apr: f64,
        #[arg(long)]
        payment: f64,
        /// Include the month-by-month schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Fixed monthly payment for a loan term
    Payment {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long)]
        apr: f64,
        #[arg(long)]
        months: u32,
    },
    /// Evaluate a JSON calculation document ("-" reads stdin)
    Calc { input: PathBuf },
}

#[derive(Args, Debug)]
struct FormulaArgs {
    /// Formula name, e.g. ohms_law, electric_power, density
    formula: Formula,

    /// Variable to solve for
    #[arg(long)]
    solve_for: Variable,

    #[arg(long, allow_negative_numbers = true)]
    voltage: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    current: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    resistance: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    power: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    force: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    mass: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    acceleration: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    density: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    volume: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    distance: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    time: Option<f64>,
}

impl FormulaArgs {
    fn known(&self) -> VariableSet {
        [
            (Variable::Voltage, self.voltage),
            (Variable::Current, self.current),
            (Variable::Resistance, self.resistance),
            (Variable::Power, self.power),
            (Variable::Force, self.force),
            (Variable::Mass, self.mass),
            (Variable::Acceleration, self.acceleration),
            (Variable::Density, self.density),
            (Variable::Volume, self.volume),
            (Variable::Distance, self.distance),
            (Variable::Speed, self.speed),
            (Variable::Time, self.time),
        ]
        .into_iter()
        .filter_map(|(variable, value)| value.map(|v| (variable, v)))
        .collect()
    }
}

impl Command {
    /// Lower a subcommand onto the calculation it runs. `None` for listings.
    fn to_item(&self) -> Result<Option<CalculationItem>> {
        let item = match self {
            Command::Formulas => return Ok(None),
            Command::Formula(args) => CalculationItem::Formula(FormulaInput {
                formula: args.formula,
                solve_for: args.solve_for,
                known: args.known(),
            }),
            Command::Subnet { target, prefix } => {
                let (address, prefix_length) = match (target.contains('/'), prefix) {
                    (true, None) => {
                        let (address, prefix_length) = subnet::parse_cidr(target)?;
                        (subnet::format_address(address), prefix_length)
                    }
                    (true, Some(_)) => bail!("give the prefix either in CIDR notation or with --prefix, not both"),
                    (false, Some(p)) => (target.clone(), *p),
                    (false, None) => bail!("missing prefix length: use a.b.c.d/p or --prefix"),
                };
                CalculationItem::Subnet(SubnetInput { address, prefix_length })
            }
            Command::Payoff {
                balance,
                apr,
                payment,
                schedule,
            } => CalculationItem::Payoff(PayoffInput {
                terms: LoanTerms::new(*balance, *apr, *payment),
                include_schedule: *schedule,
            }),
            Command::Payment { principal, apr, months } => CalculationItem::Payment(PaymentInput {
                principal: *principal,
                annual_rate_percent: *apr,
                months: *months,
            }),
            Command::Calc { input } => {
                let json = read_input(input)?;
                CalculationItem::from_json_str(&json)
                    .with_context(|| format!("parsing calculation from {}", input.display()))?
            }
        };
        Ok(Some(item))
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// File settings with command-line overrides applied.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.json {
        settings.output = OutputFormat::Json;
    }
    if let Some(decimals) = cli.decimals {
        settings.decimal_places = decimals;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let Some(item) = cli.command.to_item()? else {
        match settings.output {
            OutputFormat::Json => {
                let catalog: Vec<_> = tally_core::formulas::ALL_FORMULAS
                    .iter()
                    .map(|f| f.metadata())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            }
            OutputFormat::Text => print!("{}", render::render_catalog()),
        }
        return Ok(());
    };

    debug!(calc_type = item.calc_type(), "running command");
    let output = item
        .evaluate(settings)
        .with_context(|| format!("{} calculation failed", item.calc_type()))?;

    match settings.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => print!("{}", render::render_output(&output, usize::from(settings.decimal_places))),
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, json: bool) {
    match (json, err.downcast_ref::<CalcError>()) {
        (true, Some(calc)) => match serde_json::to_string_pretty(calc) {
            Ok(body) => eprintln!("{}", body),
            Err(_) => eprintln!("error: {:#}", err),
        },
        _ => eprintln!("error: {:#}", err),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = resolve_settings(&cli).and_then(|settings| run(&cli, &settings));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_formula_args_collect_knowns() {
        let cli = parse(&["formula", "newton", "--solve-for", "force", "--mass", "2", "--acceleration", "-9.81"]);
        let item = cli.command.to_item().unwrap().unwrap();
        match item {
            CalculationItem::Formula(input) => {
                assert_eq!(input.formula, Formula::NewtonsSecondLaw);
                assert_eq!(input.known.get(Variable::Acceleration), Some(-9.81));
                assert_eq!(input.known.len(), 2);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_unknown_formula_rejected_by_parser() {
        let result = Cli::try_parse_from(["tally", "formula", "gravity", "--solve-for", "force"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subnet_cidr_and_prefix_forms_agree() {
        let a = parse(&["subnet", "10.1.2.3/8"]).command.to_item().unwrap();
        let b = parse(&["subnet", "10.1.2.3", "--prefix", "8"]).command.to_item().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_subnet_requires_prefix() {
        assert!(parse(&["subnet", "10.1.2.3"]).command.to_item().is_err());
        assert!(parse(&["subnet", "10.1.2.3/8", "--prefix", "8"]).command.to_item().is_err());
    }

    #[test]
    fn test_malformed_cidr_keeps_format_error() {
        let err = parse(&["subnet", "10.1.2/8"]).command.to_item().unwrap_err();
        let calc = err.downcast_ref::<CalcError>().unwrap();
        assert_eq!(calc.error_code(), "FORMAT_ERROR");
    }

    #[test]
    fn test_global_flags_override_settings() {
        let cli = parse(&["payment", "--principal", "1000", "--apr", "5", "--months", "12", "--json", "--decimals", "2"]);
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.decimal_places, 2);
    }

    #[test]
    fn test_decimals_out_of_range() {
        let cli = parse(&["formulas", "--decimals", "40"]);
        assert!(resolve_settings(&cli).is_err());
    }

    #[test]
    fn test_formulas_has_no_item() {
        assert!(parse(&["formulas"]).command.to_item().unwrap().is_none());
    }
}
