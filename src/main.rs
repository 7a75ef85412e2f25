use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scenario_lab::api::{SimulatePayload, resolve_run, run_http_server};
use scenario_lab::core::{CrisisType, RecoveryType, simulate};

/// Multi-year asset growth under configurable stress scenarios
#[derive(Parser, Debug)]
#[command(name = "scenario-lab", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value = "0.0.0.0", env = "SCENARIO_HOST")]
        host: String,
        #[arg(short, long, default_value_t = 8080, env = "SCENARIO_PORT")]
        port: u16,
    },
    /// Run one simulation and print the result as JSON
    Run(RunArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCrisisType {
    None,
    RiskOff,
    RisingRates,
}

impl From<CliCrisisType> for CrisisType {
    fn from(value: CliCrisisType) -> Self {
        match value {
            CliCrisisType::None => CrisisType::None,
            CliCrisisType::RiskOff => CrisisType::RiskOff,
            CliCrisisType::RisingRates => CrisisType::RisingRates,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRecoveryType {
    V,
    U,
    L,
}

impl From<CliRecoveryType> for RecoveryType {
    fn from(value: CliRecoveryType) -> Self {
        match value {
            CliRecoveryType::V => RecoveryType::VShaped,
            CliRecoveryType::U => RecoveryType::UShaped,
            CliRecoveryType::L => RecoveryType::LShaped,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON file with scenario fields and an optional "assets" table
    #[arg(long, env = "SCENARIO_CONFIG")]
    config: Option<PathBuf>,
    /// Named preset applied before individual overrides
    #[arg(long, env = "SCENARIO_PRESET")]
    preset: Option<String>,
    #[arg(long, env = "SCENARIO_INITIAL_AMOUNT")]
    initial_amount: Option<f64>,
    #[arg(long, env = "SCENARIO_YEARS")]
    years: Option<u32>,
    /// Annual fees in percent
    #[arg(long, env = "SCENARIO_ANNUAL_FEES")]
    annual_fees: Option<f64>,
    /// Annual inflation in percent
    #[arg(long, env = "SCENARIO_INFLATION_RATE")]
    inflation_rate: Option<f64>,
    #[arg(long, env = "SCENARIO_ENABLE_RISK")]
    enable_risk: Option<bool>,
    #[arg(long, value_enum, env = "SCENARIO_CRISIS_TYPE")]
    crisis_type: Option<CliCrisisType>,
    /// Market-wide crisis drawdown in percent
    #[arg(long, env = "SCENARIO_DRAWDOWN")]
    drawdown: Option<f64>,
    #[arg(long, env = "SCENARIO_RECOVERY_YEARS")]
    recovery_years: Option<f64>,
    #[arg(long, value_enum, env = "SCENARIO_RECOVERY_TYPE")]
    recovery_type: Option<CliRecoveryType>,
    #[arg(long, env = "SCENARIO_ENABLE_VOLATILITY")]
    enable_volatility: Option<bool>,
    #[arg(long, env = "SCENARIO_VOLATILITY_LEVEL")]
    volatility_level: Option<f64>,
    #[arg(long, allow_hyphen_values = true, env = "SCENARIO_SEED")]
    seed: Option<i64>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn load_payload(args: &RunArgs) -> Result<SimulatePayload, String> {
    let mut payload = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<SimulatePayload>(&raw)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => SimulatePayload::default(),
    };

    let scenario = &mut payload.scenario;
    scenario.preset = args.preset.clone().or(scenario.preset.take());
    scenario.initial_amount = args.initial_amount.or(scenario.initial_amount);
    scenario.years = args.years.or(scenario.years);
    scenario.annual_fees = args.annual_fees.or(scenario.annual_fees);
    scenario.inflation_rate = args.inflation_rate.or(scenario.inflation_rate);
    scenario.enable_risk = args.enable_risk.or(scenario.enable_risk);
    scenario.crisis_type = args.crisis_type.map(Into::into).or(scenario.crisis_type);
    scenario.drawdown = args.drawdown.or(scenario.drawdown);
    scenario.recovery_years = args.recovery_years.or(scenario.recovery_years);
    scenario.recovery_type = args.recovery_type.map(Into::into).or(scenario.recovery_type);
    scenario.enable_volatility = args.enable_volatility.or(scenario.enable_volatility);
    scenario.volatility_level = args.volatility_level.or(scenario.volatility_level);
    scenario.random_seed_base = args.seed.or(scenario.random_seed_base);

    Ok(payload)
}

fn run_once(args: &RunArgs) -> Result<String, String> {
    let payload = load_payload(args)?;
    let (assets, config) = resolve_run(payload)?;
    info!(
        assets = assets.len(),
        years = config.years,
        crisis = config.crisis_active(),
        volatility = config.volatility_active(),
        "running simulation"
    );
    let output = simulate(&assets, &config);
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    json.map_err(|e| format!("cannot encode output: {e}"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "scenario_lab=debug,tower_http=debug"
    } else {
        "scenario_lab=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = run_http_server(&host, port).await {
                error!("server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Run(args) => match run_once(&args) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        },
    }
}
