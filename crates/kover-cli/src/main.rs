#![forbid(unsafe_code)]

use std::error::Error;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use kover_config::{CacheLevel, Config, StepInputs};
use kover_engine::Step;
use kover_gradle::EnvmanCacheCollector;
use kover_util::process::CommandFactory;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(
    name = "kover-step",
    about = "Run Kover coverage for a Gradle project and export its reports"
)]
#[command(version)]
struct Cli {
    /// Root directory of the Gradle project (must contain `gradlew`)
    #[arg(long, env = "project_location", default_value = "")]
    project_location: String,

    /// Pattern locating the HTML report directories
    #[arg(long, env = "report_path_pattern", default_value = "*build/reports/kover/html")]
    report_path_pattern: String,

    /// Pattern locating the XML report directories
    #[arg(long, env = "result_path_pattern", default_value = "*build/reports/kover/xml")]
    result_path_pattern: String,

    /// Variant to run (case-insensitive); empty runs every variant
    #[arg(long, env = "variant", default_value = "")]
    variant: String,

    /// Module to run; empty runs every module
    #[arg(long, env = "module", default_value = "")]
    module: String,

    /// Extra Gradle arguments, split with shell quoting rules
    #[arg(long, env = "arguments", default_value = "", allow_hyphen_values = true)]
    arguments: String,

    /// What to collect for the build cache
    #[arg(long, env = "cache_level", value_enum, default_value_t = CacheLevelArg::OnlyDeps)]
    cache_level: CacheLevelArg,

    /// Log at debug level
    #[arg(
        long,
        env = "is_debug",
        action = ArgAction::Set,
        default_value_t = false,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    is_debug: bool,

    /// Directory the zipped reports are exported to
    #[arg(long, env = "BITRISE_DEPLOY_DIR", default_value = "")]
    deploy_dir: String,

    /// Test addon result directory; empty disables the test addon export
    #[arg(long, env = "BITRISE_TEST_RESULT_DIR", default_value = "")]
    test_result_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CacheLevelArg {
    None,
    #[value(name = "only_deps")]
    OnlyDeps,
    All,
}

impl From<CacheLevelArg> for CacheLevel {
    fn from(arg: CacheLevelArg) -> Self {
        match arg {
            CacheLevelArg::None => Self::None,
            CacheLevelArg::OnlyDeps => Self::OnlyDeps,
            CacheLevelArg::All => Self::All,
        }
    }
}

impl Cli {
    fn into_inputs(self) -> StepInputs {
        StepInputs {
            project_location: self.project_location,
            html_pattern: self.report_path_pattern,
            xml_pattern: self.result_path_pattern,
            variant: self.variant,
            module: self.module,
            arguments: self.arguments,
            cache_level: CacheLevel::from(self.cache_level).as_str().to_owned(),
            is_debug: self.is_debug,
            deploy_dir: self.deploy_dir,
            test_result_dir: self.test_result_dir,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.is_debug);

    if let Err(msg) = run(cli) {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging already initialised: {e}");
    }
}

fn run(cli: Cli) -> CliResult {
    let inputs = cli.into_inputs();
    log_inputs(&inputs)?;

    let config = Config::from_inputs(&inputs)?;
    let factory = CommandFactory::new();
    let cache = EnvmanCacheCollector::new(factory.clone());

    let report = Step::new(&config, factory, &cache).run()?;
    tracing::debug!(
        "exported {} HTML and {} XML report archives",
        report.html.len(),
        report.xml.len()
    );
    Ok(())
}

fn log_inputs(inputs: &StepInputs) -> CliResult {
    let serde_json::Value::Object(fields) = serde_json::to_value(inputs)? else {
        return Ok(());
    };
    tracing::info!("Configs:");
    for (name, value) in &fields {
        if let Some(s) = value.as_str() {
            tracing::info!("- {name}: {s}");
        } else {
            tracing::info!("- {name}: {value}");
        }
    }
    Ok(())
}
