mod repl;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use latcalc::{load_environment, Calculator, Callable, Environment};
use log::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// enable debug logging
    #[arg(short, long, env = "LATCALC_DEBUG")]
    debug: bool,

    /// set log level
    #[arg(long, value_enum, env = "LATCALC_LOG", default_value = "warn")]
    log_level: LogLevel,

    /// JSON file describing variables to preload
    #[arg(long, global = true, env = "LATCALC_ENV", value_name = "FILE")]
    env: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// evaluate an expression and print the result
    Eval {
        #[arg(name = "EXPR")]
        expression: String,
    },
    /// tabulate an expression in one variable over a range
    Sample {
        #[arg(name = "EXPR")]
        expression: String,

        #[arg(long, default_value_t = 'x')]
        var: char,

        #[arg(long, allow_negative_numbers = true)]
        min: f64,

        #[arg(long, allow_negative_numbers = true)]
        max: f64,

        #[arg(long, default_value_t = 11)]
        points: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        cli.log_level.into()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .filter_level(level)
        .init();

    info!("latcalc v{} starting", env!("CARGO_PKG_VERSION"));

    let env = match &cli.env {
        Some(path) => read_environment(path)?,
        None => Environment::new(),
    };

    match cli.command {
        Some(Commands::Eval { expression }) => {
            let calculator = Calculator::with_environment(env);
            let parsed = calculator.parse(&expression)?;
            debug!("parsed: {}", parsed);
            println!("{}", calculator.evaluate_expression(&parsed)?);
        }
        Some(Commands::Sample {
            expression,
            var,
            min,
            max,
            points,
        }) => {
            let callable = Callable::with_environment(&expression, var, env)?;
            let samples = callable.sample(min, max, points)?;
            debug!("{} of {} points evaluated", samples.len(), points);
            println!("{}\tf({})", callable.variable(), callable.variable());
            for (x, y) in samples {
                println!("{}\t{}", x, y);
            }
        }
        None => repl::start(Calculator::with_environment(env))?,
    }

    Ok(())
}

fn read_environment(path: &Path) -> Result<Environment> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let env = load_environment(&json)
        .with_context(|| format!("could not load {}", path.display()))?;
    info!("loaded variables {:?} from {}", env.names(), path.display());
    Ok(env)
}
