use std::path::PathBuf;

use anyhow::Context as AnyhowContext;
use clap::{Parser, Subcommand};
use flexi_logger::{FileSpec, LevelFilter, LogSpecification, Logger, LoggerHandle, WriteMode};

use appops::{Context, DefaultContext};

mod parsers;

mod ops;
use ops::Ops;

mod pkgs;
use pkgs::Pkgs;

mod modes;
use modes::Modes;

const VERSION_STRING: &'static str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "appops")]
#[command(version(VERSION_STRING))]
struct Cli {
    /// `-e`, `--log-stderr`: Flag value, when enabled will cause logs to be output to `stderr`
    /// instead of a log file. Disabled by default (logs go to a file by default)
    #[arg(short = 'e', long, help = "Log to stderr instead of a file", action = clap::ArgAction::SetTrue, default_value_t = false)]
    log_stderr: bool,

    /// `-f`, `--log-file`: Path to desired log output file location. Optional, defaults to
    /// `$APPOPS_PROJECT_HOME/appops_out/log`, then to the user configuration directory
    #[arg(short = 'f', long, help = "Send log output to the given file")]
    log_file: Option<PathBuf>,

    /// `-s`, `--log-spec`: Debug options for [flexi_logger](https://docs.rs/flexi_logger/latest/flexi_logger/struct.LogSpecification.html)
    #[arg(short = 's', long, help = "Log spec for flexi_logger")]
    log_spec: Option<String>,

    /// `-l`, `--log-level`: Set the desired log verbosity. Defaults to 0, all values are listed
    /// below:
    ///
    /// | Value | Log Level |
    /// | ----- | --------- |
    /// | **0** | **Warn** |
    /// | 1 | Info |
    /// | 2 | Debug |
    /// | 3 | Trace |
    #[arg(
        short = 'l',
        long,
        help = "Set the log level, 0 = warn, 1 = info, etc",
        long_help = None,
        default_value_t = 0
    )]
    log_level: u8,

    /// The command being called. See [Commands] for the implemented options
    #[command(subcommand)]
    command: Commands,
}

/// The currently implemented commands
#[derive(Subcommand)]
enum Commands {
    /// Display the version string and exit
    #[command()]
    Version,

    /// Inspect the op table
    #[command()]
    Ops(Ops),

    /// Query the installed packages on the device
    #[command()]
    Pkgs(Pkgs),

    /// Check and change op modes on the device
    #[command()]
    Modes(Modes),
}

fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl Cli {
    fn log_spec(&self) -> anyhow::Result<LogSpecification> {
        if let Some(s) = &self.log_spec {
            return LogSpecification::parse(s).with_context(|| format!("parsing log spec {}", s));
        }
        if self.log_level == 0 {
            return LogSpecification::env_or_parse("appops=warn")
                .with_context(|| "getting log spec from env");
        }
        Ok(LogSpecification::builder()
            .module("appops", level_filter(self.log_level))
            .build())
    }

    /// Where to write the log, `None` if there is nowhere sensible
    fn log_path(&self, ctx: &dyn Context) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = &self.log_file {
            if path.is_absolute() {
                return Ok(Some(path.clone()));
            }
            return Ok(Some(std::env::current_dir()?.join(path)));
        }
        let path = ctx
            .get_output_dir_child("log")
            .or_else(|_| ctx.get_user_config_dir().map(|d| d.join("log")));
        Ok(path.ok())
    }

    fn configure_loggers(&self, ctx: &dyn Context) -> anyhow::Result<LoggerHandle> {
        let mut logger = Logger::with(self.log_spec()?);

        if !self.log_stderr {
            if let Some(path) = self.log_path(ctx)? {
                let spec = FileSpec::try_from(path.as_path()).with_context(|| "creating filespec")?;
                logger = logger
                    .log_to_file(spec)
                    .append()
                    .write_mode(WriteMode::BufferAndFlush);
            }
        }

        logger.start().with_context(|| "starting logger")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = &cli.command {
        println!("{}", VERSION_STRING);
        return Ok(());
    }

    let ctx = DefaultContext::default();

    let log_handle = cli.configure_loggers(&ctx)?;

    let res = match cli.command {
        Commands::Ops(c) => c.run(),
        Commands::Pkgs(c) => c.run(&ctx),
        Commands::Modes(c) => c.run(&ctx),

        Commands::Version => panic!("unreachable"),
    };

    log_handle.flush();
    res
}
