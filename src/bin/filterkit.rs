use clap::{Parser, Subcommand};
use filterkit::cli::{self as prog_cli, Command, OutputMode, RuleSource};
use filterkit::{FilterConfig, FilterError, logger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filterkit", version, about = "Validate and compile filter rule trees", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). Falls back to FILTERKIT_CONFIG, then ./filterkit.toml.")]
    config: Option<PathBuf>,
    #[arg(long, help = "log4rs YAML file; takes precedence over --log-dir/--log-level. Falls back to FILTERKIT_LOG_CONFIG.")]
    log_config: Option<PathBuf>,
    /// Directory for app.log and audit.log
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, default_value = "human", help = "human|plain|json")]
    output: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    #[arg(help = "Rule as JSON text", conflicts_with = "file", required_unless_present = "file")]
    rule: Option<String>,
    #[arg(long, help = "Read the rule from a file")]
    file: Option<PathBuf>,
    #[arg(long, requires = "file", help = "json|bson; inferred from the file extension when omitted")]
    format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Check a rule against the configured policy")]
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
    #[command(about = "Validate a rule and print the compiled query document")]
    Compile {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, requires = "parent_type", help = "Parent field for nested compilation")]
        parent: Option<String>,
        #[arg(long, requires = "parent", help = "object|array")]
        parent_type: Option<String>,
    },
    #[command(about = "List the fields a rule references")]
    Fields {
        #[command(flatten)]
        source: SourceArgs,
    },
    #[command(about = "Re-encode a rule file between json and bson")]
    Convert {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl SourceArgs {
    fn into_source(self) -> Result<RuleSource, FilterError> {
        match (self.rule, self.file) {
            (_, Some(path)) => Ok(RuleSource::File { path, format: prog_cli::parse_wire_format(self.format.as_deref())? }),
            (Some(text), None) => Ok(RuleSource::Inline(text)),
            (None, None) => Err(FilterError::Config("a rule or --file is required".into())),
        }
    }
}

fn to_command(cmd: Commands) -> Result<Command, FilterError> {
    Ok(match cmd {
        Commands::Validate { source } => Command::Validate { source: source.into_source()? },
        Commands::Compile { source, parent, parent_type } => Command::Compile {
            source: source.into_source()?,
            parent: prog_cli::parse_parent(parent.as_deref(), parent_type.as_deref())?,
        },
        Commands::Fields { source } => Command::Fields { source: source.into_source()? },
        Commands::Convert { file, from, to, out } => Command::Convert {
            input: file,
            from: prog_cli::parse_wire_format(from.as_deref())?,
            to: to.parse()?,
            out,
        },
    })
}

fn main() {
    let cli = Cli::parse();
    let mode: OutputMode = match cli.output.parse() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    let log_config = cli.log_config.clone().or_else(|| std::env::var_os("FILTERKIT_LOG_CONFIG").map(PathBuf::from));
    let logging = if let Some(path) = log_config.as_deref() {
        logger::init_path(path)
    } else if cli.log_dir.is_some() || cli.log_level.is_some() {
        logger::configure_logging(cli.log_dir.as_deref(), cli.log_level.as_deref(), None)
    } else {
        logger::configure_from_env()
    };
    if let Err(e) = logging {
        eprintln!("warning: logging disabled: {e}");
    }

    let r = FilterConfig::load(cli.config.as_deref()).and_then(|cfg| {
        let cmd = to_command(cli.command)?;
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        prog_cli::run_with_format(&cfg, cmd, mode, &mut lock)
    });
    if let Err(e) = r {
        match mode {
            OutputMode::Json => {
                let json = serde_json::json!({"error": e.to_string(), "rule_path": e.rule_path()});
                eprintln!("{json}");
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
