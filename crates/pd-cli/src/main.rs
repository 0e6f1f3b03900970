use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pd_ast::{Diagnostics, Mode, Options, RuntimeMode};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pdc")]
#[command(about = "Palladium bootstrap compiler: translates Palladium source to C")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to C
    Compile {
        /// Path to .pd source file
        file: PathBuf,

        /// Output path (defaults to the input with a .c extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: OptionArgs,

        /// Inline the runtime shim so the output compiles standalone
        #[arg(long)]
        embed_runtime: bool,
    },

    /// Lex a source file and dump the token stream
    Tokens {
        /// Path to .pd source file
        file: PathBuf,

        #[command(flatten)]
        opts: OptionArgs,
    },

    /// Parse a source file and dump the AST
    Parse {
        /// Path to .pd source file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,

        #[command(flatten)]
        opts: OptionArgs,
    },
}

impl Commands {
    fn file(&self) -> &Path {
        match self {
            Commands::Compile { file, .. }
            | Commands::Tokens { file, .. }
            | Commands::Parse { file, .. } => file,
        }
    }
}

#[derive(clap::Args, Debug)]
struct OptionArgs {
    /// Fail on the first diagnostic of any kind
    #[arg(long)]
    strict: bool,

    /// JSON file with compile options; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_tokens: Option<usize>,

    #[arg(long)]
    max_nodes: Option<usize>,

    #[arg(long)]
    max_children: Option<usize>,

    #[arg(long)]
    max_depth: Option<usize>,
}

impl OptionArgs {
    fn resolve(&self) -> Result<Options> {
        let mut opts = match &self.config {
            Some(path) => pd_cli::load_options(path)?,
            None => Options::default(),
        };
        if self.strict {
            opts.mode = Mode::Strict;
        }
        if let Some(n) = self.max_tokens {
            opts.limits.max_tokens = n;
        }
        if let Some(n) = self.max_nodes {
            opts.limits.max_nodes = n;
        }
        if let Some(n) = self.max_children {
            opts.limits.max_children = n;
        }
        if let Some(n) = self.max_depth {
            opts.limits.max_depth = n;
        }
        Ok(opts)
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file = cli.command.file().display().to_string();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Diagnostics>() {
                Some(diags) => pd_cli::report(&file, diags),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(
        level,
        ConfigBuilder::new()
            .set_location_level(LevelFilter::Off)
            .set_time_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compile {
            file,
            output,
            opts,
            embed_runtime,
        } => {
            let mut opts = opts.resolve()?;
            if embed_runtime {
                opts.runtime = RuntimeMode::Embedded;
            }
            cmd_compile(&file, output, &opts)
        }
        Commands::Tokens { file, opts } => cmd_tokens(&file, &opts.resolve()?),
        Commands::Parse { file, format, opts } => cmd_parse(&file, format, &opts.resolve()?),
    }
}

fn cmd_compile(file: &Path, output: Option<PathBuf>, opts: &Options) -> Result<()> {
    let output = output.unwrap_or_else(|| file.with_extension("c"));
    let compilation = pd_cli::compile_file(file, &output, opts)?;
    pd_cli::report(&file.display().to_string(), &compilation.diagnostics);
    Ok(())
}

fn cmd_tokens(file: &Path, opts: &Options) -> Result<()> {
    let src = pd_cli::read_source(file)?;
    let lexed = pd_parse::tokenize(&src, opts)?;
    print!("{}", pd_cli::format_tokens(&lexed));
    pd_cli::report(&file.display().to_string(), &lexed.diagnostics);
    Ok(())
}

fn cmd_parse(file: &Path, format: Format, opts: &Options) -> Result<()> {
    let src = pd_cli::read_source(file)?;
    let parsed = pd_parse::parse_source(&src, opts)?;
    match format {
        Format::Pretty => print!("{}", pd_cli::format_ast(&parsed.ast)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&parsed.ast)?),
    }
    pd_cli::report(&file.display().to_string(), &parsed.diagnostics);
    Ok(())
}
