//! Command-line interface for xsdgen

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsdgen::{
    load_model, process_schema, CommandEmitter, DuplicateKeyPolicy, GeneratorConfig,
    JsonEmitter, MissingIdentifierPolicy, SchemaSource,
};

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdgen")]
#[command(author, version, about = "XML Schema to object model and code generation driver", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the object model of a schema as JSON
    Dump {
        #[command(flatten)]
        source: SourceArgs,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// List the top-level constructs of a schema
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Run a generator program once per top-level construct
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Generator program; receives the construct name as last argument
        #[arg(short, long, required_unless_present = "dry_run")]
        generator: Option<String>,

        /// Extra argument for the generator, placed before the name
        #[arg(long = "generator-arg", value_name = "ARG", allow_hyphen_values = true)]
        generator_args: Vec<String>,

        /// Print one JSON line per construct instead of running a generator
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct SourceArgs {
    /// Schema path or URL
    #[arg(value_name = "SCHEMA")]
    schema: Option<String>,

    /// Local schema file
    #[arg(long, value_name = "FILE")]
    schema_file: Option<PathBuf>,

    /// Schema URL
    #[arg(long, value_name = "URL")]
    schema_url: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra namespace binding, as PREFIX=URI
    #[arg(short = 'n', long = "namespace", value_name = "PREFIX=URI")]
    namespaces: Vec<String>,

    /// Let a later sibling replace an earlier one with the same name
    #[arg(long)]
    last_wins: bool,

    /// Skip constructs that have neither 'name' nor 'ref'
    #[arg(long)]
    skip_unnamed: bool,

    /// Allow a DTD in the schema document
    #[arg(long)]
    allow_dtd: bool,
}

#[cfg(feature = "cli")]
impl SourceArgs {
    fn into_config(self) -> CliResult<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::new(),
        };

        // a source on the command line replaces the one from the file
        if self.schema.is_some() || self.schema_file.is_some() || self.schema_url.is_some() {
            config.schema_file = None;
            config.schema_url = None;
        }
        if let Some(schema) = &self.schema {
            match SchemaSource::parse(schema)? {
                SchemaSource::File(path) => config.schema_file = Some(path),
                SchemaSource::Url(url) => config.schema_url = Some(url.to_string()),
            }
        }
        if let Some(path) = self.schema_file {
            config.schema_file = Some(path);
        }
        if let Some(url) = self.schema_url {
            config.schema_url = Some(url);
        }

        for binding in &self.namespaces {
            let (prefix, uri) = binding
                .split_once('=')
                .ok_or_else(|| format!("namespace binding '{}' is not PREFIX=URI", binding))?;
            config = config.with_namespace(prefix.trim(), uri.trim());
        }

        if self.last_wins {
            config = config.with_duplicate_keys(DuplicateKeyPolicy::LastWins);
        }
        if self.skip_unnamed {
            config = config.with_missing_identifier(MissingIdentifierPolicy::Skip);
        }
        if self.allow_dtd {
            config = config.with_allow_dtd(true);
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Dump { source, compact } => cmd_dump(source, compact),
        Commands::Inspect { source, json } => cmd_inspect(source, json),
        Commands::Generate {
            source,
            generator,
            generator_args,
            dry_run,
        } => cmd_generate(source, generator, generator_args, dry_run),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_dump(source: SourceArgs, compact: bool) -> CliResult<()> {
    let config = source.into_config()?;
    let model = load_model(&config)?;

    if compact {
        println!("{}", serde_json::to_string(&model)?);
    } else {
        println!("{}", model.to_json_pretty()?);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(source: SourceArgs, json_output: bool) -> CliResult<()> {
    let config = source.into_config()?;
    let model = load_model(&config)?;
    let summaries = model.summaries(&config.bindings()?);

    if json_output {
        let entries: Vec<_> = summaries
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "type": s.type_ref,
                    "builtin": s.builtin.map(|b| b.name),
                    "children": s.children,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Schema: {}", config.source()?);
    println!("Constructs: {}", summaries.len());
    for summary in &summaries {
        let type_str = summary.type_ref.as_deref().unwrap_or("anonymous");
        match summary.builtin {
            Some(builtin) => println!(
                "  {} : {} (built-in, {:?}, {} facets)",
                summary.name,
                type_str,
                builtin.category,
                builtin.admitted_facets.len()
            ),
            None => println!("  {} : {}", summary.name, type_str),
        }
        if summary.children > 0 {
            println!("      {} nested", summary.children);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_generate(
    source: SourceArgs,
    generator: Option<String>,
    generator_args: Vec<String>,
    dry_run: bool,
) -> CliResult<()> {
    let config = source.into_config()?;

    let model = match generator {
        Some(program) if !dry_run => {
            let mut emitter = CommandEmitter::new(program).args(generator_args);
            process_schema(&config, &mut emitter)?
        }
        _ => {
            let stdout = std::io::stdout();
            let mut emitter = JsonEmitter::new(stdout.lock());
            process_schema(&config, &mut emitter)?
        }
    };

    eprintln!("Processed {} constructs", model.len());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
