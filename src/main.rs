use std::path::PathBuf;

use clap::Parser;
use scoped_env::keys::KeyRegistry;
use scoped_env::options::{OutputFormat, RenderOptions};
use scoped_env::{errors::Result, parse_override};
use tracing::Level;

/// Render the environment demo tree and show what each view reads.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file with render options (format, indent, wrap, overrides)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Render ContentView without the wrapper, so defaults show through
    #[arg(long)]
    bare: bool,
    /// Override a key, e.g. --set 'myData={"name":"Carol","age":40}'
    #[arg(long = "set", value_name = "KEY=JSON")]
    overrides: Vec<String>,
    /// List the known keys with their defaults and exit
    #[arg(long)]
    keys: bool,
    /// Print every key as MyView resolves it, as JSON, instead of the tree
    #[arg(long)]
    describe: bool,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Spaces per tree level in text output
    #[arg(long)]
    indent: Option<usize>,
    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("envtree: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let registry = KeyRegistry::with_builtins();

    if args.keys {
        for name in registry.names() {
            println!("{name} = {}", registry.default_json(name)?);
        }
        return Ok(());
    }

    // Config file first, flags on top.
    let mut opts = match args.config.as_ref() {
        Some(path) => RenderOptions::from_path(path)?,
        None => RenderOptions::default(),
    };
    if args.bare { opts.wrap = false; }
    if let Some(format) = args.format { opts.format = format; }
    if let Some(indent) = args.indent { opts.indent = indent; }
    for spec in &args.overrides {
        let (key, value) = parse_override(spec)?;
        opts.overrides.insert(key, value);
    }

    if args.describe {
        let sample = scoped_env::sample_tree(&opts, &registry)?;
        let env = sample.tree.environment(sample.my_view);
        let described = serde_json::Value::Object(registry.describe(&env)?);
        println!("{described:#}");
        return Ok(());
    }

    println!("{}", scoped_env::render_sample_to_string(&opts)?);
    Ok(())
}
