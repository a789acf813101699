//! qb64port - Port legacy BASIC programs to QB64
//!
//! This is the command-line interface for the qb64port pipeline.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

use qb64port::diagnostics::analyze;
use qb64port::porting::{Porter, PortingOptions, SourceDialect};
use qb64port::report::Severity;

/// qb64port - Port QBasic, QuickBASIC and GW-BASIC programs to QB64
#[derive(Parser, Debug)]
#[command(name = "qb64port")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input BASIC source file (.bas)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (default: print the ported program)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Source dialect: qbasic, quickbasic or gwbasic
    #[arg(long, default_value = "qbasic")]
    dialect: String,

    /// Rewrite QB64-only idioms and add $Resize and _Title
    #[arg(long)]
    modern: bool,

    /// Window title for the injected _Title line
    #[arg(long, value_name = "TEXT")]
    title: Option<String>,

    /// Leave SLEEP, WAIT and SCREEN statements alone
    #[arg(long)]
    no_graphics: bool,

    /// Add performance advisories to the warnings
    #[arg(long)]
    optimize: bool,

    /// Only diagnose the input, without porting it
    #[arg(long)]
    analyze: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let source_dialect = match args.dialect.parse::<SourceDialect>() {
        Ok(d) => d,
        Err(e) => fail(e),
    };
    let options = PortingOptions {
        source_dialect,
        add_modern_features: args.modern,
        convert_graphics: !args.no_graphics,
        optimize_performance: args.optimize,
        window_title: args.title.clone(),
        ..PortingOptions::default()
    };

    // Read source file
    let source = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => fail(format!("reading '{}': {}", args.input.display(), e)),
    };

    if args.verbose {
        eprintln!("Porting: {} ({})", args.input.display(), options.source_dialect);
        eprintln!("Source length: {} bytes", source.len());
    }

    if args.analyze {
        let analysis = analyze(&source, &options);
        if args.json {
            match serde_json::to_string_pretty(&analysis) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(e),
            }
        } else {
            for warning in &analysis.warnings {
                println!("warning: {}", warning);
            }
            for error in &analysis.errors {
                println!("error: {}", error);
            }
            println!("{}", analysis.summary);
        }
        return;
    }

    let porter = match Porter::new(options) {
        Ok(p) => p,
        Err(e) => fail(e),
    };
    let result = porter.transform(&source);

    if let Some(path) = &args.output {
        if let Err(e) = fs::write(path, result.ported_code()) {
            fail(format!("writing '{}': {}", path.display(), e));
        }
        if args.verbose {
            eprintln!("Wrote {}", path.display());
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
        return;
    }

    if args.output.is_none() {
        print!("{}", result.ported_code());
    }

    // The report goes to stderr so the ported program can be piped
    for t in result.transformations() {
        eprintln!("  {}", t);
    }
    for (severity, messages) in [
        (Severity::Warning, result.warnings()),
        (Severity::Error, result.errors()),
    ] {
        let label = match severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        for message in messages {
            eprintln!("{}: {}", label, message);
        }
    }
    eprintln!("{}", result.summary());
}
