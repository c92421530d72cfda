//! rowscope CLI - filter, group and analyze CSV rows
//!
//! # Main Commands
//!
//! ```bash
//! rowscope serve                                   # Start HTTP server (port 3000)
//! rowscope analyze a.csv b.csv --group-by team     # Run a pipeline over files
//! rowscope analyze tasks.csv --plan plan.json      # Run a saved plan
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! rowscope parse input.csv         # Just parse CSV to JSON
//! rowscope steps                   # Show available plan steps
//! rowscope example-plan            # Show example analysis plan
//! ```

use clap::{Parser, Subcommand};
use rowscope::{
    analysis::format_delimiter,
    api::logs::set_quiet,
    error::{AnalysisResult, ServerResult},
    parse_csv_file_auto, steps_description, Analysis, AnalysisError, AnalysisPlan, ServerConfig,
    Step,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowscope")]
#[command(about = "Filter, deduplicate, group and analyze CSV rows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load files, apply transforms and compute views
    Analyze {
        /// Input CSV files, loaded in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Saved plan (JSON); flags below are applied after its steps
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Keep rows where these columns are all present and non-empty
        #[arg(long, value_delimiter = ',')]
        filter: Vec<String>,

        /// Keep only these columns
        #[arg(long, value_delimiter = ',')]
        pluck: Vec<String>,

        /// Keep the first row per combination of these columns
        #[arg(long, value_delimiter = ',')]
        dedupe: Vec<String>,

        /// Group by one column, or by several (pipe-joined keys)
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,

        /// Partition into true / false / undefined on this column
        #[arg(long)]
        group_by_boolean: Option<String>,

        /// Bucket rows by days since this date column
        #[arg(long)]
        date_column: Option<String>,

        /// Tally true / false values of this column
        #[arg(long)]
        boolean_column: Option<String>,

        /// Leave the transformed rows out of the report
        #[arg(long)]
        no_records: bool,

        /// Read files in parallel
        #[arg(long)]
        concurrent: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress progress logs
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show example analysis plan
    ExamplePlan,

    /// Show available plan steps
    Steps,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: ROWSCOPE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Command-line pipeline options, merged into a plan.
#[derive(Debug, Default)]
struct PlanFlags {
    plan: Option<PathBuf>,
    filter: Vec<String>,
    pluck: Vec<String>,
    dedupe: Vec<String>,
    group_by: Vec<String>,
    group_by_boolean: Option<String>,
    date_column: Option<String>,
    boolean_column: Option<String>,
    no_records: bool,
}

impl PlanFlags {
    /// Saved plan (if any) merged with the flags.
    fn build_plan(self) -> AnalysisResult<AnalysisPlan> {
        let base = match &self.plan {
            Some(path) => AnalysisPlan::from_json(&fs::read_to_string(path)?)?,
            None => AnalysisPlan::default(),
        };
        Ok(self.merge_into(base))
    }

    /// Plan steps first, then flag steps in filter, pluck, dedupe order.
    /// View flags replace the plan's views when given.
    fn merge_into(self, mut plan: AnalysisPlan) -> AnalysisPlan {
        if !self.filter.is_empty() {
            plan.steps.push(Step::Filter { columns: self.filter });
        }
        if !self.pluck.is_empty() {
            plan.steps.push(Step::Pluck { columns: self.pluck });
        }
        if !self.dedupe.is_empty() {
            plan.steps.push(Step::Deduplicate { columns: self.dedupe });
        }

        if !self.group_by.is_empty() {
            plan.group_by = Some(self.group_by);
        }
        if self.group_by_boolean.is_some() {
            plan.group_by_boolean = self.group_by_boolean;
        }
        if self.date_column.is_some() {
            plan.date_column = self.date_column;
        }
        if self.boolean_column.is_some() {
            plan.boolean_column = self.boolean_column;
        }
        if self.no_records {
            plan.include_records = false;
        }

        plan
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Parse { input, output } => {
            cmd_parse(&input, output.as_deref()).map_err(Into::into)
        }

        Commands::Analyze {
            inputs,
            plan,
            filter,
            pluck,
            dedupe,
            group_by,
            group_by_boolean,
            date_column,
            boolean_column,
            no_records,
            concurrent,
            output,
            quiet,
        } => {
            set_quiet(quiet);
            let flags = PlanFlags {
                plan,
                filter,
                pluck,
                dedupe,
                group_by,
                group_by_boolean,
                date_column,
                boolean_column,
                no_records,
            };
            cmd_analyze(&inputs, flags, concurrent, output.as_deref())
                .await
                .map_err(Into::into)
        }

        Commands::ExamplePlan => cmd_example_plan().map_err(Into::into),

        Commands::Steps => {
            cmd_steps();
            Ok(())
        }

        Commands::Serve { port } => cmd_serve(port).await.map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> AnalysisResult<()> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}' (auto-detected)", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_analyze(
    inputs: &[PathBuf],
    flags: PlanFlags,
    concurrent: bool,
    output: Option<&Path>,
) -> AnalysisResult<()> {
    if inputs.is_empty() {
        return Err(AnalysisError::NoSources);
    }

    let plan = flags.build_plan()?;
    if !plan.has_views() {
        eprintln!("ℹ️  No view requested; the report holds the transformed rows only");
    }

    let mut analysis = Analysis::new();
    let load = if concurrent {
        analysis.load_concurrent(inputs).await
    } else {
        analysis.load(inputs)
    };

    if load.sources.is_empty() {
        return Err(AnalysisError::AllSourcesFailed(inputs.len()));
    }

    let report = analysis.run_plan(&plan);

    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, output)?;

    if load.has_failures() {
        eprintln!("⚠️  {} source(s) skipped", load.failures.len());
    }
    Ok(())
}

fn cmd_example_plan() -> AnalysisResult<()> {
    let plan = rowscope::example_plan();
    let json = plan.to_json()?;
    println!("{}", json);
    Ok(())
}

fn cmd_steps() {
    println!("{}", steps_description());
}

async fn cmd_serve(port: Option<u16>) -> ServerResult<()> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config = config.with_port(port);
    }
    rowscope::server::start_server(config).await
}

fn write_output(content: &str, path: Option<&Path>) -> AnalysisResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
