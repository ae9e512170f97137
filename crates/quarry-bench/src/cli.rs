use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use quarry_engine::{open_engine_with, Backend, EngineOptions, StorageEngine};
use quarry_model::{ColumnId, Record};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    about = "Load a dataset into a quarry storage engine and time range, extremum and aggregate queries.",
    after_help = "Examples:\n  quarry_bench data/airnow columnar --col Value --min 0 --max 100 --threads 8\n  quarry_bench worldbank.csv node --col Population --min 1e7 --max 1e8 --year 2019"
)]
pub struct Args {
    /// Data file, or a directory searched recursively.
    pub path: PathBuf,

    /// Storage backend: columnar (vector, soa) or node (map, list, aos).
    pub backend: Backend,

    /// Column for the range query.
    #[arg(long, default_value = "Population")]
    pub col: ColumnId,

    /// Inclusive lower bound, parsed according to the column type.
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub min: String,

    /// Inclusive upper bound.
    #[arg(long, default_value = "1e18", allow_hyphen_values = true)]
    pub max: String,

    /// Year for the aggregate query.
    #[arg(long, default_value_t = 2020, allow_hyphen_values = true)]
    pub year: i32,

    /// Worker threads. Defaults to QUARRY_THREADS, then RAYON_NUM_THREADS, then the core count,
    /// so runs are parallel unless `--threads 1` is given.
    #[arg(long)]
    pub threads: Option<usize>,

    /// File extension matched inside directories.
    #[arg(long)]
    pub ext: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One timed step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stage {
    pub operation: &'static str,
    pub column: String,
    pub arg: String,
    pub result: String,
    pub count: usize,
    pub ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub dataset: String,
    #[serde(rename = "impl")]
    pub backend: String,
    pub kind: String,
    pub mode: &'static str,
    pub threads: usize,
    pub rows: usize,
    pub stages: Vec<Stage>,
}

pub const CSV_HEADER: &str = "dataset,impl,mode,operation,column,arg,result,count,ms";

impl Report {
    /// Write the report as CSV rows under [`CSV_HEADER`]. Fields are quoted when needed.
    pub fn write_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer
            .write_record(CSV_HEADER.split(','))
            .map_err(csv_to_io)?;
        for stage in &self.stages {
            let count = stage.count.to_string();
            let ms = format!("{:.3}", stage.ms);
            writer
                .write_record([
                    self.dataset.as_str(),
                    self.backend.as_str(),
                    self.mode,
                    stage.operation,
                    stage.column.as_str(),
                    stage.arg.as_str(),
                    stage.result.as_str(),
                    count.as_str(),
                    ms.as_str(),
                ])
                .map_err(csv_to_io)?;
        }
        writer.flush()
    }
}

/// Keep the underlying io error so a closed stdout is still recognised as a broken pipe.
fn csv_to_io(err: csv::Error) -> std::io::Error {
    match err.into_kind() {
        csv::ErrorKind::Io(err) => err,
        other => std::io::Error::other(format!("{other:?}")),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn metric(record: Option<&Record>) -> String {
    record
        .map(|r| r.numeric_value().to_string())
        .unwrap_or_default()
}

fn dataset_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build the engine and time each query.
pub fn benchmark(args: &Args) -> Result<Report> {
    let mut options = EngineOptions::default();
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }
    if let Some(ext) = &args.ext {
        options = options.with_extension(ext.clone());
    }

    let start = Instant::now();
    let engine = open_engine_with(args.backend, &args.path, &options)
        .with_context(|| format!("failed to load {}", args.path.display()))?;
    let load_ms = elapsed_ms(start);

    let mut stages = vec![Stage {
        operation: "load",
        column: String::new(),
        arg: String::new(),
        result: String::new(),
        count: engine.len(),
        ms: load_ms,
    }];
    stages.extend(run_queries(&*engine, args));

    Ok(Report {
        dataset: dataset_label(&args.path),
        backend: engine.backend().to_string(),
        kind: engine.kind().to_string(),
        mode: if engine.threads() > 1 {
            "parallel"
        } else {
            "serial"
        },
        threads: engine.threads(),
        rows: engine.len(),
        stages,
    })
}

fn run_queries(engine: &dyn StorageEngine, args: &Args) -> Vec<Stage> {
    let mut stages = Vec::with_capacity(4);

    let start = Instant::now();
    let rows = engine.find_by_range(args.col, &args.min, &args.max);
    let ms = elapsed_ms(start);
    stages.push(Stage {
        operation: "find_by_range",
        column: args.col.to_string(),
        arg: format!("[{};{}]", args.min, args.max),
        result: rows.len().to_string(),
        count: rows.len(),
        ms,
    });

    let start = Instant::now();
    let sum = engine.sum_by_year(args.year);
    let ms = elapsed_ms(start);
    let year = args.year.to_string();
    let year_rows = engine.find_by_range(ColumnId::Year, &year, &year).len();
    stages.push(Stage {
        operation: "sum_by_year",
        column: ColumnId::Year.to_string(),
        arg: year,
        result: sum.to_string(),
        count: year_rows,
        ms,
    });

    let extremes: [(&'static str, fn(&dyn StorageEngine) -> Option<Record>); 2] = [
        ("find_min", |engine| engine.find_min()),
        ("find_max", |engine| engine.find_max()),
    ];
    for (operation, find) in extremes {
        let start = Instant::now();
        let found = find(engine);
        let ms = elapsed_ms(start);
        if let Some(record) = &found {
            log::info!("{operation}: {}", record.display(engine.dictionaries()));
        }
        stages.push(Stage {
            operation,
            column: ColumnId::Value.to_string(),
            arg: String::new(),
            result: metric(found.as_ref()),
            count: engine.len(),
            ms,
        });
    }

    stages
}

pub fn run_with_args(args: Args, out: &mut dyn Write) -> Result<()> {
    let report = benchmark(&args)?;
    match args.format {
        OutputFormat::Text => report.write_text(out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Parse CLI arguments from the process and run. A closed stdout is not an error.
pub fn run() -> Result<()> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match run_with_args(args, &mut handle) {
        Err(err) if is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_quotes_fields_containing_commas() {
        let report = Report {
            dataset: "fires, 2020.csv".to_string(),
            backend: "columnar".to_string(),
            kind: "incident".to_string(),
            mode: "serial",
            threads: 1,
            rows: 3,
            stages: vec![Stage {
                operation: "find_by_range",
                column: "Value".to_string(),
                arg: "[0;10]".to_string(),
                result: "2".to_string(),
                count: 2,
                ms: 1.25,
            }],
        };
        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"fires, 2020.csv\",columnar,serial,find_by_range,Value,[0;10],2,2,1.250"
        );
    }

    #[test]
    fn defaults_match_the_documented_cli() {
        let args = Args::try_parse_from(["quarry_bench", "data.csv", "vector"]).unwrap();
        assert_eq!(args.backend, Backend::Columnar);
        assert_eq!(args.col, ColumnId::Population);
        assert_eq!(args.min, "0");
        assert_eq!(args.max, "1e18");
        assert_eq!(args.year, 2020);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn threads_default_to_the_core_count_and_say_so() {
        use clap::CommandFactory;

        let args = Args::try_parse_from(["quarry_bench", "d", "columnar"]).unwrap();
        assert_eq!(args.threads, None);

        let command = Args::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "threads")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap();
        assert!(help.contains("core count"), "{help}");
        assert!(help.contains("parallel unless `--threads 1`"), "{help}");
    }

    #[test]
    fn column_aliases_and_errors() {
        let args = Args::try_parse_from([
            "quarry_bench", "d", "map", "--col", "AQI", "--min", "-5", "--max", "50",
        ])
        .unwrap();
        assert_eq!(args.backend, Backend::Node);
        assert_eq!(args.col, ColumnId::QualityIndex);
        assert_eq!(args.min, "-5");

        assert!(Args::try_parse_from(["quarry_bench", "d", "map", "--col", "Nope"]).is_err());
        assert!(Args::try_parse_from(["quarry_bench", "d", "btree"]).is_err());
    }
}
