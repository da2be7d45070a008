use anyhow::{Context, Result};
use bansos_pipeline::{
    config::PipelineConfig,
    process,
    report::{self, views},
    PipelineError, ReportError,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "bansos-pipeline",
    about = "Clean the bansos recipient registry and report on the result"
)]
struct Cli {
    /// YAML pipeline configuration; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the source extract and replace the Parquet artifact
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Single-character field delimiter of the source
        #[arg(long)]
        delimiter: Option<String>,
        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Print the aggregate views over an existing artifact
    Report {
        #[arg(long)]
        artifact: Option<PathBuf>,
        /// Restrict views to one province
        #[arg(long)]
        province: Option<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long, default_value_t = 18)]
        min_age: i64,
        #[arg(long, default_value_t = 55)]
        max_age: i64,
    },
}

fn main() {
    // logging goes to stderr; stdout carries the report and --json summary
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match execute(cli) {
        Ok(()) => 0,
        Err(err) => {
            error!("{:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

/// 2 = input/artifact not found, 3 = schema contract broken, 4 = undecodable.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        match e {
            PipelineError::SourceMissing { .. } => 2,
            PipelineError::SchemaMismatch { .. } => 3,
            PipelineError::Decode { .. } => 4,
            _ => 1,
        }
    } else if let Some(e) = err.downcast_ref::<ReportError>() {
        match e {
            ReportError::ArtifactMissing { .. } => 2,
            ReportError::SchemaViolation { .. } | ReportError::ColumnType { .. } => 3,
            _ => 1,
        }
    } else {
        1
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Run {
            input,
            output,
            delimiter,
            json,
        } => {
            if let Some(p) = input {
                cfg.input_path = p;
            }
            if let Some(p) = output {
                cfg.output_path = p;
            }
            if let Some(d) = delimiter {
                cfg.delimiter = d;
            }
            info!(
                input = %cfg.input_path.display(),
                output = %cfg.output_path.display(),
                "starting pipeline"
            );
            let summary = process::run(cfg)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("serializing run summary")?
                );
            }
            Ok(())
        }
        Command::Report {
            artifact,
            province,
            top,
            min_age,
            max_age,
        } => {
            let path = artifact.unwrap_or(cfg.output_path);
            let records = report::load(&path)?;
            print_report(&records, province.as_deref(), top, min_age, max_age);
            Ok(())
        }
    }
}

fn print_report(
    records: &[bansos_pipeline::CanonicalRecord],
    province: Option<&str>,
    top: usize,
    min_age: i64,
    max_age: i64,
) {
    let scope = province.unwrap_or("Semua Provinsi");
    println!("Penerima: {}", records.len());

    println!("\n== Jumlah penerima per provinsi dan status KSE ({}) ==", scope);
    for (prov, status, n) in views::counts_by_province_status(records, province) {
        println!("{:<28} {:<18} {:>8}", prov, status, n);
    }

    println!("\n== Rata-rata per provinsi ==");
    for s in views::province_stats(records) {
        println!(
            "{:<28} {:>8} usia {:>6.1} skor KSE {:>6.1}",
            s.province, s.recipients, s.mean_age, s.mean_kse
        );
    }

    let ranked_provinces = match province {
        Some(p) => vec![p.to_string()],
        None => views::provinces(records),
    };
    for prov in ranked_provinces {
        println!("\n== {} penerima dengan skor KSE terendah di {} ==", top, prov);
        for r in views::lowest_kse(records, &prov, top) {
            println!(
                "{:<28} {:>4} {:<20} {:<16} {:>4}",
                r.nama_penerima,
                r.usia,
                r.jenis_pekerjaan.as_deref().unwrap_or(views::UNKNOWN),
                r.status_kse.as_deref().unwrap_or(views::UNKNOWN),
                r.skor_kse
            );
        }
    }

    println!("\n== Distribusi jenis pekerjaan ({}) ==", scope);
    for (job, n) in views::occupation_distribution(records, province) {
        println!("{:<28} {:>8}", job, n);
    }

    println!(
        "\n== Pengangguran usia {}-{} tahun per provinsi ==",
        min_age, max_age
    );
    for (prov, n) in views::unemployed_by_province(records, min_age, max_age) {
        println!("{:<28} {:>8}", prov, n);
    }
}
