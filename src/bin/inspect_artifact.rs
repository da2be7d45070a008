use anyhow::{Context, Result};
use bansos_pipeline::report;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::ColumnChunkMetaData;
use std::{env, fs::File, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to the artifact.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <ARTIFACT_PARQUET>", args[0]);
        exit(1);
    }
    let path = Path::new(&args[1]);
    if !path.is_file() {
        eprintln!(
            "Error: {} not found; run `bansos-pipeline run` to produce it",
            path.display()
        );
        exit(2);
    }
    match inspect_artifact(path) {
        Ok(true) => {}
        Ok(false) => exit(3),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

/// Print file metadata and per-column details, then check the schema
/// against the reader contract. Returns whether the contract holds.
fn inspect_artifact(path: &Path) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet footer of {}", path.display()))?;
    let meta = builder.metadata();
    let file_meta = meta.file_metadata();

    println!("=== Artifact: {} ===", path.display());
    println!(
        "Created by:           {}",
        file_meta.created_by().unwrap_or("<unknown>")
    );
    println!("Total rows:           {}", file_meta.num_rows());
    println!("Number of row groups: {}", meta.num_row_groups());
    println!("File size on disk:    {} bytes", std::fs::metadata(path)?.len());
    println!();

    println!("=== Columns ===");
    for field in builder.schema().fields() {
        println!(
            "- {:<20} | {:<8} | nullable: {}",
            field.name(),
            field.data_type(),
            field.is_nullable()
        );
    }
    println!();

    for rg_idx in 0..meta.num_row_groups() {
        let rg = meta.row_group(rg_idx);
        println!("--- Row Group {} ({} rows) ---", rg_idx, rg.num_rows());
        for col in rg.columns() {
            print_column_chunk(col);
        }
        println!();
    }

    match report::validate_schema(builder.schema()) {
        Ok(()) => {
            println!("Contract: OK");
            Ok(true)
        }
        Err(e) => {
            println!("Contract: VIOLATED ({})", e);
            Ok(false)
        }
    }
}

fn print_column_chunk(col: &ColumnChunkMetaData) {
    println!("  > {}", col.column_descr().name());
    println!("    • Compression:       {:?}", col.compression());
    println!("    • Compressed size:   {} bytes", col.compressed_size());
    if let Some(null_count) = col.statistics().and_then(|s| s.null_count_opt()) {
        println!("    • Null count:        {}", null_count);
    }
}
