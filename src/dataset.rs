//! Загрузка исходной таблицы и сохранение обработанной

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::inspection::{Frame, Tabular};
use crate::types::{EngineeredLaptop, RawLaptop};

/// Строки из CSV; лишние колонки (безымянный индекс) игнорируются
pub fn read_raw_csv<R: Read>(source: R) -> Result<Vec<RawLaptop>> {
    let mut reader = Reader::from_reader(source);
    let mut rows = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: RawLaptop = result.with_context(|| format!("Failed to parse row {}", idx))?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawLaptop>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;
    let rows = read_raw_csv(file)?;

    tracing::info!("Loaded {} rows from {:?}", rows.len(), path.as_ref());
    Ok(rows)
}

pub fn write_engineered_csv<W: Write>(table: &[EngineeredLaptop], sink: W) -> Result<()> {
    let frame = Frame::from_rows(table);
    let mut writer = Writer::from_writer(sink);

    writer.write_record(&frame.columns)?;
    for row in &frame.rows {
        writer.write_record(row.iter().map(|cell| cell.to_field()))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_engineered_csv<P: AsRef<Path>>(table: &[EngineeredLaptop], path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;
    write_engineered_csv(table, file)?;

    tracing::info!(
        "Saved {} engineered rows ({} columns) to {:?}",
        table.len(),
        EngineeredLaptop::column_names().len(),
        path.as_ref()
    );
    Ok(())
}
