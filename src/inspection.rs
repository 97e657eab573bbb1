//! Инспекция данных: типы колонок, описательная статистика, пропуски
//!
//! Стратегии взаимозаменяемы: `DataInspector` держит одну из них и
//! применяет к любой таблице, реализующей `Tabular`.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{EngineeredLaptop, RawLaptop, RawPrice};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(value.to_string())
        }
    }

    fn number(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Значение для записи в CSV
    pub fn to_field(&self) -> String {
        match self {
            Cell::Number(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
            Cell::Missing => String::new(),
        }
    }
}

/// Строка, которую можно разложить по колонкам
pub trait Tabular {
    fn column_names() -> Vec<&'static str>;
    fn cells(&self) -> Vec<Cell>;
}

impl Tabular for RawLaptop {
    fn column_names() -> Vec<&'static str> {
        vec![
            "Company",
            "TypeName",
            "Inches",
            "ScreenResolution",
            "Cpu",
            "Ram",
            "Memory",
            "Gpu",
            "OpSys",
            "Weight",
            "Price",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.company),
            Cell::text(&self.type_name),
            Cell::number(self.inches),
            Cell::text(&self.screen_resolution),
            Cell::text(&self.cpu),
            Cell::text(&self.ram),
            Cell::text(&self.memory),
            Cell::text(&self.gpu),
            Cell::text(&self.op_sys),
            Cell::text(&self.weight),
            match &self.price {
                RawPrice::Number(value) => Cell::number(*value),
                RawPrice::Text(text) => Cell::text(text),
            },
        ]
    }
}

impl Tabular for EngineeredLaptop {
    fn column_names() -> Vec<&'static str> {
        vec![
            "Company",
            "TypeName",
            "Ram",
            "Weight",
            "Touchscreen",
            "IPS",
            "ppi",
            "Cpu brand",
            "HDD",
            "SSD",
            "Gpu brand",
            "os",
            "Price",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let f = &self.features;
        vec![
            Cell::text(&f.company),
            Cell::text(&f.type_name),
            Cell::number(f.ram),
            Cell::number(f.weight),
            Cell::Number(f.touchscreen as f64),
            Cell::Number(f.ips as f64),
            Cell::number(f.ppi),
            Cell::Text(f.cpu_brand.to_string()),
            Cell::Number(f.hdd as f64),
            Cell::Number(f.ssd as f64),
            Cell::text(&f.gpu_brand),
            Cell::Text(f.os.to_string()),
            Cell::number(self.price),
        ]
    }
}

/// Таблица в виде колонок и ячеек
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn from_rows<T: Tabular>(rows: &[T]) -> Self {
        Self {
            columns: T::column_names().into_iter().map(str::to_string).collect(),
            rows: rows.iter().map(T::cells).collect(),
        }
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Text,
    Mixed,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub column: String,
    pub dtype: ColumnType,
    pub non_null: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Выборочное (n - 1); нет при count < 2
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectionReport {
    Datatypes { columns: Vec<ColumnInfo> },
    Summary {
        numeric: Vec<NumericSummary>,
        categorical: Vec<CategoricalSummary>,
    },
    MissingValues { columns: Vec<MissingCount> },
}

pub trait InspectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn inspect(&self, frame: &Frame) -> InspectionReport;
}

fn column_type(frame: &Frame, idx: usize) -> ColumnType {
    let (mut numbers, mut texts) = (0, 0);
    for cell in frame.column(idx) {
        match cell {
            Cell::Number(_) => numbers += 1,
            Cell::Text(_) => texts += 1,
            Cell::Missing => {}
        }
    }
    match (numbers, texts) {
        (0, 0) => ColumnType::Empty,
        (_, 0) => ColumnType::Numeric,
        (0, _) => ColumnType::Text,
        _ => ColumnType::Mixed,
    }
}

/// Типы колонок и число непустых значений
pub struct DatatypesInspection;

impl InspectionStrategy for DatatypesInspection {
    fn name(&self) -> &'static str {
        "datatypes"
    }

    fn inspect(&self, frame: &Frame) -> InspectionReport {
        let columns = frame
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| ColumnInfo {
                column: column.clone(),
                dtype: column_type(frame, idx),
                non_null: frame.column(idx).filter(|c| !c.is_missing()).count(),
            })
            .collect();
        InspectionReport::Datatypes { columns }
    }
}

/// Перцентиль с линейной интерполяцией; `sorted` не пустой
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn numeric_summary(column: &str, mut values: Vec<f64>) -> NumericSummary {
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values[0],
        q25: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q75: percentile(&values, 0.75),
        max: values[count - 1],
    }
}

fn categorical_summary(column: &str, values: Vec<&str>) -> CategoricalSummary {
    // порядок первого появления, чтобы при равных частотах результат был стабильным
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &value in &values {
        match index.get(value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value, order.len());
                order.push((value, 1));
            }
        }
    }

    let (top, freq) = order
        .iter()
        .fold(("", 0), |best, &(value, n)| if n > best.1 { (value, n) } else { best });

    CategoricalSummary {
        column: column.to_string(),
        count: values.len(),
        unique: order.len(),
        top: top.to_string(),
        freq,
    }
}

/// describe() для числовых и категориальных колонок
pub struct SummaryStatisticsInspection;

impl InspectionStrategy for SummaryStatisticsInspection {
    fn name(&self) -> &'static str {
        "summary_statistics"
    }

    fn inspect(&self, frame: &Frame) -> InspectionReport {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for (idx, column) in frame.columns.iter().enumerate() {
            match column_type(frame, idx) {
                ColumnType::Numeric => {
                    let values = frame
                        .column(idx)
                        .filter_map(|c| match c {
                            Cell::Number(v) => Some(*v),
                            _ => None,
                        })
                        .collect();
                    numeric.push(numeric_summary(column, values));
                }
                ColumnType::Text => {
                    let values = frame
                        .column(idx)
                        .filter_map(|c| match c {
                            Cell::Text(t) => Some(t.as_str()),
                            _ => None,
                        })
                        .collect();
                    categorical.push(categorical_summary(column, values));
                }
                ColumnType::Mixed | ColumnType::Empty => {}
            }
        }

        InspectionReport::Summary { numeric, categorical }
    }
}

/// Колонки, в которых есть пропуски
pub struct MissingValuesInspection;

impl InspectionStrategy for MissingValuesInspection {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn inspect(&self, frame: &Frame) -> InspectionReport {
        let columns = frame
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| MissingCount {
                column: column.clone(),
                missing: frame.column(idx).filter(|c| c.is_missing()).count(),
            })
            .filter(|m| m.missing > 0)
            .collect();
        InspectionReport::MissingValues { columns }
    }
}

pub struct DataInspector {
    strategy: Box<dyn InspectionStrategy>,
}

impl DataInspector {
    pub fn new(strategy: impl InspectionStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn configure_strategy(&mut self, strategy: impl InspectionStrategy + 'static) {
        self.strategy = Box::new(strategy);
    }

    pub fn run_inspection<T: Tabular>(&self, rows: &[T]) -> InspectionReport {
        let frame = Frame::from_rows(rows);
        tracing::debug!("Running {} inspection on {} rows", self.strategy.name(), frame.rows.len());
        let report = self.strategy.inspect(&frame);

        match &report {
            InspectionReport::Datatypes { columns } => {
                for info in columns {
                    tracing::info!("{}: {:?}, {} non-null", info.column, info.dtype, info.non_null);
                }
            }
            InspectionReport::Summary { numeric, categorical } => {
                tracing::info!(
                    "Summary of {} rows: {} numeric, {} categorical columns",
                    frame.rows.len(),
                    numeric.len(),
                    categorical.len()
                );
            }
            InspectionReport::MissingValues { columns } if columns.is_empty() => {
                tracing::info!("No missing values found");
            }
            InspectionReport::MissingValues { columns } => {
                for missing in columns {
                    tracing::warn!("{}: {} missing values", missing.column, missing.missing);
                }
            }
        }

        report
    }
}

impl Default for DataInspector {
    fn default() -> Self {
        Self::new(DatatypesInspection)
    }
}
