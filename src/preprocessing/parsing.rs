//! Разбор полуструктурированных текстовых полей

use regex::Regex;
use std::sync::OnceLock;

use crate::config::default_storage_rules;
use crate::error::ParseError;
use crate::types::{CpuBrand, OsCategory, RawPrice, ScreenFeatures, StorageBucket, StorageFeatures, StorageRule};

const GB_PER_TB: f64 = 1000.0;

fn storage_segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)\s*(GB|TB)\s+(.+)$").expect("storage segment pattern is valid")
    })
}

fn parse_non_negative(field: &str, text: &str) -> Result<f64, ParseError> {
    let value: f64 = text.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    })?;

    if !value.is_finite() {
        return Err(ParseError::InvalidNumber {
            field: field.to_string(),
            value: text.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ParseError::NegativeValue {
            field: field.to_string(),
            value,
        });
    }

    Ok(value)
}

/// "8GB" -> 8.0, "1.37kg" -> 1.37
pub fn normalize_numeric_with_unit(value: &str, unit_suffix: &str) -> Result<f64, ParseError> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix(unit_suffix).unwrap_or(trimmed);
    parse_non_negative(unit_suffix, number)
}

fn parse_resolution_token(token: &str) -> Option<(u32, u32)> {
    let (width, height) = token.split_once('x')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(width) || !is_digits(height) {
        return None;
    }
    Some((width.parse().ok()?, height.parse().ok()?))
}

/// "IPS Panel Full HD / Touchscreen 1920x1080" -> флаги и ppi
pub fn parse_screen_resolution(text: &str, screen_size_inches: f64) -> Result<ScreenFeatures, ParseError> {
    let (width, height) = text
        .split_whitespace()
        .rev()
        .find_map(parse_resolution_token)
        .ok_or_else(|| ParseError::MissingResolution(text.to_string()))?;

    Ok(ScreenFeatures {
        touchscreen: text.contains("Touchscreen"),
        ips: text.contains("IPS Panel"),
        width,
        height,
        ppi: pixels_per_inch(width, height, screen_size_inches)?,
    })
}

pub fn pixels_per_inch(width: u32, height: u32, screen_size_inches: f64) -> Result<f64, ParseError> {
    if !(screen_size_inches.is_finite() && screen_size_inches > 0.0) {
        return Err(ParseError::InvalidScreenSize(screen_size_inches));
    }
    let diagonal = (width as f64).hypot(height as f64);
    Ok(diagonal / screen_size_inches)
}

/// "256GB SSD +  1TB HDD" -> ssd 256, hdd 1000
pub fn parse_storage(text: &str) -> Result<StorageFeatures, ParseError> {
    parse_storage_with(text, &default_storage_rules())
}

pub fn parse_storage_with(text: &str, rules: &[StorageRule]) -> Result<StorageFeatures, ParseError> {
    let mut hdd = 0.0;
    let mut ssd = 0.0;

    for segment in text.split('+').map(str::trim) {
        let caps = storage_segment_regex()
            .captures(segment)
            .ok_or_else(|| ParseError::InvalidStorageSegment(segment.to_string()))?;

        let mut size = parse_non_negative("Memory", &caps[1])?;
        if &caps[2] == "TB" {
            size *= GB_PER_TB;
        }

        let kind = caps[3].trim();
        match rules.iter().find(|rule| rule.keyword == kind).map(|rule| rule.bucket) {
            Some(StorageBucket::Hdd) => hdd += size,
            Some(StorageBucket::Ssd) => ssd += size,
            None => tracing::debug!("Storage type '{}' is not mapped, skipping {} GB", kind, size),
        }
    }

    Ok(StorageFeatures {
        hdd_gb: storage_gb(text, hdd)?,
        ssd_gb: storage_gb(text, ssd)?,
    })
}

/// Сумма не должна молча обрезаться до u32::MAX
fn storage_gb(text: &str, total: f64) -> Result<u32, ParseError> {
    let gb = total.round();
    if gb > u32::MAX as f64 {
        return Err(ParseError::StorageOverflow {
            text: text.to_string(),
            gb,
        });
    }
    Ok(gb as u32)
}

/// Правила проверяются от самого точного префикса к общему
pub fn normalize_cpu_brand(cpu_name: &str) -> CpuBrand {
    let name = cpu_name.trim_start();
    if name.starts_with("Intel Core i3") {
        CpuBrand::IntelCoreI3
    } else if name.starts_with("Intel Core i5") {
        CpuBrand::IntelCoreI5
    } else if name.starts_with("Intel Core i7") {
        CpuBrand::IntelCoreI7
    } else if name.starts_with("Intel") {
        CpuBrand::OtherIntel
    } else if name.starts_with("AMD") {
        CpuBrand::Amd
    } else {
        // Все остальные (Samsung Cortex и т.п.) попадают в общую не-Intel корзину
        tracing::warn!("Unrecognized CPU vendor '{}', treating as AMD Processor", cpu_name);
        CpuBrand::Amd
    }
}

pub fn normalize_os(os_name: &str) -> OsCategory {
    let name = os_name.to_lowercase();
    if name.contains("windows") {
        OsCategory::Windows
    } else if name.contains("mac") {
        OsCategory::Mac
    } else {
        OsCategory::Other
    }
}

/// Производитель GPU: первое слово названия
pub fn gpu_brand(gpu_name: &str) -> Result<String, ParseError> {
    gpu_name
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ParseError::EmptyField {
            field: "Gpu".to_string(),
        })
}

/// Цена строго положительна: целевая переменная берется в логарифме
pub fn parse_price(price: &RawPrice) -> Result<f64, ParseError> {
    let value = match price {
        RawPrice::Number(value) if value.is_finite() => *value,
        RawPrice::Number(value) => {
            return Err(ParseError::InvalidNumber {
                field: "Price".to_string(),
                value: value.to_string(),
            })
        }
        RawPrice::Text(text) => parse_non_negative("Price", &text.replace(',', ""))?,
    };

    if value < 0.0 {
        return Err(ParseError::NegativeValue {
            field: "Price".to_string(),
            value,
        });
    }
    if value == 0.0 {
        return Err(ParseError::NonPositiveValue {
            field: "Price".to_string(),
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numeric_with_unit() {
        assert_eq!(normalize_numeric_with_unit("16GB", "GB").unwrap(), 16.0);
        assert_eq!(normalize_numeric_with_unit("2.1kg", "kg").unwrap(), 2.1);
        assert_eq!(normalize_numeric_with_unit(" 8GB ", "GB").unwrap(), 8.0);
        assert_eq!(normalize_numeric_with_unit("4", "GB").unwrap(), 4.0);
    }

    #[test]
    fn test_normalize_numeric_with_unit_rejects_garbage() {
        assert!(matches!(
            normalize_numeric_with_unit("?kg", "kg"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            normalize_numeric_with_unit("-1kg", "kg"),
            Err(ParseError::NegativeValue { .. })
        ));
        assert!(normalize_numeric_with_unit("", "GB").is_err());
    }

    #[test]
    fn test_screen_resolution_ips_retina() {
        let screen = parse_screen_resolution("IPS Panel Retina Display 2560x1600", 13.3).unwrap();
        assert!(screen.ips);
        assert!(!screen.touchscreen);
        assert_eq!((screen.width, screen.height), (2560, 1600));
        assert!((screen.ppi - 226.98).abs() < 0.01);
    }

    #[test]
    fn test_screen_resolution_touchscreen() {
        let screen =
            parse_screen_resolution("IPS Panel Full HD / Touchscreen 1920x1080", 15.6).unwrap();
        assert!(screen.ips);
        assert!(screen.touchscreen);
        assert!((screen.ppi - 141.21).abs() < 0.01);

        // Регистр важен
        let screen = parse_screen_resolution("touchscreen ips panel 1366x768", 14.0).unwrap();
        assert!(!screen.ips);
        assert!(!screen.touchscreen);
    }

    #[test]
    fn test_screen_resolution_errors() {
        assert!(matches!(
            parse_screen_resolution("Full HD", 15.6),
            Err(ParseError::MissingResolution(_))
        ));
        assert!(matches!(
            parse_screen_resolution("1920x1080", 0.0),
            Err(ParseError::InvalidScreenSize(_))
        ));
        assert!(parse_screen_resolution("1920x", 15.6).is_err());
    }

    #[test]
    fn test_parse_storage_mixed() {
        let storage = parse_storage("256GB SSD + 1TB HDD").unwrap();
        assert_eq!(storage.ssd_gb, 256);
        assert_eq!(storage.hdd_gb, 1000);
    }

    #[test]
    fn test_parse_storage_accumulates_and_folds() {
        let storage = parse_storage("256GB SSD +  256GB SSD").unwrap();
        assert_eq!(storage, StorageFeatures { hdd_gb: 0, ssd_gb: 512 });

        let storage = parse_storage("1.0TB Hybrid").unwrap();
        assert_eq!(storage, StorageFeatures { hdd_gb: 1000, ssd_gb: 0 });

        let storage = parse_storage("32GB Flash Storage").unwrap();
        assert_eq!(storage, StorageFeatures { hdd_gb: 0, ssd_gb: 32 });
    }

    #[test]
    fn test_parse_storage_unmapped_type_counts_nowhere() {
        let rules = vec![StorageRule::new("SSD", StorageBucket::Ssd)];
        let storage = parse_storage_with("128GB SSD + 1TB Hybrid", &rules).unwrap();
        assert_eq!(storage, StorageFeatures { hdd_gb: 0, ssd_gb: 128 });
    }

    #[test]
    fn test_parse_storage_malformed_segment() {
        assert!(matches!(
            parse_storage("lots of SSD"),
            Err(ParseError::InvalidStorageSegment(_))
        ));
        assert!(parse_storage("128GB SSD + ").is_err());
    }

    #[test]
    fn test_parse_storage_rejects_oversized_total() {
        assert!(matches!(
            parse_storage("9999999TB HDD"),
            Err(ParseError::StorageOverflow { .. })
        ));
        let storage = parse_storage("2TB HDD + 2TB HDD").unwrap();
        assert_eq!(storage.hdd_gb, 4000);
    }

    #[test]
    fn test_normalize_cpu_brand() {
        assert_eq!(normalize_cpu_brand("Intel Core i5 7200U 2.5GHz"), CpuBrand::IntelCoreI5);
        assert_eq!(normalize_cpu_brand("Intel Core i7 8550U 1.8GHz"), CpuBrand::IntelCoreI7);
        assert_eq!(normalize_cpu_brand("Intel Core i3 6006U 2GHz"), CpuBrand::IntelCoreI3);
        assert_eq!(normalize_cpu_brand("Intel Core M m3 1.2GHz"), CpuBrand::OtherIntel);
        assert_eq!(normalize_cpu_brand("Intel Celeron Dual Core N3350"), CpuBrand::OtherIntel);
        assert_eq!(normalize_cpu_brand("AMD A9-Series 9420 3GHz"), CpuBrand::Amd);
        assert_eq!(normalize_cpu_brand("Samsung Cortex A72&A53 2.0GHz"), CpuBrand::Amd);
    }

    #[test]
    fn test_normalize_os() {
        assert_eq!(normalize_os("Windows 10"), OsCategory::Windows);
        assert_eq!(normalize_os("Windows 10 S"), OsCategory::Windows);
        assert_eq!(normalize_os("macOS"), OsCategory::Mac);
        assert_eq!(normalize_os("Mac OS X"), OsCategory::Mac);
        assert_eq!(normalize_os("Linux"), OsCategory::Other);
        assert_eq!(normalize_os("No OS"), OsCategory::Other);
        assert_eq!(normalize_os("Chrome OS"), OsCategory::Other);
    }

    #[test]
    fn test_gpu_brand() {
        assert_eq!(gpu_brand("Nvidia GeForce GTX 1050").unwrap(), "Nvidia");
        assert_eq!(gpu_brand("ARM Mali T860 MP4").unwrap(), "ARM");
        assert!(gpu_brand("   ").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&RawPrice::Number(71378.6832)).unwrap(), 71378.6832);
        assert_eq!(parse_price(&RawPrice::Text("47,895.52".to_string())).unwrap(), 47895.52);
        assert!(parse_price(&RawPrice::Text("n/a".to_string())).is_err());
        assert!(parse_price(&RawPrice::Number(-5.0)).is_err());
    }

    #[test]
    fn test_parse_price_rejects_zero() {
        assert!(matches!(
            parse_price(&RawPrice::Number(0.0)),
            Err(ParseError::NonPositiveValue { .. })
        ));
        assert!(matches!(
            parse_price(&RawPrice::Text("0".to_string())),
            Err(ParseError::NonPositiveValue { .. })
        ));
    }
}
