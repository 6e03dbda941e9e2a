//! Append-only ledgers for simulated trades and predictions.

use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Storage for an ordered, append-only sequence of entries.
pub trait LedgerStore<T>: Send + Sync {
    /// Append one entry after all existing ones.
    fn append(&self, entry: &T) -> Result<()>;

    /// Every entry in append order.
    fn read_all(&self) -> Result<Vec<T>>;
}

/// CSV file ledger without a header row.
///
/// Each entry is serialized into one buffer and written with a single
/// call, so a concurrent reader never sees half a row.
pub struct CsvLedger<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _entry: PhantomData<fn() -> T>,
}

impl<T> CsvLedger<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rows written by older tools start with a header; skip them.
fn is_header(record: &csv::StringRecord) -> bool {
    matches!(
        record.get(0).map(str::trim),
        Some("Time") | Some("timestamp") | Some("Timestamp")
    )
}

fn encode_row<T: Serialize>(entry: &T) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.serialize(entry)?;
    writer
        .into_inner()
        .map_err(|e| AppError::Ledger(format!("failed to encode row: {}", e)))
}

impl<T> LedgerStore<T> for CsvLedger<T>
where
    T: Serialize + DeserializeOwned,
{
    fn append(&self, entry: &T) -> Result<()> {
        let row = encode_row(entry)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Ledger("ledger lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&row)?;

        debug!("Appended {} bytes to {}", row.len(), self.path.display());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<T>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(std::io::BufReader::new(file));

        let mut entries = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!(
                        "Skipping unreadable row {} in {}: {}",
                        line + 1,
                        self.path.display(),
                        e
                    );
                    continue;
                }
            };
            if record.iter().all(|f| f.is_empty()) || is_header(&record) {
                continue;
            }
            match record.deserialize::<T>(None) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(
                        "Skipping malformed row {} in {}: {}",
                        line + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(entries)
    }
}

/// In-process ledger.
pub struct MemoryLedger<T> {
    entries: RwLock<Vec<T>>,
}

impl<T> MemoryLedger<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> LedgerStore<T> for MemoryLedger<T> {
    fn append(&self, entry: &T) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| AppError::Ledger("ledger lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<T>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| AppError::Ledger("ledger lock poisoned".to_string()))?
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, PredictionLogEntry, TradeAction, TradeLogEntry};
    use chrono::NaiveDateTime;

    struct TestDir(PathBuf);

    impl TestDir {
        fn new(name: &str) -> Self {
            let dir = PathBuf::from(format!(".test_ledger_{}", name));
            let _ = fs::remove_dir_all(&dir);
            Self(dir)
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn trade(time: &str, action: TradeAction, price: f64) -> TradeLogEntry {
        TradeLogEntry {
            timestamp: ts(time),
            ticker: "TCS.NS".to_string(),
            action,
            price,
            prediction: Direction::Up,
        }
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TestDir::new("missing");
        let ledger: CsvLedger<TradeLogEntry> = CsvLedger::new(dir.0.join("none.csv"));
        assert!(ledger.read_all().unwrap().is_empty());
        assert!(!dir.0.exists());
    }

    #[test]
    fn test_append_creates_directory_and_roundtrips() {
        let dir = TestDir::new("roundtrip");
        let ledger: CsvLedger<TradeLogEntry> = CsvLedger::new(dir.0.join("nested").join("fake_trades.csv"));

        let entries = vec![
            trade("2024-03-01 10:00:00", TradeAction::Buy, 100.0),
            trade("2024-03-02 11:30:00", TradeAction::Sell, 110.25),
            trade("2024-03-03 09:15:00", TradeAction::Buy, 90.5),
        ];
        for e in &entries {
            ledger.append(e).unwrap();
        }

        assert_eq!(ledger.read_all().unwrap(), entries);
    }

    #[test]
    fn test_on_disk_format() {
        let dir = TestDir::new("format");
        let trades: CsvLedger<TradeLogEntry> = CsvLedger::new(dir.0.join("fake_trades.csv"));
        trades
            .append(&trade("2024-03-01 10:00:00", TradeAction::Sell, 101.5))
            .unwrap();
        let predictions: CsvLedger<PredictionLogEntry> = CsvLedger::new(dir.0.join("trade_log.csv"));
        predictions
            .append(&PredictionLogEntry {
                timestamp: ts("2024-03-01 10:00:05"),
                ticker: "ITC.NS".to_string(),
                prediction: Direction::Down,
            })
            .unwrap();

        let raw = fs::read_to_string(trades.path()).unwrap();
        assert_eq!(raw, "2024-03-01 10:00:00,TCS.NS,SELL,101.5,BUY\n");
        let raw = fs::read_to_string(predictions.path()).unwrap();
        assert_eq!(raw, "2024-03-01 10:00:05,ITC.NS,SELL\n");
    }

    #[test]
    fn test_header_and_blank_rows_skipped() {
        let dir = TestDir::new("header");
        fs::create_dir_all(&dir.0).unwrap();
        let path = dir.0.join("fake_trades.csv");
        fs::write(
            &path,
            "Time,Ticker,Action,Price,Prediction\n\
             2024-03-01 10:00:00,TCS.NS,BUY,100,BUY\n\
             \n\
             2024-03-02 10:00:00,TCS.NS,SELL,110,SELL\n",
        )
        .unwrap();

        let entries = CsvLedger::<TradeLogEntry>::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, TradeAction::Buy);
        assert_eq!(entries[1].price, 110.0);
    }

    #[test]
    fn test_invalid_utf8_row_skipped() {
        let dir = TestDir::new("utf8");
        fs::create_dir_all(&dir.0).unwrap();
        let path = dir.0.join("fake_trades.csv");
        let mut raw = b"2024-03-01 10:00:00,TCS.NS,BUY,100,BUY\n".to_vec();
        raw.extend_from_slice(b"2024-03-02 10:00:00,TC\xff\xfe,SELL,105,SELL\n");
        raw.extend_from_slice(b"2024-03-03 10:00:00,TCS.NS,SELL,110,SELL\n");
        fs::write(&path, raw).unwrap();

        let entries = CsvLedger::<TradeLogEntry>::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].price, 100.0);
        assert_eq!(entries[1].price, 110.0);
    }

    #[test]
    fn test_malformed_row_skipped() {
        let dir = TestDir::new("malformed");
        fs::create_dir_all(&dir.0).unwrap();
        let path = dir.0.join("fake_trades.csv");
        fs::write(
            &path,
            "2024-03-01 10:00:00,TCS.NS,BUY,100,BUY\n\
             yesterday,TCS.NS,HOLD,abc\n\
             2024-03-03 10:00:00,TCS.NS,SELL,110,SELL\n",
        )
        .unwrap();

        let entries = CsvLedger::<TradeLogEntry>::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_memory_ledger_preserves_order() {
        let ledger: MemoryLedger<u32> = MemoryLedger::new();
        ledger.append(&1u32).unwrap();
        ledger.append(&2u32).unwrap();
        ledger.append(&3u32).unwrap();
        assert_eq!(ledger.read_all().unwrap(), vec![1, 2, 3]);
    }
}
