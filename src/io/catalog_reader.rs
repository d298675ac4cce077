//! Catalog loading from `name,price` CSV files

use crate::core::memory::MemoryStore;
use crate::io::csv_format::CatalogCsvRecord;
use crate::types::CoinError;
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Parse every catalog row from `input`
///
/// Unlike operation input, a catalog is all-or-nothing: the first row that
/// fails to parse or carries a non-positive price fails the whole read.
pub fn read_catalog<R: Read>(input: R) -> Result<Vec<CatalogCsvRecord>, CoinError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
    reader
        .deserialize::<CatalogCsvRecord>()
        .map(|row| {
            let row = row.map_err(CoinError::from)?;
            if row.price <= 0 {
                return Err(CoinError::invalid_price(&row.name, row.price));
            }
            Ok(row)
        })
        .collect()
}

/// Upsert every item of the catalog file at `path` into `store`
///
/// Returns the number of items loaded. Every row is checked before the
/// first upsert, so a failed load leaves the catalog as it was.
pub fn load_catalog(store: &MemoryStore, path: &Path) -> Result<usize, CoinError> {
    let file = std::fs::File::open(path)?;
    let rows = read_catalog(file)?;
    for row in &rows {
        store.upsert_item(&row.name, row.price)?;
    }
    info!(path = %path.display(), items = rows.len(), "catalog loaded");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::CatalogLookup;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_catalog() {
        let rows = read_catalog("name,price\nsticker, 5\nmug,25\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "sticker");
        assert_eq!(rows[0].price, 5);
    }

    #[test]
    fn test_read_catalog_bad_price() {
        let result = read_catalog("name,price\nsticker,cheap\n".as_bytes());
        assert!(matches!(result, Err(CoinError::ParseError { .. })));
    }

    #[test]
    fn test_load_catalog_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"name,price\ncup,35\nsticker,5\n").unwrap();
        file.flush().unwrap();

        let store = MemoryStore::with_default_catalog();
        assert_eq!(load_catalog(&store, file.path()).unwrap(), 2);
        assert_eq!(store.get_by_name("cup").unwrap().price, 35);
        assert_eq!(store.get_by_name("sticker").unwrap().price, 5);
        assert_eq!(store.get_by_name("pen").unwrap().price, 10);
    }

    #[test]
    fn test_load_catalog_rejects_non_positive_price() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"name,price\nfreebie,0\n").unwrap();
        file.flush().unwrap();

        let store = MemoryStore::new();
        let result = load_catalog(&store, file.path());
        assert_eq!(result.unwrap_err(), CoinError::invalid_price("freebie", 0));
    }

    #[test]
    fn test_failed_load_leaves_catalog_untouched() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"name,price\ncup,35\nfreebie,0\n").unwrap();
        file.flush().unwrap();

        let store = MemoryStore::with_default_catalog();
        let result = load_catalog(&store, file.path());

        assert_eq!(result.unwrap_err(), CoinError::invalid_price("freebie", 0));
        assert_eq!(store.get_by_name("cup").unwrap().price, 20);
        assert!(store.get_by_name("freebie").is_err());
    }

    #[test]
    fn test_read_catalog_rejects_negative_price() {
        let result = read_catalog("name,price\nmug,25\nrefund,-5\n".as_bytes());
        assert_eq!(result.unwrap_err(), CoinError::invalid_price("refund", -5));
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let store = MemoryStore::new();
        let result = load_catalog(&store, Path::new("no-such-catalog.csv"));
        assert!(matches!(result, Err(CoinError::IoError { .. })));
    }
}
