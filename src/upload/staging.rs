//! Marketplace bulk-upload spreadsheet: one row per staged product.

use super::ProductListing;
use crate::error::SheetError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::Datelike;
use rand::RngExt;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Column order of the marketplace bulk-upload template.
pub const STAGING_HEADER: [&str; 34] = [
    "Barkod",
    "Model Kodu",
    "Marka",
    "Kategori",
    "Para Birimi",
    "Ürün Adı",
    "Ürün Açıklaması",
    "Piyasa Satış Fiyatı (KDV Dahil)",
    "Trendyol'da Satılacak Fiyat (KDV Dahil)",
    "Ürün Stok Adedi",
    "Stok Kodu",
    "KDV Oranı",
    "Desi",
    "Görsel 1",
    "Görsel 2",
    "Görsel 3",
    "Görsel 4",
    "Görsel 5",
    "Görsel 6",
    "Görsel 7",
    "Görsel 8",
    "Sevkiyat Süresi",
    "Sevkiyat Tipi",
    "Setli / Tekil",
    "Basım Yılı",
    "Yazar",
    "Temsilci/İfa",
    "Menşei",
    "Boyut/Ebat",
    "Sayfa Sayısı",
    "Roman Türü",
    "Üretici Bilgisi",
    "Cilt Bilgisi",
    "Yaş Grubu",
];

pub const STOCK_CHOICES: [u32; 3] = [10, 50, 100];
pub const SHIPPING_DAY_CHOICES: [u32; 3] = [2, 3, 4];
pub const BRAND: &str = "GENEL";
pub const CATEGORY_ID: u32 = 1750;

/// Identifiers chosen for a staged row.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRow {
    pub barcode: String,
    pub stock: u32,
    pub shipping_days: u32,
    pub year: i32,
}

impl StagedRow {
    /// Picks random stock and shipping values for `title`.
    pub fn for_title(title: &str) -> Self {
        let year = chrono::Local::now().year();
        Self {
            barcode: generate_barcode(title, year),
            stock: pick(&STOCK_CHOICES),
            shipping_days: pick(&SHIPPING_DAY_CHOICES),
            year,
        }
    }
}

fn pick(choices: &[u32; 3]) -> u32 {
    choices[rand::rng().random_range(0..choices.len())]
}

fn transliterate(c: char) -> char {
    match c {
        'ç' => 'c',
        'ğ' => 'g',
        'ı' => 'i',
        'ö' => 'o',
        'ş' => 's',
        'ü' => 'u',
        'Ç' => 'C',
        'Ğ' => 'G',
        'İ' => 'I',
        'Ö' => 'O',
        'Ş' => 'S',
        'Ü' => 'U',
        other => other,
    }
}

/// `mf` + first three characters of every alphanumeric word + year.
///
/// Words containing punctuation are skipped; non-ASCII letters left after
/// transliteration are dropped.
pub fn generate_barcode(title: &str, year: i32) -> String {
    let transliterated: String = title.chars().map(transliterate).collect();
    let short: String = transliterated
        .split_whitespace()
        .filter(|word| word.chars().all(char::is_alphanumeric))
        .flat_map(|word| word.chars().take(3))
        .filter(char::is_ascii_alphanumeric)
        .collect();
    format!("mf{}{}", short.to_lowercase(), year)
}

enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

/// The staging workbook on disk.
///
/// Clones share one lock, so appends through any clone are serialized.
#[derive(Clone)]
pub struct StagingSheet {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl StagingSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `listing` as a new row, creating the file with the header if missing.
    pub fn append(&self, listing: &ProductListing) -> Result<StagedRow, SheetError> {
        let staged = StagedRow::for_title(&listing.title);
        self.append_row(listing, &staged)?;
        Ok(staged)
    }

    /// Appends with caller-chosen identifiers.
    ///
    /// The workbook is rebuilt in a sibling temp file and renamed over the
    /// original, so readers never see a partial file.
    pub fn append_row(
        &self,
        listing: &ProductListing,
        staged: &StagedRow,
    ) -> Result<(), SheetError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut rows = if self.path.exists() {
            self.read_rows()?
        } else {
            vec![STAGING_HEADER.iter().map(|h| Cell::Text(h.to_string())).collect()]
        };
        rows.push(row_for(listing, staged));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("xlsx.tmp");
        let mut workbook = Workbook::new();
        write_rows(workbook.add_worksheet(), &rows)?;
        workbook.save(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;

        info!("Staged {} in {} (row {})", staged.barcode, self.path.display(), rows.len());
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<Vec<Cell>>, SheetError> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = workbook.worksheet_range_at(0).ok_or(SheetError::NoWorksheet)??;
        debug!("Read {} existing staging rows", range.height());

        // Keep the sheet's position when it does not start at A1
        let (top, left) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = (0..top).map(|_| Vec::new()).collect();
        rows.extend(range.rows().map(|row| {
            (0..left)
                .map(|_| Cell::Blank)
                .chain(row.iter().map(|cell| match cell {
                    Data::Empty => Cell::Blank,
                    Data::String(s) => Cell::Text(s.clone()),
                    Data::Float(f) => Cell::Number(*f),
                    Data::Int(i) => Cell::Number(*i as f64),
                    other => Cell::Text(other.to_string()),
                }))
                .collect()
        }));
        Ok(rows)
    }
}

fn row_for(listing: &ProductListing, staged: &StagedRow) -> Vec<Cell> {
    let text = |s: &str| Cell::Text(s.to_string());
    let mut row = vec![
        text(staged.barcode.as_str()),
        Cell::Blank,
        text(BRAND),
        Cell::Number(CATEGORY_ID as f64),
        text("TRY"),
        text(listing.title.as_str()),
        text(listing.description.as_str()),
        Cell::Number(listing.market_price.unwrap_or(listing.price)),
        Cell::Number(listing.price),
        Cell::Number(staged.stock as f64),
        Cell::Blank,
        Cell::Number(0.0),
        Cell::Number(1.0),
        text(listing.image_url.as_deref().unwrap_or("")),
    ];
    row.extend((0..7).map(|_| Cell::Blank));
    row.extend([
        Cell::Number(staged.shipping_days as f64),
        Cell::Blank,
        text("Tekil"),
        Cell::Number(staged.year as f64),
        text(listing.author.as_deref().unwrap_or("")),
        Cell::Blank,
        text("TR"),
        text("13.5x21"),
        text("200"),
        text("Roman"),
        text("GENEL YAYIN"),
        text("Karton Kapak"),
        text("Genel"),
    ]);
    row
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<(), SheetError> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match cell {
                Cell::Text(s) if !s.is_empty() => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                _ => {}
            }
        }
    }
    Ok(())
}
