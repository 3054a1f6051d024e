//! Spreadsheet analysis reports.

use crate::content::ContentSections;
use crate::error::SheetError;
use crate::offers::{Offer, SearchResultSet};
use crate::prediction::SalesPrediction;
use crate::pricing::rank;
use crate::profit::ProfitBreakdown;
use crate::reviews::ReviewSummary;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const STANDARD_PREFIX: &str = "kitap_analizi";
pub const ADVANCED_PREFIX: &str = "gelismis_kitap_analizi";

const HEADER_COLOR: u32 = 0x366092;
const SECTION_COLOR: u32 = 0xFFC000;
const LABEL_COLOR: u32 = 0xE7E6E6;
const BEST_COLOR: u32 = 0x92D050;

/// Everything one report is built from.
pub struct ReportInput<'a> {
    pub results: &'a SearchResultSet,
    pub best: &'a Offer,
    pub content: &'a ContentSections,
    pub profit: &'a ProfitBreakdown,
    pub prediction: Option<&'a SalesPrediction>,
    pub reviews: Option<&'a ReviewSummary>,
}

impl ReportInput<'_> {
    fn is_advanced(&self) -> bool {
        self.prediction.is_some() || self.reviews.is_some()
    }
}

/// Trait for report output - enables mocking for tests.
pub trait ReportWriter: Send + Sync {
    /// Writes the report and returns its path.
    fn write(&self, input: &ReportInput<'_>) -> Result<PathBuf, SheetError>;
}

/// `{prefix}_{title}_{timestamp}.xlsx` with the title made file-safe and cut to 30 chars.
pub fn report_filename(prefix: &str, title: &str, timestamp: &str) -> String {
    let safe: String = sanitize_filename::sanitize(title)
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(30)
        .collect();
    let safe = if safe.is_empty() { "kitap".to_string() } else { safe };
    format!("{prefix}_{safe}_{timestamp}.xlsx")
}

struct Styles {
    title: Format,
    section: Format,
    label: Format,
    bold: Format,
    best: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_COLOR)),
            section: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_background_color(Color::RGB(SECTION_COLOR)),
            label: Format::new().set_bold().set_background_color(Color::RGB(LABEL_COLOR)),
            bold: Format::new().set_bold(),
            best: Format::new().set_background_color(Color::RGB(BEST_COLOR)),
        }
    }
}

/// Writes xlsx reports into a directory, creating it on demand.
pub struct XlsxReportWriter {
    output_dir: PathBuf,
}

impl XlsxReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn summary_sheet(
        sheet: &mut Worksheet,
        input: &ReportInput<'_>,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Özet")?;
        let heading = if input.is_advanced() {
            "GELİŞMİŞ KİTAP ANALİZ RAPORU"
        } else {
            "KİTAP ANALİZ RAPORU"
        };
        sheet.write_string_with_format(0, 0, heading, &styles.title)?;

        let best = input.best;
        let rows = [
            ("Kitap Adı:", best.title.clone()),
            ("Platform:", best.platform.to_string()),
            ("En Uygun Fiyat:", format!("{} TL", best.price_or_zero())),
            ("URL:", best.url.clone().unwrap_or_default()),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = 2 + i as u32;
            sheet.write_string_with_format(row, 0, *label, &styles.label)?;
            sheet.write_string(row, 1, value)?;
        }

        sheet.write_string_with_format(7, 0, "SATIŞ UYGUNLUĞU", &styles.section)?;
        let verdict = if input.profit.can_compete { "Rekabet edebilir" } else { "Rekabet zor" };
        sheet.write_string(8, 0, verdict)?;
        let suggested = format!("Önerilen Satış Fiyatı: {:.2} TL", input.profit.suggested_price);
        sheet.write_string(9, 0, suggested)?;

        sheet.set_column_width(0, 25)?;
        sheet.set_column_width(1, 60)?;
        Ok(())
    }

    fn comparison_sheet(
        sheet: &mut Worksheet,
        input: &ReportInput<'_>,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Fiyat Karşılaştırma")?;
        sheet.write_string_with_format(0, 0, "FİYAT KARŞILAŞTIRMA TABLOSU", &styles.title)?;

        let headers = ["Sıra", "Kitap Adı", "Platform", "Fiyat (TL)", "URL", "Durum"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string_with_format(2, col as u16, *header, &styles.label)?;
        }

        let offers: Vec<Offer> = input.results.all_offers().cloned().collect();
        let mut marked = false;
        for (i, offer) in rank(&offers).into_iter().enumerate() {
            let row = 3 + i as u32;
            sheet.write_number(row, 0, (i + 1) as f64)?;
            sheet.write_string(row, 1, &offer.title)?;
            sheet.write_string(row, 2, offer.platform.display_name())?;
            sheet.write_number(row, 3, offer.price_or_zero())?;
            sheet.write_string(row, 4, offer.url.as_deref().unwrap_or(""))?;
            if !marked && offer.is_priced() && offer.price == input.best.price {
                sheet.write_string_with_format(row, 5, "EN UCUZ", &styles.best)?;
                marked = true;
            }
        }

        for (col, width) in [8.0, 50.0, 20.0, 15.0, 40.0, 15.0].iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }
        Ok(())
    }

    fn profit_sheet(
        sheet: &mut Worksheet,
        input: &ReportInput<'_>,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Kar Analizi")?;
        sheet.write_string_with_format(0, 0, "KAR ANALİZİ", &styles.title)?;

        let p = input.profit;
        let rows = [
            ("Alış Fiyatı".to_string(), format!("{} TL", p.purchase_price)),
            ("Kargo Maliyeti".to_string(), format!("{} TL", p.shipping_cost)),
            ("Toplam Maliyet".to_string(), format!("{} TL", p.total_cost)),
            (
                format!("Komisyon (%{})", p.commission_rate * 100.0),
                format!("{:.2} TL", p.commission_amount),
            ),
            ("Kar Marjı".to_string(), format!("{} TL", p.profit_margin)),
            ("Önerilen Satış Fiyatı".to_string(), format!("{:.2} TL", p.suggested_price)),
            ("Net Kar".to_string(), format!("{:.2} TL", p.net_profit)),
            ("Kar Yüzdesi".to_string(), format!("%{:.1}", p.profit_percentage)),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = 2 + i as u32;
            sheet.write_string_with_format(row, 0, label, &styles.label)?;
            sheet.write_string(row, 1, value)?;
        }

        sheet.write_string_with_format(11, 0, "KAR MARJI SEÇENEKLERİ", &styles.section)?;
        let headers = ["Kar Marjı (TL)", "Satış Fiyatı (TL)", "Net Kar (TL)"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string_with_format(12, col as u16, *header, &styles.bold)?;
        }
        for (i, option) in p.options.iter().enumerate() {
            let row = 13 + i as u32;
            sheet.write_number(row, 0, option.margin)?;
            sheet.write_number(row, 1, option.selling_price)?;
            sheet.write_number(row, 2, option.net_profit)?;
        }

        // Verdict lines the model wrote in its structured report
        let mut row = 14 + p.options.len() as u32;
        sheet.write_string_with_format(row, 0, "SATIŞ UYGUNLUĞU DEĞERLENDİRMESİ", &styles.section)?;
        row += 1;
        const VERDICT_KEYS: [&str; 4] =
            ["Satış Uygunluğu:", "Kar Analizi:", "Rekabet Durumu:", "Risk Değerlendirmesi:"];
        for line in input.content.profit_analysis.lines() {
            if VERDICT_KEYS.iter().any(|k| line.contains(k)) {
                sheet.write_string_with_format(row, 0, line.trim(), &styles.bold)?;
                row += 1;
            }
        }

        sheet.set_column_width(0, 30)?;
        sheet.set_column_width(1, 20)?;
        sheet.set_column_width(2, 50)?;
        Ok(())
    }

    fn detail_sheet(
        sheet: &mut Worksheet,
        input: &ReportInput<'_>,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Detaylı Analiz")?;
        sheet.write_string_with_format(0, 0, "DETAYLI GEMINI ANALİZİ", &styles.title)?;

        let c = input.content;
        let mut sections = vec![
            ("Kitap Analizi", c.analysis.as_str()),
            ("SEO İçeriği", c.seo_content.as_str()),
            ("Satış Önerileri", c.sales_recommendation.as_str()),
            ("Özet", c.best_offer_summary.as_str()),
            ("Kar Analizi", c.profit_analysis.as_str()),
        ];
        if let Some(text) = &c.sentiment_analysis {
            sections.push(("Yorum Analizi", text.as_str()));
        }
        if let Some(text) = &c.trend_analysis {
            sections.push(("Trend Analizi", text.as_str()));
        }

        let mut row = 2;
        for (heading, text) in sections {
            sheet.write_string_with_format(row, 0, heading, &styles.section)?;
            row += 1;
            for paragraph in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                sheet.write_string(row, 0, paragraph)?;
                row += 1;
            }
            row += 2;
        }

        sheet.set_column_width(0, 80)?;
        Ok(())
    }

    fn prediction_sheet(
        sheet: &mut Worksheet,
        prediction: &SalesPrediction,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Satış Tahmini")?;
        sheet.write_string_with_format(0, 0, "SATIŞ TAHMİNİ", &styles.title)?;

        let rows = [
            ("Tahmini Aylık Satış", format!("{} adet", prediction.predicted_monthly_sales)),
            ("Günlük Ortalama", format!("{} adet", prediction.daily_average)),
            ("Güven Skoru", format!("%{:.0}", prediction.confidence * 100.0)),
            ("Tahmini Aylık Gelir", format!("{:.2} TL", prediction.monthly_revenue)),
            ("Popülerlik Skoru", format!("{:.2}", prediction.popularity_score)),
            ("Trend", prediction.trend_status.clone()),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = 2 + i as u32;
            sheet.write_string_with_format(row, 0, *label, &styles.label)?;
            sheet.write_string(row, 1, value)?;
        }

        sheet.write_string_with_format(9, 0, "Aylık Trend Tahmini", &styles.section)?;
        sheet.write_string_with_format(11, 0, "Satış Adedi", &styles.bold)?;
        sheet.write_string_with_format(12, 0, "Gelir (TL)", &styles.bold)?;
        for (i, month) in prediction.projection.iter().enumerate() {
            let col = 1 + i as u16;
            sheet.write_string_with_format(10, col, &month.label, &styles.bold)?;
            sheet.write_number(11, col, month.sales as f64)?;
            sheet.write_number(12, col, month.revenue.round())?;
        }

        sheet.set_column_width(0, 22)?;
        Ok(())
    }

    fn reviews_sheet(
        sheet: &mut Worksheet,
        reviews: &ReviewSummary,
        styles: &Styles,
    ) -> Result<(), SheetError> {
        sheet.set_name("Yorumlar")?;
        let heading =
            if reviews.is_sample { "MÜŞTERİ YORUMLARI (ÖRNEK VERİ)" } else { "MÜŞTERİ YORUMLARI" };
        sheet.write_string_with_format(0, 0, heading, &styles.title)?;

        sheet.write_string_with_format(2, 0, "Ortalama Puan", &styles.label)?;
        sheet.write_number(2, 1, reviews.average_rating)?;
        sheet.write_string_with_format(3, 0, "Yorum Sayısı", &styles.label)?;
        sheet.write_number(3, 1, reviews.total as f64)?;

        let mut row = 5;
        sheet.write_string_with_format(row, 0, "Yıllık Ortalama", &styles.section)?;
        row += 1;
        for (year, rating) in &reviews.yearly_ratings {
            sheet.write_number(row, 0, *year as f64)?;
            sheet.write_number(row, 1, (rating * 100.0).round() / 100.0)?;
            row += 1;
        }

        row += 1;
        for (col, header) in ["Tarih", "Puan", "Yazar", "Başlık", "Yorum"].iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, *header, &styles.label)?;
        }
        for review in &reviews.reviews {
            row += 1;
            sheet.write_string(row, 0, &review.date)?;
            sheet.write_number(row, 1, review.rating)?;
            sheet.write_string(row, 2, &review.author)?;
            sheet.write_string(row, 3, &review.title)?;
            sheet.write_string(row, 4, &review.comment)?;
        }

        sheet.set_column_width(0, 18)?;
        sheet.set_column_width(3, 25)?;
        sheet.set_column_width(4, 80)?;
        Ok(())
    }
}

impl ReportWriter for XlsxReportWriter {
    fn write(&self, input: &ReportInput<'_>) -> Result<PathBuf, SheetError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let prefix = if input.is_advanced() { ADVANCED_PREFIX } else { STANDARD_PREFIX };
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.output_dir.join(report_filename(prefix, &input.best.title, &timestamp));

        let styles = Styles::new();
        let mut workbook = Workbook::new();

        Self::summary_sheet(workbook.add_worksheet(), input, &styles)?;
        Self::comparison_sheet(workbook.add_worksheet(), input, &styles)?;
        Self::profit_sheet(workbook.add_worksheet(), input, &styles)?;
        Self::detail_sheet(workbook.add_worksheet(), input, &styles)?;
        if let Some(prediction) = input.prediction {
            Self::prediction_sheet(workbook.add_worksheet(), prediction, &styles)?;
        }
        if let Some(reviews) = input.reviews {
            Self::reviews_sheet(workbook.add_worksheet(), reviews, &styles)?;
        }

        debug!("Saving report to {}", path.display());
        workbook.save(&path)?;
        info!("Report written: {}", path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::Platform;
    use crate::prediction::predict_sales;
    use crate::profit::ProfitCalculator;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn offer(title: &str, price: Option<f64>, platform: Platform) -> Offer {
        Offer {
            title: title.to_string(),
            raw_price: String::new(),
            price,
            platform,
            url: Some(format!("https://{}/x", platform.domain())),
            image_url: None,
            source: "serpapi".to_string(),
        }
    }

    fn content() -> ContentSections {
        ContentSections {
            analysis: "Analiz satırı\n\nİkinci satır".to_string(),
            seo_content: "SEO".to_string(),
            sales_recommendation: "Satış".to_string(),
            best_offer_summary: "Özet".to_string(),
            profit_analysis:
                "- Satış Uygunluğu: Uygun\n- Önerilen Fiyat: 150 TL\n- Rekabet Durumu: İyi"
                    .to_string(),
            sentiment_analysis: None,
            trend_analysis: None,
        }
    }

    fn cell(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
        range.get_value((row, col)).map(|d| d.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            report_filename(STANDARD_PREFIX, "Suç ve Ceza", "20240101_120000"),
            "kitap_analizi_Suç_ve_Ceza_20240101_120000.xlsx"
        );
        let long = report_filename(STANDARD_PREFIX, &"a".repeat(80), "t");
        assert_eq!(long, format!("kitap_analizi_{}_t.xlsx", "a".repeat(30)));
        assert_eq!(
            report_filename(ADVANCED_PREFIX, "a/b:c", "t"),
            "gelismis_kitap_analizi_abc_t.xlsx"
        );
        assert_eq!(report_filename(STANDARD_PREFIX, "", "t"), "kitap_analizi_kitap_t.xlsx");
    }

    #[test]
    fn test_write_standard_report() {
        let dir = tempfile::tempdir().unwrap();
        let writer = XlsxReportWriter::new(dir.path().join("nested"));

        let best = offer("Nutuk", Some(35.9), Platform::Kitapyurdu);
        let results = SearchResultSet::from_offers(vec![
            offer("Nutuk Ciltli", Some(42.5), Platform::Idefix),
            offer("Nutuk Eski", None, Platform::Unknown),
            best.clone(),
        ]);
        let profit = ProfitCalculator::default().breakdown(35.9, &[42.5, 35.9]);
        let content = content();

        let path = writer
            .write(&ReportInput {
                results: &results,
                best: &best,
                content: &content,
                profit: &profit,
                prediction: None,
                reviews: None,
            })
            .unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("kitap_analizi_Nutuk_"));

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Özet", "Fiyat Karşılaştırma", "Kar Analizi", "Detaylı Analiz"]
        );

        let summary = workbook.worksheet_range("Özet").unwrap();
        assert_eq!(cell(&summary, 2, 1), "Nutuk");
        assert_eq!(cell(&summary, 4, 1), "35.9 TL");

        let comparison = workbook.worksheet_range("Fiyat Karşılaştırma").unwrap();
        // Ranked: cheapest first, unpriced last
        assert_eq!(cell(&comparison, 3, 1), "Nutuk");
        assert_eq!(cell(&comparison, 3, 5), "EN UCUZ");
        assert_eq!(cell(&comparison, 4, 1), "Nutuk Ciltli");
        assert_eq!(cell(&comparison, 5, 1), "Nutuk Eski");
        assert_eq!(cell(&comparison, 4, 5), "");

        let profit_sheet = workbook.worksheet_range("Kar Analizi").unwrap();
        assert_eq!(cell(&profit_sheet, 5, 0), "Komisyon (%21)");
        let verdicts: Vec<String> = (0..30).map(|r| cell(&profit_sheet, r, 0)).collect();
        assert!(verdicts.contains(&"- Satış Uygunluğu: Uygun".to_string()));
        assert!(verdicts.contains(&"- Rekabet Durumu: İyi".to_string()));
        assert!(!verdicts.contains(&"- Önerilen Fiyat: 150 TL".to_string()));

        let detail = workbook.worksheet_range("Detaylı Analiz").unwrap();
        assert_eq!(cell(&detail, 2, 0), "Kitap Analizi");
        assert_eq!(cell(&detail, 3, 0), "Analiz satırı");
        assert_eq!(cell(&detail, 4, 0), "İkinci satır");
    }

    #[test]
    fn test_write_advanced_report() {
        let dir = tempfile::tempdir().unwrap();
        let writer = XlsxReportWriter::new(dir.path());

        let best = offer("Nutuk", Some(35.9), Platform::Kitapyurdu);
        let results = SearchResultSet::from_offers(vec![best.clone()]);
        let profit = ProfitCalculator::default().breakdown(35.9, &[35.9]);
        let content = ContentSections {
            sentiment_analysis: Some("Olumlu".to_string()),
            trend_analysis: Some("Stabil".to_string()),
            ..content()
        };
        let prediction = predict_sales("Nutuk", 35.9, None);
        let reviews = ReviewSummary::sample();

        let path = writer
            .write(&ReportInput {
                results: &results,
                best: &best,
                content: &content,
                profit: &profit,
                prediction: Some(&prediction),
                reviews: Some(&reviews),
            })
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("gelismis_kitap_analizi_Nutuk_"));

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let names = workbook.sheet_names();
        assert_eq!(names.len(), 6);
        assert_eq!(names[4], "Satış Tahmini");
        assert_eq!(names[5], "Yorumlar");

        let forecast = workbook.worksheet_range("Satış Tahmini").unwrap();
        assert_eq!(cell(&forecast, 10, 1), "1. Ay");
        assert_eq!(cell(&forecast, 10, 6), "6. Ay");
        assert_eq!(cell(&forecast, 11, 1), "27");

        let review_sheet = workbook.worksheet_range("Yorumlar").unwrap();
        assert_eq!(cell(&review_sheet, 0, 0), "MÜŞTERİ YORUMLARI (ÖRNEK VERİ)");
        assert_eq!(cell(&review_sheet, 2, 1), "4");
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let writer = XlsxReportWriter::new(&blocker);
        let best = offer("Nutuk", Some(35.9), Platform::Kitapyurdu);
        let results = SearchResultSet::from_offers(vec![best.clone()]);
        let profit = ProfitCalculator::default().breakdown(35.9, &[35.9]);
        let content = content();

        let result = writer.write(&ReportInput {
            results: &results,
            best: &best,
            content: &content,
            profit: &profit,
            prediction: None,
            reviews: None,
        });
        assert!(result.is_err());
    }
}
