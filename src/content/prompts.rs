//! Fixed Turkish prompt templates and their deterministic fallbacks.

use crate::offers::{Offer, SearchResultSet};
use crate::prediction::SalesPrediction;
use crate::profit::ProfitBreakdown;
use crate::reviews::ReviewSummary;

/// One numbered line per offer: `1. title - platform - price TL`.
fn offer_lines(results: &SearchResultSet) -> String {
    results
        .all_offers()
        .enumerate()
        .map(|(i, offer)| {
            format!(
                "{}. {} - {} - {} TL\n",
                i + 1,
                offer.title,
                offer.platform,
                offer.price_or_zero()
            )
        })
        .collect()
}

fn offer_header(best: &Offer) -> String {
    format!(
        "KİTAP: {}\nPLATFORM: {}\nFİYAT: {} TL\n",
        best.title,
        best.platform,
        best.price_or_zero()
    )
}

pub fn analysis(results: &SearchResultSet, best: &Offer) -> String {
    format!(
        "Sen bir kitap analiz uzmanısın. Aşağıdaki kitap arama sonuçlarını analiz et:\n\n\
         KİTAP ADI: {}\n\
         EN İYİ TEKLİF: {} - {} TL\n\n\
         TÜM SONUÇLAR:\n{}\n\
         Bu kitap hakkında kısa bir analiz yaz:\n\
         - Kitabın popülerliği\n\
         - Fiyat durumu\n\
         - Hangi platformlarda bulunabilir\n\
         - En iyi fırsat nerede\n\
         - Hedef kitle kimdir\n\n\
         Türkçe olarak 3-4 cümlelik analiz yaz.\n",
        best.title,
        best.platform,
        best.price_or_zero(),
        offer_lines(results)
    )
}

pub fn seo(best: &Offer) -> String {
    format!(
        "Sen bir SEO uzmanısın. Aşağıdaki kitap için SEO uyumlu içerik üret:\n\n{}\n\
         Bu kitap için SEO uyumlu içerik yaz:\n\
         - Başlık (60 karakter)\n\
         - Meta açıklama (160 karakter)\n\
         - Ürün açıklaması (2-3 paragraf)\n\
         - Anahtar kelimeler (5 adet)\n\
         - Neden almalısınız (3 madde)\n\n\
         Türkçe olarak yaz.\n",
        offer_header(best)
    )
}

pub fn sales(best: &Offer) -> String {
    format!(
        "Sen bir satış stratejisi uzmanısın. Aşağıdaki kitap için satış önerileri üret:\n\n{}\n\
         Bu kitap için satış önerileri yaz:\n\
         - Nerede listeleyebilirsiniz?\n\
         - Hangi fiyatla satabilirsiniz?\n\
         - Hedef kitle kimdir?\n\
         - Satış stratejisi nedir?\n\n\
         Türkçe olarak 3-4 cümlelik öneri yaz.\n",
        offer_header(best)
    )
}

pub fn summary(best: &Offer) -> String {
    format!(
        "Aşağıdaki kitap için kısa özet oluştur:\n\n{}\n\
         Bu kitap hakkında 2-3 cümlelik özet yaz:\n\
         - Kitabın durumu\n\
         - En iyi fırsat\n\
         - Öneri\n\n\
         Türkçe olarak yaz.\n",
        offer_header(best)
    )
}

pub fn profit(results: &SearchResultSet, best: &Offer, breakdown: &ProfitBreakdown) -> String {
    let options: String = breakdown
        .options
        .iter()
        .map(|o| {
            format!(
                "- {} TL kar ile: {:.2} TL (Net kar: {:.2} TL)\n",
                o.margin, o.selling_price, o.net_profit
            )
        })
        .collect();

    format!(
        "Sen bir e-ticaret satış analisti ve kar hesaplama uzmanısın. \
         Aşağıdaki kitap için detaylı satış analizi yap:\n\n\
         KİTAP: {title}\n\
         EN UCUZ FİYAT: {platform} - {price} TL\n\
         EN PAHALI FİYAT: {max} TL\n\
         ORTALAMA FİYAT: {avg:.2} TL\n\n\
         TÜM FİYATLAR:\n{lines}\n\
         KAR HESAPLAMA:\n\
         - Alış Fiyatı: {price} TL\n\
         - Kargo Maliyeti: {shipping} TL\n\
         - Toplam Maliyet: {total} TL\n\
         - Komisyon Oranı: %{rate}\n\
         - Kar Marjı: {margin} TL\n\
         - Önerilen Satış Fiyatı: {suggested:.2} TL\n\
         - Kar Yüzdesi: %{percentage:.1}\n\n\
         REKABET ANALİZİ:\n\
         - En Pahalı Rakip: {max} TL\n\
         - Bizim Satış Fiyatımız: {suggested:.2} TL\n\
         - Rekabet Edebilir mi: {compete}\n\n\
         KAR MARJI SEÇENEKLERİ:\n{options}\n\
         ANALİZ YAP:\n\
         1. Bu kitap satış için uygun mu?\n\
         2. Hangi kar marjı ile rekabet edebiliriz?\n\
         3. En uygun satış fiyatı nedir?\n\
         4. Risk değerlendirmesi nasıl?\n\n\
         DETAYLI RAPOR VER:\n\
         - Satış Uygunluğu: [Uygun/Orta/Uygun Değil]\n\
         - Kar Analizi: [Yüksek/Orta/Düşük]\n\
         - Rekabet Durumu: [Açıklama]\n\
         - Önerilen Fiyat: [Fiyat] TL\n\
         - Satış Stratejisi: [Açıklama]\n\
         - Risk Değerlendirmesi: [Açıklama]\n\n\
         Türkçe olarak detaylı analiz yaz.\n",
        title = best.title,
        platform = best.platform,
        price = breakdown.purchase_price,
        max = breakdown.max_competitor_price,
        avg = breakdown.avg_competitor_price,
        lines = offer_lines(results),
        shipping = breakdown.shipping_cost,
        total = breakdown.total_cost,
        rate = breakdown.commission_rate * 100.0,
        margin = breakdown.profit_margin,
        suggested = breakdown.suggested_price,
        percentage = breakdown.profit_percentage,
        compete = if breakdown.can_compete { "EVET" } else { "HAYIR" },
        options = options,
    )
}

pub fn sentiment(best: &Offer, reviews: &ReviewSummary) -> String {
    let samples: String = reviews
        .reviews
        .iter()
        .take(10)
        .map(|r| format!("- ({} yıldız) {}\n", r.rating, r.comment))
        .collect();

    format!(
        "Sen bir müşteri yorumu analiz uzmanısın. Aşağıdaki kitabın yorumlarını değerlendir:\n\n\
         KİTAP: {}\n\
         ORTALAMA PUAN: {:.2} / 5\n\
         YORUM SAYISI: {}\n\
         OLUMLU YORUM ORANI: %{:.0}\n\n\
         ÖRNEK YORUMLAR:\n{}\n\
         Okuyucuların genel duygu durumunu, öne çıkan övgü ve şikayetleri özetle.\n\
         Türkçe olarak 3-4 cümlelik analiz yaz.\n",
        best.title,
        reviews.average_rating,
        reviews.total,
        reviews.positive_share(),
        samples
    )
}

pub fn trend(best: &Offer, prediction: &SalesPrediction) -> String {
    let projection: String = prediction
        .projection
        .iter()
        .map(|m| format!("- {}: {} adet, {:.2} TL\n", m.label, m.sales, m.revenue))
        .collect();

    format!(
        "Sen bir pazar trendi analistisin. Aşağıdaki kitabın satış beklentisini yorumla:\n\n\
         KİTAP: {}\n\
         FİYAT: {} TL\n\
         POPÜLERLİK: {:.2} ({})\n\
         TAHMİNİ AYLIK SATIŞ: {} adet\n\
         GÜVEN: %{:.0}\n\n\
         6 AYLIK PROJEKSİYON:\n{}\n\
         Stok ve fiyatlandırma için kısa bir öneri ver.\n\
         Türkçe olarak 3-4 cümle yaz.\n",
        best.title,
        best.price_or_zero(),
        prediction.popularity_score,
        prediction.trend_status,
        prediction.predicted_monthly_sales,
        prediction.confidence * 100.0,
        projection
    )
}

/// Template text used when the model call for a section fails.
pub mod fallback {
    use super::*;

    pub fn analysis(best: &Offer) -> String {
        format!(
            "{} kitabı analiz edildi. Fiyat aralığı {} TL civarında ve {} platformunda en uygun fiyatla bulunabilir.",
            best.title,
            best.price_or_zero(),
            best.platform
        )
    }

    pub fn seo(best: &Offer) -> String {
        format!(
            "SEO içeriği: {} - {} TL fiyatla {} platformunda satışta. Kitap severler için ideal fiyat ve kalite.",
            best.title,
            best.price_or_zero(),
            best.platform
        )
    }

    pub fn sales(best: &Offer) -> String {
        format!(
            "Satış önerisi: {} platformunda {} TL fiyatla satabilirsiniz. Hedef kitle kitap severler ve öğrenciler.",
            best.platform,
            best.price_or_zero()
        )
    }

    pub fn summary(best: &Offer) -> String {
        format!(
            "{} kitabı {} platformunda {} TL fiyatla bulunabilir. Bu fiyatla satış yapabilirsiniz.",
            best.title,
            best.platform,
            best.price_or_zero()
        )
    }

    pub fn profit(best: &Offer, breakdown: &ProfitBreakdown) -> String {
        format!(
            "Kar Analizi: {} kitabı {} TL'ye alınıp {:.2} TL'ye satılabilir. %{} komisyon, {} TL kargo ve {} TL kar ile toplam {:.2} TL net kar elde edilir.",
            best.title,
            breakdown.purchase_price,
            breakdown.suggested_price,
            breakdown.commission_rate * 100.0,
            breakdown.shipping_cost,
            breakdown.profit_margin,
            breakdown.net_profit
        )
    }

    pub fn sentiment(reviews: &ReviewSummary) -> String {
        format!(
            "Yorum Analizi: {} yorumun ortalama puanı {:.2}. Yorumların %{:.0} kadarı olumlu.",
            reviews.total,
            reviews.average_rating,
            reviews.positive_share()
        )
    }

    pub fn trend(prediction: &SalesPrediction) -> String {
        format!(
            "Trend Analizi: {} seviyesinde, aylık tahmini {} adet satış ve {:.2} TL gelir bekleniyor.",
            prediction.trend_status, prediction.predicted_monthly_sales, prediction.monthly_revenue
        )
    }
}
