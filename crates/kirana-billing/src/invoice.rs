//! # Invoice Generation
//!
//! Renders a sale record into a single-page A4 invoice PDF and stores it
//! in the blob store under `invoices/`.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ (optional full-page letterhead image)        │
//! │                                              │
//! │  Name: Asha                 Date: 28/08/2026 │
//! │  Phone: 9876543210          Payment: Cash    │
//! │                                              │
//! │  Product                 Qty       Price (₹) │
//! │  ──────────────────────────────────────────  │
//! │  1. Soap                   2          100.00 │
//! │  ──────────────────────────────────────────  │
//! │                    Subtotal:          100.00 │
//! │                    Discount:           20.00 │
//! │                    Total:               80.00│
//! │                                              │
//! │         Thank you for your business!         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Rendering is split in two: [`receipt_text`] lays the invoice out as
//! deterministic text (same sale, same bytes, regardless of when it is
//! re-rendered), and the PDF writer paints those lines onto the page.
//! Re-issuing an invoice therefore produces an identical document under a
//! new filename.

use std::io::Cursor;

use chrono::{DateTime, SecondsFormat, Utc};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, Line, Mm, PdfDocument, Point, Rgb,
};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{BillingError, BillingResult};
use kirana_core::{Money, SaleRecord};
use kirana_db::{BlobStore, StoredBlob};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Ink color for all invoice text (dark navy).
const INK: (f32, f32, f32) = (12.0 / 255.0, 29.0 / 255.0, 73.0 / 255.0);

// =============================================================================
// Deterministic Text Layout
// =============================================================================

/// Formats a money value for invoice columns: plain `123.45`, no symbol
/// (the column header carries the ₹).
fn amount(m: Money) -> String {
    format!("{}.{:02}", m.rupees(), m.paise_part())
}

/// Invoice filename for an invoice issued at `issued_at`.
///
/// The name derives from the issue clock, not the sale's own timestamp:
/// every render gets a fresh filename, so re-issuing never overwrites an
/// already-delivered document. Colons are not valid in filenames on every
/// platform, so they become dashes: `Invoice_2026-08-28T10-15-00.000Z.pdf`.
pub fn invoice_filename(issued_at: DateTime<Utc>) -> String {
    let stamp = issued_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("Invoice_{stamp}.pdf")
}

/// Lays the invoice out as plain text, one entry per rendered line.
///
/// This is the canonical invoice content: deterministic in the sale record
/// alone. The PDF writer consumes these lines, so two renders of the same
/// sale produce byte-identical text and visually identical documents.
pub fn receipt_text(sale: &SaleRecord) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Name: {}", sale.customer_name));
    lines.push(format!("Phone: {}", sale.customer_phone));
    lines.push(format!("Date: {}", sale.timestamp.format("%d/%m/%Y")));
    lines.push(format!("Payment: {}", sale.payment_method.as_str()));
    lines.push(String::new());

    lines.push(format!("{:<40}{:>5}{:>15}", "Product", "Qty", "Price (₹)"));
    for (index, line) in sale.products.iter().enumerate() {
        lines.push(format!(
            "{:<40}{:>5}{:>15}",
            format!("{}. {}", index + 1, line.name),
            line.quantity,
            amount(line.line_total)
        ));
    }
    lines.push(String::new());

    lines.push(format!("{:>45}{:>15}", "Subtotal:", amount(sale.subtotal())));
    if sale.discount.is_positive() {
        lines.push(format!("{:>45}{:>15}", "Discount:", amount(sale.discount)));
    }
    lines.push(format!("{:>45}{:>15}", "Total:", amount(sale.total)));
    lines.push(String::new());

    lines.push("Thank you for your business!".to_string());
    lines.push(format!(
        "We appreciate your trust in us, {}. Have a wonderful day!",
        sale.customer_name
    ));

    lines.join("\n")
}

// =============================================================================
// PDF Rendering
// =============================================================================

/// Renders the sale as a single-page A4 PDF.
///
/// `letterhead` is an optional PNG painted across the whole page before the
/// text goes down. Rendering proceeds without it when absent.
pub fn render_pdf(sale: &SaleRecord, letterhead: Option<&[u8]>) -> BillingResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Invoice",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Invoice",
    );
    let layer = doc.get_page(page).get_layer(layer);

    if let Some(png) = letterhead {
        paint_letterhead(&layer, png)?;
    }

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| BillingError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| BillingError::Pdf(e.to_string()))?;

    let (r, g, b) = INK;
    layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    layer.set_outline_color(Color::Rgb(Rgb::new(r, g, b, None)));

    // Y positions measured from the top edge, as the layout was designed.
    let from_top = |mm: f32| Mm(PAGE_HEIGHT_MM - mm);
    let left = 20.0;
    let right = 190.0;
    let top = 50.0;

    // Customer block on the left, date and payment on the right.
    layer.use_text(
        format!("Name: {}", sale.customer_name),
        17.0,
        Mm(left),
        from_top(top),
        &font,
    );
    layer.use_text(
        format!("Phone: {}", sale.customer_phone),
        17.0,
        Mm(left),
        from_top(top + 10.0),
        &font,
    );
    layer.use_text(
        format!("Date: {}", sale.timestamp.format("%d/%m/%Y")),
        17.0,
        Mm(right - 60.0),
        from_top(top),
        &font,
    );
    layer.use_text(
        format!("Payment: {}", sale.payment_method.as_str()),
        17.0,
        Mm(right - 60.0),
        from_top(top + 10.0),
        &font,
    );

    // Line-item table.
    let mut y = top + 30.0;
    layer.use_text("Product", 16.0, Mm(25.0), from_top(y), &bold);
    layer.use_text("Qty", 16.0, Mm(120.0), from_top(y), &bold);
    layer.use_text("Price (₹)", 16.0, Mm(150.0), from_top(y), &bold);

    y += 5.0;
    rule(&layer, left, right, from_top(y));
    y += 10.0;

    for (index, line) in sale.products.iter().enumerate() {
        layer.use_text(
            format!("{}. {}", index + 1, line.name),
            16.0,
            Mm(25.0),
            from_top(y),
            &font,
        );
        layer.use_text(
            format!("{}", line.quantity),
            16.0,
            Mm(120.0),
            from_top(y),
            &font,
        );
        layer.use_text(amount(line.line_total), 16.0, Mm(150.0), from_top(y), &font);
        y += 10.0;
    }

    y += 5.0;
    rule(&layer, left, right, from_top(y));
    y += 10.0;

    layer.use_text("Subtotal:", 16.0, Mm(120.0), from_top(y), &font);
    layer.use_text(amount(sale.subtotal()), 16.0, Mm(150.0), from_top(y), &font);
    y += 10.0;

    if sale.discount.is_positive() {
        layer.use_text("Discount:", 16.0, Mm(120.0), from_top(y), &font);
        layer.use_text(amount(sale.discount), 16.0, Mm(150.0), from_top(y), &font);
        y += 10.0;
    }

    layer.use_text("Total:", 16.0, Mm(120.0), from_top(y), &bold);
    layer.use_text(amount(sale.total), 16.0, Mm(150.0), from_top(y), &bold);

    // Footer.
    y += 40.0;
    layer.use_text(
        "Thank you for your business!",
        12.0,
        Mm(70.0),
        from_top(y),
        &font,
    );
    layer.use_text(
        format!(
            "We appreciate your trust in us, {}. Have a wonderful day!",
            sale.customer_name
        ),
        12.0,
        Mm(50.0),
        from_top(y + 10.0),
        &font,
    );

    doc.save_to_bytes().map_err(|e| BillingError::Pdf(e.to_string()))
}

/// Draws a horizontal rule across the table width.
fn rule(layer: &printpdf::PdfLayerReference, from_mm: f32, to_mm: f32, y: Mm) {
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from_mm), y), false),
            (Point::new(Mm(to_mm), y), false),
        ],
        is_closed: false,
    });
}

/// Paints the letterhead PNG across the full page.
fn paint_letterhead(layer: &printpdf::PdfLayerReference, png: &[u8]) -> BillingResult<()> {
    use printpdf::image_crate::codecs::png::PngDecoder;

    let decoder =
        PngDecoder::new(Cursor::new(png)).map_err(|e| BillingError::Pdf(e.to_string()))?;
    let image = Image::try_from(decoder).map_err(|e| BillingError::Pdf(e.to_string()))?;

    // Stretch the image to cover A4 exactly, whatever its pixel size.
    let dpi = 300.0;
    let width_mm = image.image.width.0 as f32 * 25.4 / dpi;
    let height_mm = image.image.height.0 as f32 * 25.4 / dpi;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            scale_x: Some(PAGE_WIDTH_MM / width_mm),
            scale_y: Some(PAGE_HEIGHT_MM / height_mm),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

// =============================================================================
// Invoice Service
// =============================================================================

/// A generated invoice, stored and publicly retrievable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredInvoice {
    /// Filename the customer sees, e.g. `Invoice_2026-08-28T10-15-00.000Z.pdf`.
    pub filename: String,
    /// Public URL the document is served from.
    pub url: String,
}

/// Renders invoices and stores them in the blob store.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    blobs: BlobStore,
    http: Client,
    letterhead_url: Option<String>,
}

impl InvoiceService {
    /// Creates a new InvoiceService.
    pub fn new(blobs: BlobStore, letterhead_url: Option<String>) -> Self {
        InvoiceService {
            blobs,
            http: Client::new(),
            letterhead_url,
        }
    }

    /// Renders the invoice PDF for a sale and stores it under `invoices/`,
    /// filed under the current clock reading.
    ///
    /// The letterhead fetch is tolerant: an unreachable or broken image
    /// logs a warning and the invoice renders on a plain page.
    pub async fn generate_and_store(&self, sale: &SaleRecord) -> BillingResult<StoredInvoice> {
        self.generate_and_store_at(sale, Utc::now()).await
    }

    /// [`generate_and_store`] with the issue time injected.
    ///
    /// The filename comes from `issued_at`, not the sale's timestamp, so
    /// re-issuing the same record lands under a fresh name instead of
    /// overwriting the document already sent to the customer.
    ///
    /// [`generate_and_store`]: InvoiceService::generate_and_store
    pub async fn generate_and_store_at(
        &self,
        sale: &SaleRecord,
        issued_at: DateTime<Utc>,
    ) -> BillingResult<StoredInvoice> {
        let letterhead = self.fetch_letterhead().await;

        let pdf = render_pdf(sale, letterhead.as_deref())?;
        let filename = invoice_filename(issued_at);
        let path = format!("invoices/{filename}");

        debug!(%filename, bytes = pdf.len(), "Storing invoice PDF");
        let StoredBlob { url, .. } = self.blobs.put(&path, "application/pdf", &pdf).await?;

        Ok(StoredInvoice { filename, url })
    }

    async fn fetch_letterhead(&self) -> Option<Vec<u8>> {
        let url = self.letterhead_url.as_ref()?;

        let result = async {
            let response = self.http.get(url).send().await?.error_for_status()?;
            response.bytes().await
        }
        .await;

        match result {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(url, error = %e, "Letterhead fetch failed; rendering without it");
                None
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kirana_core::{PaymentMethod, SaleLine};

    fn sample_sale(discount_paise: i64) -> SaleRecord {
        let discount = Money::from_paise(discount_paise);
        SaleRecord {
            id: "sale-1".to_string(),
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            products: vec![SaleLine {
                name: "Soap".to_string(),
                price: Money::from_paise(5000),
                quantity: 2,
                line_total: Money::from_paise(10000),
            }],
            discount,
            total: Money::from_paise(10000 - discount_paise),
            payment_method: PaymentMethod::Cash,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 28, 10, 15, 0).unwrap(),
        }
    }

    #[test]
    fn test_filename_has_no_colons() {
        let name = invoice_filename(Utc.with_ymd_and_hms(2026, 8, 28, 10, 15, 0).unwrap());
        assert!(name.starts_with("Invoice_2026-08-28T10-15-00"));
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_receipt_text_is_deterministic() {
        let sale = sample_sale(2000);
        assert_eq!(receipt_text(&sale), receipt_text(&sale));
    }

    #[test]
    fn test_receipt_text_content() {
        let text = receipt_text(&sample_sale(2000));
        assert!(text.contains("Name: Asha"));
        assert!(text.contains("Payment: Cash"));
        assert!(text.contains("1. Soap"));
        assert!(text.contains("100.00"));
        assert!(text.contains("Discount:"));
        assert!(text.contains("80.00"));
        assert!(text.contains("Thank you for your business!"));
        assert!(text.contains("We appreciate your trust in us, Asha."));
    }

    #[test]
    fn test_receipt_text_omits_zero_discount() {
        let text = receipt_text(&sample_sale(0));
        assert!(!text.contains("Discount:"));
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let pdf = render_pdf(&sample_sale(2000), None).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_reissue_same_record_keeps_both_files() {
        let db = kirana_db::Database::new(kirana_db::DbConfig::in_memory())
            .await
            .unwrap();
        let service = InvoiceService::new(db.blobs(), None);
        let sale = sample_sale(0);

        let issued = Utc.with_ymd_and_hms(2026, 8, 28, 10, 20, 0).unwrap();
        let first = service.generate_and_store_at(&sale, issued).await.unwrap();
        let second = service
            .generate_and_store_at(&sale, issued + chrono::Duration::milliseconds(1))
            .await
            .unwrap();

        // Fresh filename per issue; the first upload is not replaced.
        assert_ne!(first.filename, second.filename);
        let first_bytes = db
            .blobs()
            .get(&format!("invoices/{}", first.filename))
            .await
            .unwrap();
        let second_bytes = db
            .blobs()
            .get(&format!("invoices/{}", second.filename))
            .await
            .unwrap();
        assert!(first_bytes.starts_with(b"%PDF"));
        assert!(second_bytes.starts_with(b"%PDF"));
    }
}
