use crate::domain::product::{Catalog, Product};
use std::fmt::Write;

/// Generates a Rust module of product-id constants and typed accessors from a
/// catalog.
///
/// Build-time convenience only: the output maps each product to `ID_*` /
/// `PRICE_*` constants plus `purchase_*`, `is_purchased_*` and
/// `localized_price_*` functions taking the coordinator, so game code never
/// spells out raw id strings.
pub fn generate_product_module(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("// Generated by purchasekit. Do not edit by hand.\n\n");
    out.push_str("use purchasekit::{PurchaseCoordinator, PurchaseOutcome, Result};\n");

    for product in catalog.iter() {
        render_product(&mut out, product);
    }
    out
}

fn render_product(out: &mut String, product: &Product) {
    let item = item_name(product.id.as_str());
    let upper = item.to_uppercase();

    // Writing to a String cannot fail.
    let _ = write!(
        out,
        r#"
pub const ID_{upper}: &str = "{id}";
pub const PRICE_{upper}: &str = "{price}";

pub async fn purchase_{item}(iap: &PurchaseCoordinator) -> Result<PurchaseOutcome> {{
    iap.purchase(ID_{upper}).await
}}

pub async fn is_purchased_{item}(iap: &PurchaseCoordinator) -> Result<bool> {{
    iap.is_purchased(ID_{upper}).await
}}

pub async fn localized_price_{item}(iap: &PurchaseCoordinator) -> Result<Option<String>> {{
    iap.localized_price(ID_{upper}).await
}}
"#,
        id = product.id,
        price = product.price,
    );
}

/// Derives an identifier from the last `.`-segment of a product id, mapping
/// anything that is not alphanumeric to `_`.
fn item_name(id: &str) -> String {
    let segment = id.rsplit('.').next().unwrap_or(id);
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
