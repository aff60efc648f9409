//! Field normalizers: pure reshaping of nested storefront payloads into the
//! canonical record types.

use pixel_core::types::{ImpressionRecord, LineItem, OrderLineItem};
use pixel_core::NormalizeError;
use serde_json::Number;

use crate::events::{CartItem, Impression, ProductOrder};

/// Borrow a field the producer is contractually required to send.
pub(crate) fn required<'a, T>(value: &'a Option<T>, path: &str) -> Result<&'a T, NormalizeError> {
    value.as_ref().ok_or_else(|| NormalizeError::missing(path))
}

/// Clean the first category path of a product.
///
/// Returns `None` for an absent or empty list (or an empty first entry).
/// Otherwise strips at most one leading and one trailing `/` from the first
/// path; deeper levels are not consulted.
pub fn clean_category(categories: Option<&[String]>) -> Option<String> {
    let first = categories?.first()?;
    if first.is_empty() {
        return None;
    }
    Some(strip_outer_slashes(first).to_string())
}

fn strip_outer_slashes(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Render a JSON number the way a browser's `String(n)` would: integral
/// values have no fractional part, and magnitudes from `1e21` up or below
/// `1e-6` use exponent form (`1e+21`, `1.5e-7`).
pub fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_form(f),
        Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn exponent_form(f: f64) -> String {
    let rendered = format!("{f:e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => rendered,
    }
}

/// Line item of a cart mutation.
pub fn cart_line_item(item: &CartItem) -> LineItem {
    LineItem {
        product_id: item.product_ref_id.clone(),
        sku: item.sku_id.clone(),
        category: item.category.clone(),
        name: item.name.clone(),
        brand: item.brand.clone(),
        variant: item.variant.clone(),
        price: item.price.clone(),
        quantity: item.quantity.clone(),
    }
}

/// Line item of a placed order.
pub fn order_line_item(product: &ProductOrder) -> OrderLineItem {
    OrderLineItem {
        product_id: product.id.clone(),
        sku: product.sku.clone(),
        name: product.name.clone(),
        price: product.price.clone(),
        quantity: product.quantity.clone(),
        category: product.category.clone(),
    }
}

/// Build the impression mapper for one product list.
///
/// The seller and its commercial offer are mandatory here: a product without
/// `sku.seller.commertialOffer` fails with a missing-field error. An offer
/// without `Price` yields a record without a price.
pub fn impression_shaper(
    list: Option<&str>,
) -> impl Fn(&Impression) -> Result<ImpressionRecord, NormalizeError> + '_ {
    move |impression: &Impression| {
        let product = required(&impression.product, "product")?;
        let sku = required(&product.sku, "product.sku")?;
        let seller = required(&sku.seller, "product.sku.seller")?;
        let offer = required(&seller.commertial_offer, "product.sku.seller.commertialOffer")?;

        Ok(ImpressionRecord {
            brand: product.brand.clone(),
            category: clean_category(product.categories.as_deref()),
            product_id: sku.item_id.clone(),
            list: list.map(str::to_string),
            name: product.product_name.clone(),
            position: impression.position.clone(),
            price: offer.price.as_ref().map(number_to_string),
            variant: sku.name.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{CommertialOffer, ProductSummary, Seller, SummarySku};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn cats(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[rstest]
    #[case::wrapped("/electronics/", Some("electronics"))]
    #[case::clean("electronics", Some("electronics"))]
    #[case::leading_only("/electronics", Some("electronics"))]
    #[case::trailing_only("electronics/", Some("electronics"))]
    #[case::nested("/electronics/phones/", Some("electronics/phones"))]
    #[case::one_slash_each_side("//electronics//", Some("/electronics/"))]
    #[case::lone_slash("/", Some(""))]
    #[case::empty("", None)]
    fn test_clean_category(#[case] first: &str, #[case] expected: Option<&str>) {
        let categories = cats(&[first, "/ignored/"]);
        assert_eq!(
            clean_category(Some(categories.as_slice())),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn test_clean_category_absent_or_empty_list() {
        assert_eq!(clean_category(None), None);
        assert_eq!(clean_category(Some(&[][..])), None);
    }

    proptest! {
        #[test]
        fn prop_clean_category_idempotent_on_clean_paths(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            let once = clean_category(Some(&[path.clone()][..])).unwrap();
            prop_assert_eq!(&once, &path);
            let twice = clean_category(Some(&[once.clone()][..])).unwrap();
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_clean_category_strips_one_slash_each_side(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            let wrapped = format!("/{path}/");
            prop_assert_eq!(clean_category(Some(&[wrapped][..])), Some(path));
        }
    }

    #[rstest]
    #[case(json!(10), "10")]
    #[case(json!(10.0), "10")]
    #[case(json!(10.5), "10.5")]
    #[case(json!(-3), "-3")]
    #[case(json!(0.0), "0")]
    #[case(json!(1999.99), "1999.99")]
    #[case(json!(1e21), "1e+21")]
    #[case(json!(2.5e22), "2.5e+22")]
    #[case(json!(1e20), "100000000000000000000")]
    #[case(json!(1e-7), "1e-7")]
    #[case(json!(-1.5e-7), "-1.5e-7")]
    #[case(json!(0.000001), "0.000001")]
    fn test_number_to_string(#[case] value: serde_json::Value, #[case] expected: &str) {
        let serde_json::Value::Number(n) = value else {
            panic!("not a number");
        };
        assert_eq!(number_to_string(&n), expected);
    }

    fn summary(seller: Option<Seller>) -> ProductSummary {
        ProductSummary {
            product_id: Some("p-1".into()),
            product_name: Some("Widget".into()),
            brand: Some("Acme".into()),
            categories: Some(cats(&["/toys/", "/toys/widgets/"])),
            link_text: Some("widget".into()),
            sku: Some(SummarySku {
                item_id: Some("sku-1".into()),
                name: Some("Blue".into()),
                seller,
                image: None,
            }),
        }
    }

    fn priced_seller(price: Number) -> Seller {
        Seller {
            commertial_offer: Some(CommertialOffer { price: Some(price) }),
        }
    }

    #[test]
    fn test_impression_shaper_record() {
        let shape = impression_shaper(Some("Search results"));
        let record = shape(&Impression {
            product: Some(summary(Some(priced_seller(25.into())))),
            position: Some(3.into()),
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "brand": "Acme",
                "category": "toys",
                "product_id": "sku-1",
                "list": "Search results",
                "name": "Widget",
                "position": 3,
                "price": "25",
                "variant": "Blue"
            })
        );
    }

    #[test]
    fn test_impression_shaper_requires_seller() {
        let shape = impression_shaper(None);
        let err = shape(&Impression {
            product: Some(summary(None)),
            position: Some(1.into()),
        })
        .unwrap_err();
        assert!(
            matches!(err, NormalizeError::MissingField(ref path) if path == "product.sku.seller")
        );
    }

    #[test]
    fn test_impression_shaper_without_price_omits_it() {
        let shape = impression_shaper(Some("Shelf"));
        let record = shape(&Impression {
            product: Some(summary(Some(Seller {
                commertial_offer: Some(CommertialOffer { price: None }),
            }))),
            position: Some(1.into()),
        })
        .unwrap();
        assert_eq!(record.price, None);
        assert!(serde_json::to_value(&record).unwrap().get("price").is_none());
    }

    #[test]
    fn test_impression_shaper_requires_commertial_offer() {
        let shape = impression_shaper(None);
        let err = shape(&Impression {
            product: Some(summary(Some(Seller::default()))),
            position: Some(1.into()),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingField(ref path) if path == "product.sku.seller.commertialOffer"
        ));
    }

    #[test]
    fn test_impression_shaper_requires_product() {
        let shape = impression_shaper(Some("Shelf"));
        let err = shape(&Impression::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField(ref path) if path == "product"));
    }

    #[test]
    fn test_cart_line_item_renames() {
        let item = CartItem {
            product_id: Some("internal-9".into()),
            product_ref_id: Some("REF-9".into()),
            sku_id: Some("sku-9".into()),
            quantity: Some(2.into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(cart_line_item(&item)).unwrap(),
            json!({ "product_id": "REF-9", "sku": "sku-9", "quantity": 2 })
        );
    }
}
