//! Raw storefront pixel events: the payloads the storefront event bus
//! delivers, one variant per lifecycle event.
//!
//! Decoding is lenient: every payload field is optional and absence is only
//! judged later by the normalizers. Numeric fields keep their JSON number
//! representation so they are forwarded exactly as received.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A delivered message. The envelope lives under `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelMessage {
    pub data: PixelEvent,
}

/// Raw event envelope, discriminated by `eventName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "eventName")]
pub enum PixelEvent {
    #[serde(rename = "vtex:userData")]
    UserData(UserData),
    #[serde(rename = "vtex:pageView")]
    PageView(PageView),
    #[serde(rename = "vtex:addToCart")]
    AddToCart(CartChange),
    #[serde(rename = "vtex:removeFromCart")]
    RemoveFromCart(CartChange),
    #[serde(rename = "vtex:orderPlaced")]
    OrderPlaced(OrderPlaced),
    #[serde(rename = "vtex:productView")]
    ProductView(ProductView),
    #[serde(rename = "vtex:productClick")]
    ProductClick(ProductClick),
    #[serde(rename = "vtex:productImpression")]
    ProductImpression(ProductImpression),
    /// Any discriminant this pixel does not handle.
    #[serde(other)]
    Unknown,
}

impl PixelEvent {
    /// The discriminant string, or `None` for unrecognized events.
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            Self::UserData(_) => Some("vtex:userData"),
            Self::PageView(_) => Some("vtex:pageView"),
            Self::AddToCart(_) => Some("vtex:addToCart"),
            Self::RemoveFromCart(_) => Some("vtex:removeFromCart"),
            Self::OrderPlaced(_) => Some("vtex:orderPlaced"),
            Self::ProductView(_) => Some("vtex:productView"),
            Self::ProductClick(_) => Some("vtex:productClick"),
            Self::ProductImpression(_) => Some("vtex:productImpression"),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    /// `null` and absent both read as not logged in.
    pub is_authenticated: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document: Option<String>,
    pub id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageView {
    pub page_title: Option<String>,
    pub page_url: Option<String>,
    pub referrer: Option<String>,
}

/// Payload of both `vtex:addToCart` and `vtex:removeFromCart`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartChange {
    pub items: Option<Vec<CartItem>>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItem {
    pub product_id: Option<String>,
    pub product_ref_id: Option<String>,
    pub sku_id: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub variant: Option<String>,
    pub price: Option<Number>,
    pub quantity: Option<Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPlaced {
    pub transaction_id: Option<String>,
    pub order_group: Option<String>,
    pub transaction_affiliation: Option<String>,
    pub transaction_total: Option<Number>,
    pub transaction_subtotal: Option<Number>,
    pub transaction_shipping: Option<Number>,
    pub transaction_tax: Option<Number>,
    pub transaction_discounts: Option<Number>,
    pub currency: Option<String>,
    pub transaction_products: Option<Vec<ProductOrder>>,
}

/// One product line of a placed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductOrder {
    pub id: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Number>,
    pub quantity: Option<Number>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductView {
    pub product: Option<ProductDetail>,
    pub currency: Option<String>,
}

/// Product as shown on a product detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDetail {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub categories: Option<Vec<String>>,
    pub selected_sku: Option<SelectedSku>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedSku {
    pub item_id: Option<String>,
    pub name: Option<String>,
    pub sellers: Option<Vec<Seller>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seller {
    pub commertial_offer: Option<CommertialOffer>,
}

/// Commercial offer of a seller. The field spelling is the storefront's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommertialOffer {
    #[serde(rename = "Price")]
    pub price: Option<Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductClick {
    pub product: Option<ProductSummary>,
}

/// Product as shown in a shelf or list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSummary {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub categories: Option<Vec<String>>,
    pub link_text: Option<String>,
    pub sku: Option<SummarySku>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummarySku {
    pub item_id: Option<String>,
    pub name: Option<String>,
    pub seller: Option<Seller>,
    pub image: Option<SkuImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkuImage {
    pub image_url: Option<String>,
}

/// `vtex:productImpression` payload.
///
/// Older producers send a single `product` + `position`; newer ones send the
/// `impressions` list. Both may be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductImpression {
    pub list: Option<String>,
    pub impressions: Option<Vec<Impression>>,
    pub product: Option<ProductSummary>,
    pub position: Option<Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Impression {
    pub product: Option<ProductSummary>,
    pub position: Option<Number>,
}
