//! Event dispatcher: routes each raw pixel event to its normalization rule
//! and forwards the resulting canonical call to the analytics client.
//!
//! Every recognized event produces exactly one client call. Unknown events
//! and unauthenticated user data produce none. Payloads that break the
//! producer contract (e.g. an empty cart item list) fail with
//! [`NormalizeError::MissingField`] and nothing is forwarded.

use std::sync::Arc;

use pixel_core::types::{
    OrderCompleted, PageViewed, ProductClicked, ProductListViewed, ProductViewed, UserTraits,
};
use pixel_core::{AnalyticsClient, CanonicalCall, NormalizeError};
use tracing::debug;

use crate::events::{
    CartChange, Impression, OrderPlaced, PageView, PixelEvent, ProductClick, ProductImpression,
    ProductView, UserData,
};
use crate::normalize::{
    cart_line_item, clean_category, impression_shaper, order_line_item, required,
};

pub const PAGE_VIEWED: &str = "Page Viewed";
pub const PRODUCT_ADDED: &str = "Product Added";
pub const PRODUCT_REMOVED: &str = "Product Removed";
pub const ORDER_COMPLETED: &str = "Order Completed";
pub const PRODUCT_VIEWED: &str = "Product Viewed";
pub const PRODUCT_CLICKED: &str = "Product Clicked";
pub const PRODUCT_LIST_VIEWED: &str = "Product List Viewed";

/// Outcome of dispatching one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The call was handed to the analytics client.
    Forwarded(CanonicalCall),
    /// Nothing was sent.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `vtex:userData` for a visitor who is not logged in.
    Unauthenticated,
    /// A discriminant this pixel does not handle.
    UnknownEvent,
}

/// Routes raw events to the analytics client.
pub struct Dispatcher {
    client: Arc<dyn AnalyticsClient>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn AnalyticsClient>) -> Self {
        Self { client }
    }

    /// Normalize one event and forward the result.
    pub fn handle(&self, event: &PixelEvent) -> Result<Dispatch, NormalizeError> {
        let Some(call) = normalize(event)? else {
            let reason = match event {
                PixelEvent::UserData(_) => IgnoreReason::Unauthenticated,
                _ => IgnoreReason::UnknownEvent,
            };
            debug!(reason = ?reason, "pixel event ignored");
            return Ok(Dispatch::Ignored(reason));
        };

        call.forward(self.client.as_ref());
        debug!(
            method = call.method(),
            name = call.name(),
            event_name = ?event.event_name(),
            "canonical call forwarded"
        );
        Ok(Dispatch::Forwarded(call))
    }
}

/// Map one raw event to its canonical call without forwarding it.
///
/// `Ok(None)` means the event is intentionally not tracked.
pub fn normalize(event: &PixelEvent) -> Result<Option<CanonicalCall>, NormalizeError> {
    match event {
        PixelEvent::UserData(user) => identify_user(user),
        PixelEvent::PageView(page) => page_viewed(page).map(Some),
        PixelEvent::AddToCart(cart) => cart_changed(PRODUCT_ADDED, cart).map(Some),
        PixelEvent::RemoveFromCart(cart) => cart_changed(PRODUCT_REMOVED, cart).map(Some),
        PixelEvent::OrderPlaced(order) => order_completed(order).map(Some),
        PixelEvent::ProductView(view) => product_viewed(view).map(Some),
        PixelEvent::ProductClick(click) => product_clicked(click).map(Some),
        PixelEvent::ProductImpression(impression) => product_list_viewed(impression).map(Some),
        PixelEvent::Unknown => Ok(None),
    }
}

fn identify_user(user: &UserData) -> Result<Option<CanonicalCall>, NormalizeError> {
    if user.is_authenticated != Some(true) {
        return Ok(None);
    }
    let id = required(&user.id, "id")?;

    let traits = UserTraits {
        is_authenticated: true,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        document: user.document.clone(),
        id: id.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
    };
    CanonicalCall::identify(id.as_str(), &traits).map(Some)
}

fn page_viewed(page: &PageView) -> Result<CanonicalCall, NormalizeError> {
    CanonicalCall::track(
        PAGE_VIEWED,
        &PageViewed {
            title: page.page_title.clone(),
            url: page.page_url.clone(),
            referrer: page.referrer.clone(),
        },
    )
}

/// Only the first item is tracked, whatever else the list holds.
fn cart_changed(event: &str, cart: &CartChange) -> Result<CanonicalCall, NormalizeError> {
    let item = cart
        .items
        .as_deref()
        .and_then(|items| items.first())
        .ok_or_else(|| NormalizeError::missing("items[0]"))?;
    CanonicalCall::track(event, &cart_line_item(item))
}

fn order_completed(order: &OrderPlaced) -> Result<CanonicalCall, NormalizeError> {
    let products = required(&order.transaction_products, "transactionProducts")?;

    CanonicalCall::track(
        ORDER_COMPLETED,
        &OrderCompleted {
            checkout_id: order.transaction_id.clone(),
            order_id: order.order_group.clone(),
            affiliation: order.transaction_affiliation.clone(),
            total: order.transaction_total.clone(),
            revenue: order.transaction_subtotal.clone(),
            shipping: order.transaction_shipping.clone(),
            tax: order.transaction_tax.clone(),
            discount: order.transaction_discounts.clone(),
            currency: order.currency.clone(),
            products: products.iter().map(order_line_item).collect(),
        },
    )
}

fn product_viewed(view: &ProductView) -> Result<CanonicalCall, NormalizeError> {
    let product = required(&view.product, "product")?;
    let sku = required(&product.selected_sku, "product.selectedSku")?;
    let seller = sku
        .sellers
        .as_deref()
        .and_then(|sellers| sellers.first())
        .ok_or_else(|| NormalizeError::missing("product.selectedSku.sellers[0]"))?;
    let offer = required(
        &seller.commertial_offer,
        "product.selectedSku.sellers[0].commertialOffer",
    )?;

    CanonicalCall::track(
        PRODUCT_VIEWED,
        &ProductViewed {
            product_id: product.product_id.clone(),
            sku: sku.item_id.clone(),
            category: clean_category(product.categories.as_deref()),
            name: product.product_name.clone(),
            brand: product.brand.clone(),
            variant: sku.name.clone(),
            price: offer.price.clone(),
            currency: view.currency.clone(),
        },
    )
}

/// The seller is optional on clicks: no seller means no price.
fn product_clicked(click: &ProductClick) -> Result<CanonicalCall, NormalizeError> {
    let product = required(&click.product, "product")?;
    let sku = required(&product.sku, "product.sku")?;
    let image = required(&sku.image, "product.sku.image")?;
    let price = match &sku.seller {
        Some(seller) => {
            required(&seller.commertial_offer, "product.sku.seller.commertialOffer")?
                .price
                .clone()
        }
        None => None,
    };

    CanonicalCall::track(
        PRODUCT_CLICKED,
        &ProductClicked {
            product_id: product.product_id.clone(),
            sku: sku.item_id.clone(),
            category: clean_category(product.categories.as_deref()),
            name: product.product_name.clone(),
            brand: product.brand.clone(),
            variant: sku.name.clone(),
            price,
            url: product.link_text.clone(),
            image_url: image.image_url.clone(),
        },
    )
}

/// A singular `product` + `position` (the legacy shape) wins over the
/// `impressions` list; the list is only read when the legacy pair is absent.
fn product_list_viewed(impression: &ProductImpression) -> Result<CanonicalCall, NormalizeError> {
    let shape = impression_shaper(impression.list.as_deref());

    let products = match (&impression.product, &impression.position) {
        (Some(product), Some(position)) => {
            let legacy = Impression {
                product: Some(product.clone()),
                position: Some(position.clone()),
            };
            vec![shape(&legacy)?]
        }
        _ => impression
            .impressions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, imp)| shape(imp).map_err(|e| e.within(&format!("impressions[{i}]"))))
            .collect::<Result<Vec<_>, _>>()?,
    };

    CanonicalCall::track(
        PRODUCT_LIST_VIEWED,
        &ProductListViewed {
            list_id: impression.list.clone(),
            products,
        },
    )
}
