//! Canonical analytics call schema shared by the dispatcher, the analytics
//! clients and the relay binary.

use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::client::AnalyticsClient;
use crate::error::NormalizeError;

/// Trait or property mapping carried by a canonical call.
pub type Properties = serde_json::Map<String, Value>;

/// The normalized call handed to the analytics client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CanonicalCall {
    Identify { user_id: String, traits: Properties },
    Track { event: String, properties: Properties },
}

impl CanonicalCall {
    pub fn identify<T: Serialize>(
        user_id: impl Into<String>,
        traits: &T,
    ) -> Result<Self, NormalizeError> {
        Ok(Self::Identify {
            user_id: user_id.into(),
            traits: to_properties(traits)?,
        })
    }

    pub fn track<T: Serialize>(
        event: impl Into<String>,
        properties: &T,
    ) -> Result<Self, NormalizeError> {
        Ok(Self::Track {
            event: event.into(),
            properties: to_properties(properties)?,
        })
    }

    /// Tracking method name: `"identify"` or `"track"`.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Identify { .. } => "identify",
            Self::Track { .. } => "track",
        }
    }

    /// User id for identify calls, event label for track calls.
    pub fn name(&self) -> &str {
        match self {
            Self::Identify { user_id, .. } => user_id,
            Self::Track { event, .. } => event,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Self::Identify { traits, .. } => traits,
            Self::Track { properties, .. } => properties,
        }
    }

    /// Hand this call to the client. Return values are never inspected.
    pub fn forward(&self, client: &dyn AnalyticsClient) {
        match self {
            Self::Identify { user_id, traits } => client.identify(user_id, traits),
            Self::Track { event, properties } => client.track(event, properties),
        }
    }
}

fn to_properties<T: Serialize>(value: &T) -> Result<Properties, NormalizeError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(NormalizeError::Serialization(serde_json::Error::custom(
            format!("call properties must serialize to an object, got {other}"),
        ))),
    }
}

// ─── Identify ───────────────────────────────────────────────────────────

/// Traits attached to an identify call. Keys keep the storefront's casing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTraits {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// ─── Track properties ───────────────────────────────────────────────────

/// "Page Viewed" properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageViewed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// One product/SKU of a cart mutation. Used as the whole property set of
/// "Product Added" and "Product Removed".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Number>,
}

/// One product of a placed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// "Order Completed" properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCompleted {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub products: Vec<OrderLineItem>,
}

/// "Product Viewed" properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductViewed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// "Product Clicked" properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductClicked {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One product shown in a product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpressionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Number>,
    /// Seller price rendered as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// "Product List Viewed" properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductListViewed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    pub products: Vec<ImpressionRecord>,
}
