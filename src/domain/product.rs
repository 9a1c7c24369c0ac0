use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// An immutable catalog entry.
///
/// Products are created by a [`CatalogService`](super::ports::CatalogService) and
/// copied into cart lines and purchase records as snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identity; cart lines are keyed by it.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price, never negative.
    #[serde(deserialize_with = "non_negative_price")]
    pub price: Decimal,
    #[serde(rename = "imageURL", alias = "image_url")]
    pub image_url: String,
    pub category: String,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price: price.max(Decimal::ZERO),
            image_url: String::new(),
            category: category.into(),
        }
    }
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let price = <Decimal as Deserialize>::deserialize(deserializer)?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(serde::de::Error::custom(format!(
            "price cannot be negative, got {price}"
        )));
    }
    Ok(price)
}
