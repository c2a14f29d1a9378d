use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ProductError, ProductResult};

/// How a product is sold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductType {
    /// Priced per unit of weight
    Weight,
    /// Priced per item
    Piece,
}

impl ProductType {
    /// Parse a client-supplied type; anything but `weight`/`piece` is rejected.
    pub fn parse(value: &str) -> ProductResult<Self> {
        Self::from_str(value).map_err(|_| ProductError::InvalidType)
    }

    /// Parse a raw JSON `type`; non-string values are rejected like unknown names.
    pub fn from_json(value: &Value) -> ProductResult<Self> {
        value.as_str().ok_or(ProductError::InvalidType).and_then(Self::parse)
    }
}

/// JSON truthiness: `null`, `false`, `0`, NaN and `""` count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Product document as stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Assigned by MongoDB on insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub created_at: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

impl Product {
    pub fn new(name: String, price: f64, product_type: ProductType, now: bson::DateTime) -> Self {
        Self {
            id: None,
            name,
            price,
            product_type,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Product as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Hex form of the ObjectId
    #[serde(rename = "_id")]
    #[schema(example = "665f1c2e8b3e4a0012345678")]
    pub id: String,
    #[schema(example = "Apples")]
    pub name: String,
    #[schema(example = 2.5)]
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: product.name,
            price: product.price,
            product_type: product.product_type,
            created_at: to_utc(product.created_at),
            updated_at: product.updated_at.map(to_utc),
        }
    }
}

pub(crate) fn to_utc(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Price as sent by clients: a JSON number or a numeric-looking string
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Zero and the empty string count as "not provided"
    pub fn is_truthy(&self) -> bool {
        match self {
            PriceInput::Number(n) => *n != 0.0 && !n.is_nan(),
            PriceInput::Text(s) => !s.is_empty(),
        }
    }

    /// Lenient float conversion; unparseable text yields NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => parse_float_prefix(s),
        }
    }
}

/// Parse the longest leading decimal literal of `input`, skipping leading
/// whitespace. `"12.5kg"` is 12.5, `"abc"` is NaN.
pub fn parse_float_prefix(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Body of `POST /api/products`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateProduct {
    #[schema(example = "Apples")]
    pub name: Option<String>,
    #[schema(value_type = Option<f64>, example = 2.5)]
    pub price: Option<PriceInput>,
    /// Any JSON value is accepted here so a non-string type reaches validation
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>, example = "weight")]
    pub product_type: Option<Value>,
}

impl CreateProduct {
    /// Validate and build the document to insert.
    ///
    /// Presence is checked before the type, so `{"type": "box"}` without a
    /// name reports the missing fields.
    pub fn into_product(self, now: bson::DateTime) -> ProductResult<Product> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let price = self.price.filter(PriceInput::is_truthy);
        let product_type = self.product_type.filter(is_truthy);

        let (Some(name), Some(price), Some(product_type)) = (name, price, product_type) else {
            return Err(ProductError::MissingRequiredFields);
        };
        let product_type = ProductType::from_json(&product_type)?;

        Ok(Product::new(name.to_string(), price.to_f64(), product_type, now))
    }
}

/// Body of `PUT /api/products`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProduct {
    #[schema(example = "665f1c2e8b3e4a0012345678")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<PriceInput>,
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    pub product_type: Option<Value>,
}

impl UpdateProduct {
    /// Split into the target id and the fields that qualify for `$set`.
    ///
    /// A blank name is skipped, any non-null price is applied as-is, and an
    /// unknown type fails immediately.
    pub fn into_changes(self, now: bson::DateTime) -> ProductResult<(String, ProductChanges)> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(ProductError::MissingId)?;

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let price = self.price.as_ref().map(PriceInput::to_f64);
        let product_type = self
            .product_type
            .as_ref()
            .map(ProductType::from_json)
            .transpose()?;

        if name.is_none() && price.is_none() && product_type.is_none() {
            return Err(ProductError::NoFieldsToUpdate);
        }

        Ok((
            id,
            ProductChanges {
                name,
                price,
                product_type,
                updated_at: to_utc(now),
            },
        ))
    }
}

/// Fields applied by a partial update, echoed back to the client
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    pub updated_at: DateTime<Utc>,
}

impl ProductChanges {
    /// Body of the `$set` operator
    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};
        if let Some(name) = &self.name {
            set.insert("name", name);
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(product_type) = self.product_type {
            set.insert("type", product_type.to_string());
        }
        set.insert(
            "updatedAt",
            bson::DateTime::from_millis(self.updated_at.timestamp_millis()),
        );
        set
    }
}

/// Query string of `DELETE /api/products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Hex ObjectId of the product to delete
    pub id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateResponse {
    pub success: bool,
    #[schema(example = "665f1c2e8b3e4a0012345678")]
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    pub success: bool,
    pub updated: ProductChanges,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}
