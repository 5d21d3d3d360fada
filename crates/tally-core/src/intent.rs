//! # Order Intents
//!
//! An order intent is what a caller asks the engine to persist: the header
//! fields plus a list of `{sku, name, quantity, unit price}` lines.
//!
//! ## Boundary Parsing
//! ```text
//! JSON body ──► OrderIntentPayload (loose, every field optional)
//!                      │
//!                      │  TryFrom: trim, validate, drop zero-quantity lines
//!                      ▼
//!               OrderIntent (well formed, what the engine accepts)
//! ```
//!
//! The payload accepts the spellings older clients send: `gstRate` for
//! `taxRate`, `product_name` for `productName`, `unitPrice` for `price`, and
//! decimals as JSON numbers or strings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, TaxRate};
use crate::pricing::{self, PriceBreakdown};
use crate::reconcile;
use crate::validation::{
    normalize_optional_text, parse_date, validate_amount, validate_email,
    validate_mobile_number, validate_name, validate_quantity, validate_required_text,
    validate_sku,
};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Loose Payload
// =============================================================================

/// Order payload exactly as received; nothing is trusted yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntentPayload {
    pub customer_name: Option<String>,
    pub mobile_number: Option<String>,
    pub email_address: Option<String>,
    pub order_date: Option<String>,
    pub planned_delivery_date: Option<String>,
    pub payment_method: Option<String>,
    pub advance_received: Option<Money>,
    pub personalization_required: Option<bool>,
    pub personalization_details: Option<String>,
    #[serde(alias = "gstRate")]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<LineItemPayload>,
}

/// One line of an [`OrderIntentPayload`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    pub sku: Option<String>,
    #[serde(alias = "product_name")]
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    #[serde(alias = "unitPrice")]
    pub price: Option<Money>,
}

// =============================================================================
// Validated Intent
// =============================================================================

/// A validated line. `quantity` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// A validated order intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntent {
    pub customer_name: String,
    pub mobile_number: String,
    pub email_address: Option<String>,
    pub order_date: NaiveDate,
    pub planned_delivery_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub advance_received: Money,
    pub personalization_required: bool,
    pub personalization_details: String,
    pub items: Vec<LineItem>,
    /// `None` means "use the fallback": the configured default on create,
    /// the order's stored rate on update.
    pub tax_rate: Option<TaxRate>,
}

impl OrderIntent {
    /// Parses and validates a JSON body.
    ///
    /// ```rust
    /// use tally_core::intent::OrderIntent;
    ///
    /// let intent = OrderIntent::from_json(r#"{
    ///     "customerName": "Asha",
    ///     "mobileNumber": "9876543210",
    ///     "orderDate": "2025-09-05",
    ///     "gstRate": 0.18,
    ///     "items": [{"sku": "SKU1", "product_name": "Bell", "quantity": 2, "price": "150"}]
    /// }"#).unwrap();
    ///
    /// assert_eq!(intent.items[0].quantity, 2);
    /// assert_eq!(intent.tax_rate.unwrap().to_string(), "18.00%");
    /// ```
    pub fn from_json(body: &str) -> CoreResult<Self> {
        let payload: OrderIntentPayload = serde_json::from_str(body)
            .map_err(|e| ValidationError::invalid_format("payload", e.to_string()))?;
        OrderIntent::try_from(payload)
    }

    /// Requested quantity per sku, summed across lines.
    pub fn quantities_by_sku(&self) -> BTreeMap<String, i64> {
        reconcile::aggregate_by_sku(self.items.iter().map(|i| (i.sku.as_str(), i.quantity)))
    }

    /// `(unit_price, quantity)` pairs for the pricing calculator.
    pub fn priced_lines(&self) -> impl Iterator<Item = (Money, i64)> + '_ {
        self.items.iter().map(|i| (i.unit_price, i.quantity))
    }

    /// The intent's own rate, or `fallback` when it carries none.
    pub fn effective_tax_rate(&self, fallback: TaxRate) -> TaxRate {
        self.tax_rate.unwrap_or(fallback)
    }

    /// Prices the lines under the effective rate.
    pub fn price(&self, fallback: TaxRate) -> PriceBreakdown {
        pricing::price_lines(self.priced_lines(), self.effective_tax_rate(fallback))
    }

    /// New orders need at least one line.
    pub fn ensure_not_empty(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        Ok(())
    }
}

impl TryFrom<OrderIntentPayload> for OrderIntent {
    type Error = CoreError;

    fn try_from(payload: OrderIntentPayload) -> Result<Self, Self::Error> {
        let customer_name = validate_required_text(
            "customerName",
            payload.customer_name.as_deref().unwrap_or_default(),
            200,
        )?;
        let mobile_number =
            validate_mobile_number(payload.mobile_number.as_deref().unwrap_or_default())?;
        let email_address = validate_email(payload.email_address.as_deref())?;

        let order_date = parse_date("orderDate", payload.order_date.as_deref().unwrap_or_default())?;
        let planned_delivery_date = match payload
            .planned_delivery_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            Some(raw) => Some(parse_date("plannedDeliveryDate", raw)?),
            None => None,
        };

        let payment_method =
            normalize_optional_text("paymentMethod", payload.payment_method.as_deref(), 50)?;

        let advance_received = payload.advance_received.unwrap_or_default();
        validate_amount("advanceReceived", advance_received)?;

        let tax_rate = payload.tax_rate.map(TaxRate::new).transpose()?;

        if payload.items.len() > MAX_ORDER_LINES {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: "0".to_string(),
                max: MAX_ORDER_LINES.to_string(),
            }
            .into());
        }

        let mut items = Vec::with_capacity(payload.items.len());
        for (idx, line) in payload.items.into_iter().enumerate() {
            if let Some(item) = validate_line(idx, line)? {
                items.push(item);
            }
        }

        Ok(OrderIntent {
            customer_name,
            mobile_number,
            email_address,
            order_date,
            planned_delivery_date,
            payment_method,
            advance_received,
            personalization_required: payload.personalization_required.unwrap_or(false),
            personalization_details: payload
                .personalization_details
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            items,
            tax_rate,
        })
    }
}

/// Validates one payload line. Zero-quantity lines yield `None`.
fn validate_line(idx: usize, line: LineItemPayload) -> CoreResult<Option<LineItem>> {
    let field = |name: &str| format!("items[{idx}].{name}");

    let quantity = line
        .quantity
        .ok_or_else(|| ValidationError::required(field("quantity")))?;
    validate_quantity(&field("quantity"), quantity)?;
    if quantity == 0 {
        return Ok(None);
    }

    let sku = line.sku.unwrap_or_default().trim().to_string();
    validate_sku(&sku).map_err(|e| relabel(e, field("sku")))?;

    let product_name = validate_name(
        &field("productName"),
        line.product_name.as_deref().unwrap_or_default(),
    )?;

    let unit_price = line
        .price
        .ok_or_else(|| ValidationError::required(field("price")))?;
    validate_amount(&field("price"), unit_price)?;

    Ok(Some(LineItem {
        sku,
        product_name,
        quantity,
        unit_price,
    }))
}

/// Points a field-level error at the line it came from.
fn relabel(err: ValidationError, field: String) -> ValidationError {
    match err {
        ValidationError::Required { .. } => ValidationError::Required { field },
        ValidationError::TooLong { max, .. } => ValidationError::TooLong { field, max },
        ValidationError::OutOfRange { min, max, .. } => {
            ValidationError::OutOfRange { field, min, max }
        }
        ValidationError::Negative { .. } => ValidationError::Negative { field },
        ValidationError::InvalidFormat { reason, .. } => {
            ValidationError::InvalidFormat { field, reason }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
