//! Order business logic - Creates, edits, clones and queries customer orders.
//!
//! Every mutating function runs inside one database transaction: the products it touches
//! are loaded into a [`StockLedger`], the whole operation is validated against it, and only
//! then are order rows and stock written. Returning early with an error drops the
//! transaction, which rolls everything back.

use crate::{
    core::stock::{self, StockLedger},
    entities::{Order, OrderLine, OrderStatus, Product, order, order_line, product},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// One requested product line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    /// Catalog name of the product
    pub product_name: String,
    /// Quantity to reserve
    pub quantity: Decimal,
}

impl NewLine {
    /// Creates a line request.
    #[must_use]
    pub fn new(product_name: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
        }
    }
}

/// A new order as entered by the operator.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Customer name
    pub customer_name: String,
    /// Order date
    pub date: NaiveDate,
    /// Initial status
    pub status: OrderStatus,
    /// Requested lines; zero quantities are dropped
    pub lines: Vec<NewLine>,
}

/// An order header with its lines in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// The order header
    pub order: order::Model,
    /// Lines ordered by id
    pub lines: Vec<order_line::Model>,
}

impl OrderDetails {
    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.line_total).sum()
    }
}

/// Result of editing, adding or removing a single line.
#[derive(Debug, Clone)]
pub struct LineChange {
    /// The line after the change (or the removed line)
    pub line: order_line::Model,
    /// Available quantity of the product afterwards, if the product is in the catalog
    pub available_after: Option<Decimal>,
    /// Set when the stock adjustment had to be skipped
    pub warning: Option<String>,
}

/// Result of replacing all lines of an order.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    /// The order as saved
    pub details: OrderDetails,
    /// Stock adjustments that had to be skipped
    pub warnings: Vec<String>,
}

/// Why a line was left out of a cloned order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The product does not have enough stock left
    InsufficientStock,
    /// The product is no longer in the catalog
    ProductNotFound,
}

/// A source line that could not be copied into a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Product of the skipped line
    pub product_name: String,
    /// Quantity the source line asked for
    pub requested: Decimal,
    /// Available quantity at the time of the clone, if the product exists
    pub available: Option<Decimal>,
    /// Why the line was skipped
    pub reason: SkipReason,
}

/// Result of cloning an order.
#[derive(Debug, Clone)]
pub struct CloneOutcome {
    /// The order that was copied
    pub source_order_id: i64,
    /// The new order; `None` when every line was skipped
    pub order: Option<OrderDetails>,
    /// Lines that were not copied
    pub skipped: Vec<SkippedLine>,
}

fn missing_product_warning(name: &str) -> String {
    format!("Product '{name}' is not in the catalog; its stock was not adjusted")
}

/// Trims names, rejects negative quantities and drops zero-quantity lines.
fn prepare_lines(lines: Vec<NewLine>) -> Result<Vec<NewLine>> {
    let mut prepared = Vec::with_capacity(lines.len());
    for line in lines {
        let product_name = line.product_name.trim().to_string();
        if product_name.is_empty() {
            return Err(Error::Validation {
                message: "Product name cannot be empty".to_string(),
            });
        }
        let quantity = stock::validate_quantity(line.quantity)?;
        if quantity.is_zero() {
            continue;
        }
        prepared.push(NewLine {
            product_name,
            quantity,
        });
    }
    Ok(prepared)
}

/// Loads a ledger and the current unit cost for each named product.
async fn load_catalog<C, I>(db: &C, names: I) -> Result<(StockLedger, HashMap<String, Decimal>)>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names.dedup();

    let products = Product::find()
        .filter(product::Column::Name.is_in(names))
        .all(db)
        .await?;

    let prices = products
        .iter()
        .map(|p| (p.name.clone(), p.unit_cost))
        .collect();
    Ok((StockLedger::from_products(&products), prices))
}

fn price_of(prices: &HashMap<String, Decimal>, name: &str) -> Result<Decimal> {
    prices.get(name).copied().ok_or_else(|| Error::ProductNotFound {
        name: name.to_string(),
    })
}

/// The id the next created order will receive: highest existing id + 1, or 1.
pub async fn next_order_id<C>(db: &C) -> Result<i64>
where
    C: ConnectionTrait,
{
    let last = Order::find()
        .order_by_desc(order::Column::Id)
        .one(db)
        .await?;
    Ok(last.map_or(1, |o| o.id + 1))
}

async fn find_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

async fn find_line<C>(db: &C, line_id: i64) -> Result<order_line::Model>
where
    C: ConnectionTrait,
{
    OrderLine::find_by_id(line_id)
        .one(db)
        .await?
        .ok_or(Error::LineNotFound { line_id })
}

async fn lines_for_order<C>(db: &C, order_id: i64) -> Result<Vec<order_line::Model>>
where
    C: ConnectionTrait,
{
    OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn insert_line<C>(
    db: &C,
    order_id: i64,
    product_name: &str,
    quantity: Decimal,
    unit_cost: Decimal,
) -> Result<order_line::Model>
where
    C: ConnectionTrait,
{
    order_line::ActiveModel {
        order_id: Set(order_id),
        product_name: Set(product_name.to_string()),
        quantity: Set(quantity),
        unit_cost: Set(unit_cost),
        line_total: Set(stock::line_total(quantity, unit_cost)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn insert_order<C>(
    db: &C,
    customer_name: String,
    date: NaiveDate,
    status: OrderStatus,
) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();
    order::ActiveModel {
        id: Set(next_order_id(db).await?),
        customer_name: Set(customer_name),
        date: Set(date),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn touch_order<C>(db: &C, order: order::Model) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let mut active: order::ActiveModel = order.into();
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Creates an order and reserves stock for every line.
///
/// Zero-quantity lines are dropped. If any product is unknown or short on stock, nothing
/// is saved.
///
/// # Errors
/// - [`Error::Validation`] for a blank customer or product name, or no remaining lines
/// - [`Error::InvalidQuantity`] for a negative quantity
/// - [`Error::ProductNotFound`] / [`Error::InsufficientStock`] from the stock ledger
#[instrument(skip(db, new_order), fields(customer = %new_order.customer_name))]
pub async fn create_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<OrderDetails> {
    let customer_name = new_order.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(Error::Validation {
            message: "Customer name cannot be empty".to_string(),
        });
    }

    let lines = prepare_lines(new_order.lines)?;
    if lines.is_empty() {
        return Err(Error::Validation {
            message: "An order needs at least one product with a quantity above zero".to_string(),
        });
    }

    let txn = db.begin().await?;

    let (mut ledger, prices) =
        load_catalog(&txn, lines.iter().map(|l| l.product_name.clone())).await?;
    for line in &lines {
        ledger.reserve(&line.product_name, line.quantity)?;
    }

    let order = insert_order(&txn, customer_name, new_order.date, new_order.status).await?;

    let mut saved = Vec::with_capacity(lines.len());
    for line in &lines {
        let unit_cost = price_of(&prices, &line.product_name)?;
        saved.push(insert_line(&txn, order.id, &line.product_name, line.quantity, unit_cost).await?);
    }

    stock::apply_ledger(&txn, &ledger).await?;
    txn.commit().await?;

    info!(order_id = order.id, lines = saved.len(), "Order created");
    Ok(OrderDetails {
        order,
        lines: saved,
    })
}

/// Loads an order with its lines.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<OrderDetails>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let lines = lines_for_order(db, order_id).await?;
    Ok(Some(OrderDetails { order, lines }))
}

/// Lists orders newest first, optionally only those whose customer name contains
/// `customer_filter` (case-insensitive).
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn list_orders(
    db: &DatabaseConnection,
    customer_filter: Option<&str>,
) -> Result<Vec<OrderDetails>> {
    let filter = customer_filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let rows = Order::find()
        .find_with_related(OrderLine)
        .all(db)
        .await?;

    let mut orders: Vec<OrderDetails> = rows
        .into_iter()
        .filter(|(order, _)| {
            filter
                .as_ref()
                .is_none_or(|f| order.customer_name.to_lowercase().contains(f))
        })
        .map(|(order, mut lines)| {
            lines.sort_by_key(|line| line.id);
            OrderDetails { order, lines }
        })
        .collect();
    // consolidated rows do not keep the query order
    orders.sort_by(|a, b| b.order.id.cmp(&a.order.id));
    Ok(orders)
}

/// Adds a product line to an existing order, reserving its stock.
///
/// # Errors
/// - [`Error::InvalidQuantity`] unless the quantity is above zero
/// - [`Error::OrderNotFound`] if the order does not exist
/// - [`Error::ProductNotFound`] / [`Error::InsufficientStock`] from the stock ledger
#[instrument(skip(db, line), fields(product = %line.product_name))]
pub async fn add_line(db: &DatabaseConnection, order_id: i64, line: NewLine) -> Result<LineChange> {
    let quantity = stock::validate_positive_quantity(line.quantity)?;
    let product_name = line.product_name.trim().to_string();

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    let (mut ledger, prices) = load_catalog(&txn, [product_name.clone()]).await?;
    let available_after = ledger.reserve(&product_name, quantity)?;
    let unit_cost = price_of(&prices, &product_name)?;

    let saved = insert_line(&txn, order_id, &product_name, quantity, unit_cost).await?;
    stock::apply_ledger(&txn, &ledger).await?;
    touch_order(&txn, order).await?;
    txn.commit().await?;

    info!(order_id, line_id = saved.id, %quantity, "Line added to order");
    Ok(LineChange {
        line: saved,
        available_after: Some(available_after),
        warning: None,
    })
}

/// Changes the quantity of one order line and moves the difference in or out of stock.
///
/// If the product is no longer in the catalog the line is still updated, but stock is
/// not touched and a warning is returned.
///
/// # Errors
/// - [`Error::InvalidQuantity`] unless the new quantity is above zero
/// - [`Error::LineNotFound`] if the line does not exist
/// - [`Error::InsufficientStock`] if the increase is not available; nothing changes
#[instrument(skip(db))]
pub async fn edit_line_quantity(
    db: &DatabaseConnection,
    line_id: i64,
    new_quantity: Decimal,
) -> Result<LineChange> {
    let new_quantity = stock::validate_positive_quantity(new_quantity)?;

    let txn = db.begin().await?;
    let line = find_line(&txn, line_id).await?;
    let mut ledger = stock::load_ledger(&txn, [line.product_name.clone()]).await?;

    let (available_after, warning) = if ledger.contains(&line.product_name) {
        let available = ledger.adjust(&line.product_name, line.quantity, new_quantity)?;
        (Some(available), None)
    } else {
        warn!(line_id, product = %line.product_name, "Product missing from catalog, stock not adjusted");
        (None, Some(missing_product_warning(&line.product_name)))
    };

    let order_id = line.order_id;
    let unit_cost = line.unit_cost;
    let old_quantity = line.quantity;
    let mut active: order_line::ActiveModel = line.into();
    active.quantity = Set(new_quantity);
    active.line_total = Set(stock::line_total(new_quantity, unit_cost));
    let updated = active.update(&txn).await?;

    stock::apply_ledger(&txn, &ledger).await?;
    let order = find_order(&txn, order_id).await?;
    touch_order(&txn, order).await?;
    txn.commit().await?;

    info!(line_id, %old_quantity, %new_quantity, "Order line quantity changed");
    Ok(LineChange {
        line: updated,
        available_after,
        warning,
    })
}

/// Removes one order line and returns its full quantity to stock.
///
/// # Errors
/// - [`Error::LineNotFound`] if the line does not exist
#[instrument(skip(db))]
pub async fn delete_line(db: &DatabaseConnection, line_id: i64) -> Result<LineChange> {
    let txn = db.begin().await?;
    let line = find_line(&txn, line_id).await?;
    let mut ledger = stock::load_ledger(&txn, [line.product_name.clone()]).await?;

    let (available_after, warning) = if ledger.contains(&line.product_name) {
        (Some(ledger.release(&line.product_name, line.quantity)?), None)
    } else {
        warn!(line_id, product = %line.product_name, "Product missing from catalog, stock not restored");
        (None, Some(missing_product_warning(&line.product_name)))
    };

    OrderLine::delete_by_id(line.id).exec(&txn).await?;
    stock::apply_ledger(&txn, &ledger).await?;
    let order = find_order(&txn, line.order_id).await?;
    touch_order(&txn, order).await?;
    txn.commit().await?;

    info!(line_id, order_id = line.order_id, "Order line removed");
    Ok(LineChange {
        line,
        available_after,
        warning,
    })
}

/// Replaces every line of an order with `lines`, adjusting stock by the net change per
/// product.
///
/// Products already on the order keep their price snapshot; new products take the current
/// catalog price. Zero-quantity lines are dropped, so an empty list empties the order.
///
/// # Errors
/// - [`Error::OrderNotFound`] if the order does not exist
/// - [`Error::InvalidQuantity`] / [`Error::Validation`] for malformed lines
/// - [`Error::ProductNotFound`] / [`Error::InsufficientStock`] from the stock ledger
#[instrument(skip(db, lines))]
pub async fn replace_lines(
    db: &DatabaseConnection,
    order_id: i64,
    lines: Vec<NewLine>,
) -> Result<OrderUpdate> {
    let lines = prepare_lines(lines)?;

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    let existing = lines_for_order(&txn, order_id).await?;

    let names = existing
        .iter()
        .map(|l| l.product_name.clone())
        .chain(lines.iter().map(|l| l.product_name.clone()));
    let (mut ledger, prices) = load_catalog(&txn, names).await?;

    let before: Vec<(String, Decimal)> = existing
        .iter()
        .map(|l| (l.product_name.clone(), l.quantity))
        .collect();
    let after: Vec<(String, Decimal)> = lines
        .iter()
        .map(|l| (l.product_name.clone(), l.quantity))
        .collect();

    let warnings: Vec<String> = ledger
        .replace(&before, &after)?
        .iter()
        .map(|name| missing_product_warning(name))
        .collect();
    for warning in &warnings {
        warn!(order_id, "{warning}");
    }

    let mut snapshots: HashMap<String, Decimal> = HashMap::new();
    for line in &existing {
        snapshots
            .entry(line.product_name.clone())
            .or_insert(line.unit_cost);
    }

    OrderLine::delete_many()
        .filter(order_line::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;

    let mut saved = Vec::with_capacity(lines.len());
    for line in &lines {
        let unit_cost = match snapshots.get(&line.product_name) {
            Some(cost) => *cost,
            None => price_of(&prices, &line.product_name)?,
        };
        saved.push(insert_line(&txn, order_id, &line.product_name, line.quantity, unit_cost).await?);
    }

    stock::apply_ledger(&txn, &ledger).await?;
    let order = touch_order(&txn, order).await?;
    txn.commit().await?;

    info!(order_id, lines = saved.len(), "Order lines replaced");
    Ok(OrderUpdate {
        details: OrderDetails {
            order,
            lines: saved,
        },
        warnings,
    })
}

/// Sets the status of an order. Status lives on the order header, so every line follows.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist.
#[instrument(skip(db))]
pub async fn set_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<order::Model> {
    let order = find_order(db, order_id).await?;
    let mut active: order::ActiveModel = order.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(db).await?;

    info!(order_id, %status, "Order status updated");
    Ok(updated)
}

/// Copies an order into a new Quote dated `today`, at current catalog prices.
///
/// Lines whose product is missing or short on stock are skipped and reported instead of
/// failing the clone. When every line is skipped no order is created.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the source order does not exist, or a database
/// error.
#[instrument(skip(db))]
pub async fn clone_order(
    db: &DatabaseConnection,
    source_order_id: i64,
    today: NaiveDate,
) -> Result<CloneOutcome> {
    let txn = db.begin().await?;
    let source = find_order(&txn, source_order_id).await?;
    let source_lines = lines_for_order(&txn, source_order_id).await?;

    let (mut ledger, prices) =
        load_catalog(&txn, source_lines.iter().map(|l| l.product_name.clone())).await?;

    let mut accepted = Vec::new();
    let mut skipped = Vec::new();
    for line in &source_lines {
        match ledger.reserve(&line.product_name, line.quantity) {
            Ok(_) => accepted.push(line),
            Err(Error::InsufficientStock { available, .. }) => skipped.push(SkippedLine {
                product_name: line.product_name.clone(),
                requested: line.quantity,
                available: Some(available),
                reason: SkipReason::InsufficientStock,
            }),
            Err(Error::ProductNotFound { .. }) => skipped.push(SkippedLine {
                product_name: line.product_name.clone(),
                requested: line.quantity,
                available: None,
                reason: SkipReason::ProductNotFound,
            }),
            Err(e) => return Err(e),
        }
    }

    for skip in &skipped {
        warn!(source_order_id, product = %skip.product_name, reason = ?skip.reason, "Line skipped while cloning");
    }

    if accepted.is_empty() {
        return Ok(CloneOutcome {
            source_order_id,
            order: None,
            skipped,
        });
    }

    let order = insert_order(&txn, source.customer_name, today, OrderStatus::Quote).await?;
    let mut saved = Vec::with_capacity(accepted.len());
    for line in accepted {
        let unit_cost = price_of(&prices, &line.product_name)?;
        saved.push(insert_line(&txn, order.id, &line.product_name, line.quantity, unit_cost).await?);
    }

    stock::apply_ledger(&txn, &ledger).await?;
    txn.commit().await?;

    info!(source_order_id, order_id = order.id, skipped = skipped.len(), "Order cloned");
    Ok(CloneOutcome {
        source_order_id,
        order: Some(OrderDetails {
            order,
            lines: saved,
        }),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_order_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let blank_customer = NewOrder {
            customer_name: "  ".to_string(),
            date: test_date(),
            status: OrderStatus::Quote,
            lines: vec![NewLine::new("Aventus", dec!(1))],
        };
        assert!(matches!(
            create_order(&db, blank_customer).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let negative = NewOrder {
            customer_name: "Ana".to_string(),
            date: test_date(),
            status: OrderStatus::Quote,
            lines: vec![NewLine::new("Aventus", dec!(-3))],
        };
        assert!(matches!(
            create_order(&db, negative).await.unwrap_err(),
            Error::InvalidQuantity { .. }
        ));

        let only_zero = NewOrder {
            customer_name: "Ana".to_string(),
            date: test_date(),
            status: OrderStatus::Quote,
            lines: vec![NewLine::new("Aventus", Decimal::ZERO)],
        };
        assert!(matches!(
            create_order(&db, only_zero).await.unwrap_err(),
            Error::Validation { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_reserves_stock() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Aventus", dec!(12.5), dec!(100)).await?;

        let details = create_test_order(&db, &[("Aventus", dec!(30))]).await?;

        assert_eq!(details.order.id, 1);
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.lines.len(), 1);
        assert_eq!(details.lines[0].unit_cost, dec!(12.5));
        assert_eq!(details.lines[0].line_total, dec!(375));
        assert_eq!(details.total(), dec!(375));
        assert_eq!(available(&db, "Aventus").await?, dec!(70));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_ids_increase() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(100)).await?;

        let first = create_test_order(&db, &[("Aventus", dec!(1))]).await?;
        let second = create_test_order(&db, &[("Aventus", dec!(1))]).await?;
        assert_eq!(second.order.id, first.order.id + 1);
        assert_eq!(next_order_id(&db).await?, second.order.id + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_drops_zero_lines_and_keeps_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(100)).await?;
        create_test_product(&db, "Baccarat", dec!(50)).await?;

        let details = create_test_order(
            &db,
            &[
                ("Aventus", dec!(10)),
                ("Baccarat", Decimal::ZERO),
                ("Aventus", dec!(5)),
            ],
        )
        .await?;

        assert_eq!(details.lines.len(), 2);
        assert!(details.lines.iter().all(|l| l.product_name == "Aventus"));
        assert_eq!(available(&db, "Aventus").await?, dec!(85));
        assert_eq!(available(&db, "Baccarat").await?, dec!(50));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_is_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(100)).await?;
        create_test_product(&db, "Baccarat", dec!(5)).await?;

        let short = create_test_order(&db, &[("Aventus", dec!(10)), ("Baccarat", dec!(6))]).await;
        assert!(matches!(
            short.unwrap_err(),
            Error::InsufficientStock { product, .. } if product == "Baccarat"
        ));

        let unknown = create_test_order(&db, &[("Aventus", dec!(10)), ("Ghost", dec!(1))]).await;
        assert!(matches!(
            unknown.unwrap_err(),
            Error::ProductNotFound { name } if name == "Ghost"
        ));

        assert_eq!(available(&db, "Aventus").await?, dec!(100));
        assert!(list_orders(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_example_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Aventus", dec!(2.5), dec!(100)).await?;

        // 1. Create with 30
        let details = create_test_order(&db, &[("Aventus", dec!(30))]).await?;
        let line_id = details.lines[0].id;
        assert_eq!(available(&db, "Aventus").await?, dec!(70));

        // 2. 30 -> 50
        let change = edit_line_quantity(&db, line_id, dec!(50)).await?;
        assert_eq!(change.available_after, Some(dec!(50)));
        assert_eq!(change.line.quantity, dec!(50));
        assert_eq!(change.line.line_total, dec!(125));
        assert_eq!(available(&db, "Aventus").await?, dec!(50));

        // 3. 50 -> 200 is rejected
        let rejected = edit_line_quantity(&db, line_id, dec!(200)).await;
        assert!(matches!(
            rejected.unwrap_err(),
            Error::InsufficientStock { requested, .. } if requested == dec!(150)
        ));
        assert_eq!(available(&db, "Aventus").await?, dec!(50));
        let unchanged = get_order(&db, details.order.id).await?.unwrap();
        assert_eq!(unchanged.lines[0].quantity, dec!(50));

        // 4. Delete the line
        let removed = delete_line(&db, line_id).await?;
        assert_eq!(removed.available_after, Some(dec!(100)));
        assert_eq!(available(&db, "Aventus").await?, dec!(100));
        assert!(get_order(&db, details.order.id).await?.unwrap().lines.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_line_rejects_non_positive() -> Result<()> {
        let db = setup_test_db().await?;
        let result = edit_line_quantity(&db, 1, Decimal::ZERO).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidQuantity { .. }));

        let result = edit_line_quantity(&db, 999, dec!(1)).await;
        assert!(matches!(result.unwrap_err(), Error::LineNotFound { line_id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_delete_with_product_gone() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Discontinued", dec!(10)).await?;
        let details = create_test_order(&db, &[("Discontinued", dec!(4))]).await?;
        let line_id = details.lines[0].id;

        Product::delete_by_id(product.id).exec(&db).await?;

        let change = edit_line_quantity(&db, line_id, dec!(8)).await?;
        assert!(change.warning.is_some());
        assert_eq!(change.available_after, None);
        assert_eq!(change.line.quantity, dec!(8));
        assert_eq!(change.line.line_total, dec!(80));

        let removed = delete_line(&db, line_id).await?;
        assert!(removed.warning.is_some());
        assert!(get_order(&db, details.order.id).await?.unwrap().lines.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_line_to_existing_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(100)).await?;
        create_custom_product(&db, "Baccarat", dec!(20), dec!(10)).await?;
        let details = create_test_order(&db, &[("Aventus", dec!(10))]).await?;

        let change = add_line(&db, details.order.id, NewLine::new("Baccarat", dec!(2.5))).await?;
        assert_eq!(change.available_after, Some(dec!(7.5)));
        assert_eq!(change.line.line_total, dec!(50));

        let short = add_line(&db, details.order.id, NewLine::new("Baccarat", dec!(8))).await;
        assert!(matches!(short.unwrap_err(), Error::InsufficientStock { .. }));

        let missing = add_line(&db, 42, NewLine::new("Baccarat", dec!(1))).await;
        assert!(matches!(missing.unwrap_err(), Error::OrderNotFound { order_id: 42 }));

        let reloaded = get_order(&db, details.order.id).await?.unwrap();
        assert_eq!(reloaded.lines.len(), 2);
        assert_eq!(reloaded.total(), dec!(150));
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_lines_nets_stock() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Aventus", dec!(10), dec!(40)).await?;
        create_custom_product(&db, "Baccarat", dec!(20), dec!(10)).await?;
        let details = create_test_order(&db, &[("Aventus", dec!(30))]).await?;
        assert_eq!(available(&db, "Aventus").await?, dec!(10));

        // Price change must not affect the Aventus snapshot
        crate::core::product::update_unit_cost(&db, "Aventus", dec!(99)).await?;

        let update = replace_lines(
            &db,
            details.order.id,
            vec![NewLine::new("Aventus", dec!(35)), NewLine::new("Baccarat", dec!(4))],
        )
        .await?;

        assert!(update.warnings.is_empty());
        assert_eq!(update.details.lines.len(), 2);
        assert_eq!(update.details.lines[0].unit_cost, dec!(10));
        assert_eq!(update.details.lines[1].unit_cost, dec!(20));
        assert_eq!(update.details.total(), dec!(430));
        assert_eq!(available(&db, "Aventus").await?, dec!(5));
        assert_eq!(available(&db, "Baccarat").await?, dec!(6));

        // Needs 40 more Aventus, only 5 left: nothing changes
        let rejected = replace_lines(&db, details.order.id, vec![NewLine::new("Aventus", dec!(75))]).await;
        assert!(matches!(rejected.unwrap_err(), Error::InsufficientStock { .. }));
        assert_eq!(available(&db, "Aventus").await?, dec!(5));
        assert_eq!(available(&db, "Baccarat").await?, dec!(6));
        assert_eq!(get_order(&db, details.order.id).await?.unwrap().lines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_status_applies_to_whole_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(100)).await?;
        create_test_product(&db, "Baccarat", dec!(100)).await?;
        let details = create_test_order(&db, &[("Aventus", dec!(1)), ("Baccarat", dec!(1))]).await?;

        let updated = set_status(&db, details.order.id, OrderStatus::Delivered).await?;
        assert_eq!(updated.status, OrderStatus::Delivered);

        let reloaded = get_order(&db, details.order.id).await?.unwrap();
        assert_eq!(reloaded.order.status, OrderStatus::Delivered);

        let missing = set_status(&db, 99, OrderStatus::Paid).await;
        assert!(matches!(missing.unwrap_err(), Error::OrderNotFound { order_id: 99 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_clone_skips_short_lines() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "A", dec!(100)).await?;
        create_test_product(&db, "B", dec!(50)).await?;
        let source = create_test_order(&db, &[("A", dec!(10)), ("B", dec!(30))]).await?;
        crate::core::product::update_unit_cost(&db, "A", dec!(12)).await?;
        assert_eq!(available(&db, "B").await?, dec!(20));

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let outcome = clone_order(&db, source.order.id, today).await?;

        let cloned = outcome.order.unwrap();
        assert_ne!(cloned.order.id, source.order.id);
        assert_eq!(cloned.order.status, OrderStatus::Quote);
        assert_eq!(cloned.order.date, today);
        assert_eq!(cloned.order.customer_name, source.order.customer_name);
        assert_eq!(cloned.lines.len(), 1);
        assert_eq!(cloned.lines[0].product_name, "A");
        assert_eq!(cloned.lines[0].unit_cost, dec!(12));

        assert_eq!(
            outcome.skipped,
            vec![SkippedLine {
                product_name: "B".to_string(),
                requested: dec!(30),
                available: Some(dec!(20)),
                reason: SkipReason::InsufficientStock,
            }]
        );
        assert_eq!(available(&db, "A").await?, dec!(80));
        assert_eq!(available(&db, "B").await?, dec!(20));
        Ok(())
    }

    #[tokio::test]
    async fn test_clone_skips_deleted_products() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "A", dec!(100)).await?;
        let gone = create_test_product(&db, "Gone", dec!(20)).await?;
        let source = create_test_order(&db, &[("A", dec!(10)), ("Gone", dec!(5))]).await?;
        Product::delete_by_id(gone.id).exec(&db).await?;

        let outcome = clone_order(&db, source.order.id, test_date()).await?;

        let cloned = outcome.order.unwrap();
        let names: Vec<_> = cloned.lines.iter().map(|l| l.product_name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
        assert_eq!(
            outcome.skipped,
            vec![SkippedLine {
                product_name: "Gone".to_string(),
                requested: dec!(5),
                available: None,
                reason: SkipReason::ProductNotFound,
            }]
        );

        assert_eq!(available(&db, "A").await?, dec!(80));
        let products = Product::find().all(&db).await?;
        assert_eq!(products.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_clone_with_nothing_available_creates_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "A", dec!(10)).await?;
        let source = create_test_order(&db, &[("A", dec!(10))]).await?;

        let outcome = clone_order(&db, source.order.id, test_date()).await?;
        assert!(outcome.order.is_none());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(list_orders(&db, None).await?.len(), 1);

        let missing = clone_order(&db, 77, test_date()).await;
        assert!(matches!(missing.unwrap_err(), Error::OrderNotFound { order_id: 77 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_customer() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "A", dec!(100)).await?;

        for customer in ["Ana López", "Bruno", "anabel"] {
            create_order(
                &db,
                NewOrder {
                    customer_name: customer.to_string(),
                    date: test_date(),
                    status: OrderStatus::Quote,
                    lines: vec![NewLine::new("A", dec!(1))],
                },
            )
            .await?;
        }

        let all = list_orders(&db, None).await?;
        let ids: Vec<i64> = all.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let ana = list_orders(&db, Some("ANA")).await?;
        let names: Vec<_> = ana.iter().map(|o| o.order.customer_name.as_str()).collect();
        assert_eq!(names, vec!["anabel", "Ana López"]);
        assert!(ana.iter().all(|o| o.lines.len() == 1));
        Ok(())
    }
}
