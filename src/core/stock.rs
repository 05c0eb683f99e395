//! Stock ledger - keeps each product's available quantity in step with the order lines
//! that reserve it.
//!
//! The [`StockLedger`] is an in-memory view of the products touched by one operation. All
//! validation happens against the ledger first; only when every check passes is the ledger
//! written back with [`apply_ledger`], inside the same database transaction that mutates the
//! order lines. A rejected operation therefore leaves stock untouched.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, prelude::*, sea_query::Expr};
use std::{collections::BTreeMap, str::FromStr};

/// Parses an operator-entered quantity such as `"30"` or `"2.5"`.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] if the text is not a number or is negative.
pub fn parse_quantity(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let quantity = Decimal::from_str(trimmed).map_err(|_| Error::InvalidQuantity {
        value: trimmed.to_string(),
    })?;
    validate_quantity(quantity)
}

/// Rejects negative quantities. Zero is allowed here; callers decide what zero means.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for negative values.
pub fn validate_quantity(quantity: Decimal) -> Result<Decimal> {
    if quantity < Decimal::ZERO {
        return Err(Error::InvalidQuantity {
            value: quantity.to_string(),
        });
    }
    Ok(quantity)
}

/// Requires a strictly positive quantity.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for zero or negative values.
pub fn validate_positive_quantity(quantity: Decimal) -> Result<Decimal> {
    if quantity <= Decimal::ZERO {
        return Err(Error::InvalidQuantity {
            value: quantity.to_string(),
        });
    }
    Ok(quantity)
}

/// Total for one line: `quantity * unit_cost`, exact.
#[must_use]
pub fn line_total(quantity: Decimal, unit_cost: Decimal) -> Decimal {
    (quantity * unit_cost).normalize()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    available: Decimal,
    dirty: bool,
}

/// Available quantities for a set of products, keyed by product name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    entries: BTreeMap<String, Entry>,
}

impl StockLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from catalog rows.
    #[must_use]
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a product::Model>) -> Self {
        let mut ledger = Self::new();
        for product in products {
            ledger.insert(&product.name, product.available_quantity);
        }
        ledger
    }

    /// Adds (or replaces) a product without marking it as changed.
    pub fn insert(&mut self, name: &str, available: Decimal) {
        self.entries.insert(
            name.to_string(),
            Entry {
                available,
                dirty: false,
            },
        );
    }

    /// Whether the ledger knows this product.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Current available quantity of a product.
    #[must_use]
    pub fn available(&self, name: &str) -> Option<Decimal> {
        self.entries.get(name).map(|entry| entry.available)
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut Entry> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| Error::ProductNotFound {
                name: name.to_string(),
            })
    }

    /// Reserves `quantity` of a product for a new order line.
    ///
    /// Returns the available quantity after the reservation.
    ///
    /// # Errors
    /// - [`Error::InvalidQuantity`] if `quantity` is negative
    /// - [`Error::ProductNotFound`] if the product is not in the ledger
    /// - [`Error::InsufficientStock`] if `quantity` exceeds the available quantity
    pub fn reserve(&mut self, name: &str, quantity: Decimal) -> Result<Decimal> {
        validate_quantity(quantity)?;
        let entry = self.entry_mut(name)?;
        if quantity > entry.available {
            return Err(Error::InsufficientStock {
                product: name.to_string(),
                available: entry.available,
                requested: quantity,
            });
        }
        entry.available -= quantity;
        entry.dirty = true;
        Ok(entry.available)
    }

    /// Returns `quantity` of a product to stock (line deleted). Never fails on amount.
    ///
    /// # Errors
    /// - [`Error::InvalidQuantity`] if `quantity` is negative
    /// - [`Error::ProductNotFound`] if the product is not in the ledger
    pub fn release(&mut self, name: &str, quantity: Decimal) -> Result<Decimal> {
        validate_quantity(quantity)?;
        let entry = self.entry_mut(name)?;
        entry.available += quantity;
        entry.dirty = true;
        Ok(entry.available)
    }

    /// Moves a line from `old_quantity` to `new_quantity`.
    ///
    /// Growing a line needs the difference to be available; shrinking always succeeds.
    ///
    /// # Errors
    /// - [`Error::InvalidQuantity`] if either quantity is negative
    /// - [`Error::ProductNotFound`] if the product is not in the ledger
    /// - [`Error::InsufficientStock`] if the increase exceeds the available quantity
    pub fn adjust(
        &mut self,
        name: &str,
        old_quantity: Decimal,
        new_quantity: Decimal,
    ) -> Result<Decimal> {
        validate_quantity(old_quantity)?;
        validate_quantity(new_quantity)?;
        let entry = self.entry_mut(name)?;
        let diff = new_quantity - old_quantity;
        if diff > Decimal::ZERO && diff > entry.available {
            return Err(Error::InsufficientStock {
                product: name.to_string(),
                available: entry.available,
                requested: diff,
            });
        }
        entry.available -= diff;
        entry.dirty = true;
        Ok(entry.available)
    }

    /// Replaces one order's reservations `before` with `after` in a single step.
    ///
    /// Quantities are netted per product, so swapping lines of the same product only needs
    /// the net increase to be available. Every increase is checked before anything changes.
    /// Products that only appear in `before` and are unknown to the ledger are skipped; their
    /// names are returned so the caller can warn about them.
    ///
    /// # Errors
    /// - [`Error::InvalidQuantity`] if any quantity is negative
    /// - [`Error::ProductNotFound`] if a product in `after` is not in the ledger
    /// - [`Error::InsufficientStock`] if any net increase exceeds the available quantity
    pub fn replace(
        &mut self,
        before: &[(String, Decimal)],
        after: &[(String, Decimal)],
    ) -> Result<Vec<String>> {
        let mut deltas: BTreeMap<&str, Decimal> = BTreeMap::new();
        for (name, quantity) in after {
            validate_quantity(*quantity)?;
            *deltas.entry(name.as_str()).or_default() += *quantity;
        }
        for (name, quantity) in before {
            validate_quantity(*quantity)?;
            *deltas.entry(name.as_str()).or_default() -= *quantity;
        }

        let wanted: std::collections::BTreeSet<&str> =
            after.iter().map(|(name, _)| name.as_str()).collect();

        let mut skipped = Vec::new();
        for (&name, &delta) in &deltas {
            match self.entries.get(name) {
                None if wanted.contains(name) => {
                    return Err(Error::ProductNotFound {
                        name: name.to_string(),
                    });
                }
                None => skipped.push(name.to_string()),
                Some(entry) if delta > entry.available => {
                    return Err(Error::InsufficientStock {
                        product: name.to_string(),
                        available: entry.available,
                        requested: delta,
                    });
                }
                Some(_) => {}
            }
        }

        for (name, delta) in deltas {
            if delta.is_zero() {
                continue;
            }
            if let Some(entry) = self.entries.get_mut(name) {
                entry.available -= delta;
                entry.dirty = true;
            }
        }

        Ok(skipped)
    }

    /// Products whose available quantity changed, with their new value.
    pub fn changes(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.dirty)
            .map(|(name, entry)| (name.as_str(), entry.available))
    }
}

/// Loads the catalog rows for `names` into a ledger.
pub async fn load_ledger<C, I, S>(db: &C, names: I) -> Result<StockLedger>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    if names.is_empty() {
        return Ok(StockLedger::new());
    }

    let products = Product::find()
        .filter(product::Column::Name.is_in(names))
        .all(db)
        .await?;

    Ok(StockLedger::from_products(&products))
}

/// Writes every changed ledger entry back to the products table.
pub async fn apply_ledger<C>(db: &C, ledger: &StockLedger) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    for (name, available) in ledger.changes() {
        Product::update_many()
            .col_expr(product::Column::AvailableQuantity, Expr::value(available))
            .col_expr(product::Column::UpdatedAt, Expr::value(now))
            .filter(product::Column::Name.eq(name))
            .exec(db)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn ledger_with(name: &str, available: Decimal) -> StockLedger {
        let mut ledger = StockLedger::new();
        ledger.insert(name, available);
        ledger
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("30").unwrap(), dec!(30));
        assert_eq!(parse_quantity(" 2.5 ").unwrap(), dec!(2.5));
        assert_eq!(parse_quantity("0").unwrap(), Decimal::ZERO);
        assert!(matches!(
            parse_quantity("ten"),
            Err(Error::InvalidQuantity { value }) if value == "ten"
        ));
        assert!(matches!(
            parse_quantity("-1"),
            Err(Error::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_line_total_is_exact() {
        assert_eq!(line_total(dec!(30), dec!(12.35)), dec!(370.5));
        assert_eq!(line_total(dec!(0.1), dec!(0.2)), dec!(0.02));
    }

    #[test]
    fn test_reserve_decrements() {
        let mut ledger = ledger_with("Aventus", dec!(100));
        assert_eq!(ledger.reserve("Aventus", dec!(30)).unwrap(), dec!(70));
        assert_eq!(ledger.available("Aventus"), Some(dec!(70)));
        assert_eq!(ledger.changes().collect::<Vec<_>>(), vec![("Aventus", dec!(70))]);
    }

    #[test]
    fn test_reserve_rejects_insufficient_stock() {
        let mut ledger = ledger_with("Aventus", dec!(10));
        let err = ledger.reserve("Aventus", dec!(10.5)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock { available, requested, .. }
                if available == dec!(10) && requested == dec!(10.5)
        ));
        assert_eq!(ledger.available("Aventus"), Some(dec!(10)));
        assert_eq!(ledger.changes().count(), 0);
    }

    #[test]
    fn test_reserve_unknown_product() {
        let mut ledger = StockLedger::new();
        assert!(matches!(
            ledger.reserve("Ghost", dec!(1)),
            Err(Error::ProductNotFound { name }) if name == "Ghost"
        ));
    }

    #[test]
    fn test_adjust_follows_example_scenario() {
        let mut ledger = ledger_with("Aventus", dec!(100));
        ledger.reserve("Aventus", dec!(30)).unwrap();

        // 30 -> 50 needs 20 more, 70 available
        assert_eq!(ledger.adjust("Aventus", dec!(30), dec!(50)).unwrap(), dec!(50));

        // 50 -> 200 needs 150 more, only 50 available
        let err = ledger.adjust("Aventus", dec!(50), dec!(200)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock { requested, .. } if requested == dec!(150)
        ));
        assert_eq!(ledger.available("Aventus"), Some(dec!(50)));

        assert_eq!(ledger.release("Aventus", dec!(50)).unwrap(), dec!(100));
    }

    #[test]
    fn test_adjust_decrease_always_applies() {
        let mut ledger = ledger_with("Aventus", Decimal::ZERO);
        assert_eq!(ledger.adjust("Aventus", dec!(40), dec!(15)).unwrap(), dec!(25));
    }

    #[test]
    fn test_replace_nets_same_product() {
        let mut ledger = ledger_with("Aventus", dec!(5));
        let before = vec![("Aventus".to_string(), dec!(20))];
        let after = vec![
            ("Aventus".to_string(), dec!(10)),
            ("Aventus".to_string(), dec!(15)),
        ];
        // Net +5 with 5 available
        let skipped = ledger.replace(&before, &after).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(ledger.available("Aventus"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_replace_is_all_or_nothing() {
        let mut ledger = StockLedger::new();
        ledger.insert("A", dec!(100));
        ledger.insert("B", dec!(1));
        let before = vec![("A".to_string(), dec!(10))];
        let after = vec![("A".to_string(), dec!(1)), ("B".to_string(), dec!(2))];

        assert!(matches!(
            ledger.replace(&before, &after),
            Err(Error::InsufficientStock { product, .. }) if product == "B"
        ));
        assert_eq!(ledger.available("A"), Some(dec!(100)));
        assert_eq!(ledger.available("B"), Some(dec!(1)));
    }

    #[test]
    fn test_replace_skips_removed_unknown_products() {
        let mut ledger = ledger_with("A", dec!(10));
        let before = vec![("Gone".to_string(), dec!(3)), ("A".to_string(), dec!(1))];
        let after = vec![("A".to_string(), dec!(2))];

        let skipped = ledger.replace(&before, &after).unwrap();
        assert_eq!(skipped, vec!["Gone".to_string()]);
        assert_eq!(ledger.available("A"), Some(dec!(9)));
    }

    #[test]
    fn test_replace_rejects_unknown_added_product() {
        let mut ledger = ledger_with("A", dec!(10));
        let after = vec![("Ghost".to_string(), dec!(1))];
        assert!(matches!(
            ledger.replace(&[], &after),
            Err(Error::ProductNotFound { .. })
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(u32),
        Edit(usize, u32),
        Delete(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..500).prop_map(Op::Create),
            (0usize..8, 1u32..500).prop_map(|(i, q)| Op::Edit(i, q)),
            (0usize..8).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn prop_conservation_and_non_negativity(
            initial in 0u32..1_000,
            ops in proptest::collection::vec(op_strategy(), 0..40),
        ) {
            // Quantities in tenths to exercise fractional stock
            let tenth = dec!(0.1);
            let initial = Decimal::from(initial) * tenth;
            let mut ledger = ledger_with("P", initial);
            let mut lines: Vec<Decimal> = Vec::new();

            for op in ops {
                match op {
                    Op::Create(q) => {
                        let q = Decimal::from(q) * tenth;
                        if ledger.reserve("P", q).is_ok() {
                            lines.push(q);
                        }
                    }
                    Op::Edit(i, q) if !lines.is_empty() => {
                        let i = i % lines.len();
                        let q = Decimal::from(q) * tenth;
                        if ledger.adjust("P", lines[i], q).is_ok() {
                            lines[i] = q;
                        }
                    }
                    Op::Delete(i) if !lines.is_empty() => {
                        let i = i % lines.len();
                        let q = lines.remove(i);
                        ledger.release("P", q).unwrap();
                    }
                    _ => {}
                }

                let available = ledger.available("P").unwrap();
                prop_assert!(available >= Decimal::ZERO);
                let reserved: Decimal = lines.iter().copied().sum();
                prop_assert_eq!(available + reserved, initial);
            }
        }
    }
}
