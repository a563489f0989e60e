//! Balance engine: reduces the movement ledger to current stock per location.
//!
//! Balances are derived, never stored. Every query replays the full ledger:
//! receipts add to the `to` side, issues subtract from the `from` side, and a
//! transfer does both. Only strictly positive results are materialized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockledger_core::{LocationId, ProductId, ValueObject};

use crate::movement::Movement;
use crate::store::LedgerStore;

/// Key of a derived balance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub product_id: ProductId,
    pub location_id: LocationId,
}

impl BalanceKey {
    pub fn new(product_id: ProductId, location_id: LocationId) -> Self {
        Self {
            product_id,
            location_id,
        }
    }
}

/// One row of the balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    /// Strictly positive; saturates at `u64::MAX` for larger sums.
    pub qty: u64,
}

impl ValueObject for BalanceEntry {}

impl BalanceEntry {
    pub fn is_low(&self, threshold: u64) -> bool {
        self.qty <= threshold
    }
}

/// Signed running sums per (product, location).
///
/// Zero sums are pruned, so two accumulators built from ledgers with the same
/// net effect compare equal regardless of how they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    totals: HashMap<BalanceKey, i128>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order-independent reduction of a ledger.
    pub fn from_movements<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Self {
        let mut acc = Self::new();
        for movement in movements {
            acc.apply(movement);
        }
        acc
    }

    /// Account for a movement that was appended.
    pub fn apply(&mut self, movement: &Movement) {
        self.post(movement, 1);
    }

    /// Undo a movement that was removed from the ledger.
    pub fn revert(&mut self, movement: &Movement) {
        self.post(movement, -1);
    }

    fn post(&mut self, movement: &Movement, sign: i128) {
        let qty = i128::from(movement.quantity) * sign;
        if let Some(from) = &movement.from_location {
            self.bump(BalanceKey::new(movement.product_id.clone(), from.clone()), -qty);
        }
        if let Some(to) = &movement.to_location {
            self.bump(BalanceKey::new(movement.product_id.clone(), to.clone()), qty);
        }
    }

    fn bump(&mut self, key: BalanceKey, delta: i128) {
        let total = self.totals.entry(key.clone()).or_insert(0);
        *total += delta;
        if *total == 0 {
            self.totals.remove(&key);
        }
    }

    /// Signed balance for one key (0 when absent).
    pub fn get(&self, key: &BalanceKey) -> i128 {
        self.totals.get(key).copied().unwrap_or(0)
    }

    /// Entries with a strictly positive balance.
    ///
    /// Totals above `u64::MAX` are reported as `u64::MAX` (logged at `warn`);
    /// [`get`](Self::get) still returns the exact sum.
    pub fn positive(&self) -> impl Iterator<Item = (&BalanceKey, u64)> {
        self.totals
            .iter()
            .filter(|(_, total)| **total > 0)
            .map(|(key, total)| {
                let qty = u64::try_from(*total).unwrap_or_else(|_| {
                    tracing::warn!(
                        product_id = %key.product_id,
                        location_id = %key.location_id,
                        total = %total,
                        "balance exceeds the reportable quantity; clamping"
                    );
                    u64::MAX
                });
                (key, qty)
            })
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}

/// Resolve names for the positive entries of `acc` and sort the result.
///
/// Entries whose product or location no longer resolves are dropped.
pub fn materialize<S>(acc: &Accumulator, store: &S) -> Vec<BalanceEntry>
where
    S: LedgerStore + ?Sized,
{
    let mut entries: Vec<BalanceEntry> = acc
        .positive()
        .filter_map(|(key, qty)| {
            let product = store.get_product(&key.product_id);
            let location = store.get_location(&key.location_id);
            match (product, location) {
                (Some(product), Some(location)) => Some(BalanceEntry {
                    product_id: key.product_id.clone(),
                    product_name: product.name,
                    location_id: key.location_id.clone(),
                    location_name: location.name,
                    qty,
                }),
                _ => {
                    tracing::debug!(
                        product_id = %key.product_id,
                        location_id = %key.location_id,
                        "dropping balance entry with dangling reference"
                    );
                    None
                }
            }
        })
        .collect();

    sort_entries(&mut entries);
    entries
}

/// Ascending by product name then location name (case-sensitive); ids break
/// remaining ties so the output is fully deterministic.
pub fn sort_entries(entries: &mut [BalanceEntry]) {
    entries.sort_by(|a, b| {
        (&a.product_name, &a.location_name, &a.product_id, &a.location_id).cmp(&(
            &b.product_name,
            &b.location_name,
            &b.product_id,
            &b.location_id,
        ))
    });
}

/// Full snapshot of non-zero balances, recomputed from the whole ledger.
pub fn compute_balances<S>(store: &S) -> Vec<BalanceEntry>
where
    S: LedgerStore + ?Sized,
{
    let movements = store.list_movements();
    let acc = Accumulator::from_movements(&movements);
    materialize(&acc, store)
}

/// Signed balance of a single (product, location) pair.
///
/// Scans only the movements of that product; agrees with the corresponding
/// entry of a full [`Accumulator`] pass.
pub fn balance_of<'a>(
    movements: impl IntoIterator<Item = &'a Movement>,
    product_id: &ProductId,
    location_id: &LocationId,
) -> i128 {
    movements
        .into_iter()
        .filter(|m| &m.product_id == product_id)
        .fold(0i128, |mut total, m| {
            if m.to_location.as_ref() == Some(location_id) {
                total += i128::from(m.quantity);
            }
            if m.from_location.as_ref() == Some(location_id) {
                total -= i128::from(m.quantity);
            }
            total
        })
}

/// Entries at or below `threshold`. Pure filter over an existing snapshot.
pub fn find_low_stock(snapshot: &[BalanceEntry], threshold: u64) -> Vec<BalanceEntry> {
    snapshot
        .iter()
        .filter(|entry| entry.is_low(threshold))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::NewMovement;
    use crate::testing::{FixtureLedger, l, p};

    fn ledger() -> FixtureLedger {
        FixtureLedger::new()
            .with_product("P1", "Laptop")
            .with_location("L1", "Alpha Store")
            .with_location("L2", "Beta Store")
    }

    fn entry(product: &str, product_name: &str, location: &str, location_name: &str, qty: u64) -> BalanceEntry {
        BalanceEntry {
            product_id: p(product),
            product_name: product_name.to_string(),
            location_id: l(location),
            location_name: location_name.to_string(),
            qty,
        }
    }

    #[test]
    fn single_receipt_yields_one_entry() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 10));

        assert_eq!(
            compute_balances(&ledger),
            vec![entry("P1", "Laptop", "L1", "Alpha Store", 10)]
        );
    }

    #[test]
    fn transfer_moves_stock_between_locations() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 10));
        ledger.record(NewMovement::transfer(p("P1"), l("L1"), l("L2"), 4));

        assert_eq!(
            compute_balances(&ledger),
            vec![
                entry("P1", "Laptop", "L1", "Alpha Store", 6),
                entry("P1", "Laptop", "L2", "Beta Store", 4),
            ]
        );
    }

    #[test]
    fn exact_zero_is_suppressed() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 5));
        ledger.record(NewMovement::issue(p("P1"), l("L1"), 5));

        assert!(compute_balances(&ledger).is_empty());
    }

    #[test]
    fn negative_balance_is_suppressed_without_error() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 2));
        ledger.record(NewMovement::transfer(p("P1"), l("L1"), l("L2"), 7));

        assert_eq!(
            compute_balances(&ledger),
            vec![entry("P1", "Laptop", "L2", "Beta Store", 7)]
        );
    }

    #[test]
    fn dangling_references_are_dropped() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 3));
        ledger.record(NewMovement::receipt(p("GONE"), l("L1"), 3));
        ledger.record(NewMovement::receipt(p("P1"), l("NOWHERE"), 3));

        assert_eq!(
            compute_balances(&ledger),
            vec![entry("P1", "Laptop", "L1", "Alpha Store", 3)]
        );
    }

    #[test]
    fn sorts_by_product_then_location_name_case_sensitively() {
        let ledger = FixtureLedger::new()
            .with_product("P1", "banana")
            .with_product("P2", "Apple")
            .with_location("L1", "Zulu")
            .with_location("L2", "Alpha");
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 1));
        ledger.record(NewMovement::receipt(p("P1"), l("L2"), 1));
        ledger.record(NewMovement::receipt(p("P2"), l("L1"), 1));

        let names: Vec<(String, String)> = compute_balances(&ledger)
            .into_iter()
            .map(|e| (e.product_name, e.location_name))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Apple".to_string(), "Zulu".to_string()),
                ("banana".to_string(), "Alpha".to_string()),
                ("banana".to_string(), "Zulu".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_names_fall_back_to_ids() {
        let ledger = FixtureLedger::new()
            .with_product("P2", "Widget")
            .with_product("P1", "Widget")
            .with_location("L1", "Store");
        ledger.record(NewMovement::receipt(p("P2"), l("L1"), 1));
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 1));

        let ids: Vec<String> = compute_balances(&ledger)
            .into_iter()
            .map(|e| e.product_id.to_string())
            .collect();
        assert_eq!(ids, vec!["P1", "P2"]);
    }

    #[test]
    fn find_low_stock_is_inclusive() {
        let snapshot = vec![
            entry("P1", "Laptop", "L1", "Alpha Store", 6),
            entry("P1", "Laptop", "L2", "Beta Store", 4),
            entry("P2", "Mouse", "L1", "Alpha Store", 5),
        ];

        let low = find_low_stock(&snapshot, 5);
        assert_eq!(
            low,
            vec![
                entry("P1", "Laptop", "L2", "Beta Store", 4),
                entry("P2", "Mouse", "L1", "Alpha Store", 5),
            ]
        );
        assert!(find_low_stock(&snapshot, 0).is_empty());
    }

    #[test]
    fn balance_of_matches_accumulator() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), 10));
        ledger.record(NewMovement::transfer(p("P1"), l("L1"), l("L2"), 4));
        ledger.record(NewMovement::issue(p("P1"), l("L2"), 9));

        let movements = ledger.list_movements();
        let acc = Accumulator::from_movements(&movements);
        for location in ["L1", "L2"] {
            let key = BalanceKey::new(p("P1"), l(location));
            assert_eq!(balance_of(&movements, &p("P1"), &l(location)), acc.get(&key));
        }
        assert_eq!(balance_of(&movements, &p("P1"), &l("L2")), -5);
    }

    #[test]
    fn revert_undoes_apply() {
        let ledger = ledger();
        let receipt = ledger.record(NewMovement::receipt(p("P1"), l("L1"), 10));
        let transfer = ledger.record(NewMovement::transfer(p("P1"), l("L1"), l("L2"), 4));

        let mut acc = Accumulator::from_movements([&receipt, &transfer]);
        acc.revert(&transfer);
        assert_eq!(acc, Accumulator::from_movements([&receipt]));
        acc.revert(&receipt);
        assert!(acc.is_empty());
    }

    #[test]
    fn oversized_total_saturates_in_snapshot_only() {
        let ledger = ledger();
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), u64::MAX));
        ledger.record(NewMovement::receipt(p("P1"), l("L1"), u64::MAX));

        let movements = ledger.list_movements();
        let acc = Accumulator::from_movements(&movements);
        assert_eq!(acc.len(), 1);
        assert_eq!(
            acc.get(&BalanceKey::new(p("P1"), l("L1"))),
            2 * i128::from(u64::MAX)
        );
        assert_eq!(
            compute_balances(&ledger),
            vec![entry("P1", "Laptop", "L1", "Alpha Store", u64::MAX)]
        );
    }

    #[test]
    fn entries_serialize_with_flat_fields() {
        let json = serde_json::to_value(entry("P1", "Laptop", "L1", "Alpha Store", 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "product_id": "P1",
                "product_name": "Laptop",
                "location_id": "L1",
                "location_name": "Alpha Store",
                "qty": 10
            })
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const PRODUCTS: [&str; 3] = ["P1", "P2", "P3"];
        const LOCATIONS: [&str; 4] = ["L1", "L2", "L3", "L4"];

        fn movement_strategy() -> impl Strategy<Value = NewMovement> {
            (
                0..PRODUCTS.len(),
                proptest::option::of(0..LOCATIONS.len()),
                proptest::option::of(0..LOCATIONS.len()),
                1u64..50,
            )
                .prop_filter("needs a valid shape", |(_, from, to, _)| match (from, to) {
                    (None, None) => false,
                    (Some(a), Some(b)) => a != b,
                    _ => true,
                })
                .prop_map(|(product, from, to, qty)| NewMovement {
                    product_id: p(PRODUCTS[product]),
                    from_location: from.map(|i| l(LOCATIONS[i])),
                    to_location: to.map(|i| l(LOCATIONS[i])),
                    quantity: qty,
                    notes: None,
                    timestamp: None,
                })
        }

        fn full_ledger(movements: &[NewMovement]) -> FixtureLedger {
            let mut ledger = FixtureLedger::new();
            for (i, id) in PRODUCTS.iter().enumerate() {
                ledger = ledger.with_product(id, &format!("Product {i}"));
            }
            for (i, id) in LOCATIONS.iter().enumerate() {
                ledger = ledger.with_location(id, &format!("Location {i}"));
            }
            for movement in movements {
                ledger.record(movement.clone());
            }
            ledger
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: recomputing without ledger changes yields the same snapshot.
            #[test]
            fn compute_is_idempotent(movements in proptest::collection::vec(movement_strategy(), 0..40)) {
                let ledger = full_ledger(&movements);
                prop_assert_eq!(compute_balances(&ledger), compute_balances(&ledger));
            }

            /// Property: the snapshot does not depend on ledger order.
            #[test]
            fn compute_is_order_independent(
                (movements, shuffled) in proptest::collection::vec(movement_strategy(), 0..40)
                    .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
            ) {
                prop_assert_eq!(
                    compute_balances(&full_ledger(&movements)),
                    compute_balances(&full_ledger(&shuffled))
                );
            }

            /// Property: an entry is present iff its signed sum is strictly positive.
            #[test]
            fn zero_and_negative_sums_are_suppressed(movements in proptest::collection::vec(movement_strategy(), 0..40)) {
                let ledger = full_ledger(&movements);
                let stored = ledger.list_movements();
                let snapshot = compute_balances(&ledger);

                for product in PRODUCTS {
                    for location in LOCATIONS {
                        let expected = balance_of(&stored, &p(product), &l(location));
                        let found = snapshot
                            .iter()
                            .find(|e| e.product_id == p(product) && e.location_id == l(location));
                        match found {
                            Some(e) => prop_assert_eq!(i128::from(e.qty), expected),
                            None => prop_assert!(expected <= 0),
                        }
                    }
                }
            }

            /// Property: per product, balances across locations plus the outside
            /// sink equal total receipts minus total issues.
            #[test]
            fn conservation_holds_per_product(movements in proptest::collection::vec(movement_strategy(), 0..40)) {
                let ledger = full_ledger(&movements);
                let stored = ledger.list_movements();
                let acc = Accumulator::from_movements(&stored);

                for product in PRODUCTS {
                    let inflow: i128 = stored
                        .iter()
                        .filter(|m| m.product_id == p(product) && m.to_location.is_some())
                        .map(|m| i128::from(m.quantity))
                        .sum();
                    let outflow: i128 = stored
                        .iter()
                        .filter(|m| m.product_id == p(product) && m.from_location.is_some())
                        .map(|m| i128::from(m.quantity))
                        .sum();
                    let across_locations: i128 = LOCATIONS
                        .iter()
                        .map(|loc| acc.get(&BalanceKey::new(p(product), l(loc))))
                        .sum();
                    prop_assert_eq!(across_locations, inflow - outflow);
                }
            }

            /// Property: snapshot is sorted by (product_name, location_name).
            #[test]
            fn snapshot_is_sorted(movements in proptest::collection::vec(movement_strategy(), 0..40)) {
                let snapshot = compute_balances(&full_ledger(&movements));
                for pair in snapshot.windows(2) {
                    prop_assert!(
                        (&pair[0].product_name, &pair[0].location_name)
                            <= (&pair[1].product_name, &pair[1].location_name)
                    );
                }
            }
        }
    }
}
