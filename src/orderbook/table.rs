//! One side of the book.
//!
//! This implementation pairs an `FxHashMap` identity map with a `BTreeMap`
//! price index, providing:
//!
//! - O(1) existence check and lookup by order id
//! - O(log n) insertion, removal and replacement
//! - O(log n) access to the best price (via `first_key_value` / `last_key_value`)
//! - O(log n + k) price-banded range queries by direct ordered iteration

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::types::{Order, OrderId, Price, Size, Volume};

/// Arrival stamp that orders a price bucket
type Seq = u64;

/// Orders resting at one price, keyed by arrival
type Bucket = BTreeMap<Seq, Order>;

/// Identity map entry: the order plus its key inside the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    order: Order,
    seq: Seq,
}

/// Indexed store of the resting orders on one side of the book.
///
/// # Design Decisions
///
/// 1. **Two indexes, one truth**: every order in the identity map appears in
///    exactly one price bucket and vice versa. All mutation goes through
///    [`add`](Self::add) and [`remove`](Self::remove) (or the in-bucket
///    [`reduce`](Self::reduce)) so the two never drift.
///
/// 2. **No empty buckets**: a bucket is pruned the moment its last order
///    leaves, so the first/last key of the index is always a live price.
///
/// 3. **Time priority inside a bucket**: each insertion takes a fresh
///    arrival stamp and buckets iterate in stamp order, so ties at one
///    price are broken first-in first-out. A partial fill keeps its stamp;
///    a [`modify`](Self::modify) takes a new one.
///
/// 4. **No sorting on read**: range queries walk the price index in order.
///
/// # Thread Safety
///
/// Not internally synchronized. The owning exchange is the only writer.
///
/// # Equality
///
/// Two tables are equal when they hold the same orders at the same prices in
/// the same priority. Arrival stamps are bookkeeping and are not compared, so
/// tables with different histories can still be equal.
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    /// Order id -> resting order
    orders: FxHashMap<OrderId, Slot>,

    /// Price -> orders at that price, ascending by price
    levels: BTreeMap<Price, Bucket>,

    /// Next arrival stamp
    next_seq: Seq,
}

impl OrderTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table sized for `capacity` resting orders
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            orders: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            levels: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Insert an order at the back of its price bucket
    ///
    /// The id must not already rest in this table. Callers check with
    /// [`exists`](Self::exists) first; if they do not, the stale entry is
    /// unindexed so the table stays consistent.
    pub fn add(&mut self, order: Order) {
        debug_assert!(
            !self.exists(order.order_id),
            "order {} already rests in this table",
            order.order_id
        );
        debug_assert!(order.price > 0 && order.size > 0);

        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(stale) = self.orders.insert(order.order_id, Slot { order, seq }) {
            self.unindex(&stale);
        }
        self.levels.entry(order.price).or_default().insert(seq, order);
    }

    /// Remove an order by id
    ///
    /// Returns the removed order, or `None` if the id does not rest here.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let slot = self.orders.remove(&order_id)?;
        self.unindex(&slot);
        Some(slot.order)
    }

    /// Replace the price and size of a resting order
    ///
    /// The new value keeps the id but moves to the back of its (possibly new)
    /// price bucket. Does nothing if the id does not rest here.
    ///
    /// Returns the previous value.
    pub fn modify(&mut self, order_id: OrderId, price: Price, size: Size) -> Option<Order> {
        let previous = self.remove(order_id)?;
        self.add(Order::new(order_id, price, size));
        Some(previous)
    }

    /// Shrink a resting order after a partial fill
    ///
    /// Unlike [`modify`](Self::modify) the order keeps its place in the
    /// bucket. `size` must be positive.
    ///
    /// Returns the previous value.
    pub fn reduce(&mut self, order_id: OrderId, size: Size) -> Option<Order> {
        debug_assert!(size > 0, "reduce to non-positive size {size}");

        let slot = self.orders.get_mut(&order_id)?;
        let previous = slot.order;
        slot.order = previous.with_size(size);

        if let Some(bucket) = self.levels.get_mut(&previous.price) {
            bucket.insert(slot.seq, slot.order);
        }
        Some(previous)
    }

    /// Check if an order id rests in this table
    #[must_use]
    pub fn exists(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Look up a resting order by id
    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id).map(|slot| &slot.order)
    }

    /// All orders resting exactly at `price`, in arrival order
    pub fn orders_at_price(&self, price: Price) -> impl Iterator<Item = &Order> + '_ {
        self.levels.get(&price).into_iter().flat_map(Bucket::values)
    }

    /// Total size resting exactly at `price`
    #[must_use]
    pub fn size_at_price(&self, price: Price) -> Volume {
        self.orders_at_price(price)
            .map(|o| Volume::from(o.size))
            .sum()
    }

    /// First order in the highest-priced bucket
    #[must_use]
    pub fn highest_price_order(&self) -> Option<&Order> {
        self.levels
            .last_key_value()
            .and_then(|(_, bucket)| bucket.values().next())
    }

    /// First order in the lowest-priced bucket
    #[must_use]
    pub fn lowest_price_order(&self) -> Option<&Order> {
        self.levels
            .first_key_value()
            .and_then(|(_, bucket)| bucket.values().next())
    }

    /// Orders priced at or below `price`, cheapest first
    ///
    /// These are the asks an incoming buy limited at `price` may take.
    pub fn same_price_or_cheaper(&self, price: Price) -> impl Iterator<Item = &Order> + '_ {
        self.levels
            .range(..=price)
            .flat_map(|(_, bucket)| bucket.values())
    }

    /// Orders priced at or above `price`, most expensive first
    ///
    /// These are the bids an incoming sell limited at `price` may take.
    pub fn same_price_or_more_expensive(
        &self,
        price: Price,
    ) -> impl Iterator<Item = &Order> + '_ {
        self.levels
            .range(price..)
            .rev()
            .flat_map(|(_, bucket)| bucket.values())
    }

    /// Aggregated `(price, total size)` per bucket, ascending by price
    pub fn levels(&self) -> impl Iterator<Item = (Price, Volume)> + '_ {
        self.levels.iter().map(|(&p, bucket)| (p, bucket_volume(bucket)))
    }

    /// Aggregated `(price, total size)` per bucket, descending by price
    pub fn levels_rev(&self) -> impl Iterator<Item = (Price, Volume)> + '_ {
        self.levels
            .iter()
            .rev()
            .map(|(&p, bucket)| (p, bucket_volume(bucket)))
    }

    /// Number of resting orders
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no orders rest in this table
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of non-empty price buckets
    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Check that the identity map and the price index agree
    ///
    /// Walks the whole table; intended for tests and diagnostics.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let indexed: usize = self.levels.values().map(BTreeMap::len).sum();
        if indexed != self.orders.len() {
            return false;
        }

        self.levels.iter().all(|(&price, bucket)| {
            !bucket.is_empty()
                && bucket.iter().all(|(&seq, order)| {
                    let slot = Slot { order: *order, seq };
                    price > 0
                        && order.price == price
                        && order.size > 0
                        && self.orders.get(&order.order_id) == Some(&slot)
                })
        })
    }

    fn unindex(&mut self, slot: &Slot) {
        let price = slot.order.price;
        if let Some(bucket) = self.levels.get_mut(&price) {
            bucket.remove(&slot.seq);
            if bucket.is_empty() {
                self.levels.remove(&price);
            }
        }
    }
}

impl PartialEq for OrderTable {
    fn eq(&self, other: &Self) -> bool {
        self.orders.len() == other.orders.len()
            && self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|((p, a), (q, b))| p == q && a.values().eq(b.values()))
    }
}

impl Eq for OrderTable {}

fn bucket_volume(bucket: &Bucket) -> Volume {
    bucket.values().map(|o| Volume::from(o.size)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<OrderId> {
        orders.map(|o| o.order_id).collect()
    }

    #[test]
    fn test_new_table() {
        let table = OrderTable::new();
        assert!(table.is_empty());
        assert_eq!(table.num_levels(), 0);
        assert_eq!(table.highest_price_order(), None);
        assert_eq!(table.lowest_price_order(), None);
    }

    #[test]
    fn test_add_and_lookup() {
        let mut table = OrderTable::with_capacity(16);
        table.add(Order::new(1, 10, 5));
        table.add(Order::new(2, 10, 3));
        table.add(Order::new(3, 12, 1));

        assert!(table.exists(1));
        assert!(!table.exists(4));
        assert_eq!(table.get(2), Some(&Order::new(2, 10, 3)));
        assert_eq!(table.len(), 3);
        assert_eq!(table.num_levels(), 2);
        assert_eq!(table.size_at_price(10), 8);
        assert_eq!(table.size_at_price(11), 0);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_remove_prunes_empty_bucket() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));
        table.add(Order::new(2, 20, 5));

        assert_eq!(table.remove(2), Some(Order::new(2, 20, 5)));
        assert_eq!(table.num_levels(), 1);
        assert_eq!(table.highest_price_order(), Some(&Order::new(1, 10, 5)));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_remove_absent_is_none() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));

        assert_eq!(table.remove(99), None);
        assert_eq!(table.len(), 1);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_modify_moves_between_buckets() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));

        assert_eq!(table.modify(1, 15, 2), Some(Order::new(1, 10, 5)));
        assert_eq!(table.get(1), Some(&Order::new(1, 15, 2)));
        assert_eq!(table.size_at_price(10), 0);
        assert_eq!(table.size_at_price(15), 2);
        assert_eq!(table.num_levels(), 1);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_modify_absent_is_noop() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));

        assert_eq!(table.modify(2, 15, 2), None);
        assert!(!table.exists(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_modify_loses_time_priority() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));
        table.add(Order::new(2, 10, 5));

        table.modify(1, 10, 4);
        assert_eq!(ids(table.orders_at_price(10)), vec![2, 1]);
    }

    #[test]
    fn test_reduce_keeps_time_priority() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 10, 5));
        table.add(Order::new(2, 10, 5));

        assert_eq!(table.reduce(1, 2), Some(Order::new(1, 10, 5)));
        assert_eq!(ids(table.orders_at_price(10)), vec![1, 2]);
        assert_eq!(table.get(1), Some(&Order::new(1, 10, 2)));
        assert_eq!(table.size_at_price(10), 7);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_best_orders_fifo_within_price() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 5, 1));
        table.add(Order::new(2, 9, 1));
        table.add(Order::new(3, 9, 1));
        table.add(Order::new(4, 5, 1));

        assert_eq!(table.highest_price_order().map(|o| o.order_id), Some(2));
        assert_eq!(table.lowest_price_order().map(|o| o.order_id), Some(1));
    }

    #[test]
    fn test_same_price_or_cheaper_ascending() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 4, 1));
        table.add(Order::new(2, 2, 1));
        table.add(Order::new(3, 3, 1));
        table.add(Order::new(4, 2, 1));
        table.add(Order::new(5, 6, 1));

        assert_eq!(ids(table.same_price_or_cheaper(4)), vec![2, 4, 3, 1]);
        assert_eq!(ids(table.same_price_or_cheaper(1)), Vec::<OrderId>::new());
    }

    #[test]
    fn test_same_price_or_more_expensive_descending() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 4, 1));
        table.add(Order::new(2, 2, 1));
        table.add(Order::new(3, 6, 1));
        table.add(Order::new(4, 6, 1));

        assert_eq!(ids(table.same_price_or_more_expensive(4)), vec![3, 4, 1]);
        assert_eq!(ids(table.same_price_or_more_expensive(7)), Vec::<OrderId>::new());
    }

    #[test]
    fn test_equality_ignores_history() {
        let mut a = OrderTable::new();
        a.add(Order::new(1, 5, 1));

        let mut b = OrderTable::new();
        b.add(Order::new(2, 9, 1));
        b.remove(2);
        b.add(Order::new(1, 5, 1));

        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_respects_priority() {
        let mut a = OrderTable::new();
        a.add(Order::new(1, 5, 1));
        a.add(Order::new(2, 5, 1));

        let mut b = OrderTable::new();
        b.add(Order::new(2, 5, 1));
        b.add(Order::new(1, 5, 1));

        assert_ne!(a, b);

        b.modify(2, 5, 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_levels() {
        let mut table = OrderTable::new();
        table.add(Order::new(1, 45, 100));
        table.add(Order::new(2, 44, 200));
        table.add(Order::new(3, 45, 50));

        let asc: Vec<_> = table.levels().collect();
        assert_eq!(asc, vec![(44, 200), (45, 150)]);

        let desc: Vec<_> = table.levels_rev().collect();
        assert_eq!(desc, vec![(45, 150), (44, 200)]);
    }
}
