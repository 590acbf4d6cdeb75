use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::value::{RawItem, Value};
use crate::{Error, Result};

/// Ordered chain over a sequence's values.
///
/// Values live in an arena indexed by identifier; the numeric values link
/// to each other through `previous`/`next` identifiers, the label-only
/// values form an unordered bag behind them. Once built the chain is
/// immutable, so any number of readers may share it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct SequenceChain {
    values: Vec<Value>,
    index: HashMap<Uuid, usize>,
}

impl SequenceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from a flat, unordered bulk-create payload.
    ///
    /// Items whose magnitude parses as a decimal are sorted ascending and
    /// linked pairwise; everything else becomes a label-only value sorted
    /// by name. All links are computed in memory before the arena is
    /// assembled, so a caller persisting the result writes a fully-linked
    /// structure in one shot.
    pub fn build(items: Vec<RawItem>) -> Self {
        let mut numeric: Vec<Value> = Vec::new();
        let mut labels: Vec<Value> = Vec::new();

        for item in items {
            match item.parse_magnitude() {
                Some(magnitude) => numeric.push(Value::numeric(magnitude, item.name)),
                None => labels.push(Value::label(item.name)),
            }
        }

        // stable sort: exact-tie order is consistent but unspecified
        numeric.sort_by(|a, b| a.magnitude().cmp(&b.magnitude()));
        labels.sort_by_key(|value| (value.name.is_none(), value.label_sort_key()));

        let ids: Vec<Uuid> = numeric.iter().map(|value| value.id).collect();
        for (position, value) in numeric.iter_mut().enumerate() {
            let previous = if position == 0 {
                None
            } else {
                Some(ids[position - 1])
            };
            let next = ids.get(position + 1).copied();
            value.set_links(previous, next);
        }

        let mut values = numeric;
        values.extend(labels);
        Self::from_values(values)
    }

    /// Reassemble a chain from values fetched back from storage. Storage
    /// gives no ordering guarantee; the stored links are trusted as-is and
    /// ordering is reconstructed by `sorted`/`value_pairs`.
    pub fn from_values(values: Vec<Value>) -> Self {
        let index = values
            .iter()
            .enumerate()
            .map(|(position, value)| (value.id, position))
            .collect();
        Self { values, index }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in arena order (numeric first for built chains).
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, id: &Uuid) -> Option<&Value> {
        self.index.get(id).map(|&position| &self.values[position])
    }

    pub fn lookup(&self, id: &Uuid) -> Result<&Value> {
        self.value(id)
            .ok_or_else(|| Error::ValueNotFound(format!("No value for {} was found", id)))
    }

    pub fn numeric_values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|value| value.is_numeric())
    }

    /// The first value whose magnitude equals `magnitude` exactly.
    pub fn find_by_magnitude(&self, magnitude: Decimal) -> Option<&Value> {
        self.numeric_values()
            .find(|value| value.magnitude() == Some(magnitude))
    }

    /// The first named value matching `name`; substring match when `exact`
    /// is false. An empty name never matches.
    pub fn find_by_name(&self, name: &str, exact: bool) -> Option<&Value> {
        if name.is_empty() {
            return None;
        }
        self.values.iter().find(|value| match value.name.as_deref() {
            Some(candidate) if exact => candidate == name,
            Some(candidate) => candidate.contains(name),
            None => false,
        })
    }

    /// The chain root: the numeric value with no predecessor and a
    /// successor. A sole numeric value has no links and is its own root.
    pub fn root(&self) -> Option<&Value> {
        let mut numeric = self.numeric_values();
        let first = numeric.next()?;
        if numeric.next().is_none() {
            return Some(first);
        }
        self.values.iter().find(|value| {
            value.is_numeric() && value.previous().is_none() && value.next().is_some()
        })
    }

    /// Values in display order: the numeric chain walked root to tail,
    /// then the label-only values sorted by name (identifier fallback for
    /// unnamed ones).
    ///
    /// Degrades to the raw arena order instead of failing when the chain
    /// has no usable root or its links do not cover every numeric value.
    pub fn sorted(&self) -> Vec<&Value> {
        if self.values.is_empty() {
            log::warn!("No values found");
            return Vec::new();
        }

        let numeric_count = self.numeric_values().count();
        if numeric_count == 0 {
            log::error!("Did not find any numeric values");
            return self.values.iter().collect();
        }

        let root = match self.root() {
            Some(root) => root,
            None => {
                log::error!("No root value, can not sort {} numeric values", numeric_count);
                return self.values.iter().collect();
            }
        };

        let mut walked: Vec<&Value> = Vec::with_capacity(self.values.len());
        let mut current = Some(root);
        while let Some(value) = current {
            walked.push(value);
            if walked.len() > numeric_count {
                log::error!("Chain links form a cycle, returning values unsorted");
                return self.values.iter().collect();
            }
            current = value.next().and_then(|id| self.value(&id));
        }

        if walked.len() < numeric_count {
            log::error!(
                "Chain links cover {} of {} numeric values, returning values unsorted",
                walked.len(),
                numeric_count
            );
            return self.values.iter().collect();
        }

        walked.extend(self.label_values_sorted());
        walked
    }

    /// Restartable iteration over adjacent `(value, next)` pairs starting
    /// at the root; the tail pair carries `None`. With `only_numeric` set
    /// to false the label-only values follow, each paired with `None`.
    pub fn value_pairs(&self, only_numeric: bool) -> ValuePairs<'_> {
        ValuePairs {
            chain: self,
            current: self.root().map(|value| value.id),
            yielded: 0,
            labels: if only_numeric {
                Vec::new()
            } else {
                self.label_values_sorted()
            },
            label_position: 0,
        }
    }

    fn label_values_sorted(&self) -> Vec<&Value> {
        let mut labels: Vec<&Value> = self
            .values
            .iter()
            .filter(|value| !value.is_numeric())
            .collect();
        labels.sort_by_key(|value| (value.name.is_none(), value.label_sort_key()));
        labels
    }
}

impl From<Vec<Value>> for SequenceChain {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

impl From<SequenceChain> for Vec<Value> {
    fn from(chain: SequenceChain) -> Self {
        chain.values
    }
}

/// Iterator over adjacent value pairs. Cheap to clone and to rebuild via
/// `SequenceChain::value_pairs`, so iteration can restart at will.
#[derive(Clone)]
pub struct ValuePairs<'a> {
    chain: &'a SequenceChain,
    current: Option<Uuid>,
    yielded: usize,
    labels: Vec<&'a Value>,
    label_position: usize,
}

impl<'a> Iterator for ValuePairs<'a> {
    type Item = (&'a Value, Option<&'a Value>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(id) = self.current.take() {
            if self.yielded >= self.chain.len() {
                log::error!("Chain links form a cycle, stopping pair iteration");
            } else if let Some(value) = self.chain.value(&id) {
                self.yielded += 1;
                let next = value.next().and_then(|next_id| self.chain.value(&next_id));
                self.current = next.map(|next_value| next_value.id);
                return Some((value, next));
            }
        }

        let label = self.labels.get(self.label_position)?;
        self.label_position += 1;
        Some((label, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fibonacci_payload() -> Vec<RawItem> {
        let mut items: Vec<RawItem> = [1.0, 0.0, 2.0, 3.0, 5.0, 7.0]
            .iter()
            .map(|&magnitude| RawItem::numeric(magnitude))
            .collect();
        items.push(RawItem::named("?"));
        items.push(RawItem::named("Coffee"));
        items
    }

    #[test]
    fn test_build_sorts_and_links_numeric_values() {
        let chain = SequenceChain::build(fibonacci_payload());
        let magnitudes: Vec<Decimal> = chain
            .sorted()
            .iter()
            .filter_map(|value| value.magnitude())
            .collect();
        assert_eq!(
            magnitudes,
            vec![dec!(0), dec!(1), dec!(2), dec!(3), dec!(5), dec!(7)]
        );

        let root = chain.root().unwrap();
        assert_eq!(root.magnitude(), Some(dec!(0)));
        assert_eq!(root.previous(), None);

        // forward traversal visits every numeric value exactly once
        let mut visited = 0;
        let mut current = Some(root);
        while let Some(value) = current {
            visited += 1;
            current = value.next().and_then(|id| chain.value(&id));
        }
        assert_eq!(visited, 6);
    }

    #[test]
    fn test_sorted_puts_labels_after_numerics_in_alphabetical_order() {
        let items = vec![
            RawItem {
                name: Some("Two".to_string()),
                value: Some(serde_json::json!(2.0)),
            },
            RawItem {
                name: Some("One".to_string()),
                value: Some(serde_json::json!(1.0)),
            },
            RawItem {
                name: Some("Third".to_string()),
                value: Some(serde_json::json!(3.0)),
            },
            RawItem::named("?"),
            RawItem::named("Coffee"),
        ];
        let chain = SequenceChain::build(items);
        let sorted = chain.sorted();

        let magnitudes: Vec<Option<Decimal>> =
            sorted.iter().map(|value| value.magnitude()).collect();
        assert_eq!(
            magnitudes,
            vec![
                Some(dec!(1)),
                Some(dec!(2)),
                Some(dec!(3)),
                None,
                None,
            ]
        );

        let labels: Vec<&str> = sorted
            .iter()
            .filter(|value| !value.is_numeric())
            .filter_map(|value| value.name.as_deref())
            .collect();
        // case-sensitive ordinal order: '?' (0x3f) sorts before 'C'
        assert_eq!(labels, vec!["?", "Coffee"]);
    }

    #[test]
    fn test_unnamed_label_values_always_sort_after_named_ones() {
        // fresh identifiers every build: the unnamed value must never
        // leapfrog a named label regardless of what uuid it draws
        for _ in 0..32 {
            let chain =
                SequenceChain::build(vec![RawItem::default(), RawItem::named("Coffee")]);
            let sorted = chain.sorted();
            assert_eq!(sorted[0].name.as_deref(), Some("Coffee"));
            assert!(sorted[1].name.is_none());

            let pairs: Vec<_> = chain.value_pairs(false).collect();
            assert_eq!(pairs[0].0.name.as_deref(), Some("Coffee"));
        }
    }

    #[test]
    fn test_unparseable_magnitude_downgrades_to_label_only() {
        let items = vec![
            RawItem::numeric(1.0),
            RawItem {
                name: Some("broken".to_string()),
                value: Some(serde_json::json!("not-a-number")),
            },
        ];
        let chain = SequenceChain::build(items);
        assert_eq!(chain.numeric_values().count(), 1);

        let label = chain.find_by_name("broken", true).unwrap();
        assert!(!label.is_numeric());
    }

    #[test]
    fn test_single_numeric_value_is_its_own_root_with_no_links() {
        let chain = SequenceChain::build(vec![RawItem::numeric(5.0)]);
        let root = chain.root().unwrap();
        assert_eq!(root.previous(), None);
        assert_eq!(root.next(), None);
        assert_eq!(chain.sorted().len(), 1);
    }

    #[test]
    fn test_value_pairs_yields_one_pair_per_numeric_value() {
        let chain = SequenceChain::build(fibonacci_payload());
        let pairs: Vec<_> = chain.value_pairs(true).collect();
        assert_eq!(pairs.len(), 6);

        // consecutive pairs chain together
        for window in pairs.windows(2) {
            let (left, left_next) = window[0];
            let (right, _) = window[1];
            assert_eq!(left.next(), Some(right.id));
            assert_eq!(left_next.map(|value| value.id), Some(right.id));
        }
        let (_, tail_next) = pairs[pairs.len() - 1];
        assert!(tail_next.is_none());

        // restartable: a fresh iterator walks the same pairs
        assert_eq!(chain.value_pairs(true).count(), 6);
    }

    #[test]
    fn test_value_pairs_including_labels_carries_no_links_for_them() {
        let chain = SequenceChain::build(fibonacci_payload());
        let pairs: Vec<_> = chain.value_pairs(false).collect();
        assert_eq!(pairs.len(), 8);

        let label_pairs: Vec<_> = pairs
            .iter()
            .filter(|(value, _)| !value.is_numeric())
            .collect();
        assert_eq!(label_pairs.len(), 2);
        for (value, next) in &label_pairs {
            assert!(next.is_none());
            assert_eq!(value.previous(), None);
        }
    }

    #[test]
    fn test_empty_chain_reads_are_empty_not_errors() {
        let chain = SequenceChain::new();
        assert!(chain.sorted().is_empty());
        assert_eq!(chain.value_pairs(true).count(), 0);
        assert_eq!(chain.value_pairs(false).count(), 0);
    }

    #[test]
    fn test_label_only_chain_has_no_root_and_no_pairs() {
        let chain = SequenceChain::build(vec![RawItem::named("?"), RawItem::named("Coffee")]);
        assert!(chain.root().is_none());
        assert_eq!(chain.value_pairs(true).count(), 0);
        // labels still show up in display order
        assert_eq!(chain.sorted().len(), 2);
    }

    #[test]
    fn test_sorted_degrades_to_arena_order_without_a_root() {
        // two numeric values that both claim a predecessor: no root exists
        let mut first = Value::numeric(dec!(1), None);
        let mut second = Value::numeric(dec!(2), None);
        first.set_links(Some(second.id), Some(second.id));
        second.set_links(Some(first.id), None);

        let chain = SequenceChain::from_values(vec![second.clone(), first.clone()]);
        assert!(chain.root().is_none());

        let sorted = chain.sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].id, second.id);
        assert_eq!(sorted[1].id, first.id);
    }

    #[test]
    fn test_cyclic_links_do_not_hang_traversal() {
        let mut first = Value::numeric(dec!(1), None);
        let mut second = Value::numeric(dec!(2), None);
        let mut third = Value::numeric(dec!(3), None);
        // first -> second -> third -> second, with first looking like a root
        first.set_links(None, Some(second.id));
        second.set_links(Some(first.id), Some(third.id));
        third.set_links(Some(second.id), Some(second.id));

        let chain = SequenceChain::from_values(vec![first, second, third]);
        let sorted = chain.sorted();
        assert_eq!(sorted.len(), 3);

        let pairs: Vec<_> = chain.value_pairs(true).collect();
        assert!(pairs.len() <= chain.len());
    }

    #[test]
    fn test_membership_lookups() {
        let chain = SequenceChain::build(fibonacci_payload());

        let five = chain.find_by_magnitude(dec!(5)).unwrap();
        assert_eq!(five.magnitude(), Some(dec!(5)));
        assert!(chain.find_by_magnitude(dec!(42)).is_none());

        let coffee = chain.find_by_name("Coffee", true).unwrap();
        assert!(!coffee.is_numeric());
        assert!(chain.find_by_name("Cof", true).is_none());
        assert_eq!(
            chain.find_by_name("Cof", false).map(|value| value.id),
            Some(coffee.id)
        );
        assert!(chain.find_by_name("", true).is_none());

        assert_eq!(chain.lookup(&five.id).unwrap().id, five.id);
        assert!(matches!(
            chain.lookup(&Uuid::new_v4()),
            Err(Error::ValueNotFound(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_display_order() {
        let chain = SequenceChain::build(fibonacci_payload());
        let expected: Vec<Uuid> = chain.sorted().iter().map(|value| value.id).collect();

        // storage hands values back as an unordered set
        let mut values: Vec<Value> = serde_json::from_value(
            serde_json::to_value(&chain).unwrap(),
        )
        .unwrap();
        values.reverse();

        let restored = SequenceChain::from_values(values);
        let restored_order: Vec<Uuid> =
            restored.sorted().iter().map(|value| value.id).collect();
        assert_eq!(restored_order, expected);
    }
}
