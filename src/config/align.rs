use std::collections::{BTreeSet, HashSet};

use super::Config;
use crate::data::model::Value;
use crate::error::{ConfigError, Result, Side};

/// How surviving values are ordered after alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignOrder {
    /// Keep each side's original relative order of surviving values while
    /// `ids` becomes the sorted matched list. Values and ids only line up
    /// when a side was already sorted by id.
    #[default]
    Preserve,
    /// Reorder `(id, value)` records together so values follow the sorted
    /// matched list.
    Canonical,
}

/// Restricts two configs to their common ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    order: AlignOrder,
}

impl Aligner {
    pub fn new(order: AlignOrder) -> Self {
        Aligner { order }
    }

    pub fn order(&self) -> AlignOrder {
        self.order
    }

    /// Align `x` and `y`, returning both.
    pub fn align(&self, mut x: Config, mut y: Config) -> Result<(Config, Config)> {
        self.align_in_place(&mut x, &mut y)?;
        Ok((x, y))
    }

    /// Align `x` and `y` in place and return the matched ids.
    ///
    /// Both configs are validated before either is touched, so on error
    /// neither has been modified.
    pub fn align_in_place(&self, x: &mut Config, y: &mut Config) -> Result<Vec<String>> {
        let x_ids = x.ids().ok_or_else(|| ConfigError::MissingIdentifiers {
            side: Side::X,
            hint: x.missing_ids_hint(),
        })?;
        let y_ids = y.ids().ok_or_else(|| ConfigError::MissingIdentifiers {
            side: Side::Y,
            hint: y.missing_ids_hint(),
        })?;
        let y_set: HashSet<&str> = y_ids.iter().map(String::as_str).collect();
        let matched: Vec<String> = x_ids
            .iter()
            .filter(|id| y_set.contains(id.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if matched.is_empty() {
            return Err(ConfigError::NoIdentifierOverlap);
        }
        // only ids that survive must be unique
        check_unique(x_ids, &matched, Side::X)?;
        check_unique(y_ids, &matched, Side::Y)?;

        let x_dropped = x_ids.len() - matched.len();
        let y_dropped = y_ids.len() - matched.len();
        retain_matched(x, &matched, self.order);
        retain_matched(y, &matched, self.order);

        log::info!(
            "aligned {} ids ({x_dropped} dropped from x, {y_dropped} dropped from y)",
            matched.len()
        );
        Ok(matched)
    }
}

/// Align with the default (order-preserving) behaviour.
pub fn align(x: Config, y: Config) -> Result<(Config, Config)> {
    Aligner::default().align(x, y)
}

fn check_unique(ids: &[String], matched: &[String], side: Side) -> Result<()> {
    let mut seen = HashSet::with_capacity(matched.len());
    for id in ids {
        if matched.binary_search(id).is_ok() && !seen.insert(id.as_str()) {
            return Err(ConfigError::DuplicateIdentifier {
                side,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

fn retain_matched(config: &mut Config, matched: &[String], order: AlignOrder) {
    let keep: HashSet<&str> = matched.iter().map(String::as_str).collect();
    let (values, ids) = config.records_mut();
    let current = ids.take().unwrap_or_default();

    let mut records: Vec<(String, Value)> = current
        .into_iter()
        .zip(values.drain(..))
        .filter(|(id, _)| keep.contains(id.as_str()))
        .collect();
    if order == AlignOrder::Canonical {
        records.sort_by(|a, b| a.0.cmp(&b.0));
    }

    *values = records.into_iter().map(|(_, value)| value).collect();
    *ids = Some(matched.to_vec());
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::{ArrayConfig, ComposeConfig};
    use crate::data::model::CellValue;

    /// A config whose value at position `i` is the text of `ids[i]`, so the
    /// pairing can be checked after alignment.
    fn labelled(ids: &[&str]) -> Config {
        let mut config: Config = ArrayConfig::from_cells(
            ids.iter().map(|id| CellValue::String(format!("v-{id}"))).collect(),
        )
        .into();
        *config.records_mut().1 = Some(ids.iter().map(|s| s.to_string()).collect());
        config
    }

    fn value_labels(config: &Config) -> Vec<String> {
        config
            .values()
            .iter()
            .map(|v| v.as_cell().unwrap().to_string())
            .collect()
    }

    #[test]
    fn intersection_is_sorted() {
        let (x, y) = align(labelled(&["a", "c", "b"]), labelled(&["b", "a", "d"])).unwrap();
        assert_eq!(x.ids().unwrap(), ["a", "b"]);
        assert_eq!(y.ids().unwrap(), ["a", "b"]);
        assert_eq!(x.len(), 2);
        assert_eq!(y.len(), 2);
    }

    #[test]
    fn preserve_keeps_original_value_order() {
        let (x, y) = align(labelled(&["a", "c", "b"]), labelled(&["b", "a", "d"])).unwrap();
        assert_eq!(value_labels(&x), ["v-a", "v-b"]);
        // y's survivors stay in their original order: b before a
        assert_eq!(value_labels(&y), ["v-b", "v-a"]);
    }

    #[test]
    fn canonical_reorders_records() {
        let aligner = Aligner::new(AlignOrder::Canonical);
        let (_, y) = aligner
            .align(labelled(&["a", "c", "b"]), labelled(&["b", "a", "d"]))
            .unwrap();
        assert_eq!(value_labels(&y), ["v-a", "v-b"]);
    }

    #[test]
    fn disjoint_ids_fail() {
        let err = align(labelled(&["a"]), labelled(&["b"])).unwrap_err();
        assert!(matches!(err, ConfigError::NoIdentifierOverlap));
    }

    #[test]
    fn missing_ids_name_the_side() {
        let plain: Config = ArrayConfig::from_cells(vec![CellValue::Integer(1)]).into();
        let err = align(plain.clone(), labelled(&["a"])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingIdentifiers { side: Side::X, .. }));
        let err = align(labelled(&["a"]), plain).unwrap_err();
        assert!(matches!(err, ConfigError::MissingIdentifiers { side: Side::Y, .. }));
    }

    #[test]
    fn duplicates_fail_without_mutation() {
        let mut x = labelled(&["a", "a", "b"]);
        let mut y = labelled(&["a", "b"]);
        let err = Aligner::default().align_in_place(&mut x, &mut y).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateIdentifier { side: Side::X, .. }));
        assert_eq!(x.len(), 3);
        assert_eq!(y.len(), 2);
    }

    #[test]
    fn duplicates_outside_the_intersection_are_dropped() {
        let (x, y) = align(labelled(&["a", "b"]), labelled(&["a", "", "", "b"])).unwrap();
        assert_eq!(x.ids().unwrap(), ["a", "b"]);
        assert_eq!(y.ids().unwrap(), ["a", "b"]);
        assert_eq!(value_labels(&y), ["v-a", "v-b"]);
    }

    #[test]
    fn aligned_compose_materialises_filtered_tuples() {
        let compose: Config =
            ComposeConfig::new(vec![labelled(&["s2", "s1", "s3"]), labelled(&["s2", "s1", "s3"])])
                .unwrap()
                .into();
        let (x, _) = Aligner::new(AlignOrder::Canonical)
            .align(compose, labelled(&["s3", "s1"]))
            .unwrap();
        let first = x.get(0).unwrap();
        let items = first.as_tuple().unwrap();
        assert_eq!(items[0].as_cell().unwrap().to_string(), "v-s1");
        assert_eq!(x.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_aligned_lengths_match(
            xs in proptest::collection::btree_set("[a-e]{1,2}", 1..12),
            ys in proptest::collection::btree_set("[a-e]{1,2}", 1..12),
        ) {
            let x_ids: Vec<&str> = xs.iter().map(String::as_str).collect();
            let y_ids: Vec<&str> = ys.iter().rev().map(String::as_str).collect();
            let common: Vec<String> = xs.intersection(&ys).cloned().collect();

            match Aligner::new(AlignOrder::Canonical).align(labelled(&x_ids), labelled(&y_ids)) {
                Ok((x, y)) => {
                    prop_assert_eq!(x.ids().unwrap(), common.as_slice());
                    prop_assert_eq!(y.ids().unwrap(), common.as_slice());
                    prop_assert_eq!(x.len(), common.len());
                    prop_assert_eq!(y.len(), common.len());
                    let expected: Vec<String> = common.iter().map(|id| format!("v-{id}")).collect();
                    prop_assert_eq!(value_labels(&y), expected);
                }
                Err(ConfigError::NoIdentifierOverlap) => prop_assert!(common.is_empty()),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
