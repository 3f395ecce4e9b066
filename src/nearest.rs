//! Linear minimum-distance search shared by station matching and weather
//! alignment.

/// Return the item with the smallest `metric`, together with that distance.
///
/// The scan is stable: when several items share the minimum distance the
/// first one encountered wins. Items whose distance does not compare with
/// itself (NaN) are skipped entirely. Returns `None` when no item has a
/// comparable distance.
///
/// # Example
/// ```
/// use tide_weather_lib::nearest::nearest_by;
///
/// let (value, distance) = nearest_by([10, 4, 7, 4], |v| (v - 5i32).abs()).unwrap();
/// assert_eq!(value, 4);
/// assert_eq!(distance, 1);
/// ```
pub fn nearest_by<I, D, F>(items: I, mut metric: F) -> Option<(I::Item, D)>
where
    I: IntoIterator,
    D: PartialOrd,
    F: FnMut(&I::Item) -> D,
{
    let mut best: Option<(I::Item, D)> = None;

    for item in items {
        let distance = metric(&item);
        if distance.partial_cmp(&distance).is_none() {
            continue;
        }
        let closer = match &best {
            None => true,
            Some((_, best_distance)) => distance < *best_distance,
        };
        if closer {
            best = Some((item, distance));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_nearest() {
        let empty: Vec<f64> = Vec::new();
        assert!(nearest_by(empty, |v| *v).is_none());
    }

    #[test]
    fn first_minimum_wins_ties() {
        let items = [("a", 3.0), ("b", 1.0), ("c", 1.0), ("d", 2.0)];
        let (item, distance) = nearest_by(items.iter(), |(_, d)| *d).unwrap();
        assert_eq!(item.0, "b");
        assert_eq!(distance, 1.0);
    }

    #[test]
    fn nan_distances_do_not_replace_best() {
        let items = [1.0, f64::NAN, 0.5];
        let (item, _) = nearest_by(items, |v| *v).unwrap();
        assert_eq!(item, 0.5);
    }

    #[test]
    fn nan_first_item_is_never_nearest() {
        let items = [f64::NAN, 1.0, 0.5];
        let (item, distance) = nearest_by(items, |v| *v).unwrap();
        assert_eq!(item, 0.5);
        assert_eq!(distance, 0.5);
    }

    #[test]
    fn all_nan_has_no_nearest() {
        assert!(nearest_by([f64::NAN, f64::NAN], |v| *v).is_none());
    }

    #[test]
    fn works_with_integer_metrics() {
        let (item, distance) = nearest_by(vec![100i64, 40, 60], |v| (v - 55).abs()).unwrap();
        assert_eq!(item, 60);
        assert_eq!(distance, 5);
    }
}
