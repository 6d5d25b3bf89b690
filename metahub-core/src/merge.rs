//! Field merge primitive
//!
//! Three-state merge of one field across several sources, with an optional
//! `[low, high]` interval for ordered fields and an explicit-change flag that
//! is independent of the merge history.

use crate::types::MergeStatus;

/// Merge state of a single field
///
/// `value` is the representative value: the first loaded one, or the lowest
/// one for ordered fields once they became disjoint. `high` is only tracked
/// for ordered fields in the disjoint state.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMerge<T> {
    status: MergeStatus,
    value: Option<T>,
    high: Option<T>,
    changed: bool,
}

impl<T> Default for FieldMerge<T> {
    fn default() -> Self {
        Self {
            status: MergeStatus::Invalid,
            value: None,
            high: None,
            changed: false,
        }
    }
}

impl<T> FieldMerge<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> MergeStatus {
        self.status
    }

    /// Representative value, whatever the status
    ///
    /// Callers check [`status`](Self::status) for semantic validity.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Value only if all sources agreed on it
    pub fn available_value(&self) -> Option<&T> {
        match self.status {
            MergeStatus::Available => self.value.as_ref(),
            _ => None,
        }
    }

    /// Raised by [`set`](Self::set), cleared by [`reset_changed`](Self::reset_changed)
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn reset_changed(&mut self) {
        self.changed = false;
    }

    /// Explicit override, independent of the load history
    pub fn set(&mut self, value: T, status: MergeStatus) {
        self.value = Some(value);
        self.high = None;
        self.status = status;
        self.changed = true;
    }

    /// `(low, high)`; both ends equal unless the field is an ordered disjoint one
    pub fn interval(&self) -> Option<(&T, &T)> {
        let low = self.value.as_ref()?;
        match self.status {
            MergeStatus::Invalid => None,
            MergeStatus::Available => Some((low, low)),
            MergeStatus::Disjoint => Some((low, self.high.as_ref().unwrap_or(low))),
        }
    }
}

impl<T: PartialEq> FieldMerge<T> {
    /// Merge in one value of an unordered field
    ///
    /// On disagreement the first loaded value stays representative.
    pub fn load_single(&mut self, data: T) {
        match self.status {
            MergeStatus::Invalid => {
                self.value = Some(data);
                self.status = MergeStatus::Available;
            }
            MergeStatus::Available => {
                if self.value.as_ref() != Some(&data) {
                    self.status = MergeStatus::Disjoint;
                }
            }
            MergeStatus::Disjoint => {}
        }
    }
}

impl<T: PartialOrd> FieldMerge<T> {
    /// Merge in one value of an ordered field, tracking the interval
    pub fn load_with_interval(&mut self, data: T) {
        match self.status {
            MergeStatus::Invalid => {
                self.value = Some(data);
                self.status = MergeStatus::Available;
            }
            MergeStatus::Available => {
                let Some(current) = self.value.as_ref() else {
                    self.value = Some(data);
                    return;
                };
                if data == *current {
                    return;
                }
                self.status = MergeStatus::Disjoint;
                if data > *current {
                    self.high = Some(data);
                } else {
                    self.high = self.value.replace(data);
                }
            }
            MergeStatus::Disjoint => {
                if self.value.as_ref().map_or(true, |low| data < *low) {
                    let old_low = self.value.replace(data);
                    // set() may have left no upper bound
                    if self.high.is_none() {
                        self.high = old_low;
                    }
                } else if self.high.as_ref().map_or(true, |high| *high < data) {
                    self.high = Some(data);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_invalid() {
        let field: FieldMerge<i32> = FieldMerge::new();
        assert_eq!(field.status(), MergeStatus::Invalid);
        assert!(field.value().is_none());
        assert!(field.interval().is_none());
        assert!(!field.is_changed());
    }

    #[test]
    fn test_single_load_is_available() {
        let mut field = FieldMerge::new();
        field.load_with_interval(4);
        assert_eq!(field.status(), MergeStatus::Available);
        assert_eq!(field.interval(), Some((&4, &4)));
    }

    #[test]
    fn test_equal_loads_stay_available() {
        let mut field = FieldMerge::new();
        field.load_single("a".to_string());
        field.load_single("a".to_string());
        assert_eq!(field.status(), MergeStatus::Available);
    }

    #[test]
    fn test_interval_tracks_low_and_high() {
        let mut field = FieldMerge::new();
        for rating in [3, 7, 5] {
            field.load_with_interval(rating);
        }
        assert_eq!(field.status(), MergeStatus::Disjoint);
        assert_eq!(field.value(), Some(&3));
        assert_eq!(field.interval(), Some((&3, &7)));
    }

    #[test]
    fn test_interval_extends_both_directions() {
        let mut field = FieldMerge::new();
        for rating in [5, 6, 2, 9, 4] {
            field.load_with_interval(rating);
        }
        assert_eq!(field.interval(), Some((&2, &9)));
    }

    #[test]
    fn test_descending_loads_keep_first_as_high() {
        let mut field = FieldMerge::new();
        field.load_with_interval(8);
        field.load_with_interval(1);
        assert_eq!(field.interval(), Some((&1, &8)));
    }

    #[test]
    fn test_unordered_disjoint_keeps_first_value() {
        let mut field = FieldMerge::new();
        field.load_single("first");
        field.load_single("second");
        field.load_single("third");
        assert_eq!(field.status(), MergeStatus::Disjoint);
        assert_eq!(field.value(), Some(&"first"));
        assert_eq!(field.interval(), Some((&"first", &"first")));
    }

    #[test]
    fn test_disjoint_never_returns_to_available() {
        let mut field = FieldMerge::new();
        field.load_with_interval(1);
        field.load_with_interval(2);
        field.load_with_interval(1);
        field.load_with_interval(2);
        assert_eq!(field.status(), MergeStatus::Disjoint);
    }

    #[test]
    fn test_set_overrides_and_flags_change() {
        let mut field = FieldMerge::new();
        field.load_with_interval(1);
        field.load_with_interval(5);

        field.set(3, MergeStatus::Available);

        assert_eq!(field.status(), MergeStatus::Available);
        assert_eq!(field.available_value(), Some(&3));
        assert!(field.is_changed());

        field.reset_changed();
        assert!(!field.is_changed());
        assert_eq!(field.value(), Some(&3));
    }

    #[test]
    fn test_available_value_hidden_when_disjoint() {
        let mut field = FieldMerge::new();
        field.load_single(1);
        field.load_single(2);
        assert!(field.available_value().is_none());
        assert_eq!(field.value(), Some(&1));
    }
}
