//! Filter chains
//!
//! A chain decides membership of each item with a two-state machine. The
//! item starts *out* when the first filter is an include filter and *in*
//! otherwise. Filters are then consulted in order: an exclude filter only
//! sees items that are in and moves them out when it matches, an include
//! filter only sees items that are out and moves them in when it matches.
//!
//! Only a positive match moves an item. A filter answering `None` has no
//! opinion: it is neither a match nor a rejection, so the item keeps the state
//! the earlier filters gave it. `Some(false)` also leaves the state alone, but
//! as a decision; [`Decision::undecided`] counts the `None` answers so callers
//! can tell the two apart.

use crate::FilterResult;
use log::{debug, trace};
use std::fmt;
use std::sync::Arc;

/// Whether a matching filter adds items to or removes items from the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Include,
    Exclude,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}

/// A stateless predicate over items of type `T`
pub trait Filter<T>: Send + Sync {
    fn kind(&self) -> FilterKind;

    /// Whether the filter applies to `item`; `None` when it has no opinion
    fn matches(&self, item: &T) -> FilterResult<Option<bool>>;

    /// Short description for logs
    fn describe(&self) -> String {
        format!("{} filter", self.kind())
    }
}

/// Outcome of a chain for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub included: bool,
    /// Consulted filters that had no opinion
    pub undecided: usize,
}

/// Ordered filters deciding which items are kept
pub struct FilterChain<T> {
    filters: Vec<Arc<dyn Filter<T>>>,
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FilterChain<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<T> FilterChain<T> {
    /// An empty chain keeps every item
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter
    pub fn with(mut self, filter: impl Filter<T> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn push(&mut self, filter: Arc<dyn Filter<T>>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether the chain keeps `item`
    pub fn is_included(&self, item: &T) -> FilterResult<bool> {
        Ok(self.decide(item)?.included)
    }

    /// Run the state machine for `item`
    pub fn decide(&self, item: &T) -> FilterResult<Decision> {
        let mut decision = Decision {
            included: self
                .filters
                .first()
                .is_none_or(|first| first.kind() == FilterKind::Exclude),
            undecided: 0,
        };

        for filter in &self.filters {
            let consulted = match filter.kind() {
                FilterKind::Exclude => decision.included,
                FilterKind::Include => !decision.included,
            };
            if !consulted {
                continue;
            }
            let outcome = filter.matches(item)?;
            trace!("{} answered {:?}", filter.describe(), outcome);
            match outcome {
                Some(true) => decision.included = filter.kind() == FilterKind::Include,
                Some(false) => {}
                None => decision.undecided += 1,
            }
        }
        Ok(decision)
    }

    /// Keep the included items, in their original order
    ///
    /// Stops at the first filter error.
    pub fn apply(&self, items: impl IntoIterator<Item = T>) -> FilterResult<Vec<T>> {
        let mut kept = Vec::new();
        let mut seen = 0usize;
        let mut undecided = 0usize;
        for item in items {
            seen += 1;
            let decision = self.decide(&item)?;
            if decision.undecided > 0 {
                undecided += 1;
            }
            if decision.included {
                kept.push(item);
            }
        }
        debug!(
            "Filter chain of {} kept {} of {} items ({} met a filter with no opinion)",
            self.filters.len(),
            kept.len(),
            seen,
            undecided
        );
        Ok(kept)
    }
}

impl<T> fmt::Debug for FilterChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.describe()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Answers from a fixed table, by item
    struct Table {
        kind: FilterKind,
        answer: fn(u32) -> Option<bool>,
    }

    impl Filter<u32> for Table {
        fn kind(&self) -> FilterKind {
            self.kind
        }

        fn matches(&self, item: &u32) -> FilterResult<Option<bool>> {
            Ok((self.answer)(*item))
        }
    }

    fn include(answer: fn(u32) -> Option<bool>) -> Table {
        Table {
            kind: FilterKind::Include,
            answer,
        }
    }

    fn exclude(answer: fn(u32) -> Option<bool>) -> Table {
        Table {
            kind: FilterKind::Exclude,
            answer,
        }
    }

    fn even(n: u32) -> Option<bool> {
        Some(n % 2 == 0)
    }

    fn above_five(n: u32) -> Option<bool> {
        Some(n > 5)
    }

    fn undecided(_: u32) -> Option<bool> {
        None
    }

    fn everything(_: u32) -> Option<bool> {
        Some(true)
    }

    #[test]
    fn test_empty_chain_keeps_everything() {
        let chain = FilterChain::<u32>::new();
        assert_eq!(chain.apply(1..=3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_leading_include_starts_out() {
        let chain = FilterChain::<u32>::new().with(include(even));
        assert_eq!(chain.apply(1..=6).unwrap(), vec![2, 4, 6]);
    }

    #[test]
    fn test_leading_exclude_starts_in() {
        let chain = FilterChain::<u32>::new().with(exclude(even));
        assert_eq!(chain.apply(1..=6).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_exclude_all_then_include() {
        let chain = FilterChain::<u32>::new()
            .with(exclude(everything))
            .with(include(above_five));
        assert_eq!(chain.apply(1..=8).unwrap(), vec![6, 7, 8]);
    }

    #[test]
    fn test_include_then_exclude() {
        let chain = FilterChain::<u32>::new()
            .with(include(even))
            .with(exclude(above_five));
        assert_eq!(chain.apply(1..=8).unwrap(), vec![2, 4]);
    }

    #[rstest]
    #[case(FilterKind::Include, false)]
    #[case(FilterKind::Exclude, true)]
    fn test_no_opinion_leaves_state(#[case] kind: FilterKind, #[case] expected: bool) {
        let chain = FilterChain::<u32>::new().with(Table {
            kind,
            answer: undecided,
        });
        assert_eq!(chain.is_included(&1).unwrap(), expected);
    }

    #[test]
    fn test_decision_counts_undecided_answers() {
        fn odd_unknown(n: u32) -> Option<bool> {
            if n % 2 == 0 { Some(true) } else { None }
        }
        let chain = FilterChain::<u32>::new()
            .with(include(odd_unknown))
            .with(exclude(above_five));
        assert_eq!(
            chain.decide(&3).unwrap(),
            Decision {
                included: false,
                undecided: 1
            }
        );
        assert_eq!(
            chain.decide(&4).unwrap(),
            Decision {
                included: true,
                undecided: 0
            }
        );
        // rejected, but decided
        assert_eq!(chain.decide(&8).unwrap().undecided, 0);
        assert!(!chain.is_included(&8).unwrap());
    }

    #[test]
    fn test_filters_only_see_items_they_can_move() {
        fn panics(_: u32) -> Option<bool> {
            panic!("include filter consulted for an included item")
        }
        let chain = FilterChain::<u32>::new()
            .with(exclude(undecided))
            .with(include(panics));
        assert_eq!(chain.apply(1..=2).unwrap(), vec![1, 2]);
    }
}
