//! Entity filters

use crate::{Filter, FilterError, FilterKind, FilterResult};
use regex::Regex;
use std::marker::PhantomData;
use tabula_model::{ValueSet, VariableEntity};

/// Matches entities whose identifier matches a pattern
///
/// The pattern must match the whole identifier.
#[derive(Debug, Clone)]
pub struct EntityIdFilter {
    kind: FilterKind,
    pattern: Regex,
}

impl EntityIdFilter {
    pub fn new(kind: FilterKind, pattern: &str) -> FilterResult<Self> {
        let anchored = format!("^(?:{})$", pattern);
        let pattern = Regex::new(&anchored).map_err(|e| FilterError::pattern(pattern, e))?;
        Ok(Self { kind, pattern })
    }

    pub fn include(pattern: &str) -> FilterResult<Self> {
        Self::new(FilterKind::Include, pattern)
    }

    pub fn exclude(pattern: &str) -> FilterResult<Self> {
        Self::new(FilterKind::Exclude, pattern)
    }

    fn matches_id(&self, identifier: &str) -> Option<bool> {
        Some(self.pattern.is_match(identifier))
    }
}

impl Filter<VariableEntity> for EntityIdFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn matches(&self, item: &VariableEntity) -> FilterResult<Option<bool>> {
        Ok(self.matches_id(item.identifier()))
    }

    fn describe(&self) -> String {
        format!("{} entity[{}]", self.kind, self.pattern)
    }
}

impl Filter<ValueSet> for EntityIdFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn matches(&self, item: &ValueSet) -> FilterResult<Option<bool>> {
        Ok(self.matches_id(item.entity().identifier()))
    }

    fn describe(&self) -> String {
        format!("{} entity[{}]", self.kind, self.pattern)
    }
}

/// Excludes every item
pub struct ExcludeAllFilter<T> {
    _item: PhantomData<fn(&T)>,
}

impl<T> ExcludeAllFilter<T> {
    pub fn new() -> Self {
        Self { _item: PhantomData }
    }
}

impl<T> Default for ExcludeAllFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Filter<T> for ExcludeAllFilter<T> {
    fn kind(&self) -> FilterKind {
        FilterKind::Exclude
    }

    fn matches(&self, _item: &T) -> FilterResult<Option<bool>> {
        Ok(Some(true))
    }

    fn describe(&self) -> String {
        "exclude all".to_string()
    }
}
