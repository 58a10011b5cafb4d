//! Filter criteria for listing visit applications.
//!
//! Criteria are compiled into a [`PredicateSet`], an ordered conjunction of predicates that
//! every store evaluates for both counting and listing so the two never disagree.

use serde::Deserialize;

use super::domain::VisitApplication;

/// Optional criteria accepted by the pager. Blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFilter {
    #[serde(default)]
    pub visit_unit: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl VisitFilter {
    pub fn predicates(&self) -> PredicateSet {
        PredicateSet::builder()
            .contains(FilterField::VisitUnit, self.visit_unit.as_deref())
            .equals(FilterField::ContactName, self.contact_name.as_deref())
            .equals(FilterField::ContactPhone, self.contact_phone.as_deref())
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    VisitUnit,
    ContactName,
    ContactPhone,
}

impl FilterField {
    fn value_of<'a>(&self, record: &'a VisitApplication) -> &'a str {
        match self {
            FilterField::VisitUnit => &record.details.visit_unit,
            FilterField::ContactName => &record.details.contact_name,
            FilterField::ContactPhone => &record.details.contact_phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact, case-sensitive match.
    Equals,
    /// ASCII case-insensitive substring match.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Excludes soft-deleted records. Always first in a [`PredicateSet`].
    NotDeleted,
    Field {
        field: FilterField,
        op: FilterOp,
        value: String,
    },
}

impl Predicate {
    pub fn matches(&self, record: &VisitApplication) -> bool {
        match self {
            Predicate::NotDeleted => !record.deleted,
            Predicate::Field { field, op, value } => {
                let actual = field.value_of(record);
                match op {
                    FilterOp::Equals => actual == value,
                    FilterOp::Contains => actual
                        .to_ascii_lowercase()
                        .contains(&value.to_ascii_lowercase()),
                }
            }
        }
    }
}

/// Ordered AND of predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn builder() -> PredicateSetBuilder {
        PredicateSetBuilder {
            predicates: vec![Predicate::NotDeleted],
        }
    }

    /// Only the implicit soft-delete exclusion.
    pub fn active() -> Self {
        Self::builder().build()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, record: &VisitApplication) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(record))
    }
}

pub struct PredicateSetBuilder {
    predicates: Vec<Predicate>,
}

impl PredicateSetBuilder {
    pub fn equals(self, field: FilterField, value: Option<&str>) -> Self {
        self.push(field, FilterOp::Equals, value)
    }

    pub fn contains(self, field: FilterField, value: Option<&str>) -> Self {
        self.push(field, FilterOp::Contains, value)
    }

    pub fn build(self) -> PredicateSet {
        PredicateSet {
            predicates: self.predicates,
        }
    }

    fn push(mut self, field: FilterField, op: FilterOp, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
            self.predicates.push(Predicate::Field {
                field,
                op,
                value: value.to_string(),
            });
        }
        self
    }
}
