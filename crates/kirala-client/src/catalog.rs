//! Home-screen catalog: one toy snapshot partitioned into three buckets.
//!
//! - **İlgini Çekebilecekler**: available toys in the viewer's city, at
//!   most one per category in discovery order, capped at four.  Diversity
//!   sampling, not ranking.
//! - **Şehrindeki Diğer Oyuncaklar**: the rest of the viewer's city,
//!   through the search term and filter, minus the first bucket.
//! - **Diğer Şehirlerdekiler**: everything else through the same
//!   predicate.  With no viewer city this bucket is simply "all toys".
//!
//! Filter state is view-local; recomputation is synchronous over the cached
//! snapshot.  Views subscribe to [`Database::subscribe`] and call
//! [`CatalogView::snapshot`] again on every `Toys` event.

use std::collections::HashSet;

use kirala_shared::constants::{FALLBACK_CATEGORY, INTERESTED_BUCKET_CAP};
use kirala_shared::{AgeRange, Gender, ToyId};
use kirala_store::{StoreError, Toy};

use crate::state::{lock, SharedState};

/// The one filter predicate every toy list goes through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Age window; a toy matches when its range intersects.
    pub age: Option<AgeRange>,
    /// Exact-match gender, when set.
    pub gender: Option<Gender>,
    /// Inclusive daily-price bounds.
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    /// Exact-match city override.
    pub city: Option<String>,
    /// Category membership; empty means any.
    pub categories: Vec<String>,
}

/// Does `toy` pass `filter`?  Pure; shared by every listing view.
pub fn matches_filter(toy: &Toy, filter: &FilterCriteria) -> bool {
    if let Some(age) = &filter.age {
        if !toy.age_range.overlaps(age) {
            return false;
        }
    }

    if let Some(gender) = filter.gender {
        if toy.gender != Some(gender) {
            return false;
        }
    }

    if let Some(min) = filter.min_price {
        if toy.price_per_day < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if toy.price_per_day > max {
            return false;
        }
    }

    if let Some(city) = &filter.city {
        if &toy.city != city {
            return false;
        }
    }

    if !filter.categories.is_empty() {
        let wanted = &filter.categories;
        let has_match = if toy.categories.is_empty() {
            wanted.iter().any(|c| c == FALLBACK_CATEGORY)
        } else {
            toy.categories.iter().any(|c| wanted.contains(c))
        };
        if !has_match {
            return false;
        }
    }

    true
}

/// Case-insensitive name search.
fn matches_search(toy: &Toy, term: &str) -> bool {
    term.is_empty() || toy.name.to_lowercase().contains(&term.to_lowercase())
}

/// The three home-screen buckets.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuckets {
    pub interested: Vec<Toy>,
    pub same_city: Vec<Toy>,
    pub other_cities: Vec<Toy>,
}

/// Partition one snapshot.  `toys` is expected newest-first, as the store
/// returns it.
pub fn build_catalog(
    toys: &[Toy],
    viewer_city: Option<&str>,
    search: &str,
    filter: &FilterCriteria,
) -> CatalogBuckets {
    let interested = match viewer_city {
        Some(city) => interested_bucket(toys, city),
        None => Vec::new(),
    };
    let interested_ids: HashSet<ToyId> = interested.iter().map(|t| t.id).collect();

    let mut same_city = Vec::new();
    let mut other_cities = Vec::new();

    for toy in toys {
        if !toy.is_available || !matches_search(toy, search) || !matches_filter(toy, filter) {
            continue;
        }

        match viewer_city {
            Some(city) if toy.city == city => {
                if !interested_ids.contains(&toy.id) {
                    same_city.push(toy.clone());
                }
            }
            _ => other_cities.push(toy.clone()),
        }
    }

    CatalogBuckets {
        interested,
        same_city,
        other_cities,
    }
}

/// Diversity sample: group the viewer's city by category, take the first
/// unseen toy per category in discovery order, stop at the cap.
fn interested_bucket(toys: &[Toy], city: &str) -> Vec<Toy> {
    let same_city: Vec<&Toy> = toys
        .iter()
        .filter(|t| t.is_available && t.city == city)
        .collect();

    // Category -> candidate toys, preserving the order categories are
    // first encountered in.
    let mut order: Vec<String> = Vec::new();
    let mut by_category: std::collections::HashMap<String, Vec<&Toy>> =
        std::collections::HashMap::new();

    for toy in &same_city {
        let categories: Vec<String> = if toy.categories.is_empty() {
            vec![FALLBACK_CATEGORY.to_string()]
        } else {
            toy.categories.clone()
        };
        for category in categories {
            if !by_category.contains_key(&category) {
                order.push(category.clone());
            }
            by_category.entry(category).or_default().push(toy);
        }
    }

    let mut result = Vec::new();
    let mut seen: HashSet<ToyId> = HashSet::new();

    for category in order {
        if let Some(candidates) = by_category.get(&category) {
            if let Some(toy) = candidates.iter().find(|t| !seen.contains(&t.id)) {
                seen.insert(toy.id);
                result.push((*toy).clone());
            }
        }
    }

    result.truncate(INTERESTED_BUCKET_CAP);
    result
}

/// View-local catalog state: the search box and the active filter.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    pub search: String,
    pub filter: FilterCriteria,
}

impl CatalogView {
    /// Recompute all three buckets from the latest store snapshot.
    ///
    /// The viewer's city comes from their profile; guests and users
    /// without one get everything in the other-cities bucket.
    pub fn snapshot(&self, state: &SharedState) -> Result<CatalogBuckets, StoreError> {
        let guard = lock(state);

        let viewer_city = guard
            .current_session()
            .and_then(|s| guard.database.get_user(&s.user_id).ok())
            .and_then(|profile| profile.city);

        let toys = guard.database.list_toys()?;

        Ok(build_catalog(
            &toys,
            viewer_city.as_deref(),
            &self.search,
            &self.filter,
        ))
    }
}
