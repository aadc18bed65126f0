//! Suggestion selection with fallback tiers.
//!
//! Given a catalog cell and the labels recently sent to a (user, period),
//! pick one entry. Exclusion narrows first, then the category preference,
//! then the whole cell -- the selector only comes up empty if the cell
//! itself is empty, which catalog validation rules out at startup.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, CatalogEntry, FoodCategory};
use crate::classify::{TempBand, TimePeriod};

/// Pick one catalog entry for (band, period).
///
/// Tiers, first non-empty wins:
/// 1. entries not in `excluded` that match `category` (when given);
/// 2. entries matching `category`, exclusion ignored -- used when every
///    candidate was recently shown;
/// 3. the whole cell, unfiltered.
///
/// Selection within a tier is uniform-random; entries carry no weight.
/// Returns `None` only for an empty cell.
pub fn select<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    band: TempBand,
    period: TimePeriod,
    excluded: &HashSet<String>,
    category: Option<FoodCategory>,
    rng: &mut R,
) -> Option<&'a CatalogEntry> {
    let cell = catalog.cell(band, period);

    let matches_category = |e: &&CatalogEntry| -> bool {
        category.is_none() || category == Some(e.category)
    };

    let fresh: Vec<&CatalogEntry> = cell
        .iter()
        .filter(|e| !excluded.contains(&e.label) && matches_category(e))
        .collect();
    if let Some(entry) = fresh.choose(rng) {
        return Some(*entry);
    }

    let same_category: Vec<&CatalogEntry> =
        cell.iter().filter(|e| matches_category(e)).collect();
    if let Some(entry) = same_category.choose(rng) {
        return Some(*entry);
    }

    let any: Vec<&CatalogEntry> = cell.iter().collect();
    any.choose(rng).copied()
}
