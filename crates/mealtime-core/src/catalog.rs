//! Static content catalog.
//!
//! A lookup table mapping (temperature band, time-of-day period) to
//! candidate suggestions. Every band x period cell must be non-empty; this
//! is checked once at startup via [`Catalog::validate`] and treated as
//! fatal, so the selector never has to handle an empty cell at runtime.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::{TempBand, TimePeriod};
use crate::error::{CatalogError, ValidationError};

/// Kind of food a catalog entry represents. Doubles as the user preference
/// filter for the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodCategory {
    #[serde(rename = "quick bite")]
    QuickBite,
    #[serde(rename = "full meal")]
    FullMeal,
    #[serde(rename = "dessert")]
    Dessert,
    #[serde(rename = "starter")]
    Starter,
    #[serde(rename = "drink")]
    Drink,
    #[serde(rename = "side")]
    Side,
}

impl FoodCategory {
    pub const NAMES: [&'static str; 6] = [
        "quick bite",
        "full meal",
        "dessert",
        "starter",
        "drink",
        "side",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::QuickBite => "quick bite",
            FoodCategory::FullMeal => "full meal",
            FoodCategory::Dessert => "dessert",
            FoodCategory::Starter => "starter",
            FoodCategory::Drink => "drink",
            FoodCategory::Side => "side",
        }
    }

    /// Parse a user-supplied category name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "quick bite" => Ok(FoodCategory::QuickBite),
            "full meal" => Ok(FoodCategory::FullMeal),
            "dessert" => Ok(FoodCategory::Dessert),
            "starter" => Ok(FoodCategory::Starter),
            "drink" => Ok(FoodCategory::Drink),
            "side" => Ok(FoodCategory::Side),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate suggestion in a catalog cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    /// Rough preparation/consumption estimate in minutes.
    pub duration_min: u64,
    pub category: FoodCategory,
}

/// The full (band, period) -> entries table.
#[derive(Debug, Clone)]
pub struct Catalog {
    cells: HashMap<(TempBand, TimePeriod), Vec<CatalogEntry>>,
}

fn entry(label: &str, duration_min: u64, category: FoodCategory) -> CatalogEntry {
    CatalogEntry {
        label: label.to_string(),
        duration_min,
        category,
    }
}

impl Catalog {
    /// The built-in suggestion table: five entries per cell.
    pub fn builtin() -> Self {
        use FoodCategory::*;
        use TempBand::*;
        use TimePeriod::*;

        let mut cells = HashMap::new();

        cells.insert(
            (Hot, Morning),
            vec![
                entry("Chilled Fruit Bowl - Start your day cool", 30, QuickBite),
                entry("Yogurt Parfait - Light and refreshing", 35, QuickBite),
                entry("Cold Brew Coffee - Smooth and energizing", 25, Drink),
                entry("Overnight Oats - Cool and nutritious", 40, FullMeal),
                entry("Fruit Smoothie - Icy and rejuvenating", 30, Drink),
            ],
        );
        cells.insert(
            (Hot, Afternoon),
            vec![
                entry("Cucumber Sandwich - Light and fresh", 35, QuickBite),
                entry("Watermelon Salad - Summer on a plate", 45, Starter),
                entry("Chilled Gazpacho - Spanish cool classic", 50, Starter),
                entry("Greek Salad - Mediterranean freshness", 55, FullMeal),
                entry("Iced Green Tea - Antioxidant cooler", 20, Drink),
            ],
        );
        cells.insert(
            (Hot, Evening),
            vec![
                entry(
                    "Refreshing Chilled Mango Delight - A tropical escape!",
                    40,
                    Dessert,
                ),
                entry("Creamy Ice Cream Sundae - Your sweet cool-down", 60, Dessert),
                entry("Frozen Yogurt - Guilt-free chill scoop", 55, Dessert),
                entry("Watermelon Sorbet - Nature's cool refreshment", 45, Dessert),
                entry("Mint Lemonade - Zesty citrus cooler", 30, Drink),
            ],
        );

        cells.insert(
            (Cold, Morning),
            vec![
                entry("Hot Oatmeal - Warming start to day", 40, FullMeal),
                entry("Masala Chai - Spiced warmth in a cup", 30, Drink),
                entry("Poha - Light Indian breakfast", 45, FullMeal),
                entry("Scrambled Eggs - Protein-rich start", 40, FullMeal),
                entry("Cinnamon Toast - Sweet morning comfort", 35, QuickBite),
            ],
        );
        cells.insert(
            (Cold, Afternoon),
            vec![
                entry("Tomato Soup - Simple warming classic", 45, Starter),
                entry("Grilled Cheese Sandwich - Melty comfort", 40, QuickBite),
                entry("Hot Noodle Bowl - Asian comfort food", 60, FullMeal),
                entry("Baked Potatoes - Hearty and filling", 50, Side),
                entry("Hot Chocolate - Rich and warming", 30, Drink),
            ],
        );
        cells.insert(
            (Cold, Evening),
            vec![
                entry("Spicy Chicken Biryani - Hot and flavorful!", 120, FullMeal),
                entry("Masala Dosa with Chutney - Crisp and spicy", 40, QuickBite),
                entry("Hot Chocolate - Perfect for the cold weather", 60, Drink),
                entry("Ginger Soup - Warming and aromatic", 55, Starter),
                entry("Buttery Garlic Bread - Toasty comfort food", 35, QuickBite),
            ],
        );

        cells.insert(
            (Moderate, Morning),
            vec![
                entry("Avocado Toast - Trendy breakfast choice", 40, QuickBite),
                entry("Fruit and Granola - Balanced breakfast", 35, QuickBite),
                entry("Vegetable Omelette - Protein-packed start", 45, FullMeal),
                entry("Banana Pancakes - Sweet morning treat", 50, FullMeal),
                entry("Green Smoothie - Nutritious energy booster", 30, Drink),
            ],
        );
        cells.insert(
            (Moderate, Afternoon),
            vec![
                entry("Caesar Salad - Classic lunch option", 50, FullMeal),
                entry("Vegetable Wrap - Portable and healthy", 45, FullMeal),
                entry("Mushroom Pasta - Savory and satisfying", 60, FullMeal),
                entry("Lentil Soup - Protein-rich comfort", 50, Starter),
                entry("Iced Tea - Refreshing afternoon sip", 25, Drink),
            ],
        );
        cells.insert(
            (Moderate, Evening),
            vec![
                entry("Aromatic Veg Pulao - Fragrant and wholesome", 70, FullMeal),
                entry("Chapati with Veg Kurma - Comfort food", 60, FullMeal),
                entry("Veg Soup - Healthy and hearty", 50, Starter),
                entry("Garden Salad - Fresh and nutritious", 45, Starter),
                entry("Pasta Primavera - Italian classic", 80, FullMeal),
            ],
        );

        Self { cells }
    }

    /// Entries for one (band, period) cell. Empty slice for a missing cell;
    /// `validate` guarantees that never happens for the built-in table.
    pub fn cell(&self, band: TempBand, period: TimePeriod) -> &[CatalogEntry] {
        self.cells
            .get(&(band, period))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check that every band x period combination has at least one entry.
    ///
    /// # Errors
    /// Returns the first empty cell found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for band in [TempBand::Hot, TempBand::Cold, TempBand::Moderate] {
            for period in TimePeriod::ALL {
                if self.cell(band, period).is_empty() {
                    return Err(CatalogError::EmptyCell { band, period });
                }
            }
        }
        Ok(())
    }

    /// Recover the category of a historical label. Labels that no longer
    /// exist in the catalog fall back to `QuickBite`.
    pub fn category_of(&self, label: &str) -> FoodCategory {
        self.cells
            .values()
            .flatten()
            .find(|e| e.label == label)
            .map(|e| e.category)
            .unwrap_or(FoodCategory::QuickBite)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_complete() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn every_cell_has_five_entries() {
        let catalog = Catalog::builtin();
        for band in [TempBand::Hot, TempBand::Cold, TempBand::Moderate] {
            for period in TimePeriod::ALL {
                assert_eq!(catalog.cell(band, period).len(), 5, "{band}/{period}");
            }
        }
    }

    #[test]
    fn validate_catches_empty_cell() {
        let mut catalog = Catalog::builtin();
        catalog.cells.remove(&(TempBand::Hot, TimePeriod::Evening));
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::EmptyCell {
                band: TempBand::Hot,
                period: TimePeriod::Evening,
            })
        ));
    }

    #[test]
    fn category_parse_roundtrip() {
        for name in FoodCategory::NAMES {
            let cat = FoodCategory::parse(name).unwrap();
            assert_eq!(cat.as_str(), name);
        }
        assert!(FoodCategory::parse("banquet").is_err());
    }

    #[test]
    fn category_of_known_and_unknown_labels() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.category_of("Mint Lemonade - Zesty citrus cooler"),
            FoodCategory::Drink
        );
        assert_eq!(
            catalog.category_of("no such dish"),
            FoodCategory::QuickBite
        );
    }
}
