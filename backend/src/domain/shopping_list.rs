//! Shopping-list aggregation over the recipes in a user's cart.

use std::collections::BTreeMap;

/// File name offered for the downloaded list.
pub const SHOPPING_LIST_FILE_NAME: &str = "shopping_list.txt";

/// One ingredient line contributed by a carted recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub amount: u32,
    pub measurement_unit: String,
}

/// Consolidated list keyed and sorted by ingredient name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    entries: BTreeMap<String, ShoppingTotal>,
}

/// Summed amount for one ingredient name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingTotal {
    pub amount: u64,
    pub measurement_unit: String,
}

impl ShoppingList {
    /// Sum `items` per ingredient name.
    ///
    /// When the same name arrives with different units the amounts are still
    /// summed and the unit of the last item wins.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{ShoppingItem, ShoppingList};
    ///
    /// let item = |name: &str, amount, unit: &str| ShoppingItem {
    ///     name: name.to_owned(),
    ///     amount,
    ///     measurement_unit: unit.to_owned(),
    /// };
    /// let list = ShoppingList::aggregate([
    ///     item("flour", 200, "g"),
    ///     item("egg", 2, "pcs"),
    ///     item("flour", 100, "g"),
    /// ]);
    /// assert_eq!(list.render(), "egg - 2 pcs\nflour - 300 g\n");
    /// ```
    pub fn aggregate(items: impl IntoIterator<Item = ShoppingItem>) -> Self {
        let mut entries: BTreeMap<String, ShoppingTotal> = BTreeMap::new();
        for item in items {
            let total = entries.entry(item.name).or_insert_with(|| ShoppingTotal {
                amount: 0,
                measurement_unit: String::new(),
            });
            total.amount = total.amount.saturating_add(u64::from(item.amount));
            total.measurement_unit = item.measurement_unit;
        }
        Self { entries }
    }

    /// Totals in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ShoppingTotal)> {
        self.entries.iter().map(|(name, total)| (name.as_str(), total))
    }

    /// Whether the cart contributed no ingredients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text rendering: one `"{name} - {amount} {unit}"` line per entry.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, total)| {
                format!("{name} - {} {}\n", total.amount, total.measurement_unit)
            })
            .collect()
    }
}
