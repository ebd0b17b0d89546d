// crates/core/src/catalog.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{BaristaError, BaristaResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub id: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Coffee,
    Dessert,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Coffee, Category::Dessert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Coffee => "coffee",
            Category::Dessert => "dessert",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = BaristaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coffee" => Ok(Category::Coffee),
            "dessert" => Ok(Category::Dessert),
            _ => Err(BaristaError::UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    coffee: Vec<MenuItem>,
    dessert: Vec<MenuItem>,
}

impl Catalog {
    pub fn new(coffee: Vec<MenuItem>, dessert: Vec<MenuItem>) -> BaristaResult<Self> {
        ensure_unique_ids(Category::Coffee, &coffee)?;
        ensure_unique_ids(Category::Dessert, &dessert)?;
        Ok(Self { coffee, dessert })
    }

    pub fn coffee_shop() -> Self {
        Self {
            coffee: vec![
                MenuItem::new("cappuccino", "cappuccino"),
                MenuItem::new("latte", "latte"),
                MenuItem::new("americano", "americano"),
            ],
            dessert: vec![
                MenuItem::new("cheesecake", "cheesecake"),
                MenuItem::new("brownie", "brownie"),
                MenuItem::new("apple pie", "apple-pie"),
            ],
        }
    }

    pub fn items(&self, category: Category) -> &[MenuItem] {
        match category {
            Category::Coffee => &self.coffee,
            Category::Dessert => &self.dessert,
        }
    }

    pub fn list_items(&self, category: &str) -> BaristaResult<&[MenuItem]> {
        let category = category.parse::<Category>()?;
        Ok(self.items(category))
    }

    pub fn build_match_pattern(&self, category: &str) -> BaristaResult<String> {
        let names = self
            .list_items(category)?
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>();
        Ok(names.join("|"))
    }
}

fn ensure_unique_ids(category: Category, items: &[MenuItem]) -> BaristaResult<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(BaristaError::DuplicateItem {
                category: category.to_string(),
                id: item.id.clone(),
            });
        }
    }
    Ok(())
}
