//! In-memory drink menu

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// One component of a drink's recipe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// A drink on the menu
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Drink {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public view of a drink: colors and proportions, no ingredient names
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    id: u64,
    title: &'a str,
    recipe: Vec<ShortIngredient<'a>>,
}

#[derive(Debug, Serialize)]
struct ShortIngredient<'a> {
    color: &'a str,
    parts: u32,
}

/// Detailed view of a drink, including ingredient names
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    id: u64,
    title: &'a str,
    recipe: &'a [Ingredient],
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    color: &i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }
}

/// Fields accepted when creating or updating a drink
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DrinkChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<Vec<Ingredient>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("drink {0} not found")]
    NotFound(u64),

    #[error("a drink needs both a title and a recipe")]
    Incomplete,

    #[error("a drink titled {0:?} already exists")]
    DuplicateTitle(String),
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    drinks: BTreeMap<u64, Drink>,
}

/// Shared handle to the menu
#[derive(Clone, Debug, Default)]
pub struct Menu {
    inner: Arc<RwLock<Inner>>,
}

impl Menu {
    /// A menu holding a single glass of water
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        inner.insert(
            "water".to_owned(),
            vec![Ingredient {
                name: "water".to_owned(),
                color: "blue".to_owned(),
                parts: 1,
            }],
        );

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub async fn all(&self) -> Vec<Drink> {
        self.inner.read().await.drinks.values().cloned().collect()
    }

    pub async fn create(&self, changes: DrinkChanges) -> Result<Drink, MenuError> {
        let (Some(title), Some(recipe)) = (changes.title, changes.recipe) else {
            return Err(MenuError::Incomplete);
        };

        let mut inner = self.inner.write().await;
        inner.ensure_unique(&title, None)?;
        Ok(inner.insert(title, recipe))
    }

    /// Applies whichever of `title` and `recipe` are present
    pub async fn update(&self, id: u64, changes: DrinkChanges) -> Result<Drink, MenuError> {
        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&id) {
            return Err(MenuError::NotFound(id));
        }

        if changes.title.is_none() && changes.recipe.is_none() {
            return Err(MenuError::Incomplete);
        }

        if let Some(title) = &changes.title {
            inner.ensure_unique(title, Some(id))?;
        }

        let drink = inner
            .drinks
            .get_mut(&id)
            .ok_or(MenuError::NotFound(id))?;

        if let Some(title) = changes.title {
            drink.title = title;
        }

        if let Some(recipe) = changes.recipe {
            drink.recipe = recipe;
        }

        Ok(drink.clone())
    }

    pub async fn delete(&self, id: u64) -> Result<(), MenuError> {
        self.inner
            .write()
            .await
            .drinks
            .remove(&id)
            .map(drop)
            .ok_or(MenuError::NotFound(id))
    }
}

impl Inner {
    fn insert(&mut self, title: String, recipe: Vec<Ingredient>) -> Drink {
        self.next_id += 1;
        let drink = Drink {
            id: self.next_id,
            title,
            recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        drink
    }

    fn ensure_unique(&self, title: &str, except: Option<u64>) -> Result<(), MenuError> {
        let taken = self
            .drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except);

        if taken {
            Err(MenuError::DuplicateTitle(title.to_owned()))
        } else {
            Ok(())
        }
    }
}
