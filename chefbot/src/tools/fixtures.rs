//! Fixture-backed tools for the ChefBot demos.
//!
//! All data is hard-coded and in-memory; lookups are case-insensitive on the
//! key and return an `{"error": ...}` mapping for unknown keys instead of
//! failing.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::error::Result;
use crate::tools::Tool;

static FRIDGE: Lazy<Value> = Lazy::new(|| {
    json!([
        "oeufs",
        "lait",
        "fromage",
        "tomates",
        "poulet",
        "riz",
        "oignons",
        "huile d'olive"
    ])
});

static RECIPES: Lazy<Value> = Lazy::new(|| {
    json!({
        "omelette": {
            "ingredients": ["oeufs", "fromage", "huile d'olive", "sel", "poivre"],
            "steps": [
                "Beat the eggs in a bowl",
                "Heat the oil in a pan",
                "Pour in the beaten eggs",
                "Add the cheese",
                "Cook 3 to 4 minutes and serve"
            ],
            "prep_time_minutes": 10,
            "difficulty": "easy"
        },
        "riz au poulet": {
            "ingredients": ["riz", "poulet", "oignons", "huile d'olive", "sel"],
            "steps": [
                "Soften the onions in the oil",
                "Add the chicken and brown it",
                "Add the rice",
                "Add water and cook for 15 minutes"
            ],
            "prep_time_minutes": 30,
            "difficulty": "medium"
        }
    })
});

static DIETARY_DB: Lazy<Value> = Lazy::new(|| {
    json!({
        "oeufs": {
            "calories_per_100g": 155,
            "protein_g": 13,
            "fat_g": 11,
            "allergens": ["oeufs"]
        },
        "lait": {
            "calories_per_100ml": 42,
            "protein_g": 3.4,
            "fat_g": 1,
            "allergens": ["lactose"]
        },
        "fromage": {
            "calories_per_100g": 350,
            "protein_g": 25,
            "fat_g": 28,
            "allergens": ["lactose"]
        },
        "poulet": {
            "calories_per_100g": 165,
            "protein_g": 31,
            "fat_g": 3.6,
            "allergens": []
        }
    })
});

static MENU: Lazy<Value> = Lazy::new(|| {
    json!([
        { "name": "Omelette", "price": 15, "prep_time_minutes": 10, "allergens": ["oeufs"], "category": "breakfast" },
        { "name": "Salade César", "price": 12, "prep_time_minutes": 15, "allergens": ["lait", "poisson"], "category": "lunch" },
        { "name": "Pâtes Bolognaises", "price": 18, "prep_time_minutes": 30, "allergens": ["gluten"], "category": "dinner" },
        { "name": "Soupe de Légumes", "price": 10, "prep_time_minutes": 20, "allergens": [], "category": "starter" },
        { "name": "Tarte aux Pommes", "price": 8, "prep_time_minutes": 45, "allergens": ["gluten", "lait"], "category": "dessert" },
        { "name": "Smoothie aux Fruits", "price": 6, "prep_time_minutes": 5, "allergens": ["fruits"], "category": "drink" },
        { "name": "Quiche Lorraine", "price": 14, "prep_time_minutes": 25, "allergens": ["gluten", "lait", "oeufs"], "category": "lunch" },
        { "name": "Risotto aux Champignons", "price": 16, "prep_time_minutes": 25, "allergens": ["gluten", "lait"], "category": "dinner" },
        { "name": "Salade de Quinoa", "price": 12, "prep_time_minutes": 15, "allergens": [], "category": "starter" },
        { "name": "Crème Brûlée", "price": 9, "prep_time_minutes": 40, "allergens": ["lait", "oeufs"], "category": "dessert" }
    ])
});

/// Lists the ingredients currently in the fridge.
pub struct CheckFridge;

impl Tool for CheckFridge {
    fn name(&self) -> &str {
        "check_fridge"
    }

    fn description(&self) -> &str {
        "Returns the list of ingredients available in the fridge."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: &Value) -> Result<Value> {
        Ok(FRIDGE.clone())
    }
}

/// Recipe lookup by dish name.
pub struct GetRecipe;

impl Tool for GetRecipe {
    fn name(&self) -> &str {
        "get_recipe"
    }

    fn description(&self) -> &str {
        "Returns a detailed recipe for a given dish."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dish_name": {
                    "type": "string",
                    "description": "Name of the dish to look up"
                }
            },
            "required": ["dish_name"]
        })
    }

    fn call(&self, args: &Value) -> Result<Value> {
        let dish = args["dish_name"].as_str().unwrap_or_default();
        Ok(RECIPES
            .get(dish.to_lowercase())
            .cloned()
            .unwrap_or_else(|| json!({ "error": format!("no recipe found for '{}'", dish) })))
    }
}

/// Nutrition and allergen lookup by ingredient.
pub struct CheckDietaryInfo;

impl Tool for CheckDietaryInfo {
    fn name(&self) -> &str {
        "check_dietary_info"
    }

    fn description(&self) -> &str {
        "Returns nutritional and allergen information for an ingredient."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ingredient": {
                    "type": "string",
                    "description": "Name of the ingredient"
                }
            },
            "required": ["ingredient"]
        })
    }

    fn call(&self, args: &Value) -> Result<Value> {
        let ingredient = args["ingredient"].as_str().unwrap_or_default();
        Ok(DIETARY_DB
            .get(ingredient.to_lowercase())
            .cloned()
            .unwrap_or_else(|| {
                json!({ "error": format!("no dietary information found for '{}'", ingredient) })
            }))
    }
}

/// Restaurant menu database with optional filters.
pub struct MenuLookup;

impl Tool for MenuLookup {
    fn name(&self) -> &str {
        "menu_lookup"
    }

    fn description(&self) -> &str {
        "Looks up menu items, optionally filtered by category, maximum price \
         or an allergen to exclude. Returns the matching items with price and \
         preparation time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Menu category (breakfast, lunch, dinner, starter, dessert, drink)"
                },
                "max_price": {
                    "type": "number",
                    "description": "Only items at or below this price"
                },
                "exclude_allergen": {
                    "type": "string",
                    "description": "Only items free of this allergen"
                }
            }
        })
    }

    fn call(&self, args: &Value) -> Result<Value> {
        let category = args["category"].as_str();
        let max_price = args["max_price"].as_f64();
        let exclude_allergen = args["exclude_allergen"].as_str();

        let items: Vec<Value> = MENU
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|item| {
                category.map_or(true, |c| item["category"] == c)
                    && max_price.map_or(true, |p| {
                        item["price"].as_f64().unwrap_or(f64::MAX) <= p
                    })
                    && exclude_allergen.map_or(true, |a| {
                        !item["allergens"]
                            .as_array()
                            .map(|list| list.iter().any(|v| v == a))
                            .unwrap_or(false)
                    })
            })
            .collect();

        Ok(Value::Array(items))
    }
}
