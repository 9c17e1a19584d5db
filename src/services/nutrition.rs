// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily nutrition figures derived from fetched meals.
//!
//! Nothing here is cached between calls: totals are recomputed from the
//! meal list whenever the list (or the selected day) changes. Values are
//! summed at full precision and only rounded by the caller for display.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{FoodProduct, MacroTotals, MealRecord, Recipe};

/// Sum the per-meal totals of one day's meals.
///
/// An empty slice yields all zeros.
pub fn aggregate_day(meals: &[MealRecord]) -> MacroTotals {
    meals.iter().map(|m| &m.totals).sum()
}

/// Calories left for the day, never negative.
///
/// `remaining = max(0, goal - consumed + burned)`. Overage is not modeled,
/// so anything below zero is shown as zero.
pub fn remaining_calories(consumed_kcal: f64, goal_kcal: f64, burned_kcal: f64) -> f64 {
    (goal_kcal - consumed_kcal + burned_kcal).max(0.0)
}

/// Nutrition of `grams` of a product. Product values are per 100 g.
pub fn scale_product(product: &FoodProduct, grams: f64) -> MacroTotals {
    let scale = |per_100: f64| per_100 * grams / 100.0;
    MacroTotals::new(
        scale(product.kcal_per_100),
        scale(product.protein_per_100),
        scale(product.carbs_per_100),
        scale(product.fat_per_100),
    )
}

/// Nutrition of `portions` of a recipe. Recipe totals are one portion.
pub fn scale_recipe(recipe: &Recipe, portions: f64) -> MacroTotals {
    recipe.totals * portions
}

/// Everything the nutrition view shows for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct DaySummary {
    pub totals: MacroTotals,
    pub goal_kcal: f64,
    pub burned_kcal: f64,
    pub remaining_kcal: f64,
    pub meal_count: usize,
}

impl DaySummary {
    /// Build the summary for one day.
    ///
    /// `burned_kcal` is 0 unless an activity integration supplies an estimate.
    pub fn compute(meals: &[MealRecord], goal_kcal: f64, burned_kcal: f64) -> Self {
        let totals = aggregate_day(meals);
        Self {
            totals,
            goal_kcal,
            burned_kcal,
            remaining_kcal: remaining_calories(totals.kcal, goal_kcal, burned_kcal),
            meal_count: meals.len(),
        }
    }
}

/// Running preview of a meal that is being composed but not yet saved.
#[derive(Debug, Clone, Default)]
pub struct MealDraft {
    products: Vec<(FoodProduct, f64)>,
    recipes: Vec<(Recipe, f64)>,
}

impl MealDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: FoodProduct, grams: f64) {
        self.products.push((product, grams));
    }

    pub fn add_recipe(&mut self, recipe: Recipe, portions: f64) {
        self.recipes.push((recipe, portions));
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.recipes.is_empty()
    }

    /// Totals the meal would have if saved now.
    pub fn totals(&self) -> MacroTotals {
        let products = self.products.iter().map(|(p, g)| scale_product(p, *g));
        let recipes = self.recipes.iter().map(|(r, n)| scale_recipe(r, *n));
        products.chain(recipes).sum()
    }

    /// Entries in the shape `POST /api/meals` expects.
    pub fn entries(&self) -> Vec<crate::models::NewMealEntry> {
        use crate::models::NewMealEntry;

        let products = self.products.iter().map(|(p, g)| NewMealEntry::Product {
            food_product_id: p.id.clone(),
            amount_gram: *g,
        });
        let recipes = self.recipes.iter().map(|(r, n)| NewMealEntry::Recipe {
            recipe_id: r.id.clone(),
            portions: *n,
        });
        products.chain(recipes).collect()
    }
}
