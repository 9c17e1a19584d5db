// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal, food product and recipe models.
//!
//! Meal entries carry a nutrition snapshot taken when the entry was saved.
//! Editing a product later does not change past meals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Mul};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Energy and macronutrients. Used both for per-entry snapshots and for
/// aggregated totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct MacroTotals {
    #[serde(default)]
    pub kcal: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl MacroTotals {
    pub const ZERO: MacroTotals = MacroTotals {
        kcal: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    pub fn new(kcal: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            kcal,
            protein,
            carbs,
            fat,
        }
    }

    /// Copy with every value rounded to one decimal, for display only.
    pub fn rounded(&self) -> Self {
        let r = |v: f64| (v * 10.0).round() / 10.0;
        Self::new(r(self.kcal), r(self.protein), r(self.carbs), r(self.fat))
    }
}

impl Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, rhs: MacroTotals) -> MacroTotals {
        MacroTotals {
            kcal: self.kcal + rhs.kcal,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Mul<f64> for MacroTotals {
    type Output = MacroTotals;

    fn mul(self, factor: f64) -> MacroTotals {
        MacroTotals {
            kcal: self.kcal * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

impl Sum for MacroTotals {
    fn sum<I: Iterator<Item = MacroTotals>>(iter: I) -> Self {
        iter.fold(MacroTotals::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MacroTotals> for MacroTotals {
    fn sum<I: Iterator<Item = &'a MacroTotals>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// What a meal entry refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntrySource {
    /// A food product, measured in grams
    Product {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        food_product_id: Option<String>,
        #[serde(rename = "amount_gram")]
        grams: f64,
    },
    /// A recipe, measured in portions
    Recipe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipe_id: Option<String>,
        portions: f64,
    },
}

/// One product or recipe line within a logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub source: EntrySource,
    /// Nutrition snapshot at the time of entry
    #[serde(flatten)]
    pub nutrition: MacroTotals,
}

/// A logged meal with its entries and pre-aggregated totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: String,
    #[serde(rename = "log_date")]
    pub date: NaiveDate,
    pub name: Option<String>,
    pub time_slot: Option<String>,
    #[serde(default)]
    pub entries: Vec<MealEntry>,
    pub totals: MacroTotals,
}

/// Food product from the food database (or user-created).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProduct {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Owner, for user-created products
    #[serde(default)]
    pub user_id: Option<String>,
    pub kcal_per_100: f64,
    pub protein_per_100: f64,
    pub carbs_per_100: f64,
    pub fat_per_100: f64,
}

/// Recipe; `totals` is one full portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub totals: MacroTotals,
}

/// Body of `POST /api/food` (user-created product).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewFoodProduct {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    #[validate(range(min = 0.0, message = "Calories per 100 g cannot be negative"))]
    pub kcal_per_100: f64,
    #[validate(range(min = 0.0, message = "Protein per 100 g cannot be negative"))]
    pub protein_per_100: f64,
    #[validate(range(min = 0.0, message = "Carbs per 100 g cannot be negative"))]
    pub carbs_per_100: f64,
    #[validate(range(min = 0.0, message = "Fat per 100 g cannot be negative"))]
    pub fat_per_100: f64,
}

impl NewFoodProduct {
    /// Trim text fields; blank optional fields become `None`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.barcode = non_blank(self.barcode);
        self.brand = non_blank(self.brand);
        self
    }
}

/// One entry of a meal being created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NewMealEntry {
    Product {
        food_product_id: String,
        amount_gram: f64,
    },
    Recipe {
        recipe_id: String,
        portions: f64,
    },
}

/// Body of `POST /api/meals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMeal {
    pub log_date: NaiveDate,
    pub name: Option<String>,
    pub time_slot: Option<String>,
    pub entries: Vec<NewMealEntry>,
}

impl NewMeal {
    /// Trim text fields; blank optional fields become `None`.
    pub fn normalized(mut self) -> Self {
        self.name = non_blank(self.name);
        self.time_slot = non_blank(self.time_slot);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
