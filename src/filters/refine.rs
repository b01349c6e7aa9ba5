//! Residual filtering of fetched listings; the backend may ignore some filters.

use super::{
    non_blank, normalize_slug, DynamicFilterValue, FilterState, ProjectStage, PropertyAge,
    SortOrder, TransactionType,
};
use crate::models::Property;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Keep the properties that satisfy `filters`, then order them by `sort`.
/// The route's transaction type wins over the selected ones.
pub fn refine(
    properties: Vec<Property>,
    filters: &FilterState,
    route_transaction: Option<TransactionType>,
    sort: SortOrder,
) -> Vec<Property> {
    let fetched = properties.len();
    let transactions: BTreeSet<TransactionType> = match route_transaction {
        Some(transaction) => [transaction].into(),
        None => filters.transaction_types.clone(),
    };

    let mut kept: Vec<Property> = properties
        .into_iter()
        .filter(|property| matches(property, filters, &transactions))
        .collect();

    debug!(fetched, kept = kept.len(), ?sort, "refined listings");
    sort_properties(&mut kept, sort);
    kept
}

/// Stable sort; `Newest` keeps the fetch order.
pub fn sort_properties(properties: &mut [Property], sort: SortOrder) {
    match sort {
        SortOrder::Newest => {}
        SortOrder::PriceLow => properties.sort_by_key(|p| p.price),
        SortOrder::PriceHigh => properties.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Featured => properties.sort_by_key(|p| !p.is_featured),
    }
}

fn matches(
    property: &Property,
    filters: &FilterState,
    transactions: &BTreeSet<TransactionType>,
) -> bool {
    if filters.featured_only && !property.is_featured {
        return false;
    }

    if let Some(seller_id) = non_blank(&filters.seller_id) {
        if property.seller_id.as_deref().map(str::trim) != Some(seller_id.trim()) {
            return false;
        }
    }

    if let Some(category) = filters.category_slug() {
        let wanted = category_key(category);
        let found = [&property.category, &property.property_type]
            .into_iter()
            .flatten()
            .any(|value| category_key(value) == wanted);
        if !found {
            return false;
        }
    }

    if !filters.subcategories.is_empty() {
        let found = property.subcategory.as_deref().map_or(false, |sub| {
            let key = category_key(sub);
            filters
                .subcategories
                .iter()
                .any(|wanted| category_key(wanted) == key)
        });
        if !found {
            return false;
        }
    }

    if !transactions.is_empty() {
        let found = property
            .transaction_type
            .as_deref()
            .and_then(|raw| raw.parse::<TransactionType>().ok())
            .map_or(false, |transaction| transactions.contains(&transaction));
        if !found {
            return false;
        }
    }

    if !filters.price.is_default() && !filters.price.contains(property.price) {
        return false;
    }

    if !filters.bhk.is_empty() {
        let found = property
            .bedrooms
            .map_or(false, |bedrooms| filters.bhk.iter().any(|bhk| bhk.matches(bedrooms)));
        if !found {
            return false;
        }
    }

    if !filters.seller_types.is_empty() {
        let found = property.seller_type.as_deref().map_or(false, |raw| {
            filters.seller_types.iter().any(|seller| seller.matches(raw))
        });
        if !found {
            return false;
        }
    }

    if !filters.project_stages.is_empty() {
        let found = property
            .project_stage
            .as_deref()
            .and_then(|raw| raw.parse::<ProjectStage>().ok())
            .map_or(false, |stage| filters.project_stages.contains(&stage));
        if !found {
            return false;
        }
    }

    if let Some(locality) = non_blank(&filters.locality) {
        let needle = locality.trim().to_lowercase();
        if !property
            .location_fields()
            .any(|field| field.to_lowercase().contains(&needle))
        {
            return false;
        }
    }

    if !filters.property_age.is_empty() {
        let bucket = PropertyAge::classify(property.age_of_property.as_deref());
        if !filters.property_age.contains(&bucket) {
            return false;
        }
    }

    filters
        .dynamic
        .iter()
        .all(|(key, value)| matches_dynamic(property, key, value))
}

/// Slug with a single trailing "s" removed, so "villas" matches "villa"
fn category_key(raw: &str) -> String {
    let mut slug = normalize_slug(raw);
    if slug.len() > 1 && slug.ends_with('s') {
        slug.pop();
    }
    slug
}

fn matches_dynamic(property: &Property, key: &str, filter: &DynamicFilterValue) -> bool {
    if filter.is_empty() {
        return true;
    }

    if let DynamicFilterValue::Text(bound) = filter {
        if let Some(field) = key.strip_suffix("_min") {
            return compare_bound(property, field, bound, |value, bound| value >= bound);
        }
        if let Some(field) = key.strip_suffix("_max") {
            return compare_bound(property, field, bound, |value, bound| value <= bound);
        }
    }

    let Some(field) = property.custom_fields.get(key) else {
        return false;
    };
    let values = field_texts(field);

    match filter {
        DynamicFilterValue::Set(wanted) => values
            .iter()
            .any(|value| wanted.iter().any(|w| w.eq_ignore_ascii_case(value))),
        DynamicFilterValue::Text(needle) => {
            let needle = needle.trim().to_lowercase();
            values
                .iter()
                .any(|value| value.to_lowercase().contains(&needle))
        }
    }
}

fn compare_bound(
    property: &Property,
    field: &str,
    bound: &str,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    // not a number: filters nothing
    let Ok(bound) = bound.trim().parse::<f64>() else {
        return true;
    };

    property
        .custom_fields
        .get(field)
        .and_then(field_number)
        .map_or(false, |value| cmp(value, bound))
}

fn field_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_texts(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Array(items) => items.iter().flat_map(field_texts).collect(),
        _ => Vec::new(),
    }
}
