//! Query-string codec for the listings page.
//!
//! Decoding never fails: malformed or unknown values fall back to defaults.
//! Encoding omits every default.

use super::{
    is_all_categories, non_blank, Bhk, DynamicFilterValue, FilterState, PriceRange, ProjectStage,
    PropertyAge, SellerType, SortOrder, TransactionType, DEFAULT_MAX_PRICE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use tracing::debug;
use url::form_urlencoded;

pub const CATEGORY: &str = "category";
pub const SUBCATEGORIES: &str = "subcategories";
pub const MIN_PRICE: &str = "minPrice";
pub const MAX_PRICE: &str = "maxPrice";
pub const BHK: &str = "bhk";
pub const TRANSACTION_TYPES: &str = "transactionTypes";
pub const SELLER_TYPES: &str = "sellerTypes";
pub const PROPERTY_AGE: &str = "propertyAge";
pub const PROJECT_STAGES: &str = "projectStages";
pub const BUILDER: &str = "builder";
pub const LOCALITY: &str = "locality";
pub const DYNAMIC_FILTERS: &str = "dynamicFilters";
pub const SELLER_ID: &str = "sellerId";
pub const FEATURED: &str = "featured";
pub const SORT: &str = "sort";
pub const PAGE: &str = "page";

/// Everything the listings page reads from its query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub filters: FilterState,
    /// 1-based page number
    pub page: u32,
    pub sort: SortOrder,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
            sort: SortOrder::default(),
        }
    }
}

impl ListingQuery {
    /// Parse a raw query string, with or without the leading `?`
    pub fn decode(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let get = |key: &str| param(&params, key);

        let mut filters = FilterState::default();

        filters.category = get(CATEGORY)
            .filter(|category| !is_all_categories(category))
            .map(str::to_string);
        filters.subcategories = get(SUBCATEGORIES)
            .map(|raw| {
                raw.split(',')
                    .filter(|sub| !sub.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        filters.price = PriceRange::new(
            get(MIN_PRICE).and_then(parse_price).unwrap_or(0),
            get(MAX_PRICE)
                .and_then(parse_price)
                .unwrap_or(DEFAULT_MAX_PRICE),
        );

        filters.bhk = parse_set::<Bhk>(get(BHK));
        filters.transaction_types = parse_set::<TransactionType>(get(TRANSACTION_TYPES));
        filters.seller_types = parse_set::<SellerType>(get(SELLER_TYPES));
        filters.property_age = parse_set::<PropertyAge>(get(PROPERTY_AGE));
        filters.project_stages = parse_set::<ProjectStage>(get(PROJECT_STAGES));

        filters.builder = get(BUILDER).map(str::to_string);
        filters.locality = get(LOCALITY).map(str::to_string);
        filters.dynamic = get(DYNAMIC_FILTERS)
            .map(parse_dynamic_filters)
            .unwrap_or_default();
        filters.seller_id = get(SELLER_ID).map(str::to_string);
        filters.featured_only = matches!(get(FEATURED).map(str::trim), Some("true") | Some("1"));

        let page = get(PAGE)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        let sort = get(SORT)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        Self {
            filters,
            page,
            sort,
        }
    }

    /// Canonical query string without the leading `?`
    pub fn encode(&self) -> String {
        let filters = &self.filters;
        let mut out = form_urlencoded::Serializer::new(String::new());

        if let Some(category) = filters.category_slug() {
            out.append_pair(CATEGORY, category);
        }
        append_list(
            &mut out,
            SUBCATEGORIES,
            filters
                .subcategories
                .iter()
                .filter(|sub| !sub.trim().is_empty())
                .cloned(),
        );
        if !filters.price.is_default() {
            out.append_pair(MIN_PRICE, &filters.price.min.to_string());
            out.append_pair(MAX_PRICE, &filters.price.max.to_string());
        }
        append_list(&mut out, BHK, filters.bhk.iter().map(Bhk::to_string));
        append_list(
            &mut out,
            TRANSACTION_TYPES,
            filters.transaction_types.iter().map(|t| t.label().to_string()),
        );
        append_list(
            &mut out,
            SELLER_TYPES,
            filters.seller_types.iter().map(|s| s.label().to_string()),
        );
        append_list(
            &mut out,
            PROPERTY_AGE,
            filters.property_age.iter().map(|a| a.slug().to_string()),
        );
        append_list(
            &mut out,
            PROJECT_STAGES,
            filters.project_stages.iter().map(|s| s.slug().to_string()),
        );
        if let Some(builder) = non_blank(&filters.builder) {
            out.append_pair(BUILDER, builder);
        }
        if let Some(locality) = non_blank(&filters.locality) {
            out.append_pair(LOCALITY, locality);
        }
        if !filters.dynamic.is_empty() {
            if let Ok(json) = serde_json::to_string(&filters.dynamic) {
                out.append_pair(DYNAMIC_FILTERS, &json);
            }
        }
        if let Some(seller_id) = non_blank(&filters.seller_id) {
            out.append_pair(SELLER_ID, seller_id);
        }
        if filters.featured_only {
            out.append_pair(FEATURED, "true");
        }
        if self.sort != SortOrder::Newest {
            out.append_pair(SORT, self.sort.slug());
        }
        if self.page > 1 {
            out.append_pair(PAGE, &self.page.to_string());
        }

        out.finish()
    }

    /// Apply an edit; changing filters or sort goes back to page 1
    pub fn update(&self, edit: impl FnOnce(&mut ListingQuery)) -> ListingQuery {
        let mut next = self.clone();
        edit(&mut next);
        next.filters.normalize();
        if next.filters != self.filters || next.sort != self.sort {
            next.page = 1;
        }
        next.page = next.page.max(1);
        next
    }
}

/// Decode `query`, apply `edit` and encode the result
pub fn update_query(query: &str, edit: impl FnOnce(&mut ListingQuery)) -> String {
    let encoded = ListingQuery::decode(query).update(edit).encode();
    debug!(query = %encoded, "listing query updated");
    encoded
}

// Values are kept as written so that encode and decode agree; only blank
// values count as absent.
fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_set<T: FromStr + Ord>(raw: Option<&str>) -> BTreeSet<T> {
    raw.map(|raw| split_list(raw).filter_map(|item| item.parse().ok()).collect())
        .unwrap_or_default()
}

fn parse_price(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn append_list(
    out: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    items: impl Iterator<Item = String>,
) {
    let joined = items.collect::<Vec<_>>().join(",");
    if !joined.is_empty() {
        out.append_pair(key, &joined);
    }
}

/// Anything other than a JSON object yields no filters
pub fn parse_dynamic_filters(raw: &str) -> BTreeMap<String, DynamicFilterValue> {
    let object = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            debug!("ignoring malformed dynamicFilters");
            return BTreeMap::new();
        }
    };

    // blank keys and members are kept; refinement ignores empty filters
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::Array(items) => {
                    DynamicFilterValue::Set(items.iter().filter_map(scalar_text).collect())
                }
                other => DynamicFilterValue::Text(scalar_text(&other)?),
            };
            Some((key, value))
        })
        .collect()
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
