//! Backend parameters for `GET /api/properties`.

use super::{non_blank, FilterState, SortOrder, TransactionType};
use std::collections::BTreeMap;

/// Flat parameter map sent as the listing request's query string
pub type ApiParams = BTreeMap<String, String>;

/// "4+ BHK" becomes "5+", "N BHK" becomes "N".
pub fn bhk_api_value(label: &str) -> String {
    let count = label.trim().trim_end_matches("BHK").trim();
    if count == "4+" {
        return "5+".to_string();
    }
    count.to_string()
}

/// "buy" becomes "sale"; anything else passes through lower-cased.
pub fn transaction_api_value(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    if lower == "buy" {
        "sale".to_string()
    } else {
        lower
    }
}

/// "Corporate" becomes "builder"; anything else is lower-cased.
pub fn seller_type_api_value(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    if lower == "corporate" {
        "builder".to_string()
    } else {
        lower
    }
}

/// Builds the listing request parameters from the current filters.
///
/// ```
/// use listing_scout::filters::{ApiQueryBuilder, FilterState, TransactionType};
///
/// let params = ApiQueryBuilder::new(&FilterState::default())
///     .route_transaction(Some(TransactionType::Sale))
///     .limit(20)
///     .build();
/// assert_eq!(params["transactionType"], "sale");
/// assert!(!params.contains_key("category"));
/// ```
#[derive(Debug, Clone)]
pub struct ApiQueryBuilder<'a> {
    filters: &'a FilterState,
    route_transaction: Option<TransactionType>,
    sort: SortOrder,
    limit: Option<usize>,
    offset: usize,
}

impl<'a> ApiQueryBuilder<'a> {
    pub fn new(filters: &'a FilterState) -> Self {
        Self {
            filters,
            route_transaction: None,
            sort: SortOrder::Newest,
            limit: None,
            offset: 0,
        }
    }

    /// Transaction type implied by the route; overrides the selected ones
    pub fn route_transaction(mut self, transaction: Option<TransactionType>) -> Self {
        self.route_transaction = transaction;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Offset for a 1-based page of `page_size` rows
    pub fn page(self, page: u32, page_size: usize) -> Self {
        let offset = (page.max(1) as usize - 1) * page_size;
        self.limit(page_size).offset(offset)
    }

    pub fn build(&self) -> ApiParams {
        let filters = self.filters;
        let mut params = ApiParams::new();
        let mut put = |key: &str, value: String| {
            if !value.is_empty() {
                params.insert(key.to_string(), value);
            }
        };

        if let Some(category) = filters.category_slug() {
            put("category", category.trim().to_string());
        }
        put("subcategory", join(filters.subcategories.iter().cloned()));
        if !filters.price.is_default() {
            put("minPrice", filters.price.min.to_string());
            put("maxPrice", filters.price.max.to_string());
        }
        put("bedrooms", join(filters.bhk.iter().map(|bhk| bhk.api_value())));

        let transactions = match self.route_transaction {
            Some(transaction) => transaction.api_value(),
            None => join(filters.transaction_types.iter().map(|t| t.api_value())),
        };
        put("transactionType", transactions);

        put(
            "sellerType",
            join(filters.seller_types.iter().map(|s| s.api_value())),
        );
        put(
            "projectStage",
            join(filters.project_stages.iter().map(|s| s.slug().to_string())),
        );
        put(
            "propertyAge",
            join(filters.property_age.iter().map(|a| a.slug().to_string())),
        );
        if let Some(builder) = non_blank(&filters.builder) {
            put("builder", builder.trim().to_string());
        }
        if let Some(locality) = non_blank(&filters.locality) {
            put("locality", locality.trim().to_string());
        }
        if let Some(seller_id) = non_blank(&filters.seller_id) {
            put("sellerId", seller_id.trim().to_string());
        }
        if filters.featured_only {
            put("isFeatured", "true".to_string());
        }
        if self.sort != SortOrder::Newest {
            put("sort", self.sort.slug().to_string());
        }
        if let Some(limit) = self.limit {
            put("limit", limit.to_string());
            put("offset", self.offset.to_string());
        }

        params
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}
