//! Listing filters and everything that is derived from them.
//!
//! [`FilterState`] is never stored on its own: it is decoded from the query
//! string on every render ([`url`]), turned into backend parameters ([`api`]),
//! re-applied to the fetched rows ([`refine`]) and paged ([`paginate`]).

pub mod api;
pub mod paginate;
pub mod refine;
pub mod route;
pub mod url;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub use api::ApiQueryBuilder;
pub use paginate::{paginate, Paginated, PAGE_SIZE};
pub use refine::{refine, sort_properties};
pub use route::route_transaction_type;
pub use self::url::ListingQuery;

/// Upper bound of the price slider, in currency units
pub const DEFAULT_MAX_PRICE: u64 = 100_000_000;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Inclusive price range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

impl PriceRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// True when the range covers the full slider, i.e. filters nothing
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= 0 && (self.min..=self.max).contains(&(price as u64))
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

/// Deal type of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Sale,
    Rent,
    Lease,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Rent => "Rent",
            Self::Lease => "Lease",
        }
    }

    pub fn api_value(&self) -> String {
        api::transaction_api_value(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "buy" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            "lease" => Ok(Self::Lease),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Construction stage of a project listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectStage {
    NewLaunch,
    UnderConstruction,
    ReadyToMove,
}

impl ProjectStage {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::NewLaunch => "new-launch",
            Self::UnderConstruction => "under-construction",
            Self::ReadyToMove => "ready-to-move",
        }
    }
}

impl FromStr for ProjectStage {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_slug(s).as_str() {
            "new-launch" => Ok(Self::NewLaunch),
            "under-construction" => Ok(Self::UnderConstruction),
            "ready-to-move" => Ok(Self::ReadyToMove),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Property age bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyAge {
    New,
    OneToFive,
    FivePlus,
}

impl PropertyAge {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::OneToFive => "1-5",
            Self::FivePlus => "5+",
        }
    }

    /// Bucket for a raw `ageOfProperty` value.
    ///
    /// Missing, unparsable and zero ages all count as new construction.
    pub fn classify(age: Option<&str>) -> Self {
        let years = age
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|years| years.is_finite())
            .unwrap_or(0.0);

        if years <= 0.0 {
            Self::New
        } else if years <= 5.0 {
            Self::OneToFive
        } else {
            Self::FivePlus
        }
    }
}

impl FromStr for PropertyAge {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "new" => Ok(Self::New),
            "1-5" => Ok(Self::OneToFive),
            "5+" => Ok(Self::FivePlus),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Bedroom count option, shown as "2 BHK" or "4+ BHK"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bhk {
    Exact(u32),
    AtLeast(u32),
}

impl Bhk {
    pub fn matches(&self, bedrooms: u32) -> bool {
        match *self {
            Self::Exact(n) => bedrooms == n,
            Self::AtLeast(n) => bedrooms >= n,
        }
    }

    pub fn api_value(&self) -> String {
        api::bhk_api_value(&self.to_string())
    }
}

impl fmt::Display for Bhk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n} BHK"),
            Self::AtLeast(n) => write!(f, "{n}+ BHK"),
        }
    }
}

impl FromStr for Bhk {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s
            .trim()
            .strip_suffix("BHK")
            .or_else(|| s.trim().strip_suffix("bhk"))
            .map(str::trim)
            .ok_or_else(|| UnknownLabel(s.to_string()))?;

        let parsed = match count.strip_suffix('+') {
            Some(n) => n.trim().parse().map(Self::AtLeast),
            None => count.parse().map(Self::Exact),
        };
        parsed.map_err(|_| UnknownLabel(s.to_string()))
    }
}

/// Who is selling the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SellerType {
    Owner,
    Agent,
    /// Builders and developers; the backend calls these "builder"
    Corporate,
}

impl SellerType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Agent => "Agent",
            Self::Corporate => "Corporate",
        }
    }

    pub fn api_value(&self) -> String {
        api::seller_type_api_value(self.label())
    }

    /// Whether a backend `sellerType` string denotes this seller type
    pub fn matches(&self, raw: &str) -> bool {
        raw.parse::<SellerType>().map_or(false, |parsed| parsed == *self)
    }
}

impl FromStr for SellerType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "agent" => Ok(Self::Agent),
            "corporate" | "builder" => Ok(Self::Corporate),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Featured,
}

impl SortOrder {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Featured => "featured",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "featured" => Ok(Self::Featured),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Value of one admin-defined field filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicFilterValue {
    Text(String),
    Set(BTreeSet<String>),
}

impl DynamicFilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Set(values) => values.is_empty(),
        }
    }
}

/// Label that does not name any known option
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter label: {0}")]
pub struct UnknownLabel(pub String);

/// Every filter the listings page can apply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub price: PriceRange,
    pub transaction_types: BTreeSet<TransactionType>,
    /// Category slug; `None` means all categories
    pub category: Option<String>,
    pub subcategories: BTreeSet<String>,
    pub project_stages: BTreeSet<ProjectStage>,
    pub bhk: BTreeSet<Bhk>,
    pub seller_types: BTreeSet<SellerType>,
    pub property_age: BTreeSet<PropertyAge>,
    /// Builder or corporate name search
    pub builder: Option<String>,
    pub locality: Option<String>,
    pub dynamic: BTreeMap<String, DynamicFilterValue>,
    pub seller_id: Option<String>,
    pub featured_only: bool,
}

impl FilterState {
    /// Number of filters the user has switched on, for the "N filters" badge
    pub fn active_count(&self) -> usize {
        let flags = [
            !self.price.is_default(),
            self.category_slug().is_some(),
            non_blank(&self.builder).is_some(),
            non_blank(&self.locality).is_some(),
            non_blank(&self.seller_id).is_some(),
            self.featured_only,
        ];

        flags.iter().filter(|on| **on).count()
            + self.transaction_types.len()
            + self.subcategories.len()
            + self.project_stages.len()
            + self.bhk.len()
            + self.seller_types.len()
            + self.property_age.len()
            + self.dynamic.values().filter(|value| !value.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Category to filter by; blank and "all" mean no category filter
    pub fn category_slug(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|category| !is_all_categories(category))
    }

    /// Sets the category; "all" and blank clear it
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.category = (!is_all_categories(category)).then(|| category.to_string());
    }

    /// Drop values the query string cannot carry: blank text, the "all"
    /// category, and blank or comma-containing subcategories.
    pub fn normalize(&mut self) {
        if self.category_slug().is_none() {
            self.category = None;
        }
        for field in [&mut self.builder, &mut self.locality, &mut self.seller_id] {
            if non_blank(field).is_none() {
                *field = None;
            }
        }
        self.subcategories
            .retain(|sub| !sub.trim().is_empty() && !sub.contains(','));
    }
}

pub fn is_all_categories(category: &str) -> bool {
    let category = category.trim();
    category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES)
}

/// The text of an optional filter field, unless it is blank
pub fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|text| !text.trim().is_empty())
}

/// Lower-cased, dash-separated form of a slug or label
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
