//! Property-based checks that the listings query string is lossless.

use std::collections::BTreeMap;

use proptest::collection::{btree_map, btree_set};
use proptest::prelude::*;

use listing_scout::filters::{
    Bhk, DynamicFilterValue, FilterState, ListingQuery, PriceRange, ProjectStage, PropertyAge,
    SellerType, SortOrder, TransactionType,
};

// =============================================================================
// Strategies
// =============================================================================

fn arb_bhk() -> impl Strategy<Value = Bhk> {
    prop_oneof![(1u32..10).prop_map(Bhk::Exact), (1u32..10).prop_map(Bhk::AtLeast)]
}

fn arb_transaction() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Sale),
        Just(TransactionType::Rent),
        Just(TransactionType::Lease),
    ]
}

fn arb_seller() -> impl Strategy<Value = SellerType> {
    prop_oneof![
        Just(SellerType::Owner),
        Just(SellerType::Agent),
        Just(SellerType::Corporate),
    ]
}

fn arb_age() -> impl Strategy<Value = PropertyAge> {
    prop_oneof![
        Just(PropertyAge::New),
        Just(PropertyAge::OneToFive),
        Just(PropertyAge::FivePlus),
    ]
}

fn arb_stage() -> impl Strategy<Value = ProjectStage> {
    prop_oneof![
        Just(ProjectStage::NewLaunch),
        Just(ProjectStage::UnderConstruction),
        Just(ProjectStage::ReadyToMove),
    ]
}

fn arb_sort() -> impl Strategy<Value = SortOrder> {
    prop_oneof![
        Just(SortOrder::Newest),
        Just(SortOrder::PriceLow),
        Just(SortOrder::PriceHigh),
        Just(SortOrder::Featured),
    ]
}

fn arb_price() -> impl Strategy<Value = PriceRange> {
    prop_oneof![
        Just(PriceRange::default()),
        (0u64..50_000_000, 50_000_000u64..=200_000_000)
            .prop_map(|(min, max)| PriceRange::new(min, max)),
    ]
}

/// Text a user could type into a search box, padding included
fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,10}"
}

fn arb_category() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(arb_text().prop_filter("all is not a category", |c| {
        !c.trim().eq_ignore_ascii_case("all")
    }))
}

fn arb_dynamic() -> impl Strategy<Value = BTreeMap<String, DynamicFilterValue>> {
    let value = prop_oneof![
        ".{0,6}".prop_map(DynamicFilterValue::Text),
        btree_set(".{0,6}", 0..4).prop_map(DynamicFilterValue::Set),
    ];
    btree_map(".{0,6}", value, 0..4)
}

fn arb_filters() -> impl Strategy<Value = FilterState> {
    let selections = (
        btree_set(arb_bhk(), 0..4),
        btree_set(arb_transaction(), 0..3),
        btree_set(arb_seller(), 0..3),
        btree_set(arb_age(), 0..3),
        btree_set(arb_stage(), 0..3),
    );
    let text = (
        arb_category(),
        btree_set("[a-z][a-z0-9-]{0,8}", 0..4),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
        proptest::option::of("[a-z0-9-]{1,12}"),
    );

    (selections, text, arb_price(), arb_dynamic(), any::<bool>()).prop_map(
        |(
            (bhk, transaction_types, seller_types, property_age, project_stages),
            (category, subcategories, builder, locality, seller_id),
            price,
            dynamic,
            featured_only,
        )| FilterState {
            price,
            transaction_types,
            category,
            subcategories,
            project_stages,
            bhk,
            seller_types,
            property_age,
            builder,
            locality,
            dynamic,
            seller_id,
            featured_only,
        },
    )
}

fn arb_loose_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        Just("ALL".to_string()),
        ".{0,8}".prop_map(|s: String| s),
    ])
}

/// Filters as a caller might set them by hand: blank text, "all", commas
fn arb_raw_filters() -> impl Strategy<Value = FilterState> {
    (
        arb_filters(),
        arb_loose_text(),
        arb_loose_text(),
        arb_loose_text(),
        btree_set(".{0,6}", 0..4),
    )
        .prop_map(|(mut filters, category, builder, locality, subcategories)| {
            filters.category = category;
            filters.builder = builder;
            filters.locality = locality;
            filters.subcategories = subcategories;
            filters
        })
}

fn arb_query() -> impl Strategy<Value = ListingQuery> {
    (arb_filters(), 1u32..1000, arb_sort()).prop_map(|(filters, page, sort)| ListingQuery {
        filters,
        page,
        sort,
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn decode_inverts_encode(query in arb_query()) {
        prop_assert_eq!(ListingQuery::decode(&query.encode()), query);
    }

    #[test]
    fn encoding_is_canonical(query in arb_query()) {
        let encoded = query.encode();
        prop_assert_eq!(ListingQuery::decode(&encoded).encode(), encoded);
    }

    #[test]
    fn edited_queries_survive_the_url(
        filters in arb_raw_filters(),
        sort in arb_sort(),
        page in 1u32..50,
    ) {
        let edited = ListingQuery::default().update(|q| {
            q.filters = filters;
            q.sort = sort;
            q.page = page;
        });
        prop_assert_eq!(ListingQuery::decode(&edited.encode()), edited);
    }
}
