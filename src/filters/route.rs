use super::TransactionType;

/// Transaction type implied by the listings route.
///
/// `/buy` lists sales, `/rent` rentals and `/lease` leases; any other path is
/// unfiltered by route.
pub fn route_transaction_type(path: &str) -> Option<TransactionType> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_matches('/').split('/').next()?;

    match segment.to_ascii_lowercase().as_str() {
        "buy" => Some(TransactionType::Sale),
        "rent" => Some(TransactionType::Rent),
        "lease" => Some(TransactionType::Lease),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_routes() {
        assert_eq!(route_transaction_type("/buy"), Some(TransactionType::Sale));
        assert_eq!(route_transaction_type("/rent/"), Some(TransactionType::Rent));
        assert_eq!(
            route_transaction_type("/Lease?bhk=2%20BHK"),
            Some(TransactionType::Lease)
        );
    }

    #[test]
    fn other_routes_are_unfiltered() {
        assert_eq!(route_transaction_type("/"), None);
        assert_eq!(route_transaction_type("/properties"), None);
        assert_eq!(route_transaction_type("/buyers"), None);
    }
}
