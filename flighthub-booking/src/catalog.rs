use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::{debug, warn};

use flighthub_core::repository::{FlightRepository, SearchLogRepository};
use flighthub_core::{FieldViolation, Flight, NewSearchRequest};

use crate::error::{BookingError, BookingResult};

/// Query string of `GET /flights/search`. The required fields are optional
/// here so a missing one is reported as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearch {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub passengers: Option<i32>,
    pub class: Option<String>,
}

/// Blank, non-numeric or non-positive counts read as absent.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|n| *n > 0))
}

impl FlightSearch {
    pub fn route(from: &str, to: &str, date: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            date: Some(date.to_string()),
            ..Self::default()
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &str, missing: &mut Vec<FieldViolation>) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(FieldViolation::new(field, format!("Missing required parameter: {field}")));
            ""
        }
    }
}

pub struct FlightCatalog {
    flights: Arc<dyn FlightRepository>,
    search_log: Arc<dyn SearchLogRepository>,
}

impl FlightCatalog {
    pub fn new(flights: Arc<dyn FlightRepository>, search_log: Arc<dyn SearchLogRepository>) -> Self {
        Self { flights, search_log }
    }

    /// Flights on the exact route, cheapest first. The date is recorded in
    /// the search log but does not filter results.
    pub async fn search(&self, query: &FlightSearch) -> BookingResult<Vec<Flight>> {
        let mut missing = Vec::new();
        let from = required(&query.from, "from", &mut missing);
        let to = required(&query.to, "to", &mut missing);
        let date = required(&query.date, "date", &mut missing);
        if !missing.is_empty() {
            return Err(BookingError::Validation(missing));
        }

        let mut flights = self.flights.search(from, to).await?;
        flights.sort_by(|a, b| a.price.cmp(&b.price));
        debug!(from, to, date, results = flights.len(), "Flight search");

        let entry = NewSearchRequest {
            from: from.to_string(),
            to: to.to_string(),
            departure_date: date.to_string(),
            return_date: query.return_date.clone(),
            passengers: query.passengers.unwrap_or(1),
            class: query
                .class
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "economy".to_string()),
        };
        if let Err(e) = self.search_log.record(entry).await {
            warn!("Failed to record search request: {}", e);
        }

        Ok(flights)
    }

    pub async fn get_by_id(&self, id: i32) -> BookingResult<Flight> {
        self.flights
            .get(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Flight {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flighthub_core::{SearchRequest, StoreError, StoreResult};
    use flighthub_store::MemoryStore;

    struct BrokenLog;

    #[async_trait]
    impl SearchLogRepository for BrokenLog {
        async fn record(&self, _search: NewSearchRequest) -> StoreResult<SearchRequest> {
            Err(StoreError::Backend("search_requests is read-only".to_string()))
        }
    }

    fn catalog() -> FlightCatalog {
        let store = Arc::new(MemoryStore::new());
        FlightCatalog::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_search_returns_route_sorted_by_price() {
        let flights = catalog()
            .search(&FlightSearch::route("LHR", "AMS", "2024-12-15"))
            .await
            .unwrap();

        assert_eq!(flights.len(), 2);
        assert!(flights
            .iter()
            .all(|f| f.departure_airport == "LHR" && f.arrival_airport == "AMS"));
        assert_eq!(flights[0].flight_number, "BA431");
        assert!(flights.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[tokio::test]
    async fn test_search_requires_from_to_and_date() {
        let query = FlightSearch {
            from: Some("LHR".to_string()),
            to: Some("  ".to_string()),
            ..FlightSearch::default()
        };
        match catalog().search(&query).await {
            Err(BookingError::Validation(found)) => {
                let fields: Vec<_> = found.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["to", "date"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_search_log_does_not_fail_search() {
        let catalog = FlightCatalog::new(Arc::new(MemoryStore::new()), Arc::new(BrokenLog));
        let flights = catalog
            .search(&FlightSearch::route("MAN", "BCN", "2025-01-10"))
            .await
            .unwrap();
        assert_eq!(flights.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.get_by_id(1).await.unwrap().flight_number, "KL1007");
        assert!(matches!(catalog.get_by_id(404).await, Err(BookingError::NotFound(_))));
    }
}
