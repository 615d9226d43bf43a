//! Transport-neutral request dispatch.
//!
//! Every adapter parses into a [`CounterRequest`] and renders the returned
//! [`CounterResponse`]; nothing here knows about axum.

use chrono::NaiveDate;

use crate::counter::CounterService;
use crate::http::adapter::{AdapterProfile, Operation};
use crate::http::request::CounterRequest;
use crate::http::response::CounterResponse;

/// Apply one request to the counter service.
///
/// `today` is the UTC calendar day used for unique-visitor markers.
pub async fn apply(
    service: &CounterService,
    profile: &AdapterProfile,
    request: &CounterRequest,
    today: NaiveDate,
) -> CounterResponse {
    let origin = request.origin.clone();

    if request.is_preflight() {
        return CounterResponse::Preflight { origin };
    }

    match request.operation {
        Operation::Get => CounterResponse::Counts {
            origin,
            snapshot: service.get_counts(&request.key).await,
        },
        Operation::Hit => {
            match service
                .record_hit(&request.key, &request.client_ip, request.unique_mode, today)
                .await
            {
                Ok(snapshot) => CounterResponse::Counts { origin, snapshot },
                Err(e) => {
                    tracing::error!(key = %request.key, error = %e, "Failed to record hit");
                    CounterResponse::StoreUnavailable { origin }
                }
            }
        }
        Operation::Banner => CounterResponse::Banner(profile.banner().to_string()),
    }
}
