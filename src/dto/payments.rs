use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::routes::params::Pagination;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub jamaah_id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub jamaah_id: Option<i64>,
    pub amount: Option<i64>,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
}

// Pagination keys are declared inline rather than flattened in:
// serde_urlencoded cannot route numbers through `#[serde(flatten)]`, so a
// flattened `Pagination` rejects `?page=2` at the extractor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub jamaah_id: Option<i64>,
    pub status: Option<String>,
}

impl PaymentListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[test]
    fn list_query_parses_pagination_and_filters() {
        let uri: Uri = "/api/payments?page=2&per_page=10&jamaah_id=7&status=confirmed"
            .parse()
            .unwrap();
        let Query(query) = Query::<PaymentListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.per_page, Some(10));
        assert_eq!(query.jamaah_id, Some(7));
        assert_eq!(query.status.as_deref(), Some("confirmed"));
        assert_eq!(query.pagination().normalize(), (2, 10, 10));
    }

    #[test]
    fn list_query_accepts_no_parameters() {
        let uri: Uri = "/api/payments".parse().unwrap();
        let Query(query) = Query::<PaymentListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.page, None);
        assert_eq!(query.jamaah_id, None);
        assert_eq!(query.pagination().normalize(), (1, 20, 0));
    }
}
