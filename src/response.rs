use serde::Serialize;
use utoipa::ToSchema;

/// Collection envelope shared by every list endpoint. The dashboard's tables
/// read these four keys verbatim, so the shape must not drift per resource.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total_items: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total_items + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            items,
            total_items,
            total_pages,
            current_page: page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Deleted {
    pub deleted: bool,
    pub id: i64,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self { deleted: true, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_envelope_math() {
        let page: Paginated<i64> = Paginated::new(vec![1; 10], 25, 2, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn empty_table_has_zero_pages() {
        let page: Paginated<i64> = Paginated::new(vec![], 0, 1, 20);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        let page: Paginated<i64> = Paginated::new(vec![1; 20], 40, 1, 20);
        assert_eq!(page.total_pages, 2);
    }
}
