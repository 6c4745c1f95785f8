use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        attendance::{AttendanceEntry, BulkAttendanceRequest, BulkAttendanceSaved},
        auth::{LoginRequest, LoginResponse, LogoutResponse, UserInfo},
        bookings::{BookingCreated, CreateBookingRequest, PassengerInput},
        documents::{BulkUpdateRequest, BulkUpdated},
        payments::{CreatePaymentRequest, UpdatePaymentRequest},
        rooming::{
            AssignRequest, AssignResponse, CreateRoomRequest, RoomWithOccupants, RoomingPassenger,
            RoomingView,
        },
    },
    models::{Payment, Room},
    response::{Deleted, Paginated},
    routes::{
        attendance, auth, bookings, documents, health, params, payments, resources, rooming,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::me,
        resources::list_items,
        resources::get_item,
        resources::create_item,
        resources::update_item,
        resources::delete_item,
        bookings::create_booking,
        payments::list_payments,
        payments::get_payment,
        payments::create_payment,
        payments::update_payment,
        payments::delete_payment,
        documents::bulk_update,
        rooming::assign,
        rooming::create_room,
        rooming::delete_room,
        rooming::departure_rooms,
        attendance::bulk_save
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LogoutResponse,
            UserInfo,
            PassengerInput,
            CreateBookingRequest,
            BookingCreated,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            Payment,
            Room,
            BulkUpdateRequest,
            BulkUpdated,
            AssignRequest,
            AssignResponse,
            CreateRoomRequest,
            RoomingPassenger,
            RoomWithOccupants,
            RoomingView,
            AttendanceEntry,
            BulkAttendanceRequest,
            BulkAttendanceSaved,
            params::Pagination,
            Deleted,
            Paginated<Payment>,
            health::HealthData
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Session token endpoints"),
        (name = "Resources", description = "Registry-driven CRUD endpoints"),
        (name = "Bookings", description = "Booking workflow"),
        (name = "Payments", description = "Payment ledger and balance tracking"),
        (name = "Documents", description = "Manifest document statuses"),
        (name = "Rooming", description = "Room lists per departure"),
        (name = "Attendance", description = "HR attendance sheets"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
