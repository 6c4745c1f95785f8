pub mod attendance_service;
pub mod auth_service;
pub mod booking_service;
pub mod crud_service;
pub mod document_service;
pub mod payment_service;
pub mod rooming_service;
