//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.

pub mod asset_repo;
pub mod dashboard_repo;
pub mod history_repo;
pub mod license_repo;
pub mod maintenance_repo;
pub mod session_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use dashboard_repo::DashboardRepo;
pub use history_repo::AssetHistoryRepo;
pub use license_repo::LicenseRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
