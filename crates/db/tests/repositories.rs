//! Integration tests for the repository layer against a real database.

use assert_matches::assert_matches;
use assetflow_core::history::actions;
use assetflow_core::maintenance::TicketStatus;
use assetflow_db::models::asset::{AssetFilter, CreateAsset, UpdateAsset};
use assetflow_db::models::license::{CreateLicense, LicenseFilter};
use assetflow_db::models::maintenance::{CreateTicket, TicketFilter};
use assetflow_db::models::session::CreateSession;
use assetflow_db::models::user::{CreateUser, UpdateUser, User};
use assetflow_db::repositories::{
    AssetHistoryRepo, AssetRepo, DashboardRepo, LicenseRepo, MaintenanceRepo, SessionRepo,
    UserRepo,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str, role: &str, department: Option<&str>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
            department: department.map(str::to_string),
        },
    )
    .await
    .unwrap()
}

fn new_asset(name: &str, category: &str) -> CreateAsset {
    CreateAsset {
        name: name.to_string(),
        description: None,
        category: category.to_string(),
        serial_number: None,
        purchase_date: None,
        purchase_price: None,
        warranty_expiration: None,
        status: "Available".to_string(),
        condition: "Good".to_string(),
        location: None,
    }
}

fn new_ticket(asset_id: i64, reporter: i64, title: &str) -> CreateTicket {
    CreateTicket {
        asset_id,
        reported_by_user_id: reporter,
        title: title.to_string(),
        description: "Does not turn on".to_string(),
        priority: "High".to_string(),
    }
}

fn new_license(name: &str, asset_id: Option<i64>, expires: Option<NaiveDate>) -> CreateLicense {
    CreateLicense {
        asset_id,
        software_name: name.to_string(),
        license_key: None,
        vendor: None,
        purchase_date: None,
        expiration_date: expires,
        cost: None,
        seats: 1,
        status: "Active".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_rejected(pool: PgPool) {
    new_user(&pool, "alice", "Employee", None).await;
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "x".to_string(),
            role: "Employee".to_string(),
            department: None,
        },
    )
    .await;
    assert_matches!(result, Err(sqlx::Error::Database(e)) if e.constraint() == Some("uq_users_username"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_department(pool: PgPool) {
    new_user(&pool, "it1", "Employee", Some("IT")).await;
    new_user(&pool, "it2", "HR", Some("IT")).await;
    new_user(&pool, "fin", "Employee", Some("Finance")).await;
    new_user(&pool, "nodept", "Employee", None).await;

    let it = UserRepo::list_by_department(&pool, Some("IT")).await.unwrap();
    assert_eq!(it.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(), vec!["it1", "it2"]);

    let none = UserRepo::list_by_department(&pool, None).await.unwrap();
    assert_eq!(none.len(), 1);
    assert_eq!(none[0].username, "nodept");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_user_patch(pool: PgPool) {
    let user = new_user(&pool, "bob", "Employee", Some("Sales")).await;
    let updated = UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            role: Some("HR".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.role, "HR");
    assert_eq!(updated.department.as_deref(), Some("Sales"));
    assert_eq!(updated.email, "bob@example.com");

    let missing = UserRepo::update(&pool, 999_999, &UpdateUser::default()).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_login_counter(pool: PgPool) {
    let user = new_user(&pool, "carol", "Employee", None).await;
    assert_eq!(UserRepo::increment_failed_login(&pool, user.id).await.unwrap(), 1);
    assert_eq!(UserRepo::increment_failed_login(&pool, user.id).await.unwrap(), 2);

    UserRepo::lock_account(&pool, user.id, Utc::now() + Duration::minutes(15))
        .await
        .unwrap();
    UserRepo::record_successful_login(&pool, user.id).await.unwrap();

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_revocation(pool: PgPool) {
    let user = new_user(&pool, "dave", "Employee", None).await;
    let session = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "abc123".to_string(),
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
    .unwrap();

    let found = SessionRepo::find_by_refresh_token_hash(&pool, "abc123").await.unwrap();
    assert_eq!(found.map(|s| s.id), Some(session.id));

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 1);
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "abc123")
        .await
        .unwrap()
        .is_none());
    assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Assets and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_asset_logs_history(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("ThinkPad", "Laptop"), admin.id)
        .await
        .unwrap();

    let history = AssetHistoryRepo::list_for_asset(&pool, asset.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].entry.action, actions::CREATED);
    assert_eq!(history[0].entry.details.as_deref(), Some("Asset created: ThinkPad"));
    assert_eq!(history[0].performed_by.as_deref(), Some("admin"));
    assert_eq!(history[0].asset_name.as_deref(), Some("ThinkPad"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_serial_rejected(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let mut input = new_asset("Monitor", "Display");
    input.serial_number = Some("SN-1".to_string());
    AssetRepo::create(&pool, &input, admin.id).await.unwrap();

    let result = AssetRepo::create(&pool, &input, admin.id).await;
    assert_matches!(result, Err(sqlx::Error::Database(e)) if e.constraint() == Some("uq_assets_serial_number"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_asset_records_changes(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Desk", "Furniture"), admin.id)
        .await
        .unwrap();

    let patch = UpdateAsset {
        name: Some("Standing desk".to_string()),
        category: Some("Furniture".to_string()),
        purchase_price: Some(Some(Decimal::new(45000, 2))),
        ..Default::default()
    };
    let updated = AssetRepo::update(&pool, asset.id, &patch, admin.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Standing desk");
    assert_eq!(updated.purchase_price, Some(Decimal::new(45000, 2)));

    let history = AssetHistoryRepo::list_for_asset(&pool, asset.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].entry.action, actions::UPDATED);
    assert_eq!(
        history[0].entry.details.as_deref(),
        Some("Asset updated: name: Desk → Standing desk, purchase_price: none → 450.00")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_noop_update_logs_nothing(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Chair", "Furniture"), admin.id)
        .await
        .unwrap();

    let patch = UpdateAsset {
        name: Some("Chair".to_string()),
        ..Default::default()
    };
    AssetRepo::update(&pool, asset.id, &patch, admin.id).await.unwrap().unwrap();

    let history = AssetHistoryRepo::list_for_asset(&pool, asset.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_and_release(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let emp = new_user(&pool, "erin", "Employee", Some("IT")).await;
    let asset = AssetRepo::create(&pool, &new_asset("MacBook", "Laptop"), admin.id)
        .await
        .unwrap();

    let assigned = AssetRepo::assign(&pool, asset.id, emp.id, &emp.username, admin.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assigned.status, "Assigned");
    assert_eq!(assigned.assigned_to_user_id, Some(emp.id));
    assert!(UserRepo::has_assigned_assets(&pool, emp.id).await.unwrap());

    // A second assignment is refused.
    let again = AssetRepo::assign(&pool, asset.id, admin.id, &admin.username, admin.id)
        .await
        .unwrap();
    assert!(again.is_none());

    let released = AssetRepo::release(&pool, asset.id, emp.id).await.unwrap().unwrap();
    assert_eq!(released.status, "Available");
    assert_eq!(released.assigned_to_user_id, None);
    assert!(AssetRepo::release(&pool, asset.id, emp.id).await.unwrap().is_none());

    let history = AssetHistoryRepo::list_for_asset(&pool, asset.id).await.unwrap();
    let actions_seen: Vec<&str> = history.iter().map(|h| h.entry.action.as_str()).collect();
    assert_eq!(actions_seen, vec!["released", "assigned", "created"]);
    assert_eq!(history[0].from_user.as_deref(), Some("erin"));
    assert_eq!(history[1].to_user.as_deref(), Some("erin"));
    assert_eq!(history[1].entry.details.as_deref(), Some("Asset assigned to erin"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_assets_filters(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let emp = new_user(&pool, "frank", "Employee", Some("Finance")).await;

    let mut laptop = new_asset("Dell Latitude", "Laptop");
    laptop.serial_number = Some("DL-9000".to_string());
    laptop.warranty_expiration = Some(Utc::now().date_naive() + Duration::days(10));
    let laptop = AssetRepo::create(&pool, &laptop, admin.id).await.unwrap();
    AssetRepo::create(&pool, &new_asset("Office chair", "Furniture"), admin.id)
        .await
        .unwrap();
    AssetRepo::assign(&pool, laptop.id, emp.id, &emp.username, admin.id)
        .await
        .unwrap();

    let by_category = AssetRepo::list(
        &pool,
        &AssetFilter {
            category: Some("Furniture".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);

    let by_department = AssetRepo::list(
        &pool,
        &AssetFilter {
            department: Some("Finance".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_department.len(), 1);
    assert_eq!(by_department[0].id, laptop.id);

    let by_search = AssetRepo::list(
        &pool,
        &AssetFilter {
            search: Some("%dl-9%".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_search.len(), 1);

    let today = Utc::now().date_naive();
    let expiring = AssetRepo::list(
        &pool,
        &AssetFilter {
            warranty_between: Some((today, today + Duration::days(30))),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(expiring.len(), 1);

    let all = AssetRepo::list(&pool, &AssetFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_asset_cascades(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Printer", "Peripheral"), admin.id)
        .await
        .unwrap();
    MaintenanceRepo::create(&pool, &new_ticket(asset.id, admin.id, "Paper jam"))
        .await
        .unwrap();
    LicenseRepo::create(&pool, &new_license("Driver suite", Some(asset.id), None))
        .await
        .unwrap();

    assert!(AssetRepo::delete(&pool, asset.id).await.unwrap());
    assert!(!AssetRepo::delete(&pool, asset.id).await.unwrap());

    let remaining: (i64,) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM maintenance_tickets)
              + (SELECT COUNT(*) FROM licenses)
              + (SELECT COUNT(*) FROM asset_history)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining.0, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_with_history_cannot_be_deleted(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    AssetRepo::create(&pool, &new_asset("Tablet", "Mobile"), admin.id)
        .await
        .unwrap();

    let result = UserRepo::delete(&pool, admin.id).await;
    assert_matches!(result, Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23503"));
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_lifecycle_moves_asset_status(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let emp = new_user(&pool, "gina", "Employee", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Laptop", "Laptop"), admin.id)
        .await
        .unwrap();
    AssetRepo::assign(&pool, asset.id, emp.id, &emp.username, admin.id)
        .await
        .unwrap();

    let ticket = MaintenanceRepo::create(&pool, &new_ticket(asset.id, emp.id, "Cracked screen"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.status, "New");
    let asset_now = AssetRepo::find_by_id(&pool, asset.id).await.unwrap().unwrap();
    assert_eq!(asset_now.status, "Under Maintenance");
    assert_eq!(asset_now.assigned_to_user_id, Some(emp.id));

    let assigned = MaintenanceRepo::assign(&pool, ticket.id, admin.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assigned.status, "Under Review");

    let resolved = MaintenanceRepo::update_status(&pool, ticket.id, TicketStatus::Resolved, admin.id)
        .await
        .unwrap()
        .unwrap();
    assert!(resolved.resolved_at.is_some());
    let asset_now = AssetRepo::find_by_id(&pool, asset.id).await.unwrap().unwrap();
    assert_eq!(asset_now.status, "Assigned");

    let history = AssetHistoryRepo::list_for_asset(&pool, asset.id).await.unwrap();
    assert_eq!(history[0].entry.action, actions::MAINTENANCE_RESOLVED);
    assert_eq!(
        history[0].entry.extra_data.as_ref().unwrap()["new_asset_status"],
        "Assigned"
    );
    assert_eq!(history[1].entry.action, actions::MAINTENANCE_REQUESTED);
    assert_eq!(
        history[1].entry.extra_data.as_ref().unwrap()["old_status"],
        "Assigned"
    );

    // Resolving again does not log a second resolution.
    MaintenanceRepo::update_status(&pool, ticket.id, TicketStatus::Resolved, admin.id)
        .await
        .unwrap();
    let count = AssetHistoryRepo::list_for_asset(&pool, asset.id)
        .await
        .unwrap()
        .iter()
        .filter(|h| h.entry.action == actions::MAINTENANCE_RESOLVED)
        .count();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_for_missing_asset(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let result = MaintenanceRepo::create(&pool, &new_ticket(999_999, admin.id, "Ghost"))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_open_ticket_restores_asset(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Projector", "AV"), admin.id)
        .await
        .unwrap();
    let ticket = MaintenanceRepo::create(&pool, &new_ticket(asset.id, admin.id, "Bulb"))
        .await
        .unwrap()
        .unwrap();

    assert!(MaintenanceRepo::delete(&pool, ticket.id).await.unwrap());
    assert!(!MaintenanceRepo::delete(&pool, ticket.id).await.unwrap());

    let asset_now = AssetRepo::find_by_id(&pool, asset.id).await.unwrap().unwrap();
    assert_eq!(asset_now.status, "Available");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_filters(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", None).await;
    let emp = new_user(&pool, "hank", "Employee", None).await;
    let asset = AssetRepo::create(&pool, &new_asset("Phone", "Mobile"), admin.id)
        .await
        .unwrap();
    MaintenanceRepo::create(&pool, &new_ticket(asset.id, emp.id, "Battery"))
        .await
        .unwrap();
    MaintenanceRepo::create(&pool, &new_ticket(asset.id, admin.id, "Speaker"))
        .await
        .unwrap();

    let mine = MaintenanceRepo::list(
        &pool,
        &TicketFilter {
            reported_by: Some(emp.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Battery");

    let all = MaintenanceRepo::list(&pool, &TicketFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Speaker", "newest first");
}

// ---------------------------------------------------------------------------
// Licenses and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_license_expiring_window(pool: PgPool) {
    let today = Utc::now().date_naive();
    LicenseRepo::create(&pool, &new_license("Office", None, Some(today + Duration::days(5))))
        .await
        .unwrap();
    LicenseRepo::create(&pool, &new_license("IDE", None, Some(today + Duration::days(90))))
        .await
        .unwrap();
    let mut cancelled = new_license("Old VPN", None, Some(today + Duration::days(3)));
    cancelled.status = "Cancelled".to_string();
    LicenseRepo::create(&pool, &cancelled).await.unwrap();

    let expiring = LicenseRepo::list_expiring(&pool, today, today + Duration::days(30))
        .await
        .unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].license.software_name, "Office");

    let filtered = LicenseRepo::list(
        &pool,
        &LicenseFilter {
            software_name: Some("%ide%".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seats_must_be_positive(pool: PgPool) {
    let mut input = new_license("Zero seats", None, None);
    input.seats = 0;
    assert!(LicenseRepo::create(&pool, &input).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_aggregates(pool: PgPool) {
    let admin = new_user(&pool, "admin", "Admin", Some("IT")).await;
    let mut priced = new_asset("Server", "Hardware");
    priced.purchase_price = Some(Decimal::new(1_000_000, 2));
    let server = AssetRepo::create(&pool, &priced, admin.id).await.unwrap();
    AssetRepo::create(&pool, &new_asset("Mouse", "Peripheral"), admin.id)
        .await
        .unwrap();
    AssetRepo::assign(&pool, server.id, admin.id, &admin.username, admin.id)
        .await
        .unwrap();

    let counts = DashboardRepo::asset_counts(&pool).await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.assigned, 1);
    assert_eq!(counts.available, 1);
    assert_eq!(counts.total_value, Decimal::new(1_000_000, 2));

    let departments = DashboardRepo::assets_by_department(&pool).await.unwrap();
    let pairs: Vec<(&str, i64)> = departments
        .iter()
        .map(|d| (d.department.as_str(), d.count))
        .collect();
    assert_eq!(pairs, vec![("IT", 1), ("Unassigned", 1)]);

    let timeline = DashboardRepo::assets_timeline(&pool).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].count, 2);

    assert_eq!(DashboardRepo::avg_resolution_hours(&pool).await.unwrap(), None);
    assert_eq!(UserRepo::count_active(&pool).await.unwrap(), 1);
}
