use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use tempfile::NamedTempFile;
use virtualcard::entities;

/// Test database with automatic cleanup
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        // Create temporary SQLite database file
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        // Connect to database
        let connection = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        migration::Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

/// Number of stored QR codes, whatever their card
pub async fn count_qr_codes(db: &DatabaseConnection) -> u64 {
    entities::QrCode::find()
        .count(db)
        .await
        .expect("Failed to count QR codes")
}

/// Number of stored card/QR associations
pub async fn count_associations(db: &DatabaseConnection) -> u64 {
    entities::VirtualCardQrCode::find()
        .count(db)
        .await
        .expect("Failed to count associations")
}
