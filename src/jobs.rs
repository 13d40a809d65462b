use crate::entities;
use crate::errors::CardError;
use crate::settings::Jobs as JobsCfg;
use crate::storage;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

pub const CLEANUP_EXPIRED_QR_CODES: &str = "cleanup_expired_qr_codes";

/// Initialize and start the job scheduler with the expired code sweep
pub async fn init_scheduler(
    db: DatabaseConnection,
    cfg: &JobsCfg,
) -> Result<JobScheduler, CardError> {
    let sched = JobScheduler::new()
        .await
        .map_err(|e| CardError::Other(format!("Failed to create job scheduler: {}", e)))?;

    let retention_hours = cfg.retention_hours;
    let cleanup_job = Job::new_async(cfg.cleanup_cron.as_str(), move |_uuid, _l| {
        let db = db.clone();
        Box::pin(async move {
            info!("Running {} job", CLEANUP_EXPIRED_QR_CODES);
            if let Err(e) = run_job(&db, CLEANUP_EXPIRED_QR_CODES, retention_hours).await {
                error!("Failed to record {} run: {}", CLEANUP_EXPIRED_QR_CODES, e);
            }
        })
    })
    .map_err(|e| CardError::Other(format!("Failed to create cleanup job: {}", e)))?;

    sched
        .add(cleanup_job)
        .await
        .map_err(|e| CardError::Other(format!("Failed to add cleanup job: {}", e)))?;

    sched
        .start()
        .await
        .map_err(|e| CardError::Other(format!("Failed to start job scheduler: {}", e)))?;

    info!(
        cron = %cfg.cleanup_cron,
        retention_hours,
        "Job scheduler started"
    );

    Ok(sched)
}

/// Record the start of a job execution
pub async fn start_job_execution(
    db: &DatabaseConnection,
    job_name: &str,
) -> Result<i64, CardError> {
    use entities::job_execution;

    let execution = job_execution::ActiveModel {
        job_name: Set(job_name.to_string()),
        started_at: Set(Utc::now().timestamp()),
        completed_at: Set(None),
        success: Set(None),
        error_message: Set(None),
        records_processed: Set(None),
        ..Default::default()
    };

    let result = execution.insert(db).await?;
    Ok(result.id)
}

/// Record the completion of a job execution
pub async fn complete_job_execution(
    db: &DatabaseConnection,
    execution_id: i64,
    success: bool,
    error_message: Option<String>,
    records_processed: Option<i64>,
) -> Result<(), CardError> {
    use entities::job_execution::{Column, Entity};

    let now = Utc::now().timestamp();

    if let Some(execution) = Entity::find()
        .filter(Column::Id.eq(execution_id))
        .one(db)
        .await?
    {
        let mut active: entities::job_execution::ActiveModel = execution.into_active_model();
        active.completed_at = Set(Some(now));
        active.success = Set(Some(if success { 1 } else { 0 }));
        active.error_message = Set(error_message);
        active.records_processed = Set(records_processed);
        active.update(db).await?;
    }

    Ok(())
}

/// Runs a job once outside the schedule, recording it like a scheduled run.
pub async fn trigger_job_manually(
    db: &DatabaseConnection,
    cfg: &JobsCfg,
    job_name: &str,
) -> Result<u64, CardError> {
    info!("Manually triggering job: {}", job_name);
    run_job(db, job_name, cfg.retention_hours).await
}

async fn run_job(db: &DatabaseConnection, job_name: &str, retention_hours: i64) -> Result<u64, CardError> {
    let result = match job_name {
        CLEANUP_EXPIRED_QR_CODES => {
            let execution_id = start_job_execution(db, job_name).await?;
            let cutoff = Utc::now().timestamp() - retention_hours * 3600;
            (execution_id, storage::cleanup_expired_qr_codes(db, cutoff).await)
        }
        _ => {
            return Err(CardError::Other(format!("Unknown job name: {}", job_name)));
        }
    };

    match result {
        (execution_id, Ok(count)) => {
            info!("Job {} completed: {} records", job_name, count);
            complete_job_execution(db, execution_id, true, None, Some(count as i64)).await?;
            Ok(count)
        }
        (execution_id, Err(e)) => {
            error!("Job {} failed: {}", job_name, e);
            complete_job_execution(db, execution_id, false, Some(e.to_string()), None).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::VirtualCard;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use tempfile::NamedTempFile;

    struct TestDb {
        connection: DatabaseConnection,
        _temp_file: NamedTempFile,
    }

    impl TestDb {
        async fn new() -> Self {
            let temp_file = NamedTempFile::new().expect("Failed to create temp file");
            let db_path = temp_file.path().to_str().expect("Invalid temp file path");
            let db_url = format!("sqlite://{}?mode=rwc", db_path);

            let connection = Database::connect(&db_url)
                .await
                .expect("Failed to connect to test database");

            migration::Migrator::up(&connection, None)
                .await
                .expect("Failed to run migrations");

            Self {
                connection,
                _temp_file: temp_file,
            }
        }

        fn connection(&self) -> &DatabaseConnection {
            &self.connection
        }
    }

    fn hours_from_now(hours: i64) -> i64 {
        Utc::now().timestamp() + hours * 3600
    }

    #[tokio::test]
    async fn test_job_execution_is_recorded() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let id = start_job_execution(db, "some_job")
            .await
            .expect("Failed to start execution");
        let running = entities::JobExecution::find_by_id(id)
            .one(db)
            .await
            .expect("Query failed")
            .expect("Execution missing");
        assert_eq!(running.success, None);
        assert_eq!(running.completed_at, None);

        complete_job_execution(db, id, false, Some("boom".to_string()), None)
            .await
            .expect("Failed to complete execution");
        let done = entities::JobExecution::find_by_id(id)
            .one(db)
            .await
            .expect("Query failed")
            .expect("Execution missing");
        assert_eq!(done.success, Some(0));
        assert_eq!(done.error_message.as_deref(), Some("boom"));
        assert!(done.completed_at.is_some());

        let second = start_job_execution(db, "some_job")
            .await
            .expect("Failed to start execution");
        assert_ne!(second, id);
    }

    #[tokio::test]
    async fn test_trigger_cleanup_respects_retention() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let id = storage::next_sequence_value(db, storage::VIRTUAL_CARD_ID_SEQUENCE)
            .await
            .expect("Failed to bump sequence");
        storage::insert_card(db, &VirtualCard::with_defaults(id, 1))
            .await
            .expect("Failed to insert card");

        let stale = storage::create_qr_code_for_card(db, id, true, hours_from_now(-30))
            .await
            .expect("Failed to create code");
        let grace = storage::create_qr_code_for_card(db, id, true, hours_from_now(-2))
            .await
            .expect("Failed to create code");

        let cfg = JobsCfg::default();
        let removed = trigger_job_manually(db, &cfg, CLEANUP_EXPIRED_QR_CODES)
            .await
            .expect("Job failed");
        assert_eq!(removed, 1);

        assert!(storage::get_qr_code(db, stale.id)
            .await
            .expect("Query failed")
            .is_none());
        assert!(storage::get_qr_code(db, grace.id)
            .await
            .expect("Query failed")
            .is_some());

        let runs = entities::JobExecution::find()
            .filter(entities::job_execution::Column::JobName.eq(CLEANUP_EXPIRED_QR_CODES))
            .all(db)
            .await
            .expect("Query failed");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].success, Some(1));
        assert_eq!(runs[0].records_processed, Some(1));
    }

    #[tokio::test]
    async fn test_trigger_unknown_job() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let result = trigger_job_manually(db, &JobsCfg::default(), "nope").await;
        assert!(matches!(result, Err(CardError::Other(_))));

        let runs = entities::JobExecution::find()
            .all(db)
            .await
            .expect("Query failed");
        assert!(runs.is_empty());
    }
}
