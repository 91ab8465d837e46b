use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // btree_gist lets the exclusion constraint below mix equality on the
    // provider id with range overlap.
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist;")
        .execute(pool)
        .await?;

    // Create providers table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS providers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            display_name VARCHAR(255) NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create clients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            display_name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            provider_id UUID NOT NULL REFERENCES providers(id),
            name VARCHAR(255) NOT NULL,
            duration_minutes INTEGER NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT positive_duration CHECK (duration_minutes > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create weekly_hours table (one row per provider per weekday, 0 = Sunday)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_hours (
            provider_id UUID NOT NULL REFERENCES providers(id),
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            is_available BOOLEAN NOT NULL DEFAULT TRUE,
            PRIMARY KEY (provider_id, day_of_week),
            CONSTRAINT valid_day CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_hours CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create booking_policies table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_policies (
            provider_id UUID PRIMARY KEY REFERENCES providers(id),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            max_daily_appointments INTEGER NOT NULL DEFAULT 30,
            buffer_minutes INTEGER NOT NULL DEFAULT 15,
            CONSTRAINT valid_daily_cap CHECK (max_daily_appointments > 0),
            CONSTRAINT valid_buffer CHECK (buffer_minutes >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create blackout_periods table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blackout_periods (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            provider_id UUID NOT NULL REFERENCES providers(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            reason TEXT NULL,
            origin VARCHAR(16) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT known_origin CHECK (origin IN ('provider', 'system'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table. The exclusion constraint is the storage-level
    // guarantee that two bookings holding a slot can never overlap for one
    // provider, whatever the application layer missed.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id UUID NOT NULL REFERENCES clients(id),
            provider_id UUID NOT NULL REFERENCES providers(id),
            service_id UUID NOT NULL REFERENCES services(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            status VARCHAR(16) NOT NULL,
            cancellation_reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT known_status CHECK (
                status IN ('pending', 'scheduled', 'started', 'completed', 'cancelled')
            ),
            CONSTRAINT no_blocking_overlap EXCLUDE USING GIST (
                provider_id WITH =,
                tstzrange(start_time, end_time) WITH &&
            ) WHERE (status IN ('pending', 'scheduled', 'started'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reminder_flags table (idempotency markers for "starting soon"
    // signals; a flag expires when its appointment starts)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminder_flags (
            appointment_id UUID PRIMARY KEY REFERENCES appointments(id),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_appointments_provider_start ON appointments(provider_id, start_time);",
        "CREATE INDEX IF NOT EXISTS idx_appointments_status_start ON appointments(status, start_time);",
        "CREATE INDEX IF NOT EXISTS idx_appointments_status_end ON appointments(status, end_time);",
        "CREATE INDEX IF NOT EXISTS idx_blackouts_provider_start ON blackout_periods(provider_id, start_time);",
        "CREATE INDEX IF NOT EXISTS idx_services_provider_id ON services(provider_id);",
        "CREATE INDEX IF NOT EXISTS idx_reminder_flags_expires_at ON reminder_flags(expires_at);",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Reports whether the `no_blocking_overlap` exclusion constraint exists on
/// the appointments table.
///
/// `CREATE TABLE IF NOT EXISTS` skips tables that already exist, so a
/// database created before the constraint was introduced comes back from
/// [`initialize_database`] without it.
pub async fn overlap_guard_installed(pool: &Pool<Postgres>) -> Result<bool> {
    let guard: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT c.conname
        FROM pg_constraint c
        JOIN pg_class t ON t.oid = c.conrelid
        WHERE t.relname = 'appointments' AND c.conname = 'no_blocking_overlap'
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(guard.is_some())
}
