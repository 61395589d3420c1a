//! Event store database schema.
//!
//! Mirrors `migrations/0001_create_events.sql`.

/// SQL to create the events table.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS events (
    position       BIGSERIAL PRIMARY KEY,
    event_id       UUID NOT NULL,
    event_type     VARCHAR(255) NOT NULL,
    aggregate_id   TEXT NOT NULL,
    actor          TEXT NOT NULL,
    correlation_id UUID NOT NULL,
    payload        TEXT NOT NULL,
    occurred_at    TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_aggregate_id
    ON events (aggregate_id, position);

CREATE INDEX IF NOT EXISTS idx_events_event_type
    ON events (event_type, position);
";
