use sqlx::PgPool;

/// Executes query messages against the connection pool.
///
/// Read-path queries are modeled as message structs with a
/// `kanau::processor::Processor` impl on this type. The aggregator's
/// multi-statement write path does not go through here; it drives a
/// `sqlx::Transaction` directly so both writes share one commit.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
