use crate::config::Config;

use std::sync::Arc;

///
/// The application, implementing all the "leaf" dependencies
/// of the domain layers.
///
#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: peel_db::Db,
}

impl peel_core::System for App {
    fn get_current_time(&self) -> time::OffsetDateTime {
        time::OffsetDateTime::now_utc()
    }
}

impl peel_core::GetConfig for App {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384> {
        &self.config.jwt_signing_key.0
    }
}

impl peel_db::GetPgPool for App {
    fn get_pg_pool(&self) -> &sqlx::PgPool {
        &self.db.pg_pool
    }
}
