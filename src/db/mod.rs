use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool as R2d2Pool, PooledConnection};
use dotenv::dotenv;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};
use std::env;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = R2d2Pool<ConnectionManager<PgConnection>>;

pub struct DbConnection(pub PooledConnection<ConnectionManager<PgConnection>>);

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("DATABASE_URL is not set")]
    Var(#[from] env::VarError),
    #[error("failed to build the connection pool")]
    Pool(#[from] r2d2::Error),
}

/// Attempts to retrieve a single connection from the managed database pool. If
/// no pool is currently managed, fails with an `InternalServerError` status. If
/// no connections are available, fails with a `ServiceUnavailable` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for DbConnection {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<DbConnection, ()> {
        match request.rocket().state::<Pool>() {
            Some(pool) => match pool.get() {
                Ok(conn) => Outcome::Success(DbConnection(conn)),
                Err(_) => Outcome::Error((Status::ServiceUnavailable, ())),
            },
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

// For the convenience of using a &mut DbConnection as a &mut PgConnection.
impl Deref for DbConnection {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        &self.0
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut PgConnection {
        &mut self.0
    }
}

pub fn init_pool() -> Result<Pool, SetupError> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().build(manager)?)
}
