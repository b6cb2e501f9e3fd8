use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, status, Responder};
use rocket::serde::json::{json, Json};

/// Everything a handler can fail with, tagged with its place in the HTTP
/// error contract. Store-level violations arrive through the `From` impl
/// below; the remaining variants are raised directly by the handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    NotNullViolation,
    ForeignKeyViolation,
    ColumnNotFound,
    TopicNotFound,
    InvalidOrder,
    ArticleNotFound,
    Database(DieselError),
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest
            | ApiError::NotNullViolation
            | ApiError::ForeignKeyViolation
            | ApiError::InvalidOrder => Status::BadRequest,
            ApiError::ColumnNotFound | ApiError::TopicNotFound | ApiError::ArticleNotFound => {
                Status::NotFound
            }
            ApiError::Database(_) => Status::InternalServerError,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest => "Bad request",
            ApiError::NotNullViolation => "Not null violation",
            ApiError::ForeignKeyViolation => "Foreign key violation",
            ApiError::ColumnNotFound => "That column doesn't exist",
            ApiError::TopicNotFound => "That topic doesn't exist",
            ApiError::InvalidOrder => "Invalid order",
            ApiError::ArticleNotFound => "No article of that id found",
            ApiError::Database(_) => "Internal Server Error",
        }
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, _) => {
                ApiError::NotNullViolation
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                ApiError::ForeignKeyViolation
            }
            DieselError::NotFound => ApiError::ArticleNotFound,
            other => ApiError::Database(other),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::Database(ref err) = self {
            log::error!("unhandled database error: {}", err);
        }
        let body = json!({ "msg": self.message() });
        status::Custom(self.status(), Json(body)).respond_to(req)
    }
}
