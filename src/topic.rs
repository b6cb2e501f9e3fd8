use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use rocket::serde::json::Json;
use serde::Serialize;

use crate::db::schema::topics;
use crate::db::DbConnection;
use crate::types::ApiResult;

#[derive(Debug, PartialEq, Queryable, Serialize)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

impl Topic {
    pub fn exists(slug_: &str, connection: &mut PgConnection) -> QueryResult<bool> {
        use crate::db::schema::topics::dsl::*;
        select(exists(topics.filter(slug.eq(slug_)))).get_result(connection)
    }
}

#[get("/")]
pub fn list(mut connection: DbConnection) -> ApiResult<TopicsResponse> {
    let topics = topics::table.load::<Topic>(&mut *connection)?;
    Ok(Json(TopicsResponse { topics }))
}
