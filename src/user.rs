use diesel::prelude::*;
use rocket::serde::json::Json;
use serde::Serialize;

use crate::db::schema::users;
use crate::db::DbConnection;
use crate::types::ApiResult;

#[derive(Debug, PartialEq, Queryable, Serialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[get("/")]
pub fn list(mut connection: DbConnection) -> ApiResult<UsersResponse> {
    let users = users::table.load::<User>(&mut *connection)?;
    Ok(Json(UsersResponse { users }))
}
