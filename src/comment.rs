use chrono::{DateTime, Utc};
use diesel::insert_into;
use diesel::prelude::*;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::db::schema::comments;
use crate::db::DbConnection;
use crate::types::{ApiError, ApiResult};
use crate::utils::serialize_date;

#[derive(Debug, PartialEq, Queryable, Serialize)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
}

// `author` and `body` stay optional so a missing field reaches the store as
// NULL and comes back as the not-null violation the error contract expects.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    article_id: i32,
    author: Option<String>,
    body: Option<String>,
    votes: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewCommentRequest {
    author: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

#[get("/<article_id>/comments")]
pub fn list(
    mut connection: DbConnection,
    article_id: Result<i32, &str>,
) -> ApiResult<CommentsResponse> {
    let article_id = article_id.map_err(|_| ApiError::BadRequest)?;
    if !Article::exists(article_id, &mut connection)? {
        return Err(ApiError::ArticleNotFound);
    }

    let comments = comments::table
        .filter(comments::article_id.eq(article_id))
        .order(comments::created_at.desc())
        .load::<Comment>(&mut *connection)?;

    Ok(Json(CommentsResponse { comments }))
}

#[post("/<article_id>/comments", format = "json", data = "<details>")]
pub fn create(
    mut connection: DbConnection,
    article_id: Result<i32, &str>,
    details: Option<Json<NewCommentRequest>>,
) -> Result<Created<Json<CommentResponse>>, ApiError> {
    let article_id = article_id.map_err(|_| ApiError::BadRequest)?;
    let details = details.ok_or(ApiError::BadRequest)?.into_inner();

    let new_comment = NewComment {
        article_id,
        author: details.author,
        body: details.body,
        votes: 0,
        created_at: Utc::now(),
    };

    let comment = insert_into(comments::table)
        .values(&new_comment)
        .get_result::<Comment>(&mut *connection)?;

    let location = format!("/api/articles/{}/comments", article_id);
    Ok(Created::new(location).body(Json(CommentResponse { comment })))
}
