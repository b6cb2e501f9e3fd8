use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz};
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use crate::db::schema::articles;
use crate::db::DbConnection;
use crate::topic::Topic;
use crate::types::{ApiError, ApiResult};
use crate::utils::serialize_date;

static LIST_ARTICLES: &str = "select articles.article_id,
       articles.title,
       articles.topic,
       articles.author,
       articles.body,
       articles.created_at,
       articles.votes,
       articles.article_img_url,
       coalesce(counts.comment_count, 0) as comment_count
  from articles LEFT JOIN (select comments.article_id, count(comments.comment_id) as comment_count
                             from comments GROUP BY comments.article_id) as counts
                on articles.article_id = counts.article_id";

/// Columns the listing may be sorted by. Anything else is rejected before a
/// query is built, so only these identifiers ever reach the SQL text; the
/// topic filter is always a bind parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortColumn {
    ArticleId,
    Title,
    Topic,
    Author,
    Body,
    CreatedAt,
    Votes,
    ArticleImgUrl,
}

impl SortColumn {
    fn parse(raw: &str) -> Result<SortColumn, ApiError> {
        match raw {
            "article_id" => Ok(SortColumn::ArticleId),
            "title" => Ok(SortColumn::Title),
            "topic" => Ok(SortColumn::Topic),
            "author" => Ok(SortColumn::Author),
            "body" => Ok(SortColumn::Body),
            "created_at" => Ok(SortColumn::CreatedAt),
            "votes" => Ok(SortColumn::Votes),
            "article_img_url" => Ok(SortColumn::ArticleImgUrl),
            _ => Err(ApiError::ColumnNotFound),
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortColumn::ArticleId => "article_id",
            SortColumn::Title => "title",
            SortColumn::Topic => "topic",
            SortColumn::Author => "author",
            SortColumn::Body => "body",
            SortColumn::CreatedAt => "created_at",
            SortColumn::Votes => "votes",
            SortColumn::ArticleImgUrl => "article_img_url",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn parse(raw: &str) -> Result<SortOrder, ApiError> {
        if raw.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Ascending)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Descending)
        } else {
            Err(ApiError::InvalidOrder)
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// The validated query parameters of one listing request.
#[derive(Debug)]
pub struct ListingParams {
    topic: Option<String>,
    sort_by: SortColumn,
    order: SortOrder,
}

impl ListingParams {
    pub fn new(
        topic: Option<String>,
        sort_by: Option<String>,
        order: Option<String>,
    ) -> Result<ListingParams, ApiError> {
        let sort_by = match sort_by {
            Some(raw) => SortColumn::parse(&raw)?,
            None => SortColumn::CreatedAt,
        };
        let order = match order {
            Some(raw) => SortOrder::parse(&raw)?,
            None => SortOrder::Descending,
        };
        Ok(ListingParams {
            topic,
            sort_by,
            order,
        })
    }

    fn query(&self) -> String {
        let filter = match self.topic {
            Some(_) => " WHERE articles.topic = $1",
            None => "",
        };
        format!(
            "{}{} ORDER BY articles.{} {}",
            LIST_ARTICLES,
            filter,
            self.sort_by.as_sql(),
            self.order.as_sql()
        )
    }
}

#[derive(Debug, PartialEq, Queryable, Serialize)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: String,
}

#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleWithCommentCount {
    #[diesel(sql_type = Integer)]
    article_id: i32,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = Text)]
    topic: String,
    #[diesel(sql_type = Text)]
    author: String,
    #[diesel(sql_type = Text)]
    body: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_date")]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    votes: i32,
    #[diesel(sql_type = Text)]
    article_img_url: String,
    #[diesel(sql_type = BigInt)]
    comment_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleWithCommentCount>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    article: Article,
}

#[derive(Debug, Deserialize)]
pub struct VotePatch {
    inc_votes: i32,
}

impl Article {
    pub fn exists(id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(articles::table.find(id))).get_result(connection)
    }
}

#[get("/?<topic>&<sort_by>&<order>")]
pub fn list(
    mut connection: DbConnection,
    topic: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
) -> ApiResult<ArticlesResponse> {
    let params = ListingParams::new(topic, sort_by, order)?;

    if let Some(ref topic) = params.topic {
        if !Topic::exists(topic, &mut connection)? {
            return Err(ApiError::TopicNotFound);
        }
    }

    let query = params.query();
    let articles = match params.topic {
        Some(ref topic) => sql_query(query)
            .bind::<Text, _>(topic)
            .get_results::<ArticleWithCommentCount>(&mut *connection)?,
        None => sql_query(query).get_results::<ArticleWithCommentCount>(&mut *connection)?,
    };

    Ok(Json(ArticlesResponse { articles }))
}

#[get("/<article_id>")]
pub fn fetch(mut connection: DbConnection, article_id: Result<i32, &str>) -> ApiResult<ArticleResponse> {
    let article_id = article_id.map_err(|_| ApiError::BadRequest)?;
    let article = articles::table
        .find(article_id)
        .first::<Article>(&mut *connection)
        .optional()?
        .ok_or(ApiError::ArticleNotFound)?;

    Ok(Json(ArticleResponse { article }))
}

#[patch("/<article_id>", format = "json", data = "<patch>")]
pub fn update_votes(
    mut connection: DbConnection,
    article_id: Result<i32, &str>,
    patch: Option<Json<VotePatch>>,
) -> ApiResult<ArticleResponse> {
    let article_id = article_id.map_err(|_| ApiError::BadRequest)?;
    let patch = patch.ok_or(ApiError::BadRequest)?.into_inner();

    let article = diesel::update(articles::table.find(article_id))
        .set(articles::votes.eq(articles::votes + patch.inc_votes))
        .get_result::<Article>(&mut *connection)
        .optional()?
        .ok_or(ApiError::ArticleNotFound)?;

    Ok(Json(ArticleResponse { article }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_allow_listed_column_parses() {
        let columns = [
            "article_id",
            "title",
            "topic",
            "author",
            "body",
            "created_at",
            "votes",
            "article_img_url",
        ];
        for column in columns {
            let parsed = SortColumn::parse(column).unwrap();
            assert_eq!(parsed.as_sql(), column);
        }
    }

    #[test]
    fn unknown_sort_column_is_rejected_before_querying() {
        let params = ListingParams::new(None, Some("bananas; drop table articles".into()), None);
        assert!(matches!(params, Err(ApiError::ColumnNotFound)));
    }

    #[test]
    fn order_is_parsed_case_insensitively() {
        assert_eq!(SortOrder::parse("asc").unwrap(), SortOrder::Ascending);
        assert_eq!(SortOrder::parse("ASC").unwrap(), SortOrder::Ascending);
        assert_eq!(SortOrder::parse("Desc").unwrap(), SortOrder::Descending);
    }

    #[test]
    fn unknown_order_is_rejected_before_querying() {
        let params = ListingParams::new(None, None, Some("sideways".into()));
        assert!(matches!(params, Err(ApiError::InvalidOrder)));
    }

    #[test]
    fn listing_defaults_to_newest_first() {
        let params = ListingParams::new(None, None, None).unwrap();
        assert_eq!(params.sort_by, SortColumn::CreatedAt);
        assert_eq!(params.order, SortOrder::Descending);
        assert!(params.query().ends_with("ORDER BY articles.created_at DESC"));
    }

    #[test]
    fn topic_filter_is_a_bind_parameter() {
        let filtered = ListingParams::new(Some("cats".into()), None, None).unwrap();
        assert!(filtered.query().contains("WHERE articles.topic = $1"));
        assert!(!filtered.query().contains("cats"));

        let unfiltered = ListingParams::new(None, None, None).unwrap();
        assert!(!unfiltered.query().contains("WHERE"));
    }

    #[test]
    fn order_clause_uses_validated_identifiers() {
        let params =
            ListingParams::new(None, Some("votes".into()), Some("asc".into())).unwrap();
        assert!(params.query().ends_with("ORDER BY articles.votes ASC"));
    }

    #[test]
    fn listing_query_aggregates_comment_counts() {
        let params = ListingParams::new(None, None, None).unwrap();
        let query = params.query();
        assert!(query.contains("coalesce(counts.comment_count, 0) as comment_count"));
        assert!(query.contains("GROUP BY comments.article_id"));
    }
}
