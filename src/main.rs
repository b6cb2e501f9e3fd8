#[macro_use]
extern crate rocket;

mod article;
mod comment;
mod db;
mod topic;
mod types;
mod user;
mod utils;

use rocket::serde::json::{json, Json, Value};
use rocket::{Build, Rocket};

use db::Pool;

#[catch(400)]
fn bad_request() -> Json<Value> {
    Json(json!({ "msg": "Bad request" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "msg": "Invalid path" }))
}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "msg": "Internal Server Error" }))
}

fn build_rocket(pool: Pool) -> Rocket<Build> {
    let cors = rocket_cors::CorsOptions::default()
        .to_cors()
        .expect("default CORS options are valid");

    rocket::build()
        .manage(pool)
        .attach(cors)
        .mount("/api/topics", routes![topic::list])
        .mount(
            "/api/articles",
            routes![
                article::list,
                article::fetch,
                article::update_votes,
                comment::list,
                comment::create,
            ],
        )
        .mount("/api/users", routes![user::list])
        .register("/", catchers![bad_request, not_found, internal_error])
}

#[launch]
fn rocket() -> _ {
    let pool = db::init_pool().expect("Failed to create database pool");
    build_rocket(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::pg::PgConnection;
    use diesel::r2d2::ConnectionManager;
    use rocket::http::Status;
    use rocket::local::blocking::Client;

    // A pool that never opens a connection; none of these requests reach a
    // route that would ask it for one.
    fn lazy_pool() -> Pool {
        let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unused");
        Pool::builder().build_unchecked(manager)
    }

    fn client() -> Client {
        Client::tracked(build_rocket(lazy_pool())).expect("valid rocket instance")
    }

    #[test]
    fn unmatched_paths_answer_404_invalid_path() {
        let client = client();
        let response = client.get("/api/invalid-path").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<Value>().unwrap();
        assert_eq!(body["msg"], "Invalid path");
    }

    #[test]
    fn unmatched_methods_answer_404_invalid_path() {
        let client = client();
        let response = client.delete("/api/topics").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<Value>().unwrap();
        assert_eq!(body["msg"], "Invalid path");
    }

    #[test]
    fn nested_unmatched_paths_answer_404_invalid_path() {
        let client = client();
        let response = client.get("/api/articles/1/comments/extra").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<Value>().unwrap();
        assert_eq!(body["msg"], "Invalid path");
    }
}
