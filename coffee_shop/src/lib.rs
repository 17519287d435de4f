//! A drink menu API whose mutating routes are guarded by permissions carried
//! in provider-issued bearer tokens.
//!
//! | route                  | permission          |
//! |------------------------|---------------------|
//! | `GET /`                | public              |
//! | `GET /drinks`          | public              |
//! | `GET /drinks-detail`   | `get:drinks-detail` |
//! | `POST /drinks`         | `post:drinks`       |
//! | `PATCH /drinks/:id`    | `patch:drinks`      |
//! | `DELETE /drinks/:id`   | `delete:drinks`     |
//! | `GET /me`              | any valid token     |
//!
//! Every route answers CORS preflight requests for the origins listed in
//! [`config::Settings::cors_origins`].

pub mod config;
pub mod drinks;
mod routes;

pub use routes::{cors, router, AppState};
