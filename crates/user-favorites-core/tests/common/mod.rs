// SPDX-License-Identifier: AGPL-3.0
// Local stand-in for the remote user directory

#![allow(dead_code)]

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use user_favorites_core::{ApiUser, UsersPage};

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
}

pub fn user(id: u32, first: &str, last: &str) -> ApiUser {
    ApiUser {
        id,
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        first_name: first.to_string(),
        last_name: last.to_string(),
        avatar: format!("https://example.com/faces/{}.jpg", id),
    }
}

fn serve_page(
    pages: &[Vec<ApiUser>],
    broken: Option<u32>,
    page: u32,
) -> Result<Json<UsersPage>, StatusCode> {
    if broken == Some(page) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let data = pages
        .get((page as usize).wrapping_sub(1))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(UsersPage {
        page,
        per_page: data.len() as u32,
        total: pages.iter().map(|p| p.len() as u32).sum(),
        total_pages: pages.len() as u32,
        data,
    }))
}

/// Serve `pages` under `/api/users?page=<n>`; `broken` answers 500 for one page.
/// Returns the API base URL.
pub async fn spawn_directory(pages: Vec<Vec<ApiUser>>, broken: Option<u32>) -> String {
    let pages = Arc::new(pages);
    let app = Router::new().route(
        "/api/users",
        get(move |Query(query): Query<PageQuery>| {
            let pages = pages.clone();
            async move { serve_page(&pages, broken, query.page) }
        }),
    );
    serve(app).await
}

/// Serve a body that is not a directory page
pub async fn spawn_garbage() -> String {
    let app = Router::new().route("/api/users", get(|| async { "<html>maintenance</html>" }));
    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}
