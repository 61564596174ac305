use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use folio_core::prompt::greeting;

use crate::state::AppState;

/// `GET /api/site`: portfolio content for the page renderer.
///
/// Projects are ordered by ascending `priority`; `featured_project_ids` lists
/// the deep-dive projects in declaration order.
pub async fn site(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let site = &state.site;
    let skills_radar: Vec<_> = site
        .skill_categories
        .iter()
        .map(|c| json!({ "subject": c.title, "score": c.radar_score() }))
        .collect();
    let featured: Vec<&str> = site.featured_projects().map(|p| p.id.as_str()).collect();

    Json(json!({
        "data": {
            "profile": site.profile,
            "bio": site.bio,
            "social_links": site.social_links,
            "skill_categories": site.skill_categories,
            "skills_radar": skills_radar,
            "projects": site.projects_by_priority(),
            "featured_project_ids": featured,
            "chat_greeting": greeting(site),
        }
    }))
}
