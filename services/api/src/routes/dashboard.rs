//! Dashboard route
//!
//! Read-only reporting for the current user, recomputed on every request:
//! four stat triples with growth labels, the three most recent mutual
//! matches, and a merged recent-activity feed.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError, models::user::User, repositories::dashboard::ActivityRow, state::AppState,
};

/// Avatar fallback when a match has no photos
const DEFAULT_AVATAR: &str = "/diverse-user-avatars.png";

/// Counts for one metric across the three reporting windows
struct StatWindow {
    current: i64,
    previous: i64,
    total: i64,
}

/// One dashboard stat tile
#[derive(Serialize)]
struct StatItem {
    label: &'static str,
    value: String,
    change: String,
}

/// Welcome block at the top of the dashboard
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Welcome {
    name: String,
    new_matches: i64,
    unread_messages: i64,
}

/// Profile card for a recent mutual match
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentMatchCard {
    id: Uuid,
    name: String,
    age: i32,
    location: String,
    avatar: String,
    compatibility: i32,
}

/// One entry of the merged activity feed
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityItem {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
    time: String,
    created_at: DateTime<Utc>,
}

/// Dashboard data for the authenticated user
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = &state.dashboard_repository;
    let now = Utc::now();
    let seven_days_ago = now - Duration::days(7);
    let fourteen_days_ago = now - Duration::days(14);

    let profile_views = StatWindow {
        current: repo
            .distinct_inbound_senders(user.id, Some(seven_days_ago), None)
            .await?,
        previous: repo
            .distinct_inbound_senders(user.id, Some(fourteen_days_ago), Some(seven_days_ago))
            .await?,
        total: repo.distinct_inbound_senders(user.id, None, None).await?,
    };

    let matches = StatWindow {
        current: repo
            .mutual_accepted_count(user.id, Some(seven_days_ago), None)
            .await?,
        previous: repo
            .mutual_accepted_count(user.id, Some(fourteen_days_ago), Some(seven_days_ago))
            .await?,
        total: repo.mutual_accepted_count(user.id, None, None).await?,
    };

    let messages = StatWindow {
        current: repo
            .inbound_message_count(user.id, Some(seven_days_ago), None)
            .await?,
        previous: repo
            .inbound_message_count(user.id, Some(fourteen_days_ago), Some(seven_days_ago))
            .await?,
        total: repo.inbound_message_count(user.id, None, None).await?,
    };

    let likes = StatWindow {
        current: repo
            .inbound_interested_count(user.id, Some(seven_days_ago), None)
            .await?,
        previous: repo
            .inbound_interested_count(user.id, Some(fourteen_days_ago), Some(seven_days_ago))
            .await?,
        total: repo.inbound_interested_count(user.id, None, None).await?,
    };

    let stats = vec![
        StatItem {
            label: "Profile Views",
            value: profile_views.total.to_string(),
            change: calculate_growth(profile_views.current, profile_views.previous),
        },
        StatItem {
            label: "Matches",
            value: matches.total.to_string(),
            change: calculate_growth(matches.current, matches.previous),
        },
        StatItem {
            label: "Messages",
            value: messages.total.to_string(),
            change: calculate_growth(messages.current, messages.previous),
        },
        StatItem {
            label: "Likes Received",
            value: likes.total.to_string(),
            change: calculate_growth(likes.current, likes.previous),
        },
    ];

    let recent_rows = repo.recent_matches(user.id, 3).await?;
    let recent_matches: Vec<RecentMatchCard> = {
        let mut rng = rand::thread_rng();
        recent_rows
        .into_iter()
        .map(|m| {
            let avatar = m
                .profile_images
                .first()
                .cloned()
                .or_else(|| m.profile_url.clone())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
            RecentMatchCard {
                id: m.other_user_id,
                name: m.name,
                age: m.age,
                location: if m.location.is_empty() {
                    "Not specified".to_string()
                } else {
                    m.location
                },
                avatar,
                // Placeholder figure until real compatibility scoring exists.
                compatibility: rng.gen_range(85..100),
            }
        })
        .collect()
    };

    let match_activity = repo.recent_match_activity(user.id, seven_days_ago).await?;
    let like_activity = repo.recent_like_activity(user.id, seven_days_ago).await?;
    let message_activity = repo.recent_message_activity(user.id, seven_days_ago).await?;
    let recent_activity = merge_activity(match_activity, like_activity, message_activity, now);

    let unread_messages = repo.unread_message_count(user.id).await?;

    let welcome = Welcome {
        name: user.name,
        new_matches: matches.current,
        unread_messages,
    };

    Ok(Json(json!({
        "message": "Dashboard data fetched successfully",
        "data": {
            "welcome": welcome,
            "stats": stats,
            "recentMatches": recent_matches,
            "recentActivity": recent_activity,
        }
    })))
}

/// Merge the three activity sources, newest first, capped to four entries
fn merge_activity(
    matches: Vec<ActivityRow>,
    likes: Vec<ActivityRow>,
    messages: Vec<ActivityRow>,
    now: DateTime<Utc>,
) -> Vec<ActivityItem> {
    let mut all: Vec<ActivityItem> = Vec::new();

    for row in matches {
        all.push(ActivityItem {
            kind: "match",
            message: format!("You matched with {}", row.other_user_name),
            time: String::new(),
            created_at: row.created_at,
        });
    }
    for row in likes {
        all.push(ActivityItem {
            kind: "like",
            message: format!("{} liked your profile", row.other_user_name),
            time: String::new(),
            created_at: row.created_at,
        });
    }
    for row in messages {
        all.push(ActivityItem {
            kind: "message",
            message: format!("New message from {}", row.other_user_name),
            time: String::new(),
            created_at: row.created_at,
        });
    }

    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    all.truncate(4);
    for item in &mut all {
        item.time = format_time_ago(item.created_at, now);
    }

    all
}

/// Percentage-change label between two periods
///
/// A previous period of zero is special-cased: any growth reads "+100%",
/// no activity at all reads "0%".
fn calculate_growth(current: i64, previous: i64) -> String {
    if previous == 0 {
        return if current > 0 {
            "+100%".to_string()
        } else {
            "0%".to_string()
        };
    }

    let growth = ((current - previous) as f64 / previous as f64) * 100.0;
    if growth >= 0.0 {
        format!("+{:.0}%", growth)
    } else {
        format!("{:.0}%", growth)
    }
}

/// Human-readable relative time, bucketed as minutes/hours/days, falling
/// back to a calendar date after a week
fn format_time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(date);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 60 {
        format!("{} minute{} ago", minutes, if minutes == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if days < 7 {
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        date.format("%-m/%-d/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_calculate_growth() {
        assert_eq!(calculate_growth(10, 0), "+100%");
        assert_eq!(calculate_growth(0, 0), "0%");
        assert_eq!(calculate_growth(5, 10), "-50%");
        assert_eq!(calculate_growth(15, 10), "+50%");
        assert_eq!(calculate_growth(10, 10), "+0%");
    }

    #[test]
    fn test_format_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        assert_eq!(
            format_time_ago(now - Duration::minutes(1), now),
            "1 minute ago"
        );
        assert_eq!(
            format_time_ago(now - Duration::minutes(45), now),
            "45 minutes ago"
        );
        assert_eq!(format_time_ago(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(
            format_time_ago(now - Duration::hours(23), now),
            "23 hours ago"
        );
        assert_eq!(format_time_ago(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_time_ago(now - Duration::days(6), now), "6 days ago");
        assert_eq!(format_time_ago(now - Duration::days(8), now), "6/7/2024");
    }

    #[test]
    fn test_merge_activity_sorts_and_caps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let row = |name: &str, minutes_ago: i64| ActivityRow {
            other_user_name: name.to_string(),
            created_at: now - Duration::minutes(minutes_ago),
        };

        let merged = merge_activity(
            vec![row("Ana", 30), row("Ben", 300)],
            vec![row("Cleo", 10), row("Dan", 200)],
            vec![row("Eve", 5)],
            now,
        );

        assert_eq!(merged.len(), 4);
        assert_eq!(merged[0].message, "New message from Eve");
        assert_eq!(merged[1].message, "Cleo liked your profile");
        assert_eq!(merged[2].message, "You matched with Ana");
        assert_eq!(merged[3].message, "Dan liked your profile");
        assert_eq!(merged[0].time, "5 minutes ago");
    }
}
