use crate::{error::Result, Dashboard, Destination, FilterState, Review, User, PRICE_BUCKETS};

const STARS: usize = 5;

/// Five-star bar, rounded to the nearest whole star
pub fn star_bar(rating: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(STARS - filled))
}

pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

/// One destination as a card in the results grid
pub fn destination_card(destination: &Destination) -> String {
    let mut body = format!(
        "* {name} [{kind}] {stars} {rating:.1}\n  {price}/day - {description}\n",
        name = destination.name,
        kind = if destination.is_categorized() {
            destination.kind.as_str()
        } else {
            "uncategorized"
        },
        stars = star_bar(destination.rating),
        rating = destination.rating,
        price = format_price(destination.price),
        description = destination.description,
    );
    if !destination.tags.is_empty() {
        body.push_str(&format!("  tags: {}\n", destination.tags.join(", ")));
    }
    body
}

/// The browse screen: facets, active filters and the filtered results
pub fn catalog_page(view: &[&Destination], categories: &[String], state: &FilterState) -> String {
    let mut body = String::from("Recommended Destinations\n\n");

    let category_line: Vec<String> = categories
        .iter()
        .map(|c| {
            if c == state.category.label() {
                format!("[{c}]")
            } else {
                c.clone()
            }
        })
        .collect();
    body.push_str(&format!("Category: {}\n", category_line.join(" ")));

    let price_line: Vec<String> = PRICE_BUCKETS
        .iter()
        .map(|bucket| {
            if state.price_range == Some(bucket.range) {
                format!("[{}]", bucket.label)
            } else {
                bucket.label.to_string()
            }
        })
        .collect();
    body.push_str(&format!("Price: {}\n", price_line.join(" ")));

    if state.is_active() {
        let active = state.active_labels();
        if !active.is_empty() {
            body.push_str(&format!("Active filters: {}\n", active.join(", ")));
        }
        body.push_str("(--clear resets all filters)\n");
    }
    if !state.search_query.is_empty() {
        body.push_str(&format!("Search: \"{}\"\n", state.search_query));
    }
    body.push('\n');

    if view.is_empty() {
        body.push_str(&no_results());
    } else {
        for destination in view {
            body.push_str(&destination_card(destination));
        }
    }
    body
}

pub fn no_results() -> String {
    String::from(
        "No destinations found\nTry adjusting your filters or search term\n(run with --clear to clear all filters)\n",
    )
}

/// Detail screen with travel information and reviews
pub fn destination_detail(destination: &Destination, reviews: &[Review], average: f64) -> String {
    let mut body = format!(
        "{name}\n{stars} {average:.1} ({count} reviews)\n\n{description}\n\n",
        name = destination.name,
        stars = star_bar(average),
        count = reviews.len(),
        description = destination.description,
    );
    body.push_str(&format!("Type: {}\n", or_na(Some(destination.kind.as_str()))));
    body.push_str(&format!("Best season: {}\n", destination.best_season));
    body.push_str(&format!("Popularity: {}%\n", destination.popularity.min(100.0)));
    if let Some(added) = destination.added_time {
        body.push_str(&format!("Added: {}\n", added.format("%b %-d, %Y")));
    }
    body.push_str(&format!("Price: {} per day\n", format_price(destination.price)));
    if !destination.tags.is_empty() {
        body.push_str(&format!("Tags: {}\n", destination.tags.join(", ")));
    }
    body.push_str(&format!("Image: {}\n\nReviews\n", destination.image));

    if reviews.is_empty() {
        body.push_str("No reviews yet. Be the first to share your experience!\n");
    }
    for review in reviews {
        body.push_str(&format!(
            "{stars} {user}: {feedback}\n",
            stars = star_bar(review.rating),
            user = or_na(review.user_name.as_deref()),
            feedback = or_na(review.feedback.as_deref()),
        ));
    }
    body
}

fn showing_line(shown: usize, total: usize, noun: &str, term: &str) -> String {
    let mut line = format!("Showing {shown} of {total} {noun}");
    if !term.trim().is_empty() {
        line.push_str(&format!(" for \"{}\"", term.trim()));
    }
    line.push('\n');
    line
}

/// Admin moderation table
pub fn feedback_table(shown: &[&Review], total: usize, term: &str) -> String {
    let mut body = showing_line(shown.len(), total, "feedback entries", term);
    for (index, review) in shown.iter().enumerate() {
        body.push_str(&format!(
            "{n:>3}. {stars} | {feedback} | {user} | {destination} | id {id}\n",
            n = index + 1,
            stars = star_bar(review.rating),
            feedback = or_na(review.feedback.as_deref()),
            user = or_na(review.user_name.as_deref()),
            destination = or_na(review.destination_name.as_deref()),
            id = review
                .id
                .as_ref()
                .map_or_else(|| "N/A".to_string(), ToString::to_string),
        ));
    }
    body
}

/// Admin destination table
pub fn destination_table(shown: &[&Destination], total: usize, term: &str) -> String {
    let mut body = showing_line(shown.len(), total, "destinations", term);
    for (index, destination) in shown.iter().enumerate() {
        body.push_str(&format!(
            "{n:>3}. {name} | {kind} | {price} | {season} | {stars} | id {id}\n",
            n = index + 1,
            name = or_na(Some(destination.name.as_str())),
            kind = or_na(Some(destination.kind.as_str())),
            price = format_price(destination.price),
            season = destination.best_season,
            stars = star_bar(destination.rating),
            id = destination.id,
        ));
    }
    body
}

/// Admin user table
pub fn user_table(shown: &[&User], total: usize, term: &str) -> String {
    let mut body = showing_line(shown.len(), total, "users", term);
    for (index, user) in shown.iter().enumerate() {
        body.push_str(&format!(
            "{n:>3}. {name} | {login} | {email} | {profession} | id {id}\n",
            n = index + 1,
            name = or_na(user.name.as_deref()),
            login = or_na(user.user_name.as_deref()),
            email = or_na(user.user_email.as_deref()),
            profession = or_na(user.profession.as_deref()),
            id = user
                .user_id
                .as_ref()
                .map_or_else(|| "N/A".to_string(), ToString::to_string),
        ));
    }
    body
}

fn budget_line(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (None, None) => "N/A".to_string(),
        (min, max) => format!(
            "{} - {}",
            min.map_or_else(|| "?".to_string(), format_price),
            max.map_or_else(|| "?".to_string(), format_price)
        ),
    }
}

fn list_or_na(items: &[String]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.join(", ")
    }
}

/// The signed-in traveller's profile
pub fn user_profile(user: &User) -> String {
    let mut body = format!("{}\n", or_na(user.name.as_deref()));
    let rows = [
        ("Username", or_na(user.user_name.as_deref()).to_string()),
        ("Email", or_na(user.user_email.as_deref()).to_string()),
        ("Gender", or_na(user.gender.as_deref()).to_string()),
        ("Date of birth", or_na(user.dob.as_deref()).to_string()),
        ("Profession", or_na(user.profession.as_deref()).to_string()),
        ("Budget", budget_line(user.budget_min, user.budget_max)),
        ("Travel type", or_na(user.travel_type_preference.as_deref()).to_string()),
        ("Season", or_na(user.season_preference.as_deref()).to_string()),
        ("Visited", list_or_na(&user.past_visited_destinations)),
        ("Preferences", list_or_na(&user.preferences)),
    ];
    for (label, value) in rows {
        body.push_str(&format!("  {label}: {value}\n"));
    }
    body
}

fn section<T>(body: &mut String, title: &str, data: &Result<Vec<T>>, line: impl Fn(&T) -> String) {
    body.push_str(&format!("\n{title}\n"));
    match data {
        Err(e) => body.push_str(&format!("  Error loading {}: {e}\n", title.to_lowercase())),
        Ok(items) if items.is_empty() => body.push_str("  Nothing yet\n"),
        Ok(items) => {
            for item in items {
                body.push_str(&format!("  {}\n", line(item)));
            }
        }
    }
}

/// Admin overview: headline stats, seasons, recent activity and tags
pub fn dashboard_page(dashboard: &Dashboard) -> String {
    let mut body = String::from("Dashboard\n");
    section(&mut body, "Stats", &dashboard.stats, |stat| {
        format!("{}: {} {}", stat.title, stat.value_text(), stat.change_text())
            .trim_end()
            .to_string()
    });
    section(&mut body, "Seasonal Recommendations", &dashboard.seasons, |(season, count)| {
        format!("{season}: {count}")
    });
    section(&mut body, "Recent Activities", &dashboard.activities, |activity| {
        format!("{} ({})", activity.plain_title(), activity.time)
    });
    section(&mut body, "Popular Activity Tags", &dashboard.tags, |(tag, count)| {
        format!("{tag} ({count})")
    });
    body
}
