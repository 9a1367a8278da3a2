use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{contains_lowercase, error::Result, FormErrors, RecordId};

/// A traveller profile as the user endpoints return it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: Option<RecordId>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub travel_type_preference: Option<String>,
    pub season_preference: Option<String>,
    #[serde(deserialize_with = "list_or_null")]
    pub past_visited_destinations: Vec<String>,
    #[serde(deserialize_with = "list_or_null")]
    pub preferences: Vec<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

fn list_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(values.into_iter().flatten().flatten().collect())
}

/// Admin user search over name, login, email, profession, visited places and preferences
#[must_use]
pub fn search_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return users.iter().collect();
    }

    users
        .iter()
        .filter(|u| {
            [&u.name, &u.user_name, &u.user_email, &u.profession]
                .into_iter()
                .flatten()
                .chain(&u.past_visited_destinations)
                .chain(&u.preferences)
                .any(|field| contains_lowercase(field, &term))
        })
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// The travel-profile form used both after registration and for later edits
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub gender: String,
    /// `YYYY-MM-DD`
    pub dob: String,
    pub profession: String,
    pub budget_min: String,
    pub budget_max: String,
    pub travel_type_preference: String,
    pub season_preference: String,
    /// Comma separated
    pub past_visited_destinations: String,
    /// Comma separated
    pub preferences: String,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: "male".to_string(),
            dob: String::new(),
            profession: String::new(),
            budget_min: String::new(),
            budget_max: String::new(),
            travel_type_preference: "beach".to_string(),
            season_preference: "summer".to_string(),
            past_visited_destinations: String::new(),
            preferences: String::new(),
        }
    }
}

/// Validated profile fields, shared by the add and update request bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub name: String,
    pub gender: String,
    pub dob: String,
    pub profession: String,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub travel_type_preference: String,
    pub season_preference: String,
    pub past_visited_destinations: Vec<String>,
    pub preferences: Vec<String>,
}

/// Body of `POST /api/v1/user/add/{email}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile<'a> {
    pub user_login_id: &'a str,
    #[serde(flatten)]
    pub details: &'a ProfileDetails,
}

/// Body of `PUT /api/v1/user/update`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub user_id: RecordId,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

fn parse_budget(value: &str, field: &'static str, message: &str, errors: &mut FormErrors) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
        _ => {
            errors.add(field, message);
            None
        }
    }
}

impl ProfileForm {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        let defaults = Self::default();
        let budget = |amount: Option<f64>| amount.map(|a| a.to_string()).unwrap_or_default();
        Self {
            name: user.name.clone().unwrap_or_default(),
            gender: user.gender.clone().unwrap_or(defaults.gender),
            dob: user.dob.clone().unwrap_or_default(),
            profession: user.profession.clone().unwrap_or_default(),
            budget_min: budget(user.budget_min),
            budget_max: budget(user.budget_max),
            travel_type_preference: user
                .travel_type_preference
                .clone()
                .unwrap_or(defaults.travel_type_preference),
            season_preference: user
                .season_preference
                .clone()
                .unwrap_or(defaults.season_preference),
            past_visited_destinations: user.past_visited_destinations.join(", "),
            preferences: user.preferences.join(", "),
        }
    }

    pub fn validate(&self) -> Result<ProfileDetails> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Full name is required");
        }

        let dob = self.dob.trim();
        let parsed_dob = if dob.is_empty() {
            errors.add("dob", "Date of birth is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(dob, "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add("dob", "Date of birth must be YYYY-MM-DD");
            }
            parsed
        };

        if self.profession.trim().is_empty() {
            errors.add("profession", "Profession is required");
        }

        let budget_min = parse_budget(&self.budget_min, "budgetMin", "Invalid minimum budget", &mut errors);
        let budget_max = parse_budget(&self.budget_max, "budgetMax", "Invalid maximum budget", &mut errors);
        if let (Some(min), Some(max)) = (budget_min, budget_max) {
            if min > max {
                errors.add("budgetMax", "Maximum budget should be greater than minimum");
            }
        }
        errors.into_result()?;

        Ok(ProfileDetails {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            dob: parsed_dob
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            profession: self.profession.trim().to_string(),
            budget_min,
            budget_max,
            travel_type_preference: self.travel_type_preference.trim().to_string(),
            season_preference: self.season_preference.trim().to_string(),
            past_visited_destinations: split_list(&self.past_visited_destinations),
            preferences: split_list(&self.preferences),
        })
    }
}

/// Profile fields given on the command line; `None` keeps what is there
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEdits {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub budget_min: Option<String>,
    pub budget_max: Option<String>,
    pub travel_type_preference: Option<String>,
    pub season_preference: Option<String>,
    pub past_visited_destinations: Option<String>,
    pub preferences: Option<String>,
}

impl ProfileEdits {
    pub fn apply(&self, form: &mut ProfileForm) {
        let fields = [
            (&self.name, &mut form.name),
            (&self.gender, &mut form.gender),
            (&self.dob, &mut form.dob),
            (&self.profession, &mut form.profession),
            (&self.budget_min, &mut form.budget_min),
            (&self.budget_max, &mut form.budget_max),
            (&self.travel_type_preference, &mut form.travel_type_preference),
            (&self.season_preference, &mut form.season_preference),
            (&self.past_visited_destinations, &mut form.past_visited_destinations),
            (&self.preferences, &mut form.preferences),
        ];
        for (edit, field) in fields {
            if let Some(value) = edit {
                field.clone_from(value);
            }
        }
    }

    #[must_use]
    pub fn into_form(self) -> ProfileForm {
        let mut form = ProfileForm::default();
        self.apply(&mut form);
        form
    }
}
