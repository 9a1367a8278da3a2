use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::{error::Result, FormErrors, JsonDestination};

pub const DEFAULT_FORM_KIND: &str = "mountain";
pub const DEFAULT_FORM_SEASON: &str = "summer";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.-]").expect("valid regex"));

/// The admin add/edit destination form, as typed in
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationForm {
    pub name: String,
    pub kind: String,
    pub cost_per_day: String,
    pub best_season: String,
    /// Comma separated
    pub recommended_for: String,
    pub activity_tags: Vec<String>,
    pub description: String,
    pub image_file: Option<PathBuf>,
}

impl Default for DestinationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: DEFAULT_FORM_KIND.to_string(),
            cost_per_day: String::new(),
            best_season: DEFAULT_FORM_SEASON.to_string(),
            recommended_for: String::new(),
            activity_tags: Vec::new(),
            description: String::new(),
            image_file: None,
        }
    }
}

/// The `destination` part of the multipart upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cost_per_day: f64,
    pub best_season_to_visit: String,
    pub recommended_for: Vec<String>,
    pub activity_tags: Vec<String>,
    pub description: String,
}

fn flatten_list(values: Option<&Vec<Option<String>>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}

impl DestinationForm {
    /// Prefill the edit form from a stored record
    #[must_use]
    pub fn from_record(record: &JsonDestination) -> Self {
        let defaults = Self::default();
        Self {
            name: record.name.clone().unwrap_or_default(),
            kind: record.kind.clone().unwrap_or(defaults.kind),
            cost_per_day: record
                .cost_per_day
                .map(|cost| cost.to_string())
                .unwrap_or_default(),
            best_season: record
                .best_season_to_visit
                .clone()
                .unwrap_or(defaults.best_season),
            recommended_for: flatten_list(record.recommended_for.as_ref()).join(", "),
            activity_tags: flatten_list(record.activity_tags.as_ref()),
            description: record.description.clone().unwrap_or_default(),
            image_file: None,
        }
    }

    pub fn validate(&self) -> Result<DestinationPayload> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Destination name is required");
        }

        let cost = self.cost_per_day.trim();
        let cost_per_day = if cost.is_empty() {
            errors.add("costPerDay", "Cost per day is required");
            0.0
        } else {
            match cost.parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    errors.add("costPerDay", "Cost per day must be a number");
                    0.0
                }
            }
        };

        let recommended_for: Vec<String> = self
            .recommended_for
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        if recommended_for.is_empty() {
            errors.add("recommendedFor", "Recommended for is required");
        }
        errors.into_result()?;

        let mut activity_tags: Vec<String> = Vec::new();
        for tag in self.activity_tags.iter().map(|t| t.trim()) {
            if !tag.is_empty() && !activity_tags.iter().any(|t| t == tag) {
                activity_tags.push(tag.to_string());
            }
        }

        Ok(DestinationPayload {
            name: self.name.trim().to_string(),
            kind: self.kind.trim().to_string(),
            cost_per_day,
            best_season_to_visit: self.best_season.trim().to_string(),
            recommended_for,
            activity_tags,
            description: self.description.trim().to_string(),
        })
    }
}

/// Changes requested for an existing destination; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationEdits {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub cost_per_day: Option<String>,
    pub best_season: Option<String>,
    pub recommended_for: Option<String>,
    /// Replaces the stored tags when non-empty
    pub activity_tags: Vec<String>,
    pub description: Option<String>,
    pub image_file: Option<PathBuf>,
}

impl DestinationEdits {
    pub fn apply(&self, form: &mut DestinationForm) {
        let fields = [
            (&self.name, &mut form.name),
            (&self.kind, &mut form.kind),
            (&self.cost_per_day, &mut form.cost_per_day),
            (&self.best_season, &mut form.best_season),
            (&self.recommended_for, &mut form.recommended_for),
            (&self.description, &mut form.description),
        ];
        for (edit, field) in fields {
            if let Some(value) = edit {
                field.clone_from(value);
            }
        }
        if !self.activity_tags.is_empty() {
            form.activity_tags.clone_from(&self.activity_tags);
        }
        if self.image_file.is_some() {
            form.image_file.clone_from(&self.image_file);
        }
    }

    /// A new destination: the edits over an empty form
    #[must_use]
    pub fn into_form(self) -> DestinationForm {
        let mut form = DestinationForm::default();
        self.apply(&mut form);
        form
    }
}

/// Upload name for an image file, with anything but word characters, `.` and `-` replaced
#[must_use]
pub fn upload_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    UNSAFE_FILE_CHARS.replace_all(&name, "_").into_owned()
}

#[must_use]
pub fn image_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    fn errors_of(form: &DestinationForm) -> FormErrors {
        match form.validate() {
            Err(Error::Invalid(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = errors_of(&DestinationForm::default());
        assert_eq!(errors.get("name"), Some("Destination name is required"));
        assert_eq!(errors.get("costPerDay"), Some("Cost per day is required"));
        assert_eq!(errors.get("recommendedFor"), Some("Recommended for is required"));
    }

    #[test]
    fn test_cost_must_be_numeric() {
        let form = DestinationForm {
            name: "Goa".to_string(),
            cost_per_day: "cheap".to_string(),
            recommended_for: "couples".to_string(),
            ..Default::default()
        };
        let errors = errors_of(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("costPerDay"), Some("Cost per day must be a number"));

        let form = DestinationForm {
            recommended_for: " , ".to_string(),
            cost_per_day: "40".to_string(),
            ..form
        };
        assert_eq!(errors_of(&form).get("recommendedFor"), Some("Recommended for is required"));
    }

    #[test]
    fn test_payload() {
        let form = DestinationForm {
            name: "  Goa Beach ".to_string(),
            kind: "beach".to_string(),
            cost_per_day: "40.5".to_string(),
            recommended_for: "couples, families,,".to_string(),
            activity_tags: vec!["surfing".to_string(), " surfing ".to_string(), String::new()],
            description: "sunny".to_string(),
            ..Default::default()
        };
        let payload = form.validate().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "name": "Goa Beach",
                "type": "beach",
                "costPerDay": 40.5,
                "bestSeasonToVisit": "summer",
                "recommendedFor": ["couples", "families"],
                "activityTags": ["surfing"],
                "description": "sunny"
            })
        );
    }

    #[test]
    fn test_edits_over_stored_record() {
        let record: JsonDestination = serde_json::from_str(
            r#"{"destinationId": 2, "name": "Everest Base", "type": "mountain", "costPerDay": 150,
                "recommendedFor": ["hikers", null], "activityTags": ["trekking"], "bestSeasonToVisit": "spring"}"#,
        )
        .unwrap();
        let mut form = DestinationForm::from_record(&record);
        assert_eq!(form.cost_per_day, "150");
        assert_eq!(form.recommended_for, "hikers");

        let edits = DestinationEdits {
            cost_per_day: Some("175".to_string()),
            activity_tags: vec!["climbing".to_string()],
            ..Default::default()
        };
        edits.apply(&mut form);
        let payload = form.validate().unwrap();
        assert_eq!(payload.name, "Everest Base");
        assert_eq!(payload.cost_per_day, 175.0);
        assert_eq!(payload.best_season_to_visit, "spring");
        assert_eq!(payload.activity_tags, vec!["climbing"]);

        let new_form = DestinationEdits {
            name: Some("Pokhara".to_string()),
            ..Default::default()
        }
        .into_form();
        assert_eq!(new_form.name, "Pokhara");
        assert_eq!(new_form.kind, DEFAULT_FORM_KIND);
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(upload_file_name(Path::new("/tmp/my photo (1).JPG")), "my_photo__1_.JPG");
        assert_eq!(image_mime(Path::new("/tmp/my photo (1).JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("notes")), "application/octet-stream");
    }
}
