use std::io::Error as IoError;
use std::path::PathBuf;

use crate::{
    clear_filters, Category, DestinationEdits, DestinationForm, Error, FilterState,
    ForgotPasswordForm, LoginForm, PriceRange, ProfileEdits, ProfileForm, RecordId,
    RegistrationForm, ReviewDraft,
};

/// What a single invocation does
#[derive(Debug, Clone)]
pub enum Action {
    Browse(FilterState),
    Detail(RecordId),
    Login { form: LoginForm, remember: bool },
    Register(RegistrationForm),
    Logout,
    Review(ReviewDraft),
    Moderate { search: String, delete: Option<RecordId> },
    ManageDestinations { search: String, delete: Option<RecordId> },
    AddDestination(DestinationForm),
    EditDestination { id: RecordId, edits: DestinationEdits },
    Users { search: String },
    Profile,
    EditProfile(ProfileEdits),
    AddDetails { email: String, form: ProfileForm },
    ForgotPassword(ForgotPasswordForm),
    Dashboard,
}

#[derive(Debug, Clone, Default)]
pub struct CmdArgs {
    pub config: String,
    pub verbose: bool,
    pub category: Option<String>,
    pub price: Option<String>,
    pub search: String,
    pub recommend: bool,
    pub clear: bool,
    pub detail: Option<String>,
    pub login: Option<String>,
    pub register: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub remember: bool,
    pub logout: bool,
    pub review: Option<String>,
    pub rating: u8,
    pub feedback: String,
    pub moderate: bool,
    pub destinations: bool,
    pub delete: Option<String>,
    pub add_destination: bool,
    pub edit_destination: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub cost: Option<String>,
    pub season: Option<String>,
    pub recommended_for: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub users: bool,
    pub profile: bool,
    pub edit_profile: bool,
    pub add_details: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub budget_min: Option<String>,
    pub budget_max: Option<String>,
    pub travel_type: Option<String>,
    pub visited: Option<String>,
    pub preferences: Option<String>,
    pub forgot_password: Option<String>,
    pub dashboard: bool,
}

impl CmdArgs {
    #[allow(clippy::too_many_lines)]
    pub fn parse(args: Vec<String>) -> Result<Self, IoError> {
        let mut parsed = CmdArgs {
            config: String::from("./config.json"),
            ..Default::default()
        };
        {
            let mut ap = argparse::ArgumentParser::new();
            ap.set_description("Browse and review travel destinations");
            ap.refer(&mut parsed.config).add_option(
                &["-c", "--config"],
                argparse::Store,
                "Config file path; default is config.json",
            );
            ap.refer(&mut parsed.verbose).add_option(
                &["-v", "--verbose"],
                argparse::StoreTrue,
                "Debug logging (RUST_LOG takes precedence)",
            );
            ap.refer(&mut parsed.category).add_option(
                &["--category"],
                argparse::StoreOption,
                "Only show this category; All and Recommendation are special",
            );
            ap.refer(&mut parsed.price).add_option(
                &["--price"],
                argparse::StoreOption,
                "Price per day: a bucket like $50-100, MIN-MAX or MIN+",
            );
            ap.refer(&mut parsed.search).add_option(
                &["-s", "--search"],
                argparse::Store,
                "Search destination names and descriptions",
            );
            ap.refer(&mut parsed.recommend).add_option(
                &["-r", "--recommend"],
                argparse::StoreTrue,
                "Show personalised recommendations (requires login)",
            );
            ap.refer(&mut parsed.clear).add_option(
                &["--clear"],
                argparse::StoreTrue,
                "Ignore all filter options",
            );
            ap.refer(&mut parsed.detail).add_option(
                &["-d", "--detail"],
                argparse::StoreOption,
                "Show one destination with its reviews",
            );
            ap.refer(&mut parsed.login).add_option(
                &["--login"],
                argparse::StoreOption,
                "Sign in with this username or email",
            );
            ap.refer(&mut parsed.register).add_option(
                &["--register"],
                argparse::StoreOption,
                "Create an account with this username",
            );
            ap.refer(&mut parsed.email).add_option(
                &["--email"],
                argparse::Store,
                "Email address for --register",
            );
            ap.refer(&mut parsed.password).add_option(
                &["--password"],
                argparse::Store,
                "Password for --login and --register",
            );
            ap.refer(&mut parsed.confirm_password).add_option(
                &["--confirm-password"],
                argparse::StoreOption,
                "Password confirmation for --register; defaults to --password",
            );
            ap.refer(&mut parsed.remember).add_option(
                &["--remember"],
                argparse::StoreTrue,
                "Keep the session after this run",
            );
            ap.refer(&mut parsed.logout).add_option(
                &["--logout"],
                argparse::StoreTrue,
                "Forget the stored session",
            );
            ap.refer(&mut parsed.review).add_option(
                &["--review"],
                argparse::StoreOption,
                "Review the destination with this ID",
            );
            ap.refer(&mut parsed.rating).add_option(
                &["--rating"],
                argparse::Store,
                "Stars for --review, 1 to 5",
            );
            ap.refer(&mut parsed.feedback).add_option(
                &["--feedback"],
                argparse::Store,
                "Text for --review",
            );
            ap.refer(&mut parsed.moderate).add_option(
                &["--moderate"],
                argparse::StoreTrue,
                "List all feedback (admin); --search narrows it",
            );
            ap.refer(&mut parsed.destinations).add_option(
                &["--destinations"],
                argparse::StoreTrue,
                "List all destinations (admin); --search narrows it",
            );
            ap.refer(&mut parsed.delete).add_option(
                &["--delete"],
                argparse::StoreOption,
                "With --moderate or --destinations: delete the record with this ID",
            );
            ap.refer(&mut parsed.add_destination).add_option(
                &["--add-destination"],
                argparse::StoreTrue,
                "Add a destination (admin) from --name, --type, --cost and friends",
            );
            ap.refer(&mut parsed.edit_destination).add_option(
                &["--edit-destination"],
                argparse::StoreOption,
                "Edit the destination with this ID; unset fields keep their value",
            );
            ap.refer(&mut parsed.name).add_option(
                &["--name"],
                argparse::StoreOption,
                "Destination name, or full name for a profile",
            );
            ap.refer(&mut parsed.kind).add_option(
                &["--type"],
                argparse::StoreOption,
                "Destination type, e.g. beach or mountain",
            );
            ap.refer(&mut parsed.cost).add_option(
                &["--cost"],
                argparse::StoreOption,
                "Destination cost per day",
            );
            ap.refer(&mut parsed.season).add_option(
                &["--season"],
                argparse::StoreOption,
                "Best season to visit, or preferred season for a profile",
            );
            ap.refer(&mut parsed.recommended_for).add_option(
                &["--recommended-for"],
                argparse::StoreOption,
                "Comma separated audiences for a destination",
            );
            ap.refer(&mut parsed.tags).add_option(
                &["--tag"],
                argparse::Collect,
                "Activity tag for a destination; repeat for more",
            );
            ap.refer(&mut parsed.description).add_option(
                &["--description"],
                argparse::StoreOption,
                "Destination description",
            );
            ap.refer(&mut parsed.image).add_option(
                &["--image"],
                argparse::StoreOption,
                "Image file to upload with a destination",
            );
            ap.refer(&mut parsed.users).add_option(
                &["--users"],
                argparse::StoreTrue,
                "List all users (admin); --search narrows it",
            );
            ap.refer(&mut parsed.profile).add_option(
                &["--profile"],
                argparse::StoreTrue,
                "Show your travel profile (requires login)",
            );
            ap.refer(&mut parsed.edit_profile).add_option(
                &["--edit-profile"],
                argparse::StoreTrue,
                "Update your travel profile; unset fields keep their value",
            );
            ap.refer(&mut parsed.add_details).add_option(
                &["--add-details"],
                argparse::StoreOption,
                "Create the travel profile for the account with this email",
            );
            ap.refer(&mut parsed.gender).add_option(
                &["--gender"],
                argparse::StoreOption,
                "Profile gender",
            );
            ap.refer(&mut parsed.dob).add_option(
                &["--dob"],
                argparse::StoreOption,
                "Profile date of birth, YYYY-MM-DD",
            );
            ap.refer(&mut parsed.profession).add_option(
                &["--profession"],
                argparse::StoreOption,
                "Profile profession",
            );
            ap.refer(&mut parsed.budget_min).add_option(
                &["--budget-min"],
                argparse::StoreOption,
                "Profile minimum daily budget",
            );
            ap.refer(&mut parsed.budget_max).add_option(
                &["--budget-max"],
                argparse::StoreOption,
                "Profile maximum daily budget",
            );
            ap.refer(&mut parsed.travel_type).add_option(
                &["--travel-type"],
                argparse::StoreOption,
                "Preferred kind of destination",
            );
            ap.refer(&mut parsed.visited).add_option(
                &["--visited"],
                argparse::StoreOption,
                "Comma separated destinations already visited",
            );
            ap.refer(&mut parsed.preferences).add_option(
                &["--preferences"],
                argparse::StoreOption,
                "Comma separated travel preferences",
            );
            ap.refer(&mut parsed.forgot_password).add_option(
                &["--forgot-password"],
                argparse::StoreOption,
                "Send a password reset link to this email",
            );
            ap.refer(&mut parsed.dashboard).add_option(
                &["--dashboard"],
                argparse::StoreTrue,
                "Show the admin dashboard",
            );

            match ap.parse(args, &mut std::io::stdout(), &mut std::io::stderr()) {
                Ok(()) => {}
                Err(_) => {
                    return Err(IoError::from(std::io::ErrorKind::InvalidInput));
                }
            }
        }

        Ok(parsed)
    }

    /// The filter state the browse flags describe
    pub fn filter_state(&self) -> Result<FilterState, Error> {
        if self.clear {
            return Ok(clear_filters());
        }

        let category = if self.recommend {
            Category::Recommendation
        } else {
            self.category
                .as_deref()
                .map_or(Category::All, Category::from_label)
        };
        let price_range = self
            .price
            .as_deref()
            .map(str::parse::<PriceRange>)
            .transpose()?;

        Ok(FilterState {
            category,
            price_range,
            search_query: self.search.clone(),
        })
    }

    fn destination_edits(&self) -> DestinationEdits {
        DestinationEdits {
            name: self.name.clone(),
            kind: self.kind.clone(),
            cost_per_day: self.cost.clone(),
            best_season: self.season.clone(),
            recommended_for: self.recommended_for.clone(),
            activity_tags: self.tags.clone(),
            description: self.description.clone(),
            image_file: self.image.as_deref().map(PathBuf::from),
        }
    }

    fn profile_edits(&self) -> ProfileEdits {
        ProfileEdits {
            name: self.name.clone(),
            gender: self.gender.clone(),
            dob: self.dob.clone(),
            profession: self.profession.clone(),
            budget_min: self.budget_min.clone(),
            budget_max: self.budget_max.clone(),
            travel_type_preference: self.travel_type.clone(),
            season_preference: self.season.clone(),
            past_visited_destinations: self.visited.clone(),
            preferences: self.preferences.clone(),
        }
    }

    pub fn get_action(&self) -> Result<Action, Error> {
        if self.logout {
            return Ok(Action::Logout);
        }
        if let Some(user) = &self.login {
            return Ok(Action::Login {
                form: LoginForm {
                    username_or_email: user.clone(),
                    password: self.password.clone(),
                },
                remember: self.remember,
            });
        }
        if let Some(username) = &self.register {
            return Ok(Action::Register(RegistrationForm {
                username: username.clone(),
                email: self.email.clone(),
                password: self.password.clone(),
                confirm_password: self
                    .confirm_password
                    .clone()
                    .unwrap_or_else(|| self.password.clone()),
            }));
        }
        if let Some(email) = &self.forgot_password {
            return Ok(Action::ForgotPassword(ForgotPasswordForm {
                email: email.clone(),
            }));
        }
        if let Some(id) = &self.review {
            return Ok(Action::Review(ReviewDraft {
                destination_id: RecordId::from(id.as_str()),
                rating: self.rating,
                feedback: self.feedback.clone(),
            }));
        }
        if let Some(id) = &self.detail {
            return Ok(Action::Detail(RecordId::from(id.as_str())));
        }
        if self.add_destination {
            return Ok(Action::AddDestination(self.destination_edits().into_form()));
        }
        if let Some(id) = &self.edit_destination {
            return Ok(Action::EditDestination {
                id: RecordId::from(id.as_str()),
                edits: self.destination_edits(),
            });
        }
        if let Some(email) = &self.add_details {
            return Ok(Action::AddDetails {
                email: email.clone(),
                form: self.profile_edits().into_form(),
            });
        }
        if self.edit_profile {
            return Ok(Action::EditProfile(self.profile_edits()));
        }
        if self.profile {
            return Ok(Action::Profile);
        }

        let delete = self.delete.as_deref().map(RecordId::from);
        if self.moderate {
            return Ok(Action::Moderate {
                search: self.search.clone(),
                delete,
            });
        }
        if self.destinations {
            return Ok(Action::ManageDestinations {
                search: self.search.clone(),
                delete,
            });
        }
        if delete.is_some() {
            return Err(Error::InvalidArgument(
                "--delete needs --moderate or --destinations".to_string(),
            ));
        }

        if self.users {
            return Ok(Action::Users {
                search: self.search.clone(),
            });
        }
        if self.dashboard {
            return Ok(Action::Dashboard);
        }

        Ok(Action::Browse(self.filter_state()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> CmdArgs {
        let mut argv = vec!["wanderlist".to_string()];
        argv.extend(args.iter().map(|a| (*a).to_string()));
        CmdArgs::parse(argv).unwrap()
    }

    #[test]
    fn test_default_is_browse_everything() {
        let args = parse(&[]);
        assert_eq!(args.config, "./config.json");
        match args.get_action().unwrap() {
            Action::Browse(state) => assert_eq!(state, clear_filters()),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_browse_filters() {
        let args = parse(&["--category", "beach", "--price", "$0-50", "-s", "goa"]);
        let state = args.filter_state().unwrap();
        assert_eq!(state.category, Category::Named("beach".to_string()));
        assert_eq!(state.price_range, Some(PriceRange::new(0.0, 50.0)));
        assert_eq!(state.search_query, "goa");

        let args = parse(&["--category", "beach", "--recommend"]);
        assert_eq!(args.filter_state().unwrap().category, Category::Recommendation);

        let args = parse(&["--category", "beach", "--price", "1-2", "--clear"]);
        assert_eq!(args.filter_state().unwrap(), clear_filters());

        let args = parse(&["--price", "cheap"]);
        assert!(matches!(args.get_action(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_login_and_logout() {
        let args = parse(&["--login", "asha", "--password", "secret1", "--remember"]);
        match args.get_action().unwrap() {
            Action::Login { form, remember } => {
                assert_eq!(form.username_or_email, "asha");
                assert_eq!(form.password, "secret1");
                assert!(remember);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        let args = parse(&["--logout", "--login", "asha"]);
        assert!(matches!(args.get_action().unwrap(), Action::Logout));
    }

    #[test]
    fn test_register_confirmation_defaults_to_password() {
        let args = parse(&["--register", "asha", "--email", "asha@example.com", "--password", "secret1"]);
        match args.get_action().unwrap() {
            Action::Register(form) => {
                assert_eq!(form.confirm_password, "secret1");
                assert!(form.validate().is_ok());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_review_and_detail() {
        let args = parse(&["--review", "3", "--rating", "4", "--feedback", "Lovely"]);
        match args.get_action().unwrap() {
            Action::Review(draft) => {
                assert_eq!(draft.destination_id, RecordId::Number(3));
                assert_eq!(draft.rating, 4);
                assert_eq!(draft.feedback, "Lovely");
            }
            other => panic!("unexpected action: {other:?}"),
        }

        let args = parse(&["-d", "goa-1"]);
        assert!(matches!(
            args.get_action().unwrap(),
            Action::Detail(RecordId::Text(id)) if id == "goa-1"
        ));
    }

    #[test]
    fn test_admin_actions() {
        let args = parse(&["--moderate", "-s", "cold", "--delete", "12"]);
        match args.get_action().unwrap() {
            Action::Moderate { search, delete } => {
                assert_eq!(search, "cold");
                assert_eq!(delete, Some(RecordId::Number(12)));
            }
            other => panic!("unexpected action: {other:?}"),
        }

        let args = parse(&["--destinations"]);
        assert!(matches!(
            args.get_action().unwrap(),
            Action::ManageDestinations { delete: None, .. }
        ));

        let args = parse(&["--delete", "12"]);
        assert!(matches!(args.get_action(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_destination_forms() {
        let args = parse(&[
            "--add-destination", "--name", "Goa Beach", "--type", "beach", "--cost", "40",
            "--recommended-for", "couples", "--tag", "surfing", "--tag", "diving",
            "--image", "/tmp/goa.png",
        ]);
        match args.get_action().unwrap() {
            Action::AddDestination(form) => {
                assert_eq!(form.name, "Goa Beach");
                assert_eq!(form.best_season, "summer");
                assert_eq!(form.activity_tags, vec!["surfing", "diving"]);
                assert_eq!(form.image_file, Some(PathBuf::from("/tmp/goa.png")));
                assert!(form.validate().is_ok());
            }
            other => panic!("unexpected action: {other:?}"),
        }

        let args = parse(&["--edit-destination", "7", "--cost", "55"]);
        match args.get_action().unwrap() {
            Action::EditDestination { id, edits } => {
                assert_eq!(id, RecordId::Number(7));
                assert_eq!(edits.cost_per_day.as_deref(), Some("55"));
                assert_eq!(edits.name, None);
                assert!(edits.activity_tags.is_empty());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_profile_actions() {
        let args = parse(&[
            "--add-details", "asha@example.com", "--name", "Asha", "--dob", "1990-02-01",
            "--profession", "Doctor", "--budget-max", "300", "--visited", "Goa, Pokhara",
        ]);
        match args.get_action().unwrap() {
            Action::AddDetails { email, form } => {
                assert_eq!(email, "asha@example.com");
                assert_eq!(form.gender, "male");
                let details = form.validate().unwrap();
                assert_eq!(details.budget_max, Some(300.0));
                assert_eq!(details.past_visited_destinations, vec!["Goa", "Pokhara"]);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        let args = parse(&["--edit-profile", "--season", "winter"]);
        match args.get_action().unwrap() {
            Action::EditProfile(edits) => {
                assert_eq!(edits.season_preference.as_deref(), Some("winter"));
                assert_eq!(edits.name, None);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        assert!(matches!(parse(&["--profile"]).get_action().unwrap(), Action::Profile));
        assert!(matches!(
            parse(&["--forgot-password", "asha@example.com"]).get_action().unwrap(),
            Action::ForgotPassword(form) if form.email == "asha@example.com"
        ));
    }

    #[test]
    fn test_users_and_dashboard() {
        let args = parse(&["--users", "-s", "doctor"]);
        assert!(matches!(
            args.get_action().unwrap(),
            Action::Users { search } if search == "doctor"
        ));
        assert!(matches!(parse(&["--dashboard"]).get_action().unwrap(), Action::Dashboard));
    }
}
