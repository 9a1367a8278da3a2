#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
mod arg_parse;
mod catalog;
mod common;
mod config;
mod dashboard;
mod error;
mod render;
mod reviews;
mod session;
mod users;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::arg_parse::{Action, CmdArgs};
use crate::catalog::prelude::*;
use crate::common::prelude::*;
use crate::config::AppConfig;
use crate::dashboard::prelude::*;
use crate::reviews::prelude::*;
use crate::session::prelude::*;
use crate::users::prelude::*;
use error::{Error, FormErrors};

type Store = SessionStore<FileSlot, MemorySlot>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = &CmdArgs::parse(std::env::args().collect())?;

    // RUST_LOG wins over --verbose
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::from_file(&args.config.clone())?;
    let mut store = SessionStore::new(
        FileSlot::new(config.get_session_file()),
        MemorySlot::default(),
    );

    match run(args.get_action()?, &config, &mut store).await {
        Err(Error::Invalid(errors)) => {
            print_form_errors(&errors);
            std::process::exit(2);
        }
        Err(Error::NotSignedIn) => {
            eprintln!("Please sign in first (--login USER --password PASS)");
            std::process::exit(1);
        }
        Err(e @ (Error::DestinationExists | Error::Api { .. })) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        other => other?,
    }

    Ok(())
}

fn print_form_errors(errors: &FormErrors) {
    eprintln!("{} field(s) need attention:", errors.len());
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

async fn run(action: Action, config: &AppConfig, store: &mut Store) -> error::Result<()> {
    match action {
        Action::Browse(state) => browse(&state, config, store).await,
        Action::Detail(id) => show_detail(&id, config).await,
        Action::Login { form, remember } => {
            let session = AuthClient::new(config)?.login(&form).await?;
            store.save(&session, remember)?;
            println!("Welcome back, {}", session.display_name());
            Ok(())
        }
        Action::Register(form) => {
            AuthClient::new(config)?.register(&form).await?;
            println!("Registration successful. Please sign in.");
            Ok(())
        }
        Action::Logout => {
            store.clear()?;
            println!("Signed out");
            Ok(())
        }
        Action::Review(draft) => submit_review(&draft, config, store).await,
        Action::Moderate { search, delete } => moderate(&search, delete, config).await,
        Action::ManageDestinations { search, delete } => {
            manage_destinations(&search, delete, config).await
        }
        Action::AddDestination(form) => {
            let payload = form.validate()?;
            CatalogFetcher::new(config)?
                .add_destination(&payload, form.image_file.as_deref())
                .await?;
            println!("Added destination {}", payload.name);
            Ok(())
        }
        Action::EditDestination { id, edits } => edit_destination(&id, &edits, config).await,
        Action::Users { search } => {
            let users = UserFetcher::new(config)?.list().await?;
            let shown = search_users(&users, &search);
            print!("{}", render::user_table(&shown, users.len(), &search));
            Ok(())
        }
        Action::Profile => {
            let session = store.current().ok_or(Error::NotSignedIn)?;
            let user = UserFetcher::new(config)?.get(&session.id).await?;
            print!("{}", render::user_profile(&user));
            Ok(())
        }
        Action::EditProfile(edits) => edit_profile(&edits, config, store).await,
        Action::AddDetails { email, form } => {
            let details = form.validate()?;
            UserFetcher::new(config)?.add_details(&email, &details).await?;
            println!("Travel profile saved for {}", email.trim());
            Ok(())
        }
        Action::ForgotPassword(form) => {
            AuthClient::new(config)?.forgot_password(&form).await?;
            println!("Password reset link sent to {}", form.email.trim());
            Ok(())
        }
        Action::Dashboard => {
            let dashboard = DashboardFetcher::new(config)?.load().await;
            print!("{}", render::dashboard_page(&dashboard));
            Ok(())
        }
    }
}

async fn browse(state: &FilterState, config: &AppConfig, store: &Store) -> error::Result<()> {
    let session = store.current();
    if let Some(session) = &session {
        info!("signed in as {}", session.display_name());
    }
    let source = CatalogSource::for_filters(state, session.as_ref())?;

    let fetcher = CatalogFetcher::new(config)?;
    let mut catalog = Catalog::default();
    // a failed load is shown as an empty catalog
    if let Err(e) = catalog.refresh(&fetcher, source).await {
        warn!("showing empty catalog: {e}");
    }

    let view = catalog.view(state);
    info!(shown = view.len(), total = catalog.raw().len(), filters = %state, "catalog ready");
    print!("{}", render::catalog_page(&view, &catalog.categories(), state));

    Ok(())
}

async fn show_detail(id: &RecordId, config: &AppConfig) -> error::Result<()> {
    let destination = CatalogFetcher::new(config)?.fetch_destination(id).await?;
    let reviews = ReviewFetcher::new(config)?
        .list_for(id)
        .await
        .unwrap_or_else(|e| {
            warn!("could not load reviews: {e}");
            Vec::new()
        });

    print!(
        "{}",
        render::destination_detail(&destination, &reviews, average_rating(&reviews))
    );
    Ok(())
}

async fn submit_review(draft: &ReviewDraft, config: &AppConfig, store: &Store) -> error::Result<()> {
    let new_review = draft.validate(store.current().as_ref())?;

    let fetcher = ReviewFetcher::new(config)?;
    let mut reviews = fetcher.list_for(&draft.destination_id).await?;
    let stored = fetcher.submit(&new_review).await?;
    let average = add_review(&mut reviews, stored);

    println!(
        "Thanks for your review! {} now rates {} {:.1} from {} reviews",
        draft.destination_id,
        render::star_bar(average),
        average,
        reviews.len()
    );
    Ok(())
}

async fn moderate(search: &str, delete: Option<RecordId>, config: &AppConfig) -> error::Result<()> {
    let fetcher = ReviewFetcher::new(config)?;
    if let Some(id) = delete {
        fetcher.delete(&id).await?;
        println!("Deleted feedback {id}");
    }

    let reviews = fetcher.list_all().await?;
    let shown = search_feedback(&reviews, search);
    print!("{}", render::feedback_table(&shown, reviews.len(), search));
    Ok(())
}

async fn manage_destinations(
    search: &str,
    delete: Option<RecordId>,
    config: &AppConfig,
) -> error::Result<()> {
    let fetcher = CatalogFetcher::new(config)?;
    if let Some(id) = delete {
        fetcher.delete_destination(&id).await?;
        println!("Deleted destination {id}");
    }

    let destinations = fetcher.fetch(&CatalogSource::All).await?;
    let shown = search_catalog(&destinations, search);
    print!(
        "{}",
        render::destination_table(&shown, destinations.len(), search)
    );
    Ok(())
}

async fn edit_destination(
    id: &RecordId,
    edits: &DestinationEdits,
    config: &AppConfig,
) -> error::Result<()> {
    let fetcher = CatalogFetcher::new(config)?;
    let mut form = DestinationForm::from_record(&fetcher.fetch_record(id).await?);
    edits.apply(&mut form);
    let payload = form.validate()?;

    fetcher
        .update_destination(id, &payload, form.image_file.as_deref())
        .await?;
    println!("Updated destination {}", payload.name);
    Ok(())
}

async fn edit_profile(edits: &ProfileEdits, config: &AppConfig, store: &Store) -> error::Result<()> {
    let session = store.current().ok_or(Error::NotSignedIn)?;
    let fetcher = UserFetcher::new(config)?;
    let user = fetcher.get(&session.id).await?;

    let mut form = ProfileForm::from_user(&user);
    edits.apply(&mut form);
    let update = ProfileUpdate {
        user_id: user.user_id.clone().unwrap_or_else(|| session.id.clone()),
        user_name: session.username.clone().or(user.user_name),
        user_email: session.email.clone().or(user.user_email),
        details: form.validate()?,
    };

    fetcher.update(&update).await?;
    println!("Profile updated");
    Ok(())
}
