use crate::infra::Services;
use chrono::Duration;
use clap::Args;
use pet_adoption::adoption::{ApplicationRequest, ApplicationStatus};
use pet_adoption::auth::{Argon2Hasher, Registration};
use pet_adoption::catalog::{Pet, PetFilter, PetRepository};
use pet_adoption::config::AdminBootstrap;
use pet_adoption::error::AppError;
use pet_adoption::pagination::PageRequest;
use pet_adoption::seed::seed_pets_if_empty;
use pet_adoption::store::MemoryStore;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Username of the demo applicant.
    #[arg(long, default_value = "jane")]
    pub(crate) applicant: String,
    /// Seeded pet to apply for.
    #[arg(long, default_value = "Max")]
    pub(crate) pet: String,
    /// Reject the application instead of approving it.
    #[arg(long)]
    pub(crate) reject: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            applicant: "jane".to_string(),
            pet: "Max".to_string(),
            reject: false,
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Pet adoption demo");
    let store = Arc::new(MemoryStore::new());
    let seeded = seed_pets_if_empty(store.as_ref())?;
    println!("- Seeded {seeded} pets into an in-memory store");

    let services = Services::over(
        store.clone(),
        Arc::new(Argon2Hasher::default()),
        Duration::hours(1),
    );
    match walkthrough(&services, &store, &args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(reason) => println!("  Demo stopped: {reason}"),
    }
    Ok(())
}

fn find_pet(store: &MemoryStore, name: &str) -> Result<Pet, String> {
    store
        .search_pets(&PetFilter::default().search(name), PageRequest::default())
        .map_err(|err| err.to_string())?
        .data
        .into_iter()
        .find(|pet| pet.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("no seeded pet named '{name}'"))
}

fn pet_status(store: &MemoryStore, pet: &Pet) -> Result<String, String> {
    store
        .pet(&pet.id)
        .map_err(|err| err.to_string())?
        .map(|pet| pet.status.to_string())
        .ok_or_else(|| format!("{} disappeared", pet.name))
}

/// Walk one applicant through an application and an admin decision,
/// returning the lines to print.
fn walkthrough(
    services: &Services,
    store: &MemoryStore,
    args: &DemoArgs,
) -> Result<Vec<String>, String> {
    let mut lines = Vec::new();
    let target = find_pet(store, &args.pet)?;
    let rocky = find_pet(store, "Rocky")?;

    let applicant = services
        .auth
        .register(Registration {
            username: args.applicant.clone(),
            email: format!("{}@example.com", args.applicant.to_ascii_lowercase()),
            password: "secret123".to_string(),
        })
        .map_err(|err| format!("registration failed: {err}"))?;
    lines.push(format!("- Registered applicant {}", applicant.user.username));

    services
        .auth
        .ensure_admin(&AdminBootstrap {
            username: "adminuser".to_string(),
            email: "admin@petadoption.com".to_string(),
            password: "admin123".to_string(),
        })
        .map_err(|err| format!("admin bootstrap failed: {err}"))?;
    lines.push("- Ensured administrator adminuser".to_string());

    let blocked = services.adoption.submit(
        &applicant.user.id,
        ApplicationRequest {
            pet_id: rocky.id.to_string(),
            message: None,
        },
    );
    match blocked {
        Ok(view) => lines.push(format!(
            "- Unexpectedly accepted application {} for Rocky",
            view.id
        )),
        Err(err) => lines.push(format!(
            "- Application for Rocky ({}) refused: {err}",
            rocky.status
        )),
    }

    let submitted = services
        .adoption
        .submit(
            &applicant.user.id,
            ApplicationRequest {
                pet_id: target.id.to_string(),
                message: Some(format!("We would love to give {} a home", target.name)),
            },
        )
        .map_err(|err| format!("application for {} failed: {err}", target.name))?;
    lines.push(format!(
        "- Application {} for {} -> status {} | pet now {}",
        submitted.id,
        target.name,
        submitted.status,
        pet_status(store, &target)?
    ));

    let verdict = if args.reject {
        ApplicationStatus::Rejected
    } else {
        ApplicationStatus::Approved
    };
    let decided = services
        .adoption
        .decide(&submitted.id, verdict)
        .map_err(|err| format!("decision failed: {err}"))?;
    lines.push(format!(
        "- Admin decision -> application {} | pet now {}",
        decided.status,
        pet_status(store, &target)?
    ));

    Ok(lines)
}
