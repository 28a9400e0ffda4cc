//! Interactive remediation: ask about each missing variable and patch the schema

pub mod guess;

use anyhow::Result;
use inquire::{Confirm, Select};
use std::collections::BTreeSet;

use crate::config::SchemaConfig;
use crate::schema::{SchemaFile, ZodType};
use crate::ui;

/// Questions asked while patching the schema
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn confirm_add(&mut self, name: &str) -> Result<bool>;
    fn pick_type(&mut self, name: &str, choices: &[ZodType]) -> Result<ZodType>;
}

/// Terminal prompts
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn confirm_add(&mut self, name: &str) -> Result<bool> {
        let answer = Confirm::new(&format!("Do you want to add ${} to the schema?", name))
            .with_default(true)
            .prompt()?;
        Ok(answer)
    }

    fn pick_type(&mut self, name: &str, choices: &[ZodType]) -> Result<ZodType> {
        let answer = Select::new(
            &format!("What type is ${}? (we guessed the order)", name),
            choices.to_vec(),
        )
        .with_starting_cursor(0)
        .prompt()?;
        Ok(answer)
    }
}

/// Offer each missing name, add the accepted ones, and write the schema once.
///
/// Returns the names that were added.
pub async fn remediate(
    prompter: &mut dyn Prompter,
    schema: &mut SchemaFile,
    missing: &BTreeSet<String>,
    config: &SchemaConfig,
) -> Result<Vec<String>> {
    let mut added = Vec::new();

    for name in missing {
        if !prompter.confirm_add(name)? {
            tracing::debug!(name, "declined");
            continue;
        }

        let ty = prompter.pick_type(name, &guess::rank(name))?;
        if ty == ZodType::Other {
            ui::log(&format!("You are going to have to add ${} manually!", name));
            continue;
        }

        if schema.add_field(name, ty, config)? {
            added.push(name.clone());
        }
    }

    schema.write().await?;
    Ok(added)
}
