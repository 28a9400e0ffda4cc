//! Typesafe env check: every variable the project uses must be in the zod schema

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::IsTerminal;

use super::{Check, CheckReport};
use crate::config::{Config, ProjectConfig};
use crate::detection::analyzers::env;
use crate::detection::{self, ProjectLayout};
use crate::remediation::{self, Prompter};
use crate::scanner;
use crate::schema::SchemaFile;
use crate::ui::Spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for each missing variable and patch the schema
    Interactive,
    /// Only report what is missing
    ReportOnly,
}

pub struct TypesafeEnv {
    layout: ProjectLayout,
    project: ProjectConfig,
    config: Config,
    prompter: Box<dyn Prompter>,
    mode: Mode,
    process_env: Vec<String>,
}

impl TypesafeEnv {
    pub fn new(
        layout: ProjectLayout,
        project: ProjectConfig,
        config: Config,
        prompter: Box<dyn Prompter>,
        mode: Mode,
    ) -> Self {
        Self {
            layout,
            project,
            config,
            prompter,
            mode,
            process_env: env::process_env_names(),
        }
    }

    /// Replace the process environment names compared against the schema.
    #[cfg(test)]
    pub fn with_process_env(mut self, names: Vec<String>) -> Self {
        self.process_env = names;
        self
    }

    fn spinner(&self, message: &str) -> Spinner {
        let enabled = self.config.display.spinners && std::io::stdout().is_terminal();
        Spinner::new(message, enabled)
    }

    async fn fix(&mut self, schema: &mut SchemaFile, missing: &BTreeSet<String>) -> Result<Vec<String>> {
        match self.mode {
            Mode::Interactive => {
                remediation::remediate(self.prompter.as_mut(), schema, missing, &self.project.schema)
                    .await
            }
            Mode::ReportOnly => Ok(Vec::new()),
        }
    }

    async fn check_environment(
        &mut self,
        schema: &mut SchemaFile,
        report: &mut CheckReport,
    ) -> Result<()> {
        let actual = env::collect(
            &self.layout.root,
            &self.project.env,
            self.process_env.iter().cloned(),
        )
        .await?;

        let spinner = self.spinner("Checking env variables");
        for name in &actual {
            if schema.declared().contains(name) {
                spinner.pass(&format!("Environment variable ${} is defined in the schema", name));
            } else {
                spinner.miss(&format!("Environment variable ${} is not defined in the schema", name));
            }
        }

        let missing = env::missing_from(&actual, schema.declared());
        if missing.is_empty() {
            spinner.succeed("All environment variables are present in your schema");
            return Ok(());
        }

        spinner.fail("Some environment variables are missing");
        report.added.extend(self.fix(schema, &missing).await?);
        report.missing_env = missing;
        Ok(())
    }

    async fn check_sources(&mut self, schema: &mut SchemaFile, report: &mut CheckReport) -> Result<()> {
        let spinner = self.spinner("Checking files");

        let files = scanner::find_source_files(
            &self.layout.source_dir,
            &self.config.scan.extensions,
            &self.project.scan.exclude,
        )?;
        tracing::debug!(files = files.len(), "scanning sources");

        let missing = scanner::undeclared_references(files, schema.declared()).await?;
        if missing.is_empty() {
            spinner.succeed("Finished going through the code");
            return Ok(());
        }

        for name in &missing {
            spinner.miss(&format!("${} is used in the code but not in the schema", name));
        }
        spinner.fail("Some environment variables are missing in your code!");
        report.added.extend(self.fix(schema, &missing).await?);
        report.missing_in_code = missing;
        Ok(())
    }
}

#[async_trait(?Send)]
impl Check for TypesafeEnv {
    fn name(&self) -> &'static str {
        "typesafe-env"
    }

    async fn check(&mut self) -> Result<CheckReport> {
        let schema_path = detection::select_schema_file(&self.layout.env_dir, &self.project.schema)?;
        let mut schema = SchemaFile::load(&schema_path).await?;
        tracing::info!(schema = %schema.path().display(), "checking env schema");
        schema.assert_library(&self.project.schema.library)?;

        let mut report = CheckReport::default();
        self.check_environment(&mut schema, &mut report).await?;
        self.check_sources(&mut schema, &mut report).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ProjectDetector;
    use crate::error::CheckError;
    use crate::remediation::MockPrompter;
    use crate::schema::tests::T3_SCHEMA;
    use crate::schema::ZodType;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// A t3-style project with the given schema and source files
    fn project(schema: &str, sources: &[(&str, &str)]) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "t3", "dependencies": { "zod": "^3.20.0" } }"#,
        )
        .unwrap();

        let env_dir = dir.path().join("src").join("env");
        std::fs::create_dir_all(&env_dir).unwrap();
        let schema_path = env_dir.join("schema.mjs");
        std::fs::write(&schema_path, schema).unwrap();

        for (path, content) in sources {
            let path = dir.path().join("src").join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        (dir, schema_path)
    }

    fn check(root: &Path, prompter: MockPrompter, mode: Mode, process_env: &[&str]) -> TypesafeEnv {
        let project = ProjectConfig::default();
        let layout = ProjectDetector::locate(root)
            .unwrap()
            .layout(&project.schema, &project.scan.source_dir)
            .unwrap();
        let config = Config {
            display: crate::config::DisplayConfig { spinners: false },
            ..Default::default()
        };

        TypesafeEnv::new(layout, project, config, Box::new(prompter), mode)
            .with_process_env(process_env.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn reports_only_undeclared_environment_names() {
        let (dir, schema_path) = project(T3_SCHEMA, &[]);

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm_add().never();

        let report = check(
            dir.path(),
            prompter,
            Mode::ReportOnly,
            &["DATABASE_URL", "NODE_ENV", "C"],
        )
        .check()
        .await
        .unwrap();

        assert_eq!(report.missing_env, names(&["C"]));
        assert!(report.missing_in_code.is_empty());
        assert_eq!(std::fs::read_to_string(schema_path).unwrap(), T3_SCHEMA);
    }

    #[tokio::test]
    async fn schema_without_zod_stops_before_any_write() {
        let schema = "import * as yup from \"yup\";\nexport const serverSchema = yup.object({});\n";
        let (dir, schema_path) = project(schema, &[("index.ts", "process.env.D;\n")]);

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm_add().never();

        let err = check(dir.path(), prompter, Mode::Interactive, &["D"])
            .check()
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::NotUsingZod(_))
        ));
        assert_eq!(std::fs::read_to_string(schema_path).unwrap(), schema);
    }

    #[tokio::test]
    async fn declining_leaves_schema_byte_identical() {
        let (dir, schema_path) = project(
            T3_SCHEMA,
            &[
                ("pages/index.tsx", "export default () => <p>{process.env.D}</p>;\n"),
                ("server/db.ts", "export const url = process.env.D;\n"),
            ],
        );

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm_add()
            .times(2)
            .returning(|_| Ok(false));

        let report = check(dir.path(), prompter, Mode::Interactive, &["EXTRA"])
            .check()
            .await
            .unwrap();

        assert_eq!(report.missing_env, names(&["EXTRA"]));
        assert_eq!(report.missing_in_code, names(&["D"]));
        assert!(report.added.is_empty());
        assert_eq!(std::fs::read_to_string(schema_path).unwrap(), T3_SCHEMA);
    }

    #[tokio::test]
    async fn confirmed_variable_lands_in_server_schema() {
        let (dir, schema_path) = project(
            T3_SCHEMA,
            &[("server/mail.ts", "export const host = process.env.SMTP_HOST;\n")],
        );

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm_add()
            .withf(|name| name == "SMTP_HOST")
            .times(1)
            .returning(|_| Ok(true));
        prompter
            .expect_pick_type()
            .times(1)
            .returning(|_, _| Ok(ZodType::String));

        let report = check(dir.path(), prompter, Mode::Interactive, &[])
            .check()
            .await
            .unwrap();
        assert_eq!(report.added, vec!["SMTP_HOST".to_string()]);
        assert!(report.unresolved().is_empty());

        let written = std::fs::read_to_string(&schema_path).unwrap();
        let field = written.find("SMTP_HOST: z.string()").unwrap();
        let server = written.find("serverSchema").unwrap();
        let client = written.find("clientSchema").unwrap();
        assert!(server < field && field < client, "{written}");
    }

    #[tokio::test]
    async fn variable_added_from_environment_is_not_offered_again() {
        let (dir, _) = project(
            T3_SCHEMA,
            &[("server/auth.ts", "export const s = process.env.NEXTAUTH_SECRET;\n")],
        );

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm_add()
            .times(1)
            .returning(|_| Ok(true));
        prompter
            .expect_pick_type()
            .times(1)
            .returning(|_, choices| Ok(choices[0]));

        let report = check(dir.path(), prompter, Mode::Interactive, &["NEXTAUTH_SECRET"])
            .check()
            .await
            .unwrap();

        assert_eq!(report.added, vec!["NEXTAUTH_SECRET".to_string()]);
        assert!(report.missing_in_code.is_empty());
    }

    #[tokio::test]
    async fn adding_in_both_passes_keeps_schema_comments() {
        let (dir, schema_path) = project(
            T3_SCHEMA,
            &[("server/mail.ts", "export const host = process.env.SMTP_HOST;\n")],
        );

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm_add()
            .times(2)
            .returning(|_| Ok(true));
        prompter
            .expect_pick_type()
            .times(2)
            .returning(|_, _| Ok(ZodType::String));

        let report = check(dir.path(), prompter, Mode::Interactive, &["API_KEY"])
            .check()
            .await
            .unwrap();
        assert_eq!(report.added, vec!["API_KEY".to_string(), "SMTP_HOST".to_string()]);

        let written = std::fs::read_to_string(&schema_path).unwrap();
        assert!(written.starts_with("// @ts-check"), "{written}");
        assert!(written.contains("API_KEY: z.string()"));
        assert!(written.contains("SMTP_HOST: z.string()"));
    }
}
