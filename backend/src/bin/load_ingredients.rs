//! Load catalogue ingredients (and optionally tags) from JSON files.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, bail, eyre};
use foodgram::domain::ports::CatalogueRepository;
use foodgram::domain::{NewIngredient, NewTag};
use foodgram::outbound::persistence::{DbPool, DieselCatalogueRepository, PoolConfig};
use serde::de::DeserializeOwned;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_ENV: &str = "FOODGRAM_DATABASE_URL";

/// `load-ingredients` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-ingredients",
    about = "Insert ingredients and tags from JSON files, skipping existing entries",
    version
)]
struct CliArgs {
    /// JSON array of `{name, measurement_unit}` objects.
    #[arg(value_name = "path")]
    ingredients: PathBuf,
    /// JSON array of `{name, slug}` tag objects.
    #[arg(long = "tags", value_name = "path")]
    tags: Option<PathBuf>,
    /// Database connection URL. Falls back to `FOODGRAM_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(CliArgs::parse()))
}

async fn async_main(args: CliArgs) -> Result<()> {
    let ingredients: Vec<NewIngredient> = read_json(&args.ingredients)?;
    let tags: Vec<NewTag> = match &args.tags {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let catalogue = DieselCatalogueRepository::new(pool);

    let inserted = catalogue
        .insert_ingredients(&ingredients)
        .await
        .map_err(|err| eyre!("insert ingredients: {err}"))?;
    info!(read = ingredients.len(), inserted, "ingredients loaded");

    if !tags.is_empty() {
        let inserted = catalogue
            .insert_tags(&tags)
            .await
            .map_err(|err| eyre!("insert tags: {err}"))?;
        info!(read = tags.len(), inserted, "tags loaded");
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(file_name) = path.file_name() else {
        bail!("input path '{}' must name a file", path.display());
    };
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open directory '{}'", parent.display()))?;
    let contents = directory
        .read_to_string(Path::new(file_name))
        .wrap_err_with(|| format!("read '{}'", path.display()))?;
    parse_entries(&contents).wrap_err_with(|| format!("parse '{}'", path.display()))
}

fn parse_entries<T: DeserializeOwned>(contents: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(contents)
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    match (explicit, from_env) {
        (Some(value), _) if value.trim().is_empty() => {
            bail!("--database-url must not be empty when provided")
        }
        (Some(value), _) => Ok(value),
        (None, Some(value)) if !value.trim().is_empty() => Ok(value),
        (None, _) => bail!("database URL missing: set --database-url or {DATABASE_URL_ENV}"),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    #[rstest]
    fn parses_ingredient_array() {
        let parsed: Vec<NewIngredient> = parse_entries(
            r#"[{"name": "flour", "measurement_unit": "g"}, {"name": "egg", "measurement_unit": "pcs"}]"#,
        )
        .expect("valid ingredients");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].name(), "egg");
        assert_eq!(parsed[1].measurement_unit(), "pcs");
    }

    #[rstest]
    #[case(r#"[{"name": "", "measurement_unit": "g"}]"#)]
    #[case(r#"[{"name": "flour"}]"#)]
    #[case(r#"{"name": "flour", "measurement_unit": "g"}"#)]
    fn rejects_malformed_ingredients(#[case] raw: &str) {
        assert!(parse_entries::<NewIngredient>(raw).is_err());
    }

    #[rstest]
    fn rejects_tag_with_invalid_slug() {
        let result = parse_entries::<NewTag>(r#"[{"name": "Breakfast", "slug": "bad slug"}]"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn reads_entries_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{"name": "Lunch", "slug": "lunch"}}]"#).expect("write");
        let tags: Vec<NewTag> = read_json(file.path()).expect("tags");
        assert_eq!(tags[0].slug(), "lunch");
    }

    #[rstest]
    #[case(Some("postgres://cli"), Some("postgres://env"), Some("postgres://cli"))]
    #[case(None, Some("postgres://env"), Some("postgres://env"))]
    #[case(Some("  "), Some("postgres://env"), None)]
    #[case(None, None, None)]
    #[case(None, Some(""), None)]
    fn database_url_resolution(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let resolved = resolve_database_url(
            explicit.map(str::to_owned),
            from_env.map(str::to_owned),
        );
        assert_eq!(resolved.ok().as_deref(), expected);
    }
}
