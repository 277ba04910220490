use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};

const DEFAULT_UPLOAD_DIR: &str = "storage/uploads";

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    upload_root: PathBuf,
}

impl AppState {
    pub async fn new() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL env var is missing")?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("failed to connect to Postgres")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        let upload_root =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.into()));
        tokio::fs::create_dir_all(&upload_root)
            .await
            .with_context(|| format!("failed to create upload dir {}", upload_root.display()))?;

        Ok(Self { pool, upload_root })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    pub fn pool_ref(&self) -> &PgPool {
        &self.pool
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }
}
