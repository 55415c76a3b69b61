use std::io::{Error, ErrorKind};

use deadpool_postgres::{Config, Pool};
use tokio::sync::OnceCell;
use tokio_postgres::NoTls;
use tokio_postgres_migration::Migration;

static POOL: OnceCell<Pool> = OnceCell::const_new();

const SCRIPTS_UP: [(&str, &str); 2] = [(
    "0001_create-users",
    include_str!("../migrations/0001_create-users_up.sql"),
),(
    "0001_create-films",
    include_str!("../migrations/0001_create-films_up.sql"),
)];

const SCRIPTS_DOWN: [(&str, &str); 2] = [(
    "0001_create-films",
    include_str!("../migrations/0001_create-films_down.sql"),
),(
    "0001_create-users",
    include_str!("../migrations/0001_create-users_down.sql"),
)];

fn create_config() -> Config {
    let mut cfg = Config::new();
    if let Ok(host) = std::env::var("PG_HOST") {
        cfg.host = Some(host);
    }
    if let Ok(dbname) = std::env::var("PG_DBNAME") {
        cfg.dbname = Some(dbname);
    }
    if let Ok(user) = std::env::var("PG_USER") {
        cfg.user = Some(user);
    }
    if let Ok(password) = std::env::var("PG_PASSWORD") {
        cfg.password = Some(password);
    }
    cfg
}

pub async fn init_pool() {
    POOL.get_or_init(|| async {
        create_config()
            .create_pool(NoTls)
            .expect("couldn't create postgres pool")
    }).await;
}

pub fn get_pool_ref() -> &'static Pool {
    POOL.get().expect("postgres pool must be initialized first")
}

pub async fn migrate_up(pool: &Pool) {
    let mut client = pool.get().await.expect("couldn't get postgres client");
    let migration = Migration::new("migrations".to_string());
    migration
        .up(&mut **client, &SCRIPTS_UP)
        .await
        .expect("couldn't run migrations");
}

pub async fn migrate_down(pool: &Pool) {
    let mut client = pool.get().await.expect("couldn't get postgres client");
    let migration = Migration::new("migrations".to_string());
    migration
        .down(&mut **client, &SCRIPTS_DOWN)
        .await
        .expect("couldn't run migrations");
}

pub fn storage_error<E>(err: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Error::new(ErrorKind::Other, err)
}
