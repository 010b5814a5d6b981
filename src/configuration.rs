use std::{env, fs, ops::Deref, sync::Arc};

use tokio::sync::Semaphore;

use crate::{
    error::Error,
    provider::{DatabasePool, PushClient},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub push: PushClient,
    pub push_permits: Semaphore,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        push: PushClient,
    ) -> Result<State, Error> {
        Self::init_migrations(&database).await?;
        let push_permits = Semaphore::new(config.max_tasks);
        Ok(Self {
            config,
            database,
            push,
            push_permits,
        })
    }

    async fn init_migrations(database: &DatabasePool) -> Result<(), Error> {
        // users first, subscription references it
        let files = vec!["users.sql", "subscription.sql"];

        let dir = env!("CARGO_MANIFEST_DIR");

        for file in files {
            let path = crate::dao::get_path(dir, file);
            let data = fs::read_to_string(path)?;
            sqlx::raw_sql(data.as_str())
                .execute(database.get_pool())
                .await?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub broker_url: String,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_tasks: usize,
    pub delivery_timeout: u64,
    pub socket_reconnect_interval: u64,
    pub gone_status_codes: Vec<u16>,
    pub mail_to: String,
    pub vapid_private_key: Vec<u8>,
    pub vapid_public_key: Vec<u8>,
    pub auth: String,
}

fn parse_config_vapid_keys() -> Result<(Vec<u8>, Vec<u8>), Error> {
    let directory = env!("CARGO_MANIFEST_DIR");
    let private_key_dir = format!("{}/cert/vapid_private.pem", directory);
    let public_key_dir = format!("{}/cert/vapid_public.b64", directory);

    let private_key = fs::read(private_key_dir)?;
    let public_key = fs::read(public_key_dir)?;

    Ok((private_key, public_key))
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let broker_url = env::var("BROKER_URL")?;
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;

    let allowed_origins = env::var("ALLOWED_ORIGINS")?
        .split(',')
        .map(|item| item.to_owned())
        .collect::<Vec<String>>();

    let max_tasks = env::var("MAX_TASKS")?.parse()?;
    let delivery_timeout = env::var("DELIVERY_TIMEOUT")?.parse()?;
    let socket_reconnect_interval =
        env::var("SOCKET_RECONNECT_INTERVAL")?.parse()?;

    let codes = env::var("GONE_STATUS_CODES")?
        .split(',')
        .map(|item| item.to_string())
        .collect::<Vec<String>>();
    let mut gone_status_codes = vec![];

    for code in codes {
        gone_status_codes.push(code.parse::<u16>()?);
    }

    let mail_to: String = env::var("MAIL_TO")?;
    let (vapid_private_key, vapid_public_key) = parse_config_vapid_keys()?;
    let auth = env::var("AUTH")?;

    let config = Config {
        database_url,
        broker_url,
        server_host,
        port,
        allowed_origins,
        max_tasks,
        delivery_timeout,
        socket_reconnect_interval,
        gone_status_codes,
        mail_to,
        vapid_private_key,
        vapid_public_key,
        auth,
    };

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    let config_string = fs::read_to_string(path)?;
    parse_config_string(config_string)?;

    Ok(())
}

fn parse_config_string(config: String) -> Result<(), Error> {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .map(|s| {
            let element = s.find('=');
            if let Some(e) = element {
                return Some(s.split_at(e));
            }
            None
        })
        .map(|value| {
            if let Some((k, v)) = value {
                return Some((k, &v[1..]));
            }
            None
        })
        .collect();

    for (key, value) in params.into_iter().flatten() {
        env::set_var(key, value);
    }

    Ok(())
}
