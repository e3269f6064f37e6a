use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Credentials and image used for a throwaway MySQL instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MySqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    tag: String,
    #[builder(default = "snaplink".to_string(), setter(into))]
    database: String,
    #[builder(default = "snaplink".to_string(), setter(into))]
    username: String,
    #[builder(default = "snaplink".to_string(), setter(into))]
    password: String,
    #[builder(default = "root".to_string(), setter(into))]
    root_password: String,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Test fixture for a disposable MySQL server.
///
/// The entrypoint boots MySQL twice (once to run init scripts), so the
/// server only counts as ready on the second "ready for connections" line.
/// Callers should still retry their first connection.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MySqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MySqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("port: 3306  MySQL Community Server"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", config.root_password.as_str())
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(MYSQL_PORT).await?)
    }

    /// DSN for the application user, scoped to the test database.
    pub async fn database_url(&self) -> Result<String> {
        self.url_for(&self.config.username, &self.config.password).await
    }

    /// DSN for `root`, for tests that need to create or drop databases.
    pub async fn root_url(&self) -> Result<String> {
        self.url_for("root", &self.config.root_password).await
    }

    async fn url_for(&self, user: &str, password: &str) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.port().await?;
        Ok(format!(
            "mysql://{user}:{password}@{host}:{port}/{}",
            self.config.database
        ))
    }
}
