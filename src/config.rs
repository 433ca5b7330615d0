// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CrmRepository, InventoryRepository, MemoryRepository, OperationsRepository},
    services::{
        crm_service::CrmService, inventory_service::InventoryService,
        operation_service::OperationsService,
    },
};

/// Onde os dados ficam guardados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("STORE_BACKEND inválido: '{other}' (use 'postgres' ou 'memory')")),
        }
    }
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Separado do `from_env` para os testes não mexerem no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(port) => port.parse().context("PORT deve ser um número")?,
            None => 3000,
        };

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida"));
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        Ok(Self {
            port,
            store_backend,
            database_url,
            max_connections,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    // Só existe no backend Postgres (usado para rodar as migrações)
    pub db_pool: Option<PgPool>,
    pub inventory_service: InventoryService,
    pub operations_service: OperationsService,
    pub crm_service: CrmService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        match settings.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                Ok(Self::postgres(db_pool))
            }
        }
    }

    /// Monta o gráfico de dependências sobre o Postgres.
    pub fn postgres(db_pool: PgPool) -> Self {
        Self {
            inventory_service: InventoryService::new(Arc::new(InventoryRepository::new(
                db_pool.clone(),
            ))),
            operations_service: OperationsService::new(Arc::new(OperationsRepository::new(
                db_pool.clone(),
            ))),
            crm_service: CrmService::new(Arc::new(CrmRepository::new(db_pool.clone()))),
            db_pool: Some(db_pool),
        }
    }

    /// Um único repositório em memória atende os três serviços.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryRepository::new());
        Self {
            db_pool: None,
            inventory_service: InventoryService::new(store.clone()),
            operations_service: OperationsService::new(store.clone()),
            crm_service: CrmService::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let settings = Settings::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).unwrap();

        assert_eq!(settings.store_backend, StoreBackend::Memory);
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.max_connections, 5);
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn reads_port_and_pool_size() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/saleh"),
            ("PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "10"),
        ]))
        .unwrap();

        assert_eq!(settings.store_backend, StoreBackend::Postgres);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.max_connections, 10);
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(Settings::from_lookup(lookup(&[("STORE_BACKEND", "firestore")])).is_err());
    }
}
