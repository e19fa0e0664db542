use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod balances;
mod expenses;
mod participants;
mod trips;
mod users;

pub use balances::Summary;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Checks the database answers, so a bad connection fails at startup.
    async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let engine = Engine {
            database: self.database,
        };
        engine.ping().await?;
        Ok(engine)
    }
}
