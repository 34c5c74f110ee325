//! # Administrative database session
//!
//! The bootstrap procedure talks to the server only through [`AdminSession`],
//! so it can run against a real `mongodb::Client` or an in-memory double.
//!
//! Every call names the database it targets explicitly. Collections are always
//! resolved through that database, never through the client's default.

use std::future::Future;

use mongodb::{
    Client,
    bson::{Document, doc},
    options::ClientOptions,
};
use tracing::{debug, info, instrument};

use crate::{
    config::DatabaseConfig,
    errors::{BootstrapError, Operation},
    models::{IndexSpec, UserSpec},
};

pub trait AdminSession {
    fn create_user(
        &self,
        db: &str,
        user: &UserSpec,
    ) -> impl Future<Output = Result<(), BootstrapError>> + Send;

    fn create_collection(
        &self,
        db: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), BootstrapError>> + Send;

    fn create_index(
        &self,
        db: &str,
        index: &IndexSpec,
    ) -> impl Future<Output = Result<(), BootstrapError>> + Send;
}

impl AdminSession for Client {
    #[instrument(skip(self, user), err, fields(user = %user.username))]
    async fn create_user(&self, db: &str, user: &UserSpec) -> Result<(), BootstrapError> {
        let reply = self
            .database(db)
            .run_command(user.create_command())
            .await
            .map_err(|e| {
                BootstrapError::from_driver(
                    Operation::CreateUser {
                        db,
                        user: &user.username,
                    },
                    e,
                )
            })?;
        debug!(?reply, "createUser acknowledged");
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn create_collection(&self, db: &str, name: &str) -> Result<(), BootstrapError> {
        self.database(db)
            .create_collection(name)
            .await
            .map_err(|e| BootstrapError::from_driver(Operation::CreateCollection { db, name }, e))
    }

    #[instrument(skip(self, index), err, fields(collection = %index.collection, field = %index.field))]
    async fn create_index(&self, db: &str, index: &IndexSpec) -> Result<(), BootstrapError> {
        let result = self
            .database(db)
            .collection::<Document>(&index.collection)
            .create_index(index.to_index_model())
            .await
            .map_err(|e| {
                BootstrapError::from_driver(
                    Operation::CreateIndex {
                        db,
                        collection: &index.collection,
                        field: &index.field,
                    },
                    e,
                )
            })?;
        debug!(index = %result.index_name, "index created");
        Ok(())
    }
}

/// Build a client from `conf` and make sure the server accepts its credentials.
#[instrument(skip(conf), err, fields(app = %conf.app_name))]
pub async fn connect(conf: &DatabaseConfig) -> Result<Client, BootstrapError> {
    let connect_err = |e| BootstrapError::from_driver(Operation::Connect, e);

    let mut client_options = ClientOptions::parse(&conf.url).await.map_err(connect_err)?;
    client_options.app_name = Some(conf.app_name.clone());
    let client = Client::with_options(client_options).map_err(connect_err)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(connect_err)?;

    info!("connected to MongoDB");
    Ok(client)
}
