use std::time::Duration;

use mongodb::{
    Client, Database,
    bson::{Document, doc},
    options::ClientOptions,
};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

const MAX_PING_ATTEMPTS: u32 = 10;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Build a client, wait for the server to answer, and check it can run multi-document
/// transactions.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    wait_for_ping(&database).await?;

    let hello = database
        .run_command(doc! { "hello": 1 })
        .await
        .map_err(|source| MongoDaoError::HealthPing { source })?;
    if !supports_transactions(&hello) {
        return Err(MongoDaoError::TransactionsUnsupported {
            database: database_name.to_owned(),
        });
    }

    Ok((client, database))
}

async fn wait_for_ping(database: &Database) -> MongoResult<()> {
    let mut delay = FIRST_RETRY_DELAY;

    for attempt in 1..=MAX_PING_ATTEMPTS {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(()),
            Err(source) if attempt == MAX_PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(attempt, error = %err, "MongoDB not answering yet; retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            }
        }
    }

    Ok(())
}

/// Replica set members and `mongos` routers accept transactions; standalone servers do not.
fn supports_transactions(hello: &Document) -> bool {
    hello.contains_key("setName") || hello.get_str("msg").is_ok_and(|msg| msg == "isdbgrid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_servers_cannot_settle() {
        assert!(!supports_transactions(&doc! { "isWritablePrimary": true }));
        assert!(supports_transactions(
            &doc! { "isWritablePrimary": true, "setName": "rs0" }
        ));
        assert!(supports_transactions(&doc! { "msg": "isdbgrid" }));
    }
}
