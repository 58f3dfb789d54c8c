use anyhow::Context;
use bulkmail::configuration::get_configuration;
use bulkmail::startup::Application;
use bulkmail::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("bulkmail".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read configuration.")?;
    let app = Application::build(config)?;
    app.run().await?;

    Ok(())
}
