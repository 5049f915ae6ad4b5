#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ems_backend::init_logging();

    let app = ems_backend::App::new().await?;
    app.run().await?;

    Ok(())
}
