use log::error;

mod cli;

#[tokio::main]
async fn main() {
    // Missing .env is fine, variables may come from the environment
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = cli::run().await {
        error!("{e}");
        std::process::exit(1);
    }
}
