use finsage::config::{load_dotenv, Settings};
use finsage::services::logger::Logger;

#[tokio::main]
async fn main() {
    load_dotenv(&Logger::new("finsage").child("config"));
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("finsage: {}", err);
            if let Some(hint) = &err.hint {
                eprintln!("finsage: {}", hint);
            }
            std::process::exit(1);
        }
    };
    if let Err(err) = finsage::mcp::server::run_stdio(settings).await {
        eprintln!("finsage: {}", err);
        std::process::exit(1);
    }
}
