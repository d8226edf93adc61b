#[tokio::main]
async fn main() {
    if let Err(e) = microblog::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
