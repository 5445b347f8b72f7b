#[tokio::main]
async fn main() {
    dine::start_server().await;
}
