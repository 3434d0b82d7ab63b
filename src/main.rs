#[tokio::main]
async fn main() {
    agenda_backend::run().await;
}
